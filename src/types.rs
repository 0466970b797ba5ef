use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Input and aggregation semantics of a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "yes-no")]
    YesNo,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "text")]
    Text,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::YesNo => "yes-no",
            QuestionKind::Number => "number",
            QuestionKind::Text => "text",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Paused questions are kept (with their history) but not asked.
    #[serde(default)]
    pub paused: bool,
}

/// A recorded answer. Untagged so the stored form stays a bare JSON
/// boolean/number/string, matching the documents written by earlier versions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    YesNo(bool),
    Number(f64),
    Text(String),
}

impl ResponseValue {
    pub fn as_yes(&self) -> Option<bool> {
        match self {
            ResponseValue::YesNo(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResponseValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseValue::YesNo(true) => write!(f, "yes"),
            ResponseValue::YesNo(false) => write!(f, "no"),
            ResponseValue::Number(v) => write!(f, "{}", format_scalar(*v)),
            ResponseValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// One answer to one question on one calendar day. At most one per
/// (question_id, date) pair; the ledger upsert enforces this.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResponse {
    pub question_id: String,
    /// Local calendar day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub response: ResponseValue,
    /// Capture instant (epoch milliseconds on the wire). Display/audit only;
    /// bucketing uses `date`.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// How a challenge's matching responses reduce to a scalar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeGoal {
    YesCount,
    Sum,
    CountEntries,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyChallenge {
    pub id: String,
    pub title: String,
    pub question_id: String,
    pub goal_type: ChallengeGoal,
    pub goal_value: f64,
    /// Inclusive range, fixed at creation time; not recomputed as months roll.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Render a scalar without a trailing `.0` for whole values.
pub fn format_scalar(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
