//! Aggregation engine: rolling-window trend statistics, chart series, and
//! monthly challenge progress. Pure functions over ledger snapshots; no I/O.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::types::{
    ChallengeGoal, DailyResponse, MonthlyChallenge, Question, QuestionKind, format_scalar,
};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
/// A chart keeps only the most recent points; older ones are dropped, not
/// averaged.
pub const CHART_POINTS: usize = 14;

/// Per-question statistics over a trailing window.
#[derive(Clone, Debug, PartialEq)]
pub struct TrendSummary {
    /// Responses recorded inside the window.
    pub entries: usize,
    /// entries / window-days, as a whole percentage.
    pub response_rate: u32,
    /// Type-specific statistic; `None` for text questions and for an empty
    /// window.
    pub stat: Option<TrendStat>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrendStat {
    YesNo {
        yes_count: usize,
        total: usize,
        /// yes / total, one decimal place.
        percentage: f64,
    },
    Number {
        /// Sum of the averaged values (zero-valued entries excluded).
        total: f64,
        /// One decimal place; 0.0 when no value survives the zero filter.
        average: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartPoint {
    pub date: NaiveDate,
    /// `M/D`, no zero padding.
    pub label: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChallengeProgress {
    pub current: f64,
    pub goal: f64,
    /// Rounded and clamped to 0..=100.
    pub percent: u32,
    pub label: String,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Responses for one question from buckets on or after `today - days`.
/// Cross-bucket order is not significant.
pub fn responses_in_window(
    all: &BTreeMap<NaiveDate, Vec<DailyResponse>>,
    question_id: &str,
    today: NaiveDate,
    days: u32,
) -> Vec<DailyResponse> {
    let cutoff = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    all.range(cutoff..)
        .flat_map(|(_, bucket)| bucket.iter())
        .filter(|r| r.question_id == question_id)
        .cloned()
        .collect()
}

pub fn trend_summary(
    question: &Question,
    responses: &[DailyResponse],
    days: u32,
) -> TrendSummary {
    let entries = responses.len();
    let response_rate = if days == 0 {
        0
    } else {
        ((entries as f64 / f64::from(days)) * 100.0).round() as u32
    };

    let stat = if entries == 0 {
        None
    } else {
        match question.kind {
            QuestionKind::YesNo => {
                let yes_count = responses
                    .iter()
                    .filter(|r| r.response.as_yes() == Some(true))
                    .count();
                Some(TrendStat::YesNo {
                    yes_count,
                    total: entries,
                    percentage: round1(yes_count as f64 / entries as f64 * 100.0),
                })
            }
            QuestionKind::Number => {
                // Zero entries count toward the response rate but are treated
                // as "no data" for the average (and for the total shown next
                // to it). Challenge sums keep them; do not unify.
                let values: Vec<f64> = responses
                    .iter()
                    .filter_map(|r| r.response.as_number())
                    .filter(|n| *n > 0.0)
                    .collect();
                let total: f64 = values.iter().sum();
                let average = if values.is_empty() {
                    0.0
                } else {
                    round1(total / values.len() as f64)
                };
                Some(TrendStat::Number { total, average })
            }
            QuestionKind::Text => None,
        }
    };

    TrendSummary {
        entries,
        response_rate,
        stat,
    }
}

/// Chronological series for charting: sorted ascending by date, truncated to
/// the most recent [`CHART_POINTS`]. Yes/no maps to 1/0; text yields nothing.
pub fn chart_series(question: &Question, responses: &[DailyResponse]) -> Vec<ChartPoint> {
    if question.kind == QuestionKind::Text {
        return Vec::new();
    }

    let mut sorted: Vec<&DailyResponse> = responses.iter().collect();
    sorted.sort_by_key(|r| r.date);
    let start = sorted.len().saturating_sub(CHART_POINTS);

    sorted[start..]
        .iter()
        .map(|r| {
            let value = match question.kind {
                QuestionKind::YesNo => {
                    if r.response.as_yes() == Some(true) {
                        1.0
                    } else {
                        0.0
                    }
                }
                _ => r.response.as_number().unwrap_or(0.0),
            };
            ChartPoint {
                date: r.date,
                label: format!("{}/{}", r.date.month(), r.date.day()),
                value,
            }
        })
        .collect()
}

/// Progress of one challenge against the ledger. Buckets inside the inclusive
/// challenge range are reduced per goal type; the percentage is clamped at
/// 100 and a non-positive goal is treated as 1.
pub fn challenge_progress(
    challenge: &MonthlyChallenge,
    all: &BTreeMap<NaiveDate, Vec<DailyResponse>>,
    questions: &[Question],
) -> ChallengeProgress {
    let is_yes_no = questions
        .iter()
        .find(|q| q.id == challenge.question_id)
        .map(|q| q.kind)
        == Some(QuestionKind::YesNo);

    let mut current = 0.0;
    for (_, bucket) in all.range(challenge.start_date..=challenge.end_date) {
        for response in bucket.iter().filter(|r| r.question_id == challenge.question_id) {
            match challenge.goal_type {
                ChallengeGoal::YesCount => {
                    if response.response.as_yes() == Some(true) {
                        current += 1.0;
                    }
                }
                ChallengeGoal::Sum => {
                    current += response.response.as_number().unwrap_or(0.0);
                }
                ChallengeGoal::CountEntries => current += 1.0,
            }
        }
    }

    let goal = challenge.goal_value;
    let denom = if goal > 0.0 { goal } else { 1.0 };
    let percent = (current / denom * 100.0).round().clamp(0.0, 100.0) as u32;
    let label = if is_yes_no && challenge.goal_type == ChallengeGoal::YesCount {
        format!("{} yes", current as i64)
    } else {
        format_scalar(current)
    };

    ChallengeProgress {
        current,
        goal,
        percent,
        label,
    }
}

/// Goal types that make sense for a question kind; the first entry is the
/// default offered when creating a challenge.
pub fn goal_types_for(kind: QuestionKind) -> &'static [ChallengeGoal] {
    match kind {
        QuestionKind::YesNo => &[ChallengeGoal::YesCount],
        QuestionKind::Number => &[ChallengeGoal::Sum, ChallengeGoal::CountEntries],
        QuestionKind::Text => &[ChallengeGoal::CountEntries],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseValue;
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn question(id: &str, kind: QuestionKind) -> Question {
        Question {
            id: id.to_string(),
            text: format!("question {id}"),
            kind,
            category: None,
            topic: None,
            paused: false,
        }
    }

    fn response(question_id: &str, day: &str, value: ResponseValue) -> DailyResponse {
        DailyResponse {
            question_id: question_id.to_string(),
            date: date(day),
            response: value,
            timestamp: Utc::now(),
        }
    }

    fn ledger(responses: Vec<DailyResponse>) -> BTreeMap<NaiveDate, Vec<DailyResponse>> {
        let mut map: BTreeMap<NaiveDate, Vec<DailyResponse>> = BTreeMap::new();
        for r in responses {
            map.entry(r.date).or_default().push(r);
        }
        map
    }

    fn challenge(
        question_id: &str,
        goal_type: ChallengeGoal,
        goal_value: f64,
    ) -> MonthlyChallenge {
        MonthlyChallenge {
            id: "c1".to_string(),
            title: "test".to_string(),
            question_id: question_id.to_string(),
            goal_type,
            goal_value,
            start_date: date("2025-06-01"),
            end_date: date("2025-06-30"),
            active: true,
        }
    }

    #[test]
    fn window_includes_the_cutoff_day_and_filters_by_question() {
        let all = ledger(vec![
            response("q1", "2025-06-01", ResponseValue::YesNo(true)),
            response("q1", "2025-06-10", ResponseValue::YesNo(false)),
            response("q2", "2025-06-10", ResponseValue::YesNo(true)),
            response("q1", "2025-05-01", ResponseValue::YesNo(true)),
        ]);

        let within = responses_in_window(&all, "q1", date("2025-07-01"), 30);
        let days: Vec<NaiveDate> = within.iter().map(|r| r.date).collect();
        assert_eq!(days, vec![date("2025-06-01"), date("2025-06-10")]);
    }

    #[test]
    fn yes_rate_is_one_decimal() {
        let q = question("q1", QuestionKind::YesNo);
        let responses = vec![
            response("q1", "2025-06-01", ResponseValue::YesNo(true)),
            response("q1", "2025-06-02", ResponseValue::YesNo(true)),
            response("q1", "2025-06-03", ResponseValue::YesNo(false)),
        ];

        let summary = trend_summary(&q, &responses, 30);
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.response_rate, 10);
        assert_eq!(
            summary.stat,
            Some(TrendStat::YesNo {
                yes_count: 2,
                total: 3,
                percentage: 66.7
            })
        );
    }

    #[test]
    fn numeric_average_excludes_zero_entries() {
        let q = question("q1", QuestionKind::Number);
        let responses = vec![
            response("q1", "2025-06-01", ResponseValue::Number(0.0)),
            response("q1", "2025-06-02", ResponseValue::Number(4.0)),
            response("q1", "2025-06-03", ResponseValue::Number(6.0)),
        ];

        let summary = trend_summary(&q, &responses, 30);
        // The zero entry still counts as a recorded response.
        assert_eq!(summary.entries, 3);
        assert_eq!(
            summary.stat,
            Some(TrendStat::Number {
                total: 10.0,
                average: 5.0
            })
        );
    }

    #[test]
    fn all_zero_numeric_window_averages_to_zero_not_nan() {
        let q = question("q1", QuestionKind::Number);
        let responses = vec![response("q1", "2025-06-01", ResponseValue::Number(0.0))];
        let summary = trend_summary(&q, &responses, 30);
        assert_eq!(
            summary.stat,
            Some(TrendStat::Number {
                total: 0.0,
                average: 0.0
            })
        );
    }

    #[test]
    fn text_questions_and_empty_windows_have_no_stat() {
        let text = question("q1", QuestionKind::Text);
        let responses = vec![response(
            "q1",
            "2025-06-01",
            ResponseValue::Text("fine".to_string()),
        )];
        assert_eq!(trend_summary(&text, &responses, 30).stat, None);

        let yes_no = question("q2", QuestionKind::YesNo);
        let empty = trend_summary(&yes_no, &[], 30);
        assert_eq!(empty.stat, None);
        assert_eq!(empty.response_rate, 0);
    }

    #[test]
    fn chart_series_sorts_and_keeps_the_most_recent_14() {
        let q = question("q1", QuestionKind::Number);
        // 20 days, deliberately unordered.
        let mut responses = Vec::new();
        for day in (1..=20).rev() {
            responses.push(response(
                "q1",
                &format!("2025-06-{day:02}"),
                ResponseValue::Number(day as f64),
            ));
        }

        let series = chart_series(&q, &responses);
        assert_eq!(series.len(), CHART_POINTS);
        assert_eq!(series.first().unwrap().date, date("2025-06-07"));
        assert_eq!(series.last().unwrap().date, date("2025-06-20"));
        assert_eq!(series.first().unwrap().label, "6/7");
        assert_eq!(series.first().unwrap().value, 7.0);
    }

    #[test]
    fn chart_series_maps_yes_no_to_unit_values() {
        let q = question("q1", QuestionKind::YesNo);
        let responses = vec![
            response("q1", "2025-06-01", ResponseValue::YesNo(true)),
            response("q1", "2025-06-02", ResponseValue::YesNo(false)),
        ];
        let values: Vec<f64> = chart_series(&q, &responses)
            .into_iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![1.0, 0.0]);
    }

    #[test]
    fn challenge_sum_progress() {
        let qs = vec![question("q1", QuestionKind::Number)];
        let all = ledger(vec![
            response("q1", "2025-06-01", ResponseValue::Number(5.0)),
            response("q1", "2025-06-02", ResponseValue::Number(5.0)),
            response("q1", "2025-06-03", ResponseValue::Number(5.0)),
        ]);

        let progress = challenge_progress(&challenge("q1", ChallengeGoal::Sum, 20.0), &all, &qs);
        assert_eq!(progress.current, 15.0);
        assert_eq!(progress.percent, 75);
        assert_eq!(progress.label, "15");
    }

    #[test]
    fn challenge_percent_clamps_at_100() {
        let qs = vec![question("q1", QuestionKind::Number)];
        let all = ledger(vec![
            response("q1", "2025-06-01", ResponseValue::Number(10.0)),
            response("q1", "2025-06-02", ResponseValue::Number(10.0)),
            response("q1", "2025-06-03", ResponseValue::Number(10.0)),
        ]);

        let progress = challenge_progress(&challenge("q1", ChallengeGoal::Sum, 20.0), &all, &qs);
        assert_eq!(progress.current, 30.0);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn zero_goal_is_treated_as_one() {
        let qs = vec![question("q1", QuestionKind::Number)];
        let all = ledger(vec![response(
            "q1",
            "2025-06-01",
            ResponseValue::Number(3.0),
        )]);

        let progress = challenge_progress(&challenge("q1", ChallengeGoal::Sum, 0.0), &all, &qs);
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn yes_count_label_and_range_bounds() {
        let qs = vec![question("q1", QuestionKind::YesNo)];
        let all = ledger(vec![
            // Both boundary days are inclusive.
            response("q1", "2025-06-01", ResponseValue::YesNo(true)),
            response("q1", "2025-06-30", ResponseValue::YesNo(true)),
            response("q1", "2025-07-01", ResponseValue::YesNo(true)),
            response("q1", "2025-06-15", ResponseValue::YesNo(false)),
        ]);

        let progress =
            challenge_progress(&challenge("q1", ChallengeGoal::YesCount, 10.0), &all, &qs);
        assert_eq!(progress.current, 2.0);
        assert_eq!(progress.label, "2 yes");
        assert_eq!(progress.percent, 20);
    }

    #[test]
    fn challenge_sum_keeps_zero_entries_and_ignores_non_numeric() {
        let qs = vec![question("q1", QuestionKind::Number)];
        let all = ledger(vec![
            response("q1", "2025-06-01", ResponseValue::Number(0.0)),
            response("q1", "2025-06-02", ResponseValue::Number(10.0)),
            response("q1", "2025-06-03", ResponseValue::Text("n/a".to_string())),
        ]);

        let sum = challenge_progress(&challenge("q1", ChallengeGoal::Sum, 20.0), &all, &qs);
        assert_eq!(sum.current, 10.0);

        let count =
            challenge_progress(&challenge("q1", ChallengeGoal::CountEntries, 10.0), &all, &qs);
        assert_eq!(count.current, 3.0);
    }

    #[test]
    fn deleted_question_aggregates_to_empty_not_error() {
        let all = ledger(vec![response(
            "gone",
            "2025-06-01",
            ResponseValue::YesNo(true),
        )]);

        // Question list no longer contains "gone".
        let progress =
            challenge_progress(&challenge("other", ChallengeGoal::CountEntries, 5.0), &all, &[]);
        assert_eq!(progress.current, 0.0);
        assert_eq!(progress.percent, 0);

        let q = question("other", QuestionKind::YesNo);
        let within = responses_in_window(&all, "other", date("2025-06-10"), 30);
        assert!(within.is_empty());
        assert_eq!(trend_summary(&q, &within, 30).stat, None);
    }

    #[test]
    fn goal_type_menus_follow_question_kind() {
        assert_eq!(
            goal_types_for(QuestionKind::YesNo),
            &[ChallengeGoal::YesCount]
        );
        assert_eq!(
            goal_types_for(QuestionKind::Number),
            &[ChallengeGoal::Sum, ChallengeGoal::CountEntries]
        );
        assert_eq!(
            goal_types_for(QuestionKind::Text),
            &[ChallengeGoal::CountEntries]
        );
    }
}
