//! Question registry: the ordered, user-editable set of daily questions.

use tracing::warn;
use ulid::Ulid;

use crate::error::{JournalError, JournalResult};
use crate::store::KeyValueStore;
use crate::types::{Question, QuestionKind};

use super::{Journal, QUESTIONS_KEY};

impl<S: KeyValueStore> Journal<S> {
    /// All questions, paused included. A first-ever read (no `questions` key
    /// persisted) seeds the built-in default set and persists it; a stored
    /// empty array stays empty.
    pub async fn questions(&self) -> Vec<Question> {
        match self.store().get(QUESTIONS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(questions) => questions,
                Err(err) => {
                    warn!(%err, "stored questions are unreadable, using defaults");
                    default_questions()
                }
            },
            Ok(None) => {
                let defaults = default_questions();
                if let Err(err) = self.write_doc(QUESTIONS_KEY, &defaults).await {
                    warn!(%err, "failed to persist seeded default questions");
                }
                defaults
            }
            Err(err) => {
                warn!(%err, "failed to read questions, using defaults");
                default_questions()
            }
        }
    }

    /// Questions eligible for check-in, trends, and challenges.
    pub async fn active_questions(&self) -> Vec<Question> {
        self.questions()
            .await
            .into_iter()
            .filter(|q| !q.paused)
            .collect()
    }

    pub async fn question(&self, id: &str) -> Option<Question> {
        self.questions().await.into_iter().find(|q| q.id == id)
    }

    pub async fn add_question(
        &self,
        text: impl Into<String>,
        kind: QuestionKind,
        category: Option<String>,
        topic: Option<String>,
    ) -> JournalResult<Question> {
        let question = Question {
            id: Ulid::new().to_string(),
            text: text.into(),
            kind,
            category,
            topic,
            paused: false,
        };
        let mut questions = self.questions().await;
        questions.push(question.clone());
        self.write_doc(QUESTIONS_KEY, &questions).await?;
        Ok(question)
    }

    /// Hard removal. Historical responses for the question are left in their
    /// date buckets; aggregation over the removed id simply finds nothing.
    pub async fn delete_question(&self, id: &str) -> JournalResult<()> {
        let mut questions = self.questions().await;
        let before = questions.len();
        questions.retain(|q| q.id != id);
        if questions.len() == before {
            return Err(JournalError::QuestionNotFound(id.to_string()));
        }
        self.write_doc(QUESTIONS_KEY, &questions).await?;
        Ok(())
    }

    /// Set-to-value, not a toggle; pausing an already-paused question is a
    /// no-op write.
    pub async fn set_question_paused(&self, id: &str, paused: bool) -> JournalResult<()> {
        let mut questions = self.questions().await;
        let question = questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| JournalError::QuestionNotFound(id.to_string()))?;
        question.paused = paused;
        self.write_doc(QUESTIONS_KEY, &questions).await?;
        Ok(())
    }
}

/// The built-in starter set: three questions active, five paused until the
/// user opts in.
pub fn default_questions() -> Vec<Question> {
    fn question(
        id: &str,
        text: &str,
        kind: QuestionKind,
        category: &str,
        topic: &str,
        paused: bool,
    ) -> Question {
        Question {
            id: id.to_string(),
            text: text.to_string(),
            kind,
            category: Some(category.to_string()),
            topic: Some(topic.to_string()),
            paused,
        }
    }

    vec![
        question(
            "1",
            "Did you drink alcohol today?",
            QuestionKind::YesNo,
            "Health",
            "Alcohol",
            false,
        ),
        question(
            "2",
            "How many hours did you sleep?",
            QuestionKind::Number,
            "Sleep",
            "Sleep",
            false,
        ),
        question(
            "3",
            "Did you exercise today?",
            QuestionKind::YesNo,
            "Exercise",
            "Exercise",
            false,
        ),
        question(
            "4",
            "How many cups of water did you drink?",
            QuestionKind::Number,
            "Health",
            "Hydration",
            true,
        ),
        question(
            "5",
            "Did you meditate today?",
            QuestionKind::YesNo,
            "Wellness",
            "Meditation",
            true,
        ),
        question(
            "6",
            "How many minutes of screen time did you have?",
            QuestionKind::Number,
            "Wellness",
            "Screen Time",
            true,
        ),
        question(
            "7",
            "Did you take your vitamins today?",
            QuestionKind::YesNo,
            "Health",
            "Vitamins",
            true,
        ),
        question(
            "8",
            "How many minutes did you spend outdoors?",
            QuestionKind::Number,
            "Wellness",
            "Outdoors",
            true,
        ),
    ]
}
