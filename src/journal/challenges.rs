//! Monthly challenges: a goal tied to one question, with a date range fixed
//! to the calendar month at creation time.

use chrono::Local;
use ulid::Ulid;

use crate::error::{JournalError, JournalResult};
use crate::store::KeyValueStore;
use crate::types::{ChallengeGoal, MonthlyChallenge, month_end, month_start};

use super::{CHALLENGES_KEY, Journal};

impl<S: KeyValueStore> Journal<S> {
    /// All challenges, deactivated ones included.
    pub async fn challenges(&self) -> Vec<MonthlyChallenge> {
        self.read_doc(CHALLENGES_KEY).await
    }

    pub async fn active_challenges(&self) -> Vec<MonthlyChallenge> {
        self.challenges()
            .await
            .into_iter()
            .filter(|c| c.active)
            .collect()
    }

    pub async fn challenge(&self, id: &str) -> Option<MonthlyChallenge> {
        self.challenges().await.into_iter().find(|c| c.id == id)
    }

    /// The range is first..last day of the current month and never moves
    /// afterwards, even once the month has rolled over.
    pub async fn add_challenge(
        &self,
        title: impl Into<String>,
        question_id: impl Into<String>,
        goal_type: ChallengeGoal,
        goal_value: f64,
    ) -> JournalResult<MonthlyChallenge> {
        let today = Local::now().date_naive();
        let challenge = MonthlyChallenge {
            id: Ulid::new().to_string(),
            title: title.into(),
            question_id: question_id.into(),
            goal_type,
            goal_value,
            start_date: month_start(today),
            end_date: month_end(today),
            active: true,
        };
        let mut challenges = self.challenges().await;
        challenges.push(challenge.clone());
        self.write_doc(CHALLENGES_KEY, &challenges).await?;
        Ok(challenge)
    }

    /// One-way: a deactivated challenge stays stored (a direct lookup still
    /// returns it) but drops out of the active list. There is no
    /// reactivation.
    pub async fn deactivate_challenge(&self, id: &str) -> JournalResult<()> {
        let mut challenges = self.challenges().await;
        let challenge = challenges
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| JournalError::ChallengeNotFound(id.to_string()))?;
        challenge.active = false;
        self.write_doc(CHALLENGES_KEY, &challenges).await?;
        Ok(())
    }

    /// Hard removal. Part of the storage surface, not reachable from the CLI.
    pub async fn delete_challenge(&self, id: &str) -> JournalResult<()> {
        let mut challenges = self.challenges().await;
        let before = challenges.len();
        challenges.retain(|c| c.id != id);
        if challenges.len() == before {
            return Err(JournalError::ChallengeNotFound(id.to_string()));
        }
        self.write_doc(CHALLENGES_KEY, &challenges).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn created_challenge_spans_the_current_month() {
        let journal = Journal::new(MemoryStore::new());
        let challenge = journal
            .add_challenge("Dry month", "1", ChallengeGoal::YesCount, 20.0)
            .await
            .unwrap();

        let today = Local::now().date_naive();
        assert_eq!(challenge.start_date, month_start(today));
        assert_eq!(challenge.end_date, month_end(today));
        assert!(challenge.active);
        assert_eq!(journal.active_challenges().await.len(), 1);
    }

    #[tokio::test]
    async fn deactivation_is_one_way_and_keeps_the_record() {
        let journal = Journal::new(MemoryStore::new());
        let challenge = journal
            .add_challenge("Sleep total", "2", ChallengeGoal::Sum, 200.0)
            .await
            .unwrap();

        journal.deactivate_challenge(&challenge.id).await.unwrap();
        assert!(journal.active_challenges().await.is_empty());

        let stored = journal.challenge(&challenge.id).await.unwrap();
        assert!(!stored.active);
    }

    #[tokio::test]
    async fn delete_removes_and_unknown_ids_error() {
        let journal = Journal::new(MemoryStore::new());
        let challenge = journal
            .add_challenge("Entries", "3", ChallengeGoal::CountEntries, 10.0)
            .await
            .unwrap();

        journal.delete_challenge(&challenge.id).await.unwrap();
        assert!(journal.challenges().await.is_empty());

        let err = journal.deactivate_challenge("missing").await.unwrap_err();
        assert!(matches!(err, JournalError::ChallengeNotFound(_)));
        let err = journal.delete_challenge("missing").await.unwrap_err();
        assert!(matches!(err, JournalError::ChallengeNotFound(_)));
    }
}
