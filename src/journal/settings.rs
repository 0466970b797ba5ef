//! Reminder settings: the single daily notification time, stored as a bare
//! `HH:MM` string.

use chrono::NaiveTime;
use tracing::warn;

use crate::error::JournalResult;
use crate::notify::parse_time;
use crate::store::KeyValueStore;

use super::{Journal, NOTIFICATION_TIME_KEY};

impl<S: KeyValueStore> Journal<S> {
    pub async fn notification_time(&self) -> Option<NaiveTime> {
        match self.store().get(NOTIFICATION_TIME_KEY).await {
            Ok(Some(raw)) => match parse_time(raw.trim()) {
                Ok(time) => Some(time),
                Err(err) => {
                    warn!(%err, "ignoring stored notification time");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(%err, "failed to read notification time");
                None
            }
        }
    }

    pub async fn set_notification_time(&self, time: NaiveTime) -> JournalResult<()> {
        self.store()
            .set(NOTIFICATION_TIME_KEY, time.format("%H:%M").to_string())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn round_trips_as_hh_mm() {
        let journal = Journal::new(MemoryStore::new());
        assert_eq!(journal.notification_time().await, None);

        let time = NaiveTime::from_hms_opt(20, 30, 0).unwrap();
        journal.set_notification_time(time).await.unwrap();

        assert_eq!(journal.notification_time().await, Some(time));
        assert_eq!(
            journal
                .store()
                .get(NOTIFICATION_TIME_KEY)
                .await
                .unwrap()
                .as_deref(),
            Some("20:30")
        );
    }

    #[tokio::test]
    async fn garbage_stored_time_reads_as_unset() {
        let store = MemoryStore::new();
        store
            .set(NOTIFICATION_TIME_KEY, "soonish".to_string())
            .await
            .unwrap();
        let journal = Journal::new(store);
        assert_eq!(journal.notification_time().await, None);
    }
}
