//! Response ledger: one bucket of answers per calendar day, stored under
//! `responses:<YYYY-MM-DD>`.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use crate::error::JournalResult;
use crate::store::KeyValueStore;
use crate::types::{DailyResponse, ResponseValue};

use super::{Journal, RESPONSES_KEY_PREFIX};

fn bucket_key(date: NaiveDate) -> String {
    format!("{RESPONSES_KEY_PREFIX}{date}")
}

impl<S: KeyValueStore> Journal<S> {
    /// Empty when no bucket exists for the date; a missing bucket is not an
    /// error.
    pub async fn responses_for(&self, date: NaiveDate) -> Vec<DailyResponse> {
        self.read_doc(&bucket_key(date)).await
    }

    /// Upsert by question id within the date's bucket: an existing entry is
    /// replaced in place (position preserved), otherwise the response is
    /// appended. The whole bucket is rewritten.
    pub async fn save_response(&self, response: DailyResponse) -> JournalResult<()> {
        let key = bucket_key(response.date);
        let mut bucket = self.responses_for(response.date).await;
        match bucket
            .iter_mut()
            .find(|r| r.question_id == response.question_id)
        {
            Some(slot) => *slot = response,
            None => bucket.push(response),
        }
        self.write_doc(&key, &bucket).await?;
        Ok(())
    }

    /// Build and save a response for `date`, stamping the capture instant.
    pub async fn record(
        &self,
        date: NaiveDate,
        question_id: &str,
        value: ResponseValue,
    ) -> JournalResult<DailyResponse> {
        let response = DailyResponse {
            question_id: question_id.to_string(),
            date,
            response: value,
            timestamp: Utc::now(),
        };
        self.save_response(response.clone()).await?;
        Ok(response)
    }

    /// Every persisted bucket, keyed by date. Linear in the number of days
    /// that ever recorded a response; each bucket is fetched individually.
    pub async fn all_responses(&self) -> BTreeMap<NaiveDate, Vec<DailyResponse>> {
        let keys = match self.store().list_keys().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(%err, "failed to list response buckets");
                return BTreeMap::new();
            }
        };

        let mut map = BTreeMap::new();
        for key in keys {
            let Some(raw_date) = key.strip_prefix(RESPONSES_KEY_PREFIX) else {
                continue;
            };
            let Ok(date) = raw_date.parse::<NaiveDate>() else {
                warn!(key, "skipping response bucket with unparseable date");
                continue;
            };
            map.insert(date, self.responses_for(date).await);
        }
        map
    }
}
