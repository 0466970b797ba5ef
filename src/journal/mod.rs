//! The journal facade: question registry, date-bucketed response ledger,
//! monthly challenges, and reminder settings, all persisted through a
//! [`KeyValueStore`].
//!
//! Failure policy: reads degrade (missing or unreadable data becomes the
//! empty/default value, with a warning), writes propagate errors to the
//! caller.

mod challenges;
mod questions;
mod responses;
mod settings;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::store::{KeyValueStore, StoreError};

pub const QUESTIONS_KEY: &str = "questions";
pub const RESPONSES_KEY_PREFIX: &str = "responses:";
pub const CHALLENGES_KEY: &str = "challenges";
pub const NOTIFICATION_TIME_KEY: &str = "notification_time";
pub const FIRST_LAUNCH_KEY: &str = "first_launch_date";

pub struct Journal<S> {
    store: S,
}

impl<S: KeyValueStore> Journal<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decode a stored JSON document, treating every read-side failure as
    /// "no data".
    pub(crate) async fn read_doc<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!(key, %err, "stored document is unreadable, treating as empty");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(err) => {
                warn!(key, %err, "storage read failed, treating as empty");
                T::default()
            }
        }
    }

    pub(crate) async fn write_doc<T: Serialize>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, raw).await
    }
}
