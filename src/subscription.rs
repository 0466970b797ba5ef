//! Entitlement gating: a 30-day trial anchored on first launch, optionally
//! upgraded by a billing provider. The service is constructed and injected,
//! never a process-global, and `initialize` is idempotent.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::journal::{FIRST_LAUNCH_KEY, Journal};
use crate::store::KeyValueStore;

pub const TRIAL_DAYS: i64 = 30;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct EntitlementError(pub String);

/// What the billing backend currently grants.
#[derive(Clone, Debug, Default)]
pub struct ActiveEntitlements {
    pub lifetime: bool,
    pub monthly: bool,
    pub monthly_expiration: Option<String>,
}

/// External billing collaborator. The core only consumes the resulting
/// flags; purchase and restore flows live outside this crate.
pub trait EntitlementProvider {
    async fn entitlements(&self) -> Result<ActiveEntitlements, EntitlementError>;
}

/// Grants nothing; access is then governed entirely by the trial. Also the
/// behavior when a real provider is unreachable.
pub struct NoProvider;

impl EntitlementProvider for NoProvider {
    async fn entitlements(&self) -> Result<ActiveEntitlements, EntitlementError> {
        Ok(ActiveEntitlements::default())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionStatus {
    pub is_subscribed: bool,
    pub is_lifetime: bool,
    pub is_monthly: bool,
    pub is_in_trial: bool,
    pub trial_days_remaining: i64,
    pub expiration_date: Option<String>,
}

pub struct EntitlementService<'a, S, P> {
    journal: &'a Journal<S>,
    provider: P,
    initialized: bool,
}

impl<'a, S: KeyValueStore, P: EntitlementProvider> EntitlementService<'a, S, P> {
    pub fn new(journal: &'a Journal<S>, provider: P) -> Self {
        Self {
            journal,
            provider,
            initialized: false,
        }
    }

    /// Records the first-launch instant if absent. Safe to call repeatedly;
    /// a storage failure leaves the service uninitialized so a later call
    /// retries.
    pub async fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        match self.journal.store().get(FIRST_LAUNCH_KEY).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Err(err) = self
                    .journal
                    .store()
                    .set(FIRST_LAUNCH_KEY, Utc::now().to_rfc3339())
                    .await
                {
                    warn!(%err, "failed to record first launch date");
                    return;
                }
            }
            Err(err) => {
                warn!(%err, "failed to read first launch date");
                return;
            }
        }

        self.initialized = true;
        info!("entitlement service initialized");
    }

    pub async fn status(&self) -> SubscriptionStatus {
        let entitlements = match self.provider.entitlements().await {
            Ok(entitlements) => entitlements,
            Err(err) => {
                // Provider unreachable: fall back to trial-only status.
                warn!(%err, "entitlement provider unavailable");
                ActiveEntitlements::default()
            }
        };

        let first_launch = match self.journal.store().get(FIRST_LAUNCH_KEY).await {
            Ok(Some(raw)) => match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(instant) => Some(instant.with_timezone(&Utc)),
                Err(err) => {
                    warn!(%err, "stored first launch date is unreadable");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(%err, "failed to read first launch date");
                None
            }
        };
        let (is_in_trial, trial_days_remaining) = trial_status(first_launch, Utc::now());

        SubscriptionStatus {
            is_subscribed: entitlements.lifetime || entitlements.monthly,
            is_lifetime: entitlements.lifetime,
            is_monthly: entitlements.monthly,
            is_in_trial,
            trial_days_remaining,
            expiration_date: if entitlements.monthly {
                entitlements.monthly_expiration
            } else {
                None
            },
        }
    }

    pub async fn has_access(&self) -> bool {
        let status = self.status().await;
        status.is_subscribed || status.is_in_trial
    }
}

/// (in_trial, days_remaining). A missing anchor means the trial has not
/// started counting yet and is reported in full.
fn trial_status(first_launch: Option<DateTime<Utc>>, now: DateTime<Utc>) -> (bool, i64) {
    match first_launch {
        None => (true, TRIAL_DAYS),
        Some(start) => {
            let days_since = (now - start).num_days();
            let remaining = (TRIAL_DAYS - days_since).max(0);
            (remaining > 0, remaining)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    struct FailingProvider;

    impl EntitlementProvider for FailingProvider {
        async fn entitlements(&self) -> Result<ActiveEntitlements, EntitlementError> {
            Err(EntitlementError("billing offline".to_string()))
        }
    }

    struct LifetimeProvider;

    impl EntitlementProvider for LifetimeProvider {
        async fn entitlements(&self) -> Result<ActiveEntitlements, EntitlementError> {
            Ok(ActiveEntitlements {
                lifetime: true,
                monthly: false,
                monthly_expiration: None,
            })
        }
    }

    #[test]
    fn trial_math() {
        let now = Utc::now();
        assert_eq!(trial_status(None, now), (true, TRIAL_DAYS));
        assert_eq!(trial_status(Some(now - Duration::days(10)), now), (true, 20));
        assert_eq!(trial_status(Some(now - Duration::days(30)), now), (false, 0));
        assert_eq!(trial_status(Some(now - Duration::days(45)), now), (false, 0));
    }

    #[tokio::test]
    async fn initialize_records_first_launch_once() {
        let journal = Journal::new(MemoryStore::new());
        let mut service = EntitlementService::new(&journal, NoProvider);

        service.initialize().await;
        let recorded = journal.store().get(FIRST_LAUNCH_KEY).await.unwrap().unwrap();

        service.initialize().await;
        assert_eq!(
            journal.store().get(FIRST_LAUNCH_KEY).await.unwrap().unwrap(),
            recorded
        );
    }

    #[tokio::test]
    async fn fresh_install_is_in_trial_with_access() {
        let journal = Journal::new(MemoryStore::new());
        let mut service = EntitlementService::new(&journal, NoProvider);
        service.initialize().await;

        let status = service.status().await;
        assert!(!status.is_subscribed);
        assert!(status.is_in_trial);
        assert_eq!(status.trial_days_remaining, TRIAL_DAYS);
        assert!(service.has_access().await);
    }

    #[tokio::test]
    async fn expired_trial_without_subscription_loses_access() {
        let journal = Journal::new(MemoryStore::new());
        let expired = (Utc::now() - Duration::days(40)).to_rfc3339();
        journal
            .store()
            .set(FIRST_LAUNCH_KEY, expired)
            .await
            .unwrap();

        let service = EntitlementService::new(&journal, NoProvider);
        let status = service.status().await;
        assert!(!status.is_in_trial);
        assert_eq!(status.trial_days_remaining, 0);
        assert!(!service.has_access().await);
    }

    #[tokio::test]
    async fn subscription_grants_access_after_trial() {
        let journal = Journal::new(MemoryStore::new());
        let expired = (Utc::now() - Duration::days(40)).to_rfc3339();
        journal
            .store()
            .set(FIRST_LAUNCH_KEY, expired)
            .await
            .unwrap();

        let service = EntitlementService::new(&journal, LifetimeProvider);
        let status = service.status().await;
        assert!(status.is_subscribed);
        assert!(status.is_lifetime);
        assert!(service.has_access().await);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_trial_status() {
        let journal = Journal::new(MemoryStore::new());
        let mut service = EntitlementService::new(&journal, FailingProvider);
        service.initialize().await;

        let status = service.status().await;
        assert!(!status.is_subscribed);
        assert!(status.is_in_trial);
    }
}
