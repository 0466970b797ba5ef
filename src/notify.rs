//! Daily reminder plumbing: `HH:MM` parsing, next-occurrence math, and the
//! scheduler seam. Scheduling is fire-and-forget; a platform shell supplies
//! the real delivery mechanism.

use chrono::{DateTime, Duration, Local, NaiveTime};
use tracing::{debug, info};

use crate::error::JournalError;
use crate::journal::Journal;
use crate::store::KeyValueStore;

pub fn parse_time(raw: &str) -> Result<NaiveTime, JournalError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| JournalError::InvalidTime(raw.to_string()))
}

/// Seconds until the next occurrence of `at`: later today, or tomorrow if the
/// time has already passed. Never less than 1.
pub fn seconds_until_next(now: DateTime<Local>, at: NaiveTime) -> i64 {
    let now_naive = now.naive_local();
    let mut target = now.date_naive().and_time(at);
    if target <= now_naive {
        target = target + Duration::days(1);
    }
    (target - now_naive).num_seconds().max(1)
}

/// Consumes one daily time; any prior schedule is replaced.
pub trait NotificationScheduler {
    fn schedule_daily(&self, at: NaiveTime);
    fn cancel_all(&self);
}

/// Process-local stand-in that only reports what would be scheduled.
pub struct LogScheduler;

impl NotificationScheduler for LogScheduler {
    fn schedule_daily(&self, at: NaiveTime) {
        self.cancel_all();
        let seconds = seconds_until_next(Local::now(), at);
        info!(
            time = %at.format("%H:%M"),
            seconds_until_first = seconds,
            "daily check-in reminder scheduled"
        );
    }

    fn cancel_all(&self) {
        debug!("cancelled any scheduled reminders");
    }
}

/// Re-arm the reminder from the stored time, if one is set. Failures are
/// logged upstream and never surface here.
pub async fn initialize_notifications<S: KeyValueStore>(
    journal: &Journal<S>,
    scheduler: &impl NotificationScheduler,
) {
    match journal.notification_time().await {
        Some(at) => scheduler.schedule_daily(at),
        None => debug!("no reminder time configured"),
    }
}
