//! Periodic live-session reminder fan-out.
//!
//! Every ten minutes, batches whose `live_start_time` falls roughly one hour
//! out get a reminder row per enrolled student. The insert skips students
//! who already hold a notification for that (batch, live_start_time), so a
//! session matching the window on two consecutive polls is announced once.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::time::Duration as StdDuration;
use tracing::{error, info};

use crate::state::AppState;

const POLL_INTERVAL_SECS: u64 = 600;

/// The scan window: sessions starting between 50 and 60 minutes from `now`.
pub fn reminder_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let upper = now + Duration::hours(1);
    let lower = upper - Duration::minutes(10);
    (lower, upper)
}

pub fn spawn_live_session_reminder(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(StdDuration::from_secs(POLL_INTERVAL_SECS));
        loop {
            interval.tick().await;
            if let Err(e) = run_once(&state.db).await {
                error!(error = ?e, "Live session reminder poll failed");
            }
        }
    });
}

async fn run_once(db: &PgPool) -> Result<(), sqlx::Error> {
    let (lower, upper) = reminder_window(Utc::now());

    let result = sqlx::query(
        "INSERT INTO notifications (user_id, batch_id, message, live_start_time)
         SELECT sb.student_id, b.id,
                'Your live session will start in 1 hour. Link: ' || COALESCE(b.live_link, ''),
                b.live_start_time
         FROM batches b
         JOIN student_batches sb ON sb.batch_id = b.id
         WHERE b.live_start_time >= $1 AND b.live_start_time <= $2
           AND NOT EXISTS (
               SELECT 1 FROM notifications n
               WHERE n.user_id = sb.student_id
                 AND n.batch_id = b.id
                 AND n.live_start_time = b.live_start_time
           )",
    )
    .bind(lower)
    .bind(upper)
    .execute(db)
    .await?;

    if result.rows_affected() > 0 {
        info!(
            notifications = result.rows_affected(),
            "Created live session reminders"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_window_spans_the_poll_interval() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let (lower, upper) = reminder_window(now);

        assert_eq!(upper, now + Duration::hours(1));
        assert_eq!(upper - lower, Duration::minutes(10));
    }

    #[test]
    fn test_session_an_hour_out_is_inside_the_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let (lower, upper) = reminder_window(now);

        let session = now + Duration::minutes(55);
        assert!(session >= lower && session <= upper);

        let too_soon = now + Duration::minutes(30);
        assert!(too_soon < lower);

        let too_far = now + Duration::minutes(90);
        assert!(too_far > upper);
    }
}
