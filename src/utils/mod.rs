use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Generate a timestamp-based id for entities synthesized after a failed
/// remote write. Strictly increasing within the process so two quick submits
/// never collide.
pub fn local_id() -> i64 {
    static LAST: AtomicI64 = AtomicI64::new(0);
    let now = Utc::now().timestamp_millis();
    LAST.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(now.max(last + 1))
    })
    .map(|last| now.max(last + 1))
    .unwrap_or(now)
}

/// Humanize a timestamp relative to now ("just now", "5 minutes ago", ...).
pub fn time_ago(then: DateTime<Utc>) -> String {
    time_ago_at(then, Utc::now())
}

/// Humanize a timestamp relative to an explicit reference instant.
pub fn time_ago_at(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => plural(seconds / 60, "minute"),
        3600..=86399 => plural(seconds / 3600, "hour"),
        86400..=2591999 => plural(seconds / 86400, "day"),
        2592000..=31535999 => plural(seconds / 2592000, "month"),
        _ => plural(seconds / 31536000, "year"),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Configure the `log` facade through fern. Intended for the binary; tests
/// and embedding applications install their own logger.
pub fn setup_logging(level: log::LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn local_ids_are_strictly_increasing() {
        let a = local_id();
        let b = local_id();
        let c = local_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago_at(now, now), "just now");
        assert_eq!(time_ago_at(now - Duration::seconds(59), now), "just now");
        assert_eq!(time_ago_at(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(time_ago_at(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(time_ago_at(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(time_ago_at(now - Duration::days(2), now), "2 days ago");
        assert_eq!(time_ago_at(now - Duration::days(60), now), "2 months ago");
        assert_eq!(time_ago_at(now - Duration::days(800), now), "2 years ago");
    }

    #[test]
    fn time_ago_never_negative() {
        let now = Utc::now();
        // A slightly future timestamp (clock skew) still reads as "just now".
        assert_eq!(time_ago_at(now + Duration::seconds(30), now), "just now");
    }
}
