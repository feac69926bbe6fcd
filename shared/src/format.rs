//! Human readable strings shared by the status bar, the progress modal and the CLI.

use chrono::{DateTime, Utc};

use crate::models::{SyncState, SyncStatus};

/// "about 45s", "about 2m", "about 2m 5s"; `-` when there is no estimate.
///
/// Fractional estimates round to the nearest second.
pub fn format_remaining(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s >= 0.5 => s.round() as u64,
        _ => return "-".to_string(),
    };
    if seconds < 60 {
        return format!("about {}s", seconds);
    }
    let minutes = seconds / 60;
    let rest = seconds % 60;
    if rest == 0 {
        format!("about {}m", minutes)
    } else {
        format!("about {}m {}s", minutes, rest)
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{:.0}%", percentage.clamp(0.0, 100.0))
}

/// One-line summary of the sync job for the status bar.
pub fn status_line(status: Option<&SyncStatus>) -> String {
    let Some(status) = status else {
        return "Up to date".to_string();
    };
    match status.state {
        SyncState::InProgress => format!(
            "Syncing... {} ({}/{})",
            format_percentage(status.progress.percentage),
            status.progress.synced,
            status.progress.total
        ),
        SyncState::Unrecognized => "Syncing...".to_string(),
        SyncState::Failed => "Sync failed".to_string(),
        SyncState::Idle | SyncState::Completed => "Up to date".to_string(),
    }
}

/// "just now", "5 minutes ago", "3 hours ago", "2 days ago".
pub fn format_relative(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(time);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if elapsed.num_hours() < 24 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SyncKind, SyncProgress};
    use chrono::Duration;

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(None), "-");
        assert_eq!(format_remaining(Some(0.0)), "-");
        assert_eq!(format_remaining(Some(45.0)), "about 45s");
        assert_eq!(format_remaining(Some(120.0)), "about 2m");
        assert_eq!(format_remaining(Some(125.0)), "about 2m 5s");
        assert_eq!(format_remaining(Some(12.5)), "about 13s");
        assert_eq!(format_remaining(Some(-3.0)), "-");
        assert_eq!(format_remaining(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(None), "Up to date");

        let mut status = SyncStatus {
            sync_id: "s".to_string(),
            state: SyncState::InProgress,
            kind: SyncKind::Initial,
            progress: SyncProgress {
                total: 20,
                synced: 11,
                classified: 3,
                percentage: 55.4,
            },
            started_at: None,
            completed_at: None,
            estimated_remaining: None,
        };
        assert_eq!(status_line(Some(&status)), "Syncing... 55% (11/20)");

        status.state = SyncState::Failed;
        assert_eq!(status_line(Some(&status)), "Sync failed");

        status.state = SyncState::Completed;
        assert_eq!(status_line(Some(&status)), "Up to date");
    }

    #[test]
    fn test_format_relative() {
        let now = Utc::now();
        assert_eq!(format_relative(now, now), "just now");
        assert_eq!(format_relative(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_relative(now - Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_relative(now - Duration::days(2), now), "2 days ago");
    }
}
