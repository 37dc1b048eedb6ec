//! Time utilities for warden
//!
//! All duty scheduling is wall-clock based: a shift starts now and its task
//! windows are fixed offsets from that start. Time-sensitive operations take
//! `now` as an explicit parameter so tests can fast-forward without sleeping;
//! `now()` here is the single source callers use at the boundary.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `WARDEN_MOCK_TIME` environment variable can be set to
//! override the system time for all time-sensitive operations.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2026-08-23 14:30:00`)

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "WARDEN_MOCK_TIME";

/// Cached mock time offset from the real time when the process started.
/// This allows mock time to advance naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<Duration>> = OnceLock::new();

fn get_mock_time_offset() -> Option<Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                if let Ok(naive_dt) =
                    NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S")
                {
                    if let Some(mock_dt) = Local.from_local_datetime(&naive_dt).single() {
                        let real_now = chrono::Local::now();
                        let offset = mock_dt.signed_duration_since(real_now);
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    } else {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            "Failed to convert mock time to local timezone"
                        );
                    }
                } else {
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        expected_format = "%Y-%m-%d %H:%M:%S",
                        "Invalid mock time format"
                    );
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
///
/// In release builds, this always returns the real system time.
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Format a DateTime the way duty log lines render timestamps.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%d %b %Y, %H:%M:%S").to_string()
}

/// Helper to format durations in human-readable form
pub fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours > 0 && mins > 0 {
        format!("{}h {}m", hours, mins)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_now_returns_time() {
        let t = now();
        assert!(t.year() >= 2020);
        assert!(t.year() <= 2100);
    }

    #[test]
    fn test_format_datetime_full() {
        let dt = Local.with_ymd_and_hms(2026, 3, 14, 14, 30, 45).unwrap();
        assert_eq!(format_datetime_full(&dt), "14 Mar 2026, 14:30:45");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(30), "30m");
        assert_eq!(format_minutes(60), "1h");
        assert_eq!(format_minutes(90), "1h 30m");
        assert_eq!(format_minutes(0), "0m");
    }

    #[test]
    fn test_parse_mock_time_format() {
        let valid = [
            "2026-08-23 14:30:00",
            "2025-01-01 00:00:00",
            "2025-12-31 23:59:59",
        ];
        for s in &valid {
            assert!(
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok(),
                "expected '{}' to parse",
                s
            );
        }
    }

    #[test]
    fn test_parse_mock_time_invalid_formats() {
        let invalid = [
            "2026-08-23",
            "14:30:00",
            "2026/08/23 14:30:00",
            "2026-08-23T14:30:00",
            "",
        ];
        for s in &invalid {
            assert!(
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_err(),
                "expected '{}' to fail parsing",
                s
            );
        }
    }

    #[test]
    fn test_mock_time_env_var_name() {
        assert_eq!(MOCK_TIME_ENV_VAR, "WARDEN_MOCK_TIME");
    }

    #[test]
    fn test_mock_time_inactive_by_default() {
        // OnceLock is process-wide; without the env var set this stays false
        if std::env::var(MOCK_TIME_ENV_VAR).is_err() {
            assert!(!is_mock_time_active());
        }
    }
}
