use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;

use crate::error::{DashboardError, Result};

/// Full English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Naive timestamp layouts accepted in input files, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

// ── Month helpers ─────────────────────────────────────────────────────────────

/// Name of month `month` (1–12). Out-of-range values yield `""`.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
        .unwrap_or("")
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let start = month_start(date);
    start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start)
}

// ── Timezones ─────────────────────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not detect system timezone; using UTC");
        "UTC".to_string()
    })
}

/// Resolve a configured timezone name; `"auto"` means the system zone.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    let resolved = if name.eq_ignore_ascii_case("auto") {
        let system = get_system_timezone();
        tracing::debug!(timezone = %system, "resolved automatic timezone");
        system
    } else {
        name.to_string()
    };
    resolved
        .parse::<Tz>()
        .map_err(|_| DashboardError::Config(format!("unknown timezone '{}'", resolved)))
}

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Parses input timestamps into local wall-clock time.
///
/// Timestamps carrying a UTC offset are converted into the parser's zone so
/// that month boundaries are those of the observing site; naive timestamps
/// are taken as already local.
#[derive(Debug, Clone, Copy)]
pub struct TimestampParser {
    tz: Tz,
}

impl TimestampParser {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build a parser from a timezone name (see [`resolve_timezone`]).
    pub fn from_name(name: &str) -> Result<Self> {
        resolve_timezone(name).map(Self::new)
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Parse `s`, returning `None` for blank or unrecognised input.
    pub fn parse(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = match s.strip_suffix('Z') {
            Some(stripped) => format!("{}+00:00", stripped),
            None => s.to_string(),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&self.tz).naive_local());
        }

        for fmt in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        None
    }
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
