//! Weekly operation schedule parsing and open/closed evaluation.
//!
//! Schedules are delimited strings in the form the hospital dataset uses:
//!
//! ```text
//! Segunda-Sexta: 08:00 às 18:00, Sábado: 08:00 às 12:00
//! ```
//!
//! Entries are comma-separated. `<days>` is a single Portuguese day name
//! or a hyphenated inclusive range; times are 24-hour `HH:MM` local values.
//! Day indices follow the dataset convention: Sunday = 0 through
//! Saturday = 6. Parsing is best-effort: a malformed entry is skipped and
//! never aborts evaluation of the rest.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use log::debug;
use serde::{Deserialize, Serialize};

/// Lowercase and strip the accents that occur in Portuguese day names,
/// so `Sábado` and `sabado` parse the same.
pub(crate) fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            _ => c,
        })
        .collect()
}

/// Map a normalized Portuguese day name to its index (Sunday = 0).
fn day_index(name: &str) -> Option<u8> {
    match name {
        "domingo" => Some(0),
        "segunda" => Some(1),
        "terca" => Some(2),
        "quarta" => Some(3),
        "quinta" => Some(4),
        "sexta" => Some(5),
        "sabado" => Some(6),
        _ => None,
    }
}

/// Parse "HH:MM" into minutes since midnight.
fn parse_time(text: &str) -> Option<u16> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let hours: u16 = hours.trim().parse().ok()?;
    let minutes: u16 = minutes.trim().parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

// ============================================================================
// Schedule Types
// ============================================================================

/// One parsed schedule entry: an inclusive day range and a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// First day of the range (Sunday = 0)
    pub start_day: u8,
    /// Last day of the range, inclusive
    pub end_day: u8,
    /// Opening time in minutes since midnight
    pub open: u16,
    /// Closing time in minutes since midnight, inclusive
    pub close: u16,
}

impl ScheduleEntry {
    /// Parse a single `<days>: <start> às <end>` entry.
    fn parse(raw: &str) -> Option<Self> {
        // Split on the FIRST colon only - the times contain colons too
        let (days, hours) = raw.split_once(':')?;

        let (start, end) = hours.split_once(" às ")?;
        let open = parse_time(start)?;
        let close = parse_time(end)?;

        // "Segunda-feira" and "Segunda" are the same day
        let days = normalize(days).replace("-feira", "");
        let (start_day, end_day) = match days.split_once('-') {
            Some((first, last)) => (day_index(first.trim())?, day_index(last.trim())?),
            None => {
                let day = day_index(days.trim())?;
                (day, day)
            }
        };

        Some(Self {
            start_day,
            end_day,
            open,
            close,
        })
    }

    /// Whether `day` (Sunday = 0) falls in this entry's range.
    ///
    /// Ranges that wrap the week boundary ("Sábado-Domingo") are matched
    /// modularly; the app this was ported from silently never matched them.
    fn matches_day(&self, day: u8) -> bool {
        if self.start_day <= self.end_day {
            day >= self.start_day && day <= self.end_day
        } else {
            day >= self.start_day || day <= self.end_day
        }
    }

    fn matches(&self, day: u8, minutes: u16) -> bool {
        self.matches_day(day) && minutes >= self.open && minutes <= self.close
    }
}

/// A parsed weekly operation schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSchedule {
    entries: Vec<ScheduleEntry>,
}

impl OperationSchedule {
    /// Parse a schedule string, skipping malformed entries.
    ///
    /// Never fails: an unparseable entry degrades to "not matched" so a
    /// typo in one hospital's hours cannot take down the whole evaluation.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .filter_map(|part| {
                let entry = ScheduleEntry::parse(part);
                if entry.is_none() {
                    debug!("[OperationSchedule] skipping malformed entry: {part:?}");
                }
                entry
            })
            .collect();

        Self { entries }
    }

    /// Parsed entries, in dataset order.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Whether the location is open at the given local timestamp.
    ///
    /// Open if ANY entry matches both the weekday and the time window.
    /// Pure: same schedule and timestamp always yield the same answer.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        let day = now.weekday().num_days_from_sunday() as u8;
        let minutes = (now.hour() * 60 + now.minute()) as u16;
        self.entries.iter().any(|e| e.matches(day, minutes))
    }

    /// Whether the location is open right now (device-local time).
    pub fn is_open_now(&self) -> bool {
        self.is_open_at(Local::now().naive_local())
    }
}

// ============================================================================
// Tests
// ============================================================================
