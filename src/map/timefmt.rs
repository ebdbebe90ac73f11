//! The feed's fixed `DD.MM.YY HH:MM` timestamp grammar.

use chrono::{Local, NaiveDateTime};

pub const SEEN_FORMAT: &str = "%d.%m.%y %H:%M";

#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Parsed(NaiveDateTime),
    Invalid { input: String, reason: String },
}

impl ParseResult {
    pub fn ok(&self) -> Option<NaiveDateTime> {
        match self {
            ParseResult::Parsed(at) => Some(*at),
            ParseResult::Invalid { .. } => None,
        }
    }
}

/// Parse a `firstSeen`/`lastSeen` label. Never panics.
pub fn parse_seen(text: &str) -> ParseResult {
    match NaiveDateTime::parse_from_str(text.trim(), SEEN_FORMAT) {
        Ok(at) => ParseResult::Parsed(at),
        Err(err) => ParseResult::Invalid {
            input: text.to_string(),
            reason: err.to_string(),
        },
    }
}

/// Source of "now" for the time window
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in local time, matching how the feed labels are written
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Pinned "now" for tests
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
