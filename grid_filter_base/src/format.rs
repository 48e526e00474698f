//! Date formatting for chip labels
//!
//! Patterns use chrono's strftime syntax. The first pattern formats, every
//! pattern is tried when parsing.

use crate::execution::comparisons::FilterComparator;
use crate::execution::type_helper;
use crate::types::common::SemanticType;
use crate::types::condition::FilterCondition;
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::fmt::Write;

pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatter {
    patterns: Vec<String>,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_DATE_PATTERN.to_string()],
        }
    }
}

impl DateFormatter {
    /// Formatter over the given patterns. Invalid patterns are dropped; with
    /// none left the ISO pattern is used.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(Into::into)
            .filter(|pattern| {
                let valid = is_valid_pattern(pattern);
                if !valid {
                    log::warn!("Ignoring invalid date pattern '{}'", pattern);
                }
                valid
            })
            .collect();

        if patterns.is_empty() {
            Self::default()
        } else {
            Self { patterns }
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        if let Some(pattern) = self.patterns.first() {
            let mut out = String::new();
            if write!(out, "{}", date.format(pattern)).is_ok() {
                return out;
            }
        }

        date.format(DEFAULT_DATE_PATTERN).to_string()
    }

    /// Formatted date, a space, then the time of day (seconds only when set)
    pub fn format_date_time(&self, date_time: NaiveDateTime) -> String {
        let time = if date_time.second() == 0 && date_time.nanosecond() == 0 {
            date_time.format("%H:%M")
        } else {
            date_time.format("%H:%M:%S")
        };

        format!("{} {}", self.format_date(date_time.date()), time)
    }

    /// Parse with each pattern in turn
    pub fn parse_date(&self, s: &str) -> Option<NaiveDate> {
        self.patterns
            .iter()
            .find_map(|pattern| NaiveDate::parse_from_str(s.trim(), pattern).ok())
    }

    /// Chip text: field, comparator and the value, with dates formatted
    pub fn condition_label<R>(&self, condition: &FilterCondition<R>) -> String {
        let value = self.format_input(
            condition.field().value_type(),
            condition.comparator(),
            condition.raw_input(),
        );

        format!(
            "{} {} {}",
            condition.field().description(),
            condition.comparator(),
            value
        )
    }

    fn format_input(&self, value_type: SemanticType, comparator: FilterComparator, raw: &str) -> String {
        match value_type {
            SemanticType::Date if comparator.is_range() => {
                let dates = type_helper::split_range(raw)
                    .ok()
                    .and_then(|(start, end)| {
                        Some((type_helper::parse_date(start)?, type_helper::parse_date(end)?))
                    });

                match dates {
                    Some((start, end)) => {
                        format!("{} and {}", self.format_date(start), self.format_date(end))
                    }
                    None => raw.to_string(),
                }
            }
            SemanticType::Date => type_helper::parse_date(raw)
                .map(|date| self.format_date(date))
                .unwrap_or_else(|| raw.to_string()),
            SemanticType::DateTime => type_helper::parse_date_time(raw)
                .map(|date_time| self.format_date_time(date_time))
                .unwrap_or_else(|| raw.to_string()),
            _ => raw.to_string(),
        }
    }
}

fn is_valid_pattern(pattern: &str) -> bool {
    !pattern.trim().is_empty() && !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}
