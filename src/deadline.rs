//! Deadline extraction: an ordered regex list over subject + the first
//! 2000 chars of the body, first match wins.
//!
//! Relative markers resolve to fixed offsets (`today` → 12 h, `tomorrow` →
//! 36 h, `this week` → 72 h, `next week` → 168 h, `N hours/days` → N).
//! Absolute dates resolve against the supplied reference time; anything the
//! loose parser cannot place (weekday names, garbled dates) still reports
//! `found = true` with `hours_remaining = None`.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::decision::DeadlineInfo;

/// Only this much of the body is scanned; deadlines buried deeper than that
/// are newsletter territory.
pub const BODY_SCAN_CHARS: usize = 2000;

static RE_KEYWORD_MONTH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:deadline|due|expires?|expiring|by|before|until)\b[:\s]+((?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?)",
    )
    .expect("month-date deadline regex")
});

static RE_KEYWORD_NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:deadline|due|expires?|expiring|by|before|until)\b[:\s]+(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}(?:/\d{2,4})?)",
    )
    .expect("numeric-date deadline regex")
});

static RE_VERB_BY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:respond|reply|register|submit|rsvp|confirm)\s+by\s+([a-z]+(?:\s+\d{1,2}(?:st|nd|rd|th)?)?(?:,?\s+\d{4})?)",
    )
    .expect("verb-by deadline regex")
});

static RE_RELATIVE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(today|tomorrow|this week|next week)\b").expect("relative marker regex")
});

static RE_RELATIVE_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:within|in)\s+(\d{1,3})\s+(hours?|days?)\b").expect("relative count regex")
});

/// Extract the first deadline expression from `subject` + truncated `body`.
/// Deterministic for a fixed `now`.
pub fn extract_deadline(subject: &str, body: &str, now: DateTime<Utc>) -> DeadlineInfo {
    let mut text = String::with_capacity(subject.len() + BODY_SCAN_CHARS + 1);
    text.push_str(subject);
    text.push(' ');
    text.push_str(truncate_chars(body, BODY_SCAN_CHARS));

    if let Some(caps) = RE_KEYWORD_MONTH_DATE.captures(&text) {
        let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
        return match resolve_absolute(&caps[1], now) {
            Some(h) => DeadlineInfo::resolved(raw, h),
            None => DeadlineInfo::unresolved(raw),
        };
    }

    if let Some(caps) = RE_KEYWORD_NUMERIC_DATE.captures(&text) {
        let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
        return match resolve_absolute(&caps[1], now) {
            Some(h) => DeadlineInfo::resolved(raw, h),
            None => DeadlineInfo::unresolved(raw),
        };
    }

    if let Some(caps) = RE_VERB_BY_DATE.captures(&text) {
        let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
        return match resolve_absolute(&caps[1], now) {
            Some(h) => DeadlineInfo::resolved(raw, h),
            None => DeadlineInfo::unresolved(raw),
        };
    }

    if let Some(caps) = RE_RELATIVE_COUNT.captures(&text) {
        let raw = caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default();
        let n: f32 = caps[1].parse().unwrap_or(0.0);
        let hours = if caps[2].to_lowercase().starts_with("day") {
            n * 24.0
        } else {
            n
        };
        return DeadlineInfo::resolved(raw, hours);
    }

    if let Some(m) = RE_RELATIVE_MARKER.find(&text) {
        let hours = match m.as_str().to_lowercase().as_str() {
            "today" => 12.0,
            "tomorrow" => 36.0,
            "this week" => 72.0,
            _ => 168.0, // next week
        };
        return DeadlineInfo::resolved(m.as_str(), hours);
    }

    DeadlineInfo::none()
}

/// Char-safe prefix (never splits inside a UTF-8 sequence).
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Loose absolute-date parser. Handles `2026-03-05`, `3/5`, `3/5/26`,
/// `March 5`, `March 5th, 2026`. Returns hours from `now` to end of that
/// day (floored at 0 when already past). Weekday names and anything else
/// return `None`.
fn resolve_absolute(raw: &str, now: DateTime<Utc>) -> Option<f32> {
    let cleaned = raw
        .to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .map(strip_ordinal)
        .collect::<Vec<_>>()
        .join(" ");

    let date = parse_iso(&cleaned)
        .or_else(|| parse_slash(&cleaned, now))
        .or_else(|| parse_month_name(&cleaned, now))?;

    let end_of_day = Utc
        .with_ymd_and_hms(date.year(), date.month(), date.day(), 23, 59, 0)
        .single()?;
    let minutes = (end_of_day - now).num_minutes();
    Some((minutes.max(0) as f32) / 60.0)
}

fn strip_ordinal(word: &str) -> String {
    let lower = word.to_lowercase();
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(stem) = lower.strip_suffix(suffix) {
            if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_digit()) {
                return stem.to_string();
            }
        }
    }
    lower
}

fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_slash(s: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    let month: u32 = parts[0].trim().parse().ok()?;
    let day: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = match parts.get(2) {
        Some(y) => {
            let y: i32 = y.trim().parse().ok()?;
            if y < 100 {
                2000 + y
            } else {
                y
            }
        }
        None => now.year(),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(roll_forward_if_past(date, parts.len() == 2, now))
}

fn parse_month_name(s: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let mut words = s.split_whitespace();
    let month_word = words.next()?;
    let month = month_from_name(month_word)?;
    let day: u32 = words.next()?.parse().ok()?;
    let (year, year_given) = match words.next() {
        Some(y) => (y.parse().ok()?, true),
        None => (now.year(), false),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(roll_forward_if_past(date, !year_given, now))
}

/// Dates written without a year ("by March 5") mean the next such date.
fn roll_forward_if_past(date: NaiveDate, year_inferred: bool, now: DateTime<Utc>) -> NaiveDate {
    if year_inferred && date < now.date_naive() {
        date.with_year(date.year() + 1).unwrap_or(date)
    } else {
        date
    }
}

fn month_from_name(word: &str) -> Option<u32> {
    let stem: String = word.chars().take(3).collect();
    Some(match stem.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    })
}
