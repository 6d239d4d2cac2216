//! Final cleanup of extracted records.
//!
//! Free-text cells come back with non-breaking spaces (both the raw
//! character and the literal ` ` escape the site sometimes renders)
//! and stray whitespace. Cleanup never produces an empty string: a field
//! that reduces to blank is unset.

use chrono::{NaiveDate, NaiveTime};

use crate::config::DATE_PATTERN;
use crate::error::{FaraError, Result};
use crate::types::{FinalRecord, ProvisionalRecord};

/// Clean a free-text field.
///
/// Replaces non-breaking spaces (both encoded forms) with a plain space
/// and trims. An all-whitespace result is `None`, never `""`.
pub fn clean_text(field: &str) -> Option<String> {
    let replaced = field.replace("\\u00a0", " ").replace('\u{a0}', " ");
    let trimmed = replaced.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a site date (MM/DD/YYYY, 2-digit month and day).
///
/// # Errors
/// `DateFormat` if the string does not match the pattern or is not a real
/// calendar date.
pub fn parse_mmddyyyy(date: &str) -> Result<NaiveDate> {
    if !DATE_PATTERN.is_match(date) {
        return Err(FaraError::DateFormat(date.to_string()));
    }
    NaiveDate::parse_from_str(date, "%m/%d/%Y")
        .map_err(|_| FaraError::DateFormat(date.to_string()))
}

/// Convert a site date to an ISO-8601 timestamp at midnight UTC.
pub fn to_iso8601(date: &str) -> Result<String> {
    let parsed = parse_mmddyyyy(date)?;
    Ok(parsed.and_time(NaiveTime::MIN).and_utc().to_rfc3339())
}

/// Produce the final record from a provisional one plus its resolved
/// exhibit URL.
///
/// Address lines are joined with `", "` before cleanup. Every field
/// defaults to `None` when nothing was found upstream or cleanup reduced
/// it to blank.
///
/// # Errors
/// `DateFormat` if the registration date is present but malformed. A
/// malformed date here means an extraction bug upstream, not bad data, so
/// it is a hard failure.
pub fn normalize(record: &ProvisionalRecord, exhibit_url: Option<&str>) -> Result<FinalRecord> {
    let address = if record.address.is_empty() {
        None
    } else {
        clean_text(&record.address.join(", "))
    };

    let date = match record.date.as_deref().and_then(clean_text) {
        Some(raw) => Some(to_iso8601(&raw)?),
        None => None,
    };

    Ok(FinalRecord {
        url: record.url.as_deref().and_then(clean_text),
        foreign_principal: record.foreign_principal.as_deref().and_then(clean_text),
        address,
        country: record.country.as_deref().and_then(clean_text),
        state: record.state.as_deref().and_then(clean_text),
        registrant: record.registrant.as_deref().and_then(clean_text),
        reg_num: record.reg_num.as_deref().and_then(clean_text),
        date,
        exhibit_url: exhibit_url.and_then(clean_text),
    })
}
