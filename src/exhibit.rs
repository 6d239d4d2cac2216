//! Exhibit link extraction and disambiguation.
//!
//! A record's detail page lists the documents filed for that registration.
//! Zero or one "Exhibit AB" link is the easy case; when several exist the
//! harvester picks one by name similarity to the foreign principal, using
//! filing recency only to break ties.

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{Html, Selector};
use textdistance::nstr::ratcliff_obershelp;

use crate::error::Result;
use crate::normalize::parse_mmddyyyy;
use crate::types::ExhibitCandidate;

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static DATA_PANEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[id="apexir_DATA_PANEL"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static WORKSHEET_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.apexir_WORKSHEET_DATA").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static DATA_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr.even, tr.odd").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static DATE_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[headers="DATE_STAMPED"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static EXHIBIT_ANCHOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"td[headers="DOCLINK"] a[target*="Exhibit"]"#).expect("valid selector")
});

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static EXHIBIT_ANCHOR_NAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"td[headers="DOCLINK"] a[target*="Exhibit"] span"#)
        .expect("valid selector")
});

/// Extract exhibit link candidates from a record's detail page.
///
/// One candidate per document row; rows whose link is not an Exhibit (or
/// that have no link at all) still yield a candidate with `url: None`, so
/// the zero/one/many distinction below sees the same row count the site
/// shows.
pub fn extract_candidates(doc: &Html) -> Vec<ExhibitCandidate> {
    doc.select(&DATA_PANEL)
        .flat_map(|panel| panel.select(&WORKSHEET_TABLE))
        .flat_map(|table| table.select(&DATA_ROW))
        .map(|row| ExhibitCandidate {
            date: row
                .select(&DATE_CELL)
                .next()
                .and_then(|cell| cell.text().next())
                .map(String::from),
            foreign_principal: row
                .select(&EXHIBIT_ANCHOR_NAME)
                .next()
                .and_then(|span| span.text().next())
                .map(String::from),
            url: row
                .select(&EXHIBIT_ANCHOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(String::from),
        })
        .collect()
}

/// A candidate that survived URL filtering, ready to rank.
struct Scored<'a> {
    date: NaiveDate,
    score: f64,
    url: &'a str,
}

/// Select the exhibit URL for a record.
///
/// * Zero candidates: no exhibit was filed, `None`.
/// * One candidate: its URL verbatim, even when that is itself `None`.
/// * Many candidates: candidates without a URL are dropped, the rest are
///   scored against `principal` with a Ratcliff/Obershelp sequence-matching
///   ratio and sorted twice, both stable and descending: first by stamped
///   date, then by score. The second sort dominates, so the visible
///   contract is "highest score wins, the most recent date breaks score
///   ties". Do not collapse this into a single comparator without
///   preserving that precedence.
///
/// # Errors
/// `DateFormat` if a ranked candidate's stamped date does not parse as
/// MM/DD/YYYY.
pub fn resolve(candidates: &[ExhibitCandidate], principal: &str) -> Result<Option<String>> {
    match candidates {
        [] => Ok(None),
        [only] => Ok(only.url.clone()),
        _ => {
            let mut scored = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                let Some(url) = candidate.url.as_deref() else {
                    continue;
                };
                let name = candidate.foreign_principal.as_deref().unwrap_or_default();
                let date = parse_mmddyyyy(candidate.date.as_deref().unwrap_or_default())?;
                scored.push(Scored {
                    date,
                    score: ratcliff_obershelp(name, principal),
                    url,
                });
            }

            scored.sort_by(|a, b| b.date.cmp(&a.date));
            scored.sort_by(|a, b| b.score.total_cmp(&a.score));

            Ok(scored.first().map(|best| best.url.to_string()))
        }
    }
}
