//! Main crawl loop that ties all components together.
//!
//! One GET to the landing page recovers the session; one POST per page
//! request walks the result set; one GET per row fetches the detail page
//! its exhibit link lives on. Each detail response is correlated to its
//! originating row record explicitly, so responses may be processed in any
//! order.
//!
//! Failures split in two tiers: anything that invalidates the whole crawl
//! (landing page, session fields) propagates, while a failure confined to
//! one record is logged and the record skipped.

use reqwest::blocking::Client;
use scraper::Html;

use crate::config::{LANDING_URL, RESULTS_BASE, RESULTS_URL};
use crate::error::Result;
use crate::exhibit::{extract_candidates, resolve};
use crate::http::{get_html, post_form};
use crate::normalize::normalize;
use crate::pagination::pages;
use crate::records::extract_rows;
use crate::session::extract_session;
use crate::types::{FinalRecord, ProvisionalRecord, RecordSink};

/// Counters for one completed crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Result pages fetched.
    pub pages_fetched: u32,

    /// Total records in the result set, per the landing page.
    pub total_records: u32,

    /// Records emitted to the sink.
    pub records_emitted: u64,

    /// Records dropped because their detail fetch or cleanup failed.
    pub records_skipped: u64,
}

/// Crawl the active foreign principals report.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `page_size` - Rows per page request; `None` requests the entire
///   result set as a single page
/// * `sink` - Destination for finished records
///
/// # Returns
/// Crawl counters.
///
/// # Errors
/// Document-level failures (unreachable site, unparseable landing page)
/// and sink failures abort the crawl. Per-record failures do not; they are
/// logged and counted in `records_skipped`.
pub fn crawl(
    client: &Client,
    page_size: Option<u32>,
    sink: &mut dyn RecordSink,
) -> Result<CrawlStats> {
    tracing::info!(url = LANDING_URL, "Fetching landing page");
    let landing = get_html(client, LANDING_URL)?;
    let session = extract_session(&Html::parse_document(&landing))?;
    tracing::info!(
        total_records = session.total_records,
        instance = %session.instance,
        "Session established"
    );

    let mut stats = CrawlStats {
        total_records: session.total_records,
        ..CrawlStats::default()
    };

    let page_size = page_size.unwrap_or(session.total_records);
    for page in pages(&session, session.total_records, page_size) {
        tracing::debug!(first_row = page.first_row, rows = page.rows, "Fetching page");
        let body = post_form(client, RESULTS_URL, &page.form_data())?;
        let rows = extract_rows(&Html::parse_document(&body), &RESULTS_BASE);
        stats.pages_fetched += 1;

        for row in rows {
            match process_record(client, &row) {
                Ok(record) => {
                    sink.emit(&record)?;
                    stats.records_emitted += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        foreign_principal = row.foreign_principal.as_deref().unwrap_or("<unknown>"),
                        "Skipping record"
                    );
                    stats.records_skipped += 1;
                }
            }
        }
    }

    Ok(stats)
}

/// Fetch a row's detail page, resolve its exhibit link, and clean it up.
fn process_record(client: &Client, row: &ProvisionalRecord) -> Result<FinalRecord> {
    let exhibit_url = match row.detail_url.as_deref() {
        Some(detail_url) => {
            let body = get_html(client, detail_url)?;
            let candidates = extract_candidates(&Html::parse_document(&body));
            resolve(
                &candidates,
                row.foreign_principal.as_deref().unwrap_or_default(),
            )?
        }
        None => None,
    };

    normalize(row, exhibit_url.as_deref())
}
