//! Core data types for the harvester.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// APEX session state recovered from the landing page.
///
/// The site embeds session-scoped tokens in hidden inputs that must be
/// echoed back verbatim on every paginated POST. Created once per crawl and
/// never mutated; each [`PageRequest`](crate::pagination::PageRequest)
/// carries its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// APEX application id (`pFlowId`).
    pub flow_id: String,

    /// APEX page id (`pFlowStepId`).
    pub flow_step_id: String,

    /// APEX session instance (`pInstance`).
    pub instance: String,

    /// Interactive report worksheet id (`apexir_WORKSHEET_ID`).
    pub worksheet_id: String,

    /// Interactive report id (`apexir_REPORT_ID`).
    pub report_id: String,

    /// Total number of records in the result set, from the "X of Y"
    /// pagination caption.
    pub total_records: u32,
}

/// One result-table row, before the detail-page fetch and cleanup.
///
/// Every field is best-effort: a missing cell leaves `None` (or an empty
/// address), never an error. Partial records are still useful.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionalRecord {
    /// Stable detail-page URL with the session segment blanked.
    pub url: Option<String>,

    /// Detail-page URL as found in the row, session segment intact.
    /// Used for the follow-up fetch; not emitted.
    pub detail_url: Option<String>,

    /// Foreign principal name.
    pub foreign_principal: Option<String>,

    /// Address lines in row order; joined with `", "` at normalization.
    pub address: Vec<String>,

    /// US state, where applicable.
    pub state: Option<String>,

    /// Registrant name.
    pub registrant: Option<String>,

    /// Registration number.
    pub reg_num: Option<String>,

    /// Registration date as shown on the site (MM/DD/YYYY).
    pub date: Option<String>,

    /// Country, resolved through the repeat-heading indirection.
    pub country: Option<String>,
}

/// One exhibit link candidate from a record's detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExhibitCandidate {
    /// Date the exhibit was stamped (MM/DD/YYYY).
    pub date: Option<String>,

    /// Foreign principal name displayed on the link.
    pub foreign_principal: Option<String>,

    /// Exhibit document URL.
    pub url: Option<String>,
}

/// A fully cleaned record, ready for the sink.
///
/// Unset fields serialize as `null`, never as `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRecord {
    /// Stable detail-page URL.
    pub url: Option<String>,

    /// Foreign principal name.
    pub foreign_principal: Option<String>,

    /// Address, lines joined with `", "`.
    pub address: Option<String>,

    /// Country of the foreign principal.
    pub country: Option<String>,

    /// US state, where applicable.
    pub state: Option<String>,

    /// Registrant name.
    pub registrant: Option<String>,

    /// Registration number.
    pub reg_num: Option<String>,

    /// Registration date as an ISO-8601 timestamp at midnight UTC.
    pub date: Option<String>,

    /// URL of the best-matching exhibit document.
    pub exhibit_url: Option<String>,
}

/// Destination for finished records.
pub trait RecordSink {
    /// Emit one final record. Records are terminal; the sink must not hand
    /// them back for further mutation.
    fn emit(&mut self, record: &FinalRecord) -> Result<()>;
}

/// Sink writing one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &FinalRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Sink collecting records in memory. Useful for tests and for callers
/// that post-process the full result set.
#[derive(Debug, Default)]
pub struct VecSink {
    pub records: Vec<FinalRecord>,
}

impl RecordSink for VecSink {
    fn emit(&mut self, record: &FinalRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
