//! FARA Harvester - crawl active foreign principal disclosures.
//!
//! This crate crawls the FARA eFile site (an Oracle APEX application) and
//! extracts one structured record per active foreign principal: name,
//! address, country, registrant, registration number and date, and the
//! best-matching exhibit document.
//!
//! # Example
//!
//! ```
//! use fara_harvester::pagination::pages;
//! use fara_harvester::types::SessionContext;
//!
//! let session = SessionContext {
//!     flow_id: "171".to_string(),
//!     flow_step_id: "130".to_string(),
//!     instance: "3143043848609".to_string(),
//!     worksheet_id: "4315901912389".to_string(),
//!     report_id: "4316501916389".to_string(),
//!     total_records: 25,
//! };
//!
//! // Three page requests cover 25 rows at 10 per page.
//! assert_eq!(pages(&session, 25, 10).count(), 3);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Endpoint constants and shared patterns
//! - [`error`]: Error types and Result alias
//! - [`http`]: Blocking HTTP client with retry
//! - [`types`]: Core data types and the record sink
//! - [`session`]: APEX form-state extraction from the landing page
//! - [`pagination`]: Page request building
//! - [`records`]: Result-row extraction
//! - [`exhibit`]: Exhibit link extraction and disambiguation
//! - [`normalize`]: Field cleanup and date canonicalization
//! - [`harvester`]: Main crawl loop
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod exhibit;
pub mod harvester;
pub mod http;
pub mod normalize;
pub mod pagination;
pub mod records;
pub mod session;
pub mod types;

// Re-export main entry point
pub use harvester::{crawl, CrawlStats};

// Re-export commonly used items
pub use error::{FaraError, Result};
pub use types::{ExhibitCandidate, FinalRecord, ProvisionalRecord, RecordSink, SessionContext};
