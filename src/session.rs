//! Form-state extraction from the landing page.
//!
//! The APEX application embeds session-scoped tokens in hidden inputs that
//! must be echoed back verbatim on every paginated POST. Every extraction
//! point here is a hard failure rather than a default: a silent markup
//! change on the site must be caught immediately, not turned into corrupted
//! downstream requests.
//!
//! The tokens could be hardcoded as constants since they rarely change, but
//! extracting them per crawl keeps the harvester working across site
//! updates.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::{FaraError, Result};
use crate::types::SessionContext;

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static FLOW_FORM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"form[id="wwvFlowForm"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static WORKSHEET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[id="apexir_WORKSHEET"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static DATA_PANEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[id="apexir_DATA_PANEL"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static PAGINATION_CAPTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"td.pagination span.fielddata"#).expect("valid selector")
});

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static P_FLOW_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[id="pFlowId"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static P_FLOW_STEP_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[id="pFlowStepId"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static P_INSTANCE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[id="pInstance"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static WORKSHEET_ID: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"input[id="apexir_WORKSHEET_ID"]"#).expect("valid selector")
});

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static REPORT_ID: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"input[id="apexir_REPORT_ID"]"#).expect("valid selector"));

/// Extract the APEX session state from the landing page.
///
/// # Arguments
/// * `doc` - Parsed landing page
///
/// # Returns
/// A `SessionContext` with all five session fields and the total record
/// count.
///
/// # Errors
/// * `EmptySelection` if a required container (the flow form, the
///   worksheet, the data panel, or the pagination caption) is absent
/// * `MissingField` / `MultipleValues` if a hidden session field does not
///   resolve to exactly one value
/// * `UnexpectedFormat` if the "X of Y" caption does not split into
///   exactly two parts around "of", or the suffix is not an integer
pub fn extract_session(doc: &Html) -> Result<SessionContext> {
    let forms = require_containers(doc, &FLOW_FORM, "wwvFlowForm")?;
    let worksheets = require_containers(doc, &WORKSHEET, "apexir_WORKSHEET")?;

    let flow_id = require_single_value(&forms, &P_FLOW_ID, "pFlowId")?;
    let flow_step_id = require_single_value(&forms, &P_FLOW_STEP_ID, "pFlowStepId")?;
    let instance = require_single_value(&forms, &P_INSTANCE, "pInstance")?;

    let worksheet_id = require_single_value(&worksheets, &WORKSHEET_ID, "apexir_WORKSHEET_ID")?;
    let report_id = require_single_value(&worksheets, &REPORT_ID, "apexir_REPORT_ID")?;

    let total_records = extract_total_records(&worksheets)?;

    Ok(SessionContext {
        flow_id,
        flow_step_id,
        instance,
        worksheet_id,
        report_id,
        total_records,
    })
}

/// Select required container nodes, failing if none match.
fn require_containers<'a>(
    doc: &'a Html,
    selector: &Selector,
    name: &str,
) -> Result<Vec<ElementRef<'a>>> {
    let found: Vec<ElementRef<'a>> = doc.select(selector).collect();
    if found.is_empty() {
        return Err(FaraError::EmptySelection(name.to_string()));
    }
    Ok(found)
}

/// Extract the `value` attribute of a hidden input that must match exactly
/// once across the given containers.
fn require_single_value(
    containers: &[ElementRef<'_>],
    selector: &Selector,
    field: &str,
) -> Result<String> {
    let mut values = containers
        .iter()
        .flat_map(|container| container.select(selector))
        .filter_map(|input| input.value().attr("value"));

    match (values.next(), values.next()) {
        (None, _) => Err(FaraError::MissingField(field.to_string())),
        (Some(value), None) => Ok(value.to_string()),
        (Some(_), Some(_)) => Err(FaraError::MultipleValues(field.to_string())),
    }
}

/// Read the total record count from the "X of Y" pagination caption.
fn extract_total_records(worksheets: &[ElementRef<'_>]) -> Result<u32> {
    let panels: Vec<ElementRef<'_>> = worksheets
        .iter()
        .flat_map(|ws| ws.select(&DATA_PANEL))
        .collect();
    if panels.is_empty() {
        return Err(FaraError::EmptySelection("apexir_DATA_PANEL".to_string()));
    }

    let captions: Vec<String> = panels
        .iter()
        .flat_map(|panel| panel.select(&PAGINATION_CAPTION))
        .flat_map(|span| span.text())
        .map(str::to_string)
        .collect();
    if captions.is_empty() {
        return Err(FaraError::EmptySelection(
            "fielddata (total records caption)".to_string(),
        ));
    }
    if captions.len() != 1 {
        return Err(FaraError::UnexpectedFormat {
            context: "total records caption".to_string(),
            value: captions.join(" | "),
        });
    }

    let caption = captions[0].trim();
    let parts: Vec<&str> = caption.split("of").collect();
    if parts.len() != 2 {
        return Err(FaraError::UnexpectedFormat {
            context: "total records caption".to_string(),
            value: caption.to_string(),
        });
    }

    parts[1]
        .trim()
        .parse::<u32>()
        .map_err(|_| FaraError::UnexpectedFormat {
            context: "total records count".to_string(),
            value: parts[1].trim().to_string(),
        })
}
