//! Record extraction from worksheet result pages.
//!
//! Every per-row field is best-effort: detail quality varies across the
//! result set and a partial record is still worth emitting. Cleanup happens
//! later, in [`crate::normalize`].

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::types::ProvisionalRecord;

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static DATA_PANEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"div[id="apexir_DATA_PANEL"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static WORKSHEET_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.apexir_WORKSHEET_DATA").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static DATA_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr.odd, tr.even").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static ANY_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static LINK_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[headers*="LINK"] a"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static NAME_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[headers*="FP_NAME"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static ADDRESS_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[headers*="ADDRESS_1"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static STATE_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[headers*="STATE"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static REGISTRANT_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[headers*="REGISTRANT"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static REG_NUMBER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[headers*="REG_NUMBER"]"#).expect("valid selector"));

#[allow(clippy::expect_used)] // Static selector that is guaranteed to be valid
static REG_DATE_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"td[headers*="FP_REG_DATE"]"#).expect("valid selector"));

/// Extract provisional records from one page of worksheet data.
///
/// # Arguments
/// * `doc` - Parsed result page
/// * `base` - URL the page was fetched from, for resolving row links
///
/// # Returns
/// One `ProvisionalRecord` per data row. Rows without any `td` cell
/// (repeat headings, control rows) are skipped.
pub fn extract_rows(doc: &Html, base: &Url) -> Vec<ProvisionalRecord> {
    doc.select(&DATA_PANEL)
        .flat_map(|panel| panel.select(&WORKSHEET_TABLE))
        .flat_map(|table| table.select(&DATA_ROW))
        .filter(|row| row.select(&ANY_CELL).next().is_some())
        .map(|row| extract_row(row, doc, base))
        .collect()
}

/// Extract one table row into a provisional record.
fn extract_row(row: ElementRef<'_>, doc: &Html, base: &Url) -> ProvisionalRecord {
    let partial_url = row
        .select(&LINK_ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"));

    ProvisionalRecord {
        url: partial_url.and_then(|href| stable_url(href, base)),
        detail_url: partial_url.and_then(|href| base.join(href).ok().map(String::from)),
        foreign_principal: first_text(row, &NAME_CELL),
        address: all_text(row, &ADDRESS_CELL),
        state: first_text(row, &STATE_CELL),
        registrant: first_text(row, &REGISTRANT_CELL),
        reg_num: first_text(row, &REG_NUMBER_CELL),
        date: first_text(row, &REG_DATE_CELL),
        country: resolve_country(row, doc),
    }
}

/// Build a session-independent absolute URL from a row link.
///
/// APEX links carry the session instance as the third `:`-separated
/// segment of the `p` argument; blanking it makes the link stable across
/// crawls.
fn stable_url(href: &str, base: &Url) -> Option<String> {
    let mut segments: Vec<&str> = href.split(':').collect();
    if segments.len() < 3 {
        return None;
    }
    segments[2] = "";
    let stripped = segments.join(":");
    base.join(&stripped).ok().map(String::from)
}

/// Resolve the row's country through the repeat-heading indirection.
///
/// The table does not put country on the row itself. Instead the name
/// cell's `headers` attribute carries a per-country numeric suffix that
/// matches a page-level `BREAK_COUNTRY_NAME_<n>` heading holding the
/// human-readable name. A missing heading leaves country unset; the record
/// is still useful without it.
fn resolve_country(row: ElementRef<'_>, doc: &Html) -> Option<String> {
    let headers = row
        .select(&NAME_CELL)
        .next()
        .and_then(|cell| cell.value().attr("headers"))?;
    let suffix = headers.split(' ').nth(1)?.rsplit('_').next()?;

    let heading = Selector::parse(&format!(
        r#"th.apexir_REPEAT_HEADING[id="BREAK_COUNTRY_NAME_{suffix}"] span"#
    ))
    .ok()?;
    doc.select(&heading)
        .next()
        .and_then(|span| span.text().next())
        .map(String::from)
}

/// First text node of the first cell matching `selector` within the row.
fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .and_then(|cell| cell.text().next())
        .map(String::from)
}

/// All text nodes of the first cell matching `selector` within the row.
///
/// `<br>`-separated address lines come back as one entry per line.
fn all_text(row: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    row.select(selector)
        .next()
        .map(|cell| cell.text().map(String::from).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"<html><body>
<div id="apexir_DATA_PANEL">
<table class="apexir_WORKSHEET_DATA">
  <tr><th class="apexir_REPEAT_HEADING" id="BREAK_COUNTRY_NAME_42"><span>AZERBAIJAN</span></th></tr>
  <tr class="odd">
    <td headers="LINK"><a href="f?p=171:200:3143043848609::NO::P200_REG_NUMBER,P200_DOC_TYPE:5945,Exhibit%20AB">View</a></td>
    <td headers="FP_NAME BREAK_COUNTRY_NAME_42">Republic of Azerbaijan</td>
    <td headers="ADDRESS_1 BREAK_COUNTRY_NAME_42">40 Khagani St.<br>Baku</td>
    <td headers="STATE BREAK_COUNTRY_NAME_42"></td>
    <td headers="REGISTRANT BREAK_COUNTRY_NAME_42">Tool Shed Group, LLC</td>
    <td headers="REG_NUMBER BREAK_COUNTRY_NAME_42">5945</td>
    <td headers="FP_REG_DATE BREAK_COUNTRY_NAME_42">07/03/2014</td>
  </tr>
  <tr class="even">
    <td headers="LINK"></td>
    <td headers="FP_NAME BREAK_COUNTRY_NAME_99">Unheaded Principal</td>
    <td headers="ADDRESS_1 BREAK_COUNTRY_NAME_99"></td>
    <td headers="STATE BREAK_COUNTRY_NAME_99">TX</td>
    <td headers="REGISTRANT BREAK_COUNTRY_NAME_99"></td>
    <td headers="REG_NUMBER BREAK_COUNTRY_NAME_99">6012</td>
    <td headers="FP_REG_DATE BREAK_COUNTRY_NAME_99">01/15/2017</td>
  </tr>
</table>
</div>
</body></html>"#;

    fn base() -> Url {
        Url::parse("https://efile.fara.gov/pls/apex/wwv_flow.show").unwrap()
    }

    #[test]
    fn test_extracts_one_record_per_data_row() {
        let doc = Html::parse_document(RESULTS_PAGE);
        let rows = extract_rows(&doc, &base());
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_row_fields() {
        let doc = Html::parse_document(RESULTS_PAGE);
        let rows = extract_rows(&doc, &base());
        let row = &rows[0];

        assert_eq!(
            row.foreign_principal.as_deref(),
            Some("Republic of Azerbaijan")
        );
        assert_eq!(row.address, vec!["40 Khagani St.", "Baku"]);
        assert_eq!(row.registrant.as_deref(), Some("Tool Shed Group, LLC"));
        assert_eq!(row.reg_num.as_deref(), Some("5945"));
        assert_eq!(row.date.as_deref(), Some("07/03/2014"));
        // Empty cell has no text node at all
        assert_eq!(row.state, None);
    }

    #[test]
    fn test_stable_url_blanks_session_segment() {
        let doc = Html::parse_document(RESULTS_PAGE);
        let rows = extract_rows(&doc, &base());

        assert_eq!(
            rows[0].url.as_deref(),
            Some("https://efile.fara.gov/pls/apex/f?p=171:200:::NO::P200_REG_NUMBER,P200_DOC_TYPE:5945,Exhibit%20AB")
        );
        // The detail fetch keeps the session segment intact
        assert_eq!(
            rows[0].detail_url.as_deref(),
            Some("https://efile.fara.gov/pls/apex/f?p=171:200:3143043848609::NO::P200_REG_NUMBER,P200_DOC_TYPE:5945,Exhibit%20AB")
        );
    }

    #[test]
    fn test_row_without_link_has_no_urls() {
        let doc = Html::parse_document(RESULTS_PAGE);
        let rows = extract_rows(&doc, &base());
        assert_eq!(rows[1].url, None);
        assert_eq!(rows[1].detail_url, None);
    }

    #[test]
    fn test_country_resolved_through_repeat_heading() {
        let doc = Html::parse_document(RESULTS_PAGE);
        let rows = extract_rows(&doc, &base());
        assert_eq!(rows[0].country.as_deref(), Some("AZERBAIJAN"));
    }

    #[test]
    fn test_missing_country_heading_is_soft() {
        let doc = Html::parse_document(RESULTS_PAGE);
        let rows = extract_rows(&doc, &base());
        // Suffix 99 has no BREAK_COUNTRY_NAME_99 heading on the page
        assert_eq!(rows[1].country, None);
        // The record survives regardless
        assert_eq!(rows[1].reg_num.as_deref(), Some("6012"));
    }

    #[test]
    fn test_rows_without_cells_are_skipped() {
        let html = r#"<html><body>
<div id="apexir_DATA_PANEL">
<table class="apexir_WORKSHEET_DATA">
  <tr class="odd"><th>heading only</th></tr>
</table>
</div>
</body></html>"#;
        let doc = Html::parse_document(html);
        assert!(extract_rows(&doc, &base()).is_empty());
    }

    #[test]
    fn test_stable_url_with_short_link_is_none() {
        assert_eq!(stable_url("f?p=171", &base()), None);
    }
}
