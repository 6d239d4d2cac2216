//! Configuration constants for the harvester.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Landing page of the active foreign principals report.
///
/// The `P130_DATERANGE:N` argument selects the unfiltered "all dates" view.
pub const LANDING_URL: &str =
    "https://efile.fara.gov/pls/apex/f?p=171:130:::NO:RP,130:P130_DATERANGE:N";

/// Endpoint that serves paginated worksheet data for APEX applications.
///
/// Every page after the landing page is a POST here, echoing the session
/// fields recovered from the landing page.
pub const RESULTS_URL: &str = "https://efile.fara.gov/pls/apex/wwv_flow.show";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Base URL that row links resolve against.
///
/// Row links are relative (`f?p=...`) and resolve against the directory of
/// the results endpoint.
#[allow(clippy::expect_used)] // Static URL that is guaranteed to be valid
pub static RESULTS_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse(RESULTS_URL).expect("valid URL"));

/// Date pattern used by the site: MM/DD/YYYY with 2-digit month and day.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
pub static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid regex"));
