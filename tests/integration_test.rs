//! End-to-end tests for the harvester pipeline.
//!
//! The parse tests run the complete pipeline (session extraction →
//! pagination → row extraction → exhibit resolution → normalization) over
//! fixture pages captured from the FARA eFile layout. The HTTP tests drive
//! the blocking fetch layer against a wiremock server.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use scraper::Html;

use fara_harvester::config::RESULTS_BASE;
use fara_harvester::exhibit::{extract_candidates, resolve};
use fara_harvester::normalize::normalize;
use fara_harvester::pagination::pages;
use fara_harvester::records::extract_rows;
use fara_harvester::session::extract_session;
use fara_harvester::types::FinalRecord;

/// Load fixture file content.
fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Run the parse pipeline over the fixture pages.
///
/// Detail pages are paired with rows by position, standing in for the
/// per-row detail fetches a live crawl performs.
fn run_pipeline() -> Vec<FinalRecord> {
    let landing = Html::parse_document(&load_fixture("landing.html"));
    let session = extract_session(&landing).expect("landing page should parse");
    assert_eq!(session.total_records, 3);

    // The default crawl requests the whole result set as one page.
    let requests: Vec<_> = pages(&session, session.total_records, session.total_records).collect();
    assert_eq!(requests.len(), 1);

    let results = Html::parse_document(&load_fixture("results.html"));
    let rows = extract_rows(&results, &RESULTS_BASE);
    assert_eq!(rows.len(), 3);

    let detail_fixtures = ["detail_multi.html", "detail_single.html", "detail_empty.html"];

    rows.iter()
        .zip(detail_fixtures)
        .map(|(row, fixture)| {
            let detail = Html::parse_document(&load_fixture(fixture));
            let candidates = extract_candidates(&detail);
            let exhibit_url = resolve(
                &candidates,
                row.foreign_principal.as_deref().unwrap_or_default(),
            )
            .expect("candidates should resolve");
            normalize(row, exhibit_url.as_deref()).expect("record should normalize")
        })
        .collect()
}

#[test]
fn test_pipeline_record_count() {
    assert_eq!(run_pipeline().len(), 3);
}

#[test]
fn test_pipeline_first_record() {
    let records = run_pipeline();
    let expected = FinalRecord {
        url: Some(
            "https://efile.fara.gov/pls/apex/f?p=171:200:::NO::P200_REG_NUMBER,P200_DOC_TYPE:5945,Exhibit%20AB"
                .to_string(),
        ),
        foreign_principal: Some("Embassy of the Republic of Azerbaijan".to_string()),
        address: Some("2741 34th Street, NW, Washington".to_string()),
        country: Some("AZERBAIJAN".to_string()),
        state: Some("DC".to_string()),
        registrant: Some("Tool Shed Group, LLC".to_string()),
        reg_num: Some("5945".to_string()),
        date: Some("2014-07-03T00:00:00+00:00".to_string()),
        exhibit_url: Some("docs/exhibit_5945_20170223.pdf".to_string()),
    };
    assert_eq!(records[0], expected);
}

#[test]
fn test_pipeline_score_beats_recency() {
    // detail_multi.html lists a 03/10/2017 exhibit, but the 02/23/2017 one
    // carries the principal's exact name and must win.
    let records = run_pipeline();
    assert_eq!(
        records[0].exhibit_url.as_deref(),
        Some("docs/exhibit_5945_20170223.pdf")
    );
}

#[test]
fn test_pipeline_single_exhibit_record() {
    let records = run_pipeline();
    assert_eq!(
        records[1].foreign_principal.as_deref(),
        Some("Government of Alberta")
    );
    assert_eq!(records[1].country.as_deref(), Some("CANADA"));
    // Empty state cell is unset, not ""
    assert_eq!(records[1].state, None);
    assert_eq!(
        records[1].exhibit_url.as_deref(),
        Some("docs/exhibit_2310_20170115.pdf")
    );
    assert_eq!(
        records[1].date.as_deref(),
        Some("2017-01-15T00:00:00+00:00")
    );
}

#[test]
fn test_pipeline_record_without_exhibit() {
    let records = run_pipeline();
    // The name cell contains a non-breaking space in the fixture.
    assert_eq!(
        records[2].foreign_principal.as_deref(),
        Some("Tourism British Columbia")
    );
    assert_eq!(records[2].exhibit_url, None);
}

mod http {
    use fara_harvester::http::{create_client, get_html, post_form};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::load_fixture;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("landing.html")))
            .mount(&server)
            .await;

        let url = format!("{}/landing", server.uri());
        let body = tokio::task::spawn_blocking(move || {
            let client = create_client().unwrap();
            get_html(&client, &url).unwrap()
        })
        .await
        .unwrap();

        assert!(body.contains("wwvFlowForm"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_html_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        let url = format!("{}/flaky", server.uri());
        let body = tokio::task::spawn_blocking(move || {
            let client = create_client().unwrap();
            get_html(&client, &url).unwrap()
        })
        .await
        .unwrap();

        assert_eq!(body, "recovered");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_html_does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/missing", server.uri());
        let result = tokio::task::spawn_blocking(move || {
            let client = create_client().unwrap();
            get_html(&client, &url)
        })
        .await
        .unwrap();

        assert!(result.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_form_sends_page_request_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wwv_flow.show"))
            .and(body_string_contains("p_request=APXWGT"))
            .and(body_string_contains("p_widget_action=PAGE"))
            .and(body_string_contains(
                "pgR_min_row%3D1max_rows%3D3rows_fetched%3D3",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("results.html")))
            .mount(&server)
            .await;

        let url = format!("{}/wwv_flow.show", server.uri());
        let body = tokio::task::spawn_blocking(move || {
            use fara_harvester::pagination::pages;
            use fara_harvester::types::SessionContext;

            let session = SessionContext {
                flow_id: "171".to_string(),
                flow_step_id: "130".to_string(),
                instance: "3143043848609".to_string(),
                worksheet_id: "4315901912389".to_string(),
                report_id: "4316501916389".to_string(),
                total_records: 3,
            };
            let request = pages(&session, 3, 3).next().unwrap();

            let client = create_client().unwrap();
            post_form(&client, &url, &request.form_data()).unwrap()
        })
        .await
        .unwrap();

        assert!(body.contains("apexir_WORKSHEET_DATA"));
    }
}
