//! Pagination request building.
//!
//! The worksheet endpoint pages through the result set via POST requests
//! that echo the session fields plus a window descriptor. [`pages`] walks
//! the full result set as a finite iterator: a pure function of its inputs
//! with no shared cursor, so it can be restarted at will.

use crate::types::SessionContext;

/// Form payload for one page of worksheet data.
///
/// Carries its own copy of the session fields; the window is described by
/// the 1-based starting row and the number of rows fetched in this page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    session: SessionContext,

    /// 1-based index of the first row in this page.
    pub first_row: u32,

    /// Number of rows this page fetches. Equals the page size except on an
    /// undersized final page, where it is exactly the remainder.
    pub rows: u32,
}

impl PageRequest {
    /// Render the request as form data for the worksheet endpoint.
    pub fn form_data(&self) -> Vec<(&'static str, String)> {
        vec![
            ("p_request", "APXWGT".to_string()),
            ("p_flow_id", self.session.flow_id.clone()),
            ("p_flow_step_id", self.session.flow_step_id.clone()),
            ("p_instance", self.session.instance.clone()),
            ("x01", self.session.worksheet_id.clone()),
            ("x02", self.session.report_id.clone()),
            ("p_widget_name", "worksheet".to_string()),
            ("p_widget_mod", "ACTION".to_string()),
            ("p_widget_action", "PAGE".to_string()),
            ("p_widget_num_return", self.rows.to_string()),
            (
                "p_widget_action_mod",
                format!(
                    "pgR_min_row={first_row}max_rows={rows}rows_fetched={rows}",
                    first_row = self.first_row,
                    rows = self.rows
                ),
            ),
        ]
    }
}

/// Iterator over the page requests covering a result set.
#[derive(Debug, Clone)]
pub struct Pages {
    session: SessionContext,
    total_rows: u32,
    page_size: u32,
    next_row: u32,
}

impl Iterator for Pages {
    type Item = PageRequest;

    fn next(&mut self) -> Option<PageRequest> {
        if self.page_size == 0 || self.next_row > self.total_rows {
            return None;
        }

        let remaining = self.total_rows - self.next_row + 1;
        let rows = self.page_size.min(remaining);
        let request = PageRequest {
            session: self.session.clone(),
            first_row: self.next_row,
            rows,
        };
        self.next_row += self.page_size;
        Some(request)
    }
}

/// Build the lazy sequence of page requests for a result set.
///
/// Yields exactly `ceil(total_rows / page_size)` requests; the final
/// request's row count is clamped to the remainder. `total_rows = 0` (or a
/// zero page size) yields nothing.
pub fn pages(session: &SessionContext, total_rows: u32, page_size: u32) -> Pages {
    Pages {
        session: session.clone(),
        total_rows,
        page_size,
        next_row: 1,
    }
}
