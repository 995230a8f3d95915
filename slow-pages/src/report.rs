use num_format::{Locale, ToFormattedString};
use serde::Serialize;

use crate::{invariants::HttpMethod, models::PageRequest};

#[derive(Debug, Serialize)]
struct Row<'a> {
    path: &'a str,
    http_method: HttpMethod,
    occurrences: u64,
    total_time: f64,
    average_time: f64,
}

impl<'a> From<&'a PageRequest> for Row<'a> {
    fn from(page: &'a PageRequest) -> Self {
        Self {
            path: page.path.as_str(),
            http_method: page.http_method,
            occurrences: page.occurrences,
            total_time: page.total_time,
            average_time: page.average_time(),
        }
    }
}

/// Worst pages first: most total time, then most hits, then path and method.
pub fn rank(mut pages: Vec<PageRequest>, top: Option<usize>) -> Vec<PageRequest> {
    pages.sort_unstable_by(|a, b| {
        b.total_time
            .total_cmp(&a.total_time)
            .then_with(|| b.occurrences.cmp(&a.occurrences))
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.http_method.cmp(&b.http_method))
    });
    if let Some(n) = top {
        pages.truncate(n);
    }
    pages
}

pub fn render_table(pages: &[PageRequest]) -> String {
    let counts: Vec<String> = pages
        .iter()
        .map(|p| p.occurrences.to_formatted_string(&Locale::en))
        .collect();
    let path_width = pages
        .iter()
        .map(|p| p.path.as_str().len())
        .chain(["PATH".len()])
        .max()
        .unwrap_or_default();
    let count_width = counts
        .iter()
        .map(String::len)
        .chain(["COUNT".len()])
        .max()
        .unwrap_or_default();

    let mut out = format!(
        "{:<6}  {:<path_width$}  {:>count_width$}  {:>12}  {:>9}\n",
        "METHOD", "PATH", "COUNT", "TOTAL (s)", "AVG (s)"
    );
    for (page, count) in pages.iter().zip(&counts) {
        out.push_str(&format!(
            "{:<6}  {:<path_width$}  {:>count_width$}  {:>12.3}  {:>9.3}\n",
            page.http_method.as_str(),
            page.path.as_str(),
            count,
            page.total_time,
            page.average_time()
        ));
    }
    out
}

pub fn render_json(pages: &[PageRequest]) -> serde_json::Result<String> {
    let rows: Vec<Row<'_>> = pages.iter().map(Row::from).collect();
    serde_json::to_string_pretty(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use asserting::prelude::*;

    fn page(path: &str, http_method: HttpMethod, occurrences: u64, total_time: f64) -> PageRequest {
        PageRequest {
            path: path.parse().unwrap(),
            http_method,
            occurrences,
            total_time,
        }
    }

    #[test]
    fn rank_orders_by_total_time_then_hits() {
        let ranked = rank(
            vec![
                page("/a", HttpMethod::Get, 1, 8.0),
                page("/b", HttpMethod::Post, 3, 270.0),
                page("/c", HttpMethod::Get, 2, 16.0),
                page("/d", HttpMethod::Get, 1, 16.0),
            ],
            None,
        );
        let paths: Vec<_> = ranked.iter().map(|p| p.path.to_string()).collect();
        assert_that!(paths).is_equal_to(vec![
            "/b".to_string(),
            "/c".to_string(),
            "/d".to_string(),
            "/a".to_string(),
        ]);
    }

    #[test]
    fn rank_truncates_to_top() {
        let ranked = rank(
            vec![
                page("/a", HttpMethod::Get, 1, 8.0),
                page("/b", HttpMethod::Get, 1, 9.0),
            ],
            Some(1),
        );
        assert_that!(ranked.len()).is_equal_to(1);
        assert_that!(ranked[0].path.as_str()).is_equal_to("/b");
    }

    #[test]
    fn table_has_header_and_grouped_counts() {
        let table = render_table(&[page("/search", HttpMethod::Get, 12_345, 123_450.0)]);
        let lines: Vec<_> = table.lines().collect();
        assert_that!(lines.len()).is_equal_to(2);
        assert!(lines[0].starts_with("METHOD"));
        assert!(lines[1].starts_with("GET"));
        assert!(lines[1].contains("/search"));
        assert!(lines[1].contains("12,345"));
        assert!(lines[1].contains("123450.000"));
        assert!(lines[1].contains("10.000"));
    }

    #[test]
    fn json_rows_carry_average() {
        let json = render_json(&[page("/i/1/lock/", HttpMethod::Post, 2, 180.0)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_that!(value[0]["path"].as_str()).is_equal_to(Some("/i/1/lock/"));
        assert_that!(value[0]["http_method"].as_str()).is_equal_to(Some("POST"));
        assert_that!(value[0]["occurrences"].as_u64()).is_equal_to(Some(2));
        assert_that!(value[0]["average_time"].as_f64()).is_equal_to(Some(90.0));
    }
}
