use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    invariants::{Endpoint, HttpMethod},
    models::{PageRequest, ParsedRequest},
};

/// Groups slow requests by path (query string dropped) and method.
#[derive(Debug, Clone)]
pub struct SlowPages {
    slow_threshold: f64,
    pages: HashMap<(Endpoint, HttpMethod), PageRequest>,
}

impl SlowPages {
    pub fn new(slow_threshold: f64) -> Self {
        Self {
            slow_threshold,
            pages: HashMap::new(),
        }
    }

    /// Folds every record into a fresh table and returns the rows in no
    /// particular order.
    pub fn run<'a, I>(records: I, slow_threshold: f64) -> Result<Vec<PageRequest>>
    where
        I: IntoIterator<Item = &'a ParsedRequest>,
    {
        let mut pages = Self::new(slow_threshold);
        for record in records {
            pages.record(record)?;
        }
        Ok(pages.into_pages())
    }

    /// Returns whether the record counted as slow.
    pub fn record(&mut self, request: &ParsedRequest) -> Result<bool> {
        if request.upstream_response_time < self.slow_threshold {
            return Ok(false);
        }

        let (Some(url), Some(http_method)) = (&request.url, request.http_method) else {
            return Err(Error::ContractViolation {
                url: request.request.clone(),
                reason: "request line has no method and url".into(),
            });
        };
        let path: Endpoint = url.parse()?;

        let page = self
            .pages
            .entry((path.clone(), http_method))
            .or_insert_with(|| PageRequest::new(path, http_method));
        page.occurrences += 1;
        page.total_time += request.upstream_response_time;
        Ok(true)
    }

    /// Adds another table's counts into this one, key by key.
    pub fn merge(&mut self, other: SlowPages) {
        for (key, theirs) in other.pages {
            let page = self
                .pages
                .entry(key)
                .or_insert_with(|| PageRequest::new(theirs.path.clone(), theirs.http_method));
            page.occurrences += theirs.occurrences;
            page.total_time += theirs.total_time;
        }
    }

    pub fn get(&self, path: &str, http_method: HttpMethod) -> Option<&PageRequest> {
        let path: Endpoint = path.parse().ok()?;
        self.pages.get(&(path, http_method))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn into_pages(self) -> Vec<PageRequest> {
        self.pages.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LineParser;
    use asserting::prelude::*;
    use chrono::NaiveDate;

    fn request(method: HttpMethod, url: &str, upstream_response_time: f64) -> ParsedRequest {
        ParsedRequest {
            ip: "10.0.0.1".into(),
            time: NaiveDate::from_ymd_opt(2011, 5, 17)
                .unwrap()
                .and_hms_opt(6, 32, 10)
                .unwrap(),
            host: "foo.bar.com".into(),
            request: format!("{method} {url} HTTP/1.1"),
            http_referer: "-".into(),
            http_user_agent: "curl/7.68.0".into(),
            cookie_sessionid: "-".into(),
            upstream_response_time,
            request_time: upstream_response_time,
            upstream_status: "200".into(),
            status: "200".into(),
            http_method: Some(method),
            url: Some(url.into()),
        }
    }

    fn totals(pages: Vec<PageRequest>) -> HashMap<(String, HttpMethod), (u64, f64)> {
        pages
            .into_iter()
            .map(|p| ((p.path.to_string(), p.http_method), (p.occurrences, p.total_time)))
            .collect()
    }

    #[test]
    fn fast_requests_are_ignored() {
        let records = [request(HttpMethod::Get, "/", 0.2)];
        let pages = SlowPages::run(&records, 7.0).unwrap();
        assert_that!(pages.len()).is_equal_to(0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let records = [
            request(HttpMethod::Get, "/at", 7.0),
            request(HttpMethod::Get, "/below", 6.999),
        ];
        let pages = totals(SlowPages::run(&records, 7.0).unwrap());
        assert_that!(pages.get(&("/at".to_string(), HttpMethod::Get)).copied())
            .is_equal_to(Some((1, 7.0)));
        assert_that!(pages.get(&("/below".to_string(), HttpMethod::Get))).is_none();
    }

    #[test]
    fn query_string_is_stripped_from_key() {
        let records = [
            request(HttpMethod::Get, "/search?q=foo&page=2", 8.0),
            request(HttpMethod::Get, "/search", 10.0),
        ];
        let pages = SlowPages::run(&records, 7.0).unwrap();
        assert_that!(pages.len()).is_equal_to(1);
        assert_that!(pages[0].path.as_str()).is_equal_to("/search");
        assert_that!(pages[0].occurrences).is_equal_to(2);
        assert_that!(pages[0].total_time).is_equal_to(18.0);
        assert_that!(pages[0].average_time()).is_equal_to(9.0);
    }

    #[test]
    fn method_is_part_of_key() {
        let records = [
            request(HttpMethod::Get, "/i/51764/lock/", 8.0),
            request(HttpMethod::Post, "/i/51764/lock/", 90.0),
            request(HttpMethod::Post, "/i/51764/lock/", 90.0),
        ];
        let pages = totals(SlowPages::run(&records, 7.0).unwrap());
        assert_that!(pages.len()).is_equal_to(2);
        assert_that!(pages[&("/i/51764/lock/".to_string(), HttpMethod::Get)]).is_equal_to((1, 8.0));
        assert_that!(pages[&("/i/51764/lock/".to_string(), HttpMethod::Post)])
            .is_equal_to((2, 180.0));
    }

    #[test]
    fn order_of_records_does_not_matter() {
        let records = vec![
            request(HttpMethod::Get, "/a", 8.0),
            request(HttpMethod::Post, "/b?x=1", 9.5),
            request(HttpMethod::Get, "/a?y=2", 12.0),
            request(HttpMethod::Head, "/a", 7.5),
            request(HttpMethod::Post, "/b", 1.0),
        ];
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        let expected = totals(SlowPages::run(&records, 7.0).unwrap());
        assert_eq!(totals(SlowPages::run(&reversed, 7.0).unwrap()), expected);
        assert_eq!(totals(SlowPages::run(&rotated, 7.0).unwrap()), expected);
    }

    #[test]
    fn merge_sums_matching_keys() {
        let records = [
            request(HttpMethod::Get, "/a", 8.0),
            request(HttpMethod::Get, "/a", 10.0),
            request(HttpMethod::Post, "/b", 9.0),
        ];
        let mut left = SlowPages::new(7.0);
        let mut right = SlowPages::new(7.0);
        left.record(&records[0]).unwrap();
        right.record(&records[1]).unwrap();
        right.record(&records[2]).unwrap();
        left.merge(right);

        assert_that!(left.len()).is_equal_to(2);
        let a = left.get("/a", HttpMethod::Get).unwrap();
        assert_that!(a.occurrences).is_equal_to(2);
        assert_that!(a.total_time).is_equal_to(18.0);
        assert_eq!(
            totals(left.into_pages()),
            totals(SlowPages::run(&records, 7.0).unwrap())
        );
    }

    #[test]
    fn every_url_the_parser_emits_aggregates() {
        let parser = LineParser::default();
        let targets = [
            "/search/?q=<script>alert(1)</script>",
            "/search/?q=\"foo\"",
            "/a`b",
            "/{id}/|x|",
            "/search/?q=<>{}|^`",
        ];
        let records: Vec<_> = targets
            .iter()
            .map(|target| {
                let line = format!(
                    "IP=10.0.0.1,TL=17/May/2011:06:32:10 -0400,DN=foo.bar.com,\
                     RQ=GET {target} HTTP/1.1,HR=-,HU=sqlmap/1.5,CS=-,\
                     UT=8.5,RT=8.6,US=200,SC=200"
                );
                parser.parse_line(&line).unwrap().unwrap()
            })
            .collect();

        let pages = totals(SlowPages::run(&records, 7.0).unwrap());
        assert_that!(pages.len()).is_equal_to(3);
        assert_that!(pages[&("/search/".to_string(), HttpMethod::Get)]).is_equal_to((3, 25.5));
        assert_that!(pages[&("/a`b".to_string(), HttpMethod::Get)]).is_equal_to((1, 8.5));
        assert_that!(pages[&("/{id}/|x|".to_string(), HttpMethod::Get)]).is_equal_to((1, 8.5));
    }

    #[test]
    fn slow_record_without_url_violates_contract() {
        let mut record = request(HttpMethod::Get, "/", 20.0);
        record.http_method = None;
        record.url = None;
        let result = SlowPages::new(7.0).record(&record);
        assert!(matches!(result, Err(Error::ContractViolation { .. })));
    }

    #[test]
    fn fast_record_without_url_is_just_skipped() {
        let mut record = request(HttpMethod::Get, "/", 0.5);
        record.http_method = None;
        record.url = None;
        assert_that!(SlowPages::new(7.0).record(&record).unwrap()).is_equal_to(false);
    }
}
