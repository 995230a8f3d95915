use std::io::BufRead;

use chrono::{Local, NaiveDateTime};

use crate::{
    config::Settings,
    dialect::{Dialect, RawFields},
    error::{Error, Result},
    models::ParsedRequest,
};

/// Turns raw log lines into [`ParsedRequest`]s for one [`Dialect`].
#[derive(Debug, Clone)]
pub struct LineParser {
    dialect: Dialect,
    settings: Settings,
}

impl LineParser {
    pub fn new(dialect: Dialect, settings: Settings) -> Self {
        Self { dialect, settings }
    }

    pub fn request_times(settings: Settings) -> Self {
        Self::new(Dialect::request_times(), settings)
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// `Ok(None)` means the line does not belong to this dialect and should be
    /// skipped. Errors are only returned for lines that did match.
    pub fn parse_line(&self, line: &str) -> Result<Option<ParsedRequest>> {
        let Some(caps) = self.dialect.pattern.captures(line) else {
            return Ok(None);
        };
        let Some(raw) = RawFields::from_captures(&caps) else {
            return Ok(None);
        };

        let derived = (self.dialect.post_process)(&raw, &self.settings)?;
        let time = match self.dialect.date_format {
            Some(format) => self.convert_time(raw.time, format)?,
            None => Local::now().naive_local(),
        };

        Ok(Some(ParsedRequest {
            ip: raw.ip.into(),
            time,
            host: raw.host.into(),
            request: raw.request.into(),
            http_referer: raw.http_referer.into(),
            http_user_agent: raw.http_user_agent.into(),
            cookie_sessionid: raw.cookie_sessionid.into(),
            upstream_response_time: derived.upstream_response_time,
            request_time: derived.request_time,
            upstream_status: raw.upstream_status.into(),
            status: raw.status.into(),
            http_method: derived.http_method,
            url: derived.url,
        }))
    }

    /// Parses every line, dropping the ones that do not match.
    pub fn parse_lines<I>(&self, lines: I) -> impl Iterator<Item = Result<ParsedRequest>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        lines
            .into_iter()
            .filter_map(move |line| self.parse_line(line.as_ref()).transpose())
    }

    pub fn parse_reader<R: BufRead>(&self, reader: R) -> impl Iterator<Item = Result<ParsedRequest>> {
        reader.lines().filter_map(move |line| match line {
            Ok(line) => self.parse_line(&line).transpose(),
            Err(e) => Some(Err(Error::Io(e))),
        })
    }

    fn convert_time(&self, text: &str, format: &str) -> Result<NaiveDateTime> {
        let stripped = match &self.dialect.date_ignore_pattern {
            Some(ignore) => ignore.replace_all(text, ""),
            None => text.into(),
        };
        NaiveDateTime::parse_from_str(&stripped, format).map_err(|source| {
            Error::MalformedTimestamp {
                value: text.into(),
                source,
            }
        })
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::request_times(Settings::default())
    }
}
