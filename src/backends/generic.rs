//! Config-driven backend.
//!
//! `GenericBackend` mirrors any tracker that can be described declaratively:
//! fetch one payload (HTTP or local snapshot), parse it with the configured
//! format parser, map records onto issues, store them. Trackers needing
//! bespoke protocol logic get their own implementation instead (see
//! [`taiga`](crate::backends::taiga)).

use crate::backends::Backend;
use crate::backends::config::{PayloadFormat, TrackerConfig};
use crate::config;
use crate::error::{RastroError, Result};
use crate::parsers::{CsvParser, CsvRecord, Element, HtmlParser, XmlParser};
use crate::storage::{MemoryStorage, Storage};
use crate::types::{Attachment, Identity, Issue, Tracker};
use crate::ui;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

pub struct GenericBackend {
    config: TrackerConfig,
}

impl GenericBackend {
    pub fn from_config(config: TrackerConfig) -> Self {
        GenericBackend { config }
    }

    fn fetch(&self) -> Result<String> {
        if let Some(file) = &self.config.file {
            return std::fs::read_to_string(file).map_err(|source| RastroError::IoError {
                path: file.clone(),
                source,
            });
        }

        if let Some(url) = &self.config.url {
            let client = reqwest::blocking::Client::builder()
                .user_agent(concat!("rastro/", env!("CARGO_PKG_VERSION")))
                .build()?;
            let mut request = client.get(url);
            if let Some(token) = &config::get().auth_token {
                request = request.bearer_auth(token);
            }
            let response = request.send()?.error_for_status()?;
            return Ok(response.text()?);
        }

        Err(RastroError::ConfigError(format!(
            "backend '{}' defines neither url nor file",
            self.config.name
        )))
    }

    fn unmarshal(&self, content: &str) -> Result<Vec<Issue>> {
        match self.config.format {
            PayloadFormat::Csv => self.issues_from_csv(content),
            PayloadFormat::Html => {
                let mut parser = HtmlParser::new(Some(content));
                parser.parse()?;
                let Some(document) = parser.data() else {
                    return Ok(Vec::new());
                };
                Ok(self.issues_from_tree(document))
            }
            PayloadFormat::Xml => {
                let mut parser = XmlParser::new(Some(content));
                parser.parse()?;
                let Some(root) = parser.data() else {
                    return Ok(Vec::new());
                };
                Ok(self.issues_from_tree(root))
            }
        }
    }

    fn issues_from_csv(&self, content: &str) -> Result<Vec<Issue>> {
        let mut parser = CsvParser::with_dialect(
            Some(content),
            self.config.fieldnames.clone(),
            self.config.delimiter.filter(char::is_ascii).map_or(b',', |c| c as u8),
            self.config.quotechar.filter(char::is_ascii).map_or(b'"', |c| c as u8),
        );
        parser.parse()?;

        let Some(rows) = parser.data() else {
            return Ok(Vec::new());
        };

        let mut issues = Vec::new();
        for row in rows {
            match self.issue_from_record(row) {
                Ok(issue) => issues.push(issue),
                // A bad row loses that row, never the whole payload.
                Err(e) => ui::warning(&e.to_string()),
            }
        }
        Ok(issues)
    }

    fn issue_from_record(&self, row: &CsvRecord) -> Result<Issue> {
        let id = row.get(self.config.id_field()).ok_or_else(|| {
            RastroError::unmarshalling_reason(
                "Issue",
                format!("missing field '{}'", self.config.id_field()),
            )
        })?;

        let summary = row
            .get(self.config.summary_field())
            .cloned()
            .unwrap_or_default();
        let description = row
            .get(self.config.description_field())
            .cloned()
            .unwrap_or_default();
        let submitter = row
            .get(self.config.submitter_field())
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let submitted_on = match self.config.date_field.as_deref().and_then(|f| row.get(f)) {
            Some(value) => parse_date(value).map_err(|e| RastroError::Unmarshalling {
                target: "Issue".to_string(),
                reason: Some("Invalid date".to_string()),
                cause: Some(Box::new(e)),
            })?,
            None => Utc::now(),
        };

        let mut issue = Issue::new(
            id,
            "bug",
            summary,
            description,
            Identity::new(submitter),
            submitted_on,
        );
        issue.status = self
            .config
            .status_field
            .as_deref()
            .and_then(|f| row.get(f))
            .cloned();
        Ok(issue)
    }

    fn issues_from_tree(&self, root: &Element) -> Vec<Issue> {
        let mut issues = Vec::new();
        for element in root.find_all(self.config.issue_tag()) {
            match self.issue_from_element(element) {
                Ok(issue) => issues.push(issue),
                Err(e) => ui::warning(&e.to_string()),
            }
        }
        issues
    }

    fn issue_from_element(&self, element: &Element) -> Result<Issue> {
        let id = field_from_element(element, self.config.id_field()).ok_or_else(|| {
            RastroError::unmarshalling_reason(
                "Issue",
                format!("missing field '{}'", self.config.id_field()),
            )
        })?;

        let summary = field_from_element(element, self.config.summary_field()).unwrap_or_default();
        let description =
            field_from_element(element, self.config.description_field()).unwrap_or_default();
        let submitter = field_from_element(element, self.config.submitter_field())
            .unwrap_or_else(|| "unknown".to_string());

        let submitted_on = match self
            .config
            .date_field
            .as_deref()
            .and_then(|f| field_from_element(element, f))
        {
            Some(value) => parse_date(&value).map_err(|e| RastroError::Unmarshalling {
                target: "Issue".to_string(),
                reason: Some("Invalid date".to_string()),
                cause: Some(Box::new(e)),
            })?,
            None => Utc::now(),
        };

        let mut issue = Issue::new(
            id,
            "bug",
            summary,
            description,
            Identity::new(submitter),
            submitted_on,
        );
        issue.status = self
            .config
            .status_field
            .as_deref()
            .and_then(|f| field_from_element(element, f));

        for node in element.children_named("attachment") {
            let url = match node.attr("url") {
                Some(url) => url.to_string(),
                None => node.text().trim().to_string(),
            };
            if url.is_empty() {
                continue;
            }
            issue.add_attachment(Attachment {
                url,
                name: node.attr("name").map(str::to_string),
                description: None,
                submitted_by: None,
                submitted_on: None,
            });
        }
        Ok(issue)
    }
}

impl Backend for GenericBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn run(&self) -> Result<()> {
        ui::info(&format!("Running backend '{}'", self.config.name));

        let content = self.fetch()?;
        let issues = self.unmarshal(&content)?;

        let source = self
            .config
            .url
            .clone()
            .or_else(|| self.config.file.as_ref().map(|p| p.display().to_string()))
            .unwrap_or_default();

        let mut storage = MemoryStorage::new();
        let tracker = storage.insert_tracker(Tracker::new(
            source,
            &self.config.name,
            self.config.format.to_string(),
        ))?;

        let count = issues.len();
        for issue in issues {
            storage.insert_issue(issue, tracker.id)?;
        }

        ui::success(&format!(
            "Done. {} issues mirrored by '{}'",
            count, self.config.name
        ));
        Ok(())
    }
}

/// An issue field in a markup record: attribute first, child element second.
fn field_from_element(element: &Element, key: &str) -> Option<String> {
    if let Some(value) = element.attr(key) {
        return Some(value.to_string());
    }
    element.child(key).map(|child| child.text())
}

/// Tracker timestamps arrive in a handful of shapes; try them in order.
pub(crate) fn parse_date(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN).and_utc())
}
