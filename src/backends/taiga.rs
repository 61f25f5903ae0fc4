//! Taiga backend.
//!
//! Talks to the Taiga REST API: issues come from `{url}/api/v1/issues` as
//! JSON, the change history of each issue from its Atom activity feed.
//! Feed entries describe transitions as `field updated:` blocks with
//! `old => new` value pairs.

use crate::backends::Backend;
use crate::backends::generic::parse_date;
use crate::config;
use crate::error::{RastroError, Result};
use crate::parsers::{Element, XmlParser};
use crate::storage::{MemoryStorage, Storage};
use crate::types::{Change, Comment, Identity, Issue, Tracker};
use crate::ui;
use serde_json::Value;

pub struct TaigaBackend;

impl TaigaBackend {
    pub fn new() -> Self {
        TaigaBackend
    }

    fn fetch_issues(&self, base_url: &str) -> Result<Vec<Value>> {
        let url = format!("{base_url}/api/v1/issues");
        ui::verbose(&format!("Fetching issue list from {url}"));

        let response = self.request(&url)?.send()?.error_for_status()?;
        let payload: Value = response.json()?;

        match payload {
            Value::Array(items) => Ok(items),
            _ => Err(RastroError::unmarshalling_reason(
                "Issue",
                "expected a JSON array of issues",
            )),
        }
    }

    fn fetch_activity(&self, base_url: &str, issue_id: &str) -> Result<FeedActivity> {
        let url = format!("{base_url}/api/v1/issues/{issue_id}/feed.atom");
        ui::verbose(&format!("Fetching activity feed from {url}"));

        let response = self.request(&url)?.send()?.error_for_status()?;
        parse_feed(&response.text()?)
    }

    fn request(&self, url: &str) -> Result<reqwest::blocking::RequestBuilder> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("rastro/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let mut request = client.get(url);
        if let Some(token) = &config::get().auth_token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }
}

impl Default for TaigaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for TaigaBackend {
    fn name(&self) -> &str {
        "taiga"
    }

    fn run(&self) -> Result<()> {
        let config = config::get();
        let base_url = config.url.as_deref().ok_or_else(|| {
            RastroError::ConfigError("the taiga backend requires a tracker url".to_string())
        })?;

        ui::info(&format!(
            "Running taiga backend with a delay of {}s between requests",
            config.delay
        ));

        let mut storage = MemoryStorage::new();
        let tracker = storage.insert_tracker(Tracker::new(base_url, "taiga", "beta"))?;

        if let Some(last) = storage.get_last_modification_date(tracker.id)? {
            ui::info(&format!("Last issues analyzed were modified on {last}"));
        }

        let raw_issues = self.fetch_issues(base_url)?;
        let total = raw_issues.len();
        if total == 0 {
            ui::warning("No issues found. Did you provide the correct url?");
            return Ok(());
        }

        let mut analyzed = 0usize;
        for raw in &raw_issues {
            let mut issue = match unmarshal_issue(raw) {
                Ok(issue) => issue,
                // A malformed issue loses that issue, never the whole run.
                Err(e) => {
                    ui::warning(&e.to_string());
                    continue;
                }
            };

            match self.fetch_activity(base_url, &issue.id) {
                Ok(activity) => {
                    for change in activity.changes {
                        issue.add_change(change);
                    }
                    for comment in activity.comments {
                        issue.add_comment(comment);
                    }
                }
                Err(e) => ui::warning(&format!(
                    "Could not fetch activity for issue {}: {e}",
                    issue.id
                )),
            }

            storage.insert_issue(issue, tracker.id)?;
            analyzed += 1;

            if analyzed < total {
                std::thread::sleep(config.delay_duration());
            }
        }

        ui::success(&format!("Done. {analyzed} issues analyzed"));
        Ok(())
    }
}

/// Maps one Taiga JSON issue onto an [`Issue`].
fn unmarshal_issue(raw: &Value) -> Result<Issue> {
    let id = json_text(raw, "_id")?;
    let summary = json_text(raw, "summary")?;
    let description = json_text(raw, "description").unwrap_or_default();

    let reporter_id = json_text(raw, "reported_by_id")?;
    let mut reporter = Identity::new(reporter_id);
    if let Ok(name) = json_text(raw, "reported_by") {
        reporter = reporter.with_name(name);
    }

    let created = json_text(raw, "created_date")?;
    let submitted_on = parse_date(&created).map_err(|e| RastroError::Unmarshalling {
        target: "Issue".to_string(),
        reason: Some("Invalid date".to_string()),
        cause: Some(Box::new(e)),
    })?;

    let mut issue = Issue::new(id, "ticket", summary, description, reporter, submitted_on);

    if let Ok(assignee_id) = json_text(raw, "assigned_to_id") {
        let mut assignee = Identity::new(assignee_id);
        if let Ok(name) = json_text(raw, "assigned_to") {
            assignee = assignee.with_name(name);
        }
        issue.assigned_to = Some(assignee);
    }
    issue.status = json_text(raw, "status").ok();

    Ok(issue)
}

/// Reads `key` as text, accepting JSON strings and numbers.
fn json_text(raw: &Value, key: &str) -> Result<String> {
    match raw.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(RastroError::unmarshalling_reason(
            "Issue",
            format!("missing field '{key}'"),
        )),
    }
}

/// What an issue's Atom activity feed unpacks into.
#[derive(Debug, Default)]
struct FeedActivity {
    changes: Vec<Change>,
    comments: Vec<Comment>,
}

/// Parses an Atom activity feed into changes and comments.
///
/// Transition entries hold lines like
/// `status updated: u'in-progress' => u'closed'`, with the field name of
/// the next transition on the following line. Entries without any
/// transition block are discussion posts and become comments.
fn parse_feed(feed: &str) -> Result<FeedActivity> {
    let mut parser = XmlParser::new(Some(feed));
    parser.parse()?;
    let Some(root) = parser.data() else {
        return Ok(FeedActivity::default());
    };

    let mut activity = FeedActivity::default();
    for entry in root.find_all("entry") {
        let by = Identity::new(entry_author(entry));

        let Some(updated) = entry.child("updated").map(|c| c.text()) else {
            continue;
        };
        let Ok(changed_on) = parse_date(updated.trim()) else {
            ui::warning(&format!("Skipping feed entry with bad date '{updated}'"));
            continue;
        };

        let description = entry
            .child("description")
            .or_else(|| entry.child("summary"))
            .map(|c| c.text())
            .unwrap_or_default();

        let mut segments: Vec<&str> = description.split("updated:").collect();
        if segments.len() == 1 {
            let text = description.trim();
            if !text.is_empty() {
                activity.comments.push(Comment {
                    text: text.to_string(),
                    submitted_by: by.clone(),
                    submitted_on: changed_on,
                });
            }
            continue;
        }
        let head = segments.remove(0);
        let mut field = head.rsplit('\n').next().unwrap_or("").trim().to_string();

        for segment in segments {
            let lines: Vec<&str> = segment.split('\n').collect();
            let values: Vec<&str> = lines[0].split("=>").collect();

            let (old_value, new_value) = if values.len() == 2 {
                (clean_value(values[0]), clean_value(values[1]))
            } else {
                ui::verbose(&format!("{field} not supported in changes analysis"));
                (String::new(), String::new())
            };

            activity.changes.push(Change {
                field: field.clone(),
                old_value,
                new_value,
                changed_by: by.clone(),
                changed_on,
            });

            if lines.len() > 1 {
                field = lines[1].trim().to_string();
            }
        }
    }
    Ok(activity)
}

fn entry_author(entry: &Element) -> String {
    match entry.child("author") {
        Some(author) => match author.child("name") {
            Some(name) => name.text().trim().to_string(),
            None => author.text().trim().to_string(),
        },
        None => "unknown".to_string(),
    }
}

/// Strips the `u'...'` wrapper some feeds put around values; `''` means empty.
fn clean_value(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed == "''" {
        return String::new();
    }
    if let Some(inner) = trimmed.strip_prefix("u'").and_then(|v| v.strip_suffix('\'')) {
        return inner.to_string();
    }
    trimmed.to_string()
}
