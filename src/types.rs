use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A person referenced by a tracker: reporter, assignee, commenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Identity {
            user_id: user_id.into(),
            name: None,
            email: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, self.user_id),
            None => write!(f, "{}", self.user_id),
        }
    }
}

/// A remote issue tracker being mirrored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    pub url: String,
    pub kind: String,
    pub version: String,
}

impl Tracker {
    pub fn new(url: impl Into<String>, kind: impl Into<String>, version: impl Into<String>) -> Self {
        Tracker {
            url: url.into(),
            kind: kind.into(),
            version: version.into(),
        }
    }
}

/// One tracked issue with its discussion and history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker-side identifier, kept as text since formats vary wildly.
    pub id: String,
    /// Issue flavor as the tracker reports it ("bug", "ticket", ...).
    pub kind: String,
    pub summary: String,
    pub description: String,
    pub submitted_by: Identity,
    pub submitted_on: DateTime<Utc>,
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<Identity>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
    pub changes: Vec<Change>,
}

impl Issue {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        summary: impl Into<String>,
        description: impl Into<String>,
        submitted_by: Identity,
        submitted_on: DateTime<Utc>,
    ) -> Self {
        Issue {
            id: id.into(),
            kind: kind.into(),
            summary: summary.into(),
            description: description.into(),
            submitted_by,
            submitted_on,
            status: None,
            resolution: None,
            priority: None,
            assigned_to: None,
            comments: Vec::new(),
            attachments: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }

    pub fn add_change(&mut self, change: Change) {
        self.changes.push(change);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub submitted_by: Identity,
    pub submitted_on: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub url: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub submitted_by: Option<Identity>,
    pub submitted_on: Option<DateTime<Utc>>,
}

/// One field transition from an issue's activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub changed_by: Identity,
    pub changed_on: DateTime<Utc>,
}
