use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Payload format a config-driven backend expects from its tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Csv,
    Html,
    Xml,
}

impl fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Html => write!(f, "html"),
            Self::Xml => write!(f, "xml"),
        }
    }
}

impl FromStr for PayloadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            "xml" => Ok(Self::Xml),
            other => Err(format!("unknown payload format '{other}'")),
        }
    }
}

/// Declarative description of how to mirror one tracker.
///
/// Manifest packages produce these; a `GenericBackend` interprets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Backend identifier, the name published in the catalogue.
    pub name: String,

    /// Remote payload location. One of `url`/`file` is expected.
    pub url: Option<String>,

    /// Local payload snapshot, resolved against the package directory.
    pub file: Option<PathBuf>,

    pub format: PayloadFormat,

    /// Field names for delimited-text payloads without a header row.
    pub fieldnames: Option<Vec<String>>,

    /// Delimited-text dialect; comma and double quote when unset.
    pub delimiter: Option<char>,
    pub quotechar: Option<char>,

    /// Element naming one issue record in HTML/XML payloads.
    pub issue_tag: Option<String>,

    /// Payload keys (CSV fields, element attributes or children) mapped
    /// onto issue fields.
    pub id_field: Option<String>,
    pub summary_field: Option<String>,
    pub description_field: Option<String>,
    pub submitter_field: Option<String>,
    pub date_field: Option<String>,
    pub status_field: Option<String>,
}

impl TrackerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        TrackerConfig {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn issue_tag(&self) -> &str {
        self.issue_tag.as_deref().unwrap_or("issue")
    }

    pub fn id_field(&self) -> &str {
        self.id_field.as_deref().unwrap_or("id")
    }

    pub fn summary_field(&self) -> &str {
        self.summary_field.as_deref().unwrap_or("summary")
    }

    pub fn description_field(&self) -> &str {
        self.description_field.as_deref().unwrap_or("description")
    }

    pub fn submitter_field(&self) -> &str {
        self.submitter_field.as_deref().unwrap_or("submitted_by")
    }
}
