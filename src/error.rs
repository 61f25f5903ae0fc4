use std::path::PathBuf;
use thiserror::Error;

/// Wrapped originating failure carried by the parse and unmarshalling errors.
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum RastroError {
    /// A candidate backend package could not be imported (strict discovery).
    #[error("error importing backend {name}.{}", fmt_cause(.cause))]
    BackendImport {
        name: String,
        cause: Option<Cause>,
    },

    /// A backend name was requested that the manager never catalogued.
    #[error("backend {name} not found.")]
    BackendNotFound { name: String },

    /// `parse()` was invoked on absent content, before any format work.
    #[error("invalid stream: parser content must be text")]
    InvalidStream,

    #[error("error parsing CSV.{}", fmt_cause(.cause))]
    CsvParse { cause: Option<Cause> },

    #[error("error parsing HTML.{}", fmt_cause(.cause))]
    HtmlParse { cause: Option<Cause> },

    #[error("error parsing XML.{}", fmt_cause(.cause))]
    XmlParse { cause: Option<Cause> },

    /// A parsed structure could not be converted into a domain object.
    #[error("error unmarshalling object to {target}.{}{}", fmt_reason(.reason), fmt_cause(.cause))]
    Unmarshalling {
        target: String,
        reason: Option<String>,
        cause: Option<Cause>,
    },

    #[error("manifest error in '{file}': {message}")]
    Manifest { file: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    /// Storage collaborator failure.
    #[error("storage error: {0}")]
    StorageError(String),

    #[error("{0}")]
    Other(String),
}

impl RastroError {
    /// Import failure for the named package, wrapping the underlying cause.
    pub fn backend_import(name: impl Into<String>, cause: impl Into<Cause>) -> Self {
        RastroError::BackendImport {
            name: name.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn unmarshalling(target: impl Into<String>) -> Self {
        RastroError::Unmarshalling {
            target: target.into(),
            reason: None,
            cause: None,
        }
    }

    pub fn unmarshalling_reason(target: impl Into<String>, reason: impl Into<String>) -> Self {
        RastroError::Unmarshalling {
            target: target.into(),
            reason: Some(reason.into()),
            cause: None,
        }
    }
}

fn fmt_cause(cause: &Option<Cause>) -> String {
    match cause {
        Some(c) => format!(" {c}"),
        None => String::new(),
    }
}

fn fmt_reason(reason: &Option<String>) -> String {
    match reason {
        Some(r) => format!(" {r}."),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, RastroError>;
