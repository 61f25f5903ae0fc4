//! Backend manifest parser.
//!
//! A manifest package is a directory whose entry manifest, `backend.kdl`,
//! declares the backends the package publishes:
//!
//! ```kdl
//! backend "bugzilla-csv" {
//!     url "https://bugs.example.com/report.csv"
//!     format "csv"
//!     delimiter ","
//!     map {
//!         id "bug_id"
//!         summary "short_desc"
//!         submitter "assigned_to"
//!         date "changeddate"
//!         status "bug_status"
//!     }
//! }
//! import "shared.kdl"
//! ```
//!
//! Only the entry manifest registers backends. Sibling `.kdl` files may hold
//! definitions too, but they stay private helpers unless the entry manifest
//! re-exports them with an `import` node.

use crate::backends::config::{PayloadFormat, TrackerConfig};
use crate::error::{RastroError, Result};
use kdl::{KdlDocument, KdlNode};
use std::path::Path;

/// File name marking a directory as an importable backend package.
pub const ENTRY_MANIFEST: &str = "backend.kdl";

/// Parse a package's entry manifest into the backend definitions it
/// publishes. `dir` is the package directory, used to resolve `import`
/// nodes and relative `file` payload paths.
pub fn parse_entry_manifest(content: &str, dir: &Path) -> Result<Vec<TrackerConfig>> {
    let doc: KdlDocument = content
        .parse()
        .map_err(|e| manifest_error(ENTRY_MANIFEST, e))?;

    let mut configs = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "backend" => configs.push(parse_backend_node(node, dir, ENTRY_MANIFEST)?),
            "import" => configs.extend(import_sibling(node, dir)?),
            // Unknown top-level nodes are tolerated for forward compatibility.
            _ => {}
        }
    }

    Ok(configs)
}

/// Load definitions from a sibling file named by an `import` node.
/// Imports are not transitive: only `backend` nodes of the target count.
fn import_sibling(node: &KdlNode, dir: &Path) -> Result<Vec<TrackerConfig>> {
    let Some(file) = node.entries().first().and_then(|e| e.value().as_string()) else {
        return Err(RastroError::Manifest {
            file: ENTRY_MANIFEST.to_string(),
            message: "import requires a file name. Usage: import \"file.kdl\"".to_string(),
        });
    };

    let path = dir.join(file);
    let content = std::fs::read_to_string(&path).map_err(|source| RastroError::IoError {
        path: path.clone(),
        source,
    })?;

    let doc: KdlDocument = content.parse().map_err(|e| manifest_error(file, e))?;

    let mut configs = Vec::new();
    for node in doc.nodes() {
        if node.name().value() == "backend" {
            configs.push(parse_backend_node(node, dir, file)?);
        }
    }
    Ok(configs)
}

fn parse_backend_node(node: &KdlNode, dir: &Path, file: &str) -> Result<TrackerConfig> {
    let name = node
        .entries()
        .first()
        .and_then(|entry| entry.value().as_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| RastroError::Manifest {
            file: file.to_string(),
            message: "Backend name required. Usage: backend \"name\" { ... }".to_string(),
        })?
        .to_string();

    let mut config = TrackerConfig::new(&name);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            let child_name = child.name().value();
            match child_name {
                "url" => config.url = first_string(child).map(str::to_string),
                "file" => {
                    if let Some(path) = first_string(child) {
                        config.file = Some(dir.join(path));
                    }
                }
                "format" => {
                    let value = first_string(child).unwrap_or_default();
                    config.format = value.parse::<PayloadFormat>().map_err(|message| {
                        RastroError::Manifest {
                            file: file.to_string(),
                            message,
                        }
                    })?;
                }
                "fields" => {
                    let names: Vec<String> = child
                        .entries()
                        .iter()
                        .filter_map(|e| e.value().as_string())
                        .map(str::to_string)
                        .collect();
                    if !names.is_empty() {
                        config.fieldnames = Some(names);
                    }
                }
                "delimiter" => config.delimiter = Some(single_char(child, &name, file)?),
                "quote" => config.quotechar = Some(single_char(child, &name, file)?),
                "issue_tag" => config.issue_tag = first_string(child).map(str::to_string),
                "map" => parse_field_map(child, &mut config),
                _ => {}
            }
        }
    }

    Ok(config)
}

fn parse_field_map(node: &KdlNode, config: &mut TrackerConfig) {
    let Some(children) = node.children() else {
        return;
    };

    for child in children.nodes() {
        let value = first_string(child).map(str::to_string);
        match child.name().value() {
            "id" => config.id_field = value,
            "summary" => config.summary_field = value,
            "description" => config.description_field = value,
            "submitter" => config.submitter_field = value,
            "date" => config.date_field = value,
            "status" => config.status_field = value,
            _ => {}
        }
    }
}

fn first_string(node: &KdlNode) -> Option<&str> {
    node.entries().first().and_then(|e| e.value().as_string())
}

// Dialect characters end up as single bytes in the reader, so only ASCII
// is accepted here.
fn single_char(node: &KdlNode, backend: &str, file: &str) -> Result<char> {
    let value = first_string(node).unwrap_or_default();
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(RastroError::Manifest {
            file: file.to_string(),
            message: format!(
                "backend '{}': '{}' expects a single ASCII character, got \"{}\"",
                backend,
                node.name().value(),
                value
            ),
        }),
    }
}

fn manifest_error(file: &str, error: kdl::KdlError) -> RastroError {
    RastroError::Manifest {
        file: file.to_string(),
        message: error.to_string(),
    }
}
