//! # Multi-format parsing facade
//!
//! Every backend interprets bulk tracker payloads through one of three lazy
//! parsers sharing the same contract:
//!
//! - content (possibly absent) is taken at construction, never validated there
//! - `parse()` checks the content exists before any format-specific work and
//!   fails with [`RastroError::InvalidStream`](crate::error::RastroError) if not
//! - the result is a private two-state value exposed read-only through
//!   `data()`: `None` before `parse()`, `Some` after
//! - underlying library failures are wrapped into one format-specific error
//!   variant carrying the original cause
//!
//! [`CsvParser`] covers delimited text (field names defaulting to the header
//! row, configurable delimiter and quote character), [`HtmlParser`] covers
//! lenient tag-tree markup, [`XmlParser`] covers strict XML. The two markup
//! parsers share the [`Element`] tree.

pub mod csv;
pub mod html;
pub mod tree;
pub mod xml;

pub use self::csv::{CsvParser, CsvRecord};
pub use self::html::HtmlParser;
pub use self::tree::{Element, Node};
pub use self::xml::XmlParser;
