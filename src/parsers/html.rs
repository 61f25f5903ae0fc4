use crate::error::{RastroError, Result};
use crate::parsers::tree::{BuildMode, Element, build_tree};

/// Lazy parser for tag-tree (HTML) payloads.
///
/// Real-world tracker pages are rarely well-formed, so the underlying reader
/// runs in a lenient configuration: void elements close themselves,
/// mis-nested end tags are recovered, stray ones dropped, and tag and
/// attribute names are lowercased. Only grossly broken markup fails.
pub struct HtmlParser {
    content: Option<String>,
    data: Option<Element>,
}

impl HtmlParser {
    pub fn new(content: Option<&str>) -> Self {
        HtmlParser {
            content: content.map(str::to_string),
            data: None,
        }
    }

    /// Synthetic document element holding the page's top-level nodes;
    /// `None` until `parse()` succeeds.
    pub fn data(&self) -> Option<&Element> {
        self.data.as_ref()
    }

    pub fn parse(&mut self) -> Result<()> {
        let content = self.content.as_deref().ok_or(RastroError::InvalidStream)?;

        let document = build_tree(content, BuildMode::Lenient).map_err(|cause| {
            RastroError::HtmlParse { cause: Some(cause) }
        })?;

        self.data = Some(document);
        Ok(())
    }
}
