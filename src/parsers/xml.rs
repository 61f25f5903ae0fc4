use crate::error::{RastroError, Result};
use crate::parsers::tree::{BuildMode, Element, MarkupError, build_tree};

/// Lazy parser for XML payloads. Malformed documents always fail; there is
/// no lenient fallback.
pub struct XmlParser {
    content: Option<String>,
    data: Option<Element>,
}

impl XmlParser {
    pub fn new(content: Option<&str>) -> Self {
        XmlParser {
            content: content.map(str::to_string),
            data: None,
        }
    }

    /// The document's root element; `None` until `parse()` succeeds.
    pub fn data(&self) -> Option<&Element> {
        self.data.as_ref()
    }

    pub fn parse(&mut self) -> Result<()> {
        let content = self.content.as_deref().ok_or(RastroError::InvalidStream)?;

        let document = build_tree(content, BuildMode::Strict).map_err(|cause| {
            RastroError::XmlParse { cause: Some(cause) }
        })?;

        let mut roots = document.children();
        let root = match (roots.next(), roots.next()) {
            (Some(root), None) => root.clone(),
            (None, _) => {
                return Err(RastroError::XmlParse {
                    cause: Some(Box::new(MarkupError("no root element found".to_string()))),
                });
            }
            (Some(_), Some(extra)) => {
                return Err(RastroError::XmlParse {
                    cause: Some(Box::new(MarkupError(format!(
                        "extra content at end of document: <{}>",
                        extra.name()
                    )))),
                });
            }
        };

        self.data = Some(root);
        Ok(())
    }
}
