//! Text rendering collaborator
//!
//! Turning raw documentation markup into stored strings is not this crate's
//! job. The exporter hands every text blob to a [`TextRenderer`] and stores
//! whatever comes back; the renderer also reports the symbolic keys it linked
//! to inside the text, which the exporter turns into cross-reference edges.

/// Output of rendering one text blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    /// The rendered string, stored verbatim
    pub text: String,
    /// Symbolic reference keys of link targets found in the text
    pub targets: Vec<String>,
}

impl Rendered {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), targets: Vec::new() }
    }
}

/// Renders documentation text for storage.
///
/// `scope_key` is the symbolic reference key of the entity the text belongs
/// to, available for renderers that resolve relative links.
pub trait TextRenderer {
    fn render(&self, scope_key: &str, text: &str) -> Rendered;
}

/// Pass-through renderer: stores text as-is and links nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl TextRenderer for PlainRenderer {
    fn render(&self, _scope_key: &str, text: &str) -> Rendered {
        Rendered::plain(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer_is_identity() {
        let r = PlainRenderer;
        let out = r.render("classDemo", "some **markup** here");
        assert_eq!(out.text, "some **markup** here");
        assert!(out.targets.is_empty());
    }
}
