//! Structured HTML document view for the looper pipeline.
//!
//! Files with the `html` extension get a [`Document`] alongside their raw
//! content. Plugins can query and mutate the element tree, then opt in to
//! persisting its serialization instead of the raw bytes.
//!
//! The parser is tolerant rather than standards-compliant: it handles void
//! elements, unclosed elements, `<script>`/`<style>` bodies and named
//! entities, which covers hand-written and generated pages in practice.
//!
//! # Example
//!
//! ```
//! use looper_document::Document;
//!
//! let mut doc = Document::parse("<html><body><h1 id=\"t\">Hi</h1></body></html>").unwrap();
//! doc.get_element_by_id_mut("t").unwrap().text = "Hello".to_owned();
//! assert_eq!(doc.to_html(), "<html><body><h1 id=\"t\">Hello</h1></body></html>");
//! ```

mod entities;
mod error;
mod node;
mod parser;
mod serializer;

pub use error::DocumentError;
pub use node::Node;

/// The one file extension that gets a structured view.
pub const HTML_EXTENSION: &str = "html";

/// Check whether files with `extension` get a structured document.
///
/// The comparison ignores ASCII case, so `HTML` qualifies too.
#[must_use]
pub fn is_recognized_extension(extension: &str) -> bool {
    extension.eq_ignore_ascii_case(HTML_EXTENSION)
}

/// Parsed HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    doctype: Option<String>,
    root: Node,
}

impl Document {
    /// Parse HTML text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the markup cannot be tokenized.
    pub fn parse(html: &str) -> Result<Self, DocumentError> {
        let parsed = parser::parse(html)?;
        Ok(Self {
            doctype: parsed.doctype,
            root: parsed.root,
        })
    }

    /// Doctype body (e.g. `html`), if the source had one.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Synthetic container holding the top-level nodes.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the synthetic container.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// First top-level element (usually `<html>`).
    #[must_use]
    pub fn document_element(&self) -> Option<&Node> {
        self.root.children.first()
    }

    /// First element with the given tag, anywhere in the document.
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&Node> {
        self.root.find(tag)
    }

    /// Mutable variant of [`Document::find`].
    pub fn find_mut(&mut self, tag: &str) -> Option<&mut Node> {
        self.root.find_mut(tag)
    }

    /// All elements with the given tag, in document order.
    #[must_use]
    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        self.root.find_all(tag)
    }

    /// Element whose `id` attribute equals `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<&Node> {
        self.root.get_element_by_id(id)
    }

    /// Mutable variant of [`Document::get_element_by_id`].
    pub fn get_element_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.root.get_element_by_id_mut(id)
    }

    /// Serialize back to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        serializer::serialize(self.doctype.as_deref(), &self.root)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Demo</title>\n</head>\n<body>\n<h1 id=\"title\">Hello</h1>\n<p class=\"lead\">One <em>two</em> three</p>\n</body>\n</html>\n";

    #[test]
    fn test_round_trip_preserves_structure() {
        let doc = Document::parse(PAGE).unwrap();

        assert_eq!(doc.to_html(), PAGE);
    }

    #[test]
    fn test_document_element_and_doctype() {
        let doc = Document::parse(PAGE).unwrap();

        assert_eq!(doc.doctype(), Some("html"));
        let html = doc.document_element().unwrap();
        assert_eq!(html.tag, "html");
        assert_eq!(html.attr("lang"), Some("en"));
    }

    #[test]
    fn test_queries() {
        let doc = Document::parse(PAGE).unwrap();

        assert_eq!(doc.find("title").unwrap().text, "Demo");
        assert_eq!(doc.get_element_by_id("title").unwrap().text, "Hello");
        assert_eq!(doc.find_all("em").len(), 1);
        assert_eq!(doc.find("p").unwrap().text_content(), "One two three");
    }

    #[test]
    fn test_mutation_is_serialized() {
        let mut doc = Document::parse(PAGE).unwrap();

        doc.find_mut("body")
            .unwrap()
            .append_child(Node::new("footer").with_text("bye").with_tail("\n"));
        doc.find_mut("p").unwrap().set_attr("class", "lead big");

        let html = doc.to_html();
        assert!(html.contains("<footer>bye</footer>\n</body>"));
        assert!(html.contains(r#"<p class="lead big">"#));
    }

    #[test]
    fn test_recognized_extension() {
        assert!(is_recognized_extension("html"));
        assert!(is_recognized_extension("HTML"));
        assert!(!is_recognized_extension("htm"));
        assert!(!is_recognized_extension("css"));
    }
}
