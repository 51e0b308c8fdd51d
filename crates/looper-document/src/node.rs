//! Element tree representation.

/// HTML elements that never have content or an end tag.
pub(crate) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is emitted verbatim.
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Check whether `tag` is a void element.
pub(crate) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Check whether `tag` holds raw text.
pub(crate) fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Element node with `ElementTree`-style text layout.
///
/// `text` is the content before the first child, `tail` is the content after
/// this element's end tag and before the next sibling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Element tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: String,
    /// Text after the end tag.
    pub tail: String,
    /// Child elements.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set tail content.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name, value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Append a child element.
    pub fn append_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Concatenated text of this element and its descendants (tails included,
    /// own tail excluded).
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// First descendant with the given tag (depth-first, pre-order).
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&Node> {
        self.find_by(&|node| node.tag.eq_ignore_ascii_case(tag))
    }

    /// Mutable variant of [`Node::find`].
    pub fn find_mut(&mut self, tag: &str) -> Option<&mut Node> {
        self.find_by_mut(&|node| node.tag.eq_ignore_ascii_case(tag))
    }

    /// All descendants with the given tag, in document order.
    #[must_use]
    pub fn find_all(&self, tag: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        collect_matching(self, &|node| node.tag.eq_ignore_ascii_case(tag), &mut found);
        found
    }

    /// First descendant whose `id` attribute equals `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<&Node> {
        self.find_by(&|node| node.attr("id") == Some(id))
    }

    /// Mutable variant of [`Node::get_element_by_id`].
    pub fn get_element_by_id_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.find_by_mut(&|node| node.attr("id") == Some(id))
    }

    fn find_by(&self, pred: &dyn Fn(&Node) -> bool) -> Option<&Node> {
        for child in &self.children {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_by(pred) {
                return Some(found);
            }
        }
        None
    }

    fn find_by_mut(&mut self, pred: &dyn Fn(&Node) -> bool) -> Option<&mut Node> {
        for child in &mut self.children {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_by_mut(pred) {
                return Some(found);
            }
        }
        None
    }
}

fn collect_text(node: &Node, out: &mut String) {
    out.push_str(&node.text);
    for child in &node.children {
        collect_text(child, out);
        out.push_str(&child.tail);
    }
}

fn collect_matching<'a>(node: &'a Node, pred: &dyn Fn(&Node) -> bool, found: &mut Vec<&'a Node>) {
    for child in &node.children {
        if pred(child) {
            found.push(child);
        }
        collect_matching(child, pred, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::new("body").with_children(vec![
            Node::new("h1").with_attr("id", "title").with_text("Hello"),
            Node::new("p").with_text("One ").with_children(vec![
                Node::new("em").with_text("two").with_tail(" three"),
            ]),
            Node::new("p").with_text("Four"),
        ])
    }

    #[test]
    fn test_find_and_find_all() {
        let body = sample();

        assert_eq!(body.find("h1").unwrap().text, "Hello");
        assert_eq!(body.find("EM").unwrap().text, "two");
        assert_eq!(body.find_all("p").len(), 2);
        assert!(body.find("table").is_none());
    }

    #[test]
    fn test_text_content_includes_tails() {
        let body = sample();
        let p = body.find("p").unwrap();

        assert_eq!(p.text_content(), "One two three");
    }

    #[test]
    fn test_attribute_helpers() {
        let mut node = Node::new("a").with_attr("href", "/old");

        node.set_attr("href", "/new");
        node.set_attr("rel", "nofollow");

        assert_eq!(node.attr("href"), Some("/new"));
        assert_eq!(
            node.attrs,
            vec![
                ("href".to_owned(), "/new".to_owned()),
                ("rel".to_owned(), "nofollow".to_owned())
            ]
        );
        assert_eq!(node.remove_attr("rel"), Some("nofollow".to_owned()));
        assert_eq!(node.remove_attr("rel"), None);
    }

    #[test]
    fn test_get_element_by_id_mut() {
        let mut body = sample();

        body.get_element_by_id_mut("title").unwrap().text = "Changed".to_owned();

        assert_eq!(body.find("h1").unwrap().text, "Changed");
    }

    #[test]
    fn test_void_and_raw_text_classification() {
        assert!(is_void("br"));
        assert!(is_void("IMG"));
        assert!(!is_void("div"));
        assert!(is_raw_text("script"));
        assert!(!is_raw_text("p"));
    }
}
