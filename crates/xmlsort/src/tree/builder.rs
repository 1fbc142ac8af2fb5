//! Builds the sortable tree from a parsed document

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::options::Options;
use crate::tree::element::{DOCUMENT, Element};
use crate::xml::model::{Content, Document, Element as XmlElement};

#[allow(clippy::expect_used)]
static GROUP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w+\(.+\)").expect("invalid group marker pattern"));

/// Whether a comment body opens a group, e.g. `@group(tools)`
pub fn is_group_marker(comment: &str) -> bool {
    GROUP_MARKER.is_match(comment)
}

/// Where the next sibling is attached
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Container {
    Parent,
    InGroup(usize),
}

/// Converts the parser's node tree into [`Element`]s
#[derive(Debug)]
pub struct Builder<'a> {
    options: &'a Options,
}

impl<'a> Builder<'a> {
    pub const fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Build the `#document` node holding the top-level nodes
    pub fn build(&self, document: &Document) -> Element {
        let mut root = Element::new(DOCUMENT);
        self.attach_children(&mut root, &document.children);
        debug!(
            children = root.children().len(),
            groups = root.groups().len(),
            "built document tree"
        );
        root
    }

    fn build_content(&self, content: &Content) -> Element {
        match content {
            Content::Element(source) => self.build_element(source),
            Content::Text(text) => Element::text(trim_line_breaks(text)),
            Content::Comment(body) => Element::comment(trim_line_breaks(body)),
            // no markup of its own to carry over: an empty tag named after the target
            Content::ProcessingInstruction { target, .. } => Element::new(target.as_str()),
        }
    }

    fn build_element(&self, source: &XmlElement) -> Element {
        let mut element = Element::new(source.name.as_str());
        for (name, value) in &source.attributes {
            element.set_attribute(name.as_str(), value.as_str());
        }
        self.options.duplicates.resolve_duplicates(&mut element);
        self.options.pattern.resolve_duplicates(&mut element);

        self.attach_children(&mut element, &source.children);
        element
    }

    fn attach_children(&self, parent: &mut Element, children: &[Content]) {
        let mut container = Container::Parent;
        for content in children {
            let child = self.build_content(content);

            if child.is_text() && child.data().trim().is_empty() {
                continue;
            }

            if child.is_comment() {
                if self.options.use_group && is_group_marker(child.data()) {
                    let index = parent.open_group(child.data());
                    trace!(marker = child.data(), index, "group opened");
                    container = Container::InGroup(index);
                    continue;
                }
                if self.options.ignore_comment {
                    continue;
                }
            }

            match container {
                Container::Parent => parent.push_child(child, self.options.keep_order),
                Container::InGroup(index) => parent.push_to_group(index, child),
            }
        }
    }
}

/// Strip leading and trailing line breaks along with the indentation around them
///
/// Spaces between a line break and the text itself belong to the text.
fn trim_line_breaks(text: &str) -> &str {
    let body = text.trim_start_matches(|ch: char| ch.is_ascii_whitespace());
    let leading = text.get(..text.len() - body.len()).unwrap_or_default();
    let start = leading.rfind(['\r', '\n']).map_or(0, |index| index + 1);
    let text = text.get(start..).unwrap_or_default();

    let body = text.trim_end_matches(|ch: char| ch.is_ascii_whitespace());
    let trailing = text.get(body.len()..).unwrap_or_default();
    let end = body.len() + trailing.find(['\r', '\n']).unwrap_or(trailing.len());
    text.get(..end).unwrap_or_default()
}
