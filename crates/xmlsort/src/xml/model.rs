//! XML data model as read from the source document

use indexmap::IndexMap;

/// XML document: the root element plus any comments around it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub children: Vec<Content>,
}

impl Document {
    /// The root element
    pub fn root(&self) -> Option<&Element> {
        self.children.iter().find_map(|child| match child {
            Content::Element(element) => Some(element),
            _ => None,
        })
    }
}

/// XML element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    /// Decoded character data, untrimmed
    Text(String),
    /// Comment body between `<!--` and `-->`
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}
