//! xmlsort - pattern-driven XML normalizer
//!
//! Re-serializes an XML document with attributes and sibling elements in a
//! canonical order, so that two versions of the same file diff cleanly.
//!
//! # Quick Start
//!
//! ```
//! use xmlsort::{sort_str, Options, Pattern, PatternRole};
//! # fn main() -> Result<(), xmlsort::Error> {
//! let pattern = Pattern::parse(["x:b,a"], PatternRole::Order, false)?;
//! let options = Options::new().with_pattern(pattern);
//! let sorted = sort_str(r#"<x a="1" b="2"/>"#, &options)?;
//! assert_eq!(sorted, "<x b=\"2\" a=\"1\"/>\n");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::io::Write;

use tracing::instrument;

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod lexer;

pub mod xml;
pub use xml::{
    Config as XmlConfig, Content as XmlContent, Document as XmlDocument, Element as XmlElement,
    Parser as XmlParser,
};

pub mod pattern;
pub use pattern::{ANDROID_PATTERN, Pattern, PatternRole, Rank, Sortable, WILDCARD};

pub mod options;
pub use options::Options;

pub mod tree;
pub use tree::{Builder, Element, Group};

pub mod render;
pub use render::Renderer;

/// Header written ahead of every rendered document
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Parse XML from string
pub fn from_xml_str(s: &str) -> Result<XmlDocument> {
    let mut parser = XmlParser::new(s.as_bytes());
    parser.parse()
}

/// Parse XML from bytes
pub fn from_xml_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    let mut parser = XmlParser::new(bytes);
    parser.parse()
}

/// Sort a document given as a string
///
/// Returns the rendered document without the XML declaration.
#[instrument(level = "debug", skip_all, fields(len = input.len()))]
pub fn sort_str(input: &str, options: &Options) -> Result<String> {
    sort_bytes(input.as_bytes(), options)
}

/// Sort a document given as bytes
pub fn sort_bytes(input: &[u8], options: &Options) -> Result<String> {
    let document = XmlParser::with_config(input, options.parser).parse()?;
    let tree = Builder::new(options).build(&document);
    Ok(Renderer::new(options).render(&tree, ""))
}

/// Write the XML declaration followed by a rendered document
pub fn write_document<W: Write>(writer: &mut W, rendered: &str) -> Result<()> {
    writer.write_all(XML_DECLARATION.as_bytes())?;
    writer.write_all(rendered.as_bytes())?;
    writer.flush()?;
    Ok(())
}
