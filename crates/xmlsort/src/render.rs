//! Serializes the sortable tree back to indented XML text

use std::borrow::Cow;
use std::collections::HashMap;

use crate::options::Options;
use crate::pattern::{Pattern, Rank};
use crate::tree::{Element, GROUP_SCOPE, Group};

/// One level of indentation
pub const INDENT: &str = "  ";

/// Renders [`Element`] trees, applying ordering and omission at every level
#[derive(Clone, Copy, Debug)]
pub struct Renderer<'a> {
    pattern: &'a Pattern,
    omit: &'a Pattern,
    keep_order: bool,
}

impl<'a> Renderer<'a> {
    pub const fn new(options: &'a Options) -> Self {
        Self {
            pattern: &options.pattern,
            omit: &options.omit,
            keep_order: options.keep_order,
        }
    }

    /// Render `element` and its subtree, without a trailing newline
    ///
    /// An omitted element renders as the empty string.
    pub fn render(&self, element: &Element, indent: &str) -> String {
        let mut out = String::new();
        self.write_element(&mut out, element, indent);
        out
    }

    fn write_element(&self, out: &mut String, element: &Element, indent: &str) {
        let name = element.name();
        if self.omit.has_element_without_attr(name) {
            return;
        }

        if element.is_normal() {
            out.push_str(indent);
            out.push('<');
            out.push_str(name);
            for attr in self.pattern.sort(element.attributes().keys(), name) {
                if self.omit.has_attr(name, attr) {
                    continue;
                }
                let value = element.attribute(attr).unwrap_or_default();
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
        } else if element.is_comment() {
            out.push_str(indent);
            out.push_str("<!--");
            out.push_str(element.data());
        } else {
            out.push_str(&escape_text(element.data()));
        }

        let child_indent = if element.is_normal() {
            Cow::Owned(format!("{indent}{INDENT}"))
        } else {
            Cow::Borrowed(indent)
        };

        let head = out.len();
        if element.is_normal() {
            out.push_str(">\n");
        }
        let body = out.len();

        if self.keep_order {
            for (_, bucket) in element.children_by_name() {
                for child in self.sort_siblings(bucket, name) {
                    self.write_child(out, child, &child_indent);
                }
            }
            for group in element.groups() {
                self.write_group(out, group, name, &child_indent);
            }
        } else {
            for child in self.sort_siblings(element.children(), name) {
                self.write_child(out, child, &child_indent);
            }
            for group in self.pattern.sort(element.groups(), GROUP_SCOPE) {
                self.write_group(out, group, name, &child_indent);
            }
        }

        // nothing left once omissions apply: same as having no children
        if out.len() == body {
            out.truncate(head);
            if element.is_normal() {
                out.push_str("/>");
            } else if element.is_comment() {
                out.push_str("-->");
            }
            return;
        }

        if element.is_normal() {
            if out.ends_with('\n') {
                out.push_str(indent);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        } else if element.is_comment() {
            out.push_str("-->");
        }
    }

    fn write_child(&self, out: &mut String, child: &Element, indent: &str) {
        let mark = out.len();
        self.write_element(out, child, indent);
        if out.len() > mark {
            out.push('\n');
        }
    }

    /// Blank line, marker comment, then the members sorted under `scope`
    fn write_group(&self, out: &mut String, group: &Group, scope: &str, indent: &str) {
        let mark = out.len();
        out.push('\n');
        out.push_str(indent);
        out.push_str("<!--");
        out.push_str(group.marker());
        out.push_str("-->\n");

        let body = out.len();
        for member in self.sort_siblings(group.members(), scope) {
            self.write_child(out, member, indent);
        }
        if out.len() == body {
            out.truncate(mark);
        }
    }

    /// Sort siblings under `scope`
    ///
    /// Only siblings whose rank collides with another's need their zero-indent
    /// rendering as a tie-break key; those keys are rendered here, once.
    fn sort_siblings<'e, I>(&self, siblings: I, scope: &str) -> Vec<&'e Element>
    where
        I: IntoIterator<Item = &'e Element>,
    {
        let siblings: Vec<&Element> = siblings.into_iter().collect();
        if siblings.len() > 1 {
            let ranks: Vec<Rank> = siblings
                .iter()
                .map(|sibling| self.pattern.order_rank(scope, sibling.name()))
                .collect();
            let mut counts: HashMap<Rank, usize> = HashMap::new();
            for rank in &ranks {
                *counts.entry(*rank).or_default() += 1;
            }
            for (sibling, rank) in siblings.iter().zip(&ranks) {
                if counts.get(rank).is_some_and(|count| *count > 1) {
                    sibling.sort_key_or_init(|| self.render(sibling, ""));
                }
            }
        }
        self.pattern.sort(siblings, scope)
    }
}

/// Escape character data for element content
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

/// Escape an attribute value for a double-quoted attribute
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape(value, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\t' => Some("&#9;"),
        '\n' => Some("&#10;"),
        '\r' => Some("&#13;"),
        _ => None,
    })
}

fn escape(input: &str, replacement: impl Fn(char) -> Option<&'static str>) -> Cow<'_, str> {
    if !input.chars().any(|ch| replacement(ch).is_some()) {
        return Cow::Borrowed(input);
    }

    let mut escaped = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match replacement(ch) {
            Some(entity) => escaped.push_str(entity),
            None => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::pattern::{PatternRole, Sortable};
    use crate::tree::Builder;
    use crate::xml::Parser;

    fn render(input: &str, options: &Options) -> Result<String> {
        let document = Parser::new(input.as_bytes()).parse()?;
        let tree = Builder::new(options).build(&document);
        Ok(Renderer::new(options).render(&tree, ""))
    }

    fn order(specs: &[&str]) -> Result<Pattern> {
        Pattern::parse(specs, PatternRole::Order, false)
    }

    #[test]
    fn test_self_closing_and_nesting() -> Result<()> {
        let out = render("<r><a x=\"1\"/><b><c/></b></r>", &Options::new())?;
        assert_eq!(out, "<r>\n  <a x=\"1\"/>\n  <b>\n    <c/>\n  </b>\n</r>\n");
        Ok(())
    }

    #[test]
    fn test_text_is_unindented_and_escaped() -> Result<()> {
        let out = render("<r><t>a &lt; b</t></r>", &Options::new())?;
        assert_eq!(out, "<r>\n  <t>\na &lt; b\n  </t>\n</r>\n");
        Ok(())
    }

    #[test]
    fn test_attribute_values_are_escaped() -> Result<()> {
        let out = render("<r a='say \"hi\" &amp; go'/>", &Options::new())?;
        assert_eq!(out, "<r a=\"say &quot;hi&quot; &amp; go\"/>\n");
        Ok(())
    }

    #[test]
    fn test_comment_rendering() -> Result<()> {
        let out = render("<r><!-- keep me --></r>", &Options::new())?;
        assert_eq!(out, "<r>\n  <!-- keep me -->\n</r>\n");
        Ok(())
    }

    #[test]
    fn test_element_omission_drops_subtree() -> Result<()> {
        let options =
            Options::new().with_omit(Pattern::parse(["b"], PatternRole::Omit, false)?);
        let out = render("<r><a/><b><c/></b></r>", &options)?;
        assert_eq!(out, "<r>\n  <a/>\n</r>\n");
        Ok(())
    }

    #[test]
    fn test_element_with_only_omitted_children_self_closes() -> Result<()> {
        let options =
            Options::new().with_omit(Pattern::parse(["b"], PatternRole::Omit, false)?);
        let out = render("<r><b/></r>", &options)?;
        assert_eq!(out, "<r/>\n");
        Ok(())
    }

    #[test]
    fn test_children_sort_by_rank_then_rendering() -> Result<()> {
        let options = Options::new().with_pattern(order(&["r:b"])?);
        let out = render(
            "<r><c/><a n=\"2\"/><b/><a n=\"1\"/></r>",
            &options,
        )?;
        assert_eq!(
            out,
            "<r>\n  <b/>\n  <a n=\"1\"/>\n  <a n=\"2\"/>\n  <c/>\n</r>\n"
        );
        Ok(())
    }

    #[test]
    fn test_groups_render_after_children() -> Result<()> {
        let options = Options::new().use_group(true);
        let out = render("<r><!--@g(1)--><z/><a/><!-- x --><y/></r>", &options)?;
        assert_eq!(
            out,
            "<r>\n\n  <!--@g(1)-->\n  <!-- x -->\n  <a/>\n  <y/>\n  <z/>\n</r>\n"
        );
        Ok(())
    }

    #[test]
    fn test_free_mode_orders_groups_by_marker() -> Result<()> {
        let options = Options::new().use_group(true);
        let out = render("<r><!--@g(b)--><b/><!--@g(a)--><a/></r>", &options)?;
        assert_eq!(
            out,
            "<r>\n\n  <!--@g(a)-->\n  <a/>\n\n  <!--@g(b)-->\n  <b/>\n</r>\n"
        );
        Ok(())
    }

    #[test]
    fn test_keep_order_groups_in_encounter_order() -> Result<()> {
        let options = Options::new().use_group(true).keep_order(true);
        let out = render("<r><!--@g(b)--><b/><!--@g(a)--><a/></r>", &options)?;
        assert_eq!(
            out,
            "<r>\n\n  <!--@g(b)-->\n  <b/>\n\n  <!--@g(a)-->\n  <a/>\n</r>\n"
        );
        Ok(())
    }

    #[test]
    fn test_fully_omitted_group_is_skipped() -> Result<()> {
        let options = Options::new()
            .use_group(true)
            .with_omit(Pattern::parse(["b"], PatternRole::Omit, false)?);
        let out = render("<r><a/><!--@g(x)--><b/></r>", &options)?;
        assert_eq!(out, "<r>\n  <a/>\n</r>\n");
        Ok(())
    }

    #[test]
    fn test_escape_borrows_when_clean() {
        assert!(matches!(escape_text("plain"), Cow::Borrowed("plain")));
        assert_eq!(escape_text("a<b>&c"), "a&lt;b&gt;&amp;c");
        assert_eq!(escape_attribute("\"q\""), "&quot;q&quot;");
    }

    #[test]
    fn test_attribute_whitespace_becomes_character_references() -> Result<()> {
        let out = render("<r a=\"x&#10;y\" b=\"&#9;\" c=\"&#13;\"/>", &Options::new())?;
        assert_eq!(out, "<r a=\"x&#10;y\" b=\"&#9;\" c=\"&#13;\"/>\n");
        // text content keeps its raw whitespace
        assert_eq!(escape_text("a\tb\n"), "a\tb\n");
        Ok(())
    }

    #[test]
    fn test_tie_break_keys_only_for_colliding_ranks() -> Result<()> {
        let options = Options::new().with_pattern(order(&["r:b,c"])?);
        let document = Parser::new(b"<r><a n=\"2\"/><c/><a n=\"1\"/><b><d/></b></r>").parse()?;
        let tree = Builder::new(&options).build(&document);
        let out = Renderer::new(&options).render(&tree, "");
        assert_eq!(
            out,
            "<r>\n  <b>\n    <d/>\n  </b>\n  <c/>\n  <a n=\"1\"/>\n  <a n=\"2\"/>\n</r>\n"
        );

        let root = tree.children().first();
        let keys: Vec<&str> = root
            .map(|r| r.children().iter().map(Sortable::sort_text).collect())
            .unwrap_or_default();
        // "b" and "c" have ranks of their own; the two unlisted "a" tie
        assert_eq!(keys, ["<a n=\"2\"/>", "", "<a n=\"1\"/>", ""]);
        Ok(())
    }

    #[test]
    fn test_single_child_chain_needs_no_keys() -> Result<()> {
        let options = Options::new();
        let document = Parser::new(b"<a><a><a/></a></a>").parse()?;
        let tree = Builder::new(&options).build(&document);
        Renderer::new(&options).render(&tree, "");

        let mut node = tree.children().first();
        while let Some(element) = node {
            assert_eq!(element.sort_text(), "");
            node = element.children().first();
        }
        Ok(())
    }
}
