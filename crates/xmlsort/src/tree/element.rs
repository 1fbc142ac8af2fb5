//! Element node of the sortable tree

use std::cell::OnceCell;

use indexmap::IndexMap;

use crate::pattern::Sortable;
use crate::tree::group::Group;

/// Synthetic name of character data nodes
pub const TEXT: &str = "#text";
/// Synthetic name of comment nodes
pub const COMMENT: &str = "#comment";
/// Synthetic name of the node holding the top-level nodes
pub const DOCUMENT: &str = "#document";

/// An element, or a synthetic `#text`/`#comment`/`#document` node
///
/// Children are kept in insertion order. In keep-order mode they are also
/// indexed by name, in the order each name was first seen.
///
/// The tie-break key is filled in by the renderer the first time the element
/// ties with a sibling, and cleared by every mutation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    data: String,
    children: Vec<Element>,
    by_name: IndexMap<String, Vec<usize>>,
    groups: Vec<Group>,
    sort_key: OnceCell<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn text(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::new(TEXT)
        }
    }

    pub fn comment(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::new(COMMENT)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A real tag, as opposed to a synthetic `#...` node
    pub fn is_normal(&self) -> bool {
        !self.name.starts_with('#')
    }

    pub fn is_text(&self) -> bool {
        self.name == TEXT
    }

    pub fn is_comment(&self) -> bool {
        self.name == COMMENT
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.sort_key.take();
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.sort_key.take();
        self.attributes.shift_remove(name)
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn has_content(&self) -> bool {
        !self.children.is_empty() || !self.groups.is_empty()
    }

    /// Append a child; `index_by_name` also files it under its name
    pub fn push_child(&mut self, child: Self, index_by_name: bool) {
        self.sort_key.take();
        if index_by_name {
            self.by_name
                .entry(child.name.clone())
                .or_default()
                .push(self.children.len());
        }
        self.children.push(child);
    }

    /// Children grouped by name, names in first-seen order
    ///
    /// Empty unless children were pushed with `index_by_name`.
    pub fn children_by_name(&self) -> impl Iterator<Item = (&str, Vec<&Self>)> {
        self.by_name.iter().map(|(name, indices)| {
            let bucket = indices
                .iter()
                .filter_map(|index| self.children.get(*index))
                .collect();
            (name.as_str(), bucket)
        })
    }

    /// Index of the group keyed by `marker`, opening it on first use
    pub fn open_group(&mut self, marker: &str) -> usize {
        if let Some(index) = self.groups.iter().position(|group| group.marker() == marker) {
            return index;
        }
        self.sort_key.take();
        self.groups.push(Group::new(marker));
        self.groups.len() - 1
    }

    pub fn push_to_group(&mut self, index: usize, child: Self) {
        if let Some(group) = self.groups.get_mut(index) {
            self.sort_key.take();
            group.push(child);
        }
    }

    /// Tie-break key, produced by `render` on first use
    pub fn sort_key_or_init(&self, render: impl FnOnce() -> String) -> &str {
        self.sort_key.get_or_init(render)
    }
}

impl Sortable for Element {
    fn rank_name(&self) -> &str {
        &self.name
    }

    /// Empty until the renderer has needed the key
    fn sort_text(&self) -> &str {
        self.sort_key.get().map_or("", String::as_str)
    }
}
