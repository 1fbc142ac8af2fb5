//! Annotation-delimited clusters of sibling elements

use crate::pattern::Sortable;
use crate::tree::element::Element;

/// Scope name under which groups themselves are ordered in free-order mode
pub const GROUP_SCOPE: &str = "group";

/// Siblings that followed a marker comment, rendered together under it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Group {
    marker: String,
    members: Vec<Element>,
}

impl Group {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            members: Vec::new(),
        }
    }

    /// Full text of the comment that opened the group
    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn members(&self) -> &[Element] {
        &self.members
    }

    pub fn push(&mut self, element: Element) {
        self.members.push(element);
    }
}

impl Sortable for Group {
    fn rank_name(&self) -> &str {
        &self.marker
    }
}
