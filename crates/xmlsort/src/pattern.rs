//! Ordering patterns and the comparator built from them
//!
//! A pattern spec has the shape `element:item1,item2,...`. Without the
//! `element:` prefix the items apply to every element (the wildcard entry,
//! keyed by the empty name). An item written `a=b` declares that attribute
//! `b` is dropped when it carries the same value as `a`.

use std::cmp::Ordering;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::tree::Element;

/// Element name of the entry that applies when no element-specific entry exists
pub const WILDCARD: &str = "";

/// Ordering preset for Android repo manifests
pub const ANDROID_PATTERN: [&str; 4] = [
    "project:path,name,revision,group",
    "remote:name,fetch,review",
    "copyfile:src,dest",
    "linkfile:src,dest",
];

/// How a list of pattern specs is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternRole {
    /// Attribute and child ordering; `a=b` items become duplicate rules
    Order,
    /// Duplicate-attribute rules only; every item must be `a=b`
    Duplicate,
    /// Omission: a bare name drops the element, `element:attr` drops attributes
    Omit,
}

/// Position of a name within its ordering list
///
/// Listed names sort before unlisted ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rank {
    Listed(usize),
    Unlisted,
}

/// Anything the comparator can order
pub trait Sortable {
    /// Name looked up in the ordering list
    fn rank_name(&self) -> &str;

    /// Text compared when two items share a rank
    fn sort_text(&self) -> &str {
        self.rank_name()
    }
}

impl Sortable for str {
    fn rank_name(&self) -> &str {
        self
    }
}

impl Sortable for String {
    fn rank_name(&self) -> &str {
        self
    }
}

impl<T: Sortable + ?Sized> Sortable for &T {
    fn rank_name(&self) -> &str {
        (**self).rank_name()
    }

    fn sort_text(&self) -> &str {
        (**self).sort_text()
    }
}

/// Per-element orderings plus duplicate-attribute rules
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    orderings: IndexMap<String, Vec<String>>,
    duplicates: IndexMap<String, IndexMap<String, String>>,
    case_insensitive: bool,
}

impl Pattern {
    /// Create an empty pattern
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            case_insensitive,
            ..Self::default()
        }
    }

    /// Compile pattern specs for the given role
    pub fn parse<I, S>(specs: I, role: PatternRole, case_insensitive: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pattern = Self::new(case_insensitive);
        for spec in specs {
            pattern.add_spec(spec.as_ref(), role)?;
        }
        debug!(
            ?role,
            orderings = pattern.orderings.len(),
            duplicates = pattern.duplicates.len(),
            "compiled pattern"
        );
        Ok(pattern)
    }

    fn add_spec(&mut self, spec: &str, role: PatternRole) -> Result<()> {
        if spec.is_empty() {
            return Err(Error::pattern(spec, "empty pattern"));
        }

        let (element, items) = match spec.split_once(':') {
            Some((_, items)) if items.contains(':') => {
                return Err(Error::pattern(spec, "more than one ':'"));
            }
            Some(parts) => parts,
            None if role == PatternRole::Omit => {
                self.orderings.entry(spec.to_string()).or_default();
                return Ok(());
            }
            None => (WILDCARD, spec),
        };

        for item in items.split(',') {
            if item.is_empty() {
                return Err(Error::pattern(spec, "empty item"));
            }
            match (item.split_once('='), role) {
                (Some(_), PatternRole::Omit) => {
                    return Err(Error::pattern(spec, "'=' is not allowed in an omit pattern"));
                }
                (Some((kept, dropped)), _) => {
                    if kept.is_empty() || dropped.is_empty() {
                        return Err(Error::pattern(spec, "expected attr1=attr2"));
                    }
                    self.duplicates
                        .entry(element.to_string())
                        .or_default()
                        .insert(kept.to_string(), dropped.to_string());
                }
                (None, PatternRole::Duplicate) => {
                    return Err(Error::pattern(spec, "expected attr1=attr2"));
                }
                (None, _) => {
                    let list = self.orderings.entry(element.to_string()).or_default();
                    if !list.iter().any(|listed| listed == item) {
                        list.push(item.to_string());
                    }
                }
            }
        }

        Ok(())
    }

    /// Register a duplicate rule: drop `dropped` when it equals `kept`
    #[must_use]
    pub fn with_duplicate(mut self, element: &str, kept: &str, dropped: &str) -> Self {
        self.duplicates
            .entry(element.to_string())
            .or_default()
            .insert(kept.to_string(), dropped.to_string());
        self
    }

    /// Ordering list for `element`, falling back to the wildcard entry
    pub fn ordering(&self, element: &str) -> Option<&[String]> {
        self.orderings
            .get(element)
            .or_else(|| self.orderings.get(WILDCARD))
            .map(Vec::as_slice)
    }

    /// Duplicate rules for `element`, falling back to the wildcard entry
    pub fn duplicates(&self, element: &str) -> Option<&IndexMap<String, String>> {
        self.duplicates
            .get(element)
            .or_else(|| self.duplicates.get(WILDCARD))
    }

    pub fn order_rank(&self, element: &str, item: &str) -> Rank {
        self.ordering(element)
            .and_then(|list| list.iter().position(|listed| listed == item))
            .map_or(Rank::Unlisted, Rank::Listed)
    }

    /// Compare two names under the ordering of `element`
    pub fn compare(&self, element: &str, a: &str, b: &str) -> Ordering {
        self.compare_items(element, a, b)
    }

    /// Compare by rank first, then by sort text
    pub fn compare_items<T: Sortable + ?Sized>(&self, element: &str, a: &T, b: &T) -> Ordering {
        let ra = self.order_rank(element, a.rank_name());
        let rb = self.order_rank(element, b.rank_name());
        ra.cmp(&rb)
            .then_with(|| self.compare_text(a.sort_text(), b.sort_text()))
    }

    fn compare_text(&self, a: &str, b: &str) -> Ordering {
        if self.case_insensitive {
            a.chars()
                .flat_map(char::to_lowercase)
                .cmp(b.chars().flat_map(char::to_lowercase))
        } else {
            a.cmp(b)
        }
    }

    /// Stable sort of `items` under the ordering of `element`
    pub fn sort<'a, T, I>(&self, items: I, element: &str) -> Vec<&'a T>
    where
        T: Sortable + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut sorted: Vec<&'a T> = items.into_iter().collect();
        sorted.sort_by(|a, b| self.compare_items(element, *a, *b));
        sorted
    }

    /// Drop each registered duplicate attribute whose value equals its partner's
    pub fn resolve_duplicates(&self, element: &mut Element) {
        let Some(rules) = self.duplicates(element.name()) else {
            return;
        };
        for (kept, dropped) in rules {
            let attributes = element.attributes();
            let same = matches!(
                (attributes.get(kept), attributes.get(dropped)),
                (Some(a), Some(b)) if a == b
            );
            if same && kept != dropped {
                element.remove_attribute(dropped);
            }
        }
    }

    /// Whether `element` is omitted as a whole
    pub fn has_element_without_attr(&self, element: &str) -> bool {
        self.orderings.get(element).is_some_and(Vec::is_empty)
    }

    /// Whether attribute `attr` of `element` is listed
    ///
    /// Both the element's own entry and the wildcard entry are consulted.
    pub fn has_attr(&self, element: &str, attr: &str) -> bool {
        [element, WILDCARD]
            .iter()
            .filter_map(|name| self.orderings.get(*name))
            .any(|list| list.iter().any(|listed| listed == attr))
    }
}
