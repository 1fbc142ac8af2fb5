//! Configuration shared by the tree builder and the renderer

use crate::pattern::Pattern;
use crate::xml::Config;

/// Everything that controls how a document is rebuilt and rendered
///
/// # Examples
///
/// ```
/// use xmlsort::{Options, Pattern, PatternRole};
/// # fn main() -> Result<(), xmlsort::Error> {
/// let options = Options::new()
///     .with_pattern(Pattern::parse(["x:b,a"], PatternRole::Order, false)?)
///     .keep_order(true);
/// assert!(options.keep_order);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    /// Attribute and child orderings
    pub pattern: Pattern,
    /// Duplicate-attribute rules
    pub duplicates: Pattern,
    /// Elements and attributes left out of the output
    pub omit: Pattern,
    /// Preserve first-seen child name order, sorting only within each name
    pub keep_order: bool,
    /// Cluster siblings that follow an `@word(...)` marker comment
    pub use_group: bool,
    /// Drop comments that are not group markers
    pub ignore_comment: bool,
    /// Limits applied while parsing the input
    pub parser: Config,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    #[must_use]
    pub fn with_duplicates(mut self, duplicates: Pattern) -> Self {
        self.duplicates = duplicates;
        self
    }

    #[must_use]
    pub fn with_omit(mut self, omit: Pattern) -> Self {
        self.omit = omit;
        self
    }

    #[must_use]
    pub const fn keep_order(mut self, keep_order: bool) -> Self {
        self.keep_order = keep_order;
        self
    }

    #[must_use]
    pub const fn use_group(mut self, use_group: bool) -> Self {
        self.use_group = use_group;
        self
    }

    #[must_use]
    pub const fn ignore_comment(mut self, ignore_comment: bool) -> Self {
        self.ignore_comment = ignore_comment;
        self
    }

    /// Reject documents nested deeper than `max_depth` elements (0 means unlimited)
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: u16) -> Self {
        self.parser.max_depth = max_depth;
        self
    }
}
