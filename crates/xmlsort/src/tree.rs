//! In-memory model the renderer sorts and serializes

pub mod builder;
pub mod element;
pub mod group;

pub use builder::{Builder, is_group_marker};
pub use element::{COMMENT, DOCUMENT, Element, TEXT};
pub use group::{GROUP_SCOPE, Group};
