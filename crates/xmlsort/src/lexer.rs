//! Lexer support for the XML parser

pub mod cursor;

pub use cursor::Cursor;
