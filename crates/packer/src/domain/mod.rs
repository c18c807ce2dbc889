//! Domain types for packages, items, and their parsing.

pub mod errors;
pub mod model;
pub mod parse;
