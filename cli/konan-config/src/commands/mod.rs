//! CLI command implementations.

pub mod check;
pub mod clang;
pub mod deps;
pub mod describe;
pub mod get;
pub mod link;
pub mod targets;
