//! CLI command implementations

pub mod build;
pub mod catalog;
pub mod retrieve;

pub use build::execute as build;
pub use catalog::execute as catalog;
pub use retrieve::execute as retrieve;
