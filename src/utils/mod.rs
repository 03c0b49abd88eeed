//! Shared helpers.

pub mod path;
