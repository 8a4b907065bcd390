//! Domain types shared by the store and HTTP crates.

pub mod error;
pub mod record;
pub mod types;
