//! Lyra Core
//!
//! Configuration value model and schema layer shared by the provider crates.

pub mod schema;
pub mod value;
