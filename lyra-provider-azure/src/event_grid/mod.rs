//! EventGrid event subscriptions - expand/flatten translation layer
//!
//! The boundary between the flat configuration representation and the ARM
//! wire model. `config` holds the typed configuration structs (decoded once
//! from the value model), `wire` the closed sum types mirroring the API's
//! tagged unions, and `expand`/`flatten` the two directions of the
//! translation. The round-trip law is
//! `flatten(expand(c)) == c.canonicalize()`.

pub mod config;
pub mod expand;
pub mod flatten;
pub mod schema;
pub mod wire;
