//! Lyra Azure Provider
//!
//! The translation core for Azure Resource Manager resources: typed
//! resource identifiers (parse / canonical format round trip) and the
//! expand/flatten layer between flat configuration and the EventGrid wire
//! model. Everything here is pure and synchronous; transport, polling and
//! authentication belong to the calling layer.

pub mod event_grid;
pub mod resource_id;
pub mod validation;
