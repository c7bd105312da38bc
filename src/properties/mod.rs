//! Typed catalog of simulation properties.
//!
//! Names are resolved to a [`PropertyId`] once, at construction, and every
//! per-step read or write goes through the id.

pub mod catalog;
mod descriptor;
mod snapshot;

pub use descriptor::{PropertyDescriptor, PropertyId, PropertyKind, Unit};
pub use snapshot::PropertySnapshot;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    #[error("Unknown property '{0}'")]
    Unknown(String),

    #[error("Property '{0}' is read-only")]
    ReadOnly(String),
}
