//! Resource catalog.
//!
//! ## Contents
//! - [`ResourceSpec`] raw `(name, capacity)` descriptor
//! - [`Resource`], [`ResourceId`] validated catalog entry and its dense index
//! - [`ResourcePool`] capacity/held bookkeeping with availability queries

mod resource;
mod table;

pub(crate) use resource::quantity;
pub use resource::{Resource, ResourceId, ResourceSpec};
pub use table::ResourcePool;
