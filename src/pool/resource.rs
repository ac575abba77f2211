//! # Resource descriptors and catalog entries.
//!
//! [`ResourceSpec`] is the raw descriptor produced by the loader (signed, so
//! negative input survives parsing and is rejected with a proper
//! [`ConfigError`]). [`Resource`] is the validated catalog entry kept by the
//! [`ResourcePool`](super::ResourcePool).

use std::sync::Arc;

use crate::error::ConfigError;

/// Dense index of a resource inside its pool.
///
/// Ids are handed out by [`ResourcePool`](super::ResourcePool) at construction
/// and are only meaningful for the pool that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub(crate) usize);

impl ResourceId {
    /// Position of the resource in catalog order.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Resource descriptor: `(name, capacity)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceSpec {
    /// Unique resource name.
    pub name: String,
    /// Total units (must be non-negative).
    pub capacity: i64,
}

impl ResourceSpec {
    /// Creates a new descriptor.
    pub fn new(name: impl Into<String>, capacity: i64) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }
}

/// A named pool of interchangeable capacity units.
///
/// `capacity` never changes after construction; `held` is only mutated by the
/// pool while the aggregate lock is held.
#[derive(Clone, Debug)]
pub struct Resource {
    name: Arc<str>,
    capacity: u32,
    held: u32,
}

impl Resource {
    pub(crate) fn new(name: Arc<str>, capacity: u32) -> Self {
        Self {
            name,
            capacity,
            held: 0,
        }
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    /// Total units.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Units currently held by tasks.
    pub fn held(&self) -> u32 {
        self.held
    }

    /// Units currently free (`capacity - held`).
    pub fn available(&self) -> u32 {
        self.capacity - self.held
    }

    pub(crate) fn held_mut(&mut self) -> &mut u32 {
        &mut self.held
    }
}

/// Converts a signed descriptor quantity into the simulator's unsigned range.
pub(crate) fn quantity(what: impl FnOnce() -> String, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::Negative {
            what: what(),
            value,
        });
    }
    u32::try_from(value).map_err(|_| ConfigError::OutOfRange {
        what: what(),
        value,
    })
}
