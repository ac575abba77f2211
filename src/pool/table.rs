//! # ResourcePool: capacity bookkeeping for the resource catalog.
//!
//! Holds `capacity` and `held` for every resource type and answers
//! availability queries.
//!
//! ## Rules
//! - Mutators take `&mut self`. The pool lives inside the session aggregate, so
//!   the only way to reach them is through the aggregate lock; they are not
//!   independently synchronized, because acquisition must update several
//!   resources as one unit.
//! - `0 <= held <= capacity` holds after every public call.
//! - Name-based calls fail with [`PoolError::UnknownResource`] for names
//!   outside the catalog; the id-based calls used by the allocator cannot fail.

use std::collections::HashMap;
use std::sync::Arc;

use super::resource::{Resource, ResourceId, ResourceSpec, quantity};
use crate::error::{ConfigError, PoolError};

/// Catalog of resources with their capacity and held counts.
#[derive(Clone, Debug, Default)]
pub struct ResourcePool {
    resources: Vec<Resource>,
    index: HashMap<Arc<str>, ResourceId>,
}

impl ResourcePool {
    /// Builds a pool from descriptors, preserving their order.
    ///
    /// Fails on negative capacities and duplicate names.
    pub fn from_specs(specs: &[ResourceSpec]) -> Result<Self, ConfigError> {
        let mut pool = Self {
            resources: Vec::with_capacity(specs.len()),
            index: HashMap::with_capacity(specs.len()),
        };
        for spec in specs {
            let capacity = quantity(|| format!("capacity of resource {:?}", spec.name), spec.capacity)?;
            let name: Arc<str> = Arc::from(spec.name.as_str());
            if pool.index.contains_key(&name) {
                return Err(ConfigError::DuplicateResource {
                    name: spec.name.clone(),
                });
            }
            let id = ResourceId(pool.resources.len());
            pool.index.insert(Arc::clone(&name), id);
            pool.resources.push(Resource::new(name, capacity));
        }
        Ok(pool)
    }

    /// Number of resource types.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// True if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Iterates resources in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Resolves a name to its id.
    pub fn id(&self, name: &str) -> Result<ResourceId, PoolError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| PoolError::UnknownResource {
                name: name.to_string(),
            })
    }

    /// Returns the resource for an id issued by this pool.
    #[inline]
    pub fn get(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    /// Units free for the named resource (`capacity - held`).
    pub fn available(&self, name: &str) -> Result<u32, PoolError> {
        self.id(name).map(|id| self.available_by_id(id))
    }

    /// Units free for a resource id.
    #[inline]
    pub fn available_by_id(&self, id: ResourceId) -> u32 {
        self.get(id).available()
    }

    /// Marks `amount` units of the named resource as held.
    ///
    /// Fails without changing anything if fewer than `amount` units are free.
    pub fn commit(&mut self, name: &str, amount: u32) -> Result<(), PoolError> {
        let id = self.id(name)?;
        let available = self.available_by_id(id);
        if amount > available {
            return Err(PoolError::Insufficient {
                name: name.to_string(),
                requested: amount,
                available,
            });
        }
        self.commit_id(id, amount);
        Ok(())
    }

    /// Returns `amount` held units of the named resource to the pool.
    ///
    /// Fails without changing anything if fewer than `amount` units are held.
    pub fn reclaim(&mut self, name: &str, amount: u32) -> Result<(), PoolError> {
        let id = self.id(name)?;
        let held = self.get(id).held();
        if amount > held {
            return Err(PoolError::Underflow {
                name: name.to_string(),
                requested: amount,
                held,
            });
        }
        self.reclaim_id(id, amount);
        Ok(())
    }

    /// Id-based commit; the caller has already checked availability.
    pub(crate) fn commit_id(&mut self, id: ResourceId, amount: u32) {
        let res = &mut self.resources[id.0];
        debug_assert!(amount <= res.available(), "commit beyond capacity");
        *res.held_mut() += amount;
    }

    /// Id-based reclaim; the caller guarantees `amount <= held`.
    pub(crate) fn reclaim_id(&mut self, id: ResourceId, amount: u32) {
        let res = &mut self.resources[id.0];
        debug_assert!(amount <= res.held(), "reclaim below zero");
        *res.held_mut() -= amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> ResourcePool {
        ResourcePool::from_specs(&[ResourceSpec::new("A", 2), ResourceSpec::new("B", 5)]).unwrap()
    }

    #[test]
    fn test_available_full_when_fresh() {
        let p = pool();
        assert_eq!(p.available("A").unwrap(), 2);
        assert_eq!(p.available("B").unwrap(), 5);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_unknown_resource() {
        let p = pool();
        assert_eq!(
            p.available("Z"),
            Err(PoolError::UnknownResource { name: "Z".into() })
        );
    }

    #[test]
    fn test_commit_and_reclaim() {
        let mut p = pool();
        p.commit("A", 2).unwrap();
        assert_eq!(p.available("A").unwrap(), 0);
        p.reclaim("A", 1).unwrap();
        assert_eq!(p.available("A").unwrap(), 1);
    }

    #[test]
    fn test_commit_refuses_overflow() {
        let mut p = pool();
        p.commit("A", 1).unwrap();
        let err = p.commit("A", 2).unwrap_err();
        assert_eq!(err.as_label(), "pool_insufficient");
        assert_eq!(p.get(p.id("A").unwrap()).held(), 1);
    }

    #[test]
    fn test_reclaim_refuses_underflow() {
        let mut p = pool();
        let err = p.reclaim("B", 1).unwrap_err();
        assert_eq!(
            err,
            PoolError::Underflow {
                name: "B".into(),
                requested: 1,
                held: 0
            }
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err =
            ResourcePool::from_specs(&[ResourceSpec::new("A", 1), ResourceSpec::new("A", 2)])
                .unwrap_err();
        assert_eq!(err.as_label(), "config_duplicate_resource");
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let err = ResourcePool::from_specs(&[ResourceSpec::new("A", -3)]).unwrap_err();
        assert!(matches!(err, ConfigError::Negative { value: -3, .. }));
    }

    #[test]
    fn test_order_preserved() {
        let p = pool();
        let names: Vec<&str> = p.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(p.id("B").unwrap().index(), 1);
    }
}
