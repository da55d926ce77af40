//! Resource working set.
//!
//! The set of resources the user has picked for this session, in insertion
//! order, unique by name.

use erpsync_core::{RecordCount, Resource, ResourceOrigin, ValidationError};
use tracing::debug;

/// Ordered, name-unique list of selected resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    resources: Vec<Resource>,
}

impl ResourceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource. Returns `Ok(false)` if the name is already present.
    pub fn add(&mut self, name: &str, origin: ResourceOrigin) -> Result<bool, ValidationError> {
        let resource = Resource::new(name, origin)?;
        if self.contains(resource.name()) {
            return Ok(false);
        }
        debug!(resource = %resource.name(), origin = %origin, "Resource added");
        self.resources.push(resource);
        Ok(true)
    }

    /// Adds several resources, stopping at the first invalid name.
    ///
    /// Returns how many were new.
    pub fn add_all<'a, I>(&mut self, names: I, origin: ResourceOrigin) -> Result<usize, ValidationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = 0;
        for name in names {
            if self.add(name, origin)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Removes a resource by name.
    pub fn remove(&mut self, name: &str) -> Option<Resource> {
        let index = self.resources.iter().position(|r| r.name() == name.trim())?;
        Some(self.resources.remove(index))
    }

    /// Returns true if a resource with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Looks up a resource.
    pub fn get(&self, name: &str) -> Option<&Resource> {
        let name = name.trim();
        self.resources.iter().find(|r| r.name() == name)
    }

    /// Stores a count result. Returns false if the resource is not present.
    pub fn set_count(&mut self, name: &str, count: RecordCount) -> bool {
        let name = name.trim();
        match self.resources.iter_mut().find(|r| r.name() == name) {
            Some(resource) => {
                resource.record_count = Some(count);
                true
            }
            None => false,
        }
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.resources.iter().map(|r| r.name().to_string()).collect()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dedupes_and_keeps_order() {
        let mut set = ResourceSet::new();
        assert!(set.add("VendorsV2", ResourceOrigin::Preset).unwrap());
        assert!(set.add("CustomersV3", ResourceOrigin::Manual).unwrap());
        assert!(!set.add(" VendorsV2 ", ResourceOrigin::Manual).unwrap());

        assert_eq!(set.names(), vec!["VendorsV2", "CustomersV3"]);
        assert_eq!(set.get("VendorsV2").unwrap().origin, ResourceOrigin::Preset);
    }

    #[test]
    fn test_add_rejects_invalid() {
        let mut set = ResourceSet::new();
        assert!(set.add("bad/name", ResourceOrigin::Manual).is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_add_all_counts_new() {
        let mut set = ResourceSet::new();
        set.add("A", ResourceOrigin::Manual).unwrap();
        let added = set
            .add_all(["A", "B", "C"], ResourceOrigin::Discovered)
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_count_zero_distinct_from_unavailable() {
        let mut set = ResourceSet::new();
        set.add_all(["A", "B", "C"], ResourceOrigin::Manual).unwrap();

        assert!(set.set_count("A", RecordCount::Known(0)));
        assert!(set.set_count("B", RecordCount::Unavailable));
        assert!(!set.set_count("Z", RecordCount::Known(1)));

        assert_eq!(set.get("A").unwrap().record_count, Some(RecordCount::Known(0)));
        assert_eq!(set.get("B").unwrap().record_count, Some(RecordCount::Unavailable));
        assert_eq!(set.get("C").unwrap().record_count, None);
    }

    #[test]
    fn test_remove() {
        let mut set = ResourceSet::new();
        set.add("A", ResourceOrigin::Manual).unwrap();
        assert!(set.remove("A").is_some());
        assert!(set.remove("A").is_none());
    }
}
