//! Document-scoped mapping between string ids and live objects.
//!
//! CDML refers to molecules, atoms, bonds and drawing items by string id. A
//! [`Registry`] holds that mapping in both directions so the reader can
//! resolve references and the writer can reuse ids that objects already have.

use std::collections::HashMap;
use std::hash::Hash;

use indexmap::IndexMap;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("object is already registered as '{0}'")]
    DuplicateRegistration(String),
    #[error("id '{0}' is not registered to this object")]
    NotRegistered(String),
    #[error("unknown id '{0}'")]
    UnknownId(String),
    #[error("reference to missing id '{0}'")]
    UnresolvedReference(String),
    #[error("id '{0}' is already in use")]
    IdInUse(String),
}

/// Bidirectional id ↔ object map. Registering the same handle twice is
/// detected regardless of id.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    by_id: IndexMap<String, T>,
    by_object: HashMap<T, String>,
    rng: SmallRng,
}

impl<T: Copy + Eq + Hash> Registry<T> {
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    /// A registry whose generated ids are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            by_id: IndexMap::new(),
            by_object: HashMap::new(),
            rng,
        }
    }

    pub fn register(&mut self, object: T, id: impl Into<String>) -> Result<(), RegistryError> {
        let id = id.into();
        if let Some(existing) = self.by_object.get(&object) {
            return Err(RegistryError::DuplicateRegistration(existing.clone()));
        }
        if self.by_id.contains_key(&id) {
            return Err(RegistryError::IdInUse(id));
        }
        self.by_object.insert(object, id.clone());
        self.by_id.insert(id, object);
        Ok(())
    }

    pub fn unregister(&mut self, id: &str, object: T) -> Result<(), RegistryError> {
        match self.by_id.get(id) {
            Some(o) if *o == object => {
                self.by_id.shift_remove(id);
                self.by_object.remove(&object);
                Ok(())
            }
            _ => Err(RegistryError::NotRegistered(id.to_owned())),
        }
    }

    pub fn unregister_object(&mut self, object: T) -> Option<String> {
        let id = self.by_object.remove(&object)?;
        self.by_id.shift_remove(&id);
        Some(id)
    }

    pub fn resolve(&self, id: &str) -> Result<T, RegistryError> {
        self.get(id).ok_or_else(|| RegistryError::UnknownId(id.to_owned()))
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.by_id.get(id).copied()
    }

    pub fn id_of(&self, object: T) -> Option<&str> {
        self.by_object.get(&object).map(String::as_str)
    }

    pub fn is_registered(&self, object: T) -> bool {
        self.by_object.contains_key(&object)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// `prefix` followed by a random number, unused in this registry.
    pub fn generate_id(&mut self, prefix: &str) -> String {
        let upper = (self.by_id.len() as u64 + 1) * 16 + 100_000;
        loop {
            let candidate = format!("{prefix}{}", self.rng.gen_range(1..=upper));
            if !self.by_id.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub fn generate_and_register(&mut self, prefix: &str, object: T) -> Result<String, RegistryError> {
        if let Some(existing) = self.by_object.get(&object) {
            return Err(RegistryError::DuplicateRegistration(existing.clone()));
        }
        let id = self.generate_id(prefix);
        self.register(object, id.clone())?;
        Ok(id)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, T) -> bool) {
        let by_object = &mut self.by_object;
        self.by_id.retain(|id, object| {
            let kept = keep(id, *object);
            if !kept {
                by_object.remove(object);
            }
            kept
        });
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> + '_ {
        self.by_id.iter().map(|(id, &o)| (id.as_str(), o))
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_object.clear();
    }
}

impl<T: Copy + Eq + Hash> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let mut reg = Registry::with_seed(1);
        reg.register(10u32, "atom1").unwrap();
        assert_eq!(reg.resolve("atom1"), Ok(10));
        assert_eq!(reg.get("atom2"), None);
        assert_eq!(reg.resolve("atom2"), Err(RegistryError::UnknownId("atom2".into())));
        assert_eq!(reg.id_of(10), Some("atom1"));
    }

    #[test]
    fn duplicate_object_is_rejected() {
        let mut reg = Registry::with_seed(1);
        reg.register(10u32, "a").unwrap();
        assert_eq!(
            reg.register(10, "b"),
            Err(RegistryError::DuplicateRegistration("a".into()))
        );
        assert_eq!(reg.register(11, "a"), Err(RegistryError::IdInUse("a".into())));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn unregister_checks_the_pair() {
        let mut reg = Registry::with_seed(1);
        reg.register(10u32, "a").unwrap();
        assert_eq!(reg.unregister("a", 11), Err(RegistryError::NotRegistered("a".into())));
        assert_eq!(reg.unregister("b", 10), Err(RegistryError::NotRegistered("b".into())));
        reg.unregister("a", 10).unwrap();
        assert!(reg.is_empty());
        assert!(!reg.is_registered(10));
    }

    #[test]
    fn generated_ids_never_collide() {
        let mut reg = Registry::with_seed(42);
        for i in 0..5000u32 {
            reg.generate_and_register("bond", i).unwrap();
        }
        assert_eq!(reg.len(), 5000);
        assert!(reg.iter().all(|(id, _)| id.starts_with("bond")));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let mut a: Registry<u32> = Registry::with_seed(9);
        let mut b: Registry<u32> = Registry::with_seed(9);
        assert_eq!(a.generate_id("x"), b.generate_id("x"));
    }

    #[test]
    fn retain_prunes_both_directions() {
        let mut reg = Registry::with_seed(1);
        for i in 0..4u32 {
            reg.register(i, format!("id{i}")).unwrap();
        }
        reg.retain(|_, o| o % 2 == 0);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.id_of(1), None);
        assert_eq!(reg.unregister_object(2), Some("id2".into()));
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec![("id0", 0)]);
    }
}
