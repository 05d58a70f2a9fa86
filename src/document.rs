//! The document: every molecule, drawing item and reaction of one drawing,
//! plus the id registry, preferences and message log that belong to it.

use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::atom::Point;
use crate::cdml::{self, CdmlError};
use crate::config::Preferences;
use crate::fragment::FragmentKind;
use crate::log::MessageLog;
use crate::mol::{AtomKey, BondKey, GraphError, Molecule};
use crate::reaction::Reaction;
use crate::registry::{Registry, RegistryError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoleculeKey(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionKey(u32);

/// Anything a CDML id can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Molecule(MoleculeKey),
    Atom(MoleculeKey, AtomKey),
    Bond(MoleculeKey, BondKey),
    Item(ItemKey),
    Reaction(ReactionKey),
}

/// Simple drawing objects that reactions refer to.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Arrow { points: Vec<Point> },
    Plus { position: Point },
    Text { position: Point, text: String },
}

impl Item {
    /// Id prefix and CDML element name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Arrow { .. } => "arrow",
            Self::Plus { .. } => "plus",
            Self::Text { .. } => "text",
        }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("no such molecule in this document")]
    UnknownMolecule,
}

/// A fragment dropped by [`Document::sweep_fragments`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedFragment {
    pub molecule: MoleculeKey,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<RemovedFragment>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Owns all drawing content and the context it is interpreted in.
///
/// There is no global state: two documents never share a registry, so
/// they can be loaded and searched on different threads.
#[derive(Debug)]
pub struct Document {
    pub preferences: Preferences,
    registry: Registry<ObjectRef>,
    molecules: IndexMap<MoleculeKey, Molecule>,
    items: IndexMap<ItemKey, Item>,
    reactions: IndexMap<ReactionKey, Reaction>,
    log: MessageLog,
    next_key: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::with_preferences(Preferences::default())
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        let registry = match preferences.id_seed {
            Some(seed) => Registry::with_seed(seed),
            None => Registry::new(),
        };
        Self {
            preferences,
            registry,
            molecules: IndexMap::new(),
            items: IndexMap::new(),
            reactions: IndexMap::new(),
            log: MessageLog::new(),
            next_key: 0,
        }
    }

    fn bump_key(&mut self) -> u32 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    // ---- molecules ----

    pub fn add_molecule(&mut self, mol: Molecule) -> MoleculeKey {
        let key = MoleculeKey(self.bump_key());
        self.molecules.insert(key, mol);
        key
    }

    pub fn molecule(&self, key: MoleculeKey) -> Option<&Molecule> {
        self.molecules.get(&key)
    }

    pub fn molecule_mut(&mut self, key: MoleculeKey) -> Option<&mut Molecule> {
        self.molecules.get_mut(&key)
    }

    /// Removes a molecule, forgets the ids of everything in it and drops
    /// reaction references to it.
    pub fn remove_molecule(&mut self, key: MoleculeKey) -> Option<Molecule> {
        let mol = self.molecules.shift_remove(&key)?;
        self.registry.retain(|_, obj| owner(obj) != Some(key));
        for reaction in self.reactions.values_mut() {
            reaction.reactants.retain(|&m| m != key);
            reaction.products.retain(|&m| m != key);
        }
        Some(mol)
    }

    pub fn molecules(&self) -> impl Iterator<Item = (MoleculeKey, &Molecule)> + '_ {
        self.molecules.iter().map(|(&k, m)| (k, m))
    }

    pub fn molecule_count(&self) -> usize {
        self.molecules.len()
    }

    // ---- items and reactions ----

    pub fn add_item(&mut self, item: Item) -> ItemKey {
        let key = ItemKey(self.bump_key());
        self.items.insert(key, item);
        key
    }

    pub fn item(&self, key: ItemKey) -> Option<&Item> {
        self.items.get(&key)
    }

    pub fn item_mut(&mut self, key: ItemKey) -> Option<&mut Item> {
        self.items.get_mut(&key)
    }

    pub fn remove_item(&mut self, key: ItemKey) -> Option<Item> {
        let item = self.items.shift_remove(&key)?;
        self.registry.unregister_object(ObjectRef::Item(key));
        for reaction in self.reactions.values_mut() {
            reaction.retain_live(|_| true, |i| i != key);
        }
        Some(item)
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemKey, &Item)> + '_ {
        self.items.iter().map(|(&k, i)| (k, i))
    }

    pub fn add_reaction(&mut self, reaction: Reaction) -> ReactionKey {
        let key = ReactionKey(self.bump_key());
        self.reactions.insert(key, reaction);
        key
    }

    pub fn reaction(&self, key: ReactionKey) -> Option<&Reaction> {
        self.reactions.get(&key)
    }

    pub fn reaction_mut(&mut self, key: ReactionKey) -> Option<&mut Reaction> {
        self.reactions.get_mut(&key)
    }

    pub fn remove_reaction(&mut self, key: ReactionKey) -> Option<Reaction> {
        let reaction = self.reactions.shift_remove(&key)?;
        self.registry.unregister_object(ObjectRef::Reaction(key));
        Some(reaction)
    }

    pub fn reactions(&self) -> impl Iterator<Item = (ReactionKey, &Reaction)> + '_ {
        self.reactions.iter().map(|(&k, r)| (k, r))
    }

    // ---- ids ----

    pub fn registry(&self) -> &Registry<ObjectRef> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry<ObjectRef> {
        &mut self.registry
    }

    pub fn id_of(&self, object: ObjectRef) -> Option<&str> {
        self.registry.id_of(object)
    }

    pub fn resolve(&self, id: &str) -> Result<ObjectRef, RegistryError> {
        self.registry.resolve(id)
    }

    /// Whether `object` still exists in this document.
    pub fn is_live(&self, object: ObjectRef) -> bool {
        match object {
            ObjectRef::Molecule(m) => self.molecules.contains_key(&m),
            ObjectRef::Atom(m, a) => self.molecule(m).is_some_and(|mol| mol.contains_atom(a)),
            ObjectRef::Bond(m, b) => self.molecule(m).is_some_and(|mol| mol.contains_bond(b)),
            ObjectRef::Item(i) => self.items.contains_key(&i),
            ObjectRef::Reaction(r) => self.reactions.contains_key(&r),
        }
    }

    /// Forgets ids of objects that have been deleted since they were
    /// registered.
    pub fn prune_registry(&mut self) {
        let mut stale = Vec::new();
        for (id, object) in self.registry.iter() {
            if !self.is_live(object) {
                stale.push(id.to_owned());
            }
        }
        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "pruning stale ids");
        }
        self.registry.retain(|id, _| !stale.iter().any(|s| s == id));
    }

    /// The object's id, generating and registering one with `prefix` if it
    /// has none yet.
    pub fn ensure_id(&mut self, object: ObjectRef, prefix: &str) -> String {
        if let Some(id) = self.registry.id_of(object) {
            return id.to_owned();
        }
        let id = self.registry.generate_id(prefix);
        // `object` has no id and `id` is fresh, so registration succeeds
        let _ = self.registry.register(object, id.clone());
        id
    }

    // ---- fragments ----

    /// Creates a fragment in molecule `mol` with an id of the form `fragN`
    /// that no other fragment or object in the document uses.
    pub fn create_fragment(
        &mut self,
        mol: MoleculeKey,
        name: &str,
        bonds: impl IntoIterator<Item = BondKey>,
        kind: FragmentKind,
        strict: bool,
    ) -> Result<String, DocumentError> {
        if !self.molecules.contains_key(&mol) {
            return Err(DocumentError::UnknownMolecule);
        }
        let id = loop {
            let candidate = self.registry.generate_id("frag");
            if !self.fragment_id_in_use(&candidate) {
                break candidate;
            }
        };
        let molecule = self
            .molecules
            .get_mut(&mol)
            .ok_or(DocumentError::UnknownMolecule)?;
        molecule.create_fragment(id.clone(), name, bonds, kind, strict)?;
        Ok(id)
    }

    pub(crate) fn fragment_id_in_use(&self, id: &str) -> bool {
        self.molecules.values().any(|m| m.fragment(id).is_some())
    }

    /// Removes every fragment that references a deleted bond and logs one
    /// informational message per removed fragment.
    pub fn sweep_fragments(&mut self) -> SweepReport {
        let mut report = SweepReport::default();
        for (&key, mol) in self.molecules.iter_mut() {
            for fragment in mol.remove_inconsistent_fragments() {
                self.log.info(format!(
                    "fragment '{}' is no longer consistent and has been removed",
                    if fragment.name.is_empty() { &fragment.id } else { &fragment.name }
                ));
                report.removed.push(RemovedFragment {
                    molecule: key,
                    id: fragment.id,
                    name: fragment.name,
                });
            }
        }
        report
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    // ---- persistence ----

    pub fn from_cdml_str(text: &str) -> Result<Self, CdmlError> {
        Self::from_cdml_str_with(text, Preferences::default())
    }

    pub fn from_cdml_str_with(text: &str, preferences: Preferences) -> Result<Self, CdmlError> {
        let mut doc = Self::with_preferences(preferences);
        cdml::read_into(&mut doc, text)?;
        Ok(doc)
    }

    /// Serializes the document. Runs the fragment sweep first when
    /// [`Preferences::sweep_before_save`] is set.
    pub fn to_cdml_string(&mut self) -> Result<String, CdmlError> {
        if self.preferences.sweep_before_save {
            self.sweep_fragments();
        }
        self.prune_registry();
        cdml::write(self)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CdmlError> {
        Self::load_with(path, Preferences::default())
    }

    pub fn load_with(path: impl AsRef<Path>, preferences: Preferences) -> Result<Self, CdmlError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading document");
        let text = std::fs::read_to_string(path)?;
        Self::from_cdml_str_with(&text, preferences)
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), CdmlError> {
        let path = path.as_ref();
        let text = self.to_cdml_string()?;
        std::fs::write(path, text)?;
        tracing::debug!(path = %path.display(), "saved document");
        Ok(())
    }
}

fn owner(object: ObjectRef) -> Option<MoleculeKey> {
    match object {
        ObjectRef::Molecule(m) | ObjectRef::Atom(m, _) | ObjectRef::Bond(m, _) => Some(m),
        ObjectRef::Item(_) | ObjectRef::Reaction(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::cycle;
    use crate::log::Level;

    fn seeded() -> Document {
        Document::with_preferences(Preferences {
            id_seed: Some(3),
            ..Preferences::default()
        })
    }

    #[test]
    fn sweep_logs_once_per_removed_fragment() {
        let mut doc = seeded();
        let (mol, _, bonds) = cycle(6, false);
        let mk = doc.add_molecule(mol);
        let keep = doc
            .create_fragment(mk, "keep", [bonds[0]], FragmentKind::Explicit, true)
            .unwrap();
        doc.create_fragment(mk, "a", [bonds[1]], FragmentKind::Explicit, true)
            .unwrap();
        doc.create_fragment(mk, "b", [bonds[1], bonds[2]], FragmentKind::Explicit, true)
            .unwrap();
        doc.molecule_mut(mk).unwrap().remove_edge(bonds[1]).unwrap();

        let report = doc.sweep_fragments();
        assert_eq!(report.removed.len(), 2);
        assert_eq!(doc.log().len(), 2);
        assert!(doc.log().entries().iter().all(|m| m.level == Level::Info));
        let remaining: Vec<&str> = doc.molecule(mk).unwrap().fragments().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(remaining, vec![keep.as_str()]);

        assert!(doc.sweep_fragments().is_empty());
        assert_eq!(doc.log().len(), 2);
    }

    #[test]
    fn fragment_ids_are_unique() {
        let mut doc = seeded();
        let (mol, _, bonds) = cycle(6, false);
        let mk = doc.add_molecule(mol);
        let ids: Vec<String> = bonds
            .iter()
            .map(|&b| doc.create_fragment(mk, "", [b], FragmentKind::Explicit, true).unwrap())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert!(ids.iter().all(|id| id.starts_with("frag")));
    }

    #[test]
    fn unknown_molecule_is_rejected() {
        let mut doc = seeded();
        let mk = doc.add_molecule(Molecule::new());
        doc.remove_molecule(mk);
        assert!(matches!(
            doc.create_fragment(mk, "", Vec::<BondKey>::new(), FragmentKind::Explicit, false),
            Err(DocumentError::UnknownMolecule)
        ));
    }

    #[test]
    fn removing_molecule_forgets_ids_and_reactions() {
        let mut doc = seeded();
        let (mol, atoms, _) = cycle(3, false);
        let mk = doc.add_molecule(mol);
        doc.ensure_id(ObjectRef::Molecule(mk), "molecule");
        let atom_id = doc.ensure_id(ObjectRef::Atom(mk, atoms[0]), "atom");
        let rk = doc.add_reaction(Reaction {
            reactants: vec![mk],
            ..Reaction::default()
        });
        doc.remove_molecule(mk);
        assert!(doc.registry().is_empty());
        assert!(doc.resolve(&atom_id).is_err());
        assert!(doc.reaction(rk).unwrap().is_empty());
    }

    #[test]
    fn prune_drops_deleted_objects() {
        let mut doc = seeded();
        let (mol, atoms, bonds) = cycle(3, false);
        let mk = doc.add_molecule(mol);
        let bond_id = doc.ensure_id(ObjectRef::Bond(mk, bonds[0]), "bond");
        doc.ensure_id(ObjectRef::Atom(mk, atoms[0]), "atom");
        assert_eq!(doc.ensure_id(ObjectRef::Bond(mk, bonds[0]), "bond"), bond_id);
        doc.molecule_mut(mk).unwrap().remove_edge(bonds[0]).unwrap();
        doc.prune_registry();
        assert_eq!(doc.registry().len(), 1);
        assert!(doc.registry().get(&bond_id).is_none());
    }

    #[test]
    fn removing_an_item_updates_reactions() {
        let mut doc = seeded();
        let plus = doc.add_item(Item::Plus {
            position: Point::new(1.0, 1.0),
        });
        let rk = doc.add_reaction(Reaction {
            pluses: vec![plus],
            ..Reaction::default()
        });
        assert!(doc.reaction(rk).unwrap().references_item(plus));
        doc.remove_item(plus);
        assert!(doc.reaction(rk).unwrap().pluses.is_empty());
    }
}
