use std::collections::{HashMap, HashSet};
use std::ops::Deref;

use indexmap::IndexSet;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use thiserror::Error;

use crate::aromaticity;
use crate::atom::{Atom, AtomSymbol};
use crate::bond::{Bond, BondOrder};
use crate::config::AromaticityConfig;
use crate::element::Element;
use crate::formula::Formula;
use crate::fragment::{Fragment, FragmentKind};
use crate::rings::RingInfo;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("bond endpoint is not an atom of this molecule")]
    DanglingEndpoint,
    #[error("atom is still referenced by {0} bond(s)")]
    VertexInUse(usize),
    #[error("atom is not part of this molecule")]
    UnknownVertex,
    #[error("bond is not part of this molecule")]
    UnknownEdge,
    #[error("a bond cannot join an atom to itself")]
    SelfLoop,
    #[error("the atoms are already bonded")]
    BondExists,
    #[error("fragment '{0}' already exists")]
    FragmentExists(String),
    #[error("fragment bonds do not form a connected subgraph")]
    DisconnectedFragment,
}

/// Handle to an atom inside one [`Molecule`].
///
/// Keys carry a serial number as well as the graph slot, so a key to a
/// removed atom stays invalid even after the slot is reused. Keys order by
/// creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomKey {
    serial: u32,
    index: NodeIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondKey {
    serial: u32,
    index: EdgeIndex,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    serial: u32,
    value: T,
}

/// Old-to-new key mapping produced when atoms and bonds are copied or moved
/// between molecules.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    pub atoms: HashMap<AtomKey, AtomKey>,
    pub bonds: HashMap<BondKey, BondKey>,
}

/// A molecular graph: atoms, the bonds between them, the fragments defined
/// over those bonds and a set of temporarily disconnected bonds.
///
/// Every bond's endpoints are atoms of the same molecule. Disconnected bonds
/// stay owned (they are counted by [`bond_count`](Self::bond_count) and
/// listed by [`bonds`](Self::bonds)) but traversal and connectivity queries
/// skip them.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    pub name: String,
    graph: StableUnGraph<Slot<Atom>, Slot<Bond>>,
    atoms: IndexSet<AtomKey>,
    bonds: IndexSet<BondKey>,
    disconnected: HashSet<BondKey>,
    fragments: Vec<Fragment>,
    next_serial: u32,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn bump_serial(&mut self) -> u32 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    fn atom_key(&self, index: NodeIndex) -> AtomKey {
        AtomKey {
            serial: self.graph[index].serial,
            index,
        }
    }

    fn bond_key(&self, index: EdgeIndex) -> BondKey {
        BondKey {
            serial: self.graph[index].serial,
            index,
        }
    }

    // ---- atoms ----

    pub fn insert_vertex(&mut self, atom: Atom) -> AtomKey {
        let serial = self.bump_serial();
        let index = self.graph.add_node(Slot { serial, value: atom });
        let key = AtomKey { serial, index };
        self.atoms.insert(key);
        key
    }

    pub fn contains_atom(&self, atom: AtomKey) -> bool {
        self.graph
            .node_weight(atom.index)
            .is_some_and(|slot| slot.serial == atom.serial)
    }

    pub fn get_atom(&self, atom: AtomKey) -> Option<&Atom> {
        self.graph
            .node_weight(atom.index)
            .filter(|slot| slot.serial == atom.serial)
            .map(|slot| &slot.value)
    }

    pub fn get_atom_mut(&mut self, atom: AtomKey) -> Option<&mut Atom> {
        self.graph
            .node_weight_mut(atom.index)
            .filter(|slot| slot.serial == atom.serial)
            .map(|slot| &mut slot.value)
    }

    pub fn atom(&self, atom: AtomKey) -> &Atom {
        match self.get_atom(atom) {
            Some(a) => a,
            None => panic!("{atom:?} is not part of this molecule"),
        }
    }

    pub fn atom_mut(&mut self, atom: AtomKey) -> &mut Atom {
        match self.get_atom_mut(atom) {
            Some(a) => a,
            None => panic!("{atom:?} is not part of this molecule"),
        }
    }

    /// Removes an atom together with every bond that touches it.
    pub fn remove_vertex(&mut self, atom: AtomKey) -> Result<Atom, GraphError> {
        if !self.contains_atom(atom) {
            return Err(GraphError::UnknownVertex);
        }
        let incident: Vec<BondKey> = self.all_bonds_of(atom).collect();
        for bond in incident {
            self.remove_edge(bond)?;
        }
        self.take_vertex(atom)
    }

    /// Removes an atom that no bond references any more.
    pub fn take_vertex(&mut self, atom: AtomKey) -> Result<Atom, GraphError> {
        if !self.contains_atom(atom) {
            return Err(GraphError::UnknownVertex);
        }
        let in_use = self.graph.edges(atom.index).count();
        if in_use > 0 {
            return Err(GraphError::VertexInUse(in_use));
        }
        self.atoms.shift_remove(&atom);
        self.graph
            .remove_node(atom.index)
            .map(|slot| slot.value)
            .ok_or(GraphError::UnknownVertex)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn atoms(&self) -> impl Iterator<Item = AtomKey> + '_ {
        self.atoms.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    // ---- bonds ----

    pub fn insert_edge(&mut self, a: AtomKey, b: AtomKey, bond: Bond) -> Result<BondKey, GraphError> {
        if !self.contains_atom(a) || !self.contains_atom(b) {
            return Err(GraphError::DanglingEndpoint);
        }
        if a == b {
            return Err(GraphError::SelfLoop);
        }
        if self.graph.find_edge(a.index, b.index).is_some() {
            return Err(GraphError::BondExists);
        }
        let serial = self.bump_serial();
        let index = self.graph.add_edge(a.index, b.index, Slot { serial, value: bond });
        let key = BondKey { serial, index };
        self.bonds.insert(key);
        Ok(key)
    }

    pub fn remove_edge(&mut self, bond: BondKey) -> Result<Bond, GraphError> {
        if !self.contains_bond(bond) {
            return Err(GraphError::UnknownEdge);
        }
        self.bonds.shift_remove(&bond);
        self.disconnected.remove(&bond);
        self.graph
            .remove_edge(bond.index)
            .map(|slot| slot.value)
            .ok_or(GraphError::UnknownEdge)
    }

    pub fn contains_bond(&self, bond: BondKey) -> bool {
        self.graph
            .edge_weight(bond.index)
            .is_some_and(|slot| slot.serial == bond.serial)
    }

    pub fn get_bond(&self, bond: BondKey) -> Option<&Bond> {
        self.graph
            .edge_weight(bond.index)
            .filter(|slot| slot.serial == bond.serial)
            .map(|slot| &slot.value)
    }

    pub fn get_bond_mut(&mut self, bond: BondKey) -> Option<&mut Bond> {
        self.graph
            .edge_weight_mut(bond.index)
            .filter(|slot| slot.serial == bond.serial)
            .map(|slot| &mut slot.value)
    }

    pub fn bond(&self, bond: BondKey) -> &Bond {
        match self.get_bond(bond) {
            Some(b) => b,
            None => panic!("{bond:?} is not part of this molecule"),
        }
    }

    pub fn bond_mut(&mut self, bond: BondKey) -> &mut Bond {
        match self.get_bond_mut(bond) {
            Some(b) => b,
            None => panic!("{bond:?} is not part of this molecule"),
        }
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Every owned bond in insertion order, disconnected ones included.
    pub fn bonds(&self) -> impl Iterator<Item = BondKey> + '_ {
        self.bonds.iter().copied()
    }

    /// Owned bonds that are not temporarily disconnected.
    pub fn active_bonds(&self) -> impl Iterator<Item = BondKey> + '_ {
        self.bonds.iter().copied().filter(|b| !self.disconnected.contains(b))
    }

    pub fn endpoints(&self, bond: BondKey) -> Option<(AtomKey, AtomKey)> {
        if !self.contains_bond(bond) {
            return None;
        }
        let (a, b) = self.graph.edge_endpoints(bond.index)?;
        Some((self.atom_key(a), self.atom_key(b)))
    }

    /// The owned bond joining `a` and `b`, whether or not it is disconnected.
    pub fn bond_between(&self, a: AtomKey, b: AtomKey) -> Option<BondKey> {
        if !self.contains_atom(a) || !self.contains_atom(b) {
            return None;
        }
        self.graph
            .find_edge(a.index, b.index)
            .map(|e| self.bond_key(e))
    }

    fn all_bonds_of(&self, atom: AtomKey) -> impl Iterator<Item = BondKey> + '_ {
        let edges = self
            .contains_atom(atom)
            .then(|| self.graph.edges(atom.index))
            .into_iter()
            .flatten();
        edges.map(|e| self.bond_key(e.id()))
    }

    pub fn bonds_of(&self, atom: AtomKey) -> impl Iterator<Item = BondKey> + '_ {
        self.all_bonds_of(atom)
            .filter(|b| !self.disconnected.contains(b))
    }

    pub fn neighbors(&self, atom: AtomKey) -> impl Iterator<Item = AtomKey> + '_ {
        self.bonds_of(atom).filter_map(move |b| {
            let (x, y) = self.endpoints(b)?;
            Some(if x == atom { y } else { x })
        })
    }

    pub fn degree(&self, atom: AtomKey) -> usize {
        self.bonds_of(atom).count()
    }

    // ---- temporary disconnection ----

    /// Hides `bond` from traversal without removing it. Disconnecting an
    /// already disconnected bond does nothing.
    pub fn temporarily_disconnect_edge(&mut self, bond: BondKey) -> Result<(), GraphError> {
        if !self.contains_bond(bond) {
            return Err(GraphError::UnknownEdge);
        }
        self.disconnected.insert(bond);
        Ok(())
    }

    pub fn reconnect_temporarily_disconnected_edges(&mut self) {
        self.disconnected.clear();
    }

    pub fn is_disconnected(&self, bond: BondKey) -> bool {
        self.disconnected.contains(&bond)
    }

    pub fn disconnected_edges(&self) -> impl Iterator<Item = BondKey> + '_ {
        self.bonds.iter().copied().filter(|b| self.disconnected.contains(b))
    }

    /// Disconnects `bonds` until the returned guard is dropped, at which point
    /// the disconnection set is restored to exactly what it was before.
    pub fn disconnect_scope(
        &mut self,
        bonds: impl IntoIterator<Item = BondKey>,
    ) -> Result<DisconnectGuard<'_>, GraphError> {
        let bonds: Vec<BondKey> = bonds.into_iter().collect();
        if bonds.iter().any(|&b| !self.contains_bond(b)) {
            return Err(GraphError::UnknownEdge);
        }
        let previous = self.disconnected.clone();
        self.disconnected.extend(bonds);
        Ok(DisconnectGuard {
            mol: self,
            previous,
        })
    }

    pub fn with_disconnected<R>(
        &mut self,
        bonds: impl IntoIterator<Item = BondKey>,
        f: impl FnOnce(&Molecule) -> R,
    ) -> Result<R, GraphError> {
        let guard = self.disconnect_scope(bonds)?;
        Ok(f(&*guard))
    }

    // ---- connectivity ----

    /// Lazily yields connected components over active bonds. Each component
    /// lists its atoms in insertion order; components appear in the order of
    /// their first atom.
    pub fn connected_components(&self) -> Components<'_> {
        Components {
            mol: self,
            visited: HashSet::new(),
            cursor: 0,
        }
    }

    pub fn get_connected_components(&self) -> Vec<Vec<AtomKey>> {
        self.connected_components().collect()
    }

    pub fn is_connected(&self) -> bool {
        let mut components = self.connected_components();
        components.next().is_some() && components.next().is_none()
    }

    /// Owned bonds, disconnected ones included, with both ends in `atoms`.
    pub fn vertex_subgraph_to_edge_subgraph(
        &self,
        atoms: impl IntoIterator<Item = AtomKey>,
    ) -> Vec<BondKey> {
        let set: HashSet<AtomKey> = atoms.into_iter().collect();
        self.bonds()
            .filter(|&b| {
                self.endpoints(b)
                    .is_some_and(|(x, y)| set.contains(&x) && set.contains(&y))
            })
            .collect()
    }

    /// Whether `bonds` alone connect all of their endpoints.
    pub fn defines_connected_subgraph(&self, bonds: &[BondKey]) -> bool {
        let mut adjacency: HashMap<AtomKey, Vec<AtomKey>> = HashMap::new();
        for &bond in bonds {
            let Some((a, b)) = self.endpoints(bond) else {
                return false;
            };
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        }
        let Some(&start) = adjacency.keys().next() else {
            return false;
        };
        let mut seen = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(cur) = stack.pop() {
            for &n in &adjacency[&cur] {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        seen.len() == adjacency.len()
    }

    /// A new molecule holding copies of `atoms` and of every owned bond
    /// between them. Fragments are not copied.
    pub fn induced_subgraph(&self, atoms: impl IntoIterator<Item = AtomKey>) -> (Molecule, KeyMap) {
        let wanted: HashSet<AtomKey> = atoms.into_iter().collect();
        let mut sub = Molecule::with_name(self.name.clone());
        let mut map = KeyMap::default();
        for atom in self.atoms().filter(|a| wanted.contains(a)) {
            map.atoms.insert(atom, sub.insert_vertex(self.atom(atom).clone()));
        }
        for bond in self.bonds() {
            let Some((a, b)) = self.endpoints(bond) else {
                continue;
            };
            if let (Some(&na), Some(&nb)) = (map.atoms.get(&a), map.atoms.get(&b)) {
                if let Ok(nk) = sub.insert_edge(na, nb, self.bond(bond).clone()) {
                    map.bonds.insert(bond, nk);
                }
            }
        }
        (sub, map)
    }

    /// One molecule per connected component. Fragments whose bonds all fall
    /// into a component move with it; the rest are dropped.
    pub fn split_components(&self) -> Vec<Molecule> {
        self.connected_components()
            .map(|component| {
                let (mut part, map) = self.induced_subgraph(component);
                for fragment in &self.fragments {
                    if let Some(moved) = fragment.remap(&map.bonds) {
                        part.fragments.push(moved);
                    }
                }
                part
            })
            .collect()
    }

    /// Moves every atom, bond and fragment of `other` into `self`.
    /// Fragment ids that collide with existing ones are dropped.
    pub fn absorb(&mut self, other: Molecule) -> KeyMap {
        let mut map = KeyMap::default();
        for atom in other.atoms() {
            map.atoms.insert(atom, self.insert_vertex(other.atom(atom).clone()));
        }
        for bond in other.bonds() {
            let Some((a, b)) = other.endpoints(bond) else {
                continue;
            };
            let (na, nb) = (map.atoms[&a], map.atoms[&b]);
            if let Ok(nk) = self.insert_edge(na, nb, other.bond(bond).clone()) {
                if other.is_disconnected(bond) {
                    self.disconnected.insert(nk);
                }
                map.bonds.insert(bond, nk);
            }
        }
        for fragment in other.fragments {
            if self.fragment(&fragment.id).is_some() {
                tracing::debug!(id = %fragment.id, "dropping fragment with clashing id");
                continue;
            }
            if let Some(moved) = fragment.remap(&map.bonds) {
                self.fragments.push(moved);
            }
        }
        map
    }

    // ---- chemistry ----

    /// Bond orders summed over every owned bond of `atom`, plus one when the
    /// atom has an explicit aromatic bond.
    pub fn occupied_valency(&self, atom: AtomKey) -> u32 {
        let mut total = 0u32;
        let mut aromatic = false;
        for bond in self.all_bonds_of(atom) {
            let order = self.bond(bond).order;
            aromatic |= order == BondOrder::Aromatic;
            total += u32::from(order.valence_contribution());
        }
        total + u32::from(aromatic)
    }

    /// Explicit hydrogen count when set, otherwise the implicit count from
    /// the lowest default valence that accommodates the current bonds,
    /// shifted by charge and reduced by unpaired electrons. Groups carry no
    /// implicit hydrogens.
    pub fn hydrogen_count(&self, atom: AtomKey) -> u8 {
        let Some(a) = self.get_atom(atom) else {
            return 0;
        };
        if let Some(h) = a.hydrogens {
            return h;
        }
        let Some(element) = a.element() else {
            return 0;
        };
        let occupied = self.occupied_valency(atom) as i32
            + i32::from(a.multiplicity.saturating_sub(1));
        let charge = i32::from(a.charge);
        let shift = match element.outer_electrons() {
            e if e >= 5 => charge,
            4 => -charge.abs(),
            _ => -charge,
        };
        let valences: Vec<i32> = match a.valency {
            Some(v) => vec![i32::from(v)],
            None => element.default_valences().iter().map(|&v| i32::from(v)).collect(),
        };
        valences
            .into_iter()
            .map(|v| v + shift)
            .find(|&v| v >= occupied)
            .map_or(0, |v| (v - occupied) as u8)
    }

    pub fn atom_formula(&self, atom: AtomKey) -> Formula {
        let Some(a) = self.get_atom(atom) else {
            return Formula::new();
        };
        let mut f = match a.symbol {
            AtomSymbol::Element(e) => {
                let mut f = Formula::from_element(e, 1);
                f.add_element(Element::H, u32::from(self.hydrogen_count(atom)));
                f
            }
            AtomSymbol::Group(g) => g.formula(),
        };
        f.set_charge(i32::from(a.charge));
        f
    }

    pub fn formula(&self) -> Formula {
        self.atoms().map(|a| self.atom_formula(a)).sum()
    }

    pub fn ring_info(&self) -> RingInfo {
        RingInfo::sssr(self)
    }

    pub fn mark_aromatic_bonds(&mut self) {
        self.mark_aromatic_bonds_with(&AromaticityConfig::default());
    }

    pub fn mark_aromatic_bonds_with(&mut self, config: &AromaticityConfig) {
        let flags = aromaticity::perceive(self, config);
        for slot in self.graph.node_weights_mut() {
            slot.value.aromatic = false;
        }
        for slot in self.graph.edge_weights_mut() {
            slot.value.aromatic = false;
        }
        for bond in flags.bonds {
            if let Some(b) = self.get_bond_mut(bond) {
                b.aromatic = true;
            }
        }
        for atom in flags.atoms {
            if let Some(a) = self.get_atom_mut(atom) {
                a.aromatic = true;
            }
        }
    }

    // ---- fragments ----

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn fragment(&self, id: &str) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.id == id)
    }

    pub fn fragment_mut(&mut self, id: &str) -> Option<&mut Fragment> {
        self.fragments.iter_mut().find(|f| f.id == id)
    }

    /// Attaches an existing fragment. Its bonds are not checked; a fragment
    /// referencing foreign bonds is simply inconsistent.
    pub fn add_fragment(&mut self, fragment: Fragment) -> Result<(), GraphError> {
        if self.fragment(&fragment.id).is_some() {
            return Err(GraphError::FragmentExists(fragment.id));
        }
        self.fragments.push(fragment);
        Ok(())
    }

    /// Builds and attaches a fragment over `bonds`, which must all be owned.
    /// With `strict`, they must also form one connected subgraph.
    pub fn create_fragment(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        bonds: impl IntoIterator<Item = BondKey>,
        kind: FragmentKind,
        strict: bool,
    ) -> Result<&Fragment, GraphError> {
        let id = id.into();
        let bonds: Vec<BondKey> = bonds.into_iter().collect();
        if bonds.iter().any(|&b| !self.contains_bond(b)) {
            return Err(GraphError::UnknownEdge);
        }
        if strict && !self.defines_connected_subgraph(&bonds) {
            return Err(GraphError::DisconnectedFragment);
        }
        let mut fragment = Fragment::new(id, name, kind);
        for bond in bonds {
            fragment.add_bond(bond);
        }
        self.add_fragment(fragment)?;
        Ok(&self.fragments[self.fragments.len() - 1])
    }

    pub fn remove_fragment(&mut self, id: &str) -> Option<Fragment> {
        let pos = self.fragments.iter().position(|f| f.id == id)?;
        Some(self.fragments.remove(pos))
    }

    pub fn fragments_with_bond(&self, bond: BondKey) -> impl Iterator<Item = &Fragment> + '_ {
        self.fragments.iter().filter(move |f| f.contains_bond(bond))
    }

    pub fn fragments_with_atom(&self, atom: AtomKey) -> impl Iterator<Item = &Fragment> + '_ {
        self.fragments
            .iter()
            .filter(move |f| f.vertices(self).contains(&atom))
    }

    pub fn check_fragments(&self) -> Vec<String> {
        self.fragments
            .iter()
            .filter(|f| !f.is_consistent(self))
            .map(|f| f.id.clone())
            .collect()
    }

    pub fn remove_inconsistent_fragments(&mut self) -> Vec<Fragment> {
        let (keep, drop): (Vec<Fragment>, Vec<Fragment>) = std::mem::take(&mut self.fragments)
            .into_iter()
            .partition(|f| f.is_consistent(self));
        self.fragments = keep;
        drop
    }
}

/// Restores a molecule's previous set of disconnected bonds when dropped.
/// Returned by [`Molecule::disconnect_scope`]; derefs to the molecule for
/// read-only analysis.
#[derive(Debug)]
pub struct DisconnectGuard<'a> {
    mol: &'a mut Molecule,
    previous: HashSet<BondKey>,
}

impl Deref for DisconnectGuard<'_> {
    type Target = Molecule;

    fn deref(&self) -> &Molecule {
        self.mol
    }
}

impl Drop for DisconnectGuard<'_> {
    fn drop(&mut self) {
        self.mol.disconnected = std::mem::take(&mut self.previous);
    }
}

#[derive(Debug)]
pub struct Components<'a> {
    mol: &'a Molecule,
    visited: HashSet<AtomKey>,
    cursor: usize,
}

impl Iterator for Components<'_> {
    type Item = Vec<AtomKey>;

    fn next(&mut self) -> Option<Vec<AtomKey>> {
        while let Some(&start) = self.mol.atoms.get_index(self.cursor) {
            self.cursor += 1;
            if !self.visited.insert(start) {
                continue;
            }
            let mut component = vec![start];
            let mut stack = vec![start];
            while let Some(cur) = stack.pop() {
                for n in self.mol.neighbors(cur) {
                    if self.visited.insert(n) {
                        component.push(n);
                        stack.push(n);
                    }
                }
            }
            component.sort();
            return Some(component);
        }
        None
    }
}
