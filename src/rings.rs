//! Smallest set of smallest rings.
//!
//! Candidates follow Horton: for every bond `(u, v)` and every atom `w`, the
//! shortest paths `w → u` and `w → v` closed by the bond form a cycle when
//! they share no atom besides `w`. Candidates are taken shortest first and
//! kept when their bond sets are linearly independent over GF(2) until the
//! cyclomatic number `E - V + C` is reached.
//!
//! Temporarily disconnected bonds are not part of the graph here.

use std::collections::VecDeque;

use crate::mol::{AtomKey, BondKey, Molecule};
use crate::topology::Topology;

/// One ring: atoms in cyclic order starting from the earliest inserted atom,
/// and `bonds[i]` joining `atoms[i]` to `atoms[(i + 1) % len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    pub atoms: Vec<AtomKey>,
    pub bonds: Vec<BondKey>,
}

impl Ring {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn contains_atom(&self, atom: AtomKey) -> bool {
        self.atoms.contains(&atom)
    }

    pub fn contains_bond(&self, bond: BondKey) -> bool {
        self.bonds.contains(&bond)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RingInfo {
    rings: Vec<Ring>,
}

impl RingInfo {
    pub fn sssr(mol: &Molecule) -> Self {
        let topo = Topology::of(mol);
        let expected = expected_ring_count(&topo);
        if expected == 0 {
            return Self::default();
        }
        let candidates = horton_candidates(&topo);
        let rings = select_independent_rings(&topo, &candidates, expected)
            .into_iter()
            .map(|local| to_ring(&topo, &local))
            .collect();
        Self { rings }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: AtomKey) -> bool {
        self.rings.iter().any(|r| r.contains_atom(atom))
    }

    pub fn is_ring_bond(&self, bond: BondKey) -> bool {
        self.rings.iter().any(|r| r.contains_bond(bond))
    }

    pub fn smallest_ring_size(&self, atom: AtomKey) -> Option<usize> {
        self.rings
            .iter()
            .filter(|r| r.contains_atom(atom))
            .map(Ring::len)
            .min()
    }

    pub fn atom_rings(&self, atom: AtomKey) -> impl Iterator<Item = &Ring> + '_ {
        self.rings.iter().filter(move |r| r.contains_atom(atom))
    }

    pub fn expected_ring_count(mol: &Molecule) -> usize {
        expected_ring_count(&Topology::of(mol))
    }
}

fn expected_ring_count(topo: &Topology) -> usize {
    (topo.bond_count() + topo.component_count()).saturating_sub(topo.atom_count())
}

fn to_ring(topo: &Topology, local: &[usize]) -> Ring {
    let len = local.len();
    let bonds = (0..len)
        .filter_map(|i| topo.bond_between(local[i], local[(i + 1) % len]))
        .map(|b| topo.bonds[b])
        .collect();
    Ring {
        atoms: local.iter().map(|&i| topo.atoms[i]).collect(),
        bonds,
    }
}

fn horton_candidates(topo: &Topology) -> Vec<Vec<usize>> {
    let n = topo.atom_count();
    let (dist, pred) = shortest_path_trees(topo);
    let mut candidates = Vec::new();

    for &(u, v) in &topo.ends {
        for w in 0..n {
            let (du, dv) = (dist[w][u], dist[w][v]);
            if du == u32::MAX || dv == u32::MAX || du + dv + 1 < 3 {
                continue;
            }
            let path_u = path_from(&pred[w], w, u);
            let path_v = path_from(&pred[w], w, v);
            if path_u.is_empty() || path_v.is_empty() {
                continue;
            }
            if path_u[1..].iter().any(|x| path_v[1..].contains(x)) {
                continue;
            }
            let mut ring = path_u;
            ring.extend(path_v[1..].iter().rev());
            candidates.push(normalize_ring(&ring));
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

fn shortest_path_trees(topo: &Topology) -> (Vec<Vec<u32>>, Vec<Vec<Option<usize>>>) {
    let n = topo.atom_count();
    let mut dist = vec![vec![u32::MAX; n]; n];
    let mut pred = vec![vec![None; n]; n];
    for src in 0..n {
        let (d, p) = (&mut dist[src], &mut pred[src]);
        d[src] = 0;
        let mut queue = VecDeque::from([src]);
        while let Some(cur) = queue.pop_front() {
            for nb in topo.neighbors(cur) {
                if d[nb] == u32::MAX {
                    d[nb] = d[cur] + 1;
                    p[nb] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
    }
    (dist, pred)
}

fn path_from(pred: &[Option<usize>], src: usize, dst: usize) -> Vec<usize> {
    let mut path = vec![dst];
    let mut cur = dst;
    while cur != src {
        match pred[cur] {
            Some(p) => {
                path.push(p);
                cur = p;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

fn select_independent_rings(topo: &Topology, candidates: &[Vec<usize>], needed: usize) -> Vec<Vec<usize>> {
    let words = topo.bond_count().div_ceil(64);
    let mut basis: Vec<Vec<u64>> = Vec::with_capacity(needed);
    let mut result = Vec::with_capacity(needed);

    for ring in candidates {
        if result.len() >= needed {
            break;
        }
        let mut bits = vec![0u64; words];
        for i in 0..ring.len() {
            if let Some(b) = topo.bond_between(ring[i], ring[(i + 1) % ring.len()]) {
                bits[b / 64] |= 1 << (b % 64);
            }
        }
        if try_add_to_basis(&mut basis, bits) {
            result.push(ring.clone());
        }
    }
    result
}

/// Gaussian elimination over GF(2); each basis row keeps a distinct pivot.
fn try_add_to_basis(basis: &mut Vec<Vec<u64>>, mut v: Vec<u64>) -> bool {
    for row in basis.iter() {
        if let Some(p) = lowest_bit(row) {
            if v[p / 64] & (1 << (p % 64)) != 0 {
                for (a, b) in v.iter_mut().zip(row) {
                    *a ^= b;
                }
            }
        }
    }
    if v.iter().all(|&w| w == 0) {
        return false;
    }
    basis.push(v);
    true
}

fn lowest_bit(bits: &[u64]) -> Option<usize> {
    bits.iter()
        .enumerate()
        .find(|(_, w)| **w != 0)
        .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
}

/// Rotate to the smallest index and pick the direction with the smaller
/// second element.
fn normalize_ring(ring: &[usize]) -> Vec<usize> {
    let len = ring.len();
    let Some(start) = (0..len).min_by_key(|&i| ring[i]) else {
        return Vec::new();
    };
    let mut out: Vec<usize> = (0..len).map(|i| ring[(start + i) % len]).collect();
    if len > 2 && out[1] > out[len - 1] {
        out[1..].reverse();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{build, cycle};

    #[test]
    fn cyclohexane() {
        let (mol, _, _) = cycle(6, false);
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 1);
        assert_eq!(ri.rings()[0].len(), 6);
        assert_eq!(ri.rings()[0].bonds.len(), 6);
    }

    #[test]
    fn cyclopropane() {
        let (mol, _, _) = cycle(3, false);
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 1);
        assert_eq!(ri.rings()[0].len(), 3);
    }

    #[test]
    fn acyclic() {
        let (mol, _, _) = build(&["C", "C", "C", "C"], &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]);
        assert_eq!(RingInfo::sssr(&mol).num_rings(), 0);
        assert_eq!(RingInfo::expected_ring_count(&mol), 0);
    }

    #[test]
    fn naphthalene() {
        let (mol, atoms, _) = crate::fixtures::naphthalene();
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
        assert!(ri.rings().iter().all(|r| r.len() == 6));
        let shared = atoms.iter().filter(|&&a| ri.atom_rings(a).count() == 2).count();
        assert_eq!(shared, 2);
    }

    #[test]
    fn norbornane() {
        // C1CC2CC1CC2
        let (mol, _, _) = build(
            &["C"; 7],
            &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 4, 1), (4, 0, 1), (4, 5, 1), (5, 6, 1), (6, 2, 1)],
        );
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 2);
        let mut sizes: Vec<usize> = ri.rings().iter().map(Ring::len).collect();
        sizes.sort();
        assert_eq!(sizes, vec![5, 5]);
    }

    #[test]
    fn cubane() {
        let edges = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        let bonds: Vec<(usize, usize, u8)> = edges.iter().map(|&(a, b)| (a, b, 1)).collect();
        let (mol, _, _) = build(&["C"; 8], &bonds);
        assert_eq!(RingInfo::expected_ring_count(&mol), 5);
        let ri = RingInfo::sssr(&mol);
        assert_eq!(ri.num_rings(), 5);
        assert!(ri.rings().iter().all(|r| r.len() == 4));
    }

    #[test]
    fn substituent_not_in_ring() {
        let (mut mol, atoms, _) = cycle(6, true);
        let o = mol.insert_vertex(crate::Atom::new(crate::Element::O));
        let b = mol.insert_edge(atoms[0], o, crate::Bond::single()).unwrap();
        let ri = RingInfo::sssr(&mol);
        assert!(!ri.is_ring_atom(o));
        assert!(!ri.is_ring_bond(b));
        assert!(atoms.iter().all(|&a| ri.is_ring_atom(a)));
        assert_eq!(ri.smallest_ring_size(atoms[0]), Some(6));
        assert_eq!(ri.smallest_ring_size(o), None);
    }

    #[test]
    fn disconnected_bond_opens_the_ring() {
        let (mut mol, _, bonds) = cycle(6, false);
        mol.temporarily_disconnect_edge(bonds[2]).unwrap();
        assert_eq!(RingInfo::sssr(&mol).num_rings(), 0);
        mol.reconnect_temporarily_disconnected_edges();
        assert_eq!(RingInfo::sssr(&mol).num_rings(), 1);
    }

    #[test]
    fn ring_starts_at_earliest_atom() {
        let (mol, atoms, bonds) = cycle(5, false);
        let binding = RingInfo::sssr(&mol);
        let ring = &binding.rings()[0];
        assert_eq!(ring.atoms[0], atoms[0]);
        assert_eq!(ring.atoms[1], atoms[1]);
        assert_eq!(ring.bonds[0], bonds[0]);
    }
}
