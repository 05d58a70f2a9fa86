use std::collections::HashMap;

use crate::mol::{AtomKey, BondKey, Molecule};

/// Dense, index-based snapshot of a molecule's active connectivity.
///
/// Atoms are numbered `0..n` in insertion order and bonds `0..m` in
/// insertion order, skipping temporarily disconnected bonds. Ring perception
/// and substructure search work on these local indices.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub(crate) atoms: Vec<AtomKey>,
    pub(crate) bonds: Vec<BondKey>,
    pub(crate) ends: Vec<(usize, usize)>,
    pub(crate) adj: Vec<Vec<(usize, usize)>>,
}

impl Topology {
    pub(crate) fn of(mol: &Molecule) -> Self {
        let atoms: Vec<AtomKey> = mol.atoms().collect();
        let index_of: HashMap<AtomKey, usize> =
            atoms.iter().enumerate().map(|(i, &a)| (a, i)).collect();
        let mut adj = vec![Vec::new(); atoms.len()];
        let mut bonds = Vec::new();
        let mut ends = Vec::new();
        for bond in mol.active_bonds() {
            let Some((a, b)) = mol.endpoints(bond) else {
                continue;
            };
            let (ia, ib) = (index_of[&a], index_of[&b]);
            let local = bonds.len();
            bonds.push(bond);
            ends.push((ia, ib));
            adj[ia].push((ib, local));
            adj[ib].push((ia, local));
        }
        Self {
            atoms,
            bonds,
            ends,
            adj,
        }
    }

    pub(crate) fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub(crate) fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub(crate) fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.adj[i].iter().map(|&(n, _)| n)
    }

    pub(crate) fn degree(&self, i: usize) -> usize {
        self.adj[i].len()
    }

    pub(crate) fn bond_between(&self, i: usize, j: usize) -> Option<usize> {
        self.adj[i].iter().find(|&&(n, _)| n == j).map(|&(_, b)| b)
    }

    pub(crate) fn component_count(&self) -> usize {
        let mut seen = vec![false; self.atom_count()];
        let mut count = 0;
        for start in 0..self.atom_count() {
            if seen[start] {
                continue;
            }
            count += 1;
            let mut stack = vec![start];
            seen[start] = true;
            while let Some(cur) = stack.pop() {
                for n in self.neighbors(cur) {
                    if !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
        }
        count
    }
}
