//! Lazy substructure search.
//!
//! [`Substructure`] walks the pattern→target mapping space with an explicit
//! backtracking stack and yields one [`SubstructureMatch`] per `next()`. The
//! search holds no mutable borrow, so stopping early is just dropping the
//! iterator.

use std::collections::HashSet;

use crate::bond::{Bond, BondOrder};
use crate::mol::{AtomKey, BondKey, Molecule};
use crate::topology::Topology;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Target atoms may carry bonds the pattern does not mention. When off,
    /// a target atom may exceed its pattern atom's degree only by that
    /// atom's `free_sites`.
    pub implicit_free_sites: bool,
    /// Report each set of target atoms and bonds once, however many
    /// automorphisms of the pattern map onto it.
    pub unique: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            implicit_free_sites: true,
            unique: true,
        }
    }
}

/// `(pattern, target)` key pairs in pattern insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubstructureMatch {
    pub atoms: Vec<(AtomKey, AtomKey)>,
    pub bonds: Vec<(BondKey, BondKey)>,
}

impl SubstructureMatch {
    pub fn image(&self, pattern_atom: AtomKey) -> Option<AtomKey> {
        self.atoms
            .iter()
            .find(|(p, _)| *p == pattern_atom)
            .map(|&(_, t)| t)
    }

    pub fn target_atoms(&self) -> impl Iterator<Item = AtomKey> + '_ {
        self.atoms.iter().map(|&(_, t)| t)
    }

    pub fn target_bonds(&self) -> impl Iterator<Item = BondKey> + '_ {
        self.bonds.iter().map(|&(_, t)| t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Searching,
    Done,
}

/// Temporarily disconnected bonds of either molecule are invisible.
#[derive(Debug)]
pub struct Substructure<'a> {
    pattern: &'a Molecule,
    target: &'a Molecule,
    p: Topology,
    t: Topology,
    options: MatchOptions,
    order: Vec<usize>,
    candidates: Vec<Vec<usize>>,
    cursors: Vec<usize>,
    map: Vec<Option<usize>>,
    used: Vec<bool>,
    depth: usize,
    seen: HashSet<(Vec<usize>, Vec<usize>)>,
    state: State,
}

pub fn find_substructures<'a>(
    target: &'a Molecule,
    pattern: &'a Molecule,
    options: MatchOptions,
) -> Substructure<'a> {
    Substructure::new(target, pattern, options)
}

pub fn has_match(target: &Molecule, pattern: &Molecule, options: MatchOptions) -> bool {
    first_match(target, pattern, options).is_some()
}

pub fn first_match(
    target: &Molecule,
    pattern: &Molecule,
    options: MatchOptions,
) -> Option<SubstructureMatch> {
    Substructure::new(target, pattern, options).next()
}

impl Molecule {
    pub fn select_matching_substructures<'a>(
        &'a self,
        pattern: &'a Molecule,
        options: MatchOptions,
    ) -> Substructure<'a> {
        Substructure::new(self, pattern, options)
    }
}

fn is_aromatic(bond: &Bond) -> bool {
    bond.is_aromatic() || bond.order == BondOrder::Aromatic
}

fn bonds_compatible(pattern: &Bond, target: &Bond) -> bool {
    pattern.order == target.order || (is_aromatic(pattern) && is_aromatic(target))
}

impl<'a> Substructure<'a> {
    fn new(target: &'a Molecule, pattern: &'a Molecule, options: MatchOptions) -> Self {
        let p = Topology::of(pattern);
        let t = Topology::of(target);

        let mut order: Vec<usize> = (0..p.atom_count()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(p.degree(i)));

        let candidates = (0..p.atom_count())
            .map(|pi| {
                let pa = pattern.atom(p.atoms[pi]);
                (0..t.atom_count())
                    .filter(|&ti| {
                        let ta = target.atom(t.atoms[ti]);
                        if ta.symbol != pa.symbol || ta.charge != pa.charge {
                            return false;
                        }
                        let (pd, td) = (p.degree(pi), t.degree(ti));
                        td >= pd
                            && (options.implicit_free_sites
                                || td <= pd + usize::from(pa.free_sites))
                    })
                    .collect()
            })
            .collect();

        let n = p.atom_count();
        let m = t.atom_count();
        Self {
            pattern,
            target,
            p,
            t,
            options,
            order,
            candidates,
            cursors: vec![0; n],
            map: vec![None; n],
            used: vec![false; m],
            depth: 0,
            seen: HashSet::new(),
            state: State::Fresh,
        }
    }

    fn feasible(&self, pi: usize, ti: usize) -> bool {
        self.p.adj[pi].iter().all(|&(pn, pb)| match self.map[pn] {
            None => true,
            Some(tn) => match self.t.bond_between(ti, tn) {
                Some(tb) => bonds_compatible(
                    self.pattern.bond(self.p.bonds[pb]),
                    self.target.bond(self.t.bonds[tb]),
                ),
                None => false,
            },
        })
    }

    fn advance(&mut self) -> bool {
        let pi = self.order[self.depth];
        while let Some(&ti) = self.candidates[pi].get(self.cursors[self.depth]) {
            self.cursors[self.depth] += 1;
            if self.used[ti] || !self.feasible(pi, ti) {
                continue;
            }
            self.map[pi] = Some(ti);
            self.used[ti] = true;
            return true;
        }
        false
    }

    fn unplace(&mut self, depth: usize) {
        let pi = self.order[depth];
        if let Some(ti) = self.map[pi].take() {
            self.used[ti] = false;
        }
    }

    fn current(&self) -> (SubstructureMatch, (Vec<usize>, Vec<usize>)) {
        let mut result = SubstructureMatch::default();
        let mut atoms_key = Vec::with_capacity(self.map.len());
        for (pi, ti) in self.map.iter().enumerate() {
            let ti = ti.unwrap_or_default();
            atoms_key.push(ti);
            result.atoms.push((self.p.atoms[pi], self.t.atoms[ti]));
        }
        let mut bonds_key = Vec::with_capacity(self.p.bond_count());
        for (pb, &(a, b)) in self.p.ends.iter().enumerate() {
            let (ta, tb) = (self.map[a].unwrap_or_default(), self.map[b].unwrap_or_default());
            if let Some(tbond) = self.t.bond_between(ta, tb) {
                bonds_key.push(tbond);
                result.bonds.push((self.p.bonds[pb], self.t.bonds[tbond]));
            }
        }
        atoms_key.sort_unstable();
        bonds_key.sort_unstable();
        (result, (atoms_key, bonds_key))
    }
}

impl Iterator for Substructure<'_> {
    type Item = SubstructureMatch;

    fn next(&mut self) -> Option<SubstructureMatch> {
        match self.state {
            State::Done => return None,
            State::Fresh => {
                if self.order.is_empty() {
                    self.state = State::Done;
                    return Some(SubstructureMatch::default());
                }
                if self.p.atom_count() > self.t.atom_count()
                    || self.p.bond_count() > self.t.bond_count()
                {
                    self.state = State::Done;
                    return None;
                }
                self.state = State::Searching;
            }
            State::Searching => {}
        }

        let last = self.order.len() - 1;
        loop {
            if self.advance() {
                if self.depth < last {
                    self.depth += 1;
                    self.cursors[self.depth] = 0;
                    continue;
                }
                let (found, key) = self.current();
                self.unplace(self.depth);
                if self.options.unique && !self.seen.insert(key) {
                    continue;
                }
                return Some(found);
            }
            if self.depth == 0 {
                self.state = State::Done;
                return None;
            }
            self.depth -= 1;
            self.unplace(self.depth);
        }
    }
}
