//! Small molecules shared by unit tests.

use crate::atom::{Atom, AtomSymbol};
use crate::bond::{Bond, BondOrder};
use crate::mol::{AtomKey, BondKey, Molecule};

/// Builds a molecule from symbols and `(from, to, order)` triples.
pub(crate) fn build(
    symbols: &[&str],
    bonds: &[(usize, usize, u8)],
) -> (Molecule, Vec<AtomKey>, Vec<BondKey>) {
    let mut mol = Molecule::new();
    let atoms: Vec<AtomKey> = symbols
        .iter()
        .map(|s| mol.insert_vertex(Atom::with_symbol(AtomSymbol::parse(s).unwrap())))
        .collect();
    let bonds = bonds
        .iter()
        .map(|&(a, b, order)| {
            let bond = Bond::new(BondOrder::from_digit(order).unwrap());
            mol.insert_edge(atoms[a], atoms[b], bond).unwrap()
        })
        .collect();
    (mol, atoms, bonds)
}

/// An `n`-membered carbon ring, optionally with alternating double bonds
/// starting at the first bond.
pub(crate) fn cycle(n: usize, alternating: bool) -> (Molecule, Vec<AtomKey>, Vec<BondKey>) {
    let bonds: Vec<(usize, usize, u8)> = (0..n)
        .map(|i| {
            let order = if alternating && i % 2 == 0 { 2 } else { 1 };
            (i, (i + 1) % n, order)
        })
        .collect();
    build(&vec!["C"; n], &bonds)
}

/// Kekulé naphthalene whose shared bond is single, so only one ring
/// alternates on its own.
pub(crate) fn naphthalene() -> (Molecule, Vec<AtomKey>, Vec<BondKey>) {
    build(
        &["C"; 10],
        &[
            (0, 1, 1),
            (1, 2, 2),
            (2, 3, 1),
            (3, 4, 2),
            (4, 9, 1),
            (9, 0, 2),
            (4, 5, 1),
            (5, 6, 2),
            (6, 7, 1),
            (7, 8, 2),
            (8, 9, 1),
        ],
    )
}
