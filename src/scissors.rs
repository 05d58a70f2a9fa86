//! Splitting a molecule at chosen bonds to see what the pieces weigh, as in
//! reading fragment peaks off a mass spectrum.

use std::collections::HashSet;

use crate::formula::Formula;
use crate::mol::{AtomKey, BondKey, GraphError, Molecule};

/// One connected piece left after cutting.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub atoms: Vec<AtomKey>,
    /// Bonds inside the piece, cut bonds excluded.
    pub bonds: Vec<BondKey>,
    /// Composition with each atom's hydrogens as counted in the intact
    /// molecule.
    pub formula: Formula,
    pub exact_mass: f64,
}

impl Molecule {
    /// Cuts `bonds` and describes every resulting component. The molecule is
    /// left exactly as it was.
    ///
    /// ```
    /// use sketchcrab::{Atom, Bond, Element, Molecule};
    ///
    /// let mut mol = Molecule::new();
    /// let c1 = mol.insert_vertex(Atom::carbon());
    /// let c2 = mol.insert_vertex(Atom::carbon());
    /// let o = mol.insert_vertex(Atom::new(Element::O));
    /// mol.insert_edge(c1, c2, Bond::single()).unwrap();
    /// let co = mol.insert_edge(c2, o, Bond::single()).unwrap();
    ///
    /// let pieces = mol.cut([co]).unwrap();
    /// assert_eq!(pieces.len(), 2);
    /// assert_eq!(pieces[0].formula.to_string(), "C2H5");
    /// assert_eq!(pieces[1].formula.to_string(), "HO");
    /// ```
    pub fn cut(&mut self, bonds: impl IntoIterator<Item = BondKey>) -> Result<Vec<Piece>, GraphError> {
        let cut: HashSet<BondKey> = bonds.into_iter().collect();
        let components = self.with_disconnected(cut.iter().copied(), |mol| mol.get_connected_components())?;

        let pieces: Vec<Piece> = components
            .into_iter()
            .map(|atoms| {
                let bonds = self
                    .vertex_subgraph_to_edge_subgraph(atoms.iter().copied())
                    .into_iter()
                    .filter(|b| !cut.contains(b))
                    .collect();
                let formula: Formula = atoms.iter().map(|&a| self.atom_formula(a)).sum();
                let exact_mass = formula.exact_mass();
                Piece {
                    atoms,
                    bonds,
                    formula,
                    exact_mass,
                }
            })
            .collect();
        tracing::debug!(cut = cut.len(), pieces = pieces.len(), "cut molecule");
        Ok(pieces)
    }
}

#[cfg(test)]
mod tests {
    use crate::element::Element;
    use crate::fixtures::{build, cycle};
    use crate::mol::{BondKey, GraphError};

    #[test]
    fn uncut_molecule_is_one_piece() {
        let (mut mol, atoms, bonds) = build(&["C", "C", "O"], &[(0, 1, 1), (1, 2, 1)]);
        let pieces = mol.cut(Vec::<BondKey>::new()).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].atoms, atoms);
        assert_eq!(pieces[0].bonds, bonds);
        assert_eq!(pieces[0].formula, mol.formula());
    }

    #[test]
    fn ring_needs_two_cuts() {
        let (mut mol, _, bonds) = cycle(6, false);
        assert_eq!(mol.cut([bonds[0]]).unwrap().len(), 1);
        let pieces = mol.cut([bonds[0], bonds[3]]).unwrap();
        assert_eq!(pieces.len(), 2);
        for piece in &pieces {
            assert_eq!(piece.atoms.len(), 3);
            assert_eq!(piece.bonds.len(), 2);
            assert_eq!(piece.formula.count(Element::C), 3);
        }
        assert!(mol.disconnected_edges().next().is_none());
    }

    #[test]
    fn masses_add_up() {
        let (mut mol, _, bonds) = build(&["C", "C", "N", "O"], &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]);
        let total = mol.formula().exact_mass();
        let pieces = mol.cut([bonds[1]]).unwrap();
        let sum: f64 = pieces.iter().map(|p| p.exact_mass).sum();
        assert!((sum - total).abs() < 1e-9);
    }

    #[test]
    fn foreign_bond_is_rejected_and_nothing_changes() {
        let (mut mol, _, bonds) = build(&["C", "C"], &[(0, 1, 1)]);
        mol.temporarily_disconnect_edge(bonds[0]).unwrap();
        let (_, _, other) = build(&["C", "C", "C"], &[(0, 1, 1), (1, 2, 1)]);
        assert_eq!(mol.cut([other[1]]).unwrap_err(), GraphError::UnknownEdge);
        assert!(mol.is_disconnected(bonds[0]));
    }
}
