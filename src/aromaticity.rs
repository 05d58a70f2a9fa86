use std::collections::HashSet;

use crate::bond::BondOrder;
use crate::config::{AromaticityConfig, AromaticityModel};
use crate::element::Element;
use crate::mol::{AtomKey, BondKey, Molecule};
use crate::rings::{Ring, RingInfo};

/// Elements that can sit in an aromatic ring under the Hückel model.
const SP2_CAPABLE: [Element; 6] = [
    Element::B,
    Element::C,
    Element::N,
    Element::O,
    Element::P,
    Element::S,
];

#[derive(Debug, Default)]
pub(crate) struct AromaticFlags {
    pub(crate) atoms: HashSet<AtomKey>,
    pub(crate) bonds: HashSet<BondKey>,
}

/// SSSR rings that pass `config`'s rule, in ring order. Reads bond orders
/// only; stored aromatic flags are ignored, so the result does not depend
/// on earlier perception runs.
pub fn aromatic_rings(mol: &Molecule, config: &AromaticityConfig) -> Vec<Ring> {
    let candidates: Vec<Ring> = RingInfo::sssr(mol)
        .rings()
        .iter()
        .filter(|r| r.len() >= config.min_ring_size.max(3))
        .cloned()
        .collect();
    let mut accepted = vec![false; candidates.len()];
    let mut flagged: HashSet<BondKey> = HashSet::new();

    // fused rings can only be recognised once a neighbour has been accepted
    loop {
        let mut changed = false;
        for (i, ring) in candidates.iter().enumerate() {
            if accepted[i] || !is_aromatic_ring(mol, ring, &flagged, config.model) {
                continue;
            }
            accepted[i] = true;
            flagged.extend(ring.bonds.iter().copied());
            changed = true;
        }
        if !changed {
            break;
        }
    }

    candidates
        .into_iter()
        .zip(accepted)
        .filter_map(|(r, ok)| ok.then_some(r))
        .collect()
}

pub(crate) fn perceive(mol: &Molecule, config: &AromaticityConfig) -> AromaticFlags {
    let mut flags = AromaticFlags::default();
    for ring in aromatic_rings(mol, config) {
        flags.atoms.extend(ring.atoms);
        flags.bonds.extend(ring.bonds);
    }
    flags
}

fn is_aromatic_ring(
    mol: &Molecule,
    ring: &Ring,
    flagged: &HashSet<BondKey>,
    model: AromaticityModel,
) -> bool {
    if ring
        .bonds
        .iter()
        .all(|&b| mol.bond(b).order == BondOrder::Aromatic)
    {
        return true;
    }
    match model {
        AromaticityModel::Alternating => alternates(mol, ring, flagged),
        AromaticityModel::Huckel => is_huckel_ring(mol, ring),
    }
}

/// Bond orders run double, single, double, ... around the ring, in either
/// phase. Explicit aromatic bonds and bonds of an already accepted ring fit
/// both positions.
fn alternates(mol: &Molecule, ring: &Ring, flagged: &HashSet<BondKey>) -> bool {
    if ring.len() % 2 == 1 {
        return false;
    }
    [0, 1].into_iter().any(|phase| {
        ring.bonds.iter().enumerate().all(|(i, &b)| {
            let order = mol.bond(b).order;
            let wanted = if (i + phase) % 2 == 0 {
                BondOrder::Double
            } else {
                BondOrder::Single
            };
            order == wanted || order == BondOrder::Aromatic || flagged.contains(&b)
        })
    })
}

fn is_huckel_ring(mol: &Molecule, ring: &Ring) -> bool {
    let mut pi_total: u8 = 0;
    for (i, &atom) in ring.atoms.iter().enumerate() {
        match mol.atom(atom).element() {
            Some(e) if SP2_CAPABLE.contains(&e) => {}
            _ => return false,
        }
        match pi_electrons(mol, ring, i) {
            Some(e) => pi_total = pi_total.saturating_add(e),
            None => return false,
        }
    }
    if ring
        .bonds
        .iter()
        .any(|&b| mol.bond(b).order == BondOrder::Triple)
    {
        return false;
    }
    is_huckel(pi_total)
}

fn is_pi_bond(order: BondOrder) -> bool {
    matches!(order, BondOrder::Double | BondOrder::Aromatic)
}

fn pi_electrons(mol: &Molecule, ring: &Ring, pos: usize) -> Option<u8> {
    let key = ring.atoms[pos];
    let atom = mol.atom(key);
    let len = ring.len();
    let has_double = mol.bonds_of(key).any(|b| is_pi_bond(mol.bond(b).order));
    let has_double_in_ring = [ring.bonds[pos], ring.bonds[(pos + len - 1) % len]]
        .iter()
        .any(|&b| is_pi_bond(mol.bond(b).order));
    let total_degree = mol.degree(key) + usize::from(mol.hydrogen_count(key));

    match (atom.element()?, atom.charge) {
        (Element::C, 0) => has_double.then_some(1),
        (Element::C, -1) => Some(2),
        (Element::C, 1) => Some(u8::from(has_double)),
        (Element::N, 0) | (Element::P, 0) => {
            if has_double {
                Some(1)
            } else if total_degree <= 3 {
                Some(2)
            } else {
                None
            }
        }
        (Element::N, 1) => has_double_in_ring.then_some(1),
        (Element::O, 0) | (Element::S, 0) => {
            if has_double_in_ring {
                Some(1)
            } else {
                Some(2)
            }
        }
        (Element::B, 0) => Some(u8::from(has_double)),
        _ => None,
    }
}

fn is_huckel(pi_electrons: u8) -> bool {
    pi_electrons >= 2 && (pi_electrons - 2) % 4 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;
    use crate::fixtures::{build, cycle, naphthalene};

    fn huckel() -> AromaticityConfig {
        AromaticityConfig {
            model: AromaticityModel::Huckel,
            min_ring_size: 3,
        }
    }

    #[test]
    fn kekule_benzene() {
        let (mut mol, atoms, bonds) = cycle(6, true);
        mol.mark_aromatic_bonds();
        assert!(bonds.iter().all(|&b| mol.bond(b).is_aromatic()));
        assert!(atoms.iter().all(|&a| mol.atom(a).is_aromatic()));
    }

    #[test]
    fn explicit_aromatic_order() {
        let (mut mol, _, bonds) = build(&["C"; 6], &[(0, 1, 4), (1, 2, 4), (2, 3, 4), (3, 4, 4), (4, 5, 4), (5, 0, 4)]);
        mol.mark_aromatic_bonds();
        assert!(bonds.iter().all(|&b| mol.bond(b).is_aromatic()));
    }

    #[test]
    fn cyclohexane_is_not_aromatic() {
        let (mut mol, _, bonds) = cycle(6, false);
        mol.mark_aromatic_bonds();
        assert!(bonds.iter().all(|&b| !mol.bond(b).is_aromatic()));
    }

    #[test]
    fn cyclohexadiene_is_not_aromatic() {
        let (mut mol, _, bonds) = build(&["C"; 6], &[(0, 1, 2), (1, 2, 1), (2, 3, 2), (3, 4, 1), (4, 5, 1), (5, 0, 1)]);
        mol.mark_aromatic_bonds();
        assert!(bonds.iter().all(|&b| !mol.bond(b).is_aromatic()));
    }

    #[test]
    fn naphthalene_both_rings() {
        let (mut mol, _, bonds) = naphthalene();
        mol.mark_aromatic_bonds();
        assert!(bonds.iter().all(|&b| mol.bond(b).is_aromatic()));
    }

    #[test]
    fn substituent_bond_stays_plain() {
        let (mut mol, atoms, _) = cycle(6, true);
        let o = mol.insert_vertex(Atom::new(Element::O));
        let co = mol.insert_edge(atoms[0], o, Bond::single()).unwrap();
        mol.mark_aromatic_bonds();
        assert!(!mol.bond(co).is_aromatic());
        assert!(!mol.atom(o).is_aromatic());
    }

    #[test]
    fn flags_reset_after_edit() {
        let (mut mol, _, bonds) = cycle(6, true);
        mol.mark_aromatic_bonds();
        mol.bond_mut(bonds[0]).order = BondOrder::Single;
        mol.mark_aromatic_bonds();
        assert!(bonds.iter().all(|&b| !mol.bond(b).is_aromatic()));
    }

    #[test]
    fn marking_is_idempotent() {
        let (mut mol, _, bonds) = naphthalene();
        mol.mark_aromatic_bonds();
        let first: Vec<bool> = bonds.iter().map(|&b| mol.bond(b).is_aromatic()).collect();
        mol.mark_aromatic_bonds();
        let second: Vec<bool> = bonds.iter().map(|&b| mol.bond(b).is_aromatic()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn min_ring_size_excludes_small_rings() {
        let (mut mol, _, bonds) = build(&["C"; 4], &[(0, 1, 2), (1, 2, 1), (2, 3, 2), (3, 0, 1)]);
        mol.mark_aromatic_bonds();
        assert!(bonds.iter().all(|&b| !mol.bond(b).is_aromatic()));
    }

    #[test]
    fn huckel_pyrrole_and_furan() {
        for hetero in ["N", "O", "S"] {
            let (mut mol, _, bonds) =
                build(&[hetero, "C", "C", "C", "C"], &[(0, 1, 1), (1, 2, 2), (2, 3, 1), (3, 4, 2), (4, 0, 1)]);
            mol.mark_aromatic_bonds_with(&huckel());
            assert!(bonds.iter().all(|&b| mol.bond(b).is_aromatic()), "{hetero}");
            mol.mark_aromatic_bonds();
            assert!(bonds.iter().all(|&b| !mol.bond(b).is_aromatic()), "{hetero}");
        }
    }

    #[test]
    fn huckel_rejects_cyclobutadiene() {
        let (mut mol, _, bonds) = build(&["C"; 4], &[(0, 1, 2), (1, 2, 1), (2, 3, 2), (3, 0, 1)]);
        mol.mark_aromatic_bonds_with(&huckel());
        assert!(bonds.iter().all(|&b| !mol.bond(b).is_aromatic()));
    }

    #[test]
    fn huckel_cyclopentadienyl_anion() {
        let (mut mol, atoms, bonds) =
            build(&["C"; 5], &[(0, 1, 1), (1, 2, 2), (2, 3, 1), (3, 4, 2), (4, 0, 1)]);
        assert!(aromatic_rings(&mol, &huckel()).is_empty());
        mol.atom_mut(atoms[0]).charge = -1;
        mol.mark_aromatic_bonds_with(&huckel());
        assert!(bonds.iter().all(|&b| mol.bond(b).is_aromatic()));
    }

    #[test]
    fn huckel_counts() {
        assert!(is_huckel(2));
        assert!(is_huckel(6));
        assert!(is_huckel(10));
        assert!(!is_huckel(4));
        assert!(!is_huckel(0));
    }
}
