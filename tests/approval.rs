use serde::Deserialize;

use sketchcrab::{
    Atom, AtomSymbol, Bond, BondOrder, AromaticityConfig, AromaticityModel, Molecule,
};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct Entry {
    name: String,
    #[serde(default)]
    model: AromaticityModel,
    atoms: Vec<String>,
    bonds: Vec<(usize, usize, u8)>,
    formula: String,
    exact_mw: f64,
    num_rings: usize,
    aromatic_bonds: usize,
}

fn load_entries() -> Vec<Entry> {
    serde_json::from_str(include_str!("approval_data/molecules.json")).unwrap()
}

fn build(entry: &Entry) -> Molecule {
    let mut mol = Molecule::with_name(entry.name.clone());
    let atoms: Vec<_> = entry
        .atoms
        .iter()
        .map(|s| mol.insert_vertex(Atom::with_symbol(AtomSymbol::parse(s).unwrap())))
        .collect();
    for &(a, b, order) in &entry.bonds {
        let bond = Bond::new(BondOrder::from_digit(order).unwrap());
        mol.insert_edge(atoms[a], atoms[b], bond).unwrap();
    }
    mol
}

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

fn report(what: &str, failures: Vec<String>) {
    if !failures.is_empty() {
        panic!("{} {what} failures:\n{}", failures.len(), failures.join("\n"));
    }
}

// ---------------------------------------------------------------------------
// 1. Formula & weight
// ---------------------------------------------------------------------------

#[test]
fn approval_formula_weight() {
    let mut failures = Vec::new();
    for entry in &load_entries() {
        let mol = build(entry);

        let formula = mol.formula();
        if formula.to_string() != entry.formula {
            failures.push(format!(
                "[formula] {}: expected {:?}, got {:?}",
                entry.name,
                entry.formula,
                formula.to_string()
            ));
        }

        let emw = formula.exact_mass();
        if !approx_eq(emw, entry.exact_mw, 0.001) {
            failures.push(format!(
                "[exact_mw] {}: expected {}, got {}",
                entry.name, entry.exact_mw, emw
            ));
        }
    }
    report("formula/weight", failures);
}

// ---------------------------------------------------------------------------
// 2. Rings
// ---------------------------------------------------------------------------

#[test]
fn approval_ring_count() {
    let mut failures = Vec::new();
    for entry in &load_entries() {
        let mol = build(entry);
        let rings = mol.ring_info().num_rings();
        if rings != entry.num_rings {
            failures.push(format!(
                "[rings] {}: expected {}, got {}",
                entry.name, entry.num_rings, rings
            ));
        }
    }
    report("ring", failures);
}

// ---------------------------------------------------------------------------
// 3. Aromaticity
// ---------------------------------------------------------------------------

#[test]
fn approval_aromaticity() {
    let mut failures = Vec::new();
    for entry in &load_entries() {
        let mut mol = build(entry);
        let config = AromaticityConfig {
            model: entry.model,
            ..AromaticityConfig::default()
        };
        mol.mark_aromatic_bonds_with(&config);
        let aromatic = mol.bonds().filter(|&b| mol.bond(b).is_aromatic()).count();
        if aromatic != entry.aromatic_bonds {
            failures.push(format!(
                "[aromatic_bonds] {} ({:?}): expected {}, got {}",
                entry.name, entry.model, entry.aromatic_bonds, aromatic
            ));
        }
    }
    report("aromaticity", failures);
}
