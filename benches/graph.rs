use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sketchcrab::{Atom, Bond, BondKey, Molecule};

/// Linear acene with `rings` fused six-membered rings, drawn in one Kekulé
/// form.
fn acene(rings: usize) -> Molecule {
    let mut mol = Molecule::new();
    let top: Vec<_> = (0..=2 * rings).map(|_| mol.insert_vertex(Atom::carbon())).collect();
    let bottom: Vec<_> = (0..=2 * rings).map(|_| mol.insert_vertex(Atom::carbon())).collect();
    for i in 0..2 * rings {
        let order = if i % 2 == 0 { Bond::double() } else { Bond::single() };
        mol.insert_edge(top[i], top[i + 1], order.clone()).unwrap();
        let order = if i % 2 == 0 { Bond::single() } else { Bond::double() };
        mol.insert_edge(bottom[i], bottom[i + 1], order).unwrap();
    }
    for i in (0..=2 * rings).step_by(2) {
        mol.insert_edge(top[i], bottom[i], Bond::single()).unwrap();
    }
    mol
}

fn chain(n: usize) -> (Molecule, Vec<BondKey>) {
    let mut mol = Molecule::new();
    let atoms: Vec<_> = (0..n).map(|_| mol.insert_vertex(Atom::carbon())).collect();
    let bonds = atoms
        .windows(2)
        .map(|w| mol.insert_edge(w[0], w[1], Bond::single()).unwrap())
        .collect();
    (mol, bonds)
}

fn bench_rings(c: &mut Criterion) {
    let small = acene(2);
    let large = acene(10);

    let mut group = c.benchmark_group("rings");
    group.bench_function("sssr/naphthalene", |b| {
        b.iter(|| black_box(black_box(&small).ring_info()))
    });
    group.bench_function("sssr/decacene", |b| {
        b.iter(|| black_box(black_box(&large).ring_info()))
    });
    group.bench_function("aromaticity/decacene", |b| {
        b.iter_batched(
            || large.clone(),
            |mut mol| {
                mol.mark_aromatic_bonds();
                mol
            },
            criterion::BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_connectivity(c: &mut Criterion) {
    let (mut mol, bonds) = chain(500);
    let every_tenth: Vec<_> = bonds.iter().copied().step_by(10).collect();

    let mut group = c.benchmark_group("connectivity");
    group.bench_function("components/chain500", |b| {
        b.iter(|| black_box(mol.get_connected_components()))
    });
    group.bench_function("cut/chain500", |b| {
        b.iter(|| black_box(mol.cut(every_tenth.iter().copied()).unwrap()))
    });
    group.bench_function("formula/decacene", |b| {
        let large = acene(10);
        b.iter(|| black_box(large.formula()))
    });
    group.finish();
}

criterion_group!(benches, bench_rings, bench_connectivity);
criterion_main!(benches);
