use criterion::{black_box, criterion_group, criterion_main, Criterion};

use sketchcrab::{find_substructures, has_match, Atom, Bond, Document, MatchOptions, Molecule};

fn ring(n: usize) -> Molecule {
    let mut mol = Molecule::new();
    let atoms: Vec<_> = (0..n).map(|_| mol.insert_vertex(Atom::carbon())).collect();
    for i in 0..n {
        let bond = if i % 2 == 0 { Bond::double() } else { Bond::single() };
        mol.insert_edge(atoms[i], atoms[(i + 1) % n], bond).unwrap();
    }
    mol
}

/// `count` benzene rings joined in a chain by single bonds.
fn polyphenyl(count: usize) -> Molecule {
    let mut mol = Molecule::new();
    let mut previous = None;
    for _ in 0..count {
        let map = mol.absorb(ring(6));
        let mut keys: Vec<_> = map.atoms.values().copied().collect();
        keys.sort();
        if let Some(prev) = previous {
            mol.insert_edge(prev, keys[0], Bond::single()).unwrap();
        }
        previous = Some(keys[3]);
    }
    mol
}

fn bench_substructure(c: &mut Criterion) {
    let target = polyphenyl(20);
    let benzene = ring(6);
    let mut pair = Molecule::new();
    let a = pair.insert_vertex(Atom::carbon());
    let b = pair.insert_vertex(Atom::carbon());
    pair.insert_edge(a, b, Bond::single()).unwrap();

    let mut group = c.benchmark_group("substructure");
    group.bench_function("first/benzene_in_polyphenyl20", |bch| {
        bch.iter(|| black_box(has_match(&target, &benzene, MatchOptions::default())))
    });
    group.bench_function("all/benzene_in_polyphenyl20", |bch| {
        bch.iter(|| black_box(find_substructures(&target, &benzene, MatchOptions::default()).count()))
    });
    group.bench_function("all/cc_in_polyphenyl20", |bch| {
        bch.iter(|| black_box(find_substructures(&target, &pair, MatchOptions::default()).count()))
    });
    group.finish();
}

fn bench_cdml(c: &mut Criterion) {
    let mut doc = Document::new();
    doc.add_molecule(polyphenyl(20));
    let text = doc.to_cdml_string().unwrap();

    let mut group = c.benchmark_group("cdml");
    group.bench_function("read/polyphenyl20", |b| {
        b.iter(|| black_box(Document::from_cdml_str(black_box(&text)).unwrap()))
    });
    group.bench_function("write/polyphenyl20", |b| {
        b.iter(|| black_box(doc.to_cdml_string().unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_substructure, bench_cdml);
criterion_main!(benches);
