use criterion::{black_box, criterion_group, criterion_main, Criterion};

use crabdepict::{
    Atom, Bond, BondOrder, Conformer, GridRequest, MolDrawer, MolHighlights, Molecule, Reaction,
    RecordingBackend,
};
use petgraph::graph::NodeIndex;

/// Fused hexagons in a row, with every other ring bond double and an
/// oxygen on each end.
fn acene(rings: usize) -> Molecule {
    let mut mol = Molecule::new();
    let mut coords = Vec::new();
    let h = 1.5 * 3f64.sqrt() / 2.0;
    for i in 0..=rings {
        let x = 2.0 * h * i as f64;
        coords.push([x, 0.75]);
        coords.push([x, -0.75]);
        mol.add_atom(Atom::new(6));
        mol.add_atom(Atom::new(6));
    }
    for i in 0..rings {
        let x = 2.0 * h * i as f64 + h;
        coords.push([x, 1.5]);
        coords.push([x, -1.5]);
        mol.add_atom(Atom::new(6));
        mol.add_atom(Atom::new(6));
    }
    let n = NodeIndex::new;
    let top = 2 * (rings + 1);
    for i in 0..=rings {
        mol.add_bond(n(2 * i), n(2 * i + 1), Bond::new(BondOrder::Single));
    }
    for i in 0..rings {
        let order = if i % 2 == 0 { BondOrder::Double } else { BondOrder::Single };
        mol.add_bond(n(2 * i), n(top + 2 * i), Bond::new(order));
        mol.add_bond(n(top + 2 * i), n(2 * i + 2), Bond::new(BondOrder::Single));
        mol.add_bond(n(2 * i + 1), n(top + 2 * i + 1), Bond::new(BondOrder::Single));
        mol.add_bond(n(top + 2 * i + 1), n(2 * i + 3), Bond::new(order));
    }
    let o1 = mol.add_atom(Atom {
        hydrogen_count: 1,
        ..Atom::new(8)
    });
    coords.push([-1.3, 1.5]);
    mol.add_bond(n(0), o1, Bond::new(BondOrder::Single));
    let o2 = mol.add_atom(Atom::new(8));
    coords.push([2.0 * h * rings as f64 + 1.3, -1.5]);
    mol.add_bond(n(2 * rings + 1), o2, Bond::new(BondOrder::Double));
    mol.add_conformer(Conformer::from_2d(&coords));
    mol
}

fn bench_single(c: &mut Criterion) {
    let mol = acene(4);
    c.bench_function("draw_acene_4", |b| {
        b.iter(|| {
            let mut d = MolDrawer::new(600, 300, None, RecordingBackend::new()).unwrap();
            d.draw_molecule(black_box(&mol), &MolHighlights::default(), Some("acene"), None)
                .unwrap();
            black_box(d.into_backend())
        })
    });
}

fn bench_annotated(c: &mut Criterion) {
    let mol = acene(2);
    c.bench_function("draw_acene_2_with_indices", |b| {
        b.iter(|| {
            let mut d = MolDrawer::new(400, 300, None, RecordingBackend::new()).unwrap();
            d.options_mut().add_atom_indices = true;
            d.options_mut().add_bond_indices = true;
            d.draw_molecule(black_box(&mol), &MolHighlights::atoms([0, 1, 2]), None, None)
                .unwrap();
            black_box(d.into_backend())
        })
    });
}

fn bench_grid(c: &mut Criterion) {
    let mols: Vec<Molecule> = (1..=6).map(acene).collect();
    let refs: Vec<&Molecule> = mols.iter().collect();
    c.bench_function("draw_grid_6", |b| {
        b.iter(|| {
            let mut d = MolDrawer::new(900, 400, Some((300, 200)), RecordingBackend::new()).unwrap();
            d.draw_molecules(black_box(&refs), &GridRequest::default())
                .unwrap();
            black_box(d.into_backend())
        })
    });
}

fn bench_reaction(c: &mut Criterion) {
    let rxn = Reaction::new(vec![acene(1), acene(1)], vec![acene(1)], vec![acene(3)]);
    c.bench_function("draw_reaction", |b| {
        b.iter(|| {
            let mut d = MolDrawer::new(900, 300, None, RecordingBackend::new()).unwrap();
            d.draw_reaction(black_box(&rxn), true, None, None).unwrap();
            black_box(d.into_backend())
        })
    });
}

criterion_group!(benches, bench_single, bench_annotated, bench_grid, bench_reaction);
criterion_main!(benches);
