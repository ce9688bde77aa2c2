#![allow(dead_code)]

use crabdepict::element::from_symbol;
use crabdepict::{Atom, Bond, BondOrder, Conformer, MolDrawer, Molecule, RecordingBackend};
use glam::DVec2;

/// Molecule from element symbols, 2D coordinates and bonds.
pub fn mol(symbols: &[&str], coords: &[[f64; 2]], bonds: &[(usize, usize, BondOrder)]) -> Molecule {
    let mut mol = Molecule::new();
    let atoms: Vec<_> = symbols
        .iter()
        .map(|s| mol.add_atom(Atom::new(from_symbol(s).unwrap_or(0))))
        .collect();
    for &(a, b, order) in bonds {
        mol.add_bond(atoms[a], atoms[b], Bond::new(order));
    }
    mol.add_conformer(Conformer::from_2d(coords));
    mol
}

/// Flat hexagon of bond length 1.5 centred on the origin.
pub fn hexagon() -> Vec<[f64; 2]> {
    (0..6)
        .map(|i| {
            let a = std::f64::consts::FRAC_PI_3 * i as f64;
            [1.5 * a.cos(), 1.5 * a.sin()]
        })
        .collect()
}

pub fn drawer(width: u32, height: u32) -> MolDrawer<RecordingBackend> {
    MolDrawer::new(width, height, None, RecordingBackend::new()).unwrap()
}

pub fn midpoint(a: DVec2, b: DVec2) -> DVec2 {
    (a + b) * 0.5
}

pub fn assert_close(a: DVec2, b: DVec2) {
    assert!((a - b).length() < 1e-6, "{a} != {b}");
}
