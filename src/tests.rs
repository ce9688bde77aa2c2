use petgraph::graph::NodeIndex;

use crate::*;

fn carbonyl() -> Molecule {
    let mut mol = Molecule::new();
    let c = mol.add_atom(Atom::new(6));
    let o = mol.add_atom(Atom::new(8));
    mol.add_bond(c, o, Bond::new(BondOrder::Double));
    mol
}

#[test]
fn mol_add_atoms_and_bonds() {
    let mut mol = Mol::<Atom, Bond>::new();
    let c = mol.add_atom(Atom {
        atomic_num: 6,
        ..Atom::default()
    });
    let o = mol.add_atom(Atom {
        atomic_num: 8,
        ..Atom::default()
    });
    let bond_idx = mol.add_bond(
        c,
        o,
        Bond {
            order: BondOrder::Double,
            ..Bond::default()
        },
    );

    assert_eq!(mol.atom_count(), 2);
    assert_eq!(mol.bond_count(), 1);
    assert_eq!(mol.atom(c).atomic_num, 6);
    assert_eq!(mol.atom(o).atomic_num, 8);
    assert_eq!(mol.bond(bond_idx).order, BondOrder::Double);
}

#[test]
fn mol_neighbors_and_bonds_of() {
    let mut mol = Molecule::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    mol.add_bond(a, b, Bond::default());
    mol.add_bond(a, c, Bond::default());

    assert_eq!(mol.neighbors(a).count(), 2);
    assert_eq!(mol.bonds_of(a).count(), 2);
    assert_eq!(mol.degree(b), 1);
}

#[test]
fn mol_bond_between_and_endpoints() {
    let mut mol = Molecule::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    let e = mol.add_bond(a, b, Bond::default());

    assert_eq!(mol.bond_between(a, b), Some(e));
    assert_eq!(mol.bond_between(a, c), None);
    // Begin and end keep the order the bond was added in; wedges rely on it.
    assert_eq!(mol.bond_endpoints(e), Some((a, b)));
    assert_eq!(mol.other_atom(e, b), Some(a));
    assert_eq!(mol.other_atom(e, c), None);
}

#[test]
fn bond_trait_impls() {
    let bond = Bond {
        order: BondOrder::Triple,
        direction: BondDirection::BeginWedge,
        ..Bond::default()
    };

    assert_eq!(HasBondOrder::bond_order(&bond), BondOrder::Triple);
    assert_eq!(HasBondStereo::bond_stereo(&bond), BondStereo::None);
    assert_eq!(HasBondDirection::bond_direction(&bond), BondDirection::BeginWedge);
    assert!(!HasAromaticity::is_aromatic(&bond));
}

#[test]
fn defaults() {
    assert_eq!(Chirality::default(), Chirality::None);
    assert_eq!(BondOrder::default(), BondOrder::Single);
    let atom = Atom::default();
    assert_eq!(atom.atomic_num, 0);
    assert_eq!(atom.map_num, 0);
    assert!(atom.label.is_none());
    let mol = Molecule::default();
    assert_eq!(mol.atom_count(), 0);
    assert!(mol.conformer(None).is_none());
}

#[test]
fn conformer_lookup() {
    let mut mol = carbonyl();
    assert!(mol.conformer(None).is_none());
    mol.add_conformer(Conformer::from_2d(&[[0.0, 0.0], [1.2, 0.0]]));
    let second = mol.add_conformer(Conformer::from_2d(&[[0.0, 0.0], [0.0, 1.2]]));
    assert_eq!(second, 1);
    assert_eq!(
        mol.conformer(None).and_then(|c| c.position(NodeIndex::new(1))),
        Some([1.2, 0.0, 0.0])
    );
    assert_eq!(
        mol.conformer(Some(1)).and_then(|c| c.position(NodeIndex::new(1))),
        Some([0.0, 1.2, 0.0])
    );
    assert!(mol.conformer(Some(2)).is_none());
}

#[test]
fn insert_mol_offsets_atoms_and_coordinates() {
    let mut a = carbonyl();
    a.add_conformer(Conformer::from_2d(&[[0.0, 0.0], [1.2, 0.0]]));
    let mut b = carbonyl();
    b.add_conformer(Conformer::from_2d(&[[5.0, 0.0], [6.2, 0.0]]));

    let offset = a.insert_mol(&b, None);
    assert_eq!(offset, 2);
    assert_eq!(a.atom_count(), 4);
    assert_eq!(a.bond_count(), 2);
    assert!(a.bond_between(NodeIndex::new(2), NodeIndex::new(3)).is_some());
    assert_eq!(a.conformers().len(), 1);
    assert_eq!(
        a.conformer(None).and_then(|c| c.position(NodeIndex::new(3))),
        Some([6.2, 0.0, 0.0])
    );
    assert_eq!(a.fragment_ids(), vec![0, 0, 1, 1]);
}

#[test]
fn equality_covers_decorations() {
    let a = carbonyl();
    let mut b = carbonyl();
    assert_eq!(a, b);
    b.set_note(Some("ketone".to_owned()));
    assert_ne!(a, b);
    b.set_note(None);
    b.set_chiral_flag(true);
    assert_ne!(a, b);
}

#[test]
fn reaction_components_run_reactants_agents_products() {
    let mut rxn = Reaction::default();
    rxn.add_product(carbonyl());
    rxn.add_reactant(Molecule::new());
    rxn.add_agent(carbonyl());
    let sizes: Vec<usize> = rxn.components().map(|m| m.atom_count()).collect();
    assert_eq!(sizes, vec![0, 2, 2]);
    assert_eq!(rxn.num_components(), 3);
}
