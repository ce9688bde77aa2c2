//! Atom label text and which way it faces.

use glam::DVec2;
use petgraph::graph::NodeIndex;

use super::geometry::is_linear_atom;
use super::options::DrawOptions;
use super::text::OrientType;
use crate::atom::AtomQuery;
use crate::element;
use crate::Molecule;

/// Bonds steeper than 70 degrees count as vertical.
fn vert_slope() -> f64 {
    70.0_f64.to_radians().tan()
}

/// Side of the atom its label should grow towards: away from the sum of
/// the bond vectors.
pub fn atom_orientation(mol: &Molecule, atom: NodeIndex, at_cds: &[DVec2]) -> OrientType {
    let degree = mol.degree(atom);
    if degree == 0 {
        return if element::hydrogens_listed_first(mol.atom(atom).atomic_num) {
            OrientType::W
        } else {
            OrientType::E
        };
    }

    let at1_cds = at_cds[atom.index()];
    let nbr_sum: DVec2 = mol
        .neighbors(atom)
        .map(|nbr| at_cds[nbr.index()] - at1_cds)
        .sum();

    let islope = if nbr_sum.x.abs() > 1.0e-4 {
        nbr_sum.y / nbr_sum.x
    } else {
        1000.0
    };
    if islope.abs() <= vert_slope() {
        return if nbr_sum.x > 0.0 {
            OrientType::W
        } else {
            OrientType::E
        };
    }

    // Terminal atoms are only ever labelled sideways.
    if degree == 1 {
        return OrientType::E;
    }
    let mut orient = if nbr_sum.y > 0.0 {
        OrientType::S
    } else {
        OrientType::N
    };
    if degree == 3 {
        // A near-vertical bond on the label side would run through the H.
        let tan10 = 10.0_f64.to_radians().tan();
        for nbr in mol.neighbors(atom) {
            let v = at_cds[nbr.index()] - at1_cds;
            if v.x.abs() > tan10 * v.y.abs() {
                continue;
            }
            if orient == OrientType::N && v.y > 0.0 {
                orient = OrientType::S;
                break;
            }
            if orient == OrientType::S && v.y < 0.0 {
                orient = OrientType::N;
                break;
            }
        }
    }
    orient
}

/// Marked-up label for an atom; empty when the atom is drawn as a bare
/// vertex.
pub fn atom_symbol(
    mol: &Molecule,
    atom: NodeIndex,
    orient: OrientType,
    at_cds: &[DVec2],
    opts: &DrawOptions,
) -> String {
    if opts.no_atom_labels {
        return String::new();
    }
    let at = mol.atom(atom);
    let degree = mol.degree(atom);
    let mut iso = at.isotope;

    let literal = if let Some(label) = opts.atom_labels.get(&atom.index()) {
        Some(label.clone())
    } else if at.display_label.is_some() || at.display_label_w.is_some() {
        let lbl = at.display_label.clone().unwrap_or_default();
        let lblw = at.display_label_w.clone().unwrap_or_default();
        let lbl = if lbl.is_empty() { lblw.clone() } else { lbl };
        Some(if orient == OrientType::W && !lblw.is_empty() {
            lblw
        } else {
            lbl
        })
    } else if let Some(label) = &at.label {
        Some(label.clone())
    } else if opts.dummies_are_attachments && at.atomic_num == 0 && degree == 1 {
        return String::new();
    } else if let Some(AtomQuery::List { elements, negated }) = &at.query {
        let names: Vec<&str> = elements.iter().map(|&n| element::symbol(n)).collect();
        let bang = if *negated { "!" } else { "" };
        Some(format!("{}[{}]", bang, names.join(",")))
    } else if at.is_complex_query() {
        Some("?".to_owned())
    } else if opts.atom_label_deuterium_tritium
        && at.atomic_num == 1
        && (iso == 2 || iso == 3)
    {
        iso = 0;
        Some(if at.isotope == 2 { "D" } else { "T" }.to_owned())
    } else {
        None
    };
    if let Some(symbol) = literal {
        if symbol.is_empty() {
            return symbol;
        }
        return format!("<lit>{}</lit>", symbol);
    }

    let mut pre_text = Vec::new();
    let mut post_text = Vec::new();
    if at.map_num != 0 {
        post_text.push(format!(":{}", at.map_num));
    }
    if at.formal_charge != 0 {
        let sgn = if at.formal_charge > 0 { "+" } else { "-" };
        let chg = at.formal_charge.unsigned_abs();
        if chg > 1 {
            post_text.push(format!("<sup>{}{}</sup>", chg, sgn));
        } else {
            post_text.push(format!("<sup>{}</sup>", sgn));
        }
    }

    let is_carbon = at.atomic_num == 6;
    let explicit_methyl = opts.explicit_methyl && is_carbon && degree == 1;
    let num_h = if is_carbon && degree > 0 && !explicit_methyl {
        0
    } else {
        at.hydrogen_count
    };
    if num_h > 0 && at.query.is_none() {
        if num_h > 1 {
            post_text.push(format!("H<sub>{}</sub>", num_h));
        } else {
            post_text.push("H".to_owned());
        }
    }
    if iso != 0
        && ((opts.isotope_labels && at.atomic_num != 0)
            || (opts.dummy_isotope_labels && at.atomic_num == 0))
    {
        pre_text.push(format!("<sup>{}</sup>", iso));
    }

    let mut symbol = pre_text.concat();
    if is_linear_atom(mol, atom, at_cds)
        || !is_carbon
        || degree == 0
        || explicit_methyl
        || !pre_text.is_empty()
        || !post_text.is_empty()
    {
        symbol.push_str(element::symbol(at.atomic_num));
    }
    symbol.push_str(&post_text.concat());
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Atom, Bond, BondOrder};

    fn chain(nums: &[u8], cds: &[[f64; 2]]) -> (Molecule, Vec<DVec2>) {
        let mut mol = Molecule::new();
        let idx: Vec<_> = nums.iter().map(|&n| mol.add_atom(Atom::new(n))).collect();
        for w in idx.windows(2) {
            mol.add_bond(w[0], w[1], Bond::new(BondOrder::Single));
        }
        let cds = cds.iter().map(|p| DVec2::new(p[0], p[1])).collect();
        (mol, cds)
    }

    #[test]
    fn chain_carbon_has_no_label() {
        let (mol, cds) = chain(&[6, 6, 8], &[[0.0, 0.0], [1.5, 0.0], [2.2, 1.3]]);
        let opts = DrawOptions::default();
        assert_eq!(atom_symbol(&mol, NodeIndex::new(1), OrientType::E, &cds, &opts), "");
        assert_eq!(atom_symbol(&mol, NodeIndex::new(2), OrientType::E, &cds, &opts), "O");
    }

    #[test]
    fn hydrogens_charge_and_isotope() {
        let (mut mol, cds) = chain(&[6, 7], &[[0.0, 0.0], [1.5, 0.0]]);
        let n = NodeIndex::new(1);
        mol.atom_mut(n).hydrogen_count = 3;
        mol.atom_mut(n).formal_charge = 1;
        mol.atom_mut(n).isotope = 15;
        mol.atom_mut(n).map_num = 4;
        let opts = DrawOptions::default();
        assert_eq!(
            atom_symbol(&mol, n, OrientType::W, &cds, &opts),
            "<sup>15</sup>N:4<sup>+</sup>H<sub>3</sub>"
        );
        mol.atom_mut(n).formal_charge = -2;
        mol.atom_mut(n).isotope = 0;
        mol.atom_mut(n).map_num = 0;
        mol.atom_mut(n).hydrogen_count = 1;
        assert_eq!(atom_symbol(&mol, n, OrientType::W, &cds, &opts), "N<sup>2-</sup>H");
    }

    #[test]
    fn methane_and_explicit_methyl() {
        let mut mol = Molecule::new();
        let c = mol.add_atom(Atom {
            atomic_num: 6,
            hydrogen_count: 4,
            ..Atom::default()
        });
        let cds = vec![DVec2::ZERO];
        let mut opts = DrawOptions::default();
        assert_eq!(atom_symbol(&mol, c, OrientType::E, &cds, &opts), "CH<sub>4</sub>");

        let (mut mol, cds) = chain(&[6, 8], &[[0.0, 0.0], [1.5, 0.0]]);
        mol.atom_mut(NodeIndex::new(0)).hydrogen_count = 3;
        assert_eq!(atom_symbol(&mol, NodeIndex::new(0), OrientType::W, &cds, &opts), "");
        opts.explicit_methyl = true;
        assert_eq!(
            atom_symbol(&mol, NodeIndex::new(0), OrientType::W, &cds, &opts),
            "CH<sub>3</sub>"
        );
    }

    #[test]
    fn label_sources_in_priority_order() {
        let (mut mol, cds) = chain(&[0, 6], &[[0.0, 0.0], [1.5, 0.0]]);
        let d = NodeIndex::new(0);
        let mut opts = DrawOptions::default();
        assert_eq!(atom_symbol(&mol, d, OrientType::W, &cds, &opts), "*");
        opts.dummies_are_attachments = true;
        assert_eq!(atom_symbol(&mol, d, OrientType::W, &cds, &opts), "");
        mol.atom_mut(d).label = Some("R1".into());
        assert_eq!(atom_symbol(&mol, d, OrientType::W, &cds, &opts), "<lit>R1</lit>");
        mol.atom_mut(d).display_label = Some("CO2H".into());
        mol.atom_mut(d).display_label_w = Some("HO2C".into());
        assert_eq!(atom_symbol(&mol, d, OrientType::W, &cds, &opts), "<lit>HO2C</lit>");
        assert_eq!(atom_symbol(&mol, d, OrientType::E, &cds, &opts), "<lit>CO2H</lit>");
        opts.atom_labels.insert(0, "X".into());
        assert_eq!(atom_symbol(&mol, d, OrientType::E, &cds, &opts), "<lit>X</lit>");
        opts.no_atom_labels = true;
        assert_eq!(atom_symbol(&mol, d, OrientType::E, &cds, &opts), "");
    }

    #[test]
    fn query_atoms() {
        let (mut mol, cds) = chain(&[6, 6], &[[0.0, 0.0], [1.5, 0.0]]);
        let a = NodeIndex::new(1);
        mol.atom_mut(a).query = Some(AtomQuery::List {
            elements: vec![6, 7],
            negated: true,
        });
        let opts = DrawOptions::default();
        assert_eq!(atom_symbol(&mol, a, OrientType::E, &cds, &opts), "<lit>![C,N]</lit>");
        mol.atom_mut(a).query = Some(AtomQuery::Complex);
        assert_eq!(atom_symbol(&mol, a, OrientType::E, &cds, &opts), "<lit>?</lit>");
    }

    #[test]
    fn deuterium_option() {
        let (mut mol, cds) = chain(&[6, 1], &[[0.0, 0.0], [1.5, 0.0]]);
        let h = NodeIndex::new(1);
        mol.atom_mut(h).isotope = 2;
        let mut opts = DrawOptions::default();
        assert_eq!(atom_symbol(&mol, h, OrientType::E, &cds, &opts), "<sup>2</sup>H");
        opts.atom_label_deuterium_tritium = true;
        assert_eq!(atom_symbol(&mol, h, OrientType::E, &cds, &opts), "<lit>D</lit>");
    }

    #[test]
    fn orientation_faces_away_from_bonds() {
        let (mol, cds) = chain(&[6, 8], &[[0.0, 0.0], [1.5, 0.0]]);
        assert_eq!(atom_orientation(&mol, NodeIndex::new(1), &cds), OrientType::E);
        assert_eq!(atom_orientation(&mol, NodeIndex::new(0), &cds), OrientType::W);
        // A terminal atom straight below its neighbour stays sideways.
        let (mol, cds) = chain(&[6, 8], &[[0.0, 0.0], [0.0, -1.5]]);
        assert_eq!(atom_orientation(&mol, NodeIndex::new(1), &cds), OrientType::E);
    }

    #[test]
    fn orientation_vertical_for_bent_atom() {
        // N with both neighbours above it: label hangs below.
        let (mol, cds) = chain(&[6, 7, 6], &[[-1.3, 0.75], [0.0, 0.0], [1.3, 0.75]]);
        assert_eq!(atom_orientation(&mol, NodeIndex::new(1), &cds), OrientType::S);
        let (mol, cds) = chain(&[6, 7, 6], &[[-1.3, -0.75], [0.0, 0.0], [1.3, -0.75]]);
        assert_eq!(atom_orientation(&mol, NodeIndex::new(1), &cds), OrientType::N);
    }

    #[test]
    fn isolated_atoms() {
        let mut mol = Molecule::new();
        let o = mol.add_atom(Atom::new(8));
        let n = mol.add_atom(Atom::new(7));
        let cds = vec![DVec2::ZERO, DVec2::new(3.0, 0.0)];
        assert_eq!(atom_orientation(&mol, o, &cds), OrientType::W);
        assert_eq!(atom_orientation(&mol, n, &cds), OrientType::E);
    }
}
