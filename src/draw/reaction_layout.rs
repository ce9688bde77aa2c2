//! Reaction schemes: components side by side around an arrow.
//!
//! Reactants run left to right from the origin, then the arrow, then the
//! products. Agents are shrunk and sit above the arrow. Each component is
//! shifted by the width of its outermost labels so that neighbours do not
//! overlap.

use std::collections::BTreeMap;

use glam::DVec2;
use petgraph::graph::NodeIndex;

use super::backend::DrawBackend;
use super::canvas::Canvas;
use super::highlight::MolHighlights;
use super::labels::{atom_orientation, atom_symbol};
use super::options::DrawColour;
use super::prepare::centre_conformer;
use super::text::{OrientType, TextLayout};
use crate::reaction::Reaction;
use crate::{Atom, Conformer, Molecule};

pub(crate) const SPACING: f64 = 1.0;
const AGENT_SCALE: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Reactant,
    Product,
    Agent,
}

/// All components merged into one molecule, plus the scheme furniture.
#[derive(Debug, Clone)]
pub(crate) struct SchemeLayout {
    pub mol: Molecule,
    /// Component role of every atom of `mol`.
    pub roles: Vec<Role>,
    pub arrow_begin: DVec2,
    pub arrow_end: DVec2,
    /// x positions of the "+" signs; they sit on the arrow's line.
    pub plus_locs: Vec<f64>,
    pub num_reactants: usize,
    pub num_products: usize,
}

/// Running state of the left-to-right layout.
#[derive(Debug, Clone, Copy)]
struct Extent {
    offset: f64,
    max_y: f64,
    min_y: f64,
}

impl SchemeLayout {
    /// Two dummy atoms at the arrow ends followed by the merged
    /// components, for fitting a scheme whose arrow sticks out.
    pub fn with_arrow_atoms(&self) -> Molecule {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(0));
        mol.add_atom(Atom::new(0));
        mol.add_conformer(Conformer::from_2d(&[
            self.arrow_begin.to_array(),
            self.arrow_end.to_array(),
        ]));
        mol.insert_mol(&self.mol, None);
        mol
    }

    /// Colour mapped atoms by the reactant fragment they come from.
    /// Product atoms follow through their map numbers; bonds are
    /// highlighted back to lower-numbered atoms of the same colour. Map
    /// numbers are cleared so they are not drawn.
    pub fn reactant_highlights(&mut self, palette: &[DrawColour]) -> MolHighlights {
        let mut hl = MolHighlights::default();
        if palette.is_empty() {
            return hl;
        }
        let frags = self.mol.fragment_ids();
        let mut bonds = Vec::new();
        let mut map_frag = BTreeMap::new();
        for role in [Role::Reactant, Role::Product] {
            for idx in 0..self.mol.atom_count() {
                let node = NodeIndex::new(idx);
                let map_num = self.mol.atom(node).map_num;
                if self.roles[idx] != role || map_num == 0 {
                    continue;
                }
                let frag = match role {
                    Role::Reactant => {
                        map_frag.insert(map_num, frags[idx]);
                        frags[idx]
                    }
                    _ => match map_frag.get(&map_num) {
                        Some(&f) => f,
                        None => continue,
                    },
                };
                let colour = palette[frag % palette.len()];
                hl.atoms.push(idx);
                hl.atom_colours.insert(idx, colour);
                self.mol.atom_mut(node).map_num = 0;

                let nbrs: Vec<NodeIndex> = self.mol.neighbors(node).collect();
                for nbr in nbrs.into_iter().filter(|n| n.index() < idx) {
                    let joined = match role {
                        Role::Reactant => frags[nbr.index()] == frags[idx],
                        _ => hl.atom_colours.get(&nbr.index()) == Some(&colour),
                    };
                    if !joined {
                        continue;
                    }
                    if let Some(bond) = self.mol.bond_between(node, nbr) {
                        bonds.push(bond.index());
                        hl.bond_colours.insert(bond.index(), colour);
                    }
                }
            }
        }
        hl.bonds = Some(bonds);
        hl
    }
}

impl<B: DrawBackend> Canvas<B> {
    /// Label width and height of every atom at font scale one, in molecule
    /// units, with the side each label grows to.
    fn label_sizes(&mut self, mol: &Molecule, positions: &[DVec2]) -> Vec<(f64, f64, OrientType)> {
        let font_scale = self.text.font_scale();
        self.text.set_font_scale(1.0, true);
        let sizes = mol
            .atoms()
            .map(|a| {
                let orient = atom_orientation(mol, a, positions);
                let sym = atom_symbol(mol, a, orient, positions, &self.options);
                if sym.is_empty() {
                    return (0.0, 0.0, orient);
                }
                let (lo, hi) = self.text.extremes(&sym, TextLayout::Label(orient));
                (hi.x - lo.x, hi.y - lo.y, orient)
            })
            .collect();
        self.text.set_font_scale(font_scale, true);
        sizes
    }

    /// Centre a copy of one component, scale it by `coord_scale` and move
    /// it to the right of `ext.offset`. `None` if it has no coordinates.
    fn place_component(
        &mut self,
        mol: &Molecule,
        conf_id: Option<usize>,
        ext: &mut Extent,
        shift_agents: bool,
        coord_scale: f64,
    ) -> Option<Molecule> {
        let mut copy = mol.clone();
        if copy.conformer(conf_id).is_none() {
            log::warn!("reaction component has no coordinates, left out");
            return None;
        }
        if copy.atom_count() == 0 {
            return Some(copy);
        }
        centre_conformer(&mut copy, conf_id);
        let conf = copy.conformer(conf_id)?;
        let old: Vec<[f64; 3]> = conf.positions().to_vec();
        let positions: Vec<DVec2> = old.iter().map(|p| DVec2::new(p[0], p[1])).collect();
        let sizes = self.label_sizes(&copy, &positions);

        let v_shift = if shift_agents { 1.1 * ext.max_y / 2.0 } else { 0.0 };
        let min_x = positions
            .iter()
            .zip(&sizes)
            .map(|(p, &(w, _, orient))| {
                let x = if orient == OrientType::W { p.x - w } else { p.x - w / 2.0 };
                x * coord_scale
            })
            .fold(f64::MAX, f64::min);
        ext.offset += min_x.abs();

        let mut max_x = f64::MIN;
        let mut moved = Vec::with_capacity(positions.len());
        for (p, &(w, h, orient)) in positions.iter().zip(&sizes) {
            let y = p.y * coord_scale + v_shift;
            let half_h = h / 2.0;
            let w = if orient == OrientType::E { w } else { w / 2.0 };
            if !shift_agents {
                ext.max_y = ext.max_y.max(y + half_h);
                ext.min_y = ext.min_y.min(y - half_h);
            }
            let x = p.x * coord_scale + ext.offset;
            max_x = max_x.max(x + w);
            moved.push(DVec2::new(x, y));
        }
        ext.offset = max_x + SPACING;

        let conf = copy.conformer_mut(conf_id)?;
        for (i, (p, z)) in moved.iter().zip(old.iter().map(|o| o[2])).enumerate() {
            conf.set_position(NodeIndex::new(i), [p.x, p.y, z]);
        }
        Some(copy)
    }

    /// Lay out every component of `rxn` and merge them into one molecule.
    /// `conf_ids` runs over reactants, agents and products in that order.
    pub(crate) fn layout_reaction(
        &mut self,
        rxn: &Reaction,
        conf_ids: Option<&[Option<usize>]>,
    ) -> SchemeLayout {
        let n_reactants = rxn.reactant_templates().len();
        let n_agents = rxn.agent_templates().len();
        let conf = |i: usize| conf_ids.and_then(|ids| ids.get(i).copied()).flatten();
        let mut ext = Extent {
            offset: 0.0,
            max_y: -1.0e8,
            min_y: 1.0e8,
        };
        let mut plus_locs = Vec::new();

        let mut reactants = Vec::new();
        for (i, mol) in rxn.reactant_templates().iter().enumerate() {
            if i > 0 {
                plus_locs.push(ext.offset);
                ext.offset += SPACING;
            }
            reactants.extend(self.place_component(mol, conf(i), &mut ext, false, 1.0).map(|m| (m, conf(i))));
        }
        let arrow_begin_x = ext.offset;
        ext.offset += SPACING;
        let agents_start = ext.offset;

        // Products first, from zero, so that the full height is known
        // before the agents are shifted up. They move right afterwards.
        ext.offset = 0.0;
        let mut products = Vec::new();
        for (i, mol) in rxn.product_templates().iter().enumerate() {
            if i > 0 {
                plus_locs.push(ext.offset);
                ext.offset += SPACING;
            }
            let id = conf(n_reactants + n_agents + i);
            products.extend(self.place_component(mol, id, &mut ext, false, 1.0).map(|m| (m, id)));
        }

        ext.offset = agents_start;
        let mut agents = Vec::new();
        for (i, mol) in rxn.agent_templates().iter().enumerate() {
            let id = conf(n_reactants + i);
            agents.extend(self.place_component(mol, id, &mut ext, true, AGENT_SCALE).map(|m| (m, id)));
        }
        let arrow_end_x = if n_agents > 0 {
            ext.offset
        } else {
            ext.offset + 3.0 * SPACING
        };

        let shift = arrow_end_x + 1.5 * SPACING;
        for (mol, id) in &mut products {
            if let Some(c) = mol.conformer_mut(*id) {
                let shifted: Vec<[f64; 3]> =
                    c.positions().iter().map(|p| [p[0] + shift, p[1], p[2]]).collect();
                for (i, p) in shifted.into_iter().enumerate() {
                    c.set_position(NodeIndex::new(i), p);
                }
            }
        }
        let start_p = n_reactants.saturating_sub(1);
        for loc in plus_locs.iter_mut().skip(start_p) {
            *loc += shift;
        }

        let mid_y = if ext.min_y <= ext.max_y {
            ext.min_y + (ext.max_y - ext.min_y) / 2.0
        } else {
            0.0
        };

        let mut merged = Molecule::new();
        let mut roles = Vec::new();
        for (group, role) in [
            (&reactants, Role::Reactant),
            (&products, Role::Product),
            (&agents, Role::Agent),
        ] {
            for (mol, id) in group {
                merged.insert_mol(mol, *id);
                roles.extend(std::iter::repeat(role).take(mol.atom_count()));
            }
        }
        log::debug!(
            "reaction laid out: arrow {arrow_begin_x:.2}..{arrow_end_x:.2} at y {mid_y:.2}, {} atoms",
            merged.atom_count()
        );
        SchemeLayout {
            mol: merged,
            roles,
            arrow_begin: DVec2::new(arrow_begin_x, mid_y),
            arrow_end: DVec2::new(arrow_end_x, mid_y),
            plus_locs,
            num_reactants: n_reactants,
            num_products: rxn.product_templates().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::backend::RecordingBackend;
    use crate::draw::text::FixedWidthMetrics;
    use crate::{Bond, BondOrder};

    fn canvas() -> Canvas<RecordingBackend> {
        Canvas::new(
            600,
            200,
            None,
            RecordingBackend::new(),
            Box::new(FixedWidthMetrics::default()),
        )
        .unwrap()
    }

    /// Carbon chain along x with map numbers `maps`.
    fn chain(maps: &[u16]) -> Molecule {
        let mut mol = Molecule::new();
        let atoms: Vec<_> = maps
            .iter()
            .map(|&m| {
                mol.add_atom(Atom {
                    map_num: m,
                    ..Atom::new(6)
                })
            })
            .collect();
        for pair in atoms.windows(2) {
            mol.add_bond(pair[0], pair[1], Bond::new(BondOrder::Single));
        }
        let points: Vec<[f64; 2]> = (0..maps.len()).map(|i| [1.5 * i as f64, 0.0]).collect();
        mol.add_conformer(Conformer::from_2d(&points));
        mol
    }

    fn xs(mol: &Molecule) -> Vec<f64> {
        mol.conformer(None)
            .map(|c| c.positions().iter().map(|p| p[0]).collect())
            .unwrap_or_default()
    }

    #[test]
    fn components_run_left_to_right() {
        let mut c = canvas();
        c.options.no_atom_labels = true;
        let rxn = Reaction::new(vec![chain(&[0, 0]), chain(&[0])], vec![], vec![chain(&[0, 0])]);
        let layout = c.layout_reaction(&rxn, None);
        let x = xs(&layout.mol);
        // First reactant spans 0..1.5; "+" at 2.5; second reactant at 3.5.
        assert_eq!(x[..3], [0.0, 1.5, 3.5]);
        assert_eq!(layout.arrow_begin.x, 4.5);
        assert_eq!(layout.arrow_end.x, 8.5);
        assert_eq!(layout.plus_locs, vec![2.5]);
        // Products start 1.5 spacings after the arrow.
        assert_eq!(x[3..], [10.0, 11.5]);
        assert_eq!(layout.roles[3], Role::Product);
        assert_eq!(layout.arrow_begin.y, 0.0);
    }

    #[test]
    fn agents_are_shrunk_above_the_arrow() {
        let mut c = canvas();
        c.options.no_atom_labels = true;
        let mut tall = chain(&[0, 0]);
        tall.add_conformer(Conformer::from_2d(&[[0.0, -1.0], [0.0, 1.0]]));
        let rxn = Reaction::new(vec![tall], vec![chain(&[0, 0])], vec![chain(&[0])]);
        let layout = c.layout_reaction(&rxn, Some(&[Some(1), None, None]));
        let agent: Vec<_> = (0..layout.mol.atom_count())
            .filter(|&i| layout.roles[i] == Role::Agent)
            .collect();
        let conf = layout.mol.conformer(None).unwrap();
        let p0 = conf.positions()[agent[0]];
        let p1 = conf.positions()[agent[1]];
        assert!((p1[0] - p0[0] - 1.5 * AGENT_SCALE).abs() < 1e-9);
        assert!((p0[1] - 0.55).abs() < 1e-9);
        // The arrow ends one spacing past the last agent atom.
        assert!((layout.arrow_end.x - (p1[0] + SPACING)).abs() < 1e-9);
    }

    #[test]
    fn components_without_coordinates_are_left_out() {
        let mut c = canvas();
        let mut bare = Molecule::new();
        bare.add_atom(Atom::new(8));
        let rxn = Reaction::new(vec![bare], vec![], vec![chain(&[0])]);
        let layout = c.layout_reaction(&rxn, None);
        assert_eq!(layout.mol.atom_count(), 1);
        assert_eq!(layout.roles, vec![Role::Product]);
    }

    #[test]
    fn product_atoms_take_their_reactant_colour() {
        let mut c = canvas();
        let rxn = Reaction::new(
            vec![chain(&[1, 2]), chain(&[3])],
            vec![],
            vec![chain(&[1, 2, 3])],
        );
        let mut layout = c.layout_reaction(&rxn, None);
        let palette = [DrawColour::new(1.0, 0.0, 0.0), DrawColour::new(0.0, 0.0, 1.0)];
        let hl = layout.reactant_highlights(&palette);
        assert_eq!(hl.atoms, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(hl.atom_colours[&2], palette[1]);
        assert_eq!(hl.atom_colours[&5], palette[1]);
        assert_eq!(hl.atom_colours[&4], palette[0]);
        // Reactant bond 0 and product bond 3-4; 4-5 joins two colours.
        assert_eq!(hl.bonds, Some(vec![0, 1]));
        assert!(layout.mol.atoms().all(|a| layout.mol.atom(a).map_num == 0));
    }

    #[test]
    fn arrow_atoms_lead_the_scale_molecule() {
        let mut c = canvas();
        let rxn = Reaction::new(vec![chain(&[0])], vec![], vec![]);
        let layout = c.layout_reaction(&rxn, None);
        let mol = layout.with_arrow_atoms();
        assert_eq!(mol.atom_count(), 3);
        let conf = mol.conformer(None).unwrap();
        assert_eq!(conf.positions()[1][0], layout.arrow_end.x);
    }
}
