//! Highlight passes drawn underneath the molecule.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec2;
use petgraph::graph::NodeIndex;

use super::backend::DrawBackend;
use super::canvas::Canvas;
use super::context::DrawContext;
use super::geometry::{ellipse_line_intersection, perpendicular};
use super::options::DrawColour;
use crate::Molecule;

/// Half-width of a multi-colour bond band, as a fraction of the highlight
/// radius.
const BAND_RADIUS_FACTOR: f64 = 0.7;

/// Single-colour highlights for one molecule. Indices are atom and bond
/// indices of the molecule being drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MolHighlights {
    pub atoms: Vec<usize>,
    /// Highlighted bonds. `None` highlights every bond whose two atoms are
    /// both highlighted.
    pub bonds: Option<Vec<usize>>,
    pub atom_colours: BTreeMap<usize, DrawColour>,
    pub bond_colours: BTreeMap<usize, DrawColour>,
    /// Ellipse radii overriding `highlight_radius`, molecule units.
    pub radii: BTreeMap<usize, f64>,
}

impl MolHighlights {
    pub fn atoms(atoms: impl IntoIterator<Item = usize>) -> Self {
        Self {
            atoms: atoms.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty() && self.bonds.as_ref().map_or(true, Vec::is_empty)
    }

    /// The explicit bond list, or the bonds joining two highlighted atoms.
    pub fn resolved_bonds(&self, mol: &Molecule) -> Vec<usize> {
        match &self.bonds {
            Some(bonds) => bonds.clone(),
            None => bonds_between_atoms(mol, &self.atoms),
        }
    }
}

/// Highlights where an atom or bond may carry several colours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiColourHighlights {
    pub atoms: BTreeMap<usize, Vec<DrawColour>>,
    pub bonds: BTreeMap<usize, Vec<DrawColour>>,
    pub radii: BTreeMap<usize, f64>,
    /// Per-bond override of `highlight_bond_width_multiplier`.
    pub line_width_multipliers: BTreeMap<usize, i32>,
}

/// Bonds with both atoms in `atoms`, in bond index order.
pub fn bonds_between_atoms(mol: &Molecule, atoms: &[usize]) -> Vec<usize> {
    let set: BTreeSet<usize> = atoms.iter().copied().collect();
    mol.bonds()
        .filter(|&b| {
            mol.bond_endpoints(b)
                .is_some_and(|(a1, a2)| set.contains(&a1.index()) && set.contains(&a2.index()))
        })
        .map(|b| b.index())
        .collect()
}

impl<B: DrawBackend> Canvas<B> {
    /// Line width of a highlight band. Outline highlights are half as
    /// wide, but never thinner than a bond.
    pub(crate) fn highlight_bond_width(&self, multiplier: Option<i32>) -> f64 {
        let mut bwm = self.options.highlight_bond_width_multiplier;
        if !self.options.fill_highlights {
            bwm = (bwm / 2).max(1);
        }
        if let Some(m) = multiplier {
            bwm = m;
        }
        self.options.bond_line_width * f64::from(bwm)
    }

    /// Colour of an atom's label and bond halves. Highlight colours only
    /// apply when highlights are drawn by recolouring.
    pub(crate) fn atom_colour(
        &self,
        ctx: &DrawContext,
        atom: usize,
        highlight_atoms: &[usize],
        highlight_map: &BTreeMap<usize, DrawColour>,
    ) -> DrawColour {
        let mut colour = self
            .options
            .atom_colour(ctx.atomic_nums.get(atom).copied().unwrap_or(-1));
        if !self.options.circle_atoms && !self.options.continuous_highlight {
            if highlight_atoms.contains(&atom) {
                colour = self.options.highlight_colour;
            }
            if let Some(&c) = highlight_map.get(&atom) {
                colour = c;
            }
        }
        colour
    }

    /// Wide bands under the highlighted bonds, then a blob on each
    /// highlighted atom.
    pub(crate) fn draw_continuous_highlights(
        &mut self,
        ctx: &DrawContext,
        hl: &MolHighlights,
        bonds: &[usize],
    ) {
        let line_width = self.line_width();
        let fill = self.fill_polys();
        let target = self.highlight_bond_width(None).max(2.0);

        for bond in ctx.mol.bonds().filter(|b| bonds.contains(&b.index())) {
            let Some((a1, a2)) = ctx.mol.bond_endpoints(bond) else {
                continue;
            };
            let colour = hl
                .bond_colours
                .get(&bond.index())
                .copied()
                .unwrap_or(self.options.highlight_colour);
            self.set_line_width(target);
            let scale = self.options.scale_highlight_bond_width;
            let old = self.set_scale_line_width(scale);
            self.draw_line_coloured(ctx.at_cds[a1.index()], ctx.at_cds[a2.index()], colour, colour);
            self.set_scale_line_width(old);
        }

        for atom in (0..ctx.at_cds.len()).filter(|a| hl.atoms.contains(a)) {
            let colour = hl
                .atom_colours
                .get(&atom)
                .copied()
                .unwrap_or(self.options.highlight_colour);
            self.draw_highlighted_atom(ctx, atom, &[colour], &hl.radii);
        }
        self.set_line_width(line_width);
        self.set_fill_polys(fill);
    }

    /// Plain circles of the highlight radius, ignoring labels.
    pub(crate) fn draw_circle_highlights(&mut self, ctx: &DrawContext, hl: &MolHighlights) {
        let fill = self.fill_polys();
        self.set_fill_polys(self.options.fill_highlights);
        for atom in (0..ctx.at_cds.len()).filter(|a| hl.atoms.contains(a)) {
            let colour = hl
                .atom_colours
                .get(&atom)
                .copied()
                .unwrap_or(self.options.highlight_colour);
            self.set_colour(colour);
            let radius = hl
                .radii
                .get(&atom)
                .copied()
                .unwrap_or(self.options.highlight_radius);
            let offset = DVec2::splat(radius);
            let centre = ctx.at_cds[atom];
            self.draw_ellipse(centre - offset, centre + offset);
        }
        self.set_fill_polys(fill);
    }

    /// Ellipse round an atom, split into equal arcs when it has several
    /// colours. The first arc starts straight down.
    pub(crate) fn draw_highlighted_atom(
        &mut self,
        ctx: &DrawContext,
        atom: usize,
        colours: &[DrawColour],
        radii: &BTreeMap<usize, f64>,
    ) {
        let (centre, xradius, yradius) = self.label_ellipse(ctx, atom, radii);
        let line_width = self.line_width();
        let fill = self.fill_polys();
        if self.options.fill_highlights {
            self.set_fill_polys(true);
        } else {
            self.set_line_width(self.highlight_bond_width(None));
            self.set_fill_polys(false);
        }
        match colours {
            [] => {}
            [colour] => {
                self.set_colour(*colour);
                if self.fill_polys() {
                    self.set_line_width(1.0);
                }
                let offset = DVec2::new(xradius, yradius);
                self.draw_ellipse(centre - offset, centre + offset);
            }
            _ => {
                let arc_size = 360.0 / colours.len() as f64;
                let mut arc_start = -90.0;
                for &colour in colours {
                    self.set_colour(colour);
                    self.draw_arc(centre, xradius, yradius, arc_start, arc_start + arc_size);
                    arc_start += arc_size;
                }
            }
        }
        self.set_fill_polys(fill);
        self.set_line_width(line_width);
    }

    /// Clip `p2` where `p1 -> p2` enters the highlight ellipse of `atom`.
    fn clip_to_highlight(
        &self,
        ctx: &DrawContext,
        atom: usize,
        radii: &BTreeMap<usize, f64>,
        p1: DVec2,
        p2: DVec2,
    ) -> DVec2 {
        let (centre, xradius, yradius) = self.label_ellipse(ctx, atom, radii);
        ellipse_line_intersection(centre, xradius, yradius, p1, p2)
    }

    /// Highlight bands for bonds with one or more colours. Filled bands
    /// are stacked stripes; outline bands are pairs of lines trimmed at
    /// the atom ellipses.
    pub(crate) fn draw_highlighted_bonds(&mut self, ctx: &DrawContext, hl: &MultiColourHighlights) {
        let line_width = self.line_width();
        let rad = BAND_RADIUS_FACTOR * self.options.highlight_radius;
        for (&bond_idx, colours) in &hl.bonds {
            let bond = petgraph::graph::EdgeIndex::new(bond_idx);
            let Some((a1, a2)) = ctx.mol.bond_endpoints(bond) else {
                continue;
            };
            if !self.options.fill_highlights {
                let width = self.highlight_bond_width(hl.line_width_multipliers.get(&bond_idx).copied());
                self.set_line_width(width);
            }
            let at1 = ctx.at_cds[a1.index()];
            let at2 = ctx.at_cds[a2.index()];
            let perp = perpendicular(at1, at2);

            if colours.len() < 2 {
                let colour = colours.first().copied().unwrap_or(self.options.highlight_colour);
                self.set_colour(colour);
                if self.options.fill_highlights {
                    self.draw_polygon(&[
                        at1 + perp * rad,
                        at2 + perp * rad,
                        at2 - perp * rad,
                        at1 - perp * rad,
                    ]);
                } else {
                    self.draw_trimmed_band_line(ctx, (a1, a2), &hl.radii, at1 + perp * rad, at2 + perp * rad);
                    self.draw_trimmed_band_line(ctx, (a1, a2), &hl.radii, at1 - perp * rad, at2 - perp * rad);
                }
            } else {
                let col_rad = 2.0 * rad / colours.len() as f64;
                if self.options.fill_highlights {
                    let mut p1 = at1 - perp * rad;
                    let mut p2 = at2 - perp * rad;
                    for &colour in colours {
                        self.set_colour(colour);
                        self.draw_polygon(&[p1, p1 + perp * col_rad, p2 + perp * col_rad, p2]);
                        p1 += perp * col_rad;
                        p2 += perp * col_rad;
                    }
                } else {
                    // Even stripes fill in from one side, odd from the other.
                    let mut step = 0.0;
                    for (i, &colour) in colours.iter().enumerate() {
                        self.set_colour(colour);
                        let offset = perp * (rad - step * col_rad);
                        if i % 2 == 0 {
                            self.draw_trimmed_band_line(ctx, (a1, a2), &hl.radii, at1 - offset, at2 - offset);
                        } else {
                            self.draw_trimmed_band_line(ctx, (a1, a2), &hl.radii, at1 + offset, at2 + offset);
                            step += 1.0;
                        }
                    }
                }
            }
            self.set_line_width(line_width);
        }
    }

    fn draw_trimmed_band_line(
        &mut self,
        ctx: &DrawContext,
        (a1, a2): (NodeIndex, NodeIndex),
        radii: &BTreeMap<usize, f64>,
        p1: DVec2,
        p2: DVec2,
    ) {
        let p1 = self.clip_to_highlight(ctx, a1.index(), radii, p2, p1);
        let p2 = self.clip_to_highlight(ctx, a2.index(), radii, p1, p2);
        let scale = self.options.scale_highlight_bond_width;
        let old = self.set_scale_line_width(scale);
        self.draw_line(p1, p2);
        self.set_scale_line_width(old);
    }

    /// Red boxes round atoms closer than `flag_close_contacts_dist` device
    /// units to another atom.
    pub(crate) fn flag_close_contacts(&mut self, ctx: &DrawContext) {
        let dist = self.options.flag_close_contacts_dist;
        if dist < 0.0 {
            return;
        }
        let tol = dist * dist;
        let n = ctx.at_cds.len();
        let mut flagged = vec![false; n];
        for i in 0..n {
            if flagged[i] {
                continue;
            }
            let ci = self.to_device(ctx.at_cds[i]);
            for j in i + 1..n {
                if flagged[j] {
                    continue;
                }
                let cj = self.to_device(ctx.at_cds[j]);
                if (cj - ci).length_squared() <= tol {
                    flagged[i] = true;
                    flagged[j] = true;
                    break;
                }
            }
        }
        if !flagged.contains(&true) {
            return;
        }
        let fill = self.fill_polys();
        let colour = self.colour();
        self.set_fill_polys(false);
        self.set_colour(DrawColour::RED);
        let offset = DVec2::splat(0.1);
        for i in (0..n).filter(|&i| flagged[i]) {
            self.draw_rect(ctx.at_cds[i] - offset, ctx.at_cds[i] + offset);
        }
        self.set_colour(colour);
        self.set_fill_polys(fill);
    }
}
