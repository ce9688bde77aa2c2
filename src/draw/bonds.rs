//! Bond Style Renderer.
//!
//! Each bond is dispatched on its query, order and direction to a stroke
//! pattern. All points are in molecule space; the canvas converts them.

use std::f64::consts::FRAC_PI_6;

use glam::DVec2;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::backend::DrawBackend;
use super::canvas::Canvas;
use super::context::DrawContext;
use super::geometry::{double_bond_lines, perpendicular, rotate, triple_bond_lines, Segment};
use super::options::DrawColour;
use super::shapes::{WAVY_OFFSET, WAVY_SEGMENTS};
use crate::bond::{BondDirection, BondOrder, BondQuery};

const DASHES: [f64; 2] = [6.0, 6.0];
const SHORT_DASHES: [f64; 2] = [2.0, 2.0];
const DOTS: [f64; 2] = [2.0, 6.0];

const HYDROGEN_BOND_COLOUR: DrawColour = DrawColour::new(0.2, 0.2, 0.2);
const QUERY_COLOUR: DrawColour = DrawColour::new(0.5, 0.5, 0.5);

/// Bonds shorter than this (squared, molecule units) get narrower multiple
/// bonds.
const SHORT_BOND_LEN_SQ: f64 = 1.4;
const SHORT_BOND_OFFSET_FACTOR: f64 = 0.6;

/// Half-width of a wedge's wide end, in molecule units.
const WEDGE_HALF_WIDTH: f64 = 0.15;

/// Colours for the two halves of a bond and whether it is highlighted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BondPaint {
    pub col1: DrawColour,
    pub col2: DrawColour,
    pub highlight: bool,
}

/// Bond atoms with their label-trimmed end points.
#[derive(Debug, Clone, Copy)]
struct BondEnds {
    begin: NodeIndex,
    end: NodeIndex,
    cds1: DVec2,
    cds2: DVec2,
}

/// Number of hashes in a dashed wedge of squared length `len_sq` drawn at
/// `scale`.
fn wedge_dash_count(scale: f64, len_sq: f64) -> usize {
    let factor = scale * len_sq;
    if factor < 20.0 {
        3
    } else if factor < 30.0 {
        4
    } else if factor < 45.0 {
        5
    } else {
        6
    }
}

/// Short dashes shrunk for small drawings.
fn query_dashes(scale: f64) -> [f64; 2] {
    let [a, b] = SHORT_DASHES;
    if scale < 10.0 {
        [a / 4.0, b / 3.0]
    } else if scale < 20.0 {
        [a / 2.0, b / 1.5]
    } else {
        [a, b]
    }
}

impl<B: DrawBackend> Canvas<B> {
    /// Where a bond to a labelled atom at `cds` should stop, coming from
    /// `nbr_cds`.
    pub(crate) fn adjust_bond_end_for_label(
        &self,
        ctx: &DrawContext,
        atom: usize,
        nbr_cds: DVec2,
        cds: DVec2,
    ) -> DVec2 {
        let sym = ctx.symbol(atom);
        if sym.is_empty() {
            return cds;
        }
        let dev = self.text.adjust_line_for_string(
            sym,
            ctx.orient(atom),
            self.to_device(nbr_cds),
            self.to_device(cds),
        );
        let mut cds = self.to_molecule(dev);
        let pad = self.options.additional_atom_label_padding;
        if pad > 0.0 {
            cds += (nbr_cds - cds).normalize_or_zero() * pad;
        }
        cds
    }

    pub(crate) fn draw_bonds(&mut self, ctx: &DrawContext, paint: &[BondPaint]) {
        for (bond, &p) in ctx.mol.bonds().zip(paint) {
            self.draw_bond(ctx, bond, p);
        }
    }

    pub(crate) fn draw_bond(&mut self, ctx: &DrawContext, bond: EdgeIndex, paint: BondPaint) {
        let Some((begin, end)) = ctx.mol.bond_endpoints(bond) else {
            return;
        };
        let at1 = ctx.at_cds[begin.index()];
        let at2 = ctx.at_cds[end.index()];
        let len_sq = (at1 - at2).length_squared();
        if len_sq < 1.0e-12 {
            log::debug!("skipping zero-length bond {}", bond.index());
            return;
        }
        let mut offset = self.options.multiple_bond_offset;
        if len_sq < SHORT_BOND_LEN_SQ {
            offset *= SHORT_BOND_OFFSET_FACTOR;
        }
        let cds1 = self.adjust_bond_end_for_label(ctx, begin.index(), at2, at1);
        let cds2 = self.adjust_bond_end_for_label(ctx, end.index(), cds1, at2);
        let ends = BondEnds {
            begin,
            end,
            cds1,
            cds2,
        };

        let line_width = self.line_width();
        if paint.highlight {
            let width = self.highlight_bond_width(None);
            if self.options.continuous_highlight {
                self.set_line_width(width);
            } else {
                self.set_line_width(width / 4.0);
            }
        }

        let b = ctx.mol.bond(bond);
        match &b.query {
            Some(query) if b.has_complex_query() => {
                self.draw_query_bond(ctx, bond, query, &ends, paint.highlight, offset)
            }
            _ => self.draw_normal_bond(ctx, bond, &ends, paint, offset),
        }
        self.set_line_width(line_width);
    }

    /// Switch to the highlight line-width scaling; the old setting is
    /// returned for [`Self::end_highlight_scaling`].
    fn begin_highlight_scaling(&mut self, highlight: bool) -> Option<bool> {
        if !highlight {
            return None;
        }
        let scale = self.options.scale_highlight_bond_width;
        Some(self.set_scale_line_width(scale))
    }

    fn end_highlight_scaling(&mut self, old: Option<bool>) {
        if let Some(old) = old {
            self.set_scale_line_width(old);
        }
    }

    /// One stroke of a bond. Whole bonds are tagged with both atoms; in
    /// split mode each half is tagged with its own atom.
    fn draw_bond_line(&mut self, ends: &BondEnds, line: Segment, col1: DrawColour, col2: DrawColour) {
        let (p1, p2) = line;
        if self.options.split_bonds {
            let mid = (p1 + p2) * 0.5;
            self.set_active_atoms(Some(ends.begin), None);
            self.set_colour(col1);
            self.draw_line(p1, mid);
            self.set_active_atoms(Some(ends.end), None);
            self.set_colour(col2);
            self.draw_line(mid, p2);
        } else {
            self.set_active_atoms(Some(ends.begin), Some(ends.end));
            self.draw_line_coloured(p1, p2, col1, col2);
        }
        self.clear_active_atoms();
    }

    fn draw_normal_bond(
        &mut self,
        ctx: &DrawContext,
        bond: EdgeIndex,
        ends: &BondEnds,
        paint: BondPaint,
        offset: f64,
    ) {
        let BondPaint {
            col1,
            col2,
            highlight,
        } = paint;
        let b = ctx.mol.bond(bond);
        match (b.order, b.direction) {
            (BondOrder::Double | BondOrder::Aromatic, _) => {
                let (l1, l2) = double_bond_lines(
                    &ctx.mol,
                    &ctx.rings,
                    offset,
                    bond,
                    ends.cds1,
                    ends.cds2,
                    &ctx.at_cds,
                );
                let old = self.begin_highlight_scaling(highlight);
                self.draw_bond_line(ends, l1, col1, col2);
                if b.order == BondOrder::Aromatic {
                    self.set_dash(&DASHES);
                }
                self.draw_bond_line(ends, l2, col1, col2);
                self.clear_dash();
                self.end_highlight_scaling(old);
            }
            (BondOrder::Single, BondDirection::BeginWedge | BondDirection::BeginDash) => {
                // Highlighted wedges keep their normal width.
                let dashed = b.direction == BondDirection::BeginDash;
                self.draw_wedge(ctx, ends, dashed, col1, col2);
            }
            (BondOrder::Single, BondDirection::Unknown) => {
                self.set_active_atoms(Some(ends.begin), Some(ends.end));
                self.draw_wavy_line(ends.cds1, ends.cds2, col1, WAVY_SEGMENTS, WAVY_OFFSET);
                self.clear_active_atoms();
            }
            (BondOrder::Dative, _) => self.draw_dative(ends, col1, col2),
            (BondOrder::Zero, _) => {
                self.set_dash(&SHORT_DASHES);
                let old = self.begin_highlight_scaling(highlight);
                self.draw_bond_line(ends, (ends.cds1, ends.cds2), col1, col2);
                self.end_highlight_scaling(old);
                self.clear_dash();
            }
            (BondOrder::Hydrogen, _) => {
                self.set_dash(&DOTS);
                let old = self.begin_highlight_scaling(highlight);
                self.draw_bond_line(
                    ends,
                    (ends.cds1, ends.cds2),
                    HYDROGEN_BOND_COLOUR,
                    HYDROGEN_BOND_COLOUR,
                );
                self.end_highlight_scaling(old);
                self.clear_dash();
            }
            _ => {
                let old = self.begin_highlight_scaling(highlight);
                self.draw_bond_line(ends, (ends.cds1, ends.cds2), col1, col2);
                if b.order == BondOrder::Triple {
                    let (l1, l2) = triple_bond_lines(&ctx.mol, offset, bond, ends.cds1, ends.cds2);
                    self.draw_bond_line(ends, l1, col1, col2);
                    self.draw_bond_line(ends, l2, col1, col2);
                }
                self.end_highlight_scaling(old);
            }
        }
    }

    /// Solid or hashed wedge with its wide end on the stereocentre. The
    /// begin atom is the stereocentre unless only the end atom has a
    /// tetrahedral parity.
    fn draw_wedge(
        &mut self,
        ctx: &DrawContext,
        ends: &BondEnds,
        dashed: bool,
        col1: DrawColour,
        col2: DrawColour,
    ) {
        let begin_chiral = ctx.mol.atom(ends.begin).chirality.is_tetrahedral();
        let end_chiral = ctx.mol.atom(ends.end).chirality.is_tetrahedral();
        let stereo_at_end = !begin_chiral && end_chiral;
        let (narrow, wide, narrow_cds, wide_cds, mut narrow_col, mut wide_col) = if stereo_at_end {
            (ends.begin, ends.end, ends.cds1, ends.cds2, col1, col2)
        } else {
            (ends.end, ends.begin, ends.cds2, ends.cds1, col2, col1)
        };
        if self.options.single_colour_wedge_bonds {
            narrow_col = self.options.symbol_colour;
            wide_col = self.options.symbol_colour;
        }
        let split = self.options.split_bonds;
        if !split {
            self.set_active_atoms(Some(wide), Some(narrow));
        }

        let mut disp = perpendicular(narrow_cds, wide_cds) * WEDGE_HALF_WIDTH;
        if self.scale() > 40.0 {
            disp *= 0.6;
        }
        let end1 = wide_cds + disp;
        let end2 = wide_cds - disp;
        let e1 = end1 - narrow_cds;
        let e2 = end2 - narrow_cds;

        let fill = self.fill_polys();
        self.set_colour(narrow_col);
        if split {
            self.set_active_atoms(Some(narrow), None);
        }
        if dashed {
            self.set_fill_polys(false);
            let n = wedge_dash_count(self.scale(), (narrow_cds - wide_cds).length_squared());
            let line_width = self.line_width();
            self.set_line_width(1.0);
            for i in 1..=n {
                if i == n / 2 + 1 {
                    self.set_colour(wide_col);
                    if split {
                        self.set_active_atoms(Some(wide), None);
                    }
                }
                let t = i as f64 / n as f64;
                self.draw_line(narrow_cds + e1 * t, narrow_cds + e2 * t);
            }
            self.set_line_width(line_width);
        } else {
            self.set_fill_polys(true);
            if narrow_col == wide_col && !split {
                self.draw_triangle(narrow_cds, end1, end2);
            } else {
                let mid1 = narrow_cds + e1 * 0.5;
                let mid2 = narrow_cds + e2 * 0.5;
                self.draw_triangle(narrow_cds, mid1, mid2);
                if split {
                    self.set_active_atoms(Some(wide), None);
                }
                self.set_colour(wide_col);
                self.draw_triangle(mid1, end2, end1);
                self.draw_triangle(mid1, mid2, end2);
            }
        }
        self.set_fill_polys(fill);
        self.clear_active_atoms();
    }

    /// Line to the midpoint, then an arrow onto the acceptor stopping a
    /// little short of it.
    fn draw_dative(&mut self, ends: &BondEnds, col1: DrawColour, col2: DrawColour) {
        let split = self.options.split_bonds;
        if split {
            self.set_active_atoms(Some(ends.begin), None);
        } else {
            self.set_active_atoms(Some(ends.begin), Some(ends.end));
        }
        let mid = (ends.cds1 + ends.cds2) * 0.5;
        self.set_colour(col1);
        self.draw_line(ends.cds1, mid);
        if split {
            self.set_active_atoms(Some(ends.end), None);
        }
        self.set_colour(col2);
        let frac = 0.2;
        let tip = ends.cds2 + (mid - ends.cds2) * frac;
        self.draw_arrow(mid, tip, true, frac, FRAC_PI_6);
        self.clear_active_atoms();
    }

    /// Double-bond strokes over `from -> to`, the second one dashed if
    /// `dash` is given.
    fn draw_query_double(
        &mut self,
        ctx: &DrawContext,
        bond: EdgeIndex,
        offset: f64,
        from: DVec2,
        to: DVec2,
        dash: Option<&[f64]>,
    ) {
        let ((l1s, l1f), (l2s, l2f)) =
            double_bond_lines(&ctx.mol, &ctx.rings, offset, bond, from, to, &ctx.at_cds);
        self.draw_line(l1s, l1f);
        if let Some(dash) = dash {
            self.set_dash(dash);
        }
        self.draw_line(l2s, l2f);
        self.clear_dash();
    }

    fn draw_query_bond(
        &mut self,
        ctx: &DrawContext,
        bond: EdgeIndex,
        query: &BondQuery,
        ends: &BondEnds,
        highlight: bool,
        offset: f64,
    ) {
        let split = self.options.split_bonds;
        if !split {
            self.set_active_atoms(Some(ends.begin), Some(ends.end));
        }
        let (cds1, cds2) = (ends.cds1, ends.cds2);
        let midp = (cds1 + cds2) * 0.5;
        let tdash = query_dashes(self.scale());
        self.set_colour(QUERY_COLOUR);

        match query {
            BondQuery::SingleOrDouble | BondQuery::SingleOrAromatic => {
                if split {
                    self.set_active_atoms(Some(ends.begin), None);
                }
                self.draw_line(cds1, midp);
                if split {
                    self.set_active_atoms(Some(ends.end), None);
                }
                let dash = matches!(query, BondQuery::SingleOrAromatic).then_some(&tdash[..]);
                self.draw_query_double(ctx, bond, offset, midp, cds2, dash);
            }
            BondQuery::DoubleOrAromatic => {
                if split {
                    self.set_active_atoms(Some(ends.begin), None);
                }
                self.draw_query_double(ctx, bond, offset, cds1, midp, None);
                if split {
                    self.set_active_atoms(Some(ends.end), None);
                }
                self.draw_query_double(ctx, bond, offset, midp, cds2, Some(&tdash[..]));
            }
            BondQuery::Any => {
                self.set_dash(&tdash);
                self.draw_bond_line(ends, (cds1, cds2), QUERY_COLOUR, QUERY_COLOUR);
                self.clear_dash();
            }
            BondQuery::OrderAndRing { in_ring } => {
                let paint = BondPaint {
                    col1: QUERY_COLOUR,
                    col2: QUERY_COLOUR,
                    highlight: false,
                };
                self.draw_normal_bond(ctx, bond, ends, paint, offset);
                self.draw_ring_marker(cds1, cds2, *in_ring);
            }
            BondQuery::Order { .. } | BondQuery::Unrecognized(_) => {
                self.set_dash(&DOTS);
                let old = self.begin_highlight_scaling(highlight);
                self.draw_bond_line(ends, (cds1, cds2), QUERY_COLOUR, QUERY_COLOUR);
                self.end_highlight_scaling(old);
                self.clear_dash();
            }
        }
        self.clear_active_atoms();
    }

    /// Hexagon at the bond midpoint for "in a ring", two small circles for
    /// "not in a ring". Always thin and unfilled.
    fn draw_ring_marker(&mut self, cds1: DVec2, cds2: DVec2, in_ring: bool) {
        let midp = (cds1 + cds2) * 0.5;
        let segment = cds2 - cds1;
        let len = segment.length();
        let fill = self.fill_polys();
        self.set_fill_polys(false);
        let scale_lw = self.set_scale_line_width(false);
        let line_width = self.line_width();
        self.set_line_width(1.0);
        self.clear_active_atoms();
        if in_ring {
            let seg = segment / (len * 6.0);
            let r1 = rotate(seg, std::f64::consts::FRAC_PI_3);
            let r2 = rotate(r1, std::f64::consts::FRAC_PI_3);
            let pts = [
                midp + seg,
                midp + r1,
                midp + r2,
                midp - seg,
                midp - r1,
                midp - r2,
                midp + seg,
            ];
            self.draw_polygon(&pts);
        } else {
            let seg = segment / (len * 10.0);
            let l = DVec2::splat(seg.length());
            self.draw_ellipse(midp + seg + l, midp + seg - l);
            self.draw_ellipse(midp - seg + l, midp - seg - l);
        }
        self.set_line_width(line_width);
        self.set_scale_line_width(scale_lw);
        self.set_fill_polys(fill);
    }
}
