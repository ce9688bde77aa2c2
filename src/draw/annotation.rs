//! Placement of atom, bond and molecule notes and radical dots.
//!
//! Candidates are tried in a fixed order and scored by what they run into.
//! The first clear candidate wins; otherwise the least bad one is kept.
//! Everything here runs at the unit viewport, so device and molecule sizes
//! agree up to the y flip.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec2;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::backend::DrawBackend;
use super::canvas::Canvas;
use super::context::{AnnotationRecord, DrawContext, RadicalMark};
use super::geometry::{double_bond_lines, perpendicular, triple_bond_lines};
use super::options::DrawColour;
use super::text::{
    line_intersects_rects, rect_extremes, rects_intersect, OrientType, StringRect, TextAlign,
    TextLayout,
};
use crate::bond::BondOrder;

const NOTE_RADIUS_STEP: f64 = 0.25;
const NOTE_ANGLE_STEP_DEG: f64 = 30.0;
const BOND_NOTE_FRACTIONS: [f64; 5] = [0.5, 0.33, 0.66, 0.25, 0.75];
/// Radical dot radius as a fraction of the multiple bond offset.
const RADICAL_SPOT: f64 = 0.2;
const MOL_NOTE_REACH: f64 = 0.9;

/// What a candidate note position runs into, worst last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Clash {
    None,
    Bond,
    Label,
    Note,
}

/// `rect` rescaled about `anchor`, for text measured at one font/scale
/// ratio and drawn at another.
pub(crate) fn scaled_rect(rect: &StringRect, anchor: DVec2, factor: f64) -> StringRect {
    StringRect::new(
        anchor + (rect.trans - anchor) * factor,
        rect.width * factor,
        rect.height * factor,
    )
}

/// Direction, as an angle from the x axis, in which to start looking for
/// room around an atom.
pub(crate) fn note_start_angle(ctx: &DrawContext, atom: NodeIndex) -> f64 {
    let at_cds = ctx.at_cds[atom.index()];
    let bond_vecs: Vec<DVec2> = ctx
        .mol
        .neighbors(atom)
        .map(|nbr| (ctx.at_cds[nbr.index()] - at_cds).normalize_or_zero())
        .collect();

    let ret = match bond_vecs.as_slice() {
        [] => return FRAC_PI_2,
        [v] => {
            if ctx.symbol(atom.index()).is_empty() {
                // A note off the end of a bare carbon looks like a label.
                DVec2::new(v.y, -v.x)
            } else {
                -*v
            }
        }
        [v0, v1] => {
            let sum = *v0 + *v1;
            if sum.length_squared() > 1.0e-6 {
                let a = ctx.mol.atom(atom);
                if a.hydrogen_count == 0 || a.atomic_num == 6 {
                    -sum
                } else {
                    sum
                }
            } else {
                DVec2::new(-v0.y, v0.x).normalize_or_zero()
            }
        }
        vecs => {
            let discrim = 4.0 * PI / vecs.len() as f64;
            let close_pair = (0..vecs.len() - 1).find_map(|i| {
                (i + 1..vecs.len())
                    .find(|&j| vecs[i].dot(vecs[j]).clamp(-1.0, 1.0).acos() < discrim)
                    .map(|j| (vecs[i] + vecs[j]).normalize_or_zero())
            });
            close_pair.unwrap_or(-(vecs[0] + vecs[1]))
        }
    };
    ret.y.atan2(ret.x)
}

/// Dot offsets along the mark's long axis.
fn spot_offsets(n: u8, length: f64, r: f64) -> Vec<f64> {
    match n {
        1 => vec![0.0],
        2 => vec![-2.0 * r, 2.0 * r],
        3 => {
            let end = 0.5 * length - r;
            vec![-end, 0.0, end]
        }
        4 => vec![-6.0 * r, -2.0 * r, 2.0 * r, 6.0 * r],
        _ => Vec::new(),
    }
}

impl<B: DrawBackend> Canvas<B> {
    /// Glyph boxes of a note at the annotation font size.
    fn note_rects(&mut self, text: &str, align: TextAlign) -> Vec<StringRect> {
        let full = self.text.font_scale();
        self.text
            .set_font_scale(self.options.annotation_font_scale * full, true);
        let rects = self.text.rects(text, TextLayout::Aligned(align));
        self.text.set_font_scale(full, true);
        rects
    }

    fn sized_record(&self, text: &str, rects: &[StringRect], align: TextAlign) -> AnnotationRecord {
        let (lo, hi) = rect_extremes(rects);
        let s = self.scale();
        AnnotationRecord {
            text: text.to_owned(),
            location: DVec2::ZERO,
            width: (hi.x - lo.x) / s,
            height: (hi.y - lo.y) / s,
            align,
            scale_text: true,
        }
    }

    /// Device box of a placed note, relative to its location.
    fn note_device_rect(&self, note: &AnnotationRecord) -> StringRect {
        let s = self.scale();
        let (w, h) = (note.width * s, note.height * s);
        let dx = match note.align {
            TextAlign::Start => 0.5 * w,
            TextAlign::Middle => 0.0,
            TextAlign::End => -0.5 * w,
        };
        StringRect::new(DVec2::new(dx, 0.0), w, h)
    }

    fn note_clashes_bonds(
        &self,
        ctx: &DrawContext,
        atom: NodeIndex,
        note_pos: DVec2,
        rects: &[StringRect],
    ) -> bool {
        let at_cds = ctx.at_cds[atom.index()];
        let at_dev = self.to_device(at_cds);
        let line_width = self.line_width() * self.scale() * 0.02;
        let mut multi_offset: Option<f64> = None;
        for bond in ctx.mol.bonds_of(atom) {
            let Some(nbr) = ctx.mol.other_atom(bond, atom) else {
                continue;
            };
            let nbr_cds = ctx.at_cds[nbr.index()];
            let nbr_dev = self.to_device(nbr_cds);
            if line_intersects_rects(rects, note_pos, nbr_dev, at_dev, line_width) {
                return true;
            }
            let order = ctx.mol.bond(bond).order;
            if !matches!(order, BondOrder::Double | BondOrder::Aromatic | BondOrder::Triple) {
                continue;
            }
            let offset = *multi_offset.get_or_insert_with(|| {
                // Bonds of about unit length need tighter multiple bonds.
                let mut offset = self.options.multiple_bond_offset;
                if (nbr_dev - at_dev).length_squared() < 1.4 * self.scale() {
                    offset *= 0.6;
                }
                offset
            });
            let (l1, l2) = if order == BondOrder::Triple {
                triple_bond_lines(&ctx.mol, offset, bond, nbr_cds, at_cds)
            } else {
                double_bond_lines(&ctx.mol, &ctx.rings, offset, bond, nbr_cds, at_cds, &ctx.at_cds)
            };
            for (s, f) in [l1, l2] {
                if line_intersects_rects(rects, note_pos, self.to_device(s), self.to_device(f), line_width) {
                    return true;
                }
            }
        }
        false
    }

    fn note_clashes_labels(
        &self,
        ctx: &DrawContext,
        atom: usize,
        note_pos: DVec2,
        rects: &[StringRect],
    ) -> bool {
        let hits = |i: usize| {
            let sym = ctx.symbol(i);
            if sym.is_empty() {
                return false;
            }
            let label = self.text.rects(sym, TextLayout::Label(ctx.orient(i)));
            rects_intersect(rects, note_pos, &label, self.to_device(ctx.at_cds[i]), 0.0)
        };
        // The atom's own label is the likeliest clash.
        hits(atom) || (0..ctx.at_cds.len()).filter(|&i| i != atom).any(hits)
    }

    fn note_clashes_notes(&self, ctx: &DrawContext, note_pos: DVec2, rects: &[StringRect]) -> bool {
        ctx.annotations.iter().filter(|n| n.is_placed()).any(|note| {
            let other = self.note_device_rect(note);
            let origin = self.to_device(note.location);
            rects.iter().any(|r| r.intersects(note_pos, &other, origin, 0.0))
        })
    }

    /// Score a candidate whose device origin is `note_pos`, judged around
    /// `atom`.
    pub(crate) fn atom_note_clash(
        &self,
        ctx: &DrawContext,
        atom: NodeIndex,
        note_pos: DVec2,
        rects: &[StringRect],
    ) -> Clash {
        if self.note_clashes_bonds(ctx, atom, note_pos, rects) {
            Clash::Bond
        } else if self.note_clashes_labels(ctx, atom.index(), note_pos, rects) {
            Clash::Label
        } else if self.note_clashes_notes(ctx, note_pos, rects) {
            Clash::Note
        } else {
            Clash::None
        }
    }

    /// Place a note on a ring of candidates around the atom: three radii,
    /// twelve angles each. The innermost radius is skipped for labelled
    /// atoms.
    pub(crate) fn place_atom_note(
        &mut self,
        ctx: &DrawContext,
        atom: NodeIndex,
        text: &str,
    ) -> AnnotationRecord {
        if text.is_empty() {
            log::warn!("empty note on atom {} not drawn", atom.index());
            return AnnotationRecord::unplaced(text);
        }
        let rects = self.note_rects(text, TextAlign::Middle);
        let mut record = self.sized_record(text, &rects, TextAlign::Middle);
        let at_cds = ctx.at_cds[atom.index()];
        let start = note_start_angle(ctx, atom);
        let labelled = !ctx.symbol(atom.index()).is_empty();

        let mut best: Option<(Clash, DVec2)> = None;
        for j in 1..4 {
            if j == 1 && labelled {
                continue;
            }
            let radius = f64::from(j) * NOTE_RADIUS_STEP;
            for i in 0..12 {
                let ang = start + (f64::from(i) * NOTE_ANGLE_STEP_DEG).to_radians();
                let loc = at_cds + DVec2::new(ang.cos(), ang.sin()) * radius;
                let score = self.atom_note_clash(ctx, atom, self.to_device(loc), &rects);
                if score == Clash::None {
                    record.location = loc;
                    return record;
                }
                if best.map_or(true, |(s, _)| score < s) {
                    best = Some((score, loc));
                }
            }
        }
        if let Some((score, loc)) = best {
            log::debug!("note on atom {} placed with clash {score:?}", atom.index());
            record.location = loc;
        }
        record
    }

    /// Place a note beside a bond: five points along it, each tried at up
    /// to five offsets on both sides.
    pub(crate) fn place_bond_note(
        &mut self,
        ctx: &DrawContext,
        bond: EdgeIndex,
        text: &str,
    ) -> AnnotationRecord {
        let Some((begin, end)) = ctx.mol.bond_endpoints(bond) else {
            return AnnotationRecord::unplaced(text);
        };
        if text.is_empty() {
            log::warn!("empty note on bond {} not drawn", bond.index());
            return AnnotationRecord::unplaced(text);
        }
        let rects = self.note_rects(text, TextAlign::Middle);
        let mut record = self.sized_record(text, &rects, TextAlign::Middle);
        let at1 = ctx.at_cds[begin.index()];
        let at2 = ctx.at_cds[end.index()];
        let perp = perpendicular(at1, at2);
        let bond_vec = at2 - at1;
        let single = ctx.mol.bond(bond).order == BondOrder::Single;

        let mut best: Option<(Clash, DVec2)> = None;
        for frac in BOND_NOTE_FRACTIONS {
            let mid = at1 + bond_vec * frac;
            for j in 1..6 {
                // Multiple bonds need more room.
                if j == 1 && !single {
                    continue;
                }
                let offset = f64::from(j) * self.options.multiple_bond_offset;
                for loc in [mid + perp * offset, mid - perp * offset] {
                    let score = self.atom_note_clash(ctx, begin, self.to_device(loc), &rects);
                    if score == Clash::None {
                        record.location = loc;
                        return record;
                    }
                    if best.map_or(true, |(s, _)| score < s) {
                        best = Some((score, loc));
                    }
                }
            }
        }
        if let Some((_, loc)) = best {
            record.location = loc;
        }
        record
    }

    /// Molecule note: off towards the top right corner of the atoms,
    /// starting there. No clash search.
    pub(crate) fn place_mol_note(&mut self, ctx: &DrawContext, text: &str) -> AnnotationRecord {
        if text.is_empty() || ctx.at_cds.is_empty() {
            return AnnotationRecord::unplaced(text);
        }
        let rects = self.text.rects(text, TextLayout::Aligned(TextAlign::Start));
        let s = self.scale();
        let width = rects.iter().map(|r| r.width).sum::<f64>() / s;
        let height = rects.iter().map(|r| r.height).fold(0.0, f64::max) / s;
        let centroid = ctx.at_cds.iter().copied().sum::<DVec2>() / ctx.at_cds.len() as f64;
        let max = ctx
            .at_cds
            .iter()
            .copied()
            .fold(DVec2::splat(f64::MIN), DVec2::max);
        AnnotationRecord {
            text: text.to_owned(),
            location: centroid + (max - centroid) * MOL_NOTE_REACH,
            width,
            height,
            align: TextAlign::Start,
            scale_text: false,
        }
    }

    /// A note whose position is already known: bracket and link-node
    /// labels, data fields with an explicit position.
    pub(crate) fn fixed_note(&mut self, text: &str, location: DVec2, align: TextAlign) -> AnnotationRecord {
        let rects = self.note_rects(text, align);
        let mut record = self.sized_record(text, &rects, align);
        record.location = location;
        record
    }

    /// Where an atom's radical dots go. The label's own side is tried
    /// first, then N, E, S and W; if everything clashes the dots go north.
    pub(crate) fn radical_mark(&self, ctx: &DrawContext, atom: NodeIndex) -> RadicalMark {
        let n = ctx.mol.atom(atom).radical_electrons;
        let spot = RADICAL_SPOT * self.options.multiple_bond_offset * self.text.font_scale();
        let at_dev = self.to_device(ctx.at_cds[atom.index()]);
        let sym = ctx.symbol(atom.index());
        let orient = ctx.orient(atom.index());
        let label = self.text.rects(sym, TextLayout::Label(orient));
        let (lo, hi) = if sym.is_empty() {
            (at_dev - DVec2::splat(3.0 * spot), at_dev + DVec2::splat(3.0 * spot))
        } else {
            let (lo, hi) = rect_extremes(&label);
            (at_dev + lo, at_dev + hi)
        };
        let long = (4.0 * f64::from(n) - 2.0) * spot;

        let candidate = |o: OrientType| -> StringRect {
            match o {
                OrientType::N | OrientType::C => {
                    StringRect::new(DVec2::new(at_dev.x, lo.y - 1.5 * spot), long, 3.0 * spot)
                }
                OrientType::S => {
                    StringRect::new(DVec2::new(at_dev.x, hi.y + 1.5 * spot), long, 3.0 * spot)
                }
                OrientType::E => {
                    StringRect::new(DVec2::new(hi.x + 3.0 * spot, at_dev.y), 1.5 * spot, long)
                }
                OrientType::W => {
                    StringRect::new(DVec2::new(lo.x - 3.0 * spot, at_dev.y), 1.5 * spot, long)
                }
            }
        };
        let fits = |rect: &StringRect| {
            let local = [StringRect::new(DVec2::ZERO, rect.width, rect.height)];
            !rects_intersect(&local, rect.trans, &label, at_dev, 0.0)
                && self.atom_note_clash(ctx, atom, rect.trans, &local) == Clash::None
        };

        let first = if orient == OrientType::C { OrientType::N } else { orient };
        let order = [OrientType::N, OrientType::E, OrientType::S, OrientType::W];
        let chosen = std::iter::once(first)
            .chain(order.into_iter().filter(|&o| o != first))
            .map(|o| (o, candidate(o)))
            .find(|(_, rect)| fits(rect))
            .unwrap_or_else(|| (OrientType::N, candidate(OrientType::N)));

        let s = self.scale();
        RadicalMark {
            atom: atom.index(),
            rect: StringRect::new(
                self.to_molecule(chosen.1.trans),
                chosen.1.width / s,
                chosen.1.height / s,
            ),
            orient: chosen.0,
        }
    }

    fn draw_spot(&mut self, centre: DVec2, radius: f64) {
        let fill = self.fill_polys();
        let line_width = self.line_width();
        self.set_fill_polys(true);
        self.set_line_width(0.0);
        self.draw_arc(centre, radius, radius, 0.0, 360.0);
        self.set_line_width(line_width);
        self.set_fill_polys(fill);
    }

    pub(crate) fn draw_radicals(&mut self, ctx: &DrawContext) {
        let factor = self.font_factor();
        let r = RADICAL_SPOT * self.options.multiple_bond_offset * factor;
        self.set_colour(DrawColour::BLACK);
        for mark in &ctx.radicals {
            let n = ctx.mol.atom(NodeIndex::new(mark.atom)).radical_electrons;
            let rect = scaled_rect(&mark.rect, ctx.at_cds[mark.atom], factor);
            let (axis, length) = match mark.orient {
                OrientType::N | OrientType::S | OrientType::C => (DVec2::X, rect.width),
                OrientType::E | OrientType::W => (DVec2::Y, rect.height),
            };
            for offset in spot_offsets(n, length, r) {
                self.draw_spot(rect.trans + axis * offset, r);
            }
        }
    }

    pub(crate) fn draw_annotation(&mut self, note: &AnnotationRecord) {
        if !note.is_placed() {
            return;
        }
        let full = self.text.font_scale();
        let colour = self.text.colour();
        if note.scale_text {
            // Notes stay smaller than labels even below the minimum font.
            self.text
                .set_font_scale(self.options.annotation_font_scale * full, true);
        }
        self.text.set_colour(self.options.annotation_colour);
        self.draw_string(&note.text, note.location, TextLayout::Aligned(note.align));
        self.text.set_colour(colour);
        self.text.set_font_scale(full, true);
    }
}
