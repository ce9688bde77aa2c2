//! Working copy of a molecule and the drawables extracted from it.
//!
//! Extraction runs at the unit viewport with a font scale of one, so that
//! note and radical sizes come out in molecule units. The scale is fitted
//! afterwards from what was extracted.

use std::collections::BTreeMap;

use glam::DVec2;
use petgraph::graph::{EdgeIndex, NodeIndex};

use super::backend::DrawBackend;
use super::canvas::Canvas;
use super::context::{AtomSymbol, DrawContext, DrawShape, ShapeKind};
use super::geometry::{rotate, Segment};
use super::labels::{atom_orientation, atom_symbol};
use super::scale::FitRequest;
use super::shapes::bracket_points;
use super::text::{OrientType, TextAlign};
use crate::error::DrawError;
use crate::sgroup::{StereoGroupKind, SubstanceGroup, SubstanceGroupKind};
use crate::Molecule;

const LINK_CROSSING_FRAC: f64 = 0.333;
const LINK_LENGTH_FRAC: f64 = 0.333;

fn append_note(note: &mut Option<String>, text: &str) {
    *note = Some(match note.take() {
        Some(n) if !n.is_empty() => format!("{n},{text}"),
        _ => text.to_owned(),
    });
}

/// Translate conformer `conf_id` so that its atoms are centred on the
/// origin.
pub(crate) fn centre_conformer(mol: &mut Molecule, conf_id: Option<usize>) {
    let Some(conf) = mol.conformer_mut(conf_id) else {
        return;
    };
    if conf.is_empty() {
        return;
    }
    let n = conf.len() as f64;
    let (sx, sy) = conf
        .positions()
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p[0], y + p[1]));
    let (cx, cy) = (sx / n, sy / n);
    let moved: Vec<[f64; 3]> = conf
        .positions()
        .iter()
        .map(|p| [p[0] - cx, p[1] - cy, p[2]])
        .collect();
    for (i, p) in moved.into_iter().enumerate() {
        conf.set_position(NodeIndex::new(i), p);
    }
}

/// A lone OR/AND group holding every stereocentre becomes a molecule
/// note, and its atoms lose their CIP labels.
fn simplify_stereo_groups(mol: &mut Molecule) {
    if mol.note().is_some() {
        return;
    }
    let [group] = mol.stereo_groups() else {
        return;
    };
    let group = group.clone();
    let all_in_group = mol
        .atoms()
        .filter(|&a| mol.atom(a).chirality.is_tetrahedral())
        .all(|a| group.atoms.contains(&a));
    if !all_in_group {
        return;
    }
    let label = match group.kind {
        StereoGroupKind::Or => Some("OR enantiomer"),
        StereoGroupKind::And => Some("AND enantiomer"),
        StereoGroupKind::Absolute => None,
    };
    if let Some(label) = label {
        mol.set_stereo_groups(Vec::new());
        mol.set_note(Some(label.to_owned()));
    }
    for &atom in &group.atoms {
        if atom.index() < mol.atom_count() {
            mol.atom_mut(atom).cip_code = None;
        }
    }
}

/// Bonds crossing a group boundary, inner atom first.
fn group_bond_segments(mol: &Molecule, sg: &SubstanceGroup, at_cds: &[DVec2]) -> Vec<Segment> {
    sg.bonds
        .iter()
        .filter_map(|&b| mol.bond_endpoints(b))
        .filter_map(|(begin, end)| {
            if sg.atoms.contains(&begin) {
                Some((at_cds[begin.index()], at_cds[end.index()]))
            } else if sg.atoms.contains(&end) {
                Some((at_cds[end.index()], at_cds[begin.index()]))
            } else {
                None
            }
        })
        .collect()
}

impl<B: DrawBackend> Canvas<B> {
    /// Owned copy of `mol` with the preparation options applied. The
    /// caller's molecule is never modified.
    pub(crate) fn prepare_copy(&self, mol: &Molecule, conf_id: Option<usize>) -> Molecule {
        let mut copy = mol.clone();
        if self.options.centre_molecules_before_drawing {
            centre_conformer(&mut copy, conf_id);
        }
        if self.options.simplified_stereo_group_label {
            simplify_stereo_groups(&mut copy);
        }
        if self.options.add_stereo_annotation {
            for atom in mol.atoms() {
                if let Some(cip) = copy.atom(atom).cip_code.clone() {
                    copy.atom_mut(atom).note = Some(format!("({cip})"));
                }
            }
        }
        if self.options.add_atom_indices {
            for atom in mol.atoms() {
                append_note(&mut copy.atom_mut(atom).note, &atom.index().to_string());
            }
        }
        if self.options.add_bond_indices {
            for bond in mol.bonds() {
                append_note(&mut copy.bond_mut(bond).note, &bond.index().to_string());
            }
        }
        copy
    }

    /// Prepare `mol` and extract its drawables into a new context. `None`
    /// means there are no coordinates to draw. With `fit` set and a scale
    /// still to be found, the viewport is fitted to the result.
    pub(crate) fn setup_molecule(
        &mut self,
        mol: &Molecule,
        conf_id: Option<usize>,
        highlight_atoms: &[usize],
        radii: &BTreeMap<usize, f64>,
        fit: bool,
    ) -> Result<Option<DrawContext>, DrawError> {
        let copy = self.prepare_copy(mol, conf_id);
        if copy.conformer(conf_id).is_none() {
            log::warn!("molecule has no coordinates, nothing drawn");
            return Ok(None);
        }
        // Comic jitter restarts for every molecule.
        self.reseed();
        if !self.background_cleared {
            self.clear_drawing();
        }

        let vp = self.vp;
        let font_scale = self.text.font_scale();
        self.vp = vp.unit();
        self.text.set_font_scale(1.0, true);
        let extracted = self.extract_drawables(copy, conf_id);
        self.vp = vp;
        self.text.set_font_scale(font_scale, true);
        let ctx = extracted?;

        if fit && self.needs_scale {
            self.calculate_scale(&FitRequest {
                ctx: &ctx,
                highlight_atoms,
                radii,
            });
        }
        Ok(Some(ctx))
    }

    pub(crate) fn extract_drawables(
        &mut self,
        mol: Molecule,
        conf_id: Option<usize>,
    ) -> Result<DrawContext, DrawError> {
        let mut ctx = DrawContext::new(mol, conf_id);
        self.extract_atom_coords(&mut ctx);
        self.extract_atom_symbols(&mut ctx);
        self.extract_atom_notes(&mut ctx);
        self.extract_bond_notes(&mut ctx);
        self.extract_radicals(&mut ctx);
        self.extract_sgroup_data(&mut ctx);
        self.extract_variable_bonds(&mut ctx)?;
        self.extract_brackets(&mut ctx);
        self.extract_mol_notes(&mut ctx);
        self.extract_link_nodes(&mut ctx)?;
        log::debug!(
            "extracted {} atoms, {} notes, {} shapes",
            ctx.at_cds.len(),
            ctx.annotations.len(),
            ctx.pre_shapes.len() + ctx.post_shapes.len()
        );
        Ok(ctx)
    }

    /// Clockwise rotation from the options, in radians for [`rotate`].
    fn rotation(&self) -> f64 {
        -self.options.rotate.to_radians()
    }

    fn extract_atom_coords(&self, ctx: &mut DrawContext) {
        let rot = self.rotation();
        let positions: Vec<DVec2> = ctx
            .mol
            .conformer(ctx.conf_id)
            .map(|c| c.positions().iter().map(|p| DVec2::new(p[0], p[1])).collect())
            .unwrap_or_default();
        ctx.at_cds = ctx
            .mol
            .atoms()
            .map(|a| {
                let p = positions.get(a.index()).copied().unwrap_or(DVec2::ZERO);
                if rot != 0.0 {
                    rotate(p, rot)
                } else {
                    p
                }
            })
            .collect();
    }

    fn extract_atom_symbols(&self, ctx: &mut DrawContext) {
        let mut syms = Vec::with_capacity(ctx.at_cds.len());
        let mut nums = Vec::with_capacity(ctx.at_cds.len());
        for atom in ctx.mol.atoms() {
            let orient = atom_orientation(&ctx.mol, atom, &ctx.at_cds);
            let text = atom_symbol(&ctx.mol, atom, orient, &ctx.at_cds, &self.options);
            syms.push(AtomSymbol { text, orient });
            let a = ctx.mol.atom(atom);
            nums.push(if a.is_complex_query() {
                0
            } else {
                i32::from(a.atomic_num)
            });
        }
        ctx.atom_syms = syms;
        ctx.atomic_nums = nums;
    }

    fn extract_atom_notes(&mut self, ctx: &mut DrawContext) {
        let notes: Vec<(NodeIndex, String)> = ctx
            .mol
            .atoms()
            .filter_map(|a| ctx.mol.atom(a).note.clone().map(|n| (a, n)))
            .filter(|(_, n)| !n.is_empty())
            .collect();
        for (atom, note) in notes {
            let record = self.place_atom_note(ctx, atom, &note);
            if record.is_placed() {
                ctx.annotations.push(record);
            } else {
                log::warn!("no room for note {note:?} on atom {}", atom.index());
            }
        }
    }

    fn extract_bond_notes(&mut self, ctx: &mut DrawContext) {
        let notes: Vec<(EdgeIndex, String)> = ctx
            .mol
            .bonds()
            .filter_map(|b| ctx.mol.bond(b).note.clone().map(|n| (b, n)))
            .filter(|(_, n)| !n.is_empty())
            .collect();
        for (bond, note) in notes {
            let record = self.place_bond_note(ctx, bond, &note);
            if record.is_placed() {
                ctx.annotations.push(record);
            } else {
                log::warn!("no room for note {note:?} on bond {}", bond.index());
            }
        }
    }

    fn extract_radicals(&self, ctx: &mut DrawContext) {
        let marks: Vec<_> = ctx
            .mol
            .atoms()
            .filter(|&a| ctx.mol.atom(a).radical_electrons > 0)
            .map(|a| self.radical_mark(ctx, a))
            .collect();
        ctx.radicals = marks;
    }

    /// Data groups become notes: at their field position when one is
    /// given, otherwise placed like an atom note on the first atom.
    fn extract_sgroup_data(&mut self, ctx: &mut DrawContext) {
        if !self.backend.supports_annotations() {
            return;
        }
        let rot = self.rotation();
        let groups: Vec<SubstanceGroup> = ctx
            .mol
            .substance_groups()
            .iter()
            .filter(|sg| sg.kind == SubstanceGroupKind::Data)
            .cloned()
            .collect();
        for sg in groups {
            let text = sg.data_fields.join("|");
            if text.is_empty() {
                continue;
            }
            let atom = sg.atoms.first().copied().filter(|a| a.index() < ctx.at_cds.len());
            let mut located = None;
            let mut text = Some(text);
            if let Some(fd) = sg.field_display {
                let offset = rotate(DVec2::from(fd.offset), rot);
                if fd.relative {
                    match atom {
                        None => text = None,
                        Some(a) if fd.offset[0].abs() > 1e-3 || fd.offset[1].abs() > 1e-3 => {
                            located = Some(ctx.at_cds[a.index()] + offset);
                        }
                        Some(_) => {}
                    }
                } else {
                    let centroid = ctx.mol.centroid().map_or(DVec2::ZERO, |c| {
                        rotate(DVec2::from(c), rot)
                    });
                    located = Some(centroid + offset);
                }
            }
            let Some(text) = text else {
                log::warn!("data group with a relative position but no atoms is not drawn");
                continue;
            };
            let record = match (located, atom) {
                (Some(loc), _) => self.fixed_note(&text, loc, TextAlign::Start),
                (None, Some(a)) => self.place_atom_note(ctx, a, &text),
                (None, None) => {
                    log::warn!("data group {text:?} has no position and no atoms");
                    continue;
                }
            };
            ctx.annotations.push(record);
        }
    }

    /// Variable attachment bonds: a blob on every possible end atom and a
    /// wide band along bonds between them.
    fn extract_variable_bonds(&self, ctx: &mut DrawContext) -> Result<(), DrawError> {
        let n = ctx.at_cds.len();
        let colour = self.options.variable_attachment_colour;
        let radius = DVec2::splat(self.options.variable_atom_radius);
        for bond in ctx.mol.bonds() {
            let Some(attachment) = &ctx.mol.bond(bond).attachment else {
                continue;
            };
            let mut involved = vec![false; n];
            for &oat in &attachment.end_points {
                if oat >= n {
                    return Err(DrawError::InvalidInput(format!(
                        "variable attachment point {oat} of bond {} is not an atom",
                        bond.index()
                    )));
                }
                involved[oat] = true;
                let centre = ctx.at_cds[oat];
                ctx.pre_shapes.push(DrawShape {
                    kind: ShapeKind::Ellipse,
                    points: vec![centre + radius, centre - radius],
                    line_width: 1.0,
                    colour,
                    fill: true,
                    scale_line_width: false,
                });
            }
            for other in ctx.mol.bonds() {
                let Some((a1, a2)) = ctx.mol.bond_endpoints(other) else {
                    continue;
                };
                if involved[a1.index()] && involved[a2.index()] {
                    ctx.pre_shapes.push(DrawShape {
                        kind: ShapeKind::Polyline,
                        points: vec![ctx.at_cds[a1.index()], ctx.at_cds[a2.index()]],
                        line_width: self.line_width()
                            * f64::from(self.options.variable_bond_width_multiplier),
                        colour,
                        fill: false,
                        scale_line_width: true,
                    });
                }
            }
            if let Some((begin, _)) = ctx.mol.bond_endpoints(bond) {
                if ctx.mol.atom(begin).atomic_num == 0 {
                    ctx.atom_syms[begin.index()] = AtomSymbol {
                        text: String::new(),
                        orient: OrientType::C,
                    };
                }
            }
        }
        Ok(())
    }

    /// Brackets of substance groups, with CONNECT text at the top of the
    /// last bracket and LABEL text at its bottom.
    fn extract_brackets(&mut self, ctx: &mut DrawContext) {
        let rot = self.rotation();
        let groups: Vec<SubstanceGroup> = ctx
            .mol
            .substance_groups()
            .iter()
            .filter(|sg| !sg.brackets.is_empty())
            .cloned()
            .collect();
        for sg in groups {
            let members: Vec<DVec2> = sg
                .atoms
                .iter()
                .filter_map(|a| ctx.at_cds.get(a.index()).copied())
                .collect();
            let ref_pt = if members.is_empty() {
                DVec2::ZERO
            } else {
                members.iter().copied().sum::<DVec2>() / members.len() as f64
            };
            let segments = group_bond_segments(&ctx.mol, &sg, &ctx.at_cds);
            let mut last = Vec::new();
            for brk in &sg.brackets {
                let p1 = rotate(DVec2::from(brk[0]), rot);
                let p2 = rotate(DVec2::from(brk[1]), rot);
                last = bracket_points(p1, p2, ref_pt, &segments);
                ctx.post_shapes.push(DrawShape::polyline(last.clone()));
            }
            if !self.backend.supports_annotations() || last.len() < 4 {
                continue;
            }
            if let Some(connect) = &sg.connect {
                let (mut top, mut brk) = (last[1], last[0]);
                if last[2].y > top.y {
                    top = last[2];
                    brk = last[3];
                }
                let align = if brk.x < top.x {
                    TextAlign::Start
                } else {
                    TextAlign::Middle
                };
                let note = self.fixed_note(connect, top + (top - brk), align);
                ctx.annotations.push(note);
            }
            if let Some(label) = &sg.label {
                let (mut bottom, mut brk) = (last[2], last[3]);
                if last[1].y < bottom.y {
                    bottom = last[1];
                    brk = last[0];
                }
                let note = self.fixed_note(label, bottom + (bottom - brk), TextAlign::Middle);
                ctx.annotations.push(note);
            }
        }
    }

    fn extract_mol_notes(&mut self, ctx: &mut DrawContext) {
        let note = match ctx.mol.note() {
            Some(n) => n.to_owned(),
            None if self.options.include_chiral_flag_label && ctx.mol.chiral_flag() => {
                "ABS".to_owned()
            }
            None => return,
        };
        if note.is_empty() {
            return;
        }
        let record = self.place_mol_note(ctx, &note);
        if record.is_placed() {
            ctx.annotations.push(record);
        } else {
            log::warn!("no room for molecule note {note:?}");
        }
    }

    /// Brackets across the bonds leaving a repeatable fragment, labelled
    /// `(min-max)` beside the rightmost bracket end.
    fn extract_link_nodes(&mut self, ctx: &mut DrawContext) -> Result<(), DrawError> {
        let n = ctx.at_cds.len();
        let nodes = ctx.mol.link_nodes().to_vec();
        for node in nodes {
            let mut label_pt = DVec2::splat(-1000.0);
            let mut label_perp = DVec2::ZERO;
            for &(inner, outer) in &node.bond_atoms {
                if inner.index() >= n || outer.index() >= n {
                    return Err(DrawError::InvalidInput(format!(
                        "link node bond ({}, {}) is not in the molecule",
                        inner.index(),
                        outer.index()
                    )));
                }
                let start = ctx.at_cds[inner.index()];
                let vect = ctx.at_cds[outer.index()] - start;
                let crossing = start + vect * LINK_CROSSING_FRAC;
                let perp = DVec2::new(vect.y, -vect.x) * LINK_LENGTH_FRAC;
                let p1 = crossing + perp / 2.0;
                let p2 = crossing - perp / 2.0;
                ctx.post_shapes
                    .push(DrawShape::polyline(bracket_points(p1, p2, start, &[])));
                for p in [p1, p2] {
                    if p.x > label_pt.x {
                        label_pt = p;
                        label_perp = crossing - start;
                    }
                }
            }
            let len = label_perp.length();
            if self.backend.supports_annotations() && len > 0.0 {
                let text = format!("({}-{})", node.min_rep, node.max_rep);
                let note = self.fixed_note(&text, label_pt + label_perp / (len * 5.0), TextAlign::Start);
                ctx.annotations.push(note);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::backend::RecordingBackend;
    use crate::draw::context::ShapeKind;
    use crate::draw::text::FixedWidthMetrics;
    use crate::sgroup::{FieldDisplay, LinkNode, StereoGroup};
    use crate::{Atom, Bond, BondOrder, Chirality, Conformer, VariableAttachment};

    fn canvas() -> Canvas<RecordingBackend> {
        Canvas::new(
            300,
            300,
            None,
            RecordingBackend::new(),
            Box::new(FixedWidthMetrics::default()),
        )
        .unwrap()
    }

    fn chain(points: &[[f64; 2]]) -> Molecule {
        let mut mol = Molecule::new();
        let atoms: Vec<_> = points.iter().map(|_| mol.add_atom(Atom::new(6))).collect();
        for pair in atoms.windows(2) {
            mol.add_bond(pair[0], pair[1], Bond::new(BondOrder::Single));
        }
        mol.add_conformer(Conformer::from_2d(points));
        mol
    }

    fn setup(c: &mut Canvas<RecordingBackend>, mol: &Molecule) -> DrawContext {
        c.setup_molecule(mol, None, &[], &BTreeMap::new(), false)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn no_conformer_is_unrenderable() {
        let mut c = canvas();
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(6));
        let r = c.setup_molecule(&mol, None, &[], &BTreeMap::new(), true).unwrap();
        assert!(r.is_none());
        assert!(c.backend.primitives().is_empty());
    }

    #[test]
    fn caller_molecule_is_untouched() {
        let mut c = canvas();
        c.options.centre_molecules_before_drawing = true;
        c.options.add_atom_indices = true;
        let mol = chain(&[[1.0, 1.0], [2.5, 1.0]]);
        let before = mol.clone();
        let ctx = setup(&mut c, &mol);
        assert_eq!(mol, before);
        assert!((ctx.at_cds[0] - DVec2::new(-0.75, 0.0)).length() < 1e-9);
        assert_eq!(ctx.mol.atom(NodeIndex::new(1)).note.as_deref(), Some("1"));
        assert_eq!(ctx.annotations.len(), 2);
    }

    #[test]
    fn rotation_is_clockwise() {
        let mut c = canvas();
        c.options.rotate = 90.0;
        let ctx = setup(&mut c, &chain(&[[0.0, 0.0], [1.0, 0.0]]));
        assert!((ctx.at_cds[1] - DVec2::new(0.0, -1.0)).length() < 1e-9);
    }

    #[test]
    fn extraction_restores_viewport() {
        let mut c = canvas();
        c.vp.scale = 37.0;
        c.text.set_font_scale(37.0, true);
        setup(&mut c, &chain(&[[0.0, 0.0], [1.0, 0.0]]));
        assert_eq!(c.scale(), 37.0);
        assert_eq!(c.text.font_scale(), 37.0);
    }

    #[test]
    fn single_or_group_becomes_molecule_note() {
        let mut c = canvas();
        c.options.simplified_stereo_group_label = true;
        let mut mol = chain(&[[0.0, 0.0], [1.5, 0.0], [3.0, 0.0]]);
        let centre = NodeIndex::new(1);
        mol.atom_mut(centre).chirality = Chirality::Cw;
        mol.atom_mut(centre).cip_code = Some("R".to_owned());
        mol.set_stereo_groups(vec![StereoGroup {
            kind: StereoGroupKind::Or,
            atoms: vec![centre],
        }]);
        let ctx = setup(&mut c, &mol);
        assert_eq!(ctx.mol.note(), Some("OR enantiomer"));
        assert!(ctx.mol.stereo_groups().is_empty());
        assert_eq!(ctx.mol.atom(centre).cip_code, None);
        assert_eq!(ctx.annotations.len(), 1);
        assert_eq!(ctx.annotations[0].text, "OR enantiomer");
    }

    #[test]
    fn chiral_flag_note() {
        let mut c = canvas();
        c.options.include_chiral_flag_label = true;
        let mut mol = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        mol.set_chiral_flag(true);
        let ctx = setup(&mut c, &mol);
        assert_eq!(ctx.annotations[0].text, "ABS");
        assert_eq!(ctx.annotations[0].align, TextAlign::Start);
        assert!(!ctx.annotations[0].scale_text);
    }

    #[test]
    fn variable_attachment_shapes() {
        let mut c = canvas();
        let mut mol = Molecule::new();
        let ring: Vec<_> = (0..3).map(|_| mol.add_atom(Atom::new(6))).collect();
        let dummy = mol.add_atom(Atom::new(0));
        let attach = mol.add_atom(Atom::new(8));
        mol.add_bond(ring[0], ring[1], Bond::new(BondOrder::Single));
        mol.add_bond(ring[1], ring[2], Bond::new(BondOrder::Single));
        mol.add_bond(ring[2], ring[0], Bond::new(BondOrder::Single));
        let mut var = Bond::new(BondOrder::Single);
        var.attachment = Some(VariableAttachment {
            end_points: vec![0, 1],
        });
        mol.add_bond(dummy, attach, var);
        mol.add_conformer(Conformer::from_2d(&[
            [0.0, 0.0],
            [1.5, 0.0],
            [0.75, 1.3],
            [0.75, -0.5],
            [0.75, -2.0],
        ]));
        let ctx = setup(&mut c, &mol);
        let ellipses = ctx.pre_shapes.iter().filter(|s| s.kind == ShapeKind::Ellipse).count();
        let bands: Vec<_> = ctx.pre_shapes.iter().filter(|s| s.kind == ShapeKind::Polyline).collect();
        assert_eq!(ellipses, 2);
        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].line_width, 32.0);
        assert!(ctx.atom_syms[3].is_empty());

        mol.bond_mut(EdgeIndex::new(3)).attachment = Some(VariableAttachment {
            end_points: vec![9],
        });
        let err = c.setup_molecule(&mol, None, &[], &BTreeMap::new(), false);
        assert!(matches!(err, Err(DrawError::InvalidInput(_))));
    }

    #[test]
    fn brackets_and_labels() {
        let mut c = canvas();
        let mut mol = chain(&[[0.0, 0.0], [1.5, 0.0], [3.0, 0.0]]);
        mol.add_substance_group(SubstanceGroup {
            kind: SubstanceGroupKind::RepeatUnit,
            atoms: vec![NodeIndex::new(1)],
            bonds: vec![EdgeIndex::new(0), EdgeIndex::new(1)],
            brackets: vec![[[0.75, -0.5], [0.75, 0.5]], [[2.25, 0.5], [2.25, -0.5]]],
            connect: Some("ht".to_owned()),
            label: Some("n".to_owned()),
            ..SubstanceGroup::default()
        });
        let ctx = setup(&mut c, &mol);
        assert_eq!(ctx.post_shapes.len(), 2);
        // Hooks of the left bracket point right, into the group.
        let left = &ctx.post_shapes[0].points;
        assert!(left[0].x > 0.75 && left[3].x > 0.75);
        let texts: Vec<_> = ctx.annotations.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(texts, vec!["ht", "n"]);
        // Both sit past the hooks of the right bracket, at its two ends.
        assert!((ctx.annotations[0].location - DVec2::new(2.35, 0.5)).length() < 1e-9);
        assert!((ctx.annotations[1].location - DVec2::new(2.35, -0.5)).length() < 1e-9);
        assert_eq!(ctx.annotations[0].align, TextAlign::Start);
    }

    #[test]
    fn data_group_positions() {
        let mut c = canvas();
        let mut mol = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        mol.add_substance_group(SubstanceGroup {
            kind: SubstanceGroupKind::Data,
            atoms: vec![NodeIndex::new(1)],
            data_fields: vec!["pKa".to_owned(), "4.2".to_owned()],
            field_display: Some(FieldDisplay {
                offset: [0.5, 0.5],
                relative: true,
            }),
            ..SubstanceGroup::default()
        });
        mol.add_substance_group(SubstanceGroup {
            kind: SubstanceGroupKind::Data,
            data_fields: vec!["lonely".to_owned()],
            field_display: Some(FieldDisplay {
                offset: [1.0, 0.0],
                relative: true,
            }),
            ..SubstanceGroup::default()
        });
        let ctx = setup(&mut c, &mol);
        assert_eq!(ctx.annotations.len(), 1);
        assert_eq!(ctx.annotations[0].text, "pKa|4.2");
        assert_eq!(ctx.annotations[0].location, DVec2::new(2.0, 0.5));
    }

    #[test]
    fn data_groups_skipped_without_annotation_support() {
        let mut c = Canvas::new(
            300,
            300,
            None,
            RecordingBackend::without_annotations(),
            Box::new(FixedWidthMetrics::default()),
        )
        .unwrap();
        let mut mol = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        mol.add_substance_group(SubstanceGroup {
            kind: SubstanceGroupKind::Data,
            atoms: vec![NodeIndex::new(0)],
            data_fields: vec!["x".to_owned()],
            ..SubstanceGroup::default()
        });
        let ctx = setup(&mut c, &mol);
        assert!(ctx.annotations.is_empty());
    }

    #[test]
    fn link_node_brackets() {
        let mut c = canvas();
        let mut mol = chain(&[[0.0, 0.0], [1.5, 0.0], [3.0, 0.0]]);
        mol.add_link_node(LinkNode {
            min_rep: 1,
            max_rep: 4,
            bond_atoms: vec![
                (NodeIndex::new(1), NodeIndex::new(0)),
                (NodeIndex::new(1), NodeIndex::new(2)),
            ],
        });
        let ctx = setup(&mut c, &mol);
        assert_eq!(ctx.post_shapes.len(), 2);
        assert_eq!(ctx.annotations.len(), 1);
        assert_eq!(ctx.annotations[0].text, "(1-4)");
        assert!(ctx.annotations[0].location.x > 2.0);
    }
}
