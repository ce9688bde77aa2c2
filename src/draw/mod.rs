//! 2D depiction of molecules and reactions.
//!
//! A [`MolDrawer`] owns a canvas and a [`DrawBackend`]. Every draw call
//! works on a prepared copy of the molecule, fits it to the panel, and
//! sends device-space primitives to the backend in drawing order:
//! decorations under the molecule, highlights, bonds, labels and notes,
//! decorations over the molecule, legend.
//!
//! ```
//! use crabdepict::{Atom, Bond, BondOrder, Conformer, MolDrawer, MolHighlights, Molecule,
//!     RecordingBackend};
//!
//! let mut mol = Molecule::new();
//! let c = mol.add_atom(Atom::new(6));
//! let o = mol.add_atom(Atom::new(8));
//! mol.add_bond(c, o, Bond::new(BondOrder::Double));
//! mol.add_conformer(Conformer::from_2d(&[[0.0, 0.0], [1.5, 0.0]]));
//!
//! let mut drawer = MolDrawer::new(300, 300, None, RecordingBackend::new()).unwrap();
//! let drawn = drawer
//!     .draw_molecule(&mol, &MolHighlights::default(), Some("formaldehyde"), None)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(drawn.atom_positions.len(), 2);
//! assert!(drawer.backend().texts().any(|(t, _)| t == "O"));
//! ```

mod annotation;
pub mod backend;
mod bonds;
mod canvas;
mod context;
pub mod geometry;
mod highlight;
mod labels;
pub mod options;
mod prepare;
mod reaction_layout;
mod scale;
mod shapes;
pub mod text;
pub mod viewport;

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_6;

use glam::DVec2;
use petgraph::graph::NodeIndex;

pub use backend::{DrawBackend, Pen, Primitive, RecordingBackend};
pub use highlight::{bonds_between_atoms, MolHighlights, MultiColourHighlights};
pub use options::{DrawColour, DrawOptions};
pub use text::{FixedWidthMetrics, OrientType, TextAlign, TextMeasure};
pub use viewport::Viewport;

use bonds::BondPaint;
use canvas::Canvas;
use context::DrawContext;
use scale::FitRequest;
use shapes::WAVY_SEGMENTS;
use text::TextLayout;

use crate::error::DrawError;
use crate::reaction::Reaction;
use crate::Molecule;

const MIN_LEGEND_HEIGHT: f64 = 20.0;
const LEGEND_HEIGHT_FRAC: f64 = 0.05;
const ATTACHMENT_COLOUR: DrawColour = DrawColour::new(0.5, 0.5, 0.5);
const ATTACHMENT_LEN: f64 = 1.0;
const ARROW_HEAD_FRAC: f64 = 0.05;

/// Where a molecule ended up on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnMolecule {
    /// Device position of every atom, panel offset included.
    pub atom_positions: Vec<DVec2>,
    /// Top-left corner of the molecule's panel.
    pub offset: DVec2,
    pub conf_id: Option<usize>,
}

/// Per-molecule extras for a grid drawing. Every list that is given must
/// have one entry per molecule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridRequest {
    pub legends: Option<Vec<String>>,
    pub highlights: Option<Vec<MolHighlights>>,
    pub conf_ids: Option<Vec<Option<usize>>>,
}

fn check_len<T>(what: &'static str, list: Option<&[T]>, expected: usize) -> Result<(), DrawError> {
    match list {
        Some(l) if l.len() != expected => Err(DrawError::LengthMismatch {
            what,
            expected,
            found: l.len(),
        }),
        _ => Ok(()),
    }
}

fn check_atoms<'a>(mol: &Molecule, atoms: impl IntoIterator<Item = &'a usize>) -> Result<(), DrawError> {
    let atom_count = mol.atom_count();
    match atoms.into_iter().find(|&&a| a >= atom_count) {
        Some(&index) => Err(DrawError::AtomIndexOutOfRange { index, atom_count }),
        None => Ok(()),
    }
}

fn check_bonds<'a>(mol: &Molecule, bonds: impl IntoIterator<Item = &'a usize>) -> Result<(), DrawError> {
    let bond_count = mol.bond_count();
    match bonds.into_iter().find(|&&b| b >= bond_count) {
        Some(&index) => Err(DrawError::BondIndexOutOfRange { index, bond_count }),
        None => Ok(()),
    }
}

fn check_conformer(mol: &Molecule, conf_id: Option<usize>) -> Result<(), DrawError> {
    let num_conformers = mol.conformers().len();
    match conf_id {
        Some(conf_id) if num_conformers > 0 && conf_id >= num_conformers => {
            Err(DrawError::ConformerOutOfRange {
                conf_id,
                num_conformers,
            })
        }
        _ => Ok(()),
    }
}

fn check_highlights(mol: &Molecule, hl: &MolHighlights) -> Result<(), DrawError> {
    check_atoms(mol, &hl.atoms)?;
    check_atoms(mol, hl.atom_colours.keys())?;
    check_atoms(mol, hl.radii.keys())?;
    if let Some(bonds) = &hl.bonds {
        check_bonds(mol, bonds)?;
    }
    check_bonds(mol, hl.bond_colours.keys())
}

/// Molecule drawer writing to a [`DrawBackend`].
///
/// The first molecule drawn fixes the scale; later calls on the same
/// drawer reuse it unless [`MolDrawer::set_scale`] is called. A grid
/// drawing fits every molecule at once.
#[derive(Debug)]
pub struct MolDrawer<B> {
    canvas: Canvas<B>,
    last_drawn: Option<DrawnMolecule>,
    options_dirty: bool,
}

impl<B: DrawBackend> MolDrawer<B> {
    /// Drawer for a `width` x `height` canvas measuring text with
    /// [`FixedWidthMetrics`]. `panel` is the size of one grid cell; `None`
    /// makes the whole canvas one panel.
    pub fn new(width: u32, height: u32, panel: Option<(u32, u32)>, backend: B) -> Result<Self, DrawError> {
        Self::with_text_measure(
            width,
            height,
            panel,
            backend,
            Box::new(FixedWidthMetrics::default()),
        )
    }

    pub fn with_text_measure(
        width: u32,
        height: u32,
        panel: Option<(u32, u32)>,
        backend: B,
        measure: Box<dyn TextMeasure>,
    ) -> Result<Self, DrawError> {
        let canvas = Canvas::new(width, height, panel, backend, measure)?;
        log::debug!(
            "new drawer {width}x{height}, panels {}x{}",
            canvas.panel_width,
            canvas.panel_height
        );
        Ok(Self {
            canvas,
            last_drawn: None,
            options_dirty: false,
        })
    }

    pub fn options(&self) -> &DrawOptions {
        &self.canvas.options
    }

    /// Options are re-read at the start of the next draw call.
    pub fn options_mut(&mut self) -> &mut DrawOptions {
        self.options_dirty = true;
        &mut self.canvas.options
    }

    pub fn backend(&self) -> &B {
        &self.canvas.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.canvas.backend
    }

    pub fn into_backend(self) -> B {
        self.canvas.backend
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    pub fn panel_width(&self) -> u32 {
        self.canvas.panel_width
    }

    pub fn panel_height(&self) -> u32 {
        self.canvas.panel_height
    }

    pub fn scale(&self) -> f64 {
        self.canvas.scale()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.canvas.vp
    }

    pub fn molecule_to_device(&self, p: DVec2) -> DVec2 {
        self.canvas.to_device(p)
    }

    pub fn device_to_molecule(&self, q: DVec2) -> DVec2 {
        self.canvas.to_molecule(q)
    }

    /// Top-left corner of grid panel `i`.
    pub fn panel_offset(&self, i: usize) -> (f64, f64) {
        self.canvas.panel_offset(i)
    }

    /// Device position of an atom of the most recently drawn molecule.
    pub fn atom_draw_coords(&self, atom: usize) -> Result<DVec2, DrawError> {
        let positions = self
            .last_drawn
            .as_ref()
            .map_or(&[][..], |d| d.atom_positions.as_slice());
        positions
            .get(atom)
            .copied()
            .ok_or(DrawError::AtomIndexOutOfRange {
                index: atom,
                atom_count: positions.len(),
            })
    }

    fn sync_options(&mut self) {
        if self.options_dirty {
            self.canvas.sync_options();
            self.options_dirty = false;
        }
    }

    /// Fix the viewport to show `min..max` (molecule units) in a `width` x
    /// `height` area. With a molecule, its own fitted box, labels
    /// included, is merged in.
    pub fn set_scale(
        &mut self,
        width: u32,
        height: u32,
        min: DVec2,
        max: DVec2,
        mol: Option<&Molecule>,
    ) -> Result<(), DrawError> {
        if width == 0 || height == 0 {
            return Err(DrawError::InvalidDimensions { width, height });
        }
        self.sync_options();
        let (w, h) = (f64::from(width), f64::from(height));
        let no_radii = BTreeMap::new();
        let fitted = match mol {
            Some(mol) => self
                .canvas
                .setup_molecule(mol, None, &[], &no_radii, false)?
                .map(|ctx| {
                    let req = FitRequest {
                        ctx: &ctx,
                        highlight_atoms: &[],
                        radii: &no_radii,
                    };
                    self.canvas.fit(&req, w, h)
                }),
            None => None,
        };
        self.canvas.set_explicit_scale(w, h, min, max, fitted);
        log::debug!("explicit scale {:.3}", self.canvas.scale());
        Ok(())
    }

    fn set_legend_height(&mut self, legend: Option<&str>) {
        self.canvas.vp.legend_height = match legend {
            Some(l) if !l.is_empty() => MIN_LEGEND_HEIGHT
                .max((LEGEND_HEIGHT_FRAC * f64::from(self.canvas.panel_height)).floor()),
            _ => 0.0,
        };
    }

    /// Draw one molecule with single-colour highlights and an optional
    /// legend. `Ok(None)` means the molecule has no coordinates and
    /// nothing was drawn.
    pub fn draw_molecule(
        &mut self,
        mol: &Molecule,
        highlights: &MolHighlights,
        legend: Option<&str>,
        conf_id: Option<usize>,
    ) -> Result<Option<DrawnMolecule>, DrawError> {
        check_highlights(mol, highlights)?;
        check_conformer(mol, conf_id)?;
        self.sync_options();
        self.set_legend_height(legend);
        self.draw_single(mol, highlights, legend, conf_id)
    }

    /// Draw one molecule into the current panel. The legend height must
    /// already be set; a grid keeps one height for every panel so that
    /// all of them are centred alike.
    fn draw_single(
        &mut self,
        mol: &Molecule,
        hl: &MolHighlights,
        legend: Option<&str>,
        conf_id: Option<usize>,
    ) -> Result<Option<DrawnMolecule>, DrawError> {
        let line_width = self.canvas.line_width();
        let Some(ctx) = self
            .canvas
            .setup_molecule(mol, conf_id, &hl.atoms, &hl.radii, true)?
        else {
            return Ok(None);
        };
        let hl_bonds = hl.resolved_bonds(&ctx.mol);

        let c = &mut self.canvas;
        c.draw_shapes(&ctx.pre_shapes);
        let continuous = c.options.continuous_highlight;
        if continuous {
            c.draw_continuous_highlights(&ctx, hl, &hl_bonds);
        } else if c.options.circle_atoms && !hl.atoms.is_empty() {
            c.draw_circle_highlights(&ctx, hl);
        }

        let no_atoms: &[usize] = &[];
        let hl_atoms = if continuous { no_atoms } else { hl.atoms.as_slice() };
        let paint: Vec<BondPaint> = ctx
            .mol
            .bonds()
            .map(|bond| {
                if !continuous && hl_bonds.contains(&bond.index()) {
                    let colour = hl
                        .bond_colours
                        .get(&bond.index())
                        .copied()
                        .unwrap_or(c.options.highlight_colour);
                    return BondPaint {
                        col1: colour,
                        col2: colour,
                        highlight: true,
                    };
                }
                let (a1, a2) = ctx
                    .mol
                    .bond_endpoints(bond)
                    .map_or((0, 0), |(a, b)| (a.index(), b.index()));
                BondPaint {
                    col1: c.atom_colour(&ctx, a1, hl_atoms, &hl.atom_colours),
                    col2: c.atom_colour(&ctx, a2, hl_atoms, &hl.atom_colours),
                    highlight: false,
                }
            })
            .collect();
        c.draw_bonds(&ctx, &paint);

        let label_colours: Vec<DrawColour> = (0..ctx.at_cds.len())
            .map(|i| c.atom_colour(&ctx, i, hl_atoms, &hl.atom_colours))
            .collect();
        self.finish_molecule(&ctx, &label_colours);
        self.canvas.set_line_width(line_width);
        if let Some(legend) = legend {
            self.draw_legend(legend);
        }
        Ok(Some(self.record_drawn(&ctx)))
    }

    /// Draw one molecule where atoms and bonds may carry several highlight
    /// colours: bonds become striped bands, atoms split ellipses.
    pub fn draw_molecule_with_highlights(
        &mut self,
        mol: &Molecule,
        legend: Option<&str>,
        highlights: &MultiColourHighlights,
        conf_id: Option<usize>,
    ) -> Result<Option<DrawnMolecule>, DrawError> {
        check_atoms(mol, highlights.atoms.keys())?;
        check_atoms(mol, highlights.radii.keys())?;
        check_bonds(mol, highlights.bonds.keys())?;
        check_bonds(mol, highlights.line_width_multipliers.keys())?;
        check_conformer(mol, conf_id)?;
        self.sync_options();

        self.set_legend_height(legend);
        let line_width = self.canvas.line_width();
        let atoms: Vec<usize> = highlights.atoms.keys().copied().collect();
        let Some(ctx) = self
            .canvas
            .setup_molecule(mol, conf_id, &atoms, &highlights.radii, true)?
        else {
            return Ok(None);
        };

        let c = &mut self.canvas;
        c.draw_shapes(&ctx.pre_shapes);
        let fill = c.fill_polys();
        c.set_fill_polys(c.options.fill_highlights);
        // Bands first so that the atom ellipses cover their ragged ends.
        c.draw_highlighted_bonds(&ctx, highlights);
        for (&atom, colours) in &highlights.atoms {
            c.draw_highlighted_atom(&ctx, atom, colours, &highlights.radii);
        }
        c.set_fill_polys(fill);

        let no_colours = BTreeMap::new();
        let paint: Vec<BondPaint> = ctx
            .mol
            .bonds()
            .map(|bond| {
                let (a1, a2) = ctx
                    .mol
                    .bond_endpoints(bond)
                    .map_or((0, 0), |(a, b)| (a.index(), b.index()));
                let mut col1 = c.atom_colour(&ctx, a1, &[], &no_colours);
                let mut col2 = c.atom_colour(&ctx, a2, &[], &no_colours);
                // A bond drawn in a colour its band does not have would
                // vanish into the band.
                if let Some(cols) = highlights.bonds.get(&bond.index()) {
                    if !cols.contains(&col1) || !cols.contains(&col2) {
                        col1 = DrawColour::BLACK;
                        col2 = DrawColour::BLACK;
                    }
                }
                BondPaint {
                    col1,
                    col2,
                    highlight: false,
                }
            })
            .collect();
        c.draw_bonds(&ctx, &paint);

        let label_colours: Vec<DrawColour> = (0..ctx.at_cds.len())
            .map(|i| {
                let colour = c.atom_colour(&ctx, i, &[], &no_colours);
                match highlights.atoms.get(&i) {
                    Some(cols) if cols.contains(&colour) => DrawColour::BLACK,
                    _ => colour,
                }
            })
            .collect();
        self.finish_molecule(&ctx, &label_colours);
        self.canvas.set_line_width(line_width);
        if let Some(legend) = legend {
            self.draw_legend(legend);
        }
        Ok(Some(self.record_drawn(&ctx)))
    }

    /// Labels, notes, radicals and the decorations drawn over the bonds.
    fn finish_molecule(&mut self, ctx: &DrawContext, label_colours: &[DrawColour]) {
        let c = &mut self.canvas;
        if c.options.dummies_are_attachments {
            for atom in ctx.mol.atoms() {
                let a = ctx.mol.atom(atom);
                if a.atomic_num != 0
                    || ctx.mol.degree(atom) != 1
                    || a.label.is_some()
                    || c.options.atom_labels.contains_key(&atom.index())
                {
                    continue;
                }
                if let Some(nbr) = ctx.mol.neighbors(atom).next() {
                    c.draw_attachment_line(
                        ctx.at_cds[nbr.index()],
                        ctx.at_cds[atom.index()],
                        ATTACHMENT_COLOUR,
                        ATTACHMENT_LEN,
                        WAVY_SEGMENTS,
                    );
                }
            }
        }

        for (i, sym) in ctx.atom_syms.iter().enumerate() {
            if sym.is_empty() {
                continue;
            }
            let colour = label_colours.get(i).copied().unwrap_or(DrawColour::BLACK);
            c.text.set_colour(colour);
            let node = NodeIndex::new(i);
            c.set_active_atoms(Some(node), None);
            c.draw_string(&sym.text, ctx.at_cds[i], TextLayout::Label(sym.orient));
            c.clear_active_atoms();
        }

        c.text.set_colour(c.options.annotation_colour);
        if !ctx.annotations.is_empty() {
            if c.backend.supports_annotations() {
                for note in &ctx.annotations {
                    c.draw_annotation(note);
                }
            } else {
                log::warn!(
                    "backend cannot draw annotations, {} skipped",
                    ctx.annotations.len()
                );
            }
        }
        if c.options.include_radicals {
            c.draw_radicals(ctx);
        }
        c.draw_shapes(&ctx.post_shapes);
        c.flag_close_contacts(ctx);
    }

    /// Legend lines centred at the bottom of the current panel, shrunk to
    /// fit the legend area and the panel width.
    fn draw_legend(&mut self, legend: &str) {
        let lines: Vec<&str> = legend.split('\n').filter(|l| !l.is_empty()).collect();
        let c = &mut self.canvas;
        let font_size = c.text.font_size();
        if lines.is_empty() || font_size <= 0.0 {
            return;
        }
        let legend_height = c.vp.legend_height;
        let panel_width = f64::from(c.panel_width);
        let panel_height = f64::from(c.panel_height);
        let font_scale = c.text.font_scale();
        let layout = TextLayout::Aligned(TextAlign::Middle);

        let measure = |c: &Canvas<B>| -> (f64, f64) {
            lines.iter().fold((0.0, 0.0), |(h, w), line| {
                let (lo, hi) = c.text.extremes(line, layout);
                (h + hi.y - lo.y, f64::max(w, hi.x - lo.x))
            })
        };
        let mut legend_scale = font_scale * c.options.legend_font_size / font_size;
        c.text.set_font_scale(legend_scale, true);
        let (mut total_height, mut total_width) = measure(&*c);
        if total_height > legend_height && total_height > 0.0 {
            legend_scale *= legend_height / total_height;
            c.text.set_font_scale(legend_scale, true);
            (total_height, total_width) = measure(&*c);
        }
        if total_width > panel_width {
            legend_scale *= panel_width / total_width;
            c.text.set_font_scale(legend_scale, true);
            (total_height, _) = measure(&*c);
        }

        c.text.set_colour(c.options.legend_colour);
        let x = c.vp.x_offset + panel_width / 2.0;
        let mut y = c.vp.y_offset + panel_height - total_height;
        for line in lines {
            let (lo, hi) = c.text.extremes(line, layout);
            c.draw_string_device(line, DVec2::new(x, y - lo.y), layout);
            y += hi.y - lo.y;
        }
        c.text.set_font_scale(font_scale, true);
    }

    fn record_drawn(&mut self, ctx: &DrawContext) -> DrawnMolecule {
        let drawn = DrawnMolecule {
            atom_positions: ctx.at_cds.iter().map(|&p| self.canvas.to_device(p)).collect(),
            offset: DVec2::new(self.canvas.vp.x_offset, self.canvas.vp.y_offset),
            conf_id: ctx.conf_id,
        };
        self.last_drawn = Some(drawn.clone());
        drawn
    }

    /// Draw molecules in a grid of panels, row by row, at one shared
    /// scale. Molecules without coordinates leave their panel empty.
    pub fn draw_molecules(
        &mut self,
        mols: &[&Molecule],
        request: &GridRequest,
    ) -> Result<Vec<Option<DrawnMolecule>>, DrawError> {
        let n = mols.len();
        check_len("legends", request.legends.as_deref(), n)?;
        check_len("highlights", request.highlights.as_deref(), n)?;
        check_len("conformer ids", request.conf_ids.as_deref(), n)?;
        let no_highlights = MolHighlights::default();
        let highlights = |i: usize| {
            request
                .highlights
                .as_ref()
                .map_or(&no_highlights, |h| &h[i])
        };
        let conf_id = |i: usize| request.conf_ids.as_ref().and_then(|c| c[i]);
        let legend = |i: usize| request.legends.as_ref().map(|l| l[i].as_str());
        for (i, mol) in mols.iter().enumerate() {
            check_highlights(mol, highlights(i))?;
            check_conformer(mol, conf_id(i))?;
        }
        if mols.is_empty() {
            return Ok(Vec::new());
        }
        self.sync_options();

        let any_legend = (0..n).find_map(|i| legend(i).filter(|l| !l.is_empty()));
        self.set_legend_height(any_legend);
        let mut prepared = Vec::with_capacity(n);
        for (i, mol) in mols.iter().enumerate() {
            let hl = highlights(i);
            let ctx = self
                .canvas
                .setup_molecule(mol, conf_id(i), &hl.atoms, &hl.radii, false)?;
            prepared.push(ctx);
        }
        let reqs: Vec<FitRequest<'_>> = prepared
            .iter()
            .enumerate()
            .filter_map(|(i, ctx)| {
                ctx.as_ref().map(|ctx| FitRequest {
                    ctx,
                    highlight_atoms: &highlights(i).atoms,
                    radii: &highlights(i).radii,
                })
            })
            .collect();
        self.canvas.calculate_grid_scale(&reqs);
        self.canvas.needs_scale = false;
        log::debug!("grid of {n} molecules at scale {:.3}", self.canvas.scale());

        let mut drawn = Vec::with_capacity(n);
        for (i, mol) in mols.iter().enumerate() {
            let (x, y) = self.canvas.panel_offset(i);
            self.canvas.vp.x_offset = x;
            self.canvas.vp.y_offset = y;
            drawn.push(self.draw_single(mol, highlights(i), legend(i), conf_id(i))?);
        }
        Ok(drawn)
    }

    /// Draw a reaction scheme. `colours` replaces the highlight palette
    /// when highlighting by reactant; `conf_ids` has one entry per
    /// component, reactants first, then agents, then products.
    pub fn draw_reaction(
        &mut self,
        rxn: &Reaction,
        highlight_by_reactant: bool,
        colours: Option<&[DrawColour]>,
        conf_ids: Option<&[Option<usize>]>,
    ) -> Result<(), DrawError> {
        check_len("conformer ids", conf_ids, rxn.num_components())?;
        if colours.is_some_and(|c| c.is_empty()) {
            return Err(DrawError::InvalidInput(
                "reactant highlight palette is empty".to_owned(),
            ));
        }
        for (i, mol) in rxn.components().enumerate() {
            check_conformer(mol, conf_ids.and_then(|ids| ids[i]))?;
        }
        self.sync_options();

        // The scheme is already placed; centring or rotating the merged
        // molecule would move it away from the arrow.
        let centre = self.canvas.options.centre_molecules_before_drawing;
        let rotate = self.canvas.options.rotate;
        self.canvas.options.centre_molecules_before_drawing = false;
        self.canvas.options.rotate = 0.0;
        let result = self.draw_scheme(rxn, highlight_by_reactant, colours, conf_ids);
        self.canvas.options.centre_molecules_before_drawing = centre;
        self.canvas.options.rotate = rotate;
        result
    }

    fn draw_scheme(
        &mut self,
        rxn: &Reaction,
        highlight_by_reactant: bool,
        colours: Option<&[DrawColour]>,
        conf_ids: Option<&[Option<usize>]>,
    ) -> Result<(), DrawError> {
        let mut layout = self.canvas.layout_reaction(rxn, conf_ids);

        self.set_legend_height(None);
        // An empty side leaves the arrow hanging off the molecule's box.
        if self.canvas.needs_scale && (layout.num_reactants == 0 || layout.num_products == 0) {
            let scale_mol = layout.with_arrow_atoms();
            self.canvas
                .setup_molecule(&scale_mol, None, &[], &BTreeMap::new(), true)?;
        }

        let highlights = if highlight_by_reactant {
            let palette = colours
                .map(<[DrawColour]>::to_vec)
                .unwrap_or_else(|| self.canvas.options.highlight_colour_palette.clone());
            layout.reactant_highlights(&palette)
        } else {
            MolHighlights::default()
        };
        self.draw_single(&layout.mol, &highlights, None, None)?;

        let c = &mut self.canvas;
        let font_scale = c.text.font_scale();
        let font_size = c.text.font_size();
        if font_size > 0.0 {
            c.text.set_font_scale(
                2.0 * font_scale * c.options.legend_font_size / font_size,
                true,
            );
        }
        let colour = c.colour();
        let text_colour = c.text.colour();
        c.set_colour(c.options.symbol_colour);
        c.text.set_colour(c.options.symbol_colour);
        for &x in &layout.plus_locs {
            c.draw_string(
                "+",
                DVec2::new(x, layout.arrow_begin.y),
                TextLayout::Aligned(TextAlign::Middle),
            );
        }
        c.draw_arrow(layout.arrow_begin, layout.arrow_end, true, ARROW_HEAD_FRAC, FRAC_PI_6);
        c.set_colour(colour);
        c.text.set_colour(text_colour);
        c.text.set_font_scale(font_scale, true);
        Ok(())
    }
}
