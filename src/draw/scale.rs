//! Fitting molecules to the drawing area.
//!
//! The atom box is grown by everything drawn outside it (labels, highlight
//! ellipses, radical dots and notes) until the scale settles, then padded
//! and centred.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_1_SQRT_2;

use glam::DVec2;

use super::annotation::scaled_rect;
use super::backend::DrawBackend;
use super::canvas::Canvas;
use super::context::DrawContext;
use super::text::{TextAlign, TextLayout};

/// Ranges narrower than this are treated as a single point.
const MIN_RANGE: f64 = 1.0e-4;

/// Bond length below which labels use a smaller base font.
const SHORT_BOND: f64 = 1.0;
const SHORT_BOND_FONT_FACTOR: f64 = 0.75;

/// What one molecule needs for fitting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FitRequest<'a> {
    pub ctx: &'a DrawContext,
    pub highlight_atoms: &'a [usize],
    pub radii: &'a BTreeMap<usize, f64>,
}

/// Padded molecule-space box and the scale that fits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Fit {
    pub min: DVec2,
    pub range: DVec2,
    pub scale: f64,
}

impl Fit {
    pub fn max(&self) -> DVec2 {
        self.min + self.range
    }
}

fn grow(lo: &mut DVec2, hi: &mut DVec2, p_lo: DVec2, p_hi: DVec2) {
    *lo = lo.min(p_lo);
    *hi = hi.max(p_hi);
}

/// Replace a vanishing range by a unit one centred on the point.
fn widen_degenerate(lo: &mut DVec2, hi: &mut DVec2) {
    if hi.x - lo.x < MIN_RANGE {
        let mid = 0.5 * (lo.x + hi.x);
        lo.x = mid - 0.5;
        hi.x = mid + 0.5;
    }
    if hi.y - lo.y < MIN_RANGE {
        let mid = 0.5 * (lo.y + hi.y);
        lo.y = mid - 0.5;
        hi.y = mid + 0.5;
    }
}

fn fit_scale(width: f64, height: f64, range: DVec2) -> f64 {
    (width / range.x).min(height / range.y)
}

impl<B: DrawBackend> Canvas<B> {
    /// Box of a label anchored on `cds`, in molecule space, at the current
    /// font and drawing scales.
    pub(crate) fn string_extremes_mol(&self, text: &str, layout: TextLayout, cds: DVec2) -> (DVec2, DVec2) {
        let s = self.vp.scale;
        let (lo, hi) = self.text.extremes(text, layout);
        (
            DVec2::new(cds.x + lo.x / s, cds.y - hi.y / s),
            DVec2::new(cds.x + hi.x / s, cds.y - lo.y / s),
        )
    }

    /// Highlight ellipse of an atom as (centre, x radius, y radius). A
    /// labelled atom gets an ellipse big enough to hold its label.
    pub(crate) fn label_ellipse(
        &self,
        ctx: &DrawContext,
        atom: usize,
        radii: &BTreeMap<usize, f64>,
    ) -> (DVec2, f64, f64) {
        let centre = ctx.at_cds[atom];
        let rad = radii
            .get(&atom)
            .copied()
            .unwrap_or(self.options.highlight_radius);
        let sym = ctx.symbol(atom);
        if self.options.atom_highlights_are_circles || sym.is_empty() {
            return (centre, rad, rad);
        }
        let (lo, hi) = self.string_extremes_mol(sym, TextLayout::Label(ctx.orient(atom)), centre);
        let xr = rad.max(FRAC_1_SQRT_2 * (hi.x - lo.x));
        let yr = rad.max(FRAC_1_SQRT_2 * (hi.y - lo.y));
        ((lo + hi) * 0.5, xr, yr)
    }

    /// Molecule units per extraction unit for anything sized by the font.
    pub(crate) fn font_factor(&self) -> f64 {
        self.text.font_scale() / self.vp.scale
    }

    /// Base font for a context: smaller when bonds are short.
    fn base_font_for(&self, mean_bond_length: Option<f64>) -> f64 {
        match mean_bond_length {
            Some(len) if len < SHORT_BOND => self.options.base_font_size * SHORT_BOND_FONT_FACTOR,
            _ => self.options.base_font_size,
        }
    }

    fn grow_for_drawables(&self, req: &FitRequest<'_>, lo: &mut DVec2, hi: &mut DVec2) {
        let ctx = req.ctx;
        for (i, &cds) in ctx.at_cds.iter().enumerate() {
            let sym = ctx.symbol(i);
            if !sym.is_empty() {
                let (l, h) = self.string_extremes_mol(sym, TextLayout::Label(ctx.orient(i)), cds);
                grow(lo, hi, l, h);
            }
            if req.highlight_atoms.contains(&i) {
                let (centre, xr, yr) = self.label_ellipse(ctx, i, req.radii);
                let r = DVec2::new(xr, yr);
                grow(lo, hi, centre - r, centre + r);
            }
        }

        let factor = self.font_factor();
        for mark in &ctx.radicals {
            let rect = scaled_rect(&mark.rect, ctx.at_cds[mark.atom], factor);
            let half = DVec2::new(0.5 * rect.width, 0.5 * rect.height);
            grow(lo, hi, rect.trans - half, rect.trans + half);
        }

        if !self.backend.supports_annotations() {
            return;
        }
        for note in ctx.annotations.iter().filter(|n| n.is_placed()) {
            let (w, h) = (note.width * factor, note.height * factor);
            let mut l = note.location - DVec2::new(0.0, 0.5 * h);
            let mut r = note.location + DVec2::new(0.0, 0.5 * h);
            match note.align {
                TextAlign::Start => r.x += w,
                TextAlign::End => l.x -= w,
                TextAlign::Middle => {
                    l.x -= 0.5 * w;
                    r.x += 0.5 * w;
                }
            }
            grow(lo, hi, l, r);
        }
    }

    /// Box and scale fitting one molecule into `width` x `height`, padding
    /// included. Moves the font scale; the caller sets it afterwards.
    pub(crate) fn fit(&mut self, req: &FitRequest<'_>, width: f64, height: f64) -> Fit {
        let ctx = req.ctx;
        let (mut lo, mut hi) = ctx.atom_extremes().unwrap_or((DVec2::ZERO, DVec2::ZERO));
        for shape in ctx.pre_shapes.iter().chain(&ctx.post_shapes) {
            for &p in &shape.points {
                grow(&mut lo, &mut hi, p, p);
            }
        }
        widen_degenerate(&mut lo, &mut hi);

        let mut scale = fit_scale(width, height, hi - lo);
        let mut iterations = 0;
        while iterations < self.options.max_scale_iterations && scale > MIN_RANGE {
            iterations += 1;
            self.vp.scale = scale;
            self.text.set_font_scale(scale, false);
            self.grow_for_drawables(req, &mut lo, &mut hi);
            let old_scale = scale;
            scale = fit_scale(width, height, hi - lo);
            if (scale - old_scale).abs() < self.options.scale_tolerance {
                break;
            }
        }
        log::debug!("scale settled at {scale:.3} after {iterations} iterations");

        let mut range = hi - lo;
        lo -= range * self.options.padding;
        range *= 1.0 + 2.0 * self.options.padding;
        Fit {
            min: lo,
            range,
            scale: fit_scale(width, height, range),
        }
    }

    /// Fixed bond length or fixed scale only ever shrink the drawing. When
    /// both are set, the fixed scale wins.
    fn apply_scale_ceilings(&self, scale: f64, width: f64) -> f64 {
        let ceiling = if self.options.fixed_scale > 0.0 {
            width * self.options.fixed_scale
        } else if self.options.fixed_bond_length > 0.0 {
            self.options.fixed_bond_length
        } else {
            return scale;
        };
        scale.min(ceiling)
    }

    fn commit_fit(&mut self, fit: Fit, width: f64, height: f64) {
        self.vp.x_min = fit.min.x;
        self.vp.y_min = fit.min.y;
        self.vp.x_range = fit.range.x;
        self.vp.y_range = fit.range.y;
        self.vp.scale = fit.scale;
        self.text.set_font_scale(fit.scale, false);
        self.vp.centre_picture(width, height);
        self.needs_scale = false;
    }

    /// Fit one molecule to the panel and fix the viewport.
    pub(crate) fn calculate_scale(&mut self, req: &FitRequest<'_>) {
        let width = f64::from(self.panel_width);
        let height = self.vp.draw_height();
        let base = self.base_font_for(req.ctx.mean_bond_length());
        self.text.set_base_font_size(base);
        let mut fit = self.fit(req, width, height);
        fit.scale = self.apply_scale_ceilings(fit.scale, width);
        self.commit_fit(fit, width, height);
    }

    /// One scale shared by every panel of a grid: the union of the
    /// molecules' fitted boxes.
    pub(crate) fn calculate_grid_scale(&mut self, reqs: &[FitRequest<'_>]) {
        let width = f64::from(self.panel_width);
        let height = self.vp.draw_height();
        let mut lo = DVec2::splat(f64::MAX);
        let mut hi = DVec2::splat(f64::MIN);
        let mut total_len = 0.0;
        let mut n_bonds = 0usize;
        self.text.set_base_font_size(self.options.base_font_size);
        for req in reqs {
            let fit = self.fit(req, width, height);
            grow(&mut lo, &mut hi, fit.min, fit.max());
            if let Some(mean) = req.ctx.mean_bond_length() {
                let n = req.ctx.mol.bond_count();
                total_len += mean * n as f64;
                n_bonds += n;
            }
        }
        if reqs.is_empty() {
            lo = DVec2::ZERO;
            hi = DVec2::ZERO;
        }
        widen_degenerate(&mut lo, &mut hi);
        let mean = (n_bonds > 0).then(|| total_len / n_bonds as f64);
        let base = self.base_font_for(mean);
        self.text.set_base_font_size(base);
        let range = hi - lo;
        let scale = self.apply_scale_ceilings(fit_scale(width, height, range), width);
        self.commit_fit(
            Fit {
                min: lo,
                range,
                scale,
            },
            width,
            height,
        );
    }

    /// Set the viewport to show the box `minv..maxv`, merged with a fitted
    /// box when one is given.
    pub(crate) fn set_explicit_scale(
        &mut self,
        width: f64,
        height: f64,
        minv: DVec2,
        maxv: DVec2,
        fitted: Option<Fit>,
    ) {
        let (mut lo, mut hi) = match fitted {
            Some(fit) => (minv.min(fit.min), maxv.max(fit.max())),
            None => (minv, maxv),
        };
        widen_degenerate(&mut lo, &mut hi);
        let mut range = hi - lo;
        lo -= range * self.options.padding;
        range *= 1.0 + 2.0 * self.options.padding;
        let scale = fit_scale(width, height, range);
        self.commit_fit(
            Fit {
                min: lo,
                range,
                scale,
            },
            width,
            height,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::backend::RecordingBackend;
    use crate::draw::context::AtomSymbol;
    use crate::draw::text::{FixedWidthMetrics, OrientType};
    use crate::{Atom, Bond, BondOrder, Molecule};

    fn canvas(w: u32, h: u32) -> Canvas<RecordingBackend> {
        Canvas::new(
            w,
            h,
            None,
            RecordingBackend::new(),
            Box::new(FixedWidthMetrics::default()),
        )
        .unwrap()
    }

    fn chain(points: &[[f64; 2]]) -> DrawContext {
        let mut mol = Molecule::new();
        let atoms: Vec<_> = points.iter().map(|_| mol.add_atom(Atom::new(6))).collect();
        for pair in atoms.windows(2) {
            mol.add_bond(pair[0], pair[1], Bond::new(BondOrder::Single));
        }
        let mut ctx = DrawContext::new(mol, None);
        ctx.at_cds = points.iter().map(|p| DVec2::new(p[0], p[1])).collect();
        ctx.atom_syms = vec![AtomSymbol::default(); points.len()];
        ctx
    }

    fn scale_for(c: &mut Canvas<RecordingBackend>, ctx: &DrawContext) -> f64 {
        let radii = BTreeMap::new();
        c.calculate_scale(&FitRequest {
            ctx,
            highlight_atoms: &[],
            radii: &radii,
        });
        c.scale()
    }

    #[test]
    fn single_atom_has_finite_scale() {
        let mut c = canvas(200, 200);
        let ctx = chain(&[[3.0, -2.0]]);
        let scale = scale_for(&mut c, &ctx);
        assert!(scale.is_finite() && scale > 0.0);
        let dev = c.to_device(DVec2::new(3.0, -2.0));
        assert!((dev - DVec2::new(100.0, 100.0)).length() < 1e-6);
    }

    #[test]
    fn bare_chain_is_centred_with_padding() {
        let mut c = canvas(300, 300);
        let ctx = chain(&[[0.0, 0.0], [1.5, 0.0], [3.0, 0.0]]);
        let scale = scale_for(&mut c, &ctx);
        assert!((scale - 300.0 / 3.3).abs() < 1e-6);
        let mid = c.to_device(DVec2::new(1.5, 0.0));
        assert!((mid - DVec2::new(150.0, 150.0)).length() < 1e-6);
    }

    #[test]
    fn smaller_canvas_never_scales_up() {
        let ctx = chain(&[[0.0, 0.0], [1.5, 0.5], [3.0, 0.0], [4.5, 0.9]]);
        let mut last = f64::MAX;
        for size in [500, 400, 300, 200, 100] {
            let mut c = canvas(size, size);
            let scale = scale_for(&mut c, &ctx);
            assert!(scale <= last);
            last = scale;
        }
    }

    #[test]
    fn labels_widen_the_box() {
        let bare = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        let mut labelled = bare.clone();
        labelled.atom_syms[1] = AtomSymbol {
            text: "OH".into(),
            orient: OrientType::E,
        };
        let mut c = canvas(300, 300);
        let s_bare = scale_for(&mut c, &bare);
        let mut c = canvas(300, 300);
        let s_label = scale_for(&mut c, &labelled);
        assert!(s_label < s_bare);
        // The label now fits inside the panel.
        let (_, hi) = c.text.extremes("OH", TextLayout::Label(OrientType::E));
        let right = c.to_device(DVec2::new(1.5, 0.0)).x + hi.x;
        assert!(right <= 300.0 + 1e-6);
    }

    #[test]
    fn fixed_bond_length_is_a_ceiling() {
        let ctx = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        let mut c = canvas(300, 300);
        c.options.fixed_bond_length = 20.0;
        assert_eq!(scale_for(&mut c, &ctx), 20.0);
        let mut c = canvas(300, 300);
        c.options.fixed_bond_length = 10_000.0;
        assert!(scale_for(&mut c, &ctx) < 10_000.0);
        let mut c = canvas(300, 300);
        c.options.fixed_scale = 0.1;
        assert!((scale_for(&mut c, &ctx) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn fixed_scale_overrides_fixed_bond_length() {
        let ctx = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        let mut c = canvas(300, 300);
        c.options.fixed_bond_length = 20.0;
        c.options.fixed_scale = 0.1;
        assert!((scale_for(&mut c, &ctx) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn short_bonds_shrink_the_font() {
        let ctx = chain(&[[0.0, 0.0], [0.8, 0.0]]);
        let mut c = canvas(300, 300);
        scale_for(&mut c, &ctx);
        assert!((c.text.base_font_size() - 0.45).abs() < 1e-12);
        let ctx = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        scale_for(&mut c, &ctx);
        assert!((c.text.base_font_size() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn highlight_radius_grows_box() {
        let ctx = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        let mut radii = BTreeMap::new();
        let mut c = canvas(300, 300);
        let plain = c.fit(
            &FitRequest {
                ctx: &ctx,
                highlight_atoms: &[],
                radii: &radii,
            },
            300.0,
            300.0,
        );
        radii.insert(1, 1.0);
        let grown = c.fit(
            &FitRequest {
                ctx: &ctx,
                highlight_atoms: &[1],
                radii: &radii,
            },
            300.0,
            300.0,
        );
        assert!(grown.max().x > plain.max().x + 0.9);
    }

    #[test]
    fn grid_scale_covers_every_molecule() {
        let small = chain(&[[0.0, 0.0], [1.5, 0.0]]);
        let big = chain(&[[0.0, 0.0], [6.0, 0.0]]);
        let radii = BTreeMap::new();
        let mut c = Canvas::new(
            400,
            200,
            Some((200, 200)),
            RecordingBackend::new(),
            Box::new(FixedWidthMetrics::default()),
        )
        .unwrap();
        c.calculate_grid_scale(&[
            FitRequest {
                ctx: &small,
                highlight_atoms: &[],
                radii: &radii,
            },
            FitRequest {
                ctx: &big,
                highlight_atoms: &[],
                radii: &radii,
            },
        ]);
        assert!((c.scale() - 200.0 / 6.6).abs() < 1e-6);
        assert!(!c.needs_scale);
    }

    #[test]
    fn explicit_box() {
        let mut c = canvas(100, 100);
        c.options.padding = 0.0;
        c.set_explicit_scale(100.0, 100.0, DVec2::new(-1.0, -1.0), DVec2::new(1.0, 1.0), None);
        assert!((c.scale() - 50.0).abs() < 1e-9);
        assert!((c.to_device(DVec2::ZERO) - DVec2::new(50.0, 50.0)).length() < 1e-9);
        c.set_explicit_scale(100.0, 100.0, DVec2::ZERO, DVec2::ZERO, None);
        assert!((c.scale() - 100.0).abs() < 1e-9);
    }
}
