//! Drawing surface shared by every molecule on one canvas.
//!
//! The canvas owns the backend, the viewport, the text engine and the
//! current pen. Drawing calls take molecule-space points and emit
//! device-space primitives.

use glam::DVec2;
use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::backend::{DrawBackend, Pen};
use super::options::{DrawColour, DrawOptions};
use super::shapes::hand_drawn_line;
use super::text::{TextDrawer, TextLayout, TextMeasure};
use super::viewport::Viewport;
use crate::error::DrawError;

/// Seed for the comic-mode line jitter; fixed so that drawings repeat.
const COMIC_SEED: u64 = 0x5eed_c0de;

#[derive(Debug)]
pub struct Canvas<B> {
    pub(crate) backend: B,
    pub(crate) options: DrawOptions,
    pub(crate) text: TextDrawer,
    pub(crate) vp: Viewport,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) panel_width: u32,
    pub(crate) panel_height: u32,
    /// The next outermost molecule recomputes the scale.
    pub(crate) needs_scale: bool,
    pub(crate) background_cleared: bool,
    colour: DrawColour,
    line_width: f64,
    dash: Vec<f64>,
    fill: bool,
    active_atoms: (Option<NodeIndex>, Option<NodeIndex>),
    scale_line_width: bool,
    rng: StdRng,
}

impl<B: DrawBackend> Canvas<B> {
    pub fn new(
        width: u32,
        height: u32,
        panel: Option<(u32, u32)>,
        backend: B,
        measure: Box<dyn TextMeasure>,
    ) -> Result<Self, DrawError> {
        let (panel_width, panel_height) = panel.unwrap_or((width, height));
        if width == 0 || height == 0 {
            return Err(DrawError::InvalidDimensions { width, height });
        }
        if panel_width == 0 || panel_height == 0 {
            return Err(DrawError::InvalidDimensions {
                width: panel_width,
                height: panel_height,
            });
        }
        let options = DrawOptions::default();
        let mut text = TextDrawer::new(measure);
        text.set_limits(
            options.base_font_size,
            options.min_font_size,
            options.max_font_size,
        );
        Ok(Self {
            backend,
            text,
            vp: Viewport::new(f64::from(panel_height)),
            width,
            height,
            panel_width,
            panel_height,
            needs_scale: true,
            background_cleared: false,
            colour: DrawColour::BLACK,
            line_width: options.bond_line_width,
            dash: Vec::new(),
            fill: true,
            active_atoms: (None, None),
            scale_line_width: options.scale_bond_width,
            rng: StdRng::seed_from_u64(COMIC_SEED),
            options,
        })
    }

    /// Re-read the options that the canvas caches.
    pub fn sync_options(&mut self) {
        self.text.set_limits(
            self.options.base_font_size,
            self.options.min_font_size,
            self.options.max_font_size,
        );
        self.line_width = self.options.bond_line_width;
        self.scale_line_width = self.options.scale_bond_width;
    }

    pub fn scale(&self) -> f64 {
        self.vp.scale
    }

    pub fn to_device(&self, p: DVec2) -> DVec2 {
        self.vp.to_device(p)
    }

    pub fn to_molecule(&self, q: DVec2) -> DVec2 {
        self.vp.to_molecule(q)
    }

    pub fn colour(&self) -> DrawColour {
        self.colour
    }

    pub fn set_colour(&mut self, colour: DrawColour) {
        self.colour = colour;
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    pub fn set_dash(&mut self, dash: &[f64]) {
        self.dash = dash.to_vec();
    }

    pub fn clear_dash(&mut self) {
        self.dash.clear();
    }

    pub fn fill_polys(&self) -> bool {
        self.fill
    }

    pub fn set_fill_polys(&mut self, fill: bool) {
        self.fill = fill;
    }

    pub fn set_active_atoms(&mut self, a1: Option<NodeIndex>, a2: Option<NodeIndex>) {
        self.active_atoms = (a1, a2);
    }

    pub fn clear_active_atoms(&mut self) {
        self.active_atoms = (None, None);
    }

    /// Switch whether line widths grow with the scale; returns the old
    /// setting.
    pub fn set_scale_line_width(&mut self, scale: bool) -> bool {
        std::mem::replace(&mut self.scale_line_width, scale)
    }

    /// Device width of the current line.
    pub fn draw_line_width(&self) -> f64 {
        if self.scale_line_width {
            (self.line_width * self.vp.scale * 0.02).max(0.0)
        } else {
            self.line_width
        }
    }

    pub fn pen(&self) -> Pen {
        Pen {
            colour: self.colour,
            line_width: self.draw_line_width(),
            dash: self.dash.clone(),
            fill: self.fill,
            active_atoms: self.active_atoms,
        }
    }

    pub fn reseed(&mut self) {
        self.rng = StdRng::seed_from_u64(COMIC_SEED);
    }

    pub fn clear_drawing(&mut self) {
        if self.options.clear_background {
            self.backend.clear(self.options.background_colour);
        }
        self.background_cleared = true;
    }

    /// Straight line in the current colour.
    pub fn draw_line(&mut self, cds1: DVec2, cds2: DVec2) {
        if self.options.comic_mode {
            let scale = self.vp.scale;
            let pts = hand_drawn_line(cds1, cds2, scale, true, true, &mut self.rng);
            let fill = std::mem::replace(&mut self.fill, false);
            self.draw_polygon(&pts);
            self.fill = fill;
        } else {
            let pen = self.pen();
            let (p1, p2) = (self.to_device(cds1), self.to_device(cds2));
            self.backend.draw_line(p1, p2, &pen);
        }
    }

    /// Line split at its midpoint when the end colours differ.
    pub fn draw_line_coloured(
        &mut self,
        cds1: DVec2,
        cds2: DVec2,
        col1: DrawColour,
        col2: DrawColour,
    ) {
        if col1 == col2 {
            self.set_colour(col1);
            self.draw_line(cds1, cds2);
        } else {
            let mid = (cds1 + cds2) * 0.5;
            self.set_colour(col1);
            self.draw_line(cds1, mid);
            self.set_colour(col2);
            self.draw_line(mid, cds2);
        }
    }

    pub fn draw_polygon(&mut self, cds: &[DVec2]) {
        if cds.len() < 2 {
            return;
        }
        let pen = self.pen();
        let pts: Vec<DVec2> = cds.iter().map(|&p| self.to_device(p)).collect();
        self.backend.draw_polygon(&pts, &pen);
    }

    pub fn draw_triangle(&mut self, cds1: DVec2, cds2: DVec2, cds3: DVec2) {
        if self.options.comic_mode {
            let scale = self.vp.scale;
            let mut pts = hand_drawn_line(cds1, cds2, scale, false, false, &mut self.rng);
            pts.extend(hand_drawn_line(cds2, cds3, scale, false, false, &mut self.rng));
            pts.extend(hand_drawn_line(cds3, cds1, scale, false, false, &mut self.rng));
            self.draw_polygon(&pts);
        } else {
            self.draw_polygon(&[cds1, cds2, cds3]);
        }
    }

    /// Draw a string anchored on molecule point `cds`, in the text
    /// engine's colour.
    pub fn draw_string(&mut self, text: &str, cds: DVec2, layout: TextLayout) {
        let origin = self.to_device(cds);
        self.draw_string_device(text, origin, layout);
    }

    pub fn draw_string_device(&mut self, text: &str, origin: DVec2, layout: TextLayout) {
        let colour = self.text.colour();
        for glyph in self.text.glyphs(text, layout) {
            let mut buf = [0u8; 4];
            let s = glyph.ch.encode_utf8(&mut buf);
            self.backend
                .draw_text(s, origin + glyph.rect.trans, glyph.font_size, colour);
        }
    }

    /// Top-left corner of panel `i` in a grid of panels.
    pub fn panel_offset(&self, i: usize) -> (f64, f64) {
        let n_cols = (self.width / self.panel_width) as usize;
        let n_rows = (self.height / self.panel_height) as usize;
        let row = if n_rows > 1 && n_cols > 0 { i / n_cols } else { 0 };
        let col = if n_cols > 1 { i % n_cols } else { 0 };
        (
            (col as u32 * self.panel_width) as f64,
            (row as u32 * self.panel_height) as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::backend::{Primitive, RecordingBackend};
    use crate::draw::text::{FixedWidthMetrics, TextAlign};

    fn canvas(w: u32, h: u32, panel: Option<(u32, u32)>) -> Canvas<RecordingBackend> {
        Canvas::new(
            w,
            h,
            panel,
            RecordingBackend::new(),
            Box::new(FixedWidthMetrics::default()),
        )
        .unwrap()
    }

    #[test]
    fn zero_sizes_rejected() {
        let r = Canvas::new(
            0,
            100,
            None,
            RecordingBackend::new(),
            Box::new(FixedWidthMetrics::default()),
        );
        assert!(matches!(r, Err(DrawError::InvalidDimensions { .. })));
        let r = Canvas::new(
            100,
            100,
            Some((0, 50)),
            RecordingBackend::new(),
            Box::new(FixedWidthMetrics::default()),
        );
        assert!(matches!(r, Err(DrawError::InvalidDimensions { .. })));
    }

    #[test]
    fn split_line_when_colours_differ() {
        let mut c = canvas(100, 100, None);
        c.draw_line_coloured(DVec2::ZERO, DVec2::new(1.0, 0.0), DrawColour::BLACK, DrawColour::BLACK);
        assert_eq!(c.backend.lines().count(), 1);
        c.backend.clear_record();
        c.draw_line_coloured(DVec2::ZERO, DVec2::new(1.0, 0.0), DrawColour::BLACK, DrawColour::RED);
        let lines: Vec<_> = c.backend.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].1, lines[1].0);
        assert_eq!(lines[1].2.colour, DrawColour::RED);
    }

    #[test]
    fn comic_lines_are_unfilled_polylines_and_repeat() {
        let mut c = canvas(100, 100, None);
        c.options.comic_mode = true;
        c.vp.scale = 50.0;
        c.draw_line(DVec2::ZERO, DVec2::new(1.5, 0.0));
        c.reseed();
        c.draw_line(DVec2::ZERO, DVec2::new(1.5, 0.0));
        let prims = c.backend.primitives();
        assert_eq!(prims.len(), 2);
        assert_eq!(prims[0], prims[1]);
        match &prims[0] {
            Primitive::Polygon { points, pen } => {
                assert!(points.len() > 2);
                assert!(!pen.fill);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn line_width_scaling() {
        let mut c = canvas(100, 100, None);
        c.vp.scale = 100.0;
        assert_eq!(c.draw_line_width(), 2.0);
        let old = c.set_scale_line_width(true);
        assert!(!old);
        assert!((c.draw_line_width() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn grid_offsets() {
        let c = canvas(600, 400, Some((200, 200)));
        assert_eq!(c.panel_offset(0), (0.0, 0.0));
        assert_eq!(c.panel_offset(2), (400.0, 0.0));
        assert_eq!(c.panel_offset(4), (200.0, 200.0));
        let single_row = canvas(600, 200, Some((200, 200)));
        assert_eq!(single_row.panel_offset(1), (200.0, 0.0));
    }

    #[test]
    fn string_emits_one_text_per_glyph() {
        let mut c = canvas(100, 100, None);
        c.text.set_font_scale(20.0, false);
        c.draw_string("CH<sub>3</sub>", DVec2::ZERO, TextLayout::Aligned(TextAlign::Middle));
        let texts: Vec<_> = c.backend.texts().map(|(t, _)| t.to_owned()).collect();
        assert_eq!(texts, vec!["C", "H", "3"]);
    }
}
