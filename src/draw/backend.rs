//! Primitive sink for the depiction engine.
//!
//! The engine works out every coordinate and hands finished device-space
//! primitives to a [`DrawBackend`]. Turning them into SVG, pixels or a
//! native canvas is the backend's business.

use glam::DVec2;
use petgraph::graph::NodeIndex;

use super::geometry::arc_points;
use super::options::DrawColour;

/// Stroke and fill state that accompanies each primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub colour: DrawColour,
    /// Device line width.
    pub line_width: f64,
    /// Alternating dash/gap lengths; empty is a solid line.
    pub dash: Vec<f64>,
    pub fill: bool,
    /// Atoms the primitive belongs to, for hit-testing.
    pub active_atoms: (Option<NodeIndex>, Option<NodeIndex>),
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            colour: DrawColour::BLACK,
            line_width: 2.0,
            dash: Vec::new(),
            fill: true,
            active_atoms: (None, None),
        }
    }
}

pub trait DrawBackend {
    fn draw_line(&mut self, p1: DVec2, p2: DVec2, pen: &Pen);

    fn draw_polygon(&mut self, points: &[DVec2], pen: &Pen);

    /// Axis-aligned ellipse inside the box with corners `p1` and `p2`.
    fn draw_ellipse(&mut self, p1: DVec2, p2: DVec2, pen: &Pen) {
        let centre = (p1 + p2) * 0.5;
        let radii = (p2 - p1).abs() * 0.5;
        let pts = arc_points(centre, radii.x, radii.y, 0.0, 360.0);
        self.draw_polygon(&pts, pen);
    }

    /// Zig-zag from `p1` to `p2` with `n_segments` teeth of height
    /// `vert_offset`.
    fn draw_wavy_line(
        &mut self,
        p1: DVec2,
        p2: DVec2,
        n_segments: usize,
        vert_offset: f64,
        pen: &Pen,
    ) {
        let pts = wavy_points(p1, p2, n_segments, vert_offset);
        for pair in pts.windows(2) {
            self.draw_line(pair[0], pair[1], pen);
        }
    }

    /// One glyph run with its centre at `pos`.
    fn draw_text(&mut self, text: &str, pos: DVec2, font_size: f64, colour: DrawColour);

    fn clear(&mut self, colour: DrawColour);

    /// Whether notes, data labels and link-node labels can be drawn.
    fn supports_annotations(&self) -> bool {
        true
    }
}

/// Zig-zag vertices, alternating sides of the `p1 -> p2` axis.
pub fn wavy_points(p1: DVec2, p2: DVec2, n_segments: usize, vert_offset: f64) -> Vec<DVec2> {
    let n = n_segments.max(1);
    let step = (p2 - p1) / n as f64;
    let perp = step.perp().normalize_or_zero() * vert_offset;
    let mut pts = Vec::with_capacity(n + 1);
    pts.push(p1);
    for i in 1..n {
        let side = if i % 2 == 1 { perp } else { -perp };
        pts.push(p1 + step * i as f64 + side);
    }
    pts.push(p2);
    pts
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: DVec2,
        to: DVec2,
        pen: Pen,
    },
    Polygon {
        points: Vec<DVec2>,
        pen: Pen,
    },
    Ellipse {
        corner1: DVec2,
        corner2: DVec2,
        pen: Pen,
    },
    WavyLine {
        from: DVec2,
        to: DVec2,
        n_segments: usize,
        vert_offset: f64,
        pen: Pen,
    },
    Text {
        text: String,
        pos: DVec2,
        font_size: f64,
        colour: DrawColour,
    },
    Clear(DrawColour),
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Line { .. } => "line",
            Primitive::Polygon { .. } => "polygon",
            Primitive::Ellipse { .. } => "ellipse",
            Primitive::WavyLine { .. } => "wavy_line",
            Primitive::Text { .. } => "text",
            Primitive::Clear(_) => "clear",
        }
    }
}

/// Backend that keeps every primitive in call order.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    primitives: Vec<Primitive>,
    annotations: bool,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            primitives: Vec::new(),
            annotations: true,
        }
    }

    /// A backend that reports it cannot draw annotations.
    pub fn without_annotations() -> Self {
        Self {
            primitives: Vec::new(),
            annotations: false,
        }
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn into_primitives(self) -> Vec<Primitive> {
        self.primitives
    }

    pub fn lines(&self) -> impl Iterator<Item = (DVec2, DVec2, &Pen)> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Line { from, to, pen } => Some((*from, *to, pen)),
            _ => None,
        })
    }

    pub fn polygons(&self) -> impl Iterator<Item = (&[DVec2], &Pen)> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Polygon { points, pen } => Some((points.as_slice(), pen)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = (&str, DVec2)> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, pos, .. } => Some((text.as_str(), *pos)),
            _ => None,
        })
    }

    /// Number of primitives of each kind, keyed by [`Primitive::kind`].
    pub fn kind_counts(&self) -> std::collections::BTreeMap<&'static str, usize> {
        let mut counts = std::collections::BTreeMap::new();
        for p in &self.primitives {
            *counts.entry(p.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn clear_record(&mut self) {
        self.primitives.clear();
    }
}

impl DrawBackend for RecordingBackend {
    fn draw_line(&mut self, p1: DVec2, p2: DVec2, pen: &Pen) {
        self.primitives.push(Primitive::Line {
            from: p1,
            to: p2,
            pen: pen.clone(),
        });
    }

    fn draw_polygon(&mut self, points: &[DVec2], pen: &Pen) {
        self.primitives.push(Primitive::Polygon {
            points: points.to_vec(),
            pen: pen.clone(),
        });
    }

    fn draw_ellipse(&mut self, p1: DVec2, p2: DVec2, pen: &Pen) {
        self.primitives.push(Primitive::Ellipse {
            corner1: p1,
            corner2: p2,
            pen: pen.clone(),
        });
    }

    fn draw_wavy_line(
        &mut self,
        p1: DVec2,
        p2: DVec2,
        n_segments: usize,
        vert_offset: f64,
        pen: &Pen,
    ) {
        self.primitives.push(Primitive::WavyLine {
            from: p1,
            to: p2,
            n_segments,
            vert_offset,
            pen: pen.clone(),
        });
    }

    fn draw_text(&mut self, text: &str, pos: DVec2, font_size: f64, colour: DrawColour) {
        self.primitives.push(Primitive::Text {
            text: text.to_owned(),
            pos,
            font_size,
            colour,
        });
    }

    fn clear(&mut self, colour: DrawColour) {
        self.primitives.push(Primitive::Clear(colour));
    }

    fn supports_annotations(&self) -> bool {
        self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Backend relying on the provided trait methods.
    #[derive(Default)]
    struct LinesOnly {
        lines: usize,
        polygons: Vec<usize>,
    }

    impl DrawBackend for LinesOnly {
        fn draw_line(&mut self, _: DVec2, _: DVec2, _: &Pen) {
            self.lines += 1;
        }
        fn draw_polygon(&mut self, points: &[DVec2], _: &Pen) {
            self.polygons.push(points.len());
        }
        fn draw_text(&mut self, _: &str, _: DVec2, _: f64, _: DrawColour) {}
        fn clear(&mut self, _: DrawColour) {}
    }

    #[test]
    fn default_wavy_line_is_zig_zag() {
        let mut b = LinesOnly::default();
        b.draw_wavy_line(DVec2::ZERO, DVec2::new(10.0, 0.0), 4, 1.0, &Pen::default());
        assert_eq!(b.lines, 4);
        let pts = wavy_points(DVec2::ZERO, DVec2::new(10.0, 0.0), 4, 1.0);
        assert_eq!(pts.len(), 5);
        assert!(pts[1].y * pts[2].y < 0.0);
        assert_eq!(pts[4], DVec2::new(10.0, 0.0));
    }

    #[test]
    fn default_ellipse_is_polygon() {
        let mut b = LinesOnly::default();
        b.draw_ellipse(DVec2::ZERO, DVec2::new(4.0, 2.0), &Pen::default());
        assert_eq!(b.polygons, vec![74]);
        assert!(b.supports_annotations());
    }

    #[test]
    fn recorder_counts_kinds() {
        let mut b = RecordingBackend::new();
        let pen = Pen::default();
        b.draw_line(DVec2::ZERO, DVec2::ONE, &pen);
        b.draw_line(DVec2::ONE, DVec2::ZERO, &pen);
        b.draw_text("N", DVec2::ZERO, 12.0, DrawColour::BLACK);
        let counts = b.kind_counts();
        assert_eq!(counts["line"], 2);
        assert_eq!(counts["text"], 1);
        assert_eq!(b.lines().count(), 2);
        assert!(!RecordingBackend::without_annotations().supports_annotations());
    }
}
