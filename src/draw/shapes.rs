//! Shapes built from the basic line and polygon calls: arcs, ellipses,
//! arrows, wavy lines and substance-group brackets.

use glam::DVec2;
use rand::Rng;

use super::backend::DrawBackend;
use super::canvas::Canvas;
use super::context::{DrawShape, ShapeKind};
use super::geometry::{arc_points, lines_intersect, perpendicular, Segment};
use super::options::DrawColour;

/// Default wavy-line tooth count and height (molecule units).
pub const WAVY_SEGMENTS: usize = 16;
pub const WAVY_OFFSET: f64 = 0.05;

impl<B: DrawBackend> Canvas<B> {
    /// Elliptical arc between two angles in degrees, anticlockwise. A
    /// filled arc is closed through the centre.
    pub fn draw_arc(&mut self, centre: DVec2, xradius: f64, yradius: f64, ang1: f64, ang2: f64) {
        let ang2 = if ang2 < ang1 { ang2 + 360.0 } else { ang2 };
        let mut pts = arc_points(centre, xradius, yradius, ang1, ang2);
        if self.fill_polys() {
            pts.push(centre);
        }
        self.draw_polygon(&pts);
    }

    /// Ellipse inside the box with corners `cds1` and `cds2`.
    pub fn draw_ellipse(&mut self, cds1: DVec2, cds2: DVec2) {
        let pen = self.pen();
        let (p1, p2) = (self.to_device(cds1), self.to_device(cds2));
        self.backend.draw_ellipse(p1, p2, &pen);
    }

    pub fn draw_rect(&mut self, cds1: DVec2, cds2: DVec2) {
        let mut pts = vec![
            cds1,
            DVec2::new(cds2.x, cds1.y),
            cds2,
            DVec2::new(cds1.x, cds2.y),
        ];
        if !self.fill_polys() {
            pts.push(cds1);
        }
        self.draw_polygon(&pts);
    }

    /// Line from `begin` to `end` with a head at `end`. `frac` is the head
    /// length as a fraction of the arrow, `angle` the half-angle in radians.
    pub fn draw_arrow(&mut self, begin: DVec2, end: DVec2, as_polygon: bool, frac: f64, angle: f64) {
        let delta = begin - end;
        let (sin, cos) = angle.sin_cos();
        let p1 = end
            + DVec2::new(delta.x * cos + delta.y * sin, delta.y * cos - delta.x * sin) * frac;
        let p2 = end
            + DVec2::new(delta.x * cos - delta.y * sin, delta.y * cos + delta.x * sin) * frac;
        self.draw_line(begin, end);
        if as_polygon {
            let fill = self.fill_polys();
            self.set_fill_polys(true);
            self.draw_polygon(&[p1, end, p2]);
            self.set_fill_polys(fill);
        } else {
            self.draw_line(p1, end);
            self.draw_line(end, p2);
        }
    }

    /// Zig-zag in a single colour.
    pub fn draw_wavy_line(
        &mut self,
        cds1: DVec2,
        cds2: DVec2,
        colour: DrawColour,
        n_segments: usize,
        vert_offset: f64,
    ) {
        self.set_colour(colour);
        let pen = self.pen();
        let (p1, p2) = (self.to_device(cds1), self.to_device(cds2));
        let offset = vert_offset * self.scale();
        self.backend.draw_wavy_line(p1, p2, n_segments, offset, &pen);
    }

    /// Wavy line of length `len` across the end of `cds1 -> cds2`, marking
    /// an attachment point.
    pub fn draw_attachment_line(
        &mut self,
        cds1: DVec2,
        cds2: DVec2,
        colour: DrawColour,
        len: f64,
        n_segments: usize,
    ) {
        let perp = perpendicular(cds1, cds2);
        let p1 = cds2 + perp * (len / 2.0);
        let p2 = cds2 - perp * (len / 2.0);
        self.draw_wavy_line(p1, p2, colour, n_segments, WAVY_OFFSET);
    }

    pub fn draw_shapes(&mut self, shapes: &[DrawShape]) {
        for shape in shapes {
            self.set_colour(shape.colour);
            let line_width = self.line_width();
            self.set_line_width(shape.line_width);
            let fill = self.fill_polys();
            self.set_fill_polys(shape.fill);
            let scale_lw = self.set_scale_line_width(shape.scale_line_width);
            match shape.kind {
                ShapeKind::Polyline => {
                    if shape.fill && shape.points.len() > 2 {
                        self.draw_polygon(&shape.points);
                    } else {
                        for pair in shape.points.windows(2) {
                            self.draw_line(pair[0], pair[1]);
                        }
                    }
                }
                ShapeKind::Ellipse => {
                    if let [p1, p2, ..] = shape.points[..] {
                        self.draw_ellipse(p1, p2);
                    }
                }
            }
            self.set_scale_line_width(scale_lw);
            self.set_fill_polys(fill);
            self.set_line_width(line_width);
        }
    }
}

/// A line with small random wobbles, for comic mode. Roughly one wobble
/// per five device units; the ends can be pulled in a little so that
/// joined strokes do not overshoot.
pub fn hand_drawn_line<R: Rng>(
    cds1: DVec2,
    cds2: DVec2,
    scale: f64,
    shorten_start: bool,
    shorten_end: bool,
    rng: &mut R,
) -> Vec<DVec2> {
    let dir = cds2 - cds1;
    let len = dir.length();
    if len < 1.0e-6 || scale <= 0.0 {
        return vec![cds1, cds2];
    }
    let unit = dir / len;
    let trim = (0.02 * len).min(1.0 / scale);
    let start = if shorten_start { cds1 + unit * trim } else { cds1 };
    let end = if shorten_end { cds2 - unit * trim } else { cds2 };

    let n = ((len * scale / 5.0).round() as usize).clamp(2, 100);
    let perp = unit.perp();
    let jitter = 0.5 / scale;
    let mut pts = Vec::with_capacity(n + 1);
    pts.push(start);
    for i in 1..n {
        let t = i as f64 / n as f64;
        let wobble = rng.random_range(-1.0..=1.0) * jitter;
        pts.push(start + (end - start) * t + perp * wobble);
    }
    pts.push(end);
    pts
}

/// Bracket across `p1 -> p2` with hooks one tenth of its length long,
/// turned towards the inside of the group. A crossing bond (inner atom
/// first) decides which side is inside; otherwise `ref_pt` does.
pub fn bracket_points(p1: DVec2, p2: DVec2, ref_pt: DVec2, bond_segments: &[Segment]) -> Vec<DVec2> {
    let v = p2 - p1;
    let mut hook = DVec2::new(v.y, -v.x) * 0.1;
    let mut ref_vect = p2 - ref_pt;
    for &(inner, outer) in bond_segments {
        if lines_intersect(p1, p2, inner, outer).is_some() {
            ref_vect = p2 - inner;
        }
    }
    if hook.dot(ref_vect) > 0.0 {
        hook = -hook;
    }
    vec![p1 + hook, p1, p2, p2 + hook]
}
