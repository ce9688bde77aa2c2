//! String layout for labels, notes and legends.
//!
//! Glyph sizes come from a [`TextMeasure`]; this module turns a marked-up
//! string into one rectangle per glyph, relative to the point the string is
//! anchored on. The rectangles drive clash tests as well as drawing.
//!
//! Markup: `<sub>..</sub>`, `<sup>..</sup>` and `<lit>..</lit>`. A literal
//! string is laid out as written; anything else is split into pieces at each
//! element symbol so that west-facing labels can be reversed (`OH` becomes
//! `HO`) and north/south ones stacked.

use std::fmt;

use glam::DVec2;

use super::geometry::lines_intersect;
use super::options::DrawColour;

/// Side of the atom a label grows towards. `C` is centred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientType {
    #[default]
    C,
    N,
    E,
    S,
    W,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Text starts at the anchor.
    Start,
    #[default]
    Middle,
    /// Text ends at the anchor.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDrawType {
    Normal,
    Subscript,
    Superscript,
}

/// How a string is positioned around its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayout {
    /// Atom label: the element symbol sits on the anchor.
    Label(OrientType),
    /// Plain text, aligned horizontally on the anchor.
    Aligned(TextAlign),
}

/// Text metrics collaborator.
pub trait TextMeasure {
    /// Device width and height of `c` at `font_size`.
    fn glyph_size(&self, c: char, font_size: f64) -> DVec2;
}

/// Every glyph is the same box: `width_factor * font_size` wide and
/// `height_factor * font_size` tall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMetrics {
    pub width_factor: f64,
    pub height_factor: f64,
}

impl Default for FixedWidthMetrics {
    fn default() -> Self {
        Self {
            width_factor: 0.6,
            height_factor: 0.8,
        }
    }
}

impl TextMeasure for FixedWidthMetrics {
    fn glyph_size(&self, _c: char, font_size: f64) -> DVec2 {
        DVec2::new(self.width_factor * font_size, self.height_factor * font_size)
    }
}

/// Axis-aligned text box. `trans` is its centre relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StringRect {
    pub trans: DVec2,
    pub width: f64,
    pub height: f64,
}

impl StringRect {
    pub fn new(trans: DVec2, width: f64, height: f64) -> Self {
        Self {
            trans,
            width,
            height,
        }
    }

    pub fn centre(&self, origin: DVec2) -> DVec2 {
        origin + self.trans
    }

    /// Corners, padded, clockwise from top left.
    pub fn corners(&self, origin: DVec2, padding: f64) -> [DVec2; 4] {
        let c = self.centre(origin);
        let wb2 = 0.5 * self.width + padding;
        let hb2 = 0.5 * self.height + padding;
        [
            DVec2::new(c.x - wb2, c.y + hb2),
            DVec2::new(c.x + wb2, c.y + hb2),
            DVec2::new(c.x + wb2, c.y - hb2),
            DVec2::new(c.x - wb2, c.y - hb2),
        ]
    }

    pub fn contains(&self, origin: DVec2, p: DVec2, padding: f64) -> bool {
        let c = self.centre(origin);
        (p.x - c.x).abs() <= 0.5 * self.width + padding
            && (p.y - c.y).abs() <= 0.5 * self.height + padding
    }

    /// Overlap test; rectangles that only touch do not intersect.
    pub fn intersects(&self, origin: DVec2, other: &StringRect, other_origin: DVec2, padding: f64) -> bool {
        let c1 = self.centre(origin);
        let c2 = other.centre(other_origin);
        (c1.x - c2.x).abs() * 2.0 < self.width + other.width + 2.0 * padding
            && (c1.y - c2.y).abs() * 2.0 < self.height + other.height + 2.0 * padding
    }

    /// True if the segment crosses the padded rectangle or lies inside it.
    pub fn intersects_line(&self, origin: DVec2, l1: DVec2, l2: DVec2, padding: f64) -> bool {
        if self.contains(origin, l1, padding) && self.contains(origin, l2, padding) {
            return true;
        }
        let [tl, tr, br, bl] = self.corners(origin, padding);
        [(tl, tr), (tr, br), (br, bl), (bl, tl)]
            .iter()
            .any(|&(a, b)| lines_intersect(a, b, l1, l2).is_some())
    }
}

/// A positioned glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub rect: StringRect,
    pub draw_type: TextDrawType,
    pub font_size: f64,
}

const SUB_SUPER_SCALE: f64 = 0.66;
const SUB_SUPER_SHIFT: f64 = 0.35;

pub struct TextDrawer {
    measure: Box<dyn TextMeasure>,
    font_scale: f64,
    base_font_size: f64,
    min_font_size: f64,
    max_font_size: f64,
    colour: DrawColour,
}

impl fmt::Debug for TextDrawer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextDrawer")
            .field("font_scale", &self.font_scale)
            .field("base_font_size", &self.base_font_size)
            .field("min_font_size", &self.min_font_size)
            .field("max_font_size", &self.max_font_size)
            .finish()
    }
}

impl TextDrawer {
    pub fn new(measure: Box<dyn TextMeasure>) -> Self {
        Self {
            measure,
            font_scale: 1.0,
            base_font_size: 0.6,
            min_font_size: 6.0,
            max_font_size: 40.0,
            colour: DrawColour::BLACK,
        }
    }

    pub fn set_limits(&mut self, base: f64, min: f64, max: f64) {
        self.base_font_size = base;
        self.min_font_size = min;
        self.max_font_size = max;
    }

    pub fn base_font_size(&self) -> f64 {
        self.base_font_size
    }

    pub fn set_base_font_size(&mut self, base: f64) {
        self.base_font_size = base;
    }

    pub fn font_scale(&self) -> f64 {
        self.font_scale
    }

    /// Font size follows the drawing scale, clamped to the size limits
    /// unless `ignore_limits` is set.
    pub fn set_font_scale(&mut self, scale: f64, ignore_limits: bool) {
        self.font_scale = scale;
        if ignore_limits {
            return;
        }
        let size = self.font_size();
        if size < self.min_font_size {
            self.font_scale = self.min_font_size / self.base_font_size;
        } else if size > self.max_font_size {
            self.font_scale = self.max_font_size / self.base_font_size;
        }
    }

    pub fn font_size(&self) -> f64 {
        self.font_scale * self.base_font_size
    }

    pub fn colour(&self) -> DrawColour {
        self.colour
    }

    pub fn set_colour(&mut self, colour: DrawColour) {
        self.colour = colour;
    }

    /// Gap kept between a label and anything clashing with it.
    pub fn padding(&self) -> f64 {
        0.1 * self.font_size()
    }

    pub fn glyphs(&self, text: &str, layout: TextLayout) -> Vec<Glyph> {
        let (chars, literal) = parse_markup(text);
        if chars.is_empty() {
            return Vec::new();
        }
        let line_height = self.measure.glyph_size('M', self.font_size()).y;
        match layout {
            TextLayout::Aligned(align) => {
                let mut line = self.layout_line(&chars);
                let (lo, hi) = x_span(&line);
                let shift = match align {
                    TextAlign::Start => -lo,
                    TextAlign::Middle => -0.5 * (lo + hi),
                    TextAlign::End => -hi,
                };
                shift_x(&mut line, shift);
                line
            }
            TextLayout::Label(orient) => {
                let mut pieces = if literal {
                    vec![chars]
                } else {
                    split_pieces(&chars)
                };
                match orient {
                    OrientType::N | OrientType::S => {
                        let mut glyphs = Vec::new();
                        let dir = if orient == OrientType::N { -1.0 } else { 1.0 };
                        for (i, piece) in pieces.iter().enumerate() {
                            let mut line = self.layout_line(piece);
                            let shift = if i == 0 {
                                anchor_shift(&line, piece, literal, OrientType::C)
                            } else {
                                let (lo, hi) = x_span(&line);
                                -0.5 * (lo + hi)
                            };
                            shift_x(&mut line, shift);
                            for g in &mut line {
                                g.rect.trans.y += dir * i as f64 * line_height;
                            }
                            glyphs.extend(line);
                        }
                        glyphs
                    }
                    OrientType::W if !literal => {
                        // The element symbol is the last piece once reversed.
                        pieces.reverse();
                        let last = pieces.len() - 1;
                        let flat: Vec<(char, TextDrawType)> = pieces.concat();
                        let mut line = self.layout_line(&flat);
                        let before: usize = pieces[..last].iter().map(Vec::len).sum();
                        let shift = match element_glyph(&pieces[last]) {
                            Some(k) => -line[before + k].rect.trans.x,
                            None => -x_span(&line).1,
                        };
                        shift_x(&mut line, shift);
                        line
                    }
                    _ => {
                        let flat: Vec<(char, TextDrawType)> = pieces.concat();
                        let mut line = self.layout_line(&flat);
                        let shift = anchor_shift(&line, &pieces[0], literal, orient);
                        shift_x(&mut line, shift);
                        line
                    }
                }
            }
        }
    }

    pub fn rects(&self, text: &str, layout: TextLayout) -> Vec<StringRect> {
        self.glyphs(text, layout).into_iter().map(|g| g.rect).collect()
    }

    /// Bounding box of the laid out string relative to its anchor, as
    /// (min, max). Empty text gives a zero box.
    pub fn extremes(&self, text: &str, layout: TextLayout) -> (DVec2, DVec2) {
        rect_extremes(&self.rects(text, layout))
    }

    /// Where the bond from `nbr` to a labelled atom at `cds` should stop so
    /// that it does not run into the label. Device coordinates.
    pub fn adjust_line_for_string(
        &self,
        label: &str,
        orient: OrientType,
        nbr: DVec2,
        cds: DVec2,
    ) -> DVec2 {
        let padding = self.padding();
        let mut best = cds;
        let mut best_dist = f64::MAX;
        for rect in self.rects(label, TextLayout::Label(orient)) {
            let [tl, tr, br, bl] = rect.corners(cds, padding);
            for (a, b) in [(tl, tr), (tr, br), (br, bl), (bl, tl)] {
                if let Some(ip) = lines_intersect(nbr, cds, a, b) {
                    let d = (ip - nbr).length_squared();
                    if d < best_dist {
                        best_dist = d;
                        best = ip;
                    }
                }
            }
        }
        best
    }
}

/// Union bounding box of a set of rects, as (min, max).
pub fn rect_extremes(rects: &[StringRect]) -> (DVec2, DVec2) {
    if rects.is_empty() {
        return (DVec2::ZERO, DVec2::ZERO);
    }
    let mut lo = DVec2::splat(f64::MAX);
    let mut hi = DVec2::splat(f64::MIN);
    for r in rects {
        let half = DVec2::new(0.5 * r.width, 0.5 * r.height);
        lo = lo.min(r.trans - half);
        hi = hi.max(r.trans + half);
    }
    (lo, hi)
}

pub fn rects_intersect(
    rects1: &[StringRect],
    origin1: DVec2,
    rects2: &[StringRect],
    origin2: DVec2,
    padding: f64,
) -> bool {
    rects1
        .iter()
        .any(|r1| rects2.iter().any(|r2| r1.intersects(origin1, r2, origin2, padding)))
}

pub fn line_intersects_rects(
    rects: &[StringRect],
    origin: DVec2,
    l1: DVec2,
    l2: DVec2,
    padding: f64,
) -> bool {
    rects.iter().any(|r| r.intersects_line(origin, l1, l2, padding))
}

impl TextDrawer {
    fn layout_line(&self, chars: &[(char, TextDrawType)]) -> Vec<Glyph> {
        let fs = self.font_size();
        let normal_height = self.measure.glyph_size('M', fs).y;
        let mut cursor = 0.0;
        chars
            .iter()
            .map(|&(ch, draw_type)| {
                let (size_fs, dy) = match draw_type {
                    TextDrawType::Normal => (fs, 0.0),
                    TextDrawType::Subscript => {
                        (fs * SUB_SUPER_SCALE, SUB_SUPER_SHIFT * normal_height)
                    }
                    TextDrawType::Superscript => {
                        (fs * SUB_SUPER_SCALE, -SUB_SUPER_SHIFT * normal_height)
                    }
                };
                let size = self.measure.glyph_size(ch, size_fs);
                let rect = StringRect::new(DVec2::new(cursor + 0.5 * size.x, dy), size.x, size.y);
                cursor += size.x;
                Glyph {
                    ch,
                    rect,
                    draw_type,
                    font_size: size_fs,
                }
            })
            .collect()
    }
}

fn x_span(line: &[Glyph]) -> (f64, f64) {
    let (lo, hi) = rect_extremes(&line.iter().map(|g| g.rect).collect::<Vec<_>>());
    (lo.x, hi.x)
}

fn shift_x(line: &mut [Glyph], dx: f64) {
    for g in line {
        g.rect.trans.x += dx;
    }
}

/// Shift that puts the element symbol of `first_piece` on the anchor.
/// Strings without one are centred, or pinned at the end facing the atom.
fn anchor_shift(
    line: &[Glyph],
    first_piece: &[(char, TextDrawType)],
    literal: bool,
    orient: OrientType,
) -> f64 {
    if !literal {
        if let Some(k) = element_glyph(first_piece) {
            return -line[k].rect.trans.x;
        }
    }
    let (lo, hi) = x_span(line);
    match orient {
        OrientType::E => -(lo + 0.5 * line.first().map_or(0.0, |g| g.rect.width)),
        OrientType::W => -(hi - 0.5 * line.last().map_or(0.0, |g| g.rect.width)),
        _ => -0.5 * (lo + hi),
    }
}

fn element_glyph(piece: &[(char, TextDrawType)]) -> Option<usize> {
    piece
        .iter()
        .position(|&(c, t)| t == TextDrawType::Normal && c.is_ascii_uppercase())
}

/// Split into pieces, each holding one element symbol and what follows it.
fn split_pieces(chars: &[(char, TextDrawType)]) -> Vec<Vec<(char, TextDrawType)>> {
    let mut pieces: Vec<Vec<(char, TextDrawType)>> = Vec::new();
    let mut current: Vec<(char, TextDrawType)> = Vec::new();
    let mut has_element = false;
    for &(c, t) in chars {
        let starts_element = t == TextDrawType::Normal && c.is_ascii_uppercase();
        if starts_element && has_element {
            pieces.push(std::mem::take(&mut current));
            has_element = false;
        }
        has_element |= starts_element;
        current.push((c, t));
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Strip markup, returning each character with its draw type and whether
/// the string was marked literal.
pub fn parse_markup(text: &str) -> (Vec<(char, TextDrawType)>, bool) {
    let mut out = Vec::new();
    let mut literal = false;
    let mut draw_type = TextDrawType::Normal;
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let tag = ["<sub>", "</sub>", "<sup>", "</sup>", "<lit>", "</lit>"]
                .into_iter()
                .find(|t| rest.starts_with(t));
            if let Some(tag) = tag {
                match tag {
                    "<sub>" => draw_type = TextDrawType::Subscript,
                    "<sup>" => draw_type = TextDrawType::Superscript,
                    "<lit>" => literal = true,
                    "</sub>" | "</sup>" => draw_type = TextDrawType::Normal,
                    _ => {}
                }
                rest = &rest[tag.len()..];
                continue;
            }
        }
        out.push((c, draw_type));
        rest = &rest[c.len_utf8()..];
    }
    (out, literal)
}
