use glam::DVec2;

use super::options::DrawColour;
use super::text::{OrientType, StringRect, TextAlign};
use crate::rings::RingInfo;
use crate::Molecule;

/// Label text for one atom. Empty text means the atom is drawn bare.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AtomSymbol {
    pub text: String,
    pub orient: OrientType,
}

impl AtomSymbol {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A placed note. Location and size are in molecule units; a negative
/// width means no position was found and the note is not drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub text: String,
    pub location: DVec2,
    pub width: f64,
    pub height: f64,
    pub align: TextAlign,
    /// Text follows the label font scale rather than staying at the
    /// annotation scale.
    pub scale_text: bool,
}

impl AnnotationRecord {
    pub fn unplaced(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            location: DVec2::ZERO,
            width: -1.0,
            height: -1.0,
            align: TextAlign::Middle,
            scale_text: true,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.width >= 0.0
    }
}

/// Where the dots for an atom's radical electrons go. `rect` is centred on
/// `rect.trans` in molecule space, sized in molecule units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadicalMark {
    pub atom: usize,
    pub rect: StringRect,
    pub orient: OrientType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Polyline,
    /// Axis-aligned ellipse given by two opposite corners.
    Ellipse,
}

/// Decoration drawn before or after the molecule itself: brackets,
/// variable attachment markers.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawShape {
    pub kind: ShapeKind,
    pub points: Vec<DVec2>,
    pub line_width: f64,
    pub colour: DrawColour,
    pub fill: bool,
    pub scale_line_width: bool,
}

impl DrawShape {
    pub fn polyline(points: Vec<DVec2>) -> Self {
        Self {
            kind: ShapeKind::Polyline,
            points,
            line_width: 2.0,
            colour: DrawColour::BLACK,
            fill: false,
            scale_line_width: false,
        }
    }
}

/// Everything derived from one molecule while it is being drawn, indexed
/// by atom.
#[derive(Debug, Clone, Default)]
pub struct DrawContext {
    /// Prepared working copy; the caller's molecule is never touched.
    pub mol: Molecule,
    pub conf_id: Option<usize>,
    pub at_cds: Vec<DVec2>,
    /// Atomic number per atom; complex query atoms count as 0.
    pub atomic_nums: Vec<i32>,
    pub atom_syms: Vec<AtomSymbol>,
    pub annotations: Vec<AnnotationRecord>,
    pub pre_shapes: Vec<DrawShape>,
    pub post_shapes: Vec<DrawShape>,
    pub radicals: Vec<RadicalMark>,
    pub rings: RingInfo,
}

impl DrawContext {
    pub fn new(mol: Molecule, conf_id: Option<usize>) -> Self {
        let rings = RingInfo::sssr(&mol);
        Self {
            mol,
            conf_id,
            rings,
            ..Self::default()
        }
    }

    pub fn symbol(&self, atom: usize) -> &str {
        self.atom_syms.get(atom).map_or("", |s| s.text.as_str())
    }

    pub fn orient(&self, atom: usize) -> OrientType {
        self.atom_syms.get(atom).map_or(OrientType::C, |s| s.orient)
    }

    /// Atom-coordinate bounding box, as (min, max).
    pub fn atom_extremes(&self) -> Option<(DVec2, DVec2)> {
        let first = *self.at_cds.first()?;
        Some(
            self.at_cds
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Mean bond length in molecule units, or `None` without bonds.
    pub fn mean_bond_length(&self) -> Option<f64> {
        let mut total = 0.0;
        let mut n = 0usize;
        for e in self.mol.bonds() {
            if let Some((a, b)) = self.mol.bond_endpoints(e) {
                total += (self.at_cds[a.index()] - self.at_cds[b.index()]).length();
                n += 1;
            }
        }
        (n > 0).then(|| total / n as f64)
    }
}
