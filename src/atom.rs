/// Tetrahedral parity of an atom as read off its wedges.
///
/// Only `Cw` and `Ccw` count as a defined stereocentre when deciding which
/// end of a wedge bond is the wide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    #[default]
    None,
    /// Clockwise (@@) arrangement.
    Cw,
    /// Counterclockwise (@) arrangement.
    Ccw,
    /// Some other, non-tetrahedral specification.
    Other,
}

impl Chirality {
    pub fn is_tetrahedral(self) -> bool {
        matches!(self, Chirality::Cw | Chirality::Ccw)
    }
}

/// Query constraint carried by an atom of a query molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomQuery {
    /// One of a list of elements, e.g. `[C,N,O]`.
    List { elements: Vec<u8>, negated: bool },
    /// Anything else; drawn as `?`.
    Complex,
}

/// Atom payload for a drawable molecular graph.
///
/// `Atom` stores the intrinsic atomic properties plus the handful of display
/// hints a depiction needs: explicit labels, notes and query constraints.
/// Coordinates live on the molecule's conformers, not on the atom.
///
/// # Examples
///
/// ```
/// use crabdepict::Atom;
///
/// let nitrogen = Atom {
///     atomic_num: 7,
///     hydrogen_count: 2,
///     ..Atom::default()
/// };
/// assert_eq!(nitrogen.atomic_num, 7);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). `0` is a dummy atom.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of implicit hydrogens, written next to the symbol.
    pub hydrogen_count: u8,
    pub is_aromatic: bool,
    pub chirality: Chirality,
    pub radical_electrons: u8,
    /// Atom-map number; `0` means unmapped.
    pub map_num: u16,
    /// Free-text label replacing the element symbol.
    pub label: Option<String>,
    /// Display label from a file format, used in preference to `label`.
    pub display_label: Option<String>,
    /// Display label for west-facing atoms, e.g. `HO` rather than `OH`.
    pub display_label_w: Option<String>,
    /// Annotation drawn next to the atom.
    pub note: Option<String>,
    /// CIP label (`R`, `S`, …) for stereo annotations.
    pub cip_code: Option<String>,
    pub query: Option<AtomQuery>,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    /// Queries that can only be drawn as `?`. Atom lists are not complex.
    pub fn is_complex_query(&self) -> bool {
        matches!(self.query, Some(AtomQuery::Complex))
    }
}
