pub mod atom;
pub mod bond;
pub mod draw;
pub mod element;
pub mod error;
pub mod mol;
pub mod reaction;
pub mod rings;
pub mod sgroup;
pub mod traits;

pub use atom::{Atom, AtomQuery, Chirality};
pub use bond::{Bond, BondDirection, BondOrder, BondQuery, BondStereo, VariableAttachment};
pub use draw::{
    DrawBackend, DrawColour, DrawOptions, DrawnMolecule, FixedWidthMetrics, GridRequest,
    MolDrawer, MolHighlights, MultiColourHighlights, Primitive, RecordingBackend, TextMeasure,
};
pub use error::DrawError;
pub use mol::{Conformer, Mol};
pub use reaction::Reaction;
pub use rings::RingInfo;
pub use sgroup::{
    FieldDisplay, LinkNode, StereoGroup, StereoGroupKind, SubstanceGroup, SubstanceGroupKind,
};
pub use traits::{HasAromaticity, HasBondDirection, HasBondOrder, HasBondStereo};

/// The concrete molecule type the drawer works on.
pub type Molecule = Mol<Atom, Bond>;

#[cfg(test)]
mod tests;
