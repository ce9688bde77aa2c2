//! Molecule-level groupings: substance groups, stereo groups and link nodes.
//!
//! These carry no chemistry of their own; they only tell a depiction where to
//! put brackets, data labels and repeat-count annotations.

use petgraph::graph::{EdgeIndex, NodeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstanceGroupKind {
    /// Data group (`DAT`); its fields are rendered as text.
    Data,
    /// Structural repeat unit (`SRU`).
    RepeatUnit,
    Multiple,
    Superatom,
    #[default]
    Generic,
}

/// Where a data group's text goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDisplay {
    /// Offset in molecule units.
    pub offset: [f64; 2],
    /// Relative to the group's first atom if true, otherwise to the molecule
    /// centroid (or the origin if no centroid is known).
    pub relative: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubstanceGroup {
    pub kind: SubstanceGroupKind,
    pub atoms: Vec<NodeIndex>,
    /// Bonds crossing the group boundary.
    pub bonds: Vec<EdgeIndex>,
    /// Bracket segments in molecule coordinates.
    pub brackets: Vec<[[f64; 2]; 2]>,
    /// `CONNECT` text, drawn at the top of the last bracket.
    pub connect: Option<String>,
    /// `LABEL` text, drawn at the bottom of the last bracket.
    pub label: Option<String>,
    pub data_fields: Vec<String>,
    pub field_display: Option<FieldDisplay>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoGroupKind {
    Absolute,
    Or,
    And,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoGroup {
    pub kind: StereoGroupKind,
    pub atoms: Vec<NodeIndex>,
}

/// A repeatable fragment: the atoms between `bond_atoms` pairs may occur
/// `min_rep..=max_rep` times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkNode {
    pub min_rep: u32,
    pub max_rep: u32,
    /// (inner atom, outer atom) pairs of the bonds crossing the bracket.
    pub bond_atoms: Vec<(NodeIndex, NodeIndex)>,
}
