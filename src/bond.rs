#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
    /// Donor to acceptor, drawn as an arrow from the begin atom.
    Dative,
    Zero,
    Hydrogen,
    Other,
}

/// Wedge and wavy flags set on a bond by the 2D layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondDirection {
    #[default]
    None,
    BeginWedge,
    BeginDash,
    /// Unknown configuration at a stereocentre; drawn wavy.
    Unknown,
    /// Unspecified double-bond geometry; drawn as crossed lines.
    EitherDouble,
}

/// Double-bond stereo as far as the drawing cares: `Any` is drawn as
/// crossed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    #[default]
    None,
    Any,
}

/// Query constraint carried by a bond of a query molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BondQuery {
    /// Plain order match. Drawn as an ordinary bond unless negated.
    Order { negated: bool },
    SingleOrDouble,
    SingleOrAromatic,
    DoubleOrAromatic,
    /// Matches any bond.
    Any,
    /// Bond order combined with ring membership.
    OrderAndRing { in_ring: bool },
    /// A query the renderer has no special drawing for.
    Unrecognized(String),
}

/// End points of a variable (position-variant) attachment bond, as atom
/// indices into the owning molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableAttachment {
    pub end_points: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bond {
    pub order: BondOrder,
    pub direction: BondDirection,
    pub stereo: BondStereo,
    pub is_aromatic: bool,
    /// Annotation drawn beside the bond.
    pub note: Option<String>,
    pub query: Option<BondQuery>,
    pub attachment: Option<VariableAttachment>,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: order == BondOrder::Aromatic,
            ..Self::default()
        }
    }

    /// Queries needing the query renderer. A plain, non-negated order query
    /// is drawn as an ordinary bond.
    pub fn has_complex_query(&self) -> bool {
        match &self.query {
            None => false,
            Some(BondQuery::Order { negated }) => *negated,
            Some(_) => true,
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::HasBondStereo for Bond {
    fn bond_stereo(&self) -> BondStereo {
        self.stereo
    }
}

impl crate::traits::HasBondDirection for Bond {
    fn bond_direction(&self) -> BondDirection {
        self.direction
    }
}

impl crate::traits::HasAromaticity for Bond {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}
