//! Bond properties the geometry helpers read, so that they work on any
//! bond payload of a [`Mol`](crate::Mol).

use crate::bond::{BondDirection, BondOrder, BondStereo};

pub trait HasAromaticity {
    fn is_aromatic(&self) -> bool;
}

pub trait HasBondOrder {
    fn bond_order(&self) -> BondOrder;
}

pub trait HasBondStereo {
    fn bond_stereo(&self) -> BondStereo;
}

pub trait HasBondDirection {
    fn bond_direction(&self) -> BondDirection;
}
