use std::fmt;

/// Errors returned by the drawing entry points.
///
/// Only broken call contracts end up here. Crowded layouts, unplaceable
/// notes and molecules without coordinates are logged and drawn as well as
/// possible instead.
#[derive(Debug)]
pub enum DrawError {
    /// Canvas or panel width/height of zero.
    InvalidDimensions { width: u32, height: u32 },
    /// Two parallel argument lists disagree in length.
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    AtomIndexOutOfRange { index: usize, atom_count: usize },
    BondIndexOutOfRange { index: usize, bond_count: usize },
    ConformerOutOfRange { conf_id: usize, num_conformers: usize },
    /// Malformed molecule data, e.g. a variable bond pointing at a
    /// non-existent atom.
    InvalidInput(String),
    Io(std::io::Error),
    OptionsParse(toml::de::Error),
    OptionsSerialize(toml::ser::Error),
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid drawing dimensions {}x{}", width, height)
            }
            Self::LengthMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "length mismatch for {}: expected {}, found {}",
                what, expected, found
            ),
            Self::AtomIndexOutOfRange { index, atom_count } => write!(
                f,
                "atom index {} out of range for molecule with {} atoms",
                index, atom_count
            ),
            Self::BondIndexOutOfRange { index, bond_count } => write!(
                f,
                "bond index {} out of range for molecule with {} bonds",
                index, bond_count
            ),
            Self::ConformerOutOfRange {
                conf_id,
                num_conformers,
            } => write!(
                f,
                "conformer {} requested but molecule has {}",
                conf_id, num_conformers
            ),
            Self::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Self::Io(e) => write!(f, "{}", e),
            Self::OptionsParse(e) => write!(f, "could not parse draw options: {}", e),
            Self::OptionsSerialize(e) => write!(f, "could not write draw options: {}", e),
        }
    }
}

impl std::error::Error for DrawError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::OptionsParse(e) => Some(e),
            Self::OptionsSerialize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DrawError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for DrawError {
    fn from(e: toml::de::Error) -> Self {
        Self::OptionsParse(e)
    }
}

impl From<toml::ser::Error> for DrawError {
    fn from(e: toml::ser::Error) -> Self {
        Self::OptionsSerialize(e)
    }
}
