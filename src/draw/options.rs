//! Drawing options with TOML preset support.
//!
//! Every field has a default, so a preset file only needs to name what it
//! changes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DrawError;

/// RGBA colour with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawColour {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl DrawColour {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

impl Default for DrawColour {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Integer-keyed maps are written with string keys; TOML has no other kind.
mod string_keyed {
    use std::collections::BTreeMap;
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Display,
        V: Serialize,
        S: Serializer,
    {
        let keyed: BTreeMap<String, &V> = map.iter().map(|(k, v)| (k.to_string(), v)).collect();
        keyed.serialize(serializer)
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
    where
        K: FromStr + Ord,
        K::Err: Display,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        BTreeMap::<String, V>::deserialize(deserializer)?
            .into_iter()
            .map(|(k, v)| k.trim().parse::<K>().map(|k| (k, v)).map_err(D::Error::custom))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DrawOptions {
    /// Replacement labels keyed by atom index.
    #[serde(with = "string_keyed")]
    pub atom_labels: BTreeMap<usize, String>,
    /// Draw dummy atoms with a single neighbour as a wavy attachment line.
    pub dummies_are_attachments: bool,
    pub circle_atoms: bool,
    pub highlight_colour: DrawColour,
    /// Highlight bonds as wide lines under the molecule rather than by
    /// recolouring them.
    pub continuous_highlight: bool,
    pub fill_highlights: bool,
    /// Radius of atom highlight ellipses, in molecule units.
    pub highlight_radius: f64,
    /// Device distance below which atom pairs are flagged. Negative is off.
    pub flag_close_contacts_dist: f64,
    pub clear_background: bool,
    pub background_colour: DrawColour,
    pub legend_font_size: f64,
    pub legend_colour: DrawColour,
    /// Gap between the lines of a multiple bond, as a fraction of the
    /// bond length.
    pub multiple_bond_offset: f64,
    /// Fraction of the drawing area left empty around the molecule.
    pub padding: f64,
    pub additional_atom_label_padding: f64,
    pub no_atom_labels: bool,
    pub bond_line_width: f64,
    pub scale_bond_width: bool,
    pub scale_highlight_bond_width: bool,
    pub highlight_bond_width_multiplier: i32,
    /// Font size of notes relative to atom labels.
    pub annotation_font_scale: f64,
    pub annotation_colour: DrawColour,
    pub add_atom_indices: bool,
    pub add_bond_indices: bool,
    pub add_stereo_annotation: bool,
    pub atom_highlights_are_circles: bool,
    pub centre_molecules_before_drawing: bool,
    pub explicit_methyl: bool,
    pub include_radicals: bool,
    pub comic_mode: bool,
    pub variable_bond_width_multiplier: i32,
    pub variable_atom_radius: f64,
    pub variable_attachment_colour: DrawColour,
    pub include_chiral_flag_label: bool,
    pub simplified_stereo_group_label: bool,
    pub single_colour_wedge_bonds: bool,
    pub symbol_colour: DrawColour,
    /// Device length of a bond of length 1. Negative is off.
    pub fixed_bond_length: f64,
    /// Scale as a fraction of the panel width. Negative is off.
    pub fixed_scale: f64,
    /// Clockwise rotation in degrees.
    pub rotate: f64,
    pub base_font_size: f64,
    pub min_font_size: f64,
    pub max_font_size: f64,
    pub split_bonds: bool,
    pub atom_label_deuterium_tritium: bool,
    pub isotope_labels: bool,
    pub dummy_isotope_labels: bool,
    /// Change in scale below which label fitting stops.
    pub scale_tolerance: f64,
    pub max_scale_iterations: u32,
    /// Colours by atomic number; `-1` is the fallback.
    #[serde(with = "string_keyed")]
    pub atom_colour_palette: BTreeMap<i32, DrawColour>,
    pub highlight_colour_palette: Vec<DrawColour>,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            atom_labels: BTreeMap::new(),
            dummies_are_attachments: false,
            circle_atoms: true,
            highlight_colour: DrawColour::new(1.0, 0.5, 0.5),
            continuous_highlight: true,
            fill_highlights: true,
            highlight_radius: 0.3,
            flag_close_contacts_dist: -1.0,
            clear_background: true,
            background_colour: DrawColour::WHITE,
            legend_font_size: 16.0,
            legend_colour: DrawColour::BLACK,
            multiple_bond_offset: 0.15,
            padding: 0.05,
            additional_atom_label_padding: 0.0,
            no_atom_labels: false,
            bond_line_width: 2.0,
            scale_bond_width: false,
            scale_highlight_bond_width: true,
            highlight_bond_width_multiplier: 8,
            annotation_font_scale: 0.5,
            annotation_colour: DrawColour::BLACK,
            add_atom_indices: false,
            add_bond_indices: false,
            add_stereo_annotation: false,
            atom_highlights_are_circles: false,
            centre_molecules_before_drawing: false,
            explicit_methyl: false,
            include_radicals: true,
            comic_mode: false,
            variable_bond_width_multiplier: 16,
            variable_atom_radius: 0.4,
            variable_attachment_colour: DrawColour::new(0.8, 0.8, 0.8),
            include_chiral_flag_label: false,
            simplified_stereo_group_label: false,
            single_colour_wedge_bonds: false,
            symbol_colour: DrawColour::BLACK,
            fixed_bond_length: -1.0,
            fixed_scale: -1.0,
            rotate: 0.0,
            base_font_size: 0.6,
            min_font_size: 6.0,
            max_font_size: 40.0,
            split_bonds: false,
            atom_label_deuterium_tritium: false,
            isotope_labels: true,
            dummy_isotope_labels: true,
            scale_tolerance: 0.1,
            max_scale_iterations: 100,
            atom_colour_palette: default_atom_palette(),
            highlight_colour_palette: default_highlight_palette(),
        }
    }
}

impl DrawOptions {
    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, DrawError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save options to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), DrawError> {
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, DrawError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, DrawError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Palette colour for an atomic number, falling back to the `-1` entry
    /// and then to black.
    pub fn atom_colour(&self, atomic_num: i32) -> DrawColour {
        self.atom_colour_palette
            .get(&atomic_num)
            .or_else(|| self.atom_colour_palette.get(&-1))
            .copied()
            .unwrap_or(DrawColour::BLACK)
    }

    pub fn use_bw_atom_palette(&mut self) {
        self.atom_colour_palette = BTreeMap::from([(-1, DrawColour::BLACK)]);
    }
}

pub fn default_atom_palette() -> BTreeMap<i32, DrawColour> {
    BTreeMap::from([
        (-1, DrawColour::BLACK),
        (0, DrawColour::new(0.1, 0.1, 0.1)),
        (1, DrawColour::BLACK),
        (6, DrawColour::BLACK),
        (7, DrawColour::new(0.0, 0.0, 1.0)),
        (8, DrawColour::new(1.0, 0.0, 0.0)),
        (9, DrawColour::new(0.2, 0.8, 0.8)),
        (15, DrawColour::new(1.0, 0.5, 0.0)),
        (16, DrawColour::new(0.8, 0.8, 0.0)),
        (17, DrawColour::new(0.0, 0.802, 0.0)),
        (35, DrawColour::new(0.5, 0.3, 0.1)),
        (53, DrawColour::new(0.63, 0.12, 0.94)),
    ])
}

pub fn default_highlight_palette() -> Vec<DrawColour> {
    vec![
        DrawColour::new(1.0, 1.0, 0.67),
        DrawColour::new(1.0, 0.8, 0.6),
        DrawColour::new(1.0, 0.71, 0.76),
        DrawColour::new(0.8, 1.0, 0.8),
        DrawColour::new(0.87, 0.63, 0.87),
        DrawColour::new(0.76, 0.94, 0.96),
        DrawColour::new(0.67, 0.67, 1.0),
        DrawColour::new(0.64, 0.76, 0.34),
        DrawColour::new(0.56, 0.93, 0.56),
        DrawColour::new(0.20, 0.63, 0.79),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let mut opts = DrawOptions::default();
        opts.atom_labels.insert(3, "R1".to_owned());
        let toml_str = opts.to_toml_string().unwrap();
        let parsed = DrawOptions::from_toml_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
comic_mode = true
padding = 0.1

[legend_colour]
r = 0.5
";
        let opts = DrawOptions::from_toml_str(toml_str).unwrap();
        assert!(opts.comic_mode);
        assert_eq!(opts.padding, 0.1);
        assert_eq!(opts.legend_colour, DrawColour::new(0.5, 0.0, 0.0));
        assert_eq!(opts.multiple_bond_offset, 0.15);
        assert_eq!(opts.atom_colour(8), DrawColour::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn palette_keys_parse_from_strings() {
        let toml_str = r#"
[atom_colour_palette."-1"]
r = 0.2
g = 0.2
b = 0.2

[atom_colour_palette.7]
b = 1.0
"#;
        let opts = DrawOptions::from_toml_str(toml_str).unwrap();
        assert_eq!(opts.atom_colour(7), DrawColour::new(0.0, 0.0, 1.0));
        assert_eq!(opts.atom_colour(92), DrawColour::new(0.2, 0.2, 0.2));
        assert_eq!(opts.atom_colour_palette.len(), 2);
    }

    #[test]
    fn bad_key_is_a_parse_error() {
        let toml_str = r#"
[atom_labels]
first = "R"
"#;
        assert!(matches!(
            DrawOptions::from_toml_str(toml_str),
            Err(DrawError::OptionsParse(_))
        ));
    }

    #[test]
    fn fallback_colour_without_palette_entry() {
        let mut opts = DrawOptions::default();
        opts.atom_colour_palette.clear();
        assert_eq!(opts.atom_colour(8), DrawColour::BLACK);
        opts.use_bw_atom_palette();
        assert_eq!(opts.atom_colour(8), DrawColour::BLACK);
    }

    #[test]
    fn save_and_load() {
        let dir = std::env::temp_dir().join(format!("crabdepict-opts-{}", std::process::id()));
        let path = dir.join("nested").join("preset.toml");
        let mut opts = DrawOptions::default();
        opts.rotate = 90.0;
        opts.save(&path).unwrap();
        let loaded = DrawOptions::load(&path).unwrap();
        assert_eq!(opts, loaded);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = Path::new("/nonexistent/crabdepict/preset.toml");
        assert!(matches!(DrawOptions::load(path), Err(DrawError::Io(_))));
    }
}
