//! Element symbols for atom labels.

/// Symbol for an atomic number. `0` is the dummy atom `*`; anything past the
/// end of the periodic table is also drawn as `*`.
pub fn symbol(atomic_num: u8) -> &'static str {
    match atomic_num {
        0 => "*",
        n => SYMBOLS.get(n as usize - 1).copied().unwrap_or("*"),
    }
}

pub fn from_symbol(s: &str) -> Option<u8> {
    SYMBOLS
        .iter()
        .position(|&sym| sym == s)
        .map(|i| (i + 1) as u8)
}

/// Elements whose hydrogens are written before the symbol (`H2O`, `HCl`)
/// when the atom stands alone.
pub fn hydrogens_listed_first(atomic_num: u8) -> bool {
    matches!(atomic_num, 8 | 9 | 16 | 17 | 34 | 35 | 52 | 53 | 84 | 85)
}

static SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca",
    "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr",
    "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In", "Sn",
    "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd",
    "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th",
    "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm",
    "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];
