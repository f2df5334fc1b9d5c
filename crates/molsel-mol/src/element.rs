//! Element symbol table
//!
//! Maps atomic numbers to symbols and back. Selection only needs symbols
//! and the metal classification, so no other atomic data is carried.

use ahash::AHashMap;
use std::sync::OnceLock;

/// Element symbols indexed by atomic number (index 0 is a placeholder)
const SYMBOLS: [&str; 119] = [
    "X", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

static SYMBOL_MAP: OnceLock<AHashMap<&'static str, u8>> = OnceLock::new();

fn symbol_map() -> &'static AHashMap<&'static str, u8> {
    SYMBOL_MAP.get_or_init(|| {
        SYMBOLS
            .iter()
            .enumerate()
            .skip(1)
            .map(|(n, sym)| (*sym, n as u8))
            .collect()
    })
}

/// Get the symbol for an atomic number, `None` for 0 or anything past oganesson
pub fn symbol(atomic_number: u8) -> Option<&'static str> {
    match atomic_number {
        0 => None,
        n => SYMBOLS.get(n as usize).copied(),
    }
}

/// Look up an atomic number by symbol (case-insensitive, `D` is deuterium)
pub fn atomic_number(symbol: &str) -> Option<u8> {
    let symbol = symbol.trim();
    if symbol.eq_ignore_ascii_case("D") {
        return Some(1);
    }
    symbol_map().get(normalize_symbol(symbol).as_str()).copied()
}

/// Title-case an element symbol (`FE` -> `Fe`, `c` -> `C`)
///
/// Wildcard characters pass through untouched.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// Check if an atomic number is a metal commonly found in structures
///
/// Covers Li, Na-Al, K-Zn, Rb-Cd and Cs-Hg.
pub fn is_metal(atomic_number: u8) -> bool {
    matches!(atomic_number, 3 | 11..=13 | 19..=30 | 37..=48 | 55..=80)
}
