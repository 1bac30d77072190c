use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static SYMBOLS: [&str; 54] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe",
];

static ATOMIC_NUMBERS: Map<&'static str, u8> = phf_map! {
    "H" => 1, "HE" => 2, "LI" => 3, "BE" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "NE" => 10, "NA" => 11, "MG" => 12, "AL" => 13, "SI" => 14, "P" => 15, "S" => 16,
    "CL" => 17, "AR" => 18, "K" => 19, "CA" => 20, "SC" => 21, "TI" => 22, "V" => 23, "CR" => 24,
    "MN" => 25, "FE" => 26, "CO" => 27, "NI" => 28, "CU" => 29, "ZN" => 30, "GA" => 31,
    "GE" => 32, "AS" => 33, "SE" => 34, "BR" => 35, "KR" => 36, "RB" => 37, "SR" => 38,
    "Y" => 39, "ZR" => 40, "NB" => 41, "MO" => 42, "TC" => 43, "RU" => 44, "RH" => 45,
    "PD" => 46, "AG" => 47, "CD" => 48, "IN" => 49, "SN" => 50, "SB" => 51, "TE" => 52,
    "I" => 53, "XE" => 54,
    // Deuterium and tritium are treated as hydrogen.
    "D" => 1, "T" => 1,
};

/// A chemical element identified by its atomic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol '{0}'")]
pub struct UnknownElementError(pub String);

impl Element {
    pub const HYDROGEN: Element = Element(1);
    pub const BORON: Element = Element(5);
    pub const CARBON: Element = Element(6);
    pub const NITROGEN: Element = Element(7);
    pub const OXYGEN: Element = Element(8);
    pub const FLUORINE: Element = Element(9);
    pub const PHOSPHORUS: Element = Element(15);
    pub const SULFUR: Element = Element(16);
    pub const CHLORINE: Element = Element(17);
    pub const SELENIUM: Element = Element(34);
    pub const BROMINE: Element = Element(35);
    pub const IODINE: Element = Element(53);

    /// Returns the element with the given atomic number, if it is known.
    pub fn from_atomic_number(z: u8) -> Option<Self> {
        (1..=SYMBOLS.len() as u8).contains(&z).then_some(Self(z))
    }

    pub fn atomic_number(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[(self.0 - 1) as usize]
    }

    pub fn is_hydrogen(self) -> bool {
        self == Self::HYDROGEN
    }
}

impl FromStr for Element {
    type Err = UnknownElementError;

    /// Parses an element symbol case-insensitively (e.g. "Cl", "CL", "cl").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_uppercase();
        ATOMIC_NUMBERS
            .get(key.as_str())
            .map(|&z| Self(z))
            .ok_or_else(|| UnknownElementError(s.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
