//! Keyword definitions for the selection language
//!
//! Defines every keyword the selection language recognizes, including
//! aliases, and groups them by how the parser consumes them.

use phf::phf_map;

/// Keyword category, deciding how the parser consumes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordType {
    /// Logical operator (`and`, `or`, `xor`, `not`)
    Logic,
    /// Constant selection (`all`, `none`)
    Constant,
    /// Property selector taking a value (`name CA`, `resi 10-20`)
    Property,
    /// Parameterless class selector (`protein`, `helix`, `heavy`)
    Class,
    /// Prefix expansion modifier (`byres`, `bychain`)
    Expansion,
    /// Distance modifier taking a radius (`around 5`)
    Distance,
}

/// A selection language keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Logical operators
    And,
    Or,
    Xor,
    Not,

    // Constants
    All,
    None,

    // Property selectors
    Name,
    Resn,
    Resi,
    Chain,
    Elem,
    Index,
    Serial,
    AltLoc,
    BFactor,
    Fragment,
    SecondaryStructure,
    Residue,

    // Molecular components
    Protein,
    Ligand,
    Water,
    Solvent,
    Organic,
    Backbone,
    Sidechain,
    Metal,

    // Atom types
    Heavy,
    Hydrogen,
    PolarHydrogen,
    NonpolarHydrogen,

    // Secondary structure classes
    Helix,
    Sheet,
    Turn,
    Loop,

    // Expansion modifiers
    ByRes,
    ByChain,

    // Distance modifiers
    Around,
    XAround,
    Expand,
    Beyond,
}

impl Keyword {
    /// Get the keyword category
    pub fn keyword_type(self) -> KeywordType {
        use Keyword::*;
        match self {
            And | Or | Xor | Not => KeywordType::Logic,
            All | None => KeywordType::Constant,
            Name | Resn | Resi | Chain | Elem | Index | Serial | AltLoc | BFactor | Fragment
            | SecondaryStructure | Residue => KeywordType::Property,
            Protein | Ligand | Water | Solvent | Organic | Backbone | Sidechain | Metal
            | Heavy | Hydrogen | PolarHydrogen | NonpolarHydrogen | Helix | Sheet | Turn
            | Loop => KeywordType::Class,
            ByRes | ByChain => KeywordType::Expansion,
            Around | XAround | Expand | Beyond => KeywordType::Distance,
        }
    }

    /// Binding strength of binary logical operators (higher binds tighter)
    ///
    /// `or` and `xor` share a tier and associate left to right.
    pub fn precedence(self) -> u8 {
        match self {
            Keyword::And => 2,
            Keyword::Or | Keyword::Xor => 1,
            _ => 0,
        }
    }

    /// Canonical spelling
    pub fn as_str(self) -> &'static str {
        use Keyword::*;
        match self {
            And => "and",
            Or => "or",
            Xor => "xor",
            Not => "not",
            All => "all",
            None => "none",
            Name => "name",
            Resn => "resn",
            Resi => "resi",
            Chain => "chain",
            Elem => "elem",
            Index => "index",
            Serial => "serial",
            AltLoc => "alt",
            BFactor => "b",
            Fragment => "fragment",
            SecondaryStructure => "ss",
            Residue => "residue",
            Protein => "protein",
            Ligand => "ligand",
            Water => "water",
            Solvent => "solvent",
            Organic => "organic",
            Backbone => "backbone",
            Sidechain => "sidechain",
            Metal => "metal",
            Heavy => "heavy",
            Hydrogen => "hydrogen",
            PolarHydrogen => "polar_hydrogen",
            NonpolarHydrogen => "nonpolar_hydrogen",
            Helix => "helix",
            Sheet => "sheet",
            Turn => "turn",
            Loop => "loop",
            ByRes => "byres",
            ByChain => "bychain",
            Around => "around",
            XAround => "xaround",
            Expand => "expand",
            Beyond => "beyond",
        }
    }
}

/// Keyword table (lowercase keys)
static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    // Logical operators
    "and" => Keyword::And,
    "or" => Keyword::Or,
    "xor" => Keyword::Xor,
    "not" => Keyword::Not,

    // Constants
    "all" => Keyword::All,
    "none" => Keyword::None,

    // Property selectors
    "name" => Keyword::Name,
    "n." => Keyword::Name,
    "resn" => Keyword::Resn,
    "resname" => Keyword::Resn,
    "r." => Keyword::Resn,
    "resi" => Keyword::Resi,
    "resid" => Keyword::Resi,
    "i." => Keyword::Resi,
    "chain" => Keyword::Chain,
    "c." => Keyword::Chain,
    "elem" => Keyword::Elem,
    "element" => Keyword::Elem,
    "e." => Keyword::Elem,
    "index" => Keyword::Index,
    "idx" => Keyword::Index,
    "idx." => Keyword::Index,
    "serial" => Keyword::Serial,
    "id" => Keyword::Serial,
    "alt" => Keyword::AltLoc,
    "altloc" => Keyword::AltLoc,
    "b" => Keyword::BFactor,
    "bfactor" => Keyword::BFactor,
    "fragment" => Keyword::Fragment,
    "frag" => Keyword::Fragment,
    "ss" => Keyword::SecondaryStructure,
    "residue" => Keyword::Residue,

    // Molecular components
    "protein" => Keyword::Protein,
    "ligand" => Keyword::Ligand,
    "water" => Keyword::Water,
    "solvent" => Keyword::Solvent,
    "organic" => Keyword::Organic,
    "backbone" => Keyword::Backbone,
    "bb" => Keyword::Backbone,
    "bb." => Keyword::Backbone,
    "sidechain" => Keyword::Sidechain,
    "sc" => Keyword::Sidechain,
    "sc." => Keyword::Sidechain,
    "metal" => Keyword::Metal,
    "metals" => Keyword::Metal,

    // Atom types
    "heavy" => Keyword::Heavy,
    "hydrogen" => Keyword::Hydrogen,
    "hydrogens" => Keyword::Hydrogen,
    "h" => Keyword::Hydrogen,
    "h." => Keyword::Hydrogen,
    "polar_hydrogen" => Keyword::PolarHydrogen,
    "polarh" => Keyword::PolarHydrogen,
    "nonpolar_hydrogen" => Keyword::NonpolarHydrogen,
    "apolarh" => Keyword::NonpolarHydrogen,

    // Secondary structure classes
    "helix" => Keyword::Helix,
    "sheet" => Keyword::Sheet,
    "strand" => Keyword::Sheet,
    "turn" => Keyword::Turn,
    "loop" => Keyword::Loop,

    // Expansion modifiers
    "byres" => Keyword::ByRes,
    "br." => Keyword::ByRes,
    "bychain" => Keyword::ByChain,
    "bc." => Keyword::ByChain,

    // Distance modifiers
    "around" => Keyword::Around,
    "a." => Keyword::Around,
    "xaround" => Keyword::XAround,
    "expand" => Keyword::Expand,
    "x." => Keyword::Expand,
    "beyond" => Keyword::Beyond,
    "be." => Keyword::Beyond,
};

/// Look up a keyword by name (case-insensitive)
pub fn lookup(name: &str) -> Option<Keyword> {
    // Try exact match first
    if let Some(&kw) = KEYWORDS.get(name) {
        return Some(kw);
    }
    // Try lowercase
    let lower = name.to_ascii_lowercase();
    KEYWORDS.get(lower.as_str()).copied()
}
