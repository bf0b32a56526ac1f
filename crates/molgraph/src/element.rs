//! Element table used by the SMILES reader and the canonical writer.

/// Static description of a chemical element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub atomic_number: u8,
    pub symbol: &'static str,
    /// Allowed valences for implicit hydrogen assignment, ascending.
    /// Empty for elements that never receive implicit hydrogens.
    pub valences: &'static [u8],
}

macro_rules! element {
    ($n:expr, $s:expr) => {
        Element {
            atomic_number: $n,
            symbol: $s,
            valences: &[],
        }
    };
    ($n:expr, $s:expr, [$($v:expr),*]) => {
        Element {
            atomic_number: $n,
            symbol: $s,
            valences: &[$($v),*],
        }
    };
}

/// Wildcard atom (`*`), atomic number 0.
pub const WILDCARD: Element = element!(0, "*");

static ELEMENTS: &[Element] = &[
    element!(1, "H", [1]),
    element!(2, "He"),
    element!(3, "Li", [1]),
    element!(4, "Be", [2]),
    element!(5, "B", [3]),
    element!(6, "C", [4]),
    element!(7, "N", [3, 5]),
    element!(8, "O", [2]),
    element!(9, "F", [1]),
    element!(10, "Ne"),
    element!(11, "Na", [1]),
    element!(12, "Mg", [2]),
    element!(13, "Al", [3]),
    element!(14, "Si", [4]),
    element!(15, "P", [3, 5]),
    element!(16, "S", [2, 4, 6]),
    element!(17, "Cl", [1]),
    element!(18, "Ar"),
    element!(19, "K", [1]),
    element!(20, "Ca", [2]),
    element!(21, "Sc"),
    element!(22, "Ti"),
    element!(23, "V"),
    element!(24, "Cr"),
    element!(25, "Mn"),
    element!(26, "Fe"),
    element!(27, "Co"),
    element!(28, "Ni"),
    element!(29, "Cu"),
    element!(30, "Zn"),
    element!(31, "Ga", [3]),
    element!(32, "Ge", [4]),
    element!(33, "As", [3, 5]),
    element!(34, "Se", [2, 4, 6]),
    element!(35, "Br", [1]),
    element!(36, "Kr"),
    element!(37, "Rb", [1]),
    element!(38, "Sr", [2]),
    element!(39, "Y"),
    element!(40, "Zr"),
    element!(41, "Nb"),
    element!(42, "Mo"),
    element!(43, "Tc"),
    element!(44, "Ru"),
    element!(45, "Rh"),
    element!(46, "Pd"),
    element!(47, "Ag"),
    element!(48, "Cd"),
    element!(49, "In", [3]),
    element!(50, "Sn", [2, 4]),
    element!(51, "Sb", [3, 5]),
    element!(52, "Te", [2, 4, 6]),
    element!(53, "I", [1, 3, 5]),
    element!(54, "Xe"),
    element!(55, "Cs", [1]),
    element!(56, "Ba", [2]),
    element!(57, "La"),
    element!(58, "Ce"),
    element!(64, "Gd"),
    element!(72, "Hf"),
    element!(73, "Ta"),
    element!(74, "W"),
    element!(75, "Re"),
    element!(76, "Os"),
    element!(77, "Ir"),
    element!(78, "Pt"),
    element!(79, "Au"),
    element!(80, "Hg"),
    element!(81, "Tl"),
    element!(82, "Pb", [2, 4]),
    element!(83, "Bi", [3, 5]),
    element!(92, "U"),
];

/// Look up an element by its (case-sensitive) symbol.
pub fn element_by_symbol(symbol: &str) -> Option<&'static Element> {
    if symbol == "*" {
        return Some(&WILDCARD);
    }
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

/// Look up an element by atomic number.
pub fn element_by_number(atomic_number: u8) -> Option<&'static Element> {
    if atomic_number == 0 {
        return Some(&WILDCARD);
    }
    ELEMENTS.iter().find(|e| e.atomic_number == atomic_number)
}

/// Symbol for an atomic number, falling back to the wildcard.
pub fn symbol_for(atomic_number: u8) -> &'static str {
    element_by_number(atomic_number)
        .map(|e| e.symbol)
        .unwrap_or(WILDCARD.symbol)
}

/// Elements that may appear outside brackets in SMILES.
pub fn is_organic_subset(atomic_number: u8) -> bool {
    matches!(atomic_number, 0 | 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
}

/// Elements that may be written in lowercase (aromatic) form.
pub fn can_be_aromatic(atomic_number: u8) -> bool {
    matches!(atomic_number, 0 | 5 | 6 | 7 | 8 | 15 | 16 | 33 | 34 | 52)
}

/// Number of implicit hydrogens for an unbracketed atom with the given
/// bond-order sum.
///
/// Aromatic atoms count one extra unit for their share of the pi system and
/// stay at their lowest valence, so `s` in thiophene gets no hydrogen.
pub fn implicit_hydrogens(atomic_number: u8, bond_order_sum: u8, aromatic: bool) -> u8 {
    let Some(element) = element_by_number(atomic_number) else {
        return 0;
    };
    let used = bond_order_sum.saturating_add(u8::from(aromatic));
    if aromatic {
        return element
            .valences
            .first()
            .map(|&v| v.saturating_sub(used))
            .unwrap_or(0);
    }
    element
        .valences
        .iter()
        .find(|&&v| v >= used)
        .map(|&v| v - used)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_symbol_and_number_agree() {
        let carbon = element_by_symbol("C").expect("carbon");
        assert_eq!(carbon.atomic_number, 6);
        assert_eq!(element_by_number(6), Some(carbon));
        assert_eq!(symbol_for(17), "Cl");
        assert!(element_by_symbol("Xx").is_none());
    }

    #[test]
    fn implicit_hydrogens_follow_lowest_valence() {
        assert_eq!(implicit_hydrogens(6, 1, false), 3);
        assert_eq!(implicit_hydrogens(6, 2, true), 1);
        assert_eq!(implicit_hydrogens(7, 2, true), 0);
        assert_eq!(implicit_hydrogens(8, 2, false), 0);
        // Pentavalent nitrogen is the next allowed state.
        assert_eq!(implicit_hydrogens(7, 4, false), 1);
        assert_eq!(implicit_hydrogens(16, 5, false), 1);
    }

    #[test]
    fn aromatic_atoms_stay_at_lowest_valence() {
        assert_eq!(implicit_hydrogens(16, 2, true), 0);
        assert_eq!(implicit_hydrogens(8, 2, true), 0);
        assert_eq!(implicit_hydrogens(6, 3, true), 0);
    }

    #[test]
    fn overloaded_atom_gets_no_hydrogens() {
        assert_eq!(implicit_hydrogens(9, 3, false), 0);
        assert_eq!(implicit_hydrogens(26, 2, false), 0);
    }
}
