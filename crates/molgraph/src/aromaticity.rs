//! Aromaticity perception for Kekulé input.
//!
//! Rings from the SSSR are tested one at a time with the Hückel rule: every
//! ring atom must join the pi system and the ring must hold 4n+2 pi
//! electrons. A double bond leaving the ring only counts once a neighbouring
//! ring has made that bond aromatic, so fused systems are found by repeating
//! the pass until nothing changes.
//!
//! Hydrogen counts are left untouched: they were fixed from the Kekulé
//! bond orders and already match the aromatic form.

use crate::element::can_be_aromatic;
use crate::molecule::{Bond, BondOrder, Molecule};
use crate::rings::{sssr, Ring};

/// Mark aromatic rings: their atoms become aromatic and their bonds
/// [`BondOrder::Aromatic`]. Rings written aromatic in the input stay as they
/// are.
pub fn perceive_aromaticity(mol: Molecule) -> Molecule {
    let rings = sssr(&mol);
    if rings.is_empty() {
        return mol;
    }

    let mut aromatic: Vec<bool> = mol
        .bonds()
        .iter()
        .map(|b| b.order == BondOrder::Aromatic)
        .collect();
    let mut settled: Vec<bool> = rings
        .iter()
        .map(|ring| ring.bonds.iter().all(|&b| aromatic[b]))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for (idx, ring) in rings.iter().enumerate() {
            if settled[idx] || !is_huckel(&mol, ring, &aromatic) {
                continue;
            }
            for &b in &ring.bonds {
                aromatic[b] = true;
            }
            settled[idx] = true;
            changed = true;
        }
    }

    let unchanged = mol
        .bonds()
        .iter()
        .zip(&aromatic)
        .all(|(bond, &flag)| (bond.order == BondOrder::Aromatic) == flag);
    if unchanged {
        return mol;
    }

    let mut atoms = mol.atoms().to_vec();
    let bonds: Vec<Bond> = mol
        .bonds()
        .iter()
        .zip(&aromatic)
        .map(|(bond, &flag)| {
            if flag {
                atoms[bond.begin].aromatic = true;
                atoms[bond.end].aromatic = true;
                Bond {
                    order: BondOrder::Aromatic,
                    ..*bond
                }
            } else {
                *bond
            }
        })
        .collect();
    Molecule::new(atoms, bonds)
}

fn is_huckel(mol: &Molecule, ring: &Ring, aromatic: &[bool]) -> bool {
    let mut electrons = 0u32;
    let mut lone_pairs = 0;
    for &atom in &ring.atoms {
        match pi_electrons(mol, ring, atom, aromatic) {
            Some(2) => {
                electrons += 2;
                lone_pairs += 1;
            }
            Some(e) => electrons += u32::from(e),
            None => return false,
        }
    }
    // More than one lone-pair donor (N1NN1, 1,4-dioxin) is not a pi system.
    lone_pairs <= 1 && electrons % 4 == 2
}

/// Pi electrons `atom` gives to `ring`, or `None` when it cannot take part.
fn pi_electrons(mol: &Molecule, ring: &Ring, atom: usize, aromatic: &[bool]) -> Option<u8> {
    let a = mol.atom(atom);
    if a.atomic_number == 0 || !can_be_aromatic(a.atomic_number) {
        return None;
    }

    let mut double = None;
    for &(nbr, bond) in mol.neighbors(atom) {
        match mol.bond(bond).order {
            BondOrder::Double if double.is_some() => return None,
            BondOrder::Double => double = Some((nbr, bond)),
            BondOrder::Triple | BondOrder::Quadruple => return None,
            BondOrder::Single | BondOrder::Aromatic => {}
        }
    }

    if let Some((nbr, bond)) = double {
        if ring.atoms.contains(&nbr) || aromatic[bond] {
            return Some(1);
        }
        // Exocyclic C=X, as in 2-pyridone.
        return (a.atomic_number == 6).then_some(0);
    }

    let saturation = mol.degree(atom) + usize::from(a.hydrogens);
    match (a.atomic_number, a.formal_charge) {
        (6, -1) => Some(2),
        (6, 1) => Some(0),
        (6, _) if a.aromatic => Some(1),
        (7 | 15 | 33, 0) if a.aromatic && saturation == 2 => Some(1),
        (7 | 15 | 33, 1) if a.aromatic => Some(1),
        (7 | 15 | 33, 0) if saturation == 3 => Some(2),
        (8 | 16 | 34 | 52, 1) if a.aromatic => Some(1),
        (8 | 16 | 34 | 52, 0) if saturation == 2 => Some(2),
        (5, 0) if saturation == 3 => Some(0),
        _ => None,
    }
}
