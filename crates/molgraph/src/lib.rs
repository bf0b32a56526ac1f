//! # RXNFP Molecular Graph Service
//!
//! Molecular graph plumbing for the reaction fingerprint encoder: it turns
//! SMILES text into a molecule and exposes exactly the graph operations the
//! encoder needs through the [`MolecularGraph`] trait.
//!
//! ## Contract
//!
//! - Parsing never panics. The SMILES reader returns a typed
//!   [`SmilesError`]; the service turns it into `None`.
//! - All operations are pure functions of their input. Valence rules go no
//!   further than implicit hydrogen counts and Hückel aromaticity; stereo
//!   marks are read but dropped.
//! - Canonical text does not depend on input atom order, and rooted text is
//!   identical for symmetry-equivalent roots.
//!
//! ## Example Usage
//!
//! ```
//! use molgraph::{MolecularGraph, SmilesGraph};
//!
//! let graph = SmilesGraph::new();
//! let mol = graph.parse("OCC").unwrap();
//! let all: Vec<usize> = (0..2).collect();
//! let (sub, _) = graph.induced_substructure(&mol, &all);
//! assert_eq!(graph.canonical_text(&sub, None, true), "[CH3][CH2][OH]");
//! ```

pub mod aromaticity;
pub mod canon;
pub mod element;
pub mod environment;
pub mod molecule;
pub mod rings;
pub mod service;
pub mod smiles;

pub use crate::aromaticity::perceive_aromaticity;
pub use crate::canon::{atom_text, canonical_ranks, canonical_smiles};
pub use crate::environment::{atom_environment, induced_substructure, Substructure};
pub use crate::molecule::{Atom, Bond, BondOrder, Molecule};
pub use crate::rings::{sssr, Ring};
pub use crate::service::{MolecularGraph, SmilesGraph};
pub use crate::smiles::{parse_smiles, SmilesError};
