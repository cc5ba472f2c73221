//! # filmgen Materials
//!
//! Dispersive optical material models for thin-film stacks. Every model
//! implements [`MaterialProvider`](provider::MaterialProvider), mapping vacuum
//! wavelengths (metres) to complex permittivity and refractive index; the
//! closed [`Material`](material::Material) enum dispatches over them.
//!
//! ## Models
//!
//! | Model | Module | Materials |
//! |-------|--------|-----------|
//! | Brendel–Bormann | [`brendel_bormann`] | Ag, Au, Cu, Al, Be, Cr, Ni, Pd, Pt, Ti, W |
//! | Lorentz–Drude | [`lorentz_drude`] | Ag_LD, Au_LD |
//! | Dielectrics | [`dielectric`] | TiO2, SiO2, Al2O3, glass, vacuum |
//!
//! Brendel–Bormann metals persist to a compact little-endian binary format
//! ([`binary`]); [`bootstrap`] writes the built-in catalog and verifies the
//! files round-trip exactly.

pub mod binary;
pub mod bootstrap;
pub mod brendel_bormann;
pub mod dielectric;
pub mod faddeeva;
pub mod library;
pub mod lorentz_drude;
pub mod material;
pub mod provider;
pub mod spline;

pub use brendel_bormann::{BrendelBormannMaterial, BrendelBormannParameters};
pub use dielectric::DielectricMaterial;
pub use library::MaterialLibrary;
pub use lorentz_drude::LorentzDrudeMaterial;
pub use material::Material;
pub use provider::{MaterialError, MaterialKind, MaterialProvider};
