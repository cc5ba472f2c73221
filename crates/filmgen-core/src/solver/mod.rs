//! Thin-film optical solver abstraction and implementations.
//!
//! The [`TmmSolver`] trait is the call contract the response evaluator
//! depends on: reflectance, transmittance and ellipsometric angles of a
//! planar stack at one angle of incidence and one wavelength. The coherent
//! characteristic-matrix method ([`transfer_matrix::TransferMatrixSolver`])
//! is the bundled implementation.

pub mod transfer_matrix;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during a single stack solve.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Layer count mismatch: {indices} indices but {thicknesses} thicknesses")]
    LayerMismatch { indices: usize, thicknesses: usize },

    #[error("Invalid angle of incidence: {0} deg")]
    InvalidAngle(f64),

    #[error("Invalid wavelength: {0} m")]
    InvalidWavelength(f64),

    #[error("Incident medium must be lossless, got n = {0}")]
    AbsorbingSuperstrate(Complex64),

    #[error("Degenerate interface at layer {0}: field transfer is singular")]
    Singular(usize),
}

/// Polarisation of the incident plane wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    /// Transverse magnetic (field in the plane of incidence).
    P,
    /// Transverse electric.
    S,
}

/// Optical description of a stack at one wavelength.
///
/// `indices[i]` and `thicknesses[i]` (metres) describe layer `i`, counted from
/// the superstrate side. The semi-infinite media are given separately.
#[derive(Debug, Clone, Copy)]
pub struct StackOptics<'a> {
    pub indices: &'a [Complex64],
    pub thicknesses: &'a [f64],
    pub superstrate: Complex64,
    pub substrate: Complex64,
}

impl<'a> StackOptics<'a> {
    pub fn new(
        indices: &'a [Complex64],
        thicknesses: &'a [f64],
        superstrate: Complex64,
        substrate: Complex64,
    ) -> Self {
        Self {
            indices,
            thicknesses,
            superstrate,
            substrate,
        }
    }

    pub fn num_layers(&self) -> usize {
        self.indices.len()
    }
}

/// Every quantity one record stores for a single (angle, wavelength) point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointResponse {
    pub rp: f64,
    pub rs: f64,
    pub tp: f64,
    pub ts: f64,
    /// Degrees.
    pub psi: f64,
    /// Degrees, in `(-180, 180]`.
    pub delta: f64,
}

/// Interface of a planar-stack optical solver.
///
/// Angles are angles of incidence in degrees measured from the normal;
/// wavelengths are vacuum wavelengths in metres.
pub trait TmmSolver: Send + Sync {
    /// Ellipsometric angles `(ψ, Δ)` in degrees.
    fn ellipsometric(
        &self,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<(f64, f64), SolverError>;

    /// Power reflectance for one polarisation.
    fn reflectance(
        &self,
        polarization: Polarization,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<f64, SolverError>;

    /// Power transmittance into the substrate for one polarisation.
    fn transmittance(
        &self,
        polarization: Polarization,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<f64, SolverError>;

    /// All six quantities at one point.
    ///
    /// The default calls the individual operations; implementations may
    /// override it to share work between them.
    fn point_response(
        &self,
        angle_deg: f64,
        wavelength_m: f64,
        stack: &StackOptics<'_>,
    ) -> Result<PointResponse, SolverError> {
        let (psi, delta) = self.ellipsometric(angle_deg, wavelength_m, stack)?;
        Ok(PointResponse {
            rp: self.reflectance(Polarization::P, angle_deg, wavelength_m, stack)?,
            rs: self.reflectance(Polarization::S, angle_deg, wavelength_m, stack)?,
            tp: self.transmittance(Polarization::P, angle_deg, wavelength_m, stack)?,
            ts: self.transmittance(Polarization::S, angle_deg, wavelength_m, stack)?,
            psi,
            delta,
        })
    }

    /// Human-readable name of the method.
    fn method_name(&self) -> &str;
}
