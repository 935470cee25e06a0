//! Spin spherical harmonic transforms on the two-sphere.
//!
//! The SO(3) transforms reduce to one spin spherical harmonic transform per orientational
//! frequency. Backends implement [`SpinSphericalTransform`] using the convention
//!
//! ```math
//! {}_sY_{\ell m}(\theta, \phi)
//!     = (-1)^s \sqrt{\frac{2\ell+1}{4\pi}}\, e^{im\phi}\, d^{\ell}_{m,-s}(\theta),
//! ```
//!
//! with harmonic coefficients linearised as $`\ell^2 + \ell + m`$ and samples on the MW grid
//! stored as $`\theta`$-major rows of $`2L-1`$ values of $`\phi`$.

use std::error::Error;
use std::fmt;

use crate::transform::C128;

pub mod mw;

pub use mw::MwSpinTransform;

#[derive(Debug, Clone)]
pub struct SphericalTransformError(pub String);

impl fmt::Display for SphericalTransformError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Spherical harmonic transform error: {}", self.0)
    }
}

impl Error for SphericalTransformError {}

/// Trait for spin spherical harmonic transforms at a fixed band-limit on the MW grid.
pub trait SpinSphericalTransform {
    /// Returns the harmonic band-limit $`L`$.
    fn band_limit(&self) -> usize;

    /// Synthesises the spin-`spin` function with harmonic coefficients `flm`.
    ///
    /// # Arguments
    ///
    /// * `f` - Output samples, of length $`L(2L-1)`$. Fully overwritten.
    /// * `flm` - Harmonic coefficients, of length $`L^2`$. Coefficients with
    /// $`\ell < |s|`$ are ignored.
    /// * `spin` - The spin number $`s`$.
    fn inverse(&self, f: &mut [C128], flm: &[C128], spin: i64)
        -> Result<(), SphericalTransformError>;

    /// Analyses spin-`spin` samples `f` into harmonic coefficients.
    ///
    /// # Arguments
    ///
    /// * `flm` - Output coefficients, of length $`L^2`$. Fully overwritten; coefficients with
    /// $`\ell < |s|`$ are zero.
    /// * `f` - Samples, of length $`L(2L-1)`$.
    /// * `spin` - The spin number $`s`$.
    fn forward(&self, flm: &mut [C128], f: &[C128], spin: i64)
        -> Result<(), SphericalTransformError>;
}
