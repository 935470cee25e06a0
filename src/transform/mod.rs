//! Wigner transforms on the rotation group SO(3).
//!
//! A band-limited function on SO(3) is expanded as
//!
//! ```math
//! f(\alpha, \beta, \gamma)
//!     = \sum_{n=-(N-1)}^{N-1} \sum_{\ell=|n|}^{L-1} \sum_{m=-\ell}^{\ell}
//!       \frac{2\ell+1}{8\pi^2}\, f^{\ell}_{mn}\, D^{\ell *}_{mn}(\alpha, \beta, \gamma),
//! ```
//!
//! with $`D^{\ell}_{mn}(\alpha, \beta, \gamma) = e^{-im\alpha} d^{\ell}_{mn}(\beta)
//! e^{-in\gamma}`$. Both directions are computed as one spin spherical harmonic transform of spin
//! $`-n`$ per orientational order $`n`$, combined by a discrete Fourier transform of length
//! $`2N-1`$ along $`\gamma`$.

use std::error::Error;
use std::fmt;

use derive_builder::Builder;
use rustfft::FftDirection;
use serde::{Deserialize, Serialize};

use crate::angmom::wigner_d::DlMethod;
use crate::fft::{BatchedFft, FftContext};
use crate::io::format::{nice_bool, write_subtitle};
use crate::sampling::{n_samples, n_slice_samples, ngamma};
use crate::sht::{MwSpinTransform, SpinSphericalTransform, SphericalTransformError};
use crate::storage::{check_band_limits, flmn_size, Storage};

mod forward;
mod inverse;

#[cfg(test)]
#[path = "transform_tests.rs"]
mod transform_tests;

/// Double-precision complex numbers.
pub type C128 = num_complex::Complex<f64>;

// ==================
// Error definitions
// ==================

/// Errors arising from SO(3) transforms and their index bookkeeping.
#[derive(Debug, Clone)]
pub enum So3Error {
    /// An argument, band-limit, index, storage selector or buffer length is invalid.
    InvalidArgument(String),

    /// A temporary buffer could not be allocated.
    OutOfMemory(String),

    /// The spin spherical harmonic transform backend has failed.
    DelegatedNumerical(SphericalTransformError),
}

impl fmt::Display for So3Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            So3Error::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            So3Error::OutOfMemory(msg) => write!(f, "Out of memory: {msg}"),
            So3Error::DelegatedNumerical(err) => write!(f, "{err}"),
        }
    }
}

impl Error for So3Error {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            So3Error::DelegatedNumerical(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SphericalTransformError> for So3Error {
    fn from(err: SphericalTransformError) -> Self {
        So3Error::DelegatedNumerical(err)
    }
}

/// Allocates a zero-filled complex buffer, reporting allocation failure instead of aborting.
pub(crate) fn try_zeroed(len: usize, what: &str) -> Result<Vec<C128>, So3Error> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|err| {
        So3Error::OutOfMemory(format!("cannot allocate {len} elements for the {what}: {err}"))
    })?;
    buf.resize(len, C128::default());
    Ok(buf)
}

/// Returns the position of the $`\gamma`$-frequency $`n`$ along the discrete Fourier axis.
pub(crate) fn cyclic_offset(n: i64, nn: usize) -> usize {
    if n < 0 {
        (n + ngamma(nn) as i64) as usize
    } else {
        n as usize
    }
}

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// A structure containing control parameters for SO(3) transforms.
#[derive(Clone, Builder, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct So3Parameters {
    /// The harmonic band-limit $`L`$. Degrees satisfy $`0 \le \ell < L`$.
    pub l: usize,

    /// The orientational band-limit $`N \le L`$. Orientational orders satisfy $`|n| < N`$.
    pub n: usize,

    /// The storage layout of Wigner coefficients.
    #[builder(default)]
    #[serde(default)]
    pub storage: Storage,

    /// The method used to evaluate Wigner small-d functions in the spherical harmonic backend.
    #[builder(default)]
    #[serde(default)]
    pub dl_method: DlMethod,

    /// The verbosity level. Nonzero values report each transform to the main output.
    #[builder(default = "0")]
    #[serde(default)]
    pub verbosity: u8,
}

impl So3Parameters {
    /// Returns a builder to construct a [`So3Parameters`] structure.
    pub fn builder() -> So3ParametersBuilder {
        So3ParametersBuilder::default()
    }

    /// Constructs parameters with default Wigner-d method and verbosity.
    pub fn new(l: usize, n: usize, storage: Storage) -> Self {
        Self {
            l,
            n,
            storage,
            dl_method: DlMethod::default(),
            verbosity: 0,
        }
    }
}

impl fmt::Display for So3Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "SO(3) transform parameters")?;
        writeln!(f, "Harmonic band-limit L: {}", self.l)?;
        writeln!(f, "Orientational band-limit N: {}", self.n)?;
        writeln!(f, "Coefficient storage: {}", self.storage)?;
        writeln!(f, "Wigner-d method: {}", self.dl_method)?;
        writeln!(f, "Verbose transforms: {}", nice_bool(self.verbosity > 0))?;
        writeln!(f)?;
        Ok(())
    }
}

// ---------
// Transform
// ---------

/// A plan for SO(3) transforms of one buffer shape.
///
/// The plan owns the validated parameters, the spin spherical harmonic transform backend and the
/// discrete Fourier transform plans along $`\gamma`$. It holds no per-call state, so a single
/// plan can serve concurrent transforms on disjoint buffers.
#[derive(Clone, Debug)]
pub struct So3Transform<S: SpinSphericalTransform = MwSpinTransform> {
    parameters: So3Parameters,
    sht: S,
    gamma_forward: BatchedFft,
    gamma_inverse: BatchedFft,
}

impl So3Transform<MwSpinTransform> {
    /// Plans transforms with the McEwen–Wiaux spin spherical harmonic backend.
    ///
    /// # Errors
    ///
    /// Errors when the band-limits are invalid.
    pub fn new(parameters: &So3Parameters) -> Result<Self, So3Error> {
        check_band_limits(parameters.l, parameters.n)?;
        let mut ctx = FftContext::new();
        let sht = MwSpinTransform::with_context(&mut ctx, parameters.l, parameters.dl_method)?;
        Self::plan(&mut ctx, parameters, sht)
    }
}

impl<S: SpinSphericalTransform> So3Transform<S> {
    /// Plans transforms on top of a given spin spherical harmonic backend.
    ///
    /// # Errors
    ///
    /// Errors when the band-limits are invalid or do not match the band-limit of `sht`.
    pub fn with_backend(parameters: &So3Parameters, sht: S) -> Result<Self, So3Error> {
        Self::plan(&mut FftContext::new(), parameters, sht)
    }

    fn plan(ctx: &mut FftContext, parameters: &So3Parameters, sht: S) -> Result<Self, So3Error> {
        check_band_limits(parameters.l, parameters.n)?;
        if sht.band_limit() != parameters.l {
            return Err(So3Error::InvalidArgument(format!(
                "spherical harmonic backend has band-limit {}, expected {}",
                sht.band_limit(),
                parameters.l
            )));
        }
        let ng = ngamma(parameters.n);
        let batch = n_slice_samples(parameters.l);
        Ok(Self {
            parameters: parameters.clone(),
            sht,
            gamma_forward: ctx.plan_batched(ng, batch, FftDirection::Forward),
            gamma_inverse: ctx.plan_batched(ng, batch, FftDirection::Inverse),
        })
    }

    /// The parameters of the plan.
    pub fn parameters(&self) -> &So3Parameters {
        &self.parameters
    }

    /// The spin spherical harmonic transform backend.
    pub fn backend(&self) -> &S {
        &self.sht
    }

    /// Number of Wigner coefficients in the storage layout of the plan.
    pub fn flmn_size(&self) -> usize {
        flmn_size(self.parameters.l, self.parameters.n, &self.parameters.storage)
    }

    /// Number of samples on the MW grid of the plan.
    pub fn n_samples(&self) -> usize {
        n_samples(self.parameters.l, self.parameters.n)
    }

    fn check_buffers(&self, nflmn: usize, nf: usize) -> Result<(), So3Error> {
        if nflmn != self.flmn_size() {
            return Err(So3Error::InvalidArgument(format!(
                "coefficient buffer has length {nflmn}, expected {} for {}",
                self.flmn_size(),
                self.parameters.storage
            )));
        }
        if nf != self.n_samples() {
            return Err(So3Error::InvalidArgument(format!(
                "sample buffer has length {nf}, expected {}",
                self.n_samples()
            )));
        }
        Ok(())
    }
}

// =========
// Functions
// =========

/// Computes the inverse SO(3) transform of `flmn`, planning afresh.
///
/// # Arguments
///
/// * `flmn` - Wigner coefficients in the `storage` layout.
/// * `l` - The harmonic band-limit $`L`$.
/// * `n` - The orientational band-limit $`N`$.
/// * `storage` - The storage layout of `flmn`.
///
/// # Returns
///
/// The $`(2N-1)L(2L-1)`$ samples on the MW grid, with $`\gamma`$ slowest and $`\alpha`$
/// fastest.
///
/// # Errors
///
/// Errors when the band-limits or the length of `flmn` are invalid, when temporary storage
/// cannot be allocated, or when the spherical harmonic backend fails.
pub fn inverse(
    flmn: &[C128],
    l: usize,
    n: usize,
    storage: &Storage,
) -> Result<Vec<C128>, So3Error> {
    So3Transform::new(&So3Parameters::new(l, n, *storage))?.inverse(flmn)
}

/// Computes the forward SO(3) transform of the MW samples `f`, planning afresh.
///
/// # Arguments
///
/// * `f` - Samples on the MW grid, with $`\gamma`$ slowest and $`\alpha`$ fastest.
/// * `l` - The harmonic band-limit $`L`$.
/// * `n` - The orientational band-limit $`N`$.
/// * `storage` - The storage layout of the returned coefficients.
///
/// # Errors
///
/// Errors when the band-limits or the length of `f` are invalid, when temporary storage cannot
/// be allocated, or when the spherical harmonic backend fails.
pub fn forward(f: &[C128], l: usize, n: usize, storage: &Storage) -> Result<Vec<C128>, So3Error> {
    So3Transform::new(&So3Parameters::new(l, n, *storage))?.forward(f)
}
