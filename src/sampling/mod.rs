//! Sampling geometry of the McEwen–Wiaux (MW) equiangular grid on SO(3).
//!
//! A function on SO(3) with harmonic band-limit $`L`$ and orientational band-limit $`N`$ is
//! sampled at the Euler angles
//!
//! ```math
//! \alpha_a = \frac{2\pi a}{2L-1},\quad
//! \beta_b = \frac{\pi(2b+1)}{2L-1},\quad
//! \gamma_g = \frac{2\pi g}{2N-1},
//! ```
//!
//! with $`0 \le a < 2L-1`$, $`0 \le b < L`$ and $`0 \le g < 2N-1`$. Samples are stored
//! row-major with $`\gamma`$ varying slowest and $`\alpha`$ fastest.

use std::f64::consts::PI;

use ndarray::{ArrayView3, ArrayViewMut3};

use crate::transform::So3Error;

#[cfg(test)]
#[path = "sampling_tests.rs"]
mod sampling_tests;

/// Returns the number of $`\alpha`$ samples for harmonic band-limit `l`.
///
/// The band-limit is not validated; `l = 0` yields an empty extent.
#[must_use]
pub fn nalpha(l: usize) -> usize {
    (2 * l).saturating_sub(1)
}

/// Returns the number of $`\beta`$ samples for harmonic band-limit `l`.
#[must_use]
pub fn nbeta(l: usize) -> usize {
    l
}

/// Returns the number of $`\gamma`$ samples for orientational band-limit `n`.
///
/// The band-limit is not validated; `n = 0` yields an empty extent.
#[must_use]
pub fn ngamma(n: usize) -> usize {
    (2 * n).saturating_sub(1)
}

/// Returns the grid extents $`(n_\alpha, n_\beta, n_\gamma)`$ of the MW sampling on SO(3).
///
/// # Arguments
///
/// * `l` - The harmonic band-limit $`L \ge 1`$.
/// * `n` - The orientational band-limit $`N \ge 1`$.
///
/// # Returns
///
/// The triple $`(2L-1, L, 2N-1)`$. Band-limits are not validated here (see
/// [`crate::storage::check_band_limits`]); a zero band-limit yields zero extents.
#[must_use]
pub fn grid_dimensions(l: usize, n: usize) -> (usize, usize, usize) {
    (nalpha(l), nbeta(l), ngamma(n))
}

/// Returns the number of samples in one orientational slice, *i.e.* the number of samples on the
/// sphere, $`L(2L-1)`$.
#[must_use]
pub fn n_slice_samples(l: usize) -> usize {
    nbeta(l) * nalpha(l)
}

/// Returns the total number of samples $`(2L-1)L(2N-1)`$ on SO(3).
#[must_use]
pub fn n_samples(l: usize, n: usize) -> usize {
    n_slice_samples(l) * ngamma(n)
}

/// Returns the angle $`\alpha_a`$ in radians.
#[must_use]
pub fn alpha(a: usize, l: usize) -> f64 {
    2.0 * PI * a as f64 / nalpha(l) as f64
}

/// Returns the angle $`\beta_b`$ in radians. Indices `b >= l` continue the equiangular grid
/// beyond $`\pi`$, which is used for the periodic extension in $`\beta`$.
#[must_use]
pub fn beta(b: usize, l: usize) -> f64 {
    PI * (2 * b + 1) as f64 / nalpha(l) as f64
}

/// Returns the angle $`\gamma_g`$ in radians.
#[must_use]
pub fn gamma(g: usize, n: usize) -> f64 {
    2.0 * PI * g as f64 / ngamma(n) as f64
}

/// Returns the flat offset of sample $`(\alpha_a, \beta_b, \gamma_g)`$.
#[must_use]
pub fn sample_index(a: usize, b: usize, g: usize, l: usize) -> usize {
    g * n_slice_samples(l) + b * nalpha(l) + a
}

/// Views a flat sample buffer as a three-dimensional array indexed by $`(g, b, a)`$.
///
/// # Errors
///
/// Errors when the length of `f` is not $`(2L-1)L(2N-1)`$.
pub fn samples_view<T>(f: &[T], l: usize, n: usize) -> Result<ArrayView3<T>, So3Error> {
    let (na, nb, ng) = grid_dimensions(l, n);
    ArrayView3::from_shape((ng, nb, na), f).map_err(|_| {
        So3Error::InvalidArgument(format!(
            "sample buffer of length {} cannot be viewed with shape ({ng}, {nb}, {na})",
            f.len()
        ))
    })
}

/// Views a mutable flat sample buffer as a three-dimensional array indexed by $`(g, b, a)`$.
///
/// # Errors
///
/// Errors when the length of `f` is not $`(2L-1)L(2N-1)`$.
pub fn samples_view_mut<T>(
    f: &mut [T],
    l: usize,
    n: usize,
) -> Result<ArrayViewMut3<T>, So3Error> {
    let (na, nb, ng) = grid_dimensions(l, n);
    let len = f.len();
    ArrayViewMut3::from_shape((ng, nb, na), f).map_err(|_| {
        So3Error::InvalidArgument(format!(
            "sample buffer of length {len} cannot be viewed with shape ({ng}, {nb}, {na})"
        ))
    })
}
