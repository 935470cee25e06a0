//! Exact spin spherical harmonic transforms on the McEwen–Wiaux sampling.
//!
//! Synthesis evaluates the Wigner small-d functions on the $`L`$ colatitude samples and runs
//! one inverse FFT per ring. Analysis first extends the signal in $`\theta`$ to a
//! $`2\pi`$-periodic function using
//! $`{}_sF_m(2\pi - \theta) = (-1)^{m+s}\, {}_sF_m(\theta)`$, recovers its Fourier series
//! exactly from the $`2L-1`$ equiangular samples, and integrates against
//! $`\sin\theta`$ over $`[0, \pi]`$ in closed form. See McEwen, J. D. & Wiaux, Y. A Novel
//! Sampling Theorem on the Sphere. *IEEE Transactions on Signal Processing* **59**,
//! 5876–5887 (2011), [DOI](https://doi.org/10.1109/TSP.2011.2166394).

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use rayon::prelude::*;
use rustfft::{Fft, FftDirection};

use crate::angmom::wigner_d::{wigner_d_table, DlMethod};
use crate::fft::FftContext;
use crate::sampling::{beta, n_slice_samples, nalpha};
use crate::sht::{SpinSphericalTransform, SphericalTransformError};
use crate::transform::C128;

#[cfg(test)]
#[path = "mw_tests.rs"]
mod mw_tests;

/// Returns $`(-1)^k`$.
fn parity(k: i64) -> f64 {
    if k.rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Returns $`\int_0^\pi e^{ip\theta} \sin\theta\, d\theta`$.
fn sine_weight(p: i64) -> C128 {
    match p {
        1 => C128::new(0.0, PI / 2.0),
        -1 => C128::new(0.0, -PI / 2.0),
        _ if p.rem_euclid(2) == 0 => C128::new(2.0 / (1.0 - (p * p) as f64), 0.0),
        _ => C128::new(0.0, 0.0),
    }
}

/// Structure for spin spherical harmonic transforms at band-limit $`L`$ on the MW grid.
///
/// All quantities depending only on $`L`$ are precomputed, so one instance can serve any number
/// of transforms and spins, from any number of threads.
#[derive(Clone)]
pub struct MwSpinTransform {
    /// The harmonic band-limit.
    l: usize,

    /// The method for evaluating Wigner small-d functions.
    dl_method: DlMethod,

    /// The $`2L-1`$ colatitudes of the periodic extension. The first $`L`$ are the MW samples.
    thetas: Vec<f64>,

    /// $`e^{-iq\theta_t}`$ indexed by `(q + L - 1, t)`.
    phases: Array2<C128>,

    /// The ring transforms of length $`2L-1`$.
    phi_forward: Arc<dyn Fft<f64>>,
    phi_inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for MwSpinTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MwSpinTransform")
            .field("l", &self.l)
            .field("dl_method", &self.dl_method)
            .finish()
    }
}

impl MwSpinTransform {
    /// Prepares transforms at band-limit `l`.
    ///
    /// # Errors
    ///
    /// Errors when `l` is zero.
    pub fn new(l: usize, dl_method: DlMethod) -> Result<Self, SphericalTransformError> {
        Self::with_context(&mut FftContext::new(), l, dl_method)
    }

    /// Prepares transforms at band-limit `l`, drawing FFT plans from `ctx`.
    ///
    /// # Errors
    ///
    /// Errors when `l` is zero.
    pub fn with_context(
        ctx: &mut FftContext,
        l: usize,
        dl_method: DlMethod,
    ) -> Result<Self, SphericalTransformError> {
        if l == 0 {
            return Err(SphericalTransformError(
                "band-limit must be positive".to_string(),
            ));
        }
        let nphi = nalpha(l);
        let thetas = (0..nphi).map(|t| beta(t, l)).collect::<Vec<_>>();
        let lm1 = l as i64 - 1;
        let phases = Array2::from_shape_fn((nphi, nphi), |(qi, t)| {
            C128::from_polar(1.0, -((qi as i64 - lm1) as f64) * thetas[t])
        });
        Ok(Self {
            l,
            dl_method,
            thetas,
            phases,
            phi_forward: ctx.plan(nphi, FftDirection::Forward),
            phi_inverse: ctx.plan(nphi, FftDirection::Inverse),
        })
    }

    /// Returns the method for evaluating Wigner small-d functions.
    pub fn dl_method(&self) -> DlMethod {
        self.dl_method
    }

    fn check_lengths(&self, nf: usize, nflm: usize) -> Result<(), SphericalTransformError> {
        if nf != n_slice_samples(self.l) {
            return Err(SphericalTransformError(format!(
                "expected {} samples, got {nf}",
                n_slice_samples(self.l)
            )));
        }
        if nflm != self.l * self.l {
            return Err(SphericalTransformError(format!(
                "expected {} harmonic coefficients, got {nflm}",
                self.l * self.l
            )));
        }
        Ok(())
    }

    /// Returns the FFT bin holding azimuthal order `m`.
    fn bin(&self, m: i64) -> usize {
        m.rem_euclid(nalpha(self.l) as i64) as usize
    }
}

impl SpinSphericalTransform for MwSpinTransform {
    fn band_limit(&self) -> usize {
        self.l
    }

    fn inverse(
        &self,
        f: &mut [C128],
        flm: &[C128],
        spin: i64,
    ) -> Result<(), SphericalTransformError> {
        self.check_lengths(f.len(), flm.len())?;
        f.iter_mut().for_each(|x| *x = C128::default());
        let l = self.l;
        let lm1 = l as i64 - 1;
        if spin.unsigned_abs() as usize >= l {
            return Ok(());
        }
        let nphi = nalpha(l);
        let spin_sign = parity(spin);

        // Fourier coefficients in phi of every ring, one column per azimuthal order.
        let columns = (-lm1..=lm1)
            .into_par_iter()
            .map(|m| {
                let l0 = m.unsigned_abs().max(spin.unsigned_abs()) as usize;
                let table = wigner_d_table(m, -spin, l, &self.thetas[..l], self.dl_method);
                (0..l)
                    .map(|t| {
                        (l0..l)
                            .map(|el| {
                                let eli = el as i64;
                                let norm = spin_sign * ((2 * el + 1) as f64 / (4.0 * PI)).sqrt();
                                flm[(eli * eli + eli + m) as usize] * (norm * table[(t, el)])
                            })
                            .sum::<C128>()
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        for (m, column) in (-lm1..=lm1).zip(columns.iter()) {
            let k = self.bin(m);
            for (t, value) in column.iter().enumerate() {
                f[t * nphi + k] = *value;
            }
        }
        let mut scratch = vec![C128::default(); self.phi_inverse.get_inplace_scratch_len()];
        self.phi_inverse.process_with_scratch(f, &mut scratch);
        Ok(())
    }

    fn forward(
        &self,
        flm: &mut [C128],
        f: &[C128],
        spin: i64,
    ) -> Result<(), SphericalTransformError> {
        self.check_lengths(f.len(), flm.len())?;
        flm.iter_mut().for_each(|x| *x = C128::default());
        let l = self.l;
        let lm1 = l as i64 - 1;
        if spin.unsigned_abs() as usize >= l {
            return Ok(());
        }
        let nphi = nalpha(l);
        let nphi_f = nphi as f64;
        let spin_sign = parity(spin);

        // Fourier coefficients in phi of every ring.
        let mut rings = f.to_vec();
        let mut scratch = vec![C128::default(); self.phi_forward.get_inplace_scratch_len()];
        self.phi_forward.process_with_scratch(&mut rings, &mut scratch);
        rings.iter_mut().for_each(|x| *x /= nphi_f);

        let coefficients = (-lm1..=lm1)
            .into_par_iter()
            .map(|m| {
                let k = self.bin(m);
                let mirror = parity(m + spin);

                // Periodic extension in theta.
                let extended = (0..nphi)
                    .map(|t| {
                        if t < l {
                            rings[t * nphi + k]
                        } else {
                            rings[(2 * l - 2 - t) * nphi + k] * mirror
                        }
                    })
                    .collect::<Vec<_>>();

                // Fourier series of the extension in theta, indexed by m' + L - 1.
                let series = (0..nphi)
                    .map(|qi| {
                        extended
                            .iter()
                            .zip(self.phases.row(qi).iter())
                            .map(|(x, p)| x * p)
                            .sum::<C128>()
                            / nphi_f
                    })
                    .collect::<Vec<_>>();

                // Integrals of the extension against e^{iq theta} sin(theta) over [0, pi].
                let moments = (-lm1..=lm1)
                    .map(|q| {
                        (-lm1..=lm1)
                            .zip(series.iter())
                            .map(|(mdash, g)| g * sine_weight(mdash + q))
                            .sum::<C128>()
                    })
                    .collect::<Vec<_>>();

                // Quadrature weights on the extended grid.
                let weights = (0..nphi)
                    .map(|t| {
                        moments
                            .iter()
                            .zip(self.phases.column(t).iter())
                            .map(|(kq, p)| kq * p)
                            .sum::<C128>()
                            / nphi_f
                    })
                    .collect::<Vec<_>>();

                let l0 = m.unsigned_abs().max(spin.unsigned_abs()) as usize;
                let table = wigner_d_table(m, -spin, l, &self.thetas, self.dl_method);
                (l0..l)
                    .map(|el| {
                        let eli = el as i64;
                        let norm =
                            spin_sign * ((2 * el + 1) as f64 / (4.0 * PI)).sqrt() * 2.0 * PI;
                        let integral = weights
                            .iter()
                            .enumerate()
                            .map(|(t, w)| *w * table[(t, el)])
                            .sum::<C128>();
                        ((eli * eli + eli + m) as usize, integral * norm)
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        coefficients
            .into_iter()
            .flatten()
            .for_each(|(ind, value)| flm[ind] = value);
        Ok(())
    }
}
