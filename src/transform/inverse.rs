use std::f64::consts::PI;

use log;
use num_traits::Zero;

use crate::io::format::so3_output;
use crate::sampling::{n_slice_samples, ngamma};
use crate::sht::SpinSphericalTransform;
use crate::transform::{cyclic_offset, try_zeroed, So3Error, So3Transform, C128};

impl<S: SpinSphericalTransform> So3Transform<S> {
    /// Synthesises MW samples from Wigner coefficients into a new buffer.
    ///
    /// # Errors
    ///
    /// See [`Self::inverse_into`].
    pub fn inverse(&self, flmn: &[C128]) -> Result<Vec<C128>, So3Error> {
        let mut f = try_zeroed(self.n_samples(), "sample buffer")?;
        self.inverse_into(&mut f, flmn)?;
        Ok(f)
    }

    /// Synthesises MW samples from Wigner coefficients.
    ///
    /// # Arguments
    ///
    /// * `f` - The output samples, fully overwritten.
    /// * `flmn` - The Wigner coefficients in the storage layout of the plan. Padded entries with
    /// $`\ell < |n|`$ are ignored.
    ///
    /// # Errors
    ///
    /// Errors when a buffer has the wrong length, when temporary storage cannot be allocated or
    /// when the spherical harmonic backend fails. `f` is left untouched in every case.
    pub fn inverse_into(&self, f: &mut [C128], flmn: &[C128]) -> Result<(), So3Error> {
        self.check_buffers(flmn.len(), f.len())?;
        let (l, nn) = (self.parameters.l, self.parameters.n);
        let storage = &self.parameters.storage;
        if self.parameters.verbosity > 0 {
            so3_output!("Inverse SO(3) transform with L = {l}, N = {nn} ({storage})");
        }
        log::debug!("Inverse SO(3) transform with L = {l}, N = {nn} ({storage}).");

        let nslice = n_slice_samples(l);
        let mut fn_slices = try_zeroed(ngamma(nn) * nslice, "orientational slices")?;
        let mut flm = try_zeroed(l * l, "harmonic slice")?;
        let norms = (0..l)
            .map(|el| ((2 * el + 1) as f64 / (16.0 * PI.powi(3))).sqrt())
            .collect::<Vec<_>>();

        let nmax = nn as i64 - 1;
        for n in -nmax..=nmax {
            let block = storage.block(n, l, nn)?;
            flm.iter_mut().for_each(|x| x.set_zero());
            flm[block.dense_range()].copy_from_slice(&flmn[block.range.clone()]);
            for (el, norm) in norms.iter().enumerate() {
                flm[el * el..(el + 1) * (el + 1)]
                    .iter_mut()
                    .for_each(|x| *x *= *norm);
            }

            let offset = cyclic_offset(n, nn);
            let slice = &mut fn_slices[offset * nslice..(offset + 1) * nslice];
            self.sht.inverse(slice, &flm, -n)?;
            if n.rem_euclid(2) == 1 {
                slice.iter_mut().for_each(|x| *x = -*x);
            }
        }

        self.gamma_inverse.process(&fn_slices, f)?;
        Ok(())
    }
}
