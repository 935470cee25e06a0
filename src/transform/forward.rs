use std::f64::consts::PI;

use log;

use crate::io::format::so3_output;
use crate::sampling::{n_slice_samples, ngamma};
use crate::sht::SpinSphericalTransform;
use crate::transform::{cyclic_offset, try_zeroed, So3Error, So3Transform, C128};

impl<S: SpinSphericalTransform> So3Transform<S> {
    /// Analyses MW samples into Wigner coefficients in a new buffer.
    ///
    /// # Errors
    ///
    /// See [`Self::forward_into`].
    pub fn forward(&self, f: &[C128]) -> Result<Vec<C128>, So3Error> {
        let mut flmn = try_zeroed(self.flmn_size(), "coefficient buffer")?;
        self.forward_into(&mut flmn, f)?;
        Ok(flmn)
    }

    /// Analyses MW samples into Wigner coefficients.
    ///
    /// # Arguments
    ///
    /// * `flmn` - The output coefficients in the storage layout of the plan, fully overwritten.
    /// Padded entries with $`\ell < |n|`$ are set to zero.
    /// * `f` - The samples on the MW grid.
    ///
    /// # Errors
    ///
    /// Errors when a buffer has the wrong length, when temporary storage cannot be allocated or
    /// when the spherical harmonic backend fails.
    pub fn forward_into(&self, flmn: &mut [C128], f: &[C128]) -> Result<(), So3Error> {
        self.check_buffers(flmn.len(), f.len())?;
        let (l, nn) = (self.parameters.l, self.parameters.n);
        let storage = &self.parameters.storage;
        if self.parameters.verbosity > 0 {
            so3_output!("Forward SO(3) transform with L = {l}, N = {nn} ({storage})");
        }
        log::debug!("Forward SO(3) transform with L = {l}, N = {nn} ({storage}).");

        let nslice = n_slice_samples(l);
        let ng = ngamma(nn);
        let mut fn_slices = try_zeroed(ng * nslice, "orientational slices")?;
        self.gamma_forward.process(f, &mut fn_slices)?;
        let scale = 2.0 * PI / ng as f64;
        fn_slices.iter_mut().for_each(|x| *x *= scale);

        let mut flm = try_zeroed(l * l, "harmonic slice")?;
        let norms = (0..l)
            .map(|el| (4.0 * PI / (2 * el + 1) as f64).sqrt())
            .collect::<Vec<_>>();

        let nmax = nn as i64 - 1;
        for n in -nmax..=nmax {
            let offset = cyclic_offset(n, nn);
            let slice = &fn_slices[offset * nslice..(offset + 1) * nslice];
            self.sht.forward(&mut flm, slice, -n)?;
            let sign = if n.rem_euclid(2) == 1 { -1.0 } else { 1.0 };
            for (el, norm) in norms.iter().enumerate() {
                flm[el * el..(el + 1) * (el + 1)]
                    .iter_mut()
                    .for_each(|x| *x *= sign * norm);
            }

            let block = storage.block(n, l, nn)?;
            flmn[block.range.clone()].copy_from_slice(&flm[block.dense_range()]);
        }
        Ok(())
    }
}
