//! Explicitly owned discrete Fourier transform plans.
//!
//! Plans are created from an [`FftContext`] and are immutable afterwards, so they can be shared
//! between threads and reused across transforms of the same shape. Nothing is cached globally.

use std::fmt;
use std::sync::Arc;

use ndarray::{ArrayView2, ArrayViewMut2};
use rustfft::{Direction, Fft, FftDirection, FftPlanner};

use crate::transform::{try_zeroed, So3Error, C128};


/// Structure owning a planner from which discrete Fourier transform plans are drawn.
pub struct FftContext {
    planner: FftPlanner<f64>,
}

impl FftContext {
    /// Creates an empty planning context.
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
        }
    }

    /// Plans a one-dimensional unnormalised transform of length `len`.
    pub fn plan(&mut self, len: usize, direction: FftDirection) -> Arc<dyn Fft<f64>> {
        self.planner.plan_fft(len, direction)
    }

    /// Plans a batched, strided one-dimensional transform.
    ///
    /// # Arguments
    ///
    /// * `len` - The length of each transform.
    /// * `batch` - The number of independent transforms.
    /// * `direction` - The direction of the transforms.
    pub fn plan_batched(&mut self, len: usize, batch: usize, direction: FftDirection) -> BatchedFft {
        BatchedFft {
            fft: self.plan(len, direction),
            len,
            batch,
        }
    }
}

impl Default for FftContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Structure for a batch of `batch` independent transforms of length `len`, where element `k` of
/// transform `j` is stored at offset `k * batch + j`.
///
/// This is the layout of a row-major `(len, batch)` array transformed along its first axis.
#[derive(Clone)]
pub struct BatchedFft {
    fft: Arc<dyn Fft<f64>>,
    len: usize,
    batch: usize,
}

impl fmt::Debug for BatchedFft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchedFft")
            .field("len", &self.len)
            .field("batch", &self.batch)
            .field("direction", &self.fft.fft_direction())
            .finish()
    }
}

impl BatchedFft {
    /// The length of each transform.
    pub fn len(&self) -> usize {
        self.len
    }

    /// The number of transforms in the batch.
    pub fn batch(&self) -> usize {
        self.batch
    }

    /// The direction of the transforms.
    pub fn direction(&self) -> FftDirection {
        self.fft.fft_direction()
    }

    /// Executes the batch out of place. `input` is left untouched.
    ///
    /// # Errors
    ///
    /// Errors when the buffer lengths do not match `len * batch` or when the transposition
    /// workspace cannot be allocated.
    pub fn process(&self, input: &[C128], output: &mut [C128]) -> Result<(), So3Error> {
        let shape = (self.len, self.batch);
        let input = ArrayView2::from_shape(shape, input).map_err(|_| {
            So3Error::InvalidArgument(format!(
                "batched FFT input of length {} does not match {} × {}",
                input.len(),
                self.len,
                self.batch
            ))
        })?;
        let output_len = output.len();
        let mut output = ArrayViewMut2::from_shape(shape, output).map_err(|_| {
            So3Error::InvalidArgument(format!(
                "batched FFT output of length {output_len} does not match {} × {}",
                self.len, self.batch
            ))
        })?;

        // Transpose so that every transform is contiguous, which lets rustfft run the whole
        // batch in a single call.
        let mut work = try_zeroed(self.len * self.batch, "batched FFT workspace")?;
        ArrayViewMut2::from_shape((self.batch, self.len), work.as_mut_slice())
            .map_err(|err| So3Error::InvalidArgument(err.to_string()))?
            .assign(&input.t());
        let mut scratch = try_zeroed(self.fft.get_inplace_scratch_len(), "FFT scratch")?;
        if !work.is_empty() {
            self.fft.process_with_scratch(&mut work, &mut scratch);
        }
        let work = ArrayView2::from_shape((self.batch, self.len), work.as_slice())
            .map_err(|err| So3Error::InvalidArgument(err.to_string()))?;
        output.assign(&work.t());
        Ok(())
    }
}
