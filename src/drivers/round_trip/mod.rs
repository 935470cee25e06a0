//! Round-trip validation of SO(3) transforms.
//!
//! Random Wigner coefficients are synthesised onto the MW grid and analysed back for every
//! requested storage layout, and the samples so obtained are in turn analysed and resynthesised.
//! Both reconstructions must agree with their inputs to within a tolerance.

use std::fmt;

use anyhow::{bail, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use log;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::angmom::wigner_d::DlMethod;
use crate::drivers::So3Driver;
use crate::io::format::{
    log_subtitle, log_title, nice_bool, nice_error, so3_output, write_title, So3Output,
};
use crate::io::{write_so3_binary, So3FileType};
use crate::storage::{elmn_of, Storage};
use crate::transform::{So3Error, So3Parameters, So3Transform, C128};

#[cfg(test)]
#[path = "round_trip_tests.rs"]
mod round_trip_tests;

// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

fn default_storages() -> Vec<Storage> {
    Storage::ALL.to_vec()
}

fn default_tolerance() -> f64 {
    1.0e-10
}

/// A structure containing control parameters for round-trip validation.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundTripParams {
    /// The harmonic band-limit $`L`$.
    pub l: usize,

    /// The orientational band-limit $`N`$.
    pub n: usize,

    /// The storage layouts to be validated, in order.
    #[builder(setter(custom), default = "default_storages()")]
    #[serde(default = "default_storages")]
    pub storages: Vec<Storage>,

    /// The method used to evaluate Wigner small-d functions.
    #[builder(default)]
    #[serde(default)]
    pub dl_method: DlMethod,

    /// The seed of the random coefficients.
    #[builder(default = "0")]
    #[serde(default)]
    pub seed: u64,

    /// The largest admissible relative reconstruction error.
    #[builder(default = "default_tolerance()")]
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Optional name for saving the result as a binary file of type [`So3FileType::Rtp`]. If
    /// `None`, the result will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<String>,
}

impl RoundTripParams {
    /// Returns a builder to construct a [`RoundTripParams`] structure.
    pub fn builder() -> RoundTripParamsBuilder {
        RoundTripParamsBuilder::default()
    }

    /// Returns the transform parameters for one storage layout.
    fn transform_parameters(&self, storage: Storage) -> So3Parameters {
        So3Parameters {
            l: self.l,
            n: self.n,
            storage,
            dl_method: self.dl_method,
            verbosity: 0,
        }
    }
}

impl RoundTripParamsBuilder {
    pub fn storages(&mut self, storages: &[Storage]) -> &mut Self {
        self.storages = Some(storages.to_vec());
        self
    }
}

impl Default for RoundTripParams {
    fn default() -> Self {
        Self {
            l: 8,
            n: 4,
            storages: default_storages(),
            dl_method: DlMethod::default(),
            seed: 0,
            tolerance: default_tolerance(),
            result_save_name: None,
        }
    }
}

impl fmt::Display for RoundTripParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Harmonic band-limit L: {}", self.l)?;
        writeln!(f, "Orientational band-limit N: {}", self.n)?;
        writeln!(
            f,
            "Storage layouts: {}",
            self.storages.iter().map(|s| format!("[{s}]")).join(", ")
        )?;
        writeln!(f, "Wigner-d method: {}", self.dl_method)?;
        writeln!(f, "Random seed: {}", self.seed)?;
        writeln!(f, "Tolerance: {:.3e}", self.tolerance)?;
        writeln!(
            f,
            "Save round-trip results to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                format!("{name}.{}", So3FileType::Rtp.ext())
            } else {
                nice_bool(false)
            }
        )?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure containing the reconstruction errors for one storage layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundTripRecord {
    /// The storage layout.
    pub storage: Storage,

    /// The number of stored coefficients.
    pub flmn_size: usize,

    /// The largest absolute error of the reconstructed coefficients.
    pub coefficient_abs_error: f64,

    /// The largest absolute error of the reconstructed coefficients relative to the largest
    /// coefficient.
    pub coefficient_rel_error: f64,

    /// The largest absolute error of the reconstructed samples relative to the largest sample.
    pub sample_rel_error: f64,
}

impl RoundTripRecord {
    /// The larger of the two relative errors.
    pub fn max_rel_error(&self) -> f64 {
        self.coefficient_rel_error.max(self.sample_rel_error)
    }
}

/// A structure to contain round-trip validation results.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct RoundTripResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: RoundTripParams,

    /// The number of samples on the MW grid.
    pub n_samples: usize,

    /// The reconstruction errors, one record per storage layout.
    pub records: Vec<RoundTripRecord>,
}

impl RoundTripResult {
    /// Returns a builder to construct a [`RoundTripResult`] structure.
    fn builder() -> RoundTripResultBuilder {
        RoundTripResultBuilder::default()
    }

    /// The largest relative error over all storage layouts.
    pub fn max_rel_error(&self) -> f64 {
        self.records
            .iter()
            .map(RoundTripRecord::max_rel_error)
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for RoundTripResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_title(f, "Round-Trip Summary")?;
        writeln!(f)?;
        let storage_length = self
            .records
            .iter()
            .map(|record| record.storage.to_string().chars().count())
            .max()
            .unwrap_or(7)
            .max(7);
        writeln!(f, "{}", "┈".repeat(storage_length + 58))?;
        writeln!(
            f,
            "{:<storage_length$} {:>9} {:>15} {:>15} {:>15}",
            "Storage", "Size", "Coeff. abs.", "Coeff. rel.", "Sample rel."
        )?;
        writeln!(f, "{}", "┈".repeat(storage_length + 58))?;
        for record in self.records.iter() {
            writeln!(
                f,
                "{:<storage_length$} {:>9} {:>15} {:>15} {:>15}",
                record.storage.to_string(),
                record.flmn_size,
                nice_error(record.coefficient_abs_error),
                nice_error(record.coefficient_rel_error),
                nice_error(record.sample_rel_error),
            )?;
        }
        writeln!(f, "{}", "┈".repeat(storage_length + 58))?;
        writeln!(f, "Number of samples: {}", self.n_samples)?;
        writeln!(f, "Largest relative error: {:.3e}", self.max_rel_error())?;
        writeln!(f)?;
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for round-trip validation of SO(3) transforms.
#[derive(Clone, Builder)]
pub struct RoundTripDriver<'a> {
    /// The control parameters for round-trip validation.
    parameters: &'a RoundTripParams,

    /// The result of the round-trip validation.
    #[builder(setter(skip), default = "None")]
    result: Option<RoundTripResult>,
}

impl<'a> RoundTripDriver<'a> {
    /// Returns a builder to construct a [`RoundTripDriver`] structure.
    pub fn builder() -> RoundTripDriverBuilder<'a> {
        RoundTripDriverBuilder::default()
    }

    /// Validates one storage layout.
    fn validate_storage(&self, storage: Storage) -> Result<RoundTripRecord, So3Error> {
        let params = self.parameters;
        let plan = So3Transform::new(&params.transform_parameters(storage))?;
        let mut rng = StdRng::seed_from_u64(params.seed);
        let flmn = random_coefficients(params.l, params.n, &storage, &mut rng)?;

        let f = plan.inverse(&flmn)?;
        let flmn_rec = plan.forward(&f)?;
        let f_rec = plan.inverse(&flmn_rec)?;

        let coefficient_abs_error = max_abs_difference(&flmn_rec, &flmn);
        Ok(RoundTripRecord {
            storage,
            flmn_size: plan.flmn_size(),
            coefficient_abs_error,
            coefficient_rel_error: coefficient_abs_error / max_abs(&flmn).max(f64::MIN_POSITIVE),
            sample_rel_error: max_abs_difference(&f_rec, &f) / max_abs(&f).max(f64::MIN_POSITIVE),
        })
    }

    /// Executes round-trip validation.
    fn validate_round_trips(&mut self) -> Result<(), anyhow::Error> {
        log_title("SO(3) Transform Round Trips");
        so3_output!("");
        let params = self.parameters;
        params.log_output_display();

        if params.storages.is_empty() {
            bail!("No storage layouts to validate.");
        }

        log_subtitle("Validating storage layouts");
        so3_output!("");
        let records = params
            .storages
            .iter()
            .map(|storage| {
                log::debug!("Validating round trips for {storage}.");
                self.validate_storage(*storage)
                    .map_err(|err| format_err!("Round trip for [{storage}] has failed: {err}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let result = RoundTripResult::builder()
            .parameters(params.clone())
            .n_samples(crate::sampling::n_samples(params.l, params.n))
            .records(records)
            .build()
            .map_err(|err| format_err!(err))?;
        result.log_output_display();

        if let Some(name) = params.result_save_name.as_ref() {
            write_so3_binary(name, So3FileType::Rtp, &result)?;
            so3_output!(
                "Round-trip results saved as {name}.{}.",
                So3FileType::Rtp.ext()
            );
            so3_output!("");
        }

        let max_rel_error = result.max_rel_error();
        self.result = Some(result);
        if max_rel_error > params.tolerance {
            bail!(
                "Largest relative round-trip error {:.3e} exceeds the tolerance {:.3e}.",
                max_rel_error,
                params.tolerance
            );
        }
        Ok(())
    }
}

impl So3Driver for RoundTripDriver<'_> {
    type Params = RoundTripParams;

    type Outcome = RoundTripResult;

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No round-trip results found."))
    }

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.validate_round_trips()
    }
}

// =========
// Functions
// =========

/// Draws random coefficients uniformly from the unit square at every stored triple with
/// $`\ell \ge |n|`$. Padded entries below the triangle are zero.
pub fn random_coefficients<R: Rng>(
    l: usize,
    nn: usize,
    storage: &Storage,
    rng: &mut R,
) -> Result<Vec<C128>, So3Error> {
    let size = crate::storage::flmn_size(l, nn, storage);
    (0..size)
        .map(|offset| {
            let (el, _, n) = elmn_of(offset, l, nn, storage)?;
            if (el as i64) < n.abs() {
                Ok(C128::default())
            } else {
                Ok(C128::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            }
        })
        .collect()
}

fn max_abs(x: &[C128]) -> f64 {
    x.iter().map(|v| v.norm()).fold(0.0, f64::max)
}

fn max_abs_difference(x: &[C128], y: &[C128]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| (a - b).norm())
        .fold(0.0, f64::max)
}
