//! YAML input files for the `so3` binary.

use anyhow::{self, format_err};
use serde::{Deserialize, Serialize};

use crate::drivers::round_trip::{RoundTripDriver, RoundTripParams};
use crate::drivers::So3Driver;
use crate::interfaces::InputHandle;
use crate::io::format::{log_macsec_begin, log_macsec_end, so3_error, so3_output, so3_warn};
#[allow(unused_imports)]
use crate::io::So3FileType;

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;

/// A structure containing `so3` input parameters which can be serialised into and deserialised
/// from a YAML input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Input {
    /// Specifications for round-trip validations, run in order. Each result can optionally be
    /// saved as an [`So3FileType::Rtp`] binary file.
    ///
    /// # Default
    ///
    /// If not specified, no validations will be performed.
    #[serde(default)]
    pub round_trips: Vec<RoundTripParams>,
}

impl Default for Input {
    fn default() -> Self {
        Input {
            round_trips: vec![RoundTripParams::default()],
        }
    }
}

impl InputHandle for Input {
    fn handle(&self) -> Result<(), anyhow::Error> {
        if self.round_trips.is_empty() {
            so3_warn!("No round-trip validations requested.");
            return Ok(());
        }
        let nfailed = self
            .round_trips
            .iter()
            .enumerate()
            .filter_map(|(i, params)| {
                let title = format!("Round trip {}", i + 1);
                log_macsec_begin(&title);
                so3_output!("");
                let res = RoundTripDriver::builder()
                    .parameters(params)
                    .build()
                    .map_err(|err| format_err!(err))
                    .and_then(|mut rt_driver| rt_driver.run());
                if let Err(err) = res.as_ref() {
                    so3_error!("{err}");
                }
                log_macsec_end(&title);
                so3_output!("");
                res.err()
            })
            .count();
        if nfailed > 0 {
            Err(format_err!(
                "{nfailed} of {} round-trip validations have failed.",
                self.round_trips.len()
            ))
        } else {
            Ok(())
        }
    }
}
