//! Drivers to carry out SO(3) transform workflows.

use anyhow;

pub mod round_trip;

// =================
// Trait definitions
// =================

/// Trait defining behaviours of `so3` drivers.
pub trait So3Driver {
    /// The type of the parameter structure controlling the driver.
    type Params;

    /// The type of the successful outcome when executing the driver.
    type Outcome;

    /// Executes the driver and stores the result internally.
    fn run(&mut self) -> Result<(), anyhow::Error>;

    /// Returns the result of the driver execution.
    fn result(&self) -> Result<&Self::Outcome, anyhow::Error>;
}
