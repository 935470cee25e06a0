//! Nice SO(3) output formatting.

use std::fmt;

use log;

const SO3_BANNER_LENGTH: usize = 89;

/// Logs an error to the `so3-output` logger.
macro_rules! so3_error {
    ($fmt:expr $(, $($arg:tt)*)?) => {
        log::error!($fmt, $($($arg)*)?);
        log::error!(target: "so3-output", $fmt, $($($arg)*)?);
    }
}

/// Logs a warning to the `so3-output` logger.
macro_rules! so3_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::warn!(target: "so3-output", $fmt, $($($arg)*)?); }
}

/// Logs a main output line to the `so3-output` logger.
macro_rules! so3_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "so3-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {so3_error, so3_output, so3_warn};

/// Writes a nicely formatted section title.
pub(crate) fn write_title(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    let length = title.chars().count().max(SO3_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    writeln!(f, "┌──{bar}──┐")?;
    writeln!(f, "│§ {title:^length$} §│")?;
    writeln!(f, "└──{bar}──┘")?;
    Ok(())
}

/// Logs a nicely formatted section title to the `so3-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(SO3_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    so3_output!("┌──{bar}──┐");
    so3_output!("│§ {title:^length$} §│");
    so3_output!("└──{bar}──┘");
}

/// Writes a nicely formatted subtitle.
pub(crate) fn write_subtitle(f: &mut fmt::Formatter<'_>, subtitle: &str) -> fmt::Result {
    let bar = "═".repeat(subtitle.chars().count());
    writeln!(f, "{subtitle}")?;
    writeln!(f, "{bar}")?;
    Ok(())
}

/// Logs a nicely formatted subtitle to the `so3-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let bar = "═".repeat(subtitle.chars().count());
    so3_output!("{}", subtitle);
    so3_output!("{}", bar);
}

/// Logs a nicely formatted macro-section beginning to the `so3-output` logger.
pub(crate) fn log_macsec_begin(sectitle: &str) {
    let width = SO3_BANNER_LENGTH - 14;
    let sectitle_space = sectitle.to_string() + " ";
    so3_output!("❬❬❬❬❬ [Begin] {sectitle_space:❬<width$}");
}

/// Logs a nicely formatted macro-section ending to the `so3-output` logger.
pub(crate) fn log_macsec_end(sectitle: &str) {
    let width = SO3_BANNER_LENGTH - 14;
    let sectitle_space = sectitle.to_string() + " ";
    so3_output!("❭❭❭❭❭ [ End ] {sectitle_space:❭<width$}");
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// Formats a floating-point error in scientific notation with a fixed width.
pub(crate) fn nice_error(x: f64) -> String {
    format!("{x:>+12.3e}")
}

/// A trait for logging SO(3) outputs nicely.
pub(crate) trait So3Output: fmt::Debug + fmt::Display {
    /// Logs display output nicely.
    fn log_output_display(&self) {
        let lines = self.to_string();
        lines.lines().for_each(|line| {
            so3_output!("{line}");
        })
    }
}

// Blanket implementation
impl<T> So3Output for T where T: fmt::Debug + fmt::Display {}
