use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::transform::So3Error;

#[cfg(test)]
#[path = "wigner_d_tests.rs"]
mod wigner_d_tests;

/// Enumerated type for the method used to evaluate Wigner small-d functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DlMethod {
    /// Three-term recursion in the degree $`\ell`$ at fixed $`m`$ and $`n`$, seeded with the
    /// closed form at $`\ell = \max(|m|, |n|)`$.
    Recursive,

    /// Closed form (Wigner's formula in its Jacobi-polynomial form) evaluated independently for
    /// every degree.
    Explicit,
}

impl Default for DlMethod {
    fn default() -> Self {
        DlMethod::Recursive
    }
}

impl fmt::Display for DlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DlMethod::Recursive => write!(f, "recursive"),
            DlMethod::Explicit => write!(f, "explicit"),
        }
    }
}

impl FromStr for DlMethod {
    type Err = So3Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recursive" | "recursion" => Ok(DlMethod::Recursive),
            "explicit" => Ok(DlMethod::Explicit),
            _ => Err(So3Error::InvalidArgument(format!(
                "invalid Wigner-d method `{s}`"
            ))),
        }
    }
}

/// Returns $`\ln k!`$.
fn ln_factorial(k: i64) -> f64 {
    (2..=k).map(|i| (i as f64).ln()).sum()
}

/// Returns $`\ln \binom{p}{q}`$.
fn ln_binomial(p: i64, q: i64) -> f64 {
    ln_factorial(p) - ln_factorial(q) - ln_factorial(p - q)
}

/// Returns the Jacobi polynomial $`P^{(a, b)}_k(x)`$ from its three-term recurrence in $`k`$.
fn jacobi(k: i64, a: i64, b: i64, x: f64) -> f64 {
    let (af, bf) = (a as f64, b as f64);
    let mut p_prev = 1.0;
    if k == 0 {
        return p_prev;
    }
    let mut p = (af + 1.0) + 0.5 * (af + bf + 2.0) * (x - 1.0);
    for i in 2..=k {
        let i = i as f64;
        let s = 2.0 * i + af + bf;
        let c0 = 2.0 * i * (i + af + bf) * (s - 2.0);
        let c1 = (s - 1.0) * (s * (s - 2.0) * x + af * af - bf * bf);
        let c2 = 2.0 * (i + af - 1.0) * (i + bf - 1.0) * s;
        let p_next = (c1 * p - c2 * p_prev) / c0;
        p_prev = p;
        p = p_next;
    }
    p
}

/// Returns the Wigner small-d function $`d^{\ell}_{mn}(\beta)`$ in closed form.
///
/// Wigner's explicit formula
///
/// ```math
/// d^{\ell}_{mn}(\beta) = \sum_s (-1)^{m-n+s}
///     \frac{\sqrt{(\ell+m)!(\ell-m)!(\ell+n)!(\ell-n)!}}
///          {(\ell+n-s)!\,s!\,(m-n+s)!\,(\ell-m-s)!}
///     \cos^{2\ell+n-m-2s}\tfrac{\beta}{2} \sin^{m-n+2s}\tfrac{\beta}{2}
/// ```
///
/// is evaluated through its equivalent Jacobi-polynomial form
///
/// ```math
/// d^{\ell}_{mn}(\beta) = (-1)^{\lambda} \sqrt{\binom{2\ell-k}{k+a} \Big/ \binom{k+b}{b}}
///     \sin^{a}\tfrac{\beta}{2} \cos^{b}\tfrac{\beta}{2} P^{(a, b)}_k(\cos\beta),
/// ```
///
/// where $`k = \min(\ell+m, \ell-m, \ell+n, \ell-n)`$, $`a = |m - n|`$ and $`b = 2\ell - 2k - a`$.
/// The alternating sum cancels catastrophically as $`\ell`$ grows, whereas the polynomial
/// recurrence stays accurate, so every degree can be evaluated independently at any band-limit
/// representable in double precision.
///
/// The convention is such that $`D^{\ell}_{mn}(\alpha, \beta, \gamma) = e^{-im\alpha}
/// d^{\ell}_{mn}(\beta) e^{-in\gamma}`$.
///
/// # Arguments
///
/// * `el` - The degree $`\ell`$.
/// * `m` - The first order $`m`$.
/// * `n` - The second order $`n`$.
/// * `beta` - The angle $`\beta`$ in radians. Any real value is accepted.
///
/// # Returns
///
/// The value $`d^{\ell}_{mn}(\beta)`$, which is zero whenever $`|m| > \ell`$ or $`|n| > \ell`$.
#[must_use]
pub fn wigner_d_explicit(el: usize, m: i64, n: i64, beta: f64) -> f64 {
    let j = el as i64;
    if m.abs() > j || n.abs() > j {
        return 0.0;
    }
    let k = (j + n).min(j - n).min(j + m).min(j - m);
    // The phase is non-trivial only when the lowest index comes from `n` below `m` or from `m`
    // above `n`.
    let (a, lambda) = if k == j + n || k == j - m {
        (m - n, m - n)
    } else {
        (n - m, 0)
    };
    let b = 2 * j - 2 * k - a;
    let sign = if lambda % 2 == 0 { 1.0 } else { -1.0 };
    let norm = (0.5 * (ln_binomial(2 * j - k, k + a) - ln_binomial(k + b, b))).exp();
    sign * norm
        * (0.5 * beta).sin().powi(a as i32)
        * (0.5 * beta).cos().powi(b as i32)
        * jacobi(k, a, b, beta.cos())
}

/// Returns $`d^{\ell}_{mn}(\beta)`$ for all degrees $`0 \le \ell < L`$ at fixed $`m`$ and $`n`$.
///
/// Degrees below $`\max(|m|, |n|)`$ are returned as zero.
///
/// # Arguments
///
/// * `m` - The first order $`m`$.
/// * `n` - The second order $`n`$.
/// * `l` - The band-limit $`L`$ (number of degrees).
/// * `beta` - The angle $`\beta`$ in radians.
/// * `method` - The evaluation method.
#[must_use]
pub fn wigner_d_degrees(m: i64, n: i64, l: usize, beta: f64, method: DlMethod) -> Vec<f64> {
    let mut d = vec![0.0; l];
    let l0 = m.unsigned_abs().max(n.unsigned_abs()) as usize;
    if l0 >= l {
        return d;
    }
    match method {
        DlMethod::Explicit => {
            for (el, d_el) in d.iter_mut().enumerate().skip(l0) {
                *d_el = wigner_d_explicit(el, m, n, beta);
            }
        }
        DlMethod::Recursive => {
            d[l0] = wigner_d_explicit(l0, m, n, beta);
            if l0 + 1 >= l {
                return d;
            }
            let cb = beta.cos();
            let start = if l0 == 0 {
                // The recursion coefficient of d^{j+1} vanishes at j = 0.
                d[1] = cb;
                1
            } else {
                l0
            };
            let (mf, nf) = (m as f64, n as f64);
            for j in start..l - 1 {
                let jf = j as f64;
                let jp = jf + 1.0;
                let a = (2.0 * jf + 1.0) * (jf * jp * cb - mf * nf);
                let b = jp * ((jf * jf - mf * mf) * (jf * jf - nf * nf)).sqrt();
                let c = jf * ((jp * jp - mf * mf) * (jp * jp - nf * nf)).sqrt();
                d[j + 1] = (a * d[j] - b * d[j - 1]) / c;
            }
        }
    }
    d
}

/// Tabulates $`d^{\ell}_{mn}(\beta_b)`$ for a set of angles.
///
/// # Returns
///
/// An array of shape `(betas.len(), l)` whose element `(b, el)` is $`d^{\ell}_{mn}(\beta_b)`$.
#[must_use]
pub fn wigner_d_table(m: i64, n: i64, l: usize, betas: &[f64], method: DlMethod) -> Array2<f64> {
    let mut table = Array2::<f64>::zeros((betas.len(), l));
    for (mut row, beta) in table.rows_mut().into_iter().zip(betas.iter()) {
        row.iter_mut()
            .zip(wigner_d_degrees(m, n, l, *beta, method))
            .for_each(|(x, d)| *x = d);
    }
    table
}

/// Returns the Wigner rotation matrix element
///
/// ```math
/// D^{\ell}_{mn}(\alpha, \beta, \gamma) = e^{-im\alpha} d^{\ell}_{mn}(\beta) e^{-in\gamma}
/// ```
///
/// with the Euler angles following the $`z-y-z`$ convention.
#[must_use]
pub fn wigner_big_d(el: usize, m: i64, n: i64, euler_angles: (f64, f64, f64)) -> Complex<f64> {
    let (alpha, beta, gamma) = euler_angles;
    let phase = -(m as f64) * alpha - (n as f64) * gamma;
    Complex::from_polar(wigner_d_explicit(el, m, n, beta), phase)
}
