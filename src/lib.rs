//! # so3: Wigner transforms on the rotation group
//!
//! `so3` computes forward and inverse Wigner transforms of band-limited functions on the
//! rotation group SO(3) sampled on the McEwen–Wiaux (MW) equiangular grid, with the following
//! capabilities:
//! - exact synthesis and analysis for harmonic band-limit $`L`$ and orientational band-limit
//!   $`N \le L`$,
//! - four interchangeable storage layouts of the Wigner coefficients $`f^{\ell}_{mn}`$ (zero-first
//!   or negative-first ordering of the orientational blocks, padded or compact packing),
//! - bidirectional conversion between coefficient triples $`(\ell, m, n)`$ and flat offsets,
//! - a pluggable spin spherical harmonic transform backend, with an exact MW backend included,
//!   and
//! - round-trip validation runs driven by YAML input files through the `so3` binary.
//!
//! An SO(3) transform is carried out as one spin spherical harmonic transform of spin $`-n`$ for
//! every orientational order $`n`$, combined by a discrete Fourier transform along $`\gamma`$.
//! See McEwen, J. D., Büttner, M., Leistedt, B., Peiris, H. V. & Wiaux, Y. A Novel Sampling
//! Theorem on the Rotation Group. *IEEE Signal Processing Letters* **22**, 2425–2429 (2015),
//! [DOI](https://doi.org/10.1109/LSP.2015.2490676).
//!
//! ## Getting started
//!
//! ```no_run
//! use so3::storage::Storage;
//! use so3::transform::{So3Parameters, So3Transform, C128};
//!
//! let params = So3Parameters::new(8, 4, Storage::ZERO_FIRST_COMPACT);
//! let plan = So3Transform::new(&params).unwrap();
//! let flmn = vec![C128::new(1.0, 0.0); plan.flmn_size()];
//! let f = plan.inverse(&flmn).unwrap();
//! let flmn_rec = plan.forward(&f).unwrap();
//! ```
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0.

pub mod angmom;
pub mod drivers;
pub mod fft;
pub mod interfaces;
pub mod io;
pub mod sampling;
pub mod sht;
pub mod storage;
pub mod transform;
