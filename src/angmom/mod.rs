//! Angular momentum functions needed for harmonic analysis on the sphere and on SO(3).

pub mod wigner_d;
