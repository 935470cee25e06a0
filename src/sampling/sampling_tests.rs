use std::f64::consts::PI;

use approx;

use crate::sampling::{
    alpha, beta, gamma, grid_dimensions, n_samples, sample_index, samples_view, samples_view_mut,
};

#[test]
fn test_sampling_grid_dimensions() {
    assert_eq!(grid_dimensions(4, 2), (7, 4, 3));
    assert_eq!(grid_dimensions(1, 1), (1, 1, 1));
    assert_eq!(grid_dimensions(8, 8), (15, 8, 15));
    assert_eq!(n_samples(4, 2), 7 * 4 * 3);

    // Unvalidated zero band-limits give empty extents.
    assert_eq!(grid_dimensions(3, 0), (5, 3, 0));
    assert_eq!(grid_dimensions(0, 0), (0, 0, 0));
    assert_eq!(n_samples(3, 0), 0);
}

#[test]
fn test_sampling_angles() {
    let l = 4;
    let n = 2;
    approx::assert_relative_eq!(alpha(0, l), 0.0);
    approx::assert_relative_eq!(alpha(1, l), 2.0 * PI / 7.0, epsilon = 1e-15);
    approx::assert_relative_eq!(beta(0, l), PI / 7.0, epsilon = 1e-15);

    // The last beta sample sits on the south pole.
    approx::assert_relative_eq!(beta(l - 1, l), PI, epsilon = 1e-15);
    approx::assert_relative_eq!(gamma(2, n), 4.0 * PI / 3.0, epsilon = 1e-15);

    // Extended beta samples mirror the original ones about pi.
    for b in 0..l - 1 {
        approx::assert_relative_eq!(
            beta(2 * l - 2 - b, l),
            2.0 * PI - beta(b, l),
            epsilon = 1e-14
        );
    }
}

#[test]
fn test_sampling_samples_view() {
    let l = 3;
    let n = 2;
    let f = (0..n_samples(l, n)).collect::<Vec<_>>();
    let view = samples_view(&f, l, n).unwrap();
    assert_eq!(view.shape(), &[3, 3, 5]);
    for g in 0..3 {
        for b in 0..3 {
            for a in 0..5 {
                assert_eq!(view[(g, b, a)], sample_index(a, b, g, l));
            }
        }
    }

    let short = vec![0usize; n_samples(l, n) - 1];
    assert!(samples_view(&short, l, n).is_err());

    let mut g = vec![0.0; n_samples(l, n)];
    samples_view_mut(&mut g, l, n).unwrap()[(1, 2, 4)] = 1.0;
    assert_eq!(g[sample_index(4, 2, 1, l)], 1.0);
}
