use std::f64::consts::PI;

use approx;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::angmom::wigner_d::{wigner_big_d, DlMethod};
use crate::sampling::{alpha, beta, gamma, grid_dimensions, sample_index};
use crate::sht::MwSpinTransform;
use crate::storage::{elmn_of, index_of, Storage};
use crate::transform::{forward, inverse, So3Error, So3Parameters, So3Transform, C128};

/// Random coefficients in the valid region `el >= |n|`, zero elsewhere.
fn random_flmn(l: usize, nn: usize, storage: &Storage, seed: u64) -> Vec<C128> {
    let mut rng = StdRng::seed_from_u64(seed);
    let size = crate::storage::flmn_size(l, nn, storage);
    (0..size)
        .map(|offset| {
            let (el, _, n) = elmn_of(offset, l, nn, storage).unwrap();
            if (el as i64) < n.abs() {
                C128::default()
            } else {
                C128::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
            }
        })
        .collect()
}

fn assert_close(a: &[C128], b: &[C128], tol: f64) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        approx::assert_relative_eq!(x.re, y.re, epsilon = tol, max_relative = tol);
        approx::assert_relative_eq!(x.im, y.im, epsilon = tol, max_relative = tol);
    }
}

#[test]
fn test_transform_round_trip_all_storages() {
    for (i, storage) in Storage::ALL.iter().enumerate() {
        for (l, nn) in [(6, 4), (5, 5), (4, 1)] {
            let params = So3Parameters::new(l, nn, *storage);
            let plan = So3Transform::new(&params).unwrap();
            let flmn = random_flmn(l, nn, storage, 100 + i as u64);
            let f = plan.inverse(&flmn).unwrap();
            assert_eq!(f.len(), plan.n_samples());
            let flmn_rec = plan.forward(&f).unwrap();
            assert_close(&flmn_rec, &flmn, 1e-10);
        }
    }
}

#[test]
fn test_transform_samples_round_trip() {
    let (l, nn) = (5, 3);
    let storage = Storage::NEG_FIRST_COMPACT;
    let plan = So3Transform::new(&So3Parameters::new(l, nn, storage)).unwrap();
    let f = plan.inverse(&random_flmn(l, nn, &storage, 17)).unwrap();
    let f_rec = plan.inverse(&plan.forward(&f).unwrap()).unwrap();
    assert_close(&f_rec, &f, 1e-10);
}

#[test]
fn test_transform_layout_equivalence() {
    let (l, nn) = (5, 3);
    let reference = random_flmn(l, nn, &Storage::ZERO_FIRST_PAD, 23);
    let f_reference = inverse(&reference, l, nn, &Storage::ZERO_FIRST_PAD).unwrap();
    for storage in Storage::ALL.iter() {
        let mut flmn = vec![C128::default(); crate::storage::flmn_size(l, nn, storage)];
        for (offset, value) in reference.iter().enumerate() {
            let (el, m, n) = elmn_of(offset, l, nn, &Storage::ZERO_FIRST_PAD).unwrap();
            if el as i64 >= n.abs() {
                flmn[index_of(el, m, n, l, nn, storage).unwrap()] = *value;
            }
        }
        let f = inverse(&flmn, l, nn, storage).unwrap();
        assert_close(&f, &f_reference, 1e-13);

        let flmn_rec = forward(&f, l, nn, storage).unwrap();
        assert_close(&flmn_rec, &flmn, 1e-10);
    }
}

#[test]
fn test_transform_padded_ignores_structural_zeros() {
    let (l, nn) = (4, 3);
    let storage = Storage::ZERO_FIRST_PAD;
    let plan = So3Transform::new(&So3Parameters::new(l, nn, storage)).unwrap();
    let clean = random_flmn(l, nn, &storage, 5);
    let mut dirty = clean.clone();
    for (offset, value) in dirty.iter_mut().enumerate() {
        let (el, _, n) = elmn_of(offset, l, nn, &storage).unwrap();
        if (el as i64) < n.abs() {
            *value = C128::new(3.0, -7.0);
        }
    }
    let f_clean = plan.inverse(&clean).unwrap();
    let f_dirty = plan.inverse(&dirty).unwrap();
    assert_close(&f_dirty, &f_clean, 1e-14);

    // Analysis writes exact zeros below the triangle.
    let flmn = plan.forward(&f_dirty).unwrap();
    for (offset, value) in flmn.iter().enumerate() {
        let (el, _, n) = elmn_of(offset, l, nn, &storage).unwrap();
        if (el as i64) < n.abs() {
            assert_eq!(*value, C128::default());
        }
    }
}

#[test]
fn test_transform_sizes() {
    let pad = So3Transform::new(&So3Parameters::new(4, 2, Storage::ZERO_FIRST_PAD)).unwrap();
    let compact =
        So3Transform::new(&So3Parameters::new(4, 2, Storage::NEG_FIRST_COMPACT)).unwrap();
    assert_eq!(pad.flmn_size(), 48);
    assert_eq!(compact.flmn_size(), 46);
    assert_eq!(pad.n_samples(), 7 * 4 * 3);
    assert_eq!(grid_dimensions(4, 2), (7, 4, 3));
    assert_eq!(pad.parameters().storage, Storage::ZERO_FIRST_PAD);
    assert_eq!(compact.backend().dl_method(), DlMethod::Recursive);
}

#[test]
fn test_transform_minimal() {
    let (l, nn) = (2, 1);
    for storage in Storage::ALL.iter() {
        let flmn = random_flmn(l, nn, storage, 1);
        assert_eq!(flmn.len(), 4);
        let f = inverse(&flmn, l, nn, storage).unwrap();
        assert_eq!(f.len(), 3 * 2);
        assert_close(&forward(&f, l, nn, storage).unwrap(), &flmn, 1e-12);
    }
}

#[test]
fn test_transform_single_coefficient_is_wigner_function() {
    let (l, nn) = (4, 3);
    let storage = Storage::ZERO_FIRST_COMPACT;
    let plan = So3Transform::new(&So3Parameters::new(l, nn, storage)).unwrap();
    let (na, nb, ng) = grid_dimensions(l, nn);
    for (el, m, n) in [(0usize, 0i64, 0i64), (2, -1, 1), (3, 2, -2), (3, -3, 2), (1, 1, -1)] {
        let mut flmn = vec![C128::default(); plan.flmn_size()];
        flmn[index_of(el, m, n, l, nn, &storage).unwrap()] = C128::new(1.0, 0.0);
        let f = plan.inverse(&flmn).unwrap();
        let scale = (2 * el + 1) as f64 / (8.0 * PI * PI);
        for g in 0..ng {
            for b in 0..nb {
                for a in 0..na {
                    let angles = (alpha(a, l), beta(b, l), gamma(g, nn));
                    let expected = wigner_big_d(el, m, n, angles).conj() * scale;
                    let value = f[sample_index(a, b, g, l)];
                    approx::assert_relative_eq!(value.re, expected.re, epsilon = 1e-12);
                    approx::assert_relative_eq!(value.im, expected.im, epsilon = 1e-12);
                }
            }
        }
        let flmn_rec = plan.forward(&f).unwrap();
        assert_close(&flmn_rec, &flmn, 1e-10);
    }
}

#[test]
fn test_transform_dl_methods_agree() {
    let (l, nn) = (6, 3);
    let storage = Storage::NEG_FIRST_PAD;
    let flmn = random_flmn(l, nn, &storage, 41);
    let recursive = So3Transform::new(&So3Parameters::new(l, nn, storage)).unwrap();
    let explicit = So3Transform::new(
        &So3Parameters::builder()
            .l(l)
            .n(nn)
            .storage(storage)
            .dl_method(DlMethod::Explicit)
            .verbosity(1)
            .build()
            .unwrap(),
    )
    .unwrap();
    assert_close(
        &explicit.inverse(&flmn).unwrap(),
        &recursive.inverse(&flmn).unwrap(),
        1e-10,
    );
}

#[test]
fn test_transform_round_trip_each_dl_method_large_band_limit() {
    let (l, nn) = (24, 6);
    let storage = Storage::NEG_FIRST_COMPACT;
    let flmn = random_flmn(l, nn, &storage, 24);
    for method in [DlMethod::Recursive, DlMethod::Explicit] {
        let plan = So3Transform::new(
            &So3Parameters::builder()
                .l(l)
                .n(nn)
                .storage(storage)
                .dl_method(method)
                .build()
                .unwrap(),
        )
        .unwrap();
        let flmn_rec = plan.forward(&plan.inverse(&flmn).unwrap()).unwrap();
        assert_close(&flmn_rec, &flmn, 1e-10);
    }
}

#[test]
fn test_transform_concurrent_calls() {
    let (l, nn) = (5, 3);
    let storage = Storage::ZERO_FIRST_COMPACT;
    let plan = So3Transform::new(&So3Parameters::new(l, nn, storage)).unwrap();
    let inputs = (0..8u64)
        .map(|seed| random_flmn(l, nn, &storage, seed))
        .collect::<Vec<_>>();
    let sequential = inputs
        .iter()
        .map(|flmn| plan.inverse(flmn).unwrap())
        .collect::<Vec<_>>();
    let concurrent = inputs
        .par_iter()
        .map(|flmn| {
            let f = plan.inverse(flmn).unwrap();
            let flmn_rec = plan.forward(&f).unwrap();
            (f, flmn_rec)
        })
        .collect::<Vec<_>>();
    for ((flmn, f_seq), (f_par, flmn_rec)) in inputs.iter().zip(sequential.iter()).zip(concurrent)
    {
        assert_eq!(&f_par, f_seq);
        assert_close(&flmn_rec, flmn, 1e-10);
    }
}

#[test]
fn test_transform_into_preserves_inputs() {
    let (l, nn) = (3, 2);
    let storage = Storage::NEG_FIRST_PAD;
    let plan = So3Transform::new(&So3Parameters::new(l, nn, storage)).unwrap();
    let flmn = random_flmn(l, nn, &storage, 3);
    let flmn_copy = flmn.clone();
    let mut f = vec![C128::new(9.0, 9.0); plan.n_samples()];
    plan.inverse_into(&mut f, &flmn).unwrap();
    assert_eq!(flmn, flmn_copy);
    assert_eq!(f, plan.inverse(&flmn).unwrap());

    let f_copy = f.clone();
    let mut flmn_rec = vec![C128::new(9.0, 9.0); plan.flmn_size()];
    plan.forward_into(&mut flmn_rec, &f).unwrap();
    assert_eq!(f, f_copy);
    assert_close(&flmn_rec, &flmn, 1e-10);
}

#[test]
fn test_transform_invalid_arguments() {
    assert!(matches!(
        So3Transform::new(&So3Parameters::new(3, 4, Storage::default())),
        Err(So3Error::InvalidArgument(_))
    ));
    assert!(matches!(
        So3Transform::new(&So3Parameters::new(0, 0, Storage::default())),
        Err(So3Error::InvalidArgument(_))
    ));
    assert!(matches!(
        inverse(&[C128::default(); 4], 2, 0, &Storage::default()),
        Err(So3Error::InvalidArgument(_))
    ));

    let plan = So3Transform::new(&So3Parameters::new(4, 2, Storage::ZERO_FIRST_COMPACT)).unwrap();
    let mut f = vec![C128::default(); plan.n_samples()];
    assert!(matches!(
        plan.inverse_into(&mut f, &vec![C128::default(); 48]),
        Err(So3Error::InvalidArgument(_))
    ));
    let mut flmn = vec![C128::default(); 46];
    assert!(matches!(
        plan.forward_into(&mut flmn, &vec![C128::default(); 83]),
        Err(So3Error::InvalidArgument(_))
    ));
    assert!(matches!(
        plan.forward(&vec![C128::default(); 85]),
        Err(So3Error::InvalidArgument(_))
    ));

    let sht = MwSpinTransform::new(5, DlMethod::Recursive).unwrap();
    assert!(matches!(
        So3Transform::with_backend(&So3Parameters::new(4, 2, Storage::default()), sht),
        Err(So3Error::InvalidArgument(_))
    ));
}

#[test]
fn test_transform_custom_backend() {
    let sht = MwSpinTransform::new(4, DlMethod::Explicit).unwrap();
    let params = So3Parameters::new(4, 2, Storage::NEG_FIRST_COMPACT);
    let plan = So3Transform::with_backend(&params, sht).unwrap();
    let flmn = random_flmn(4, 2, &params.storage, 77);
    assert_close(&plan.forward(&plan.inverse(&flmn).unwrap()).unwrap(), &flmn, 1e-10);
}

#[test]
fn test_transform_parameters_serde() {
    let params = So3Parameters::builder()
        .l(8)
        .n(3)
        .storage(Storage::NEG_FIRST_COMPACT)
        .build()
        .unwrap();
    let yaml = serde_yaml::to_string(&params).unwrap();
    let params_rec: So3Parameters = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(params, params_rec);

    let minimal: So3Parameters = serde_yaml::from_str("l: 4\nn: 2\n").unwrap();
    assert_eq!(minimal, So3Parameters::new(4, 2, Storage::ZERO_FIRST_PAD));
    assert!(params.to_string().contains("negative-first, compact"));
}
