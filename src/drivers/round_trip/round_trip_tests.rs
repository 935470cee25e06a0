use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::angmom::wigner_d::DlMethod;
use crate::drivers::round_trip::{
    random_coefficients, RoundTripDriver, RoundTripParams, RoundTripResult,
};
use crate::drivers::So3Driver;
use crate::io::{read_so3_binary, So3FileType};
use crate::storage::{elmn_of, flmn_size, Storage};
use crate::transform::C128;

#[test]
fn test_drivers_round_trip_all_storages() {
    let params = RoundTripParams::builder()
        .l(6)
        .n(3)
        .seed(42)
        .build()
        .unwrap();
    assert_eq!(params.storages, Storage::ALL.to_vec());
    let mut rt_driver = RoundTripDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(rt_driver.result().is_err());
    rt_driver.run().unwrap();
    let rt_res = rt_driver.result().unwrap();
    assert_eq!(rt_res.records.len(), 4);
    assert_eq!(rt_res.n_samples, 11 * 6 * 5);
    assert_eq!(rt_res.records[0].flmn_size, 5 * 36);
    assert_eq!(rt_res.records[2].flmn_size, 5 * (3 * 36 - 6) / 3);
    assert!(rt_res.max_rel_error() < 1e-10);

    let output = rt_res.to_string();
    assert!(output.contains("zero-first, padded"));
    assert!(output.contains("negative-first, compact"));
}

#[test]
fn test_drivers_round_trip_failures() {
    let params = RoundTripParams::builder()
        .l(3)
        .n(4)
        .build()
        .unwrap();
    let mut rt_driver = RoundTripDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(rt_driver.run().is_err());
    assert!(rt_driver.result().is_err());

    let params = RoundTripParams::builder()
        .l(3)
        .n(2)
        .storages(&[])
        .build()
        .unwrap();
    let mut rt_driver = RoundTripDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(rt_driver.run().is_err());

    // A negative tolerance can never be met, but the result is still recorded.
    let params = RoundTripParams::builder()
        .l(3)
        .n(2)
        .storages(&[Storage::ZERO_FIRST_COMPACT])
        .tolerance(-1.0)
        .build()
        .unwrap();
    let mut rt_driver = RoundTripDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(rt_driver.run().is_err());
    assert_eq!(rt_driver.result().unwrap().records.len(), 1);
}

#[test]
fn test_drivers_round_trip_save_result() {
    let name = std::env::temp_dir().join(format!("so3-round-trip-{}", std::process::id()));
    let params = RoundTripParams::builder()
        .l(4)
        .n(2)
        .storages(&[Storage::NEG_FIRST_PAD])
        .dl_method(DlMethod::Explicit)
        .result_save_name(Some(name.to_string_lossy().to_string()))
        .build()
        .unwrap();
    let mut rt_driver = RoundTripDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    rt_driver.run().unwrap();

    let saved: RoundTripResult = read_so3_binary(&name, So3FileType::Rtp).unwrap();
    assert_eq!(saved.parameters, params);
    assert_eq!(saved.records, rt_driver.result().unwrap().records);

    let mut path = name.clone();
    path.set_extension(So3FileType::Rtp.ext());
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_drivers_round_trip_random_coefficients() {
    let (l, nn) = (5, 3);
    for storage in Storage::ALL.iter() {
        let mut rng = StdRng::seed_from_u64(9);
        let flmn = random_coefficients(l, nn, storage, &mut rng).unwrap();
        assert_eq!(flmn.len(), flmn_size(l, nn, storage));
        for (offset, value) in flmn.iter().enumerate() {
            let (el, _, n) = elmn_of(offset, l, nn, storage).unwrap();
            if (el as i64) < n.abs() {
                assert_eq!(*value, C128::default());
            } else {
                assert!(value.re.abs() <= 1.0 && value.im.abs() <= 1.0);
                assert_ne!(*value, C128::default());
            }
        }
    }
}
