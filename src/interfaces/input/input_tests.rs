use crate::angmom::wigner_d::DlMethod;
use crate::interfaces::InputHandle;
use crate::io::{read_so3_yaml, write_so3_yaml};
use crate::storage::Storage;

use super::Input;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_interfaces_input_round_trips() {
    let name = format!("{ROOT}/tests/input/test_input_round_trips.yml");
    let inp = read_so3_yaml::<Input, _>(&name).unwrap();
    assert_eq!(inp.round_trips.len(), 2);

    let rt_params = &inp.round_trips[0];
    assert_eq!(rt_params.l, 5);
    assert_eq!(rt_params.n, 3);
    assert_eq!(
        rt_params.storages,
        vec![Storage::NEG_FIRST_COMPACT, Storage::ZERO_FIRST_PAD]
    );
    assert_eq!(rt_params.dl_method, DlMethod::Explicit);
    assert_eq!(rt_params.seed, 7);
    assert_eq!(rt_params.tolerance, 1e-9);
    assert!(rt_params.result_save_name.is_none());

    let rt_params = &inp.round_trips[1];
    assert_eq!(rt_params.storages, Storage::ALL.to_vec());
    assert_eq!(rt_params.dl_method, DlMethod::Recursive);
    assert_eq!(rt_params.tolerance, 1e-10);

    inp.handle().unwrap();
}

#[test]
fn test_interfaces_input_empty() {
    let name = format!("{ROOT}/tests/input/test_input_empty.yml");
    let inp = read_so3_yaml::<Input, _>(&name).unwrap();
    assert!(inp.round_trips.is_empty());
    inp.handle().unwrap();
}

#[test]
fn test_interfaces_input_failures_are_counted() {
    let mut inp = Input::default();
    inp.round_trips[0].l = 2;
    inp.round_trips[0].n = 3;
    let err = inp.handle().unwrap_err();
    assert!(err.to_string().contains("1 of 1"));
}

#[test]
fn test_interfaces_input_yaml_round_trip() {
    let name = std::env::temp_dir().join(format!("so3-input-{}", std::process::id()));
    let inp = Input::default();
    write_so3_yaml(&name, &inp).unwrap();
    let mut path = name.clone();
    path.set_extension("yml");
    let inp_rec = read_so3_yaml::<Input, _>(&path).unwrap();
    assert_eq!(inp_rec.round_trips, inp.round_trips);
    std::fs::remove_file(path).unwrap();
}
