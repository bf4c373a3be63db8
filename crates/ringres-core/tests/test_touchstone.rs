//! Touchstone reader tests against the fixture files

use approx::assert_relative_eq;
use ringres_core::error::DataFormatError;
use ringres_core::network::Network;
use ringres_core::touchstone::{SParamFormat, Touchstone};
use ringres_core::Spectrum;

const TEST_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/data");

#[test]
fn test_read_ring_fixture() {
    let path = format!("{}/ring.s2p", TEST_DATA_DIR);
    let ts = Touchstone::from_file(&path).expect("Failed to load file");

    assert_eq!(ts.nports, 2);
    assert_eq!(ts.nfreq(), 1001);
    assert_eq!(ts.format, SParamFormat::MA);
    assert_eq!(ts.z0[0], 50.0);
    assert_eq!(ts.comments.len(), 2);

    let f = ts.frequency.f();
    assert_relative_eq!(f[0], 0.5e9, epsilon = 1.0);
    assert_relative_eq!(f[1000], 5.5e9, epsilon = 1.0);

    // v1 column order is S11 S21 S12 S22
    assert_relative_eq!(ts.s[0][1][0].norm(), 0.011151162, epsilon = 1e-9);
    assert_relative_eq!(ts.s[0][0][0].norm(), 0.999937824, epsilon = 1e-9);
}

#[test]
fn test_network_name_from_file_stem() {
    let path = format!("{}/ring.s2p", TEST_DATA_DIR);
    let ntwk = Network::from_touchstone(&path).unwrap();
    assert_eq!(ntwk.name.as_deref(), Some("ring"));
    assert_eq!(ntwk.nports(), 2);
}

#[test]
fn test_spectrum_from_fixture() {
    let s = Spectrum::load(format!("{}/ring.s2p", TEST_DATA_DIR)).unwrap();
    assert_eq!(s.len(), 1001);
    assert!(s.freq_hz().windows(2).all(|w| w[1] > w[0]));
    assert_relative_eq!(s.s21_db()[0], 20.0 * 0.011151162_f64.log10(), epsilon = 1e-9);
}

#[test]
fn test_one_port_has_no_s21() {
    let err = Spectrum::load(format!("{}/reflection.s1p", TEST_DATA_DIR)).unwrap_err();
    assert!(matches!(err, DataFormatError::MissingS21 { nports: 1 }));
}

#[test]
fn test_non_monotonic_frequency_reports_index() {
    let err = Spectrum::load(format!("{}/non_monotonic.s2p", TEST_DATA_DIR)).unwrap_err();
    match err {
        DataFormatError::NonMonotonicFrequency { index, .. } => assert_eq!(index, 3),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Spectrum::load(format!("{}/does_not_exist.s2p", TEST_DATA_DIR)).unwrap_err();
    assert!(matches!(err, DataFormatError::Io(_)));
}

#[test]
fn test_bad_extension() {
    let err = Spectrum::load(format!("{}/ring.toml", TEST_DATA_DIR)).unwrap_err();
    assert!(matches!(err, DataFormatError::InvalidExtension));
}

#[test]
fn test_synthetic_network_round_trip() {
    let ring = ringres_core::SyntheticRing {
        npoints: 201,
        ..ringres_core::SyntheticRing::fr4()
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("synthetic.s2p");
    ring.network().write_touchstone(&path, SParamFormat::DB).unwrap();

    let original = ring.spectrum().unwrap();
    let reread = Spectrum::load(&path).unwrap();
    assert_eq!(reread.len(), original.len());
    for (a, b) in original.points().zip(reread.points()) {
        assert_relative_eq!(a.0, b.0, max_relative = 1e-9);
        assert_relative_eq!(a.1, b.1, epsilon = 1e-6);
    }
}
