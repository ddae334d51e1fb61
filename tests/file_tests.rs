//! Integration tests for opening, probing and closing stores.

mod common;

use common::StoreBuilder;
use tempfile::tempdir;
use vaspout::raw::{EntryKind, File, Kind, OpenOptions, Scalar};
use vaspout::store::ODataset;
use vaspout::util::CLOSED_MESSAGE;
use vaspout::{Error, PlainOldDataType};

#[test]
fn test_open_directory_resolves_default_filename() {
    let dir = tempdir().expect("Failed to create temp dir");
    let written = StoreBuilder::new().write_in(dir.path());

    let file = File::open(dir.path()).expect("Failed to open directory");
    assert_eq!(file.path(), written.as_path());
    assert!(!file.is_closed());

    let by_path = File::open(&written).expect("Failed to open file path");
    assert_eq!(by_path.path(), written.as_path());
}

#[test]
fn test_open_missing_file_is_access_error() {
    let dir = tempdir().unwrap();
    let err = File::open(dir.path()).unwrap_err();

    assert!(err.is_access(), "unexpected error: {:?}", err);
    assert!(err.to_string().contains("vaspout.h5"));
    let source = std::error::Error::source(&err).expect("open failure keeps its cause");
    assert!(source.to_string().contains("File not found"));
}

#[test]
fn test_open_non_store_is_access_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vaspout.h5");
    std::fs::write(&path, b"this is not a store, just some text").unwrap();

    match File::open(&path) {
        Err(Error::Access { source: Some(source), .. }) => {
            assert!(matches!(*source, Error::InvalidMagic));
        }
        other => panic!("expected access error, got {:?}", other),
    }
}

#[test]
fn test_close_is_idempotent() {
    let dir = tempdir().unwrap();
    StoreBuilder::new().write_in(dir.path());
    let file = File::open(dir.path()).unwrap();

    file.close();
    file.close();
    assert!(file.is_closed());
}

#[test]
fn test_read_after_close_fails() {
    let dir = tempdir().unwrap();
    StoreBuilder::full().write_in(dir.path());
    let file = File::open(dir.path()).unwrap();
    file.close();

    let err = file.structure().unwrap_err();
    assert!(err.is_access());
    assert_eq!(err.to_string(), CLOSED_MESSAGE);

    assert!(file.version().unwrap_err().is_access());
    for kind in Kind::ALL {
        let err = kind.availability(&file).unwrap_err();
        assert!(err.is_access(), "{}: {:?}", kind, err);
    }
    assert!(file.cell().unwrap_err().is_access());
    assert!(file.topology().unwrap_err().is_access());
    assert!(file.magnetism().unwrap_err().is_access());
    assert!(file.trajectory().unwrap_err().is_access());
    assert!(file.dos().unwrap_err().is_access());
    assert!(file.band().unwrap_err().is_access());
    assert!(file.kpoints().unwrap_err().is_access());
    assert!(file.projectors().unwrap_err().is_access());
    assert!(file.energy().unwrap_err().is_access());
    assert!(file.density().unwrap_err().is_access());
    assert!(file.read_scalar("version/major").unwrap_err().is_access());
    assert!(file.bind_optional::<f64>("results/positions/scale").unwrap_err().is_access());
    assert!(file.bind_array::<f64>("results/positions/scale").unwrap_err().is_access());
    assert!(file.children("").unwrap_err().is_access());
}

#[test]
fn test_probe_after_close_reports_missing() {
    let dir = tempdir().unwrap();
    StoreBuilder::full().write_in(dir.path());
    let file = File::open(dir.path()).unwrap();
    assert!(file.path_exists("results/positions"));

    file.close();
    assert!(!file.path_exists("results/positions"));
}

#[test]
fn test_lazy_array_read_after_close_fails() {
    let dir = tempdir().unwrap();
    StoreBuilder::full().write_in(dir.path());
    let file = File::open(dir.path()).unwrap();

    let dos = file.dos().unwrap();
    let energies = dos.primary().expect("dos present").energies.clone();
    assert!(energies.is_valid());
    assert_eq!(energies.read().unwrap().len(), common::NUM_ENERGIES);

    file.close();
    assert!(!energies.is_valid());
    let err = energies.read().unwrap_err();
    assert!(err.is_access());
}

#[test]
fn test_lazy_array_read_after_drop_fails() {
    let dir = tempdir().unwrap();
    StoreBuilder::full().write_in(dir.path());

    let positions = {
        let file = File::open(dir.path()).unwrap();
        let structure = file.structure().unwrap();
        structure.primary().unwrap().positions.clone()
    };

    assert!(!positions.is_valid());
    assert!(positions.read().unwrap_err().is_access());
    // metadata stays available without the file
    assert_eq!(positions.shape().sizes(), &[common::NUM_IONS, 3]);
}

#[test]
fn test_path_exists() {
    let dir = tempdir().unwrap();
    StoreBuilder::new().structure().write_in(dir.path());
    let file = File::open(dir.path()).unwrap();

    assert!(file.path_exists(""));
    assert!(file.path_exists("results"));
    assert!(file.path_exists("results/positions"));
    assert!(file.path_exists("results/positions/scale"));
    assert!(file.path_exists("/results/positions/"));
    assert!(!file.path_exists("results/electron_dos"));
    assert!(!file.path_exists("results/positions/scale/deeper"));
    assert!(!file.path_exists("input"));
}

#[test]
fn test_bind_missing_and_group_paths() {
    let dir = tempdir().unwrap();
    StoreBuilder::new().structure().write_in(dir.path());
    let file = File::open(dir.path()).unwrap();

    match file.bind_array::<f64>("results/positions/missing") {
        Err(Error::PathNotFound(path)) => assert_eq!(path, "results/positions/missing"),
        other => panic!("expected path error, got {:?}", other),
    }
    assert!(matches!(
        file.bind_array::<f64>("results/positions"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(file.bind_optional::<f64>("results/positions/missing").unwrap().is_none());
    assert!(file.bind_optional::<f64>("results/positions/scale").unwrap().is_some());
}

#[test]
fn test_read_scalars() {
    let dir = tempdir().unwrap();
    StoreBuilder::new()
        .structure()
        .dataset("input/kpoints/mode", ODataset::text("Automatic").unwrap())
        .dataset("input/kpoints/number_kpoints", ODataset::scalar(12i32))
        .write_in(dir.path());
    let file = File::open(dir.path()).unwrap();

    assert_eq!(file.read_scalar("version/major").unwrap(), Scalar::Int(6));
    assert_eq!(file.read_f64("results/positions/scale").unwrap(), 3.9);
    assert_eq!(file.read_i64("input/kpoints/number_kpoints").unwrap(), 12);
    assert_eq!(file.read_string("input/kpoints/mode").unwrap(), "Automatic");

    // integers widen to floats, text never converts
    assert_eq!(file.read_f64("version/minor").unwrap(), 4.0);
    assert!(matches!(
        file.read_i64("input/kpoints/mode"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        file.read_scalar("results/positions/lattice_vectors"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_children_listing() {
    let dir = tempdir().unwrap();
    StoreBuilder::full().write_in(dir.path());
    let file = File::open(dir.path()).unwrap();

    let root: Vec<String> = file.children("").unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(root, vec!["version", "results", "intermediate", "charge", "input"]);

    let positions = file.children("results/positions").unwrap();
    let scale = positions.iter().find(|e| e.name == "scale").unwrap();
    assert!(!scale.is_group());
    match &scale.kind {
        EntryKind::Dataset { element_type, shape, compressed } => {
            assert_eq!(*element_type, PlainOldDataType::Float64);
            assert!(shape.is_scalar());
            assert!(!compressed);
        }
        EntryKind::Group { .. } => panic!("scale is a dataset"),
    }

    let charge = file.children("charge").unwrap();
    assert!(matches!(charge[0].kind, EntryKind::Dataset { compressed: true, .. }));

    assert!(matches!(file.children("nowhere"), Err(Error::PathNotFound(_))));
    assert!(matches!(
        file.children("results/positions/scale"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_open_without_mmap() {
    let dir = tempdir().unwrap();
    StoreBuilder::full().write_in(dir.path());
    let file = OpenOptions::new().mmap(false).open(dir.path()).unwrap();

    let density = file.density().unwrap();
    let charge = density.primary().unwrap().charge.read().unwrap();
    assert_eq!(charge.shape().sizes(), &[1, 4, 4, 4]);
    assert_eq!(charge.values()[5], 1.25);

    file.close();
    assert!(density.primary().unwrap().charge.read().unwrap_err().is_access());
}

#[test]
fn test_debug_shows_state() {
    let dir = tempdir().unwrap();
    StoreBuilder::new().write_in(dir.path());
    let file = File::open(dir.path()).unwrap();

    assert!(format!("{:?}", file).contains("closed: false"));
    file.close();
    assert!(format!("{:?}", file).contains("closed: true"));
}

#[test]
fn test_wrap_open_streams() {
    let dir = tempdir().unwrap();
    let path = StoreBuilder::new().structure().write_in(dir.path());
    let streams = vaspout::store::IStreams::open(&path).unwrap();

    let file = File::from_streams(streams, &path);
    assert_eq!(file.path(), path.as_path());
    assert!(file.structure().unwrap().primary().is_some());
}

#[test]
fn test_hdf5_file_is_rejected() {
    let dir = tempdir().unwrap();
    let mut bytes = b"\x89HDF\r\n\x1a\n".to_vec();
    bytes.resize(64, 0);
    std::fs::write(dir.path().join(File::DEFAULT_FILENAME), &bytes).unwrap();

    let err = File::open(dir.path()).unwrap_err();
    assert!(err.is_access());
    let source = std::error::Error::source(&err).unwrap();
    assert!(source.to_string().contains("VOUT5"));
}
