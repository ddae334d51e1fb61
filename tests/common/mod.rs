//! Fixture stores shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use vaspout::raw::Variant;
use vaspout::store::{OArchive, ODataset, OGroup};

pub const NUM_IONS: usize = 5;
pub const NUM_KPOINTS: usize = 4;
pub const NUM_BANDS: usize = 6;
pub const NUM_ENERGIES: usize = 10;
pub const NUM_STEPS: usize = 2;

/// Builder for output stores laid out like a calculation's result file.
pub struct StoreBuilder {
    root: OGroup,
}

impl StoreBuilder {
    /// Store holding only the writer version.
    pub fn new() -> Self {
        let mut root = OGroup::new();
        root.insert("version/major", ODataset::scalar(6i64)).unwrap();
        root.insert("version/minor", ODataset::scalar(4i64)).unwrap();
        root.insert("version/patch", ODataset::scalar(2i64)).unwrap();
        Self { root }
    }

    /// Every record kind on both k-point grids.
    pub fn full() -> Self {
        Self::new()
            .structure()
            .magnetism()
            .trajectory()
            .energy()
            .density()
            .kpoints(Variant::Default)
            .kpoints(Variant::KpointsOpt)
            .dos(Variant::Default, 1)
            .dos(Variant::KpointsOpt, 1)
            .band(Variant::Default, 1)
            .band(Variant::KpointsOpt, 1)
            .projectors(Variant::Default)
            .projectors(Variant::KpointsOpt)
    }

    pub fn dataset(mut self, path: &str, dataset: ODataset) -> Self {
        self.root.insert(path, dataset).unwrap();
        self
    }

    pub fn without(mut self, path: &str) -> Self {
        self.root.remove(path);
        self
    }

    pub fn structure(self) -> Self {
        self.dataset(
            "results/positions/ion_types",
            ODataset::strings(3, &["Sr", "Ti", "O"]).unwrap(),
        )
        .dataset("results/positions/number_ion_types", ODataset::from_slice(&[1i32, 1, 3]))
        .dataset("results/positions/scale", ODataset::scalar(3.9f64))
        .dataset(
            "results/positions/lattice_vectors",
            ODataset::new((3, 3), &[1.0f64, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]).unwrap(),
        )
        .dataset(
            "results/positions/position_ions",
            ODataset::new((NUM_IONS, 3), &ramp(NUM_IONS * 3, 0.25)).unwrap(),
        )
    }

    pub fn magnetism(self) -> Self {
        self.dataset(
            "intermediate/ion_dynamics/magnetism/moments",
            ODataset::new(vec![NUM_STEPS, 2, NUM_IONS, 4], &ramp(NUM_STEPS * 2 * NUM_IONS * 4, 0.5))
                .unwrap(),
        )
    }

    pub fn trajectory(self) -> Self {
        self.dataset(
            "intermediate/ion_dynamics/position_ions",
            ODataset::new((NUM_STEPS, NUM_IONS, 3), &ramp(NUM_STEPS * NUM_IONS * 3, 0.01)).unwrap(),
        )
        .dataset(
            "intermediate/ion_dynamics/lattice_vectors",
            ODataset::new((NUM_STEPS, 3, 3), &ramp(NUM_STEPS * 9, 1.0)).unwrap(),
        )
    }

    pub fn energy(self) -> Self {
        self.dataset(
            "intermediate/ion_dynamics/energies_tags",
            ODataset::strings(3, &["ion-electron   TOTEN", "kinetic energy EKIN", "temperature    TEIN"])
                .unwrap(),
        )
        .dataset(
            "intermediate/ion_dynamics/energies",
            ODataset::new((NUM_STEPS, 3), &ramp(NUM_STEPS * 3, -1.5)).unwrap(),
        )
    }

    pub fn density(self) -> Self {
        self.dataset(
            "charge/charge",
            ODataset::new(vec![1, 4, 4, 4], &ramp(64, 0.25)).unwrap().compressed(6).unwrap(),
        )
    }

    pub fn kpoints(self, variant: Variant) -> Self {
        let input = variant.kpoints_input();
        let result = eigenvalues_group(variant);
        self.dataset(&format!("{}/mode", input), ODataset::text("line").unwrap())
            .dataset(&format!("{}/number_kpoints", input), ODataset::scalar(NUM_KPOINTS as i64))
            .dataset(
                &format!("{}/labels_kpoints", input),
                ODataset::strings(2, &["G", "X"]).unwrap(),
            )
            .dataset(
                &format!("{}/positions_labels_kpoints", input),
                ODataset::from_slice(&[1i64, NUM_KPOINTS as i64]),
            )
            .dataset(
                &format!("{}/kpoint_coords", result),
                ODataset::new((NUM_KPOINTS, 3), &ramp(NUM_KPOINTS * 3, 0.125)).unwrap(),
            )
            .dataset(
                &format!("{}/kpoints_symmetry_weight", result),
                ODataset::from_slice(&[0.25f64; NUM_KPOINTS]),
            )
    }

    pub fn dos(self, variant: Variant, spins: usize) -> Self {
        let group = format!("results/electron_dos{}", variant.suffix());
        self.dataset(&format!("{}/efermi", group), ODataset::scalar(5.5f64))
            .dataset(
                &format!("{}/energies", group),
                ODataset::from_slice(&ramp(NUM_ENERGIES, 1.0)),
            )
            .dataset(
                &format!("{}/dos", group),
                ODataset::new((spins, NUM_ENERGIES), &ramp(spins * NUM_ENERGIES, 0.3)).unwrap(),
            )
            .dataset(
                &format!("{}/dospar", group),
                ODataset::new(
                    vec![spins, NUM_IONS, 4, NUM_ENERGIES],
                    &ramp(spins * NUM_IONS * 4 * NUM_ENERGIES, 0.01),
                )
                .unwrap(),
            )
    }

    pub fn band(self, variant: Variant, spins: usize) -> Self {
        let group = eigenvalues_group(variant);
        let count = spins * NUM_KPOINTS * NUM_BANDS;
        self.dataset(
            &format!("{}/eigenvalues", group),
            ODataset::new((spins, NUM_KPOINTS, NUM_BANDS), &ramp(count, 0.7)).unwrap(),
        )
        .dataset(
            &format!("{}/fermiweights", group),
            ODataset::new((spins, NUM_KPOINTS, NUM_BANDS), &vec![1.0f64; count]).unwrap(),
        )
    }

    pub fn projectors(self, variant: Variant) -> Self {
        let group = format!("results/projectors{}", variant.suffix());
        self.dataset(
            &format!("{}/lchar", group),
            ODataset::strings(4, &["s", "p", "d", "f"]).unwrap(),
        )
        .dataset(
            &format!("{}/par", group),
            ODataset::new(
                vec![1, NUM_IONS, 4, NUM_KPOINTS, NUM_BANDS],
                &ramp(NUM_IONS * 4 * NUM_KPOINTS * NUM_BANDS, 0.001),
            )
            .unwrap(),
        )
    }

    pub fn write_to(&self, path: &Path) -> PathBuf {
        OArchive::create(path).unwrap().write(&self.root).unwrap();
        path.to_path_buf()
    }

    /// Write as `vaspout.h5` inside `dir` and return the file path.
    pub fn write_in(&self, dir: &Path) -> PathBuf {
        self.write_to(&dir.join("vaspout.h5"))
    }
}

pub fn eigenvalues_group(variant: Variant) -> String {
    format!("results/electron_eigenvalues{}", variant.suffix())
}

pub fn ramp(count: usize, step: f64) -> Vec<f64> {
    (0..count).map(|i| i as f64 * step).collect()
}
