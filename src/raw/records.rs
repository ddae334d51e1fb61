//! Typed records produced by the schema reader.
//!
//! Scalars are decoded when the record is built; array fields are
//! [`LazyArray`]s that read nothing until asked. Optional sub-records and
//! optional leaves are `Option`s.

use std::fmt;

use super::lazy::LazyArray;

/// Version of the program that wrote the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawVersion {
    pub major: i64,
    pub minor: i64,
    pub patch: i64,
}

impl RawVersion {
    pub const fn new(major: i64, minor: i64, patch: i64) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for RawVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Unit cell: scaling factor and lattice vectors (one set, or one per step).
#[derive(Clone, Debug, PartialEq)]
pub struct RawCell {
    pub scale: f64,
    pub lattice_vectors: LazyArray<f64>,
}

/// Which ion types occur and how many ions of each.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTopology {
    pub ion_types: LazyArray<String>,
    pub number_ion_types: LazyArray<i64>,
}

/// Magnetic moments per step, ion and orbital.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMagnetism {
    pub moments: LazyArray<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawStructure {
    pub topology: RawTopology,
    pub cell: RawCell,
    pub positions: LazyArray<f64>,
    /// Absent unless magnetic moments were recorded during the ionic steps.
    pub magnetism: Option<RawMagnetism>,
}

/// Positions and cell shape over all ionic steps.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTrajectory {
    pub topology: RawTopology,
    pub positions: LazyArray<f64>,
    pub lattice_vectors: LazyArray<f64>,
}

/// Electronic density of states. Energies are not shifted to the Fermi
/// energy.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDos {
    pub fermi_energy: f64,
    pub energies: LazyArray<f64>,
    pub dos: LazyArray<f64>,
    pub projectors: Option<RawProjectors>,
    pub projections: Option<LazyArray<f64>>,
}

/// Eigenvalues and occupations at every k point.
#[derive(Clone, Debug, PartialEq)]
pub struct RawBand {
    pub fermi_energy: f64,
    pub kpoints: Option<RawKpoints>,
    pub eigenvalues: LazyArray<f64>,
    pub occupations: LazyArray<f64>,
    pub projectors: Option<RawProjectors>,
    pub projections: Option<LazyArray<f64>>,
}

/// k points used for a band calculation, with their generation settings.
#[derive(Clone, Debug, PartialEq)]
pub struct RawKpoints {
    pub mode: String,
    pub number: i64,
    pub coordinates: LazyArray<f64>,
    pub weights: LazyArray<f64>,
    pub labels: Option<LazyArray<String>>,
    pub label_indices: Option<LazyArray<i64>>,
    pub cell: RawCell,
}

/// Orbital projectors. `number_spins` is the outer length of the matching
/// eigenvalue dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct RawProjectors {
    pub topology: RawTopology,
    pub orbital_types: LazyArray<String>,
    pub number_spins: usize,
}

/// Energies per ionic step; `values` is steps x energy kind.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEnergy {
    pub labels: LazyArray<String>,
    pub values: LazyArray<f64>,
}

/// Charge (and magnetization) density on the Fourier grid.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDensity {
    pub structure: RawStructure,
    pub charge: LazyArray<f64>,
}
