//! Mapping of the fixed path schema onto records.
//!
//! Every read probes the namespace it needs first; a missing namespace
//! makes the record absent. Once the probe succeeded, a missing required
//! leaf is an error rather than a partially filled record.

use tracing::debug;

use super::data_dict::{DataDict, Variant};
use super::file::File;
use super::kind::{Kind, RawData, KPOINTS_VARIANTS};
use super::records::*;
use crate::util::Result;

const VERSION_MAJOR: &str = "version/major";
const VERSION_MINOR: &str = "version/minor";
const VERSION_PATCH: &str = "version/patch";

const POSITIONS: &str = "results/positions";
const ION_TYPES: &str = "results/positions/ion_types";
const NUMBER_ION_TYPES: &str = "results/positions/number_ion_types";
const SCALE: &str = "results/positions/scale";
const LATTICE_VECTORS: &str = "results/positions/lattice_vectors";
const POSITION_IONS: &str = "results/positions/position_ions";

const ION_DYNAMICS_POSITIONS: &str = "intermediate/ion_dynamics/position_ions";
const ION_DYNAMICS_LATTICE: &str = "intermediate/ion_dynamics/lattice_vectors";
const ENERGY_TAGS: &str = "intermediate/ion_dynamics/energies_tags";
const ENERGY_VALUES: &str = "intermediate/ion_dynamics/energies";
const MOMENTS: &str = "intermediate/ion_dynamics/magnetism/moments";

const CHARGE: &str = "charge/charge";

fn dos_group(variant: Variant) -> String {
    format!("results/electron_dos{}", variant.suffix())
}

fn eigenvalues_group(variant: Variant) -> String {
    format!("results/electron_eigenvalues{}", variant.suffix())
}

fn projectors_group(variant: Variant) -> String {
    format!("results/projectors{}", variant.suffix())
}

fn is_single(variant: Variant) -> bool {
    variant == Variant::Default
}

impl File {
    /// Read every variant of a record kind.
    pub fn read<T: RawData>(&self) -> Result<DataDict<T>> {
        self.ensure_open()?;
        let version = self.version()?;
        let mut entries = Vec::with_capacity(T::VARIANTS.len());
        for &variant in T::VARIANTS {
            let record = T::read_variant(self, variant)?;
            debug!(
                kind = T::KIND.name(),
                variant = variant.name(),
                present = record.is_some(),
                "read record"
            );
            entries.push((variant, record));
        }
        Ok(DataDict::new(entries, version))
    }

    /// Version of the program that wrote the store.
    pub fn version(&self) -> Result<RawVersion> {
        self.ensure_open()?;
        Ok(RawVersion {
            major: self.read_i64(VERSION_MAJOR)?,
            minor: self.read_i64(VERSION_MINOR)?,
            patch: self.read_i64(VERSION_PATCH)?,
        })
    }

    pub fn cell(&self) -> Result<DataDict<RawCell>> {
        self.read()
    }

    pub fn topology(&self) -> Result<DataDict<RawTopology>> {
        self.read()
    }

    pub fn magnetism(&self) -> Result<DataDict<RawMagnetism>> {
        self.read()
    }

    pub fn structure(&self) -> Result<DataDict<RawStructure>> {
        self.read()
    }

    pub fn trajectory(&self) -> Result<DataDict<RawTrajectory>> {
        self.read()
    }

    /// Density of states on the primary and the `kpoints_opt` grid.
    pub fn dos(&self) -> Result<DataDict<RawDos>> {
        self.read()
    }

    /// Band structures on the primary and the `kpoints_opt` grid.
    pub fn band(&self) -> Result<DataDict<RawBand>> {
        self.read()
    }

    pub fn kpoints(&self) -> Result<DataDict<RawKpoints>> {
        self.read()
    }

    pub fn projectors(&self) -> Result<DataDict<RawProjectors>> {
        self.read()
    }

    pub fn energy(&self) -> Result<DataDict<RawEnergy>> {
        self.read()
    }

    pub fn density(&self) -> Result<DataDict<RawDensity>> {
        self.read()
    }
}

impl RawData for RawCell {
    const KIND: Kind = Kind::Cell;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        if !is_single(variant) || !file.path_exists(POSITIONS) {
            return Ok(None);
        }
        Ok(Some(RawCell {
            scale: file.read_f64(SCALE)?,
            lattice_vectors: file.bind_array(LATTICE_VECTORS)?,
        }))
    }
}

impl RawData for RawTopology {
    const KIND: Kind = Kind::Topology;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        if !is_single(variant) || !file.path_exists(POSITIONS) {
            return Ok(None);
        }
        Ok(Some(RawTopology {
            ion_types: file.bind_array(ION_TYPES)?,
            number_ion_types: file.bind_array(NUMBER_ION_TYPES)?,
        }))
    }
}

impl RawData for RawMagnetism {
    const KIND: Kind = Kind::Magnetism;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        if !is_single(variant) || !file.path_exists(MOMENTS) {
            return Ok(None);
        }
        Ok(Some(RawMagnetism {
            moments: file.bind_array(MOMENTS)?,
        }))
    }
}

impl RawData for RawStructure {
    const KIND: Kind = Kind::Structure;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        if !is_single(variant) {
            return Ok(None);
        }
        let Some(topology) = RawTopology::read_variant(file, Variant::Default)? else {
            return Ok(None);
        };
        let Some(cell) = RawCell::read_variant(file, Variant::Default)? else {
            return Ok(None);
        };
        Ok(Some(RawStructure {
            topology,
            cell,
            positions: file.bind_array(POSITION_IONS)?,
            magnetism: RawMagnetism::read_variant(file, Variant::Default)?,
        }))
    }
}

impl RawData for RawTrajectory {
    const KIND: Kind = Kind::Trajectory;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        if !is_single(variant) || !file.path_exists(ION_DYNAMICS_POSITIONS) {
            return Ok(None);
        }
        let Some(topology) = RawTopology::read_variant(file, Variant::Default)? else {
            return Ok(None);
        };
        Ok(Some(RawTrajectory {
            topology,
            positions: file.bind_array(ION_DYNAMICS_POSITIONS)?,
            lattice_vectors: file.bind_array(ION_DYNAMICS_LATTICE)?,
        }))
    }
}

impl RawData for RawDos {
    const KIND: Kind = Kind::Dos;
    const VARIANTS: &'static [Variant] = KPOINTS_VARIANTS;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        let group = dos_group(variant);
        if !file.path_exists(&format!("{}/energies", group)) {
            return Ok(None);
        }
        Ok(Some(RawDos {
            fermi_energy: file.read_f64(&format!("{}/efermi", group))?,
            energies: file.bind_array(&format!("{}/energies", group))?,
            dos: file.bind_array(&format!("{}/dos", group))?,
            projectors: RawProjectors::read_variant(file, variant)?,
            projections: file.bind_optional(&format!("{}/dospar", group))?,
        }))
    }
}

impl RawData for RawBand {
    const KIND: Kind = Kind::Band;
    const VARIANTS: &'static [Variant] = KPOINTS_VARIANTS;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        let group = eigenvalues_group(variant);
        if !file.path_exists(&group) {
            return Ok(None);
        }
        Ok(Some(RawBand {
            fermi_energy: file.read_f64(&format!("{}/efermi", dos_group(variant)))?,
            kpoints: RawKpoints::read_variant(file, variant)?,
            eigenvalues: file.bind_array(&format!("{}/eigenvalues", group))?,
            occupations: file.bind_array(&format!("{}/fermiweights", group))?,
            projectors: RawProjectors::read_variant(file, variant)?,
            projections: file.bind_optional(&format!("{}/par", projectors_group(variant)))?,
        }))
    }
}

impl RawData for RawKpoints {
    const KIND: Kind = Kind::Kpoints;
    const VARIANTS: &'static [Variant] = KPOINTS_VARIANTS;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        let input = variant.kpoints_input();
        let result = eigenvalues_group(variant);
        if !file.path_exists(input) || !file.path_exists(&result) {
            return Ok(None);
        }
        let Some(cell) = RawCell::read_variant(file, Variant::Default)? else {
            return Ok(None);
        };
        Ok(Some(RawKpoints {
            mode: file.read_string(&format!("{}/mode", input))?,
            number: file.read_i64(&format!("{}/number_kpoints", input))?,
            coordinates: file.bind_array(&format!("{}/kpoint_coords", result))?,
            weights: file.bind_array(&format!("{}/kpoints_symmetry_weight", result))?,
            labels: file.bind_optional(&format!("{}/labels_kpoints", input))?,
            label_indices: file.bind_optional(&format!("{}/positions_labels_kpoints", input))?,
            cell,
        }))
    }
}

impl RawData for RawProjectors {
    const KIND: Kind = Kind::Projectors;
    const VARIANTS: &'static [Variant] = KPOINTS_VARIANTS;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        let group = projectors_group(variant);
        if !file.path_exists(&group) {
            return Ok(None);
        }
        let Some(topology) = RawTopology::read_variant(file, Variant::Default)? else {
            return Ok(None);
        };
        // spin count is the outer length of the matching eigenvalues
        let eigenvalues = format!("{}/eigenvalues", eigenvalues_group(variant));
        Ok(Some(RawProjectors {
            topology,
            orbital_types: file.bind_array(&format!("{}/lchar", group))?,
            number_spins: file.bind_array::<f64>(&eigenvalues)?.len(),
        }))
    }
}

impl RawData for RawEnergy {
    const KIND: Kind = Kind::Energy;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        if !is_single(variant) || !file.path_exists(ENERGY_VALUES) {
            return Ok(None);
        }
        Ok(Some(RawEnergy {
            labels: file.bind_array(ENERGY_TAGS)?,
            values: file.bind_array(ENERGY_VALUES)?,
        }))
    }
}

impl RawData for RawDensity {
    const KIND: Kind = Kind::Density;

    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>> {
        file.ensure_open()?;
        if !is_single(variant) || !file.path_exists(CHARGE) {
            return Ok(None);
        }
        let Some(structure) = RawStructure::read_variant(file, Variant::Default)? else {
            return Ok(None);
        };
        Ok(Some(RawDensity {
            structure,
            charge: file.bind_array(CHARGE)?,
        }))
    }
}
