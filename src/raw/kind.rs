//! Record kinds and the per-kind read capability.

use std::fmt;
use std::str::FromStr;

use super::data_dict::{DataDict, Variant};
use super::file::File;
use super::records::*;
use crate::util::{Error, Result};

/// Variants of the kinds computed on both k-point grids.
pub const KPOINTS_VARIANTS: &[Variant] = &[Variant::Default, Variant::KpointsOpt];

/// Variants of the kinds that only have a primary result.
pub const DEFAULT_VARIANT: &[Variant] = &[Variant::Default];

/// A record kind that can be read from a [`File`].
pub trait RawData: Sized {
    const KIND: Kind;

    /// Keys of the dictionary returned by [`File::read`].
    const VARIANTS: &'static [Variant] = DEFAULT_VARIANT;

    /// Build the record for one variant. `Ok(None)` when the store lacks the
    /// data for it, or when `variant` is not one of [`RawData::VARIANTS`].
    fn read_variant(file: &File, variant: Variant) -> Result<Option<Self>>;
}

/// Tag selecting a record kind at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Cell,
    Topology,
    Magnetism,
    Structure,
    Trajectory,
    Dos,
    Band,
    Kpoints,
    Projectors,
    Energy,
    Density,
}

impl Kind {
    pub const ALL: [Kind; 11] = [
        Kind::Cell,
        Kind::Topology,
        Kind::Magnetism,
        Kind::Structure,
        Kind::Trajectory,
        Kind::Dos,
        Kind::Band,
        Kind::Kpoints,
        Kind::Projectors,
        Kind::Energy,
        Kind::Density,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Topology => "topology",
            Self::Magnetism => "magnetism",
            Self::Structure => "structure",
            Self::Trajectory => "trajectory",
            Self::Dos => "dos",
            Self::Band => "band",
            Self::Kpoints => "kpoints",
            Self::Projectors => "projectors",
            Self::Energy => "energy",
            Self::Density => "density",
        }
    }

    pub const fn variants(self) -> &'static [Variant] {
        match self {
            Self::Cell => RawCell::VARIANTS,
            Self::Topology => RawTopology::VARIANTS,
            Self::Magnetism => RawMagnetism::VARIANTS,
            Self::Structure => RawStructure::VARIANTS,
            Self::Trajectory => RawTrajectory::VARIANTS,
            Self::Dos => RawDos::VARIANTS,
            Self::Band => RawBand::VARIANTS,
            Self::Kpoints => RawKpoints::VARIANTS,
            Self::Projectors => RawProjectors::VARIANTS,
            Self::Energy => RawEnergy::VARIANTS,
            Self::Density => RawDensity::VARIANTS,
        }
    }

    /// Which variants of this kind the store holds.
    pub fn availability(self, file: &File) -> Result<DataDict<()>> {
        fn present<T>(dict: DataDict<T>) -> DataDict<()> {
            dict.map(|_| ())
        }
        Ok(match self {
            Self::Cell => present(file.read::<RawCell>()?),
            Self::Topology => present(file.read::<RawTopology>()?),
            Self::Magnetism => present(file.read::<RawMagnetism>()?),
            Self::Structure => present(file.read::<RawStructure>()?),
            Self::Trajectory => present(file.read::<RawTrajectory>()?),
            Self::Dos => present(file.read::<RawDos>()?),
            Self::Band => present(file.read::<RawBand>()?),
            Self::Kpoints => present(file.read::<RawKpoints>()?),
            Self::Projectors => present(file.read::<RawProjectors>()?),
            Self::Energy => present(file.read::<RawEnergy>()?),
            Self::Density => present(file.read::<RawDensity>()?),
        })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.name() == lower)
            .ok_or_else(|| Error::other(format!("unknown record kind {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in Kind::ALL {
            assert_eq!(kind.name().parse::<Kind>().unwrap(), kind);
        }
        assert_eq!("DOS".parse::<Kind>().unwrap(), Kind::Dos);
        assert!("phonon".parse::<Kind>().is_err());
    }

    #[test]
    fn test_alternate_grid_kinds() {
        let with_opt: Vec<Kind> = Kind::ALL
            .into_iter()
            .filter(|k| k.variants().contains(&Variant::KpointsOpt))
            .collect();
        assert_eq!(with_opt, vec![Kind::Dos, Kind::Band, Kind::Kpoints, Kind::Projectors]);
        assert!(Kind::ALL.iter().all(|k| k.variants()[0] == Variant::Default));
    }
}
