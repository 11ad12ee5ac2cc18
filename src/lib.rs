#![allow(clippy::upper_case_acronyms)]

mod api;
mod error;
mod interpolation;
mod tables;
mod utils;
mod xsdir;

pub use api::{CrossSectionData, DistRecord, Material, ReactionCatalog, UnionGrid, XsTable};
pub use error::PrepError;
pub use interpolation::InterpolationScheme;
pub use tables::{
    AngularDist, EnergyDist, EnergyDistData, EnergyLaw, EvaporationDist, JointAngleEnergyDist,
    Library, LibraryProvider, MaxwellianDist, NuInterp, NuTable, NuclideTable, OtherDist,
    PrecursorDist, Reaction, TabulatedDist, WattDist,
};
pub use xsdir::Xsdir;
