mod energy_dist;
mod library;
mod nuclide;
mod reaction;

pub use energy_dist::{
    EnergyDist, EnergyDistData, EnergyLaw, EvaporationDist, JointAngleEnergyDist, MaxwellianDist,
    OtherDist, TabulatedDist, WattDist,
};
pub use library::{Library, LibraryProvider};
pub use nuclide::{NuInterp, NuTable, NuclideTable, PrecursorDist};
pub use reaction::{AngularDist, Reaction};
