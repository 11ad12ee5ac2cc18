mod helpers;
pub(crate) mod testing;

pub(crate) use helpers::{reaction_name_from_mt, to_f32};
