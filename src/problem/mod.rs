pub mod adjacency;
pub mod dth;

pub type Num = crate::utils::num::NumI64P5;

pub type LocationId = usize;
