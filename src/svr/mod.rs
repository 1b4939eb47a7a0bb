pub mod doxm;
pub mod pstat;

pub use doxm::Doxm;
pub use pstat::{Dpm, Dpom, Pstat};
