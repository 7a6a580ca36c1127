pub mod alert;
pub mod application;
pub mod forecast;
pub mod planting_area;
pub mod supply;
pub mod usage;

pub use alert::*;
pub use application::*;
pub use forecast::*;
pub use planting_area::*;
pub use supply::*;
pub use usage::*;
