pub mod geodesy;
pub mod geometry;
pub mod mat4;
pub mod precision;
pub mod vec;

pub use geodesy::*;
pub use geometry::*;
pub use mat4::*;
pub use precision::*;
pub use vec::*;
