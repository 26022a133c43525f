pub mod backend;
pub mod materials;
pub mod mesh;

pub use backend::*;
pub use materials::*;
pub use mesh::*;
