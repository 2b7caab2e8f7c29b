pub mod graph;
pub mod convert;
pub mod transform;

pub use graph::*;
pub use convert::*;
pub use transform::*;
