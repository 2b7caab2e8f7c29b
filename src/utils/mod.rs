pub mod error;
pub mod random;
pub mod sampling;
pub mod types;
#[cfg(feature = "tensor")]
pub mod tensor;

pub use error::*;
pub use random::*;
pub use sampling::*;
pub use types::*;
#[cfg(feature = "tensor")]
pub use tensor::*;
