pub mod utils;
pub mod data;
pub mod algo;
#[cfg(feature = "extension-module")]
mod python;

pub use algo::layer_sampling::{CandidateSources, LadiesSampler, SampledLayer};
pub use data::graph::EdgeIndex;
pub use utils::{SamplingError, SamplingResult};
