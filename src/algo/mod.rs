pub mod layer_sampling;
pub mod split;
