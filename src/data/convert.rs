use crate::data::graph::GroupedEdges;
use crate::utils::{IndexType, NodeIdx};

/// Converts a sorted index array into a pointer array of length `m + 1`, where
/// `ptr[i]..ptr[i + 1]` is the range of positions holding value `i`.
pub fn ind2ptr(ind: &[NodeIdx], m: usize) -> Vec<usize> {
    let mut out = vec![0_usize; m + 1];
    for v in ind.iter() {
        out[v.index() + 1] += 1;
    }
    for i in 0..m {
        out[i + 1] += out[i];
    }
    out
}

/// Groups edge positions by the endpoint in `endpoints`. The sort is stable, so positions
/// stay ascending inside every group.
pub fn group_edges(endpoints: &[NodeIdx], node_count: usize) -> GroupedEdges {
    let mut perm: Vec<usize> = (0..endpoints.len()).collect();
    perm.sort_by_key(|e| endpoints[*e]);

    let sorted: Vec<NodeIdx> = perm.iter().map(|e| endpoints[*e]).collect();
    let ptrs = ind2ptr(&sorted, node_count);

    GroupedEdges { ptrs, perm }
}

#[cfg(feature = "tensor")]
mod tensor_convert {
    use std::convert::TryFrom;
    use tch::Tensor;
    use crate::algo::layer_sampling::SampledLayer;
    use crate::data::graph::EdgeIndex;
    use crate::utils::{SamplingError, TensorConversionError, try_tensor_to_slice};

    impl TryFrom<&Tensor> for EdgeIndex {
        type Error = SamplingError;

        /// Reads a `[2, E]` int64 cpu tensor.
        fn try_from(value: &Tensor) -> Result<Self, Self::Error> {
            let size = value.size();
            if size.len() != 2 || size[0] != 2 {
                return Err(TensorConversionError::InvalidShape(Some(format!("expected [2, E] but got {:?}", size))).into());
            }

            let src = value.select(0, 0).contiguous();
            let dst = value.select(0, 1).contiguous();
            EdgeIndex::new(
                try_tensor_to_slice::<i64>(&src)?.to_vec(),
                try_tensor_to_slice::<i64>(&dst)?.to_vec(),
            )
        }
    }

    impl From<&EdgeIndex> for Tensor {
        fn from(edge_index: &EdgeIndex) -> Tensor {
            Tensor::stack(&[
                Tensor::of_slice(&edge_index.src),
                Tensor::of_slice(&edge_index.dst),
            ], 0)
        }
    }

    impl SampledLayer {
        /// `(edge_index [2, E], edge_weight [E], nodes, edge_ptrs)` as tensors.
        pub fn to_tensors(&self) -> (Tensor, Tensor, Tensor, Tensor) {
            let edge_ptrs: Vec<i64> = self.edge_ptrs.iter().map(|e| *e as i64).collect();
            (
                Tensor::from(&self.edge_index),
                Tensor::of_slice(&self.edge_weight),
                Tensor::of_slice(&self.nodes),
                Tensor::of_slice(&edge_ptrs),
            )
        }
    }
}
