use std::ops::Range;
use crate::utils::{EdgePtr, IndexType, NodeIdx, SamplingError, SamplingResult};

/// Directed edge list in coordinate form. Edge `i` goes from `src[i]` to `dst[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeIndex {
    pub src: Vec<NodeIdx>,
    pub dst: Vec<NodeIdx>,
}

impl EdgeIndex {
    pub fn new(src: Vec<NodeIdx>, dst: Vec<NodeIdx>) -> SamplingResult<Self> {
        if src.len() != dst.len() {
            return Err(SamplingError::LengthMismatch(src.len(), dst.len()));
        }
        if let Some(v) = src.iter().chain(dst.iter()).find(|v| **v < 0) {
            return Err(SamplingError::InvalidIndex(*v));
        }

        Ok(EdgeIndex { src, dst })
    }

    pub fn from_edges(edges: &[(NodeIdx, NodeIdx)]) -> SamplingResult<Self> {
        let (src, dst) = edges.iter().cloned().unzip();
        Self::new(src, dst)
    }

    pub fn edge_count(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Smallest node count that covers every endpoint.
    pub fn inferred_node_count(&self) -> usize {
        self.src.iter()
            .chain(self.dst.iter())
            .max()
            .map_or(0, |v| v.index() + 1)
    }

    pub fn iter_edges(&self) -> impl Iterator<Item=(NodeIdx, NodeIdx)> + '_ {
        self.src.iter().cloned().zip(self.dst.iter().cloned())
    }

    /// Sub edge list made of the edges at `ptrs`, in the given order.
    pub fn select(&self, ptrs: &[EdgePtr<usize>]) -> EdgeIndex {
        EdgeIndex {
            src: ptrs.iter().map(|e| self.src[*e]).collect(),
            dst: ptrs.iter().map(|e| self.dst[*e]).collect(),
        }
    }
}

/// Edge positions grouped by one endpoint. `perm[ptrs[n]..ptrs[n + 1]]` holds the positions
/// of the edges whose endpoint is `n`, ascending. Grouping by target gives the CSC layout,
/// grouping by source the CSR layout.
#[derive(Debug, Clone, Default)]
pub struct GroupedEdges {
    pub ptrs: Vec<usize>,
    pub perm: Vec<EdgePtr<usize>>,
}

impl GroupedEdges {
    pub fn node_count(&self) -> usize {
        self.ptrs.len().saturating_sub(1)
    }

    pub fn edge_count(&self) -> usize {
        self.perm.len()
    }

    pub fn edges_range(&self, x: NodeIdx) -> Range<usize> {
        let node = x.index();
        self.ptrs[node]..self.ptrs[node + 1]
    }

    pub fn edges_slice(&self, x: NodeIdx) -> &[EdgePtr<usize>] {
        &self.perm[self.edges_range(x)]
    }

    pub fn degree(&self, x: NodeIdx) -> usize {
        self.edges_range(x).len()
    }
}
