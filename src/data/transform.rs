use std::collections::HashMap;
use num_traits::Float;
use crate::data::graph::EdgeIndex;
use crate::utils::{IndexType, NodeIdx, SamplingError, SamplingResult, Weight};

/// Drops every self-loop and appends exactly one `(n, n)` edge per node, in node order.
/// The remaining edges keep their relative order.
pub fn add_remaining_self_loops(edge_index: &EdgeIndex, node_count: usize) -> EdgeIndex {
    let capacity = edge_index.edge_count() + node_count;
    let mut src = Vec::with_capacity(capacity);
    let mut dst = Vec::with_capacity(capacity);

    for (v, w) in edge_index.iter_edges().filter(|(v, w)| v != w) {
        src.push(v);
        dst.push(w);
    }
    for n in 0..node_count {
        src.push(NodeIdx::new(n));
        dst.push(NodeIdx::new(n));
    }

    EdgeIndex { src, dst }
}

/// Number of occurrences of every node in `ind`.
pub fn degree(ind: &[NodeIdx], node_count: usize) -> Vec<usize> {
    let mut out = vec![0_usize; node_count];
    for v in ind.iter() {
        out[v.index()] += 1;
    }
    out
}

fn reciprocal<W: Float>(x: W) -> W {
    let r = x.recip();
    if r.is_finite() { r } else { W::zero() }
}

/// Importance weight `1 / outdeg(src) * 1 / indeg(dst)` of every edge.
pub fn compute_edge_weights(edge_index: &EdgeIndex, node_count: usize) -> Vec<Weight> {
    let out_degree = degree(&edge_index.src, node_count);
    let in_degree = degree(&edge_index.dst, node_count);

    edge_index.iter_edges()
        .map(|(v, w)| {
            reciprocal(out_degree[v.index()] as Weight) * reciprocal(in_degree[w.index()] as Weight)
        })
        .collect()
}

/// Rescales `weights` so that the weights of the edges sharing a target sum to one.
/// Groups without positive mass are left as they are.
pub fn normalize_by_target<W: Float>(dst: &[NodeIdx], weights: &mut [W]) -> SamplingResult<()> {
    if dst.len() != weights.len() {
        return Err(SamplingError::InvariantViolation(format!(
            "{} edges but {} edge weights", dst.len(), weights.len()
        )));
    }

    let mut sums: HashMap<NodeIdx, W> = HashMap::new();
    for (w, weight) in dst.iter().zip(weights.iter()) {
        let sum = sums.entry(*w).or_insert_with(W::zero);
        *sum = *sum + *weight;
    }

    for (w, weight) in dst.iter().zip(weights.iter_mut()) {
        let sum = sums[w];
        if sum > W::zero() {
            *weight = *weight / sum;
        }
    }

    Ok(())
}
