//! Layer-dependent importance sampling (LADIES).
//!
//! Every layer draws a bounded set of source nodes for the current target nodes with
//! probabilities derived from degree-normalized edge weights, keeps the edges between the
//! drawn sources and the targets, and reweights them so that the aggregate over a target's
//! sampled in-edges estimates the aggregate over all of its in-edges. Layers are sampled
//! from the output side towards the input side; the drawn sources of one layer are the
//! targets of the next.
//!
//! Sources are drawn with replacement and then deduplicated, so a layer may hold fewer
//! nodes than its budget. The correction divides by the number of distinct drawn sources
//! rather than by the budget.

use std::collections::HashMap;
use log::{debug, trace};
use rand::{Rng, RngCore};
use rayon::prelude::*;
use crate::data::convert::group_edges;
use crate::data::graph::{EdgeIndex, GroupedEdges};
use crate::data::transform::{add_remaining_self_loops, compute_edge_weights, normalize_by_target};
use crate::utils::{
    cumulative_sum, EdgePtr, IndexType, NodeIdx, replacement_sampling_weighted, rng_split,
    SamplingError, SamplingResult, Weight,
};

/// One sampled layer, ready for a weighted aggregation step.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledLayer {
    /// Kept edges, in ascending edge position order.
    pub edge_index: EdgeIndex,
    /// Corrected weights, summing to one over the kept in-edges of every target.
    pub edge_weight: Vec<Weight>,
    /// Drawn source nodes, ascending. These are the targets of the next deeper layer.
    pub nodes: Vec<NodeIdx>,
    /// Positions of the kept edges in the self-loop augmented edge index.
    pub edge_ptrs: Vec<EdgePtr<usize>>,
}

/// Sampling distribution over the sources of the in-edges of a target set.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSources {
    pub edge_ptrs: Vec<EdgePtr<usize>>,
    pub nodes: Vec<NodeIdx>,
    pub probs: Vec<Weight>,
}

impl CandidateSources {
    pub fn prob(&self, v: NodeIdx) -> Option<Weight> {
        self.nodes.binary_search(&v).ok().map(|i| self.probs[i])
    }

    /// Draws `budget` sources with replacement and deduplicates them. When the budget
    /// covers every candidate, all of them are taken and `rng` is left untouched.
    pub fn select(&self, rng: &mut impl Rng, budget: usize) -> Vec<NodeIdx> {
        if self.nodes.len() <= budget {
            return self.nodes.clone();
        }

        let cumsum = cumulative_sum(&self.probs);
        let mut idx = vec![0_usize; budget];
        let n = replacement_sampling_weighted(rng, &cumsum, &mut idx);
        idx.truncate(n);
        idx.sort_unstable();
        idx.dedup();

        idx.into_iter().map(|i| self.nodes[i]).collect()
    }
}

fn unique(nodes: &[NodeIdx]) -> Vec<NodeIdx> {
    let mut nodes = nodes.to_vec();
    nodes.sort_unstable();
    nodes.dedup();
    nodes
}

#[derive(Debug, Clone)]
pub struct LadiesSampler {
    node_count: usize,
    edge_index: EdgeIndex,
    edge_weights: Vec<Weight>,
    csc: GroupedEdges,
    csr: GroupedEdges,
}

impl LadiesSampler {
    pub fn new(edge_index: EdgeIndex) -> SamplingResult<Self> {
        let node_count = edge_index.inferred_node_count();
        Self::with_node_count(edge_index, node_count)
    }

    pub fn with_node_count(edge_index: EdgeIndex, node_count: usize) -> SamplingResult<Self> {
        if let Some(v) = edge_index.src.iter()
            .chain(edge_index.dst.iter())
            .find(|v| v.index() >= node_count)
        {
            return Err(SamplingError::NodeOutOfRange(*v, node_count));
        }

        let edge_index = add_remaining_self_loops(&edge_index, node_count);
        let edge_weights = compute_edge_weights(&edge_index, node_count);
        let csc = group_edges(&edge_index.dst, node_count);
        let csr = group_edges(&edge_index.src, node_count);

        trace!(
            "Built sampler over {} nodes and {} edges (self-loops included)",
            node_count, edge_index.edge_count()
        );

        Ok(LadiesSampler {
            node_count,
            edge_index,
            edge_weights,
            csc,
            csr,
        })
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.edge_count()
    }

    /// Self-loop augmented edge index. Sampled edge positions refer to it.
    pub fn edge_index(&self) -> &EdgeIndex {
        &self.edge_index
    }

    pub fn edge_weights(&self) -> &[Weight] {
        &self.edge_weights
    }

    fn check_nodes(&self, nodes: &[NodeIdx]) -> SamplingResult<()> {
        if nodes.is_empty() {
            return Err(SamplingError::EmptyTargets);
        }
        for v in nodes.iter() {
            if *v < 0 {
                return Err(SamplingError::InvalidIndex(*v));
            }
            if v.index() >= self.node_count {
                return Err(SamplingError::NodeOutOfRange(*v, self.node_count));
            }
        }
        Ok(())
    }

    /// Probability of every source of an in-edge of `targets`, proportional to the summed
    /// weight of its edges into the target set.
    pub fn candidate_sources(&self, targets: &[NodeIdx]) -> SamplingResult<CandidateSources> {
        self.check_nodes(targets)?;

        let mut edge_ptrs: Vec<EdgePtr<usize>> = unique(targets).into_iter()
            .flat_map(|w| self.csc.edges_slice(w).iter().cloned())
            .collect();
        edge_ptrs.sort_unstable();

        let nodes = unique(&edge_ptrs.iter().map(|e| self.edge_index.src[*e]).collect::<Vec<_>>());
        let positions: HashMap<NodeIdx, usize> = nodes.iter()
            .enumerate()
            .map(|(i, v)| (*v, i))
            .collect();

        let mut probs = vec![0.0 as Weight; nodes.len()];
        let mut total = 0.0 as Weight;
        for e in edge_ptrs.iter().cloned() {
            let weight = self.edge_weights[e];
            probs[positions[&self.edge_index.src[e]]] += weight;
            total += weight;
        }

        if !(total > 0.0 && total.is_finite()) {
            return Err(SamplingError::DegenerateDistribution(total));
        }
        for p in probs.iter_mut() {
            *p /= total;
        }

        Ok(CandidateSources {
            edge_ptrs,
            nodes,
            probs,
        })
    }

    /// Positions of the edges from `sources` into `targets`, ascending. Both inputs must be
    /// sorted and deduplicated.
    fn filter_edges(&self, sources: &[NodeIdx], targets: &[NodeIdx]) -> Vec<EdgePtr<usize>> {
        let via_targets: usize = targets.iter().map(|w| self.csc.degree(*w)).sum();
        let via_sources: usize = sources.iter().map(|v| self.csr.degree(*v)).sum();

        let mut edge_ptrs: Vec<EdgePtr<usize>> = if via_sources < via_targets {
            sources.iter()
                .flat_map(|v| self.csr.edges_slice(*v).iter().cloned())
                .filter(|e| targets.binary_search(&self.edge_index.dst[*e]).is_ok())
                .collect()
        } else {
            targets.iter()
                .flat_map(|w| self.csc.edges_slice(*w).iter().cloned())
                .filter(|e| sources.binary_search(&self.edge_index.src[*e]).is_ok())
                .collect()
        };
        edge_ptrs.sort_unstable();
        edge_ptrs
    }

    /// Samples a single layer for `targets` with at most `budget` source nodes.
    pub fn sample_layer(
        &self,
        rng: &mut impl Rng,
        targets: &[NodeIdx],
        budget: usize,
    ) -> SamplingResult<SampledLayer> {
        if budget == 0 {
            return Err(SamplingError::InvalidBudget(0));
        }

        let candidates = self.candidate_sources(targets)?;
        let nodes = candidates.select(rng, budget);
        let edge_ptrs = self.filter_edges(&nodes, &unique(targets));

        let sample_count = nodes.len() as Weight;
        let mut edge_weight = Vec::with_capacity(edge_ptrs.len());
        for e in edge_ptrs.iter().cloned() {
            let v = self.edge_index.src[e];
            let p = candidates.prob(v).ok_or_else(|| {
                SamplingError::InvariantViolation(format!("selected node {} is not a candidate", v))
            })?;
            edge_weight.push(self.edge_weights[e] / (sample_count * p));
        }

        let edge_index = self.edge_index.select(&edge_ptrs);
        normalize_by_target(&edge_index.dst, &mut edge_weight)?;

        Ok(SampledLayer {
            edge_index,
            edge_weight,
            nodes,
            edge_ptrs,
        })
    }

    /// Samples one layer per entry of `budgets`. Budgets are ordered from the input side to
    /// the output side and so are the returned layers; sampling itself runs output first,
    /// starting from `targets`.
    pub fn sample(
        &self,
        rng: &mut impl Rng,
        targets: &[NodeIdx],
        budgets: &[usize],
    ) -> SamplingResult<Vec<SampledLayer>> {
        if budgets.is_empty() {
            return Err(SamplingError::EmptyBudgets);
        }
        if let Some(i) = budgets.iter().position(|b| *b == 0) {
            return Err(SamplingError::InvalidBudget(i));
        }
        self.check_nodes(targets)?;

        let mut layers = Vec::with_capacity(budgets.len());
        let mut nodes = targets.to_vec();
        for (i, budget) in budgets.iter().cloned().enumerate().rev() {
            let layer = self.sample_layer(rng, &nodes, budget)?;
            debug!(
                "Layer {}: {} targets, {} of {} budgeted sources, {} edges",
                i, nodes.len(), layer.nodes.len(), budget, layer.edge_ptrs.len()
            );

            nodes = layer.nodes.clone();
            layers.push(layer);
        }
        layers.reverse();

        Ok(layers)
    }

    /// Runs [`LadiesSampler::sample`] for every batch in parallel. Each batch gets its own
    /// generator derived from `rng` in batch order, so results do not depend on scheduling.
    pub fn sample_batches<B: AsRef<[NodeIdx]> + Sync>(
        &self,
        rng: &mut impl RngCore,
        batches: &[B],
        budgets: &[usize],
    ) -> SamplingResult<Vec<Vec<SampledLayer>>> {
        debug!("Sampling {} batches over {} layers", batches.len(), budgets.len());

        let rngs = rng_split(rng, batches.len());
        let results: Vec<SamplingResult<Vec<SampledLayer>>> = batches.par_iter()
            .zip(rngs.into_par_iter())
            .map(|(batch, mut rng)| self.sample(&mut rng, batch.as_ref(), budgets))
            .collect();

        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use ndarray::arr2;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use crate::algo::layer_sampling::{LadiesSampler, SampledLayer};
    use crate::data::graph::EdgeIndex;
    use crate::data::graph::tests::{edge_index_from, random_edge_index};
    use crate::utils::{NodeIdx, rng_split, SamplingError};

    fn path_sampler() -> LadiesSampler {
        let edge_index = edge_index_from(arr2(&[
            [0, 1, 2],
            [1, 2, 3],
        ]));
        LadiesSampler::new(edge_index).unwrap()
    }

    fn random_sampler(seed: u64) -> LadiesSampler {
        let mut rng = SmallRng::seed_from_u64(seed);
        let edge_index = random_edge_index(&mut rng, 60, 400);
        LadiesSampler::with_node_count(edge_index, 64).unwrap()
    }

    fn target_sums(layer: &SampledLayer) -> HashMap<NodeIdx, f64> {
        let mut sums = HashMap::new();
        for (w, weight) in layer.edge_index.dst.iter().zip(layer.edge_weight.iter()) {
            *sums.entry(*w).or_insert(0.0) += weight;
        }
        sums
    }

    pub fn validate_layers(sampler: &LadiesSampler, targets: &[NodeIdx], layers: &[SampledLayer], budgets: &[usize]) {
        assert_eq!(layers.len(), budgets.len());

        let mut layer_targets = targets.to_vec();
        for (layer, budget) in layers.iter().zip(budgets.iter()).rev() {
            assert!(!layer.nodes.is_empty());
            assert!(layer.nodes.len() <= *budget);
            assert!(layer.nodes.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(layer.edge_index.edge_count(), layer.edge_weight.len());
            assert_eq!(layer.edge_ptrs.len(), layer.edge_weight.len());

            for (i, e) in layer.edge_ptrs.iter().enumerate() {
                let (v, w) = (layer.edge_index.src[i], layer.edge_index.dst[i]);
                assert_eq!(sampler.edge_index().src[*e], v);
                assert_eq!(sampler.edge_index().dst[*e], w);
                assert!(layer.nodes.contains(&v));
                assert!(layer_targets.contains(&w));
            }

            for (_, sum) in target_sums(layer) {
                assert!((sum - 1.0).abs() < 1e-6);
            }

            layer_targets = layer.nodes.clone();
        }
    }

    #[test]
    fn test_self_loop_degrees() {
        let sampler = random_sampler(3);
        let mut out_degree = vec![0; sampler.node_count()];
        let mut in_degree = vec![0; sampler.node_count()];
        for (v, w) in sampler.edge_index().iter_edges() {
            out_degree[v as usize] += 1;
            in_degree[w as usize] += 1;
        }

        // Nodes 60..64 have no edges of their own
        assert!(out_degree.iter().all(|d| *d >= 1));
        assert!(in_degree.iter().all(|d| *d >= 1));
        assert_eq!(sampler.edge_weights().len(), sampler.edge_count());
    }

    #[test]
    fn test_candidate_sources() {
        let sampler = path_sampler();
        let candidates = sampler.candidate_sources(&[3]).unwrap();

        // Edges (2, 3) at position 2 and (3, 3) at position 6
        assert_eq!(candidates.edge_ptrs, vec![2, 6]);
        assert_eq!(candidates.nodes, vec![2, 3]);
        assert!((candidates.probs[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((candidates.probs[1] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(candidates.prob(1), None);
    }

    #[test]
    fn test_candidate_probabilities_sum_to_one() {
        let sampler = random_sampler(11);
        let targets_list: Vec<Vec<NodeIdx>> = vec![vec![0], vec![5, 5, 5], vec![1, 2, 3, 40, 63], (0..64).collect()];

        for targets in targets_list {
            let candidates = sampler.candidate_sources(&targets).unwrap();
            let sum: f64 = candidates.probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
            assert_eq!(candidates.nodes.len(), candidates.probs.len());
        }
    }

    #[test]
    fn test_path_graph_layers() {
        let sampler = path_sampler();
        let mut rng = SmallRng::from_seed([0; 32]);
        let budgets = vec![2, 2];

        let layers = sampler.sample(&mut rng, &[3], &budgets).unwrap();
        assert_eq!(layers.len(), 2);

        // Two candidates within a budget of two: no draw needed
        let output_layer = &layers[1];
        assert_eq!(output_layer.nodes, vec![2, 3]);
        assert_eq!(output_layer.edge_ptrs, vec![2, 6]);
        assert_eq!(output_layer.edge_index.iter_edges().collect::<Vec<_>>(), vec![(2, 3), (3, 3)]);
        assert!((output_layer.edge_weight[0] - 0.5).abs() < 1e-12);
        assert!((output_layer.edge_weight[1] - 0.5).abs() < 1e-12);

        // Candidates of {2, 3} are {1, 2, 3}
        let input_layer = &layers[0];
        assert!(input_layer.nodes.iter().all(|v| [1, 2, 3].contains(v)));
        validate_layers(&sampler, &[3], &layers, &budgets);
    }

    #[test]
    fn test_budget_covers_candidates() {
        let sampler = random_sampler(5);
        let targets = vec![4, 8, 15];
        let candidates = sampler.candidate_sources(&targets).unwrap();
        let budget = candidates.nodes.len();

        let a = sampler.sample_layer(&mut SmallRng::seed_from_u64(1), &targets, budget).unwrap();
        let b = sampler.sample_layer(&mut SmallRng::seed_from_u64(2), &targets, budget + 10).unwrap();

        assert_eq!(a.nodes, candidates.nodes);
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_is_deduplicated() {
        let sampler = random_sampler(5);
        let targets: Vec<NodeIdx> = (0..30).collect();
        let mut rng = SmallRng::seed_from_u64(9);

        for budget in [1, 3, 10].iter().cloned() {
            let layer = sampler.sample_layer(&mut rng, &targets, budget).unwrap();
            assert!(!layer.nodes.is_empty());
            assert!(layer.nodes.len() <= budget);
        }
    }

    #[test]
    fn test_sample_reproducible() {
        let sampler = random_sampler(21);
        let targets = vec![0, 1, 2, 3, 4, 5];
        let budgets = vec![8, 6, 4];

        let a = sampler.sample(&mut SmallRng::seed_from_u64(42), &targets, &budgets).unwrap();
        let b = sampler.sample(&mut SmallRng::seed_from_u64(42), &targets, &budgets).unwrap();

        assert_eq!(a, b);
        validate_layers(&sampler, &targets, &a, &budgets);
    }

    #[test]
    fn test_sample_weights_normalized_per_target() {
        let sampler = random_sampler(8);
        let mut rng = SmallRng::seed_from_u64(8);

        for _ in 0..20 {
            let targets = vec![7, 13, 21, 50];
            let budgets = vec![5, 10, 3, 12];
            let layers = sampler.sample(&mut rng, &targets, &budgets).unwrap();
            validate_layers(&sampler, &targets, &layers, &budgets);
        }
    }

    #[test]
    fn test_sample_validation() {
        let sampler = path_sampler();
        let mut rng = SmallRng::from_seed([0; 32]);

        assert_eq!(sampler.sample(&mut rng, &[3], &[]).unwrap_err(), SamplingError::EmptyBudgets);
        assert_eq!(sampler.sample(&mut rng, &[3], &[2, 0]).unwrap_err(), SamplingError::InvalidBudget(1));
        assert_eq!(sampler.sample(&mut rng, &[], &[2]).unwrap_err(), SamplingError::EmptyTargets);
        assert_eq!(sampler.sample(&mut rng, &[-1], &[2]).unwrap_err(), SamplingError::InvalidIndex(-1));
        assert_eq!(sampler.sample(&mut rng, &[4], &[2]).unwrap_err(), SamplingError::NodeOutOfRange(4, 4));
        assert_eq!(sampler.candidate_sources(&[]).unwrap_err(), SamplingError::EmptyTargets);
        assert_eq!(sampler.sample_layer(&mut rng, &[1], 0).unwrap_err(), SamplingError::InvalidBudget(0));
    }

    #[test]
    fn test_with_node_count() {
        let edge_index = EdgeIndex::from_edges(&[(0, 1), (1, 5)]).unwrap();
        assert_eq!(
            LadiesSampler::with_node_count(edge_index.clone(), 4).unwrap_err(),
            SamplingError::NodeOutOfRange(5, 4)
        );

        let sampler = LadiesSampler::with_node_count(edge_index, 8).unwrap();
        assert_eq!(sampler.node_count(), 8);
        assert_eq!(sampler.edge_count(), 2 + 8);

        // An isolated node only reaches itself
        let layers = sampler.sample(&mut SmallRng::from_seed([0; 32]), &[7], &[3]).unwrap();
        assert_eq!(layers[0].nodes, vec![7]);
        assert_eq!(layers[0].edge_weight, vec![1.0]);
    }

    #[test]
    fn test_sample_batches() {
        let sampler = random_sampler(13);
        let batches: Vec<Vec<NodeIdx>> = vec![vec![0, 1], vec![2, 3, 4], vec![60], vec![10, 20, 30]];
        let budgets = vec![6, 4];

        let results = sampler.sample_batches(&mut SmallRng::seed_from_u64(3), &batches, &budgets).unwrap();
        assert_eq!(results.len(), batches.len());

        let mut rngs = rng_split(&mut SmallRng::seed_from_u64(3), batches.len());
        for ((batch, layers), rng) in batches.iter().zip(results.iter()).zip(rngs.iter_mut()) {
            let expected = sampler.sample(rng, batch, &budgets).unwrap();
            assert_eq!(layers, &expected);
        }
    }

    #[test]
    fn test_sample_batches_error() {
        let sampler = random_sampler(13);
        let batches: Vec<Vec<NodeIdx>> = vec![vec![0, 1], vec![], vec![100]];

        let result = sampler.sample_batches(&mut SmallRng::seed_from_u64(3), &batches, &[2]);
        assert_eq!(result.unwrap_err(), SamplingError::EmptyTargets);
    }
}
