#![allow(clippy::type_complexity)]

use pyo3::prelude::*;

mod sampling {
    use pyo3::prelude::*;
    use crate::algo::layer_sampling as ls;
    use crate::data::EdgeIndex;
    use crate::utils::{EdgePtr, NodeIdx, rng_from_seed, Weight};

    type PyLayer = (Vec<NodeIdx>, Vec<NodeIdx>, Vec<Weight>, Vec<NodeIdx>, Vec<EdgePtr<usize>>);

    #[pyclass]
    pub struct LadiesSampler {
        inner: ls::LadiesSampler,
    }

    #[pymethods]
    impl LadiesSampler {
        #[new]
        #[args(node_count = "None")]
        fn new(src: Vec<NodeIdx>, dst: Vec<NodeIdx>, node_count: Option<usize>) -> PyResult<Self> {
            let edge_index = EdgeIndex::new(src, dst)?;
            let inner = match node_count {
                Some(node_count) => ls::LadiesSampler::with_node_count(edge_index, node_count)?,
                None => ls::LadiesSampler::new(edge_index)?,
            };

            Ok(LadiesSampler { inner })
        }

        #[getter]
        fn node_count(&self) -> usize {
            self.inner.node_count()
        }

        #[getter]
        fn edge_count(&self) -> usize {
            self.inner.edge_count()
        }

        /// Returns `(src, dst, edge_weight, nodes, edge_ptrs)` per layer, input side first.
        #[args(seed = "None")]
        fn sample(
            &self,
            targets: Vec<NodeIdx>,
            budgets: Vec<usize>,
            seed: Option<u64>,
        ) -> PyResult<Vec<PyLayer>> {
            let mut rng = rng_from_seed(seed);
            let layers = self.inner.sample(&mut rng, &targets, &budgets)?;

            Ok(layers.into_iter()
                .map(|layer| (
                    layer.edge_index.src,
                    layer.edge_index.dst,
                    layer.edge_weight,
                    layer.nodes,
                    layer.edge_ptrs,
                ))
                .collect())
        }
    }

    pub fn module(py: Python, p: &PyModule) -> PyResult<()> {
        let m = PyModule::new(py, "sampling")?;
        m.add_class::<LadiesSampler>()?;
        p.add_submodule(m)?;
        Ok(())
    }
}

mod split {
    use pyo3::prelude::*;
    use crate::algo::split as sp;
    use crate::utils::rng_from_seed;

    type PySplits = (Vec<usize>, Vec<usize>, Vec<usize>);

    #[pyfunction(train_ratio = "0.2", val_ratio = "0.4", seed = "None")]
    pub fn random_splits(
        n: usize,
        train_ratio: f64,
        val_ratio: f64,
        seed: Option<u64>,
    ) -> PyResult<PySplits> {
        let mut rng = rng_from_seed(seed);
        let sp::Splits { train, val, test } = sp::random_splits(&mut rng, n, train_ratio, val_ratio)?;
        Ok((train, val, test))
    }

    #[pyfunction(
        num_train_per_class = "20",
        num_val_per_class = "30",
        total_num_val = "None",
        total_num_test = "None",
        seed = "None"
    )]
    pub fn random_splits_per_class(
        labels: Vec<usize>,
        num_train_per_class: usize,
        num_val_per_class: usize,
        total_num_val: Option<usize>,
        total_num_test: Option<usize>,
        seed: Option<u64>,
    ) -> PyResult<PySplits> {
        let mut rng = rng_from_seed(seed);
        let sp::Splits { train, val, test } = sp::random_splits_per_class(
            &mut rng, &labels, num_train_per_class, num_val_per_class, total_num_val, total_num_test,
        )?;
        Ok((train, val, test))
    }

    #[pyfunction(n_splits = "10", shuffle = "true", seed = "None")]
    pub fn k_fold(
        n: usize,
        n_splits: usize,
        shuffle: bool,
        seed: Option<u64>,
    ) -> PyResult<Vec<sp::Fold>> {
        let mut rng = rng_from_seed(seed);
        Ok(sp::k_fold(&mut rng, n, n_splits, shuffle)?)
    }

    #[pyfunction(n_splits = "10", shuffle = "true", seed = "None")]
    pub fn stratified_k_fold(
        labels: Vec<usize>,
        n_splits: usize,
        shuffle: bool,
        seed: Option<u64>,
    ) -> PyResult<Vec<sp::Fold>> {
        let mut rng = rng_from_seed(seed);
        Ok(sp::stratified_k_fold(&mut rng, &labels, n_splits, shuffle)?)
    }

    #[pyfunction]
    pub fn index_to_mask(index: Vec<usize>, size: usize) -> PyResult<Vec<bool>> {
        Ok(sp::index_to_mask(&index, size)?)
    }

    pub fn module(py: Python, p: &PyModule) -> PyResult<()> {
        let m = PyModule::new(py, "split")?;
        m.add_function(wrap_pyfunction!(random_splits, m)?)?;
        m.add_function(wrap_pyfunction!(random_splits_per_class, m)?)?;
        m.add_function(wrap_pyfunction!(k_fold, m)?)?;
        m.add_function(wrap_pyfunction!(stratified_k_fold, m)?)?;
        m.add_function(wrap_pyfunction!(index_to_mask, m)?)?;
        p.add_submodule(m)?;
        Ok(())
    }
}

#[pymodule]
fn ladies_sampler(py: Python, m: &PyModule) -> PyResult<()> {
    sampling::module(py, m)?;
    split::module(py, m)?;
    Ok(())
}
