//! Interpolation weights between nodes and the oversampled grid.
//!
//! Every node touches `(2m + 2)^d` grid points. A [`Spreader`] yields those
//! points with their window weight, either evaluating the window on demand
//! or reading one of the caches built by [`Spreader::precompute`].

use log::debug;

use crate::flags::PsiStrategy;
use crate::window::{LinearTable, Window};

/// Caches built by the precompute strategies.
#[derive(Debug, Clone)]
enum PsiCache {
    /// One window table per dimension.
    Linear(Vec<LinearTable>),
    /// `(first index, head, ratio)` per node and dimension.
    FastGaussian(Vec<(isize, f64, f64)>),
    /// First index per node and dimension, then `2m + 2` weights each.
    Psi { first: Vec<isize>, weights: Vec<f64> },
    /// Flattened grid index and tensor weight of every touched point.
    Full {
        index: Vec<usize>,
        weights: Vec<f64>,
        per_node: usize,
    },
}

impl PsiCache {
    fn entries(&self) -> usize {
        match self {
            PsiCache::Linear(tables) => tables.iter().map(LinearTable::len).sum(),
            PsiCache::FastGaussian(factors) => factors.len(),
            PsiCache::Psi { weights, .. } => weights.len(),
            PsiCache::Full { weights, .. } => weights.len(),
        }
    }
}

/// Per-node tensor-product stencil with reusable workspace.
#[derive(Debug, Clone)]
struct Stencil {
    d: usize,
    support: usize,
    /// Wrapped, stride-scaled grid offsets, `d * support`.
    offset: Vec<usize>,
    /// Window weights, `d * support`.
    weight: Vec<f64>,
    counter: Vec<usize>,
    prefix_weight: Vec<f64>,
    prefix_offset: Vec<usize>,
}

impl Stencil {
    fn new(d: usize, support: usize) -> Self {
        Self {
            d,
            support,
            offset: vec![0; d * support],
            weight: vec![0.0; d * support],
            counter: vec![0; d],
            prefix_weight: vec![0.0; d],
            prefix_offset: vec![0; d],
        }
    }

    fn set_offsets(&mut self, t: usize, first: isize, n: usize, stride: usize) {
        let s = self.support;
        for (r, o) in self.offset[t * s..(t + 1) * s].iter_mut().enumerate() {
            *o = (first + r as isize).rem_euclid(n as isize) as usize * stride;
        }
    }

    fn weights_mut(&mut self, t: usize) -> &mut [f64] {
        let s = self.support;
        &mut self.weight[t * s..(t + 1) * s]
    }

    /// Call `f(grid_index, weight)` for every point of the stencil.
    fn visit(&mut self, mut f: impl FnMut(usize, f64)) {
        let (d, s) = (self.d, self.support);
        self.counter.fill(0);
        let mut level = 0;
        loop {
            for t in level..d {
                let (w, o) = if t == 0 {
                    (1.0, 0)
                } else {
                    (self.prefix_weight[t - 1], self.prefix_offset[t - 1])
                };
                let r = self.counter[t];
                self.prefix_weight[t] = w * self.weight[t * s + r];
                self.prefix_offset[t] = o + self.offset[t * s + r];
            }
            f(self.prefix_offset[d - 1], self.prefix_weight[d - 1]);

            let mut t = d;
            loop {
                if t == 0 {
                    return;
                }
                t -= 1;
                self.counter[t] += 1;
                if self.counter[t] < s {
                    break;
                }
                self.counter[t] = 0;
            }
            level = t;
        }
    }
}

/// Maps nodes to weighted grid points according to a [`PsiStrategy`].
#[derive(Debug, Clone)]
pub(crate) struct Spreader {
    windows: Vec<Window>,
    n: Vec<usize>,
    strides: Vec<usize>,
    strategy: PsiStrategy,
    cache: Option<PsiCache>,
    stencil: Stencil,
}

impl Spreader {
    pub fn new(windows: Vec<Window>, n: &[usize], strategy: PsiStrategy) -> Self {
        let d = n.len();
        let mut strides = vec![1; d];
        for t in (0..d.saturating_sub(1)).rev() {
            strides[t] = strides[t + 1] * n[t + 1];
        }
        let support = windows.first().map(Window::support).unwrap_or(0);
        Self {
            windows,
            n: n.to_vec(),
            strides,
            strategy,
            cache: None,
            stencil: Stencil::new(d, support),
        }
    }

    /// Whether the spreader can run with the current nodes.
    pub fn is_ready(&self) -> bool {
        !self.strategy.needs_precompute() || self.cache.is_some()
    }

    /// Drop any node-dependent cache.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Build the cache for `x`. A no-op for strategies without one.
    pub fn precompute(&mut self, x: &[f64]) {
        let d = self.n.len();
        let m_total = x.len() / d;
        let cache = match self.strategy {
            PsiStrategy::OnDemand | PsiStrategy::FastGaussian => return,
            PsiStrategy::PreLinear => {
                PsiCache::Linear(self.windows.iter().map(Window::linear_table).collect())
            }
            PsiStrategy::PreFastGaussian => PsiCache::FastGaussian(
                x.chunks_exact(d)
                    .flat_map(|node| {
                        node.iter()
                            .zip(&self.windows)
                            .map(|(&xt, w)| w.fast_gaussian_factors(w.grid_position(xt)))
                    })
                    .collect(),
            ),
            PsiStrategy::PrePsi => {
                let s = self.stencil.support;
                let mut first = Vec::with_capacity(m_total * d);
                let mut weights = vec![0.0; m_total * d * s];
                for (node, out) in x.chunks_exact(d).zip(weights.chunks_exact_mut(d * s)) {
                    for (t, (&xt, w)) in node.iter().zip(&self.windows).enumerate() {
                        let u = w.grid_position(xt);
                        first.push(w.fill(u, &mut out[t * s..(t + 1) * s]));
                    }
                }
                PsiCache::Psi { first, weights }
            }
            PsiStrategy::PreFullPsi => {
                let per_node = self.stencil.support.pow(d as u32);
                let mut index = Vec::with_capacity(m_total * per_node);
                let mut weights = Vec::with_capacity(m_total * per_node);
                for node in x.chunks_exact(d) {
                    self.fill_on_demand(node);
                    self.stencil.visit(|i, w| {
                        index.push(i);
                        weights.push(w);
                    });
                }
                PsiCache::Full {
                    index,
                    weights,
                    per_node,
                }
            }
        };
        debug!(
            "precomputed {:?} psi for {m_total} nodes ({} entries)",
            self.strategy,
            cache.entries()
        );
        self.cache = Some(cache);
    }

    /// Call `f(grid_index, weight)` for every grid point node `j` touches.
    ///
    /// Callers must check [`is_ready`](Self::is_ready) first.
    pub fn visit_node(&mut self, x: &[f64], j: usize, mut f: impl FnMut(usize, f64)) {
        let d = self.n.len();
        let node = &x[j * d..(j + 1) * d];
        let s = self.stencil.support;
        match (&self.cache, self.strategy) {
            (Some(PsiCache::Full { index, weights, per_node }), _) => {
                let range = j * per_node..(j + 1) * per_node;
                for (&i, &w) in index[range.clone()].iter().zip(&weights[range]) {
                    f(i, w);
                }
                return;
            }
            (Some(PsiCache::Psi { first, weights }), _) => {
                for t in 0..d {
                    let k = j * d + t;
                    self.stencil
                        .set_offsets(t, first[k], self.n[t], self.strides[t]);
                    self.stencil
                        .weights_mut(t)
                        .copy_from_slice(&weights[k * s..(k + 1) * s]);
                }
            }
            (Some(PsiCache::FastGaussian(factors)), _) => {
                for t in 0..d {
                    let (first, head, ratio) = factors[j * d + t];
                    self.stencil
                        .set_offsets(t, first, self.n[t], self.strides[t]);
                    self.windows[t].fill_fast_gaussian(head, ratio, self.stencil.weights_mut(t));
                }
            }
            (Some(PsiCache::Linear(tables)), _) => {
                for (t, &xt) in node.iter().enumerate() {
                    let u = self.windows[t].grid_position(xt);
                    let first = self.windows[t].first_index(u);
                    self.stencil
                        .set_offsets(t, first, self.n[t], self.strides[t]);
                    for (r, w) in self.stencil.weights_mut(t).iter_mut().enumerate() {
                        *w = tables[t].eval(u - (first + r as isize) as f64);
                    }
                }
            }
            (None, PsiStrategy::FastGaussian) => {
                for (t, &xt) in node.iter().enumerate() {
                    let w = &self.windows[t];
                    let (first, head, ratio) = w.fast_gaussian_factors(w.grid_position(xt));
                    self.stencil
                        .set_offsets(t, first, self.n[t], self.strides[t]);
                    self.windows[t].fill_fast_gaussian(head, ratio, self.stencil.weights_mut(t));
                }
            }
            (None, _) => fill_stencil(&mut self.stencil, &self.windows, &self.n, &self.strides, node),
        }
        self.stencil.visit(f);
    }

    fn fill_on_demand(&mut self, node: &[f64]) {
        fill_stencil(&mut self.stencil, &self.windows, &self.n, &self.strides, node);
    }
}

/// Evaluate the window directly for one node.
fn fill_stencil(
    stencil: &mut Stencil,
    windows: &[Window],
    n: &[usize],
    strides: &[usize],
    node: &[f64],
) {
    for (t, &xt) in node.iter().enumerate() {
        let u = windows[t].grid_position(xt);
        let first = windows[t].fill(u, stencil.weights_mut(t));
        stencil.set_offsets(t, first, n[t], strides[t]);
    }
}
