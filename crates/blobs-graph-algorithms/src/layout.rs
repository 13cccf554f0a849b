//! Force-directed (spring) layout
//!
//! Fruchterman-Reingold placement: every pair of nodes repels with `k²/d`,
//! every edge attracts with `w·d²/k`, and a linearly cooling temperature
//! caps the per-iteration displacement. The result is centred and scaled
//! into `[0, scale] × [0, scale]`.

use super::common::GraphView;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Above this node count the layout switches to the cheaper parameter set
pub const LARGE_GRAPH_THRESHOLD: usize = 5000;

/// Iterations for graphs up to `LARGE_GRAPH_THRESHOLD` nodes
pub const SMALL_GRAPH_ITERATIONS: usize = 100;
/// Iterations for graphs above `LARGE_GRAPH_THRESHOLD` nodes
pub const LARGE_GRAPH_ITERATIONS: usize = 50;

/// `k = c / sqrt(n)` constant for small graphs
pub const SMALL_GRAPH_SPACING: f64 = 1.5;
/// `k = c / sqrt(n)` constant for large graphs
pub const LARGE_GRAPH_SPACING: f64 = 2.0;

const MIN_DISTANCE: f64 = 0.01;
const INITIAL_TEMPERATURE_RATIO: f64 = 0.1;

/// Layout parameters
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutConfig {
    /// Maximum number of cooling iterations
    pub iterations: usize,
    /// Optimal pairwise distance in the unit square; `None` means `1/sqrt(n)`
    pub k: Option<f64>,
    /// Side length of the output square
    pub scale: f64,
    /// Seed for the initial random placement
    pub seed: u64,
    /// Stop early once the mean displacement falls below this value
    pub threshold: f64,
}

impl LayoutConfig {
    /// Parameter set tuned for a graph of `node_count` nodes
    pub fn for_node_count(node_count: usize, scale: f64, seed: u64) -> Self {
        let n = node_count.max(1) as f64;
        let (iterations, spacing) = if node_count > LARGE_GRAPH_THRESHOLD {
            (LARGE_GRAPH_ITERATIONS, LARGE_GRAPH_SPACING)
        } else {
            (SMALL_GRAPH_ITERATIONS, SMALL_GRAPH_SPACING)
        };

        Self {
            iterations,
            k: Some(spacing / n.sqrt()),
            scale,
            seed,
            threshold: 1e-4,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            k: None,
            scale: 1.0,
            seed: 42,
            threshold: 1e-4,
        }
    }
}

/// Compute positions for every node in the view, indexed like `view.index_to_node`.
pub fn spring_layout<N: Sync>(view: &GraphView<N>, config: &LayoutConfig) -> Vec<[f64; 2]> {
    let n = view.node_count;
    if n == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pos: Vec<[f64; 2]> = (0..n).map(|_| [rng.gen::<f64>(), rng.gen::<f64>()]).collect();

    let k = config.k.unwrap_or_else(|| 1.0 / (n as f64).sqrt());
    let mut temperature = span(&pos) * INITIAL_TEMPERATURE_RATIO;
    let cooling = temperature / (config.iterations as f64 + 1.0);

    for _ in 0..config.iterations {
        let displacement: Vec<[f64; 2]> = (0..n)
            .into_par_iter()
            .map(|i| node_displacement(view, &pos, i, k))
            .collect();

        let mut moved = 0.0;
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let mut length = d[0].hypot(d[1]);
            if length < MIN_DISTANCE {
                length = 0.1;
            }
            let step = [d[0] * temperature / length, d[1] * temperature / length];
            p[0] += step[0];
            p[1] += step[1];
            moved += step[0].hypot(step[1]);
        }

        temperature -= cooling;
        if moved / (n as f64) < config.threshold {
            break;
        }
    }

    rescale(&mut pos, config.scale);
    pos
}

fn node_displacement<N>(view: &GraphView<N>, pos: &[[f64; 2]], i: usize, k: f64) -> [f64; 2] {
    let [xi, yi] = pos[i];
    let mut dx_total = 0.0;
    let mut dy_total = 0.0;

    // Repulsion between all pairs
    for (j, &[xj, yj]) in pos.iter().enumerate() {
        if i == j {
            continue;
        }
        let dx = xi - xj;
        let dy = yi - yj;
        let dist = dx.hypot(dy).max(MIN_DISTANCE);
        let force = k * k / (dist * dist);
        dx_total += dx * force;
        dy_total += dy * force;
    }

    // Attraction along edges
    for (&j, &w) in view.neighbors(i).iter().zip(view.weights(i)) {
        if i == j {
            continue;
        }
        let dx = xi - pos[j][0];
        let dy = yi - pos[j][1];
        let dist = dx.hypot(dy).max(MIN_DISTANCE);
        let force = w * dist / k;
        dx_total -= dx * force;
        dy_total -= dy * force;
    }

    [dx_total, dy_total]
}

fn span(pos: &[[f64; 2]]) -> f64 {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &[x, y] in pos {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    (max_x - min_x).max(max_y - min_y)
}

/// Centre on the mean, then scale so the largest absolute coordinate maps to
/// `scale / 2`, and shift into `[0, scale]`.
fn rescale(pos: &mut [[f64; 2]], scale: f64) {
    let n = pos.len() as f64;
    let mean_x = pos.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = pos.iter().map(|p| p[1]).sum::<f64>() / n;

    let mut lim: f64 = 0.0;
    for p in pos.iter_mut() {
        p[0] -= mean_x;
        p[1] -= mean_y;
        lim = lim.max(p[0].abs()).max(p[1].abs());
    }

    let half = scale / 2.0;
    let factor = if lim > 0.0 { half / lim } else { 0.0 };
    for p in pos.iter_mut() {
        p[0] = p[0] * factor + half;
        p[1] = p[1] * factor + half;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_view(n: u64) -> GraphView<u64> {
        let nodes: Vec<u64> = (0..n).collect();
        let edges: Vec<(u64, u64, f64)> = (1..n).map(|i| (i - 1, i, 1.0)).collect();
        GraphView::from_edges(nodes, edges.iter().map(|(s, t, w)| (s, t, *w)))
    }

    #[test]
    fn test_layout_stays_inside_scale() {
        let view = path_view(30);
        let config = LayoutConfig::for_node_count(view.node_count, 500.0, 7);
        let pos = spring_layout(&view, &config);

        assert_eq!(pos.len(), 30);
        for &[x, y] in &pos {
            assert!((0.0..=500.0).contains(&x), "x out of range: {x}");
            assert!((0.0..=500.0).contains(&y), "y out of range: {y}");
        }
    }

    #[test]
    fn test_layout_is_reproducible_for_seed() {
        let view = path_view(12);
        let config = LayoutConfig::for_node_count(view.node_count, 100.0, 3);
        assert_eq!(spring_layout(&view, &config), spring_layout(&view, &config));
    }

    #[test]
    fn test_layout_separates_nodes() {
        let view = path_view(10);
        let pos = spring_layout(&view, &LayoutConfig::for_node_count(10, 1000.0, 1));
        for i in 0..pos.len() {
            for j in (i + 1)..pos.len() {
                let d = (pos[i][0] - pos[j][0]).hypot(pos[i][1] - pos[j][1]);
                assert!(d > 1e-6, "nodes {i} and {j} coincide");
            }
        }
    }

    #[test]
    fn test_single_node_is_centred() {
        let view = path_view(1);
        let pos = spring_layout(&view, &LayoutConfig::for_node_count(1, 200.0, 0));
        assert_eq!(pos, vec![[100.0, 100.0]]);
    }

    #[test]
    fn test_large_graph_parameters() {
        let small = LayoutConfig::for_node_count(100, 1.0, 0);
        let large = LayoutConfig::for_node_count(LARGE_GRAPH_THRESHOLD + 1, 1.0, 0);
        assert_eq!(small.iterations, SMALL_GRAPH_ITERATIONS);
        assert_eq!(large.iterations, LARGE_GRAPH_ITERATIONS);
        assert!(large.k.unwrap() * ((LARGE_GRAPH_THRESHOLD + 1) as f64).sqrt() > 1.9);
    }
}
