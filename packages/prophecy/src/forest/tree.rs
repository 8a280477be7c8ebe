//! CART regression tree (variance-reduction splits).

use crate::traits::regressor::{FeatureMatrix, Regressor};

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree stored as a node arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// Row indices of one node, kept once per feature in ascending feature order.
struct NodeRows {
    rows: Vec<usize>,
    by_feature: Vec<Vec<usize>>,
}

impl NodeRows {
    /// Sort the sample once per feature; children inherit the order.
    fn presorted(x: &FeatureMatrix, rows: Vec<usize>) -> Self {
        let by_feature = (0..x.n_cols())
            .map(|feature| {
                let mut order = rows.clone();
                order.sort_by(|&a, &b| x.get(a, feature).total_cmp(&x.get(b, feature)));
                order
            })
            .collect();
        Self { rows, by_feature }
    }

    /// Stable split on `x[feature] <= threshold`; every list stays sorted.
    fn split(self, x: &FeatureMatrix, feature: usize, threshold: f64) -> (Self, Self) {
        let goes_left = |i: &usize| x.get(*i, feature) <= threshold;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            self.rows.into_iter().partition(goes_left);
        let (left_sorted, right_sorted): (Vec<Vec<usize>>, Vec<Vec<usize>>) = self
            .by_feature
            .into_iter()
            .map(|order| order.into_iter().partition::<Vec<usize>, _>(goes_left))
            .unzip();

        (
            Self {
                rows: left_rows,
                by_feature: left_sorted,
            },
            Self {
                rows: right_rows,
                by_feature: right_sorted,
            },
        )
    }
}

impl RegressionTree {
    /// Fit on the rows listed in `samples` (duplicates allowed, as in a bootstrap draw).
    pub fn fit(x: &FeatureMatrix, y: &[f64], samples: Vec<usize>, params: TreeParams) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack = vec![(0usize, NodeRows::presorted(x, samples), 0usize)];

        while let Some((node_id, node_rows, depth)) = stack.pop() {
            let value = mean(y, &node_rows.rows);

            let can_split = node_rows.rows.len() >= params.min_samples_split.max(2)
                && params.max_depth.map_or(true, |max| depth < max)
                && !is_constant(y, &node_rows.rows);

            let split = if can_split {
                best_split(x, y, &node_rows, value, params.min_samples_leaf.max(1))
            } else {
                None
            };

            let Some(split) = split else {
                nodes[node_id] = Node::Leaf { value };
                continue;
            };

            let (left_rows, right_rows) = node_rows.split(x, split.feature, split.threshold);

            let left = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });
            let right = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });

            nodes[node_id] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            stack.push((right, right_rows, depth + 1));
            stack.push((left, left_rows, depth + 1));
        }

        Self { nodes }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

impl Regressor for RegressionTree {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

fn mean(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn is_constant(y: &[f64], indices: &[usize]) -> bool {
    match indices.first() {
        Some(&first) => indices.iter().all(|&i| y[i] == y[first]),
        None => true,
    }
}

/// Lowest summed squared error split, if any split improves on the parent.
///
/// Targets are centred on the node mean before accumulating so large prices
/// do not swamp the running sums.
fn best_split(
    x: &FeatureMatrix,
    y: &[f64],
    node_rows: &NodeRows,
    node_mean: f64,
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let indices = &node_rows.rows;
    let n = indices.len();
    if n < 2 * min_leaf {
        return None;
    }

    let centred = |i: usize| y[i] - node_mean;
    let total_sum: f64 = indices.iter().map(|&i| centred(i)).sum();
    let total_sq: f64 = indices.iter().map(|&i| centred(i).powi(2)).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let mut best: Option<SplitCandidate> = None;

    for (feature, order) in node_rows.by_feature.iter().enumerate() {
        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for k in 1..n {
            let prev = order[k - 1];
            let c = centred(prev);
            left_sum += c;
            left_sq += c * c;

            if k < min_leaf || n - k < min_leaf {
                continue;
            }

            let lo = x.get(prev, feature);
            let hi = x.get(order[k], feature);
            if lo >= hi {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / k as f64)
                + (right_sq - right_sum * right_sum / (n - k) as f64);

            if best.as_ref().map_or(true, |b| sse < b.sse) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    sse,
                });
            }
        }
    }

    best.filter(|b| b.sse < parent_sse - parent_sse.abs() * 1e-12)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (FeatureMatrix, Vec<f64>) {
        let x = FeatureMatrix::from_rows(1, (0..10).map(|i| vec![i as f64]));
        let y = (0..10).map(|i| if i < 5 { 100.0 } else { 200.0 }).collect();
        (x, y)
    }

    #[test]
    fn test_fits_step_function_exactly() {
        let (x, y) = step_data();
        let tree = RegressionTree::fit(&x, &y, (0..10).collect(), TreeParams::default());

        assert_eq!(tree.predict(&[1.0]), 100.0);
        assert_eq!(tree.predict(&[8.0]), 200.0);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_threshold_is_midpoint() {
        let (x, y) = step_data();
        let tree = RegressionTree::fit(&x, &y, (0..10).collect(), TreeParams::default());

        assert_eq!(tree.predict(&[4.4]), 100.0);
        assert_eq!(tree.predict(&[4.6]), 200.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = FeatureMatrix::from_rows(2, (0..6).map(|i| vec![i as f64, (i * 2) as f64]));
        let y = vec![7.0; 6];
        let tree = RegressionTree::fit(&x, &y, (0..6).collect(), TreeParams::default());

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[100.0, -3.0]), 7.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = FeatureMatrix::from_rows(1, (0..32).map(|i| vec![i as f64]));
        let y: Vec<f64> = (0..32).map(|i| (i * i) as f64).collect();
        let params = TreeParams {
            max_depth: Some(2),
            ..Default::default()
        };

        let tree = RegressionTree::fit(&x, &y, (0..32).collect(), params);
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let (x, y) = step_data();
        let params = TreeParams {
            min_samples_leaf: 6,
            ..Default::default()
        };

        // No split can leave six rows on both sides of ten.
        let tree = RegressionTree::fit(&x, &y, (0..10).collect(), params);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[0.0]), 150.0);
    }

    #[test]
    fn test_duplicate_feature_values_never_split_apart() {
        let x = FeatureMatrix::from_rows(1, vec![vec![1.0], vec![1.0], vec![2.0]]);
        let y = vec![10.0, 20.0, 30.0];
        let tree = RegressionTree::fit(&x, &y, vec![0, 1, 2], TreeParams::default());

        assert_eq!(tree.predict(&[1.0]), 15.0);
        assert_eq!(tree.predict(&[2.0]), 30.0);
    }

    #[test]
    fn test_children_keep_feature_order() {
        // Column 1 runs opposite to row index.
        let x = FeatureMatrix::from_rows(2, (0..8).map(|i| vec![i as f64, (7 - i) as f64]));
        let y = vec![0.0, 0.0, 0.0, 0.0, 50.0, 50.0, 90.0, 90.0];
        let tree = RegressionTree::fit(&x, &y, (0..8).collect(), TreeParams::default());

        for i in 0..8 {
            assert_eq!(tree.predict(&[i as f64, (7 - i) as f64]), y[i]);
        }
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn test_bootstrap_duplicates_follow_their_row() {
        let x = FeatureMatrix::from_rows(2, (0..6).map(|i| vec![(i % 3) as f64, i as f64]));
        let y = vec![10.0, 10.0, 10.0, 40.0, 40.0, 40.0];
        let samples = vec![0, 0, 0, 1, 3, 3, 5, 5, 4];
        let tree = RegressionTree::fit(&x, &y, samples, TreeParams::default());

        assert_eq!(tree.predict(&[0.0, 0.0]), 10.0);
        assert_eq!(tree.predict(&[1.0, 1.0]), 10.0);
        assert_eq!(tree.predict(&[0.0, 3.0]), 40.0);
        assert_eq!(tree.predict(&[2.0, 5.0]), 40.0);
        assert_eq!(tree.depth(), 1);
    }
}
