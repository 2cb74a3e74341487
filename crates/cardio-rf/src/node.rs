use std::fmt;

/// Column position of a feature in a training row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Slot of a node in [`DecisionTree`](crate::DecisionTree) storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Gini or entropy of the samples reaching a node.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// Outcome of presenting a row to one node.
#[derive(Debug, PartialEq)]
pub(crate) enum Step<'a> {
    Descend(NodeIndex),
    Arrive {
        prediction: usize,
        distribution: &'a [f64],
    },
}

/// One tree node. The root sits in slot 0 and children always come after
/// their parent.
#[derive(Debug, Clone)]
pub enum Node {
    Split {
        feature: FeatureIndex,
        /// Rows with `row[feature] <= threshold` descend left.
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
        impurity: Impurity,
        n_samples: usize,
        /// `n * parent - n_left * left - n_right * right`, summed for MDI.
        impurity_decrease: f64,
    },
    Leaf {
        /// Majority class; the lowest label wins a tie.
        prediction: usize,
        /// Class frequencies of the training rows in this leaf.
        distribution: Vec<f64>,
        impurity: Impurity,
        n_samples: usize,
    },
}

impl Node {
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Left and right child slots of a split.
    #[must_use]
    pub fn children(&self) -> Option<(NodeIndex, NodeIndex)> {
        match self {
            Node::Split { left, right, .. } => Some((*left, *right)),
            Node::Leaf { .. } => None,
        }
    }

    /// The child a row descends to, or the leaf's vote.
    pub(crate) fn step(&self, row: &[f64]) -> Step<'_> {
        match self {
            Node::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => Step::Descend(if row[feature.index()] <= *threshold {
                *left
            } else {
                *right
            }),
            Node::Leaf {
                prediction,
                distribution,
                ..
            } => Step::Arrive {
                prediction: *prediction,
                distribution,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FeatureIndex, Impurity, Node, NodeIndex, Step};

    // thalach <= -0.12 (standardized) splits 30 patients
    fn thalach_split() -> Node {
        Node::Split {
            feature: FeatureIndex::new(7),
            threshold: -0.12,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            impurity: Impurity::new(0.48),
            n_samples: 30,
            impurity_decrease: 6.2,
        }
    }

    #[test]
    fn split_routes_on_threshold() {
        let node = thalach_split();
        let mut row = vec![0.0; 13];
        row[7] = -0.12;
        assert_eq!(node.step(&row), Step::Descend(NodeIndex::new(1)));
        row[7] = 0.4;
        assert_eq!(node.step(&row), Step::Descend(NodeIndex::new(2)));
        assert_eq!(node.children(), Some((NodeIndex::new(1), NodeIndex::new(2))));
        assert_eq!(node.n_samples(), 30);
        assert!(!node.is_leaf());
    }

    #[test]
    fn leaf_has_no_children() {
        let leaf = Node::Leaf {
            prediction: 0,
            distribution: vec![0.9, 0.1],
            impurity: Impurity::new(0.18),
            n_samples: 10,
        };
        assert!(leaf.is_leaf());
        assert_eq!(
            leaf.step(&[1.0]),
            Step::Arrive {
                prediction: 0,
                distribution: &[0.9, 0.1],
            }
        );
        assert_eq!(leaf.children(), None);
        assert_eq!(leaf.impurity().to_string(), "0.1800");
    }
}
