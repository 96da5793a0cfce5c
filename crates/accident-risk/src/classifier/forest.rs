use super::{binary_classes, Classifier, ClassifierError};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::Deserialize;

/// JSON export of a fitted random forest.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForestSpec {
    pub classes: Vec<i64>,
    #[serde(default)]
    pub n_features: Option<usize>,
    pub trees: Vec<TreeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution at the leaf.
    Leaf([f64; 2]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<DecisionNode>,
}

impl DecisionTree {
    fn from_spec(index: usize, spec: TreeSpec) -> Result<Self, ClassifierError> {
        if spec.nodes.is_empty() {
            return Err(ClassifierError::InvalidModel(format!("tree {index} has no nodes")));
        }

        let len = spec.nodes.len();
        let nodes = spec
            .nodes
            .into_iter()
            .enumerate()
            .map(|(position, node)| match node {
                NodeSpec::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if left >= len || right >= len {
                        return Err(ClassifierError::InvalidModel(format!(
                            "tree {index} node {position} points past the end of the tree"
                        )));
                    }
                    Ok(DecisionNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    })
                }
                NodeSpec::Leaf { value } => {
                    let [negative, positive] = value.as_slice() else {
                        return Err(ClassifierError::InvalidModel(format!(
                            "tree {index} leaf {position} has {} class weights",
                            value.len()
                        )));
                    };
                    let total = negative + positive;
                    if !(total > 0.0) {
                        return Err(ClassifierError::InvalidModel(format!(
                            "tree {index} leaf {position} carries no weight"
                        )));
                    }
                    Ok(DecisionNode::Leaf([negative / total, positive / total]))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { nodes })
    }

    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                DecisionNode::Split { feature, .. } => Some(*feature),
                DecisionNode::Leaf(_) => None,
            })
            .max()
    }

    /// Follow splits (`x <= threshold` goes left) until a leaf is reached.
    pub fn leaf_distribution(&self, row: ArrayView1<'_, f64>) -> Result<[f64; 2], ClassifierError> {
        let mut current = 0;
        for _ in 0..self.nodes.len() {
            match &self.nodes[current] {
                DecisionNode::Leaf(distribution) => return Ok(*distribution),
                DecisionNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    current = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }

        Err(ClassifierError::InvalidModel(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }
}

/// Bagged ensemble of decision trees; probabilities are the mean leaf
/// distribution across trees.
#[derive(Debug, Clone)]
pub struct RandomForest {
    classes: [i64; 2],
    width: usize,
    exact_width: bool,
    trees: Vec<DecisionTree>,
}

impl TryFrom<RandomForestSpec> for RandomForest {
    type Error = ClassifierError;

    fn try_from(spec: RandomForestSpec) -> Result<Self, Self::Error> {
        let classes = binary_classes(&spec.classes)?;
        if spec.trees.is_empty() {
            return Err(ClassifierError::InvalidModel(
                "random forest has no trees".to_string(),
            ));
        }

        let trees = spec
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, tree)| DecisionTree::from_spec(index, tree))
            .collect::<Result<Vec<_>, _>>()?;

        let required = trees
            .iter()
            .filter_map(DecisionTree::max_feature)
            .max()
            .map_or(0, |feature| feature + 1);

        let (width, exact_width) = match spec.n_features {
            Some(n_features) if n_features < required => {
                return Err(ClassifierError::InvalidModel(format!(
                    "splits reference feature {} but the model declares {n_features} features",
                    required - 1
                )));
            }
            Some(n_features) => (n_features, true),
            None => (required, false),
        };

        Ok(Self {
            classes,
            width,
            exact_width,
            trees,
        })
    }
}

impl RandomForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn check_shape(&self, rows: &ArrayView2<'_, f64>) -> Result<(), ClassifierError> {
        let actual = rows.ncols();
        let fits = if self.exact_width {
            actual == self.width
        } else {
            actual >= self.width
        };
        if fits {
            Ok(())
        } else {
            Err(ClassifierError::ShapeMismatch {
                expected: self.width,
                actual,
            })
        }
    }
}

impl Classifier for RandomForest {
    fn predict(&self, rows: ArrayView2<'_, f64>) -> Result<Array1<i64>, ClassifierError> {
        let proba = self.predict_proba(rows)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                if row[1] > row[0] {
                    self.classes[1]
                } else {
                    self.classes[0]
                }
            })
            .collect())
    }

    fn predict_proba(&self, rows: ArrayView2<'_, f64>) -> Result<Array2<f64>, ClassifierError> {
        self.check_shape(&rows)?;

        let mut proba = Array2::zeros((rows.nrows(), 2));
        for (row, mut out) in rows.rows().into_iter().zip(proba.rows_mut()) {
            for tree in &self.trees {
                let [negative, positive] = tree.leaf_distribution(row)?;
                out[0] += negative;
                out[1] += positive;
            }
        }
        proba /= self.trees.len() as f64;
        Ok(proba)
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stump(feature: usize, threshold: f64, below: [f64; 2], above: [f64; 2]) -> TreeSpec {
        TreeSpec {
            nodes: vec![
                NodeSpec::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                NodeSpec::Leaf {
                    value: below.to_vec(),
                },
                NodeSpec::Leaf {
                    value: above.to_vec(),
                },
            ],
        }
    }

    fn forest() -> RandomForest {
        RandomForest::try_from(RandomForestSpec {
            classes: vec![0, 1],
            n_features: Some(3),
            trees: vec![
                stump(0, 0.5, [9.0, 1.0], [2.0, 8.0]),
                stump(2, 18.5, [6.0, 4.0], [1.0, 3.0]),
            ],
        })
        .expect("forest builds")
    }

    #[test]
    fn probabilities_average_normalized_leaves() {
        let forest = forest();
        let proba = forest
            .predict_proba(array![[1.0, 0.0, 22.0], [0.0, 0.0, 7.0]].view())
            .expect("scores");

        assert!((proba[[0, 1]] - (0.8 + 0.75) / 2.0).abs() < 1e-12);
        assert!((proba[[1, 1]] - (0.1 + 0.4) / 2.0).abs() < 1e-12);
        assert!((proba[[0, 0]] + proba[[0, 1]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn predict_picks_the_majority_class() {
        let forest = forest();
        let labels = forest
            .predict(array![[1.0, 0.0, 22.0], [0.0, 0.0, 7.0]].view())
            .expect("predicts");
        assert_eq!(labels.to_vec(), vec![1, 0]);
    }

    #[test]
    fn threshold_equality_goes_left() {
        let tree = DecisionTree::from_spec(0, stump(0, 0.5, [1.0, 0.0], [0.0, 1.0]))
            .expect("tree builds");
        let row = array![0.5];
        assert_eq!(tree.leaf_distribution(row.view()).expect("leaf"), [1.0, 0.0]);
    }

    #[test]
    fn declared_width_must_match_the_row() {
        let forest = forest();
        let err = forest
            .predict_proba(array![[1.0, 0.0]].view())
            .expect_err("narrow row rejected");
        assert!(matches!(
            err,
            ClassifierError::ShapeMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn dangling_children_are_rejected_at_load() {
        let spec = TreeSpec {
            nodes: vec![NodeSpec::Split {
                feature: 0,
                threshold: 1.0,
                left: 1,
                right: 7,
            }],
        };
        assert!(DecisionTree::from_spec(0, spec).is_err());
    }

    #[test]
    fn cyclic_trees_fail_instead_of_spinning() {
        let tree = DecisionTree::from_spec(
            0,
            TreeSpec {
                nodes: vec![
                    NodeSpec::Split {
                        feature: 0,
                        threshold: 1.0,
                        left: 1,
                        right: 1,
                    },
                    NodeSpec::Split {
                        feature: 0,
                        threshold: 1.0,
                        left: 0,
                        right: 0,
                    },
                ],
            },
        )
        .expect("structure is index-valid");
        assert!(tree.leaf_distribution(array![0.0].view()).is_err());
    }

    #[test]
    fn leaves_parse_from_json() {
        let raw = r#"{"classes": [0, 1], "trees": [{"nodes": [{"value": [3, 1]}]}]}"#;
        let spec: RandomForestSpec = serde_json::from_str(raw).expect("spec parses");
        let forest = RandomForest::try_from(spec).expect("forest builds");
        assert_eq!(forest.n_trees(), 1);
        let proba = forest.predict_proba(array![[4.0, 2.0]].view()).expect("scores");
        assert!((proba[[0, 1]] - 0.25).abs() < 1e-12);
    }
}
