use serde::{Deserialize, Serialize};

use super::artifacts::ArtifactError;
use crate::models::TitleFeatures;

/// Predicts the category of a title from its descriptive fields
///
/// Returns `None` when the model cannot produce a label; callers surface that
/// as a classification failure.
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &TitleFeatures) -> Option<String>;

    /// Model name for logging
    fn name(&self) -> &'static str;
}

/// Input field a model feature is derived from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Country,
    ReleaseYear,
    Rating,
    ListedIn,
    DurationInt,
}

impl Field {
    fn is_numeric(self) -> bool {
        matches!(self, Field::ReleaseYear | Field::DurationInt)
    }
}

/// One column of the encoded feature vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Numeric field passed through unchanged
    Numeric(Field),
    /// 1.0 when the text field equals `category`, else 0.0
    OneHot { field: Field, category: String },
}

impl Feature {
    fn encode(&self, features: &TitleFeatures) -> f64 {
        match self {
            Feature::Numeric(Field::ReleaseYear) => features.release_year as f64,
            Feature::Numeric(Field::DurationInt) => features.duration_int as f64,
            Feature::Numeric(_) => 0.0,
            Feature::OneHot { field, category } => {
                let value = match field {
                    Field::Country => features.country.as_str(),
                    Field::Rating => features.rating.as_str(),
                    Field::ListedIn => features.listed_in.as_str(),
                    Field::ReleaseYear | Field::DurationInt => return 0.0,
                };
                if value.trim() == category {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Goes `left` when the feature value is `<= threshold`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { class: usize },
}

/// Decision-tree ensemble predicting by majority vote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    classes: Vec<String>,
    features: Vec<Feature>,
    /// Each tree is a node list rooted at index 0
    trees: Vec<Vec<Node>>,
}

impl TreeEnsemble {
    pub fn new(classes: Vec<String>, features: Vec<Feature>, trees: Vec<Vec<Node>>) -> Self {
        Self {
            classes,
            features,
            trees,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Checks that every tree is well formed against the feature and class lists.
    ///
    /// Children must come after their parent, so evaluation always terminates.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.classes.is_empty() {
            return Err(ArtifactError::Incompatible(
                "classifier declares no classes".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::Incompatible(
                "classifier has no trees".to_string(),
            ));
        }

        for feature in &self.features {
            let consistent = match feature {
                Feature::Numeric(field) => field.is_numeric(),
                Feature::OneHot { field, .. } => !field.is_numeric(),
            };
            if !consistent {
                return Err(ArtifactError::Incompatible(format!(
                    "feature {:?} does not match its field type",
                    feature
                )));
            }
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.is_empty() {
                return Err(ArtifactError::Incompatible(format!("tree {} is empty", t)));
            }
            for (i, node) in tree.iter().enumerate() {
                let valid = match node {
                    Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } => {
                        *feature < self.features.len()
                            && *left > i
                            && *right > i
                            && *left < tree.len()
                            && *right < tree.len()
                    }
                    Node::Leaf { class } => *class < self.classes.len(),
                };
                if !valid {
                    return Err(ArtifactError::Incompatible(format!(
                        "tree {} node {} is malformed",
                        t, i
                    )));
                }
            }
        }

        Ok(())
    }

    fn encode(&self, features: &TitleFeatures) -> Vec<f64> {
        self.features.iter().map(|f| f.encode(features)).collect()
    }

    fn evaluate(tree: &[Node], x: &[f64]) -> Option<usize> {
        let mut idx = 0;
        loop {
            match tree.get(idx)? {
                Node::Leaf { class } => return Some(*class),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = *x.get(*feature)?;
                    let next = if value <= *threshold { *left } else { *right };
                    if next <= idx {
                        return None;
                    }
                    idx = next;
                }
            }
        }
    }
}

impl Classifier for TreeEnsemble {
    fn predict(&self, features: &TitleFeatures) -> Option<String> {
        let x = self.encode(features);
        let mut votes = vec![0usize; self.classes.len()];
        for tree in &self.trees {
            if let Some(class) = Self::evaluate(tree, &x) {
                if let Some(count) = votes.get_mut(class) {
                    *count += 1;
                }
            }
        }

        // First class wins ties
        let (best, count) = votes
            .iter()
            .enumerate()
            .fold((0, 0), |acc, (i, &c)| if c > acc.1 { (i, c) } else { acc });
        if count == 0 {
            return None;
        }
        self.classes.get(best).cloned()
    }

    fn name(&self) -> &'static str {
        "tree_ensemble"
    }
}

/// Fraction of labelled cases the classifier predicts correctly
pub fn accuracy(classifier: &dyn Classifier, cases: &[(TitleFeatures, &str)]) -> f64 {
    if cases.is_empty() {
        return 0.0;
    }
    let correct = cases
        .iter()
        .filter(|(features, expected)| classifier.predict(features).as_deref() == Some(*expected))
        .count();
    correct as f64 / cases.len() as f64
}
