use std::collections::BTreeMap;

use crate::errors::ClientError;
use crate::gateway::ApiGateway;
use crate::schema::Mode;

/// Human-readable description of one algorithm.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
pub struct AlgorithmInfo {
    pub description: String,
    #[serde(default)]
    pub best_for: String,
}

/// Catalog of offered algorithms, split by learning mode.
///
/// Read-only reference data, independent of any dataset. The selector for a
/// given mode is populated only from the matching half, so picking an
/// algorithm from the wrong half is impossible by construction.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct AlgorithmCatalog {
    #[serde(default)]
    pub regression_algorithms: BTreeMap<String, AlgorithmInfo>,
    #[serde(default)]
    pub classification_algorithms: BTreeMap<String, AlgorithmInfo>,
}

impl AlgorithmCatalog {
    /// Returns the catalog half matching the given mode.
    pub fn half(&self, mode: Mode) -> &BTreeMap<String, AlgorithmInfo> {
        match mode {
            Mode::Regression => &self.regression_algorithms,
            Mode::Classification => &self.classification_algorithms,
        }
    }

    /// Candidate algorithm names for the given mode.
    pub fn names_for(&self, mode: Mode) -> Vec<&str> {
        self.half(mode).keys().map(String::as_str).collect()
    }

    /// True when `name` is offered for the given mode.
    pub fn offers(&self, mode: Mode, name: &str) -> bool {
        self.half(mode).contains_key(name)
    }

    /// Looks up an algorithm's description within a mode's half.
    pub fn info(&self, mode: Mode, name: &str) -> Option<&AlgorithmInfo> {
        self.half(mode).get(name)
    }

    /// Built-in catalog used when the catalog endpoint is unreachable.
    ///
    /// Mirrors the service's own algorithm table so the degraded path still
    /// offers the full set.
    pub fn builtin() -> Self {
        fn entry(name: &str, description: &str, best_for: &str) -> (String, AlgorithmInfo) {
            (
                name.to_string(),
                AlgorithmInfo {
                    description: description.to_string(),
                    best_for: best_for.to_string(),
                },
            )
        }

        Self {
            regression_algorithms: BTreeMap::from([
                entry(
                    "linear_regression",
                    "Fits a straight line to predict a continuous numeric target.",
                    "Continuous numeric datasets with linear relationships.",
                ),
                entry(
                    "ridge_regression",
                    "Linear regression with L2 regularization to reduce overfitting.",
                    "Numeric datasets with many correlated features or risk of overfitting.",
                ),
                entry(
                    "lasso_regression",
                    "Linear regression with L1 regularization to perform feature selection.",
                    "Sparse datasets where you want to eliminate irrelevant features.",
                ),
                entry(
                    "random_forest_regressor",
                    "Ensemble of decision trees for robust predictions.",
                    "Large datasets with non-linear relationships.",
                ),
                entry(
                    "gradient_boosting_regressor",
                    "Boosting method that combines weak learners to create strong models.",
                    "Complex non-linear regression problems where accuracy is key.",
                ),
                entry(
                    "decision_tree_regressor",
                    "Single decision tree model for regression tasks.",
                    "Simple datasets where interpretability is important.",
                ),
            ]),
            classification_algorithms: BTreeMap::from([
                entry(
                    "logistic_regression",
                    "Predicts probability of a binary class using a logistic function.",
                    "Binary classification datasets (yes/no, spam/ham, etc.).",
                ),
                entry(
                    "random_forest_classifier",
                    "Ensemble of trees for multi-class classification.",
                    "Categorical targets with many classes or noisy data.",
                ),
                entry(
                    "gradient_boosting_classifier",
                    "Boosting method for classification tasks that focuses on hard-to-classify samples.",
                    "Complex classification problems where accuracy is critical.",
                ),
                entry(
                    "decision_tree_classifier",
                    "Single decision tree model for classification tasks.",
                    "Small datasets or when model interpretability is key.",
                ),
                entry(
                    "svm_classifier",
                    "Finds best hyperplane to separate classes in feature space.",
                    "Small/medium datasets with clear class boundaries.",
                ),
                entry(
                    "knn_classifier",
                    "Predicts class based on the majority of nearest neighbors.",
                    "Small datasets where decision boundaries are irregular.",
                ),
            ]),
        }
    }
}

/// Fetches the algorithm catalog from the service.
pub async fn fetch_catalog(gateway: &ApiGateway) -> Result<AlgorithmCatalog, ClientError> {
    gateway.get_json("/experiments/algorithm-info").await
}
