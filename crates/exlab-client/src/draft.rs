use std::collections::HashMap;

use crate::errors::ClientError;
use crate::schema::{Mode, Recommendation, recommend};

/// Lower bound for the test split fraction.
pub const MIN_SPLIT: f64 = 0.1;
/// Upper bound for the test split fraction.
pub const MAX_SPLIT: f64 = 0.9;

/// Experiment configuration assembled on the Configure screen.
///
/// Mutated incrementally by user input and validated client-side before
/// submission; discarded after a successful run request.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperimentDraft {
    pub dataset_id: Option<String>,
    pub target: String,
    pub features: Vec<String>,
    pub split: f64,
    pub algorithm: String,
}

impl Default for ExperimentDraft {
    fn default() -> Self {
        Self {
            dataset_id: None,
            target: String::new(),
            features: Vec::new(),
            split: 0.2,
            algorithm: "linear_regression".to_string(),
        }
    }
}

impl ExperimentDraft {
    /// Starts a draft for an uploaded dataset.
    pub fn for_dataset(dataset_id: impl Into<String>) -> Self {
        Self {
            dataset_id: Some(dataset_id.into()),
            ..Self::default()
        }
    }

    /// Sets the target column and re-evaluates the recommendation.
    ///
    /// The recommendation, when one applies, overwrites the current
    /// algorithm choice; a later `set_algorithm` override sticks until the
    /// target changes again. The new target is removed from the feature set.
    /// Returns the applied recommendation so a host can badge it.
    pub fn set_target(
        &mut self,
        target: impl Into<String>,
        dtypes: &HashMap<String, String>,
    ) -> Option<Recommendation> {
        self.target = target.into();
        self.features.retain(|f| f != &self.target);
        let rec = recommend(&self.target, dtypes);
        if let Some(rec) = rec.as_ref() {
            self.algorithm = rec.algorithm.to_string();
        }
        rec
    }

    /// Adds a feature column. The target and duplicates are ignored.
    pub fn add_feature(&mut self, feature: impl Into<String>) {
        let feature = feature.into();
        if feature.is_empty() || feature == self.target || self.features.contains(&feature) {
            return;
        }
        self.features.push(feature);
    }

    /// Removes a feature column if present.
    pub fn remove_feature(&mut self, feature: &str) {
        self.features.retain(|f| f != feature);
    }

    /// Replaces the feature set from a comma-separated list (the manual
    /// free-text entry path used when no schema is available).
    pub fn set_features_from_list(&mut self, raw: &str) {
        self.features.clear();
        for piece in raw.split(',') {
            self.add_feature(piece.trim().to_string());
        }
    }

    /// Sets the test split fraction, clamped to [0.1, 0.9].
    pub fn set_split(&mut self, split: f64) {
        self.split = split.clamp(MIN_SPLIT, MAX_SPLIT);
    }

    /// Manually overrides the algorithm choice.
    pub fn set_algorithm(&mut self, algorithm: impl Into<String>) {
        self.algorithm = algorithm.into();
    }

    /// Current learning mode, undefined until a target is chosen.
    pub fn mode(&self, dtypes: &HashMap<String, String>) -> Option<Mode> {
        recommend(&self.target, dtypes).map(|rec| rec.mode)
    }

    /// Fail-fast validation performed before any network call.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self
            .dataset_id
            .as_ref()
            .is_none_or(|id| id.trim().is_empty())
        {
            return Err(ClientError::validation("no dataset uploaded"));
        }
        if self.target.trim().is_empty() {
            return Err(ClientError::validation("target column must be chosen"));
        }
        if self.features.is_empty() {
            return Err(ClientError::validation(
                "at least one feature column is required",
            ));
        }
        if self.features.contains(&self.target) {
            return Err(ClientError::validation(
                "target column cannot also be a feature",
            ));
        }
        if !(MIN_SPLIT..=MAX_SPLIT).contains(&self.split) {
            return Err(ClientError::validation(
                "test split must be between 0.1 and 0.9",
            ));
        }
        if self.algorithm.trim().is_empty() {
            return Err(ClientError::validation("algorithm must be chosen"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dtypes(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn setting_target_applies_recommendation_and_drops_it_from_features() {
        let mut draft = ExperimentDraft::for_dataset("d1");
        draft.add_feature("price");
        draft.add_feature("rooms");

        let rec = draft.set_target("price", &dtypes(&[("price", "float64")]));
        assert_eq!(rec.map(|r| r.mode), Some(Mode::Regression));
        assert_eq!(draft.algorithm, "linear_regression");
        assert_eq!(draft.features, vec!["rooms"]);
    }

    #[test]
    fn manual_override_sticks_until_target_changes() {
        let mut draft = ExperimentDraft::for_dataset("d1");
        let dtypes = dtypes(&[("city", "object"), ("price", "float64")]);

        draft.set_target("city", &dtypes);
        assert_eq!(draft.algorithm, "random_forest_classifier");

        draft.set_algorithm("knn_classifier");
        assert_eq!(draft.algorithm, "knn_classifier");

        draft.set_target("price", &dtypes);
        assert_eq!(draft.algorithm, "linear_regression");
    }

    #[test]
    fn split_clamps_at_both_bounds() {
        let mut draft = ExperimentDraft::default();
        draft.set_split(0.01);
        assert_eq!(draft.split, MIN_SPLIT);
        draft.set_split(0.95);
        assert_eq!(draft.split, MAX_SPLIT);
        draft.set_split(0.3);
        assert_eq!(draft.split, 0.3);
    }

    #[test]
    fn comma_separated_feature_entry_trims_and_dedupes() {
        let mut draft = ExperimentDraft::for_dataset("d1");
        draft.target = "price".to_string();
        draft.set_features_from_list("rooms, area ,rooms,, price");
        assert_eq!(draft.features, vec!["rooms", "area"]);
    }

    #[test]
    fn validation_rejects_empty_target_and_empty_features() {
        let mut draft = ExperimentDraft::for_dataset("d1");
        draft.features = vec!["a".to_string()];
        assert!(matches!(draft.validate(), Err(ClientError::Validation(_))));

        draft.target = "y".to_string();
        draft.features.clear();
        assert!(matches!(draft.validate(), Err(ClientError::Validation(_))));
    }

    #[test]
    fn validation_rejects_missing_dataset() {
        let mut draft = ExperimentDraft::default();
        draft.target = "y".to_string();
        draft.features = vec!["a".to_string()];
        assert!(matches!(draft.validate(), Err(ClientError::Validation(_))));

        draft.dataset_id = Some("d1".to_string());
        assert!(draft.validate().is_ok());
    }
}
