use std::collections::HashMap;
use std::fmt;

use crate::errors::ClientError;
use crate::gateway::ApiGateway;

/// Dtype tags the service reports for categorical/text columns.
///
/// Everything else (ints, floats, dates) infers a regression target.
const CATEGORICAL_DTYPES: &[&str] = &["object", "category"];

/// Default recommendation for a categorical target.
pub const CLASSIFICATION_DEFAULT: &str = "random_forest_classifier";
/// Default recommendation for a numeric target.
pub const REGRESSION_DEFAULT: &str = "linear_regression";

/// Column names and type tags for an uploaded dataset.
///
/// Fetched once per dataset and immutable for the session. A column missing
/// from `dtypes` is tolerated and treated as unknown (numeric-by-default for
/// mode inference).
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct DatasetSchema {
    pub columns: Vec<String>,
    #[serde(default)]
    pub dtypes: HashMap<String, String>,
}

impl DatasetSchema {
    /// Returns the dtype tag for a column, if the service reported one.
    pub fn dtype(&self, column: &str) -> Option<&str> {
        self.dtypes.get(column).map(String::as_str)
    }
}

/// Fetches the schema for an uploaded dataset.
///
/// Callers with no dataset identifier must skip this entirely (manual-entry
/// path); an empty identifier fails fast without a network call.
pub async fn fetch_schema(
    gateway: &ApiGateway,
    dataset_id: &str,
) -> Result<DatasetSchema, ClientError> {
    if dataset_id.trim().is_empty() {
        return Err(ClientError::validation("dataset id must not be empty"));
    }
    gateway
        .get_json(&format!("/datasets/{dataset_id}/info"))
        .await
}

/// Learning mode inferred from the target column's dtype tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Regression,
    Classification,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Regression => f.write_str("regression"),
            Mode::Classification => f.write_str("classification"),
        }
    }
}

/// Mode plus the preselected algorithm for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recommendation {
    pub mode: Mode,
    pub algorithm: &'static str,
}

/// Pure recommendation rule: categorical target dtype means classification
/// with a random-forest default, anything else (including targets the
/// service reported no dtype for) means regression with linear regression.
///
/// Returns `None` when no target is chosen yet; neither recommendation is
/// active in that state. Re-invoke whenever the target or dtypes change;
/// whether the result overwrites a user's manual algorithm choice is the
/// caller's decision.
pub fn recommend(target: &str, dtypes: &HashMap<String, String>) -> Option<Recommendation> {
    if target.trim().is_empty() {
        return None;
    }
    let categorical = dtypes
        .get(target)
        .is_some_and(|tag| CATEGORICAL_DTYPES.contains(&tag.as_str()));
    Some(if categorical {
        Recommendation {
            mode: Mode::Classification,
            algorithm: CLASSIFICATION_DEFAULT,
        }
    } else {
        Recommendation {
            mode: Mode::Regression,
            algorithm: REGRESSION_DEFAULT,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigate::{MemoryNavigator, Screen};
    use crate::store::SessionStore;
    use crate::testutil::{FakeTransport, json_response};
    use std::sync::Arc;

    fn dtypes(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn numeric_target_recommends_regression() {
        let dtypes = dtypes(&[("price", "float64"), ("rooms", "int64")]);
        let rec = recommend("price", &dtypes).expect("recommendation");
        assert_eq!(rec.mode, Mode::Regression);
        assert_eq!(rec.algorithm, "linear_regression");
    }

    #[test]
    fn categorical_target_recommends_classification() {
        for tag in ["object", "category"] {
            let dtypes = dtypes(&[("city", tag)]);
            let rec = recommend("city", &dtypes).expect("recommendation");
            assert_eq!(rec.mode, Mode::Classification);
            assert_eq!(rec.algorithm, "random_forest_classifier");
        }
    }

    #[test]
    fn target_absent_from_dtypes_defaults_to_regression() {
        let rec = recommend("mystery", &HashMap::new()).expect("recommendation");
        assert_eq!(rec.mode, Mode::Regression);
    }

    #[test]
    fn no_target_means_no_active_recommendation() {
        assert_eq!(recommend("", &dtypes(&[("a", "object")])), None);
        assert_eq!(recommend("   ", &HashMap::new()), None);
    }

    #[tokio::test]
    async fn empty_dataset_id_fails_without_a_network_call() {
        let transport = Arc::new(FakeTransport::returning(vec![]));
        let gateway = crate::gateway::ApiGateway::new(
            transport.clone(),
            SessionStore::in_memory(),
            Arc::new(MemoryNavigator::starting_at(Screen::Configure)),
        );
        let err = fetch_schema(&gateway, "").await.expect_err("should fail");
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn schema_fetch_decodes_columns_and_dtypes() {
        let transport = Arc::new(FakeTransport::returning(vec![json_response(
            200,
            serde_json::json!({
                "columns": ["price", "rooms"],
                "dtypes": {"price": "float64", "rooms": "int64"}
            }),
        )]));
        let gateway = crate::gateway::ApiGateway::new(
            transport.clone(),
            SessionStore::in_memory(),
            Arc::new(MemoryNavigator::starting_at(Screen::Configure)),
        );
        let schema = fetch_schema(&gateway, "d1").await.expect("schema");
        assert_eq!(schema.columns, vec!["price", "rooms"]);
        assert_eq!(schema.dtype("price"), Some("float64"));
        assert_eq!(schema.dtype("missing"), None);
        assert_eq!(transport.requests()[0].path, "/datasets/d1/info");
    }
}
