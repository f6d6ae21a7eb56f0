use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::draft::ExperimentDraft;
use crate::errors::ClientError;
use crate::gateway::ApiGateway;

/// Lifecycle of a server-side run.
///
/// The service historically tagged finished runs `done`; deserialization
/// normalizes that and `error` into the canonical taxonomy, and unrecognized
/// tags fold to `Pending` so a record without a result reads as "no result
/// yet" instead of failing to decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl RunStatus {
    /// Normalizes a service status tag, folding legacy and unknown tags.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "running" => RunStatus::Running,
            "succeeded" | "done" | "success" => RunStatus::Succeeded,
            "failed" | "error" => RunStatus::Failed,
            _ => RunStatus::Pending,
        }
    }

    /// True once the record can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Succeeded | RunStatus::Failed)
    }
}

impl<'de> serde::Deserialize<'de> for RunStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::Deserialize as _;
        let raw = String::deserialize(deserializer)?;
        Ok(RunStatus::from_tag(&raw))
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Highlight band for a headline metric. Presentation only, never control
/// flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QualityBand {
    Good,
    Middling,
    Poor,
}

/// Bands an R² score: >= 0.7 good, < 0.4 poor, otherwise middling.
pub fn band_for_r2(r2: f64) -> QualityBand {
    if r2 >= 0.7 {
        QualityBand::Good
    } else if r2 < 0.4 {
        QualityBand::Poor
    } else {
        QualityBand::Middling
    }
}

/// One run as reported by the service. Read-only on the client; immutable
/// server-side once the status is terminal.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct RunRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub metrics: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub algorithm: Option<String>,
    /// Base64-encoded rendered plot images, in service order.
    #[serde(default)]
    pub plots: Vec<String>,
}

impl RunRecord {
    /// True once metrics exist; before that the run renders as
    /// "no result yet", not as an error.
    pub fn has_result(&self) -> bool {
        self.metrics.as_ref().is_some_and(|m| !m.is_empty())
    }

    /// Returns a named metric, if present.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.as_ref().and_then(|m| m.get(name)).copied()
    }

    /// Highlight band for the R² headline metric, when reported.
    pub fn headline_band(&self) -> Option<QualityBand> {
        self.metric("r2").map(band_for_r2)
    }

    /// Decodes the base64 plot blobs into raw image bytes.
    pub fn decode_plots(&self) -> Result<Vec<Vec<u8>>, ClientError> {
        self.plots
            .iter()
            .map(|blob| {
                BASE64
                    .decode(blob.as_bytes())
                    .map_err(|e| ClientError::transport(format!("invalid plot encoding: {e}")))
            })
            .collect()
    }
}

/// Wire shape for a run submission.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RunRequest {
    pub dataset_id: String,
    pub target: String,
    pub features: Vec<String>,
    pub split: f64,
    pub algorithm: String,
}

impl RunRequest {
    /// Validates a draft and freezes it into a submittable request.
    pub fn from_draft(draft: &ExperimentDraft) -> Result<Self, ClientError> {
        draft.validate()?;
        Ok(Self {
            // validate() guarantees the dataset id is present
            dataset_id: draft.dataset_id.clone().unwrap_or_default(),
            target: draft.target.clone(),
            features: draft.features.clone(),
            split: draft.split,
            algorithm: draft.algorithm.clone(),
        })
    }
}

#[derive(serde::Deserialize)]
struct RunSubmitted {
    #[serde(deserialize_with = "de_id")]
    experiment_id: String,
}

/// Submits a run and returns the server-assigned run identifier.
///
/// Never retried: a resubmission would start a second training run.
pub async fn submit_run(gateway: &ApiGateway, request: &RunRequest) -> Result<String, ClientError> {
    let submitted: RunSubmitted = gateway.post_json("/experiments/run", request).await?;
    Ok(submitted.experiment_id)
}

/// Fetches one run's outcome.
pub async fn fetch_run(gateway: &ApiGateway, id: &str) -> Result<RunRecord, ClientError> {
    gateway.get_json(&format!("/experiments/{id}")).await
}

/// Fetches the full run history in service order (newest first).
pub async fn fetch_history(gateway: &ApiGateway) -> Result<Vec<RunRecord>, ClientError> {
    gateway.get_json("/experiments").await
}

/// Downloads the rendered report document for a run.
///
/// The report endpoint authenticates through a token query parameter, so a
/// missing credential fails fast without a network call.
pub async fn download_report(gateway: &ApiGateway, id: &str) -> Result<bytes::Bytes, ClientError> {
    let Some(token) = gateway.store().credential() else {
        return Err(ClientError::unauthenticated(
            "log in to download the report",
        ));
    };
    gateway
        .get_bytes(&format!("/experiments/{id}/download?token={token}"))
        .await
}

/// Accepts identifiers serialized as JSON strings or numbers; the client
/// treats them as opaque strings either way.
fn de_id<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::Deserialize as _;
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(i64),
        Text(String),
    }
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => n.to_string(),
        IdRepr::Text(s) => s,
    })
}

/// Accepts RFC 3339 timestamps as well as the service's offset-less ISO
/// form (assumed UTC). Unparseable values decode as absent.
fn de_timestamp<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    use serde::Deserialize as _;
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigate::{MemoryNavigator, Screen};
    use crate::store::SessionStore;
    use crate::testutil::{FakeTransport, json_response};
    use std::sync::Arc;

    fn gateway(transport: Arc<FakeTransport>) -> ApiGateway {
        let store = SessionStore::in_memory();
        store.set_credential("tok");
        ApiGateway::new(
            transport,
            store,
            Arc::new(MemoryNavigator::starting_at(Screen::History)),
        )
    }

    #[test]
    fn status_normalizes_legacy_and_unknown_tags() {
        let decode = |raw: &str| serde_json::from_str::<RunStatus>(raw).expect("status");
        assert_eq!(decode("\"done\""), RunStatus::Succeeded);
        assert_eq!(decode("\"succeeded\""), RunStatus::Succeeded);
        assert_eq!(decode("\"error\""), RunStatus::Failed);
        assert_eq!(decode("\"running\""), RunStatus::Running);
        assert_eq!(decode("\"queued-for-later\""), RunStatus::Pending);
    }

    #[test]
    fn record_accepts_numeric_ids_and_naive_timestamps() {
        let record: RunRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "created_at": "2026-08-29T10:15:30.123456",
            "target": "price",
            "status": "done",
            "metrics": {"r2": 0.82, "mse": 12.5}
        }))
        .expect("record");
        assert_eq!(record.id, "7");
        assert!(record.created_at.is_some());
        assert_eq!(record.status, RunStatus::Succeeded);
        assert_eq!(record.headline_band(), Some(QualityBand::Good));
    }

    #[test]
    fn bands_follow_r2_thresholds() {
        assert_eq!(band_for_r2(0.7), QualityBand::Good);
        assert_eq!(band_for_r2(0.69), QualityBand::Middling);
        assert_eq!(band_for_r2(0.4), QualityBand::Middling);
        assert_eq!(band_for_r2(0.39), QualityBand::Poor);
    }

    #[test]
    fn run_without_metrics_is_no_result_yet() {
        let record: RunRecord =
            serde_json::from_value(serde_json::json!({"id": "e7", "status": "running"}))
                .expect("record");
        assert!(!record.has_result());
        assert_eq!(record.headline_band(), None);
        assert_eq!(record.status, RunStatus::Running);
        assert!(!record.status.is_terminal());
    }

    #[test]
    fn plots_decode_from_base64() {
        let record: RunRecord = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "plots": [BASE64.encode(b"png-bytes")]
        }))
        .expect("record");
        assert_eq!(record.decode_plots().expect("plots"), vec![b"png-bytes".to_vec()]);
    }

    #[tokio::test]
    async fn submission_failure_surfaces_server_diagnostic() {
        let transport = Arc::new(FakeTransport::returning(vec![json_response(
            400,
            serde_json::json!({"detail": "Target 'y' not found in dataset"}),
        )]));
        let gw = gateway(transport);
        let request = RunRequest {
            dataset_id: "d1".into(),
            target: "y".into(),
            features: vec!["a".into()],
            split: 0.2,
            algorithm: "linear_regression".into(),
        };
        let err = submit_run(&gw, &request).await.expect_err("should fail");
        assert_eq!(err.message(), "Target 'y' not found in dataset");
    }

    #[tokio::test]
    async fn history_preserves_service_order() {
        let page = serde_json::json!([
            {"id": 3, "status": "done", "metrics": {"r2": 0.5}},
            {"id": 2, "status": "done"},
            {"id": 1, "status": "done"},
        ]);
        let transport = Arc::new(FakeTransport::returning(vec![
            json_response(200, page.clone()),
            json_response(200, page),
        ]));
        let gw = gateway(transport);

        let first = fetch_history(&gw).await.expect("history");
        let second = fetch_history(&gw).await.expect("history");
        let ids: Vec<&str> = first.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn report_download_requires_a_credential() {
        let transport = Arc::new(FakeTransport::returning(vec![]));
        let gw = ApiGateway::new(
            transport.clone(),
            SessionStore::in_memory(),
            Arc::new(MemoryNavigator::starting_at(Screen::History)),
        );
        let err = download_report(&gw, "e7").await.expect_err("should fail");
        assert!(matches!(err, ClientError::Unauthenticated(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn report_download_passes_token_as_query() {
        let transport = Arc::new(FakeTransport::returning(vec![Ok(
            crate::transport::ApiResponse {
                status: 200,
                body: bytes::Bytes::from_static(b"%PDF-1.4"),
            },
        )]));
        let gw = gateway(transport.clone());
        let body = download_report(&gw, "e7").await.expect("report");
        assert_eq!(&body[..], b"%PDF-1.4");
        assert_eq!(
            transport.requests()[0].path,
            "/experiments/e7/download?token=tok"
        );
    }
}
