use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::catalog::{AlgorithmCatalog, fetch_catalog};
use crate::draft::ExperimentDraft;
use crate::errors::ClientError;
use crate::gateway::ApiGateway;
use crate::navigate::{Navigator, Screen};
use crate::runs::{RunRecord, RunRequest, fetch_history, fetch_run, submit_run};
use crate::schema::{DatasetSchema, fetch_schema};
use crate::store::SessionStore;

#[derive(serde::Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(serde::Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    #[serde(deserialize_with = "de_dataset_id")]
    dataset_id: String,
}

fn de_dataset_id<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
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

/// Everything the Configure screen needs, with degraded fallbacks applied.
#[derive(Clone, Debug)]
pub struct ConfigureContext {
    /// Schema of the active dataset. `None` when no dataset is uploaded or
    /// the schema fetch failed; the host falls back to free-text
    /// target/feature entry.
    pub schema: Option<DatasetSchema>,
    /// Algorithm catalog, built-in when the service copy is unreachable.
    pub catalog: AlgorithmCatalog,
    /// A fresh draft bound to the active dataset, if any.
    pub draft: ExperimentDraft,
}

/// RAII guard for the per-action busy flag.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives the Upload → Configure → Run → Results → History flow against the
/// experiment service.
///
/// User-triggered actions that launch a training-side effect (upload,
/// submit) are gated by a busy flag so a second concurrent invocation fails
/// fast instead of issuing a duplicate request. Cancellation is not
/// supported: a dispatched request runs to completion and the caller simply
/// discards the response if it navigated away.
pub struct ExperimentWorkflow {
    gateway: ApiGateway,
    navigator: Arc<dyn Navigator>,
    busy: AtomicBool,
    confirm_delay: Duration,
}

impl ExperimentWorkflow {
    /// Creates a workflow over the gateway's session and the given navigator.
    ///
    /// The navigator should be the same instance the gateway redirects
    /// through, so forced re-login and workflow navigation agree on the
    /// current screen.
    pub fn new(gateway: ApiGateway, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            gateway,
            navigator,
            busy: AtomicBool::new(false),
            // Long enough for the upload confirmation to be seen before the
            // screen changes.
            confirm_delay: Duration::from_secs(1),
        }
    }

    /// Overrides the pause between a successful upload and navigating on.
    pub fn confirm_delay(mut self, delay: Duration) -> Self {
        self.confirm_delay = delay;
        self
    }

    /// Returns the session store backing this workflow.
    pub fn store(&self) -> &SessionStore {
        self.gateway.store()
    }

    fn acquire_busy(&self) -> Result<BusyGuard<'_>, ClientError> {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(ClientError::validation("another request is in flight"));
        }
        Ok(BusyGuard(&self.busy))
    }

    /// Logs in, stores the bearer credential, and moves to the Upload screen.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let response: LoginResponse = self
            .gateway
            .post_json("/auth/login", &Credentials { email, password })
            .await?;
        self.store().set_credential(response.access_token);
        info!(email, "logged in");
        self.navigator.goto(Screen::Upload);
        Ok(())
    }

    /// Registers a new account. The caller stays on the login surface.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), ClientError> {
        self.gateway
            .post_json::<_, serde_json::Value>("/auth/register", &Credentials { email, password })
            .await?;
        info!(email, "registered");
        Ok(())
    }

    /// Drops the credential and dataset reference and returns to login.
    pub fn logout(&self) {
        self.store().clear();
        self.navigator.goto(Screen::Auth);
    }

    /// Uploads a tabular dataset and persists the returned identifier as the
    /// active dataset reference.
    ///
    /// After a successful upload the workflow pauses for the confirmation
    /// delay, then moves to Configure. Returns the dataset identifier.
    pub async fn upload_dataset(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, ClientError> {
        let _busy = self.acquire_busy()?;
        let response: UploadResponse = self
            .gateway
            .upload_file("/datasets/upload", file_name, bytes)
            .await?;
        self.store().set_dataset_id(&response.dataset_id);
        info!(dataset_id = %response.dataset_id, file_name, "dataset uploaded");

        tokio::time::sleep(self.confirm_delay).await;
        self.navigator.goto(Screen::Configure);
        Ok(response.dataset_id)
    }

    /// Assembles the Configure screen's inputs, degrading rather than
    /// failing: a missing dataset id skips the schema fetch entirely, a
    /// failed schema fetch falls back to manual entry, and a failed catalog
    /// fetch falls back to the built-in algorithm table.
    pub async fn configure_context(&self) -> ConfigureContext {
        let dataset_id = self.store().dataset_id();
        let schema = match dataset_id.as_deref() {
            None => None,
            Some(id) => match fetch_schema(&self.gateway, id).await {
                Ok(schema) => Some(schema),
                Err(e) => {
                    warn!(dataset_id = id, error = %e, "schema fetch failed, falling back to manual entry");
                    None
                }
            },
        };
        let catalog = match fetch_catalog(&self.gateway).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "catalog fetch failed, using built-in algorithm table");
                AlgorithmCatalog::builtin()
            }
        };
        let draft = match dataset_id {
            Some(id) => ExperimentDraft::for_dataset(id),
            None => ExperimentDraft::default(),
        };
        ConfigureContext {
            schema,
            catalog,
            draft,
        }
    }

    /// Validates and submits a run, then navigates to its Results screen.
    ///
    /// Validation happens client-side first, so a bad draft costs no round
    /// trip. On failure the server diagnostic is returned verbatim and no
    /// retry is attempted.
    pub async fn submit(&self, draft: &ExperimentDraft) -> Result<String, ClientError> {
        let _busy = self.acquire_busy()?;
        let request = RunRequest::from_draft(draft)?;
        let run_id = submit_run(&self.gateway, &request).await?;
        info!(run_id = %run_id, algorithm = %request.algorithm, target = %request.target, "run submitted");
        self.navigator.goto(Screen::Results(run_id.clone()));
        Ok(run_id)
    }

    /// Fetches one run's outcome for the Results screen.
    pub async fn run_results(&self, id: &str) -> Result<RunRecord, ClientError> {
        fetch_run(&self.gateway, id).await
    }

    /// Fetches the run history for the History screen.
    pub async fn run_history(&self) -> Result<Vec<RunRecord>, ClientError> {
        fetch_history(&self.gateway).await
    }

    /// Downloads the rendered report for a run.
    pub async fn download_report(&self, id: &str) -> Result<bytes::Bytes, ClientError> {
        crate::runs::download_report(&self.gateway, id).await
    }
}
