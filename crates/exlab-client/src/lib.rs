//! Client library for a remote supervised-learning experiment service.
//!
//! Covers the full experiment workflow: authenticate, upload a tabular
//! dataset, configure a run from the dataset's schema (with an algorithm
//! recommendation derived from the target column's dtype), submit the run,
//! and retrieve results and history. All ML computation happens server-side;
//! this crate owns the session, the authenticated API access, and the
//! cross-screen state handoff.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use exlab_client::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let store = SessionStore::open(".exlab/session.json");
//! let navigator = Arc::new(MemoryNavigator::default());
//! let transport = Arc::new(ReqwestTransport::new(ServiceConfig::from_env())?);
//! let gateway = ApiGateway::new(transport, store, navigator.clone());
//! let workflow = ExperimentWorkflow::new(gateway, navigator);
//!
//! workflow.login("me@example.com", "secret").await?;
//! let dataset_id = workflow
//!     .upload_dataset("house.csv", std::fs::read("house.csv").unwrap())
//!     .await?;
//!
//! let mut context = workflow.configure_context().await;
//! if let Some(schema) = context.schema.as_ref() {
//!     context.draft.set_target("price", &schema.dtypes);
//!     context.draft.set_features_from_list("rooms,area");
//! }
//! let run_id = workflow.submit(&context.draft).await?;
//! let record = workflow.run_results(&run_id).await?;
//! println!("{dataset_id} -> run {run_id}: {}", record.status);
//! # Ok(())
//! # }
//! ```

/// Algorithm catalog and its built-in fallback.
pub mod catalog;
/// Service connection configuration.
pub mod config;
/// Experiment configuration draft and its validation.
pub mod draft;
/// Public error taxonomy.
pub mod errors;
/// Authenticated gateway: the single choke point for service requests.
pub mod gateway;
/// Screen model and navigation seam.
pub mod navigate;
/// Process-wide tracing setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Run records, submission, results, history, and report download.
pub mod runs;
/// Dataset schema resolution and the mode/algorithm recommendation rule.
pub mod schema;
/// Durable session slot for the credential and dataset reference.
pub mod store;
/// HTTP transport seam and the reqwest-backed default.
pub mod transport;
/// Cross-screen workflow controller.
pub mod workflow;

#[cfg(test)]
pub(crate) mod testutil;

pub use catalog::{AlgorithmCatalog, AlgorithmInfo, fetch_catalog};
pub use config::ServiceConfig;
pub use draft::{ExperimentDraft, MAX_SPLIT, MIN_SPLIT};
pub use errors::ClientError;
pub use gateway::ApiGateway;
pub use navigate::{MemoryNavigator, Navigator, Screen};
pub use observability::init_observability;
pub use runs::{
    QualityBand, RunRecord, RunRequest, RunStatus, band_for_r2, download_report, fetch_history,
    fetch_run, submit_run,
};
pub use schema::{DatasetSchema, Mode, Recommendation, fetch_schema, recommend};
pub use store::SessionStore;
pub use transport::{ApiRequest, ApiResponse, ApiTransport, Method, ReqwestTransport, RequestBody};
pub use workflow::{ConfigureContext, ExperimentWorkflow};
