//! Common imports for typical client usage.
//!
//! This module intentionally exports the types needed to wire up a gateway
//! and drive the experiment workflow so application code needs fewer import
//! lines.
pub use crate::{
    AlgorithmCatalog, ApiGateway, ClientError, ConfigureContext, DatasetSchema, ExperimentDraft,
    ExperimentWorkflow, MemoryNavigator, Mode, Navigator, QualityBand, ReqwestTransport,
    RunRecord, RunStatus, Screen, ServiceConfig, SessionStore,
};
