//! # Abaco Core
//!
//! Core library for the Abaco persona-driven financial-analytics assistant.
//! Provides the data-quality remediation pipeline, the resilient
//! text-generation backend client, the persona catalog, the analytics
//! engine, configuration, and fundamental types.

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod personas;
pub mod pipeline;
pub mod types;

// Re-export commonly used types at the crate root.
pub use backend::{
    BACKEND_ERROR_PREFIX, GenerationOptions, GrokClient, MockBackend, TextBackend,
    is_backend_error,
};
pub use config::{AppConfig, BackendConfig, OutputConfig, PipelineConfig, RetryConfig};
pub use engine::{AnalyticsEngine, RequestContext};
pub use error::{AbacoError, BackendError, ConfigError, PipelineError, Result};
pub use orchestrator::{
    AgentExecutionResult, AgentOrchestrator, AgentTriggerType, ExecutionStatus,
    OrchestrationResult,
};
pub use personas::{AgentKind, AgentPersonality, PersonaCatalog, resolve_agent_kind};
pub use pipeline::{
    PipelineCoordinator, PipelineRun, RemediationEngine, RunStatus, ScoringEngine, Summarizer,
};
pub use types::{
    ActionLogEntry, Defect, DefectKind, FieldValue, QualityReport, QualityStatus,
    QualityThresholds, Record, RecordSet,
};
