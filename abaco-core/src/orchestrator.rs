//! Production agent trigger system.
//!
//! Runs a trigger group of persona agents through the analytics engine,
//! captures per-agent results with durations, derives the run status, and
//! persists a JSON result plus a companion Markdown report. Field names in
//! the persisted JSON are a compatibility surface; do not rename them.

use crate::backend::is_backend_error;
use crate::engine::{AnalyticsEngine, RequestContext};
use crate::error::{AbacoError, Result};
use crate::personas::AgentKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Selects which agents an orchestration run triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentTriggerType {
    All,
    Executive,
    Risk,
    Operations,
    Growth,
    Financial,
    Quality,
    Compliance,
}

impl AgentTriggerType {
    pub const ALL_CHOICES: [AgentTriggerType; 8] = [
        AgentTriggerType::All,
        AgentTriggerType::Executive,
        AgentTriggerType::Risk,
        AgentTriggerType::Operations,
        AgentTriggerType::Growth,
        AgentTriggerType::Financial,
        AgentTriggerType::Quality,
        AgentTriggerType::Compliance,
    ];

    /// The agents in this trigger group, in execution order.
    pub fn agents(&self) -> Vec<AgentKind> {
        match self {
            AgentTriggerType::All => AgentKind::ALL.to_vec(),
            AgentTriggerType::Executive => vec![AgentKind::Executive],
            AgentTriggerType::Risk => vec![AgentKind::RiskCro, AgentKind::RiskManager],
            AgentTriggerType::Operations => {
                vec![AgentKind::Collections, AgentKind::Quality, AgentKind::Mlops]
            }
            AgentTriggerType::Growth => {
                vec![AgentKind::Growth, AgentKind::Commercial, AgentKind::Kam]
            }
            AgentTriggerType::Financial => vec![AgentKind::Financial],
            AgentTriggerType::Quality => vec![AgentKind::Quality],
            AgentTriggerType::Compliance => vec![AgentKind::Compliance],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentTriggerType::All => "all",
            AgentTriggerType::Executive => "executive",
            AgentTriggerType::Risk => "risk",
            AgentTriggerType::Operations => "operations",
            AgentTriggerType::Growth => "growth",
            AgentTriggerType::Financial => "financial",
            AgentTriggerType::Quality => "quality",
            AgentTriggerType::Compliance => "compliance",
        }
    }
}

impl std::fmt::Display for AgentTriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentTriggerType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AgentTriggerType::ALL_CHOICES
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| {
                format!(
                    "unknown trigger type '{}' (expected one of: {})",
                    s,
                    AgentTriggerType::ALL_CHOICES
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Execution status for a single agent or a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Partial,
    Failed,
    Skipped,
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStatus::Success => "success",
            ExecutionStatus::Partial => "partial",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Skipped => "skipped",
        };
        write!(f, "{}", s)
    }
}

/// Result of a single agent execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentExecutionResult {
    pub agent_id: String,
    pub agent_name: String,
    pub status: ExecutionStatus,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
    pub output: String,
    pub error: Option<String>,
    pub lines_generated: usize,
}

/// Result of one orchestration run. Serialized field names and nesting are
/// stable for downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub run_id: String,
    pub trigger_type: AgentTriggerType,
    pub timestamp: DateTime<Utc>,
    pub total_duration_ms: u64,
    pub agents_executed: usize,
    pub agents_failed: usize,
    pub status: ExecutionStatus,
    pub metadata: Value,
    pub results: Vec<AgentExecutionResult>,
}

/// Orchestrates persona agent runs over a shared engine.
pub struct AgentOrchestrator {
    engine: Arc<AnalyticsEngine>,
    output_dir: PathBuf,
}

impl AgentOrchestrator {
    pub fn new(engine: Arc<AnalyticsEngine>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            output_dir: output_dir.into(),
        }
    }

    /// Trigger the agents in a group and collect their results.
    ///
    /// Individual agent failures are captured in the result payload, never
    /// propagated: a failing agent yields a `failed` entry while the run
    /// continues with the remaining agents.
    pub async fn trigger_agents(
        &self,
        trigger_type: AgentTriggerType,
        demo_data: Option<Value>,
    ) -> OrchestrationResult {
        let started_at = Utc::now();
        let clock = Instant::now();
        let run_id = format!("run_{}", started_at.format("%Y%m%d_%H%M%S"));

        info!(run_id = %run_id, trigger = %trigger_type, "Starting orchestration run");

        let data = demo_data.unwrap_or_else(default_demo_data);
        let agents = trigger_type.agents();
        let mut results = Vec::with_capacity(agents.len());
        let mut failed_count = 0usize;

        for kind in &agents {
            let result = self.execute_agent_safely(*kind, &data).await;
            if result.status == ExecutionStatus::Failed {
                failed_count += 1;
            }
            info!(
                agent = %result.agent_name,
                status = %result.status,
                duration_ms = result.duration_ms,
                "Agent executed"
            );
            results.push(result);
        }

        let total_duration_ms = clock.elapsed().as_millis() as u64;
        let status = determine_run_status(failed_count, agents.len());

        info!(
            run_id = %run_id,
            executed = agents.len(),
            failed = failed_count,
            total_duration_ms,
            "Orchestration complete"
        );

        OrchestrationResult {
            run_id,
            trigger_type,
            timestamp: started_at,
            total_duration_ms,
            agents_executed: agents.len(),
            agents_failed: failed_count,
            status,
            metadata: json!({
                "version": env!("CARGO_PKG_VERSION"),
                "environment": "production",
                "trigger_groups": agents.iter().map(|k| k.key()).collect::<Vec<_>>(),
            }),
            results,
        }
    }

    /// Execute a single agent, converting backend-failure sentinels into a
    /// `failed` result.
    async fn execute_agent_safely(&self, kind: AgentKind, data: &Value) -> AgentExecutionResult {
        let clock = Instant::now();
        let agent_name = self
            .engine
            .catalog()
            .get(kind)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| kind.key().to_string());

        let output = self
            .engine
            .generate_response(kind.agent_id(), &RequestContext::default(), data)
            .await;

        let (status, error) = if is_backend_error(&output) {
            (ExecutionStatus::Failed, Some(output.clone()))
        } else {
            (ExecutionStatus::Success, None)
        };

        AgentExecutionResult {
            agent_id: kind.key().to_string(),
            agent_name,
            status,
            timestamp: Utc::now(),
            duration_ms: clock.elapsed().as_millis() as u64,
            lines_generated: if output.is_empty() {
                0
            } else {
                output.lines().count()
            },
            output,
            error,
        }
    }

    /// Persist the run result as JSON plus a companion Markdown report.
    ///
    /// Returns the path of the JSON result file.
    pub fn save_results(&self, result: &OrchestrationResult) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let result_file = self.output_dir.join(format!("{}_result.json", result.run_id));
        let rendered = serde_json::to_string_pretty(result)?;
        std::fs::write(&result_file, rendered)?;
        info!(path = %result_file.display(), "Results saved");

        let report_file = self.output_dir.join(format!("{}_report.md", result.run_id));
        save_markdown_report(result, &report_file)?;
        info!(path = %report_file.display(), "Report saved");

        Ok(result_file)
    }
}

/// Derive the run status from the failure count.
fn determine_run_status(failed_count: usize, total_agents: usize) -> ExecutionStatus {
    if failed_count == 0 {
        ExecutionStatus::Success
    } else if failed_count < total_agents {
        ExecutionStatus::Partial
    } else {
        ExecutionStatus::Failed
    }
}

/// Render the human-readable mirror of the JSON result.
fn save_markdown_report(
    result: &OrchestrationResult,
    path: &Path,
) -> std::result::Result<(), AbacoError> {
    let success_rate = if result.agents_executed == 0 {
        0.0
    } else {
        (result.agents_executed - result.agents_failed) as f64 / result.agents_executed as f64
            * 100.0
    };

    let mut report = format!(
        "# Abaco Agent Orchestration Report\n\n\
         **Run ID**: {run_id}\n\
         **Timestamp**: {timestamp}\n\
         **Status**: {status}\n\
         **Total Duration**: {duration}ms\n\n\
         ## Summary\n\n\
         - **Agents Executed**: {executed}\n\
         - **Agents Failed**: {failed}\n\
         - **Success Rate**: {rate:.1}%\n\n\
         ## Agent Results\n\n",
        run_id = result.run_id,
        timestamp = result.timestamp.to_rfc3339(),
        status = result.status,
        duration = result.total_duration_ms,
        executed = result.agents_executed,
        failed = result.agents_failed,
        rate = success_rate,
    );

    for r in &result.results {
        report.push_str(&format!(
            "### {name}\n\
             - **Status**: {status}\n\
             - **Duration**: {duration}ms\n\
             - **Lines Generated**: {lines}\n",
            name = r.agent_name,
            status = r.status,
            duration = r.duration_ms,
            lines = r.lines_generated,
        ));
        if let Some(ref error) = r.error {
            report.push_str(&format!("- **Error**: {}\n", error));
        }
        report.push('\n');
    }

    std::fs::write(path, report)?;
    Ok(())
}

/// Demo portfolio dataset used when the caller supplies no input data.
pub fn default_demo_data() -> Value {
    json!({
        "kpis": {
            "tpv": 2_450_000,
            "clients": 245,
            "default_rate": 0.021,
            "npa": 0.032,
            "growth_mom": 0.128,
            "default_trend": -0.003
        },
        "portfolio": {
            "par30": 0.085,
            "concentration": 0.382,
            "avg_pod": 0.18,
            "olb": 5_200_000,
            "high_risk_pct": 15.2
        },
        "dpd_cases": {
            "over_90": 47,
            "60_90": 32,
            "30_60": 58
        }
    })
}
