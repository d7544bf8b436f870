//! Subcommand handlers for the Abaco CLI.

use abaco_core::config::AppConfig;
use abaco_core::engine::AnalyticsEngine;
use abaco_core::orchestrator::{AgentOrchestrator, AgentTriggerType};
use abaco_core::pipeline::PipelineCoordinator;
use abaco_core::types::RecordSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Trigger a persona agent group.
///
/// An unknown trigger selector is an argument error and exits non-zero;
/// individual agent failures are summarized on stdout and do not affect the
/// exit code.
pub async fn handle_trigger(
    config: &AppConfig,
    trigger: &str,
    output_dir: Option<PathBuf>,
    save_results: bool,
) -> anyhow::Result<()> {
    let trigger_type: AgentTriggerType = trigger.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let engine = Arc::new(AnalyticsEngine::from_config(config));
    if !engine.has_backend() {
        println!("No backend credential configured; agent responses will be placeholders.");
    }

    let output_dir = output_dir.unwrap_or_else(|| config.output.dir.clone());
    let orchestrator = AgentOrchestrator::new(engine, output_dir);

    let result = orchestrator.trigger_agents(trigger_type, None).await;

    if save_results {
        let path = orchestrator.save_results(&result)?;
        println!("Results saved to: {}", path.display());
    }

    println!("{}", "=".repeat(60));
    println!("Orchestration complete: {}", result.run_id);
    println!("Status: {}", result.status);
    println!("Agents executed: {}", result.agents_executed);
    println!("Agents failed: {}", result.agents_failed);
    println!("Total duration: {}ms", result.total_duration_ms);
    println!("{}", "=".repeat(60));

    Ok(())
}

/// Run the data-quality pipeline over a JSON records file and print the
/// report. Pipeline degradation (partial or failed stages) is part of the
/// report, not an error exit.
pub fn handle_pipeline(
    config: &AppConfig,
    input: &Path,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(input)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", input.display(), e))?;
    let records: RecordSet = serde_json::from_str(&text)
        .map_err(|e| anyhow::anyhow!("{} is not a JSON array of records: {}", input.display(), e))?;

    let coordinator = PipelineCoordinator::new();
    let run = coordinator.run(records, &config.pipeline.thresholds());

    println!("{}", run.report);
    println!();
    println!("Run status: {}", run.status);
    if !run.issues.is_empty() {
        for issue in &run.issues {
            println!("Issue in {}: {}", issue.stage, issue.message);
        }
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(&dir)?;
        let report_path = dir.join("pipeline_report.md");
        std::fs::write(&report_path, &run.report)?;
        let records_path = dir.join("cleaned_records.json");
        std::fs::write(
            &records_path,
            serde_json::to_string_pretty(&run.final_records)?,
        )?;
        println!("Report saved to: {}", report_path.display());
        println!("Cleaned records saved to: {}", records_path.display());
    }

    Ok(())
}
