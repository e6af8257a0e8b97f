use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use insightmill::gemini::GeminiClient;
use insightmill::pipeline::prompt::DEFAULT_EXTRACTION_TEMPLATE;
use insightmill::{CancelToken, Orchestrator, PipelineError, PipelineSettings, Review};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("INSIGHTMILL_LOG")
                .unwrap_or_else(|_| EnvFilter::new(insightmill::default_log_filter())),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), PipelineError> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| PipelineError::Config("usage: insightmill <reviews.json>".into()))?;

    let api_key = std::env::var("GEMINI_API_KEY")
        .map_err(|_| PipelineError::Config("GEMINI_API_KEY is not set".into()))?;

    let raw = std::fs::read_to_string(&path)?;
    let reviews: Vec<Review> = serde_json::from_str(&raw)
        .map_err(|e| PipelineError::ReviewInput(format!("{path}: {e}")))?;

    // Blank reviews carry nothing extractable and would only pad the prompts
    let reviews: Vec<Review> = reviews
        .into_iter()
        .filter(|r| !r.content.trim().is_empty())
        .collect();

    if reviews.is_empty() {
        return Err(PipelineError::ReviewInput(format!(
            "{path}: no reviews with content"
        )));
    }

    let client = GeminiClient::with_api_key(api_key);
    let orchestrator = Orchestrator::new(&client, PipelineSettings::default());

    let progress = |update: insightmill::ProcessingUpdate| {
        tracing::info!(
            batch = update.current_batch,
            total = update.total_batches,
            status = %update.status,
            tokens = ?update.tokens_used,
            "progress"
        );
    };

    let report = orchestrator.run(
        &reviews,
        DEFAULT_EXTRACTION_TEMPLATE,
        Some(&progress),
        &CancelToken::new(),
    )?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
