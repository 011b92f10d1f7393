//! Research demo: plan, execute and synthesize one question, printing progress events.
//!
//! With `OPENROUTER_API_KEY` set (environment, `.env` or `~/.config/deepresearch/config.toml`)
//! the planner and synthesizer call the configured models; otherwise both are mocked.
//! The reasoning agent is always the scripted stand-in.
//!
//! ```bash
//! cargo run -p deepresearch-examples --example research_demo -- "How do Rust async runtimes differ?"
//! RUST_LOG=deepresearch=debug cargo run -p deepresearch-examples --example research_demo
//! ```

use std::sync::Arc;

use deepresearch::{
    create_runner, ExecutorConfig, LlmPlanner, LlmSynthesizer, MockLlm, ResearchConfig,
    ResearchInput, ResearchRunner, StreamEvent,
};
use deepresearch_examples::ScriptedAgent;
use tracing_subscriber::EnvFilter;

const DEFAULT_QUESTION: &str = "How do the major Rust async runtimes differ?";

fn init_tracing(config: &ResearchConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("deepresearch={}", config.log_level)));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn mock_runner(agent: Arc<ScriptedAgent>) -> Result<ResearchRunner, Box<dyn std::error::Error>> {
    let planner = MockLlm::new(
        r#"{"steps": [
            {"task": "list the major async runtimes", "deliverable": "names and maintainers"},
            {"task": "compare their scheduling models", "deliverable": "table"}
        ]}"#,
    );
    let synthesizer = MockLlm::new(
        "tokio, async-std and smol differ mainly in scheduler design and ecosystem reach.",
    );
    Ok(ResearchRunner::new(
        Arc::new(LlmPlanner::new(Arc::new(planner))),
        agent,
        Arc::new(LlmSynthesizer::new(Arc::new(synthesizer))),
        ExecutorConfig::default(),
        true,
    )?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ResearchConfig::from_env()?;
    init_tracing(&config);

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let question = if question.trim().is_empty() {
        DEFAULT_QUESTION.to_string()
    } else {
        question
    };

    let agent = Arc::new(ScriptedAgent::new());
    let runner = if config.api_key.is_some() {
        config.validate()?;
        tracing::info!(planner = %config.planner_model, "using OpenAI-compatible planner and synthesizer");
        create_runner(&config, agent)?
    } else {
        tracing::info!("OPENROUTER_API_KEY not set; using mocked planner and synthesizer");
        mock_runner(agent)?
    };

    let output = runner
        .stream_with_callback(ResearchInput::question(question), |event| {
            if let StreamEvent::Custom(value) = event {
                println!("[event] {}", value);
            }
        })
        .await?;

    println!("\nPlan:");
    for (i, step) in output.plan.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!("\nTask results:");
    for r in &output.task_results {
        println!(
            "  step {} [{}] attempts={} elapsed={:.2}s",
            r.task_index + 1,
            r.status.as_str(),
            r.attempts,
            r.elapsed.as_secs_f64()
        );
    }
    println!("\nAnswer:\n{}", output.answer);
    Ok(())
}
