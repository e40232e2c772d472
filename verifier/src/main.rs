//! Blueprint Verification Runner
//!
//! Post-provisioning verification for the deployed vision annotation
//! blueprint:
//! - Looks up deployment outputs from the terraform state
//! - Describes cloud resources and asserts on their wiring
//! - Polls the deployed annotate endpoint until it serves, then checks
//!   its normal and error responses

use clap::Parser;
use std::time::Duration;
use tokio::time::timeout;

use verifier::{BlueprintConfig, PollBudget, Scenarios};

#[derive(Parser)]
#[command(name = "verifier")]
#[command(about = "Integration verification for the deployed vision annotation blueprint")]
struct Args {
    /// Verification scenario to run
    #[arg(long, default_value = "all")]
    scenario: String,

    /// Directory holding the provisioned blueprint's terraform state
    #[arg(long, default_value = ".")]
    terraform_dir: String,

    /// Project id override (defaults to the `project_id` deployment output)
    #[arg(long)]
    project: Option<String>,

    /// Annotate endpoint override (defaults to the `vision_prediction_url` output)
    #[arg(long)]
    annotate_url: Option<String>,

    /// Maximum serving-poll attempts
    #[arg(long, default_value = "20")]
    poll_attempts: u32,

    /// Seconds between serving-poll attempts
    #[arg(long, default_value = "3")]
    poll_interval_secs: u64,

    /// Overall timeout in seconds
    #[arg(long, default_value = "900")]
    timeout_secs: u64,

    /// Enable verbose tracing output
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing for the verifier itself
    init_verifier_tracing(args.verbose);

    tracing::info!("🧪 Starting blueprint verification");
    tracing::info!("Scenario: {}, Timeout: {}s", args.scenario, args.timeout_secs);

    let config = BlueprintConfig::builder()
        .terraform_dir(&args.terraform_dir)
        .project::<String>(args.project.clone())
        .annotate_url::<String>(args.annotate_url.clone())
        .poll(PollBudget::new(
            args.poll_attempts,
            Duration::from_secs(args.poll_interval_secs),
        ))
        .build();

    let scenarios = Scenarios::new(config);

    let result = timeout(
        Duration::from_secs(args.timeout_secs),
        scenarios.run_scenario(&args.scenario),
    )
    .await;

    match result {
        Ok(Ok(())) => {
            tracing::info!("✅ Scenario '{}' completed successfully", args.scenario);
        }
        Ok(Err(e)) => {
            tracing::error!("❌ Scenario '{}' failed: {}", args.scenario, e);
            return Err(e);
        }
        Err(_) => {
            tracing::error!(
                "⏰ Scenario '{}' timed out after {}s",
                args.scenario,
                args.timeout_secs
            );
            return Err("Verification timeout".into());
        }
    }

    tracing::info!("🏁 Blueprint verification completed");
    Ok(())
}

fn init_verifier_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if verbose {
        EnvFilter::new("verifier=debug,info")
    } else {
        EnvFilter::new("verifier=info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
