pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, client, stdio, tooling};
pub use cli::{Cli, RunMode};
pub use config::AppConfig;
pub use domain::types;
pub use infrastructure::{model, server};

use agent::{AnswerRequest, Orchestrator};
use application::tooling::ToolTransport;
use infrastructure::model::ProviderFactory;
use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    init_tracing(cli.mode == RunMode::Stdio);
    info!("Starting bizops-agent");
    debug!(
        mode = ?cli.mode,
        config = ?cli.config,
        tenant = ?cli.tenant,
        "CLI arguments parsed"
    );

    let mut config = AppConfig::load(cli.config.as_deref())?;
    apply_cli_overrides(&cli, &mut config);

    let transport_config = config.require_transport()?;
    info!(transport = transport_config.name(), "Preparing tool transport");
    let transport = tooling::build_transport(transport_config)?;
    let provider = ProviderFactory::create(&config.provider);
    let orchestrator = Arc::new(Orchestrator::from_config(
        &config,
        provider,
        Arc::clone(&transport),
    ));

    info!(mode = ?cli.mode, "Running agent in selected mode");
    let outcome = run_mode(&cli, orchestrator).await;
    transport.shutdown().await;
    info!("Agent execution finished");
    outcome
}

async fn run_mode(cli: &Cli, orchestrator: Arc<Orchestrator>) -> Result<(), Box<dyn Error>> {
    match cli.mode {
        RunMode::Cli => {
            let Some(tenant) = cli.tenant.clone() else {
                return Err("--tenant is required in cli mode".into());
            };
            let utterance = load_utterance(cli)?;
            let mut request = AnswerRequest::new(tenant, utterance);
            request.conversation_id = cli.conversation.clone();
            match orchestrator.answer_with(request).await {
                Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
                Err(err) => {
                    eprintln!("{}", err.user_message());
                    return Err(err.into());
                }
            }
        }
        RunMode::Stdio => {
            stdio::run(orchestrator, cli.tenant.clone()).await?;
        }
        RunMode::Rest => {
            info!(addr = %cli.rest_addr, "Starting REST server");
            server::serve(orchestrator, cli.tenant.clone(), cli.rest_addr).await?;
        }
    }
    Ok(())
}

fn init_tracing(quiet: bool) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = if quiet {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };
        fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}

fn apply_cli_overrides(cli: &Cli, config: &mut AppConfig) {
    if let Some(max_rounds) = cli.max_rounds.filter(|n| *n > 0) {
        info!(max_rounds, "Overriding max_rounds from CLI flag");
        config.policy.max_rounds = max_rounds;
    }
    if let Some(system) = cli.system.clone() {
        config.system_prompt = Some(system);
    }
}

fn load_utterance(cli: &Cli) -> Result<String, Box<dyn Error>> {
    if let Some(path) = &cli.prompt_file {
        info!(path = %path.display(), "Loading question from file");
        return Ok(fs::read_to_string(path)?.trim().to_string());
    }

    if !cli.utterance.is_empty() {
        return Ok(cli.utterance.join(" ").trim().to_string());
    }

    if !io::stdin().is_terminal() {
        info!("Reading question from standard input");
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer.trim().to_string());
    }

    warn!("Question not provided via arguments, file, or stdin");
    Err("question required via arguments, --prompt-file, or stdin".into())
}
