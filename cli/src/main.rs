mod commands;
mod config;
mod controller;
mod gemini;
mod repl;
mod util;

use clap::Parser;
use fluency_core::error::codes;
use fluency_core::session::Session;

use config::{ConfigError, DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, TutorConfig};
use controller::Controller;
use gemini::{GeminiClient, TutorError};
use util::{exit_error, exit_report};

#[derive(Parser)]
#[command(name = "fluency", version, about = "Practice English by roleplaying everyday scenarios with an AI tutor")]
struct Cli {
    /// API key for the generative-language endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "FLUENCY_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Model used for replies, reports and explanations
    #[arg(long, env = "FLUENCY_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Scenario to start in (see /scenarios)
    #[arg(long, env = "FLUENCY_SCENARIO", default_value = "coffee_shop")]
    scenario: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "FLUENCY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Disable simulated voice dictation (/voice)
    #[arg(long, env = "FLUENCY_NO_VOICE")]
    no_voice: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    util::init_tracing(cli.log_json);

    let config = match TutorConfig::new(
        &cli.api_url,
        &cli.model,
        cli.api_key.as_deref(),
        cli.timeout_secs,
        &cli.scenario,
    ) {
        Ok(config) => config,
        Err(ConfigError::Scenario(err)) => exit_report(&err.report()),
        Err(err) => exit_error(codes::CONFIG_INVALID, &err.to_string(), err.docs_hint()),
    };
    tracing::info!(?config, "starting tutor session");

    let client = match GeminiClient::new(&config) {
        Ok(client) => client,
        Err(err @ TutorError::Endpoint(_)) => {
            exit_error(codes::CONFIG_INVALID, &err.to_string(), None)
        }
        Err(err) => exit_error(
            codes::CONNECTION_ERROR,
            &err.to_string(),
            Some("Check network access and TLS setup"),
        ),
    };

    let session = Session::new(config.scenario, !cli.no_voice);
    let code = repl::run(Controller::new(session, client)).await;
    std::process::exit(code);
}
