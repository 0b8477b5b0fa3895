use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing::Instrument;

use projects_automation::{
    create_delivery_span, generate_delivery_id, init_telemetry, AutomationConfig,
    OctocrabGateway, WebhookProcessor,
};

#[derive(Parser)]
#[command(name = "projects-automation")]
#[command(about = "GitHub project board automation driven by column-name conventions")]
#[command(long_about = "Processes GitHub webhook deliveries and keeps project boards in sync \
                       with issue lifecycle events. Column names declare the workflow: \"(n)\" \
                       marks where new issues start, \"(d)\" where closed issues end, \"[a, b]\" \
                       lists category labels and \"{x, y}\" workflow labels.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one webhook delivery (payload JSON from a file or stdin)
    Process {
        /// Value of the X-GitHub-Event header
        #[arg(long, help = "Event name as delivered in X-GitHub-Event")]
        event: String,
        /// Path to the payload JSON; reads stdin when omitted
        #[arg(long, help = "Payload file, defaults to stdin")]
        payload: Option<PathBuf>,
        /// Delivery id for log correlation
        #[arg(long, help = "X-GitHub-Delivery value; generated when omitted")]
        delivery: Option<String>,
    },
    /// Print the effective configuration
    CheckConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            event,
            payload,
            delivery,
        } => tokio::runtime::Runtime::new()?.block_on(process_command(event, payload, delivery)),
        Commands::CheckConfig => check_config_command(),
    }
}

async fn process_command(
    event: String,
    payload_path: Option<PathBuf>,
    delivery: Option<String>,
) -> Result<()> {
    AutomationConfig::load_env_file()?;
    let config = AutomationConfig::load()?;
    init_telemetry(&config.observability.log_level)?;

    let raw = match payload_path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read payload from {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read payload from stdin")?;
            buffer
        }
    };
    let payload: serde_json::Value =
        serde_json::from_str(&raw).context("payload is not valid JSON")?;

    let token = config
        .github
        .token
        .clone()
        .context("GitHub token is not configured (set GITHUB_TOKEN or github.token)")?;
    let gateway = OctocrabGateway::new(&token, &config.github.automation_project)?;
    let processor = WebhookProcessor::new(gateway, &config);

    let delivery_id = delivery.unwrap_or_else(generate_delivery_id);
    let span = create_delivery_span(&event, &delivery_id);
    let response = processor.process(&event, &payload).instrument(span).await;

    println!("{} {}", response.status_code, response.body);
    if response.status_code >= 500 {
        std::process::exit(1);
    }
    Ok(())
}

fn check_config_command() -> Result<()> {
    AutomationConfig::load_env_file()?;
    let config = AutomationConfig::load()?;

    println!("bot login:          {}", config.github.bot_login);
    println!("automation project: {}", config.github.automation_project);
    println!(
        "token:              {}",
        if config.github.token.is_some() {
            "configured"
        } else {
            "missing"
        }
    );
    println!("log level:          {}", config.observability.log_level);
    Ok(())
}
