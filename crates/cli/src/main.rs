mod attachment;
mod config;
mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use registry::ProviderId;
use runtime::{Client, DEFAULT_TIMEOUT, Invocation, InvocationRequest, ModelConfig};
use storage::{Ledger, UsageRecord};
use tracing::warn;

use config::{Config, ConfigError, select};
use error::{Error, Result};

const CONFIG_FILE: &str = "switchboard.toml";

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(about = "Call any configured LLM provider through one interface", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a prompt to one model
    Ask {
        /// Model id from the config (defaults to the default model)
        #[arg(short, long)]
        model: Option<String>,
        /// System prompt for this call
        #[arg(short, long)]
        system: Option<String>,
        /// Attach a file; repeatable
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
        /// Timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
        prompt: String,
    },
    /// Send one prompt to several models at once
    Arena {
        /// Comma-separated model ids (defaults to all)
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,
        prompt: String,
    },
    /// Check that configured credentials work
    Validate {
        /// Model id (defaults to all)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// List supported providers
    Providers,
    /// Show the built-in price table
    Pricing {
        /// Only show models from this provider
        #[arg(short, long)]
        provider: Option<String>,
    },
    /// Show recorded usage and cost
    Costs {
        /// Show only the last N calls
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            model,
            system,
            files,
            timeout,
            prompt,
        } => {
            let config = load_config(&cli.config)?;
            let ask = Ask {
                model,
                system,
                files,
                timeout: timeout.map(Duration::from_secs),
                prompt,
            };
            cmd_ask(&config, ask).await
        }
        Commands::Arena { models, prompt } => {
            cmd_arena(&load_config(&cli.config)?, &models, &prompt).await
        }
        Commands::Validate { model } => {
            cmd_validate(&load_config(&cli.config)?, model.as_deref()).await
        }
        Commands::Providers => {
            cmd_providers();
            Ok(())
        }
        Commands::Pricing { provider } => cmd_pricing(provider.as_deref()),
        Commands::Costs { limit } => cmd_costs(&load_config_or_default(&cli.config)?, limit),
    }
}

struct Ask {
    model: Option<String>,
    system: Option<String>,
    files: Vec<PathBuf>,
    timeout: Option<Duration>,
    prompt: String,
}

async fn cmd_ask(config: &Config, ask: Ask) -> Result<()> {
    let models = config.models()?;
    let model = select(&models, ask.model.as_deref())?;

    let mut request = InvocationRequest::new(model.clone(), ask.prompt);
    if let Some(system) = ask.system {
        request = request.system(system);
    }
    for path in &ask.files {
        request = request.attach(attachment::load(path)?);
    }

    let timeout = ask
        .timeout
        .or(config.timeout())
        .unwrap_or(DEFAULT_TIMEOUT);
    let ledger = open_ledger(config)?;
    let result = client(config)?.invoke_with_timeout(&request, timeout).await;
    record(&ledger, model, &result);

    let invocation = result?;
    println!("{}\n", invocation.text);
    println!("{}", usage_line(&invocation));
    Ok(())
}

async fn cmd_arena(config: &Config, ids: &[String], prompt: &str) -> Result<()> {
    let models = config.models()?;
    let selected: Vec<ModelConfig> = if ids.is_empty() {
        models
    } else {
        ids.iter()
            .map(|id| select(&models, Some(id.as_str())).cloned())
            .collect::<std::result::Result<_, _>>()?
    };
    if selected.is_empty() {
        return Err(ConfigError::NoModels.into());
    }

    let ledger = open_ledger(config)?;
    let results = client(config)?.arena(&selected, prompt).await;

    for (model, (_, result)) in selected.iter().zip(&results) {
        record(&ledger, model, result);
        println!("=== {} ({}/{}) ===", model.name, model.provider, model.model_id);
        match result {
            Ok(invocation) => {
                println!("{}\n", invocation.text);
                println!("{}\n", usage_line(invocation));
            }
            Err(e) => println!("error: {e}\n"),
        }
    }
    Ok(())
}

async fn cmd_validate(config: &Config, id: Option<&str>) -> Result<()> {
    let models = config.models()?;
    let selected: Vec<&ModelConfig> = match id {
        Some(_) => vec![select(&models, id)?],
        None => models.iter().collect(),
    };
    if selected.is_empty() {
        return Err(ConfigError::NoModels.into());
    }

    let client = client(config)?;
    for model in selected {
        let validation = client.validate(model).await;
        match validation.error {
            None => println!("{:<20}  ok", model.id),
            Some(e) => println!("{:<20}  FAILED  {e}", model.id),
        }
    }
    Ok(())
}

fn cmd_providers() {
    println!("{:<11}  {:<22}  {:<30}  KEYS", "ID", "NAME", "DEFAULT MODEL");
    println!("{}", "-".repeat(100));

    for provider in registry::providers() {
        let marker = if provider.requires_endpoint { " (endpoint required)" } else { "" };
        println!(
            "{:<11}  {:<22}  {:<30}  {}{marker}",
            provider.id, provider.display_name, provider.default_model, provider.key_url
        );
    }
}

fn cmd_pricing(provider: Option<&str>) -> Result<()> {
    let entries: Vec<_> = match provider {
        Some(p) => registry::pricing_for_provider(p.parse::<ProviderId>()?).collect(),
        None => registry::pricing().iter().collect(),
    };

    println!(
        "{:<36}  {:<10}  {:>9}  {:>9}  {:>9}",
        "MODEL", "PROVIDER", "IN $/M", "OUT $/M", "CONTEXT"
    );
    println!("{}", "-".repeat(83));

    for entry in entries {
        let free = if entry.free_tier { "  free tier" } else { "" };
        println!(
            "{:<36}  {:<10}  {:>9.2}  {:>9.2}  {:>9}{free}",
            entry.model_id,
            entry.provider,
            entry.input_per_million,
            entry.output_per_million,
            entry.context_window
        );
    }
    Ok(())
}

fn cmd_costs(config: &Config, limit: usize) -> Result<()> {
    let path = ledger_path(config);
    if !path.exists() {
        return Err(Error::LedgerNotFound { path });
    }
    let ledger = Ledger::open(&path)?;

    let totals = ledger.totals()?;
    if totals.is_empty() {
        println!("No calls recorded.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<10}  {:>6}  {:>6}  {:>10}  {:>10}  {:>10}",
        "MODEL", "PROVIDER", "CALLS", "FAILED", "SENT", "RECEIVED", "COST"
    );
    println!("{}", "-".repeat(100));
    for s in &totals {
        println!(
            "{:<36}  {:<10}  {:>6}  {:>6}  {:>10}  {:>10}  {:>10.6}",
            s.model, s.provider, s.calls, s.failures, s.outgoing_tokens, s.incoming_tokens, s.cost
        );
    }
    let total: f64 = totals.iter().map(|s| s.cost).sum();
    println!("\nTotal: ${total:.6}\n");

    println!("Last {limit} calls:");
    for r in ledger.recent(limit)? {
        let time = Local
            .from_utc_datetime(&r.timestamp.naive_utc())
            .format("%Y-%m-%d %H:%M:%S");
        match &r.error {
            None => println!(
                "[{time}] {}  {} sent / {} received{}  ${:.6}",
                r.config_id,
                r.outgoing_tokens,
                r.incoming_tokens,
                if r.estimated { " (est.)" } else { "" },
                r.cost
            ),
            Some(e) => println!("[{time}] {}  error: {e}", r.config_id),
        }
    }
    Ok(())
}

/// Record an outcome. Ledger failures never fail the call itself.
fn record(ledger: &Ledger, model: &ModelConfig, result: &runtime::Result<Invocation>) {
    let entry = match result {
        Ok(invocation) => UsageRecord::success(&model.id, invocation),
        Err(e) => UsageRecord::failure(&model.id, model.provider, &model.model_id, e),
    };
    if let Err(e) = ledger.append(&entry) {
        warn!(model = %model.id, error = %e, "failed to record usage");
    }
}

fn usage_line(invocation: &Invocation) -> String {
    let usage = &invocation.usage;
    format!(
        "[{}] {} sent / {} received ({} total) tokens{} · ${:.6} · {:.1}s",
        invocation.model_id,
        usage.outgoing_tokens,
        usage.incoming_tokens,
        usage.total_tokens(),
        if usage.estimated { " (estimated)" } else { "" },
        invocation.cost,
        invocation.elapsed.as_secs_f64()
    )
}

fn client(config: &Config) -> Result<Client> {
    let mut builder = Client::builder().timeout(config.timeout().unwrap_or(DEFAULT_TIMEOUT));
    if let Some(gateway) = &config.gateway {
        builder = builder.gateway(gateway);
    }
    Ok(builder.build()?)
}

fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(Config::load(path)?)
}

/// `costs` works without a config file, reading the default ledger.
fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else {
        Ok(Config::default())
    }
}

fn open_ledger(config: &Config) -> Result<Ledger> {
    let path = ledger_path(config);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Ledger::open(&path)?)
}

fn ledger_path(config: &Config) -> PathBuf {
    config.ledger.clone().unwrap_or_else(|| {
        dirs_data_dir()
            .unwrap_or_else(|| ".switchboard".into())
            .join("usage.db")
    })
}

fn dirs_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share/switchboard"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
            .map(|p| p.join("switchboard"))
    }
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|h| PathBuf::from(h).join("switchboard"))
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}
