// Mounted Secrets - inspect an orchestrator-mounted secrets directory
//
// This is the main entry point for the application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mounted_secrets::config::Config;
use mounted_secrets::{Resolver, SecretStore};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const REDACTED: &str = "********";

/// Mounted Secrets - read secrets from an orchestrator-mounted directory
#[derive(Parser, Debug)]
#[command(name = "mounted-secrets")]
#[command(version)]
#[command(about = "Inspect and resolve secrets mounted into a directory", long_about = None)]
struct Cli {
    /// Secrets directory (overrides the config file and $MOUNTED_SECRETS_DIR)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Path to an optional YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the secrets directory is present and readable
    Doctor,

    /// List mounted secrets
    List {
        /// Print as a JSON object
        #[arg(long, default_value = "false")]
        json: bool,

        /// Print secret values instead of redacting them
        #[arg(long, default_value = "false")]
        show_values: bool,
    },

    /// Print the value of a single secret
    Get {
        /// Secret name (file name inside the secrets directory)
        name: String,
    },

    /// Tell whether an environment variable points into the secrets directory
    IsSecret {
        /// Environment variable name
        var: String,
    },

    /// Print the effective value of an environment variable
    Resolve {
        /// Environment variable name
        var: String,
    },
}

fn secrets_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.dir {
        return Ok(dir.clone());
    }

    let config = Config::load(cli.config.as_deref())?;
    config
        .validate()
        .with_context(|| "Configuration validation failed")?;
    config.secrets_dir_path()
}

fn open_store(cli: &Cli) -> Result<SecretStore> {
    let dir = secrets_dir(cli)?;
    SecretStore::scan(&dir)
        .with_context(|| format!("Failed to load secrets from: {}", dir.display()))
}

fn run_doctor(cli: &Cli) -> Result<()> {
    println!("🔍 Mounted Secrets Doctor");

    let dir = secrets_dir(cli)?;
    println!("Secrets directory: {}\n", dir.display());

    print!("1. Checking if the secrets directory exists... ");
    if !dir.is_dir() {
        println!("✗");
        println!("   ❌ {} is not a directory", dir.display());
        println!("   💡 Mount secrets there or pass --dir / set $MOUNTED_SECRETS_DIR");
        return Err(anyhow::anyhow!("Doctor checks failed"));
    }
    println!("✓");

    print!("2. Reading secrets... ");
    match SecretStore::scan(&dir) {
        Ok(store) => {
            println!("✓");
            println!("   📦 {} secret(s) loaded", store.len());
        }
        Err(e) => {
            println!("✗");
            println!("   ❌ {:#}", anyhow::Error::from(e));
            return Err(anyhow::anyhow!("Doctor checks failed"));
        }
    }

    println!("\n✅ All checks passed!");
    Ok(())
}

fn run_list(cli: &Cli, json: bool, show_values: bool) -> Result<()> {
    let store = open_store(cli)?;

    let listing: BTreeMap<&str, &str> = store
        .all()
        .iter()
        .map(|(name, value)| {
            let shown = if show_values { value.as_str() } else { REDACTED };
            (name.as_str(), shown)
        })
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&listing)
            .context("Failed to serialize secrets listing")?;
        println!("{}", out);
    } else if show_values {
        for (name, value) in &listing {
            println!("{}={}", name, value);
        }
    } else {
        for name in listing.keys() {
            println!("{}", name);
        }
    }

    Ok(())
}

fn run_get(cli: &Cli, name: &str) -> Result<()> {
    let store = open_store(cli)?;
    let value = store
        .require(name)
        .with_context(|| format!("Looked in: {}", store.dir().display()))?;
    println!("{}", value);
    Ok(())
}

fn run_is_secret(cli: &Cli, var: &str) -> Result<()> {
    let store = open_store(cli)?;
    println!("{}", store.is_secret(var)?);
    Ok(())
}

fn run_resolve(cli: &Cli, var: &str) -> Result<()> {
    let store = open_store(cli)?;
    let value = Resolver::new(&store)
        .resolve(var)?
        .ok_or_else(|| anyhow::anyhow!("Environment variable '{}' is not set", var))?;
    println!("{}", value);
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Doctor => run_doctor(&cli),
        Commands::List { json, show_values } => run_list(&cli, *json, *show_values),
        Commands::Get { name } => run_get(&cli, name),
        Commands::IsSecret { var } => run_is_secret(&cli, var),
        Commands::Resolve { var } => run_resolve(&cli, var),
    };

    if let Err(e) = result {
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }
}
