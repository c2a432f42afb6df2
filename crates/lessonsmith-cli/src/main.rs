mod config;
mod extract_cmd;
mod generate_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lessonsmith_core::config::GenerationConfig;

use config::LessonsmithConfig;
use generate_cmd::GenerateArgs;

#[derive(Parser)]
#[command(name = "lessonsmith", about = "Generate lesson plans with a pipeline of LLM agents")]
struct Cli {
    /// Model identifier (overrides LESSONSMITH_MODEL env var)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Backend base URL (overrides LESSONSMITH_API_BASE env var)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a lessonsmith config file
    Init {
        /// Store this API key in the config file
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate a lesson plan
    Generate(GenerateArgs),
    /// Extract text from a reference document
    Extract {
        /// Document to read
        path: PathBuf,
    },
}

/// Execute the `lessonsmith init` command: write a config file.
fn cmd_init(
    model: Option<&str>,
    api_base: Option<&str>,
    api_key: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let model = model.unwrap_or(GenerationConfig::DEFAULT_MODEL);
    let api_base = api_base.unwrap_or(GenerationConfig::DEFAULT_API_BASE);
    let has_key = api_key.is_some();

    let cfg = config::ConfigFile {
        generation: config::GenerationSection {
            model: model.to_string(),
            api_base: api_base.to_string(),
        },
        auth: config::AuthSection { api_key },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  generation.model = {model}");
    println!("  generation.api_base = {api_base}");
    if has_key {
        println!("  auth.api_key = <set>");
    } else {
        println!();
        println!(
            "Next: export {} or rerun with --api-key.",
            GenerationConfig::API_KEY_ENV
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { api_key, force } => {
            cmd_init(cli.model.as_deref(), cli.api_base.as_deref(), api_key, force)?;
        }
        Commands::Generate(args) => {
            let resolved = LessonsmithConfig::resolve(cli.model.as_deref(), cli.api_base.as_deref());
            generate_cmd::run_generate(args, resolved).await?;
        }
        Commands::Extract { path } => {
            extract_cmd::run_extract(&path).await?;
        }
    }

    Ok(())
}
