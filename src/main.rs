//! docshelf CLI: scaffold, build, snapshot, and watch docs sites.

mod build;
mod init;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use docshelf_content::{Config, cut_version};

#[derive(Parser)]
#[command(
    name = "docshelf",
    version,
    about = "Versioned Markdown docs: load content, wire sidebars, emit build artifacts"
)]
struct Cli {
    /// Site config file.
    #[arg(
        long,
        global = true,
        default_value = "docshelf.toml",
        env = "DOCSHELF_CONFIG"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scaffold a new docs site.
    Init {
        /// Target directory.
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Load docs instances and write build artifacts.
    Build {
        /// Build a single instance instead of all of them.
        #[arg(long)]
        instance: Option<String>,
    },
    /// Snapshot the current docs as a new version.
    Version {
        /// Version name, e.g. 1.0.0.
        name: String,
        #[arg(long, default_value = "default")]
        instance: String,
    },
    /// Rebuild whenever docs content changes.
    Watch {
        /// Watch a single instance instead of all of them.
        #[arg(long)]
        instance: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init { dir } => init::run(&dir),
        Command::Build { instance } => {
            let config = load_config(&cli.config)?;
            build::run(&config, instance.as_deref())
        }
        Command::Version { name, instance } => {
            let config = load_config(&cli.config)?;
            let options = config
                .instance(&instance)
                .with_context(|| format!("no docs instance {instance:?} configured"))?;
            cut_version(&config.site_context(), options, &name)?;
            println!("cut version {name} for instance {instance}");
            Ok(())
        }
        Command::Watch { instance } => {
            let config = load_config(&cli.config)?;
            build::watch(&config, instance.as_deref()).await
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = Config::load(path)?;
    config.validate()?;
    Ok(config)
}
