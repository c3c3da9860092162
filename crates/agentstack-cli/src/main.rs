use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "agentstack",
    about = "Compile CI agent fleet configuration into a topology descriptor",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve configuration and print the topology descriptor as JSON.
    ///
    /// Configuration is read from --config, else from the file named by
    /// SEMAPHORE_AGENT_STACK_CONFIG, else from the environment.
    Synth {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Resolve configuration and report whether it is valid
    Validate {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agentstack=info".parse()?)
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth { config, compact } => commands::synth::synth(config, compact),
        Commands::Validate { config } => commands::validate::validate(config),
    }
}
