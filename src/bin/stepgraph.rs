use clap::{Parser, Subcommand};
use stepgraph::compiler::emit::{EmitOptions, to_json};
use stepgraph::compiler::loader::load_graph_from_yaml;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use tracing::{Level, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log builder activity at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a YAML workflow definition as a state machine JSON document
    Render {
        /// Path to the workflow YAML file
        #[arg(long, short)]
        file: PathBuf,

        /// Write the document here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Spaces per indentation level
        #[arg(long, default_value_t = 4)]
        indent: usize,

        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Load and build a definition, reporting its shape without rendering it
    Check {
        /// Path to the workflow YAML file
        #[arg(long, short)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the document, so logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render { file, out, indent, compact } => {
            info!("Loading workflow from: {:?}", file);
            let graph = load_graph_from_yaml(&file.to_string_lossy())?;

            let options = EmitOptions { indent, compact };
            let json = to_json(&graph, &options).context("Failed to render workflow")?;

            match out {
                Some(path) => {
                    fs::write(&path, json + "\n")
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} states to {}", graph.count_states(), path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Check { file } => {
            let graph = load_graph_from_yaml(&file.to_string_lossy())?;
            info!(
                "Workflow '{}' is valid: {} states, starts at {}",
                graph.name(),
                graph.count_states(),
                graph.start_at().unwrap_or("<none>")
            );
        }
    }

    Ok(())
}
