#![forbid(unsafe_code)]

mod cmd;
mod loader;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "vitae: hybrid resume retrieval and match scoring",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: ./vitae.toml if present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Retrieval",
        about = "Rank resumes against a job description",
        long_about = "Rank every resume in a directory against a job description using hybrid \
                      retrieval (BM25 and dense embeddings, fused linearly), then re-rank the \
                      hits by match score.",
        after_help = "EXAMPLES:\n    # Top 5 resumes in ./resumes for an inline job description\n    vitae rank \"senior rust engineer\" --dir resumes\n\n    # Job description from a file, lexical signal only\n    vitae rank --job-file job.txt --dir resumes --lexical\n\n    # Weight the dense signal more heavily\n    vitae rank \"data scientist\" --alpha 0.8 -n 10\n\n    # Emit machine-readable output\n    vitae rank \"devops\" --format json"
    )]
    Rank(cmd::rank::RankArgs),

    #[command(
        next_help_heading = "Retrieval",
        about = "Score one resume against a job description",
        long_about = "Compute the match score of a single resume: cosine similarity between the \
                      resume and job-description embeddings, scaled to a percentage.",
        after_help = "EXAMPLES:\n    # Score a resume against an inline job description\n    vitae score resumes/alice.txt --job \"rust systems engineer\"\n\n    # Job description from a file, mapped into [0, 100]\n    vitae score alice.txt --job-file job.txt --shifted"
    )]
    Score(cmd::score::ScoreArgs),

    #[command(
        next_help_heading = "Diagnostics",
        about = "Build the index over a resume directory and report its shape",
        long_about = "Load and index every resume in a directory without querying it. Reports \
                      document counts, vocabulary size, embedder details, the effective \
                      configuration, and any files or documents that were excluded.",
        after_help = "EXAMPLES:\n    # Check what would be indexed in ./resumes\n    vitae inspect --dir resumes\n\n    # Effective configuration as JSON\n    vitae inspect --format json"
    )]
    Inspect(cmd::inspect::InspectArgs),

    #[command(
        next_help_heading = "Diagnostics",
        about = "Generate shell completions",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate zsh completions\n    vitae completions zsh > ~/.zfunc/_vitae\n\n    # Generate bash completions\n    vitae completions bash > /etc/bash_completion.d/vitae"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("VITAE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "vitae=debug,vitae_search=debug,info"
        } else {
            "vitae=info,vitae_search=info,warn"
        })
    });

    let format = env::var("VITAE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let output = cli.output_mode();
    let cwd = env::current_dir()?;

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let config = match vitae_search::load_config(cli.config.as_deref(), &cwd) {
        Ok(config) => config,
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("{err:#}"),
                    "check the config file path and its TOML syntax",
                    "E1002",
                ),
            )?;
            return Err(err);
        }
    };
    debug!(?config, "effective configuration");

    match &cli.command {
        Commands::Rank(args) => cmd::rank::run_rank(args, &config, output),
        Commands::Score(args) => cmd::score::run_score(args, &config, output),
        Commands::Inspect(args) => cmd::inspect::run_inspect(args, &config, output),
        Commands::Completions(_) => Ok(()),
    }
}
