use crate::cmd::{embedder_from_config, resolve_text};
use crate::loader::read_text;
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use clap::{ArgGroup, Args};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use vitae_search::{RelevanceScorer, ScoreMapping, VitaeConfig};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("job_source").required(true).args(["job", "job_file"])))]
pub struct ScoreArgs {
    /// Resume file to score.
    pub resume: PathBuf,

    /// Job description text.
    #[arg(long)]
    pub job: Option<String>,

    /// Read the job description from a file.
    #[arg(long, value_name = "PATH")]
    pub job_file: Option<PathBuf>,

    /// Map the score into [0, 100] instead of the raw cosine * 100.
    #[arg(long)]
    pub shifted: bool,
}

#[derive(Debug, Serialize)]
pub struct ScoreOutput {
    pub resume: PathBuf,
    pub relevance: f64,
    pub mapping: ScoreMapping,
    pub embedder: String,
}

/// Execute `vitae score`.
///
/// # Errors
///
/// Returns an error if either text cannot be read, the embedder cannot be
/// created, or embedding fails.
pub fn run_score(
    args: &ScoreArgs,
    config: &VitaeConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let resume = read_text(&args.resume)?;
    let job = resolve_text(args.job.as_deref(), args.job_file.as_deref())?;
    if job.is_empty() {
        render_error(
            output,
            &CliError::with_details(
                "job description must not be empty",
                "pass --job TEXT or --job-file PATH",
                "empty_query",
            ),
        )?;
        anyhow::bail!("empty job description");
    }

    let mapping = if args.shifted {
        ScoreMapping::Shifted
    } else {
        config.relevance.mapping
    };
    let embedder = embedder_from_config(config)?;
    let embedder_name = embedder.name().to_string();
    let scorer = RelevanceScorer::new(embedder, mapping);

    let relevance = match scorer.score(&resume, &job) {
        Ok(score) => score,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };

    let score_output = ScoreOutput {
        resume: args.resume.clone(),
        relevance,
        mapping,
        embedder: embedder_name,
    };
    render_mode(output, &score_output, render_score_text, render_score_human)
}

fn render_score_text(out: &ScoreOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}  match={:.2}", out.resume.display(), out.relevance)
}

fn render_score_human(out: &ScoreOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Match score: {}", out.resume.display()))?;
    pretty_kv(w, "score", format!("{:.2}", out.relevance))?;
    let mapping = match out.mapping {
        ScoreMapping::Raw => "raw (cosine x 100)",
        ScoreMapping::Shifted => "shifted (0-100)",
    };
    pretty_kv(w, "mapping", mapping)?;
    pretty_kv(w, "embedder", &out.embedder)
}
