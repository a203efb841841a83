//! `vitae rank` — rank a directory of resumes against a job description.
//!
//! Builds the hybrid index over the directory, retrieves with linear fusion
//! of BM25 and embedding scores, then (unless `--no-rerank`) re-sorts the
//! hits by their cosine match score.

use crate::cmd::{build_index, preview, resolve_text};
use crate::loader::SkippedFile;
use crate::output::{
    CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_error, render_mode,
};
use clap::{ArgGroup, Args};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use vitae_search::{
    BuildWarning, FusedResult, RelevanceScorer, ScoreMapping, SearchMode, VitaeConfig,
};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("job_source").required(true).args(["query", "job_file"])))]
pub struct RankArgs {
    /// Job description text.
    pub query: Option<String>,

    /// Read the job description from a file.
    #[arg(long, value_name = "PATH")]
    pub job_file: Option<PathBuf>,

    /// Directory of `.txt` / `.md` resumes.
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Maximum number of resumes to return.
    #[arg(short = 'n', long, default_value = "5")]
    pub top_k: usize,

    /// Dense weight in [0, 1]; lexical gets 1 - alpha. Defaults to config.
    #[arg(long, conflicts_with_all = ["lexical", "dense"])]
    pub alpha: Option<f32>,

    /// Use only the BM25 lexical signal.
    #[arg(long, conflicts_with = "dense")]
    pub lexical: bool,

    /// Use only the embedding signal.
    #[arg(long)]
    pub dense: bool,

    /// Keep fusion order instead of re-ranking by match score.
    #[arg(long)]
    pub no_rerank: bool,

    /// Map match scores into [0, 100] instead of the raw cosine * 100.
    #[arg(long)]
    pub shifted: bool,
}

impl RankArgs {
    const fn mode(&self) -> SearchMode {
        if self.lexical {
            SearchMode::Lexical
        } else if self.dense {
            SearchMode::Dense
        } else {
            SearchMode::Hybrid
        }
    }
}

/// One ranked resume.
#[derive(Debug, Serialize)]
pub struct RankRow {
    pub rank: usize,
    pub identity: String,
    pub score: f32,
    pub lexical_score: f32,
    pub dense_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

/// JSON envelope for rank output.
#[derive(Debug, Serialize)]
pub struct RankOutput {
    pub query: String,
    pub mode: String,
    pub alpha: f32,
    pub count: usize,
    pub results: Vec<RankRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<BuildWarning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedFile>,
}

fn row(rank: usize, fused: FusedResult, relevance: Option<f64>) -> RankRow {
    RankRow {
        rank,
        identity: fused.identity,
        score: fused.score,
        lexical_score: fused.lexical_score,
        dense_score: fused.dense_score,
        relevance,
    }
}

/// Execute `vitae rank`.
///
/// # Errors
///
/// Returns an error if the job description is empty, the resume directory
/// cannot be read, retrieval fails, or output rendering fails.
pub fn run_rank(args: &RankArgs, config: &VitaeConfig, output: OutputMode) -> anyhow::Result<()> {
    let query = resolve_text(args.query.as_deref(), args.job_file.as_deref())?;
    if query.is_empty() {
        render_error(
            output,
            &CliError::with_details(
                "job description must not be empty",
                "pass the job description as an argument or with --job-file",
                "empty_query",
            ),
        )?;
        anyhow::bail!("empty job description");
    }

    let built = build_index(&args.dir, config)?;
    let mode = args.mode();
    let alpha = args.alpha.unwrap_or_else(|| mode.alpha(config.hybrid.alpha));

    let fused = match built.index.retrieve(&query, args.top_k, alpha) {
        Ok(fused) => fused,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };

    let results: Vec<RankRow> = if args.no_rerank {
        fused
            .into_iter()
            .enumerate()
            .map(|(i, hit)| row(i + 1, hit, None))
            .collect()
    } else {
        let mapping = if args.shifted {
            ScoreMapping::Shifted
        } else {
            config.relevance.mapping
        };
        let scorer = RelevanceScorer::new(Arc::clone(built.index.embedder()), mapping);
        match scorer.rank(fused, &query) {
            Ok(ranked) => ranked
                .into_iter()
                .enumerate()
                .map(|(i, hit)| row(i + 1, hit.fused, Some(hit.relevance)))
                .collect(),
            Err(err) => {
                render_error(output, &CliError::from(&err))?;
                return Err(err.into());
            }
        }
    };

    let rank_output = RankOutput {
        query,
        mode: mode.to_string(),
        alpha,
        count: results.len(),
        results,
        warnings: built.warnings,
        skipped: built.skipped,
    };

    render_mode(
        output,
        &rank_output,
        render_rank_text,
        render_rank_human,
    )
}

fn render_rank_human(out: &RankOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if out.results.is_empty() {
        writeln!(w, "No resumes matched '{}'", preview(&out.query, 60))?;
        writeln!(w, "Check --dir points at .txt/.md resumes, or try broader terms")?;
    } else {
        pretty_section(
            w,
            &format!(
                "{} resume(s) for '{}' ({}, alpha {:.2})",
                out.count,
                preview(&out.query, 40),
                out.mode,
                out.alpha
            ),
        )?;
        writeln!(
            w,
            "{:>4}  {:<28}  {:>8}  {:>8}  {:>8}  {:>7}",
            "RANK", "RESUME", "FUSED", "LEXICAL", "DENSE", "MATCH"
        )?;
        pretty_rule(w)?;
        for r in &out.results {
            let relevance = r
                .relevance
                .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
            writeln!(
                w,
                "{:>4}  {:<28}  {:>8.3}  {:>8.3}  {:>8.3}  {:>7}",
                r.rank,
                preview(&r.identity, 28),
                r.score,
                r.lexical_score,
                r.dense_score,
                relevance
            )?;
        }
    }

    if !out.warnings.is_empty() || !out.skipped.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Warnings")?;
        for warning in &out.warnings {
            writeln!(w, "  {warning}")?;
        }
        for skipped in &out.skipped {
            pretty_kv(w, "  skipped", format!("{} ({})", skipped.path.display(), skipped.reason))?;
        }
    }
    Ok(())
}

fn render_rank_text(out: &RankOutput, w: &mut dyn Write) -> std::io::Result<()> {
    if out.results.is_empty() {
        writeln!(w, "advice  no-results  query={}", preview(&out.query, 60))?;
        return Ok(());
    }

    for r in &out.results {
        write!(
            w,
            "{}  {}  score={:.3}  lexical={:.3}  dense={:.3}",
            r.rank, r.identity, r.score, r.lexical_score, r.dense_score
        )?;
        match r.relevance {
            Some(v) => writeln!(w, "  match={v:.2}")?,
            None => writeln!(w)?,
        }
    }
    for warning in &out.warnings {
        writeln!(w, "warning  {warning}")?;
    }
    Ok(())
}
