use crate::cmd::build_index;
use crate::loader::SkippedFile;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use vitae_search::{BuildWarning, VitaeConfig};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Directory of `.txt` / `.md` resumes.
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub dir: PathBuf,
    pub documents: usize,
    /// Files skipped at load time plus documents dropped while indexing.
    pub excluded: usize,
    pub vocabulary: usize,
    pub average_doc_length: f32,
    pub embedder: String,
    pub dimension: usize,
    pub config: VitaeConfig,
    pub warnings: Vec<BuildWarning>,
    pub skipped: Vec<SkippedFile>,
}

/// Execute `vitae inspect`.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or the embedder
/// cannot be created.
pub fn run_inspect(
    args: &InspectArgs,
    config: &VitaeConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let built = build_index(&args.dir, config)?;
    let index = &built.index;

    let inspect_output = InspectOutput {
        dir: args.dir.clone(),
        documents: index.len(),
        excluded: built.warnings.len() + built.skipped.len(),
        vocabulary: index.lexical().vocabulary_size(),
        average_doc_length: index.lexical().average_doc_length(),
        embedder: index.embedder().name().to_string(),
        dimension: index.dense().dimension(),
        config: config.clone(),
        warnings: built.warnings,
        skipped: built.skipped,
    };

    render_mode(output, &inspect_output, render_inspect_text, render_inspect_human)
}

fn render_inspect_text(out: &InspectOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        w,
        "documents={}  excluded={}  vocabulary={}  avgdl={:.1}  embedder={}  dimension={}  alpha={:.2}",
        out.documents,
        out.excluded,
        out.vocabulary,
        out.average_doc_length,
        out.embedder,
        out.dimension,
        out.config.hybrid.alpha
    )?;
    for warning in &out.warnings {
        writeln!(w, "warning  {warning}")?;
    }
    for skipped in &out.skipped {
        writeln!(w, "skipped  {}  {}", skipped.path.display(), skipped.reason)?;
    }
    Ok(())
}

fn render_inspect_human(out: &InspectOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("Index: {}", out.dir.display()))?;
    pretty_kv(w, "documents", out.documents.to_string())?;
    pretty_kv(w, "excluded", out.excluded.to_string())?;
    pretty_kv(w, "vocabulary", out.vocabulary.to_string())?;
    pretty_kv(w, "avg length", format!("{:.1} tokens", out.average_doc_length))?;
    pretty_kv(w, "embedder", format!("{} ({} dims)", out.embedder, out.dimension))?;
    writeln!(w)?;

    pretty_section(w, "Configuration")?;
    pretty_kv(
        w,
        "bm25",
        format!("k1={} b={}", out.config.lexical.k1, out.config.lexical.b),
    )?;
    pretty_kv(
        w,
        "fusion",
        format!(
            "alpha={} fanout={}",
            out.config.hybrid.alpha, out.config.hybrid.fanout
        ),
    )?;

    if !out.warnings.is_empty() || !out.skipped.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Excluded")?;
        for warning in &out.warnings {
            writeln!(w, "  {warning}")?;
        }
        for skipped in &out.skipped {
            writeln!(w, "  {} ({})", skipped.path.display(), skipped.reason)?;
        }
    }
    Ok(())
}
