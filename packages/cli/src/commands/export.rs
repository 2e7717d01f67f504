use crate::commands::check::collect_md_files;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use notedown_export::{ExportFormat, ExportOptions, ExportWarning};
use notedown_renderer::{NullRenderer, RenderPipeline};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// File or directory to export (defaults to the configured notes dir)
    pub path: Option<PathBuf>,

    /// Target format (html, print, text)
    #[arg(short, long, default_value = "html")]
    pub format: String,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Emit a bare fragment instead of a standalone document
    #[arg(long)]
    pub bare: bool,

    /// Skip the embedded stylesheet
    #[arg(long)]
    pub no_css: bool,

    /// Document title (defaults to the first heading)
    #[arg(long)]
    pub title: Option<String>,
}

pub fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let target = args
        .path
        .clone()
        .unwrap_or_else(|| config.get_notes_dir(cwd));

    if !target.exists() {
        return Err(anyhow!("Path does not exist: {:?}", target));
    }

    let format = match args.format.as_str() {
        "html" => ExportFormat::Html,
        "print" => ExportFormat::PrintHtml,
        "text" => ExportFormat::PlainText,
        other => return Err(anyhow!("Unknown format: {} (use html, print, or text)", other)),
    };

    let options = ExportOptions {
        standalone: !args.bare && config.export.standalone,
        include_css: !args.no_css && config.export.include_css,
        title: args.title.clone(),
    };

    let files = collect_md_files(&target)?;
    if files.is_empty() {
        println!("{}", "No .md files found".yellow());
        return Ok(());
    }

    println!("{}", "Exporting notes...".bright_blue().bold());

    let mut warned = 0;
    for file in &files {
        let warnings = export_file(file, format, &options, &args, &config, cwd)?;
        warned += warnings.len();
        for warning in &warnings {
            println!(
                "      {} {}: {}",
                "⚠".yellow(),
                warning.node_id,
                warning.message
            );
        }
    }

    println!();
    if warned == 0 {
        println!("{} Exported {} files", "✅".green(), files.len());
    } else {
        println!(
            "{} Exported {} files with {} warnings",
            "⚠️".yellow(),
            files.len(),
            warned
        );
    }
    Ok(())
}

fn export_file(
    file: &Path,
    format: ExportFormat,
    options: &ExportOptions,
    args: &ExportArgs,
    config: &Config,
    cwd: &str,
) -> Result<Vec<ExportWarning>> {
    let source = fs::read_to_string(file)?;
    let tree = notedown_parser::parse(&source);

    // No external diagram/math backend on the command line; those blocks
    // degrade to their literal source with a warning.
    let mut pipeline = RenderPipeline::new(Arc::new(NullRenderer));
    pipeline.emit(&source, &tree);
    pipeline.poll_completed();
    let fragments = pipeline.emit(&source, &tree);

    let artifact = notedown_export::export(format, &tree, &fragments, options)?;

    if args.stdout {
        println!("{}", artifact.content);
        return Ok(artifact.warnings);
    }

    let out_dir = args
        .out_dir
        .clone()
        .or_else(|| config.export.out_dir.clone())
        .unwrap_or_else(|| "dist".to_string());
    let file_name = file
        .file_name()
        .ok_or_else(|| anyhow!("Not a file: {:?}", file))?;
    let output_file = PathBuf::from(cwd)
        .join(out_dir)
        .join(file_name)
        .with_extension(artifact.format.extension());

    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_file, &artifact.content)?;

    println!(
        "  {} {} → {}",
        "✓".green(),
        file.display(),
        output_file.display()
    );

    Ok(artifact.warnings)
}
