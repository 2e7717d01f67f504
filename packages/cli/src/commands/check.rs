use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use notedown_parser::{parse, Node};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// File or directory to check (defaults to the configured notes dir)
    pub path: Option<PathBuf>,

    /// Print per-node details for each file
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let target = args
        .path
        .clone()
        .unwrap_or_else(|| config.get_notes_dir(cwd));

    if !target.exists() {
        return Err(anyhow!("Path does not exist: {:?}", target));
    }

    let files = collect_md_files(&target)?;
    if files.is_empty() {
        println!("{}", "No .md files found".yellow());
        return Ok(());
    }

    println!("{}", "Checking notes...".bright_blue().bold());

    for file in &files {
        let source = fs::read_to_string(file)?;
        let tree = parse(&source);
        let stats = Stats::of(&tree.nodes);

        println!(
            "  {} {} - {} blocks ({} headings, {} code, {} diagram, {} math)",
            "✓".green(),
            file.display(),
            tree.len(),
            stats.headings,
            stats.code,
            stats.diagrams,
            stats.math,
        );

        if args.verbose {
            for node in &tree.nodes {
                let span = node.span();
                println!("      {:>5}..{:<5} {}", span.start, span.end, describe(node));
            }
        }
    }

    println!();
    println!("{} Checked {} files", "✅".green(), files.len());
    Ok(())
}

#[derive(Default)]
struct Stats {
    headings: usize,
    code: usize,
    diagrams: usize,
    math: usize,
}

impl Stats {
    fn of(nodes: &[Node]) -> Self {
        let mut stats = Stats::default();
        for node in nodes {
            match node {
                Node::Heading { .. } => stats.headings += 1,
                Node::CodeBlock { .. } => stats.code += 1,
                Node::DiagramBlock { .. } => stats.diagrams += 1,
                Node::MathBlock { .. } => stats.math += 1,
                _ => {}
            }
        }
        stats
    }
}

fn describe(node: &Node) -> String {
    match node {
        Node::Paragraph { .. } => "paragraph".to_string(),
        Node::Heading { level, .. } => format!("heading (h{})", level),
        Node::List { ordered: true, items, .. } => format!("ordered list ({} items)", items.len()),
        Node::List { items, .. } => format!("list ({} items)", items.len()),
        Node::CodeBlock { language, .. } => match language {
            Some(lang) => format!("code block ({})", lang),
            None => "code block".to_string(),
        },
        Node::DiagramBlock { kind, .. } => format!("{} diagram", kind.as_str()),
        Node::MathBlock { .. } => "math block".to_string(),
    }
}

pub(crate) fn collect_md_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let entry_path = entry.path();
        if entry_path.extension().and_then(|s| s.to_str()) == Some("md") {
            files.push(entry_path.to_path_buf());
        }
    }
    files.sort();

    Ok(files)
}
