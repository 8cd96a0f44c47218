//! hunklight - highlight the characters that changed in a colored diff
//!
//! Typical use: `git diff --color | hunklight | less -R`

mod config;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, StyleName};
use hunklight_core::Highlighter;

#[derive(Parser, Debug)]
#[command(name = "hunklight")]
#[command(about = "Highlight the changed characters of paired lines in a colored unified diff")]
#[command(version)]
struct Args {
    /// Diff files to read (standard input when empty or `-`)
    files: Vec<PathBuf>,

    /// Highlight decoration
    #[arg(short, long, value_enum)]
    style: Option<StyleName>,

    /// Config file (default: ~/.config/hunklight/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pass hunks through without intra-line highlighting
    #[arg(long)]
    no_highlight: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if is_broken_pipe(&err) => {
            log::debug!("output closed early");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("hunklight: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    let highlighter = build_highlighter(&config, &args);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.files.is_empty() {
        process_stdin(&mut out, &highlighter)?;
    }
    for path in &args.files {
        if path.as_os_str() == "-" {
            process_stdin(&mut out, &highlighter)?;
        } else {
            process_file(path, &mut out, &highlighter)?;
        }
    }
    Ok(())
}

fn build_highlighter(config: &Config, args: &Args) -> Highlighter {
    Highlighter::new()
        .with_style(config.highlight.resolve(args.style))
        .with_enabled(config.highlight.enabled && !args.no_highlight)
}

fn process_stdin<W: Write>(out: &mut W, highlighter: &Highlighter) -> Result<()> {
    let stdin = io::stdin();
    hunklight_core::run(stdin.lock(), out, highlighter).context("Failed to process standard input")?;
    Ok(())
}

fn process_file<W: Write>(path: &Path, out: &mut W, highlighter: &Highlighter) -> Result<()> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    hunklight_core::run(BufReader::new(file), out, highlighter)
        .with_context(|| format!("Failed to process {}", path.display()))?;
    Ok(())
}

fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<hunklight_core::Error>()
            .is_some_and(hunklight_core::Error::is_broken_pipe)
    })
}
