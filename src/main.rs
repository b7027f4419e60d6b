//! # Gapmacs
//!
//! Command-line front end to the gapmacs text engine.
//!
//! ## Quick Start
//!
//! ```bash
//! # Report the detected encoding and line ending
//! cargo run -- path/to/file.txt
//!
//! # Rewrite the file as EUC-JP with CRLF line endings
//! cargo run -- path/to/file.txt --encoding euc-jp --eol dos
//! ```

use anyhow::Context;
use clap::Parser;
use gapmacs_buffer::FileFormat;
use gapmacs_core::{Config, Editor};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Gapmacs - inspect and convert text files with the gapmacs buffer engine
#[derive(Parser, Debug)]
#[command(name = "gapmacs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Save the file in this encoding (e.g. utf-8, euc-jp, windows-31j)
    #[arg(short, long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Save the file with these line endings (unix, dos, mac)
    #[arg(long, value_name = "FORMAT")]
    eol: Option<FileFormat>,

    /// Config file to use instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting gapmacs v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load(),
    };
    let mut editor = Editor::new(config)?;
    editor
        .find_file(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    let buffer = editor
        .current_mut()
        .context("no buffer after opening the file")?;

    println!("buffer:   {}", buffer.name().unwrap_or_default());
    println!(
        "mode:     {}",
        buffer
            .attribute("mode")
            .and_then(|v| v.as_str())
            .unwrap_or(gapmacs_core::FUNDAMENTAL_MODE)
    );
    println!("encoding: {}", buffer.file_encoding().name());
    println!("format:   {}", buffer.file_format());
    println!("size:     {} bytes", buffer.len());
    if buffer.is_new_file() {
        println!("(new file)");
    }

    if args.encoding.is_none() && args.eol.is_none() {
        return Ok(());
    }
    if let Some(label) = &args.encoding {
        buffer.set_file_encoding_label(label)?;
    }
    if let Some(format) = args.eol {
        buffer.set_file_format(format);
    }
    buffer
        .save()
        .with_context(|| format!("failed to write {}", args.file.display()))?;
    println!(
        "Wrote {} ({}, {})",
        args.file.display(),
        buffer.file_encoding().name(),
        buffer.file_format()
    );

    Ok(())
}
