use crate::config::Config;
use crate::render::OutputFormat;
use crate::{convert, deliver, fetch, Transcript};
use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Stem used for fetched transcripts when `--name` is not given.
pub const DEFAULT_STEM: &str = "meeting";

#[derive(Parser, Debug)]
#[command(name = "transcript-downloader")]
#[command(about = "Download meeting transcripts as JSON, WebVTT or speaker-grouped text", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ./config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Download a transcript and save it in the chosen format
    Fetch(FetchArgs),
    /// Convert transcript payloads already on disk
    Convert(ConvertArgs),
    /// Show the start of every rendering of a transcript
    Preview(PreviewArgs),
}

#[derive(ClapArgs, Debug)]
pub struct FetchArgs {
    /// Transcript download URL
    pub url: String,
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
    /// File name to save under, before the format suffix and extension
    #[arg(short, long)]
    pub name: Option<String>,
    /// Output directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Keep downloaded payloads in this directory and reuse them
    #[arg(long)]
    pub cache: Option<PathBuf>,
    /// Refuse to write subtitles with unreadable timestamps
    #[arg(long)]
    pub strict: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ConvertArgs {
    /// Payload files, or directories to search for *.json payloads
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
    /// Output directory
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Refuse to write subtitles with unreadable timestamps
    #[arg(long)]
    pub strict: bool,
}

#[derive(ClapArgs, Debug)]
pub struct PreviewArgs {
    /// A payload file or a transcript download URL
    pub source: String,
    /// Characters to show per format
    #[arg(short, long)]
    pub limit: Option<usize>,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).await?;
    debug!(?config, "effective configuration");

    match cli.command {
        CliCommand::Fetch(args) => handle_fetch(args, &config).await,
        CliCommand::Convert(args) => handle_convert(args, &config).await,
        CliCommand::Preview(args) => handle_preview(args, &config).await,
    }
}

async fn handle_fetch(args: FetchArgs, config: &Config) -> anyhow::Result<()> {
    let format = args.format.unwrap_or(config.default_format);
    let out = args.out.as_deref().unwrap_or(&config.output_dir);
    let cache = args.cache.as_deref().or(config.cache_dir.as_deref());
    let stem = args.name.as_deref().unwrap_or(DEFAULT_STEM);

    // fail on a bad name before spending a request on it
    deliver::file_name(stem, format)?;

    let client = reqwest::Client::new();
    let payload = fetch::fetch_payload(&client, &args.url, cache)
        .await
        .context("download transcript")?;
    let document = convert(payload, format, args.strict).context("convert transcript")?;
    let path = deliver::save(&document, out, stem).await?;
    println!("{}", path.display());
    Ok(())
}

async fn handle_convert(args: ConvertArgs, config: &Config) -> anyhow::Result<()> {
    let format = args.format.unwrap_or(config.default_format);
    let out = args.out.as_deref().unwrap_or(&config.output_dir);

    let mut outputs = HashMap::new();
    let mut converted = 0;
    for input in &args.paths {
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.context("walk dir")?;
            if !entry.file_type().is_file() {
                continue;
            }
            // files named explicitly are taken whatever their extension
            if entry.depth() > 0 && !is_json(entry.path()) {
                continue;
            }

            let name = deliver::file_name(&output_stem(entry.path()), format)?;
            claim_output(&mut outputs, name, entry.path())?;

            let path = convert_file(entry.path(), format, args.strict, out)
                .await
                .with_context(|| format!("while converting '{}'", entry.path().display()))?;
            println!("{}", path.display());
            converted += 1;
        }
    }
    info!("converted {converted} transcript(s) to {format}");
    Ok(())
}

/// Records that `input` writes `name`, failing if an earlier input of this run
/// already did.
fn claim_output(
    outputs: &mut HashMap<String, PathBuf>,
    name: String,
    input: &Path,
) -> anyhow::Result<()> {
    if let Some(first) = outputs.get(&name) {
        anyhow::bail!(
            "'{}' and '{}' would both be saved as '{name}'",
            first.display(),
            input.display()
        );
    }
    outputs.insert(name, input.to_path_buf());
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Converts one payload file, naming the output after the input's file stem.
pub async fn convert_file(
    path: &Path,
    format: OutputFormat,
    strict: bool,
    out: &Path,
) -> anyhow::Result<PathBuf> {
    let payload = tokio::fs::read_to_string(path)
        .await
        .context("read payload")?;
    let document = convert(payload, format, strict)?;
    Ok(deliver::save(&document, out, &output_stem(path)).await?)
}

/// The input's file stem, or [`DEFAULT_STEM`] when it has nothing usable.
fn output_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(deliver::title_stem)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_STEM.to_string())
}

async fn handle_preview(args: PreviewArgs, config: &Config) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(config.preview_limit);
    let payload = if args.source.starts_with("http://") || args.source.starts_with("https://") {
        let client = reqwest::Client::new();
        fetch::fetch_payload(&client, &args.source, config.cache_dir.as_deref()).await?
    } else {
        tokio::fs::read_to_string(&args.source)
            .await
            .with_context(|| format!("read payload '{}'", args.source))?
    };

    let transcript = Transcript::parse(payload).context("decode transcript")?;
    println!("==> {} entries", transcript.len());
    for format in OutputFormat::ALL {
        let document = crate::render(&transcript, format);
        println!(
            "\n==> {format} ({}, {})",
            format.extension(),
            format.mime_type()
        );
        println!("{}", document.preview(limit));
    }
    Ok(())
}
