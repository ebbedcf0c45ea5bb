use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use klvwatch_core::tags::{DecodeKind, dispatch_kind};
use klvwatch_core::{
    CaptureFilter, DEFAULT_CHUNK_SIZE, DecoderConfig, ImapbMode, TagRegistry, ValueMode,
    decode_pcap_file, decode_reader,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("KLVWATCH_BUILD_COMMIT"),
    " ",
    env!("KLVWATCH_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "klvwatch")]
#[command(version = VERSION)]
#[command(
    about = "Decoder for MISB ST 0601 KLV metadata streams and captures.",
    long_about = None,
    after_help = "Examples:
  klvwatch stream decode feed.klv -o packets.jsonl
  cat feed.klv | klvwatch stream decode -
  klvwatch pcap decode capture.pcapng --port 15000
  klvwatch registry dump --pretty"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Raw KLV byte streams (files or stdin).
    Stream {
        #[command(subcommand)]
        command: StreamCommands,
    },
    /// KLV carried in UDP datagrams of PCAP/PCAPNG captures.
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
    /// Tag registry inspection.
    Registry {
        #[command(subcommand)]
        command: RegistryCommands,
    },
}

#[derive(Subcommand, Debug)]
enum StreamCommands {
    /// Decode a KLV byte stream into JSON Lines, one object per packet.
    Decode {
        /// Input file, glob pattern, or `-` for stdin
        input: PathBuf,

        /// Read size in bytes
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        #[command(flatten)]
        decode: DecodeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Decode KLV from every UDP flow of a capture into JSON Lines.
    #[command(alias = "analyse")]
    Decode {
        /// Path or glob pattern of a .pcap or .pcapng file
        input: PathBuf,

        /// Only decode datagrams to or from this UDP port
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        decode: DecodeArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Subcommand, Debug)]
enum RegistryCommands {
    /// Print the effective tag registry as JSON.
    Dump {
        /// JSON array of tag templates overriding the built-in ones
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Output path (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Decoder config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of tag templates overriding the built-in ones
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Clear tag values at the start of every packet
    #[arg(long)]
    reset_per_packet: bool,

    /// Report IMAPB tags in physical units instead of fractions
    #[arg(long)]
    imapb_physical: bool,

    /// Largest accepted packet payload in bytes
    #[arg(long)]
    max_packet_len: Option<u64>,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output path (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Pretty-print each JSON object
    #[arg(long)]
    pretty: bool,

    /// Suppress the summary on stderr
    #[arg(long)]
    quiet: bool,

    /// Exit with a non-zero code if malformed frames or tag issues are seen
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Stream {
            command:
                StreamCommands::Decode {
                    input,
                    chunk_size,
                    decode,
                    output,
                },
        } => cmd_stream_decode(&input, chunk_size, &decode, &output),
        Commands::Pcap {
            command:
                PcapCommands::Decode {
                    input,
                    port,
                    decode,
                    output,
                },
        } => cmd_pcap_decode(&input, port, &decode, &output),
        Commands::Registry {
            command:
                RegistryCommands::Dump {
                    registry,
                    output,
                    pretty,
                },
        } => cmd_registry_dump(registry.as_deref(), output.as_deref(), pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn cmd_stream_decode(
    input: &Path,
    chunk_size: usize,
    decode: &DecodeArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    if chunk_size == 0 {
        return Err(CliError::new(
            "chunk size must be at least 1",
            Some("pass --chunk-size 1 or larger".to_string()),
        ));
    }
    let config = load_config(decode)?;
    let registry = load_registry(decode.registry.as_deref())?;

    let reading_stdin = input.as_os_str() == "-";
    let summary = if reading_stdin {
        let mut writer = JsonLinesWriter::open(output.output.as_deref(), output.pretty)?;
        info!("decoding stdin");
        let summary = decode_reader(io::stdin().lock(), registry, &config, chunk_size, |p| {
            writer.write(&p)
        })
        .context("stream decoding failed")?;
        writer.finish()?;
        summary
    } else {
        let resolved = resolve_input_path(input)?;
        validate_input_file(&resolved, None)?;
        ensure_distinct_output(&resolved, output.output.as_deref())?;
        let file = File::open(&resolved)
            .with_context(|| format!("Failed to open input file: {}", resolved.display()))?;
        let mut writer = JsonLinesWriter::open(output.output.as_deref(), output.pretty)?;
        info!(input = %resolved.display(), "decoding stream");
        let summary = decode_reader(file, registry, &config, chunk_size, |p| writer.write(&p))
            .context("stream decoding failed")?;
        writer.finish()?;
        summary
    };

    let stats = summary.stats;
    if !output.quiet {
        eprintln!(
            "OK: {} packets decoded ({} malformed, {} tag issues, {} skipped, {} trailing)",
            stats.packets,
            stats.malformed,
            stats.tag_issues,
            stats.skipped_bytes,
            summary.trailing_bytes
        );
    }
    check_strict(output.strict, stats.malformed, stats.tag_issues)
}

fn cmd_pcap_decode(
    input: &Path,
    port: Option<u16>,
    decode: &DecodeArgs,
    output: &OutputArgs,
) -> Result<(), CliError> {
    let resolved = resolve_input_path(input)?;
    validate_input_file(&resolved, Some(&["pcap", "pcapng"][..]))?;
    ensure_distinct_output(&resolved, output.output.as_deref())?;
    let config = load_config(decode)?;
    let registry = load_registry(decode.registry.as_deref())?;

    let mut writer = JsonLinesWriter::open(output.output.as_deref(), output.pretty)?;
    info!(input = %resolved.display(), ?port, "decoding capture");
    let summary = decode_pcap_file(
        &resolved,
        registry,
        &config,
        CaptureFilter { port },
        |packet| writer.write(&packet),
    )
    .context("PCAP/PCAPNG decoding failed")?;
    writer.finish()?;

    if !output.quiet {
        eprintln!(
            "OK: {} packets decoded from {} flows ({} frames, {} UDP, {} malformed, {} tag issues)",
            summary.packets(),
            summary.flows.len(),
            summary.frames_total,
            summary.udp_datagrams,
            summary.malformed(),
            summary.tag_issues()
        );
    }
    check_strict(output.strict, summary.malformed(), summary.tag_issues())
}

#[derive(Serialize)]
struct RegistryEntry<'a> {
    id: u8,
    name: &'a str,
    unit: &'a str,
    min: f64,
    max: f64,
    decode: Option<DecodeKind>,
}

fn cmd_registry_dump(
    registry: Option<&Path>,
    output: Option<&Path>,
    pretty: bool,
) -> Result<(), CliError> {
    let registry = load_registry(registry)?;
    let entries: Vec<RegistryEntry<'_>> = registry
        .iter()
        .map(|template| RegistryEntry {
            id: template.id,
            name: &template.name,
            unit: &template.unit,
            min: template.min,
            max: template.max,
            decode: dispatch_kind(template.id),
        })
        .collect();

    let mut writer = JsonLinesWriter::open(output, pretty)?;
    writer.write(&entries);
    writer.finish()
}

fn check_strict(strict: bool, malformed: u64, tag_issues: u64) -> Result<(), CliError> {
    if strict && (malformed > 0 || tag_issues > 0) {
        return Err(CliError::new(
            format!("{malformed} malformed frames and {tag_issues} tag issues detected"),
            Some("inspect the `issues` field of the output, or rerun with -v".to_string()),
        ));
    }
    Ok(())
}

fn load_config(args: &DecodeArgs) -> Result<DecoderConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => DecoderConfig::from_json_file(path).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("expected a JSON object with value_mode, imapb, max_packet_len".to_string()),
            )
        })?,
        None => DecoderConfig::default(),
    };
    if args.reset_per_packet {
        config.value_mode = ValueMode::ResetPerPacket;
    }
    if args.imapb_physical {
        config.imapb = ImapbMode::Physical;
    }
    if let Some(max_packet_len) = args.max_packet_len {
        config.max_packet_len = max_packet_len;
    }
    debug!(?config, "decoder config");
    Ok(config)
}

fn load_registry(path: Option<&Path>) -> Result<Arc<TagRegistry>, CliError> {
    let registry = TagRegistry::st0601();
    let registry = match path {
        Some(path) => registry.with_overrides_from_file(path).map_err(|err| {
            CliError::new(
                err.to_string(),
                Some("expected a JSON array of {id, name, unit, min, max} objects".to_string()),
            )
        })?,
        None => registry,
    };
    Ok(Arc::new(registry))
}

/// Serializes one JSON document per line. Write errors are kept until
/// `finish` so decode callbacks stay infallible.
struct JsonLinesWriter {
    out: Box<dyn Write>,
    pretty: bool,
    error: Option<anyhow::Error>,
}

impl JsonLinesWriter {
    fn open(path: Option<&Path>, pretty: bool) -> Result<Self, CliError> {
        let out: Box<dyn Write> = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).with_context(|| {
                            format!("Failed to create output directory: {}", parent.display())
                        })?;
                    }
                }
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output: {}", path.display()))?;
                Box::new(BufWriter::new(file))
            }
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };
        Ok(Self {
            out,
            pretty,
            error: None,
        })
    }

    fn write<T: Serialize>(&mut self, value: &T) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.try_write(value) {
            self.error = Some(err);
        }
    }

    fn try_write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, value)
        } else {
            serde_json::to_writer(&mut self.out, value)
        }
        .context("JSON serialization failed")?;
        self.out.write_all(b"\n").context("Failed to write output")?;
        Ok(())
    }

    fn finish(mut self) -> Result<(), CliError> {
        if let Some(err) = self.error.take() {
            return Err(err.into());
        }
        self.out.flush().context("Failed to write output")?;
        Ok(())
    }
}

fn validate_input_file(input: &Path, extensions: Option<&[&str]>) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some(input_hint(extensions)),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some(input_hint(extensions)),
        ));
    }
    if let Some(extensions) = extensions {
        let ext = input
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !extensions.contains(&ext.as_str()) {
            return Err(CliError::new(
                format!("unsupported input format '{}'", input.display()),
                Some(input_hint(Some(extensions))),
            ));
        }
    }
    Ok(())
}

fn input_hint(extensions: Option<&[&str]>) -> String {
    match extensions {
        Some(extensions) => {
            let listed = extensions
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(" or ");
            format!("expected a {listed} file")
        }
        None => "pass a file path, a glob pattern, or - for stdin".to_string(),
    }
}

fn ensure_distinct_output(input: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let Some(output) = output else {
        return Ok(());
    };
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    if fs::canonicalize(output).is_ok_and(|output_abs| output_abs == input_abs) {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let listed = matches
                .iter()
                .take(3)
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let more = if count > 3 { ", ..." } else { "" };
            Err(CliError::new(
                format!(
                    "multiple files match pattern '{}' ({} matches); matches: {}{}",
                    pattern, count, listed, more
                ),
                Some("pass a single input file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
