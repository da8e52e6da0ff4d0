use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use mmrpshark_core::mmrp::schema::{self, DisplayBase, FieldKind, FieldSpec};
use mmrpshark_core::mmrp::{MmrpFrame, parse_mmrp_at};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("MMRPSHARK_BUILD_COMMIT"),
    ", ",
    env!("MMRPSHARK_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "mmrpshark")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Decoder and offline analyzer for MMRP (IEEE 802.1ak) traffic.",
    long_about = None,
    after_help = "Examples:\n  mmrpshark pcap analyse capture.pcapng -o report.json\n  mmrpshark decode --hex '00 02 06 00 01 01 80 c2 00 00 20 48 00 00 00 00'\n  mmrpshark fields"
)]
struct Cli {
    /// Log level for diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(
        long,
        global = true,
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on PCAP/PCAPNG inputs (offline-first).
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
    /// Decode a single MMRP PDU and print its field tree.
    Decode {
        /// File holding the raw PDU bytes (starting at the Protocol Version)
        #[arg(required_unless_present = "hex")]
        input: Option<PathBuf>,

        /// PDU bytes as hex; whitespace, ':' and a leading 0x are ignored
        #[arg(long, conflicts_with = "input")]
        hex: Option<String>,

        /// Offset of the Protocol Version byte within the input
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// List the MMRP field schema.
    Fields {
        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Analyse a capture file and generate a versioned JSON report.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  mmrpshark pcap analyse capture.pcapng -o report.json\n  mmrpshark pcap analyze capture.pcap --stdout --pretty"
    )]
    Analyse {
        /// Path to a .pcap or .pcapng file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if compliance violations are present
        #[arg(long)]
        strict: bool,

        /// List compliance violations after analysis
        #[arg(long)]
        list_violations: bool,
    },
}

struct AnalyseOptions {
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_violations: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Analyse {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_violations,
            } => cmd_pcap_analyse(
                input,
                AnalyseOptions {
                    report,
                    stdout,
                    pretty,
                    compact,
                    quiet,
                    strict,
                    list_violations,
                },
            ),
        },
        Commands::Decode { input, hex, offset } => cmd_decode(input, hex, offset),
        Commands::Fields { json } => cmd_fields(json),
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

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
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

fn cmd_pcap_analyse(input: PathBuf, opts: AnalyseOptions) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;
    let report = if opts.stdout {
        None
    } else {
        Some(opts.report.clone().ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        ensure_report_differs_from_input(report_path, &input_abs)?;
    }

    let meta = fs::metadata(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    if !meta.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }

    debug!(input = %resolved_input.display(), "analysing capture");
    let rep = mmrpshark_core::analyze_pcap_file(&resolved_input)
        .context("PCAP/PCAPNG analysis failed")?;
    let json = serialize_report(&rep, opts.pretty, opts.compact)?;

    match report {
        None => print!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            if !opts.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if opts.list_violations && !opts.quiet {
        print_violations(&rep);
    }
    if opts.strict && has_violations(&rep) {
        return Err(CliError::new(
            "compliance violations detected",
            Some("use --list-violations to inspect".to_string()),
        ));
    }
    Ok(())
}

fn ensure_report_differs_from_input(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_dir = report_path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose()
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
    let Some(report_dir) = report_dir else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(
    rep: &mmrpshark_core::Report,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn has_violations(rep: &mmrpshark_core::Report) -> bool {
    rep.compliance
        .iter()
        .any(|entry| !entry.violations.is_empty())
}

fn print_violations(rep: &mmrpshark_core::Report) {
    let mut entries: Vec<_> = rep.compliance.iter().collect();
    entries.sort_by(|a, b| a.protocol.cmp(&b.protocol));
    eprintln!("Compliance violations:");
    for entry in entries {
        let mut violations = entry.violations.clone();
        violations.sort_by(|a, b| a.id.cmp(&b.id));
        for violation in violations {
            eprintln!(
                "  {} {} ({})",
                entry.protocol, violation.id, violation.count
            );
        }
    }
}

fn cmd_decode(input: Option<PathBuf>, hex: Option<String>, offset: usize) -> Result<(), CliError> {
    let payload = match (input, hex) {
        (_, Some(hex)) => parse_hex(&hex)?,
        (Some(path), None) => fs::read(&path)
            .with_context(|| format!("Failed to read payload file: {}", path.display()))?,
        (None, None) => {
            return Err(CliError::new(
                "missing payload",
                Some("pass a payload file or --hex".to_string()),
            ));
        }
    };

    let frame = parse_mmrp_at(&payload, offset).map_err(|err| {
        CliError::new(
            format!("decode failed: {err}"),
            Some(format!(
                "{} at offset {}",
                err.kind().violation_id(),
                err.offset()
            )),
        )
    })?;
    print!("{}", render_tree(&frame, &payload));
    Ok(())
}

/// Parse a hex dump into bytes.
fn parse_hex(text: &str) -> Result<Vec<u8>, CliError> {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: Vec<u8> = trimmed
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace() && *byte != b':')
        .collect();
    let invalid = |detail: String| {
        CliError::new(
            format!("invalid hex payload: {detail}"),
            Some("use pairs of hex digits, e.g. '00 02 06'".to_string()),
        )
    };
    if digits.len() % 2 != 0 {
        return Err(invalid(format!("odd number of digits ({})", digits.len())));
    }
    digits
        .chunks(2)
        .map(|pair| match (hex_digit(pair[0]), hex_digit(pair[1])) {
            (Some(high), Some(low)) => Ok((high << 4) | low),
            _ => Err(invalid(format!(
                "'{}' is not a hex byte",
                String::from_utf8_lossy(pair)
            ))),
        })
        .collect()
}

fn hex_digit(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}

fn field_name(abbrev: &str) -> &str {
    schema::field_by_abbrev(abbrev)
        .map(|field| field.name)
        .unwrap_or(abbrev)
}

fn render_tree(frame: &MmrpFrame, payload: &[u8]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", frame.info(), frame.protocol());
    let _ = writeln!(
        out,
        "    {}: {}",
        field_name("mrp-mmrp.protocol_version"),
        frame.protocol_version
    );
    for (idx, message) in frame.messages.iter().enumerate() {
        let _ = writeln!(
            out,
            "    {} {} (offset {})",
            field_name("mrp-mmrp.message"),
            idx + 1,
            message.offset
        );
        let _ = writeln!(
            out,
            "        {}: {}",
            field_name("mrp-mmrp.attribute_type"),
            message.attribute_type
        );
        let _ = writeln!(
            out,
            "        {}: {}",
            field_name("mrp-mmrp.attribute_length"),
            message.attribute_length
        );
        for (va_idx, attribute) in message.vector_attributes.iter().enumerate() {
            let _ = writeln!(
                out,
                "        {} {} (offset {}, {} bytes)",
                field_name("mrp-mmrp.vector_attribute"),
                va_idx + 1,
                attribute.offset,
                attribute.length
            );
            let _ = writeln!(
                out,
                "            {}: {}",
                field_name("mrp-mmrp.leave_all_event"),
                attribute.leave_all_event
            );
            let _ = writeln!(
                out,
                "            {}: {}",
                field_name("mrp-mmrp.number_of_values"),
                attribute.number_of_values
            );
            let _ = writeln!(
                out,
                "            {}: {}",
                field_name("mrp-mmrp.first_value"),
                attribute.first_value
            );
            for (event_idx, event) in attribute.events.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "            {} {}: {} ({})",
                    field_name("mrp-mmrp.three_packed_event"),
                    event_idx + 1,
                    event,
                    event.code()
                );
            }
        }
        let _ = writeln!(
            out,
            "        {}: 0x0000 (offset {})",
            field_name("mrp-mmrp.end_mark"),
            message.end_mark_offset
        );
    }
    let _ = writeln!(
        out,
        "    {}: 0x0000 (offset {})",
        field_name("mrp-mmrp.end_mark"),
        frame.end_mark_offset
    );
    let trailing = frame.trailing_len(payload);
    if trailing > 0 {
        let _ = writeln!(out, "    Trailing bytes: {trailing}");
    }
    for warning in &frame.warnings {
        let _ = writeln!(out, "warning: {} [{}]", warning, warning.violation_id());
    }
    out
}

fn cmd_fields(json: bool) -> Result<(), CliError> {
    if json {
        let text = serde_json::to_string_pretty(schema::FIELDS)
            .context("JSON serialization failed")?;
        println!("{}", text);
        return Ok(());
    }
    for field in schema::FIELDS {
        println!("{}", describe_field(field));
    }
    Ok(())
}

fn describe_field(field: &FieldSpec) -> String {
    let kind = match field.kind {
        FieldKind::None => "none",
        FieldKind::Uint8 => "uint8",
        FieldKind::Uint16 => "uint16",
        FieldKind::Ether => "ether",
    };
    let base = match field.base {
        DisplayBase::None => "",
        DisplayBase::Dec => " dec",
        DisplayBase::Hex => " hex",
    };
    let mut line = format!("{:<32} {:<20} {}{}", field.abbrev, field.name, kind, base);
    if field.mask != 0 {
        let _ = write!(line, " mask=0x{:04x}", field.mask);
    }
    if let Some(values) = field.values {
        let listed: Vec<String> = values
            .iter()
            .map(|(value, label)| format!("{value}={label}"))
            .collect();
        let _ = write!(line, " [{}]", listed.join(", "));
    }
    line
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
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

    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single capture file, or run once per file".to_string()),
        ));
    }
    matches.pop().ok_or_else(|| {
        CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )
    })
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
