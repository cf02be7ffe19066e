//! CLI binary for any2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionOptions` and prints the result.

use std::borrow::Cow;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use any2md::{
    ConversionError, ConversionOptions, ConverterService, Document, DocumentType, ErrorResponse,
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # HTML file to stdout
  any2md page.html

  # PDF to a file, setext headings and '*' bullets
  any2md report.pdf --heading-style setext --bullet-list-marker '*' -o report.md

  # Read from stdin, full JSON response
  curl -s https://example.com | any2md - --type html --json

  # Options from a JSON file, flags take precedence
  any2md page.html --options options.json --link-style referenced
"#;

#[derive(Parser, Debug)]
#[command(
    name = "any2md",
    version,
    about = "Convert HTML and PDF documents to Markdown",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file, or `-` for stdin.
    input: PathBuf,

    /// Document type; guessed from the file extension or content when omitted.
    #[arg(long = "type", value_enum)]
    kind: Option<TypeArg>,

    /// Write Markdown to this file instead of stdout.
    #[arg(short, long, env = "ANY2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// JSON file with conversion options (snake_case keys).
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Heading style: atx or setext.
    #[arg(long)]
    heading_style: Option<String>,

    /// Bullet list marker: -, * or +.
    #[arg(long)]
    bullet_list_marker: Option<String>,

    /// Code block style: fenced or indented.
    #[arg(long)]
    code_block_style: Option<String>,

    /// Fence for fenced code blocks.
    #[arg(long)]
    fence: Option<String>,

    /// Emphasis delimiter.
    #[arg(long)]
    em_delimiter: Option<String>,

    /// Strong emphasis delimiter.
    #[arg(long)]
    strong_delimiter: Option<String>,

    /// Link style: inlined or referenced.
    #[arg(long)]
    link_style: Option<String>,

    /// Reference style: full, collapsed or shortcut.
    #[arg(long)]
    link_reference_style: Option<String>,

    /// Keep whitespace inside inline code as written.
    #[arg(long)]
    preformatted_code: bool,

    /// Output the full JSON response instead of Markdown.
    #[arg(long, env = "ANY2MD_JSON")]
    json: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    info: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ANY2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TypeArg {
    Html,
    Pdf,
}

impl From<TypeArg> for DocumentType {
    fn from(v: TypeArg) -> Self {
        match v {
            TypeArg::Html => DocumentType::Html,
            TypeArg::Pdf => DocumentType::Pdf,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let bytes = read_input(&cli.input)?;
    let kind = cli
        .kind
        .map(DocumentType::from)
        .unwrap_or_else(|| detect_type(&cli.input, &bytes));
    let options = load_options(&cli)?;
    let service = ConverterService::new();

    if cli.info {
        if kind != DocumentType::Pdf {
            anyhow::bail!("--info is only available for PDF input");
        }
        return print_info(&cli, &service, &bytes);
    }

    let document = match kind {
        DocumentType::Html => Document::Html(String::from_utf8_lossy(&bytes)),
        DocumentType::Pdf => Document::Pdf(Cow::Borrowed(bytes.as_slice())),
    };
    let response = service
        .convert_document(&document, &options)
        .or_else(|err| fail(&cli, err))?;

    let counts = response.stats.elements_count;
    info!(
        kind = %response.kind,
        input_length = response.stats.input_length,
        output_length = response.stats.output_length,
        processing_ms = response.stats.processing_ms,
        headings = counts.headings,
        paragraphs = counts.paragraphs,
        links = counts.links,
        images = counts.images,
        lists = counts.lists,
        code_blocks = counts.code_blocks,
        tables = counts.tables,
        "converted {}",
        cli.input.display()
    );

    if cli.json {
        let json =
            serde_json::to_string_pretty(&response).context("Failed to serialize response")?;
        write_output(cli.output.as_deref(), &json)
    } else {
        write_output(cli.output.as_deref(), &response.markdown)
    }
}

/// In JSON mode a conversion failure is reported as an error envelope on
/// stdout; otherwise it propagates to `main`
fn fail<T>(cli: &Cli, err: ConversionError) -> Result<T> {
    if cli.json {
        let json = serde_json::to_string_pretty(&ErrorResponse::from(err))
            .context("Failed to serialize error")?;
        println!("{json}");
        std::process::exit(1);
    }
    Err(err).context(format!("Failed to convert {}", cli.input.display()))
}

#[cfg(feature = "pdf")]
fn print_info(cli: &Cli, service: &ConverterService, bytes: &[u8]) -> Result<()> {
    let info = service.pdf_info(bytes).or_else(|err| fail(cli, err))?;
    let json = serde_json::to_string_pretty(&info).context("Failed to serialize metadata")?;
    write_output(cli.output.as_deref(), &json)
}

#[cfg(not(feature = "pdf"))]
fn print_info(_cli: &Cli, _service: &ConverterService, _bytes: &[u8]) -> Result<()> {
    anyhow::bail!("this build has no PDF support")
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn detect_type(path: &Path, bytes: &[u8]) -> DocumentType {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => DocumentType::Pdf,
        Some("html" | "htm" | "xhtml") => DocumentType::Html,
        _ if bytes.starts_with(b"%PDF-") => DocumentType::Pdf,
        _ => DocumentType::Html,
    }
}

/// Options file first, then any flags given on the command line
fn load_options(cli: &Cli) -> Result<ConversionOptions> {
    let mut options = match &cli.options {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read options file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid options file {}", path.display()))?
        }
        None => ConversionOptions::default(),
    };

    let overrides = [
        (&mut options.heading_style, &cli.heading_style),
        (&mut options.bullet_list_marker, &cli.bullet_list_marker),
        (&mut options.code_block_style, &cli.code_block_style),
        (&mut options.fence, &cli.fence),
        (&mut options.em_delimiter, &cli.em_delimiter),
        (&mut options.strong_delimiter, &cli.strong_delimiter),
        (&mut options.link_style, &cli.link_style),
        (&mut options.link_reference_style, &cli.link_reference_style),
    ];
    for (field, flag) in overrides {
        if let Some(value) = flag {
            *field = value.clone();
        }
    }
    if cli.preformatted_code {
        options.preformatted_code = true;
    }

    Ok(options)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, format!("{text}\n"))
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{text}").context("Failed to write to stdout")
        }
    }
}
