//! doc-html - convert a Markdown, text or HTML file to sanitized HTML
//!
//! Reads one document (or standard input), converts it with the default
//! preset, re-indents it unless `--no-beautify` is given, and writes
//! `<stem>.html` next to the input (`<stem>.converted.html` for HTML input,
//! so the source is kept). Logging goes to stderr and is controlled with
//! `RUST_LOG` (default `warn`).

use clap::{ArgAction, Parser};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use doc_html_converter::charset::decode_document;
use doc_html_converter::upload::{DEFAULT_EXPORT_STEM, EXPORT_MIME_TYPE, export_html, load_file};
use doc_html_converter::{ContentType, ConversionError, Converter, SanitizedHtml};

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Input file (.txt, .md, .markdown, .html, .htm), or `-` for stdin
    input: PathBuf,

    /// Content type: auto, markdown, text or html (default: from the file extension)
    #[arg(short = 't', long = "type")]
    content_type: Option<String>,

    /// Keep the converter output as-is instead of re-indenting it
    #[arg(long = "no-beautify", action = ArgAction::SetTrue)]
    no_beautify: bool,

    /// Output file or directory (default: `<stem>.html` next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the HTML to stdout instead of a file
    #[arg(long, action = ArgAction::SetTrue)]
    stdout: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("doc-html: {e}");
            ExitCode::from(u8::try_from(e.code()).unwrap_or(u8::MAX))
        }
    }
}

/// Where the document came from
struct Source {
    name: String,
    content: String,
    detected: ContentType,
    from_stdin: bool,
}

fn read_source(input: &Path) -> Result<Source, ConversionError> {
    if input == Path::new("-") {
        let mut bytes = Vec::new();
        io::stdin().read_to_end(&mut bytes)?;
        return Ok(Source {
            name: DEFAULT_EXPORT_STEM.to_string(),
            content: decode_document(&bytes, ContentType::Auto).text,
            detected: ContentType::Auto,
            from_stdin: true,
        });
    }

    let loaded = load_file(input)?;
    Ok(Source {
        name: loaded.descriptor.name,
        content: loaded.content,
        detected: loaded.descriptor.content_type,
        from_stdin: false,
    })
}

fn run(cli: &Cli) -> Result<(), ConversionError> {
    let source = read_source(&cli.input)?;
    let hint = cli
        .content_type
        .as_deref()
        .map(ContentType::from_hint)
        .unwrap_or(source.detected);

    let html = Converter::new().render(&source.content, hint, !cli.no_beautify);

    if cli.stdout || (source.from_stdin && cli.output.is_none()) {
        return write_stdout(&html);
    }

    let written = match &cli.output {
        Some(dir) if dir.is_dir() => export_html(dir, &source.name, &html)?,
        Some(file) => {
            if !source.from_stdin && same_file(file, &cli.input) {
                return Err(ConversionError::InvalidInput(format!(
                    "refusing to overwrite the input file {}",
                    file.display()
                )));
            }
            fs::write(file, html.as_str())?;
            file.clone()
        }
        None => {
            let dir = cli.input.parent().unwrap_or(Path::new("."));
            export_html(dir, &source.name, &html)?
        }
    };

    tracing::info!(path = %written.display(), mime = EXPORT_MIME_TYPE, "wrote HTML");
    Ok(())
}

/// Whether two paths name the same existing file
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn write_stdout(html: &SanitizedHtml) -> Result<(), ConversionError> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(html.as_str().as_bytes())?;
    if !html.is_empty() {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
