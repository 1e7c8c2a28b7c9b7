//! # Folio CLI
//!
//! Usage:
//!   folio input.json -o output.pdf
//!   echo '{ ... }' | folio -o output.pdf
//!   folio --example > letter.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{Level, LevelFilter, Log, Metadata, Record};

use folio::error::FolioError;

#[derive(Parser)]
#[command(name = "folio", version, about = "Lay out a styled document and write it as PDF")]
struct Args {
    /// Document JSON to render. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Where to write the PDF
    #[arg(short, long, default_value = "output.pdf")]
    output: PathBuf,

    /// Print a sample document and exit
    #[arg(long)]
    example: bool,

    /// Log layout decisions to stderr (-vv for every placed run)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => return,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn run(args: &Args) -> Result<(usize, usize), FolioError> {
    let input = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let document = serde_json::from_str(&input)?;
    let out = folio::render_document(&document)?;
    fs::write(&args.output, &out.bytes)?;
    Ok((out.bytes.len(), out.page_count))
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.example {
        print!("{}", example_document_json());
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);
    if log::log_enabled!(Level::Debug) {
        log::debug!("rendering to {}", args.output.display());
    }

    match run(&args) {
        Ok((bytes, pages)) => {
            eprintln!(
                "✓ Written {} bytes ({} pages) to {}",
                bytes,
                pages,
                args.output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn example_document_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "Project Update",
    "author": "Folio"
  },
  "page": {
    "size": "A4",
    "headerText": "Project Update",
    "footerText": "Page {pageNumber}"
  },
  "content": [
    {
      "type": "Element",
      "tag": "h1",
      "children": [{ "type": "Text", "content": "Project Update" }]
    },
    {
      "type": "Element",
      "tag": "p",
      "children": [
        { "type": "Text", "content": "The layout engine now supports " },
        {
          "type": "Element",
          "tag": "strong",
          "children": [{ "type": "Text", "content": "bold" }]
        },
        { "type": "Text", "content": ", " },
        {
          "type": "Element",
          "tag": "em",
          "children": [{ "type": "Text", "content": "italic" }]
        },
        { "type": "Text", "content": " and " },
        {
          "type": "Element",
          "tag": "span",
          "style": { "color": "#c0392b", "underline": true },
          "children": [{ "type": "Text", "content": "colored, underlined" }]
        },
        { "type": "Text", "content": " text that wraps greedily across the page width." }
      ]
    },
    {
      "type": "Element",
      "tag": "h2",
      "style": { "textAlign": "center" },
      "children": [{ "type": "Text", "content": "Milestones" }]
    },
    {
      "type": "Element",
      "tag": "ol",
      "children": [
        {
          "type": "Element",
          "tag": "li",
          "children": [{ "type": "Text", "content": "Rule-table block flow" }]
        },
        {
          "type": "Element",
          "tag": "li",
          "children": [{ "type": "Text", "content": "Deferred line alignment" }]
        }
      ]
    },
    {
      "type": "Element",
      "tag": "blockquote",
      "children": [{ "type": "Text", "content": "Pages are the writer's business, not the engine's." }]
    },
    {
      "type": "Element",
      "tag": "pre",
      "children": [{ "type": "Text", "content": "folio input.json -o output.pdf" }]
    }
  ]
}
"##
}
