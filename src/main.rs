//! folio - TEI document inspector

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use folio::{ParsedDocument, ParserConfig, QueryEngine, TeiParser, format_for_display, table_of_contents};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Inspect TEI documents", long_about = None)]
#[command(after_help = "EXAMPLES:
    folio info letters.xml            Show document metadata
    folio toc letters.xml             Print the table of contents
    folio json letters.xml            Dump the parsed document as JSON
    folio --engine tag-name toc a.xml Use the tag-name query engine")]
struct Cli {
    /// Tree-query engine (selectors, tag-name)
    #[arg(long, global = true, value_name = "ENGINE")]
    engine: Option<QueryEngine>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show title, author and header metadata
    Info {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Print the table of contents
    Toc {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Print the parsed document as JSON
    Json {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Rewrite a stored TEI fragment into display HTML
    Display {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ParserConfig::default();
    if let Some(engine) = cli.engine {
        config = config.with_engine(engine);
    }

    match cli.command {
        Command::Info { input } => show_info(&parser(config)?, &input),
        Command::Toc { input } => show_toc(&parser(config)?, &input),
        Command::Json { input } => show_json(&parser(config)?, &input),
        Command::Display { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            println!("{}", format_for_display(&raw));
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parser(config: ParserConfig) -> Result<TeiParser> {
    TeiParser::with_config(config).context("failed to configure parser")
}

fn load(parser: &TeiParser, path: &Path) -> Result<ParsedDocument> {
    parser
        .parse_file(path)
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn show_info(parser: &TeiParser, path: &Path) -> Result<()> {
    let doc = load(parser, path)?;
    let meta = &doc.metadata;

    println!("File: {}", path.display());
    println!("Title: {}", doc.title);
    if let Some(ref author) = doc.author {
        println!("Author: {author}");
    }
    if let Some(ref editor) = meta.editor {
        println!("Editor: {editor}");
    }
    if let Some(ref publisher) = meta.publisher {
        println!("Publisher: {publisher}");
    }
    if let Some(ref date) = meta.pub_date {
        println!("Date: {date}");
    }
    if let Some(ref language) = meta.language {
        println!("Language: {language}");
    }
    if let Some(ref genre) = meta.genre {
        println!("Genre: {genre}");
    }
    if !meta.keywords.is_empty() {
        println!("Keywords: {}", meta.keywords.join(", "));
    }
    if let Some(ref desc) = meta.description {
        let desc = desc.trim();
        match desc.char_indices().nth(200) {
            Some((cut, _)) => println!("Description: {}...", &desc[..cut]),
            None => println!("Description: {desc}"),
        }
    }
    println!("Chapters: {} ({} top-level)", doc.chapter_count(), doc.chapters.len());
    println!("Engine: {}", parser.engine());

    Ok(())
}

fn show_toc(parser: &TeiParser, path: &Path) -> Result<()> {
    let doc = load(parser, path)?;
    for entry in table_of_contents(&doc.chapters) {
        let indent = "  ".repeat(entry.level.saturating_sub(1));
        println!("{indent}{}  {}", entry.id, entry.title);
    }
    Ok(())
}

fn show_json(parser: &TeiParser, path: &Path) -> Result<()> {
    let doc = load(parser, path)?;
    let json = serde_json::to_string_pretty(&doc).context("failed to serialize document")?;
    println!("{json}");
    Ok(())
}
