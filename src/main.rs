//! tessera - Render authored content trees to HTML

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tessera::model::Content;
use tessera::render::{BlockTreeRenderer, html};
use tessera::symbol::DirectoryFetcher;
use tessera::{EngineConfig, ExecutionContext, Fingerprint};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(version, about = "Render authored content trees", long_about = None)]
#[command(after_help = "EXAMPLES:
    tessera render page.json -o page.html         Render a page to HTML
    tessera render page.json --symbols content/   Fetch symbols from content/<model>/<entry>.json
    tessera styles page.json                      Print the composed stylesheet
    tessera hash data.json                        Print a structural fingerprint")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Render a content JSON file to an HTML document
    Render {
        /// Content JSON file
        #[arg(value_name = "CONTENT")]
        input: PathBuf,

        /// Directory holding symbol content as <model>/<entry>.json
        #[arg(long, value_name = "DIR")]
        symbols: Option<PathBuf>,

        /// Engine configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Render as the editor would (no cache-key fingerprints)
        #[arg(long)]
        editing: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Print the stylesheet composed for a content JSON file
    Styles {
        #[arg(value_name = "CONTENT")]
        input: PathBuf,
    },
    /// Print the structural fingerprint of a JSON file
    Hash {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Render {
            input,
            symbols,
            config,
            editing,
            output,
        } => render(&input, symbols.as_deref(), config.as_deref(), editing, output.as_deref()),
        Command::Styles { input } => styles(&input),
        Command::Hash { input } => hash(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "tessera=debug",
        _ => "tessera=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn render(
    input: &Path,
    symbols: Option<&Path>,
    config: Option<&Path>,
    editing: bool,
    output: Option<&Path>,
) -> tessera::Result<()> {
    let mut config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    // Output is produced ahead of time, never in a live browser.
    config.context = ExecutionContext {
        editing: editing || config.context.editing,
        browser: false,
    };

    let content = read_content(input)?;
    let mut renderer = BlockTreeRenderer::new(config);
    let mut rendered = renderer.render_page(&content);

    if let Some(dir) = symbols {
        let fetcher = DirectoryFetcher::new(dir);
        let filled = futures::executor::block_on(renderer.hydrate(&mut rendered, &fetcher))?;
        tracing::info!(filled, "Hydrated symbols");
    } else if rendered.tree.pending_count() > 0 {
        tracing::warn!(
            pending = rendered.tree.pending_count(),
            "Symbols left unrendered; pass --symbols to fetch them"
        );
    }

    let title = content
        .id
        .clone()
        .unwrap_or_else(|| input.display().to_string());
    let document = html::to_html_document(&rendered, &title);

    match output {
        Some(path) => std::fs::write(path, document)?,
        None => print!("{document}"),
    }
    Ok(())
}

fn styles(input: &Path) -> tessera::Result<()> {
    let content = read_content(input)?;
    print!(
        "{}",
        tessera::compose_styles(content.data.css_code.as_deref(), &content.data.custom_fonts)
    );
    Ok(())
}

fn hash(input: &Path) -> tessera::Result<()> {
    let text = std::fs::read_to_string(input)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    println!("{}", Fingerprint::of_value(&value));
    Ok(())
}

fn read_content(path: &Path) -> tessera::Result<Content> {
    let text = std::fs::read_to_string(path)?;
    Content::from_json(&text)
}
