use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use mdnotion::notion::{NotionClient, Parent};
use mdnotion::{Diagnostic, PageBuilder, Registry, Settings, TOKEN_ENV, default_path};

#[derive(Parser)]
#[command(name = "mdnotion")]
#[command(about = "Convert Markdown files to Notion pages")]
struct Cli {
    /// Input Markdown file
    input: PathBuf,

    /// Page (or database, with --database) the new page is created under
    #[arg(long)]
    parent_id: Option<String>,

    /// Treat --parent-id as a database id
    #[arg(long)]
    database: bool,

    /// Page title (defaults to the input file name)
    #[arg(long)]
    title: Option<String>,

    /// Print the blocks as JSON instead of uploading them
    #[arg(long)]
    dry: bool,

    /// Settings file (defaults to mdnotion.toml in the working directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API token, overriding the settings file and the environment
    #[arg(long)]
    token: Option<String>,

    /// Abort on the first construct that cannot be converted
    #[arg(long)]
    strict: bool,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;

    // Upload prerequisites are checked before any conversion work
    let parent = if cli.dry {
        None
    } else {
        let Some(id) = cli.parent_id.clone() else {
            bail!("--parent-id is required unless --dry is given");
        };
        if !settings.has_token() {
            bail!("no API token configured (use --token, {TOKEN_ENV} or the settings file)");
        }
        Some(if cli.database {
            Parent::Database(id)
        } else {
            Parent::Page(id)
        })
    };

    let markdown = fs::read_to_string(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;

    let builder = PageBuilder::new(Arc::new(Registry::builtin()?), settings.clone());
    let conversion = builder.convert(&markdown)?;
    report(&conversion.diagnostics);

    match parent {
        None => println!("{}", serde_json::to_string_pretty(&conversion.blocks)?),
        Some(parent) => {
            let title = cli.title.clone().unwrap_or_else(|| default_title(&cli.input));
            let client = NotionClient::new(&settings);
            let id = client
                .create_page(&parent, &title, &conversion.blocks)
                .await
                .context("upload failed")?;
            println!("Created page {id}");
        }
    }

    Ok(())
}

/// Compiled defaults, then the settings file, then the environment, then flags.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let path = cli.config.clone().unwrap_or_else(default_path);
    let mut settings = Settings::load(&path)?.with_env(|key| std::env::var(key).ok());
    if let Some(token) = &cli.token {
        settings.notion_api_token = token.clone();
    }
    if cli.strict {
        settings.strict = true;
    }
    Ok(settings)
}

fn report(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    eprintln!("{} construct(s) not converted:", diagnostics.len());
    for diagnostic in diagnostics {
        eprintln!("  {diagnostic}");
    }
}

fn default_title(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}
