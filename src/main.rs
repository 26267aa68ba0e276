use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagsmith::config::Config;
use tagsmith::external::ExternalDatabase;
use tagsmith::import::normalize::{deflate, DeflateOptions};
use tagsmith::import::{BulkGamePropertyAssigner, ImportOutcome};
use tagsmith::library::{ClassificationTarget, LibraryDatabase};
use tagsmith::sources::{FileSource, PropertySource, SelectedProperty};
use tagsmith::ui::{ConsoleUi, ReviewMode};

#[derive(Parser)]
#[command(name = "tagsmith")]
#[command(
    author,
    version = "0.2.1",
    about = "Bulk property matching and assignment for game libraries"
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match a records file against the library and apply the assignment
    Import {
        #[command(flatten)]
        run: RunArgs,

        /// Approve the proposal without prompting
        #[arg(long)]
        yes: bool,

        /// Write the updated library here instead of in place
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Match a records file and print the proposal without applying it
    Preview {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the comparison key a title deflates to
    Deflate {
        /// Title to deflate
        title: String,

        /// Keep edition/subtitle markers
        #[arg(long)]
        keep_editions: bool,

        /// Keep numerals exactly as written
        #[arg(long)]
        exact_numerals: bool,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Library snapshot (JSON)
    #[arg(long)]
    library: PathBuf,

    /// Records file (JSON) for one external property
    #[arg(long)]
    records: PathBuf,

    /// External database the records belong to
    #[arg(long, default_value = "mobygames")]
    database: String,

    /// Property name; defaults to the one embedded in the records file
    #[arg(long)]
    property: Option<String>,

    /// Property kind (genre, concept, series, ...)
    #[arg(long)]
    kind: Option<String>,

    /// Override the classification target for this run
    #[arg(long)]
    target: Option<String>,
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "tagsmith=info",
        1 => "tagsmith=debug",
        _ => "trace",
    };
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = Config::load().await?;

    match cli.command {
        Commands::Import { run, yes, save } => {
            let mode = if yes {
                ReviewMode::AutoApprove
            } else {
                ReviewMode::Prompt
            };
            let save_to = save.unwrap_or_else(|| run.library.clone());
            let (db, outcome) = run_import(&config, run, mode).await?;
            if matches!(outcome, ImportOutcome::Applied { updated, .. } if updated > 0) {
                db.save_snapshot(&save_to)?;
                eprintln!("Library written to {}", save_to.display());
            }
        }
        Commands::Preview { run } => {
            run_import(&config, run, ReviewMode::Preview).await?;
        }
        Commands::Deflate {
            title,
            keep_editions,
            exact_numerals,
        } => {
            let options = DeflateOptions {
                articles: config.matching.articles.clone(),
                strip_editions: !keep_editions,
                batch: !exact_numerals,
            };
            println!("{}", deflate(&title, &options));
        }
    }

    Ok(())
}

async fn run_import(
    config: &Config,
    args: RunArgs,
    mode: ReviewMode,
) -> Result<(LibraryDatabase, ImportOutcome)> {
    let Some(database) = ExternalDatabase::parse(&args.database) else {
        bail!(
            "Unknown external database '{}'. Valid values: mobygames, giantbomb, rawg, steam, pcgamingwiki",
            args.database
        );
    };

    let mut targets = config.targets.clone();

    let mut db = LibraryDatabase::load_snapshot(&args.library)?;
    let source = FileSource::new(&args.records, database, targets.clone());

    let property = resolve_property(&source, &args)?;
    if let Some(raw) = &args.target {
        let Some(target) = ClassificationTarget::parse(raw) else {
            bail!("Unknown classification target '{raw}'");
        };
        targets.insert(property.kind.trim().to_lowercase(), target);
    }
    let source = FileSource::new(&args.records, database, targets);

    tracing::info!(
        games = db.game_count(),
        provider = source.provider_name(),
        "importing '{}'",
        property.name
    );

    let ui = ConsoleUi::new(property, mode);
    let assigner = BulkGamePropertyAssigner::new(source, config.matching.clone());
    let outcome = assigner.import_game_property(&mut db, &ui).await?;

    Ok((db, outcome))
}

fn resolve_property(source: &FileSource, args: &RunArgs) -> Result<SelectedProperty> {
    let embedded = source
        .embedded_property()
        .context("reading the records file")?;
    let name = args
        .property
        .clone()
        .or_else(|| embedded.as_ref().map(|p| p.name.clone()));
    let kind = args
        .kind
        .clone()
        .or_else(|| embedded.as_ref().map(|p| p.kind.clone()));
    match (name, kind) {
        (Some(name), Some(kind)) => Ok(SelectedProperty {
            name,
            kind,
            url: embedded.and_then(|p| p.url),
        }),
        _ => bail!(
            "No property name/kind given and none embedded in {}",
            args.records.display()
        ),
    }
}
