mod commands;
mod output;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kpiscan_core::parsing::region::{ColumnMode, RegionStrategy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kpiscan",
    version,
    about = "Reconstruct ranked KPI tables from network report charts"
)]
struct Cli {
    /// Log per-chart region, classification and pairing details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every chart of a report (PDF or layout JSON)
    Extract {
        /// Path to PDF or layout JSON file
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        #[command(flatten)]
        source: CatalogArgs,

        #[command(flatten)]
        strategy: StrategyArgs,

        /// Show located chart regions and token counts
        #[arg(long)]
        debug: bool,

        /// Highlight this code in every ranking
        #[arg(long, value_name = "CODE")]
        subject: Option<String>,

        /// Replace every code except --subject by an alias
        #[arg(long, requires = "subject")]
        mask: bool,
    },
    /// Print one chart's ranking with every code except the subject's aliased
    Mask {
        /// Path to PDF or layout JSON file
        input_file: PathBuf,

        /// Chart key (e.g., "OETD")
        #[arg(short, long)]
        chart: String,

        /// Subject code kept in clear
        #[arg(long, value_name = "CODE", conflicts_with = "subject_from")]
        subject: Option<String>,

        /// Detect the subject from the heading of a station report (default: the input itself)
        #[arg(long, value_name = "FILE")]
        subject_from: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        #[command(flatten)]
        source: CatalogArgs,

        #[command(flatten)]
        strategy: StrategyArgs,
    },
    /// List the codes known to a catalog
    Codes {
        #[command(flatten)]
        source: CatalogArgs,
    },
    /// Manage and inspect chart catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List built-in catalogs
    List,
    /// Show charts and geometry of a built-in catalog
    Show {
        /// Preset name (e.g., "network")
        preset: String,
    },
    /// Print the JSON schema with field descriptions
    Schema,
    /// Validate a custom catalog file
    Validate {
        /// Path to JSON catalog file
        file: PathBuf,
    },
}

#[derive(Args)]
struct CatalogArgs {
    /// Custom JSON catalog file
    #[arg(long, value_name = "FILE", conflicts_with = "preset")]
    catalog: Option<PathBuf>,

    /// Built-in catalog
    #[arg(long, value_name = "NAME", default_value = "network")]
    preset: String,
}

#[derive(Args)]
struct StrategyArgs {
    /// How chart regions are located
    #[arg(long, value_enum, default_value_t = StrategyArg::Fixed)]
    strategy: StrategyArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Fixed page fractions per chart column
    Fixed,
    /// Anchored on chart titles, column from title position
    Title,
    /// Anchored on chart titles, column from left-to-right title order
    TitleRank,
}

impl From<StrategyArgs> for RegionStrategy {
    fn from(args: StrategyArgs) -> Self {
        match args.strategy {
            StrategyArg::Fixed => RegionStrategy::Fixed,
            StrategyArg::Title => RegionStrategy::TitleAnchored {
                columns: ColumnMode::Position,
            },
            StrategyArg::TitleRank => RegionStrategy::TitleAnchored {
                columns: ColumnMode::Rank,
            },
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "kpiscan=debug" } else { "kpiscan=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            input_file,
            output,
            source,
            strategy,
            debug,
            subject,
            mask,
        } => commands::extract::run(commands::extract::ExtractArgs {
            input_file,
            output_format: output,
            catalog: source.catalog,
            preset: source.preset,
            strategy: strategy.into(),
            debug,
            subject,
            mask,
        }),
        Commands::Mask {
            input_file,
            chart,
            subject,
            subject_from,
            output,
            source,
            strategy,
        } => commands::mask::run(commands::mask::MaskArgs {
            input_file,
            chart,
            subject,
            subject_from,
            output_format: output,
            catalog: source.catalog,
            preset: source.preset,
            strategy: strategy.into(),
        }),
        Commands::Codes { source } => commands::catalog::codes(source.catalog, &source.preset),
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(),
            CatalogAction::Show { preset } => commands::catalog::show(&preset),
            CatalogAction::Schema => commands::catalog::schema(),
            CatalogAction::Validate { file } => commands::catalog::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
