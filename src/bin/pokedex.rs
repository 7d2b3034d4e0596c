use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use pokedex_engine::app::Pokedex;
use pokedex_engine::catalog::CatalogHttpClient;
use pokedex_engine::config::{ConfigLoader, ResolvedConfig};
use pokedex_engine::domain::{SortKey, TypeFilter, ViewCriteria, display_name};
use pokedex_engine::error::DexError;
use pokedex_engine::output::{JsonOutput, ListResult, OutputMode, TextOutput, ToggleResult};
use pokedex_engine::store::FileStore;

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Browse, filter and favourite creatures from a remote catalog")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<String>,

    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Load the catalog and list matching creatures")]
    List(ListArgs),
    #[command(about = "Show one creature with its evolution lineage")]
    Show(ShowArgs),
    #[command(about = "Toggle a creature in favourites", alias = "fav")]
    Favourite(FavouriteArgs),
    #[command(about = "List favourites")]
    Favourites,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    offset: Option<u32>,

    #[arg(long)]
    limit: Option<u32>,

    #[arg(long, default_value = "")]
    search: String,

    #[arg(long = "type", default_value = "all")]
    type_filter: String,

    #[arg(long, value_enum, default_value_t = SortKey::ById)]
    sort: SortKey,

    #[arg(long)]
    favourites: bool,
}

#[derive(Args)]
struct ShowArgs {
    name: String,
}

#[derive(Args)]
struct FavouriteArgs {
    name: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        if let Some(dex) = report.downcast_ref::<DexError>() {
            return ExitCode::from(map_exit_code(dex));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &DexError) -> u8 {
    match error {
        DexError::NotFound(_) => 2,
        DexError::ConfigRead(_) | DexError::ConfigParse(_) | DexError::InvalidConfig(_) => 2,
        DexError::InvalidTypeFilter(_) => 2,
        err if err.is_upstream() => 3,
        _ => 1,
    }
}

async fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let catalog = CatalogHttpClient::new(&config.base_url, config.timeout)?;
    let store = Arc::new(FileStore::new_with_root(config.data_dir.clone()));
    let dex = Pokedex::open(catalog, store).await;

    let result = match cli.command {
        Commands::List(args) => run_list(&dex, &config, args, output_mode).await,
        Commands::Show(args) => run_show(&dex, args, output_mode).await,
        Commands::Favourite(args) => run_favourite(&dex, args, output_mode),
        Commands::Favourites => run_favourites(&dex, output_mode),
    };
    dex.favourites().flush().await;
    result
}

async fn run_list(
    dex: &Pokedex<CatalogHttpClient, FileStore>,
    config: &ResolvedConfig,
    args: ListArgs,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let type_filter: TypeFilter = args.type_filter.parse()?;
    let criteria = ViewCriteria::new(args.search, type_filter, args.sort);
    let offset = args.offset.unwrap_or(config.page_offset);
    let limit = args.limit.unwrap_or(config.page_limit);

    let outcome = dex.reload(offset, limit).await?;
    tracing::debug!(?outcome, "collection loaded");

    let records = if args.favourites {
        dex.favourites_view(&criteria)
    } else {
        dex.view(&criteria)
    }
    .unwrap_or_default();

    let result = ListResult {
        criteria: &criteria,
        dropped_count: outcome.dropped,
        records: &records,
    };
    match output_mode {
        OutputMode::Json => JsonOutput::print_list(&result).into_diagnostic()?,
        OutputMode::Text => {
            TextOutput::print_list(&result, &dex.favourites().snapshot()).into_diagnostic()?
        }
    }
    Ok(())
}

async fn run_show(
    dex: &Pokedex<CatalogHttpClient, FileStore>,
    args: ShowArgs,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let view = dex.open_detail(&args.name).await?;
    match output_mode {
        OutputMode::Json => JsonOutput::print_detail(&view).into_diagnostic()?,
        OutputMode::Text => TextOutput::print_detail(&view).into_diagnostic()?,
    }
    Ok(())
}

fn run_favourite(
    dex: &Pokedex<CatalogHttpClient, FileStore>,
    args: FavouriteArgs,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let name = display_name(&args.name.trim().to_lowercase());
    let favourites = dex.toggle_favourite(&name);
    let result = ToggleResult {
        name: &name,
        favourite: favourites.contains(&name),
        favourites: &favourites,
    };
    match output_mode {
        OutputMode::Json => JsonOutput::print_toggle(&result).into_diagnostic()?,
        OutputMode::Text => TextOutput::print_toggle(&result).into_diagnostic()?,
    }
    Ok(())
}

fn run_favourites(
    dex: &Pokedex<CatalogHttpClient, FileStore>,
    output_mode: OutputMode,
) -> miette::Result<()> {
    let favourites = dex.favourites().snapshot();
    match output_mode {
        OutputMode::Json => JsonOutput::print_favourites(&favourites).into_diagnostic()?,
        OutputMode::Text => TextOutput::print_favourites(&favourites).into_diagnostic()?,
    }
    Ok(())
}
