use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plaprice::app::AppContext;
use plaprice::cli::commands::{self, SearchArgs};
use plaprice::cli::{Cli, Commands, ConfigAction, OutputOptions, ShopAction};
use plaprice::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for tables and JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plaprice=warn")),
        )
        .init();

    let cli = Cli::parse();
    let out = OutputOptions::from(&cli);

    let config_path = match &cli.config_file {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };

    // Must work even when the existing file doesn't parse
    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        commands::init_config(&config_path, *force)?;
        return Ok(());
    }

    let mut config = Config::load_from(&config_path)?;
    if let Some(workers) = cli.workers {
        config.search.workers = workers;
    }

    if let Commands::Config {
        action: ConfigAction::Path,
    } = &cli.command
    {
        commands::show_paths(&config_path, &config)?;
        return Ok(());
    }

    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Search {
            keyword,
            shops,
            sort,
            export,
            tsv,
            open,
        } => {
            let args = SearchArgs {
                sort,
                export,
                tsv,
                open,
            };
            commands::search(&ctx, &keyword, &shops, &args, out).await?;
        }
        Commands::Shop { action } => match action {
            ShopAction::List => commands::list_shops(&ctx, out)?,
            ShopAction::Add(args) => {
                commands::add_shop(&ctx, args, out)?;
            }
            ShopAction::Remove { id } => commands::remove_shop(&ctx, &id)?,
            ShopAction::Show { id } => commands::show_shop(&ctx, &id, out)?,
            ShopAction::Enable { id } => commands::set_shop_enabled(&ctx, &id, true)?,
            ShopAction::Disable { id } => commands::set_shop_enabled(&ctx, &id, false)?,
        },
        Commands::Test { id, keyword } => {
            commands::test_shop(&ctx, &id, &keyword, out).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
