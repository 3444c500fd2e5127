pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "plaprice")]
#[command(about = "다중 상점 가격 비교 - 여러 상점에서 상품 가격을 비교합니다", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Number of shops searched concurrently (overrides the config file)
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Config file path (default: ~/.config/plaprice/config.toml)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search shops for a product
    Search {
        /// Search keyword
        keyword: String,

        /// Limit the search to these shop ids (repeatable)
        #[arg(short = 's', long = "shop")]
        shops: Vec<String>,

        /// Sort results by price, cheapest first
        #[arg(long)]
        sort: bool,

        /// Also write results to a CSV file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Print tab-separated rows for pasting into a spreadsheet
        #[arg(long)]
        tsv: bool,

        /// Open the cheapest in-stock listing in the browser
        #[arg(long)]
        open: bool,
    },
    /// Manage shops
    Shop {
        #[command(subcommand)]
        action: ShopAction,
    },
    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Try a shop's selectors with a live search
    Test {
        /// Shop id
        id: String,

        /// Keyword to search for
        #[arg(short, long, default_value = "테스트")]
        keyword: String,
    },
}

#[derive(Subcommand)]
pub enum ShopAction {
    /// List registered shops
    List,
    /// Register a new shop
    Add(AddShopArgs),
    /// Delete a shop
    Remove { id: String },
    /// Show a shop's settings
    Show { id: String },
    /// Include a shop in default searches
    Enable { id: String },
    /// Exclude a shop from default searches
    Disable { id: String },
}

#[derive(Args)]
pub struct AddShopArgs {
    /// Display name (1-50 characters)
    #[arg(short, long)]
    pub name: String,

    /// Base URL used to resolve relative product links
    #[arg(short, long)]
    pub url: String,

    /// Search URL containing {keyword}
    #[arg(short = 't', long)]
    pub search_template: String,

    /// Selector matching one product listing
    #[arg(short, long)]
    pub container: String,

    /// Product name selector ("." for the container itself)
    #[arg(long)]
    pub name_selector: String,

    /// Price selector, or a sibling expression such as "+ td + td"
    #[arg(long)]
    pub price_selector: String,

    /// Product link selector ("." for the container itself)
    #[arg(long)]
    pub link_selector: Option<String>,

    /// Stock status selector
    #[arg(long)]
    pub stock_selector: Option<String>,

    /// Text meaning "in stock" on this shop (repeatable)
    #[arg(long = "in-stock")]
    pub in_stock: Vec<String>,

    /// Text meaning "sold out" on this shop (repeatable)
    #[arg(long = "out-of-stock")]
    pub out_of_stock: Vec<String>,

    /// Skip TLS certificate verification for this shop
    #[arg(long)]
    pub no_ssl_verify: bool,

    /// Keyword encoding for the search URL, e.g. euc-kr (default UTF-8)
    #[arg(long)]
    pub keyword_encoding: Option<String>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show config and shop store locations
    Path,
    /// Write the default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Output switches shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

impl From<&Cli> for OutputOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            json: cli.json,
            quiet: cli.quiet,
        }
    }
}
