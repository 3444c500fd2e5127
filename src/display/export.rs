use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::aggregator::{CrawlError, SearchOutcome};
use crate::app::Result;
use crate::display::{format_price, stock_export_label};
use crate::domain::{Listing, StockStatus};

const CSV_HEADER: [&str; 5] = ["상점", "상품명", "가격", "재고", "URL"];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Public JSON shape of a listing.
#[derive(Debug, Serialize)]
pub struct ListingView<'a> {
    pub shop_id: &'a str,
    pub shop_name: &'a str,
    pub product_name: &'a str,
    pub price: Option<u64>,
    pub stock_status: StockStatus,
    pub product_url: Option<&'a str>,
}

impl<'a> From<&'a Listing> for ListingView<'a> {
    fn from(listing: &'a Listing) -> Self {
        Self {
            shop_id: &listing.shop_id,
            shop_name: &listing.shop_name,
            product_name: &listing.product_name,
            price: listing.price,
            stock_status: listing.stock_status,
            product_url: listing.product_url.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ErrorView<'a> {
    shop_id: &'a str,
    shop_name: &'a str,
    error: String,
}

impl<'a> From<&'a CrawlError> for ErrorView<'a> {
    fn from(error: &'a CrawlError) -> Self {
        Self {
            shop_id: &error.shop_id,
            shop_name: &error.shop_name,
            error: error.cause.to_string(),
        }
    }
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    listings: Vec<ListingView<'a>>,
    errors: Vec<ErrorView<'a>>,
}

pub fn to_json(listings: &[Listing]) -> Result<String> {
    let views: Vec<ListingView> = listings.iter().map(ListingView::from).collect();
    Ok(serde_json::to_string_pretty(&views)?)
}

/// `{"listings": [...], "errors": [...]}` for `--json` output.
pub fn outcome_to_json(listings: &[Listing], outcome: &SearchOutcome) -> Result<String> {
    let view = OutcomeView {
        listings: listings.iter().map(ListingView::from).collect(),
        errors: outcome.errors.iter().map(ErrorView::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&view)?)
}

/// Write listings as CSV. Prices are plain integers so spreadsheets can sum them.
pub fn write_csv<W: Write>(writer: W, listings: &[Listing]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for listing in listings {
        let price = listing.price.map(|p| p.to_string()).unwrap_or_default();
        csv.write_record([
            listing.shop_name.as_str(),
            listing.product_name.as_str(),
            price.as_str(),
            stock_export_label(listing.stock_status),
            listing.product_url.as_deref().unwrap_or(""),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Write a CSV file with a UTF-8 BOM so spreadsheet apps detect the encoding.
pub fn export_csv(path: &Path, listings: &[Listing]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;
    write_csv(file, listings)?;
    tracing::info!("Exported {} listings to {}", listings.len(), path.display());
    Ok(())
}

/// Tab-separated text for pasting into a spreadsheet.
pub fn to_tab_separated(listings: &[Listing]) -> String {
    let mut out = CSV_HEADER.join("\t");
    out.push('\n');

    for listing in listings {
        let price = format_price(listing.price);
        let fields = [
            listing.shop_name.as_str(),
            listing.product_name.as_str(),
            price.as_str(),
            stock_export_label(listing.stock_status),
            listing.product_url.as_deref().unwrap_or(""),
        ];
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
    out
}
