use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Block, Borders, Row, Table, Widget},
};

use crate::aggregator::find_lowest_price;
use crate::display::{format_price, stock_label};
use crate::domain::Listing;

pub const NO_RESULTS: &str = "검색 결과가 없습니다.";

const HEADERS: [&str; 4] = ["상점", "상품명", "가격", "재고"];
const LOWEST_MARK: &str = "★";
const FALLBACK_WIDTH: u16 = 120;
const MIN_WIDTH: u16 = 40;

/// Renders listings as bordered text tables.
///
/// Tables are laid out by ratatui into an off-screen buffer, so wide
/// (Hangul, CJK) characters keep their real column width.
pub struct TableRenderer {
    width: u16,
}

impl TableRenderer {
    pub fn new(width: u16) -> Self {
        Self {
            width: width.max(MIN_WIDTH),
        }
    }

    /// Size tables to the current terminal.
    pub fn for_terminal() -> Self {
        let width = crossterm::terminal::size()
            .map(|(cols, _)| cols)
            .unwrap_or(FALLBACK_WIDTH);
        Self::new(width)
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Results of a single-shop search.
    pub fn render_results(&self, listings: &[Listing]) -> String {
        if listings.is_empty() {
            return format!("{NO_RESULTS}\n");
        }

        let rows = listings.iter().map(|l| row_cells(l, false)).collect();
        self.render_table(&format!(" 검색 결과 ({}건) ", listings.len()), rows)
    }

    /// Results across shops, with the cheapest in-stock listing starred.
    pub fn render_comparison(&self, keyword: &str, listings: &[Listing]) -> String {
        if listings.is_empty() {
            return format!("{NO_RESULTS}\n");
        }

        let lowest = find_lowest_price(listings, true);
        let rows = listings
            .iter()
            .map(|l| row_cells(l, lowest.is_some_and(|low| std::ptr::eq(low, l))))
            .collect();

        let title = format!(" '{}' 가격 비교 ({}건) ", keyword, listings.len());
        let mut out = self.render_table(&title, rows);
        match lowest {
            Some(low) => out.push_str(&format!(
                "{LOWEST_MARK} 최저가: {} - {} ({})\n",
                format_price(low.price),
                low.product_name,
                low.shop_name
            )),
            None => out.push_str("구매 가능한 상품 중 가격 정보가 있는 상품이 없습니다.\n"),
        }
        out
    }

    fn render_table(&self, title: &str, rows: Vec<[String; 4]>) -> String {
        let shop_width = rows
            .iter()
            .map(|cells| Span::raw(cells[0].as_str()).width())
            .max()
            .unwrap_or(0)
            .clamp(4, 16) as u16;
        let widths = [
            Constraint::Length(shop_width),
            Constraint::Fill(1),
            Constraint::Length(14),
            Constraint::Length(13),
        ];

        // Buffer area must stay within u16::MAX cells.
        let per_page = (usize::from(u16::MAX) / usize::from(self.width))
            .saturating_sub(4)
            .max(1);

        let mut out = String::new();
        for page in rows.chunks(per_page) {
            // borders, header and the header's bottom margin
            let height = page.len() as u16 + 4;
            let area = Rect::new(0, 0, self.width, height);
            let mut buf = Buffer::empty(area);

            let body = page
                .iter()
                .map(|cells| Row::new(cells.iter().map(String::as_str)));
            Table::new(body, widths)
                .header(Row::new(HEADERS).bottom_margin(1))
                .column_spacing(1)
                .block(Block::default().borders(Borders::ALL).title(title))
                .render(area, &mut buf);

            out.push_str(&buffer_to_string(&buf));
        }
        out
    }
}

fn row_cells(listing: &Listing, lowest: bool) -> [String; 4] {
    let price = format_price(listing.price);
    let price = if lowest {
        format!("{LOWEST_MARK} {price}")
    } else {
        price
    };

    [
        listing.shop_name.clone(),
        listing.product_name.clone(),
        price,
        stock_label(listing.stock_status).to_string(),
    ]
}

/// Flatten a buffer into lines, skipping the filler cells behind wide glyphs.
fn buffer_to_string(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();

    for y in area.top()..area.bottom() {
        let mut line = String::new();
        let mut covered = 0;
        for x in area.left()..area.right() {
            if covered > 0 {
                covered -= 1;
                continue;
            }
            let symbol = buf[(x, y)].symbol();
            line.push_str(symbol);
            covered = Span::raw(symbol).width().saturating_sub(1);
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}
