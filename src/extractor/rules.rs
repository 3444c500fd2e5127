use scraper::{ElementRef, Selector};

use crate::domain::ShopSelectors;
use crate::extractor::ExtractError;

/// Selector value meaning "the container node itself".
pub const SELF_SELECTOR: &str = ".";

/// Where a name or link is read from, relative to a listing container.
#[derive(Debug, Clone)]
pub enum NodeSelector {
    Container,
    Descendant(Selector),
}

impl NodeSelector {
    fn compile(field: &'static str, raw: &str) -> Result<Self, ExtractError> {
        if raw.trim() == SELF_SELECTOR {
            return Ok(Self::Container);
        }
        compile_css(field, raw).map(Self::Descendant)
    }

    pub fn resolve<'a>(&self, container: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            Self::Container => Some(container),
            Self::Descendant(selector) => select_descendants(container, selector).next(),
        }
    }
}

/// Where price text is read from.
///
/// `Sibling(n)` takes the n-th following element sibling, for table rows
/// whose price cell sits next to the cell holding the listing link.
#[derive(Debug, Clone)]
pub enum PriceSelector {
    Sibling(usize),
    Descendant(Selector),
}

impl PriceSelector {
    fn compile(raw: &str) -> Result<Self, ExtractError> {
        let trimmed = raw.trim_start();
        if trimmed.starts_with(['+', '~']) {
            let hops = trimmed.chars().filter(|c| matches!(c, '+' | '~')).count();
            return Ok(Self::Sibling(hops));
        }
        compile_css("product_price", raw).map(Self::Descendant)
    }
}

/// A shop's selectors, parsed once per search.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub container: Selector,
    pub name: NodeSelector,
    pub price: PriceSelector,
    pub link: Option<NodeSelector>,
    pub stock: Option<Selector>,
}

impl ExtractionRules {
    pub fn compile(selectors: &ShopSelectors) -> Result<Self, ExtractError> {
        let link = match non_blank(selectors.product_link.as_deref()) {
            Some(raw) => Some(NodeSelector::compile("product_link", raw)?),
            None => None,
        };
        let stock = match non_blank(selectors.stock_status.as_deref()) {
            Some(raw) => Some(compile_css("stock_status", raw)?),
            None => None,
        };

        Ok(Self {
            container: compile_css("product_container", &selectors.product_container)?,
            name: NodeSelector::compile("product_name", &selectors.product_name)?,
            price: PriceSelector::compile(&selectors.product_price)?,
            link,
            stock,
        })
    }
}

/// Elements below `scope` matching `selector`, in document order.
pub(crate) fn select_descendants<'a, 'b>(
    scope: ElementRef<'a>,
    selector: &'b Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    let scope_id = scope.id();
    scope.select(selector).filter(move |el| el.id() != scope_id)
}

fn compile_css(field: &'static str, raw: &str) -> Result<Selector, ExtractError> {
    Selector::parse(raw).map_err(|e| ExtractError::InvalidSelector {
        field,
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}
