use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::aggregator::{crawl_shop, find_lowest_price};
use crate::app::{AppContext, PlapriceError, Result};
use crate::cli::{AddShopArgs, OutputOptions};
use crate::config::Config;
use crate::display::{self, TableRenderer};
use crate::domain::{normalize_keyword, Shop, ShopSelectors, StockPatterns};
use crate::store::Store;

const TEST_PREVIEW_LIMIT: usize = 5;

/// Presentation switches for `search`.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub sort: bool,
    pub export: Option<PathBuf>,
    pub tsv: bool,
    pub open: bool,
}

pub async fn search(
    ctx: &AppContext,
    keyword: &str,
    shop_ids: &[String],
    args: &SearchArgs,
    out: OutputOptions,
) -> Result<()> {
    let keyword = normalize_keyword(keyword)?;
    let shops = ctx.target_shops(shop_ids)?;

    if shops.is_empty() {
        println!("등록된 상점이 없습니다. 'plaprice shop add'로 상점을 추가하세요.");
        return Ok(());
    }

    if !out.quiet {
        eprintln!("'{}' 검색 중... ({}개 상점)", keyword, shops.len());
    }

    let cancel = CancellationToken::new();
    let listener = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let outcome = ctx
        .aggregator
        .search_until_cancelled(&shops, &keyword, &cancel)
        .await;
    listener.abort();

    let Some(outcome) = outcome else {
        eprintln!("검색이 취소되었습니다.");
        return Ok(());
    };

    let listings = if args.sort {
        outcome.sorted_by_price()
    } else {
        outcome.listings.clone()
    };

    if out.json {
        println!("{}", display::outcome_to_json(&listings, &outcome)?);
    } else if args.tsv {
        print!("{}", display::to_tab_separated(&listings));
    } else {
        let renderer = TableRenderer::for_terminal();
        if shops.len() > 1 {
            print!("{}", renderer.render_comparison(&keyword, &listings));
        } else {
            print!("{}", renderer.render_results(&listings));
        }
    }

    if !out.json {
        for error in &outcome.errors {
            eprintln!("오류: {}", error);
        }
    }

    if let Some(path) = &args.export {
        display::export_csv(path, &listings)?;
        if !out.quiet {
            eprintln!("{}개 상품을 저장했습니다: {}", listings.len(), path.display());
        }
    }

    if args.open {
        match find_lowest_price(&listings, true).and_then(|l| l.product_url.as_deref()) {
            Some(url) => open::that(url)?,
            None => eprintln!("열 수 있는 최저가 상품 링크가 없습니다."),
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ShopSummary<'a> {
    id: &'a str,
    name: &'a str,
    base_url: &'a str,
    enabled: bool,
}

pub fn list_shops(ctx: &AppContext, out: OutputOptions) -> Result<()> {
    let shops = ctx.store.list_shops()?;

    if out.json {
        let summaries: Vec<_> = shops
            .iter()
            .map(|s| ShopSummary {
                id: &s.id,
                name: &s.name,
                base_url: &s.base_url,
                enabled: s.enabled,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if shops.is_empty() {
        println!("등록된 상점이 없습니다.");
        return Ok(());
    }

    for shop in shops {
        let status = if shop.enabled { "활성" } else { "비활성" };
        println!("{} [{}]\n  ID: {}\n  {}", shop.name, status, shop.id, shop.base_url);
    }

    Ok(())
}

pub fn add_shop(ctx: &AppContext, args: AddShopArgs, out: OutputOptions) -> Result<Shop> {
    let mut selectors = ShopSelectors::new(args.container, args.name_selector, args.price_selector);
    selectors.product_link = args.link_selector;
    selectors.stock_status = args.stock_selector;

    let mut shop = Shop::new(args.name, args.url, args.search_template, selectors);
    let patterns = StockPatterns {
        in_stock: args.in_stock,
        out_of_stock: args.out_of_stock,
    };
    if !patterns.is_empty() {
        shop.stock_patterns = Some(patterns);
    }
    shop.verify_ssl = !args.no_ssl_verify;
    shop.keyword_encoding = args.keyword_encoding;

    ctx.store.add_shop(&shop)?;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&shop)?);
    } else {
        println!("상점이 추가되었습니다: {} (ID: {})", shop.name, shop.id);
    }
    Ok(shop)
}

pub fn remove_shop(ctx: &AppContext, id: &str) -> Result<()> {
    let shop = find_shop(ctx, id)?;
    ctx.store.remove_shop(id)?;
    println!("상점이 삭제되었습니다: {}", shop.name);
    Ok(())
}

pub fn show_shop(ctx: &AppContext, id: &str, out: OutputOptions) -> Result<()> {
    let shop = find_shop(ctx, id)?;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&shop)?);
        return Ok(());
    }

    println!("{}", shop.name);
    println!("  ID: {}", shop.id);
    println!("  URL: {}", shop.base_url);
    println!("  검색 템플릿: {}", shop.search_url_template);
    println!("  상태: {}", if shop.enabled { "활성" } else { "비활성" });
    if !shop.verify_ssl {
        println!("  SSL 검증: 사용 안 함");
    }
    if let Some(encoding) = &shop.keyword_encoding {
        println!("  키워드 인코딩: {}", encoding);
    }

    let selectors = &shop.selectors;
    println!("\n  선택자:");
    println!("    컨테이너: {}", selectors.product_container);
    println!("    상품명: {}", selectors.product_name);
    println!("    가격: {}", selectors.product_price);
    if let Some(link) = &selectors.product_link {
        println!("    링크: {}", link);
    }
    if let Some(stock) = &selectors.stock_status {
        println!("    재고: {}", stock);
    }

    if let Some(patterns) = &shop.stock_patterns {
        println!("\n  재고 패턴:");
        println!("    재고 있음: {}", patterns.in_stock.join(", "));
        println!("    품절: {}", patterns.out_of_stock.join(", "));
    }

    Ok(())
}

pub fn set_shop_enabled(ctx: &AppContext, id: &str, enabled: bool) -> Result<()> {
    let shop = find_shop(ctx, id)?;
    ctx.store.set_enabled(id, enabled)?;
    let status = if enabled { "활성화" } else { "비활성화" };
    println!("상점이 {}되었습니다: {}", status, shop.name);
    Ok(())
}

pub fn show_paths(config_path: &Path, config: &Config) -> Result<()> {
    println!("설정 파일: {}", config_path.display());
    println!("상점 목록: {}", config.store_path()?.display());
    Ok(())
}

pub fn init_config(config_path: &Path, force: bool) -> Result<()> {
    if Config::write_default(config_path, force)? {
        println!("설정 파일을 만들었습니다: {}", config_path.display());
    } else {
        println!(
            "설정 파일이 이미 있습니다: {} (덮어쓰려면 --force)",
            config_path.display()
        );
    }
    Ok(())
}

/// Crawl one shop and preview what its selectors pick up.
pub async fn test_shop(
    ctx: &AppContext,
    id: &str,
    keyword: &str,
    out: OutputOptions,
) -> Result<usize> {
    let shop = find_shop(ctx, id)?;
    let keyword = normalize_keyword(keyword)?;

    if !out.quiet {
        eprintln!("'{}'로 {} 테스트 중...", keyword, shop.name);
    }

    let listings = crawl_shop(
        ctx.fetcher.as_ref(),
        &shop,
        &keyword,
        ctx.config.http.timeout(),
    )
    .await?;

    let preview = &listings[..listings.len().min(TEST_PREVIEW_LIMIT)];
    if out.json {
        println!("{}", display::to_json(preview)?);
    } else {
        println!("✓ 크롤링 성공! {}개 상품 발견", listings.len());
        if !preview.is_empty() {
            print!("{}", TableRenderer::for_terminal().render_results(preview));
        }
    }

    Ok(listings.len())
}

fn find_shop(ctx: &AppContext, id: &str) -> Result<Shop> {
    ctx.store
        .get_shop(id)?
        .ok_or_else(|| PlapriceError::ShopNotFound(id.to_string()))
}
