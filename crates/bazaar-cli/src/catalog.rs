//! Catalog command handlers.

use std::sync::Arc;

use bazaar_catalog::{
    CatalogClient, CatalogDataset, CatalogError, CatalogQueryEngine, QueryParams, QueryResult,
    DEFAULT_PAGE_SIZE,
};
use bazaar_core::{AppConfig, CatalogKind, FacetBucket};
use clap::Subcommand;
use rust_decimal::Decimal;

/// Sub-commands available under `catalog`.
#[derive(Debug, Subcommand)]
pub enum CatalogCommands {
    /// Filter the catalog and show facet counts
    Query {
        /// `studios` or `materials`
        kind: CatalogKind,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        style: Option<String>,
        /// Seller id or name
        #[arg(long)]
        seller: Option<String>,
        #[arg(long)]
        min_price: Option<Decimal>,
        #[arg(long)]
        max_price: Option<Decimal>,
        /// Tags that must all be present (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Attribute filter as `code=value[,value...]`; repeatable
        #[arg(long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, Vec<String>)>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
}

pub(crate) async fn run_catalog(
    config: &AppConfig,
    command: CatalogCommands,
) -> anyhow::Result<()> {
    let CatalogCommands::Query {
        kind,
        search,
        category,
        tag,
        style,
        seller,
        min_price,
        max_price,
        tags,
        attributes,
        page,
        page_size,
        json,
    } = command;

    let mut params = QueryParams::new(kind)
        .with_price(min_price, max_price)
        .with_tags(tags)
        .with_page(page, page_size);
    params.search = search;
    params.category = category;
    params.tag = tag;
    params.style = style;
    params.seller = seller;
    for (code, values) in attributes {
        params = params.with_attribute(code, values);
    }

    let remote = CatalogClient::from_app_config(config)?;
    let dataset = load_dataset(config, remote.is_some())?;
    let engine = CatalogQueryEngine::new(remote, Arc::new(dataset));
    let result = engine.query(&params).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

/// Loads the fallback dataset. A missing file is tolerated when a remote
/// catalog is configured, since the dataset is then only a fallback.
fn load_dataset(config: &AppConfig, has_remote: bool) -> anyhow::Result<CatalogDataset> {
    match CatalogDataset::load(&config.catalog_path) {
        Ok(dataset) => Ok(dataset),
        Err(CatalogError::DatasetIo { path, source }) if has_remote => {
            tracing::warn!(
                path = %path,
                error = %source,
                "fallback catalog dataset unavailable; remote failures will return empty results"
            );
            Ok(CatalogDataset::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parses `code=value[,value...]`.
pub(crate) fn parse_attribute(raw: &str) -> Result<(String, Vec<String>), String> {
    let (code, values) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected code=value[,value...], got \"{raw}\""))?;
    let code = code.trim();
    if code.is_empty() {
        return Err("attribute code must be non-empty".to_string());
    }
    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect();
    Ok((code.to_owned(), values))
}

fn print_result(result: &QueryResult) {
    println!(
        "{} match(es), page {} of size {} (answered by {:?})",
        result.total, result.page, result.page_size, result.source
    );
    println!();

    if result.items.is_empty() {
        println!("(no items on this page)");
    } else {
        println!("{:<16}{:<36}{:>22}", "ID", "TITLE", "PRICE");
        for entity in &result.items {
            let price = entity.price_bounds().map_or_else(
                || "-".to_string(),
                |b| {
                    if b.min == b.max {
                        b.min.round_dp(2).to_string()
                    } else {
                        format!("{} - {}", b.min.round_dp(2), b.max.round_dp(2))
                    }
                },
            );
            println!("{:<16}{:<36}{:>22}", entity.id, entity.title, price);
        }
    }

    let facets = &result.facets;
    println!();
    print_buckets("categories", &facets.categories);
    print_buckets("tags", &facets.tags);
    print_buckets("styles", &facets.styles);
    print_buckets("sellers", &facets.sellers);
    for attribute in &facets.attributes {
        let values: Vec<String> = attribute
            .values
            .iter()
            .map(|v| format!("{} ({})", v.value, v.count))
            .collect();
        let label = if attribute.label.is_empty() {
            &attribute.code
        } else {
            &attribute.label
        };
        println!("{label:<12}{}", values.join(", "));
    }
    println!(
        "{:<12}{} - {} {}",
        "price",
        facets.price_range.min.round_dp(2),
        facets.price_range.max.round_dp(2),
        facets.currency
    );
}

fn print_buckets(name: &str, buckets: &[FacetBucket]) {
    if buckets.is_empty() {
        return;
    }
    let rendered: Vec<String> = buckets
        .iter()
        .map(|b| format!("{} ({})", b.name, b.count))
        .collect();
    println!("{name:<12}{}", rendered.join(", "));
}
