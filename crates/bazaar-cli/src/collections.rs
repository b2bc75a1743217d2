//! Cart and wishlist command handlers.
//!
//! Each invocation opens a store over the configured [`FileStore`] and, if
//! `BAZAAR_API_BASE_URL` is set, the remote collection API. A remote
//! failure during the command switches that store to local fallback; the
//! footer reports which backend answered.

use std::sync::Arc;

use anyhow::Context;
use bazaar_catalog::CatalogDataset;
use bazaar_core::{AppConfig, CatalogKind, ItemDraft, LineItem};
use bazaar_store::{
    CartStore, CollectionKind, CollectionStore, FileStore, RemoteCollectionClient, WishlistStore,
};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;

/// Item fields accepted by `add`.
#[derive(Debug, Args)]
pub struct ItemArgs {
    /// Product id
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub price: Option<Decimal>,
    #[arg(long)]
    pub image_url: Option<String>,
    /// Seller or channel label
    #[arg(long)]
    pub source: Option<String>,
    /// Fill in title, price and seller from the catalog dataset entry of
    /// this kind with the same id
    #[arg(long, value_name = "KIND")]
    pub from_catalog: Option<CatalogKind>,
}

/// Sub-commands available under `cart`.
#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// Show the cart
    List,
    /// Add an item, summing quantities with an existing entry
    Add {
        #[command(flatten)]
        item: ItemArgs,
        #[arg(long, default_value = "1")]
        quantity: i64,
    },
    /// Set an item's quantity; zero or less removes it
    Update {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove an item
    Remove { id: String },
}

/// Sub-commands available under `wishlist`.
#[derive(Debug, Subcommand)]
pub enum WishlistCommands {
    /// Show the wishlist
    List,
    /// Add an item; adding it again changes nothing
    Add {
        #[command(flatten)]
        item: ItemArgs,
    },
    /// Remove an item
    Remove { id: String },
}

pub(crate) async fn run_cart(config: &AppConfig, command: CartCommands) -> anyhow::Result<()> {
    let store: CartStore = open_store(config)?;
    let items = match command {
        CartCommands::List => store.fetch_all().await?,
        CartCommands::Add { item, quantity } => {
            let draft = build_draft(config, item)?.with_quantity(quantity);
            store.add(draft).await?
        }
        CartCommands::Update { id, quantity } => {
            store.update_quantity(ItemDraft::new(id), quantity).await?
        }
        CartCommands::Remove { id } => store.remove(ItemDraft::new(id)).await?,
    };
    print_items(&items, true);
    print_footer(&store);
    Ok(())
}

pub(crate) async fn run_wishlist(
    config: &AppConfig,
    command: WishlistCommands,
) -> anyhow::Result<()> {
    let store: WishlistStore = open_store(config)?;
    let items = match command {
        WishlistCommands::List => store.fetch_all().await?,
        WishlistCommands::Add { item } => store.add(build_draft(config, item)?).await?,
        WishlistCommands::Remove { id } => store.remove(ItemDraft::new(id)).await?,
    };
    print_items(&items, false);
    print_footer(&store);
    Ok(())
}

fn open_store<K: CollectionKind>(config: &AppConfig) -> anyhow::Result<CollectionStore<K>> {
    let local = FileStore::open(&config.local_store_dir).with_context(|| {
        format!(
            "failed to open local store at {}",
            config.local_store_dir.display()
        )
    })?;
    let remote = RemoteCollectionClient::from_app_config(config)?;
    if remote.is_none() {
        tracing::debug!(collection = K::NAME, "no remote configured; using local store");
    }
    Ok(CollectionStore::new(remote, Arc::new(local)))
}

/// Turns `add` arguments into a draft. Explicit flags win over catalog
/// values.
pub(crate) fn build_draft(config: &AppConfig, args: ItemArgs) -> anyhow::Result<ItemDraft> {
    let mut draft = match args.from_catalog {
        Some(kind) => {
            let dataset = CatalogDataset::load(&config.catalog_path)?;
            let entity = dataset
                .entities(kind)
                .iter()
                .find(|e| e.id == args.id)
                .ok_or_else(|| anyhow::anyhow!("{kind} entity '{}' not found", args.id))?;
            ItemDraft::from(entity)
        }
        None => ItemDraft::new(args.id),
    };
    if let Some(title) = args.title {
        draft = draft.with_title(title);
    }
    if let Some(price) = args.price {
        draft = draft.with_price(price);
    }
    if let Some(image_url) = args.image_url {
        draft = draft.with_image_url(image_url);
    }
    if let Some(source) = args.source {
        draft = draft.with_source(source);
    }
    Ok(draft)
}

fn print_items(items: &[LineItem], with_quantity: bool) {
    if items.is_empty() {
        println!("(empty)");
        return;
    }

    if with_quantity {
        println!(
            "{:<16}{:<32}{:>5}{:>12}{:>12}  SOURCE",
            "ID", "TITLE", "QTY", "PRICE", "TOTAL"
        );
    } else {
        println!("{:<16}{:<32}{:>12}  SOURCE", "ID", "TITLE", "PRICE");
    }

    let mut grand_total = Decimal::ZERO;
    for item in items {
        let title = truncate(&item.title, 30);
        if with_quantity {
            let total = item.line_total();
            grand_total += total;
            println!(
                "{:<16}{:<32}{:>5}{:>12}{:>12}  {}",
                item.id,
                title,
                item.quantity,
                item.price.round_dp(2),
                total.round_dp(2),
                item.source
            );
        } else {
            println!(
                "{:<16}{:<32}{:>12}  {}",
                item.id,
                title,
                item.price.round_dp(2),
                item.source
            );
        }
    }

    if with_quantity {
        println!("{:>65}", grand_total.round_dp(2));
    }
}

fn print_footer<K: CollectionKind>(store: &CollectionStore<K>) {
    println!("{} item(s), backend: {}", store.snapshot().len(), store.mode());
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars - 3).collect::<String>())
    } else {
        text.to_owned()
    }
}
