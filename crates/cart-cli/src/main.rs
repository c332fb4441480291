//! Cart CLI - manage the product catalog and user carts.
//!
//! # Usage
//!
//! ```bash
//! # Add a product to the catalog
//! cart product put sku-1 12.50 --name "Mug" --discount 2.50
//!
//! # Put two mugs in alice's cart, then one more
//! cart add alice sku-1 2
//! cart inc alice sku-1
//!
//! # Show the cart as JSON
//! cart show alice --json
//! ```
//!
//! Configuration comes from `CART_DATA_DIR`, `CART_BACKEND`,
//! `CART_LOCK_STRIPES` and `CART_CATALOG_FILE`; flags override them.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cart_cli::{seed_catalog, Backend, CartChange, CartConfig, CartService};
use cart_core::{CartSummary, Decimal, PriceLookup, Product, ProductId, UserId};
use cart_store::{CartStore, Catalog, MemoryStore};

#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about = "Shopping cart store")]
struct Cli {
    /// RocksDB data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage backend (`rocksdb`, `memory`)
    #[arg(long, global = true)]
    backend: Option<Backend>,

    /// JSON catalog file loaded before the command runs
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage catalog products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Add units of a product to a cart
    Add {
        user: UserId,
        product: ProductId,
        #[arg(default_value_t = 1)]
        quantity: i64,
    },
    /// Add one unit of a product already in the cart
    Inc { user: UserId, product: ProductId },
    /// Remove one unit of a product
    Dec { user: UserId, product: ProductId },
    /// Set the quantity of a product already in the cart (0 removes it)
    Set {
        user: UserId,
        product: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product from a cart
    Rm { user: UserId, product: ProductId },
    /// Empty a cart
    Clear { user: UserId },
    /// Show a cart and its totals
    Show {
        user: UserId,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Insert or replace a product
    Put {
        id: ProductId,
        price: Decimal,
        /// Display name
        #[arg(short, long, default_value = "")]
        name: String,
        /// Per-unit discount
        #[arg(short, long)]
        discount: Option<Decimal>,
    },
    /// Show one product
    Get { id: ProductId },
    /// Remove a product
    Rm { id: ProductId },
    /// List all products
    Ls,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cart=debug,cart_cli=debug,cart_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CartConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(catalog_file) = cli.catalog_file {
        config.catalog_file = Some(catalog_file);
    }

    tracing::debug!(
        data_dir = %config.data_dir.display(),
        backend = ?config.backend,
        lock_stripes = config.lock_stripes,
        catalog_file = ?config.catalog_file,
        "Configuration loaded"
    );

    match config.backend {
        Backend::RocksDb => run_rocks(&config, cli.command),
        Backend::Memory => run(Arc::new(MemoryStore::new()), &config, cli.command),
    }
}

#[cfg(feature = "rocksdb-backend")]
fn run_rocks(config: &CartConfig, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let store = cart_store::RocksStore::open_with_stripes(&config.data_dir, config.lock_stripes)?;
    run(Arc::new(store), config, command)
}

#[cfg(not(feature = "rocksdb-backend"))]
fn run_rocks(_config: &CartConfig, _command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    Err("this build has no RocksDB support; use --backend memory".into())
}

fn run<S>(
    store: Arc<S>,
    config: &CartConfig,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: CartStore + Catalog + PriceLookup,
{
    let seeded = seed_catalog(store.as_ref(), &config.seed_products()?)?;
    if seeded > 0 {
        tracing::info!(count = seeded, "Seeded catalog");
    }

    let service = CartService::from_store(Arc::clone(&store));

    match command {
        Commands::Product { action } => run_product(store.as_ref(), action)?,
        Commands::Add {
            user,
            product,
            quantity,
        } => {
            let item = service.add_to_cart(&user, &product, quantity)?;
            println!("{} x{} = {}", item.product_id, item.quantity, item.amount);
        }
        Commands::Inc { user, product } => {
            print_change(&product, &service.increase(&user, &product)?);
        }
        Commands::Dec { user, product } => {
            print_change(&product, &service.decrease(&user, &product)?);
        }
        Commands::Set {
            user,
            product,
            quantity,
        } => {
            print_change(
                &product,
                &service.update_quantity(&user, &product, quantity)?,
            );
        }
        Commands::Rm { user, product } => {
            service.remove(&user, &product)?;
            println!("{product} removed");
        }
        Commands::Clear { user } => {
            service.clear(&user)?;
            println!("cart cleared");
        }
        Commands::Show { user, json } => {
            let summary = service.view(&user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
    }

    Ok(())
}

fn run_product<C: Catalog + ?Sized>(
    catalog: &C,
    action: ProductAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProductAction::Put {
            id,
            price,
            name,
            discount,
        } => {
            let mut product = Product::new(id, name, price);
            product.discount = discount;
            catalog.put_product(&product)?;
            println!("{} @ {}", product.id, product.discounted_price());
        }
        ProductAction::Get { id } => match catalog.get_product(&id)? {
            Some(product) => println!("{}", serde_json::to_string_pretty(&product)?),
            None => return Err(cart_core::CartError::product_not_found(&id).into()),
        },
        ProductAction::Rm { id } => {
            catalog.delete_product(&id)?;
            println!("{id} removed");
        }
        ProductAction::Ls => {
            for product in catalog.list_products()? {
                println!(
                    "{:<24} {:>10} {:>10}  {}",
                    product.id,
                    product.price,
                    product.discounted_price(),
                    product.name
                );
            }
        }
    }
    Ok(())
}

fn print_change(product: &ProductId, change: &CartChange) {
    match change {
        CartChange::Updated(item) => {
            println!("{} x{} = {}", item.product_id, item.quantity, item.amount);
        }
        CartChange::Removed => println!("{product} removed"),
        CartChange::NotInCart => println!("{product} is not in the cart"),
    }
}

fn print_summary(summary: &CartSummary) {
    if summary.is_empty() {
        println!("cart is empty");
        return;
    }
    for item in &summary.items {
        println!(
            "{:<24} {:>6} {:>12}",
            item.product_id, item.quantity, item.amount
        );
    }
    println!("{:<24} {:>6} {:>12}", "total", summary.item_count, summary.total);
}
