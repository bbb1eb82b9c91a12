use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, CartController, CartState, HttpStoreClient};
use shared::domain::ItemId;
use tracing_subscriber::EnvFilter;

mod render;
mod shell;

use render::{render_cart, render_inventory};

#[derive(Parser, Debug)]
#[command(name = "shop", about = "Browse the store inventory and manage the cart")]
struct Args {
    /// Overrides `store_url` from shop.toml and the environment.
    #[arg(long)]
    store_url: Option<String>,
    #[arg(long)]
    items_per_page: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Inventory {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Cart,
    /// Adds `quantity` of an item, merging with an existing cart entry.
    Add {
        id: i64,
        quantity: u32,
    },
    Remove {
        id: i64,
    },
    Checkout,
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(store_url) = args.store_url {
        settings.store_url = store_url;
    }
    if let Some(items_per_page) = args.items_per_page {
        settings.items_per_page = items_per_page;
    }

    let store = HttpStoreClient::with_timeout(&settings.store_url, settings.request_timeout())?;
    let mut controller = CartController::new(
        CartState::new(settings.items_per_page),
        Arc::new(store),
    );
    controller
        .load()
        .await
        .with_context(|| format!("failed to load store at {}", settings.store_url))?;

    match args.command {
        Command::Inventory { page } => {
            controller.change_page(page);
            print!("{}", render_inventory(controller.state()));
        }
        Command::Cart => print!("{}", render_cart(controller.state())),
        Command::Add { id, quantity } => {
            let id = ItemId(id);
            controller.stage_quantity_delta(id, i64::from(quantity));
            match controller.commit_to_cart(id).await? {
                Some(item) => println!("{} x {} in cart", item.content, item.quantity),
                None => println!("quantity must be positive; cart unchanged"),
            }
        }
        Command::Remove { id } => {
            controller.remove_from_cart(ItemId(id)).await?;
            print!("{}", render_cart(controller.state()));
        }
        Command::Checkout => {
            let removed = controller.checkout().await?;
            println!("checked out {} cart entries", removed.len());
        }
        Command::Shell => shell::run(controller).await?,
    }

    Ok(())
}
