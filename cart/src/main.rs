//! Cart command-line demo
//!
//! Drives a file-backed cart so the write-through behavior can be seen
//! across process restarts:
//!
//! ```text
//! cart add 1 "Coffee mug" 12.50 https://example.com/mug.png
//! cart inc 1
//! cart list
//! cart dec 1
//! ```

use go_marketplace_cart::{
    CartConfig, CartEnvironment, CartError, CartProvider, FileStorage, Product, ProductId,
    metrics::describe_cart_metrics, use_cart,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: cart list | add <id> <title> <price> [image_url] | inc <id> | dec <id>";

/// A parsed command line
enum Command {
    List,
    Add(Product),
    Increment(ProductId),
    Decrement(ProductId),
}

impl Command {
    fn parse(args: &[String]) -> Result<Self, String> {
        match args {
            [] => Ok(Self::List),
            [cmd] if cmd == "list" => Ok(Self::List),
            [cmd, id, title, price, rest @ ..] if cmd == "add" && rest.len() <= 1 => {
                let price = price
                    .parse()
                    .map_err(|e| format!("invalid price {price:?}: {e}"))?;
                let image_url = rest.first().cloned().unwrap_or_default();
                Ok(Self::Add(Product::new(id.as_str(), title.as_str(), image_url, price)))
            },
            [cmd, id] if cmd == "inc" => Ok(Self::Increment(id.as_str().into())),
            [cmd, id] if cmd == "dec" => Ok(Self::Decrement(id.as_str().into())),
            _ => Err(USAGE.to_string()),
        }
    }

    async fn run(self) -> Result<(), CartError> {
        let cart = use_cart();

        match self {
            Self::List => {},
            Self::Add(product) => cart.add_to_cart(product).await?,
            Self::Increment(id) => cart.increment(&id).await?,
            Self::Decrement(id) => cart.decrement(&id).await?,
        }

        let state = cart.state().await;
        if state.products.is_empty() {
            println!("Cart is empty");
        }
        for item in &state.products {
            println!(
                "{:>3} x {:<30} {:>10.2}  [{}]",
                item.quantity,
                item.title,
                item.subtotal(),
                item.id
            );
        }
        println!("Total: {:.2} ({} units)", state.total_price(), state.total_quantity());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let config = CartConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    describe_cart_metrics();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        },
    };

    tracing::debug!(dir = %config.storage_dir.display(), key = %config.storage_key, "Opening cart");
    let env = CartEnvironment::new(Arc::new(FileStorage::new(&config.storage_dir)));
    let provider = CartProvider::open(env, &config).await;

    let result = provider.provide(command.run()).await;

    if let Err(error) = provider.cart().shutdown().await {
        tracing::warn!(error = %error, "Cart did not shut down cleanly");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        },
    }
}
