use anyhow::{bail, Context, Result};
use catalog_browser::catalog::Catalog;
use catalog_browser::config::Config;
use catalog_browser::engine::CatalogEngine;
use catalog_browser::pipeline::ViewMode;
use catalog_browser::storefront::CartRecorder;
use catalog_browser::tui;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

struct Args {
    config: PathBuf,
    list: bool,
    seed: Option<u64>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        config: PathBuf::from("config.toml"),
        list: false,
        seed: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().context("--config needs a path")?;
                args.config = PathBuf::from(path);
            }
            "--list" => args.list = true,
            "--seed" => {
                let raw = iter.next().context("--seed needs a number")?;
                args.seed = Some(raw.parse().with_context(|| format!("invalid seed: {}", raw))?);
            }
            other => bail!("unknown argument: {}", other),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_file = std::fs::File::create("catalog-browser.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_browser=info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let args = parse_args()?;
    let mut config = Config::load_or_default(&args.config)?;
    if args.list {
        config.display.view_mode = ViewMode::List;
    }
    if args.seed.is_some() {
        config.catalog.seed = args.seed;
    }

    let mut rng = match config.catalog.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let catalog = match &config.catalog.path {
        Some(path) => {
            let mut catalog = Catalog::load(path)?;
            catalog.extend_with_variants(config.catalog.variant_copies, &mut rng);
            catalog
        }
        None => Catalog::builtin(config.catalog.variant_copies, &mut rng),
    };
    tracing::info!(
        products = catalog.products.len(),
        categories = catalog.categories.len(),
        page_size = config.pagination.page_size,
        "catalog ready"
    );

    let engine = CatalogEngine::new(catalog, &config, CartRecorder::new());
    let (state_tx, state_rx) = watch::channel(engine.state().clone());
    let (cmd_tx, cmd_rx) = mpsc::channel::<tui::TuiCommand>(64);
    let engine_task = tokio::spawn(engine.run(cmd_rx, state_tx));

    // Blocks until quit; dropping the command sender stops the engine.
    tui::run_tui(state_rx, cmd_tx).await?;

    let cart = engine_task.await.context("engine task failed")?;
    if cart.item_count() > 0 {
        println!();
        println!("  Cart: {} item(s), ${:.2}", cart.item_count(), cart.total());
        for line in cart.lines() {
            println!("    {} x {} @ ${:.2}", line.quantity, line.name, line.unit_price);
        }
        println!();
    }

    tracing::debug!("shutting down");
    Ok(())
}
