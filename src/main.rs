mod cli;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use listing_map::config::MapConfig;
use listing_map::feed::{FeedFetch, FeedLoader, FileFeedFetch, HttpFeedFetch};
use listing_map::map::{BoundKind, Layer, MapSession, SearchNavigator, SessionCommand};
use listing_map::models::Feed;
use listing_map::overrides::{FileSlotStore, OverrideStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, DamagedAction, ShowArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = MapConfig::load_or_default(&cli.config)?;
    if let Some(url) = cli.feed_url {
        config.feed.url = Some(url);
    }
    if let Some(path) = cli.feed_path {
        config.feed.path = Some(path);
    }

    let store = OverrideStore::open(
        FileSlotStore::new(&config.overrides.dir),
        config.overrides.namespace.clone(),
    )
    .context("Failed to open damaged list")?;

    match cli.command {
        Command::Damaged { action } => run_damaged(store, action),
        Command::Show(args) => run_show(&config, store, args).await,
    }
}

fn run_damaged(mut store: OverrideStore<FileSlotStore>, action: DamagedAction) -> Result<()> {
    match action {
        DamagedAction::List => {
            if store.is_empty() {
                println!("📋 Damaged list is empty");
                return Ok(());
            }
            println!("🗑️ Damaged listings ({}):", store.len());
            for (i, id) in store.list().iter().enumerate() {
                println!("{}. {}", i + 1, id);
            }
        }
        DamagedAction::Mark { id } => {
            if store.mark_damaged(&id)? {
                println!("✅ {} marked as damaged", id);
            } else {
                println!("⚠️ {} is already on the damaged list", id);
            }
        }
        DamagedAction::Restore { id } => {
            if store.restore(&id)? {
                println!("✅ {} restored", id);
            } else {
                println!("⚠️ {} was not on the damaged list", id);
            }
        }
    }
    Ok(())
}

async fn load_feed(config: &MapConfig) -> Result<Feed> {
    let fetch: Box<dyn FeedFetch> = match (&config.feed.path, &config.feed.url) {
        (Some(path), _) => Box::new(FileFeedFetch::new(path)),
        (None, Some(url)) => Box::new(HttpFeedFetch::new(
            url.clone(),
            Duration::from_secs(config.feed.timeout_secs),
        )?),
        (None, None) => bail!("No feed configured, pass --feed-url or --feed-path"),
    };

    match FeedLoader::new(fetch).load().await {
        Ok(feed) => Ok(feed),
        Err(err) => {
            error!("❌ Could not load map data: {}", err);
            Err(err.into())
        }
    }
}

async fn run_show(config: &MapConfig, store: OverrideStore<FileSlotStore>, args: ShowArgs) -> Result<()> {
    let feed = load_feed(config).await?;

    let zoom = args.zoom.unwrap_or(config.view.zoom);
    let mut session = MapSession::new(
        store,
        config.declutter,
        SearchNavigator::new(config.view.focus_zoom),
        zoom,
    );
    session.load(feed);

    let mut commands = vec![
        SessionCommand::SetLayerShown { layer: Layer::Active, shown: !args.hide_active },
        SessionCommand::SetLayerShown { layer: Layer::Inactive, shown: !args.hide_inactive },
        SessionCommand::SetLayerShown { layer: Layer::Damaged, shown: args.show_damaged },
        SessionCommand::SetTimeWindow(args.time),
    ];
    for (layer, bound, raw) in [
        (Layer::Active, BoundKind::Min, args.min_active),
        (Layer::Active, BoundKind::Max, args.max_active),
        (Layer::Inactive, BoundKind::Min, args.min_inactive),
        (Layer::Inactive, BoundKind::Max, args.max_inactive),
    ] {
        commands.push(SessionCommand::SetPriceBound { layer, bound, raw });
    }
    for band in args.exclude_bands_active {
        commands.push(SessionCommand::SetBandEnabled { layer: Layer::Active, band, enabled: false });
    }
    for band in args.exclude_bands_inactive {
        commands.push(SessionCommand::SetBandEnabled { layer: Layer::Inactive, band, enabled: false });
    }
    commands.push(SessionCommand::Search(args.search.unwrap_or_default()));

    let mut focus = None;
    for command in commands {
        let update = session.dispatch(command)?;
        if update.focus.is_some() {
            focus = update.focus;
        }
    }

    let stats = session.stats();
    let scan = session.scan_info();
    info!("📊 Active offers: {}", stats.active_count);
    println!("Avg price: {} zł (min {} zł, max {} zł)", stats.avg_price, stats.min_price, stats.max_price);
    println!("Last scan: {}   Next scan: {}", scan.last, scan.next);
    println!();

    println!("Price bands:");
    for band in session.catalog().bands() {
        println!("   {} {} ({})", band.color, band.label, band.key);
    }
    println!();

    for layer in Layer::ALL {
        if !session.config().is_shown(layer) {
            continue;
        }
        let visible = session.visible_in(layer);
        println!("{:?} ({}):", layer, visible.len());
        for marker in visible {
            println!(
                "   {} | {} zł | {} | {:.6},{:.6} | {}",
                marker.offer.id,
                marker.price(),
                marker.address,
                marker.position.lat,
                marker.position.lon,
                marker.offer.first_seen
            );
        }
        println!();
    }

    if let Some(focus) = focus {
        if let Some(detail) = session.detail(focus.marker) {
            println!("🔎 Focus {:.6},{:.6} @ zoom {}", focus.center.lat, focus.center.lon, focus.zoom);
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
    }

    Ok(())
}
