use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use listing_map::map::TimeWindow;

#[derive(Debug, Parser)]
#[command(name = "listing-map", about = "Filter and curate the scanned listings map")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, default_value = "listing-map.toml")]
    pub config: PathBuf,

    /// Feed URL, overrides `feed.url`
    #[arg(long, global = true)]
    pub feed_url: Option<String>,

    /// Local feed file, overrides `feed.path`
    #[arg(long, global = true)]
    pub feed_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the feed and print the markers that pass the filters
    Show(ShowArgs),
    /// Manage the local damaged list
    Damaged {
        #[command(subcommand)]
        action: DamagedAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum DamagedAction {
    List,
    Mark { id: String },
    Restore { id: String },
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// `all` or a number of days, e.g. `7`
    #[arg(long, default_value = "all")]
    pub time: TimeWindow,

    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, default_value = "")]
    pub min_active: String,
    #[arg(long, default_value = "")]
    pub max_active: String,
    #[arg(long, default_value = "")]
    pub min_inactive: String,
    #[arg(long, default_value = "")]
    pub max_inactive: String,

    /// Price band keys to hide on the active layer
    #[arg(long = "exclude-band-active")]
    pub exclude_bands_active: Vec<String>,
    /// Price band keys to hide on the inactive layer
    #[arg(long = "exclude-band-inactive")]
    pub exclude_bands_inactive: Vec<String>,

    #[arg(long)]
    pub hide_active: bool,
    #[arg(long)]
    pub hide_inactive: bool,
    #[arg(long)]
    pub show_damaged: bool,

    /// Map zoom used for declustering
    #[arg(long)]
    pub zoom: Option<f64>,
}
