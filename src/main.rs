use std::fs;
use std::io::{self, Read};

use clap::{Args, Parser, Subcommand};
use planogram::collision::{HighlightMap, resolve_collisions};
use planogram::config::{
    ConfigError, ENV_COLLISION_MARGIN, ENV_COLLISION_MARGIN_ABOVE, ENV_PASTE_OFFSET, ENV_PRODUCT_X_TOLERANCE,
    ENV_PRODUCT_Y_TOLERANCE, ENV_SHELF_TOP_OFFSET, ENV_SHELF_Y_TOLERANCE, ENV_STACK_GAP, PlacementConfig,
};
use planogram::geometry::{Point, Rect};
use planogram::placement::{
    apply_product_placement, apply_shelf_placement, resolve_product_placement, resolve_shelf_placement,
};
use planogram::scene::{Product, SceneError, SceneSnapshot, SceneStore};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read scene from {path}: {source}")]
    ReadScene { path: String, source: io::Error },
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("product not found: {0}")]
    UnknownProduct(Uuid),
    #[error("shelf not found: {0}")]
    UnknownShelf(Uuid),
    #[error("store rejected the placement for {0}")]
    Rejected(Uuid),
}

#[derive(Parser, Debug)]
#[command(name = "planogram", about = "Resolve planogram drops against a scene snapshot")]
struct Cli {
    #[arg(long, default_value = "-", help = "Scene snapshot JSON file, or - for stdin")]
    scene: String,

    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

/// Placement tunables. Each falls back to its environment variable, then
/// to the built-in default.
#[derive(Args, Debug)]
struct ConfigArgs {
    #[arg(long, env = "PLANOGRAM_SHELF_Y_TOLERANCE")]
    shelf_y_tolerance: Option<String>,
    #[arg(long, env = "PLANOGRAM_PRODUCT_Y_TOLERANCE")]
    product_y_tolerance: Option<String>,
    #[arg(long, env = "PLANOGRAM_PRODUCT_X_TOLERANCE")]
    product_x_tolerance: Option<String>,
    #[arg(long, env = "PLANOGRAM_STACK_GAP")]
    stack_gap: Option<String>,
    #[arg(long, env = "PLANOGRAM_SHELF_TOP_OFFSET")]
    shelf_top_offset: Option<String>,
    #[arg(long, env = "PLANOGRAM_COLLISION_MARGIN")]
    collision_margin: Option<String>,
    #[arg(long, env = "PLANOGRAM_COLLISION_MARGIN_ABOVE")]
    collision_margin_above: Option<String>,
    #[arg(long, env = "PLANOGRAM_PASTE_OFFSET")]
    paste_offset: Option<String>,
}

impl ConfigArgs {
    fn lookup(&self, var: &str) -> Option<String> {
        let value = match var {
            ENV_SHELF_Y_TOLERANCE => &self.shelf_y_tolerance,
            ENV_PRODUCT_Y_TOLERANCE => &self.product_y_tolerance,
            ENV_PRODUCT_X_TOLERANCE => &self.product_x_tolerance,
            ENV_STACK_GAP => &self.stack_gap,
            ENV_SHELF_TOP_OFFSET => &self.shelf_top_offset,
            ENV_COLLISION_MARGIN => &self.collision_margin,
            ENV_COLLISION_MARGIN_ABOVE => &self.collision_margin_above,
            ENV_PASTE_OFFSET => &self.paste_offset,
            _ => return None,
        };
        value.clone()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve where a product lands when released at --x/--y (its top-left).
    PlaceProduct(PlaceArgs),
    /// Resolve where a shelf lands when released at --x/--y (its top-left).
    PlaceShelf(PlaceArgs),
    /// Report which products a product would overlap at --x/--y, and the fill
    /// each other product is drawn with.
    Collisions(ProbeArgs),
}

#[derive(Args, Debug)]
struct ProbeArgs {
    id: Uuid,
    #[arg(long, allow_hyphen_values = true)]
    x: f64,
    #[arg(long, allow_hyphen_values = true)]
    y: f64,
}

#[derive(Args, Debug)]
struct PlaceArgs {
    #[command(flatten)]
    probe: ProbeArgs,

    #[arg(long, default_value_t = false, help = "Apply the decision and print the resulting scene too")]
    commit: bool,
}

fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, ".env file could not be loaded");
        }
    }

    let cli = Cli::parse();
    let config = PlacementConfig::from_lookup(|var| cli.config.lookup(var))?;
    tracing::debug!(?config, "placement config");

    let mut store = SceneStore::new();
    store.load_snapshot(read_scene(&cli.scene)?)?;

    match cli.command {
        Command::PlaceProduct(args) => run_place_product(&mut store, &config, &args),
        Command::PlaceShelf(args) => run_place_shelf(&mut store, &args),
        Command::Collisions(args) => run_collisions(&store, &config, &args),
    }
}

fn run_place_product(store: &mut SceneStore, config: &PlacementConfig, args: &PlaceArgs) -> Result<(), CliError> {
    let id = args.probe.id;
    let product = store.product(&id).ok_or(CliError::UnknownProduct(id))?;
    let placement = resolve_product_placement(store, product, Point::new(args.probe.x, args.probe.y), config);

    if !args.commit {
        return print_json(&serde_json::to_value(placement)?);
    }
    if !apply_product_placement(store, id, &placement) {
        return Err(CliError::Rejected(id));
    }
    print_json(&serde_json::json!({ "placement": placement, "scene": store.snapshot() }))
}

fn run_place_shelf(store: &mut SceneStore, args: &PlaceArgs) -> Result<(), CliError> {
    let id = args.probe.id;
    let shelf = store.shelf(&id).ok_or(CliError::UnknownShelf(id))?;
    let placement = resolve_shelf_placement(store, shelf, Point::new(args.probe.x, args.probe.y));

    if !args.commit {
        return print_json(&serde_json::to_value(placement)?);
    }
    if !apply_shelf_placement(store, id, &placement) {
        return Err(CliError::Rejected(id));
    }
    print_json(&serde_json::json!({ "placement": placement, "scene": store.snapshot() }))
}

fn run_collisions(store: &SceneStore, config: &PlacementConfig, args: &ProbeArgs) -> Result<(), CliError> {
    let dragged = store.product(&args.id).ok_or(CliError::UnknownProduct(args.id))?;
    let rect = Rect::new(args.x, args.y, dragged.width, dragged.height);
    let products: Vec<&Product> = store.products().collect();

    let mut highlights = HighlightMap::new();
    let report = resolve_collisions(rect, &products, args.id, config.collision, &mut highlights);
    let mut colliding = highlights.colliding();
    colliding.sort_unstable();
    let fills: Vec<Value> = products
        .iter()
        .filter(|p| p.id != args.id)
        .map(|p| serde_json::json!({ "id": p.id, "fill": highlights.get(&p.id).fill(&p.color) }))
        .collect();

    print_json(&serde_json::json!({ "report": report, "colliding": colliding, "fills": fills }))
}

fn read_scene(path: &str) -> Result<SceneSnapshot, CliError> {
    let read = if path == "-" {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw).map(|_| raw)
    } else {
        fs::read_to_string(path)
    };
    let raw = read.map_err(|source| CliError::ReadScene { path: path.to_owned(), source })?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
