use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use conquest_map::castle::{Owner, TeamId};
use conquest_map::config::{MapConfig, MapSize};
use conquest_map::export;
use conquest_map::map::{generate_map, GameMap};
use conquest_map::names::NameData;
use conquest_map::rules::ActionPolicy;

#[derive(Parser, Debug)]
#[command(name = "conquest_map")]
#[command(about = "Generate connected castle maps for turn-based conquest games")]
struct Args {
    /// Number of players; derives size, castle and kingdom counts
    #[arg(short = 'p', long, default_value = "2")]
    players: usize,

    /// Map size setting (small, medium, large)
    #[arg(long, default_value = "small")]
    size: String,

    /// Load generation settings from a JSON file (CLI flags override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Width in map units
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height in map units
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Pixels per map unit
    #[arg(long)]
    scale: Option<usize>,

    /// Number of castles to place
    #[arg(short = 'n', long)]
    nodes: Option<usize>,

    /// Number of kingdoms
    #[arg(short = 'r', long)]
    regions: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Replace the built-in castle names with a JSON file
    #[arg(long)]
    names: Option<PathBuf>,

    /// Export the map as a PNG image
    #[arg(long)]
    png: Option<PathBuf>,

    /// Export castles, roads and kingdoms as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Report the attack route between two named castles
    #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
    path: Option<Vec<String>>,

    /// Ignore ownership when reporting the route
    #[arg(long)]
    tunnel: bool,
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conquest_map=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_config(args: &Args) -> conquest_map::Result<MapConfig> {
    let mut config = match &args.config {
        Some(path) => MapConfig::load(path)?,
        None => {
            let size = MapSize::from_str(&args.size).ok_or_else(|| {
                conquest_map::MapError::invalid(format!("unknown map size '{}'", args.size))
            })?;
            MapConfig::for_players(args.players, size)
        }
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(scale) = args.scale {
        config.scale = scale;
    }
    if let Some(nodes) = args.nodes {
        config.node_count = nodes;
    }
    if let Some(regions) = args.regions {
        config.region_count = regions;
    }
    Ok(config)
}

fn print_summary(map: &GameMap) {
    let (px_width, px_height) = map.config.pixel_size();
    println!("Seed: {} (attempt {})", map.seeds.master, map.attempts);
    println!("{}", map.seeds);
    println!(
        "Map size: {}x{} units, {}x{} pixels",
        map.config.width, map.config.height, px_width, px_height
    );
    println!(
        "Castles: {} of {} requested, {} roads",
        map.graph.node_count(),
        map.config.node_count,
        map.graph.edge_count()
    );
    println!(
        "Buildable terrain: {:.1}%",
        100.0 * map.terrain.buildable_fraction()
    );

    for region in &map.regions {
        let names: Vec<&str> = region
            .members
            .iter()
            .map(|&n| map.castle(n).name.as_str())
            .collect();
        println!(
            "Kingdom {} ({} castles): {}",
            region.index,
            names.len(),
            names.join(", ")
        );
    }
}

/// Give the kingdom of `from` to one team and everything else to another,
/// then report the route under the requested rules.
fn report_path(map: &mut GameMap, from: &str, to: &str, tunnel: bool) -> conquest_map::Result<()> {
    let start = map.castle_named(from)?;
    let goal = map.castle_named(to)?;

    let home = map.castle(start).region;
    let ids: Vec<_> = map.graph.node_ids().collect();
    for id in ids {
        let castle = map.castle_mut(id);
        castle.owner = Some(if castle.region == home {
            Owner::new(0, 0)
        } else {
            Owner::new(1, 1)
        });
    }

    let policy = if tunnel {
        ActionPolicy::tunneling(TeamId(0))
    } else {
        ActionPolicy::attacking(TeamId(0))
    };

    let traversal = map.traverse(start, &policy);
    match traversal.nodes_to(goal) {
        Some(nodes) => {
            let names: Vec<&str> = nodes.iter().map(|&n| map.castle(n).name.as_str()).collect();
            println!(
                "Route {} -> {} ({:.1} px): {}",
                map.castle(traversal.source()).name,
                map.castle(goal).name,
                traversal.distance(goal).unwrap_or(0.0),
                names.join(" -> ")
            );
        }
        None => println!("No route from {} to {}", from, to),
    }

    let border = map
        .graph
        .node_ids()
        .filter(|&n| map.castle(n).region == home && map.is_border_castle(n))
        .count();
    println!("Border castles in the starting kingdom: {}", border);
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let names = match &args.names {
        Some(path) => match NameData::load_from(path) {
            Ok(names) => names,
            Err(e) => {
                eprintln!("Failed to load castle names: {}", e);
                std::process::exit(2);
            }
        },
        None => NameData::defaults(),
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    println!("Generating map with seed: {}", seed);

    let mut map = match generate_map(&config, &names, seed) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Map generation failed: {}", e);
            std::process::exit(1);
        }
    };

    print_summary(&map);

    if let Some(path) = &args.png {
        match export::render_png(&map, path) {
            Ok(()) => println!("Saved map image to {}", path.display()),
            Err(e) => eprintln!("Failed to export PNG: {}", e),
        }
    }

    if let Some(path) = &args.json {
        match export::write_json(&map, path) {
            Ok(()) => println!("Saved map data to {}", path.display()),
            Err(e) => eprintln!("Failed to export JSON: {}", e),
        }
    }

    if let Some(route) = &args.path {
        if let [from, to] = route.as_slice() {
            if let Err(e) = report_path(&mut map, from, to, args.tunnel) {
                eprintln!("Route query failed: {}", e);
                std::process::exit(2);
            }
        }
    }
}
