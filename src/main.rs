use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use terra_worldgen::config::Config;
use terra_worldgen::error::Result;
use terra_worldgen::random::{seed_from_phrase, Random};
use terra_worldgen::world::World;
use terra_worldgen::{export, scheduler};

#[derive(Parser, Debug)]
#[command(name = "terra_worldgen")]
#[command(about = "Generate 2D tile worlds with biomes, caves and structures")]
struct Args {
    /// World width in tiles (overrides the config file)
    #[arg(short = 'W', long)]
    width: Option<i32>,

    /// World height in tiles (overrides the config file)
    #[arg(short = 'H', long)]
    height: Option<i32>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Text seed, hashed to a numeric seed
    #[arg(long, conflicts_with = "seed")]
    seed_phrase: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a PNG preview, one pixel per tile
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON summary of the generated world
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Hex-shaped biomes and caves
    #[arg(long)]
    hive_queen: bool,

    /// Start the world in hardmode
    #[arg(long)]
    hardmode: bool,

    /// Both evil biomes and both ores of every pair
    #[arg(long)]
    double_trouble: bool,

    /// Drop the centre of the surface and flood it
    #[arg(long)]
    sunken: bool,

    /// No evil biome
    #[arg(long)]
    purity: bool,

    /// Place a starter home at spawn
    #[arg(long)]
    home: bool,
}

impl Args {
    fn apply(&self, conf: &mut Config) {
        if let Some(width) = self.width {
            conf.world.width = width;
        }
        if let Some(height) = self.height {
            conf.world.height = height;
        }
        let var = &mut conf.variation;
        var.hive_queen |= self.hive_queen;
        var.hardmode |= self.hardmode;
        var.double_trouble |= self.double_trouble;
        var.sunken |= self.sunken;
        var.purity |= self.purity;
        conf.world.home |= self.home;
    }

    /// Command line first, then the config file, then a fresh random seed.
    fn resolve_seed(&self, conf: &Config) -> u64 {
        if let Some(seed) = self.seed {
            return seed;
        }
        if let Some(phrase) = &self.seed_phrase {
            return seed_from_phrase(phrase);
        }
        match conf.world.seed.as_deref() {
            Some(text) => text.trim().parse().unwrap_or_else(|_| seed_from_phrase(text)),
            None => rand::random(),
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut conf = match &args.config {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };
    args.apply(&mut conf);
    conf.validate()?;

    let seed = args.resolve_seed(&conf);
    info!("Generating world with seed: {}", seed);
    info!("World size: {}x{}", conf.world.width, conf.world.height);

    let mut rnd = Random::new(seed);
    let mut world = World::new(conf);
    let steps = scheduler::generate(&mut rnd, &mut world);
    info!("Placed {} chests", world.chests().len());

    if args.output.is_none() && args.summary.is_none() {
        warn!("No --output or --summary given; nothing written");
    }
    if let Some(path) = &args.output {
        export::export_preview(&world, path)?;
    }
    if let Some(path) = &args.summary {
        let summary = export::summarize(&world, seed, &steps);
        export::export_summary(&summary, path)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
