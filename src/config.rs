//! World generation configuration
//!
//! Loaded from a TOML file with a `[world]` and a `[variation]` table.
//! Every key is optional; missing keys keep their defaults.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

pub const MIN_WIDTH: i32 = 1000;
pub const MIN_HEIGHT: i32 = 600;

// =============================================================================
// Enumerated options
// =============================================================================

/// Which evil biome the world rolls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Evil {
    #[default]
    Random,
    Corruption,
    Crimson,
}

impl Evil {
    pub fn all() -> &'static [Self] {
        &[Self::Random, Self::Corruption, Self::Crimson]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Random => "Pick corruption or crimson at random",
            Self::Corruption => "Chasms of ebonstone",
            Self::Crimson => "Fleshy crimstone caverns",
        }
    }
}

impl std::fmt::Display for Evil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Corruption => write!(f, "corruption"),
            Self::Crimson => write!(f, "crimson"),
        }
    }
}

/// How snow, desert and jungle are laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiomeLayout {
    /// Vertical bands around planned centre columns.
    #[default]
    Columns,
    /// Horizontal strata by depth.
    Layers,
    /// A patchwork driven by humidity and temperature fields.
    Patches,
}

impl BiomeLayout {
    pub fn all() -> &'static [Self] {
        &[Self::Columns, Self::Layers, Self::Patches]
    }
}

impl std::fmt::Display for BiomeLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Columns => write!(f, "columns"),
            Self::Layers => write!(f, "layers"),
            Self::Patches => write!(f, "patches"),
        }
    }
}

/// Starter gear placed at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Equipment {
    #[default]
    None,
    Iron,
    Platinum,
    Hellstone,
    Mythril,
}

impl Equipment {
    pub fn all() -> &'static [Self] {
        &[Self::None, Self::Iron, Self::Platinum, Self::Hellstone, Self::Mythril]
    }
}

impl std::fmt::Display for Equipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Iron => write!(f, "iron"),
            Self::Platinum => write!(f, "platinum"),
            Self::Hellstone => write!(f, "hellstone"),
            Self::Mythril => write!(f, "mythril"),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[world]` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldSection {
    /// Numeric seed or a phrase hashed to one. Random when absent.
    pub seed: Option<String>,
    pub width: i32,
    pub height: i32,
    pub evil: Evil,
    /// Place a starter home at spawn.
    pub home: bool,
    pub biomes: BiomeLayout,
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            seed: None,
            width: 6400,
            height: 1800,
            evil: Evil::Random,
            home: false,
            biomes: BiomeLayout::Columns,
        }
    }
}

/// `[variation]` table. Multipliers are relative to a normal world (1.0).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VariationSection {
    // Toggles
    pub double_trouble: bool,
    pub shattered: bool,
    pub sunken: bool,
    pub purity: bool,
    pub hardmode: bool,
    pub hardmode_loot: bool,
    pub hive_queen: bool,
    /// Skip painting large structures and biomes.
    pub unpainted: bool,
    pub equipment: Equipment,

    // Frequencies
    pub ore: f64,
    pub life_crystals: f64,
    pub mana_crystals: f64,
    pub pots: f64,
    pub chests: f64,
    pub gems: f64,
    pub traps: f64,
    pub asteroids: f64,
    pub marble_freq: f64,
    pub granite_freq: f64,
    pub hive_freq: f64,
    pub glowing_mushroom_freq: f64,
    pub glowing_moss_freq: f64,

    // Sizes. Area-like sizes are stored as their linear scale once loaded.
    pub evil_size: f64,
    pub ocean_size: f64,
    pub marble_size: f64,
    pub granite_size: f64,
    pub hive_size: f64,
    pub temple_size: f64,
    pub snow_size: f64,
    pub desert_size: f64,
    pub jungle_size: f64,
    pub surface_amplitude: f64,
    pub dungeon_size: f64,
    pub glowing_mushroom_size: f64,
    pub glowing_moss_size: f64,

    // Patches layout. Humidity and temperature bias the climate fields;
    // larger sizes give broader patches.
    pub patches_humidity: f64,
    pub patches_temperature: f64,
    pub patches_size: f64,
}

impl Default for VariationSection {
    fn default() -> Self {
        Self {
            double_trouble: false,
            shattered: false,
            sunken: false,
            purity: false,
            hardmode: false,
            hardmode_loot: false,
            hive_queen: false,
            unpainted: false,
            equipment: Equipment::None,
            ore: 1.0,
            life_crystals: 1.0,
            mana_crystals: 1.0,
            pots: 1.0,
            chests: 1.0,
            gems: 1.0,
            traps: 1.0,
            asteroids: 1.0,
            marble_freq: 1.0,
            granite_freq: 1.0,
            hive_freq: 1.0,
            glowing_mushroom_freq: 1.0,
            glowing_moss_freq: 1.0,
            evil_size: 1.0,
            ocean_size: 1.0,
            marble_size: 1.0,
            granite_size: 1.0,
            hive_size: 1.0,
            temple_size: 1.0,
            snow_size: 1.0,
            desert_size: 1.0,
            jungle_size: 1.0,
            surface_amplitude: 1.0,
            dungeon_size: 1.0,
            glowing_mushroom_size: 1.0,
            glowing_moss_size: 1.0,
            patches_humidity: 0.0,
            patches_temperature: 0.0,
            patches_size: 1.0,
        }
    }
}

/// Complete generation configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldSection,
    pub variation: VariationSection,
}

impl Config {
    /// Parse a TOML document. Area-like sizes are converted to linear
    /// scale factors (square root, clamped at zero).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(text)?;
        let v = &mut config.variation;
        for size in [
            &mut v.evil_size,
            &mut v.marble_size,
            &mut v.granite_size,
            &mut v.hive_size,
            &mut v.temple_size,
            &mut v.glowing_mushroom_size,
            &mut v.glowing_moss_size,
            &mut v.patches_size,
        ] {
            *size = size.max(0.0).sqrt();
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| GenError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load a config file, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using default configuration", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (width, height) = (self.world.width, self.world.height);
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            return Err(GenError::InvalidDimensions {
                width,
                height,
                min_width: MIN_WIDTH,
                min_height: MIN_HEIGHT,
            });
        }
        Ok(())
    }
}
