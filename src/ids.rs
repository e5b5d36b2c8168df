//! Typed identifiers for blocks, walls, paints and items
//!
//! Each category is its own newtype so a wall can never be written where a
//! block is expected. Numbering follows the game client's tables.

use serde::Serialize;

/// Foreground block type. `BlockId::EMPTY` marks air.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockId(pub i16);

impl Default for BlockId {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BlockId {
    pub const EMPTY: Self = Self(-1);
    pub const DIRT: Self = Self(0);
    pub const STONE: Self = Self(1);
    pub const GRASS: Self = Self(2);
    pub const GRASS_PLANT: Self = Self(3);
    pub const TORCH: Self = Self(4);
    pub const TREE: Self = Self(5);
    pub const IRON_ORE: Self = Self(6);
    pub const COPPER_ORE: Self = Self(7);
    pub const GOLD_ORE: Self = Self(8);
    pub const SILVER_ORE: Self = Self(9);
    pub const DOOR: Self = Self(10);
    pub const LIFE_CRYSTAL: Self = Self(12);
    pub const PLATFORM: Self = Self(19);
    pub const CHEST: Self = Self(21);
    pub const DEMONITE: Self = Self(22);
    pub const CORRUPT_GRASS: Self = Self(23);
    pub const CORRUPT_PLANT: Self = Self(24);
    pub const EBONSTONE: Self = Self(25);
    pub const ALTAR: Self = Self(26);
    pub const SUNFLOWER: Self = Self(27);
    pub const POT: Self = Self(28);
    pub const WOOD: Self = Self(30);
    pub const ORB_HEART: Self = Self(31);
    pub const CORRUPT_THORNS: Self = Self(32);
    pub const METEORITE: Self = Self(37);
    pub const GRAY_BRICK: Self = Self(38);
    pub const RED_BRICK: Self = Self(39);
    pub const CLAY: Self = Self(40);
    pub const BLUE_BRICK: Self = Self(41);
    pub const GREEN_BRICK: Self = Self(43);
    pub const PINK_BRICK: Self = Self(44);
    pub const SPIKE: Self = Self(48);
    pub const COBWEB: Self = Self(51);
    pub const VINES: Self = Self(52);
    pub const SAND: Self = Self(53);
    pub const OBSIDIAN: Self = Self(56);
    pub const ASH: Self = Self(57);
    pub const HELLSTONE: Self = Self(58);
    pub const MUD: Self = Self(59);
    pub const JUNGLE_GRASS: Self = Self(60);
    pub const JUNGLE_PLANT: Self = Self(61);
    pub const JUNGLE_VINES: Self = Self(62);
    pub const SAPPHIRE: Self = Self(63);
    pub const RUBY: Self = Self(64);
    pub const EMERALD: Self = Self(65);
    pub const TOPAZ: Self = Self(66);
    pub const AMETHYST: Self = Self(67);
    pub const DIAMOND: Self = Self(68);
    pub const JUNGLE_THORNS: Self = Self(69);
    pub const MUSHROOM_GRASS: Self = Self(70);
    pub const MUSHROOM_PLANT: Self = Self(71);
    pub const MUSHROOM_TREE: Self = Self(72);
    pub const TALL_GRASS_PLANT: Self = Self(73);
    pub const TALL_JUNGLE_PLANT: Self = Self(74);
    pub const OBSIDIAN_BRICK: Self = Self(75);
    pub const HELLSTONE_BRICK: Self = Self(76);
    pub const CACTUS_PLANT: Self = Self(80);
    pub const CORAL: Self = Self(81);
    pub const HERB: Self = Self(82);
    pub const DRESSER: Self = Self(88);
    pub const LAMP: Self = Self(93);
    pub const STATUE: Self = Self(105);
    pub const COBALT_ORE: Self = Self(107);
    pub const MYTHRIL_ORE: Self = Self(108);
    pub const HALLOWED_GRASS: Self = Self(109);
    pub const HALLOWED_PLANT: Self = Self(110);
    pub const ADAMANTITE_ORE: Self = Self(111);
    pub const EBONSAND: Self = Self(112);
    pub const HALLOWED_VINES: Self = Self(115);
    pub const PEARLSAND: Self = Self(116);
    pub const PEARLSTONE: Self = Self(117);
    pub const PEARLSTONE_BRICK: Self = Self(118);
    pub const IRIDESCENT_BRICK: Self = Self(119);
    pub const MUDSTONE_BRICK: Self = Self(120);
    pub const SILT: Self = Self(123);
    pub const WOODEN_BEAM: Self = Self(124);
    pub const PRESSURE_PLATE: Self = Self(135);
    pub const TRAP: Self = Self(137);
    pub const BOULDER: Self = Self(138);
    pub const EXPLOSIVES: Self = Self(141);
    pub const SNOW: Self = Self(147);
    pub const SNOW_BRICK: Self = Self(148);
    pub const SANDSTONE_BRICK: Self = Self(151);
    pub const EBONSTONE_BRICK: Self = Self(152);
    pub const PALM_WOOD: Self = Self(322);
    pub const PALM_TREE: Self = Self(323);
    pub const RICH_MAHOGANY: Self = Self(158);
    pub const ICE: Self = Self(161);
    pub const THIN_ICE: Self = Self(162);
    pub const CORRUPT_ICE: Self = Self(163);
    pub const HALLOWED_ICE: Self = Self(164);
    pub const STALACTITE: Self = Self(165);
    pub const TIN_ORE: Self = Self(166);
    pub const LEAD_ORE: Self = Self(167);
    pub const TUNGSTEN_ORE: Self = Self(168);
    pub const PLATINUM_ORE: Self = Self(169);
    pub const TIN_BRICK: Self = Self(177);
    pub const GEM: Self = Self(178);
    pub const GREEN_MOSS_STONE: Self = Self(179);
    pub const BROWN_MOSS_STONE: Self = Self(180);
    pub const RED_MOSS_STONE: Self = Self(181);
    pub const BLUE_MOSS_STONE: Self = Self(182);
    pub const PURPLE_MOSS_STONE: Self = Self(183);
    pub const MOSS_PLANT: Self = Self(184);
    pub const SMALL_PILE: Self = Self(185);
    pub const LARGE_PILE: Self = Self(186);
    pub const LARGE_PILE_GROUP2: Self = Self(187);
    pub const CLOUD: Self = Self(189);
    /// Glowing mushroom block.
    pub const MUSHROOM_BLOCK: Self = Self(190);
    pub const LIVING_WOOD: Self = Self(191);
    pub const LEAF: Self = Self(192);
    pub const SLIME: Self = Self(193);
    pub const FLESH: Self = Self(195);
    pub const RAIN_CLOUD: Self = Self(196);
    pub const CRIMSON_GRASS: Self = Self(199);
    pub const CRIMSON_ICE: Self = Self(200);
    pub const CRIMSON_PLANT: Self = Self(201);
    pub const SUNPLATE: Self = Self(202);
    pub const CRIMSTONE: Self = Self(203);
    pub const CRIMTANE: Self = Self(204);
    pub const CRIMSON_VINES: Self = Self(205);
    pub const ICE_BRICK: Self = Self(206);
    pub const CHLOROPHYTE_ORE: Self = Self(211);
    pub const ROPE: Self = Self(213);
    pub const PALLADIUM_ORE: Self = Self(221);
    pub const ORICHALCUM_ORE: Self = Self(222);
    pub const TITANIUM_ORE: Self = Self(223);
    pub const SLUSH: Self = Self(224);
    pub const HIVE: Self = Self(225);
    pub const LIHZAHRD_BRICK: Self = Self(226);
    pub const HONEY: Self = Self(229);
    pub const CRISPY_HONEY: Self = Self(230);
    pub const LARVA: Self = Self(231);
    pub const WOODEN_SPIKE: Self = Self(232);
    pub const LARGE_JUNGLE_PLANT: Self = Self(233);
    pub const CRIMSAND: Self = Self(234);
    pub const LIHZAHRD_ALTAR: Self = Self(237);
    pub const MINECART_TRACK: Self = Self(314);
    pub const CORALSTONE: Self = Self(315);
    pub const BOREAL_WOOD: Self = Self(321);
    pub const STONE_SLAB: Self = Self(273);
    pub const VINE_ROPE: Self = Self(353);
    pub const SMOOTH_MARBLE: Self = Self(357);
    pub const MARBLE: Self = Self(367);
    pub const GRANITE: Self = Self(368);
    pub const SMOOTH_GRANITE: Self = Self(369);
    pub const WATER_DRIP: Self = Self(373);
    pub const LAVA_DRIP: Self = Self(374);
    pub const HONEY_DRIP: Self = Self(375);
    pub const BUBBLE: Self = Self(379);
    pub const LAVA_MOSS_STONE: Self = Self(381);
    pub const FLOWER_VINES: Self = Self(382);
    pub const LIVING_MAHOGANY: Self = Self(383);
    pub const MAHOGANY_LEAF: Self = Self(384);
    pub const CRYSTAL_BLOCK: Self = Self(385);
    pub const SANDSTONE: Self = Self(396);
    pub const HARDENED_SAND: Self = Self(397);
    pub const HARDENED_EBONSAND: Self = Self(398);
    pub const HARDENED_CRIMSAND: Self = Self(399);
    pub const EBONSANDSTONE: Self = Self(400);
    pub const CRIMSANDSTONE: Self = Self(401);
    pub const HARDENED_PEARLSAND: Self = Self(402);
    pub const PEARLSANDSTONE: Self = Self(403);
    pub const DESERT_FOSSIL: Self = Self(404);
    pub const SNOW_CLOUD: Self = Self(460);
    pub const SAND_DRIP: Self = Self(461);
    pub const CHEST_GROUP2: Self = Self(467);
    pub const LESION: Self = Self(474);
    pub const CRACKED_BLUE_BRICK: Self = Self(481);
    pub const CRACKED_GREEN_BRICK: Self = Self(482);
    pub const CRACKED_PINK_BRICK: Self = Self(483);
    pub const FALLEN_LOG: Self = Self(488);
    pub const SHELL_PILE: Self = Self(495);
    pub const MUSHROOM_VINES: Self = Self(528);
    pub const MARBLE_COLUMN: Self = Self(561);
    pub const BAMBOO_STALK: Self = Self(571);
    pub const BOREAL_BEAM: Self = Self(574);
    pub const RICH_MAHOGANY_BEAM: Self = Self(575);
    pub const GRANITE_COLUMN: Self = Self(576);
    pub const SANDSTONE_COLUMN: Self = Self(577);
    pub const KRYPTON_MOSS_STONE: Self = Self(534);
    pub const XENON_MOSS_STONE: Self = Self(536);
    pub const ARGON_MOSS_STONE: Self = Self(539);
    pub const NEON_MOSS_STONE: Self = Self(625);
    pub const HELIUM_MOSS_STONE: Self = Self(627);
    pub const ASH_GRASS: Self = Self(633);
    pub const ASH_TREE: Self = Self(634);
    pub const ASH_WOOD: Self = Self(635);
    pub const CORRUPT_VINES: Self = Self(636);
    pub const ASH_PLANT: Self = Self(637);
    pub const ASH_VINES: Self = Self(638);
    pub const MANA_CRYSTAL: Self = Self(639);
    pub const ROLLING_CACTUS: Self = Self(484);
    pub const BOUNCY_BOULDER: Self = Self(664);
    pub const LIFE_CRYSTAL_BOULDER: Self = Self(665);
    pub const TNT_BARREL: Self = Self(654);
    pub const AETHERIUM: Self = Self(659);
    pub const CORRUPT_JUNGLE_GRASS: Self = Self(661);
    pub const CRIMSON_JUNGLE_GRASS: Self = Self(662);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    /// Ores placed by the base terrain layers and the hardmode deposit bands.
    pub fn is_ore(self) -> bool {
        matches!(
            self,
            Self::COPPER_ORE
                | Self::TIN_ORE
                | Self::IRON_ORE
                | Self::LEAD_ORE
                | Self::SILVER_ORE
                | Self::TUNGSTEN_ORE
                | Self::GOLD_ORE
                | Self::PLATINUM_ORE
                | Self::COBALT_ORE
                | Self::PALLADIUM_ORE
                | Self::MYTHRIL_ORE
                | Self::ORICHALCUM_ORE
                | Self::ADAMANTITE_ORE
                | Self::TITANIUM_ORE
                | Self::DEMONITE
                | Self::CRIMTANE
                | Self::HELLSTONE
        )
    }

    /// True for blocks that carry sub-tile frame coordinates.
    pub fn is_framed(self) -> bool {
        self.0 >= 0 && FRAMED_LOOKUP.binary_search(&self.0).is_ok()
    }

    /// True for blocks a player can stand on: not air and not a framed
    /// decoration.
    pub fn is_solid(self) -> bool {
        !self.is_empty()
            && !self.is_framed()
            && !matches!(
                self,
                Self::VINES
                    | Self::COBWEB
                    | Self::JUNGLE_VINES
                    | Self::HALLOWED_VINES
                    | Self::CRIMSON_VINES
                    | Self::CORRUPT_VINES
                    | Self::MUSHROOM_VINES
                    | Self::FLOWER_VINES
                    | Self::ASH_VINES
                    | Self::CORRUPT_THORNS
                    | Self::JUNGLE_THORNS
                    | Self::ROPE
                    | Self::VINE_ROPE
                    | Self::MOSS_PLANT
                    | Self::PLATFORM
                    | Self::WATER_DRIP
                    | Self::LAVA_DRIP
                    | Self::HONEY_DRIP
                    | Self::SAND_DRIP
                    | Self::WOODEN_BEAM
                    | Self::BOREAL_BEAM
                    | Self::RICH_MAHOGANY_BEAM
                    | Self::MARBLE_COLUMN
                    | Self::GRANITE_COLUMN
                    | Self::SANDSTONE_COLUMN
                    | Self::MINECART_TRACK
            )
    }
}

/// Blocks whose stamp and world encodings carry frame coordinates.
const FRAMED_LOOKUP: &[i16] = &[
    3, 4, 5, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 24, 26, 27, 28, 29, 31, 33, 34, 35,
    36, 42, 49, 50, 55, 61, 71, 72, 73, 74, 77, 78, 79, 81, 82, 83, 84, 85, 86, 87, 88, 89, 90,
    91, 92, 93, 94, 95, 96, 97, 98, 99, 100, 101, 102, 103, 104, 105, 106, 110, 113, 114, 125,
    126, 128, 129, 132, 133, 134, 135, 136, 137, 138, 139, 141, 142, 143, 144, 149, 165, 171,
    172, 173, 174, 178, 184, 185, 186, 187, 201, 207, 209, 210, 212, 215, 216, 217, 218, 219,
    220, 227, 228, 231, 233, 235, 236, 237, 238, 239, 240, 241, 242, 243, 244, 245, 246, 247,
    254, 269, 270, 271, 275, 276, 277, 278, 279, 280, 281, 282, 283, 285, 286, 287, 288, 289,
    290, 291, 292, 293, 294, 295, 296, 297, 298, 299, 300, 301, 302, 303, 304, 305, 306, 307,
    308, 309, 310, 314, 316, 317, 318, 319, 320, 323, 324, 334, 335, 337, 338, 339, 349, 354,
    355, 356, 358, 359, 360, 361, 362, 363, 364, 372, 373, 374, 375, 376, 377, 378, 380, 386,
    387, 388, 389, 390, 391, 392, 393, 394, 395, 405, 406, 410, 411, 412, 413, 414, 419, 420,
    423, 424, 425, 427, 428, 429, 435, 436, 437, 438, 439, 440, 441, 442, 443, 444, 445, 452,
    453, 454, 455, 456, 457, 461, 462, 463, 464, 465, 466, 467, 468, 469, 470, 471, 475, 476,
    480, 484, 485, 486, 487, 488, 489, 490, 491, 493, 494, 497, 499, 505, 506, 509, 510, 511,
    518, 519, 520, 521, 522, 523, 524, 525, 526, 527, 529, 530, 531, 532, 533, 538, 542, 543,
    544, 545, 547, 548, 549, 550, 551, 552, 553, 554, 555, 556, 558, 559, 560, 564, 565, 567,
    568, 569, 570, 571, 572, 573, 579, 580, 581, 582, 583, 584, 585, 586, 587, 588, 589, 590,
    591, 592, 593, 594, 595, 596, 597, 598, 599, 600, 601, 602, 603, 604, 605, 606, 607, 608,
    609, 610, 611, 612, 613, 614, 615, 616, 617, 619, 620, 621, 622, 623, 624, 629, 630, 631,
    632, 634, 637, 639, 640, 642, 643, 644, 645, 646, 647, 648, 649, 650, 651, 652, 653, 654,
    656, 657, 658, 660, 663, 664, 665,
];

/// Background wall type. `WallId::EMPTY` means no wall.
///
/// Walls generated naturally and the player-placed variants of the same
/// material have different ids; the placed ones carry a `_PLACED` suffix
/// where both exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct WallId(pub u16);

impl WallId {
    pub const EMPTY: Self = Self(0);

    // ==================== Placed walls ====================
    pub const STONE_PLACED: Self = Self(1);
    pub const WOOD: Self = Self(4);
    pub const GRAY_BRICK: Self = Self(5);
    pub const RED_BRICK: Self = Self(6);
    pub const OBSIDIAN_BRICK_PLACED: Self = Self(20);
    pub const PEARLSTONE_BRICK: Self = Self(22);
    pub const IRIDESCENT_BRICK: Self = Self(23);
    pub const MUDSTONE_BRICK: Self = Self(24);
    pub const PLANKED: Self = Self(27);
    pub const SNOW_BRICK: Self = Self(31);
    pub const SANDSTONE_BRICK: Self = Self(34);
    pub const RICH_MAHOGANY: Self = Self(42);
    pub const TIN_BRICK: Self = Self(45);
    pub const PLATINUM_BRICK: Self = Self(47);
    pub const LIVING_LEAF: Self = Self(60);
    pub const CLOUD: Self = Self(73);
    pub const LIVING_WOOD_PLACED: Self = Self(78);
    pub const DISC: Self = Self(82);
    pub const ICE_BRICK: Self = Self(84);
    pub const SHADEWOOD: Self = Self(85);
    pub const BLUE_SLAB: Self = Self(94);
    pub const BLUE_TILED: Self = Self(95);
    pub const PINK_SLAB: Self = Self(96);
    pub const PINK_TILED: Self = Self(97);
    pub const GREEN_SLAB: Self = Self(98);
    pub const GREEN_TILED: Self = Self(99);
    pub const HIVE_PLACED: Self = Self(108);
    pub const TITANSTONE: Self = Self(111);
    pub const HAY: Self = Self(114);
    pub const SPOOKY_WOOD: Self = Self(115);
    pub const FANCY_GRAY_WALLPAPER: Self = Self(126);
    pub const RICH_MAHOGANY_FENCE: Self = Self(139);
    pub const WHITE_DYNASTY: Self = Self(142);
    pub const BLUE_DYNASTY: Self = Self(143);
    pub const BOREAL_WOOD: Self = Self(149);
    pub const PALM_WOOD: Self = Self(151);
    pub const PALM_WOOD_FENCE: Self = Self(152);
    pub const AMETHYST_GEMSPARK: Self = Self(154);
    pub const HONEYFALL: Self = Self(172);
    pub const SMOOTH_MARBLE: Self = Self(179);
    pub const SMOOTH_GRANITE: Self = Self(181);
    pub const MARBLE_PLACED: Self = Self(183);
    pub const GRANITE_PLACED: Self = Self(184);
    pub const CRYSTAL_BLOCK: Self = Self(186);
    pub const IRON_BRICK: Self = Self(231);
    pub const SNOW_PLACED: Self = Self(249);
    pub const ICE_PLACED: Self = Self(266);
    pub const OBSIDIAN: Self = Self(267);
    pub const SANDSTONE_PLACED: Self = Self(275);
    pub const LICHEN_STONE_PLACED: Self = Self(292);
    pub const LEAFY_JUNGLE_PLACED: Self = Self(293);
    pub const EMBER_PLACED: Self = Self(296);
    pub const WORN_STONE_PLACED: Self = Self(300);
    pub const STALACTITE_STONE_PLACED: Self = Self(301);
    pub const HARDENED_SAND_PLACED: Self = Self(304);
    pub const BAMBOO: Self = Self(312);
    pub const LARGE_BAMBOO: Self = Self(313);
    pub const ASH_WOOD: Self = Self(316);

    // ==================== Natural walls ====================
    pub const DIRT: Self = Self(2);
    pub const EBONSTONE: Self = Self(3);
    pub const BLUE_BRICK: Self = Self(7);
    pub const GREEN_BRICK: Self = Self(8);
    pub const PINK_BRICK: Self = Self(9);
    pub const HELLSTONE_BRICK: Self = Self(13);
    pub const OBSIDIAN_BRICK: Self = Self(14);
    pub const MUD: Self = Self(15);
    pub const SNOW: Self = Self(40);
    pub const GREEN_MOSSY: Self = Self(54);
    pub const BROWN_MOSSY: Self = Self(55);
    pub const RED_MOSSY: Self = Self(56);
    pub const BLUE_MOSSY: Self = Self(57);
    pub const PURPLE_MOSSY: Self = Self(58);
    pub const ROCKY_DIRT: Self = Self(59);
    pub const OLD_STONE: Self = Self(61);
    pub const SPIDER: Self = Self(62);
    pub const GRASS: Self = Self(63);
    pub const JUNGLE: Self = Self(64);
    pub const FLOWER: Self = Self(65);
    pub const CORRUPT_GRASS: Self = Self(69);
    pub const HALLOWED_GRASS: Self = Self(70);
    pub const ICE: Self = Self(71);
    pub const MUSHROOM: Self = Self(80);
    pub const CRIMSON_GRASS: Self = Self(81);
    pub const CRIMSTONE: Self = Self(83);
    pub const HIVE: Self = Self(86);
    pub const LIHZAHRD_BRICK: Self = Self(87);
    pub const CAVE_DIRT: Self = Self(170);
    pub const ROUGH_DIRT: Self = Self(171);
    pub const MARBLE: Self = Self(178);
    pub const GRANITE: Self = Self(180);
    pub const CRAGGY_STONE: Self = Self(185);
    pub const SANDSTONE: Self = Self(187);
    pub const CORRUPT_GROWTH: Self = Self(188);
    pub const CORRUPT_MASS: Self = Self(189);
    pub const CORRUPT_PUSTULE: Self = Self(190);
    pub const CORRUPT_TENDRIL: Self = Self(191);
    pub const CRIMSON_CRUST: Self = Self(192);
    pub const CRIMSON_SCAB: Self = Self(193);
    pub const CRIMSON_TEETH: Self = Self(194);
    pub const CRIMSON_BLISTER: Self = Self(195);
    pub const LAYERED_DIRT: Self = Self(196);
    pub const CRUMBLING_DIRT: Self = Self(197);
    pub const CRACKED_DIRT: Self = Self(198);
    pub const WAVY_DIRT: Self = Self(199);
    pub const HALLOWED_PRISM: Self = Self(200);
    pub const HALLOWED_CAVERN: Self = Self(201);
    pub const HALLOWED_SHARD: Self = Self(202);
    pub const HALLOWED_CRYSTALLINE: Self = Self(203);
    pub const LICHEN_STONE: Self = Self(204);
    pub const LEAFY_JUNGLE: Self = Self(205);
    pub const IVY_STONE: Self = Self(206);
    pub const JUNGLE_VINE: Self = Self(207);
    pub const EMBER: Self = Self(208);
    pub const CINDER: Self = Self(209);
    pub const MAGMA: Self = Self(210);
    pub const SMOULDERING_STONE: Self = Self(211);
    pub const WORN_STONE: Self = Self(212);
    pub const STALACTITE_STONE: Self = Self(213);
    pub const MOTTLED_STONE: Self = Self(214);
    pub const FRACTURED_STONE: Self = Self(215);
    pub const HARDENED_SAND: Self = Self(216);
    pub const HARDENED_EBONSAND: Self = Self(217);
    pub const HARDENED_CRIMSAND: Self = Self(218);
    pub const HARDENED_PEARLSAND: Self = Self(219);
    pub const EBONSANDSTONE: Self = Self(220);
    pub const CRIMSANDSTONE: Self = Self(221);
    pub const PEARLSANDSTONE: Self = Self(222);
    pub const LIVING_WOOD: Self = Self(244);
    pub const AETHERIUM: Self = Self(321);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// Families of interchangeable natural walls.
pub mod wall_variants {
    use super::WallId;

    pub const DIRT: [WallId; 8] = [
        WallId::DIRT,
        WallId::ROCKY_DIRT,
        WallId::CAVE_DIRT,
        WallId::ROUGH_DIRT,
        WallId::LAYERED_DIRT,
        WallId::CRUMBLING_DIRT,
        WallId::CRACKED_DIRT,
        WallId::WAVY_DIRT,
    ];

    /// Old stone is left out; it only appears in authored structures.
    pub const STONE: [WallId; 5] = [
        WallId::CRAGGY_STONE,
        WallId::WORN_STONE,
        WallId::STALACTITE_STONE,
        WallId::MOTTLED_STONE,
        WallId::FRACTURED_STONE,
    ];

    pub const JUNGLE: [WallId; 5] = [
        WallId::MUD,
        WallId::LICHEN_STONE,
        WallId::LEAFY_JUNGLE,
        WallId::IVY_STONE,
        WallId::JUNGLE_VINE,
    ];

    pub const CRIMSON: [WallId; 4] = [
        WallId::CRIMSTONE,
        WallId::CRIMSON_CRUST,
        WallId::CRIMSON_SCAB,
        WallId::CRIMSON_TEETH,
    ];

    pub const CORRUPTION: [WallId; 4] = [
        WallId::EBONSTONE,
        WallId::CORRUPT_GROWTH,
        WallId::CORRUPT_MASS,
        WallId::CORRUPT_PUSTULE,
    ];

    pub const HALLOW: [WallId; 4] = [
        WallId::HALLOWED_PRISM,
        WallId::HALLOWED_CAVERN,
        WallId::HALLOWED_SHARD,
        WallId::HALLOWED_CRYSTALLINE,
    ];

    pub const DUNGEON: [WallId; 9] = [
        WallId::BLUE_BRICK,
        WallId::GREEN_BRICK,
        WallId::PINK_BRICK,
        WallId::BLUE_SLAB,
        WallId::BLUE_TILED,
        WallId::PINK_SLAB,
        WallId::PINK_TILED,
        WallId::GREEN_SLAB,
        WallId::GREEN_TILED,
    ];

    pub const UNDERWORLD: [WallId; 4] = [
        WallId::EMBER,
        WallId::CINDER,
        WallId::MAGMA,
        WallId::SMOULDERING_STONE,
    ];

    pub fn contains(family: &[WallId], wall: WallId) -> bool {
        family.contains(&wall)
    }
}

/// Paint colour applied to a block or wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub struct PaintId(pub u8);

impl PaintId {
    pub const NONE: Self = Self(0);
    pub const RED: Self = Self(1);
    pub const ORANGE: Self = Self(2);
    pub const YELLOW: Self = Self(3);
    pub const LIME: Self = Self(4);
    pub const CYAN: Self = Self(7);
    pub const SKY_BLUE: Self = Self(8);
    pub const PURPLE: Self = Self(10);
    pub const PINK: Self = Self(12);
    pub const DEEP_ORANGE: Self = Self(14);
    pub const DEEP_YELLOW: Self = Self(15);
    pub const DEEP_LIME: Self = Self(16);
    pub const BLACK: Self = Self(25);
    pub const WHITE: Self = Self(26);
    pub const GRAY: Self = Self(27);
    pub const BROWN: Self = Self(28);
}

/// Inventory item type stored in chests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct ItemId(pub u16);

impl ItemId {
    pub const NONE: Self = Self(0);
    pub const TORCH: Self = Self(8);
    pub const WOOD: Self = Self(9);
    pub const GOLD_BAR: Self = Self(19);
    pub const COPPER_BAR: Self = Self(20);
    pub const SILVER_BAR: Self = Self(21);
    pub const IRON_BAR: Self = Self(22);
    pub const LESSER_HEALING_POTION: Self = Self(28);
    pub const BOTTLE: Self = Self(31);
    pub const WOODEN_ARROW: Self = Self(40);
    pub const FLAMING_ARROW: Self = Self(41);
    pub const SHURIKEN: Self = Self(42);
    pub const UNHOLY_ARROW: Self = Self(47);
    pub const BAND_OF_REGENERATION: Self = Self(49);
    pub const MAGIC_MIRROR: Self = Self(50);
    pub const JESTERS_ARROW: Self = Self(51);
    pub const ANGEL_STATUE: Self = Self(52);
    pub const CLOUD_IN_A_BOTTLE: Self = Self(53);
    pub const HERMES_BOOTS: Self = Self(54);
    pub const ENCHANTED_BOOMERANG: Self = Self(55);
    pub const DEMONITE_BAR: Self = Self(57);
    pub const SILVER_COIN: Self = Self(72);
    pub const GOLD_COIN: Self = Self(73);
    pub const METEORITE_BAR: Self = Self(117);
    pub const BOMB: Self = Self(166);
    pub const DYNAMITE: Self = Self(167);
    pub const GRENADE: Self = Self(168);
    pub const HELLSTONE_BAR: Self = Self(175);
    pub const BREATHING_REED: Self = Self(186);
    pub const FLIPPER: Self = Self(187);
    pub const HEALING_POTION: Self = Self(188);
    pub const SUSPICIOUS_LOOKING_EYE: Self = Self(43);
    pub const TRIDENT: Self = Self(277);
    pub const THROWING_KNIFE: Self = Self(279);
    pub const SPEAR: Self = Self(280);
    pub const BLOWPIPE: Self = Self(281);
    pub const GLOWSTICK: Self = Self(282);
    pub const WOODEN_BOOMERANG: Self = Self(284);
    pub const AGLET: Self = Self(285);
    pub const REGENERATION_POTION: Self = Self(289);
    pub const SWIFTNESS_POTION: Self = Self(290);
    pub const GILLS_POTION: Self = Self(291);
    pub const IRONSKIN_POTION: Self = Self(292);
    pub const SHINE_POTION: Self = Self(298);
    pub const NIGHT_OWL_POTION: Self = Self(299);
    pub const ARCHERY_POTION: Self = Self(303);
    pub const HUNTER_POTION: Self = Self(304);
    pub const COBALT_BAR: Self = Self(381);
    pub const MYTHRIL_BAR: Self = Self(382);
    pub const ADAMANTITE_BAR: Self = Self(391);
    pub const BLUE_TORCH: Self = Self(427);
    pub const WHITE_TORCH: Self = Self(431);
    pub const GREATER_HEALING_POTION: Self = Self(499);
    pub const ICE_BOOMERANG: Self = Self(670);
    pub const TIN_BAR: Self = Self(703);
    pub const LEAD_BAR: Self = Self(704);
    pub const TUNGSTEN_BAR: Self = Self(705);
    pub const PLATINUM_BAR: Self = Self(706);
    pub const ICE_BLADE: Self = Self(724);
    pub const BEACH_BALL: Self = Self(859);
    pub const WATER_WALKING_BOOTS: Self = Self(863);
    pub const FLARE_GUN: Self = Self(930);
    pub const FLARE: Self = Self(931);
    pub const UMBRELLA: Self = Self(946);
    pub const ICE_SKATES: Self = Self(950);
    pub const CLIMBING_CLAWS: Self = Self(953);
    pub const ROPE: Self = Self(965);
    pub const ICE_TORCH: Self = Self(974);
    pub const SHOE_SPIKES: Self = Self(975);
    pub const BLIZZARD_IN_A_BOTTLE: Self = Self(987);
    pub const EXTRACTINATOR: Self = Self(997);
    pub const HIVE_WAND: Self = Self(1129);
    pub const ABEEMINATION: Self = Self(1133);
    pub const BOTTLED_HONEY: Self = Self(1134);
    pub const PALLADIUM_BAR: Self = Self(1184);
    pub const ORICHALCUM_BAR: Self = Self(1191);
    pub const TITANIUM_BAR: Self = Self(1198);
    pub const CRIMTANE_BAR: Self = Self(1257);
    pub const SNOWBALL_CANNON: Self = Self(1319);
    pub const FLURRY_BOOTS: Self = Self(1579);
    pub const HONEY_DISPENSER: Self = Self(2204);
    pub const MINING_POTION: Self = Self(2322);
    pub const BUILDER_POTION: Self = Self(2325);
    pub const DANGERSENSE_POTION: Self = Self(2329);
    pub const RECALL_POTION: Self = Self(2350);
    pub const WAND_OF_SPARKING: Self = Self(3069);
    pub const RADAR: Self = Self(3084);
    pub const CORRUPT_TORCH: Self = Self(4385);
    pub const CRIMSON_TORCH: Self = Self(4386);
    pub const JUNGLE_TORCH: Self = Self(4388);
    pub const INNER_TUBE: Self = Self(4404);
    pub const BEE_MINECART: Self = Self(4426);
    pub const MACE: Self = Self(5011);
    pub const COPPER_SHORTSWORD: Self = Self(3507);
    pub const COPPER_PICKAXE: Self = Self(3509);
    pub const COPPER_AXE: Self = Self(3506);
    pub const IRON_SHORTSWORD: Self = Self(6);
    pub const IRON_PICKAXE: Self = Self(1);
    pub const IRON_AXE: Self = Self(10);
    pub const LIHZAHRD_POWER_CELL: Self = Self(1293);
    pub const SOLAR_TABLET_FRAGMENT: Self = Self(1294);
    pub const LIHZAHRD_FURNACE: Self = Self(2177);
    pub const STAFF_OF_REGROWTH: Self = Self(213);
    pub const FERAL_CLAWS: Self = Self(211);
    pub const ANKLET_OF_THE_WIND: Self = Self(212);
    pub const FIBERGLASS_FISHING_POLE: Self = Self(2292);
    pub const LIVING_MAHOGANY_WAND: Self = Self(2174);
    pub const LIFE_CRYSTAL: Self = Self(29);
    pub const BOOMSTICK: Self = Self(964);
    pub const FLOWER_BOOTS: Self = Self(3017);
    pub const LAVA_CHARM: Self = Self(906);
    pub const FEATHERFALL_POTION: Self = Self(295);
    pub const SPELUNKER_POTION: Self = Self(296);
    pub const INVISIBILITY_POTION: Self = Self(297);
    pub const THORNS_POTION: Self = Self(301);
    pub const WATER_WALKING_POTION: Self = Self(302);
    pub const GRAVITATION_POTION: Self = Self(305);
    pub const LIHZAHRD_BRICK: Self = Self(1101);
    pub const CHLOROPHYTE_BAR: Self = Self(1006);
    pub const CHLOROPHYTE_ARROW: Self = Self(1235);
    pub const IRON_ANVIL: Self = Self(35);
    pub const LEAD_ANVIL: Self = Self(716);
    pub const IRON_HELMET: Self = Self(90);
    pub const IRON_CHAINMAIL: Self = Self(81);
    pub const IRON_GREAVES: Self = Self(77);
    pub const LEAD_HELMET: Self = Self(691);
    pub const LEAD_CHAINMAIL: Self = Self(692);
    pub const LEAD_GREAVES: Self = Self(693);
    pub const PLATINUM_HELMET: Self = Self(696);
    pub const PLATINUM_CHAINMAIL: Self = Self(697);
    pub const PLATINUM_GREAVES: Self = Self(698);
    pub const GRAPPLING_HOOK: Self = Self(84);
    pub const MOLTEN_HELMET: Self = Self(231);
    pub const MOLTEN_BREASTPLATE: Self = Self(232);
    pub const MOLTEN_GREAVES: Self = Self(233);
    pub const HELLFIRE_TREADS: Self = Self(5000);
    pub const FLEDGLING_WINGS: Self = Self(4978);
    pub const SWORDFISH: Self = Self(2332);
    pub const BLOWGUN: Self = Self(986);
    pub const HOLY_ARROW: Self = Self(516);
    pub const CURSED_ARROW: Self = Self(545);
    pub const ICHOR_ARROW: Self = Self(1334);
    pub const HONEYFIN: Self = Self(2314);
    pub const BALL_O_HURT: Self = Self(162);
    pub const THE_MEATBALL: Self = Self(3290);
    pub const QUAD_BARREL_SHOTGUN: Self = Self(4703);
    pub const MAGIC_MISSILE: Self = Self(113);
    pub const COBWEB: Self = Self(150);
    pub const MURAMASA: Self = Self(155);
    pub const COBALT_SHIELD: Self = Self(156);
    pub const AQUA_SCEPTER: Self = Self(157);
    pub const BLUE_MOON: Self = Self(163);
    pub const HANDGUN: Self = Self(164);
    pub const SILVER_BULLET: Self = Self(278);
    pub const SHADOW_KEY: Self = Self(329);
    pub const WEB_SLINGER: Self = Self(939);
    pub const TITAN_POTION: Self = Self(2326);
    pub const TELEPORTATION_POTION: Self = Self(2351);
    pub const BONE_TORCH: Self = Self(3004);
    pub const VALOR: Self = Self(3317);
    pub const BONE_THROWING_KNIFE: Self = Self(3379);
    pub const STORM_SPEAR: Self = Self(4061);
    pub const THUNDER_ZAPPER: Self = Self(4062);
    pub const BAST_STATUE: Self = Self(4276);
    pub const ENCUMBERING_STONE: Self = Self(4346);
    pub const DESERT_TORCH: Self = Self(4383);
    pub const SHROOM_MINECART: Self = Self(4450);
    pub const SHROOMERANG: Self = Self(4764);
    pub const MUSHROOM_HAT: Self = Self(4779);
    pub const TUNGSTEN_BULLET: Self = Self(4915);
    pub const MUSHROOM_TORCH: Self = Self(5293);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framed_lookup_is_sorted() {
        assert!(FRAMED_LOOKUP.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_framed_blocks() {
        assert!(BlockId::CHEST.is_framed());
        assert!(BlockId::POT.is_framed());
        assert!(!BlockId::STONE.is_framed());
        assert!(!BlockId::EMPTY.is_framed());
    }

    #[test]
    fn test_solid_blocks() {
        assert!(BlockId::DIRT.is_solid());
        assert!(!BlockId::EMPTY.is_solid());
        assert!(!BlockId::VINES.is_solid());
        assert!(!BlockId::POT.is_solid());
    }

    #[test]
    fn test_default_block_is_empty() {
        assert_eq!(BlockId::default(), BlockId::EMPTY);
        assert_eq!(WallId::default(), WallId::EMPTY);
    }
}
