//! Item names the randomiser treats specially. Everything else is looked up
//! through the catalog.

/// Ammo for the vanilla starting handgun; every mode that changes the
/// starting weapon rewrites it.
pub const BASELINE_AMMO: &str = "Handgun Ammo";

/// Ammo names starting with this belong to the handgun family, which the
/// medium tier never claims when ammo is split by level.
pub const HANDGUN_AMMO_PREFIX: &str = "Handgun";

pub const HIGH_GRADE_GUNPOWDER: &str = "High-Grade Gunpowder";
pub const HIGH_GRADE_GUNPOWDER_YELLOW: &str = "High-Grade Gunpowder - Yellow";
pub const HIGH_GRADE_GUNPOWDER_WHITE: &str = "High-Grade Gunpowder - White";
pub const GUNPOWDER: &str = "Gunpowder";

pub const BLUE_HERB: &str = "Blue Herb";
pub const GREEN_HERB: &str = "Green Herb";
pub const RED_HERB: &str = "Red Herb";
pub const FIRST_AID_SPRAY: &str = "First Aid Spray";
pub const WOODEN_BOARDS: &str = "Wooden Boards";
pub const HIP_POUCH: &str = "Hip Pouch";
pub const INK_RIBBON: &str = "Ink Ribbon";

pub const COMBAT_KNIFE: &str = "Combat Knife";
pub const HAND_GRENADE: &str = "Hand Grenade";
pub const ANTI_TANK_ROCKET: &str = "Anti-tank Rocket";

pub const DAMAGE_TRAP: &str = "Damage Trap";
pub const POISON_TRAP: &str = "Poison Trap";

/// Pads the pool when it falls short of the open locations.
pub const DEFAULT_FILLER: &str = BLUE_HERB;

/// Replaces weapons the troll modes take away.
pub const INERT_FILLER: &str = WOODEN_BOARDS;

/// Barricade item; blocks windows, so it must stay reachable.
pub const BARRICADE_ITEM: &str = WOODEN_BOARDS;

/// Original items that mark a location as common junk, safe to overwrite
/// with an extra weapon or a borrowed upgrade.
pub const COMMON_JUNK: &[&str] = &[BASELINE_AMMO, WOODEN_BOARDS, BLUE_HERB];

/// Gunpowder variants removed by `no_gunpowder`.
pub const GUNPOWDER_FAMILY: &[&str] = &[
    GUNPOWDER,
    HIGH_GRADE_GUNPOWDER,
    HIGH_GRADE_GUNPOWDER_YELLOW,
    HIGH_GRADE_GUNPOWDER_WHITE,
];

/// Replacement choices for removed gunpowder.
pub const GUNPOWDER_FILLERS: &[&str] = &[WOODEN_BOARDS, BLUE_HERB];

pub const CLOCK_TOWER_SET: &[&str] = &["Large Gear", "Small Gear"];

pub const MEDALLIONS: &[&str] = &["Lion Medallion", "Unicorn Medallion", "Maiden Medallion"];

/// Hardcore trades some pool items for ink ribbons: (item, how many).
pub const HARDCORE_INK_RIBBON_TRADES: &[(&str, usize)] =
    &[(BASELINE_AMMO, 7), (GUNPOWDER, 3), (BLUE_HERB, 2)];

pub const BONUS_START_ITEMS: &[(&str, usize)] = &[(FIRST_AID_SPRAY, 3), (BASELINE_AMMO, 4)];

pub fn is_handgun_ammo(name: &str) -> bool {
    name.starts_with(HANDGUN_AMMO_PREFIX)
}

pub fn is_high_grade_gunpowder(name: &str) -> bool {
    name.contains(HIGH_GRADE_GUNPOWDER)
}
