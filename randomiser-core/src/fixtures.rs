//! In-memory Leon A catalog shared by the unit tests.

use crate::catalog::{
    Catalog, Character, Difficulty, ItemDefinition, ItemType, LocationRecord, LocationSource,
    Scenario, Tier,
};

const REGIONS: [&str; 4] = ["Main Hall (LA)", "West Office (LA)", "Library (LA)", "Basement (LA)"];

/// Stable per-name id so hand-built catalogs never collide.
fn name_id(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

pub(crate) fn item(name: &str, item_type: ItemType) -> ItemDefinition {
    ItemDefinition {
        id: name_id(name),
        name: name.to_string(),
        item_type,
        ammo: None,
        groups: Vec::new(),
        progression: false,
        upgrades: None,
        character: Character::Leon,
    }
}

pub(crate) fn weapon(name: &str, ammo: &str, tier: Tier) -> ItemDefinition {
    ItemDefinition {
        ammo: Some(ammo.to_string()),
        groups: vec![tier.group_tag().to_string()],
        ..item(name, ItemType::Weapon)
    }
}

fn upgrade(name: &str, target: &str) -> ItemDefinition {
    ItemDefinition {
        upgrades: Some(target.to_string()),
        ..item(name, ItemType::Upgrade)
    }
}

fn key(name: &str) -> ItemDefinition {
    ItemDefinition {
        progression: true,
        ..item(name, ItemType::Key)
    }
}

pub(crate) fn location(id: u64, name: &str, item: &str) -> LocationRecord {
    LocationRecord {
        id,
        name: name.to_string(),
        region: REGIONS[0].to_string(),
        character: Character::Leon,
        scenario: Scenario::A,
        difficulty: None,
        original_item: (!item.is_empty()).then(|| item.to_string()),
        force_item: None,
        randomized: true,
        forbid_item: Vec::new(),
        swapped: false,
        condition: None,
        source: LocationSource::Pickup,
    }
}

fn fixture_items() -> Vec<ItemDefinition> {
    let mut items = vec![
        item("Handgun Ammo", ItemType::Ammo),
        item("Large-Caliber Handgun Ammo", ItemType::Ammo),
        item("Shotgun Shells", ItemType::Ammo),
        item("Acid Rounds", ItemType::Ammo),
        item("Submachine Gun Ammo", ItemType::Ammo),
        item("High-Powered Rounds", ItemType::Ammo),
        item("Needle Cartridges", ItemType::Ammo),
        item("Fuel", ItemType::Ammo),
        weapon("Matilda", "Handgun Ammo", Tier::Light),
        weapon("JMB Hp3", "Handgun Ammo", Tier::Light),
        weapon("SLS 60", "Large-Caliber Handgun Ammo", Tier::Light),
        weapon("W-870", "Shotgun Shells", Tier::Medium),
        weapon("GM 79", "Acid Rounds", Tier::Medium),
        weapon("MQ 11", "Submachine Gun Ammo", Tier::Medium),
        weapon("Lightning Hawk", "High-Powered Rounds", Tier::Heavy),
        weapon("Spark Shot", "Needle Cartridges", Tier::Heavy),
        weapon("Flamethrower", "Fuel", Tier::Heavy),
        item("Minigun", ItemType::Weapon),
        item("Anti-tank Rocket", ItemType::Weapon),
        item("Combat Knife", ItemType::Subweapon),
        item("Hand Grenade", ItemType::Subweapon),
        item("Flash Grenade", ItemType::Subweapon),
        upgrade("Matilda High-Capacity Mag", "Matilda"),
        upgrade("W-870 Shotgun Stock", "W-870"),
        upgrade("MQ 11 Suppressor", "MQ 11"),
        upgrade("Lightning Hawk Long Barrel", "Lightning Hawk"),
        upgrade("GM 79 Shoulder Stock", "GM 79"),
        item("Green Herb", ItemType::Recovery),
        item("Red Herb", ItemType::Recovery),
        item("Blue Herb", ItemType::Recovery),
        item("First Aid Spray", ItemType::Recovery),
        item("Gunpowder", ItemType::Resource),
        item("High-Grade Gunpowder", ItemType::Resource),
        item("High-Grade Gunpowder - Yellow", ItemType::Resource),
        item("High-Grade Gunpowder - White", ItemType::Resource),
        item("Ink Ribbon", ItemType::Resource),
        item("Wooden Boards", ItemType::Resource),
        item("Hip Pouch", ItemType::Key),
        key("Large Gear"),
        key("Small Gear"),
        key("Lion Medallion"),
        key("Unicorn Medallion"),
        key("Maiden Medallion"),
        key("Spade Key"),
        item("Police Memo", ItemType::Lore),
        item("Patrol Report", ItemType::Lore),
        item("Damage Trap", ItemType::Trap),
        item("Poison Trap", ItemType::Trap),
    ];
    for (idx, def) in items.iter_mut().enumerate() {
        def.id = 3_000_000_000 + idx as u64;
    }
    items
}

fn fixture_locations() -> Vec<LocationRecord> {
    let contents: &[(&str, usize)] = &[
        ("Handgun Ammo", 32),
        ("Shotgun Shells", 8),
        ("Acid Rounds", 4),
        ("High-Powered Rounds", 3),
        ("Fuel", 3),
        ("Gunpowder", 10),
        ("High-Grade Gunpowder", 4),
        ("Blue Herb", 6),
        ("Green Herb", 8),
        ("Red Herb", 3),
        ("First Aid Spray", 4),
        ("Wooden Boards", 6),
        ("Hip Pouch", 4),
        ("Police Memo", 3),
        ("Patrol Report", 2),
        ("W-870", 1),
        ("GM 79", 1),
        ("Lightning Hawk", 1),
        ("Flamethrower", 1),
        ("Matilda High-Capacity Mag", 1),
        ("W-870 Shotgun Stock", 1),
        ("Hand Grenade", 3),
        ("Flash Grenade", 2),
        ("Large Gear", 1),
        ("Small Gear", 1),
        ("Spade Key", 1),
        ("Lion Medallion", 1),
        ("Unicorn Medallion", 1),
        ("Maiden Medallion", 1),
        ("", 2),
    ];

    let mut locations = Vec::new();
    let mut next_id = 3_000_000_000u64;
    let mut push = |locations: &mut Vec<LocationRecord>, item: &str| {
        let idx = locations.len();
        let mut loc = location(next_id, &format!("Spot {}", idx), item);
        loc.region = REGIONS[idx % REGIONS.len()].to_string();
        next_id += 1;
        locations.push(loc);
    };

    for &(item, count) in contents {
        for _ in 0..count {
            push(&mut locations, item);
        }
    }

    // Fixed pickups the filler never touches.
    for item in ["Combat Knife", "Minigun", "Anti-tank Rocket"] {
        push(&mut locations, item);
        if let Some(loc) = locations.last_mut() {
            loc.randomized = false;
        }
    }

    push(&mut locations, "Blue Herb");
    if let Some(loc) = locations.last_mut() {
        loc.force_item = Some("Spade Key".to_string());
    }

    for item in ["Handgun Ammo", "Gunpowder"] {
        push(&mut locations, item);
        if let Some(loc) = locations.last_mut() {
            loc.difficulty = Some(Difficulty::Hardcore);
            loc.region = "Main Hall (LAH)".to_string();
        }
    }

    for _ in 0..2 {
        push(&mut locations, "");
        if let Some(loc) = locations.last_mut() {
            loc.source = LocationSource::EnemyKill;
            loc.id += 1_000_000_000;
        }
    }

    locations
}

pub(crate) fn leon_a_catalog() -> Catalog {
    Catalog::from_parts(fixture_items(), fixture_locations(), Vec::new())
        .expect("fixture catalog is valid")
}
