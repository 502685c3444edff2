use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::{RandomiserError, Result};

const ID_BASE: u64 = 3_000_000_000;
const ENEMY_ID_OFFSET: u64 = 1_000_000_000;
// Hardcore-only locations live in the last 100 ids of each scenario block.
const HARDCORE_ID_OFFSET: u64 = 400;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Leon,
    Claire,
}

impl Character {
    pub const ALL: [Character; 2] = [Character::Leon, Character::Claire];

    pub fn dir_name(self) -> &'static str {
        match self {
            Character::Leon => "leon",
            Character::Claire => "claire",
        }
    }

    fn id_offset(self) -> u64 {
        match self {
            Character::Leon => 0,
            Character::Claire => 1000,
        }
    }

    fn initial(self) -> char {
        match self {
            Character::Leon => 'L',
            Character::Claire => 'C',
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    A,
    B,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::A, Scenario::B];

    pub fn dir_name(self) -> &'static str {
        match self {
            Scenario::A => "a",
            Scenario::B => "b",
        }
    }

    fn id_offset(self) -> u64 {
        match self {
            Scenario::A => 0,
            Scenario::B => 500,
        }
    }

    fn letter(self) -> char {
        match self {
            Scenario::A => 'A',
            Scenario::B => 'B',
        }
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Standard,
    Hardcore,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Subweapon,
    Ammo,
    Upgrade,
    Recovery,
    Resource,
    Key,
    Lore,
    Trap,
}

/// Weapon power class, read from the `light_gun` / `medium_gun` /
/// `heavy_gun` group tags.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Light,
    Medium,
    Heavy,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Light, Tier::Medium, Tier::Heavy];

    pub fn group_tag(self) -> &'static str {
        match self {
            Tier::Light => "light_gun",
            Tier::Medium => "medium_gun",
            Tier::Heavy => "heavy_gun",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Light => "Light",
            Tier::Medium => "Medium",
            Tier::Heavy => "Heavy",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub ammo: Option<String>,
    pub groups: Vec<String>,
    pub progression: bool,
    pub upgrades: Option<String>,
    pub character: Character,
}

impl ItemDefinition {
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn tier(&self) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| self.in_group(tier.group_tag()))
    }

    /// Weapons without an ammo counterpart (boss and endgame weapons) never
    /// take part in weapon rotation.
    pub fn is_rotating_weapon(&self) -> bool {
        self.item_type == ItemType::Weapon && self.ammo.is_some()
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum LocationSource {
    #[default]
    Pickup,
    EnemyKill,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCondition {
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: u64,
    pub name: String,
    pub region: String,
    pub character: Character,
    pub scenario: Scenario,
    pub difficulty: Option<Difficulty>,
    pub original_item: Option<String>,
    pub force_item: Option<String>,
    pub randomized: bool,
    pub forbid_item: Vec<String>,
    #[serde(default)]
    pub swapped: bool,
    pub condition: Option<AccessCondition>,
    #[serde(default)]
    pub source: LocationSource,
}

impl LocationRecord {
    pub fn full_name(&self) -> String {
        format!("{} - {}", self.region, self.name)
    }

    /// Filled locations are placed directly by the host and never draw from
    /// the candidate pool.
    pub fn is_filled(&self) -> bool {
        self.bound_item().is_some()
    }

    pub fn bound_item(&self) -> Option<&str> {
        if let Some(force) = self.force_item.as_deref() {
            return Some(force);
        }
        if !self.randomized {
            return self.original_item.as_deref();
        }
        None
    }

    pub fn holds(&self, item_name: &str) -> bool {
        self.original_item.as_deref() == Some(item_name)
            || self.force_item.as_deref() == Some(item_name)
    }

    /// Overwrite whichever of force and original items satisfy `matches`,
    /// leaving the other slot alone. Returns whether anything changed.
    pub(crate) fn replace_matching(&mut self, matches: impl Fn(&str) -> bool, item: &str) -> bool {
        let mut replaced = false;
        for slot in [&mut self.force_item, &mut self.original_item] {
            if slot.as_deref().map_or(false, &matches) {
                *slot = Some(item.to_string());
                replaced = true;
            }
        }
        replaced
    }

    /// Open for the filler: randomized, nothing forced, not yet swapped.
    pub(crate) fn is_rewritable(&self) -> bool {
        !self.swapped && self.randomized && self.force_item.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionDefinition {
    pub name: String,
    pub character: Character,
    pub scenario: Scenario,
    pub zone_id: Option<u32>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<ItemDefinition>,
    locations: Vec<LocationRecord>,
    regions: Vec<RegionDefinition>,
    by_name: HashMap<Character, HashMap<String, usize>>,
    by_id: HashMap<u64, usize>,
}

impl Catalog {
    /// Build a catalog from already-typed records, checking that every name a
    /// location or item refers to resolves within its character.
    pub fn from_parts(
        items: Vec<ItemDefinition>,
        locations: Vec<LocationRecord>,
        regions: Vec<RegionDefinition>,
    ) -> Result<Self> {
        let mut by_name: HashMap<Character, HashMap<String, usize>> = HashMap::new();
        let mut by_id = HashMap::new();

        for (idx, item) in items.iter().enumerate() {
            let names = by_name.entry(item.character).or_default();
            if names.insert(item.name.clone(), idx).is_some() {
                return Err(RandomiserError::Catalog(format!(
                    "duplicate item '{}' for {:?}",
                    item.name, item.character
                )));
            }
            if let Some(prev) = by_id.insert(item.id, idx) {
                return Err(RandomiserError::Catalog(format!(
                    "item id {} used by both '{}' and '{}'",
                    item.id, items[prev].name, item.name
                )));
            }
        }

        let catalog = Catalog {
            items,
            locations,
            regions,
            by_name,
            by_id,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        for item in &self.items {
            if let Some(ammo) = item.ammo.as_deref() {
                match self.lookup(item.character, ammo) {
                    Some(def) if def.item_type == ItemType::Ammo => {}
                    _ => {
                        return Err(RandomiserError::Catalog(format!(
                            "weapon '{}' names ammo '{}' which is not an Ammo item",
                            item.name, ammo
                        )))
                    }
                }
            }

            if let Some(target) = item.upgrades.as_deref() {
                match self.lookup(item.character, target) {
                    Some(def) if def.item_type == ItemType::Weapon => {}
                    _ => {
                        return Err(RandomiserError::Catalog(format!(
                            "upgrade '{}' targets '{}' which is not a Weapon",
                            item.name, target
                        )))
                    }
                }
            }
        }

        for loc in &self.locations {
            for name in [loc.original_item.as_deref(), loc.force_item.as_deref()]
                .into_iter()
                .flatten()
            {
                if self.lookup(loc.character, name).is_none() {
                    return Err(RandomiserError::Catalog(format!(
                        "location '{}' holds unknown item '{}'",
                        loc.full_name(),
                        name
                    )));
                }
            }
        }

        Ok(())
    }

    fn lookup(&self, character: Character, name: &str) -> Option<&ItemDefinition> {
        self.by_name
            .get(&character)
            .and_then(|names| names.get(name))
            .map(|&idx| &self.items[idx])
    }

    /// Load the `<root>/<character>/<scenario>/*.json` data layout. Missing
    /// files are treated as empty so partially authored characters load.
    pub fn load(root: &Path) -> Result<Self> {
        let mut items = Vec::new();
        let mut locations = Vec::new();
        let mut regions = Vec::new();

        for character in Character::ALL {
            let char_dir = root.join(character.dir_name());
            let raw_items: Vec<RawItem> = read_json_list(&char_dir.join("items.json"))?;
            let item_start = ID_BASE + character.id_offset();

            for (key, raw) in raw_items.into_iter().enumerate() {
                items.push(ItemDefinition {
                    id: raw.id.unwrap_or(item_start + key as u64),
                    name: raw.name,
                    item_type: raw.item_type,
                    ammo: raw.ammo.filter(|a| !a.is_empty()),
                    groups: raw.groups,
                    progression: raw.progression.map(Flag::is_set).unwrap_or(false),
                    upgrades: raw.upgrades.filter(|u| !u.is_empty()),
                    character,
                });
            }

            for scenario in Scenario::ALL {
                let dir = char_dir.join(scenario.dir_name());
                load_scenario(&dir, character, scenario, &mut locations, &mut regions)?;
            }
        }

        log::info!(
            "loaded catalog from {}: {} items, {} locations, {} regions",
            root.display(),
            items.len(),
            locations.len(),
            regions.len()
        );

        Catalog::from_parts(items, locations, regions)
    }

    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    pub fn locations(&self) -> &[LocationRecord] {
        &self.locations
    }

    pub fn regions(&self) -> &[RegionDefinition] {
        &self.regions
    }

    pub fn view(
        &self,
        character: Character,
        scenario: Scenario,
        difficulty: Difficulty,
    ) -> CatalogView<'_> {
        CatalogView {
            catalog: self,
            character,
            scenario,
            difficulty,
        }
    }
}

fn scenario_suffix(character: Character, scenario: Scenario, hardcore: bool) -> String {
    format!(
        " ({}{}{})",
        character.initial(),
        scenario.letter(),
        if hardcore { "H" } else { "" }
    )
}

fn suffixed_region(region: &str, suffix: &str) -> String {
    if region == "Menu" {
        region.to_string()
    } else {
        format!("{region}{suffix}")
    }
}

fn load_scenario(
    dir: &Path,
    character: Character,
    scenario: Scenario,
    locations: &mut Vec<LocationRecord>,
    regions: &mut Vec<RegionDefinition>,
) -> Result<()> {
    let suffix = scenario_suffix(character, scenario, false);
    let hardcore_suffix = scenario_suffix(character, scenario, true);
    let location_start = ID_BASE + character.id_offset() + scenario.id_offset();

    let raw_regions: Vec<RawRegion> = read_json_list(&dir.join("regions.json"))?;
    let raw_locations: Vec<RawLocation> = read_json_list(&dir.join("locations.json"))?;
    let raw_hardcore: Vec<RawLocation> = read_json_list(&dir.join("locations_hardcore.json"))?;
    let raw_enemies: Vec<RawEnemy> = read_json_list(&dir.join("enemies.json"))?;

    for reg in &raw_regions {
        regions.push(RegionDefinition {
            name: suffixed_region(&reg.name, &suffix),
            character,
            scenario,
            zone_id: reg.zone_id,
        });
    }

    // Hardcore locations get their own copies of the regions they sit in.
    let mut hardcore_regions: Vec<&str> = Vec::new();
    for loc in &raw_hardcore {
        if !hardcore_regions.contains(&loc.region.as_str()) {
            hardcore_regions.push(&loc.region);
        }
    }
    for name in hardcore_regions {
        let zone_id = raw_regions
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| r.zone_id);
        regions.push(RegionDefinition {
            name: format!("{name}{hardcore_suffix}"),
            character,
            scenario,
            zone_id,
        });
    }

    for (key, raw) in raw_locations.into_iter().enumerate() {
        let id = raw.id.unwrap_or(location_start + key as u64);
        locations.push(raw.into_record(id, &suffix, character, scenario, None));
    }

    for (key, raw) in raw_hardcore.into_iter().enumerate() {
        let id = raw
            .id
            .unwrap_or(location_start + key as u64 + HARDCORE_ID_OFFSET);
        locations.push(raw.into_record(
            id,
            &hardcore_suffix,
            character,
            scenario,
            Some(Difficulty::Hardcore),
        ));
    }

    for (key, raw) in raw_enemies.into_iter().enumerate() {
        locations.push(LocationRecord {
            id: raw
                .id
                .unwrap_or(location_start + ENEMY_ID_OFFSET + key as u64),
            name: raw.name,
            region: suffixed_region(&raw.region, &suffix),
            character,
            scenario,
            difficulty: None,
            original_item: None,
            force_item: None,
            randomized: true,
            forbid_item: Vec::new(),
            swapped: false,
            condition: None,
            source: LocationSource::EnemyKill,
        });
    }

    Ok(())
}

fn read_json_list<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data)
        .map_err(|e| RandomiserError::Catalog(format!("{}: {}", path.display(), e)))
}

/// Data files write flags either as booleans or as 0/1.
#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(i) => i != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<u64>,
    name: String,
    #[serde(rename = "type")]
    item_type: ItemType,
    #[serde(default)]
    ammo: Option<String>,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    progression: Option<Flag>,
    #[serde(default)]
    upgrades: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    #[serde(default)]
    id: Option<u64>,
    name: String,
    region: String,
    #[serde(default)]
    original_item: Option<String>,
    #[serde(default)]
    force_item: Option<String>,
    #[serde(default)]
    randomized: Option<Flag>,
    #[serde(default)]
    forbid_item: Vec<String>,
    #[serde(default)]
    condition: Option<AccessCondition>,
}

impl RawLocation {
    fn into_record(
        self,
        id: u64,
        suffix: &str,
        character: Character,
        scenario: Scenario,
        difficulty: Option<Difficulty>,
    ) -> LocationRecord {
        LocationRecord {
            id,
            region: suffixed_region(&self.region, suffix),
            name: self.name,
            character,
            scenario,
            difficulty,
            original_item: self.original_item.filter(|s| !s.is_empty()),
            force_item: self.force_item.filter(|s| !s.is_empty()),
            randomized: self.randomized.map(Flag::is_set).unwrap_or(true),
            forbid_item: self.forbid_item,
            swapped: false,
            condition: self.condition,
            source: LocationSource::Pickup,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRegion {
    name: String,
    #[serde(default)]
    zone_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawEnemy {
    #[serde(default)]
    id: Option<u64>,
    name: String,
    region: String,
}

/// A read-only slice of the catalog for one character, scenario and
/// difficulty. Cheap to copy; every session holds one.
#[derive(Copy, Clone, Debug)]
pub struct CatalogView<'a> {
    catalog: &'a Catalog,
    pub character: Character,
    pub scenario: Scenario,
    pub difficulty: Difficulty,
}

impl<'a> CatalogView<'a> {
    pub fn item(&self, name: &str) -> Option<&'a ItemDefinition> {
        let catalog: &'a Catalog = self.catalog;
        catalog.lookup(self.character, name)
    }

    pub fn require(&self, name: &str) -> Result<&'a ItemDefinition> {
        self.item(name).ok_or_else(|| RandomiserError::UnknownItem {
            name: name.to_string(),
            character: self.character,
        })
    }

    pub fn item_by_id(&self, id: u64) -> Option<&'a ItemDefinition> {
        let catalog: &'a Catalog = self.catalog;
        catalog
            .by_id
            .get(&id)
            .map(|&idx| &catalog.items[idx])
            .filter(|item| item.character == self.character)
    }

    pub fn item_type(&self, name: &str) -> Option<ItemType> {
        self.item(name).map(|item| item.item_type)
    }

    pub fn items(&self) -> impl Iterator<Item = &'a ItemDefinition> + 'a {
        let catalog: &'a Catalog = self.catalog;
        let character = self.character;
        catalog
            .items
            .iter()
            .filter(move |item| item.character == character)
    }

    pub fn items_of_type(&self, item_type: ItemType) -> impl Iterator<Item = &'a ItemDefinition> + 'a {
        self.items().filter(move |item| item.item_type == item_type)
    }

    pub fn items_in_group(&self, group: &str) -> Vec<&'a ItemDefinition> {
        self.items().filter(|item| item.in_group(group)).collect()
    }

    pub fn locations(&self) -> impl Iterator<Item = &'a LocationRecord> + 'a {
        let catalog: &'a Catalog = self.catalog;
        let (character, scenario, difficulty) = (self.character, self.scenario, self.difficulty);
        catalog.locations.iter().filter(move |loc| {
            loc.character == character
                && loc.scenario == scenario
                && loc.difficulty.map_or(true, |d| d == difficulty)
        })
    }

    /// Fresh per-session copies of the scenario's locations.
    pub fn session_locations(&self, include_enemy_kills: bool) -> Vec<LocationRecord> {
        self.locations()
            .filter(|loc| include_enemy_kills || loc.source != LocationSource::EnemyKill)
            .cloned()
            .map(|mut loc| {
                loc.swapped = false;
                loc
            })
            .collect()
    }

    pub fn regions(&self) -> impl Iterator<Item = &'a RegionDefinition> + 'a {
        let catalog: &'a Catalog = self.catalog;
        let (character, scenario) = (self.character, self.scenario);
        catalog
            .regions
            .iter()
            .filter(move |r| r.character == character && r.scenario == scenario)
    }
}
