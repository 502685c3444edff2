use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogView, Character, Difficulty, Scenario};
use crate::items;
use crate::{RandomiserError, Result};

/// How weapons and their ammo cross over between scenarios.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponMode {
    #[default]
    Off,
    Starting,
    Match,
    Full,
    All,
    FullAmmo,
    AllAmmo,
    Troll,
    TrollStarting,
}

impl WeaponMode {
    pub fn is_active(self) -> bool {
        self != WeaponMode::Off
    }

    /// Extra weapons the troll modes keep besides the starting weapon.
    pub fn troll_retain_count(self) -> Option<usize> {
        match self {
            WeaponMode::Troll => Some(2),
            WeaponMode::TrollStarting => Some(0),
            _ => None,
        }
    }

    /// Whether a queue commit carrying ammo swaps is smoothed first.
    pub(crate) fn smooths_ammo(self) -> bool {
        !matches!(
            self,
            WeaponMode::Off
                | WeaponMode::Starting
                | WeaponMode::Match
                | WeaponMode::Troll
                | WeaponMode::TrollStarting
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OopsAll {
    Rockets,
    Grenades,
    Knives,
}

impl OopsAll {
    pub fn target(self) -> &'static str {
        match self {
            OopsAll::Rockets => items::ANTI_TANK_ROCKET,
            OopsAll::Grenades => items::HAND_GRENADE,
            OopsAll::Knives => items::COMBAT_KNIFE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomiserSettings {
    pub seed: u64,
    pub character: Character,
    pub scenario: Scenario,
    pub difficulty: Difficulty,
    pub cross_scenario_weapons: WeaponMode,
    /// Fixed starting weapon picked outside the weapon modes.
    pub starting_weapon: Option<String>,
    pub starting_hip_pouches: u32,
    pub starting_ink_ribbons: u32,
    pub bonus_start: bool,
    pub no_first_aid_spray: bool,
    pub no_green_herb: bool,
    pub no_red_herb: bool,
    pub no_gunpowder: bool,
    pub damage_traps: u32,
    pub poison_traps: u32,
    pub extra_clock_tower_items: bool,
    pub extra_medallions: bool,
    pub early_medallions: bool,
    pub oops_all_rockets: bool,
    pub oops_all_grenades: bool,
    pub oops_all_knives: bool,
    pub enemy_kill_locations: bool,
    pub unlocked_typewriters: Vec<String>,
}

impl Default for RandomiserSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            character: Character::Leon,
            scenario: Scenario::A,
            difficulty: Difficulty::Standard,
            cross_scenario_weapons: WeaponMode::Off,
            starting_weapon: None,
            starting_hip_pouches: 0,
            starting_ink_ribbons: 0,
            bonus_start: false,
            no_first_aid_spray: false,
            no_green_herb: false,
            no_red_herb: false,
            no_gunpowder: false,
            damage_traps: 0,
            poison_traps: 0,
            extra_clock_tower_items: false,
            extra_medallions: false,
            early_medallions: false,
            oops_all_rockets: false,
            oops_all_grenades: false,
            oops_all_knives: false,
            enemy_kill_locations: false,
            unlocked_typewriters: Vec::new(),
        }
    }
}

impl RandomiserSettings {
    /// The single active "Oops! All" conversion, if any.
    pub fn oops_all(&self) -> Result<Option<OopsAll>> {
        let active: Vec<(&str, OopsAll)> = [
            ("oops_all_rockets", self.oops_all_rockets, OopsAll::Rockets),
            ("oops_all_grenades", self.oops_all_grenades, OopsAll::Grenades),
            ("oops_all_knives", self.oops_all_knives, OopsAll::Knives),
        ]
        .into_iter()
        .filter(|(_, on, _)| *on)
        .map(|(name, _, kind)| (name, kind))
        .collect();

        match active.as_slice() {
            [] => Ok(None),
            [(_, kind)] => Ok(Some(*kind)),
            many => {
                let names: Vec<&str> = many.iter().map(|(name, _)| *name).collect();
                Err(RandomiserError::Config(format!(
                    "only one Oops! All option may be enabled, got {}",
                    names.join(", ")
                )))
            }
        }
    }

    /// Reject option combinations that cannot produce a session.
    pub fn validate(&self, view: &CatalogView<'_>) -> Result<()> {
        self.oops_all()?;

        if view.locations().next().is_none() {
            return Err(RandomiserError::Config(format!(
                "character {:?} / scenario {:?} / difficulty {:?} has no locations in the catalog",
                self.character, self.scenario, self.difficulty
            )));
        }

        if let Some(weapon) = self.starting_weapon.as_deref() {
            if self.cross_scenario_weapons.is_active() {
                return Err(RandomiserError::Config(format!(
                    "starting_weapon '{}' cannot be combined with cross_scenario_weapons {:?}",
                    weapon, self.cross_scenario_weapons
                )));
            }
            match view.item(weapon) {
                Some(item) if item.is_rotating_weapon() => {}
                _ => {
                    return Err(RandomiserError::Config(format!(
                        "starting_weapon '{}' is not a weapon with ammo for {:?}",
                        weapon, self.character
                    )))
                }
            }
        }

        let mut required: Vec<(&str, &str)> = Vec::new();
        if self.extra_clock_tower_items {
            required.extend(items::CLOCK_TOWER_SET.iter().map(|n| ("extra_clock_tower_items", *n)));
        }
        if self.extra_medallions {
            required.extend(items::MEDALLIONS.iter().map(|n| ("extra_medallions", *n)));
        }
        if self.early_medallions {
            required.extend(items::MEDALLIONS.iter().map(|n| ("early_medallions", *n)));
        }
        if self.damage_traps > 0 {
            required.push(("damage_traps", items::DAMAGE_TRAP));
        }
        if self.poison_traps > 0 {
            required.push(("poison_traps", items::POISON_TRAP));
        }

        for (option, name) in required {
            if view.item(name).is_none() {
                return Err(RandomiserError::Config(format!(
                    "{} needs '{}', which {:?} / {:?} does not have",
                    option, name, self.character, self.scenario
                )));
            }
        }

        Ok(())
    }
}
