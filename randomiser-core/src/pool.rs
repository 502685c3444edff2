use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::catalog::{CatalogView, Difficulty, ItemDefinition, ItemType, LocationRecord};
use crate::items;
use crate::settings::RandomiserSettings;
use crate::{RandomiserError, Result};

const POOL_SEED_SALT: u64 = 0x9001_B00C_u64;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Progression,
    Useful,
    Filler,
    Trap,
}

impl Classification {
    pub fn of(item: &ItemDefinition) -> Self {
        if item.progression {
            return Classification::Progression;
        }
        match item.item_type {
            ItemType::Trap => Classification::Trap,
            ItemType::Ammo | ItemType::Recovery | ItemType::Resource | ItemType::Lore => {
                Classification::Filler
            }
            _ => Classification::Useful,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PoolItem {
    pub name: String,
    pub id: u64,
    pub classification: Classification,
}

impl PoolItem {
    pub fn new(item: &ItemDefinition) -> Self {
        Self {
            name: item.name.clone(),
            id: item.id,
            classification: Classification::of(item),
        }
    }
}

/// Items awaiting placement, in the order they were produced.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandidatePool {
    items: Vec<PoolItem>,
}

impl CandidatePool {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[PoolItem] {
        &self.items
    }

    pub fn count(&self, name: &str) -> usize {
        self.items.iter().filter(|i| i.name == name).count()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.name.as_str()).collect()
    }

    pub(crate) fn push(&mut self, item: PoolItem) {
        self.items.push(item);
    }

    pub(crate) fn remove_first(&mut self, name: &str) -> Option<PoolItem> {
        let idx = self.items.iter().position(|i| i.name == name)?;
        Some(self.items.remove(idx))
    }

    fn positions(&self, mut pred: impl FnMut(&PoolItem) -> bool) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|&(_, item)| pred(item))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn set(&mut self, idx: usize, item: PoolItem) {
        self.items[idx] = item;
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationWarning {
    /// Reconciliation ran out of trimmable items.
    SizeMismatch { pool: usize, open_slots: usize },
    /// More traps were requested than there were low-priority slots.
    DroppedTraps { trap: String, dropped: usize },
}

/// An option whose requested value could not be honoured.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClampedOption {
    pub option: String,
    pub requested: u32,
    pub effective: u32,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct PoolOutcome {
    pub pool: CandidatePool,
    pub precollected: Vec<String>,
    pub clamped: Vec<ClampedOption>,
    pub priority_early: Vec<String>,
    pub warnings: Vec<GenerationWarning>,
}

/// Turns the session's locations into a candidate pool sized to the open
/// slots, applying every pool-shaping option in a fixed order.
pub struct PoolSynthesizer<'a> {
    view: CatalogView<'a>,
    rng: StdRng,
}

impl<'a> PoolSynthesizer<'a> {
    pub fn new(view: CatalogView<'a>, seed: u64) -> Self {
        Self {
            view,
            rng: StdRng::seed_from_u64(seed ^ POOL_SEED_SALT),
        }
    }

    /// Build and reconcile the pool. Clamped starting counts are written back
    /// into `settings`.
    pub fn run(
        &mut self,
        locations: &[LocationRecord],
        settings: &mut RandomiserSettings,
    ) -> Result<PoolOutcome> {
        let mut out = PoolOutcome::default();

        for loc in locations {
            if let Some(name) = loc.original_item.as_deref() {
                out.pool.push(self.pool_item(name)?);
            }
        }
        log::info!("pool: {} items from {} locations", out.pool.len(), locations.len());

        if let Some(weapon) = settings.starting_weapon.clone() {
            self.starting_weapon(&mut out.pool, &weapon)?;
        }
        self.remove_filled(&mut out.pool, locations);
        if settings.difficulty == Difficulty::Hardcore {
            self.hardcore_ink_ribbons(&mut out.pool)?;
        }
        self.starting_inventory(&mut out, settings);
        if settings.bonus_start {
            for &(name, count) in items::BONUS_START_ITEMS {
                out.precollected.extend(std::iter::repeat(name.to_string()).take(count));
            }
        }
        self.substitutions(&mut out.pool, settings)?;
        self.traps(&mut out, settings)?;
        self.structural_items(&mut out, settings)?;
        if let Some(oops) = settings.oops_all()? {
            self.oops_all(&mut out.pool, oops.target())?;
        }

        let open_slots = locations.iter().filter(|l| !l.is_filled()).count();
        if let Some(warning) = self.reconcile(&mut out.pool, open_slots)? {
            out.warnings.push(warning);
        }

        if settings.enemy_kill_locations {
            let boards = out.pool.positions(|i| i.name == items::BARRICADE_ITEM);
            let herb = self.pool_item(items::DEFAULT_FILLER)?;
            for idx in boards {
                out.pool.set(idx, herb.clone());
            }
        }

        log::info!(
            "pool finalised: {} items for {} open slots, {} pre-collected",
            out.pool.len(),
            open_slots,
            out.precollected.len()
        );
        Ok(out)
    }

    fn pool_item(&self, name: &str) -> Result<PoolItem> {
        self.view.require(name).map(PoolItem::new)
    }

    fn starting_weapon(&self, pool: &mut CandidatePool, weapon: &str) -> Result<()> {
        let def = self.view.require(weapon)?;
        let Some(ammo) = def.ammo.as_deref() else {
            return Err(RandomiserError::Config(format!(
                "starting_weapon '{}' has no ammo",
                weapon
            )));
        };
        let replacement = self.pool_item(ammo)?;
        for idx in pool.positions(|i| i.name == weapon) {
            pool.set(idx, replacement.clone());
        }
        Ok(())
    }

    fn remove_filled(&self, pool: &mut CandidatePool, locations: &[LocationRecord]) {
        for loc in locations {
            let Some(bound) = loc.bound_item() else {
                continue;
            };
            if pool.remove_first(bound).is_none() {
                log::warn!(
                    "{} is bound to '{}' but the pool holds none",
                    loc.full_name(),
                    bound
                );
            }
        }
    }

    fn hardcore_ink_ribbons(&self, pool: &mut CandidatePool) -> Result<()> {
        let ribbon = self.pool_item(items::INK_RIBBON)?;
        for &(name, limit) in items::HARDCORE_INK_RIBBON_TRADES {
            let found = pool.positions(|i| i.name == name);
            for &idx in found.iter().take(limit) {
                pool.set(idx, ribbon.clone());
            }
            log::debug!("hardcore: {} x {} became ink ribbons", found.len().min(limit), name);
        }
        Ok(())
    }

    fn starting_inventory(&self, out: &mut PoolOutcome, settings: &mut RandomiserSettings) {
        let requests = [
            ("starting_hip_pouches", items::HIP_POUCH, &mut settings.starting_hip_pouches),
            ("starting_ink_ribbons", items::INK_RIBBON, &mut settings.starting_ink_ribbons),
        ];

        for (option, name, requested) in requests {
            if *requested == 0 {
                continue;
            }
            let mut taken = 0u32;
            while taken < *requested {
                let Some(item) = out.pool.remove_first(name) else {
                    break;
                };
                out.precollected.push(item.name);
                taken += 1;
            }

            if taken < *requested {
                log::warn!("{} clamped from {} to {}", option, *requested, taken);
                out.clamped.push(ClampedOption {
                    option: option.to_string(),
                    requested: *requested,
                    effective: taken,
                });
                *requested = taken;
            }
        }
    }

    fn substitutions(&mut self, pool: &mut CandidatePool, settings: &RandomiserSettings) -> Result<()> {
        let boards = self.pool_item(items::INERT_FILLER)?;
        let removals = [
            (settings.no_first_aid_spray, items::FIRST_AID_SPRAY),
            (settings.no_green_herb, items::GREEN_HERB),
            (settings.no_red_herb, items::RED_HERB),
        ];
        for (_, name) in removals.into_iter().filter(|(on, _)| *on) {
            for idx in pool.positions(|i| i.name == name) {
                pool.set(idx, boards.clone());
            }
        }

        if settings.no_gunpowder {
            let fillers: Vec<PoolItem> = items::GUNPOWDER_FILLERS
                .iter()
                .map(|name| self.pool_item(name))
                .collect::<Result<_>>()?;
            for idx in pool.positions(|i| items::GUNPOWDER_FAMILY.contains(&i.name.as_str())) {
                if let Some(filler) = fillers.choose(&mut self.rng) {
                    pool.set(idx, filler.clone());
                }
            }
        }
        Ok(())
    }

    /// Pool indices that may be overwritten without loss: lore first, then
    /// baseline ammo.
    fn low_priority_slots(&self, pool: &CandidatePool) -> Vec<usize> {
        let mut slots = pool.positions(|i| {
            i.classification != Classification::Progression
                && self.view.item_type(&i.name) == Some(ItemType::Lore)
        });
        slots.extend(pool.positions(|i| i.name == items::BASELINE_AMMO));
        slots
    }

    fn traps(&mut self, out: &mut PoolOutcome, settings: &RandomiserSettings) -> Result<()> {
        let requests = [
            (items::DAMAGE_TRAP, settings.damage_traps),
            (items::POISON_TRAP, settings.poison_traps),
        ];

        for (trap, count) in requests {
            if count == 0 {
                continue;
            }
            let trap_item = self.pool_item(trap)?;
            let slots = self.low_priority_slots(&out.pool);
            let count = count as usize;

            for &idx in slots.iter().take(count) {
                out.pool.set(idx, trap_item.clone());
            }

            if slots.len() < count {
                let dropped = count - slots.len();
                log::warn!("dropped {} x {}: no low-priority slots left", dropped, trap);
                out.warnings.push(GenerationWarning::DroppedTraps {
                    trap: trap.to_string(),
                    dropped,
                });
            }
        }
        Ok(())
    }

    fn structural_items(&mut self, out: &mut PoolOutcome, settings: &RandomiserSettings) -> Result<()> {
        let mut extras: Vec<&str> = Vec::new();
        if settings.extra_clock_tower_items {
            extras.extend(items::CLOCK_TOWER_SET);
        }
        if settings.extra_medallions {
            extras.extend(items::MEDALLIONS);
        }

        for name in extras {
            let extra = self.pool_item(name)?;
            match self.low_priority_slots(&out.pool).first() {
                Some(&idx) => out.pool.set(idx, extra),
                None => out.pool.push(extra),
            }
        }

        if settings.early_medallions {
            out.priority_early
                .extend(items::MEDALLIONS.iter().map(|n| n.to_string()));
        }
        Ok(())
    }

    fn oops_all(&mut self, pool: &mut CandidatePool, target: &str) -> Result<()> {
        let converted = self.pool_item(target)?;
        let view = self.view;
        let slots = pool.positions(|i| {
            i.name != items::ANTI_TANK_ROCKET
                && view.item(&i.name).map_or(false, |def| {
                    !def.progression
                        && matches!(
                            def.item_type,
                            ItemType::Weapon | ItemType::Subweapon | ItemType::Ammo
                        )
                })
        });
        log::info!("oops all: {} items become {}", slots.len(), target);
        for idx in slots {
            pool.set(idx, converted.clone());
        }

        if pool.count(items::COMBAT_KNIFE) == 0 {
            let knife = self.pool_item(items::COMBAT_KNIFE)?;
            let slot = self
                .low_priority_slots(pool)
                .first()
                .copied()
                .or_else(|| pool.positions(|i| i.name == target).last().copied());
            match slot {
                Some(idx) => pool.set(idx, knife),
                None => pool.push(knife),
            }
        }
        Ok(())
    }

    /// Pad or trim the pool to exactly `open_slots` items. Trimming takes the
    /// cheapest items first, latest occurrence first.
    fn reconcile(&self, pool: &mut CandidatePool, open_slots: usize) -> Result<Option<GenerationWarning>> {
        if pool.len() < open_slots {
            let herb = self.pool_item(items::DEFAULT_FILLER)?;
            log::debug!("padding pool with {} x {}", open_slots - pool.len(), herb.name);
            while pool.len() < open_slots {
                pool.push(herb.clone());
            }
            return Ok(None);
        }

        let view = self.view;
        let trim_order: [&dyn Fn(&PoolItem) -> bool; 3] = [
            &|i| {
                i.name == items::WOODEN_BOARDS
                    || (i.classification != Classification::Progression
                        && view.item_type(&i.name) == Some(ItemType::Lore))
            },
            &|i| {
                i.classification != Classification::Progression
                    && view.item_type(&i.name) == Some(ItemType::Recovery)
            },
            &|i| i.name == items::BASELINE_AMMO,
        ];

        for trimmable in trim_order {
            for idx in pool.positions(trimmable).into_iter().rev() {
                if pool.len() <= open_slots {
                    return Ok(None);
                }
                pool.items.remove(idx);
            }
        }

        if pool.len() > open_slots {
            log::warn!(
                "pool has {} items for {} open slots and nothing left to trim",
                pool.len(),
                open_slots
            );
            return Ok(Some(GenerationWarning::SizeMismatch {
                pool: pool.len(),
                open_slots,
            }));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Character, Scenario};
    use crate::fixtures::leon_a_catalog;

    fn synthesize(catalog: &Catalog, settings: &mut RandomiserSettings) -> (PoolOutcome, usize) {
        let view = catalog.view(settings.character, settings.scenario, settings.difficulty);
        let locations = view.session_locations(settings.enemy_kill_locations);
        let open = locations.iter().filter(|l| !l.is_filled()).count();
        let outcome = PoolSynthesizer::new(view, settings.seed)
            .run(&locations, settings)
            .unwrap();
        (outcome, open)
    }

    fn pool_of(view: &CatalogView<'_>, names: &[&str]) -> CandidatePool {
        let mut pool = CandidatePool::default();
        for name in names {
            pool.push(PoolItem::new(view.require(name).unwrap()));
        }
        pool
    }

    #[test]
    fn pool_matches_open_slots() {
        let catalog = leon_a_catalog();
        let mut settings = RandomiserSettings::default();
        let (outcome, open) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.len(), open);
        assert!(outcome.warnings.is_empty());
        // Fixed pickups stay where they are.
        assert_eq!(outcome.pool.count("Minigun"), 0);
        assert_eq!(outcome.pool.count("Combat Knife"), 0);
        assert_eq!(outcome.pool.count("Spade Key"), 0);
    }

    #[test]
    fn classification_follows_item_type() {
        let catalog = leon_a_catalog();
        let view = catalog.view(Character::Leon, Scenario::A, Difficulty::Standard);
        let class = |name| Classification::of(view.require(name).unwrap());

        assert_eq!(class("Spade Key"), Classification::Progression);
        assert_eq!(class("Damage Trap"), Classification::Trap);
        assert_eq!(class("Police Memo"), Classification::Filler);
        assert_eq!(class("Handgun Ammo"), Classification::Filler);
        assert_eq!(class("W-870"), Classification::Useful);
        assert_eq!(class("Hip Pouch"), Classification::Useful);
    }

    #[test]
    fn hip_pouch_request_is_clamped() {
        let catalog = leon_a_catalog();
        let mut settings = RandomiserSettings {
            starting_hip_pouches: 6,
            ..Default::default()
        };
        let (outcome, open) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.precollected, vec!["Hip Pouch"; 4]);
        assert_eq!(settings.starting_hip_pouches, 4);
        assert_eq!(
            outcome.clamped,
            vec![ClampedOption {
                option: "starting_hip_pouches".to_string(),
                requested: 6,
                effective: 4,
            }]
        );
        assert_eq!(outcome.pool.count("Hip Pouch"), 0);
        assert_eq!(outcome.pool.len(), open);
    }

    #[test]
    fn fixed_starting_weapon_becomes_its_ammo() {
        let catalog = leon_a_catalog();
        let mut plain = RandomiserSettings::default();
        let (before, _) = synthesize(&catalog, &mut plain);

        let mut settings = RandomiserSettings {
            starting_weapon: Some("W-870".to_string()),
            ..Default::default()
        };
        let (outcome, _) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.count("W-870"), 0);
        assert_eq!(
            outcome.pool.count("Shotgun Shells"),
            before.pool.count("Shotgun Shells") + 1
        );
    }

    #[test]
    fn hardcore_trades_ammo_for_ink_ribbons() {
        let catalog = leon_a_catalog();
        let mut settings = RandomiserSettings {
            difficulty: Difficulty::Hardcore,
            starting_ink_ribbons: 2,
            ..Default::default()
        };
        let (outcome, open) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.count("Ink Ribbon"), 12 - 2);
        assert_eq!(outcome.precollected, vec!["Ink Ribbon"; 2]);
        assert!(outcome.clamped.is_empty());
        assert_eq!(outcome.pool.len(), open);
    }

    #[test]
    fn bonus_start_goes_to_precollected() {
        let catalog = leon_a_catalog();
        let mut settings = RandomiserSettings {
            bonus_start: true,
            ..Default::default()
        };
        let (outcome, _) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.precollected.len(), 7);
        assert_eq!(
            outcome.precollected.iter().filter(|n| *n == "First Aid Spray").count(),
            3
        );
    }

    #[test]
    fn no_x_options_replace_items() {
        let catalog = leon_a_catalog();
        let mut settings = RandomiserSettings {
            no_green_herb: true,
            no_gunpowder: true,
            ..Default::default()
        };
        let (outcome, open) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.count("Green Herb"), 0);
        for name in items::GUNPOWDER_FAMILY {
            assert_eq!(outcome.pool.count(name), 0, "{name}");
        }
        assert_eq!(outcome.pool.len(), open);
    }

    #[test]
    fn traps_take_lore_slots_first() {
        let catalog = leon_a_catalog();
        let mut plain = RandomiserSettings::default();
        let (before, _) = synthesize(&catalog, &mut plain);

        let mut settings = RandomiserSettings {
            damage_traps: 3,
            poison_traps: 2,
            ..Default::default()
        };
        let (outcome, _) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.count("Damage Trap"), 3);
        assert_eq!(outcome.pool.count("Poison Trap"), 2);
        assert_eq!(outcome.pool.count("Police Memo") + outcome.pool.count("Patrol Report"), 0);
        assert_eq!(
            outcome.pool.count("Handgun Ammo"),
            before.pool.count("Handgun Ammo")
        );
    }

    #[test]
    fn excess_traps_are_dropped_with_a_warning() {
        let catalog = leon_a_catalog();
        let mut settings = RandomiserSettings {
            damage_traps: 500,
            ..Default::default()
        };
        let (outcome, open) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.count("Handgun Ammo"), 0);
        assert!(matches!(
            outcome.warnings.as_slice(),
            [GenerationWarning::DroppedTraps { dropped, .. }] if *dropped > 0
        ));
        assert_eq!(outcome.pool.len(), open);
    }

    #[test]
    fn structural_items_replace_low_priority_slots() {
        let catalog = leon_a_catalog();
        let mut settings = RandomiserSettings {
            extra_clock_tower_items: true,
            extra_medallions: true,
            early_medallions: true,
            ..Default::default()
        };
        let (outcome, open) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.count("Large Gear"), 2);
        assert_eq!(outcome.pool.count("Small Gear"), 2);
        assert_eq!(outcome.pool.count("Maiden Medallion"), 2);
        assert_eq!(outcome.priority_early, items::MEDALLIONS);
        assert_eq!(outcome.pool.len(), open);
    }

    #[test]
    fn oops_all_rockets_keeps_one_knife() {
        let catalog = leon_a_catalog();
        let view = catalog.view(Character::Leon, Scenario::A, Difficulty::Standard);
        let mut settings = RandomiserSettings {
            oops_all_rockets: true,
            ..Default::default()
        };
        let (outcome, open) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.count("Combat Knife"), 1);
        let leftovers: Vec<&str> = outcome
            .pool
            .names()
            .into_iter()
            .filter(|name| {
                matches!(
                    view.item_type(name),
                    Some(ItemType::Weapon | ItemType::Subweapon | ItemType::Ammo)
                )
            })
            .filter(|name| *name != "Anti-tank Rocket" && *name != "Combat Knife")
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
        assert_eq!(outcome.pool.len(), open);
    }

    #[test]
    fn trims_cheapest_items_last_first() {
        let catalog = leon_a_catalog();
        let view = catalog.view(Character::Leon, Scenario::A, Difficulty::Standard);
        let synth = PoolSynthesizer::new(view, 0);
        let mut pool = pool_of(
            &view,
            &["Green Herb", "Police Memo", "Handgun Ammo", "Spade Key", "Wooden Boards", "Red Herb"],
        );

        let warning = synth.reconcile(&mut pool, 3).unwrap();

        assert!(warning.is_none());
        assert_eq!(pool.names(), vec!["Green Herb", "Handgun Ammo", "Spade Key"]);
    }

    #[test]
    fn untrimmable_pool_reports_mismatch() {
        let catalog = leon_a_catalog();
        let view = catalog.view(Character::Leon, Scenario::A, Difficulty::Standard);
        let synth = PoolSynthesizer::new(view, 0);
        let mut pool = pool_of(&view, &["Spade Key", "Large Gear", "Police Memo"]);

        let warning = synth.reconcile(&mut pool, 1).unwrap();

        assert_eq!(
            warning,
            Some(GenerationWarning::SizeMismatch { pool: 2, open_slots: 1 })
        );
    }

    #[test]
    fn enemy_kill_locations_swap_boards_for_herbs() {
        let catalog = leon_a_catalog();
        let mut settings = RandomiserSettings {
            enemy_kill_locations: true,
            no_red_herb: true,
            ..Default::default()
        };
        let (outcome, open) = synthesize(&catalog, &mut settings);

        assert_eq!(outcome.pool.count("Wooden Boards"), 0);
        assert_eq!(outcome.pool.len(), open);
    }
}
