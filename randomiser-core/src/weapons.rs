use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::ammo;
use crate::catalog::{CatalogView, ItemDefinition, ItemType, LocationRecord, Tier};
use crate::items;
use crate::session::SessionState;
use crate::settings::WeaponMode;
use crate::swap::SwapQueue;
use crate::{RandomiserError, Result};

const WEAPON_SEED_SALT: u64 = 0x3EA2_0C0D_u64;

/// Distinct rotating weapons at the given locations, in location order.
/// Original item is checked before force item.
pub(crate) fn weapons_at_locations<'a>(
    view: &CatalogView<'a>,
    locations: &[LocationRecord],
) -> Vec<&'a ItemDefinition> {
    let mut weapons: Vec<&'a ItemDefinition> = Vec::new();

    for loc in locations {
        let found = [loc.original_item.as_deref(), loc.force_item.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(|name| view.item(name))
            .find(|item| item.is_rotating_weapon());

        if let Some(weapon) = found {
            if !weapons.iter().any(|w| w.name == weapon.name) {
                weapons.push(weapon);
            }
        }
    }

    weapons
}

/// Reshuffles weapons and their ammo across one scenario using a single
/// [`WeaponMode`], then runs the refinement passes every mode needs.
pub struct WeaponRandomiser<'a> {
    view: CatalogView<'a>,
    mode: WeaponMode,
    rng: StdRng,
    tiers: Vec<(Tier, Vec<&'a ItemDefinition>)>,
    eligible: Vec<&'a ItemDefinition>,
    queue: SwapQueue,
}

impl<'a> WeaponRandomiser<'a> {
    pub fn new(view: CatalogView<'a>, mode: WeaponMode, seed: u64) -> Self {
        let eligible: Vec<&'a ItemDefinition> = view
            .items_of_type(ItemType::Weapon)
            .filter(|w| w.is_rotating_weapon())
            .collect();

        let tiers = Tier::ALL
            .into_iter()
            .map(|tier| {
                let pool = view
                    .items_in_group(tier.group_tag())
                    .into_iter()
                    .filter(|w| w.is_rotating_weapon())
                    .collect();
                (tier, pool)
            })
            .collect();

        Self {
            view,
            mode,
            rng: StdRng::seed_from_u64(seed ^ WEAPON_SEED_SALT),
            tiers,
            eligible,
            queue: SwapQueue::default(),
        }
    }

    /// Run the selected mode followed by the upgrade and gunpowder passes.
    /// Troll modes strip weapons last so their ammo and upgrades stay behind.
    pub fn run(&mut self, state: &mut SessionState) -> Result<()> {
        log::info!(
            "weapon randomiser: {:?} for {:?} {:?}",
            self.mode,
            self.view.character,
            self.view.scenario
        );

        match self.mode {
            WeaponMode::Off => return Ok(()),
            WeaponMode::Starting => self.starting(state)?,
            WeaponMode::Match => self.match_tiers(state)?,
            WeaponMode::Full => self.full(state, true)?,
            WeaponMode::All => self.all(state, true)?,
            WeaponMode::FullAmmo => self.full_ammo(state)?,
            WeaponMode::AllAmmo | WeaponMode::Troll | WeaponMode::TrollStarting => {
                self.all_ammo(state)?
            }
        }

        self.upgrades(state);
        self.high_grade_gunpowder(state);

        if let Some(retain) = self.mode.troll_retain_count() {
            self.troll(state, retain)?;
        }

        log::info!(
            "weapon randomiser done: starting weapon {:?}, {} weapon swaps, {} extra weapons",
            state.starting_weapon,
            state.ledger.weapons().len(),
            state.ledger.extra_weapons().len()
        );
        Ok(())
    }

    fn draw(&mut self, tier: Option<Tier>) -> Result<&'a ItemDefinition> {
        let pool = match tier {
            Some(t) => self
                .tiers
                .iter()
                .find(|(pool_tier, _)| *pool_tier == t)
                .map(|(_, pool)| pool.as_slice())
                .unwrap_or(&[]),
            None => self.eligible.as_slice(),
        };

        let Some(&picked) = pool.choose(&mut self.rng) else {
            return Err(RandomiserError::PoolExhausted {
                pool: match tier {
                    Some(t) => format!("{} tier weapons", t),
                    None => "eligible weapons".to_string(),
                },
            });
        };

        self.take(&picked.name);
        Ok(picked)
    }

    /// Remove a weapon from every pool so it is never drawn again.
    fn take(&mut self, name: &str) {
        self.eligible.retain(|w| w.name != name);
        for (_, pool) in self.tiers.iter_mut() {
            pool.retain(|w| w.name != name);
        }
    }

    fn swap(&mut self, state: &mut SessionState, source: &str, target: &str, kind: ItemType) {
        self.queue.push(source, target, kind);
        match kind {
            ItemType::Weapon => state.ledger.record_weapon(source, target),
            ItemType::Ammo => state.ledger.record_ammo(source, target),
            _ => {}
        }
    }

    fn commit(&mut self, state: &mut SessionState) {
        if self.queue.is_empty() {
            return;
        }
        if self.queue.carries(ItemType::Ammo) && self.mode.smooths_ammo() {
            ammo::smooth(&self.view, &mut self.rng, &mut state.locations);
        }
        let changed = self.queue.commit(&self.view, &mut state.locations);
        log::debug!("committed swaps at {} locations", changed);
    }

    fn determine_starting_weapon(
        &mut self,
        state: &mut SessionState,
        tier: Option<Tier>,
        swap_ammo: bool,
    ) -> Result<&'a ItemDefinition> {
        let start = self.draw(tier)?;
        state.starting_weapon = Some(start.name.clone());

        if swap_ammo {
            if let Some(ammo) = start.ammo.as_deref() {
                self.swap(state, items::BASELINE_AMMO, ammo, ItemType::Ammo);
            }
        }

        log::debug!("starting weapon: {}", start.name);
        Ok(start)
    }

    /// Junk locations that may take an extra weapon or upgrade, shuffled.
    fn filler_locations(&mut self, locations: &[LocationRecord]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..locations.len()).collect();
        order.shuffle(&mut self.rng);
        order
            .into_iter()
            .filter(|&idx| {
                let loc = &locations[idx];
                loc.is_rewritable()
                    && loc
                        .original_item
                        .as_deref()
                        .map_or(false, |name| items::COMMON_JUNK.contains(&name))
            })
            .collect()
    }

    fn starting(&mut self, state: &mut SessionState) -> Result<()> {
        self.determine_starting_weapon(state, None, true)?;
        self.commit(state);
        Ok(())
    }

    fn match_tiers(&mut self, state: &mut SessionState) -> Result<()> {
        self.determine_starting_weapon(state, Some(Tier::Light), true)?;

        for weapon in weapons_at_locations(&self.view, &state.locations) {
            let Some(tier) = weapon.tier() else {
                continue;
            };
            let matched = self.draw(Some(tier))?;
            self.swap(state, &weapon.name, &matched.name, ItemType::Weapon);
            if let (Some(from), Some(to)) = (weapon.ammo.as_deref(), matched.ammo.as_deref()) {
                self.swap(state, from, to, ItemType::Ammo);
            }
        }

        self.commit(state);
        Ok(())
    }

    fn full(&mut self, state: &mut SessionState, include_ammo: bool) -> Result<()> {
        self.determine_starting_weapon(state, None, include_ammo)?;

        for weapon in weapons_at_locations(&self.view, &state.locations) {
            let matched = self.draw(None)?;
            self.swap(state, &weapon.name, &matched.name, ItemType::Weapon);
            if include_ammo {
                if let (Some(from), Some(to)) = (weapon.ammo.as_deref(), matched.ammo.as_deref()) {
                    self.swap(state, from, to, ItemType::Ammo);
                }
            }
        }

        self.commit(state);
        Ok(())
    }

    fn all(&mut self, state: &mut SessionState, include_ammo: bool) -> Result<()> {
        self.determine_starting_weapon(state, None, false)?;

        for weapon in weapons_at_locations(&self.view, &state.locations) {
            let matched = self.draw(None)?;
            self.swap(state, &weapon.name, &matched.name, ItemType::Weapon);
        }
        self.commit(state);

        // Then spread whatever is left over the junk locations.
        for idx in self.filler_locations(&state.locations) {
            if self.eligible.is_empty() {
                break;
            }
            let matched = self.draw(None)?;
            let loc = &mut state.locations[idx];
            loc.original_item = Some(matched.name.clone());
            loc.swapped = true;
            state.ledger.record_extra_weapon(&matched.name);
            log::debug!("extra weapon {} at {}", matched.name, loc.full_name());
        }

        if include_ammo {
            ammo::split_by_tier(
                &self.view,
                &mut state.locations,
                &mut state.ledger,
                state.starting_weapon.as_deref(),
            );
        }
        Ok(())
    }

    fn full_ammo(&mut self, state: &mut SessionState) -> Result<()> {
        self.full(state, false)?;
        ammo::split_randomly(
            &self.view,
            &mut self.rng,
            &mut state.locations,
            &mut state.ledger,
            state.starting_weapon.as_deref(),
        );
        Ok(())
    }

    fn all_ammo(&mut self, state: &mut SessionState) -> Result<()> {
        self.all(state, false)?;
        ammo::split_randomly(
            &self.view,
            &mut self.rng,
            &mut state.locations,
            &mut state.ledger,
            state.starting_weapon.as_deref(),
        );
        Ok(())
    }

    /// Point every randomized upgrade slot at an upgrade for a weapon that is
    /// actually in play. Spare slots get fallback ammo; spare upgrades borrow
    /// junk locations, and anything still left over is dropped.
    pub(crate) fn upgrades(&mut self, state: &mut SessionState) {
        let mut in_play: Vec<String> = weapons_at_locations(&self.view, &state.locations)
            .into_iter()
            .map(|w| w.name.clone())
            .collect();
        let drawn = state.ledger.placed_weapons().into_iter().map(str::to_string);
        let start = state.starting_weapon.iter().cloned();
        for name in drawn.chain(start) {
            if !in_play.contains(&name) {
                in_play.push(name);
            }
        }

        let mut available: Vec<String> = self
            .view
            .items_of_type(ItemType::Upgrade)
            .filter(|u| {
                u.upgrades
                    .as_deref()
                    .map_or(false, |target| in_play.iter().any(|w| w == target))
            })
            .map(|u| u.name.clone())
            .collect();

        let mut slots: Vec<usize> = Vec::new();
        for (idx, loc) in state.locations.iter().enumerate() {
            let holds_upgrade = [loc.original_item.as_deref(), loc.force_item.as_deref()]
                .into_iter()
                .flatten()
                .any(|name| self.view.item_type(name) == Some(ItemType::Upgrade));
            if !holds_upgrade {
                continue;
            }

            // A fixed upgrade stays put and is no longer needed elsewhere.
            if !loc.randomized {
                if let Some(orig) = loc.original_item.as_deref() {
                    available.retain(|u| u != orig);
                }
                continue;
            }

            slots.push(idx);
        }

        if available.len() > slots.len() {
            let needed = available.len() - slots.len();
            let borrowed: Vec<usize> = self
                .filler_locations(&state.locations)
                .into_iter()
                .filter(|idx| !slots.contains(idx))
                .take(needed)
                .collect();
            slots.extend(borrowed);
        }

        if slots.len() > available.len() {
            let fallback = state.ledger.fallback_ammo().to_string();
            available.resize(slots.len(), fallback);
        }

        if available.len() > slots.len() {
            log::warn!(
                "no room for {} upgrades: {:?}",
                available.len() - slots.len(),
                &available[slots.len()..]
            );
            available.truncate(slots.len());
        }

        let view = self.view;
        let is_upgrade = |name: &str| view.item_type(name) == Some(ItemType::Upgrade);
        for (idx, upgrade) in slots.into_iter().zip(available) {
            let loc = &mut state.locations[idx];
            // Borrowed junk locations hold no upgrade and take it as original.
            if !loc.replace_matching(&is_upgrade, &upgrade) {
                loc.original_item = Some(upgrade);
            }
        }
    }

    /// Alternate high-grade gunpowder between its yellow and white variants.
    pub(crate) fn high_grade_gunpowder(&mut self, state: &mut SessionState) {
        let mut counter = 0usize;

        for loc in state.locations.iter_mut() {
            let holds = [loc.original_item.as_deref(), loc.force_item.as_deref()]
                .into_iter()
                .flatten()
                .any(items::is_high_grade_gunpowder);
            if !holds {
                continue;
            }

            let variant = if counter % 2 == 0 {
                items::HIGH_GRADE_GUNPOWDER_YELLOW
            } else {
                items::HIGH_GRADE_GUNPOWDER_WHITE
            };
            loc.replace_matching(items::is_high_grade_gunpowder, variant);
            counter += 1;
        }
    }

    /// Keep the starting weapon plus `retain` random placed weapons; every
    /// other weapon occurrence becomes inert filler.
    fn troll(&mut self, state: &mut SessionState, retain: usize) -> Result<()> {
        let start = state.starting_weapon.clone();
        let mut candidates: Vec<&'a ItemDefinition> = weapons_at_locations(&self.view, &state.locations)
            .into_iter()
            .filter(|w| Some(&w.name) != start.as_ref())
            .collect();

        let mut retained: Vec<String> = start.into_iter().collect();
        for _ in 0..retain {
            if candidates.is_empty() {
                return Err(RandomiserError::PoolExhausted {
                    pool: "placed weapons to retain".to_string(),
                });
            }
            let idx = self.rng.gen_range(0..candidates.len());
            retained.push(candidates.remove(idx).name.clone());
        }

        let mut removed = 0usize;
        for loc in state.locations.iter_mut() {
            for slot in [&mut loc.force_item, &mut loc.original_item] {
                let strip = slot.as_deref().map_or(false, |name| {
                    self.view.item(name).map_or(false, |i| i.is_rotating_weapon())
                        && !retained.iter().any(|r| r == name)
                });
                if strip {
                    *slot = Some(items::INERT_FILLER.to_string());
                    removed += 1;
                }
            }
        }

        log::info!("troll: kept {:?}, replaced {} weapon slots", retained, removed);
        state.ledger.set_retained(retained);
        Ok(())
    }
}
