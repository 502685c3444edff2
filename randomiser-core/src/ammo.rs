use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::{CatalogView, ItemDefinition, ItemType, LocationRecord, Scenario, Tier};
use crate::items;
use crate::ledger::SwapLedger;
use crate::weapons::weapons_at_locations;

pub(crate) const OVERSIZED_AMMO: usize = 30;
pub(crate) const UNDERSIZED_AMMO: usize = 10;
pub(crate) const SMOOTHING_UNITS: usize = 10;
const EXTRA_RANDOM_PASSES: usize = 3;

/// Ammo names in first-seen order, each with the rewritable locations that
/// hold it.
fn ammo_groups(view: &CatalogView<'_>, locations: &[LocationRecord]) -> Vec<(String, Vec<usize>)> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

    for (idx, loc) in locations.iter().enumerate() {
        if !loc.is_rewritable() {
            continue;
        }
        let Some(name) = loc.original_item.as_deref() else {
            continue;
        };
        if view.item_type(name) != Some(ItemType::Ammo) {
            continue;
        }

        if let Some((_, list)) = groups.iter_mut().find(|(n, _)| n == name) {
            list.push(idx);
        } else {
            groups.push((name.to_string(), vec![idx]));
        }
    }

    groups
}

/// Even out lopsided ammo before it is swapped. In scenario B every
/// oversized category gives half its occurrences back to handgun ammo;
/// otherwise the first oversized category donates a fixed number of units to
/// the first two undersized ones. Returns how many locations changed.
pub(crate) fn smooth(view: &CatalogView<'_>, rng: &mut StdRng, locations: &mut [LocationRecord]) -> usize {
    let groups = ammo_groups(view, locations);

    if view.scenario == Scenario::B {
        let mut converted = 0usize;
        for (name, idxs) in &groups {
            if name == items::BASELINE_AMMO || idxs.len() < OVERSIZED_AMMO {
                continue;
            }
            let mut picked = idxs.clone();
            picked.shuffle(rng);
            let half = picked.len() / 2;
            for &idx in picked.iter().take(half) {
                locations[idx].original_item = Some(items::BASELINE_AMMO.to_string());
            }
            log::debug!("smoothing: {} of {} '{}' became {}", half, idxs.len(), name, items::BASELINE_AMMO);
            converted += half;
        }
        return converted;
    }

    let Some(over) = groups.iter().position(|(_, idxs)| idxs.len() >= OVERSIZED_AMMO) else {
        return 0;
    };

    // With more than two undersized categories only the first two seen get
    // the units.
    let lows: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(i, (_, idxs))| *i != over && idxs.len() < UNDERSIZED_AMMO)
        .map(|(i, _)| i)
        .take(2)
        .collect();
    if lows.is_empty() {
        return 0;
    }

    let first_share = if lows.len() == 2 {
        rng.gen_range(0..=SMOOTHING_UNITS)
    } else {
        SMOOTHING_UNITS
    };
    let shares = [first_share, SMOOTHING_UNITS - first_share];

    let mut donors = groups[over].1.clone();
    donors.shuffle(rng);
    let mut donors = donors.into_iter();
    let mut converted = 0usize;

    for (&low, share) in lows.iter().zip(shares) {
        let target = &groups[low].0;
        for idx in donors.by_ref().take(share) {
            locations[idx].original_item = Some(target.clone());
            converted += 1;
        }
        log::debug!("smoothing: moved {} '{}' to '{}'", share, groups[over].0, target);
    }

    converted
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

/// Weapons currently in the world plus the starting weapon.
fn placed_with_starting<'a>(
    view: &CatalogView<'a>,
    locations: &[LocationRecord],
    starting_weapon: Option<&str>,
) -> Vec<&'a ItemDefinition> {
    let mut placed = weapons_at_locations(view, locations);
    if let Some(start) = starting_weapon.and_then(|name| view.item(name)) {
        if !placed.iter().any(|w| w.name == start.name) {
            placed.push(start);
        }
    }
    placed
}

/// Redistribute ammo tier by tier: the locations holding ammo a tier's placed
/// weapons need are divided evenly among those ammo types. Heavy claims
/// first, then medium (never handgun ammo), then light.
pub(crate) fn split_by_tier(
    view: &CatalogView<'_>,
    locations: &mut [LocationRecord],
    ledger: &mut SwapLedger,
    starting_weapon: Option<&str>,
) {
    ledger.clear_ammo();

    let placed = placed_with_starting(view, locations, starting_weapon);
    let mut claimed: Vec<usize> = Vec::new();

    for tier in [Tier::Heavy, Tier::Medium, Tier::Light] {
        let skip_handgun = tier == Tier::Medium;

        let mut needed: Vec<String> = Vec::new();
        for weapon in placed.iter().filter(|w| w.tier() == Some(tier)) {
            if let Some(ammo) = weapon.ammo.as_deref() {
                if !(skip_handgun && items::is_handgun_ammo(ammo)) {
                    push_unique(&mut needed, ammo);
                }
            }
        }

        let slots: Vec<usize> = locations
            .iter()
            .enumerate()
            .filter(|(idx, loc)| {
                loc.is_rewritable()
                    && !claimed.contains(idx)
                    && loc
                        .original_item
                        .as_deref()
                        .map_or(false, |name| needed.iter().any(|a| a == name))
            })
            .map(|(idx, _)| idx)
            .collect();

        if needed.is_empty() || slots.is_empty() {
            continue;
        }

        let each = slots.len() / needed.len();
        let last = needed.len() - 1;
        for (count, &idx) in slots.iter().enumerate() {
            let which = if each == 0 { count.min(last) } else { (count / each).min(last) };
            locations[idx].original_item = Some(needed[which].clone());
        }

        log::debug!("{} tier: {} ammo locations split across {:?}", tier, slots.len(), needed);
        claimed.extend(slots);
        ledger.set_ammo_group(&format!("{} Weapon Ammo", tier), &needed);
    }
}

/// Fully re-randomise weapon ammo: each needed type is guaranteed one
/// location, gets up to three more coin-flip picks, and whatever is left is
/// assigned at random.
pub(crate) fn split_randomly(
    view: &CatalogView<'_>,
    rng: &mut StdRng,
    locations: &mut [LocationRecord],
    ledger: &mut SwapLedger,
    starting_weapon: Option<&str>,
) {
    ledger.clear_ammo();

    let placed = placed_with_starting(view, locations, starting_weapon);
    let mut needed: Vec<String> = Vec::new();
    for weapon in &placed {
        if let Some(ammo) = weapon.ammo.as_deref() {
            push_unique(&mut needed, ammo);
        }
    }
    if needed.is_empty() {
        return;
    }

    let mut weapon_ammo: Vec<String> = Vec::new();
    for weapon in view.items_of_type(ItemType::Weapon) {
        if let Some(ammo) = weapon.ammo.as_deref() {
            push_unique(&mut weapon_ammo, ammo);
        }
    }

    let mut slots: Vec<usize> = locations
        .iter()
        .enumerate()
        .filter(|(_, loc)| {
            loc.is_rewritable()
                && loc
                    .original_item
                    .as_deref()
                    .map_or(false, |name| weapon_ammo.iter().any(|a| a == name))
        })
        .map(|(idx, _)| idx)
        .collect();
    slots.shuffle(rng);
    let total = slots.len();
    let mut remaining = slots.into_iter();

    for ammo in &needed {
        match remaining.next() {
            Some(idx) => locations[idx].original_item = Some(ammo.clone()),
            None => break,
        }
    }

    for _ in 0..EXTRA_RANDOM_PASSES {
        for ammo in &needed {
            if rng.gen_bool(0.5) {
                if let Some(idx) = remaining.next() {
                    locations[idx].original_item = Some(ammo.clone());
                }
            }
        }
    }

    for idx in remaining {
        if let Some(ammo) = needed.choose(rng) {
            locations[idx].original_item = Some(ammo.clone());
        }
    }

    log::debug!("random ammo: {} locations across {:?}", total, needed);
    ledger.set_ammo_group("Random Quantities", &needed);
}
