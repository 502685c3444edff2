use serde::{Deserialize, Serialize};

use crate::items;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub source: String,
    pub targets: Vec<String>,
}

/// What replaced what during one weapon randomisation pass. Grows
/// monotonically for weapons; ammo entries are rewritten wholesale when ammo
/// is redistributed instead of swapped 1:1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLedger {
    weapons: Vec<LedgerEntry>,
    ammo: Vec<LedgerEntry>,
    extra_weapons: Vec<String>,
    retained_weapons: Vec<String>,
    concealed: bool,
}

fn record_into(entries: &mut Vec<LedgerEntry>, source: &str, target: &str) {
    if let Some(entry) = entries.iter_mut().find(|e| e.source == source) {
        if !entry.targets.iter().any(|t| t == target) {
            entry.targets.push(target.to_string());
        }
    } else {
        entries.push(LedgerEntry {
            source: source.to_string(),
            targets: vec![target.to_string()],
        });
    }
}

impl SwapLedger {
    pub fn record_weapon(&mut self, source: &str, target: &str) {
        record_into(&mut self.weapons, source, target);
    }

    pub fn record_ammo(&mut self, source: &str, target: &str) {
        record_into(&mut self.ammo, source, target);
    }

    /// Replace every ammo entry with a single labelled group, used once ammo
    /// no longer maps 1:1 onto weapons.
    pub fn set_ammo_group(&mut self, label: &str, ammo: &[String]) {
        if let Some(entry) = self.ammo.iter_mut().find(|e| e.source == label) {
            entry.targets = ammo.to_vec();
        } else {
            self.ammo.push(LedgerEntry {
                source: label.to_string(),
                targets: ammo.to_vec(),
            });
        }
    }

    pub fn clear_ammo(&mut self) {
        self.ammo.clear();
    }

    pub fn record_extra_weapon(&mut self, name: &str) {
        self.extra_weapons.push(name.to_string());
    }

    pub(crate) fn set_retained(&mut self, retained: Vec<String>) {
        self.retained_weapons = retained;
        self.concealed = true;
    }

    pub fn weapons(&self) -> &[LedgerEntry] {
        &self.weapons
    }

    pub fn ammo(&self) -> &[LedgerEntry] {
        &self.ammo
    }

    pub fn extra_weapons(&self) -> &[String] {
        &self.extra_weapons
    }

    pub fn retained_weapons(&self) -> &[String] {
        &self.retained_weapons
    }

    /// Troll modes keep the report hidden from spoiler output.
    pub fn is_concealed(&self) -> bool {
        self.concealed
    }

    /// Every weapon this pass put into the world, in the order it was drawn.
    pub fn placed_weapons(&self) -> Vec<&str> {
        let mut placed: Vec<&str> = Vec::new();
        let swapped_in = self.weapons.iter().flat_map(|e| e.targets.iter());
        for name in swapped_in.chain(self.extra_weapons.iter()) {
            if !placed.contains(&name.as_str()) {
                placed.push(name.as_str());
            }
        }
        placed
    }

    /// Ammo that pads out slots nothing else claims: the first ammo target
    /// recorded, or the baseline handgun ammo.
    pub fn fallback_ammo(&self) -> &str {
        self.ammo
            .first()
            .and_then(|e| e.targets.first())
            .map(String::as_str)
            .unwrap_or(items::BASELINE_AMMO)
    }
}
