use serde::Serialize;

use crate::catalog::{Catalog, Character, Difficulty, LocationRecord, Scenario};
use crate::ledger::SwapLedger;
use crate::pool::{CandidatePool, ClampedOption, GenerationWarning, PoolSynthesizer};
use crate::settings::RandomiserSettings;
use crate::weapons::WeaponRandomiser;
use crate::Result;

/// Mutable state threaded through one session: the cloned locations, the
/// swap ledger and whichever starting weapon ends up chosen.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionState {
    pub locations: Vec<LocationRecord>,
    pub ledger: SwapLedger,
    pub starting_weapon: Option<String>,
}

impl SessionState {
    pub fn new(locations: Vec<LocationRecord>) -> Self {
        Self {
            locations,
            ..Default::default()
        }
    }
}

/// Session metadata handed to the game client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotData {
    pub character: Character,
    pub scenario: Scenario,
    pub difficulty: Difficulty,
    pub starting_weapon: Option<String>,
    pub unlocked_typewriters: Vec<String>,
    pub starting_hip_pouches: u32,
    pub starting_ink_ribbons: u32,
    pub priority_early: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Generation {
    /// Settings after clamping.
    pub settings: RandomiserSettings,
    pub starting_weapon: Option<String>,
    pub locations: Vec<LocationRecord>,
    pub pool: CandidatePool,
    pub precollected: Vec<String>,
    /// Written out through [`Generation::spoiler_ledger`].
    #[serde(skip_serializing)]
    pub ledger: SwapLedger,
    pub clamped: Vec<ClampedOption>,
    pub priority_early: Vec<String>,
    pub warnings: Vec<GenerationWarning>,
}

impl Generation {
    pub fn slot_data(&self) -> SlotData {
        SlotData {
            character: self.settings.character,
            scenario: self.settings.scenario,
            difficulty: self.settings.difficulty,
            starting_weapon: self.starting_weapon.clone(),
            unlocked_typewriters: self.settings.unlocked_typewriters.clone(),
            starting_hip_pouches: self.settings.starting_hip_pouches,
            starting_ink_ribbons: self.settings.starting_ink_ribbons,
            priority_early: self.priority_early.clone(),
        }
    }

    /// The ledger for spoiler output, unless a troll mode hid it.
    pub fn spoiler_ledger(&self) -> Option<&SwapLedger> {
        (!self.ledger.is_concealed()).then_some(&self.ledger)
    }

    pub fn open_slots(&self) -> usize {
        self.locations.iter().filter(|l| !l.is_filled()).count()
    }
}

/// Run one session: validate, shuffle weapons, then synthesize the pool.
pub fn generate(catalog: &Catalog, settings: &RandomiserSettings) -> Result<Generation> {
    let view = catalog.view(settings.character, settings.scenario, settings.difficulty);
    settings.validate(&view)?;

    log::info!(
        "generating {:?} {:?} {:?} with seed {}",
        settings.character,
        settings.scenario,
        settings.difficulty,
        settings.seed
    );

    let mut state = SessionState::new(view.session_locations(settings.enemy_kill_locations));
    state.starting_weapon = settings.starting_weapon.clone();

    WeaponRandomiser::new(view, settings.cross_scenario_weapons, settings.seed).run(&mut state)?;

    let mut effective = settings.clone();
    let outcome = PoolSynthesizer::new(view, settings.seed).run(&state.locations, &mut effective)?;

    Ok(Generation {
        settings: effective,
        starting_weapon: state.starting_weapon,
        locations: state.locations,
        pool: outcome.pool,
        precollected: outcome.precollected,
        ledger: state.ledger,
        clamped: outcome.clamped,
        priority_early: outcome.priority_early,
        warnings: outcome.warnings,
    })
}
