use clap::Parser;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use randomiser_core::{
    generate, Catalog, Character, Difficulty, Generation, RandomiserSettings, Result, Scenario,
    SlotData, SwapLedger, WeaponMode,
};

#[derive(Debug, Parser)]
#[command(name = "re2r-randomiser", version, about = "Resident Evil 2 item and weapon randomiser")]
struct Args {
    /// Data directory holding `<character>/items.json` and per-scenario files.
    #[arg(long)]
    data: PathBuf,

    /// JSON settings file. Missing fields use their defaults.
    #[arg(long)]
    settings: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_parser = parse_name::<Character>)]
    character: Option<Character>,

    #[arg(long, value_parser = parse_name::<Scenario>)]
    scenario: Option<Scenario>,

    #[arg(long, value_parser = parse_name::<Difficulty>)]
    difficulty: Option<Difficulty>,

    /// Cross-scenario weapon mode, e.g. `full`, `all_ammo`, `troll`.
    #[arg(long, value_parser = parse_name::<WeaponMode>)]
    weapons: Option<WeaponMode>,

    /// Write the session JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Parse a CLI value through the same serde names the settings file uses.
fn parse_name<T: DeserializeOwned>(value: &str) -> std::result::Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|e| format!("invalid value '{}': {}", value, e))
}

#[derive(Serialize)]
struct SessionOutput<'a> {
    slot_data: SlotData,
    #[serde(flatten)]
    generation: &'a Generation,
    /// Hidden in troll modes.
    spoiler: Option<&'a SwapLedger>,
}

fn load_settings(args: &Args) -> Result<RandomiserSettings> {
    let mut settings = match args.settings.as_ref() {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text)?
        }
        None => RandomiserSettings::default(),
    };

    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(character) = args.character {
        settings.character = character;
    }
    if let Some(scenario) = args.scenario {
        settings.scenario = scenario;
    }
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }
    if let Some(mode) = args.weapons {
        settings.cross_scenario_weapons = mode;
    }
    Ok(settings)
}

fn run(args: &Args) -> Result<()> {
    let settings = load_settings(args)?;
    let catalog = Catalog::load(&args.data)?;
    let generation = generate(&catalog, &settings)?;

    for warning in &generation.warnings {
        log::warn!("{:?}", warning);
    }
    for clamp in &generation.clamped {
        log::info!(
            "{} lowered from {} to {}",
            clamp.option,
            clamp.requested,
            clamp.effective
        );
    }

    let output = SessionOutput {
        slot_data: generation.slot_data(),
        generation: &generation,
        spoiler: generation.spoiler_ledger(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match args.output.as_ref() {
        Some(path) => {
            fs::write(path, json)?;
            log::info!("wrote session to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
