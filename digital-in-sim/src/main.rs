use clap::Parser;
use digital_in::{
    ChangeQueue, Changed, DigitalIn, DigitalInConfig, LevelBank, PinMode, PinState, TimeMillis,
};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, error, info, warn};

const PIN_COUNT: usize = 8;
const NAME_LEN: usize = 16;

type Config = DigitalInConfig<PIN_COUNT, NAME_LEN>;
type Inputs = DigitalIn<LevelBank<PIN_COUNT>, ChangeQueue<32, NAME_LEN>, PIN_COUNT, NAME_LEN>;

/// Drives a simulated bank of digital inputs through a scripted sequence of level changes.
#[derive(Parser)]
struct Cli {
    /// File the pin configuration is loaded from and saved to (postcard encoded)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Time between scans of the pin bank in milliseconds
    #[arg(short, long)]
    update_delay: Option<TimeMillis>,

    /// Length of the simulation in milliseconds
    #[arg(short, long, default_value_t = 500)]
    duration: TimeMillis,

    /// Initial level of every pin
    #[arg(short, long, default_value = "high")]
    initial: Level,

    /// Level change, as `<time>:<pin>:<high|low>`
    #[arg(short, long)]
    event: Vec<LevelEvent>,

    /// Mode assignment, as `<name>=<mode>`
    #[arg(short, long)]
    mode: Vec<ModeAssignment>,
}

#[derive(Clone, Copy)]
struct Level(PinState);

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" | "1" => Ok(Self(PinState::High)),
            "low" | "0" => Ok(Self(PinState::Low)),
            _ => Err(format!("\"{s}\" is not a level, expected high or low")),
        }
    }
}

#[derive(Clone)]
struct LevelEvent {
    time: TimeMillis,
    pin: u8,
    level: PinState,
}

impl FromStr for LevelEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(time), Some(pin), Some(level), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("\"{s}\" is not formatted as <time>:<pin>:<level>"));
        };

        Ok(Self {
            time: time.parse().map_err(|e| format!("bad time: {e}"))?,
            pin: pin.parse().map_err(|e| format!("bad pin: {e}"))?,
            level: level.parse::<Level>()?.0,
        })
    }
}

#[derive(Clone)]
struct ModeAssignment {
    name: String,
    mode: PinMode,
}

impl FromStr for ModeAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, mode) = s
            .split_once('=')
            .ok_or_else(|| format!("\"{s}\" is not formatted as <name>=<mode>"))?;

        Ok(Self {
            name: name.to_owned(),
            mode: mode.parse().map_err(|e| format!("bad mode \"{mode}\": {e}"))?,
        })
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                // Leave the file alone, saving defaults over it would lose it
                error!("Cannot load configuration from {}: {e}", path.display());
                ::std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    let mut inputs = Inputs::new(LevelBank::new(cli.initial.0), ChangeQueue::default());

    let mut need_save = match inputs.setup(&config) {
        Ok(changed) => changed,
        Err(e) => {
            error!("Invalid pin configuration: {e}");
            ::std::process::exit(1);
        }
    };

    if let Some(delay) = cli.update_delay {
        match inputs.set_update_delay(delay) {
            Ok(()) => need_save = need_save.or(Changed::Yes),
            Err(e) => warn!("Ignoring update delay: {e}"),
        }
    }

    for assignment in &cli.mode {
        if inputs.set_mode(&assignment.name, assignment.mode) {
            need_save = Changed::Yes;
        } else {
            warn!("No pin named \"{}\"", assignment.name);
        }
    }

    for pin in inputs.pins() {
        info!("Pin {}: {} ({})", pin.index(), pin.name(), pin.mode());
    }

    let mut events = cli.event.clone();
    events.sort_by_key(|e| e.time);
    let mut events = events.into_iter().peekable();

    for now in 0..=cli.duration {
        while let Some(event) = events.next_if(|e| e.time <= now) {
            debug!("t={now}: pin {} set {:?}", event.pin, event.level);
            inputs.bank_mut().set(event.pin, event.level);
        }

        inputs.handle(now);

        while let Some(change) = inputs.reporter_mut().pop() {
            info!(
                "t={}: pin {} ({}, {}) is {}",
                change.time,
                change.index,
                change.name,
                change.mode,
                if change.state { "active" } else { "inactive" }
            );
        }
    }

    let counters = inputs.reporter().counters();
    info!(
        "{} changes reported, {} dropped",
        counters.queued, counters.dropped
    );

    if need_save.is_yes() {
        match &cli.config {
            Some(path) => save_config(path, &inputs.config()),
            None => debug!("Configuration changed, no file to save it to"),
        }
    }
}

/// Reads a saved configuration, a missing file gives the defaults.
fn load_config(path: &Path) -> Result<Config, String> {
    match fs::read(path) {
        Ok(bytes) => postcard::from_bytes(&bytes).map_err(|e| e.to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No configuration at {}, using defaults", path.display());
            Ok(Config::default())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn save_config(path: &Path, config: &Config) {
    let result = postcard::to_stdvec(config)
        .map_err(|e| e.to_string())
        .and_then(|bytes| fs::write(path, bytes).map_err(|e| e.to_string()));

    match result {
        Ok(()) => info!("Saved configuration to {}", path.display()),
        Err(e) => error!("Failed to save configuration to {}: {e}", path.display()),
    }
}
