//! Duel Arena - Main Binary
//!
//! Terminal front end for the duel engine: human play via stdin, bot
//! play via scripted or random views.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use duel_arena::game::{DuelSession, GameEndReason, VerbosityLevel, PARTICIPANT_A};
use duel_arena::loader::{default_roster, Roster};
use duel_arena::view::{ConsoleView, ScriptedView, SharedView, ViewIntent};
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

/// View type driving a participant
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ViewKind {
    /// Human play via stdin
    Console,
    /// Fixed intent script (requires --pN-script)
    Script,
    /// Uniform random intents
    Random,
}

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Duel Arena - turn-based two-player combat", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a duel
    Play {
        /// Roster file (JSON); a built-in roster is used when omitted
        #[arg(long, value_name = "ROSTER_FILE")]
        roster: Option<PathBuf>,

        /// Roster key for participant 1
        #[arg(long, default_value = "knight")]
        p1_key: String,

        /// Roster key for participant 2
        #[arg(long, default_value = "mage")]
        p2_key: String,

        /// Participant 1 view type
        #[arg(long, value_enum, default_value = "console")]
        p1: ViewKind,

        /// Participant 2 view type
        #[arg(long, value_enum, default_value = "random")]
        p2: ViewKind,

        /// Fixed intent script for participant 1 (comma separated, e.g. "attack,heal,attack")
        #[arg(long, value_name = "INTENTS")]
        p1_script: Option<String>,

        /// Fixed intent script for participant 2 (comma separated, e.g. "attack,heal,attack")
        #[arg(long, value_name = "INTENTS")]
        p2_script: Option<String>,

        /// Set random seed for deterministic bot play
        #[arg(long)]
        seed: Option<u64>,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Round cap before a forced draw
        #[arg(long, default_value = "100")]
        max_rounds: u32,
    },

    /// Validate a roster file and list its participants
    Roster {
        /// Roster file (JSON)
        roster: PathBuf,
    },
}

/// Concrete-typed handle kept by the host for feeding input
enum Surface {
    Console(Rc<RefCell<ConsoleView>>),
    Scripted(Rc<RefCell<ScriptedView>>),
}

impl Surface {
    fn build(
        kind: ViewKind,
        script: Option<&str>,
        seed: Option<u64>,
        arg_name: &str,
    ) -> anyhow::Result<Surface> {
        match kind {
            ViewKind::Console => Ok(Surface::Console(Rc::new(RefCell::new(ConsoleView::new())))),
            ViewKind::Script => {
                let Some(script) = script else {
                    bail!("view type 'script' requires {arg_name}");
                };
                let intents = parse_script(script)?;
                Ok(Surface::Scripted(Rc::new(RefCell::new(
                    ScriptedView::with_script(intents),
                ))))
            }
            ViewKind::Random => {
                let view = match seed {
                    Some(seed) => ScriptedView::with_seed(seed),
                    None => ScriptedView::random(),
                };
                Ok(Surface::Scripted(Rc::new(RefCell::new(view))))
            }
        }
    }

    fn shared(&self) -> SharedView {
        match self {
            Surface::Console(view) => view.clone(),
            Surface::Scripted(view) => view.clone(),
        }
    }

    fn pump_animation(&self) {
        if let Surface::Scripted(view) = self {
            view.borrow_mut().pump_animation();
        }
    }
}

fn parse_script(script: &str) -> anyhow::Result<Vec<ViewIntent>> {
    script
        .split([',', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<ViewIntent>()
                .map_err(|e| anyhow::anyhow!(e))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            roster,
            p1_key,
            p2_key,
            p1,
            p2,
            p1_script,
            p2_script,
            seed,
            verbosity,
            max_rounds,
        } => cmd_play(
            roster, p1_key, p2_key, p1, p2, p1_script, p2_script, seed, verbosity.0, max_rounds,
        ),
        Commands::Roster { roster } => cmd_roster(roster),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_play(
    roster: Option<PathBuf>,
    p1_key: String,
    p2_key: String,
    p1: ViewKind,
    p2: ViewKind,
    p1_script: Option<String>,
    p2_script: Option<String>,
    seed: Option<u64>,
    verbosity: VerbosityLevel,
    max_rounds: u32,
) -> anyhow::Result<()> {
    let roster = match roster {
        Some(path) => Roster::load_from_file(&path)
            .with_context(|| format!("failed to load roster {}", path.display()))?,
        None => default_roster(),
    };
    let config_a = roster.player(&p1_key)?.clone();
    let config_b = roster.player(&p2_key)?.clone();

    let surface_a = Surface::build(p1, p1_script.as_deref(), seed, "--p1-script")?;
    // offset the second seed so seeded bots don't mirror each other
    let surface_b = Surface::build(p2, p2_script.as_deref(), seed.map(|s| s + 1), "--p2-script")?;

    let mut session = DuelSession::new(config_a, config_b)
        .with_verbosity(verbosity)
        .with_max_rounds(max_rounds);

    session.start_game(surface_a.shared(), surface_b.shared())?;

    let result = loop {
        surface_a.pump_animation();
        surface_b.pump_animation();
        if let Some(result) = session.pump()? {
            break result;
        }

        let Some(active) = session.active_participant() else {
            continue;
        };
        let surface = if active == PARTICIPANT_A {
            &surface_a
        } else {
            &surface_b
        };
        if let Surface::Console(view) = surface {
            if view.borrow().input_enabled() {
                prompt_console_turn(&mut session, active, view)?;
            }
        }
    };

    match result.end_reason {
        GameEndReason::PlayerDefeat(_) => {
            if let Some(winner) = &result.winner {
                println!("Winner: {} ({} round(s))", winner, result.rounds);
            }
        }
        GameEndReason::RoundLimit => {
            println!("Draw after {} round(s)", result.rounds);
        }
    }
    Ok(())
}

/// One interactive prompt round: gameplay intents plus point allocation
fn prompt_console_turn(
    session: &mut DuelSession,
    active: duel_arena::core::ParticipantId,
    view: &Rc<RefCell<ConsoleView>>,
) -> anyhow::Result<()> {
    let snapshot = session.snapshot(active)?;
    let allocation_hint = if snapshot.free_points > 0 {
        "  |  +h/-h +p/-p apply cancel"
    } else {
        ""
    };
    print!(
        "{} [a]ttack / [h]eal{}: ",
        snapshot.name, allocation_hint
    );
    std::io::stdout().flush()?;

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    let line = line.trim();

    let controller = session
        .controller_mut(active)
        .context("no controller for active participant")?;
    match line {
        "+h" => {
            controller.max_health_up();
            print_staged(controller);
        }
        "-h" => {
            controller.max_health_down();
            print_staged(controller);
        }
        "+p" => {
            controller.power_up();
            print_staged(controller);
        }
        "-p" => {
            controller.power_down();
            print_staged(controller);
        }
        "apply" => controller.apply_stats()?,
        "cancel" => {
            controller.cancel_stats()?;
            print_staged(controller);
        }
        other => match other.parse::<ViewIntent>() {
            Ok(ViewIntent::Attack) => view.borrow_mut().press_attack(),
            Ok(ViewIntent::Heal) => view.borrow_mut().press_heal(),
            Err(message) => println!("{message}"),
        },
    }
    Ok(())
}

fn print_staged(controller: &duel_arena::game::Controller) {
    let staged = controller.staged_stats();
    println!(
        "  staged: max health {}, power {}, {} point(s) free",
        staged.max_health, staged.power, staged.free_points
    );
}

fn cmd_roster(path: PathBuf) -> anyhow::Result<()> {
    let roster = Roster::load_from_file(&path)
        .with_context(|| format!("failed to load roster {}", path.display()))?;

    println!("{} participant(s):", roster.len());
    for key in roster.keys() {
        let config = roster.player(key)?;
        println!(
            "  {:<12} {} ({}/{} health, {} power, {} free point(s))",
            key,
            config.name,
            config.current_health,
            config.max_health,
            config.power,
            config.free_points
        );
    }
    Ok(())
}
