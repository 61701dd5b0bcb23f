use anyhow::Context;
use blockspace_common::{BlockType, Hand};
use blockspace_input::{FaceButton, InputEvent};
use blockspace_kernel::Anchor;
use blockspace_session::{ScriptStep, Session, SessionConfig, Step};
use blockspace_tools::SceneInspector;
use clap::{Parser, Subcommand};
use glam::Vec2;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blockspace-cli", about = "Headless driver for blockspace sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Session config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, block types and effective config
    Info,
    /// Run a built-in build-and-teleport walk-through
    Demo,
    /// Play a timed input script against a fresh session
    Run {
        /// Script file (.yaml, .yml or .json)
        script: PathBuf,
        /// Keep the clock running this long after the last step
        #[arg(long, default_value = "2000")]
        settle_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SessionConfig::default(),
    };
    tracing::debug!(config = ?cli.config, "session config resolved");

    match cli.command {
        Commands::Info => {
            println!("blockspace-cli v{}", env!("CARGO_PKG_VERSION"));
            for t in BlockType::ALL {
                println!("block: {:<5} {}", t.name(), t.color());
            }
            println!(
                "grid={} teleport: distance={} threshold={}",
                config.build.grid_size, config.teleport.distance, config.teleport.threshold
            );
            println!(
                "feedback ms: placed={} removed={} teleport={} selection={}",
                config.feedback.placement_ms,
                config.feedback.removal_ms,
                config.feedback.teleport_ms,
                config.feedback.selection_ms
            );
        }
        Commands::Demo => {
            let mut session = Session::new(&config).context("building scene")?;
            let outcomes = session.run_script(&demo_script());
            println!("Demo: {} actions handled", outcomes.len());
            report(&mut session, Duration::from_millis(10_000));
        }
        Commands::Run { script, settle_ms } => {
            let steps = ScriptStep::load_all(&script)
                .with_context(|| format!("loading script {}", script.display()))?;
            let mut session = Session::new(&config).context("building scene")?;
            let outcomes = session.run_script(&steps);
            for outcome in &outcomes {
                println!("{outcome:?}");
            }
            let last = steps.iter().map(|s| s.at_ms).max().unwrap_or(0);
            report(&mut session, Duration::from_millis(last + settle_ms));
        }
    }

    Ok(())
}

/// Let pending feedback expire, then print the scene and check that the
/// drained event log rebuilt the same scene.
fn report(session: &mut Session, settle_at: Duration) {
    if let Some(due) = session.feedback().next_due() {
        println!(
            "Pending feedback: {} (next due at {} ms)",
            session.feedback().pending(),
            due.as_millis()
        );
    }
    let expired = session.advance(settle_at);
    println!("Expired {expired} feedback markers");
    println!("{}", SceneInspector::summary(session.scene()));
    if let Some(rig) = session
        .scene()
        .anchor(Anchor::Rig)
        .ok()
        .and_then(|id| SceneInspector::inspect_entity(session.scene(), id))
    {
        println!("{rig}");
    }
    let hands: Vec<String> = session.connected_hands().map(|h| h.to_string()).collect();
    println!("Connected: [{}]", hands.join(", "));
    println!("Selected: {} ({} blocks)", session.selected(), session.block_count());
    for block in SceneInspector::list_blocks(session.scene()) {
        println!("  {block}");
    }
    for (block_type, count) in SceneInspector::block_census(session.scene()) {
        println!("  {block_type}: {count}");
    }

    let live = session.scene();
    let rebuilt = session.snapshot();
    let matches = rebuilt.entity_count() == live.entity_count()
        && rebuilt.block_count() == live.block_count()
        && rebuilt.entities().keys().eq(live.entities().keys());
    println!("Replay: {}", if matches { "OK" } else { "MISMATCH" });
}

fn demo_script() -> Vec<ScriptStep> {
    let input = |at_ms, event| ScriptStep {
        at_ms,
        step: Step::Input { event },
    };
    let aim = |at_ms, hand, yaw_degrees, pitch_degrees| ScriptStep {
        at_ms,
        step: Step::Aim {
            hand,
            yaw_degrees,
            pitch_degrees,
        },
    };
    let push = |at_ms, y| {
        input(
            at_ms,
            InputEvent::ThumbstickMoved {
                hand: Hand::Left,
                axes: Vec2::new(0.0, y),
            },
        )
    };

    vec![
        input(0, InputEvent::ControllerConnected { hand: Hand::Left }),
        input(0, InputEvent::ControllerConnected { hand: Hand::Right }),
        // A row of grass in front of the rig.
        input(100, InputEvent::TriggerDown { hand: Hand::Right }),
        aim(200, Hand::Right, 30.0, -45.0),
        input(300, InputEvent::TriggerDown { hand: Hand::Right }),
        aim(400, Hand::Right, -30.0, -45.0),
        input(500, InputEvent::TriggerDown { hand: Hand::Right }),
        // Same cell again: refused.
        input(600, InputEvent::TriggerDown { hand: Hand::Right }),
        // Stone, then wood by cycling.
        input(700, InputEvent::ButtonDown { hand: Hand::Left, button: FaceButton::Y }),
        aim(800, Hand::Right, 0.0, -25.0),
        input(900, InputEvent::TriggerDown { hand: Hand::Right }),
        input(1000, InputEvent::ThumbstickDown { hand: Hand::Right }),
        // Walk forward twice; a light push is ignored.
        push(1100, -0.5),
        push(1200, -0.95),
        push(1800, -0.95),
        aim(1900, Hand::Right, 0.0, -45.0),
        input(2000, InputEvent::TriggerDown { hand: Hand::Right }),
        // Knock the new block back out.
        input(2600, InputEvent::GripDown { hand: Hand::Right }),
        input(3000, InputEvent::ButtonDown { hand: Hand::Right, button: FaceButton::B }),
        input(3100, InputEvent::ControllerDisconnected { hand: Hand::Left }),
    ]
}
