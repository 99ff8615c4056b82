use std::{thread, time::Duration};

use clap::Parser;
use log::info;
use tetris_ai::{
    agent::{Agent, RandomAgent},
    cli::EnvArgs,
    logging::LogArgs,
    tui::TerminalSurface,
};
use tetris_core::tetris::Game;
use tetris_gym::{ACTION_COUNT, FrameBuffer, Simulator, Surface, TetrisEnv, translate};

/// Plays one episode with a random agent, drawing every step.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    env: EnvArgs,

    #[command(flatten)]
    log: LogArgs,

    /// Print steps instead of drawing to the terminal.
    #[arg(long)]
    headless: bool,

    /// Pause between steps.
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,
}

/// Plays until the game ends or `report` returns false. Returns the final
/// score when the episode finished.
fn play<S, A, F>(
    env: &mut TetrisEnv<Game, S>,
    agent: &mut A,
    delay: Duration,
    mut report: F,
) -> anyhow::Result<Option<u32>>
where
    S: Surface,
    A: Agent,
    F: FnMut(&mut TetrisEnv<Game, S>, String) -> anyhow::Result<bool>,
{
    let mut observation = env.reset()?;
    env.render()?;
    loop {
        let action = agent.act(&observation);
        let line = format!(
            "Steps: {} Action: \"{}\"",
            env.game().time_passed,
            translate(action)?
        );
        if !report(env, line)? {
            return Ok(None);
        }
        env.render()?;
        let step = env.step(action)?;
        if step.done {
            env.render()?;
            return Ok(Some(env.game().score()));
        }
        observation = step.observation;
        thread::sleep(delay);
    }
}

fn run<S, F>(args: &Args, report: F) -> anyhow::Result<()>
where
    S: Surface,
    F: FnMut(&mut TetrisEnv<Game, S>, String) -> anyhow::Result<bool>,
{
    let config = args.env.load()?;
    let mut agent = RandomAgent::new(ACTION_COUNT, config.seed);
    let mut env: TetrisEnv<Game, S> = TetrisEnv::new(config);
    let delay = Duration::from_millis(args.delay_ms);
    let outcome = play(&mut env, &mut agent, delay, report);
    env.close();
    // the terminal is restored from here on
    match outcome? {
        Some(score) => {
            info!("Episode finished");
            println!("Episode finished with score {score}");
        }
        None => info!("stopped before the episode ended"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.log.init(!args.headless)?;
    if args.headless {
        run::<FrameBuffer, _>(&args, |_, line| {
            println!("{line}");
            Ok(true)
        })
    } else {
        run::<TerminalSurface, _>(&args, |env, line| {
            let Some(surface) = env.surface_mut() else {
                return Ok(true);
            };
            surface.set_status(line);
            Ok(!surface.poll_quit()?)
        })
    }
}
