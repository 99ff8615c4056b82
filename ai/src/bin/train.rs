use clap::Parser;
use log::info;
use tetris_ai::{
    agent::RandomAgent,
    cancel::{self, CancelToken},
    cli::EnvArgs,
    logging::LogArgs,
    train::{TrainConfig, train_loop_with},
    tui::TerminalSurface,
};
use tetris_core::tetris::Game;
use tetris_gym::{ACTION_COUNT, EnvConfig, FrameBuffer, Surface, TetrisEnv};

/// Runs a random agent against the environment and reports episode rewards.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(flatten)]
    env: EnvArgs,

    #[command(flatten)]
    log: LogArgs,

    /// Environment steps to run before stopping.
    #[arg(long, default_value_t = 50_000)]
    total_timesteps: u64,

    /// Finished episodes between progress lines.
    #[arg(long, default_value_t = 10)]
    print_freq: usize,

    /// Truncate episodes after this many steps.
    #[arg(long)]
    max_steps: Option<usize>,

    /// Draw the board in the terminal while training. Press `q` to stop.
    #[arg(long)]
    render: bool,
}

fn run<S, F>(
    config: EnvConfig,
    train: &TrainConfig,
    cancel: &CancelToken,
    poll: F,
) -> anyhow::Result<()>
where
    S: Surface,
    F: FnMut(&mut TetrisEnv<Game, S>) -> tetris_gym::Result<bool>,
{
    let mut agent = RandomAgent::new(ACTION_COUNT, config.seed);
    let mut env: TetrisEnv<Game, S> = TetrisEnv::new(config);

    info!("training for {} steps", train.total_timesteps);
    let summary = train_loop_with(&mut env, &mut agent, train, cancel, poll);
    env.close();
    let summary = summary?;

    info!(
        "done: {} steps, {} episodes, mean reward {}",
        summary.timesteps,
        summary.episodes,
        summary
            .mean_reward()
            .map_or_else(|| "n/a".to_owned(), |r| format!("{r:.2}"))
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.log.init(args.render)?;
    let config = args.env.load()?;
    let train = TrainConfig {
        total_timesteps: args.total_timesteps,
        print_freq: args.print_freq,
        max_steps: args.max_steps,
        render: args.render,
    };
    if train.render {
        // raw mode swallows Enter, so the surface polls for `q` instead
        run::<TerminalSurface, _>(config, &train, &CancelToken::new(), |env| {
            match env.surface_mut() {
                Some(surface) => Ok(surface.poll_quit()?),
                None => Ok(false),
            }
        })
    } else {
        info!("press Enter to stop");
        run::<FrameBuffer, _>(config, &train, &cancel::on_enter(), |_| Ok(false))
    }
}
