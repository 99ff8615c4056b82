use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Args;
use tetris_gym::{EncoderMode, EnvConfig};

#[derive(Args, Debug, Clone, Default)]
pub struct EnvArgs {
    /// JSON file holding an environment config. Flags below take precedence.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seed for every board. If omitted, the config file's seed (or the OS) is used.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Use the complex observation layout instead of the two-channel grid.
    #[arg(long)]
    pub complex: bool,

    /// Upcoming pieces included in complex observations.
    #[arg(long)]
    pub next_pieces: Option<usize>,
}

impl EnvArgs {
    pub fn load(&self) -> anyhow::Result<EnvConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => EnvConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.complex {
            config.mode = EncoderMode::Complex;
        }
        if let Some(next_pieces) = self.next_pieces {
            config.next_pieces = next_pieces;
        }
        Ok(config)
    }
}
