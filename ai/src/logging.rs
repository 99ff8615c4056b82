use std::{fs::File, path::PathBuf};

use anyhow::Context;
use clap::Args;
use env_logger::{Builder, Target};
use log::LevelFilter;

#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Write log lines to this file instead of stderr.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl LogArgs {
    /// Logger honouring `RUST_LOG`. While the terminal surface owns the screen,
    /// stderr is not a valid target, so logging is off unless a file is given.
    pub fn builder(&self, terminal: bool) -> anyhow::Result<Builder> {
        if let Some(path) = &self.log_file {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut builder = Builder::from_default_env();
            builder.target(Target::Pipe(Box::new(file)));
            return Ok(builder);
        }
        if terminal {
            let mut builder = Builder::new();
            builder.filter_level(LevelFilter::Off);
            return Ok(builder);
        }
        Ok(Builder::from_default_env())
    }

    pub fn init(&self, terminal: bool) -> anyhow::Result<()> {
        self.builder(terminal)?.init();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn terminal_without_file_is_silent() {
        let logger = LogArgs::default().builder(true).unwrap().build();
        assert_eq!(logger.filter(), LevelFilter::Off);
    }

    #[test]
    fn file_target_is_created() {
        let path = std::env::temp_dir().join(format!("tetris-log-{}.log", std::process::id()));
        let args = LogArgs {
            log_file: Some(path.clone()),
        };
        let mut builder = args.builder(true).unwrap();
        builder.filter_level(LevelFilter::Info);
        assert_eq!(builder.build().filter(), LevelFilter::Info);
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unwritable_file_names_the_path() {
        let args = LogArgs {
            log_file: Some(PathBuf::from("/nonexistent/dir/tetris.log")),
        };
        let err = args.builder(false).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/tetris.log"));
    }
}
