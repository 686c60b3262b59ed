use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env};

use crate::config::LogConfig;

/// Route the `log` facade into an append-only file under the configured dir.
/// `RUST_LOG` overrides the configured level. Calling it twice is harmless.
pub fn init_logger(config: &LogConfig) -> Result<()> {
    fs::create_dir_all(&config.dir)
        .with_context(|| format!("failed to create log dir {}", config.dir))?;

    let log_path = Path::new(&config.dir).join(&config.file);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let installed = Builder::from_env(Env::default().default_filter_or(config.level.as_str()))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{:<5}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .try_init();
    if installed.is_err() {
        log::debug!("logger already installed, keeping the existing one");
    }
    Ok(())
}
