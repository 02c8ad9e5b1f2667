#[cfg(feature = "logging")]
use chrono::Local;
#[cfg(feature = "logging")]
use std::io::Write;

/// Installs the process logger. The level comes from `RUST_LOG`, default `warn`.
#[cfg(feature = "logging")]
pub fn setup_logger() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.file().unwrap_or_default(),
                record.line().unwrap_or_default(),
                record.args()
            )
        })
        .try_init()
}

#[cfg(not(feature = "logging"))]
pub fn setup_logger() -> Result<(), log::SetLoggerError> {
    Ok(())
}
