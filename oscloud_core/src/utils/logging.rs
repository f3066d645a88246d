use log::LevelFilter;

/// Initialize logging using env_logger.
/// `RUST_LOG` still wins over `level`,
/// e.g. `RUST_LOG=oscloud_core=debug oscloud list`.
pub fn init_logging(level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
