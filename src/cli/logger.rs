// Logging setup for CLI commands
use std::io::Write;

/// Initialize stderr logging from the verbosity flags.
///
/// `RUST_LOG` overrides the flags entirely, so standard env_logger
/// filtering still works for debugging dependencies.
pub fn init_logger(verbose: bool, quiet: bool) {
    if std::env::var("RUST_LOG").is_ok() {
        return env_logger::init();
    }

    let own_level = if quiet {
        log::LevelFilter::Error
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    // Dependencies never log below warn; reqwest and hyper are chatty at
    // debug and would drown the shard logs
    let dep_level = own_level.min(log::LevelFilter::Warn);

    env_logger::Builder::new()
        .filter_level(dep_level)
        .filter_module("blueberry", own_level)
        .format(|buf, record| {
            if record.level() >= log::Level::Debug {
                writeln!(buf, "[{}] {}", record.target(), record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .init();
}
