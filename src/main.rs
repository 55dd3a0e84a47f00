use clap::Parser;

fn main() {
    env_logger_init();
    let cli = slim::cli::Cli::parse();
    std::process::exit(slim::cli::run(&cli));
}

/// Hook `log` output to stderr when RUST_LOG is set. Kept dependency-free;
/// construction statistics are debug-level only.
fn env_logger_init() {
    struct StderrLogger;

    impl log::Log for StderrLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            eprintln!("[{}] {}", record.level(), record.args());
        }

        fn flush(&self) {}
    }

    static LOGGER: StderrLogger = StderrLogger;

    if std::env::var_os("RUST_LOG").is_some() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);
    }
}
