use std::io;

use clap::Parser;
use log::LevelFilter;

use code_grader::app::App;
use code_grader::cli::Cli;
use code_grader::config::GraderConfig;

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags
    let log_level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbosity {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_target(false)
        .format_timestamp(None)
        .init();

    // Environment first; per-command flags are applied by the app
    let config = GraderConfig::from_env();

    let mut app = App::new(config, io::stdout().lock());
    if let Err(err) = app.run(cli.command) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
