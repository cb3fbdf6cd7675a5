#![forbid(unsafe_code)]

use clap::Parser;

use fractalcast::command_line_interface::Cli;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    if let Err(err) = fractalcast::run(&cli) {
        log::error!("render failed: {err}");
        std::process::exit(1);
    }
}
