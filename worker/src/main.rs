#![forbid(unsafe_code)]

//! The C9 worker agent (§4.8): connects to a master, receives the handshake,
//! then loops requesting and rendering rows until the master signals there
//! is no more work (§8's end-of-work empty read). A thin binary over
//! `fractalcast_net::run_worker`, styled after the teacher's own
//! `mandelbrot` binary: a `Cli` struct, `env_logger` wiring, and a
//! `main` that does nothing but parse, log and dispatch.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// Connects to a fractalcast master and renders rows on request.
struct Cli {
    /// Address of the master to connect to (e.g. `192.168.1.10:5000`).
    #[arg(long)]
    master: String,

    /// Number of OS threads to use per row (§4.6's column-stripe variant).
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Log verbosity (`error`, `warn`, `info`, `debug`, `trace`).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    if let Err(err) = fractalcast_net::run_worker(&cli.master, cli.threads) {
        log::error!("worker failed: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
