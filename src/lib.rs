#![forbid(unsafe_code)]

//! The `fractalcast` CLI binary's library half: wires parsed flags to the
//! rendering engine (`fractalcast-core`) and, in master role, to the LAN
//! dispatcher (`fractalcast-net`). Split out of `main.rs` so the concrete
//! scenarios in spec.md §8 can be exercised from the `tests/` integration
//! suite without spawning a subprocess, matching the teacher's own
//! `lib.rs`/`main.rs` split.

pub mod command_line_interface;
pub mod config;

use fractalcast_core::RenderResult;

use command_line_interface::{Cli, Role};

/// Runs the render described by `cli` to completion: a single-host render
/// in [`Role::Standalone`], or the master side of a distributed render in
/// [`Role::Master`].
///
/// # Errors
/// Propagates any [`fractalcast_core::RenderError`] raised while
/// validating the plot context, rendering, or writing the output.
pub fn run(cli: &Cli) -> RenderResult<()> {
    let ctx = config::plot_context_from_cli(cli)?;
    let destination = config::destination_from_cli(cli);

    match cli.role {
        Role::Standalone => {
            log::info!(
                "rendering {}x{} {:?} image at {:?} precision",
                ctx.width,
                ctx.height,
                ctx.scheme,
                ctx.precision
            );
            fractalcast_core::render_to_sink_at(&ctx, &destination, cli.memory_budget, cli.threads)
        }
        Role::Master => {
            let bind_address = cli.bind.as_deref().unwrap_or("0.0.0.0:5000");
            log::info!(
                "starting master on {bind_address}, expecting {} worker(s)",
                cli.worker_count
            );
            fractalcast_net::run_master(&ctx, &destination, bind_address, cli.worker_count)
        }
    }
}
