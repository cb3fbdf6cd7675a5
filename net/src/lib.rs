#![forbid(unsafe_code)]

//! Distributed rendering (§8): a master accepts one TCP connection per
//! worker, hands out rows one at a time as workers ask for them, and
//! reassembles the results in row order regardless of the order they
//! actually arrive in. No async runtime — one OS thread per worker
//! connection on the master side, a single blocking loop on the worker
//! side, matching the synchronous socket model in the original
//! implementation and the teacher's own preference for OS threads.

pub mod protocol;

use std::collections::BTreeMap;
use std::net::{TcpListener, TcpStream};
use std::sync::Mutex;
use std::thread;

use fractalcast_core::{
    render_single_row, ArrayContext, CoordinateMap, Destination, ImageSink, PlotContext,
    RenderError, RenderResult,
};
use fractalcast_precision::{ArbitraryRealm, ExtendedRealm, PrecisionMode, PrecisionRealm, StandardRealm};

struct MasterState {
    next_assign: usize,
    height: usize,
    pending: BTreeMap<usize, Vec<u8>>,
    next_write: usize,
    row_bytes: usize,
    sink: ImageSink,
}

impl MasterState {
    fn take_next_row(&mut self) -> Option<usize> {
        if self.next_assign < self.height {
            let row = self.next_assign;
            self.next_assign += 1;
            Some(row)
        } else {
            None
        }
    }

    /// Stores a completed row and flushes every row that is now next in
    /// line, in order, to the sink.
    fn deposit_row(&mut self, row: usize, pixels: Vec<u8>) -> RenderResult<()> {
        self.pending.insert(row, pixels);
        while let Some(pixels) = self.pending.remove(&self.next_write) {
            let mut array = ArrayContext::new(self.row_bytes, 1);
            array.row_mut(0).copy_from_slice(&pixels);
            self.sink.write_block(&array, 1)?;
            self.next_write += 1;
        }
        Ok(())
    }
}

/// Runs the master side of a distributed render: binds `bind_address`,
/// accepts exactly `worker_count` connections, sends each one the
/// handshake, then dispatches rows to whichever worker asks for one next
/// until every row of `ctx` has been rendered and written to
/// `destination`.
///
/// # Errors
/// Propagates socket, thread and sink errors. A worker that disconnects
/// mid-render is logged and its unassigned rows simply go to whichever
/// worker asks next; if every worker disconnects before all rows are
/// assigned the render never completes and this function returns once the
/// last thread exits without having covered every row.
pub fn run_master(
    ctx: &PlotContext,
    destination: &Destination,
    bind_address: &str,
    worker_count: usize,
) -> RenderResult<()> {
    let listener = TcpListener::bind(bind_address).map_err(RenderError::SocketRead)?;
    log::info!("master listening on {bind_address}, expecting {worker_count} worker(s)");

    let depth = ctx.scheme.bit_depth();
    let row_bytes = fractalcast_core::block::row_bytes(ctx.width, depth);
    let sink = ImageSink::create(destination, ctx.width, ctx.height, depth)?;

    let state = Mutex::new(MasterState {
        next_assign: 0,
        height: ctx.height,
        pending: BTreeMap::new(),
        next_write: 0,
        row_bytes,
        sink,
    });

    let mut connections = Vec::with_capacity(worker_count);
    for i in 0..worker_count {
        let (stream, addr) = listener.accept().map_err(RenderError::SocketRead)?;
        log::info!("worker {i} connected from {addr}");
        connections.push(stream);
    }

    thread::scope(|scope| -> RenderResult<()> {
        let handles: Vec<_> = connections
            .into_iter()
            .enumerate()
            .map(|(worker_id, stream)| {
                let state = &state;
                scope.spawn(move || handle_worker_connection(worker_id, stream, ctx, state))
            })
            .collect();

        for handle in handles {
            handle
                .join()
                .map_err(|_| RenderError::ThreadJoin("worker-handling thread panicked".into()))??;
        }
        Ok(())
    })?;

    let MasterState { sink, next_write, height, .. } = state.into_inner().expect("mutex not poisoned");
    if next_write != height {
        log::warn!("render incomplete: {next_write} of {height} rows were written");
    }
    sink.close()
}

fn handle_worker_connection(
    worker_id: usize,
    mut stream: TcpStream,
    ctx: &PlotContext,
    state: &Mutex<MasterState>,
) -> RenderResult<()> {
    let handshake = protocol::encode_handshake(ctx);
    std::io::Write::write_all(&mut stream, &handshake).map_err(RenderError::SocketWrite)?;

    loop {
        if !protocol::await_ping(&mut stream)? {
            log::debug!("worker {worker_id} disconnected");
            break;
        }

        let row_bytes = state.lock().expect("mutex not poisoned").row_bytes;
        let row = {
            let mut state = state.lock().expect("mutex not poisoned");
            state.take_next_row()
        };

        let Some(row) = row else {
            log::debug!("no more rows for worker {worker_id}; closing connection");
            break;
        };

        protocol::assign_row(&mut stream, row as u64)?;

        match protocol::receive_row_result(&mut stream, row_bytes)? {
            Some((_, pixels)) => {
                state
                    .lock()
                    .expect("mutex not poisoned")
                    .deposit_row(row, pixels)?;
            }
            None => {
                log::warn!("worker {worker_id} disconnected mid-row {row}");
                break;
            }
        }
    }

    Ok(())
}

/// Runs the worker side of a distributed render: connects to the master,
/// reads the handshake, then loops requesting and rendering rows until
/// the master signals there is no more work.
///
/// # Errors
/// Propagates socket errors and anything [`render_single_row`] returns.
pub fn run_worker(master_address: &str, thread_count: usize) -> RenderResult<()> {
    let mut stream = TcpStream::connect(master_address).map_err(RenderError::SocketRead)?;
    log::info!("connected to master at {master_address}");

    let mut handshake_buf = [0u8; protocol::HANDSHAKE_LEN];
    std::io::Read::read_exact(&mut stream, &mut handshake_buf).map_err(RenderError::SocketRead)?;
    let ctx = protocol::decode_handshake(&handshake_buf)?;
    let coord = CoordinateMap::new(&ctx.frame, ctx.width, ctx.height);

    log::info!(
        "handshake received: {}x{} image, {:?} scheme, {:?} precision",
        ctx.width,
        ctx.height,
        ctx.scheme,
        ctx.precision
    );

    match ctx.precision {
        PrecisionMode::Standard => {
            worker_loop(&StandardRealm, &ctx, &coord, &mut stream, thread_count)
        }
        PrecisionMode::Extended => {
            worker_loop(&ExtendedRealm, &ctx, &coord, &mut stream, thread_count)
        }
        PrecisionMode::Arbitrary { significand_bits } => {
            let realm = ArbitraryRealm::new(significand_bits);
            worker_loop(&realm, &ctx, &coord, &mut stream, thread_count)
        }
    }
}

fn worker_loop<R: PrecisionRealm + Sync>(
    realm: &R,
    ctx: &PlotContext,
    coord: &CoordinateMap,
    stream: &mut TcpStream,
    thread_count: usize,
) -> RenderResult<()> {
    loop {
        let Some(row) = protocol::request_row(stream)? else {
            log::info!("master signalled end of work");
            return Ok(());
        };

        log::debug!("rendering row {row}");
        let pixels = render_single_row(realm, ctx, coord, row as usize, thread_count)?;
        protocol::send_row_result(stream, row, &pixels)?;
    }
}
