use thiserror::Error;

/// Every error kind the core surfaces to its caller (spec §7). Each variant
/// is handled locally only to release whatever resource it names — the
/// file, the band, the thread list, the socket — before propagating; none
/// are retried.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("plot context field out of range: {0}")]
    ConfigOutOfRange(String),

    #[error("memory budget of {budget} bytes cannot hold even one row of {row_bytes} bytes")]
    OutOfBudget { budget: usize, row_bytes: usize },

    #[error("could not open image file {path}: {source}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write to image file: {0}")]
    FileWrite(#[source] std::io::Error),

    #[error("could not close image file: {0}")]
    FileClose(#[source] std::io::Error),

    #[error("could not spawn render thread: {0}")]
    ThreadSpawn(String),

    #[error("could not join render thread: {0}")]
    ThreadJoin(String),

    #[error("could not read from socket: {0}")]
    SocketRead(#[source] std::io::Error),

    #[error("could not write to socket: {0}")]
    SocketWrite(#[source] std::io::Error),

    #[error("short read or write on socket: expected {expected} bytes, got {actual}")]
    ShortIo { expected: usize, actual: usize },

    #[error("peer closed the connection")]
    PeerClosed,

    #[error("the requested precision is not supported in this build: {0}")]
    PrecisionUnsupported(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
