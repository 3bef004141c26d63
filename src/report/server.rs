//! HTTP/1.0 status server.
//!
//! Runs in its own thread on an `edge-executor` [`LocalExecutor`] driven
//! by the `async-io-mini` reactor.  Two tasks share the thread:
//!
//! ```text
//!  ┌───────────────────────────────────────────────┐
//!  │  http thread                                  │
//!  │  ┌─────────────────┐   ┌───────────────────┐  │
//!  │  │ accept + serve  │   │ link supervisor   │  │
//!  │  │ one at a time   │   │ every N seconds   │  │
//!  │  └─────────────────┘   └───────────────────┘  │
//!  └───────────────────────────────────────────────┘
//! ```
//!
//! Requests are served to completion one after another.  Each response
//! renders under the measurement lock, so it may wait for an in-flight
//! cycle.
//!
//! [`LocalExecutor`]: edge_executor::LocalExecutor

use std::io;
use std::net::{Ipv4Addr, SocketAddr, TcpListener};
use std::time::Duration;

use async_io_mini::{Async, Timer};
use embedded_hal::delay::DelayNs;
use futures_lite::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use log::{info, warn};

use crate::app::ports::{ClockPort, StatusIndicator, WifiPort};
use crate::network::{ConnectionState, NetworkManager};

use super::{ReportRenderer, Route, route};

/// Longest request or header line kept; the rest is discarded.
const MAX_LINE: usize = 512;

/// A client that has not finished its request by then is dropped.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Read one `\n`-terminated line, keeping at most `max` bytes of it.
///
/// Bytes past `max` are consumed up to the newline without being stored.
/// Returns the number of bytes consumed, 0 at EOF.
async fn read_line_bounded<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    max: usize,
) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut consumed = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(consumed);
        }
        let (chunk, done) = match available.iter().position(|b| *b == b'\n') {
            Some(i) => (&available[..=i], true),
            None => (available, false),
        };
        let room = max.saturating_sub(line.len());
        line.extend_from_slice(&chunk[..chunk.len().min(room)]);
        let n = chunk.len();
        reader.consume(n);
        consumed += n;
        if done {
            return Ok(consumed);
        }
    }
}

/// Read one request, write one response.
///
/// Headers are consumed up to the blank line (or EOF) and ignored.
pub async fn serve_client<R, W>(
    mut reader: R,
    mut writer: W,
    renderer: &ReportRenderer,
) -> io::Result<Route>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut request_line = Vec::with_capacity(64);
    read_line_bounded(&mut reader, &mut request_line, MAX_LINE).await?;

    let mut header = Vec::with_capacity(64);
    loop {
        header.clear();
        let n = read_line_bounded(&mut reader, &mut header, MAX_LINE).await?;
        if n == 0 || header == b"\r\n" || header == b"\n" {
            break;
        }
    }

    let target = route(&request_line);
    let (content_type, body) = renderer.render(target);

    let head = format!("HTTP/1.0 200 OK\r\nContent-type: {content_type}\r\n\r\n");
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await?;

    Ok(target)
}

/// [`serve_client`] bounded by `timeout`.
pub async fn serve_client_within<R, W>(
    reader: R,
    writer: W,
    renderer: &ReportRenderer,
    timeout: Duration,
) -> io::Result<Route>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    futures_lite::future::or(serve_client(reader, writer, renderer), async {
        Timer::after(timeout).await;
        Err(io::Error::new(io::ErrorKind::TimedOut, "client too slow"))
    })
    .await
}

/// Re-establishes the Wi-Fi link when the server notices it is gone.
pub struct LinkSupervisor<W, C, L, D> {
    pub network: NetworkManager<W, C>,
    pub indicator: L,
    pub delay: D,
    pub interval: Duration,
}

impl<W, C, L, D> LinkSupervisor<W, C, L, D>
where
    W: WifiPort,
    C: ClockPort,
    L: StatusIndicator,
    D: DelayNs,
{
    /// One supervision step.  Blocks the server thread while reconnecting.
    pub fn check(&mut self) -> ConnectionState {
        match self.network.check_link() {
            ConnectionState::Connected => ConnectionState::Connected,
            _ => self.network.reconnect(&mut self.indicator, &mut self.delay),
        }
    }

    async fn run(mut self) {
        loop {
            Timer::after(self.interval).await;
            let state = self.check();
            if state != ConnectionState::Connected {
                warn!("HTTP: link down ({:?}), retrying in {:?}", state, self.interval);
            }
        }
    }
}

async fn accept_loop(listener: Async<TcpListener>, renderer: ReportRenderer) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("HTTP: accept failed: {}", e);
                Timer::after(Duration::from_millis(100)).await;
                continue;
            }
        };

        let (read_half, write_half) = futures_lite::io::split(stream);
        let served =
            serve_client_within(BufReader::new(read_half), write_half, &renderer, CLIENT_TIMEOUT)
                .await;
        match served {
            Ok(r) => info!("HTTP: {} {:?}", peer, r),
            Err(e) => warn!("HTTP: {} failed: {}", peer, e),
        }
    }
}

fn run_server<W, C, L, D>(
    listener: Async<TcpListener>,
    renderer: ReportRenderer,
    supervisor: LinkSupervisor<W, C, L, D>,
) where
    W: WifiPort,
    C: ClockPort,
    L: StatusIndicator,
    D: DelayNs,
{
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();

    executor.spawn(accept_loop(listener, renderer)).detach();
    executor.spawn(supervisor.run()).detach();

    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// Bind the listener and start the server thread.
///
/// Only called once the network is up; a failed bind is returned so the
/// caller can carry on without the status interface.
pub fn spawn<W, C, L, D>(
    port: u16,
    renderer: ReportRenderer,
    supervisor: LinkSupervisor<W, C, L, D>,
) -> io::Result<std::thread::JoinHandle<()>>
where
    W: WifiPort + Send + 'static,
    C: ClockPort + Send + 'static,
    L: StatusIndicator + Send + 'static,
    D: DelayNs + Send + 'static,
{
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let std_listener = TcpListener::bind(addr)?;
    info!("HTTP: listening on {}", addr);

    crate::drivers::task_pin::spawn_on_core(
        crate::drivers::task_pin::Core::Pro,
        5,
        12,
        "http\0",
        move || match Async::new(std_listener) {
            Ok(listener) => run_server(listener, renderer, supervisor),
            Err(e) => warn!("HTTP: cannot register listener: {}", e),
        },
    )
}

/// Start the server only when the network came up.
///
/// Returns `None` when the manager is not connected; the device then runs
/// fan control alone.
pub fn spawn_if_connected<W, C, L, D>(
    port: u16,
    renderer: ReportRenderer,
    supervisor: LinkSupervisor<W, C, L, D>,
) -> Option<io::Result<std::thread::JoinHandle<()>>>
where
    W: WifiPort + Send + 'static,
    C: ClockPort + Send + 'static,
    L: StatusIndicator + Send + 'static,
    D: DelayNs + Send + 'static,
{
    if supervisor.network.state() != ConnectionState::Connected {
        warn!("HTTP: network {:?}, status interface disabled", supervisor.network.state());
        return None;
    }
    Some(spawn(port, renderer, supervisor))
}
