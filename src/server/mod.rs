//! Server-side event loop: control-port acceptor and session fan-out
// (c) 2025 the mftp developers

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Context as _, Result};
use tokio::net::{TcpListener, TcpSocket};
use tracing::{debug, error, info};

use crate::config;

mod session;
pub use session::Session;

/// Binds a listening socket on the given port on all interfaces.
///
/// `SO_REUSEADDR` is set so a restarted server can rebind without waiting
/// out `TIME_WAIT`.
fn listen_on(port: u16, backlog: u32) -> Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    let listener = socket.listen(backlog)?;
    debug!("listening on {addr}");
    Ok(listener)
}

/// Binds a fresh listener on an OS-assigned port for one data connection.
///
/// Returns the listener and the port to publish to the client.
pub(crate) async fn listen_ephemeral() -> Result<(TcpListener, u16)> {
    let listener = listen_on(0, 1)?;
    let port = listener.local_addr()?.port();
    debug!("data listener on port {port}");
    Ok((listener, port))
}

/// Server event loop: binds the control port and serves until terminated.
pub async fn serve() -> Result<()> {
    let listener = listen_on(config::CONTROL_PORT, config::LISTEN_BACKLOG)
        .with_context(|| format!("binding control port {}", config::CONTROL_PORT))?;
    info!("listening on port {}", config::CONTROL_PORT);
    run(listener).await
}

/// Accept loop over a pre-bound listener. One task per client; a session
/// failure never takes the acceptor down.
pub async fn run(listener: TcpListener) -> Result<()> {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("accept failed: {e}");
                continue;
            }
        };
        info!("Accepted connection from {peer}");

        let _ = tokio::spawn(async move {
            let session = match Session::new(stream) {
                Ok(session) => session,
                Err(e) => {
                    error!("could not start session for {peer}: {e}");
                    return;
                }
            };
            match session.run().await {
                Ok(()) => debug!("session for {peer} finished"),
                Err(e) => error!("session for {peer} failed: {e:#}"),
            }
        });
    }
}

#[cfg(test)]
mod test {
    use super::{listen_ephemeral, listen_on};

    #[tokio::test]
    async fn ephemeral_listener_reports_its_port() {
        let (listener, port) = listen_ephemeral().await.unwrap();
        assert_ne!(port, 0);
        assert_eq!(listener.local_addr().unwrap().port(), port);
    }

    #[tokio::test]
    async fn bound_port_is_connectable() {
        let listener = listen_on(0, 1).unwrap();
        let port = listener.local_addr().unwrap().port();
        let client = tokio::net::TcpStream::connect(("127.0.0.1", port)).await;
        assert!(client.is_ok());
    }
}
