//! Shared configuration and run-state helpers for apibuilder.
//!
//! This crate holds what the `apibuilder` CLI needs around the generator
//! itself: the `apibuilder.toml` config, the run-once lock and the
//! reachability probe used before fetching a remote document.

pub mod config;
pub mod lock;

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

pub use config::{
    BuilderConfig, CONFIG_FILENAME, FilterConfig, LineEndingConfig, OutputConfig, PrimaryName,
    SOURCE_ENV,
};
pub use lock::{LOCK_FILENAME, RunLock};

/// Timeout of one TCP connect attempt in [`is_host_reachable`].
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Check whether `host:port` accepts TCP connections.
///
/// Every resolved address is tried in turn; the first successful connect
/// wins. Resolution failures count as unreachable.
pub fn is_host_reachable(host: &str, port: u16, timeout: Duration) -> bool {
    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(err) => {
            debug!(host, port, error = %err, "Failed to resolve host.");
            return false;
        }
    };
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => return true,
            Err(err) => debug!(%addr, error = %err, "Connect attempt failed."),
        }
    }
    false
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_reachable_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(is_host_reachable("127.0.0.1", port, Duration::from_millis(500)));
    }

    #[test]
    fn test_closed_port_is_unreachable() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        assert!(!is_host_reachable("127.0.0.1", port, Duration::from_millis(500)));
    }
}
