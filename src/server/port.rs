//! Listening port selection.

use rand::Rng;
use std::net::{Ipv4Addr, TcpListener};
use std::ops::RangeInclusive;
use tracing::debug;

/// Ports probed when none is configured.
pub const PROBE_RANGE: RangeInclusive<u16> = 8000..=8999;

/// Returns `explicit` when set, otherwise a free port from [`PROBE_RANGE`].
pub fn select_port(explicit: Option<u16>) -> u16 {
    select_port_with(explicit, &mut rand::thread_rng(), is_free)
}

/// Port selection with the randomness and the availability probe supplied.
///
/// Probing draws ports at random until `is_free` accepts one, with no bound on
/// the number of attempts.
pub fn select_port_with<R, F>(explicit: Option<u16>, rng: &mut R, mut is_free: F) -> u16
where
    R: Rng + ?Sized,
    F: FnMut(u16) -> bool,
{
    if let Some(port) = explicit {
        return port;
    }
    loop {
        let port = rng.gen_range(PROBE_RANGE);
        if is_free(port) {
            return port;
        }
        debug!("Port {} is in use", port);
    }
}

/// Binds and immediately releases `port` on the loopback interface.
fn is_free(port: u16) -> bool {
    TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok()
}
