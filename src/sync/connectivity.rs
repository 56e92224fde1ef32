/// Network state as reported by the platform's explicit type signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    /// Explicit "no network" signal.
    None,
    Wifi,
    Cellular,
    Ethernet,
    Unknown,
}

/// Read of the platform's current network reachability.
///
/// The embedding application implements this against whatever the
/// platform exposes; the sync controller only ever consults
/// [`reachable`](Connectivity::reachable).
pub trait Connectivity: Send + Sync {
    /// Explicit network type signal, when the platform exposes one.
    fn network_type(&self) -> Option<NetworkType>;

    /// Generic online/offline flag.
    fn is_online(&self) -> bool;

    /// Whether the device should be treated as online.
    ///
    /// An explicit "no network" signal is authoritative; without one,
    /// the generic flag decides.
    fn reachable(&self) -> bool {
        match self.network_type() {
            Some(NetworkType::None) => false,
            _ => self.is_online(),
        }
    }
}
