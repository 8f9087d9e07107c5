use tokio::sync::watch;
use tracing::info;

/// Single source of truth for online/offline state. Subscribers get a watch
/// channel; the sync service uses it to drain on reconnect.
pub struct ConnectivityMonitor {
    sender: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(initially_online);
        Self { sender }
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    /// Updates the state and notifies subscribers. Setting the current value
    /// again is a no-op and does not wake anyone.
    pub fn set_online(&self, online: bool) {
        let changed = self.sender.send_if_modified(|state| {
            if *state != online {
                *state = online;
                true
            } else {
                false
            }
        });

        if changed {
            info!(
                target: "sync::connectivity",
                online,
                "connectivity state changed"
            );
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
