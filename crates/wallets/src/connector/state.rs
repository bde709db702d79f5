use super::types::{ConnectionStatus, ConnectorEvent};
use crate::account::BoundAccount;
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::{
    RwLock, RwLockReadGuard, RwLockWriteGuard,
    mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};

/// Shared connector state. The connector is its only writer.
#[derive(Debug, Default)]
pub(crate) struct ConnectorState {
    status: Mutex<ConnectionStatus>,
    /// The account requests run against.
    binding: Mutex<Option<Arc<BoundAccount>>>,
    /// Bumped by every disconnect; a binding computed under an older epoch is discarded.
    epoch: AtomicU64,
    /// Requests hold a read guard while executing, rebinding takes the write guard.
    gate: RwLock<()>,
    listeners: Mutex<Vec<UnboundedSender<ConnectorEvent>>>,
}

impl ConnectorState {
    pub fn status(&self) -> ConnectionStatus {
        *self.status.lock()
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        *self.status.lock() = status;
    }

    pub fn binding(&self) -> Option<Arc<BoundAccount>> {
        self.binding.lock().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Installs `bound` unless a disconnect happened since `epoch` was read.
    pub fn install(&self, bound: Arc<BoundAccount>, epoch: u64) -> bool {
        let mut binding = self.binding.lock();
        if self.epoch() != epoch {
            return false;
        }
        *binding = Some(bound);
        true
    }

    /// Drops the binding and invalidates bindings still being computed.
    pub fn disconnect(&self) {
        let mut binding = self.binding.lock();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *binding = None;
        self.set_status(ConnectionStatus::Disconnected);
    }

    pub async fn execution(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().await
    }

    pub async fn rebinding(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().await
    }

    pub fn subscribe(&self) -> UnboundedReceiver<ConnectorEvent> {
        let (tx, rx) = unbounded_channel();
        self.listeners.lock().push(tx);
        rx
    }

    /// Sends `event` to every live listener, forgetting dropped ones.
    pub fn notify(&self, event: ConnectorEvent) {
        self.listeners.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }
}
