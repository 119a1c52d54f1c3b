//! ConnectionRegistry - connection state for the two endpoint slots
//!
//! Each slot pairs a connector adapter with its current state. Mutations
//! (connect, disconnect) are serialized per slot through an async gate held
//! across the connector handshake; reads go through a separate short-lived
//! lock, so `is_connected` never waits behind a slow handshake.
//!
//! ## Flow
//!
//! ```text
//! connect(kind, cfg) ──→ gate ──→ validate ──→ connector.connect (timeout)
//!                                                 │
//!                               ok: connected=true, cfg stored
//!                               err: connected=false, cfg discarded
//! ```

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::Serialize;
use sharesync_audit::LogBuffer;
use sharesync_core::{
    domain::{EndpointConfig, OrchestrationError, SlotKind},
    ports::{IEndpointConnector, RemoteEntry},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Read-only view of one slot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotView {
    pub kind: SlotKind,
    pub connected: bool,
    /// Stored parameters; the credential password is never serialized
    pub config: Option<EndpointConfig>,
}

#[derive(Debug, Default)]
struct SlotState {
    connected: bool,
    config: Option<EndpointConfig>,
}

struct Slot {
    kind: SlotKind,
    connector: Arc<dyn IEndpointConnector>,
    /// Serializes connect/disconnect for this slot
    gate: Mutex<()>,
    state: RwLock<SlotState>,
}

impl Slot {
    fn new(kind: SlotKind, connector: Arc<dyn IEndpointConnector>) -> Self {
        Self {
            kind,
            connector,
            gate: Mutex::new(()),
            state: RwLock::new(SlotState::default()),
        }
    }

    fn view(&self) -> SlotView {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        SlotView {
            kind: self.kind,
            connected: state.connected,
            config: state.config.clone(),
        }
    }

    fn set(&self, connected: bool, config: Option<EndpointConfig>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.connected = connected;
        state.config = config;
    }
}

/// Holds connection state and configuration for the share and transfer slots
pub struct ConnectionRegistry {
    share: Slot,
    transfer: Slot,
    log: Arc<LogBuffer>,
    connect_timeout: Duration,
}

impl ConnectionRegistry {
    /// Creates a registry with both slots disconnected
    ///
    /// # Arguments
    /// * `share` - Connector for the share slot
    /// * `transfer` - Connector for the transfer slot
    /// * `log` - Shared audit log
    /// * `connect_timeout` - Upper bound for each connector handshake
    pub fn new(
        share: Arc<dyn IEndpointConnector>,
        transfer: Arc<dyn IEndpointConnector>,
        log: Arc<LogBuffer>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            share: Slot::new(SlotKind::Share, share),
            transfer: Slot::new(SlotKind::Transfer, transfer),
            log,
            connect_timeout,
        }
    }

    fn slot(&self, kind: SlotKind) -> &Slot {
        match kind {
            SlotKind::Share => &self.share,
            SlotKind::Transfer => &self.transfer,
        }
    }

    /// Connects `kind` using `config`
    ///
    /// Reconnecting an already-connected slot replaces its config. On any
    /// failure the slot ends up disconnected and the attempted config is
    /// discarded. Appends exactly one log entry.
    pub async fn connect(
        &self,
        kind: SlotKind,
        config: EndpointConfig,
    ) -> Result<(), OrchestrationError> {
        let slot = self.slot(kind);
        let _gate = slot.gate.lock().await;

        info!(slot = %kind, "Connecting endpoint");

        match self.establish(slot, &config).await {
            Ok(()) => {
                slot.set(true, Some(config));
                self.log.success(format!("{kind} connection established"));
                Ok(())
            }
            Err(cause) => {
                slot.set(false, None);
                self.log
                    .error(format!("{kind} connection failed: {cause}"));
                Err(OrchestrationError::Connection { kind, cause })
            }
        }
    }

    async fn establish(&self, slot: &Slot, config: &EndpointConfig) -> Result<(), String> {
        if config.is_empty() {
            return Err("connection parameters are empty".to_string());
        }
        slot.connector
            .validate(config)
            .map_err(|e| format!("invalid configuration: {e:#}"))?;

        match tokio::time::timeout(self.connect_timeout, slot.connector.connect(config)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(format!("{e:#}")),
            Err(_) => Err(format!(
                "timed out after {}s",
                self.connect_timeout.as_secs()
            )),
        }
    }

    /// Disconnects `kind`
    ///
    /// Fails with [`OrchestrationError::NotConnected`] if the slot is not
    /// connected. Otherwise the slot is marked disconnected even when the
    /// connector's teardown reports an error. Appends exactly one log entry.
    pub async fn disconnect(&self, kind: SlotKind) -> Result<(), OrchestrationError> {
        let slot = self.slot(kind);
        let _gate = slot.gate.lock().await;

        let view = slot.view();
        let config = match (view.connected, view.config) {
            (true, Some(config)) => config,
            _ => {
                self.log
                    .warning(format!("{kind} disconnect ignored: not connected"));
                return Err(OrchestrationError::NotConnected { kind });
            }
        };

        let teardown =
            tokio::time::timeout(self.connect_timeout, slot.connector.disconnect(&config)).await;
        slot.set(false, None);

        match teardown {
            Ok(Ok(())) => {
                self.log.success(format!("{kind} disconnected"));
            }
            Ok(Err(e)) => {
                warn!(slot = %kind, error = %format!("{e:#}"), "Teardown failed; slot forgotten");
                self.log
                    .warning(format!("{kind} disconnected (teardown reported: {e:#})"));
            }
            Err(_) => {
                warn!(slot = %kind, "Teardown timed out; slot forgotten");
                self.log.warning(format!(
                    "{kind} disconnected (teardown timed out after {}s)",
                    self.connect_timeout.as_secs()
                ));
            }
        }
        Ok(())
    }

    /// Returns true if `kind` is connected
    pub fn is_connected(&self, kind: SlotKind) -> bool {
        self.slot(kind).view().connected
    }

    /// Returns the config stored for `kind`, if connected
    pub fn config_of(&self, kind: SlotKind) -> Option<EndpointConfig> {
        self.slot(kind).view().config
    }

    /// Returns a consistent view of `kind`
    pub fn view(&self, kind: SlotKind) -> SlotView {
        self.slot(kind).view()
    }

    /// Returns the slots that are not connected, in report order
    pub fn missing(&self) -> Vec<SlotKind> {
        SlotKind::ALL
            .into_iter()
            .filter(|kind| !self.is_connected(*kind))
            .collect()
    }

    /// Lists the entries at the root of a connected endpoint
    ///
    /// The stored config, including its credential, is handed to the
    /// connector unchanged.
    pub async fn list_entries(&self, kind: SlotKind) -> Result<Vec<RemoteEntry>, OrchestrationError> {
        let slot = self.slot(kind);
        let config = match slot.view() {
            SlotView {
                connected: true,
                config: Some(config),
                ..
            } => config,
            _ => return Err(OrchestrationError::NotConnected { kind }),
        };

        let entries = slot
            .connector
            .list_entries(&config)
            .await
            .map_err(|e| OrchestrationError::Connection {
                kind,
                cause: format!("{e:#}"),
            })?;
        debug!(slot = %kind, count = entries.len(), "Listed endpoint entries");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use sharesync_core::domain::{Credential, LogLevel};

    use super::*;

    /// Connector whose outcomes are toggled by the test
    #[derive(Default)]
    struct ScriptedConnector {
        fail_connect: AtomicBool,
        fail_disconnect: AtomicBool,
        fail_validate: AtomicBool,
        hang_connect: AtomicBool,
        connects: AtomicUsize,
        disconnects: AtomicUsize,
        last_password: std::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl IEndpointConnector for ScriptedConnector {
        fn validate(&self, _config: &EndpointConfig) -> anyhow::Result<()> {
            if self.fail_validate.load(Ordering::SeqCst) {
                anyhow::bail!("server is required");
            }
            Ok(())
        }

        async fn connect(&self, _config: &EndpointConfig) -> anyhow::Result<()> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.hang_connect.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.fail_connect.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }

        async fn disconnect(&self, _config: &EndpointConfig) -> anyhow::Result<()> {
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            if self.fail_disconnect.load(Ordering::SeqCst) {
                anyhow::bail!("umount: target is busy");
            }
            Ok(())
        }

        async fn list_entries(&self, config: &EndpointConfig) -> anyhow::Result<Vec<RemoteEntry>> {
            *self.last_password.lock().unwrap() =
                config.credential().map(|c| c.password.clone());
            Ok(vec![RemoteEntry {
                name: "report.pdf".into(),
                is_directory: false,
                size: 1024,
                modified_at: None,
            }])
        }
    }

    type Fixture = (
        ConnectionRegistry,
        Arc<ScriptedConnector>,
        Arc<ScriptedConnector>,
        Arc<LogBuffer>,
    );

    fn registry() -> Fixture {
        let share = Arc::new(ScriptedConnector::default());
        let transfer = Arc::new(ScriptedConnector::default());
        let log = Arc::new(LogBuffer::new(100));
        let registry = ConnectionRegistry::new(
            share.clone(),
            transfer.clone(),
            log.clone(),
            Duration::from_secs(5),
        );
        (registry, share, transfer, log)
    }

    fn share_config() -> EndpointConfig {
        EndpointConfig::new().with("server", "10.0.0.5/share")
    }

    #[tokio::test]
    async fn test_slots_start_disconnected() {
        let (registry, ..) = registry();
        assert!(!registry.is_connected(SlotKind::Share));
        assert!(!registry.is_connected(SlotKind::Transfer));
        assert_eq!(registry.missing(), vec![SlotKind::Share, SlotKind::Transfer]);
        assert!(registry.config_of(SlotKind::Share).is_none());
    }

    #[tokio::test]
    async fn test_connect_success_stores_config_and_logs_once() {
        let (registry, share, _, log) = registry();

        registry.connect(SlotKind::Share, share_config()).await.unwrap();

        assert!(registry.is_connected(SlotKind::Share));
        assert_eq!(registry.config_of(SlotKind::Share), Some(share_config()));
        assert_eq!(registry.missing(), vec![SlotKind::Transfer]);
        assert_eq!(share.connects.load(Ordering::SeqCst), 1);

        let entries = log.tail(10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level(), LogLevel::Success);
    }

    #[tokio::test]
    async fn test_reconnect_overwrites_config() {
        let (registry, ..) = registry();
        registry.connect(SlotKind::Share, share_config()).await.unwrap();

        let updated = EndpointConfig::new().with("server", "10.0.0.6/other");
        registry.connect(SlotKind::Share, updated.clone()).await.unwrap();

        assert!(registry.is_connected(SlotKind::Share));
        assert_eq!(registry.config_of(SlotKind::Share), Some(updated));
    }

    #[tokio::test]
    async fn test_connect_failure_discards_config() {
        let (registry, share, _, log) = registry();
        registry.connect(SlotKind::Share, share_config()).await.unwrap();

        share.fail_connect.store(true, Ordering::SeqCst);
        let err = registry
            .connect(SlotKind::Share, EndpointConfig::new().with("server", "bad"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrchestrationError::Connection {
                kind: SlotKind::Share,
                cause: "connection refused".into()
            }
        );
        assert!(!registry.is_connected(SlotKind::Share));
        assert!(registry.config_of(SlotKind::Share).is_none());
        assert_eq!(log.tail(10).last().unwrap().level(), LogLevel::Error);
    }

    #[tokio::test]
    async fn test_empty_config_fails_without_calling_connector() {
        let (registry, share, _, _) = registry();
        let err = registry
            .connect(SlotKind::Share, EndpointConfig::new())
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestrationError::Connection { kind: SlotKind::Share, .. }));
        assert_eq!(share.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_failure_is_connection_error() {
        let (registry, _, transfer, _) = registry();
        transfer.fail_validate.store(true, Ordering::SeqCst);

        let err = registry
            .connect(SlotKind::Transfer, EndpointConfig::new().with("port", 21))
            .await
            .unwrap_err();

        match err {
            OrchestrationError::Connection { kind, cause } => {
                assert_eq!(kind, SlotKind::Transfer);
                assert!(cause.contains("server is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transfer.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout() {
        let (registry, share, _, _) = registry();
        share.hang_connect.store(true, Ordering::SeqCst);

        let err = registry
            .connect(SlotKind::Share, share_config())
            .await
            .unwrap_err();

        match err {
            OrchestrationError::Connection { cause, .. } => assert!(cause.contains("timed out")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!registry.is_connected(SlotKind::Share));
    }

    #[tokio::test]
    async fn test_disconnect_not_connected() {
        let (registry, share, _, log) = registry();

        let err = registry.disconnect(SlotKind::Share).await.unwrap_err();

        assert_eq!(err, OrchestrationError::NotConnected { kind: SlotKind::Share });
        assert!(!registry.is_connected(SlotKind::Share));
        assert_eq!(share.disconnects.load(Ordering::SeqCst), 0);
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_forgets_slot_even_if_teardown_fails() {
        let (registry, share, _, log) = registry();
        registry.connect(SlotKind::Share, share_config()).await.unwrap();
        share.fail_disconnect.store(true, Ordering::SeqCst);

        registry.disconnect(SlotKind::Share).await.unwrap();

        assert!(!registry.is_connected(SlotKind::Share));
        assert!(registry.config_of(SlotKind::Share).is_none());
        let last = log.tail(1).pop().unwrap();
        assert_eq!(last.level(), LogLevel::Warning);
        assert!(last.message().contains("target is busy"));
    }

    #[tokio::test]
    async fn test_list_entries_requires_connection() {
        let (registry, ..) = registry();
        let err = registry.list_entries(SlotKind::Transfer).await.unwrap_err();
        assert_eq!(err, OrchestrationError::NotConnected { kind: SlotKind::Transfer });
    }

    #[tokio::test]
    async fn test_list_entries_threads_stored_credential() {
        let (registry, _, transfer, _) = registry();
        let config = EndpointConfig::new()
            .with("server", "ftp.example.com")
            .with_credential(Credential::new("alice", "s3cret"));
        registry.connect(SlotKind::Transfer, config).await.unwrap();

        let entries = registry.list_entries(SlotKind::Transfer).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(
            transfer.last_password.lock().unwrap().as_deref(),
            Some("s3cret")
        );
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let (registry, ..) = registry();
        registry.connect(SlotKind::Share, share_config()).await.unwrap();
        registry
            .connect(
                SlotKind::Transfer,
                EndpointConfig::new().with("server", "ftp.example.com"),
            )
            .await
            .unwrap();

        registry.disconnect(SlotKind::Transfer).await.unwrap();

        assert!(registry.is_connected(SlotKind::Share));
        assert!(!registry.is_connected(SlotKind::Transfer));
    }
}
