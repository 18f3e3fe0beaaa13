use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::anyhow;
use connectors::{connector_fn, ConnectorOptions, ProviderConnector, StaticSession};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::surface::{SelectionSurface, SurfaceProps, VisibilityUpdate};

/// Connector that records its calls and either succeeds or fails.
pub struct ScriptedConnector {
    pub calls: Arc<AtomicUsize>,
    pub last_options: Arc<Mutex<Option<ConnectorOptions>>>,
    pub connector: Arc<dyn ProviderConnector>,
}

impl ScriptedConnector {
    pub fn succeeding(provider_id: &str, account: &str) -> Self {
        Self::build(provider_id, Ok(account.to_string()), None)
    }

    pub fn failing(provider_id: &str, message: &str) -> Self {
        Self::build(provider_id, Err(message.to_string()), None)
    }

    /// Succeeds only after `gate` is notified.
    pub fn gated(provider_id: &str, account: &str, gate: Arc<Notify>) -> Self {
        Self::build(provider_id, Ok(account.to_string()), Some(gate))
    }

    fn build(
        provider_id: &str,
        outcome: Result<String, String>,
        gate: Option<Arc<Notify>>,
    ) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let last_options = Arc::new(Mutex::new(None));
        let provider_id = provider_id.to_string();

        let counter = Arc::clone(&calls);
        let recorded = Arc::clone(&last_options);
        let connector = connector_fn(move |options: ConnectorOptions| {
            counter.fetch_add(1, Ordering::SeqCst);
            *recorded.lock() = Some(options.clone());
            let provider_id = provider_id.clone();
            let outcome = outcome.clone();
            let gate = gate.clone();
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                match outcome {
                    Ok(account) => {
                        Ok(StaticSession::new(provider_id, vec![account], options.network).handle())
                    }
                    Err(message) => Err(anyhow!(message)),
                }
            }
        });

        Self {
            calls,
            last_options,
            connector,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingSurface {
    pub mounted: Mutex<Vec<String>>,
    pub props: Mutex<Option<SurfaceProps>>,
    pub updates: Mutex<Vec<bool>>,
    pub scroll_locks: Mutex<Vec<bool>>,
    pub unmounted: Mutex<Vec<String>>,
    pub fail_mount: bool,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_mount() -> Arc<Self> {
        Arc::new(Self {
            fail_mount: true,
            ..Self::default()
        })
    }

    pub fn updates(&self) -> Vec<bool> {
        self.updates.lock().clone()
    }

    pub fn ever_shown(&self) -> bool {
        self.updates.lock().iter().any(|show| *show)
    }

    pub fn close(&self) {
        let on_close = self
            .props
            .lock()
            .as_ref()
            .map(|props| Arc::clone(&props.on_close))
            .expect("surface mounted");
        on_close();
    }
}

impl SelectionSurface for RecordingSurface {
    fn mount(&self, container_id: &str, props: SurfaceProps) -> anyhow::Result<()> {
        if self.fail_mount {
            return Err(anyhow!("no document body"));
        }
        self.mounted.lock().push(container_id.to_string());
        *self.props.lock() = Some(props);
        Ok(())
    }

    fn update(&self, update: VisibilityUpdate) {
        self.updates.lock().push(update.show);
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.scroll_locks.lock().push(locked);
    }

    fn unmount(&self, container_id: &str) {
        self.unmounted.lock().push(container_id.to_string());
    }
}
