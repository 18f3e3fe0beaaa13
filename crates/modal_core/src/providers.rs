use std::{collections::BTreeMap, fmt, sync::Arc};

use anyhow::Result;
use connectors::{
    builtin_providers, catalog::fallback_injected, ConnectorOptions, InjectedEnvironment,
    MissingConnector, ProviderConnector,
};
use futures::{future::BoxFuture, FutureExt};
use parking_lot::RwLock;
use shared::{
    domain::{ProviderInfo, ProviderKind, CUSTOM_PROVIDER_PREFIX},
    events::{CACHED_PROVIDER_KEY, CONNECT_EVENT, ERROR_EVENT},
};
use storage::KeyValueStore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    error::ConnectFailure,
    events::{EventCallback, EventController, EventPayload, ListenerId},
    options::{ModalOptions, ProviderOptions},
};

/// A selectable provider together with the adapter that connects to it.
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub info: ProviderInfo,
    pub connector: Arc<dyn ProviderConnector>,
    /// False when no adapter was registered; such providers are never eligible.
    pub installed: bool,
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("info", &self.info)
            .field("installed", &self.installed)
            .finish()
    }
}

type ClickHandler = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Closed-over form of a descriptor handed to the presentation layer. Clicking
/// runs the whole connect-and-report cycle.
#[derive(Clone)]
pub struct ProviderMappingEntry {
    pub id: String,
    pub name: String,
    pub logo: String,
    pub description: String,
    pub kind: ProviderKind,
    on_click: ClickHandler,
}

impl ProviderMappingEntry {
    pub fn on_click(&self) -> BoxFuture<'static, ()> {
        (self.on_click)()
    }

    pub async fn click(&self) {
        self.on_click().await;
    }
}

impl fmt::Debug for ProviderMappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderMappingEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

pub struct ProviderController {
    injected: Option<ProviderDescriptor>,
    builtins: Vec<ProviderDescriptor>,
    custom: Vec<ProviderDescriptor>,
    provider_options: BTreeMap<String, ProviderOptions>,
    network: Option<String>,
    should_cache_provider: bool,
    disable_injected_provider: bool,
    is_mobile: bool,
    cached_provider: RwLock<Option<String>>,
    store: Arc<dyn KeyValueStore>,
    events: Arc<EventController<EventPayload>>,
}

impl ProviderController {
    pub async fn new(
        options: &ModalOptions,
        environment: InjectedEnvironment,
        mut connectors: BTreeMap<String, Arc<dyn ProviderConnector>>,
        store: Arc<dyn KeyValueStore>,
    ) -> Arc<Self> {
        let mut take_descriptor = |info: ProviderInfo| {
            let info = match options
                .provider_options
                .get(&info.id)
                .and_then(|opts| opts.display.as_ref())
            {
                Some(display) => info.with_display(display),
                None => info,
            };
            match connectors.remove(&info.id) {
                Some(connector) => ProviderDescriptor {
                    info,
                    connector,
                    installed: true,
                },
                None => ProviderDescriptor {
                    connector: Arc::new(MissingConnector::new(info.id.clone())),
                    info,
                    installed: false,
                },
            }
        };

        let injected = environment.detect().map(&mut take_descriptor);
        let builtins: Vec<_> = builtin_providers()
            .into_iter()
            .map(&mut take_descriptor)
            .collect();

        let mut custom = Vec::new();
        for (id, provider_options) in &options.provider_options {
            if !id.starts_with(CUSTOM_PROVIDER_PREFIX) {
                continue;
            }
            let name = provider_options
                .display
                .as_ref()
                .and_then(|display| display.name.clone());
            match (name, connectors.remove(id)) {
                (Some(_), Some(connector)) => {
                    let mut info = fallback_injected();
                    info.id = id.clone();
                    info.check = None;
                    if let Some(display) = &provider_options.display {
                        info = info.with_display(display);
                    }
                    custom.push(ProviderDescriptor {
                        info,
                        connector,
                        installed: true,
                    });
                }
                (None, _) => {
                    warn!(provider_id = %id, "custom provider has no display name, skipping")
                }
                (_, None) => warn!(provider_id = %id, "custom provider has no connector, skipping"),
            }
        }
        for id in connectors.keys() {
            warn!(provider_id = %id, "connector registered for unknown provider, ignoring");
        }

        let cached_provider = match store.get(CACHED_PROVIDER_KEY).await {
            Ok(value) => value.filter(|id| !id.is_empty()),
            Err(err) => {
                warn!(
                    error = %format!("{err:#}"),
                    "failed to read cached provider, starting without one"
                );
                None
            }
        };

        let controller = Arc::new(Self {
            injected,
            builtins,
            custom,
            provider_options: options.provider_options.clone(),
            network: options.network_hint(),
            should_cache_provider: options.cache_provider,
            disable_injected_provider: options.disable_injected_provider,
            is_mobile: environment.is_mobile,
            cached_provider: RwLock::new(cached_provider),
            store,
            events: EventController::new(),
        });
        info!(
            eligible = controller.eligible_descriptors().len(),
            cache_provider = controller.should_cache_provider,
            "provider catalog ready"
        );
        controller
    }

    pub fn on(
        &self,
        event: impl Into<String>,
        callback: EventCallback<EventPayload>,
    ) -> ListenerId {
        self.events.on(event, callback)
    }

    pub fn off(&self, event: &str, callback: Option<&EventCallback<EventPayload>>) {
        self.events.off(event, callback);
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.events.remove(id)
    }

    fn should_display_injected(&self) -> bool {
        !self.disable_injected_provider
            && self
                .injected
                .as_ref()
                .is_some_and(|descriptor| descriptor.installed)
    }

    fn should_display_builtin(&self, descriptor: &ProviderDescriptor) -> bool {
        if !descriptor.installed {
            return false;
        }
        self.provider_options
            .get(&descriptor.info.id)
            .is_some_and(|opts| opts.satisfies(&descriptor.info.package.required))
    }

    /// Eligible providers in display order: injected, built-ins, then custom.
    /// On mobile a displayed injected provider is the only entry.
    fn eligible_descriptors(&self) -> Vec<&ProviderDescriptor> {
        let mut eligible = Vec::new();
        if self.should_display_injected() {
            if let Some(injected) = &self.injected {
                eligible.push(injected);
                if self.is_mobile {
                    return eligible;
                }
            }
        }
        eligible.extend(
            self.builtins
                .iter()
                .filter(|descriptor| self.should_display_builtin(descriptor)),
        );
        eligible.extend(self.custom.iter());
        eligible
    }

    /// Looks `id` up among the eligible providers.
    pub fn get_provider(&self, id: &str) -> Option<ProviderDescriptor> {
        self.eligible_descriptors()
            .into_iter()
            .find(|descriptor| descriptor.info.id == id)
            .cloned()
    }

    pub fn get_providers(self: &Arc<Self>) -> Vec<ProviderMappingEntry> {
        self.eligible_descriptors()
            .into_iter()
            .map(|descriptor| self.mapping_entry(descriptor))
            .collect()
    }

    pub fn get_provider_mapping_entry(self: &Arc<Self>, id: &str) -> Option<ProviderMappingEntry> {
        self.get_provider(id)
            .map(|descriptor| self.mapping_entry(&descriptor))
    }

    fn mapping_entry(self: &Arc<Self>, descriptor: &ProviderDescriptor) -> ProviderMappingEntry {
        let controller = Arc::clone(self);
        let id = descriptor.info.id.clone();
        let connector = Arc::clone(&descriptor.connector);
        let on_click: ClickHandler = Arc::new(move || {
            let controller = Arc::clone(&controller);
            let id = id.clone();
            let connector = Arc::clone(&connector);
            async move { controller.connect_to(&id, connector).await }.boxed()
        });
        ProviderMappingEntry {
            id: descriptor.info.id.clone(),
            name: descriptor.info.name.clone(),
            logo: descriptor.info.logo.clone(),
            description: descriptor.info.description(),
            kind: descriptor.info.kind,
            on_click,
        }
    }

    fn connector_options(&self, id: &str) -> ConnectorOptions {
        let options = self
            .provider_options
            .get(id)
            .map(|opts| opts.options.clone())
            .unwrap_or_default();
        ConnectorOptions::new(self.network.clone(), options)
    }

    /// Runs one connection attempt. Exactly one of the connect or error events
    /// fires, after the connector settles.
    pub async fn connect_to(&self, id: &str, connector: Arc<dyn ProviderConnector>) {
        let attempt = Uuid::new_v4();
        info!(provider_id = %id, %attempt, "connecting to provider");

        match connector.connect(self.connector_options(id)).await {
            Ok(handle) => {
                let changed = self.cached_provider.read().as_deref() != Some(id);
                if self.should_cache_provider && changed {
                    if let Err(err) = self.set_cached_provider(id).await {
                        warn!(
                            provider_id = %id,
                            %attempt,
                            error = %format!("{err:#}"),
                            "failed to cache provider"
                        );
                    }
                }
                info!(provider_id = %id, %attempt, "provider connected");
                self.events
                    .trigger(CONNECT_EVENT, &EventPayload::Connected(handle));
            }
            Err(err) => {
                let failure = ConnectFailure::connector(id, &err);
                warn!(provider_id = %id, %attempt, error = %failure, "provider connection failed");
                self.events
                    .trigger(ERROR_EVENT, &EventPayload::Failed(failure));
            }
        }
    }

    /// Connects to the cached provider. A cached id that no longer resolves to
    /// an eligible provider is reported as an error event.
    pub async fn connect_to_cached_provider(&self) {
        let Some(id) = self.cached_provider() else {
            debug!("no cached provider to connect to");
            return;
        };
        match self.get_provider(&id) {
            Some(descriptor) => self.connect_to(&descriptor.info.id, descriptor.connector).await,
            None => {
                let failure = ConnectFailure::StaleCache { provider_id: id };
                warn!(error = %failure, "cached provider does not resolve");
                self.events
                    .trigger(ERROR_EVENT, &EventPayload::Failed(failure));
            }
        }
    }

    /// Always `None` while caching is disabled.
    pub fn cached_provider(&self) -> Option<String> {
        if !self.should_cache_provider {
            return None;
        }
        self.cached_provider.read().clone()
    }

    /// Persists `id` without checking it against the catalog.
    pub async fn set_cached_provider(&self, id: &str) -> Result<()> {
        self.store.set(CACHED_PROVIDER_KEY, id).await?;
        *self.cached_provider.write() = Some(id.to_string());
        debug!(provider_id = %id, "cached provider updated");
        Ok(())
    }

    pub async fn clear_cached_provider(&self) -> Result<()> {
        self.store.remove(CACHED_PROVIDER_KEY).await?;
        *self.cached_provider.write() = None;
        debug!("cached provider cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/providers_tests.rs"]
mod tests;
