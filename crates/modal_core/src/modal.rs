use std::{
    collections::BTreeMap,
    sync::{Arc, Weak},
};

use connectors::{InjectedEnvironment, ProviderConnector, ProviderHandle};
use parking_lot::Mutex;
use shared::{
    domain::RenderStyle,
    events::{CLOSE_EVENT, CONNECT_EVENT, ERROR_EVENT, MODAL_MOUNT_ID},
};
use storage::{KeyValueStore, MemoryStore};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::{
    error::ModalError,
    events::{EventCallback, EventController, EventPayload, ListenerId, Subscription},
    options::ModalOptions,
    providers::{ProviderController, ProviderMappingEntry},
    surface::{
        HeadlessSurface, InlineSelector, SelectionSurface, SurfaceCallback, SurfaceProps,
        VisibilityUpdate,
    },
};

/// Collaborators a [`WalletModal`] is built from.
pub struct ModalDependencies {
    pub store: Arc<dyn KeyValueStore>,
    pub surface: Arc<dyn SelectionSurface>,
    pub environment: InjectedEnvironment,
    pub connectors: BTreeMap<String, Arc<dyn ProviderConnector>>,
}

impl Default for ModalDependencies {
    fn default() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            surface: Arc::new(HeadlessSurface),
            environment: InjectedEnvironment::none(),
            connectors: BTreeMap::new(),
        }
    }
}

impl ModalDependencies {
    pub fn new(store: Arc<dyn KeyValueStore>, surface: Arc<dyn SelectionSurface>) -> Self {
        Self {
            store,
            surface,
            ..Self::default()
        }
    }

    pub fn with_environment(mut self, environment: InjectedEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_connector(
        mut self,
        id: impl Into<String>,
        connector: Arc<dyn ProviderConnector>,
    ) -> Self {
        self.connectors.insert(id.into(), connector);
        self
    }
}

#[derive(Debug, Default)]
struct ModalState {
    show: bool,
    mounted: bool,
    disposed: bool,
}

/// Which way `toggle_modal` proceeds while the surface is hidden. Checked in
/// declaration order.
enum SelectionPath {
    CachedProvider(String),
    SingleProvider(ProviderMappingEntry),
    Surface,
}

/// Fired on `outcomes` when the surface hides without a connect or error.
const DISMISSED: &str = "dismissed";

pub struct WalletModal {
    state: Mutex<ModalState>,
    events: Arc<EventController<EventPayload>>,
    /// Settles pending `connect`/`connect_to` calls. Host `off` calls cannot
    /// reach these registrations.
    outcomes: Arc<EventController<EventPayload>>,
    provider_controller: Arc<ProviderController>,
    providers: Vec<ProviderMappingEntry>,
    render_style: RenderStyle,
    lightbox_opacity: f32,
    surface: Arc<dyn SelectionSurface>,
    internal_listeners: Mutex<Vec<ListenerId>>,
}

impl WalletModal {
    pub async fn new(
        options: ModalOptions,
        dependencies: ModalDependencies,
    ) -> Result<Arc<Self>, ModalError> {
        let render_style = options.validate()?;
        let ModalDependencies {
            store,
            surface,
            environment,
            connectors,
        } = dependencies;

        let provider_controller =
            ProviderController::new(&options, environment, connectors, store).await;
        let providers = provider_controller.get_providers();

        let modal = Arc::new(Self {
            state: Mutex::new(ModalState::default()),
            events: EventController::new(),
            outcomes: EventController::new(),
            provider_controller,
            providers,
            render_style,
            lightbox_opacity: options.lightbox_opacity,
            surface,
            internal_listeners: Mutex::new(Vec::new()),
        });
        modal.register_internal_listeners();

        if render_style == RenderStyle::Modal {
            modal.render_modal()?;
        }
        info!(
            render_style = %render_style,
            providers = modal.providers.len(),
            "wallet modal initialized"
        );
        Ok(modal)
    }

    fn register_internal_listeners(self: &Arc<Self>) {
        let mut listeners = self.internal_listeners.lock();
        for event in [CONNECT_EVENT, ERROR_EVENT] {
            let modal = Arc::downgrade(self);
            let forward: EventCallback<EventPayload> = Arc::new(move |payload: &EventPayload| {
                if let Some(modal) = modal.upgrade() {
                    modal.hide_if_visible();
                    modal.events.trigger(event, payload);
                    modal.outcomes.trigger(event, payload);
                }
            });
            listeners.push(self.provider_controller.on(event, forward));
        }
    }

    pub fn render_style(&self) -> RenderStyle {
        self.render_style
    }

    pub fn providers(&self) -> &[ProviderMappingEntry] {
        &self.providers
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().show
    }

    pub fn cached_provider(&self) -> Option<String> {
        self.provider_controller.cached_provider()
    }

    pub async fn set_cached_provider(&self, id: &str) -> Result<(), ModalError> {
        self.provider_controller
            .set_cached_provider(id)
            .await
            .map_err(|err| ModalError::Storage(format!("{err:#}")))
    }

    pub async fn clear_cached_provider(&self) -> Result<(), ModalError> {
        self.provider_controller
            .clear_cached_provider()
            .await
            .map_err(|err| ModalError::Storage(format!("{err:#}")))
    }

    /// Registers `callback` for `event`; the returned subscription removes
    /// exactly this registration.
    pub fn on(
        &self,
        event: &str,
        callback: EventCallback<EventPayload>,
    ) -> Subscription<EventPayload> {
        let id = self.events.on(event, callback);
        Subscription::new(&self.events, id)
    }

    pub fn off(&self, event: &str, callback: Option<&EventCallback<EventPayload>>) {
        self.events.off(event, callback);
    }

    fn ensure_live(&self) -> Result<(), ModalError> {
        if self.state.lock().disposed {
            return Err(ModalError::Disposed);
        }
        Ok(())
    }

    fn selection_path(&self) -> SelectionPath {
        if self.is_visible() {
            return SelectionPath::Surface;
        }
        if let Some(id) = self.cached_provider() {
            return SelectionPath::CachedProvider(id);
        }
        if let [only] = self.providers.as_slice() {
            if !only.name.is_empty() {
                return SelectionPath::SingleProvider(only.clone());
            }
        }
        SelectionPath::Surface
    }

    /// Hidden: connects to the cached provider, else the only provider, else
    /// shows the surface. Visible: hides the surface.
    pub async fn toggle_modal(&self) -> Result<(), ModalError> {
        self.ensure_live()?;
        match self.selection_path() {
            SelectionPath::CachedProvider(id) => {
                debug!(provider_id = %id, "connecting to cached provider without surface");
                self.provider_controller.connect_to_cached_provider().await;
            }
            SelectionPath::SingleProvider(entry) => {
                debug!(provider_id = %entry.id, "connecting to only provider without surface");
                entry.click().await;
            }
            SelectionPath::Surface => self.toggle_visibility(),
        }
        Ok(())
    }

    /// Resolves with the handle of the next successful connection. Rejects on
    /// the next error event or when the surface hides without a selection.
    /// An already visible surface stays open.
    pub async fn connect(&self) -> Result<ProviderHandle, ModalError> {
        self.ensure_live()?;
        let outcome = PendingOutcome::register(&self.outcomes, true);
        if self.is_visible() {
            debug!("surface already visible, waiting for selection");
        } else {
            self.toggle_modal().await?;
        }
        outcome.wait().await
    }

    /// Connects to `id` directly, skipping both fast paths and the surface.
    pub async fn connect_to(&self, id: &str) -> Result<ProviderHandle, ModalError> {
        self.ensure_live()?;
        let descriptor = self
            .provider_controller
            .get_provider(id)
            .ok_or_else(|| ModalError::ProviderNotFound(id.to_string()))?;
        let outcome = PendingOutcome::register(&self.outcomes, false);
        self.provider_controller
            .connect_to(&descriptor.info.id, descriptor.connector)
            .await;
        outcome.wait().await
    }

    pub fn render_modal(self: &Arc<Self>) -> Result<(), ModalError> {
        self.ensure_live()?;
        if self.render_style != RenderStyle::Modal {
            return Err(ModalError::RenderStyleMismatch {
                configured: self.render_style,
                requested: RenderStyle::Modal,
            });
        }
        let props = SurfaceProps {
            providers: self.providers.clone(),
            on_close: self.close_callback(),
            reset_state: self.reset_callback(),
            lightbox_opacity: Some(self.lightbox_opacity),
        };
        self.surface
            .mount(MODAL_MOUNT_ID, props)
            .map_err(|err| ModalError::Render(format!("{err:#}")))?;
        self.state.lock().mounted = true;
        debug!(container = MODAL_MOUNT_ID, "modal surface mounted");
        Ok(())
    }

    pub fn render_inline(self: &Arc<Self>) -> Result<InlineSelector, ModalError> {
        self.ensure_live()?;
        if self.render_style != RenderStyle::Inline {
            return Err(ModalError::RenderStyleMismatch {
                configured: self.render_style,
                requested: RenderStyle::Inline,
            });
        }
        Ok(InlineSelector {
            providers: self.providers.clone(),
            on_close: self.close_callback(),
            reset_state: self.reset_callback(),
        })
    }

    fn close_callback(self: &Arc<Self>) -> SurfaceCallback {
        let modal: Weak<Self> = Arc::downgrade(self);
        Arc::new(move || {
            if let Some(modal) = modal.upgrade() {
                modal.on_close();
            }
        })
    }

    fn reset_callback(self: &Arc<Self>) -> SurfaceCallback {
        let modal: Weak<Self> = Arc::downgrade(self);
        Arc::new(move || {
            if let Some(modal) = modal.upgrade() {
                modal.reset_state();
            }
        })
    }

    fn on_close(&self) {
        self.hide_if_visible();
        self.events.trigger(CLOSE_EVENT, &EventPayload::Closed);
        self.dismiss_pending();
    }

    fn reset_state(&self) {
        let was_visible = std::mem::replace(&mut self.state.lock().show, false);
        if was_visible && self.render_style == RenderStyle::Modal {
            self.surface.set_scroll_locked(false);
        }
        self.surface.update(VisibilityUpdate { show: false });
        if was_visible {
            self.dismiss_pending();
        }
    }

    fn toggle_visibility(&self) {
        let show = {
            let mut state = self.state.lock();
            state.show = !state.show;
            state.show
        };
        self.publish_visibility(show);
        if !show {
            self.dismiss_pending();
        }
    }

    /// Rejects `connect` calls waiting on a surface that is no longer shown.
    fn dismiss_pending(&self) {
        self.outcomes.trigger(DISMISSED, &EventPayload::Closed);
    }

    fn hide_if_visible(&self) {
        let was_visible = std::mem::replace(&mut self.state.lock().show, false);
        if was_visible {
            self.publish_visibility(false);
        }
    }

    fn publish_visibility(&self, show: bool) {
        if self.render_style == RenderStyle::Modal {
            self.surface.set_scroll_locked(show);
        }
        self.surface.update(VisibilityUpdate { show });
        info!(show, "selection surface visibility changed");
    }

    /// Unregisters internal listeners and every host listener, hides and
    /// unmounts the surface. Pending `connect` calls reject with `Disposed`.
    pub fn dispose(&self) {
        let mounted = {
            let mut state = self.state.lock();
            if std::mem::replace(&mut state.disposed, true) {
                return;
            }
            std::mem::replace(&mut state.mounted, false)
        };
        for id in self.internal_listeners.lock().drain(..) {
            self.provider_controller.remove_listener(id);
        }
        self.hide_if_visible();
        if mounted {
            self.surface.unmount(MODAL_MOUNT_ID);
        }
        self.events.clear();
        self.outcomes.clear();
        info!("wallet modal disposed");
    }
}

type OutcomeSender = Arc<Mutex<Option<oneshot::Sender<Result<ProviderHandle, ModalError>>>>>;

/// One-shot listeners that settle a single `connect`/`connect_to` call. The
/// listeners are removed when this is dropped.
struct PendingOutcome {
    events: Arc<EventController<EventPayload>>,
    listeners: Vec<ListenerId>,
    receiver: oneshot::Receiver<Result<ProviderHandle, ModalError>>,
}

impl PendingOutcome {
    fn register(events: &Arc<EventController<EventPayload>>, settle_on_dismiss: bool) -> Self {
        let (sender, receiver) = oneshot::channel();
        let sender: OutcomeSender = Arc::new(Mutex::new(Some(sender)));

        let mut listeners = Vec::with_capacity(3);
        let on_connect = Arc::clone(&sender);
        listeners.push(events.on(
            CONNECT_EVENT,
            Arc::new(move |payload: &EventPayload| {
                if let Some(handle) = payload.provider() {
                    settle(&on_connect, Ok(Arc::clone(handle)));
                }
            }),
        ));
        let on_error = Arc::clone(&sender);
        listeners.push(events.on(
            ERROR_EVENT,
            Arc::new(move |payload: &EventPayload| {
                if let Some(failure) = payload.failure() {
                    settle(&on_error, Err(ModalError::Connect(failure.clone())));
                }
            }),
        ));
        if settle_on_dismiss {
            let on_dismiss = Arc::clone(&sender);
            listeners.push(events.on(
                DISMISSED,
                Arc::new(move |_: &EventPayload| settle(&on_dismiss, Err(ModalError::Dismissed))),
            ));
        }

        Self {
            events: Arc::clone(events),
            listeners,
            receiver,
        }
    }

    async fn wait(mut self) -> Result<ProviderHandle, ModalError> {
        (&mut self.receiver)
            .await
            .unwrap_or(Err(ModalError::Disposed))
    }
}

fn settle(sender: &OutcomeSender, result: Result<ProviderHandle, ModalError>) {
    if let Some(sender) = sender.lock().take() {
        let _ = sender.send(result);
    }
}

impl Drop for PendingOutcome {
    fn drop(&mut self) {
        for id in self.listeners.drain(..) {
            self.events.remove(id);
        }
    }
}

#[cfg(test)]
#[path = "tests/modal_tests.rs"]
mod tests;
