//! Boundary with the presentation layer that draws the provider list.

use std::sync::Arc;

use crate::providers::ProviderMappingEntry;

pub type SurfaceCallback = Arc<dyn Fn() + Send + Sync>;

/// The only state the orchestrator pushes into a rendered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityUpdate {
    pub show: bool,
}

/// Everything a surface needs to draw the selection list and report dismissal.
#[derive(Clone)]
pub struct SurfaceProps {
    pub providers: Vec<ProviderMappingEntry>,
    /// Invoked when the user dismisses the surface.
    pub on_close: SurfaceCallback,
    /// Restores the initial hidden state without emitting a close event.
    pub reset_state: SurfaceCallback,
    pub lightbox_opacity: Option<f32>,
}

pub trait SelectionSurface: Send + Sync {
    /// Creates the container identified by `container_id` and renders into it.
    fn mount(&self, container_id: &str, props: SurfaceProps) -> anyhow::Result<()>;

    fn update(&self, update: VisibilityUpdate);

    /// Overlay surfaces block page scrolling while visible.
    fn set_scroll_locked(&self, _locked: bool) {}

    fn unmount(&self, _container_id: &str) {}
}

/// Surface for hosts that draw nothing themselves, e.g. inline rendering only.
pub struct HeadlessSurface;

impl SelectionSurface for HeadlessSurface {
    fn mount(&self, _container_id: &str, _props: SurfaceProps) -> anyhow::Result<()> {
        Ok(())
    }

    fn update(&self, update: VisibilityUpdate) {
        tracing::trace!(show = update.show, "headless surface visibility update");
    }
}

/// Fragment handed to hosts that place the selector in their own layout.
#[derive(Clone)]
pub struct InlineSelector {
    pub providers: Vec<ProviderMappingEntry>,
    pub on_close: SurfaceCallback,
    pub reset_state: SurfaceCallback,
}

impl InlineSelector {
    pub fn entry(&self, id: &str) -> Option<&ProviderMappingEntry> {
        self.providers.iter().find(|entry| entry.id == id)
    }

    pub fn close(&self) {
        (self.on_close)();
    }
}
