//! Theme and view-mode preferences, stored as plain strings.

use std::str::FromStr;
use std::sync::Arc;

use crate::cache::{LocalCache, keys};
use crate::domain::{Theme, ViewMode};
use crate::error::DomainError;
use crate::ports::{AppEvent, EventBus};

pub struct PreferencesService {
    cache: LocalCache,
    bus: Arc<dyn EventBus>,
}

impl PreferencesService {
    pub fn new(cache: LocalCache, bus: Arc<dyn EventBus>) -> Self {
        Self { cache, bus }
    }

    /// Stored theme, `light` when unset or unrecognised.
    pub async fn theme(&self) -> Theme {
        self.read(keys::THEME).await
    }

    pub async fn set_theme(&self, name: &str) -> Result<Theme, DomainError> {
        let theme: Theme = name.parse()?;
        self.cache.set_string(keys::THEME, theme.as_str()).await?;
        tracing::debug!(theme = %theme, "Theme changed");
        self.bus.publish(AppEvent::ThemeChanged(theme.clone()));
        Ok(theme)
    }

    /// Stored view mode, `grid` when unset or unrecognised.
    pub async fn view_mode(&self) -> ViewMode {
        self.read(keys::VIEW_MODE).await
    }

    pub async fn set_view_mode(&self, mode: ViewMode) -> Result<(), DomainError> {
        self.cache.set_string(keys::VIEW_MODE, mode.as_str()).await?;
        tracing::debug!(view_mode = %mode, "View mode changed");
        self.bus.publish(AppEvent::ViewModeChanged(mode));
        Ok(())
    }

    pub async fn toggle_view_mode(&self) -> Result<ViewMode, DomainError> {
        let mode = self.view_mode().await.toggled();
        self.set_view_mode(mode).await?;
        Ok(mode)
    }

    async fn read<T: FromStr + Default>(&self, key: &str) -> T {
        match self.cache.get_string(key).await {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(key = %key, value = %raw, "Ignoring unrecognised preference");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read preference");
                T::default()
            }
        }
    }
}
