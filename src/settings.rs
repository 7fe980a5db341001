//! Player preferences and the leaderboard endpoint
//!
//! Persisted in LocalStorage on the web; natively everything stays default.

use serde::{Deserialize, Serialize};

/// Where the leaderboard backend lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Project base URL, e.g. `https://xyz.example.co`
    pub url: String,
    /// Public (anonymous) API key
    pub anon_key: String,
}

impl GatewayConfig {
    /// Both fields filled in
    pub fn is_usable(&self) -> bool {
        !self.url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Leaderboard backend; without one no high score is possible
    pub leaderboard: Option<GatewayConfig>,

    /// Prefill for the submission form
    pub last_name: String,
    pub last_email: String,
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "deflector_settings";

    /// Backend config, if present and usable
    pub fn gateway(&self) -> Option<&GatewayConfig> {
        self.leaderboard.as_ref().filter(|c| c.is_usable())
    }

    /// Remember what the player typed last time
    pub fn remember_entry(&mut self, name: &str, email: &str) {
        self.last_name = name.trim().to_string();
        self.last_email = email.trim().to_string();
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"last_name":"ace"}"#).unwrap();
        assert_eq!(settings.last_name, "ace");
        assert!(settings.leaderboard.is_none());
        assert!(settings.gateway().is_none());
    }

    #[test]
    fn test_blank_gateway_is_unusable() {
        let mut settings = Settings::default();
        settings.leaderboard = Some(GatewayConfig {
            url: "https://example.co".into(),
            anon_key: "  ".into(),
        });
        assert!(settings.gateway().is_none());

        settings.leaderboard = Some(GatewayConfig {
            url: "https://example.co".into(),
            anon_key: "public".into(),
        });
        assert!(settings.gateway().is_some());
    }

    #[test]
    fn test_storage_key_is_namespaced() {
        assert_eq!(Settings::STORAGE_KEY, "deflector_settings");
    }

    #[test]
    fn test_remember_entry_trims() {
        let mut settings = Settings::default();
        settings.remember_entry("  ace ", " ace@example.com");
        assert_eq!(settings.last_name, "ace");
        assert_eq!(settings.last_email, "ace@example.com");
    }
}
