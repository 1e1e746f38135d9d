//! Server configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use pizzamock_common::fixtures::AUTH_TOKEN;
use pizzamock_common::{Error, FixtureKind, Result};

/// Mock server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Listen address, e.g. 127.0.0.1:3000
    pub listen: String,

    /// Seed data the mock starts from
    pub fixture: FixtureKind,

    /// Token returned by login, register and profile update
    pub auth_token: String,

    /// Base URL that unmocked requests are forwarded to. `None` answers 404.
    pub upstream: Option<String>,

    /// Answer CORS preflights so a dev server on another port can call in
    pub cors: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:3000".to_string(),
            fixture: FixtureKind::Storefront,
            auth_token: AUTH_TOKEN.to_string(),
            upstream: None,
            cors: true,
        }
    }
}

impl MockConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override fields from `PIZZAMOCK_*` environment variables
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup. Blank values are ignored, except
    /// for the upstream where blank clears it.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        if let Some(listen) = get("PIZZAMOCK_LISTEN").filter(|v| !v.is_empty()) {
            self.listen = listen;
        }
        if let Some(fixture) = get("PIZZAMOCK_FIXTURE").filter(|v| !v.is_empty()) {
            self.fixture = fixture.parse()?;
        }
        if let Some(token) = get("PIZZAMOCK_AUTH_TOKEN").filter(|v| !v.is_empty()) {
            self.auth_token = token;
        }
        if let Some(upstream) = get("PIZZAMOCK_UPSTREAM") {
            self.upstream = if upstream.is_empty() { None } else { Some(upstream) };
        }
        Ok(self)
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("listen address {:?}: {}", self.listen, e)))
    }

    /// Upstream base URL without a trailing slash
    pub fn upstream_base(&self) -> Option<&str> {
        self.upstream
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = MockConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, MockConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pizzamock.toml");
        let cfg = MockConfig {
            listen: "0.0.0.0:4000".to_string(),
            fixture: FixtureKind::Profiles,
            upstream: Some("http://localhost:3001".to_string()),
            ..Default::default()
        };
        cfg.save(&path).unwrap();
        assert_eq!(MockConfig::load(&path).unwrap(), cfg);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pizzamock.toml");
        std::fs::write(&path, "fixture = \"profiles\"\n").unwrap();
        let cfg = MockConfig::load(&path).unwrap();
        assert_eq!(cfg.fixture, FixtureKind::Profiles);
        assert_eq!(cfg.listen, "127.0.0.1:3000");
        assert!(cfg.cors);
    }

    #[test]
    fn test_env_overrides() {
        let cfg = MockConfig::default()
            .apply_overrides(lookup(&[
                ("PIZZAMOCK_LISTEN", "127.0.0.1:9999"),
                ("PIZZAMOCK_FIXTURE", "profiles"),
                ("PIZZAMOCK_UPSTREAM", "http://localhost:3001/"),
            ]))
            .unwrap();
        assert_eq!(cfg.listen_addr().unwrap().port(), 9999);
        assert_eq!(cfg.fixture, FixtureKind::Profiles);
        assert_eq!(cfg.upstream_base(), Some("http://localhost:3001"));
        assert_eq!(cfg.auth_token, AUTH_TOKEN);
    }

    #[test]
    fn test_blank_upstream_clears() {
        let cfg = MockConfig {
            upstream: Some("http://localhost:3001".to_string()),
            ..Default::default()
        }
        .apply_overrides(lookup(&[("PIZZAMOCK_UPSTREAM", " ")]))
        .unwrap();
        assert_eq!(cfg.upstream, None);
    }

    #[test]
    fn test_bad_fixture_is_rejected() {
        let err = MockConfig::default()
            .apply_overrides(lookup(&[("PIZZAMOCK_FIXTURE", "checkout")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFixture(_)));
    }

    #[test]
    fn test_bad_listen_addr() {
        let cfg = MockConfig {
            listen: "nowhere".to_string(),
            ..Default::default()
        };
        assert!(matches!(cfg.listen_addr(), Err(Error::InvalidConfig(_))));
    }
}
