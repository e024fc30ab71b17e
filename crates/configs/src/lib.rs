use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3000, worker_threads: Some(4) }
    }
}

/// Where the item collection lives on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_items_path")]
    pub items_path: String,
    /// Copied into `items_path` on first start when the data file does not exist yet.
    #[serde(default)]
    pub seed_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { items_path: default_items_path(), seed_path: None }
    }
}

fn default_items_path() -> String { "data/items.json".to_string() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file when present, otherwise defaults overlaid with env vars.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    /// Only a missing file falls back to env; unreadable or invalid files are errors.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => parse(&content).map_err(|e| anyhow!("invalid config {path}: {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::from_env(),
            Err(e) => return Err(anyhow!("cannot read config {path}: {e}")),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        cfg.server.worker_threads = std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .or(cfg.server.worker_threads);
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    /// `ITEMS_PATH` / `ITEMS_SEED_PATH` take precedence over the file.
    pub fn normalize_from_env(&mut self) {
        if let Ok(path) = std::env::var("ITEMS_PATH") {
            if !path.trim().is_empty() {
                self.items_path = path;
            }
        }
        if let Ok(seed) = std::env::var("ITEMS_SEED_PATH") {
            if !seed.trim().is_empty() {
                self.seed_path = Some(seed);
            }
        }
        if self.seed_path.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.seed_path = None;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.items_path.trim().is_empty() {
            return Err(anyhow!("storage.items_path is empty; set it in config.toml or ITEMS_PATH"));
        }
        if self.items_path.ends_with('/') {
            return Err(anyhow!("storage.items_path must point to a file, got directory {}", self.items_path));
        }
        if self.seed_path.as_deref() == Some(self.items_path.as_str()) {
            return Err(anyhow!("storage.seed_path must differ from storage.items_path"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_config(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("configs_{name}_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn invalid_config_file_is_an_error_not_a_fallback() {
        let path = tmp_config(
            "invalid",
            r#"
            [server]
            host = "0.0.0.0"
            port = "not a number"

            [storage]
            items_path = "/srv/real/items.json"
            "#,
        );
        let res = AppConfig::load_or_env_from(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        let err = res.unwrap_err().to_string();
        assert!(err.contains("invalid config"), "{err}");
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!("configs_absent_{}.toml", uuid::Uuid::new_v4()));
        let cfg = AppConfig::load_or_env_from(path.to_str().unwrap()).unwrap();
        assert!(!cfg.storage.items_path.is_empty());
    }

    #[test]
    fn valid_config_file_is_used() {
        let path = tmp_config(
            "valid",
            r#"
            [server]
            host = "0.0.0.0"
            port = 8081

            [storage]
            items_path = "/srv/real/items.json"
            "#,
        );
        let res = AppConfig::load_or_env_from(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        let cfg = res.unwrap();
        assert_eq!(cfg.server.port, 8081);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.storage.items_path, "data/items.json");
        assert!(cfg.storage.seed_path.is_none());
    }

    #[test]
    fn parses_server_and_storage_sections() {
        let cfg = parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8088
            worker_threads = 2

            [storage]
            items_path = "/var/lib/items/items.json"
            seed_path = "seed/items.json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8088");
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.storage.items_path, "/var/lib/items/items.json");
        assert_eq!(cfg.storage.seed_path.as_deref(), Some("seed/items.json"));
    }

    #[test]
    fn normalize_fills_host_and_workers() {
        let mut server = ServerConfig { host: "  ".into(), port: 9000, worker_threads: Some(0) };
        server.normalize().unwrap();
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.worker_threads, Some(4));
    }

    #[test]
    fn zero_port_rejected() {
        let mut server = ServerConfig { host: "localhost".into(), port: 0, worker_threads: None };
        assert!(server.normalize().is_err());
    }

    #[test]
    fn storage_validation() {
        let ok = StorageConfig { items_path: "data/items.json".into(), seed_path: Some("seed.json".into()) };
        assert!(ok.validate().is_ok());

        let empty = StorageConfig { items_path: " ".into(), seed_path: None };
        assert!(empty.validate().is_err());

        let dir = StorageConfig { items_path: "data/".into(), seed_path: None };
        assert!(dir.validate().is_err());

        let same = StorageConfig { items_path: "a.json".into(), seed_path: Some("a.json".into()) };
        assert!(same.validate().is_err());
    }

    #[test]
    fn load_from_file_reads_toml() {
        let path = std::env::temp_dir().join(format!("configs_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nhost = \"127.0.0.1\"\nport = 4000\n").unwrap();
        let cfg = load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 4000);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_error() {
        assert!(load_from_file("/nonexistent/config-for-tests.toml").is_err());
    }
}
