use std::path::{Path, PathBuf};

use assets_plus_gallery::model::{DeleteMode, PanelConfig, ThumbnailQuality};
use serde::Deserialize;

pub mod panel;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub output_dir: PathBuf,
    pub input_dir: PathBuf,
    pub user_dir: PathBuf,
    #[serde(default)]
    pub locales_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// `{user_dir}/__assets_plus`: hidden index, user config and thumbnail cache.
    pub fn state_dir(&self) -> PathBuf {
        self.user_dir.join("__assets_plus")
    }

    pub fn thumb_cache_dir(&self) -> PathBuf {
        self.state_dir().join("thumb_cache")
    }

    pub fn hidden_index_path(&self) -> PathBuf {
        self.state_dir().join("hidden.json")
    }

    pub fn panel_config_path(&self) -> PathBuf {
        self.state_dir().join("config.json")
    }
}

/// Built-in panel defaults; `config.json` in the state dir is layered on top
/// per request.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelSection {
    pub allowed_extensions: Vec<String>,
    pub thumbnail_quality: ThumbnailQuality,
    pub list_limit: usize,
    pub recursive: bool,
    pub poll_seconds: u64,
    pub default_delete_mode: DeleteMode,
    #[serde(default)]
    pub scan_depth: Option<u32>,
}

impl PanelSection {
    pub fn to_panel_config(&self) -> PanelConfig {
        let (w, h) = self.thumbnail_quality.size();
        PanelConfig {
            allowed_extensions: self.allowed_extensions.iter().map(|e| panel::dotted(e)).collect(),
            thumbnail_quality: self.thumbnail_quality,
            thumbnail_size: [w, h],
            list_limit: self.list_limit,
            recursive: self.recursive,
            poll_seconds: self.poll_seconds,
            default_delete_mode: self.default_delete_mode,
            scan_depth: self.scan_depth,
        }
    }
}

impl Default for PanelSection {
    fn default() -> Self {
        let p = PanelConfig::default();
        Self {
            allowed_extensions: p.allowed_extensions,
            thumbnail_quality: p.thumbnail_quality,
            list_limit: p.list_limit,
            recursive: p.recursive,
            poll_seconds: p.poll_seconds,
            default_delete_mode: p.default_delete_mode,
            scan_depth: p.scan_depth,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_list_limit: usize,
    /// 0 means one slot per CPU.
    pub thumb_concurrency: usize,
    pub workflow_cache_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        // Mirror defaults from config/default.toml
        Self { max_list_limit: 5000, thumb_concurrency: 0, workflow_cache_size: 4096 }
    }
}

impl LimitsConfig {
    pub fn thumb_slots(&self) -> usize {
        if self.thumb_concurrency == 0 {
            num_cpus::get().max(1)
        } else {
            self.thumb_concurrency
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
    /// When set, every `/assets_plus` request must carry `Authorization: Bearer <token>`.
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub panel: PanelSection,
    #[serde(default)]
    pub limits: LimitsConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl AppConfig {
    /// Defaults with every storage directory placed under `base`.
    pub fn rooted_at(base: &Path) -> Self {
        let mut cfg = Self::default();
        cfg.storage.output_dir = base.join("output");
        cfg.storage.input_dir = base.join("input");
        cfg.storage.user_dir = base.join("user");
        cfg
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.security.as_ref().and_then(|s| s.auth_token.as_deref()).filter(|t| !t.is_empty())
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: assets_plus.toml (in CWD)
        .add_source(::config::File::with_name("assets_plus").required(false));

    if let Ok(custom_path) = std::env::var("ASSETS_PLUS_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(
        ::config::Environment::with_prefix("ASSETS_PLUS")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("panel.allowed_extensions")
            .try_parsing(true),
    );

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    // Warn for privileged ports on Unix-like systems
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Storage
    if cfg.storage.output_dir == cfg.storage.input_dir {
        return Err(anyhow::anyhow!("storage.output_dir and storage.input_dir must differ"));
    }

    // Panel
    if cfg.panel.list_limit == 0 {
        return Err(anyhow::anyhow!("panel.list_limit must be > 0"));
    }
    if cfg.panel.poll_seconds == 0 {
        return Err(anyhow::anyhow!("panel.poll_seconds must be > 0"));
    }
    if cfg.panel.allowed_extensions.is_empty() {
        return Err(anyhow::anyhow!("panel.allowed_extensions must not be empty"));
    }

    // Limits
    if cfg.limits.max_list_limit == 0 {
        return Err(anyhow::anyhow!("limits.max_list_limit must be > 0"));
    }
    if cfg.limits.thumb_concurrency > 256 {
        return Err(anyhow::anyhow!("limits.thumb_concurrency must be in 0..=256"));
    }
    if cfg.limits.workflow_cache_size == 0 {
        return Err(anyhow::anyhow!("limits.workflow_cache_size must be > 0"));
    }

    Ok(())
}

/// Creates the state and cache directories below `user_dir`.
pub fn ensure_state_dirs(storage: &StorageConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(storage.thumb_cache_dir())?;
    Ok(())
}
