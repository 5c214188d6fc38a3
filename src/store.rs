use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::ServiceKind;

// ---------------------------------------------------------------------------
// Persisted documents. Two JSON documents (config + data) plus the small
// session-flags file; each is loaded once at startup and rewritten wholesale
// on every mutation. Field names stay camelCase so legacy exports from the
// web build keep loading.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub login: LoginConfig,
    pub subscription_url: String,
    pub ad_settings: AdSettings,
    pub developer_info: DeveloperInfo,
    pub site_logo_url: String,
    pub site_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            login: LoginConfig::default(),
            subscription_url: "https://www.youtube.com/channel/UC-lHJZR3Gqxm24_Vd_AJ5Yw".into(),
            ad_settings: AdSettings::default(),
            developer_info: DeveloperInfo::default(),
            site_logo_url: String::new(),
            site_name: "ذكاء النصوص AI".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginConfig {
    pub enabled: bool,
    pub username: String,
    pub password: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: "admin".into(),
            password: "password".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdSettings {
    pub video_urls: Vec<String>,
    /// Ad display time in whole seconds.
    pub duration: u64,
    /// Opened in a new tab after the ad step; empty disables the redirect.
    pub post_ad_url: String,
}

impl Default for AdSettings {
    fn default() -> Self {
        Self {
            video_urls: vec![
                "https://www.youtube.com/embed/dQw4w9WgXcQ?autoplay=1&mute=1".into(),
                "https://www.youtube.com/embed/QH2-TGUlwu4?autoplay=1&mute=1".into(),
                "https://www.youtube.com/embed/xvFZjo5PgG0?autoplay=1&mute=1".into(),
            ],
            duration: 25,
            post_ad_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeveloperInfo {
    pub name: String,
    pub url: String,
    pub contact: ContactInfo,
}

impl Default for DeveloperInfo {
    fn default() -> Self {
        Self {
            name: "Ahmad".into(),
            url: "https://www.linkedin.com/in/ahmad-rd555/".into(),
            contact: ContactInfo::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub telegram: Option<String>,
}

// ---------------------------------------------------------------------------
// User content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomAd {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    /// Inline-encoded image (data URL).
    pub image: String,
}

impl CustomAd {
    pub fn new(name: String, description: String, link: String, image: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            link,
            image,
        }
    }
}

/// Encode raw image bytes as a data URL for [`CustomAd::image`].
pub fn image_data_url(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{b64}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResult {
    pub id: String,
    pub service_type: ServiceKind,
    pub prompt: String,
    pub result: String,
    pub timestamp: String,
}

impl SavedResult {
    pub fn new(service_type: ServiceKind, prompt: String, result: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            service_type,
            prompt,
            result,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppData {
    /// Last result (or classified failure message) per service; None when
    /// nothing has been generated or the slot was cleared.
    pub results: BTreeMap<ServiceKind, Option<String>>,
    pub custom_ads: Vec<CustomAd>,
    pub saved_results: Vec<SavedResult>,
}

impl AppData {
    /// Guarantee one `results` entry per service, even when the loaded
    /// document predates newer services or was written by hand.
    pub fn normalize(&mut self) {
        for kind in ServiceKind::all() {
            self.results.entry(kind).or_insert(None);
        }
    }

    pub fn with_defaults() -> Self {
        let mut data = Self::default();
        data.normalize();
        data
    }

    /// Pretty-printed document for the export-to-file action.
    pub fn to_export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize app data")
    }

    /// Parse an uploaded export wholesale. Missing fields fall back to
    /// defaults; only malformed JSON is rejected.
    pub fn from_import_json(json: &str) -> Result<Self> {
        let mut data: AppData =
            serde_json::from_str(json).context("imported file is not valid app data JSON")?;
        data.normalize();
        Ok(data)
    }
}

/// Per-user flags, kept outside the two main documents so that importing
/// someone else's data export cannot flip the subscription gate.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionFlags {
    pub subscribed: bool,
    pub authenticated: bool,
}

// ---------------------------------------------------------------------------
// Store — owns the data directory, one file per document
// ---------------------------------------------------------------------------

const CONFIG_FILE: &str = "config.json";
const DATA_FILE: &str = "data.json";
const FLAGS_FILE: &str = "flags.json";

pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open (or create) the data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Platform data directory for the app.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("samproai"))
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    pub fn load_config(&self) -> AppConfig {
        self.read_or_default(CONFIG_FILE)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        self.write_pretty(CONFIG_FILE, config)
    }

    pub fn load_data(&self) -> AppData {
        let mut data: AppData = self.read_or_default(DATA_FILE);
        data.normalize();
        data
    }

    pub fn save_data(&self, data: &AppData) -> Result<()> {
        self.write_pretty(DATA_FILE, data)
    }

    pub fn load_flags(&self) -> SessionFlags {
        self.read_or_default(FLAGS_FILE)
    }

    pub fn save_flags(&self, flags: &SessionFlags) -> Result<()> {
        self.write_pretty(FLAGS_FILE, flags)
    }

    /// Missing or unparseable documents fall back to defaults; a stale file
    /// must never keep the app from starting.
    fn read_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let path = self.dir.join(file);
        match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(file, "discarding unparseable document: {e}");
                T::default()
            }),
            Err(_) => T::default(),
        }
    }

    fn write_pretty<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.dir.join(file);
        let contents = serde_json::to_string_pretty(value)
            .with_context(|| format!("failed to serialize {file}"))?;
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}
