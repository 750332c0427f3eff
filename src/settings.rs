use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::i18n::Language;
use crate::store;
use crate::styles::StyleOverrides;

pub const STATE_DIR_ENV: &str = "EMAILFORGE_HOME";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const API_KEY_FILE: &str = "api_key.json";
const LANGUAGE_FILE: &str = "language.json";
const HTML_STYLES_FILE: &str = "html_styles.json";

/// Resolves the state directory: explicit flag, then `EMAILFORGE_HOME`, then the platform
/// config dir.
pub fn resolve_state_dir(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Ok(dir) = std::env::var(STATE_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    let dirs = directories_next::ProjectDirs::from("dev", "emailforge", "emailforge")
        .ok_or_else(|| anyhow::anyhow!("could not determine a config directory; pass --state-dir"))?;
    Ok(dirs.config_dir().to_path_buf())
}

/// One independently persisted value stored as `<state_dir>/<file>`.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    path: PathBuf,
    _value: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> Slot<T> {
    fn new(state_dir: &Path, file: &str) -> Self {
        Self {
            path: state_dir.join(file),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> anyhow::Result<Option<T>> {
        store::read_json(&self.path)
            .await
            .with_context(|| format!("load setting: {}", self.path.display()))
    }

    pub async fn save(&self, value: &T) -> anyhow::Result<()> {
        tracing::debug!(path = %self.path.display(), "save setting");
        store::write_json_atomic(&self.path, value)
            .await
            .with_context(|| format!("save setting: {}", self.path.display()))
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        store::remove_if_exists(&self.path).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredApiKey {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredLanguage {
    pub language: Language,
}

/// Credential, language, and style-override slots. The slots never touch each other.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Slot<StoredApiKey>,
    pub language: Slot<StoredLanguage>,
    pub html_styles: Slot<StyleOverrides>,
}

impl Settings {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            api_key: Slot::new(state_dir, API_KEY_FILE),
            language: Slot::new(state_dir, LANGUAGE_FILE),
            html_styles: Slot::new(state_dir, HTML_STYLES_FILE),
        }
    }

    /// `GEMINI_API_KEY` wins over the stored credential; blank values count as missing.
    pub async fn api_key(&self) -> anyhow::Result<Option<String>> {
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.trim().is_empty()
        {
            return Ok(Some(key.trim().to_owned()));
        }
        let stored = self.api_key.load().await?;
        Ok(stored
            .map(|s| s.api_key.trim().to_owned())
            .filter(|key| !key.is_empty()))
    }

    pub async fn set_api_key(&self, key: &str) -> anyhow::Result<()> {
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("API key must not be empty");
        }
        self.api_key
            .save(&StoredApiKey {
                api_key: key.to_owned(),
            })
            .await
    }

    /// Stored language. A corrupt slot degrades to the default language.
    pub async fn language(&self) -> Language {
        match self.language.load().await {
            Ok(stored) => stored.map(|s| s.language).unwrap_or_default(),
            Err(err) => {
                tracing::warn!(
                    path = %self.language.path().display(),
                    error = %format!("{err:#}"),
                    "failed to load stored language; using default"
                );
                Language::default()
            }
        }
    }

    pub async fn set_language(&self, language: Language) -> anyhow::Result<()> {
        self.language.save(&StoredLanguage { language }).await
    }

    /// Stored style overrides. A corrupt slot degrades to no overrides.
    pub async fn html_styles(&self) -> StyleOverrides {
        match self.html_styles.load().await {
            Ok(styles) => styles.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(
                    path = %self.html_styles.path().display(),
                    error = %format!("{err:#}"),
                    "failed to load stored html styles; using defaults"
                );
                StyleOverrides::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::SectionRole;
    use crate::styles::{StyleOverride, StyleTarget};

    #[tokio::test]
    async fn slots_persist_independently() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let settings = Settings::new(dir.path());

        assert_eq!(settings.language().await, Language::Ar);
        settings.set_language(Language::En).await?;
        settings.set_api_key("  secret  ").await?;

        let mut styles = StyleOverrides::new();
        styles.insert(
            StyleTarget::Section(SectionRole::Footer),
            StyleOverride {
                font_size: Some("11px".to_owned()),
                ..StyleOverride::default()
            },
        );
        settings.html_styles.save(&styles).await?;

        let reopened = Settings::new(dir.path());
        assert_eq!(reopened.language().await, Language::En);
        assert_eq!(
            reopened.api_key.load().await?.map(|s| s.api_key).as_deref(),
            Some("secret")
        );
        assert_eq!(reopened.html_styles().await, styles);

        reopened.api_key.clear().await?;
        assert!(reopened.api_key.load().await?.is_none());
        assert_eq!(reopened.language().await, Language::En);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_styles_fall_back_to_defaults() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let settings = Settings::new(dir.path());
        std::fs::write(settings.html_styles.path(), "[1, 2")?;
        assert!(settings.html_styles().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_language_falls_back_to_default_and_can_be_repaired() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let settings = Settings::new(dir.path());
        std::fs::write(settings.language.path(), r#"{"language":"fr"}"#)?;
        assert_eq!(settings.language().await, Language::Ar);

        settings.set_language(Language::En).await?;
        assert_eq!(settings.language().await, Language::En);
        Ok(())
    }

    #[tokio::test]
    async fn blank_api_key_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let settings = Settings::new(dir.path());
        assert!(settings.set_api_key("   ").await.is_err());
        assert!(settings.api_key.load().await?.is_none());
        Ok(())
    }

    #[test]
    fn explicit_state_dir_wins() -> anyhow::Result<()> {
        let dir = resolve_state_dir(Some(Path::new("/tmp/emailforge-state")))?;
        assert_eq!(dir, PathBuf::from("/tmp/emailforge-state"));
        Ok(())
    }
}
