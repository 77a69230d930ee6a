use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pay amount used when the config does not set one
pub const DEFAULT_PAY_AMOUNT: u64 = 10;

const DEFAULT_ACCOUNTS: [&str; 6] = [
    "Bob",
    "Cindy",
    "Reginald",
    "Jim Argalax",
    "Valerian Vast",
    "Archonicus Auriarch",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSeed {
    pub name: String,
    #[serde(default)]
    pub money: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Amount added to an account by one pay action
    #[serde(default = "default_pay_amount")]
    pub pay_amount: u64,

    /// Send a desktop notification when the total is printed headless
    #[serde(default)]
    pub notifications: bool,

    /// Accounts on the board at startup, in display order
    #[serde(default = "default_accounts")]
    pub accounts: Vec<AccountSeed>,

    /// Hex colour overrides
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_pay_amount() -> u64 {
    DEFAULT_PAY_AMOUNT
}

fn default_accounts() -> Vec<AccountSeed> {
    DEFAULT_ACCOUNTS
        .iter()
        .map(|name| AccountSeed {
            name: name.to_string(),
            money: 100,
        })
        .collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pay_amount: DEFAULT_PAY_AMOUNT,
            notifications: false,
            accounts: default_accounts(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("tally");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, or create it with defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Ok(Self::load_or_create(&path)),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load `path` if it exists, falling back to defaults when it cannot be
    /// read or parsed. A missing file is written with defaults.
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            return Self::load_from(path).unwrap_or_else(|e| {
                tracing::warn!("{:#}", e);
                AppConfig::default()
            });
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Failed to write default config: {:#}", e);
        }
        config
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::debug!("Loaded {} accounts from {}", config.accounts.len(), path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config.cleaned())
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&self.clone().cleaned())?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Drop accounts with blank names and trim the rest
    fn cleaned(mut self) -> Self {
        self.accounts.retain(|a| !a.name.trim().is_empty());
        for account in &mut self.accounts {
            account.name = account.name.trim().to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            pay_amount: 25,
            notifications: true,
            accounts: vec![AccountSeed {
                name: "Bob".to_string(),
                money: 40,
            }],
            theme: ThemeConfig {
                accent: Some("#ffc107".to_string()),
                ..ThemeConfig::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized = AppConfig::parse(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.pay_amount, 10);
        assert_eq!(config.accounts.len(), 6);
        assert!(config.accounts.iter().all(|a| a.money == 100));
        assert_eq!(config.accounts[0].name, "Bob");
    }

    #[test]
    fn test_blank_names_dropped() {
        let config = AppConfig::parse(
            r#"
            [[accounts]]
            name = "  "
            money = 5

            [[accounts]]
            name = " Cindy "
            "#,
        )
        .unwrap();

        assert_eq!(
            config.accounts,
            vec![AccountSeed {
                name: "Cindy".to_string(),
                money: 0,
            }]
        );
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_or_create(&path);

        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let broken = "pay_amount = [oops";
        std::fs::write(&path, broken).unwrap();

        let config = AppConfig::load_or_create(&path);

        assert_eq!(config, AppConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);
    }

    #[test]
    fn test_explicit_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = AppConfig::load_from(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "pay_amount = \"ten\"").unwrap();
        let err = AppConfig::load_from(&broken).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(AppConfig::parse("pay_amount = \"ten\"").is_err());
    }
}
