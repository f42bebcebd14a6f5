use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use super::catalog::{Catalog, CoHostAddOn, FrequencyOption, ServiceCatalogEntry, default_services};
use super::selection::Plan;

pub const DEFAULT_ASAAS_URL: &str = "https://www.asaas.com/api/v3";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const ASAAS_TOKEN_ENV: &str = "ASAAS_ACCESS_TOKEN";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CompanyConfig {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    /// Days a proposal stays valid.
    #[serde(default = "default_validity_days")]
    pub proposal_validity_days: u32,
}

fn default_validity_days() -> u32 {
    7
}

impl Default for CompanyConfig {
    fn default() -> Self {
        CompanyConfig {
            name: "Gaivotas do Sul".to_string(),
            tagline: "Gestão Patrimonial & Co-anfitria".to_string(),
            proposal_validity_days: default_validity_days(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AsaasProviderConfig {
    pub base_url: String,
    /// Falls back to the `ASAAS_ACCESS_TOKEN` environment variable.
    pub access_token: Option<String>,
}

impl AsaasProviderConfig {
    pub fn resolve_token(&self) -> Result<String> {
        self.access_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(ASAAS_TOKEN_ENV).ok())
            .with_context(|| {
                format!("No Asaas access token configured; set providers.asaas.access_token or {ASAAS_TOKEN_ENV}")
            })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiProviderConfig {
    pub base_url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Falls back to the `GEMINI_API_KEY` environment variable.
    pub api_key: Option<String>,
}

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

impl GeminiProviderConfig {
    pub fn resolve_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(GEMINI_KEY_ENV).ok())
            .with_context(|| {
                format!("No Gemini API key configured; set providers.gemini.api_key or {GEMINI_KEY_ENV}")
            })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub asaas: Option<AsaasProviderConfig>,
    pub gemini: Option<GeminiProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            asaas: Some(AsaasProviderConfig {
                base_url: DEFAULT_ASAAS_URL.to_string(),
                access_token: None,
            }),
            gemini: Some(GeminiProviderConfig {
                base_url: DEFAULT_GEMINI_URL.to_string(),
                model: default_gemini_model(),
                api_key: None,
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn asaas(&self) -> AsaasProviderConfig {
        self.asaas.clone().unwrap_or(AsaasProviderConfig {
            base_url: DEFAULT_ASAAS_URL.to_string(),
            access_token: None,
        })
    }

    pub fn gemini(&self) -> GeminiProviderConfig {
        self.gemini.clone().unwrap_or(GeminiProviderConfig {
            base_url: DEFAULT_GEMINI_URL.to_string(),
            model: default_gemini_model(),
            api_key: None,
        })
    }
}

fn default_currency() -> String {
    "BRL".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub company: CompanyConfig,
    /// No built-in default: multipliers, including the one-off one, are a
    /// deployment decision.
    pub frequencies: Vec<FrequencyOption>,
    #[serde(default = "default_services")]
    pub services: Vec<ServiceCatalogEntry>,
    #[serde(default)]
    pub co_host: CoHostAddOn,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "gaivotasdosul", "bundlequote")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .catalog()
            .and_then(|catalog| config.plan.to_selection(&catalog).map(|_| ()))
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Builds the validated catalog from the configured tables.
    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::new(
            self.services.clone(),
            self.frequencies.clone(),
            self.co_host.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const FREQUENCIES_YAML: &str = r#"
frequencies:
  - id: avulso
    label: "Avulso"
    multiplier: 1.0
  - id: mensal
    label: "Mensal (1x)"
    multiplier: 1.0
  - id: semanal-1
    label: "1x/Semana"
    multiplier: 3.6
"#;

    #[test]
    fn test_config_deserialization_with_defaults() {
        let config: AppConfig =
            serde_yaml::from_str(FREQUENCIES_YAML).expect("Failed to deserialize");

        assert_eq!(config.currency, "BRL");
        assert_eq!(config.company.name, "Gaivotas do Sul");
        assert_eq!(config.company.proposal_validity_days, 7);
        assert_eq!(config.frequencies.len(), 3);
        assert_eq!(config.frequencies[0].multiplier, Decimal::ONE);
        assert_eq!(
            config.frequencies[2].multiplier,
            Decimal::from_str("3.6").unwrap()
        );
        assert_eq!(config.services.len(), 5);
        assert_eq!(config.co_host.commission_rate, Decimal::new(20, 2));
        assert!(config.plan.services.is_empty());
        assert_eq!(config.providers.asaas().base_url, "https://www.asaas.com/api/v3");

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.services().len(), 5);
        assert_eq!(catalog.frequencies().len(), 3);
    }

    #[test]
    fn test_config_requires_frequencies() {
        let result: Result<AppConfig, _> = serde_yaml::from_str("currency: BRL\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_with_custom_services_and_providers() {
        let yaml = format!(
            r#"{FREQUENCIES_YAML}
company:
  name: "Acme Zeladoria"
services:
  - id: piscina
    category: maintenance
    name: "Limpeza de Piscina"
    base_price: 120.5
co_host:
  id: co-host
  name: "Co-host"
  commission_rate: 0.15
plan:
  services:
    - service: piscina
      frequency: semanal-1
providers:
  asaas:
    base_url: "http://localhost:9999"
    access_token: "token"
  gemini:
    base_url: "http://localhost:9998"
"#
        );
        let config: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.company.name, "Acme Zeladoria");
        assert_eq!(config.company.proposal_validity_days, 7);
        assert_eq!(config.services.len(), 1);
        assert_eq!(
            config.services[0].base_price,
            Decimal::from_str("120.5").unwrap()
        );
        assert_eq!(config.co_host.commission_rate, Decimal::new(15, 2));
        assert_eq!(config.plan.services[0].service, "piscina");

        let asaas = config.providers.asaas();
        assert_eq!(asaas.base_url, "http://localhost:9999");
        assert_eq!(asaas.resolve_token().unwrap(), "token");
        let gemini = config.providers.gemini();
        assert_eq!(gemini.model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_load_rejects_plan_with_unknown_service() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let yaml = format!("{FREQUENCIES_YAML}\nplan:\n  services:\n    - service: piscina\n");
        fs::write(&path, yaml).unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown service: piscina"));
    }

    #[test]
    fn test_load_rejects_catalog_without_monthly_frequency() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "frequencies:\n  - id: avulso\n    label: Avulso\n    multiplier: 1.25\n",
        )
        .unwrap();

        assert!(AppConfig::load_from_path(&path).is_err());
    }
}
