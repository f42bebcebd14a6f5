//! Service catalog: offerings, pricing rules, frequency plans and the co-host add-on.

use anyhow::{Result, anyhow, bail};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;

use super::selection::ServiceParameters;

/// Frequency a freshly selected service starts on.
pub const DEFAULT_FREQUENCY_ID: &str = "mensal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Cleaning,
    Maintenance,
    Gardening,
    DigitalManagement,
}

impl Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ServiceCategory::Cleaning => "Limpeza",
                ServiceCategory::Maintenance => "Manutenção",
                ServiceCategory::Gardening => "Jardinagem",
                ServiceCategory::DigitalManagement => "Gestão Digital",
            }
        )
    }
}

/// How a service's single-visit price reacts to its parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PricingRule {
    /// Visit price is always the base price.
    #[default]
    Flat,
    /// Independent flat add-ons for a large area and for extra floors.
    AreaFloorSurcharge {
        area_threshold: Decimal,
        area_surcharge: Decimal,
        floor_threshold: u32,
        floor_surcharge: Decimal,
    },
    /// One surcharge unit per started `step` beyond the threshold, plus a flat
    /// add-on for intense workloads.
    AreaSteppedSurcharge {
        area_threshold: Decimal,
        step: Decimal,
        step_surcharge: Decimal,
        intense_surcharge: Decimal,
    },
}

impl PricingRule {
    /// Premium janitorial: +100 above 100 m², +80 above one floor.
    pub fn premium_janitorial() -> Self {
        PricingRule::AreaFloorSurcharge {
            area_threshold: Decimal::from(100),
            area_surcharge: Decimal::from(100),
            floor_threshold: 1,
            floor_surcharge: Decimal::from(80),
        }
    }

    /// Lawn cutting: +50 per started 100 m² above 200 m², +100 when intense.
    pub fn lawn_cutting() -> Self {
        PricingRule::AreaSteppedSurcharge {
            area_threshold: Decimal::from(200),
            step: Decimal::from(100),
            step_surcharge: Decimal::from(50),
            intense_surcharge: Decimal::from(100),
        }
    }

    fn validate(&self, service_id: &str) -> Result<()> {
        match self {
            PricingRule::Flat => Ok(()),
            PricingRule::AreaFloorSurcharge {
                area_threshold,
                area_surcharge,
                floor_surcharge,
                ..
            } => {
                if area_threshold.is_sign_negative()
                    || area_surcharge.is_sign_negative()
                    || floor_surcharge.is_sign_negative()
                {
                    bail!("Service '{service_id}' has a negative surcharge parameter");
                }
                Ok(())
            }
            PricingRule::AreaSteppedSurcharge {
                area_threshold,
                step,
                step_surcharge,
                intense_surcharge,
            } => {
                if *step <= Decimal::ZERO {
                    bail!("Service '{service_id}' has a non-positive surcharge step");
                }
                if area_threshold.is_sign_negative()
                    || step_surcharge.is_sign_negative()
                    || intense_surcharge.is_sign_negative()
                {
                    bail!("Service '{service_id}' has a negative surcharge parameter");
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCatalogEntry {
    pub id: String,
    pub category: ServiceCategory,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Single-visit (avulso) price.
    pub base_price: Decimal,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub rule: PricingRule,
    #[serde(default)]
    pub defaults: ServiceParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyOption {
    pub id: String,
    pub label: String,
    pub multiplier: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoHostAddOn {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub commission_rate: Decimal,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub checklist: Vec<String>,
}

impl Default for CoHostAddOn {
    fn default() -> Self {
        CoHostAddOn {
            id: "co-host-premium".to_string(),
            name: "Co-anfitriã de Imóveis".to_string(),
            description: "Gestão completa em Airbnb e Booking. Do posicionamento estratégico ao \
                          check-out final. Atendimento 24/7 e gestão de hospitalidade."
                .to_string(),
            commission_rate: Decimal::new(20, 2),
            icon: "📱".to_string(),
            checklist: [
                "Anúncio e fotos",
                "Precificação dinâmica",
                "Atendimento ao hóspede",
                "Check-in e check-out",
                "Gestão de limpeza",
                "Relatório mensal",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// The services offered out of the box when a config doesn't list its own.
pub fn default_services() -> Vec<ServiceCatalogEntry> {
    let flat = |id: &str, category, name: &str, description: &str, price: i64, icon: &str| {
        ServiceCatalogEntry {
            id: id.to_string(),
            category,
            name: name.to_string(),
            description: description.to_string(),
            base_price: Decimal::from(price),
            icon: icon.to_string(),
            rule: PricingRule::Flat,
            defaults: ServiceParameters::default(),
        }
    };

    vec![
        flat(
            "limpeza-1",
            ServiceCategory::Cleaning,
            "Limpeza Residencial",
            "Higienização completa com foco em detalhes e produtos premium biodegradáveis.",
            180,
            "✨",
        ),
        flat(
            "manutencao-1",
            ServiceCategory::Maintenance,
            "Reparos e Manutenção",
            "Check-up preventivo de infraestrutura para evitar imprevistos e danos por maresia.",
            250,
            "🛠️",
        ),
        flat(
            "jardinagem-1",
            ServiceCategory::Gardening,
            "Cuidado Paisagístico",
            "Manutenção de jardins e áreas externas com adubação técnica e podas estéticas.",
            220,
            "🌿",
        ),
        ServiceCatalogEntry {
            id: "zeladoria-premium".to_string(),
            category: ServiceCategory::Cleaning,
            name: "Zeladoria Premium".to_string(),
            description: "Vistoria, limpeza e abertura da casa antes da sua chegada.".to_string(),
            base_price: Decimal::from(350),
            icon: "🏠".to_string(),
            rule: PricingRule::premium_janitorial(),
            defaults: ServiceParameters::new(Decimal::from(90), 1, false),
        },
        ServiceCatalogEntry {
            id: "corte-grama".to_string(),
            category: ServiceCategory::Gardening,
            name: "Corte de Grama".to_string(),
            description: "Roçada e acabamento de gramados com recolhimento de resíduos."
                .to_string(),
            base_price: Decimal::from(150),
            icon: "🌱".to_string(),
            rule: PricingRule::lawn_cutting(),
            defaults: ServiceParameters::new(Decimal::from(200), 1, false),
        },
    ]
}

/// Immutable lookup tables the pricing engine reads from.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    services: Vec<ServiceCatalogEntry>,
    frequencies: Vec<FrequencyOption>,
    co_host: CoHostAddOn,
}

impl Catalog {
    /// Builds and validates a catalog.
    pub fn new(
        services: Vec<ServiceCatalogEntry>,
        frequencies: Vec<FrequencyOption>,
        co_host: CoHostAddOn,
    ) -> Result<Self> {
        let catalog = Catalog {
            services,
            frequencies,
            co_host,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Services in declaration order.
    pub fn services(&self) -> &[ServiceCatalogEntry] {
        &self.services
    }

    pub fn frequencies(&self) -> &[FrequencyOption] {
        &self.frequencies
    }

    pub fn co_host(&self) -> &CoHostAddOn {
        &self.co_host
    }

    pub fn service(&self, id: &str) -> Result<&ServiceCatalogEntry> {
        self.services
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| anyhow!("Unknown service: {id}"))
    }

    pub fn frequency(&self, id: &str) -> Result<&FrequencyOption> {
        self.frequencies
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| anyhow!("Unknown frequency: {id}"))
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for service in &self.services {
            if !seen.insert(service.id.as_str()) {
                bail!("Duplicate service id: {}", service.id);
            }
            if service.base_price.is_sign_negative() {
                bail!("Service '{}' has a negative base price", service.id);
            }
            service.rule.validate(&service.id)?;
        }

        let mut seen = HashSet::new();
        for frequency in &self.frequencies {
            if !seen.insert(frequency.id.as_str()) {
                bail!("Duplicate frequency id: {}", frequency.id);
            }
            if frequency.multiplier.is_sign_negative() {
                bail!("Frequency '{}' has a negative multiplier", frequency.id);
            }
        }
        if !seen.contains(DEFAULT_FREQUENCY_ID) {
            bail!("Frequency table must define the default '{DEFAULT_FREQUENCY_ID}' option");
        }

        if self.co_host.commission_rate.is_sign_negative() {
            bail!("Co-host commission rate must not be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::str::FromStr;

    pub(crate) fn test_frequencies() -> Vec<FrequencyOption> {
        [
            ("avulso", "Avulso", "1.25"),
            ("mensal", "Mensal (1x)", "1.0"),
            ("quinzenal", "Quinzenal (2x)", "1.9"),
            ("semanal-1", "1x/Semana", "3.6"),
            ("semanal-2", "2x/Semana", "6.4"),
        ]
        .iter()
        .map(|(id, label, m)| FrequencyOption {
            id: id.to_string(),
            label: label.to_string(),
            multiplier: Decimal::from_str(m).unwrap(),
        })
        .collect()
    }

    pub(crate) fn test_catalog() -> Catalog {
        Catalog::new(default_services(), test_frequencies(), CoHostAddOn::default()).unwrap()
    }

    #[test]
    fn test_lookups() {
        let catalog = test_catalog();
        assert_eq!(catalog.service("corte-grama").unwrap().name, "Corte de Grama");
        assert_eq!(
            catalog.frequency("semanal-1").unwrap().multiplier,
            Decimal::from_str("3.6").unwrap()
        );

        let err = catalog.service("piscina").unwrap_err();
        assert!(err.to_string().contains("Unknown service"));
        let err = catalog.frequency("anual").unwrap_err();
        assert!(err.to_string().contains("Unknown frequency"));
    }

    #[test]
    fn test_services_keep_declaration_order() {
        let catalog = test_catalog();
        let ids: Vec<_> = catalog.services().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "limpeza-1",
                "manutencao-1",
                "jardinagem-1",
                "zeladoria-premium",
                "corte-grama"
            ]
        );
    }

    #[test]
    fn test_validation_rejects_duplicates() {
        let mut services = default_services();
        services.push(services[0].clone());
        let result = Catalog::new(services, test_frequencies(), CoHostAddOn::default());
        assert!(result.unwrap_err().to_string().contains("Duplicate service id"));

        let mut frequencies = test_frequencies();
        frequencies.push(frequencies[1].clone());
        let result = Catalog::new(default_services(), frequencies, CoHostAddOn::default());
        assert!(result.unwrap_err().to_string().contains("Duplicate frequency id"));
    }

    #[test]
    fn test_validation_requires_default_frequency() {
        let frequencies: Vec<_> = test_frequencies()
            .into_iter()
            .filter(|f| f.id != DEFAULT_FREQUENCY_ID)
            .collect();
        let result = Catalog::new(default_services(), frequencies, CoHostAddOn::default());
        assert!(result.unwrap_err().to_string().contains("mensal"));
    }

    #[test]
    fn test_validation_rejects_zero_step() {
        let mut services = default_services();
        services[4].rule = PricingRule::AreaSteppedSurcharge {
            area_threshold: Decimal::from(200),
            step: Decimal::ZERO,
            step_surcharge: Decimal::from(50),
            intense_surcharge: Decimal::from(100),
        };
        let result = Catalog::new(services, test_frequencies(), CoHostAddOn::default());
        assert!(result.unwrap_err().to_string().contains("step"));
    }

    #[test]
    fn test_rule_deserialization() {
        let yaml = r#"
id: "zeladoria-premium"
category: cleaning
name: "Zeladoria Premium"
base_price: 350
rule:
  type: area_floor_surcharge
  area_threshold: 100
  area_surcharge: 100
  floor_threshold: 1
  floor_surcharge: 80
defaults:
  area: 90
  floors: 1
"#;
        let entry: ServiceCatalogEntry = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entry.rule, PricingRule::premium_janitorial());
        assert_eq!(entry.defaults.area, Decimal::from(90));
        assert!(!entry.defaults.is_intense);

        let yaml = r#"
id: "limpeza-1"
category: cleaning
name: "Limpeza Residencial"
base_price: 180.0
"#;
        let entry: ServiceCatalogEntry = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entry.rule, PricingRule::Flat);
        assert_eq!(entry.base_price, Decimal::from(180));
    }
}
