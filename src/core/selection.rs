//! The visitor's choices: which services, on which frequency, with which parameters.

use anyhow::{Result, bail};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::catalog::{Catalog, DEFAULT_FREQUENCY_ID};

/// Per-service inputs to the surcharge rules. Callers clamp these to
/// non-negative values before pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceParameters {
    /// Square meters.
    #[serde(default)]
    pub area: Decimal,
    #[serde(default = "default_floors")]
    pub floors: u32,
    /// Heavy vegetation or workload.
    #[serde(default)]
    pub is_intense: bool,
}

fn default_floors() -> u32 {
    1
}

impl Default for ServiceParameters {
    fn default() -> Self {
        ServiceParameters {
            area: Decimal::ZERO,
            floors: default_floors(),
            is_intense: false,
        }
    }
}

impl ServiceParameters {
    pub fn new(area: Decimal, floors: u32, is_intense: bool) -> Self {
        ServiceParameters {
            area,
            floors,
            is_intense,
        }
    }

    /// Clamps a negative area to zero.
    pub fn clamped(self) -> Self {
        ServiceParameters {
            area: self.area.max(Decimal::ZERO),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEntry {
    pub frequency_id: String,
    pub params: ServiceParameters,
}

/// Selected services keyed by service id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    entries: HashMap<String, SelectionEntry>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.entries.contains_key(service_id)
    }

    pub fn get(&self, service_id: &str) -> Option<&SelectionEntry> {
        self.entries.get(service_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SelectionEntry)> {
        self.entries.iter()
    }

    /// Selects the service with the default frequency and its catalog
    /// defaults, or deselects it if already selected. Returns whether the
    /// service is selected afterwards.
    pub fn toggle(&mut self, catalog: &Catalog, service_id: &str) -> Result<bool> {
        if self.entries.remove(service_id).is_some() {
            debug!(service_id, "Deselected service");
            return Ok(false);
        }

        let service = catalog.service(service_id)?;
        catalog.frequency(DEFAULT_FREQUENCY_ID)?;
        self.entries.insert(
            service_id.to_string(),
            SelectionEntry {
                frequency_id: DEFAULT_FREQUENCY_ID.to_string(),
                params: service.defaults.clone(),
            },
        );
        debug!(service_id, "Selected service");
        Ok(true)
    }

    /// Inserts or replaces an entry without consulting the catalog.
    pub fn insert(&mut self, service_id: &str, entry: SelectionEntry) {
        self.entries.insert(service_id.to_string(), entry);
    }

    /// Changing the frequency of an unselected service is a no-op.
    pub fn update_frequency(&mut self, service_id: &str, frequency_id: &str) {
        if let Some(entry) = self.entries.get_mut(service_id) {
            entry.frequency_id = frequency_id.to_string();
        }
    }

    /// Changing the parameters of an unselected service is a no-op.
    pub fn update_params(&mut self, service_id: &str, params: ServiceParameters) {
        if let Some(entry) = self.entries.get_mut(service_id) {
            entry.params = params.clamped();
        }
    }

    /// Fails on the first service or frequency id the catalog doesn't know.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        for (service_id, entry) in &self.entries {
            catalog.service(service_id)?;
            catalog.frequency(&entry.frequency_id)?;
        }
        Ok(())
    }
}

/// Toggle state of the co-host add-on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoHostState {
    #[serde(default)]
    pub enabled: bool,
    /// Monthly rental revenue the commission applies to.
    #[serde(default = "default_estimated_revenue")]
    pub estimated_revenue: Decimal,
}

fn default_estimated_revenue() -> Decimal {
    Decimal::from(35000)
}

impl Default for CoHostState {
    fn default() -> Self {
        CoHostState {
            enabled: false,
            estimated_revenue: default_estimated_revenue(),
        }
    }
}

impl CoHostState {
    /// Clamps a negative revenue estimate to zero.
    pub fn clamped(self) -> Self {
        CoHostState {
            estimated_revenue: self.estimated_revenue.max(Decimal::ZERO),
            ..self
        }
    }
}

/// One service line of a plan file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanItem {
    pub service: String,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub area: Option<Decimal>,
    #[serde(default)]
    pub floors: Option<u32>,
    #[serde(default)]
    pub intense: Option<bool>,
}

/// Serializable form of a selection plus the co-host toggle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub services: Vec<PlanItem>,
    #[serde(default)]
    pub co_host: CoHostState,
}

impl Plan {
    /// Builds a selection, filling omitted values from the catalog defaults.
    pub fn to_selection(&self, catalog: &Catalog) -> Result<Selection> {
        let mut selection = Selection::new();
        for item in &self.services {
            if selection.contains(&item.service) {
                bail!("Service '{}' is listed more than once in the plan", item.service);
            }
            let service = catalog.service(&item.service)?;
            let frequency_id = item
                .frequency
                .clone()
                .unwrap_or_else(|| DEFAULT_FREQUENCY_ID.to_string());
            catalog.frequency(&frequency_id)?;

            let defaults = &service.defaults;
            let params = ServiceParameters {
                area: item.area.unwrap_or(defaults.area),
                floors: item.floors.unwrap_or(defaults.floors),
                is_intense: item.intense.unwrap_or(defaults.is_intense),
            }
            .clamped();

            selection.insert(
                &item.service,
                SelectionEntry {
                    frequency_id,
                    params,
                },
            );
        }
        debug!(services = selection.len(), "Built selection from plan");
        Ok(selection)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        use anyhow::Context;

        let plan_str = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read plan file: {}", path.as_ref().display()))?;
        serde_yaml::from_str(&plan_str)
            .with_context(|| format!("Failed to parse plan file: {}", path.as_ref().display()))
    }
}
