//! Pricing engine: visit prices, frequency line totals and the grand total.
//!
//! Every function here is pure. Lines are summed in catalog order so the same
//! selection always produces the same breakdown and total.
use anyhow::{Context, Result, anyhow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{
    Catalog, CoHostAddOn, FrequencyOption, PricingRule, ServiceCatalogEntry, ServiceCategory,
};
use super::selection::{CoHostState, Selection, ServiceParameters};

/// Decimal arithmetic that overflows is reported instead of panicking.
fn checked(value: Option<Decimal>, what: &str) -> Result<Decimal> {
    value.ok_or_else(|| anyhow!("Amount out of range while computing {what}"))
}

/// Single-visit price of a service under the given parameters.
pub fn compute_visit_price(
    service: &ServiceCatalogEntry,
    params: &ServiceParameters,
) -> Result<Decimal> {
    let mut price = service.base_price;
    let what = "the visit price";

    match &service.rule {
        PricingRule::Flat => {}
        PricingRule::AreaFloorSurcharge {
            area_threshold,
            area_surcharge,
            floor_threshold,
            floor_surcharge,
        } => {
            if params.area > *area_threshold {
                price = checked(price.checked_add(*area_surcharge), what)?;
            }
            if params.floors > *floor_threshold {
                price = checked(price.checked_add(*floor_surcharge), what)?;
            }
        }
        PricingRule::AreaSteppedSurcharge {
            area_threshold,
            step,
            step_surcharge,
            intense_surcharge,
        } => {
            if params.area > *area_threshold {
                // A started step counts as a whole one.
                let excess = checked(params.area.checked_sub(*area_threshold), what)?;
                let steps = checked(excess.checked_div(*step), what)?.ceil();
                let surcharge = checked(steps.checked_mul(*step_surcharge), what)?;
                price = checked(price.checked_add(surcharge), what)?;
            }
            if params.is_intense {
                price = checked(price.checked_add(*intense_surcharge), what)?;
            }
        }
    }

    Ok(price)
}

pub fn compute_line_total(visit_price: Decimal, frequency: &FrequencyOption) -> Result<Decimal> {
    checked(
        visit_price.checked_mul(frequency.multiplier),
        &format!("the {} line total", frequency.id),
    )
}

pub fn compute_co_host_fee(add_on: &CoHostAddOn, state: &CoHostState) -> Result<Decimal> {
    if state.enabled {
        checked(
            state.estimated_revenue.checked_mul(add_on.commission_rate),
            "the co-host fee",
        )
    } else {
        Ok(Decimal::ZERO)
    }
}

/// Sum of every selected line plus the co-host commission when enabled.
pub fn compute_grand_total(
    catalog: &Catalog,
    selection: &Selection,
    co_host: &CoHostState,
) -> Result<Decimal> {
    Ok(quote(catalog, selection, co_host)?.total)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub service_id: String,
    pub service_name: String,
    pub category: ServiceCategory,
    pub frequency_id: String,
    pub frequency_label: String,
    pub visit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoHostLine {
    pub name: String,
    pub estimated_revenue: Decimal,
    pub commission_rate: Decimal,
    pub fee: Decimal,
}

/// Priced breakdown of a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub co_host: Option<CoHostLine>,
    pub services_total: Decimal,
    pub total: Decimal,
}

impl Quote {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.co_host.is_none()
    }

    /// Names of everything being charged, comma separated.
    pub fn description(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.service_name.as_str())
            .chain(self.co_host.iter().map(|c| c.name.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Prices every selected service, in catalog order.
pub fn quote(catalog: &Catalog, selection: &Selection, co_host: &CoHostState) -> Result<Quote> {
    selection.validate(catalog)?;

    let mut lines = Vec::with_capacity(selection.len());
    let mut services_total = Decimal::ZERO;

    for service in catalog.services() {
        let Some(entry) = selection.get(&service.id) else {
            continue;
        };
        let frequency = catalog.frequency(&entry.frequency_id)?;
        let visit_price = compute_visit_price(service, &entry.params)
            .with_context(|| format!("Failed to price {}", service.id))?;
        let line_total = compute_line_total(visit_price, frequency)
            .with_context(|| format!("Failed to price {}", service.id))?;
        debug!(
            service = %service.id,
            frequency = %frequency.id,
            %visit_price,
            %line_total,
            "Priced line"
        );

        services_total = checked(services_total.checked_add(line_total), "the services total")?;
        lines.push(QuoteLine {
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            category: service.category,
            frequency_id: frequency.id.clone(),
            frequency_label: frequency.label.clone(),
            visit_price,
            line_total,
        });
    }

    let add_on = catalog.co_host();
    let co_host_line = if co_host.enabled {
        Some(CoHostLine {
            name: add_on.name.clone(),
            estimated_revenue: co_host.estimated_revenue,
            commission_rate: add_on.commission_rate,
            fee: compute_co_host_fee(add_on, co_host)?,
        })
    } else {
        None
    };

    let fee = co_host_line.as_ref().map_or(Decimal::ZERO, |c| c.fee);
    let total = checked(services_total.checked_add(fee), "the quote total")?;
    debug!(%services_total, %total, "Computed quote total");

    Ok(Quote {
        lines,
        co_host: co_host_line,
        services_total,
        total,
    })
}

/// Line total of a service under its default parameters for every frequency.
pub fn frequency_price_grid<'a>(
    catalog: &'a Catalog,
    service: &ServiceCatalogEntry,
) -> Result<Vec<(&'a FrequencyOption, Decimal)>> {
    let visit_price = compute_visit_price(service, &service.defaults)?;
    catalog
        .frequencies()
        .iter()
        .map(|f| Ok((f, compute_line_total(visit_price, f)?)))
        .collect()
}
