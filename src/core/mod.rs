//! Pricing domain and the abstractions around it

pub mod catalog;
pub mod config;
pub mod currency;
pub mod insight;
pub mod log;
pub mod payment;
pub mod pricing;
pub mod proposal;
pub mod selection;

// Re-export main types for cleaner imports
pub use catalog::{Catalog, CoHostAddOn, FrequencyOption, PricingRule, ServiceCatalogEntry};
pub use insight::InsightProvider;
pub use payment::{CustomerData, PaymentCharge, PaymentGateway};
pub use pricing::{Quote, QuoteLine};
pub use selection::{CoHostState, Plan, Selection, SelectionEntry, ServiceParameters};
