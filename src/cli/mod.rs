pub mod catalog;
pub mod checkout;
pub mod insight;
pub mod proposal;
pub mod quote;
pub mod setup;
pub mod ui;
