// Domain layer - grades, units, measures and the filter engine
pub mod auto_filter;
pub mod filter;
pub mod grade;
pub mod measures;
pub mod plot;
pub mod snapshot;
pub mod units;
