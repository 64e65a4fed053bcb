//! Built-in rule implementations.

mod criteria;
mod missing_modules;
mod pure_aggregator;

pub use criteria::CriteriaRule;
pub use missing_modules::MissingModulesRule;
pub use pure_aggregator::PureAggregatorRule;
