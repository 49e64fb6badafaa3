pub mod config;
pub mod duration;

pub use config::{EcsConfig, QzConfig, SelectorConfig, StoreConfig, StrategyKind};
pub use duration::parse_duration;
