pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod price;
pub mod order_flow;
pub mod strategy;
pub mod ledger;
pub mod performance;
pub mod telemetry;
pub mod sim;
pub mod report;

// Re-export core types for convenience
pub use types::{Fill, OrderEvent, Quote, Side, Step};

// Re-export error types
pub use error::{ErrorSeverity, SimError, SimResult};

// Re-export configuration
pub use config::{ConfigError, MarketConfig, OutputConfig, SimConfig, StrategyConfig};

// Re-export simulation components
pub use ledger::Ledger;
pub use order_flow::OrderFlowGenerator;
pub use performance::{max_drawdown, sharpe_ratio, sortino_ratio, PerformanceReport};
pub use price::{PricePath, PriceProcess};
pub use sim::{MarketParams, SimulationState, Simulator, StepRecord, StrategyRun};
pub use strategy::QuoteStrategy;

// Re-export reporting
pub use report::{export_run, format_comparison, format_summary, RunSummary};

// Re-export logging functions
pub use logging::{init_logging, init_logging_with_level, init_test_logging, log_sim_error};
