pub mod catalog;
pub mod health;
pub mod recommendations;

pub use catalog::catalog_stats;
pub use health::health_check;
pub use recommendations::{predict_config, recommendations_config};
