// Application layer - Use cases and services
pub mod analysis_service;
pub mod battery_health;
pub mod comparison_service;
pub mod daily_aggregator;
