// Application layer - use cases over the snapshot store and measure registry
pub mod error;
pub mod measure_service;
pub mod plot_service;
pub mod snapshot_repository;
pub mod snapshot_service;
