// Climbing stats - measure registry, unit model and filter engine behind an HTTP service
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
