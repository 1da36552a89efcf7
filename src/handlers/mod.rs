pub mod health;
pub mod metrics_handler;
pub mod session;
