// Library for tests to access modules

pub mod config;
pub mod error;
pub mod fallback;
pub mod health;
pub mod history;
pub mod models;
pub mod poller;
pub mod prometheus_repo;
pub mod registry;
pub mod resolver;
pub mod routes;
pub mod uptime_repo;
pub mod version;
