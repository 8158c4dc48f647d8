pub mod analytics;
pub mod config;
pub mod db;
pub mod errors;
pub mod maintenance;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

#[cfg(test)]
mod test_support;
