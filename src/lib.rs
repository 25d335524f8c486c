// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod dish;
pub mod models;
pub mod poller;
pub mod routes;
pub mod version;
