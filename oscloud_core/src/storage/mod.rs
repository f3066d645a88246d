pub mod config;
pub mod form;
pub mod profile;
pub mod store;
