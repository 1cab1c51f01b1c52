pub mod chat;
pub mod common;
pub mod config;
pub mod service;
pub mod store;
pub mod ui;
