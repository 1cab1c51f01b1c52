pub mod client;

pub use client::ChatService;
