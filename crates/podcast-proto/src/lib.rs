pub mod api;
pub mod catalog;
pub mod config;
pub mod images;
pub mod platform;
pub mod player;
pub mod prefetch;
pub mod session;
