pub mod config;
pub mod core;
pub mod model;
pub mod proxy;
pub mod render;
pub mod server;
pub mod session;
pub mod view;
