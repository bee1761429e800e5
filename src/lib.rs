pub mod catalog;
pub mod config;
pub mod engine;
pub mod pipeline;
pub mod scroll;
pub mod storefront;
pub mod tui;
