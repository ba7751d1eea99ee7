pub mod analytics;
pub mod app;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod runner;
pub mod source;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;
