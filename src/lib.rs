pub mod ai;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod handlers;
pub mod history;
pub mod parsing;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;
