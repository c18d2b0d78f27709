//! Threadsmith: topic-to-post generation for X/Twitter, with per-user history.

pub mod composer;
pub mod config;
pub mod db;
pub mod errors;
pub mod generation;
pub mod history;
pub mod identity;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
