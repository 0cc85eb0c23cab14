//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::engine::SearchBackend`].

pub mod custom_search;

pub use custom_search::CustomSearchClient;
