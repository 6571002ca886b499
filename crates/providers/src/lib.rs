//! Completion provider implementations for Parley.
//!
//! All providers implement the `parley_core::Provider` trait.
//! [`build_from_config`] picks and configures one from [`parley_config::AppConfig`].

pub mod factory;
pub mod openai_compat;

pub use factory::build_from_config;
pub use openai_compat::OpenAiCompatProvider;
