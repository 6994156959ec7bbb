//! Terminal client for the Anusarth study assistant.
//!
//! The crate has three layers: `history` persists chat sessions as a
//! single JSON blob (50 most-recent sessions, most recent first),
//! `providers` normalizes two upstream chat APIs (OpenRouter streaming
//! completions and Google AI single-shot generate) behind one
//! [`providers::ChatProvider`] trait, and `services::ChatService` ties a
//! user message to session mutation, the provider call, and persistence.

pub mod config;
pub mod history;
pub mod models;
pub mod providers;
pub mod services;
