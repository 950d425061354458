//! # QuestMaster
//!
//! An AI-powered gamified task manager backend.
//!
//! This library provides:
//! - An HTTP API for quest and user-stat management
//! - A SQLite-backed quest store
//! - AI quest generation with a deterministic fallback
//!
//! ## Quest Flow
//! 1. Receive a task description via `/api/generate-quest`
//! 2. Ask the text-generation backend to break it into subtasks
//! 3. On any backend failure, fall back to the rule-based generator
//! 4. The client persists the draft via `/api/quests`
//!
//! ## Modules
//! - `db`: quest, subtask and user-stat persistence
//! - `generator`: AI quest generation and the deterministic fallback
//! - `llm`: text-generation backend client
//! - `api`: HTTP route handlers

pub mod api;
pub mod config;
pub mod db;
pub mod generator;
pub mod llm;

pub use config::Config;
