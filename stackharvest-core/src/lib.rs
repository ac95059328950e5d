//! # stackharvest-core
//!
//! Core library for stackharvest - a Stack Exchange Q&A collection
//! pipeline.
//!
//! This library provides:
//! - Domain types for questions and answers
//! - A sequential collection pipeline with periodic checkpointing
//! - Live API and offline mock sources behind one trait
//! - Configuration management and logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use stackharvest_core::{Collector, Config, QuestionQuery};
//!
//! # async fn run() -> stackharvest_core::Result<()> {
//! let config = Config::load()?;
//! let collector = Collector::new(&config.collector)?;
//! let questions = collector.collect(&QuestionQuery::new("nlp", 10)).await?;
//! println!("collected {} questions", questions.len());
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use collector::{Collector, FetchOutcome, QuestionQuery, QuestionSource, SyncCollector};
pub use config::Config;
pub use error::{Error, Result};
pub use types::{Answer, AnswerOwner, Question};

// Public modules
pub mod collector;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod types;
