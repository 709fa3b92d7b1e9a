//! RAG Pipeline Explorer
//!
//! Step-by-step playback of a simulated Retrieval-Augmented-Generation
//! pipeline across a fixed diagram of infrastructure nodes (source, stream
//! buffer, stream processor, embedding service, vector index, cache,
//! retriever, reranker, language model).
//!
//! # Architecture
//!
//! - [`scenario`]: hand-authored, tenant-parameterized step tables for the
//!   `ingestion` and `query` flows
//! - [`playback`]: the controller that applies steps on start / advance /
//!   reset and keeps the bounded console log
//! - [`genai`]: the generative model boundary (answer text and images)
//! - [`session`]: tenant selector, query field and image studio around a
//!   controller, with phase-dependent input locking
//! - [`topology`] and [`inspector`]: pure view models for the diagram and
//!   the inspector panel
//! - [`http`]: JSON API over a session
//!
//! ## Example Usage
//!
//! ```rust
//! use rag_explorer::genai::{GenAiClient, LLMProvider};
//! use rag_explorer::config::{ExplorerConfig, GenAiConfig};
//! use rag_explorer::playback::{Phase, StepOutcome};
//! use rag_explorer::scenario::ScenarioName;
//! use rag_explorer::session::Session;
//! use std::sync::Arc;
//!
//! let mut config = ExplorerConfig::default();
//! config.genai = GenAiConfig { provider: LLMProvider::Mock, ..GenAiConfig::default() };
//! let client = GenAiClient::new(&config.genai).unwrap();
//! let mut session = Session::new(Arc::new(client), &config);
//!
//! session.select_tenant("Acme Corp").unwrap();
//! assert_eq!(session.start(ScenarioName::Ingestion), StepOutcome::Applied(0));
//! while session.advance() != StepOutcome::Completed {}
//! assert_eq!(session.phase(), Phase::Completed);
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod genai;
pub mod http;
pub mod inspector;
pub mod playback;
pub mod scenario;
pub mod session;
pub mod studio;
pub mod topology;

pub use config::{ConfigError, ExplorerConfig, GenAiConfig, PlaybackConfig};
pub use genai::{GenAiClient, GenAiError, GenAiResult, GenerativeModel, ImageSize, LLMProvider};
pub use inspector::{InspectorView, RankedCandidate};
pub use playback::{ConsoleLog, LogHistory, Phase, PlaybackController, PlaybackState, StepOutcome};
pub use scenario::{
    build_scenario, DisplayHint, InspectorPayload, PayloadData, Scenario, ScenarioError,
    ScenarioName, StepRecord,
};
pub use session::{Session, SessionError, SessionView, TENANTS};
pub use studio::{ExportError, ImageStudio, StudioError};
pub use topology::{Edge, NodeId};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
