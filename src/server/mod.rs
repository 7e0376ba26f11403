//! Server side: dispatch hub, responder adapters and HTTP routes.
//!
//! - [`TaskManager`]: holds the single attached [`AgentAdapter`] and
//!   mediates validation and cancellation for every request
//! - [`AgentAdapter`] trait: request handlers for unary, streaming and card
//!   queries
//! - [`Responder`] trait + [`ResponderAdapter`]: plug any question/answer
//!   backend in; [`EchoResponder`] is the reference backend
//! - [`delta_channel`]: bounded pipe carrying streamed text deltas
//! - [`a2a_router`]: ready-made axum routes (REST and JSON-RPC bindings)
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a2a_bridge::server::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. Wrap a responder into an adapter and attach it.
//! let manager = Arc::new(TaskManager::new());
//! manager.attach(Arc::new(ResponderAdapter::echo()));
//!
//! // 2. Create the router and serve.
//! let app = a2a_router(manager, ServerConfig::default().with_agent_path("/echo"));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod agent_adapter;
pub mod axum_integration;
pub mod config;
pub mod delta_channel;
pub mod task_manager;

pub use agent_adapter::{AgentAdapter, BoxError, EchoResponder, Responder, ResponderAdapter};
pub use axum_integration::a2a_router;
pub use config::ServerConfig;
pub use delta_channel::{delta_channel, DeltaReceiver, DeltaSender};
pub use task_manager::{RequestState, TaskManager};
