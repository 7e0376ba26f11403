//! A2A client: call remote A2A agents.
//!
//! - [`A2AClient`]: high-level client for unary and streaming exchanges
//! - [`CardResolver`]: discover agent cards via the well-known URL convention
//! - [`Transport`] / [`HttpJsonTransport`] / [`JsonRpcTransport`]: pluggable
//!   transport layer, one per protocol binding
//! - [`DeltaStream`]: parsed SSE stream of text deltas
//!
//! # Quick Start
//!
//! ```no_run
//! use a2a_bridge::client::A2AClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Connect to an agent (resolves the agent card automatically):
//! let client = A2AClient::from_url("http://localhost:5001/echo").await?;
//!
//! // Unary exchange:
//! let reply = client.send_text("ping").await?;
//! println!("{}", reply.first_text().unwrap_or_default());
//!
//! // Streaming exchange:
//! let mut stream = client.send_text_stream("Write a haiku").await?;
//! while let Some(delta) = stream.next().await {
//!     print!("{}", delta?.text);
//! }
//! # Ok(())
//! # }
//! ```

mod a2a_client;
mod card_resolver;
mod sse;
mod transport;

pub use a2a_client::A2AClient;
pub use card_resolver::CardResolver;
pub use sse::{DeltaStream, StreamTranscript};
pub use transport::{HttpJsonTransport, JsonRpcTransport, Transport, TransportConfig};
