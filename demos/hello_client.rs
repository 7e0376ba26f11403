//! Hello Client: resolve an agent, print its card, talk to it.
//!
//! Run the echo agent first:
//! ```sh
//! cargo run --example echo_agent
//! ```
//!
//! Then in another terminal:
//! ```sh
//! cargo run --example hello_client
//! ```
//!
//! The client asks for the agent's port (default 5001).

use std::io::{self, BufRead, Write};

use a2a_bridge::client::A2AClient;
use a2a_bridge::render::render_card;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 5001;

fn ask_port() -> Result<u16, Box<dyn std::error::Error>> {
    print!("Agent port [{DEFAULT_PORT}]: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    Ok(line.parse()?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let port = ask_port()?;
    let base = format!("http://localhost:{port}/echo");

    // Resolves /.well-known/agent-card.json and talks to the card's url.
    let client = A2AClient::from_url(&base).await?;
    if let Some(card) = client.get_card() {
        println!("{}", render_card(card));
    }

    // Unary exchange.
    let reply = client.send_text_in_context("conv-123", "ping").await?;
    println!(
        "Unary reply: {} (contextId: {})",
        reply.first_text().unwrap_or_default(),
        reply.context_id.as_deref().unwrap_or("-")
    );

    // Streaming exchange, printed as it arrives.
    print!("Streamed reply: ");
    let mut stream = client.send_text_stream("hello from a2a-bridge").await?;
    while let Some(delta) = stream.next().await {
        match delta {
            Ok(delta) => {
                print!("{}", delta.text);
                io::stdout().flush()?;
            }
            Err(e) => {
                println!();
                eprintln!("stream failed: {e}");
                return Ok(());
            }
        }
    }
    println!();

    Ok(())
}
