//! A host and two clients chatting over the in-process network.
//!
//! Run with `RUST_LOG=debug cargo run -p relay-room` to watch the session
//! layer at work: join debouncing, relay, a dropped host link and the
//! reconnect that follows.

use std::time::Duration;

use peerchat::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

fn participant(network: &MemoryNetwork, config: SessionConfig) -> PeerChat {
    let (transport, events) = network.endpoint();
    PeerChat::builder()
        .config(config)
        .spawn(transport, events, MemoryStore::new())
}

async fn join(
    network: &MemoryNetwork,
    host_id: &PeerId,
    name: &str,
    availability: AvailabilityMonitor,
) -> Result<PeerChat, PeerChatError> {
    let (transport, events) = network.endpoint();
    let config = SessionConfig {
        reconnect_interval: Duration::from_secs(1),
        ..SessionConfig::client()
    };
    let client = PeerChat::builder()
        .config(config)
        .availability(availability)
        .spawn(transport, events, MemoryStore::new());

    client.wait_for(|v| v.peer_id.is_some()).await?;
    client.set_name(name).await?;
    client.connect_to_host(host_id.clone()).await?;
    client.wait_for(|v| v.connected_to_host).await?;
    Ok(client)
}

fn said(view: &SessionView, text: &str) -> bool {
    view.messages
        .iter()
        .any(|m| matches!(&m.payload, Payload::Chat { content } if content == text))
}

fn render(message: &Envelope) -> String {
    match &message.payload {
        Payload::Chat { content } => format!("<{}> {content}", message.sender_name),
        Payload::Status {
            status: ConnectionStatus::Connected,
            client_name,
            ..
        } => format!("* {client_name} joined"),
        Payload::Status {
            status: ConnectionStatus::Disconnected,
            client_name,
            ..
        } => format!("* {client_name} left"),
        Payload::Name { name } => format!("* {} is now {name}", message.sender_name),
        Payload::AllHistory { messages } => format!("* {} replayed messages", messages.len()),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let network = MemoryNetwork::new();

    let host = participant(&network, SessionConfig::host());
    let host_id = host
        .wait_for(|v| v.peer_id.is_some())
        .await?
        .peer_id
        .ok_or("host has no identity")?;
    println!("host is {host_id}");

    let alice_network = AvailabilitySwitch::new(true);
    let alice = join(&network, &host_id, "Alice", alice_network.monitor()).await?;
    let bob = join(&network, &host_id, "Bob", AvailabilitySwitch::new(true).monitor()).await?;

    alice.send_chat("hi bob").await?;
    bob.wait_for(|v| said(v, "hi bob")).await?;
    bob.send_chat("hey alice").await?;
    alice.wait_for(|v| said(v, "hey alice")).await?;

    // Alice drops off the network and loses her link to the host.
    alice_network.set(false);
    let alice_id = alice.view().peer_id.ok_or("alice has no identity")?;
    network.sever(&alice_id, &host_id);
    alice.wait_for(|v| !v.connected_to_host).await?;
    println!("alice lost her host link");

    tokio::time::sleep(Duration::from_secs(2)).await;
    alice_network.set(true);
    alice.wait_for(|v| v.connected_to_host).await?;
    println!("alice is back");

    bob.shutdown().await?;
    host.wait_for(|v| v.connections.len() == 1).await?;

    println!("--- host transcript ---");
    for message in host.view().messages {
        println!("{}", render(&message));
    }

    alice.shutdown().await?;
    host.shutdown().await?;
    Ok(())
}
