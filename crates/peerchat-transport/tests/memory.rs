//! Integration tests for the in-process memory transport.

use peerchat_transport::{
    MemoryNetwork, PeerId, PeerTransport, TransportError, TransportEvent,
};
use tokio::sync::mpsc::UnboundedReceiver;

// =========================================================================
// Helpers
// =========================================================================

fn next(rx: &mut UnboundedReceiver<TransportEvent>) -> TransportEvent {
    rx.try_recv().expect("expected a queued transport event")
}

fn assert_quiet(rx: &mut UnboundedReceiver<TransportEvent>) {
    assert!(rx.try_recv().is_err(), "expected no further events");
}

fn pid(id: &str) -> PeerId {
    PeerId::new(id)
}

// =========================================================================
// Identity
// =========================================================================

#[test]
fn test_open_with_desired_id_assigns_it() {
    let net = MemoryNetwork::new();
    let (mut t, mut rx) = net.endpoint();

    t.open(Some(&pid("host")));

    assert!(matches!(next(&mut rx), TransportEvent::IdentityAssigned(id) if id == pid("host")));
    assert_eq!(t.local_id(), Some(&pid("host")));
    assert!(!t.is_disconnected());
    assert!(net.is_registered(&pid("host")));
}

#[test]
fn test_open_without_id_generates_random_hex() {
    let net = MemoryNetwork::new();
    let (mut t, mut rx) = net.endpoint();

    t.open(None);

    match next(&mut rx) {
        TransportEvent::IdentityAssigned(id) => {
            assert_eq!(id.as_str().len(), 32);
            assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_open_taken_id_reports_unavailable() {
    let net = MemoryNetwork::new();
    let (mut first, _rx1) = net.endpoint();
    let (mut second, mut rx2) = net.endpoint();
    first.open(Some(&pid("dup")));

    second.open(Some(&pid("dup")));

    match next(&mut rx2) {
        TransportEvent::IdentityError(err) => assert!(err.is_unavailable_id()),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(second.local_id().is_none());
    assert!(second.is_disconnected());
}

#[test]
fn test_destroy_releases_identity() {
    let net = MemoryNetwork::new();
    let (mut t, _rx) = net.endpoint();
    t.open(Some(&pid("gone")));

    t.destroy();

    assert!(!net.is_registered(&pid("gone")));
    assert!(t.local_id().is_none());
    assert!(t.is_disconnected());
}

#[test]
fn test_disconnect_then_reconnect_restores_identity() {
    let net = MemoryNetwork::new();
    let (mut t, mut rx) = net.endpoint();
    t.open(Some(&pid("c1")));
    let _ = next(&mut rx);

    net.disconnect_peer(&pid("c1"));
    assert!(matches!(next(&mut rx), TransportEvent::Disconnected));
    assert!(t.is_disconnected());

    t.reconnect();
    assert!(matches!(next(&mut rx), TransportEvent::IdentityAssigned(id) if id == pid("c1")));
    assert!(!t.is_disconnected());
}

// =========================================================================
// Links
// =========================================================================

#[test]
fn test_connect_opens_both_ends() {
    let net = MemoryNetwork::new();
    let (mut host, mut host_rx) = net.endpoint();
    let (mut client, mut client_rx) = net.endpoint();
    host.open(Some(&pid("h")));
    client.open(Some(&pid("c")));
    let _ = next(&mut host_rx);
    let _ = next(&mut client_rx);

    let link = client.connect(&pid("h")).unwrap();

    match next(&mut client_rx) {
        TransportEvent::LinkOpened { link: l, remote, inbound } => {
            assert_eq!(l, link);
            assert_eq!(remote, pid("h"));
            assert!(!inbound);
        }
        other => panic!("unexpected event {other:?}"),
    }
    match next(&mut host_rx) {
        TransportEvent::LinkOpened { remote, inbound, .. } => {
            assert_eq!(remote, pid("c"));
            assert!(inbound);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(net.link_count(), 1);
}

#[test]
fn test_send_delivers_to_remote_end_in_order() {
    let net = MemoryNetwork::new();
    let (mut host, mut host_rx) = net.endpoint();
    let (mut client, mut client_rx) = net.endpoint();
    host.open(Some(&pid("h")));
    client.open(Some(&pid("c")));
    let _ = next(&mut host_rx);
    let _ = next(&mut client_rx);
    let link = client.connect(&pid("h")).unwrap();
    let _ = next(&mut client_rx);
    let host_link = match next(&mut host_rx) {
        TransportEvent::LinkOpened { link, .. } => link,
        other => panic!("unexpected event {other:?}"),
    };

    client.send(link, b"one").unwrap();
    client.send(link, b"two").unwrap();

    for expected in [&b"one"[..], &b"two"[..]] {
        match next(&mut host_rx) {
            TransportEvent::LinkData { link, data } => {
                assert_eq!(link, host_link);
                assert_eq!(data, expected);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_quiet(&mut client_rx);
}

#[test]
fn test_connect_to_unknown_peer_errors_then_closes() {
    let net = MemoryNetwork::new();
    let (mut client, mut rx) = net.endpoint();
    client.open(Some(&pid("c")));
    let _ = next(&mut rx);

    let link = client.connect(&pid("nobody")).unwrap();

    assert!(matches!(
        next(&mut rx),
        TransportEvent::LinkError { link: l, error: TransportError::PeerUnavailable(_) } if l == link
    ));
    assert!(matches!(next(&mut rx), TransportEvent::LinkClosed { link: l } if l == link));
}

#[test]
fn test_connect_without_identity_fails() {
    let net = MemoryNetwork::new();
    let (mut client, _rx) = net.endpoint();

    let result = client.connect(&pid("h"));

    assert!(matches!(result, Err(TransportError::NotOpen)));
}

#[test]
fn test_send_on_closed_link_fails() {
    let net = MemoryNetwork::new();
    let (mut host, _host_rx) = net.endpoint();
    let (mut client, _client_rx) = net.endpoint();
    host.open(Some(&pid("h")));
    client.open(Some(&pid("c")));
    let link = client.connect(&pid("h")).unwrap();

    client.close_link(link);
    let result = client.send(link, b"late");

    assert!(matches!(result, Err(TransportError::LinkNotReady(l)) if l == link));
}

#[test]
fn test_sever_closes_both_ends() {
    let net = MemoryNetwork::new();
    let (mut host, mut host_rx) = net.endpoint();
    let (mut client, mut client_rx) = net.endpoint();
    host.open(Some(&pid("h")));
    client.open(Some(&pid("c")));
    let link = client.connect(&pid("h")).unwrap();
    while host_rx.try_recv().is_ok() {}
    while client_rx.try_recv().is_ok() {}

    net.sever(&pid("c"), &pid("h"));

    assert!(matches!(next(&mut client_rx), TransportEvent::LinkClosed { link: l } if l == link));
    assert!(matches!(next(&mut host_rx), TransportEvent::LinkClosed { .. }));
    assert_eq!(net.link_count(), 0);
}

#[test]
fn test_drop_closes_links_for_remote() {
    let net = MemoryNetwork::new();
    let (mut host, mut host_rx) = net.endpoint();
    let (mut client, _client_rx) = net.endpoint();
    host.open(Some(&pid("h")));
    client.open(Some(&pid("c")));
    client.connect(&pid("h")).unwrap();
    while host_rx.try_recv().is_ok() {}

    drop(client);

    assert!(matches!(next(&mut host_rx), TransportEvent::LinkClosed { .. }));
    assert!(!net.is_registered(&pid("c")));
}
