//! Integration-level tests for the connection core, driven only through its
//! public API with an in-process `Transport` test double — the same role
//! `ethercrab/tests/*.rs` plays against `ethercrab::Client`, exercised here
//! from outside the crate rather than `src/connection.rs`'s own inline
//! `#[cfg(test)]` module (which additionally has access to private fields).

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use pebble_protocol::error::Error;
use pebble_protocol::event_bus::{Event, EventKey};
use pebble_protocol::packets::ping_pong::{PingPong, PingPongKind};
use pebble_protocol::registry::{PacketKind, WatchEvent};
use pebble_protocol::transport::{SendTarget, Transport, TransportMessage};
use pebble_protocol::{endpoint, framing, Connection, ConnectionConfig};

/// Replays a fixed queue of reads and records every write, so the
/// connection core can be driven without a real transport.
struct ScriptedTransport {
    inbound: Mutex<VecDeque<TransportMessage>>,
    outbound: Mutex<Vec<Vec<u8>>>,
    connected: bool,
}

impl ScriptedTransport {
    fn new(inbound: Vec<TransportMessage>) -> Self {
        Self {
            inbound: Mutex::new(inbound.into()),
            outbound: Mutex::new(Vec::new()),
            connected: false,
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn must_initialize(&self) -> bool {
        false
    }

    async fn connect(&mut self) -> Result<(), Error> {
        self.connected = true;
        Ok(())
    }

    fn connected(&self) -> bool {
        self.connected
    }

    async fn read_packet(&mut self) -> Result<TransportMessage, Error> {
        self.inbound.lock().unwrap().pop_front().ok_or(Error::NotConnected)
    }

    async fn send_packet(&mut self, framed: &[u8], _target: SendTarget) -> Result<(), Error> {
        self.outbound.lock().unwrap().push(framed.to_vec());
        Ok(())
    }
}

#[tokio::test]
async fn a_watch_frame_read_off_the_transport_dispatches_through_the_event_bus() {
    let ping = PingPong {
        kind: PingPongKind::Ping,
        cookie: 42,
    };
    let framed = framing::frame(endpoint::PING_PONG, &ping.to_bytes());
    let transport = ScriptedTransport::new(vec![TransportMessage::Watch(framed)]);
    let conn = Connection::new(transport, ConnectionConfig::default());
    conn.connect().await.unwrap();

    let waiter = conn.read_from_endpoint(PacketKind::PingPong, Duration::from_secs(1));
    conn.pump_reader().await.unwrap();
    let event = waiter.await.unwrap();
    match event {
        Event::Watch(WatchEvent::PingPong(p)) => assert_eq!(p, ping),
        other => panic!("expected a PingPong watch event, got {other:?}"),
    }
}

#[tokio::test]
async fn a_queue_registered_before_the_broadcast_receives_it_one_registered_after_does_not() {
    let ping = PingPong {
        kind: PingPongKind::Pong,
        cookie: 1,
    };
    let framed = framing::frame(endpoint::PING_PONG, &ping.to_bytes());
    let transport = ScriptedTransport::new(vec![TransportMessage::Watch(framed)]);
    let conn = Connection::new(transport, ConnectionConfig::default());
    conn.connect().await.unwrap();

    let mut early_queue = conn.get_endpoint_queue(PacketKind::PingPong);
    conn.pump_reader().await.unwrap();
    let mut late_queue = conn.get_endpoint_queue(PacketKind::PingPong);

    let seen = early_queue.get(Duration::from_millis(50)).await;
    assert!(matches!(seen, Ok(Event::Watch(WatchEvent::PingPong(_)))));
    assert!(late_queue.get(Duration::from_millis(50)).await.is_err());
}

#[tokio::test]
async fn sending_a_packet_frames_it_and_hands_it_to_the_transport() {
    let transport = ScriptedTransport::new(vec![]);
    let conn = Connection::new(transport, ConnectionConfig::default());
    conn.connect().await.unwrap();

    let mut raw_outbound = conn.raw_outbound_queue();
    let ping = PingPong {
        kind: PingPongKind::Ping,
        cookie: 99,
    };
    conn.send_packet(endpoint::PING_PONG, &ping).await.unwrap();

    let event = raw_outbound.get(Duration::from_millis(50)).await.unwrap();
    match event {
        Event::RawOutbound(bytes) => assert_eq!(&*bytes, ping.to_bytes().as_slice()),
        other => panic!("expected a raw outbound event, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_disconnect_is_surfaced_and_clears_connected() {
    let transport = ScriptedTransport::new(vec![]);
    let conn = Connection::new(transport, ConnectionConfig::default());
    conn.connect().await.unwrap();
    assert!(conn.connected());

    let err = conn.pump_reader().await.unwrap_err();
    assert!(matches!(err, Error::NotConnected));
    assert!(!conn.connected());
}

/// Not a broadcast assertion by itself, but confirms `EventKey::Watch`
/// equality holds the way the event bus depends on for its subscriber map.
#[test]
fn event_key_for_the_same_packet_kind_compares_equal() {
    assert_eq!(
        EventKey::Watch(PacketKind::PingPong),
        EventKey::Watch(PacketKind::PingPong)
    );
}
