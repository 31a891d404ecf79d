//! Integration-level tests for the framing reassembly state machine, driven
//! only through its public API — mirrors `ethercrab/tests/*.rs`'s pattern of
//! exercising the crate from outside rather than via an inline
//! `#[cfg(test)]` module. Complements `src/framing.rs`'s own unit tests,
//! which check smaller internal slices of the same behaviour.

use pebble_protocol::framing::{self, Polled, Reassembler};

#[test]
fn two_framed_messages_glued_together_decode_in_order_byte_by_byte() {
    let mut first = framing::frame(0x000b, b"one");
    let second = framing::frame(0x0010, b"two");
    first.extend_from_slice(&second);

    let mut r = Reassembler::new();
    let mut decoded = Vec::new();
    for byte in &first {
        r.feed(std::slice::from_ref(byte));
        while let Ok(Polled::Frame { frame, .. }) = r.poll() {
            decoded.push(frame);
        }
    }

    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].endpoint, 0x000b);
    assert_eq!(decoded[0].payload, b"one");
    assert_eq!(decoded[1].endpoint, 0x0010);
    assert_eq!(decoded[1].payload, b"two");
}

#[test]
fn a_message_delivered_in_two_halves_only_decodes_once_complete() {
    let whole = framing::frame(0x0011, b"hello world");
    let (head, tail) = whole.split_at(whole.len() - 1);

    let mut r = Reassembler::new();
    r.feed(head);
    assert!(r.drain_frames().unwrap().is_empty());

    r.feed(tail);
    let frames = r.drain_frames().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].endpoint, 0x0011);
    assert_eq!(frames[0].payload, b"hello world");
}

#[test]
fn zero_length_frame_ends_the_read_even_with_more_bytes_buffered() {
    let mut buf = vec![0x00, 0x00, 0x17, 0x70]; // length 0, endpoint 0x1770
    buf.extend_from_slice(&framing::frame(0x0021, b"rest"));

    let mut r = Reassembler::new();
    r.feed(&buf);

    let first_drain = r.drain_frames().unwrap();
    assert_eq!(first_drain.len(), 1);
    assert_eq!(first_drain[0].endpoint, 0x1770);
    assert!(first_drain[0].payload.is_empty());

    let second_drain = r.drain_frames().unwrap();
    assert_eq!(second_drain.len(), 1);
    assert_eq!(second_drain[0].endpoint, 0x0021);
    assert_eq!(second_drain[0].payload, b"rest");
}
