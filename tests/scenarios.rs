//! End-to-end request scenarios through the public `execute` entry point.

use bytes::Bytes;
use respkv::clock::ManualClock;
use respkv::commands::execute;
use respkv::protocol::{parse_request, RespValue};
use respkv::storage::{StorageEngine, Store};

const T0: u64 = 1_700_000_000_000;

fn request(parts: &[&[u8]]) -> Vec<u8> {
    RespValue::command(parts.iter().map(|p| Bytes::copy_from_slice(p))).serialize()
}

fn setup() -> (StorageEngine, ManualClock) {
    (StorageEngine::new(), ManualClock::new(T0))
}

#[test]
fn set_then_get() {
    let (store, clock) = setup();

    assert_eq!(
        execute(b"*3\r\n$3\r\nSET\r\n$3\r\nfoo\r\n$3\r\nbar\r\n", &store, &clock),
        b"+OK\r\n"
    );
    assert_eq!(
        execute(b"*2\r\n$3\r\nGET\r\n$3\r\nfoo\r\n", &store, &clock),
        b"$3\r\nbar\r\n"
    );
}

#[test]
fn key_without_ttl_never_expires() {
    let (store, clock) = setup();

    execute(&request(&[b"SET", b"k", b"v"]), &store, &clock);
    clock.advance(365 * 24 * 60 * 60 * 1000);

    assert_eq!(execute(&request(&[b"GET", b"k"]), &store, &clock), b"$1\r\nv\r\n");
}

#[test]
fn px_expiry_is_lazy() {
    let (store, clock) = setup();

    assert_eq!(
        execute(
            b"*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$2\r\nPX\r\n$3\r\n100\r\n",
            &store,
            &clock
        ),
        b"+OK\r\n"
    );
    let get = request(&[b"GET", b"k"]);

    clock.advance(50);
    assert_eq!(execute(&get, &store, &clock), b"$1\r\nv\r\n");

    clock.advance(100);
    assert_eq!(store.len(), 1);
    assert_eq!(execute(&get, &store, &clock), b"$-1\r\n");
    assert_eq!(store.len(), 0);
    assert_eq!(execute(&get, &store, &clock), b"$-1\r\n");
}

#[test]
fn px_expires_exactly_at_deadline() {
    let (store, clock) = setup();
    let get = request(&[b"GET", b"k"]);

    execute(&request(&[b"SET", b"k", b"v", b"px", b"100"]), &store, &clock);

    clock.set(T0 + 99);
    assert_eq!(execute(&get, &store, &clock), b"$1\r\nv\r\n");

    clock.set(T0 + 100);
    assert_eq!(execute(&get, &store, &clock), b"$-1\r\n");
}

#[test]
fn overwrite_keeps_second_value() {
    let (store, clock) = setup();

    execute(&request(&[b"SET", b"k", b"first"]), &store, &clock);
    execute(&request(&[b"SET", b"k", b"second"]), &store, &clock);

    assert_eq!(
        execute(&request(&[b"GET", b"k"]), &store, &clock),
        b"$6\r\nsecond\r\n"
    );
}

#[test]
fn overwrite_without_px_drops_ttl() {
    let (store, clock) = setup();

    execute(&request(&[b"SET", b"k", b"v", b"PX", b"10"]), &store, &clock);
    execute(&request(&[b"SET", b"k", b"w"]), &store, &clock);
    clock.advance(1_000);

    assert_eq!(execute(&request(&[b"GET", b"k"]), &store, &clock), b"$1\r\nw\r\n");
}

#[test]
fn echo_ping_and_missing_key() {
    let (store, clock) = setup();

    assert_eq!(
        execute(&request(&[b"ECHO", b"hello"]), &store, &clock),
        b"$5\r\nhello\r\n"
    );
    assert_eq!(execute(&request(&[b"PING"]), &store, &clock), b"+PONG\r\n");
    assert_eq!(
        execute(&request(&[b"GET", b"nope"]), &store, &clock),
        b"$-1\r\n"
    );
}

#[test]
fn unknown_command() {
    let (store, clock) = setup();

    assert_eq!(
        execute(&request(&[b"FOO", b"bar"]), &store, &clock),
        b"-ERR unknown command 'FOO'\r\n"
    );
}

#[test]
fn binary_payload_survives() {
    let (store, clock) = setup();
    let value: &[u8] = b"line one\r\nline two\r\n\x00\xff";

    let set = request(&[b"SET", b"bin", value]);
    let frame = parse_request(&set).unwrap();
    assert_eq!(frame.tokens[2], value);
    assert_eq!(frame.consumed, set.len());

    assert_eq!(execute(&set, &store, &clock), b"+OK\r\n");

    let mut expected = format!("${}\r\n", value.len()).into_bytes();
    expected.extend_from_slice(value);
    expected.extend_from_slice(b"\r\n");
    assert_eq!(execute(&request(&[b"GET", b"bin"]), &store, &clock), expected);
}

#[test]
fn malformed_requests_get_error_replies() {
    let (store, clock) = setup();

    let reply = execute(b"*2\r\n$3\r\nGET\r\n", &store, &clock);
    assert!(reply.starts_with(b"-ERR protocol error"));

    let reply = execute(b"PING\r\n", &store, &clock);
    assert!(reply.starts_with(b"-ERR protocol error"));

    assert!(store.is_empty());
}

#[test]
fn set_options_are_positional() {
    let (store, clock) = setup();

    assert_eq!(
        execute(&request(&[b"SET", b"zero", b"v", b"PX", b"0"]), &store, &clock),
        b"+OK\r\n"
    );
    assert_eq!(
        execute(b"*4\r\n$3\r\nSET\r\n$1\r\na\r\n$1\r\nv\r\n$2\r\nPX\r\n", &store, &clock),
        b"+OK\r\n"
    );
    assert_eq!(
        execute(&request(&[b"SET", b"b", b"v", b"EX", b"100"]), &store, &clock),
        b"+OK\r\n"
    );
    assert_eq!(store.len(), 3);

    assert_eq!(execute(&request(&[b"GET", b"zero"]), &store, &clock), b"$-1\r\n");
    assert_eq!(execute(&request(&[b"GET", b"a"]), &store, &clock), b"$1\r\nv\r\n");
    assert_eq!(execute(&request(&[b"GET", b"b"]), &store, &clock), b"$1\r\nv\r\n");

    clock.advance(100);
    assert_eq!(execute(&request(&[b"GET", b"b"]), &store, &clock), b"$-1\r\n");
}
