//! Telemetry uploader tests.
//!
//! The first group talks to a real loopback TCP server through
//! [`StdNetStack`] and checks the bytes on the wire and the timeout/refusal
//! mapping.  The second group uses a scripted [`NetStack`] to check that
//! the connection is closed on every exit path.

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use hazardmon::adapters::net::StdNetStack;
use hazardmon::app::ports::{Connection, NetStack, TelemetryPort};
use hazardmon::config::MonitorConfig;
use hazardmon::error::UploadError;
use hazardmon::telemetry::{TelemetryUploader, UploadRecord};

fn record() -> UploadRecord {
    UploadRecord {
        timestamp_ms: 16_200,
        gas_percent: 55.26,
        flame_code: 1,
        alert_code: 1,
        temperature_c: 51.7,
    }
}

fn loopback_config(port: u16, timeout_ms: u32) -> MonitorConfig {
    MonitorConfig {
        telemetry_host: "127.0.0.1".try_into().unwrap(),
        telemetry_port: port,
        api_key: "TESTKEY".try_into().unwrap(),
        upload_timeout_ms: timeout_ms,
        ..MonitorConfig::default()
    }
}

/// Read from `stream` until the blank line that ends an HTTP request.
fn read_request(stream: &mut impl Read) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 256];
    while !buf.ends_with(b"\r\n\r\n") {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    buf
}

// ── Loopback ──────────────────────────────────────────────────

#[test]
fn sends_exact_request_and_reads_response() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut s, _) = listener.accept().unwrap();
        let req = read_request(&mut s);
        s.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\n7").unwrap();
        req
    });

    let mut uploader = TelemetryUploader::new(StdNetStack::new(), &loopback_config(port, 2_000));
    let ack = uploader.upload(&record()).unwrap();
    let req = server.join().unwrap();

    assert_eq!(
        String::from_utf8(req).unwrap(),
        "GET /update?api_key=TESTKEY&field1=55.3&field2=1&field3=1&field4=51.7 HTTP/1.1\r\n\
         Host: 127.0.0.1\r\n\
         Connection: close\r\n\
         \r\n"
    );
    assert!(ack.bytes_received > 0 && ack.bytes_received <= 128);
}

#[test]
fn refused_connection_is_connect_error() {
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let mut uploader = TelemetryUploader::new(StdNetStack::new(), &loopback_config(port, 1_000));
    assert_eq!(uploader.upload(&record()), Err(UploadError::Connect));
}

#[test]
fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut s, _) = listener.accept().unwrap();
        let _ = read_request(&mut s);
        // Hold the socket open without answering.
        thread::sleep(Duration::from_millis(800));
    });

    let mut uploader = TelemetryUploader::new(StdNetStack::new(), &loopback_config(port, 200));
    assert_eq!(uploader.upload(&record()), Err(UploadError::Timeout));
    server.join().unwrap();
}

// ── Scripted stack ────────────────────────────────────────────

#[derive(Default)]
struct Log {
    opened: u32,
    closed: u32,
    sent: Vec<u8>,
}

struct FakeNet {
    log: Rc<RefCell<Log>>,
    resolve: Result<SocketAddr, UploadError>,
    send: Result<(), UploadError>,
}

struct FakeConn {
    log: Rc<RefCell<Log>>,
    send: Result<(), UploadError>,
}

impl NetStack for FakeNet {
    type Conn = FakeConn;

    fn resolve(&mut self, _host: &str, _port: u16) -> Result<SocketAddr, UploadError> {
        self.resolve
    }

    fn open(&mut self, _addr: SocketAddr, _timeout_ms: u32) -> Result<FakeConn, UploadError> {
        self.log.borrow_mut().opened += 1;
        Ok(FakeConn {
            log: Rc::clone(&self.log),
            send: self.send,
        })
    }
}

impl Connection for FakeConn {
    fn send_all(&mut self, data: &[u8]) -> Result<(), UploadError> {
        self.send?;
        self.log.borrow_mut().sent.extend_from_slice(data);
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, UploadError> {
        let reply = b"HTTP/1.1 200 OK\r\n\r\n";
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed += 1;
    }
}

fn fake(resolve: Result<SocketAddr, UploadError>, send: Result<(), UploadError>) -> (FakeNet, Rc<RefCell<Log>>) {
    let log = Rc::new(RefCell::new(Log::default()));
    (
        FakeNet {
            log: Rc::clone(&log),
            resolve,
            send,
        },
        log,
    )
}

fn any_addr() -> SocketAddr {
    "10.0.0.1:80".parse().unwrap()
}

#[test]
fn resolve_failure_opens_nothing() {
    let (net, log) = fake(Err(UploadError::Resolve), Ok(()));
    let mut uploader = TelemetryUploader::new(net, &MonitorConfig::default());
    assert_eq!(uploader.upload(&record()), Err(UploadError::Resolve));
    assert_eq!(log.borrow().opened, 0);
}

#[test]
fn send_failure_still_closes() {
    let (net, log) = fake(Ok(any_addr()), Err(UploadError::Send));
    let mut uploader = TelemetryUploader::new(net, &MonitorConfig::default());
    assert_eq!(uploader.upload(&record()), Err(UploadError::Send));
    assert_eq!(log.borrow().opened, 1);
    assert_eq!(log.borrow().closed, 1);
}

#[test]
fn success_closes_once_and_sends_one_request() {
    let (net, log) = fake(Ok(any_addr()), Ok(()));
    let mut uploader = TelemetryUploader::new(net, &MonitorConfig::default());
    let ack = uploader.upload(&record()).unwrap();
    assert_eq!(ack.bytes_received, 19);
    let log = log.borrow();
    assert_eq!(log.closed, 1);
    let sent = String::from_utf8(log.sent.clone()).unwrap();
    assert!(sent.starts_with("GET /update?api_key="));
    assert_eq!(sent.matches("GET ").count(), 1);
}
