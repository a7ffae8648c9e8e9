use client::{Client, Config, StatusSink};
use frame::crc::crc16_bytes;
use frame::Frame;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use transport::memory::{LineTap, MemoryDevice, MemoryPin};
use transport::{LineTiming, Rs485Link};

const READ_40001_X2: [u8; 8] = [0x01, 0x03, 0x9C, 0x41, 0x00, 0x02, 0xBA, 0x4F];
const ANSWER_40001_X2: [u8; 9] = [0x01, 0x03, 0x04, 0x00, 0x11, 0x00, 0x22, 0x2A, 0x2F];

#[derive(Clone, Default)]
struct Lines(Arc<Mutex<Vec<String>>>);

impl Lines {
    fn get(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl StatusSink for Lines {
    fn append(&mut self, line: &str) {
        self.0.lock().unwrap().push(line.to_owned());
    }
}

struct Bench {
    tap: LineTap,
    link: Rs485Link<MemoryDevice, MemoryPin>,
    client: Client<MemoryDevice, MemoryPin>,
    status: Lines,
}

impl Bench {
    fn new() -> Bench {
        let tap = LineTap::new();
        let timing = LineTiming::from_parts(9600, 8, false, 1, 1.0);
        let (link, handler) = Rs485Link::build(tap.device(), tap.pin(), timing, 16, "bench");
        let status = Lines::default();
        let mut client = Client::new(Config::new(1).unwrap(), link.clone(), handler)
            .with_status(status.clone());
        client.holding_registers_mut().set(40001, 0x0011);
        client.holding_registers_mut().set(40002, 0x0022);
        Bench {
            tap,
            link,
            client,
            status,
        }
    }

    async fn exchange(&mut self, request: &[u8]) -> Vec<u8> {
        self.tap.inject(request);
        self.link.receive_poll().await.unwrap();
        self.client.poll_messages().await;
        self.tap.take_written()
    }
}

fn with_crc(pdu: &[u8]) -> Vec<u8> {
    let mut frame = pdu.to_vec();
    frame.extend_from_slice(&crc16_bytes(pdu));
    frame
}

#[tokio::test(start_paused = true)]
async fn read_holding_registers() {
    let mut bench = Bench::new();
    assert_eq!(bench.exchange(&READ_40001_X2).await, ANSWER_40001_X2);
    assert!(bench.status.get().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unset_registers_read_zero() {
    let mut bench = Bench::new();
    let request = Frame::read_holding_registers(1, 40010, 2).unwrap().to_bytes();
    let expected = with_crc(&[0x01, 0x03, 0x04, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(bench.exchange(&request).await, expected);
}

#[tokio::test(start_paused = true)]
async fn broadcast_gets_no_response() {
    let mut bench = Bench::new();
    let request = Frame::read_holding_registers(0, 40001, 2).unwrap().to_bytes();
    assert!(bench.exchange(&request).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn other_slaves_are_ignored() {
    let mut bench = Bench::new();
    let request = Frame::read_holding_registers(2, 40001, 2).unwrap().to_bytes();
    assert!(bench.exchange(&request).await.is_empty());
    assert!(bench.status.get().is_empty());
}

#[tokio::test(start_paused = true)]
async fn recovers_after_garbage_byte() {
    let mut bench = Bench::new();
    let mut request = vec![0xFFu8];
    request.extend_from_slice(&READ_40001_X2);
    assert_eq!(bench.exchange(&request).await, ANSWER_40001_X2);
}

#[tokio::test(start_paused = true)]
async fn too_much_garbage_is_reported() {
    let mut bench = Bench::new();
    let mut request = vec![0xFFu8; 11];
    request.extend_from_slice(&READ_40001_X2);
    assert!(bench.exchange(&request).await.is_empty());

    let status = bench.status.get();
    assert_eq!(status.len(), 1);
    assert!(status[0].starts_with("error: codec error"));

    // the line is usable again
    assert_eq!(bench.exchange(&READ_40001_X2).await, ANSWER_40001_X2);
}

#[tokio::test(start_paused = true)]
async fn start_above_limit_is_reported() {
    let mut bench = Bench::new();
    let request = Frame::read_holding_registers(1, 50000, 1).unwrap().to_bytes();
    assert!(bench.exchange(&request).await.is_empty());
    assert_eq!(bench.status.get(), vec!["error: register out of range: 50000"]);
}

#[tokio::test(start_paused = true)]
async fn read_coils() {
    let mut bench = Bench::new();
    bench.client.coils_mut().set(0, true);
    bench.client.coils_mut().set(2, true);

    let request = Frame::read_coils(1, 0, 4).unwrap().to_bytes();
    let expected = with_crc(&[0x01, 0x01, 0x01, 0x05]);
    assert_eq!(bench.exchange(&request).await, expected);
}

#[tokio::test(start_paused = true)]
async fn back_to_back_requests() {
    let mut bench = Bench::new();
    let mut request = READ_40001_X2.to_vec();
    request.extend_from_slice(&READ_40001_X2);

    let mut expected = ANSWER_40001_X2.to_vec();
    expected.extend_from_slice(&ANSWER_40001_X2);
    assert_eq!(bench.exchange(&request).await, expected);
}

#[tokio::test(start_paused = true)]
async fn incomplete_request_is_dropped() {
    let mut bench = Bench::new();
    assert!(bench.exchange(&READ_40001_X2[..5]).await.is_empty());
    // the tail alone does not complete the earlier frame
    assert!(bench.exchange(&READ_40001_X2[5..]).await.is_empty());
    assert_eq!(bench.exchange(&READ_40001_X2).await, ANSWER_40001_X2);
    assert_eq!(
        bench.status.get(),
        vec![
            "error: frame error: frame too short, 5 byte(s) dropped",
            "error: frame error: frame too short, 3 byte(s) dropped",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn corrupted_request_is_reported() {
    let mut bench = Bench::new();
    let mut request = READ_40001_X2;
    request[7] ^= 0x01;
    assert!(bench.exchange(&request).await.is_empty());

    // every shift fails until too few bytes are left
    let status = bench.status.get();
    assert_eq!(status.len(), 1);
    assert!(status[0].starts_with("error: frame error: frame too short"));
}

#[tokio::test(start_paused = true)]
async fn failed_send_is_reported() {
    let mut bench = Bench::new();
    bench.tap.inject(&READ_40001_X2);
    bench.link.receive_poll().await.unwrap();
    bench.tap.fail_next_io(std::io::ErrorKind::BrokenPipe);
    assert_eq!(bench.client.poll_messages().await, 1);
    assert!(bench.tap.take_written().is_empty());

    let status = bench.status.get();
    assert_eq!(status.len(), 1);
    assert!(status[0].starts_with("error: transport error"));

    // still serving
    assert_eq!(bench.exchange(&READ_40001_X2).await, ANSWER_40001_X2);
}

#[tokio::test(start_paused = true)]
async fn run_loop_serves_polled_requests() {
    let Bench {
        tap,
        link,
        mut client,
        status,
    } = Bench::new();
    let poller = link.spawn_polling(Duration::from_millis(1));

    tap.inject(&READ_40001_X2);
    let wait_answer = async {
        while tap.written().is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    };
    tokio::select! {
        _ = client.run_loop() => unreachable!(),
        _ = wait_answer => {}
    }
    poller.abort();

    assert_eq!(tap.written(), ANSWER_40001_X2);
    assert_eq!(status.get(), vec!["slave 1 ready"]);
}
