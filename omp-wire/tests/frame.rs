use std::collections::VecDeque;
use std::time::Duration;

use omp_wire::{FrameReader, MAX_STALE_READS, Transport, TransportError};
use tokio::time::{Instant, sleep, sleep_until};

const BUF:     usize    = 8;
const TIMEOUT: Duration = Duration::from_millis(100);

// ── Scripted transport ────────────────────────────────────────────────────────

/// Delivers pre-scheduled chunks at fixed instants on tokio's clock.
struct Scripted {
    start:        Instant,
    chunks:       VecDeque<(Instant, Vec<u8>)>,
    close_at_end: bool,
    open:         bool,
    written:      Vec<u8>,
}

impl Scripted {
    fn new() -> Self {
        Self {
            start:        Instant::now(),
            chunks:       VecDeque::new(),
            close_at_end: false,
            open:         true,
            written:      Vec::new(),
        }
    }

    fn chunk_at(mut self, after: Duration, bytes: &[u8]) -> Self {
        self.chunks.push_back((self.start + after, bytes.to_vec()));
        self
    }

    fn then_close(mut self) -> Self {
        self.close_at_end = true;
        self
    }
}

impl Transport for Scripted {
    async fn open(&mut self, _host: &str, _port: u16) -> Result<(), TransportError> {
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.written.extend_from_slice(data);
        Ok(())
    }

    async fn read_some(&mut self, max: usize, wait: Duration) -> Result<Vec<u8>, TransportError> {
        let deadline = Instant::now() + wait;
        let ready_at = match self.chunks.front() {
            Some((at, _)) => *at,
            None if self.close_at_end => return Err(TransportError::Closed),
            None => {
                sleep(wait).await;
                return Ok(Vec::new());
            }
        };
        if ready_at > deadline {
            sleep(wait).await;
            return Ok(Vec::new());
        }
        sleep_until(ready_at).await;

        let (_, chunk) = self.chunks.front_mut().expect("front checked above");
        let n = max.min(chunk.len());
        let out: Vec<u8> = chunk.drain(..n).collect();
        if chunk.is_empty() {
            self.chunks.pop_front();
        }
        Ok(out)
    }
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}

// ── Reassembly ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn full_reads_plus_short_tail_reassemble_exactly() {
    for full in 1..=4usize {
        for tail in 0..BUF {
            let mut script   = Scripted::new();
            let mut expected = Vec::new();
            for i in 0..full {
                let chunk = pattern(BUF, (i * BUF) as u8);
                script = script.chunk_at(Duration::from_millis(i as u64), &chunk);
                expected.extend_from_slice(&chunk);
            }
            if tail > 0 {
                let chunk = pattern(tail, 200);
                script = script.chunk_at(Duration::from_millis(full as u64), &chunk);
                expected.extend_from_slice(&chunk);
            }

            let mut reader = FrameReader::new(script, BUF, TIMEOUT);
            let started = Instant::now();
            let message = reader.read_message().await.unwrap();

            assert_eq!(message, expected, "full={full} tail={tail}");
            let bound = TIMEOUT * (full as u32 + 1);
            assert!(started.elapsed() <= bound, "full={full} tail={tail} took {:?}", started.elapsed());
        }
    }
}

#[tokio::test(start_paused = true)]
async fn short_first_read_returns_without_waiting() {
    let script = Scripted::new().chunk_at(Duration::ZERO, b"<x/>");
    let mut reader = FrameReader::new(script, BUF, TIMEOUT);

    let started = Instant::now();
    assert_eq!(reader.read_message().await.unwrap(), b"<x/>");
    assert!(started.elapsed() < TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn exact_multiple_costs_one_extra_timeout() {
    let script = Scripted::new().chunk_at(Duration::ZERO, &pattern(BUF * 2, 1));
    let mut reader = FrameReader::new(script, BUF, TIMEOUT);

    let started = Instant::now();
    assert_eq!(reader.read_message().await.unwrap(), pattern(BUF * 2, 1));
    assert_eq!(started.elapsed(), TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn silence_yields_empty_message_after_one_timeout() {
    let mut reader = FrameReader::new(Scripted::new(), BUF, TIMEOUT);

    let started = Instant::now();
    assert!(reader.read_message().await.unwrap().is_empty());
    assert_eq!(started.elapsed(), TIMEOUT);
}

#[tokio::test(start_paused = true)]
async fn slow_fragments_within_timeout_are_joined() {
    let half = TIMEOUT / 2;
    let script = Scripted::new()
        .chunk_at(Duration::ZERO, &pattern(BUF, 0))
        .chunk_at(half, &pattern(BUF, 50))
        .chunk_at(half * 2, b"end");
    let mut reader = FrameReader::new(script, BUF, TIMEOUT);

    let mut expected = pattern(BUF, 0);
    expected.extend(pattern(BUF, 50));
    expected.extend_from_slice(b"end");
    assert_eq!(reader.read_message().await.unwrap(), expected);
}

// ── Stale bytes ───────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn late_tail_is_discarded_before_next_request() {
    let script = Scripted::new()
        .chunk_at(Duration::ZERO, &pattern(BUF, 0))
        .chunk_at(TIMEOUT * 3, b"late");
    let mut reader = FrameReader::new(script, BUF, TIMEOUT);

    assert_eq!(reader.read_message().await.unwrap(), pattern(BUF, 0));

    sleep(TIMEOUT * 3).await;
    reader.write_request(b"<help/>").await.unwrap();
    assert!(reader.inner().chunks.is_empty(), "late tail must be consumed");
    assert_eq!(reader.inner().written, b"<help/>");
    assert!(reader.read_message().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn endless_leftovers_do_not_hold_up_the_next_request() {
    let mut script = Scripted::new();
    for seed in 0..(MAX_STALE_READS as u8 + 8) {
        script = script.chunk_at(Duration::ZERO, &pattern(BUF, seed));
    }
    let mut reader = FrameReader::new(script, BUF, TIMEOUT);
    let started = Instant::now();

    reader.write_request(b"<help/>").await.unwrap();

    assert_eq!(reader.inner().written, b"<help/>");
    assert_eq!(reader.inner().chunks.len(), 8);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

// ── Peer closure ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn close_mid_message_reports_truncation() {
    let script = Scripted::new().chunk_at(Duration::ZERO, &pattern(BUF, 0)).then_close();
    let mut reader = FrameReader::new(script, BUF, TIMEOUT);

    match reader.read_message().await {
        Err(TransportError::Truncated { received }) => assert_eq!(received, BUF),
        other => panic!("expected truncation, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn close_before_first_byte_reports_truncation() {
    let mut reader = FrameReader::new(Scripted::new().then_close(), BUF, TIMEOUT);

    let err = reader.read_message().await.unwrap_err();
    assert!(matches!(err, TransportError::Truncated { received: 0 }));
    assert!(err.is_closed());
}

#[tokio::test(start_paused = true)]
async fn zero_buffer_size_is_clamped() {
    let reader = FrameReader::new(Scripted::new(), 0, TIMEOUT);
    assert_eq!(reader.buffer_size(), 1);
}
