//! End-to-end reliability test over a simulated lossy link (independent loss per direction),
//! plus a clean-shutdown check driven entirely through the public API.

use arq::error::TransportError;
use arq::queue;
use arq::stop_and_wait::{stop_and_wait, Transport};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Connects two `stop_and_wait` instances through a pair of queues, dropping each enqueued
/// datagram independently with probability `loss_rate` to stand in for a lossy network.
struct LossyPair {
    loss_rate: f64,
    to_peer: Mutex<VecDeque<Vec<u8>>>,
    to_self: Mutex<VecDeque<Vec<u8>>>,
}

struct LossyEnd {
    pair: Arc<LossyPair>,
    outbound: bool,
}

impl Transport for LossyEnd {
    fn push(&self, data: &[u8]) -> Result<(), TransportError> {
        if rand::thread_rng().gen::<f64>() < self.pair.loss_rate {
            return Ok(());
        }
        let queue = if self.outbound { &self.pair.to_peer } else { &self.pair.to_self };
        queue.lock().unwrap().push_back(data.to_vec());
        Ok(())
    }

    fn pull(&self) -> Result<Vec<u8>, TransportError> {
        let queue = if self.outbound { &self.pair.to_self } else { &self.pair.to_peer };
        for _ in 0..2000 {
            if let Some(data) = queue.lock().unwrap().pop_front() {
                return Ok(data);
            }
            thread::sleep(Duration::from_millis(2));
        }
        Err(TransportError::Disconnected)
    }

    fn peer(&self) -> String {
        "lossy-loopback".to_owned()
    }
}

#[test]
fn delivers_in_order_over_a_lossy_link() {
    let pair = Arc::new(LossyPair {
        loss_rate: 0.25,
        to_peer: Mutex::new(VecDeque::new()),
        to_self: Mutex::new(VecDeque::new()),
    });

    let a = Arc::new(LossyEnd { pair: pair.clone(), outbound: true });
    let b = Arc::new(LossyEnd { pair, outbound: false });

    let (a_iq_tx, a_iq_rx) = queue::bounded::<Vec<u8>>(16);
    let (a_oq_tx, a_oq_rx) = queue::bounded::<Vec<u8>>(16);
    let (b_iq_tx, b_iq_rx) = queue::bounded::<Vec<u8>>(16);
    let (b_oq_tx, b_oq_rx) = queue::bounded::<Vec<u8>>(16);

    let retransmit_delay = Duration::from_millis(15);
    let handle_a = thread::spawn(move || {
        stop_and_wait(a, a_iq_tx, a_oq_rx, retransmit_delay, flux::logging::discard())
    });
    let handle_b = thread::spawn(move || {
        stop_and_wait(b, b_iq_tx, b_oq_rx, retransmit_delay, flux::logging::discard())
    });

    let mut rng = rand::thread_rng();
    let messages: Vec<Vec<u8>> = (0..100)
        .map(|_| (0..3).map(|_| rng.gen::<u8>()).collect())
        .collect();

    for message in &messages {
        b_oq_tx.push(message.clone()).unwrap();
    }

    let mut received = Vec::new();
    for _ in 0..messages.len() {
        received.push(
            a_iq_rx
                .pull_timeout(Duration::from_secs(10))
                .expect("message should eventually arrive despite simulated loss"),
        );
    }
    assert_eq!(received, messages);

    drop(a_oq_tx);
    drop(b_iq_rx);
    let _ = handle_a.join();
    let _ = handle_b.join();
}

#[test]
fn disconnected_transport_returns_promptly() {
    struct AlwaysDisconnected;
    impl Transport for AlwaysDisconnected {
        fn push(&self, _data: &[u8]) -> Result<(), TransportError> {
            Ok(())
        }
        fn pull(&self) -> Result<Vec<u8>, TransportError> {
            Err(TransportError::Disconnected)
        }
        fn peer(&self) -> String {
            "nobody".to_owned()
        }
    }

    let (iq_tx, _iq_rx) = queue::bounded::<Vec<u8>>(1);
    let (_oq_tx, oq_rx) = queue::bounded::<Vec<u8>>(1);

    let started = Instant::now();
    stop_and_wait(
        Arc::new(AlwaysDisconnected),
        iq_tx,
        oq_rx,
        Duration::from_millis(10),
        flux::logging::discard(),
    );
    assert!(started.elapsed() < Duration::from_secs(2));
}
