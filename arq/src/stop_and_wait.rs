//! Stop-and-wait ARQ engine (component E): two cooperating tasks — sender and receiver —
//! sharing a private `ack_queue`, running over a generic push/pull transport.

use crate::error::TransportError;
use crate::packet::{self, DecodedType, PacketType, HEADER_SIZE};
use crate::queue::{self, Receiver as QueueReceiver, Sender as QueueSender};
use crate::sequence::{self, Sequence};
use crate::supervise::{Scoped, StopToken};
use flux::logging::{debug, o, warn, Logger};
use std::sync::Arc;
use std::time::Duration;

/// What the ARQ engine needs from whatever carries its encoded packets: a datagram client or
/// the per-session handle a server hands to its handler task. `push`/`pull` operate on whole
/// encoded packets (header + payload), never on the application's decoded payloads.
pub trait Transport: Send + Sync {
    fn push(&self, data: &[u8]) -> Result<(), TransportError>;
    fn pull(&self) -> Result<Vec<u8>, TransportError>;
    fn peer(&self) -> String;
}

const ACK_QUEUE_CAPACITY: usize = 4;

/// How often the sender wakes up while waiting for the first application message, purely so a
/// cancellation request is noticed promptly even when `oq` never produces anything. This is the
/// thread-per-task analogue of a cooperative task's "yield at every suspension point."
const SENDER_IDLE_POLL: Duration = Duration::from_millis(50);

/// Runs the stop-and-wait protocol until `pull` reports `Disconnected`. Spawns the sender on a
/// supervised thread and runs the receiver on the calling thread; when the receiver returns,
/// the sender is cancelled and joined automatically.
pub fn stop_and_wait<T: Transport + 'static>(
    transport: Arc<T>,
    iq_tx: QueueSender<Vec<u8>>,
    oq_rx: QueueReceiver<Vec<u8>>,
    retransmit_delay: Duration,
    log: Logger,
) {
    let (ack_tx, ack_rx) = queue::bounded::<u16>(ACK_QUEUE_CAPACITY);

    let sender_transport = transport.clone();
    let sender_log = log.new(o!("role" => "sender", "peer" => transport.peer()));
    let _sender = Scoped::spawn("arq-sender", move |stop| {
        sender_loop(sender_transport, oq_rx, ack_rx, retransmit_delay, stop, sender_log);
    });

    let receiver_log = log.new(o!("role" => "receiver", "peer" => transport.peer()));
    receiver_loop(transport, iq_tx, ack_tx, receiver_log);
    // `_sender` drops here: Scoped::drop cancels and joins the sender thread.
}

fn sender_loop<T: Transport>(
    transport: Arc<T>,
    oq_rx: QueueReceiver<Vec<u8>>,
    ack_rx: QueueReceiver<u16>,
    retransmit_delay: Duration,
    stop: StopToken,
    log: Logger,
) {
    let mut sequence = Sequence::new();

    'messages: loop {
        let payload = loop {
            if stop.is_stopped() {
                return;
            }
            match oq_rx.pull_timeout(SENDER_IDLE_POLL) {
                Ok(payload) => break payload,
                Err(_) => continue,
            }
        };

        let i = sequence.next();
        let datagram = packet::encode(PacketType::Data, i, &payload);

        if transport.push(&datagram).is_err() {
            return;
        }

        loop {
            if stop.is_stopped() {
                return;
            }
            match ack_rx.pull_timeout(retransmit_delay) {
                Ok(j) => {
                    if sequence::distance(i, j) == 0 {
                        continue 'messages;
                    }
                    debug!(log, "dropping ackn packet #{} (out of sequence)", j; "expected" => i);
                }
                Err(_) => {
                    if stop.is_stopped() {
                        return;
                    }
                    if transport.push(&datagram).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

fn receiver_loop<T: Transport>(
    transport: Arc<T>,
    iq_tx: QueueSender<Vec<u8>>,
    ack_tx: QueueSender<u16>,
    log: Logger,
) {
    let mut expected = Sequence::new();
    let mut i = expected.next();

    loop {
        let datagram = match transport.pull() {
            Ok(datagram) => datagram,
            Err(_) => return,
        };

        let (ty, j, payload) = match packet::decode(&datagram) {
            Ok(decoded) => decoded,
            Err(_) => {
                warn!(log, "packet too small (size={}).", datagram.len());
                continue;
            }
        };

        match ty {
            DecodedType::Known(PacketType::Data) => {
                if j == i {
                    match iq_tx.try_push(payload.to_vec()) {
                        Ok(()) => {
                            let ack = packet::encode(PacketType::Ackn, i, &[]);
                            if transport.push(&ack).is_err() {
                                return;
                            }
                            i = expected.next();
                        }
                        Err(_) => {
                            warn!(log, "dropping data packet #{} (blocked)", j);
                        }
                    }
                } else if sequence::distance(i, j) <= 1 {
                    warn!(log, "dropping data packet #{} (repeat)", j);
                    let ack = packet::encode(PacketType::Ackn, j, &[]);
                    if transport.push(&ack).is_err() {
                        return;
                    }
                } else {
                    warn!(log, "dropping data packet #{} (out of sequence)", j);
                }
            }
            DecodedType::Known(PacketType::Ackn) => {
                // Best-effort: if the sender isn't listening (e.g. it already advanced and the
                // queue briefly has no reader), dropping the ack is harmless — it will retransmit.
                let _ = ack_tx.try_push(j);
            }
            DecodedType::Unknown(byte) => {
                warn!(log, "dropping packet (invalid type 0x{:02x}).", byte);
            }
        }
    }
}
