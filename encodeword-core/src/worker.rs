//! The encoder's optional second thread: a bounded channel standing in
//! for the reference's semaphore-gated queue, feeding a `CbcMac` that
//! lives entirely on the worker thread until `finish()` hands it back.

use std::thread::JoinHandle;

use crate::mac::CbcMac;

/// Depth of the super-block queue between the encoder's main thread
/// and the MAC worker. Matches the reference's queue capacity; large
/// enough to absorb bursts without the producer stalling on every
/// push, small enough to bound memory for pathological inputs.
pub const MAC_QUEUE_CAPACITY: usize = 50;

enum Message {
    Block(Vec<u32>),
    Stop,
}

/// Owns the MAC worker thread. `Drop` sends the stop sentinel (if
/// `finish` was never called) and joins, so an error unwinding out of
/// the encoder can never leak a live thread.
pub(crate) struct MacWorkerHandle {
    sender: Option<std::sync::mpsc::SyncSender<Message>>,
    handle: Option<JoinHandle<CbcMac>>,
}

impl MacWorkerHandle {
    /// Spawns the worker, taking ownership of `mac` (already updated
    /// with the first super-block processed synchronously).
    pub fn spawn(mac: CbcMac) -> Self {
        let (sender, receiver) = std::sync::mpsc::sync_channel::<Message>(MAC_QUEUE_CAPACITY);
        let handle = std::thread::spawn(move || {
            let mut mac = mac;
            while let Ok(message) = receiver.recv() {
                match message {
                    Message::Block(words) => crate::mac::update_framed(&mut mac, &words),
                    Message::Stop => break,
                }
            }
            mac
        });
        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    /// Enqueues a super-block of ciphertext words, blocking if the
    /// queue is at capacity.
    pub fn push(&self, words: Vec<u32>) {
        if let Some(sender) = &self.sender {
            // The worker only disconnects after `Stop`, which only this
            // handle sends; a send error here would mean the worker
            // thread panicked, which `finish`'s join will surface.
            let _ = sender.send(Message::Block(words));
        }
    }

    /// Sends the stop sentinel and joins, returning the final MAC.
    pub fn finish(mut self) -> CbcMac {
        self.stop();
        self.handle
            .take()
            .expect("finish consumes the handle exactly once")
            .join()
            .expect("mac worker thread panicked")
    }

    fn stop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Message::Stop);
        }
    }
}

impl Drop for MacWorkerHandle {
    fn drop(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn key() -> Key {
        Key::from_words([1, 2, 3, 4])
    }

    #[test]
    fn worker_matches_synchronous_update_over_several_blocks() {
        let blocks: Vec<Vec<u32>> = vec![
            (0..5).collect(),
            (5..10).collect(),
            (10..13).collect(), // short tail
        ];

        let mut expected = CbcMac::new(&key());
        for block in &blocks {
            crate::mac::update_framed(&mut expected, block);
        }

        let worker = MacWorkerHandle::spawn(CbcMac::new(&key()));
        for block in &blocks {
            worker.push(block.clone());
        }
        let finished = worker.finish();

        assert_eq!(finished.digest(), expected.digest());
    }

    #[test]
    fn worker_with_no_blocks_matches_mac_with_no_updates() {
        let worker = MacWorkerHandle::spawn(CbcMac::new(&key()));
        let finished = worker.finish();
        let expected = CbcMac::new(&key());
        assert_eq!(finished.digest(), expected.digest());
    }

    #[test]
    fn dropping_handle_without_finish_does_not_hang() {
        let worker = MacWorkerHandle::spawn(CbcMac::new(&key()));
        worker.push(vec![1, 2, 3, 4, 5]);
        drop(worker);
    }
}
