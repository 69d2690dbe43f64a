// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// Write handle given to a background task. It can only hand over a value;
/// it has no access to whatever state the value is eventually shown next to.
pub struct Publisher<T> {
    seq: u64,
    tx: Sender<(u64, T)>,
}

impl<T> Publisher<T> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn publish(self, value: T) {
        // A dropped slot simply means nobody is interested any more.
        let _ = self.tx.send((self.seq, value));
    }
}

/// Holds the displayed result of the most recent request. Every request gets
/// a sequence number; a result that arrives after a newer one has already
/// been shown is discarded.
pub struct LatestSlot<T> {
    tx: Sender<(u64, T)>,
    rx: Receiver<(u64, T)>,
    issued: u64,
    shown: Option<(u64, T)>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        LatestSlot::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        LatestSlot {
            tx,
            rx,
            issued: 0,
            shown: None,
        }
    }

    pub fn issue(&mut self) -> Publisher<T> {
        self.issued += 1;
        Publisher {
            seq: self.issued,
            tx: self.tx.clone(),
        }
    }

    fn accept(&mut self, seq: u64, value: T) {
        let newer = match &self.shown {
            Some((shown_seq, _)) => seq > *shown_seq,
            None => true,
        };
        if newer {
            self.shown = Some((seq, value));
        } else {
            tracing::debug!(seq, "dropping superseded result");
        }
    }

    /// Takes in everything that has arrived so far and returns what should be
    /// displayed now.
    pub fn poll(&mut self) -> Option<&T> {
        while let Ok((seq, value)) = self.rx.try_recv() {
            self.accept(seq, value);
        }
        self.current()
    }

    /// Blocks until the newest issued request has delivered, or `timeout`
    /// elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<&T> {
        let deadline = Instant::now() + timeout;
        while !self.is_settled() {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok((seq, value)) => self.accept(seq, value),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.poll()
    }

    fn is_settled(&self) -> bool {
        matches!(&self.shown, Some((seq, _)) if *seq == self.issued)
    }

    pub fn current(&self) -> Option<&T> {
        self.shown.as_ref().map(|(_, v)| v)
    }
}
