// src/env.rs
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

/// The ambient inputs the original hosting platform supplied to every
/// call: a clock, an unpredictability source, and a monotonic sequence
/// counter. Injected as a trait so tests can pin all three.
pub trait Environment: Send + Sync {
    /// Current ledger time in whole seconds.
    fn now(&self) -> u64;

    /// Environment-supplied unpredictability block. Guessable in
    /// principle (see the generator's caveat); it only has to vary
    /// between deployments, not be secret.
    fn entropy(&self) -> [u8; 32];

    /// Next value of the monotonic sequence counter. Strictly increasing
    /// across calls within one process.
    fn next_sequence(&self) -> u64;
}

/// Production environment: wall clock, one entropy block drawn at
/// startup, process-local counter.
pub struct SystemEnvironment {
    entropy: [u8; 32],
    sequence: AtomicU64,
}

impl SystemEnvironment {
    pub fn new() -> Self {
        let mut entropy = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut entropy);
        log::debug!("environment entropy block: {}", hex::encode(entropy));
        SystemEnvironment {
            entropy,
            sequence: AtomicU64::new(0),
        }
    }
}

impl Default for SystemEnvironment {
    fn default() -> Self {
        SystemEnvironment::new()
    }
}

impl Environment for SystemEnvironment {
    fn now(&self) -> u64 {
        // timestamp() is non-negative for any date this system will see
        chrono::Utc::now().timestamp().max(0) as u64
    }

    fn entropy(&self) -> [u8; 32] {
        self.entropy
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Fully pinned environment for tests: fixed time, fixed entropy, same
/// counter discipline as production.
#[cfg(test)]
pub struct FixedEnvironment {
    pub time: AtomicU64,
    pub entropy: [u8; 32],
    sequence: AtomicU64,
}

#[cfg(test)]
impl FixedEnvironment {
    pub fn at(time: u64) -> Self {
        FixedEnvironment {
            time: AtomicU64::new(time),
            entropy: [7u8; 32],
            sequence: AtomicU64::new(0),
        }
    }

    pub fn set_time(&self, time: u64) {
        self.time.store(time, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Environment for FixedEnvironment {
    fn now(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }

    fn entropy(&self) -> [u8; 32] {
        self.entropy
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}
