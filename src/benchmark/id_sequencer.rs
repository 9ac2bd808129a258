//! Shared wrap-around driver id cursor
//!
//! One instance per id-consuming workload kind. The cursor is the only state
//! shared between that kind's workers, and it sits behind its own lock.

use parking_lot::Mutex;

/// Hands out ids `1..=keyspace` in order, then starts over at 1
pub struct IdSequencer {
    keyspace: u64,
    cursor: Mutex<u64>,
}

impl IdSequencer {
    /// A zero keyspace is treated as a keyspace of one
    pub fn new(keyspace: u64) -> Self {
        Self {
            keyspace: keyspace.max(1),
            cursor: Mutex::new(0),
        }
    }

    pub fn keyspace(&self) -> u64 {
        self.keyspace
    }

    /// Next id in the sequence
    #[inline]
    pub fn next(&self) -> u64 {
        let mut cursor = self.cursor.lock();
        if *cursor >= self.keyspace {
            *cursor = 0;
        }
        *cursor += 1;
        *cursor
    }
}
