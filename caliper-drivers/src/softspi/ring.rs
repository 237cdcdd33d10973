//! Fixed-capacity circular byte buffer shared with interrupt handlers
//!
//! One producer and one consumer, either of which may be an interrupt
//! handler. Each operation holds a critical section only for the O(1) index
//! update, so clock edges are never held off for long.
//!
//! The ring also numbers the byte stream: every push advances a wrapping
//! position, and a mark records the position where framing of the stream
//! restarts. Both are read under the same lock as the bytes themselves.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Ring storage and indices
struct Ring<const N: usize> {
    storage: [u8; N],
    /// Index of the oldest byte
    head: usize,
    /// Number of stored bytes
    len: usize,
    /// Stream position of the next pushed byte
    pushed: u32,
    /// Stream position framing restarts from
    mark: u32,
    /// Times the mark was set
    marks: u32,
}

/// A byte taken from the ring along with its place in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamByte {
    pub byte: u8,
    /// Wrapping count of bytes pushed before this one
    pub position: u32,
    /// Distance from the current mark, `None` if pushed before it
    pub since_mark: Option<u32>,
}

impl<const N: usize> Ring<N> {
    const fn new() -> Self {
        Self {
            storage: [0; N],
            head: 0,
            len: 0,
            pushed: 0,
            mark: 0,
            marks: 0,
        }
    }

    /// Returns `true` if the oldest byte was overwritten
    fn push(&mut self, byte: u8) -> bool {
        self.pushed = self.pushed.wrapping_add(1);
        if N == 0 {
            return true;
        }

        let tail = (self.head + self.len) % N;
        self.storage[tail] = byte;

        if self.len == N {
            self.head = (self.head + 1) % N;
            true
        } else {
            self.len += 1;
            false
        }
    }

    fn pop(&mut self) -> Option<u8> {
        let byte = self.first()?;
        self.head = (self.head + 1) % N;
        self.len -= 1;
        Some(byte)
    }

    fn pop_with_position(&mut self) -> Option<StreamByte> {
        let position = self.pushed.wrapping_sub(self.len as u32);
        let byte = self.pop()?;
        let distance = position.wrapping_sub(self.mark);
        Some(StreamByte {
            byte,
            position,
            since_mark: ((distance as i32) >= 0).then_some(distance),
        })
    }

    fn first(&self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        Some(self.storage[self.head])
    }
}

/// Circular byte buffer with overwrite-oldest semantics
pub struct RingBuffer<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Ring<N>>>,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Ring::new())),
        }
    }

    /// Append a byte, overwriting the oldest one if the buffer is full
    ///
    /// Returns `true` if a byte was overwritten.
    pub fn push(&self, byte: u8) -> bool {
        self.inner.lock(|ring| ring.borrow_mut().push(byte))
    }

    /// Remove and return the oldest byte
    pub fn pop(&self) -> Option<u8> {
        self.inner.lock(|ring| ring.borrow_mut().pop())
    }

    /// Remove the oldest byte and report where it sits in the stream
    pub fn pop_with_position(&self) -> Option<StreamByte> {
        self.inner.lock(|ring| ring.borrow_mut().pop_with_position())
    }

    /// Restart framing at the next pushed byte
    ///
    /// Bytes already stored report `since_mark: None` from then on.
    pub fn set_mark(&self) {
        self.inner.lock(|ring| {
            let mut ring = ring.borrow_mut();
            ring.mark = ring.pushed;
            ring.marks = ring.marks.wrapping_add(1);
        });
    }

    /// Number of times [`set_mark`](Self::set_mark) was called (wrapping)
    pub fn mark_count(&self) -> u32 {
        self.inner.lock(|ring| ring.borrow().marks)
    }

    /// Return the oldest byte without removing it
    pub fn peek(&self) -> Option<u8> {
        self.inner.lock(|ring| ring.borrow().first())
    }

    /// Number of stored bytes
    pub fn len(&self) -> usize {
        self.inner.lock(|ring| ring.borrow().len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Bytes that can be pushed before the oldest is overwritten
    pub fn remaining(&self) -> usize {
        N - self.len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Drop all stored bytes
    pub fn clear(&self) {
        self.inner.lock(|ring| {
            let mut ring = ring.borrow_mut();
            ring.head = 0;
            ring.len = 0;
        });
    }
}
