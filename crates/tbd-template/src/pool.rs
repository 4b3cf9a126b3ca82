//! Reusable output buffers for the string-returning variants.
//!
//! Buffers are handed out by [`BufferPool::acquire`] wrapped in a
//! [`PooledBuffer`] guard. The guard owns the buffer exclusively until it is
//! dropped, at which point the buffer is cleared and put back. Dropping
//! happens on every exit path, so a failed execution returns its buffer too.
//!
//! The pool grows on demand and never evicts.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

use once_cell::sync::Lazy;

static GLOBAL_POOL: Lazy<BufferPool> = Lazy::new(BufferPool::new);

/// The process-wide pool used by [`execute_func_string`](crate::execute_func_string).
pub fn global() -> &'static BufferPool {
    &GLOBAL_POOL
}

/// A pool of byte buffers.
#[derive(Debug, Default)]
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a buffer out of the pool, allocating a new one if it is empty.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self
            .free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();
        if buf.is_some() {
            tracing::trace!("reusing pooled buffer");
        }
        PooledBuffer {
            buf: buf.unwrap_or_default(),
            pool: self,
        }
    }

    /// Number of buffers currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        buf.clear();
        self.free
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(buf);
    }
}

/// A buffer borrowed from a [`BufferPool`], returned to it on drop.
#[derive(Debug)]
pub struct PooledBuffer<'p> {
    buf: Vec<u8>,
    pool: &'p BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
