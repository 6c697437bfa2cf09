//! Flat byte buffer backing RAM regions.
//!
//! On Unix systems the buffer is an anonymous `mmap`, so the host only
//! commits pages the guest actually touches and the contents start out
//! zero-filled. Other platforms fall back to a `Vec<u8>`.

use std::slice;

/// A flat, zero-initialised byte buffer of fixed size.
pub struct RamBuffer {
    ptr: *mut u8,
    size: usize,
    is_mmap: bool,
}

impl RamBuffer {
    /// Creates a new buffer of the given size in bytes.
    ///
    /// Panics if the host cannot provide the backing memory.
    pub fn new(size: usize) -> Self {
        if size == 0 {
            return Self { ptr: std::ptr::NonNull::dangling().as_ptr(), size: 0, is_mmap: false };
        }

        #[cfg(unix)]
        {
            use std::ptr;
            let ptr = unsafe {
                libc::mmap(
                    ptr::null_mut(),
                    size,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                    -1,
                    0,
                )
            };

            if ptr == libc::MAP_FAILED {
                panic!("failed to mmap RAM buffer of size {}", size);
            }

            Self { ptr: ptr as *mut u8, size, is_mmap: true }
        }

        #[cfg(not(unix))]
        {
            let mut vec = vec![0u8; size];
            let ptr = vec.as_mut_ptr();
            std::mem::forget(vec);
            Self { ptr, size, is_mmap: false }
        }
    }

    /// Returns the size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the bytes from `offset` to the end of the buffer.
    ///
    /// An offset at or past the end yields an empty slice, so callers can
    /// leave the length check to the codec operating on the tail.
    pub fn tail(&self, offset: usize) -> &[u8] {
        if offset >= self.size {
            return &[];
        }
        unsafe { slice::from_raw_parts(self.ptr.add(offset), self.size - offset) }
    }

    /// Mutable variant of [`RamBuffer::tail`].
    pub fn tail_mut(&mut self, offset: usize) -> &mut [u8] {
        if offset >= self.size {
            return &mut [];
        }
        unsafe { slice::from_raw_parts_mut(self.ptr.add(offset), self.size - offset) }
    }
}

impl Drop for RamBuffer {
    fn drop(&mut self) {
        if self.size == 0 {
            return;
        }
        if self.is_mmap {
            #[cfg(unix)]
            unsafe {
                libc::munmap(self.ptr as *mut _, self.size);
            }
        } else {
            #[cfg(not(unix))]
            unsafe {
                let _ = Vec::from_raw_parts(self.ptr, self.size, self.size);
            }
        }
    }
}
