use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::error::{allocation_error, layout_error, Result};

/// An owned, zero-initialised `f32` buffer with a guaranteed alignment.
///
/// `Vec<f32>` only promises 4-byte alignment and must be freed with the layout
/// it was created with, so aligned storage is kept in its own container that
/// remembers its `Layout` and releases it on drop.
///
/// # Example
///
/// ```rust
/// use trmm::utils::AlignedBuffer;
///
/// let mut buf = AlignedBuffer::new_zeroed(10, 32).unwrap();
/// assert!(buf.iter().all(|&x| x == 0.0));
/// buf[3] = 1.5;
/// assert_eq!(buf.as_ptr() as usize % 32, 0);
/// ```
pub struct AlignedBuffer {
    ptr: NonNull<f32>,
    len: usize,
    layout: Layout,
}

// SAFETY: the buffer uniquely owns its allocation, exactly like `Vec<f32>`.
unsafe impl Send for AlignedBuffer {}
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocates `len` zeroed `f32` values aligned to `align` bytes.
    ///
    /// # Errors
    ///
    /// - [`TrmmError::LayoutError`](crate::error::TrmmError::LayoutError) if
    ///   `align` is not a power of two, is below the natural alignment of `f32`,
    ///   or the byte size overflows.
    /// - [`TrmmError::AllocationError`](crate::error::TrmmError::AllocationError)
    ///   if the allocator returns null.
    pub fn new_zeroed(len: usize, align: usize) -> Result<Self> {
        if !align.is_power_of_two() || align < mem::align_of::<f32>() {
            return Err(layout_error(
                len,
                align,
                "alignment must be a power of two no smaller than f32's",
            ));
        }

        let size = len
            .checked_mul(mem::size_of::<f32>())
            .ok_or_else(|| layout_error(len, align, "byte size overflows usize"))?;

        let layout = Layout::from_size_align(size, align)
            .map_err(|e| layout_error(size, align, e.to_string()))?;

        // Allocating zero bytes is undefined behaviour; an empty buffer only
        // needs a well-aligned dangling pointer.
        if size == 0 {
            return Ok(AlignedBuffer {
                ptr: NonNull::dangling(),
                len,
                layout,
            });
        }

        let ptr = unsafe { alloc_zeroed(layout) };

        let ptr = NonNull::new(ptr as *mut f32)
            .ok_or_else(|| allocation_error(size, align, "allocator returned null"))?;

        Ok(AlignedBuffer { ptr, len, layout })
    }

    /// Alignment, in bytes, the buffer was allocated with.
    #[inline(always)]
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            unsafe {
                dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
            }
        }
    }
}

impl Deref for AlignedBuffer {
    type Target = [f32];
    fn deref(&self) -> &Self::Target {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("alignment", &self.layout.align())
            .finish()
    }
}
