//! Scratch storage for the packed panels and the output tile.
//!
//! A [`Workspace`] owns every buffer the blocked kernel writes besides `C`. Keeping it outside
//! the kernel makes the kernel reentrant: each thread (or each caller) brings its own
//! workspace, and the borrow checker rules out two calls sharing one at the same time.
//! Buffers only grow, so a workspace reused across calls of similar shape stops allocating
//! after the first call.

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::slice;

use bytemuck::Zeroable;

/// Alignment of the packed panels in bytes (one cache line).
const ALIGNMENT: usize = 64;

/// Heap buffer aligned to [`ALIGNMENT`], zero-initialized on allocation.
struct AlignedBuf<T> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer uniquely owns its allocation, like a `Vec<T>`.
unsafe impl<T: Send> Send for AlignedBuf<T> {}
unsafe impl<T: Sync> Sync for AlignedBuf<T> {}

impl<T: Zeroable> AlignedBuf<T> {
    fn new() -> Self {
        AlignedBuf {
            ptr: NonNull::dangling(),
            len: 0,
            layout: Layout::new::<()>(),
            _marker: PhantomData,
        }
    }

    /// Makes room for at least `len` elements. Contents are not preserved across a grow.
    fn reserve(&mut self, len: usize) {
        if len <= self.len {
            return;
        }

        let layout = match Layout::array::<T>(len).and_then(|l| l.align_to(ALIGNMENT)) {
            Ok(layout) => layout,
            Err(_) => panic!("Failed to create Layout for {len} packed elements"),
        };

        // SAFETY: `len > 0` here, so the layout has a non-zero size. All-zero bytes are a
        // valid `T` by the `Zeroable` bound.
        let ptr = unsafe { alloc::alloc_zeroed(layout) }.cast::<T>();
        let ptr = match NonNull::new(ptr) {
            Some(p) => p,
            None => alloc::handle_alloc_error(layout),
        };

        self.release();
        self.ptr = ptr;
        self.len = len;
        self.layout = layout;
    }

    #[inline(always)]
    fn as_mut_slice(&mut self, len: usize) -> &mut [T] {
        assert!(len <= self.len, "requested {len} elements from a buffer of {}", self.len);
        // SAFETY: `ptr` is valid for `self.len` initialized elements (or dangling with
        // `len == 0`), and `&mut self` guarantees exclusive access.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), len) }
    }
}

impl<T> AlignedBuf<T> {
    fn release(&mut self) {
        if self.layout.size() > 0 {
            // SAFETY: `ptr` was allocated in `reserve` with exactly `layout`.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout) };
        }
        self.ptr = NonNull::dangling();
        self.len = 0;
        self.layout = Layout::new::<()>();
    }
}

impl<T> Drop for AlignedBuf<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Packed-panel and scratch-tile buffers used by the blocked kernel.
pub struct Workspace {
    packed_a: AlignedBuf<u64>,
    packed_b: AlignedBuf<u64>,
    tile: AlignedBuf<f32>,
}

/// Mutable views of the three workspace buffers for one inner-kernel call.
pub(crate) struct Buffers<'a> {
    pub packed_a: &'a mut [u64],
    pub packed_b: &'a mut [u64],
    pub tile: &'a mut [f32],
}

impl Workspace {
    /// Creates an empty workspace. Nothing is allocated until the first call uses it.
    pub fn new() -> Self {
        Workspace {
            packed_a: AlignedBuf::new(),
            packed_b: AlignedBuf::new(),
            tile: AlignedBuf::new(),
        }
    }

    /// Words currently reserved for packed `A` and packed `B` panels.
    pub fn capacity(&self) -> (usize, usize) {
        (self.packed_a.len, self.packed_b.len)
    }

    /// Hands out buffers of the requested sizes, growing them if needed.
    ///
    /// The packed `B` buffer keeps its contents as long as it does not have to grow, which is
    /// what lets later row blocks of the same depth block reuse the `B` panels packed by the
    /// first one.
    pub(crate) fn buffers(
        &mut self,
        a_words: usize,
        b_words: usize,
        tile_len: usize,
    ) -> Buffers<'_> {
        self.packed_a.reserve(a_words);
        self.packed_b.reserve(b_words);
        self.tile.reserve(tile_len);

        Buffers {
            packed_a: self.packed_a.as_mut_slice(a_words),
            packed_b: self.packed_b.as_mut_slice(b_words),
            tile: self.tile.as_mut_slice(tile_len),
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("packed_a", &self.packed_a.len)
            .field("packed_b", &self.packed_b.len)
            .field("tile", &self.tile.len)
            .finish()
    }
}
