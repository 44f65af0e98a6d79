//! Test allocator that reports freed buffers still holding a watched run of
//! `char`s. Only deallocations on the thread that armed it are inspected.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

pub struct FreedBufferScanner;

#[global_allocator]
static SCANNER: FreedBufferScanner = FreedBufferScanner;

const NEEDLE_LEN: usize = 4;

thread_local! {
    static NEEDLE: Cell<Option<[char; NEEDLE_LEN]>> = const { Cell::new(None) };
    static HITS: Cell<usize> = const { Cell::new(0) };
}

fn needle_bytes(needle: [char; NEEDLE_LEN]) -> [u8; NEEDLE_LEN * 4] {
    let mut bytes = [0u8; NEEDLE_LEN * 4];
    for (chunk, symbol) in bytes.chunks_exact_mut(4).zip(needle) {
        chunk.copy_from_slice(&u32::from(symbol).to_ne_bytes());
    }
    bytes
}

unsafe impl GlobalAlloc for FreedBufferScanner {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if let Ok(Some(needle)) = NEEDLE.try_with(Cell::get) {
            let pattern = needle_bytes(needle);
            let freed = unsafe { std::slice::from_raw_parts(ptr, layout.size()) };
            if freed.windows(pattern.len()).any(|w| w == pattern) {
                let _ = HITS.try_with(|hits| hits.set(hits.get() + 1));
            }
        }
        unsafe { System.dealloc(ptr, layout) }
    }
}

/// Runs `f` and counts freed buffers on this thread that still contain
/// `needle` as consecutive UTF-32 code points.
pub fn count_unwiped_frees(needle: [char; NEEDLE_LEN], f: impl FnOnce()) -> usize {
    HITS.with(|hits| hits.set(0));
    NEEDLE.with(|n| n.set(Some(needle)));
    f();
    NEEDLE.with(|n| n.set(None));
    HITS.with(Cell::get)
}
