//! Bump allocation for the transient objects a single `compile()` call
//! produces (parse tree nodes, label bookkeeping). Everything allocated
//! here is released in one shot when the arena is dropped; nothing
//! allocated from it is ever freed individually.

use bumpalo::Bump;

/// Owns a chain of fixed-size blocks and hands out references into them.
/// Wraps `bumpalo::Bump` so the rest of the workspace depends on
/// `rex_core::Arena` rather than reaching for the third-party crate
/// directly from every call site.
#[derive(Default)]
pub struct Arena {
    bump: Bump,
}

impl Arena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Allocates `value` in the arena and returns a reference tied to the
    /// arena's lifetime.
    pub fn alloc<T>(&self, value: T) -> &mut T {
        self.bump.alloc(value)
    }

    /// Copies `slice` into the arena.
    pub fn alloc_slice_copy<'a, T: Copy>(&'a self, slice: &[T]) -> &'a [T] {
        self.bump.alloc_slice_copy(slice)
    }

    /// Bytes currently resident across all allocated blocks. Exposed for
    /// tests and for `OUT_OF_MEMORY` simulation; not consulted by the
    /// parser itself.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }

    pub fn reset(&mut self) {
        self.bump.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_round_trips_value() {
        let arena = Arena::new();
        let n = arena.alloc(42u32);
        assert_eq!(*n, 42);
    }

    #[test]
    fn alloc_slice_copy_preserves_contents() {
        let arena = Arena::new();
        let src = [1u32, 2, 3, 4];
        let copy = arena.alloc_slice_copy(&src);
        assert_eq!(copy, &src);
    }

    #[test]
    fn reset_keeps_arena_usable() {
        let mut arena = Arena::new();
        arena.alloc(1u32);
        arena.reset();
        let n = arena.alloc(2u32);
        assert_eq!(*n, 2);
    }
}
