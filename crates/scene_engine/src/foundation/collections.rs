//! Specialized collection types

/// Fixed-capacity ring of `N` slots with a moving cursor
///
/// Used for per-frame rotating state (frame timing windows, multi-buffered
/// per-frame data): the cursor points at the slot for the current frame and
/// `advance` moves to the next one, wrapping around.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    data: [T; N],
    current: usize,
}

impl<T: Default, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default, const N: usize> RingBuffer<T, N> {
    /// Create a ring with every slot defaulted and the cursor at slot 0
    pub fn new() -> Self {
        Self::from_array(std::array::from_fn(|_| T::default()))
    }
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Create a ring from explicit slot values
    pub fn from_array(data: [T; N]) -> Self {
        assert!(N > 0, "RingBuffer requires at least one slot");
        Self { data, current: 0 }
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Index of the current slot
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Current slot
    pub fn current(&self) -> &T {
        &self.data[self.current]
    }

    /// Current slot, mutably
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.data[self.current]
    }

    /// Slot by absolute index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Move the cursor to the next slot
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % N;
    }

    /// Iterate slots in storage order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}
