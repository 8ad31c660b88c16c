//! A plain integer counter.

/// Mutable integer with increment and reset.
///
/// Increments wrap on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counter {
    value: i32,
}

impl Counter {
    pub fn new(initial: i32) -> Self {
        Self { value: initial }
    }

    pub fn increment(&mut self) -> i32 {
        self.value = self.value.wrapping_add(1);
        self.value
    }

    pub fn get(&self) -> i32 {
        self.value
    }

    /// Set the value back to zero, not to the initial value.
    pub fn reset(&mut self) {
        self.value = 0;
    }
}
