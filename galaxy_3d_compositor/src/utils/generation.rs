/// Generation counters for lazy recomputation.
///
/// A source bumps its `Generation` whenever it changes. A consumer keeps a
/// `Cached<T>` that remembers the generation it was computed from and
/// recomputes only when it is behind the source.

/// Monotonic change counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    /// Advance to the next generation
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Value derived from a source, tagged with the source generation it reflects
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: Option<T>,
    generation: Generation,
}

impl<T> Cached<T> {
    pub fn new() -> Self {
        Self { value: None, generation: Generation::INITIAL }
    }

    /// Whether the cached value is missing or older than `source`
    pub fn is_stale(&self, source: Generation) -> bool {
        self.value.is_none() || self.generation != source
    }

    /// Return the cached value, recomputing it first if it is stale
    pub fn get_or_update(&mut self, source: Generation, compute: impl FnOnce() -> T) -> &T {
        if self.is_stale(source) {
            self.value = None;
            self.generation = source;
        }
        self.value.get_or_insert_with(compute)
    }

    /// Cached value, whatever its generation
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Forget the cached value
    pub fn invalidate(&mut self) {
        self.value = None;
    }
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "generation_tests.rs"]
mod tests;
