use crate::error::{KpiError, Result};

/// Growable storage backing one column of an open trajectory.
///
/// The capacity is tracked separately from the number of samples a trajectory
/// has committed; slots beyond the logical length hold default values.
#[derive(Clone, Debug, Default)]
pub struct ColumnStorage<R> {
    /// The backing slots, always `capacity` long.
    slots: Vec<R>,
    /// The number of writable slots.
    capacity: usize,
}

/// The finalized values of a column, sized to exactly the number of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputVector<R>(Box<[R]>);

impl<R: Clone + Default> ColumnStorage<R> {
    /// Creates storage with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![R::default(); capacity],
            capacity,
        }
    }

    /// The number of slots that can be written without growing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Writes `value` at `index`, growing the storage if needed.
    pub fn set(&mut self, index: usize, value: R) {
        if index >= self.capacity {
            self.grow(index + 1);
        }
        self.slots[index] = value;
    }

    /// Reads the value at `index`, which must be within the capacity.
    pub fn get(&self, index: usize) -> Result<&R> {
        self.slots.get(index).ok_or(KpiError::IndexOutOfRange {
            index,
            len: self.capacity,
        })
    }

    /// The first `len` slots.
    pub fn valid(&self, len: usize) -> &[R] {
        &self.slots[..usize::min(len, self.capacity)]
    }

    /// Consumes the storage, keeping the first `len` values.
    pub fn into_output(mut self, len: usize) -> OutputVector<R> {
        debug_assert!(len <= self.capacity);
        self.slots.resize(len, R::default());
        OutputVector(self.slots.into_boxed_slice())
    }

    /// Grows geometrically to at least `min_capacity`.
    fn grow(&mut self, min_capacity: usize) {
        let capacity = usize::max(min_capacity, 2 * self.capacity);
        self.slots.resize(capacity, R::default());
        self.capacity = capacity;
    }
}

impl<R> OutputVector<R> {
    /// The number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the value at `index`.
    pub fn get(&self, index: usize) -> Result<&R> {
        self.0.get(index).ok_or(KpiError::IndexOutOfRange {
            index,
            len: self.0.len(),
        })
    }

    /// The values as a slice.
    pub fn as_slice(&self) -> &[R] {
        &self.0
    }
}

impl<R> From<Vec<R>> for OutputVector<R> {
    fn from(values: Vec<R>) -> Self {
        Self(values.into_boxed_slice())
    }
}
