//! Ordered in-memory record lists.

/// Insertion-ordered list of records with first-match lookups.
///
/// There are no secondary indices. Every lookup is a linear scan and the
/// first matching record wins, which is what makes duplicate event ids
/// resolve to the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore<T> {
    records: Vec<T>,
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T> From<Vec<T>> for RecordStore<T> {
    fn from(records: Vec<T>) -> Self {
        Self { records }
    }
}

impl<T> RecordStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the end.
    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Borrow all records in insertion order.
    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    /// First record matching `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<&T> {
        self.records.iter().find(|record| predicate(*record))
    }

    /// Mutable reference to the first record matching `predicate`.
    pub fn find_mut(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Option<&mut T> {
        self.records.iter_mut().find(|record| predicate(&**record))
    }

    /// Whether any record matches `predicate`.
    pub fn contains(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        self.records.iter().any(predicate)
    }
}

impl<'a, T> IntoIterator for &'a RecordStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
