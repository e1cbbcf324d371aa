//! Sort-position index and ordered removal
//!
//! Layout containers are kept in ascending sort order under incremental
//! insertion: [`sort_index`] finds where a new item goes, [`remove_at`]
//! takes one out before it is re-inserted elsewhere.

/// Anything that carries a numeric sort value
pub trait SortValue {
    /// `None` means "no usable sort value"; such items sort after every
    /// numbered item.
    fn sort_value(&self) -> Option<i64>;
}

impl SortValue for i64 {
    fn sort_value(&self) -> Option<i64> {
        Some(*self)
    }
}

/// Insertion position for `sort_key` in an ascending sequence
///
/// The key is parsed as an integer. An unparseable key yields
/// `containers.len()` (append at the end). Otherwise the result is the index
/// of the first item whose sort value exceeds the key, or `containers.len()`
/// when none does. Equal values therefore insert after existing ones.
///
/// # Examples
/// ```
/// use mdash_layout::ordering::sort_index;
///
/// let containers: Vec<i64> = vec![2, 4, 6];
/// assert_eq!(sort_index(&containers, "5"), 2);
/// assert_eq!(sort_index(&containers, "abc"), 3);
/// ```
pub fn sort_index<T: SortValue>(containers: &[T], sort_key: &str) -> usize {
    let candidate = match sort_key.parse::<i64>() {
        Ok(value) => value,
        Err(_) => return containers.len(),
    };

    containers
        .iter()
        .position(|c| c.sort_value().map_or(true, |existing| existing > candidate))
        .unwrap_or(containers.len())
}

/// Remove the element at `index`
///
/// Out-of-bounds indexes return the input unchanged.
pub fn remove_at<T>(mut items: Vec<T>, index: usize) -> Vec<T> {
    if index < items.len() {
        items.remove(index);
    }
    items
}
