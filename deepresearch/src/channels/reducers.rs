//! Per-field reducer functions used by state updaters.

/// Appends `items` to `target`, preserving order. Existing entries are never touched.
pub fn append<T>(target: &mut Vec<T>, items: Vec<T>) {
    target.extend(items);
}

/// Replaces `target` when `value` is `Some`; `None` leaves it unchanged.
pub fn overwrite<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}
