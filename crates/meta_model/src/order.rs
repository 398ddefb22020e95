//! Dewey-decimal ordering of member sequences.

use std::cmp::Ordering;

/// Compare two sequences such as `1.2` and `1.10` component by component.
///
/// Numeric components compare numerically, anything else lexically; a
/// sequence sorts before its own extensions (`1` before `1.1`).
pub fn compare_sequence(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ordering = match (l.trim().parse::<u64>(), r.trim().parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Order items with a sequence before items without; ties keep their input order.
pub fn sort_by_sequence<T>(items: &mut [T], sequence: impl Fn(&T) -> Option<&str>) {
    items.sort_by(|a, b| match (sequence(a), sequence(b)) {
        (Some(a), Some(b)) => compare_sequence(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
