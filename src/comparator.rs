//! Key ordering capabilities.
//!
//! A [`TreeMap`](crate::TreeMap) never calls `Ord` directly; it asks its [`Comparator`]. A
//! comparator may decline to order two keys (by returning `None`), which the map reports as
//! [`TreeError::IncompatibleKey`](crate::TreeError::IncompatibleKey).

use core::cmp::Ordering;
use core::fmt;

/// Orders keys of type `K`.
pub trait Comparator<K: ?Sized> {
    /// Compares `a` with `b`, or returns `None` if the two cannot be ordered.
    fn compare(&self, a: &K, b: &K) -> Option<Ordering>;
}

/// The key type's own ordering, via [`PartialOrd`].
///
/// Keys that are not comparable with themselves (such as `f64::NAN`) are rejected by the map.
///
/// # Examples
///
/// ```
/// use avl_tree_map::{AvlTreeMap, TreeError};
///
/// let mut map: AvlTreeMap<f64, &str> = AvlTreeMap::new();
/// assert_eq!(map.put(1.5, "a"), Ok(None));
/// assert_eq!(map.put(f64::NAN, "b"), Err(TreeError::IncompatibleKey));
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NaturalOrder;

impl<K: PartialOrd + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        a.partial_cmp(b)
    }
}

/// A total ordering given by a closure.
///
/// # Examples
///
/// ```
/// use avl_tree_map::{OrderBy, TreeMap};
///
/// // Case-insensitive keys.
/// let mut map: TreeMap<&str, u32, _> =
///     TreeMap::with_comparator(OrderBy(|a: &&str, b: &&str| a.to_lowercase().cmp(&b.to_lowercase())));
/// map.put("Apple", 1).unwrap();
/// assert_eq!(map.put("APPLE", 2), Ok(Some(1)));
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone, Copy, Default)]
pub struct OrderBy<F>(pub F);

impl<K: ?Sized, F> Comparator<K> for OrderBy<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        Some((self.0)(a, b))
    }
}

impl<F> fmt::Debug for OrderBy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OrderBy(..)")
    }
}

/// The reverse of another comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reversed<C>(pub C);

impl<K: ?Sized, C: Comparator<K>> Comparator<K> for Reversed<C> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        self.0.compare(a, b).map(Ordering::reverse)
    }
}
