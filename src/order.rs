use std::cmp::Ordering;

/// Three-way comparison used by [`crate::avl::AvlTree`] and [`crate::queue::IndexedQueue`].
///
/// For the tree, `Less` sends a payload to the left. For the queue, `Greater`
/// means `a` has the higher priority and should leave the queue first.
/// Implementations must be a consistent total order for the lifetime of the
/// structure they are attached to.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Compare with `Ord`
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Reverse an inner comparator, e.g. to turn a max-queue into a min-queue.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reversed<C> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}

/// Marker for trees whose shape is driven by position instead of by key.
///
/// It deliberately does not implement [`Comparator`], so only the structural
/// operations of [`crate::avl::AvlTree`] are available.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unordered;
