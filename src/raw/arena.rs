use alloc::vec::Vec;

use super::handle::Handle;

/// Generation counter of an arena slot. Bumped every time the slot is vacated so that handles
/// which outlive their element can be told apart from handles to whatever reuses the slot.
pub(crate) type Generation = u32;

#[derive(Clone)]
struct Bucket<T> {
    generation: Generation,
    element: Option<T>,
}

#[derive(Clone)]
pub(crate) struct Arena<T> {
    buckets: Vec<Bucket<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            buckets: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.buckets.len().saturating_sub(self.free.len())
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            // Reuse a free slot; its generation was already bumped when it was vacated.
            self.buckets[h.to_index()].element = Some(element);
            h
        } else {
            assert!(
                self.buckets.len() < Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.buckets.push(Bucket {
                generation: 0,
                element: Some(element),
            });
            Handle::from_index(self.buckets.len() - 1)
        }
    }

    /// Returns the current generation of the slot behind `handle`.
    #[inline]
    pub(crate) fn generation(&self, handle: Handle) -> Generation {
        self.buckets[handle.to_index()].generation
    }

    /// Returns true if `handle` refers to an occupied slot that has not been vacated since
    /// `generation` was observed.
    #[inline]
    pub(crate) fn is_live(&self, handle: Handle, generation: Generation) -> bool {
        self.buckets
            .get(handle.to_index())
            .is_some_and(|bucket| bucket.generation == generation && bucket.element.is_some())
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.buckets[handle.to_index()].element.as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.buckets[handle.to_index()].element.as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let bucket = &mut self.buckets[handle.to_index()];
        let element = bucket.element.take().expect("`Arena::take()` - `handle` is invalid!");
        bucket.generation = bucket.generation.wrapping_add(1);
        self.free.push(handle);
        element
    }

    /// Vacates every slot. Slots are kept (with bumped generations) rather than released so that
    /// handles issued before the clear never validate against elements allocated after it.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, bucket) in self.buckets.iter_mut().enumerate() {
            if bucket.element.take().is_some() {
                bucket.generation = bucket.generation.wrapping_add(1);
            }
            self.free.push(Handle::from_index(index));
        }
    }
}
