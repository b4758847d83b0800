// Copyright (c) 2019-present Dmitry Stepanov and Fyrox Engine contributors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! A generational arena - a contiguous growable array type which allows removing
//! from the middle without shifting and therefore without invalidating other indices.
//!
//! Pool is a contiguous block of memory with fixed-size entries, each entry can be
//! either vacant or occupied. When you put an object into the pool you get a handle to
//! that object. A handle is valid only as long as the generation stored in the handle
//! matches the generation stored in the pool record it points at - this protects against
//! a handle that still has a valid index but whose slot has since been recycled for a
//! different object.

pub mod handle;

pub use handle::Handle;

const INVALID_GENERATION: u32 = 0;

#[derive(Debug)]
struct PoolRecord<T> {
    generation: u32,
    payload: Option<T>,
}

/// Generational arena used throughout the engine to store rigid bodies, colliders and
/// contact manifolds with stable, reusable indices.
#[derive(Debug)]
pub struct Pool<T> {
    records: Vec<PoolRecord<T>>,
    free_stack: Vec<u32>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    #[inline]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            free_stack: Vec::new(),
        }
    }

    #[inline]
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            records: Vec::with_capacity(capacity as usize),
            free_stack: Vec::new(),
        }
    }

    fn records_get(&self, index: u32) -> Option<&PoolRecord<T>> {
        self.records.get(index as usize)
    }

    fn records_get_mut(&mut self, index: u32) -> Option<&mut PoolRecord<T>> {
        self.records.get_mut(index as usize)
    }

    #[inline]
    #[must_use]
    pub fn spawn(&mut self, payload: T) -> Handle<T> {
        self.spawn_with(|_| payload)
    }

    /// Constructs a value with the handle it will be given - useful when the payload
    /// needs to store its own handle (e.g. a rigid body referring back to itself).
    #[inline]
    #[must_use]
    pub fn spawn_with<F: FnOnce(Handle<T>) -> T>(&mut self, callback: F) -> Handle<T> {
        if let Some(free_index) = self.free_stack.pop() {
            let record = self
                .records_get_mut(free_index)
                .expect("free stack contained invalid index");

            assert!(
                record.payload.is_none(),
                "attempt to spawn at occupied pool record {free_index}"
            );

            let generation = record.generation + 1;
            let handle = Handle::new(free_index, generation);

            let payload = callback(handle);

            record.generation = generation;
            record.payload = Some(payload);
            handle
        } else {
            let generation = 1;
            let handle = Handle::new(self.records.len() as u32, generation);

            let payload = callback(handle);

            self.records.push(PoolRecord {
                generation,
                payload: Some(payload),
            });

            handle
        }
    }

    #[inline]
    pub fn borrow(&self, handle: Handle<T>) -> &T {
        self.try_borrow(handle)
            .unwrap_or_else(|| panic!("invalid pool handle {handle:?}"))
    }

    #[inline]
    pub fn borrow_mut(&mut self, handle: Handle<T>) -> &mut T {
        self.try_borrow_mut(handle)
            .unwrap_or_else(|| panic!("invalid pool handle {handle:?}"))
    }

    #[inline]
    pub fn try_borrow(&self, handle: Handle<T>) -> Option<&T> {
        self.records_get(handle.index()).and_then(|record| {
            if record.generation == handle.generation() {
                record.payload.as_ref()
            } else {
                None
            }
        })
    }

    #[inline]
    pub fn try_borrow_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.records_get_mut(handle.index()).and_then(|record| {
            if record.generation == handle.generation() {
                record.payload.as_mut()
            } else {
                None
            }
        })
    }

    /// Borrows two distinct elements mutably at once. Panics if the handles alias.
    #[inline]
    pub fn borrow_two_mut(&mut self, handles: (Handle<T>, Handle<T>)) -> (&mut T, &mut T) {
        assert_ne!(
            handles.0.index(),
            handles.1.index(),
            "borrow_two_mut requires distinct handles"
        );
        let (a, b) = self
            .records
            .split_at_mut(handles.1.index().max(handles.0.index()) as usize);
        let (first, second) = if handles.0.index() < handles.1.index() {
            (
                a[handles.0.index() as usize].payload.as_mut(),
                b[0].payload.as_mut(),
            )
        } else {
            (
                b[0].payload.as_mut(),
                a[handles.1.index() as usize].payload.as_mut(),
            )
        };
        (
            first.expect("invalid pool handle"),
            second.expect("invalid pool handle"),
        )
    }

    /// Moves the object at `handle` out of the pool, freeing its slot.
    #[inline]
    pub fn free(&mut self, handle: Handle<T>) -> T {
        self.try_free(handle)
            .unwrap_or_else(|| panic!("attempt to free invalid pool handle {handle:?}"))
    }

    #[inline]
    pub fn try_free(&mut self, handle: Handle<T>) -> Option<T> {
        let index = handle.index();
        let generation = handle.generation();
        let record = self.records_get_mut(index)?;
        if record.generation != generation {
            return None;
        }
        let payload = record.payload.take()?;
        self.free_stack.push(index);
        Some(payload)
    }

    #[inline]
    #[must_use]
    pub fn get_capacity(&self) -> u32 {
        self.records.len() as u32
    }

    #[inline]
    pub fn clear(&mut self) {
        self.records.clear();
        self.free_stack.clear();
    }

    #[inline]
    #[must_use]
    pub fn at(&self, n: u32) -> Option<&T> {
        self.records_get(n).and_then(|rec| rec.payload.as_ref())
    }

    #[inline]
    #[must_use]
    pub fn at_mut(&mut self, n: u32) -> Option<&mut T> {
        self.records_get_mut(n).and_then(|rec| rec.payload.as_mut())
    }

    #[inline]
    #[must_use]
    pub fn handle_from_index(&self, n: u32) -> Handle<T> {
        if let Some(record) = self.records_get(n) {
            if record.generation != INVALID_GENERATION {
                return Handle::new(n, record.generation);
            }
        }
        Handle::NONE
    }

    /// Exact number of alive objects. `O(n)`.
    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> u32 {
        self.iter().count() as u32
    }

    /// Total number of allocated slots, alive or free. `O(1)`.
    #[inline]
    pub fn total_count(&self) -> u32 {
        self.records.len() as u32 - self.free_stack.len() as u32
    }

    #[inline]
    pub fn is_valid_handle(&self, handle: Handle<T>) -> bool {
        self.records_get(handle.index())
            .is_some_and(|r| r.generation == handle.generation() && r.payload.is_some())
    }

    #[inline]
    pub fn handle_of(&self, ptr: &T) -> Handle<T> {
        let ptr = ptr as *const T as usize;
        for (i, record) in self.records.iter().enumerate() {
            if let Some(payload) = record.payload.as_ref() {
                if payload as *const T as usize == ptr {
                    return Handle::new(i as u32, record.generation);
                }
            }
        }
        Handle::NONE
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter().filter_map(|r| r.payload.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.records.iter_mut().filter_map(|r| r.payload.as_mut())
    }

    pub fn pair_iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.records.iter().enumerate().filter_map(|(i, r)| {
            r.payload
                .as_ref()
                .map(|p| (Handle::new(i as u32, r.generation), p))
        })
    }

    pub fn pair_iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.records.iter_mut().enumerate().filter_map(|(i, r)| {
            let generation = r.generation;
            r.payload
                .as_mut()
                .map(|p| (Handle::new(i as u32, generation), p))
        })
    }

    /// Keeps only the elements for which `pred` returns `true`, freeing the rest.
    pub fn retain<F>(&mut self, mut pred: F)
    where
        F: FnMut(&T) -> bool,
    {
        for (index, record) in self.records.iter_mut().enumerate() {
            let keep = record
                .payload
                .as_ref()
                .map(|payload| pred(payload))
                .unwrap_or(true);
            if !keep {
                record.payload = None;
                self.free_stack.push(index as u32);
            }
        }
    }
}

impl<T> std::ops::Index<Handle<T>> for Pool<T> {
    type Output = T;

    #[inline]
    fn index(&self, handle: Handle<T>) -> &Self::Output {
        self.borrow(handle)
    }
}

impl<T> std::ops::IndexMut<Handle<T>> for Pool<T> {
    #[inline]
    fn index_mut(&mut self, handle: Handle<T>) -> &mut Self::Output {
        self.borrow_mut(handle)
    }
}

impl<T> std::iter::FromIterator<T> for Pool<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut pool = Pool::new();
        for item in iter {
            pool.spawn(item);
        }
        pool
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn spawn_and_free_reuses_slot_with_bumped_generation() {
        let mut pool = Pool::new();
        let a = pool.spawn(1);
        assert_eq!(*pool.borrow(a), 1);

        pool.free(a);
        assert!(pool.try_borrow(a).is_none());

        let b = pool.spawn(2);
        assert_eq!(b.index(), a.index());
        assert_eq!(b.generation(), a.generation() + 1);
        assert_eq!(*pool.borrow(b), 2);

        // Stale handle must not resolve to the new payload.
        assert!(pool.try_borrow(a).is_none());
    }

    #[test]
    fn alive_and_total_count_track_free_stack() {
        let mut pool = Pool::new();
        let a = pool.spawn(1);
        let _b = pool.spawn(2);
        assert_eq!(pool.alive_count(), 2);
        assert_eq!(pool.total_count(), 2);

        pool.free(a);
        assert_eq!(pool.alive_count(), 1);
        assert_eq!(pool.total_count(), 1);
    }

    #[test]
    fn retain_frees_rejected_elements() {
        let mut pool = Pool::new();
        for i in 0..5 {
            pool.spawn(i);
        }
        pool.retain(|v| *v % 2 == 0);
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn pair_iter_yields_stable_handles() {
        let mut pool = Pool::new();
        let h1 = pool.spawn("a");
        let h2 = pool.spawn("b");
        let pairs: Vec<_> = pool.pair_iter().collect();
        assert_eq!(pairs, vec![(h1, &"a"), (h2, &"b")]);
    }
}
