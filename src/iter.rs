use core::{fmt, iter::FusedIterator, marker::PhantomData, ptr::NonNull};

use super::{
    link::LinkState,
    list::List,
    traits::{DefaultTag, Linked, element},
};

/// An iterator over the elements of a [`List`].
///
/// Created by [`List::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T, Tag = DefaultTag> {
    front: NonNull<LinkState>,
    back: NonNull<LinkState>,
    end: NonNull<LinkState>,
    _list: PhantomData<&'a List<T, Tag>>,
}

impl<'a, T, Tag> Iter<'a, T, Tag>
where
    T: Linked<Tag>,
{
    /// Creates a new iterator over the given list.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the list is not modified while the iterator is alive.
    pub(crate) unsafe fn new(list: &'a List<T, Tag>) -> Self {
        let end = list.sentinel();
        Self {
            front: end.next(),
            back: end.prev(),
            end: end.as_ptr(),
            _list: PhantomData,
        }
    }

    #[inline]
    fn get(&self, state: NonNull<LinkState>) -> &'a T {
        unsafe { element::<T, Tag>(state).as_ref() }
    }

    #[inline]
    fn finish(&mut self) {
        self.front = self.end;
        self.back = self.end;
    }
}

impl<'a, T, Tag> Iterator for Iter<'a, T, Tag>
where
    T: Linked<Tag>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.end {
            return None;
        }

        let current = self.front;
        if current == self.back {
            self.finish();
        } else {
            self.front = unsafe { current.as_ref().next() };
        }
        Some(self.get(current))
    }
}

impl<T, Tag> DoubleEndedIterator for Iter<'_, T, Tag>
where
    T: Linked<Tag>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back == self.end {
            return None;
        }

        let current = self.back;
        if current == self.front {
            self.finish();
        } else {
            self.back = unsafe { current.as_ref().prev() };
        }
        Some(self.get(current))
    }
}

impl<T, Tag> FusedIterator for Iter<'_, T, Tag> where T: Linked<Tag> {}

impl<T, Tag> Clone for Iter<'_, T, Tag> {
    fn clone(&self) -> Self {
        Self {
            front: self.front,
            back: self.back,
            end: self.end,
            _list: PhantomData,
        }
    }
}

impl<T, Tag> fmt::Debug for Iter<'_, T, Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}
