use core::{fmt, marker::PhantomData, pin::Pin, ptr::NonNull};

use super::{
    cursor::{Cursor, CursorMut},
    iter::Iter,
    link::LinkState,
    traits::{DefaultTag, Linked, element, node_of},
};

/// A generic intrusive circular doubly linked list.
///
/// The list owns a single sentinel node marking the end position; elements
/// are owned by the caller and only their embedded [`Link<Tag>`] is touched.
/// Nothing here ever allocates.
///
/// Every operation that links a node takes the list and the element by
/// [`Pin`]. Elements may be dropped while they are linked: dropping a link
/// removes it from its list first.
///
/// [`Link<Tag>`]: crate::Link
pub struct List<T, Tag = DefaultTag> {
    sentinel: LinkState,
    _marker: PhantomData<(*const T, fn() -> Tag)>,
}

impl<T, Tag> List<T, Tag> {
    /// Creates a new, empty list.
    pub const fn new() -> Self {
        List {
            sentinel: LinkState::new(),
            _marker: PhantomData,
        }
    }
}

impl<T, Tag> List<T, Tag>
where
    T: Linked<Tag>,
{
    #[inline]
    pub(crate) fn sentinel(&self) -> &LinkState {
        &self.sentinel
    }

    /// Check if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sentinel.is_detached()
    }

    /// Get the number of elements in the list.
    ///
    /// This walks the ring and is O(n).
    pub fn len(&self) -> usize {
        let end = self.sentinel.as_ptr();
        let mut current = self.sentinel.next();
        let mut count = 0;
        while current != end {
            count += 1;
            current = unsafe { current.as_ref().next() };
        }
        count
    }

    /// Check if `elem` is a member of this list. O(n).
    pub fn contains(&self, elem: &T) -> bool {
        let target = node_of::<T, Tag>(elem);
        let end = self.sentinel.as_ptr();
        let mut current = self.sentinel.next();
        while current != end {
            if current == target {
                return true;
            }
            current = unsafe { current.as_ref().next() };
        }
        false
    }

    /// Get the first element of the list.
    #[inline]
    pub fn front(&self) -> Option<NonNull<T>> {
        let first = self.sentinel.next();
        (first != self.sentinel.as_ptr()).then(|| element::<T, Tag>(first))
    }

    /// Get the last element of the list.
    #[inline]
    pub fn back(&self) -> Option<NonNull<T>> {
        let last = self.sentinel.prev();
        (last != self.sentinel.as_ptr()).then(|| element::<T, Tag>(last))
    }

    /// Push an element to the back of the list.
    ///
    /// If the element is already a member of a list on the `Tag` channel
    /// (this one or another), it is removed from there first.
    #[inline]
    pub fn push_back(self: Pin<&mut Self>, elem: Pin<&T>) {
        let this = self.as_ref().get_ref();
        this.link_before(this.sentinel.as_ptr(), elem);
    }

    /// Push an element to the front of the list.
    ///
    /// If the element is already a member of a list on the `Tag` channel
    /// (this one or another), it is removed from there first.
    #[inline]
    pub fn push_front(self: Pin<&mut Self>, elem: Pin<&T>) {
        let this = self.as_ref().get_ref();
        this.link_before(this.sentinel.next(), elem);
    }

    /// Pop the first element of the list.
    ///
    /// The element is only unlinked; it is up to the caller to drop it.
    #[inline]
    pub fn pop_front(self: Pin<&mut Self>) -> Option<NonNull<T>> {
        self.as_ref().get_ref().unlink_first()
    }

    /// Pop the last element of the list.
    ///
    /// The element is only unlinked; it is up to the caller to drop it.
    #[inline]
    pub fn pop_back(self: Pin<&mut Self>) -> Option<NonNull<T>> {
        let this = self.as_ref().get_ref();
        let last = this.sentinel.prev();
        if last == this.sentinel.as_ptr() {
            return None;
        }
        unsafe { last.as_ref().unlink() };
        Some(element::<T, Tag>(last))
    }

    /// Unlink every element of the list. O(n).
    pub fn clear(self: Pin<&mut Self>) {
        let this = self.as_ref().get_ref();
        while this.unlink_first().is_some() {}
    }

    /// Move all elements of `source` into `self`, replacing whatever `self`
    /// held before.
    ///
    /// The previous elements of `self` are unlinked. The ring of `source` is
    /// handed over in O(1) and `source` ends up empty.
    pub fn take_from(self: Pin<&mut Self>, source: Pin<&mut Self>) {
        let this = self.as_ref().get_ref();
        while this.unlink_first().is_some() {}
        // Our sentinel is pinned together with `self`.
        unsafe { LinkState::take_over(this.sentinel.as_ptr(), &source.as_ref().get_ref().sentinel) };
    }

    /// Insert `elem` right before `position`.
    ///
    /// `elem` is first removed from wherever it currently is: another position
    /// of this list or another list on the same `Tag` channel. If `elem` is
    /// already at `position` nothing changes.
    ///
    /// Returns a cursor pointing at `elem`.
    pub fn insert<'a>(
        self: Pin<&mut Self>,
        position: Cursor<'a, T, Tag>,
        elem: Pin<&T>,
    ) -> Cursor<'a, T, Tag> {
        let node = self.as_ref().get_ref().link_before(position.state(), elem);
        unsafe { Cursor::new(node, position.end_state()) }
    }

    /// Unlink the element at `position`.
    ///
    /// Returns a cursor to the element that followed it. Erasing the end
    /// position does nothing and returns it unchanged.
    pub fn erase<'a>(self: Pin<&mut Self>, position: Cursor<'a, T, Tag>) -> Cursor<'a, T, Tag> {
        let current = position.state();
        if position.is_end() || current == self.sentinel.as_ptr() {
            return position;
        }

        unsafe {
            let node = current.as_ref();
            let next = node.next();
            node.unlink();
            Cursor::new(next, position.end_state())
        }
    }

    /// Move the elements in `[first, last)` right before `position`.
    ///
    /// Only the four links at the boundaries of the range are rewritten, so
    /// this is O(1) regardless of how many elements are moved. The range may
    /// come from this list or from any other list on the same `Tag` channel.
    ///
    /// # Safety
    ///
    /// `first` and `last` must delimit a contiguous range of a single ring,
    /// with `last` reachable from `first` by moving forward, and `position`
    /// must not lie inside `[first, last)`. The range must not contain the
    /// end position of any list, so a range wrapping around through the end
    /// is not allowed. Debug builds check this for the end of `first`'s list.
    pub unsafe fn splice(
        self: Pin<&mut Self>,
        position: Cursor<'_, T, Tag>,
        first: Cursor<'_, T, Tag>,
        last: Cursor<'_, T, Tag>,
    ) {
        debug_assert!(
            unsafe { Self::range_excludes(first.state(), last.state(), first.end_state()) },
            "Splice range must not contain the end position"
        );
        unsafe { Self::splice_states(position.state(), first.state(), last.state()) };
    }

    /// Move every element of `other` to the back of `self`. O(1).
    pub fn append(self: Pin<&mut Self>, other: Pin<&mut Self>) {
        let this = self.as_ref().get_ref();
        let source = other.as_ref().get_ref();
        if source.is_empty() {
            return;
        }
        unsafe {
            Self::splice_states(
                this.sentinel.as_ptr(),
                source.sentinel.next(),
                source.sentinel.as_ptr(),
            )
        };
    }

    /// Move every element of `other` to the front of `self`. O(1).
    pub fn prepend(self: Pin<&mut Self>, other: Pin<&mut Self>) {
        let this = self.as_ref().get_ref();
        let source = other.as_ref().get_ref();
        if source.is_empty() {
            return;
        }
        unsafe {
            Self::splice_states(
                this.sentinel.next(),
                source.sentinel.next(),
                source.sentinel.as_ptr(),
            )
        };
    }

    /// Get a cursor at the first element, or at the end if the list is empty.
    ///
    /// # Safety
    ///
    /// While the cursor (or any cursor derived from it) is in use, no element
    /// it can reach may be dropped, and the list itself must stay alive.
    #[inline]
    pub unsafe fn begin<'a>(self: Pin<&Self>) -> Cursor<'a, T, Tag> {
        let sentinel = &self.get_ref().sentinel;
        unsafe { Cursor::new(sentinel.next(), sentinel.as_ptr()) }
    }

    /// Get a cursor at the end position.
    ///
    /// # Safety
    ///
    /// See [`List::begin`].
    #[inline]
    pub unsafe fn end<'a>(self: Pin<&Self>) -> Cursor<'a, T, Tag> {
        let sentinel = &self.get_ref().sentinel;
        unsafe { Cursor::new(sentinel.as_ptr(), sentinel.as_ptr()) }
    }

    /// Get a mutable cursor at the first element.
    ///
    /// # Safety
    ///
    /// While the cursor is in use, no element it can reach may be dropped.
    #[inline]
    pub unsafe fn begin_mut(self: Pin<&mut Self>) -> CursorMut<'_, T, Tag> {
        let first = self.sentinel.next();
        unsafe { CursorMut::new(self, first) }
    }

    /// Get a mutable cursor at the end position.
    ///
    /// # Safety
    ///
    /// See [`List::begin_mut`].
    #[inline]
    pub unsafe fn end_mut(self: Pin<&mut Self>) -> CursorMut<'_, T, Tag> {
        let end = self.sentinel.as_ptr();
        unsafe { CursorMut::new(self, end) }
    }

    /// Get a cursor pointing at `elem`.
    ///
    /// # Safety
    ///
    /// `elem` must be a member of this list, and the contract of
    /// [`List::begin`] applies.
    #[inline]
    pub unsafe fn cursor_to<'a>(self: Pin<&Self>, elem: Pin<&T>) -> Cursor<'a, T, Tag> {
        let node = node_of::<T, Tag>(elem.get_ref());
        unsafe { Cursor::new(node, self.get_ref().sentinel.as_ptr()) }
    }

    /// Get an iterator over the list.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the list is not modified while iterating,
    /// and that no element is dropped while the iterator is alive.
    #[inline]
    pub unsafe fn iter(&self) -> Iter<'_, T, Tag> {
        unsafe { Iter::new(self) }
    }

    pub(crate) fn link_before(
        &self,
        position: NonNull<LinkState>,
        elem: Pin<&T>,
    ) -> NonNull<LinkState> {
        let node = node_of::<T, Tag>(elem.get_ref());
        if node != position {
            // `elem` is pinned, and `position` is a live node of a pinned ring.
            unsafe {
                node.as_ref().unlink();
                LinkState::link_before(node, position);
            }
        }
        node
    }

    fn unlink_first(&self) -> Option<NonNull<T>> {
        let first = self.sentinel.next();
        if first == self.sentinel.as_ptr() {
            return None;
        }
        unsafe { first.as_ref().unlink() };
        Some(element::<T, Tag>(first))
    }

    /// Walks `[first, last)` and reports whether `end` stays outside of it.
    ///
    /// # Safety
    ///
    /// `last` must be reachable from `first` by moving forward.
    unsafe fn range_excludes(
        first: NonNull<LinkState>,
        last: NonNull<LinkState>,
        end: NonNull<LinkState>,
    ) -> bool {
        let mut current = first;
        while current != last {
            if current == end {
                return false;
            }
            current = unsafe { current.as_ref().next() };
        }
        true
    }

    /// # Safety
    ///
    /// See [`List::splice`].
    unsafe fn splice_states(
        position: NonNull<LinkState>,
        first: NonNull<LinkState>,
        last: NonNull<LinkState>,
    ) {
        if first == last {
            return;
        }

        unsafe {
            let right = last.as_ref().prev();
            LinkState::join(first.as_ref().prev(), last);
            LinkState::join(position.as_ref().prev(), first);
            LinkState::join(right, position);
        }
    }
}

impl<T, Tag> Default for List<T, Tag> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Tag> fmt::Debug for List<T, Tag>
where
    T: Linked<Tag>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List").field("len", &self.len()).finish()
    }
}
