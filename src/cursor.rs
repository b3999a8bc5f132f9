use core::{fmt, marker::PhantomData, pin::Pin, ptr::NonNull};

use super::{
    link::LinkState,
    list::List,
    traits::{DefaultTag, Linked, element},
};

/// A read-only position in a list's ring.
///
/// A cursor points either at an element or at the end position (the list's
/// sentinel). Movement wraps around: moving forward from the end lands on the
/// first element, moving backward from the first element lands on the end.
///
/// Two cursors are equal when they point at the same position.
pub struct Cursor<'a, T, Tag = DefaultTag> {
    current: NonNull<LinkState>,
    end: NonNull<LinkState>,
    _marker: PhantomData<(&'a T, fn() -> Tag)>,
}

impl<'a, T, Tag> Cursor<'a, T, Tag>
where
    T: Linked<Tag>,
{
    /// # Safety
    ///
    /// `current` and `end` must be live nodes of the same ring for `'a`, and
    /// `end` must be the sentinel of a `List<T, Tag>`.
    #[inline]
    pub(crate) unsafe fn new(current: NonNull<LinkState>, end: NonNull<LinkState>) -> Self {
        Self {
            current,
            end,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> NonNull<LinkState> {
        self.current
    }

    #[inline]
    pub(crate) fn end_state(&self) -> NonNull<LinkState> {
        self.end
    }

    /// Returns `true` if the cursor is at the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.current == self.end
    }

    /// Get the element under the cursor, or `None` at the end position.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.as_ptr().map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Get a raw pointer to the element under the cursor.
    #[inline]
    pub fn as_ptr(&self) -> Option<NonNull<T>> {
        (!self.is_end()).then(|| element::<T, Tag>(self.current))
    }

    /// Move to the next position.
    #[inline]
    pub fn move_next(&mut self) {
        self.current = unsafe { self.current.as_ref().next() };
    }

    /// Move to the previous position.
    #[inline]
    pub fn move_prev(&mut self) {
        self.current = unsafe { self.current.as_ref().prev() };
    }

    /// Returns a cursor at the next position, leaving `self` in place.
    #[inline]
    pub fn peek_next(&self) -> Self {
        let mut next = *self;
        next.move_next();
        next
    }

    /// Returns a cursor at the previous position, leaving `self` in place.
    #[inline]
    pub fn peek_prev(&self) -> Self {
        let mut prev = *self;
        prev.move_prev();
        prev
    }
}

impl<T, Tag> Clone for Cursor<'_, T, Tag> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, Tag> Copy for Cursor<'_, T, Tag> {}

impl<T, Tag> PartialEq for Cursor<'_, T, Tag> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl<T, Tag> Eq for Cursor<'_, T, Tag> {}

impl<T, Tag> fmt::Debug for Cursor<'_, T, Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("current", &self.current)
            .field("is_end", &(self.current == self.end))
            .finish()
    }
}

/// A cursor that can also change the list it points into.
///
/// `insert` and `erase` work at the cursor position. A `CursorMut` converts
/// into a read-only [`Cursor`], never the other way round.
pub struct CursorMut<'a, T, Tag = DefaultTag> {
    current: NonNull<LinkState>,
    list: Pin<&'a mut List<T, Tag>>,
}

impl<'a, T, Tag> CursorMut<'a, T, Tag>
where
    T: Linked<Tag>,
{
    /// # Safety
    ///
    /// `current` must be a live node of `list`'s ring.
    #[inline]
    pub(crate) unsafe fn new(list: Pin<&'a mut List<T, Tag>>, current: NonNull<LinkState>) -> Self {
        Self { current, list }
    }

    #[inline]
    fn end(&self) -> NonNull<LinkState> {
        self.list.sentinel().as_ptr()
    }

    /// Returns `true` if the cursor is at the end position.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.current == self.end()
    }

    /// Get the element under the cursor, or `None` at the end position.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        (!self.is_end()).then(|| unsafe { element::<T, Tag>(self.current).as_ref() })
    }

    /// Move to the next position.
    #[inline]
    pub fn move_next(&mut self) {
        self.current = unsafe { self.current.as_ref().next() };
    }

    /// Move to the previous position.
    #[inline]
    pub fn move_prev(&mut self) {
        self.current = unsafe { self.current.as_ref().prev() };
    }

    /// Insert `elem` right before the cursor position.
    ///
    /// The cursor keeps pointing at the same position. Like
    /// [`List::insert`], `elem` is first removed from wherever it is.
    pub fn insert(&mut self, elem: Pin<&T>) {
        self.list.as_ref().get_ref().link_before(self.current, elem);
    }

    /// Unlink the element under the cursor and move to the one that followed it.
    ///
    /// Returns the unlinked element, or `None` (without moving) at the end
    /// position.
    pub fn erase(&mut self) -> Option<NonNull<T>> {
        if self.is_end() {
            return None;
        }

        let removed = self.current;
        unsafe {
            let node = removed.as_ref();
            self.current = node.next();
            node.unlink();
        }
        Some(element::<T, Tag>(removed))
    }

    /// Returns a read-only cursor at the same position.
    #[inline]
    pub fn as_cursor(&self) -> Cursor<'_, T, Tag> {
        unsafe { Cursor::new(self.current, self.end()) }
    }
}

impl<'a, T, Tag> From<CursorMut<'a, T, Tag>> for Cursor<'a, T, Tag>
where
    T: Linked<Tag>,
{
    fn from(cursor: CursorMut<'a, T, Tag>) -> Self {
        let end = cursor.end();
        unsafe { Cursor::new(cursor.current, end) }
    }
}

impl<T, Tag> fmt::Debug for CursorMut<'_, T, Tag>
where
    T: Linked<Tag>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("current", &self.current)
            .field("is_end", &self.is_end())
            .finish()
    }
}
