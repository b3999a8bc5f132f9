use core::{cell::Cell, fmt, marker::PhantomData, marker::PhantomPinned, ptr::NonNull};

use super::traits::DefaultTag;

/// The raw ring node shared by list elements and list sentinels.
///
/// `None` in either pointer stands for "this node itself": a node that has
/// never been pinned has no stable address to record, so a detached node
/// keeps its pointers empty and resolves them to its own address on demand.
/// Once a node is linked it is pinned and never moves until it is dropped.
pub(crate) struct LinkState {
    prev: Cell<Option<NonNull<LinkState>>>,
    next: Cell<Option<NonNull<LinkState>>>,
    _pin: PhantomPinned,
}

impl LinkState {
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            prev: Cell::new(None),
            next: Cell::new(None),
            _pin: PhantomPinned,
        }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> NonNull<LinkState> {
        NonNull::from(self)
    }

    #[inline]
    pub(crate) fn next(&self) -> NonNull<LinkState> {
        self.next.get().unwrap_or_else(|| self.as_ptr())
    }

    #[inline]
    pub(crate) fn prev(&self) -> NonNull<LinkState> {
        self.prev.get().unwrap_or_else(|| self.as_ptr())
    }

    #[inline]
    pub(crate) fn is_detached(&self) -> bool {
        self.next() == self.as_ptr()
    }

    #[inline]
    fn make_loop(&self) {
        self.prev.set(None);
        self.next.set(None);
    }

    /// Points `a.next` at `b` and `b.prev` at `a`.
    ///
    /// # Safety
    ///
    /// Both pointers must reference live, pinned link states.
    #[inline]
    pub(crate) unsafe fn join(a: NonNull<LinkState>, b: NonNull<LinkState>) {
        unsafe {
            a.as_ref().next.set(Some(b));
            b.as_ref().prev.set(Some(a));
        }
    }

    /// Removes the node from its ring and resets it to a self-loop.
    pub(crate) fn unlink(&self) {
        if self.is_detached() {
            self.make_loop();
            return;
        }

        // Neighbours of a linked node are alive: every node unlinks itself
        // before its memory goes away.
        unsafe { Self::join(self.prev(), self.next()) };
        self.make_loop();
    }

    /// Inserts the detached `node` immediately before `position`.
    ///
    /// # Safety
    ///
    /// `node` must be pinned and detached, `position` must reference a live,
    /// pinned link state.
    #[inline]
    pub(crate) unsafe fn link_before(node: NonNull<LinkState>, position: NonNull<LinkState>) {
        unsafe {
            debug_assert!(node.as_ref().is_detached(), "Node must be detached before linking");
            let prev = position.as_ref().prev();
            Self::join(prev, node);
            Self::join(node, position);
        }
    }

    /// Moves the ring position of `source` over to `node`, leaving `source`
    /// detached. `node` leaves its own ring first.
    ///
    /// # Safety
    ///
    /// `node` must be pinned and live.
    pub(crate) unsafe fn take_over(node: NonNull<LinkState>, source: &LinkState) {
        if node == source.as_ptr() {
            return;
        }

        let this = unsafe { node.as_ref() };
        this.unlink();
        if source.is_detached() {
            return;
        }

        let (prev, next) = (source.prev(), source.next());
        unsafe {
            Self::join(prev, node);
            Self::join(node, next);
        }
        source.make_loop();
    }
}

impl Drop for LinkState {
    fn drop(&mut self) {
        self.unlink();
    }
}

/// A link to be embedded in a struct that takes part in a [`List`].
///
/// `Tag` selects the link channel: a struct embedding several links with
/// different tags can be a member of several lists at the same time.
///
/// Cloning a link never clones list membership: the clone starts detached.
///
/// [`List`]: crate::List
#[repr(transparent)]
pub struct Link<Tag = DefaultTag> {
    state: LinkState,
    _tag: PhantomData<fn() -> Tag>,
}

impl<Tag> Link<Tag> {
    /// Creates a new, detached link.
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: LinkState::new(),
            _tag: PhantomData,
        }
    }

    /// Returns `true` if the link is currently a member of a ring.
    #[inline]
    pub fn is_linked(&self) -> bool {
        !self.state.is_detached()
    }

    /// Removes the link from whatever list holds it.
    ///
    /// The neighbours are stitched together directly, so this is O(1) and
    /// needs no access to the list itself. Calling it on a detached link does
    /// nothing.
    #[inline]
    pub fn unlink(&self) {
        self.state.unlink();
    }

    #[inline]
    pub(crate) fn state(&self) -> &LinkState {
        &self.state
    }

    #[inline]
    pub(crate) fn from_state(state: NonNull<LinkState>) -> NonNull<Self> {
        state.cast()
    }
}

impl<Tag> Default for Link<Tag> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tag> Clone for Link<Tag> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<Tag> fmt::Debug for Link<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("linked", &self.is_linked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use core::pin::pin;

    use super::*;

    #[test]
    fn test_new_link_is_detached() {
        let link = Link::<DefaultTag>::new();
        assert!(!link.is_linked());
        assert_eq!(link.state().next(), link.state().as_ptr());
        assert_eq!(link.state().prev(), link.state().as_ptr());
    }

    #[test]
    fn test_unlink_is_idempotent() {
        let a = pin!(Link::<DefaultTag>::new());
        a.unlink();
        a.unlink();
        assert!(!a.is_linked());
    }

    #[test]
    fn test_ring_of_three_links() {
        let a = pin!(LinkState::new());
        let b = pin!(LinkState::new());
        let c = pin!(LinkState::new());

        unsafe {
            LinkState::link_before(b.as_ptr(), a.as_ptr());
            LinkState::link_before(c.as_ptr(), a.as_ptr());
        }
        // a -> b -> c -> a
        assert_eq!(a.next(), b.as_ptr());
        assert_eq!(b.next(), c.as_ptr());
        assert_eq!(c.next(), a.as_ptr());
        assert_eq!(a.prev(), c.as_ptr());

        b.unlink();
        assert!(b.is_detached());
        assert_eq!(a.next(), c.as_ptr());
        assert_eq!(c.prev(), a.as_ptr());

        c.unlink();
        assert!(a.is_detached());
    }

    #[test]
    fn test_drop_unlinks() {
        let a = pin!(LinkState::new());
        {
            let b = pin!(LinkState::new());
            unsafe { LinkState::link_before(b.as_ptr(), a.as_ptr()) };
            assert!(!a.is_detached());
        }
        assert!(a.is_detached());
    }

    #[test]
    fn test_take_over_linked_source() {
        let head = pin!(LinkState::new());
        let a = pin!(LinkState::new());
        let b = pin!(LinkState::new());
        let c = pin!(LinkState::new());
        unsafe {
            LinkState::link_before(a.as_ptr(), head.as_ptr());
            LinkState::link_before(b.as_ptr(), head.as_ptr());
            LinkState::link_before(c.as_ptr(), head.as_ptr());
        }

        let d = pin!(LinkState::new());
        unsafe { LinkState::take_over(d.as_ptr(), &b) };

        assert!(b.is_detached());
        assert_eq!(a.next(), d.as_ptr());
        assert_eq!(d.next(), c.as_ptr());
        assert_eq!(c.prev(), d.as_ptr());
        assert_eq!(d.prev(), a.as_ptr());
    }

    #[test]
    fn test_take_over_detaches_previous_position() {
        let first = pin!(LinkState::new());
        let x = pin!(LinkState::new());
        let second = pin!(LinkState::new());
        let y = pin!(LinkState::new());
        unsafe {
            LinkState::link_before(x.as_ptr(), first.as_ptr());
            LinkState::link_before(y.as_ptr(), second.as_ptr());
        }

        // x leaves `first` and takes y's place in `second`.
        unsafe { LinkState::take_over(x.as_ptr(), &y) };
        assert!(first.is_detached());
        assert!(y.is_detached());
        assert_eq!(second.next(), x.as_ptr());
        assert_eq!(x.next(), second.as_ptr());
    }

    #[test]
    fn test_take_over_detached_source() {
        let head = pin!(LinkState::new());
        let a = pin!(LinkState::new());
        unsafe { LinkState::link_before(a.as_ptr(), head.as_ptr()) };

        let detached = pin!(LinkState::new());
        unsafe { LinkState::take_over(a.as_ptr(), &detached) };
        assert!(a.is_detached());
        assert!(head.is_detached());
    }

    #[test]
    fn test_clone_is_detached() {
        let head = pin!(Link::<DefaultTag>::new());
        let a = pin!(Link::<DefaultTag>::new());
        unsafe { LinkState::link_before(a.state().as_ptr(), head.state().as_ptr()) };

        let copy = a.clone();
        assert!(a.is_linked());
        assert!(!copy.is_linked());
    }
}
