use core::{pin::Pin, ptr::NonNull};

use super::link::{Link, LinkState};

/// The link channel used when no tag is named.
#[derive(Debug)]
pub enum DefaultTag {}

/// A trait for a struct that embeds a [`Link<Tag>`].
///
/// Usually implemented with `#[derive(Linked)]`, which emits one impl per
/// `Link` field.
///
/// # Deriving
///
/// A derived struct is always `!Unpin`, so adding an `Unpin` impl by hand is
/// rejected:
///
/// ```compile_fail,E0119
/// use intrusive_list::{Link, Linked};
///
/// #[derive(Linked)]
/// struct Loose {
///     link: Link,
///     value: i32,
/// }
///
/// impl Unpin for Loose {}
/// ```
///
/// Only structs with named fields can be derived:
///
/// ```compile_fail
/// use intrusive_list::{Link, Linked};
///
/// #[derive(Linked)]
/// struct Pair(Link, i32);
/// ```
///
/// ```compile_fail
/// use intrusive_list::Linked;
///
/// #[derive(Linked)]
/// enum Slot {
///     Empty,
/// }
/// ```
///
/// At least one field must be a `Link`:
///
/// ```compile_fail
/// use intrusive_list::Linked;
///
/// #[derive(Linked)]
/// struct Bare {
///     value: i32,
/// }
/// ```
///
/// And no two links may share a tag, even when one of them names the
/// default tag explicitly:
///
/// ```compile_fail
/// use intrusive_list::{DefaultTag, Link, Linked};
///
/// #[derive(Linked)]
/// struct Twice {
///     first: Link,
///     second: Link<DefaultTag>,
/// }
/// ```
///
/// # Safety
///
/// `link` must always return the same field of `self`, and `from_link` must be
/// its exact inverse: given a pointer to that field it must return a pointer
/// to the struct containing it. `Self` must not implement `Unpin`, so that a
/// linked value stays where it is until it is dropped.
pub unsafe trait Linked<Tag = DefaultTag>: Sized {
    /// Get the embedded link for the `Tag` channel.
    fn link(&self) -> &Link<Tag>;

    /// Get the struct that contains the given link.
    ///
    /// # Safety
    ///
    /// `link` must point to the `Tag` link field of a live `Self`.
    unsafe fn from_link(link: NonNull<Link<Tag>>) -> NonNull<Self>;

    /// Move the list position of `source` on the `Tag` channel over to `self`.
    ///
    /// `self` is unlinked from its current position first. If `source` is
    /// linked, `self` ends up exactly where `source` was and `source` becomes
    /// detached; otherwise both end up detached.
    fn take_position(self: Pin<&Self>, source: Pin<&Self>) {
        let node = node_of::<Self, Tag>(self.get_ref());
        // `self` is pinned, so recording its address in the neighbours is sound.
        unsafe { LinkState::take_over(node, <Self as Linked<Tag>>::link(source.get_ref()).state()) };
    }
}

/// Get the ring node of `elem` on the `Tag` channel.
///
/// The pointer is derived from `elem` as a whole rather than from its link
/// field, so it may later be turned back into a pointer to the whole element.
#[inline]
pub(crate) fn node_of<T, Tag>(elem: &T) -> NonNull<LinkState>
where
    T: Linked<Tag>,
{
    let base: *const T = elem;
    let link: *const Link<Tag> = <T as Linked<Tag>>::link(elem);
    let offset = link.addr() - base.addr();
    unsafe { NonNull::new_unchecked(base.cast::<u8>().add(offset).cast_mut().cast()) }
}

/// Get the element owning the ring node `state`.
///
/// Every non-sentinel node of a `List<T, Tag>` ring is the `Tag` link of a `T`.
#[inline]
pub(crate) fn element<T, Tag>(state: NonNull<LinkState>) -> NonNull<T>
where
    T: Linked<Tag>,
{
    unsafe { <T as Linked<Tag>>::from_link(Link::<Tag>::from_state(state)) }
}
