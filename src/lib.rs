//! # Intrusive Linked List
//!
//! A circular doubly linked list whose links live inside the elements
//! themselves. Adding an element to a list never allocates, and an element can
//! be removed in O(1) given nothing but a reference to it.
//!
//! ## Core Components
//!
//! - [`Link`]: the link to embed in a struct. Its `Tag` parameter selects a
//!   channel, so a struct with several differently tagged links can sit in
//!   several lists at once.
//! - [`Linked`]: maps a struct to one of its links and back. Derive it with
//!   `#[derive(Linked)]`.
//! - [`List`]: the list itself. It owns a sentinel node marking the end
//!   position and nothing else.
//! - [`Cursor`] and [`CursorMut`]: positions in a list, used for traversal and
//!   as anchors for `insert`, `erase` and `splice`.
//!
//! ## Safety
//!
//! Linked nodes are pinned and unlink themselves when dropped, so inserting
//! and removing elements is safe. Reading elements back out of a list is not:
//! the list cannot know when the owner of an element drops it. The caller is
//! responsible for the following invariants:
//!
//! - Elements must not be dropped while a cursor or iterator that can reach
//!   them is in use.
//! - When iterating, the list must not be modified.
//! - A range handed to [`List::splice`] must be a contiguous span of one list.
//!
//! # Examples
//!
//! ```
//! use core::pin::pin;
//! use intrusive_list::{Link, Linked, List};
//!
//! #[derive(Linked)]
//! struct Item {
//!     link: Link,
//!     value: i32,
//! }
//!
//! let mut list = pin!(List::<Item>::new());
//! let one = pin!(Item { link: Link::new(), value: 1 });
//! let two = pin!(Item { link: Link::new(), value: 2 });
//! let three = pin!(Item { link: Link::new(), value: 3 });
//!
//! list.as_mut().push_back(one.as_ref());
//! list.as_mut().push_back(two.as_ref());
//! list.as_mut().push_front(three.as_ref());
//! assert_eq!(list.len(), 3);
//!
//! let values: Vec<i32> = unsafe { list.iter() }.map(|item| item.value).collect();
//! assert_eq!(values, vec![3, 1, 2]);
//!
//! two.link.unlink();
//! let values: Vec<i32> = unsafe { list.iter() }.map(|item| item.value).collect();
//! assert_eq!(values, vec![3, 1]);
//! ```
#![no_std]

mod cursor;
mod iter;
mod link;
mod list;
mod traits;

#[cfg(test)]
mod tests;

pub use cursor::{Cursor, CursorMut};
pub use intrusive_list_derive::Linked;
pub use iter::Iter;
pub use link::Link;
pub use list::List;
pub use traits::{DefaultTag, Linked};

#[doc(hidden)]
pub mod __private {
    use core::marker::PhantomData;

    /// Named by the `Unpin` impl `#[derive(Linked)]` emits. The impl's bound
    /// never holds, which keeps derived structs `!Unpin`.
    pub struct Wrapper<'a, T: ?Sized>(PhantomData<&'a ()>, T);

    impl<T: ?Sized> Unpin for Wrapper<'_, T> where T: Unpin {}
}
