extern crate std;

use std::vec::Vec;

use crate::{Link, Linked, List};


#[derive(Linked)]
#[linked(crate_path = "crate")]
struct Item {
    link: Link,
    value: i32,
}

impl Item {
    fn new(value: i32) -> Self {
        Item {
            link: Link::new(),
            value,
        }
    }
}

/// Collects the values of `list` front to back.
fn values(list: &List<Item>) -> Vec<i32> {
    unsafe { list.iter() }.map(|item| item.value).collect()
}

/// Collects the values of `list` back to front.
fn values_rev(list: &List<Item>) -> Vec<i32> {
    unsafe { list.iter() }.rev().map(|item| item.value).collect()
}
