//! An intrusive AVL tree.

// Conventions used in comments:
// - The balance factor of a node `x` is denoted `b(x)` and is defined as
//   `height(right(x)) - height(left(x))`.
// - A node is left-heavy if `b < 0` and right-heavy if `b > 0`.
//
// The fundamental invariants of the tree are:
// 1. BST order: all keys in a node's left subtree compare less than its key,
//    all keys in its right subtree compare greater. Duplicates are never stored.
// 2. `b(x) ∈ {-1, 0, +1}` for every node whenever no operation is in flight.
//    `b(x) = ±2` occurs only transiently inside a rebalance pass, on the one
//    node about to be rotated.
// 3. For any node `p` with child `c`, `c`'s parent link points at `p`. Parent
//    links are non-owning; ownership flows strictly downward from the root.
//
// Balance factors are maintained incrementally. An insertion increments or
// decrements factors along the walk from the new leaf toward the root and
// performs at most one rotation. A removal walks the same way from the unlink
// point but may rotate at every level, because shrinking a subtree can shorten
// its ancestors in turn.

use core::{cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, pin::Pin};
use std::{borrow::Borrow, ptr::NonNull};

use cordyceps::Linked;

mod debug;
mod iter;
pub mod set;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

pub use iter::Iter;
pub use set::AvlSet;

/// A node type that can be a member of an [`AvlTree`].
pub trait TreeNode<L>: Linked<L> {
    type Key: Ord;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree.
///
/// The tree does not allocate: each element embeds a [`Links`] block, and the
/// tree links elements through it. An element is owned by the tree (via its
/// [`Linked::Handle`]) from the moment it is inserted until it is removed or
/// the tree is dropped.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

/// Intrusive link block embedded in every tree member.
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    // Balance delta contributed by one level of subtree growth on this side.
    fn growth(self) -> i8 {
        match self {
            Dir::Left => -1,
            Dir::Right => 1,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    balance: i8,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns a reference to the root element, if any.
    ///
    /// Exposed for inspection and testing; the root carries no contractual
    /// meaning beyond being the element all others descend from.
    #[doc(hidden)]
    pub fn root(&self) -> Option<Pin<&T>> {
        self.root.map(|root| unsafe { Pin::new_unchecked(root.as_ref()) })
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let mut count = 0;

        if let Some(root) = self.root {
            unsafe {
                assert!(
                    T::links(root).as_ref().parent().is_none(),
                    "the root must not have a parent"
                );
                self.assert_invariants_at(root, &mut count);
            }
        }

        assert_eq!(self.len, count, "len must equal the number of reachable nodes");

        // Strictly ascending in-order traversal implies the BST invariant for
        // the tree as a whole; the per-edge checks above cannot see past one
        // level.
        let mut iter = self.iter();
        if let Some(first) = iter.next() {
            let mut prev = first.key();

            for node in iter {
                assert!(prev < node.key(), "in-order traversal must be strictly ascending");
                prev = node.key();
            }
        }
    }

    // Checks balance factors against independently computed subtree heights,
    // parent link agreement and per-edge key order. Returns the height of the
    // subtree rooted at `node`.
    #[allow(clippy::only_used_in_recursion)]
    unsafe fn assert_invariants_at(&self, node: NonNull<T>, count: &mut usize) -> usize {
        unsafe {
            *count += 1;

            let mut heights = [0usize; 2];

            for dir in [Dir::Left, Dir::Right] {
                if let Some(child) = T::links(node).as_ref().child(dir) {
                    let parent = T::links(child)
                        .as_ref()
                        .parent()
                        .expect("child parent pointer not set");
                    assert_eq!(parent, node, "child parent pointer must point at its owner");

                    let ordering = child.as_ref().key().cmp(node.as_ref().key());
                    let expected = match dir {
                        Dir::Left => Ordering::Less,
                        Dir::Right => Ordering::Greater,
                    };
                    assert_eq!(ordering, expected, "child key on the wrong side of its parent");

                    heights[dir as usize] = self.assert_invariants_at(child, count);
                }
            }

            let balance = T::links(node).as_ref().balance();
            assert_eq!(
                balance as isize,
                heights[1] as isize - heights[0] as isize,
                "stored balance factor does not match subtree heights"
            );
            assert!(balance.abs() <= 1, "balance factor out of range");

            1 + heights[0].max(heights[1])
        }
    }

    /// Returns the height of the tree, counting nodes along the longest
    /// root-to-leaf path.
    #[doc(hidden)]
    pub fn height(&self) -> usize {
        self.root.map(|root| unsafe { self.height_at(root) }).unwrap_or(0)
    }

    #[allow(clippy::only_used_in_recursion)]
    unsafe fn height_at(&self, node: NonNull<T>) -> usize {
        unsafe {
            let left = T::links(node)
                .as_ref()
                .left()
                .map(|child| self.height_at(child))
                .unwrap_or(0);
            let right = T::links(node)
                .as_ref()
                .right()
                .map(|child| self.height_at(child))
                .unwrap_or(0);

            1 + left.max(right)
        }
    }

    /// Returns `true` if an element with the given key is in the tree.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    /// Returns a reference to the element corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => opt_cur = T::links(cur).as_ref().left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = T::links(cur).as_ref().right(),
                }
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        let mut cur = self.root?;

        unsafe {
            while let Some(left) = T::links(cur).as_ref().left() {
                cur = left;
            }

            Some(Pin::new_unchecked(cur.as_ref()))
        }
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        let mut cur = self.root?;

        unsafe {
            while let Some(right) = T::links(cur).as_ref().right() {
                cur = right;
            }

            Some(Pin::new_unchecked(cur.as_ref()))
        }
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let mut cur = self.root?;

        unsafe {
            while let Some(left) = T::links(cur).as_ref().left() {
                cur = left;
            }

            Some(self.remove_at(cur))
        }
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let mut cur = self.root?;

        unsafe {
            while let Some(right) = T::links(cur).as_ref().right() {
                cur = right;
            }

            Some(self.remove_at(cur))
        }
    }

    /// Returns an iterator yielding the elements of the tree in ascending key
    /// order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { T::links(node).as_mut().set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with
    // `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that the following conditions hold:
    // - `old_child` is a child node of `parent`.
    // - `new_child` is not a child node of `parent`.
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            let links = T::links(parent).as_mut();

            if links.left() == Some(old_child) {
                if new_child.is_some() {
                    debug_assert_ne!(
                        links.right(),
                        new_child,
                        "`new_child` must not be a child of `parent`"
                    );
                }
                links.set_left(new_child);
            } else {
                debug_assert_eq!(
                    links.right(),
                    Some(old_child),
                    "`old_child` must be a child of `parent`"
                );
                links.set_right(new_child);
            }
        }
    }

    unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if unsafe { T::links(parent).as_ref().left() } == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    // Returns the minimum node in the subtree.
    //
    // If the subtree root is not the minimum, also returns the minimum node's
    // parent.
    #[inline]
    unsafe fn min_in_subtree(&self, root: NonNull<T>) -> (NonNull<T>, Option<NonNull<T>>) {
        let mut parent = None;
        let mut cur = root;

        while let Some(left) = unsafe { T::links(cur).as_ref().left() } {
            parent = Some(cur);
            cur = left;
        }

        (cur, parent)
    }

    // Rotations ==============================================================
    //
    // Each primitive takes the unbalanced subtree root `x` and returns the new
    // subtree root. Balance factors of the nodes involved are recomputed from
    // their pre-rotation values alone; the identities below are exact for any
    // inputs, transient ±2 included, so the compound rotations are plain
    // compositions of the two singles.

    // Moves `x.right` up into `x`'s position; `x` becomes its left child.
    fn rotate_left(&mut self, x: NonNull<T>) -> NonNull<T> {
        unsafe {
            let y = T::links(x)
                .as_ref()
                .right()
                .expect("left rotation requires a right child");
            let across = T::links(y).as_ref().left();

            T::links(x).as_mut().set_right(across);
            self.maybe_set_parent(across, Some(x));

            T::links(y).as_mut().set_left(Some(x));
            let parent = T::links(x).as_mut().set_parent(Some(y));
            T::links(y).as_mut().set_parent(parent);
            self.replace_child_or_set_root(parent, x, Some(y));

            let y_pre = T::links(y).as_ref().balance();
            let x_balance = T::links(x).as_ref().balance() - 1 - y_pre.max(0);
            let y_balance = y_pre - 1 + x_balance.min(0);
            T::links(x).as_mut().set_balance(x_balance);
            T::links(y).as_mut().set_balance(y_balance);

            y
        }
    }

    // Mirror image of `rotate_left`.
    fn rotate_right(&mut self, x: NonNull<T>) -> NonNull<T> {
        unsafe {
            let y = T::links(x)
                .as_ref()
                .left()
                .expect("right rotation requires a left child");
            let across = T::links(y).as_ref().right();

            T::links(x).as_mut().set_left(across);
            self.maybe_set_parent(across, Some(x));

            T::links(y).as_mut().set_right(Some(x));
            let parent = T::links(x).as_mut().set_parent(Some(y));
            T::links(y).as_mut().set_parent(parent);
            self.replace_child_or_set_root(parent, x, Some(y));

            let y_pre = T::links(y).as_ref().balance();
            let x_balance = T::links(x).as_ref().balance() + 1 - y_pre.min(0);
            let y_balance = y_pre + 1 + x_balance.max(0);
            T::links(x).as_mut().set_balance(x_balance);
            T::links(y).as_mut().set_balance(y_balance);

            y
        }
    }

    // Double rotation for the left-right case: `x` is left-heavy and its left
    // child is right-heavy. The left child's right child ends up as subtree
    // root.
    fn rotate_left_right(&mut self, x: NonNull<T>) -> NonNull<T> {
        let y = unsafe {
            T::links(x)
                .as_ref()
                .left()
                .expect("double rotation requires a left child")
        };

        self.rotate_left(y);
        self.rotate_right(x)
    }

    // Double rotation for the right-left case, mirror image of
    // `rotate_left_right`.
    fn rotate_right_left(&mut self, x: NonNull<T>) -> NonNull<T> {
        let y = unsafe {
            T::links(x)
                .as_ref()
                .right()
                .expect("double rotation requires a right child")
        };

        self.rotate_right(y);
        self.rotate_left(x)
    }

    /// Inserts an element into the tree.
    ///
    /// If an element with an equal key is already present, the tree is
    /// unchanged and `item` is handed back to the caller; otherwise returns
    /// `None`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> Option<T::Handle> {
        let ptr = T::into_ptr(item);

        let Some(root) = self.root else {
            // Tree is empty. Set `item` as the root and return.
            unsafe { T::links(ptr).as_mut().clear() };

            self.root = Some(ptr);
            self.len += 1;
            return None;
        };

        // Descend the tree, looking for a vacant slot.
        let mut cur = root;
        let dir = loop {
            let ordering = unsafe { ptr.as_ref().key().cmp(cur.as_ref().key()) };

            let dir = match ordering {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                // An equal key is already present; hand the element back.
                Ordering::Equal => return Some(unsafe { T::from_ptr(ptr) }),
            };

            match unsafe { T::links(cur).as_ref().child(dir) } {
                Some(child) => cur = child,
                None => break dir,
            }
        };

        unsafe {
            let links = T::links(ptr).as_mut();
            links.clear();
            links.set_parent(Some(cur));

            T::links(cur).as_mut().set_child(dir, Some(ptr));
        }

        self.len += 1;
        self.rebalance_inserted(ptr);

        None
    }

    // Performs a bottom-up rebalance of the tree after the insertion of
    // `node`, which must be a freshly attached leaf.
    //
    // At each step the parent's balance factor absorbs the growth of the side
    // ascended from:
    // - the factor reaches 0: the parent's height is unchanged, stop;
    // - the factor reaches ±1: the parent grew by one, keep ascending;
    // - the factor reaches ±2: rotate once and stop. A single rotation always
    //   restores the height the subtree had before the insertion, so no
    //   ancestor can be affected.
    fn rebalance_inserted(&mut self, node: NonNull<T>) {
        let mut child = node;
        let mut opt_parent = unsafe { T::links(child).as_ref().parent() };

        while let Some(parent) = opt_parent {
            unsafe {
                let dir = self.which_child(parent, child);
                let balance = T::links(parent).as_ref().balance() + dir.growth();

                match balance {
                    0 => {
                        T::links(parent).as_mut().set_balance(0);
                        break;
                    }

                    -1 | 1 => {
                        T::links(parent).as_mut().set_balance(balance);
                        child = parent;
                        opt_parent = T::links(parent).as_ref().parent();
                    }

                    _ => {
                        T::links(parent).as_mut().set_balance(balance);

                        // `child` sits on the heavy side and cannot be even:
                        // had its own insertion step left it balanced, the
                        // walk would have stopped there.
                        if T::links(child).as_ref().balance().signum() == balance.signum() {
                            match dir {
                                Dir::Right => self.rotate_left(parent),
                                Dir::Left => self.rotate_right(parent),
                            };
                        } else {
                            match dir {
                                Dir::Right => self.rotate_right_left(parent),
                                Dir::Left => self.rotate_left_right(parent),
                            };
                        }

                        break;
                    }
                }
            }
        }
    }

    /// Removes the element with the given key from the tree, returning its
    /// handle.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(unsafe { self.remove_at(node) })
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element
    /// of `self`, and not any other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        // There are three possible cases:
        //
        // 1. `node` is a leaf. Detach it; its parent's subtree on that side
        //    shrank by one.
        //
        // 2. `node` has one child. The child is spliced into `node`'s
        //    position; again the parent's subtree on `node`'s side shrank.
        //
        // 3. `node` has two children. `node`'s successor, the minimum of the
        //    right subtree, has no left child by construction. It is unlinked
        //    from its own slot the way case 1 or 2 would unlink it, then takes
        //    over `node`'s position and balance factor wholesale. The subtree
        //    that shrank is the one the successor vacated: its former parent's
        //    left side, or the spliced successor's own right side when the
        //    successor was `node`'s right child.
        //
        // After the physical unlink, `rebalance_removed` restores the balance
        // invariant walking up from the vacated edge.

        unsafe {
            let parent = T::links(node).as_ref().parent();
            let left = T::links(node).as_ref().left();
            let right = T::links(node).as_ref().right();

            match (left, right) {
                (Some(left), Some(right)) => {
                    let (successor, successor_parent) = self.min_in_subtree(right);

                    if let Some(successor_parent) = successor_parent {
                        // Unlink the successor, elevating its right child.
                        let successor_right = T::links(successor).as_ref().right();
                        T::links(successor_parent).as_mut().set_left(successor_right);
                        self.maybe_set_parent(successor_right, Some(successor_parent));

                        T::links(successor).as_mut().set_right(Some(right));
                        T::links(right).as_mut().set_parent(Some(successor));
                    }

                    // Transfer position and balance of `node` to `successor`.
                    let balance = T::links(node).as_ref().balance();
                    T::links(successor).as_mut().set_balance(balance);
                    T::links(successor).as_mut().set_left(Some(left));
                    T::links(left).as_mut().set_parent(Some(successor));
                    T::links(successor).as_mut().set_parent(parent);
                    self.replace_child_or_set_root(parent, node, Some(successor));

                    match successor_parent {
                        Some(sp) => self.rebalance_removed(sp, Dir::Left),
                        None => self.rebalance_removed(successor, Dir::Right),
                    }
                }

                (Some(child), None) | (None, Some(child)) => {
                    let dir = parent.map(|p| self.which_child(p, node));

                    self.replace_child_or_set_root(parent, node, Some(child));
                    T::links(child).as_mut().set_parent(parent);

                    if let (Some(parent), Some(dir)) = (parent, dir) {
                        self.rebalance_removed(parent, dir);
                    }
                }

                (None, None) => {
                    let dir = parent.map(|p| self.which_child(p, node));

                    self.replace_child_or_set_root(parent, node, None);

                    if let (Some(parent), Some(dir)) = (parent, dir) {
                        self.rebalance_removed(parent, dir);
                    }
                }
            }

            self.len -= 1;

            T::links(node).as_mut().clear();
            T::from_ptr(node)
        }
    }

    // Performs a bottom-up rebalance after a removal. `dir` names the side of
    // `parent` whose subtree just shrank by one level.
    //
    // Unlike insertion, a removal can shorten subtrees all the way up: every
    // step that leaves an ancestor's factor at 0, and every rotation around an
    // ancestor whose heavy child was not even, shortens that ancestor and must
    // propagate. The one terminal rotation case is an even heavy child, which
    // restores balance without changing the subtree's height.
    unsafe fn rebalance_removed(&mut self, mut parent: NonNull<T>, mut dir: Dir) {
        loop {
            unsafe {
                let balance = T::links(parent).as_ref().balance() - dir.growth();

                match balance {
                    -1 | 1 => {
                        // The parent was even; it leans now, but its height is
                        // unchanged.
                        T::links(parent).as_mut().set_balance(balance);
                        return;
                    }

                    0 => {
                        // The parent shrank along with the removed side.
                        T::links(parent).as_mut().set_balance(0);

                        let Some(grandparent) = T::links(parent).as_ref().parent() else {
                            return;
                        };

                        dir = self.which_child(grandparent, parent);
                        parent = grandparent;
                    }

                    _ => {
                        T::links(parent).as_mut().set_balance(balance);

                        let heavy = if balance > 0 {
                            T::links(parent).as_ref().right()
                        } else {
                            T::links(parent).as_ref().left()
                        }
                        .expect("a node two levels out of balance has a heavy child");
                        let heavy_balance = T::links(heavy).as_ref().balance();

                        let subtree = if balance > 0 {
                            if heavy_balance >= 0 {
                                self.rotate_left(parent)
                            } else {
                                self.rotate_right_left(parent)
                            }
                        } else if heavy_balance <= 0 {
                            self.rotate_right(parent)
                        } else {
                            self.rotate_left_right(parent)
                        };

                        if heavy_balance == 0 {
                            // The single rotation around an even heavy child
                            // rebalances without shortening the subtree.
                            return;
                        }

                        let Some(grandparent) = T::links(subtree).as_ref().parent() else {
                            return;
                        };

                        dir = self.which_child(grandparent, subtree);
                        parent = grandparent;
                    }
                }
            }
        }
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let (cur, parent) = self.min_in_subtree(cur);
                let parent = parent.or_else(|| T::links(cur).as_ref().parent());

                let right = T::links(cur).as_ref().right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);
                self.maybe_set_parent(right, parent);

                // Drop the node.
                drop(T::from_ptr(cur));
                self.len -= 1;

                // If the node had no right child, climb to the parent. If the
                // node had no parent, the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                balance: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn balance(&self) -> i8 {
        unsafe { (*self.inner.get()).balance }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<T>) -> Link<T> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_balance(&mut self, balance: i8) {
        self.inner.get_mut().balance = balance;
    }

    #[inline]
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.balance = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("balance", &self.balance())
            .finish_non_exhaustive()
    }
}
