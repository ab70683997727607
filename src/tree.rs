use std::{borrow::Borrow, fmt::Debug, marker::PhantomData};

use log::{debug, trace};

use crate::{ComingFrom, Error, Node, NodePtr, RBTree, Result, Root, alloc};

impl<K> Drop for RBTree<K> {
    fn drop(&mut self) {
        self.free_nodes();
    }
}

impl<K> Default for RBTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> RBTree<K> {
    pub const fn new() -> Self {
        RBTree {
            root: Root::new(),
            len: 0,
            _marker: PhantomData,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of stored keys, duplicates included.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// The smallest key.
    pub fn first(&self) -> Option<&K> {
        // SAFETY: the node is owned by self and outlives the borrow.
        self.root.first().map(|e| unsafe { e.as_ref() }.key())
    }

    /// The largest key.
    pub fn last(&self) -> Option<&K> {
        // SAFETY: the node is owned by self and outlives the borrow.
        self.root.last().map(|e| unsafe { e.as_ref() }.key())
    }

    pub fn clear(&mut self) {
        debug!("clearing a tree of {} keys", self.len);
        self.free_nodes();
    }

    /// Keys in order; crate-internal, used by formatting and tests.
    pub(crate) fn keys(&self) -> Keys<'_, K> {
        Keys {
            current: self.root.first(),
            _phantom: PhantomData,
        }
    }

    // Drop; don't call erase => needless rebalancing. Children are cut off
    // before descending so every node is visited once, and a node is only
    // freed once both of its subtrees are gone.
    fn free_nodes(&mut self) {
        let mut current = self.root.take();
        while let Some(mut node) = current {
            // SAFETY: nodes below a live node are live; parents outlive children.
            let node_ref = unsafe { node.as_mut() };
            if let Some(left) = node_ref.left.take() {
                current = Some(left);
                continue;
            }
            if let Some(right) = node_ref.right.take() {
                current = Some(right);
                continue;
            }
            current = node_ref.parent();
            // SAFETY: nothing links to node anymore: its parent's link was
            // taken above and both its children are freed.
            drop(unsafe { alloc::own_back(node) });
        }
        self.len = 0;
    }
}

impl<K: Ord> RBTree<K> {
    /// Adds `key`; a key equal to stored ones lands after them.
    pub fn insert(&mut self, key: K) {
        let mut parent = None;
        let mut direction = ComingFrom::Left;
        let mut current = self.root.root();
        while let Some(candidate) = current {
            parent = current;
            // SAFETY: links reachable from the root point to live nodes.
            let candidate = unsafe { candidate.as_ref() };
            (direction, current) = if key < *candidate.key() {
                (ComingFrom::Left, candidate.left)
            } else {
                (ComingFrom::Right, candidate.right)
            };
        }

        let node = alloc::leak_alloc_node(key);
        self.root.link(node, parent, direction);
        self.root.insert(node);
        self.len += 1;
        self.check_invariants();
    }

    /// Finds a node holding `key`, the one closest to the root when
    /// duplicates exist.
    pub fn search<Q>(&self, key: &Q) -> Option<&Node<K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        // SAFETY: the node is owned by self and outlives the borrow.
        self.root.find(key).map(|e| unsafe { e.as_ref() })
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.find(key).is_some()
    }

    /// Removes the node [`Self::search`] finds and hands its key back.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when no key matches; the tree is left untouched.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(node) = self.root.find(key) else {
            trace!("remove: key not found, tree of {} keys untouched", self.len);
            return Err(Error::NotFound);
        };
        self.root.erase(node);
        self.len -= 1;
        self.check_invariants();
        // SAFETY: erase spliced node out, nothing links to it anymore.
        let node = unsafe { alloc::own_back(node) };
        Ok(node.into_key())
    }

    #[cfg(feature = "check-invariants")]
    fn check_invariants(&self) {
        if let Err(violation) = self.validate() {
            log::error!("red-black invariant broken: {violation}");
            panic!("red-black invariant broken: {violation}");
        }
    }

    #[cfg(not(feature = "check-invariants"))]
    #[inline(always)]
    fn check_invariants(&self) {}
}

impl<K: Ord> FromIterator<K> for RBTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> RBTree<K> {
        let mut tree = RBTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RBTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Debug> Debug for RBTree<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

pub(crate) struct Keys<'a, K> {
    current: NodePtr<K>,
    _phantom: PhantomData<&'a Node<K>>,
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: the tree is borrowed for 'a, so its nodes stay alive.
        let current = unsafe { self.current?.as_ref() };
        self.current = current.next();
        Some(current.key())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Color, test_utils::init_logging};

    use pretty_assertions::assert_eq;

    #[test]
    fn rbtree_ctor_works() {
        let tree = RBTree::<usize>::new();
        assert_eq!(None, tree.first());
        assert_eq!(false, tree.contains(&42));
        assert!(tree.is_empty());
        assert_eq!(0, tree.len());
        assert_eq!(Ok(0), tree.validate());
    }

    #[test]
    fn contains_many() {
        init_logging();
        let mut tree = RBTree::<usize>::new();
        tree.insert(42);
        assert_eq!(1, tree.len());
        tree.insert(0);
        assert_eq!(2, tree.len());
        tree.insert(100);
        assert_eq!(3, tree.len());

        assert_eq!(true, tree.contains(&42));
        assert_eq!(true, tree.contains(&0));
        assert_eq!(true, tree.contains(&100));
        assert_eq!(false, tree.contains(&1));
        assert_eq!(false, tree.contains(&1000));
    }

    #[test]
    fn first_and_last() {
        let mut tree = RBTree::<String>::new();
        assert_eq!(None, tree.first());
        assert_eq!(None, tree.last());

        let forty_two = "forty two".to_string();
        tree.insert(forty_two.clone());
        assert_eq!(Some(&forty_two), tree.first());
        assert_eq!(Some(&forty_two), tree.last());

        tree.insert("a".to_string());
        tree.insert("z".to_string());
        assert_eq!(Some("a"), tree.first().map(String::as_str));
        assert_eq!(Some("z"), tree.last().map(String::as_str));
    }

    #[test]
    fn search_by_borrowed_key() {
        let tree: RBTree<String> = ["b", "a", "c"].into_iter().map(String::from).collect();
        let node = tree.search("a").expect("a was inserted");
        assert_eq!("a", node.key());
        assert!(tree.search("d").is_none());
        assert!(tree.contains("c"));
    }

    #[test]
    fn search_reports_color() {
        let tree: RBTree<i32> = [2, 1, 3].into_iter().collect();
        assert_eq!(Some(Color::Black), tree.search(&2).map(Node::color));
        assert_eq!(Some(Color::Red), tree.search(&1).map(Node::color));
        assert!(tree.search(&3).is_some_and(Node::is_red));
    }

    #[test]
    fn insert_multiple_values() {
        let data: Vec<usize> = (0..100).collect();
        let mut tree = RBTree::<usize>::new();
        for k in data.iter() {
            tree.insert(*k);
        }

        assert_eq!(data.len(), tree.len());
        for k in data.iter() {
            assert_eq!(Some(k), tree.search(k).map(Node::key));
        }
        assert_eq!(data, tree.keys().copied().collect::<Vec<_>>());
    }

    #[test]
    fn insert_same_key_keeps_both() {
        let mut tree = RBTree::<(usize, ())>::new();
        tree.insert((42, ()));
        tree.insert((42, ()));
        assert_eq!(2, tree.len());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn duplicates_are_removed_one_at_a_time() {
        init_logging();
        let mut tree: RBTree<i32> = [5, 5, 5, 1, 9].into_iter().collect();
        assert_eq!(5, tree.len());
        assert_eq!(vec![1, 5, 5, 5, 9], tree.keys().copied().collect::<Vec<_>>());

        for left in (0..3).rev() {
            assert_eq!(Ok(5), tree.remove(&5));
            assert_eq!(left > 0, tree.contains(&5));
            assert!(tree.validate().is_ok());
        }
        assert_eq!(Err(Error::NotFound), tree.remove(&5));
        assert_eq!(vec![1, 9], tree.keys().copied().collect::<Vec<_>>());
    }

    #[test]
    fn remove_absent_key() {
        let mut tree = RBTree::<usize>::new();
        assert_eq!(Err(Error::NotFound), tree.remove(&42));

        tree.extend([1, 2, 3]);
        assert_eq!(Err(Error::NotFound), tree.remove(&42));
        assert_eq!(3, tree.len());
    }

    #[test]
    fn remove_returns_the_stored_key() {
        let mut tree: RBTree<String> = ["forty two".to_string()].into_iter().collect();
        assert_eq!(Ok("forty two".to_string()), tree.remove("forty two"));
        assert!(tree.is_empty());
        assert_eq!(None, tree.first());
    }

    #[test]
    fn clear_then_reuse() {
        init_logging();
        let mut tree: RBTree<usize> = (0..1000).collect();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(None, tree.first());
        assert_eq!(false, tree.contains(&10));

        tree.insert(10);
        assert_eq!(true, tree.contains(&10));
        assert_eq!(Ok(1), tree.validate());
    }

    #[test]
    fn drop_frees_owned_keys() {
        use std::rc::Rc;

        let witness = Rc::new(());
        {
            let mut tree = RBTree::new();
            for i in 0..64 {
                tree.insert((i, Rc::clone(&witness)));
            }
            assert_eq!(65, Rc::strong_count(&witness));
            tree.remove(&(7, Rc::clone(&witness))).unwrap();
            assert_eq!(64, Rc::strong_count(&witness));
        }
        assert_eq!(1, Rc::strong_count(&witness));
    }

    #[test]
    fn debug_lists_keys_in_order() {
        let tree: RBTree<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!("{1, 2, 3}", format!("{tree:?}"));
        assert_eq!("{}", format!("{:?}", RBTree::<i32>::new()));
    }
}
