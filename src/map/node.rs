use std::cmp;

use tracing::trace;

pub(super) type Link<K, V> = Option<Box<Node<K, V>>>;

pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) left: Link<K, V>,
    pub(super) right: Link<K, V>,
    pub(super) height: usize,
}

/// Which child slot was taken on the way down from a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Direction {
    Left,
    Right,
}

impl<K, V> Node<K, V> {
    pub(super) fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        })
    }

    pub(super) fn left_height(&self) -> usize {
        height(&self.left)
    }

    pub(super) fn right_height(&self) -> usize {
        height(&self.right)
    }

    /// Height of the left subtree minus height of the right subtree.
    pub(super) fn balance_factor(&self) -> isize {
        self.left_height() as isize - self.right_height() as isize
    }

    pub(super) fn adjust_height(&mut self) {
        self.height = 1 + cmp::max(self.left_height(), self.right_height());
    }
}

pub(super) fn height<K, V>(link: &Link<K, V>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

//   a            b
//  / \          / \
// x   b   ->   a   z
//    / \      / \
//   y   z    x   y
pub(super) fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    match node.right.take() {
        None => node,
        Some(mut pivot) => {
            node.right = pivot.left.take();
            node.adjust_height();
            pivot.left = Some(node);
            pivot.adjust_height();
            pivot
        }
    }
}

//     a        b
//    / \      / \
//   b   z -> x   a
//  / \          / \
// x   y        y   z
pub(super) fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    match node.left.take() {
        None => node,
        Some(mut pivot) => {
            node.left = pivot.right.take();
            node.adjust_height();
            pivot.right = Some(node);
            pivot.adjust_height();
            pivot
        }
    }
}

pub(super) fn rotate_left_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.left = node.left.take().map(rotate_left);
    rotate_right(node)
}

pub(super) fn rotate_right_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.right = node.right.take().map(rotate_right);
    rotate_left(node)
}

/// Restores the AVL condition at `node` if necessary and adjusts its height.
/// Both subtrees must already be balanced and the initial balance factor
/// must lie within -2..=2, which always holds after a single update.
/// Returns the root of the rebalanced subtree.
pub(super) fn rebalance<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    node.adjust_height();
    let balance = node.balance_factor();
    debug_assert!((-2..=2).contains(&balance));
    if balance > 1 {
        let child_balance = node.left.as_ref().map_or(0, |left| left.balance_factor());
        if child_balance < 0 {
            trace!(rotation = "left-right", height = node.height, "rebalance");
            rotate_left_right(node)
        } else {
            trace!(rotation = "right", height = node.height, "rebalance");
            rotate_right(node)
        }
    } else if balance < -1 {
        let child_balance = node.right.as_ref().map_or(0, |right| right.balance_factor());
        if child_balance > 0 {
            trace!(rotation = "right-left", height = node.height, "rebalance");
            rotate_right_left(node)
        } else {
            trace!(rotation = "left", height = node.height, "rebalance");
            rotate_left(node)
        }
    } else {
        node
    }
}

/// Rebalances the subtree owned by `link` in place.
pub(super) fn rebalance_link<K, V>(link: &mut Link<K, V>) {
    if let Some(node) = link.take() {
        *link = Some(rebalance(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_right(keys: &[i32]) -> Link<i32, ()> {
        let mut link = None;
        for &key in keys.iter().rev() {
            let mut node = Node::leaf(key, ());
            node.right = link;
            node.adjust_height();
            link = Some(node);
        }
        link
    }

    fn chain_left(keys: &[i32]) -> Link<i32, ()> {
        let mut link = None;
        for &key in keys.iter().rev() {
            let mut node = Node::leaf(key, ());
            node.left = link;
            node.adjust_height();
            link = Some(node);
        }
        link
    }

    fn keys_in_order(link: &Link<i32, ()>, out: &mut Vec<i32>) {
        if let Some(node) = link {
            keys_in_order(&node.left, out);
            out.push(node.key);
            keys_in_order(&node.right, out);
        }
    }

    #[test]
    fn test_leaf_height() {
        let leaf = Node::leaf(1, "one");
        assert_eq!(leaf.height, 1);
        assert_eq!(leaf.balance_factor(), 0);
        assert_eq!(height::<i32, ()>(&None), 0);
    }

    #[test]
    fn test_rotate_left() {
        // 1          2
        //  \        / \
        //   2  ->  1   3
        //    \
        //     3
        let node = rebalance(chain_right(&[1, 2, 3]).unwrap());
        assert_eq!(node.key, 2);
        assert_eq!(node.height, 2);
        assert_eq!(node.left.as_ref().unwrap().key, 1);
        assert_eq!(node.right.as_ref().unwrap().key, 3);
    }

    #[test]
    fn test_rotate_right() {
        let node = rebalance(chain_left(&[3, 2, 1]).unwrap());
        assert_eq!(node.key, 2);
        assert_eq!(node.height, 2);
        assert_eq!(node.left.as_ref().unwrap().height, 1);
        assert_eq!(node.right.as_ref().unwrap().height, 1);
    }

    #[test]
    fn test_rotate_left_right() {
        //   3       2
        //  /       / \
        // 1   ->  1   3
        //  \
        //   2
        let mut root = Node::leaf(3, ());
        root.left = chain_right(&[1, 2]);
        root.adjust_height();
        let node = rebalance(root);
        assert_eq!(node.key, 2);
        assert_eq!(node.height, 2);
        let mut keys = Vec::new();
        keys_in_order(&Some(node), &mut keys);
        assert_eq!(keys, [1, 2, 3]);
    }

    #[test]
    fn test_rotate_right_left() {
        let mut root = Node::leaf(1, ());
        root.right = chain_left(&[3, 2]);
        root.adjust_height();
        let node = rebalance(root);
        assert_eq!(node.key, 2);
        assert_eq!(node.balance_factor(), 0);
        let mut keys = Vec::new();
        keys_in_order(&Some(node), &mut keys);
        assert_eq!(keys, [1, 2, 3]);
    }

    #[test]
    fn test_rebalance_keeps_balanced_node() {
        let mut root = Node::leaf(2, ());
        root.left = Some(Node::leaf(1, ()));
        let node = rebalance(root);
        assert_eq!(node.key, 2);
        assert_eq!(node.height, 2);
    }
}
