use std::fmt::{self, Display, Formatter};

use crate::{Color, RBTree};

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("RED"),
            Color::Black => f.write_str("BLACK"),
        }
    }
}

/// Renders the shape of the tree, one node per line in pre-order:
///
/// ```text
/// R----10(BLACK)
///      L----7(BLACK)
///      R----18(RED)
/// ```
impl<K: Display> Display for RBTree<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // (node, indentation, is right child)
        let mut stack = vec![(self.root.root(), String::new(), true)];
        while let Some((node, indent, last)) = stack.pop() {
            let Some(node) = node else {
                continue;
            };
            // SAFETY: links reachable from the root point to live nodes.
            let node = unsafe { node.as_ref() };
            let (branch, pad) = if last { ("R----", "     ") } else { ("L----", "|    ") };
            writeln!(f, "{indent}{branch}{}({})", node.key(), node.color())?;

            let indent = indent + pad;
            stack.push((node.right, indent.clone(), true));
            stack.push((node.left, indent, false));
        }
        Ok(())
    }
}
