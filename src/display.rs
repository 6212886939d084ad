//! Outline rendering of a prefix tree.
//!
//! For a tree holding "bar" and "baz" this prints:
//!
//! ```text
//! <root> ▾
//!  b ▾
//!   ba ▾
//!    bar *
//!    baz *
//! ```
//!
//! Each line is indented by the length of its path. Terminal nodes are
//! marked with `*` and nodes with children with `▾`. Children are visited
//! in ascending byte order so the output is stable.

use std::fmt;

use crate::node::TrieNode;
use crate::PrefixTree;

impl fmt::Display for PrefixTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path = Vec::new();
        write_node(f, &self.root, &mut path)
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &TrieNode, path: &mut Vec<u8>) -> fmt::Result {
    let indent = " ".repeat(path.len());
    if path.is_empty() {
        write!(f, "<root>")?;
    } else {
        write!(f, "{}{}", indent, String::from_utf8_lossy(path))?;
    }
    if node.is_terminal() {
        write!(f, " *")?;
    }
    if !node.children.is_empty() {
        write!(f, " ▾")?;
    }
    writeln!(f)?;

    let mut children: Vec<(u8, &TrieNode)> = node.children().collect();
    children.sort_unstable_by_key(|(byte, _)| *byte);

    for (byte, child) in children {
        path.push(byte);
        write_node(f, child, path)?;
        path.pop();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::PrefixTree;

    #[test]
    fn test_display_empty() {
        assert_eq!(PrefixTree::new().to_string(), "<root>\n");
    }

    #[test]
    fn test_display_outline() {
        let tree: PrefixTree = ["baz", "bar", "a"].iter().collect();

        let expected = "<root> ▾\n a *\n b ▾\n  ba ▾\n   bar *\n   baz *\n";
        assert_eq!(tree.to_string(), expected);
    }

    #[test]
    fn test_display_terminal_root() {
        let tree: PrefixTree = ["", "x"].iter().collect();
        assert_eq!(tree.to_string(), "<root> * ▾\n x *\n");
    }
}
