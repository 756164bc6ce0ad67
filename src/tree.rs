//! Contains the `SyntaxTree`, the concrete syntax tree built by the parser.
//!
//! Every node owns its children outright. Cloning a tree copies every node
//! and payload, and dropping a tree releases the whole subtree. Cloning,
//! comparing, printing and dropping walk the tree with heap-allocated work
//! lists, so they work at any depth.

use crate::value::Payload;
use std::fmt;
use std::io;

/// The grammar category of a `SyntaxTree` node.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum SyntaxType {
    /// A string leaf; also the field name of a `Pair`.
    String,
    /// A number leaf.
    Number,
    /// A field of an object: `[String, value]`.
    Pair,
    /// Grouping node used while parsing an array body.
    Elements,
    /// Grouping node used while parsing an object body.
    Members,
    Array,
    Object,
    True,
    False,
    Null,
}

impl SyntaxType {
    /// The tag written by `SyntaxTree::print`.
    pub fn tag(self) -> &'static str {
        match self {
            SyntaxType::String => "STRING",
            SyntaxType::Number => "NUMBER",
            SyntaxType::Pair => "PAIR",
            SyntaxType::Elements => "ELEMENTS",
            SyntaxType::Members => "MEMBERS",
            SyntaxType::Array => "ARRAY",
            SyntaxType::Object => "OBJECT",
            SyntaxType::True => "TRUE",
            SyntaxType::False => "FALSE",
            SyntaxType::Null => "NULL",
        }
    }

    /// `String`, `Number`, `True`, `False` and `Null` never have children.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            SyntaxType::String
                | SyntaxType::Number
                | SyntaxType::True
                | SyntaxType::False
                | SyntaxType::Null
        )
    }
}

/// A node of the concrete syntax tree, and the subtree below it.
///
/// # Examples
/// ```
/// use rill_cst::{parse_str, SyntaxType};
///
/// let tree = parse_str(r#"{"a": 1, "b": [true, false, null]}"#).unwrap();
/// assert_eq!(tree.kind(), SyntaxType::Object);
///
/// let b = tree.get_field("b").unwrap();
/// let kinds: Vec<SyntaxType> = b.children().iter().map(|c| c.kind()).collect();
/// assert_eq!(kinds, [SyntaxType::True, SyntaxType::False, SyntaxType::Null]);
/// assert!(tree.get_field("missing").is_none());
/// ```
pub struct SyntaxTree {
    kind: SyntaxType,
    payload: Payload,
    children: Vec<SyntaxTree>,
}

impl SyntaxTree {
    /// Creates a node with no children.
    pub fn new(kind: SyntaxType, payload: Payload) -> Self {
        SyntaxTree {
            kind,
            payload,
            children: Vec::new(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(SyntaxType::String, Payload::String(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::new(SyntaxType::Number, Payload::Number(value))
    }

    /// Creates a node without payload (containers, pairs and keywords).
    pub fn node(kind: SyntaxType) -> Self {
        Self::new(kind, Payload::None)
    }

    /// Creates a `Pair` node holding the field name and its value.
    pub fn pair(name: impl Into<String>, value: SyntaxTree) -> Self {
        let mut pair = Self::node(SyntaxType::Pair);
        pair.add_child(Self::string(name));
        pair.add_child(value);
        pair
    }

    pub fn kind(&self) -> SyntaxType {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The text of a `String` node.
    pub fn as_str(&self) -> Option<&str> {
        self.payload.as_str()
    }

    /// The value of a `Number` node.
    pub fn as_f64(&self) -> Option<f64> {
        self.payload.as_f64()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, SyntaxType::Array | SyntaxType::Object)
    }

    /// Appends `child` as the last child. The child is moved, not copied.
    pub fn add_child(&mut self, child: SyntaxTree) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[SyntaxTree] {
        &self.children
    }

    /// Moves every child out of this node, leaving it empty.
    pub(crate) fn take_children(&mut self) -> Vec<SyntaxTree> {
        std::mem::take(&mut self.children)
    }

    /// The first child, or `None` when the node has no children at all.
    ///
    /// ```
    /// use rill_cst::parse_str;
    ///
    /// let tree = parse_str("[1, 2, 3]").unwrap();
    /// let mut values = Vec::new();
    /// let mut child = tree.first_child();
    /// while let Some(c) = child {
    ///     values.push(c.as_f64().unwrap());
    ///     child = c.next_sibling();
    /// }
    /// assert_eq!(values, [1.0, 2.0, 3.0]);
    /// ```
    pub fn first_child(&self) -> Option<Child<'_>> {
        if self.children.is_empty() {
            return None;
        }
        Some(Child {
            siblings: &self.children,
            index: 0,
        })
    }

    /// The field name of a `Pair` node.
    pub fn field_name(&self) -> Option<&str> {
        match (self.kind, self.children.first()) {
            (SyntaxType::Pair, Some(name)) => name.as_str(),
            _ => None,
        }
    }

    /// The value of a `Pair` node.
    pub fn value(&self) -> Option<&SyntaxTree> {
        match self.kind {
            SyntaxType::Pair => self.children.get(1),
            _ => None,
        }
    }

    /// Looks up the value of the first field called `name`.
    ///
    /// Returns `None` if there is no such field or if this is not an
    /// `Object` node.
    pub fn get_field(&self, name: &str) -> Option<&SyntaxTree> {
        if self.kind != SyntaxType::Object {
            return None;
        }
        self.children
            .iter()
            .find(|pair| pair.field_name() == Some(name))
            .and_then(SyntaxTree::value)
    }

    /// Writes the tree, one node per line, as rendered by `Display`.
    pub fn print<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "{}", self)
    }

    /// Releases a tree. Releasing nothing is a no-op.
    pub fn delete(tree: Option<SyntaxTree>) {
        drop(tree);
    }

    // Pre-order walk with an explicit stack, so depth is bounded by the heap.
    fn walk<F>(&self, mut visit: F) -> fmt::Result
    where
        F: FnMut(&SyntaxTree, usize) -> fmt::Result,
    {
        let mut pending = vec![(self, 0)];
        while let Some((node, depth)) = pending.pop() {
            visit(node, depth)?;
            pending.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
        Ok(())
    }

    fn write_level<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        const TABS: &str = "\t\t\t\t\t\t\t\t\t\t\t\t\t\t\t\t";
        self.walk(|node, depth| {
            let mut indent = depth;
            while indent > 0 {
                let n = indent.min(TABS.len());
                w.write_str(&TABS[..n])?;
                indent -= n;
            }
            w.write_str(node.kind.tag())?;
            if !node.payload.is_none() {
                write!(w, ": {}", node.payload)?;
            }
            w.write_char('\n')
        })
    }
}

/// Pre-order dump with one tab of indentation per level.
///
/// ```
/// use rill_cst::parse_str;
///
/// let tree = parse_str(r#"{"a": [1.5, "x"]}"#).unwrap();
/// assert_eq!(
///     tree.to_string(),
///     "OBJECT\n\tPAIR\n\t\tSTRING: a\n\t\tARRAY\n\t\t\tNUMBER: 1.500000\n\t\t\tSTRING: x\n"
/// );
/// ```
impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_level(f)
    }
}

/// Compact nested form, e.g. `Array [Number(Number(1.0)), Null]`.
impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step<'a> {
            Open(&'a SyntaxTree),
            Separator,
            Close,
        }

        let mut pending = vec![Step::Open(self)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Open(node) => {
                    write!(f, "{:?}", node.kind)?;
                    match &node.payload {
                        Payload::None => {}
                        payload => write!(f, "({:?})", payload)?,
                    }
                    if node.children.is_empty() {
                        continue;
                    }
                    f.write_str(" [")?;
                    pending.push(Step::Close);
                    for (i, child) in node.children.iter().enumerate().rev() {
                        pending.push(Step::Open(child));
                        if i > 0 {
                            pending.push(Step::Separator);
                        }
                    }
                }
                Step::Separator => f.write_str(", ")?,
                Step::Close => f.write_str("]")?,
            }
        }
        Ok(())
    }
}

impl Clone for SyntaxTree {
    fn clone(&self) -> Self {
        struct Frame<'a> {
            source: &'a SyntaxTree,
            next: usize,
            copy: SyntaxTree,
        }

        impl<'a> Frame<'a> {
            fn new(source: &'a SyntaxTree) -> Self {
                let mut copy = SyntaxTree::new(source.kind, source.payload.clone());
                copy.children.reserve_exact(source.children.len());
                Frame {
                    source,
                    next: 0,
                    copy,
                }
            }
        }

        // Frames form the path from the root to the node being copied.
        let mut stack = vec![Frame::new(self)];
        loop {
            let top = stack.len() - 1;
            let source = stack[top].source;
            match source.children.get(stack[top].next) {
                Some(child) => {
                    stack[top].next += 1;
                    stack.push(Frame::new(child));
                }
                None if top == 0 => break,
                None => {
                    if let Some(done) = stack.pop() {
                        stack[top - 1].copy.children.push(done.copy);
                    }
                }
            }
        }
        stack.swap_remove(0).copy
    }
}

impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.kind != b.kind
                || a.payload != b.payload
                || a.children.len() != b.children.len()
            {
                return false;
            }
            pending.extend(a.children.iter().zip(&b.children));
        }
        true
    }
}

// Dropping a deep tree recursively could exhaust the stack, so children
// are moved onto a heap-allocated work list and released one by one.
impl Drop for SyntaxTree {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// A position among the children of a node.
///
/// Obtained from `SyntaxTree::first_child` and advanced with
/// `next_sibling`. Dereferences to the child node itself.
#[derive(Debug, Clone, Copy)]
pub struct Child<'a> {
    siblings: &'a [SyntaxTree],
    index: usize,
}

impl<'a> Child<'a> {
    /// The following child, or `None` after the last one.
    pub fn next_sibling(&self) -> Option<Child<'a>> {
        let index = self.index + 1;
        if index >= self.siblings.len() {
            return None;
        }
        Some(Child {
            siblings: self.siblings,
            index,
        })
    }

    /// The zero-based position of this child.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn node(&self) -> &'a SyntaxTree {
        &self.siblings[self.index]
    }
}

impl std::ops::Deref for Child<'_> {
    type Target = SyntaxTree;

    fn deref(&self) -> &SyntaxTree {
        self.node()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxTree {
        let mut list = SyntaxTree::node(SyntaxType::Array);
        list.add_child(SyntaxTree::node(SyntaxType::True));
        list.add_child(SyntaxTree::number(2.0));
        let mut object = SyntaxTree::node(SyntaxType::Object);
        object.add_child(SyntaxTree::pair("name", SyntaxTree::string("rill")));
        object.add_child(SyntaxTree::pair("list", list));
        object.add_child(SyntaxTree::pair("name", SyntaxTree::node(SyntaxType::Null)));
        object
    }

    #[test]
    fn test_pair_accessors() {
        let pair = SyntaxTree::pair("key", SyntaxTree::number(1.0));
        assert_eq!(pair.kind(), SyntaxType::Pair);
        assert_eq!(pair.children().len(), 2);
        assert_eq!(pair.field_name(), Some("key"));
        assert_eq!(pair.value().and_then(SyntaxTree::as_f64), Some(1.0));

        let leaf = SyntaxTree::string("key");
        assert_eq!(leaf.field_name(), None);
        assert!(leaf.value().is_none());
    }

    #[test]
    fn test_get_field_first_match_wins() {
        let tree = sample();
        assert_eq!(
            tree.get_field("name").and_then(SyntaxTree::as_str),
            Some("rill")
        );
        assert_eq!(
            tree.get_field("list").map(SyntaxTree::kind),
            Some(SyntaxType::Array)
        );
        assert!(tree.get_field("missing").is_none());
    }

    #[test]
    fn test_get_field_on_non_object() {
        let tree = sample();
        let list = tree.get_field("list").unwrap();
        assert!(list.get_field("name").is_none());
        assert!(SyntaxTree::string("name").get_field("name").is_none());
    }

    #[test]
    fn test_sibling_iteration() {
        let tree = sample();
        let mut names = Vec::new();
        let mut child = tree.first_child();
        while let Some(pair) = child {
            names.push((pair.index(), pair.field_name().unwrap().to_string()));
            child = pair.next_sibling();
        }
        assert_eq!(
            names,
            vec![
                (0, "name".to_string()),
                (1, "list".to_string()),
                (2, "name".to_string())
            ]
        );

        // A childless node has no first child at all.
        assert!(SyntaxTree::node(SyntaxType::Object).first_child().is_none());
        assert!(SyntaxTree::number(1.0).first_child().is_none());
    }

    #[test]
    fn test_copy_is_independent() {
        let original = sample();
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.add_child(SyntaxTree::pair("extra", SyntaxTree::node(SyntaxType::False)));
        assert_ne!(copy, original);
        drop(copy);

        assert_eq!(original.children().len(), 3);
        assert_eq!(
            original.get_field("name").and_then(SyntaxTree::as_str),
            Some("rill")
        );
    }

    #[test]
    fn test_delete_absent_is_noop() {
        SyntaxTree::delete(None);
        SyntaxTree::delete(Some(sample()));
    }

    fn chain(depth: usize) -> SyntaxTree {
        let mut tree = SyntaxTree::number(1.0);
        for _ in 0..depth {
            let mut outer = SyntaxTree::node(SyntaxType::Array);
            outer.add_child(tree);
            tree = outer;
        }
        tree
    }

    // Counts lines without keeping the (quadratic) indentation around.
    #[derive(Default)]
    struct LineCounter {
        lines: usize,
        current: Vec<u8>,
        last: Vec<u8>,
    }

    impl io::Write for LineCounter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            for &b in buf {
                if b == b'\n' {
                    self.lines += 1;
                    self.last = std::mem::take(&mut self.current);
                } else if b != b'\t' {
                    self.current.push(b);
                }
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_deep_tree() {
        let tree = chain(200_000);
        let copy = tree.clone();
        assert!(copy == tree);

        let mut other = chain(200_000);
        assert!(other == tree);
        other.add_child(SyntaxTree::node(SyntaxType::Null));
        assert!(other != tree);

        let debug = format!("{:?}", tree);
        assert!(debug.starts_with("Array [Array ["));
        assert!(debug.ends_with("Number(Number(1.0))]]"));

        drop(copy);
        drop(other);
        drop(tree);
    }

    #[test]
    fn test_print_deep_tree() {
        let tree = chain(20_000);
        let mut out = LineCounter::default();
        tree.print(&mut out).unwrap();
        assert_eq!(out.lines, 20_001);
        assert_eq!(out.last, b"NUMBER: 1.000000");
        assert_eq!(
            chain(3).to_string(),
            "ARRAY\n\tARRAY\n\t\tARRAY\n\t\t\tNUMBER: 1.000000\n"
        );
    }

    #[test]
    fn test_debug_format() {
        let mut array = SyntaxTree::node(SyntaxType::Array);
        array.add_child(SyntaxTree::string("x"));
        array.add_child(SyntaxTree::node(SyntaxType::Null));
        array.add_child(SyntaxTree::node(SyntaxType::Array));
        assert_eq!(
            format!("{:?}", array),
            r#"Array [String(String("x")), Null, Array]"#
        );
    }

    #[test]
    fn test_print() {
        let mut out = Vec::new();
        sample().print(&mut out).unwrap();
        let expected = "OBJECT\n\
                        \tPAIR\n\
                        \t\tSTRING: name\n\
                        \t\tSTRING: rill\n\
                        \tPAIR\n\
                        \t\tSTRING: list\n\
                        \t\tARRAY\n\
                        \t\t\tTRUE\n\
                        \t\t\tNUMBER: 2.000000\n\
                        \tPAIR\n\
                        \t\tSTRING: name\n\
                        \t\tNULL\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_leaf_kinds() {
        assert!(SyntaxType::String.is_leaf());
        assert!(SyntaxType::Null.is_leaf());
        assert!(!SyntaxType::Pair.is_leaf());
        assert!(!SyntaxType::Members.is_leaf());
        assert!(SyntaxTree::node(SyntaxType::Object).is_container());
        assert!(!SyntaxTree::node(SyntaxType::Pair).is_container());
    }
}
