//! Untyped syntax tree.
//!
//! The validator only cares about which kinds of node occur, so every node
//! is a kind, an offset and its children. Operators, names and literal
//! values are not kept.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Program,
    Block,
    Empty,
    Debugger,
    ExpressionStatement,
    VariableDeclaration,
    If,
    For,
    ForIn,
    ForOf,
    While,
    DoWhile,
    Return,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Switch,
    SwitchCase,
    Labeled,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    ClassDeclaration,
    ClassExpression,
    StaticBlock,
    ClassField,
    Method,
    Getter,
    Setter,
    Identifier,
    Literal,
    Regex,
    Template,
    TaggedTemplate,
    Array,
    Object,
    Property,
    Spread,
    Unary,
    Update,
    Binary,
    Logical,
    Assignment,
    Conditional,
    Call,
    New,
    Member,
    Sequence,
    This,
    Super,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub offset: usize,
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(kind: NodeKind, offset: usize) -> Self {
        Self {
            kind,
            offset,
            children: Vec::new(),
        }
    }

    pub fn new(kind: NodeKind, offset: usize, children: Vec<Node>) -> Self {
        Self {
            kind,
            offset,
            children,
        }
    }

    /// Depth-first, pre-order traversal. Stops and returns `false` as soon
    /// as `visit` does.
    ///
    /// Binary and member chains nest as deep as they are long, so the walk
    /// keeps its own stack.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node) -> bool) -> bool {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if !visit(node) {
                return false;
            }
            stack.extend(node.children.iter().rev());
        }
        true
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_tree_walks_and_drops() {
        let mut tree = Node::leaf(NodeKind::Identifier, 0);
        for offset in 0..200_000 {
            tree = Node::new(NodeKind::Binary, offset, vec![tree, Node::leaf(NodeKind::Literal, 0)]);
        }
        let mut count = 0;
        assert!(tree.walk(&mut |_| {
            count += 1;
            true
        }));
        assert_eq!(count, 400_001);
    }

    #[test]
    fn test_walk_is_pre_order_and_stops() {
        let tree = Node::new(
            NodeKind::Program,
            0,
            vec![
                Node::new(
                    NodeKind::ExpressionStatement,
                    0,
                    vec![Node::leaf(NodeKind::Identifier, 0)],
                ),
                Node::leaf(NodeKind::Empty, 2),
            ],
        );

        let mut seen = Vec::new();
        let finished = tree.walk(&mut |node| {
            seen.push(node.kind);
            node.kind != NodeKind::Identifier
        });

        assert!(!finished);
        assert_eq!(
            seen,
            vec![
                NodeKind::Program,
                NodeKind::ExpressionStatement,
                NodeKind::Identifier
            ]
        );
    }
}
