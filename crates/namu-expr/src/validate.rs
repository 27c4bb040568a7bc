//! Blacklist walk over a parsed program.

use crate::ast::{Node, NodeKind};
use crate::{Construct, ExprError};

fn forbidden(kind: NodeKind) -> Option<Construct> {
    match kind {
        NodeKind::FunctionDeclaration => Some(Construct::FunctionDeclaration),
        NodeKind::FunctionExpression => Some(Construct::FunctionExpression),
        NodeKind::ArrowFunction => Some(Construct::ArrowFunction),
        NodeKind::Method => Some(Construct::Method),
        NodeKind::Getter | NodeKind::Setter => Some(Construct::Accessor),
        NodeKind::ClassDeclaration => Some(Construct::ClassDeclaration),
        NodeKind::ClassExpression => Some(Construct::ClassExpression),
        NodeKind::While => Some(Construct::While),
        NodeKind::DoWhile => Some(Construct::DoWhile),
        _ => None,
    }
}

/// Reject the first forbidden node in source order.
pub(crate) fn validate(program: &Node) -> Result<(), ExprError> {
    let mut found = None;
    program.walk(&mut |node| {
        if let Some(construct) = forbidden(node.kind) {
            found = Some(ExprError::Forbidden {
                construct,
                offset: node.offset,
            });
            return false;
        }
        true
    });
    found.map_or(Ok(()), Err)
}
