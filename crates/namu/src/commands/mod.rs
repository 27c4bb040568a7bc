//! CLI command implementations.

pub(crate) mod blame;
pub(crate) mod check_expr;
pub(crate) mod render;

pub(crate) use blame::BlameArgs;
pub(crate) use check_expr::CheckExprArgs;
pub(crate) use render::RenderArgs;
