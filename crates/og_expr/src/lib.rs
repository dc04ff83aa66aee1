#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod catalog;
mod closure;
mod error;
mod eval;
mod expr;
mod read;
mod write;

pub mod fold;

// -----------------------------------------------------------------------------
// Top-level exports

pub use catalog::{GenericMethod, MethodBody, MethodCatalog, MethodInfo, arg, is_assignable};
pub use closure::{Closure, ClosureBuilder};
pub use error::{ExprError, Result};
pub use eval::{CompiledLambda, Function, Interpreter};
pub use expr::{
    BinaryExpr, BinaryOp, CallExpr, ConditionalExpr, ConstantExpr, ElementInit, Expr,
    InvokeExpr, LambdaExpr, ListInitExpr, MemberBinding, MemberExpr, MemberInitExpr,
    NewArrayExpr, NewExpr, ParameterExpr, TypeIsExpr, UnaryExpr, UnaryOp,
};
pub use read::AstReader;
pub use write::AstWriter;
