//! Captured variables.

use std::sync::Arc;

use og_reflect::info::{TypePath, Typed};
use og_reflect::ops::{DynamicStruct, Struct};
use og_reflect::{Reflect, Value};

use crate::error::{ExprError, Result};
use crate::expr::{ConstantExpr, Expr, MemberExpr};

/// Variables captured from the code that builds an expression.
///
/// All captures live in one record held by a constant; a variable is read
/// through a member access on that constant. The writer folds these
/// accesses into plain constants before encoding.
///
/// ```
/// use og_expr::{BinaryOp, Closure, Expr};
///
/// let scope = Closure::builder().capture("offset", 10_u32).build();
/// let offset = scope.variable("offset").unwrap();
/// assert!(offset.ty().type_is::<u32>());
///
/// let sum = Expr::binary(BinaryOp::Add, Expr::constant(1_u32), offset);
/// assert!(sum.ty().type_is::<u32>());
/// ```
#[derive(Clone)]
pub struct Closure {
    record: Arc<DynamicStruct>,
}

impl Closure {
    #[inline]
    pub fn builder() -> ClosureBuilder {
        ClosureBuilder {
            record: DynamicStruct::new(),
        }
    }

    /// An expression reading the captured variable `name`.
    pub fn variable(&self, name: &str) -> Result<Expr> {
        let value = self
            .record
            .field(name)
            .ok_or_else(|| ExprError::MemberResolution {
                type_path: DynamicStruct::type_path().to_owned(),
                member: name.to_owned(),
            })?;
        let ty = value
            .represented_type_info()
            .unwrap_or(Value::type_info());
        Ok(Expr::MemberAccess(MemberExpr {
            declaring: DynamicStruct::type_info(),
            member: name.to_owned(),
            ty,
            expression: Box::new(Expr::Constant(ConstantExpr {
                ty: DynamicStruct::type_info(),
                value: Value::new(Arc::clone(&self.record)),
            })),
        }))
    }

    /// Names of the captured variables.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.record.iter().map(|(name, _)| name)
    }
}

/// Collects the variables of a [`Closure`].
pub struct ClosureBuilder {
    record: DynamicStruct,
}

impl ClosureBuilder {
    /// Captures `value` as `name`, replacing an earlier capture of that name.
    pub fn capture<T: Reflect>(mut self, name: &'static str, value: T) -> Self {
        self.record.insert(name, value);
        self
    }

    pub fn build(self) -> Closure {
        Closure {
            record: Arc::new(self.record),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use og_reflect::registry::TypeRegistry;

    use super::Closure;
    use crate::catalog::MethodCatalog;
    use crate::error::ExprError;
    use crate::eval::Interpreter;
    use crate::expr::Expr;

    #[test]
    fn variables_read_the_record() {
        let scope = Closure::builder()
            .capture("limit", 3_i8)
            .capture("name", String::from("ada"))
            .capture("limit", 4_i8)
            .build();
        assert_eq!(scope.names().collect::<Vec<_>>(), ["limit", "name"]);

        let limit = scope.variable("limit").unwrap();
        let Expr::MemberAccess(access) = &limit else {
            panic!("expected a member access, got {limit}");
        };
        assert!(matches!(access.expression.as_ref(), Expr::Constant(_)));
        assert!(limit.ty().type_is::<i8>());

        let registry = TypeRegistry::new();
        let catalog = MethodCatalog::new();
        let value = Interpreter::new(&registry, &catalog).evaluate(&limit).unwrap();
        assert_eq!(value.downcast_ref::<i8>(), Some(&4));

        assert!(matches!(
            scope.variable("missing"),
            Err(ExprError::MemberResolution { member, .. }) if member == "missing"
        ));
    }
}
