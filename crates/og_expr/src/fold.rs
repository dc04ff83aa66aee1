//! Partial evaluation.
//!
//! Replaces every sub-expression that references no lambda parameter with a
//! constant holding its value:
//!
//! - Arithmetic on constants: `(2 + 3) * x` becomes `<5> * x`
//! - Captured variables: `x.age + scope.offset` becomes `x.age + <10>`
//! - Parameter-free calls and constructions are evaluated once
//!
//! Lambdas and quoted lambdas are kept as trees. A lambda body is folded in
//! place; its parameters keep their identity, so references in the body
//! still bind to the rebuilt lambda.
//!
//! Folding runs the code it folds. A sub-expression that fails to evaluate
//! fails the whole pass.

use std::sync::Arc;

use og_reflect::info::TypeInfo;
use og_reflect::registry::TypeRegistry;

use crate::catalog::MethodCatalog;
use crate::error::Result;
use crate::eval::{Function, Interpreter};
use crate::expr::{
    BinaryExpr, CallExpr, ConditionalExpr, ElementInit, Expr, InvokeExpr, LambdaExpr,
    ListInitExpr, MemberBinding, MemberExpr, MemberInitExpr, NewArrayExpr, NewExpr, TypeIsExpr,
    UnaryExpr,
};

/// Folds the parameter-free sub-expressions of `expr` into constants.
///
/// See the [module docs](self).
pub fn partial_eval(
    expr: &Expr,
    registry: &TypeRegistry,
    catalog: &MethodCatalog,
) -> Result<Expr> {
    PartialEvaluator::new(registry, catalog).fold(expr)
}

/// The folding pass behind [`partial_eval`].
#[derive(Clone, Copy)]
pub struct PartialEvaluator<'a> {
    interpreter: Interpreter<'a>,
}

impl<'a> PartialEvaluator<'a> {
    pub fn new(registry: &'a TypeRegistry, catalog: &'a MethodCatalog) -> Self {
        Self {
            interpreter: Interpreter::new(registry, catalog),
        }
    }

    pub fn fold(&self, expr: &Expr) -> Result<Expr> {
        if is_foldable(expr) {
            let value = self.interpreter.evaluate(expr)?;
            let ty = match expr.ty() {
                TypeInfo::Any(_) => value
                    .get()
                    .and_then(|value| value.represented_type_info())
                    .unwrap_or(expr.ty()),
                ty => ty,
            };
            log::trace!("folded `{expr}` into a constant");
            return Ok(Expr::constant_of(ty, value));
        }

        Ok(match expr {
            Expr::Parameter(_) | Expr::Constant(_) => expr.clone(),
            Expr::Lambda(lambda) => Expr::Lambda(Arc::new(LambdaExpr {
                parameters: lambda.parameters.clone(),
                body: self.fold(&lambda.body)?,
            })),
            Expr::MemberAccess(member) => Expr::MemberAccess(MemberExpr {
                declaring: member.declaring,
                member: member.member.clone(),
                ty: member.ty,
                expression: self.boxed(&member.expression)?,
            }),
            Expr::Call(call) => Expr::Call(CallExpr {
                method: Arc::clone(&call.method),
                object: call.object.as_deref().map(|object| self.boxed(object)).transpose()?,
                arguments: self.all(&call.arguments)?,
            }),
            Expr::New(new) => Expr::New(self.new_expr(new)?),
            Expr::NewArrayInit(array) => Expr::NewArrayInit(self.array(array)?),
            Expr::NewArrayBounds(array) => Expr::NewArrayBounds(self.array(array)?),
            Expr::MemberInit(init) => Expr::MemberInit(MemberInitExpr {
                new: self.new_expr(&init.new)?,
                bindings: self.bindings(&init.bindings)?,
            }),
            Expr::Conditional(c) => Expr::Conditional(ConditionalExpr {
                ty: c.ty,
                test: self.boxed(&c.test)?,
                if_true: self.boxed(&c.if_true)?,
                if_false: self.boxed(&c.if_false)?,
            }),
            Expr::ListInit(init) => Expr::ListInit(ListInitExpr {
                new: self.new_expr(&init.new)?,
                initializers: self.initializers(&init.initializers)?,
            }),
            Expr::TypeIs(type_is) => Expr::TypeIs(TypeIsExpr {
                ty: type_is.ty,
                expression: self.boxed(&type_is.expression)?,
            }),
            Expr::Invoke(invoke) => Expr::Invoke(InvokeExpr {
                expression: self.boxed(&invoke.expression)?,
                arguments: self.all(&invoke.arguments)?,
            }),
            Expr::Unary(unary) => Expr::Unary(UnaryExpr {
                op: unary.op,
                ty: unary.ty,
                operand: self.boxed(&unary.operand)?,
            }),
            Expr::Binary(binary) => Expr::Binary(BinaryExpr {
                op: binary.op,
                left: self.boxed(&binary.left)?,
                right: self.boxed(&binary.right)?,
            }),
        })
    }

    #[inline]
    fn boxed(&self, expr: &Expr) -> Result<Box<Expr>> {
        self.fold(expr).map(Box::new)
    }

    fn all(&self, exprs: &[Expr]) -> Result<Vec<Expr>> {
        exprs.iter().map(|expr| self.fold(expr)).collect()
    }

    fn new_expr(&self, new: &NewExpr) -> Result<NewExpr> {
        Ok(NewExpr {
            ty: new.ty,
            arguments: self.all(&new.arguments)?,
        })
    }

    fn array(&self, array: &NewArrayExpr) -> Result<NewArrayExpr> {
        Ok(NewArrayExpr {
            element: array.element,
            expressions: self.all(&array.expressions)?,
        })
    }

    fn initializers(&self, initializers: &[ElementInit]) -> Result<Vec<ElementInit>> {
        initializers
            .iter()
            .map(|init| {
                Ok(ElementInit {
                    arguments: self.all(&init.arguments)?,
                })
            })
            .collect()
    }

    fn bindings(&self, bindings: &[MemberBinding]) -> Result<Vec<MemberBinding>> {
        bindings
            .iter()
            .map(|binding| {
                Ok(match binding {
                    MemberBinding::Assignment { member, expression } => MemberBinding::Assignment {
                        member: member.clone(),
                        expression: self.fold(expression)?,
                    },
                    MemberBinding::Member { member, bindings } => MemberBinding::Member {
                        member: member.clone(),
                        bindings: self.bindings(bindings)?,
                    },
                    MemberBinding::List {
                        member,
                        initializers,
                    } => MemberBinding::List {
                        member: member.clone(),
                        initializers: self.initializers(initializers)?,
                    },
                })
            })
            .collect()
    }
}

/// Whether `expr` is replaced by its value.
///
/// Leaves stay as they are, and so does anything producing a lambda.
fn is_foldable(expr: &Expr) -> bool {
    !matches!(expr, Expr::Lambda(_) | Expr::Parameter(_) | Expr::Constant(_))
        && !expr.ty().type_is::<Function>()
        && !expr.has_parameters()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use og_reflect::derive::Reflect;
    use og_reflect::info::Typed;
    use og_reflect::registry::TypeRegistry;

    use super::partial_eval;
    use crate::catalog::MethodCatalog;
    use crate::closure::Closure;
    use crate::error::ExprError;
    use crate::expr::{BinaryOp, Expr, ParameterExpr};

    #[derive(Reflect, Debug)]
    struct Person {
        name: String,
        age: u32,
    }

    fn fold(expr: &Expr) -> crate::error::Result<Expr> {
        let mut registry = TypeRegistry::new();
        registry.register::<Person>();
        partial_eval(expr, &registry, &MethodCatalog::new())
    }

    #[test]
    fn constants_fold_around_parameters() {
        let x = ParameterExpr::new("x", i32::type_info());
        let sum = Expr::binary(BinaryOp::Add, Expr::constant(2_i32), Expr::constant(3_i32));
        let body = Expr::binary(BinaryOp::Multiply, sum, Expr::parameter(&x));
        let lambda = Expr::lambda(vec![Arc::clone(&x)], body);

        let folded = fold(&lambda).unwrap();
        assert_eq!(folded.to_string(), "(x) => (<5> * x)");

        let Expr::Lambda(folded) = folded else {
            panic!("expected a lambda");
        };
        assert!(Arc::ptr_eq(&folded.parameters[0], &x));
        let Expr::Binary(body) = &folded.body else {
            panic!("expected a binary body");
        };
        let Expr::Parameter(reference) = body.right.as_ref() else {
            panic!("expected a parameter reference");
        };
        assert!(Arc::ptr_eq(reference, &x));
    }

    #[test]
    fn captured_variables_become_constants() {
        let scope = Closure::builder().capture("offset", 10_u32).build();
        let x = ParameterExpr::new("x", Person::type_info());
        let age = Expr::member(Expr::parameter(&x), "age").unwrap();
        let body = Expr::binary(BinaryOp::Add, age, scope.variable("offset").unwrap());
        let lambda = Expr::lambda(vec![x], body);

        let folded = fold(&lambda).unwrap();
        assert_eq!(folded.to_string(), "(x) => (x.age + <10>)");
        let Expr::Lambda(folded) = folded else {
            panic!("expected a lambda");
        };
        let Expr::Binary(body) = &folded.body else {
            panic!("expected a binary body");
        };
        let Expr::Constant(offset) = body.right.as_ref() else {
            panic!("expected a constant");
        };
        assert!(offset.ty.type_is::<u32>());
        assert_eq!(offset.value.downcast_ref::<u32>(), Some(&10));
    }

    #[test]
    fn evaluation_errors_propagate() {
        let x = ParameterExpr::new("x", i32::type_info());
        let ratio = Expr::binary(BinaryOp::Divide, Expr::constant(1_i32), Expr::constant(0_i32));
        let body = Expr::binary(BinaryOp::Add, Expr::parameter(&x), ratio);
        let err = fold(&Expr::lambda(vec![x], body)).unwrap_err();
        assert!(matches!(err, ExprError::Evaluation { .. }));
    }
}
