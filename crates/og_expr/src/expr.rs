//! The expression tree.
//!
//! Every node is typed with the [`TypeInfo`] of the value it produces.
//! Parameters are shared through [`Arc`]: all references to one lambda
//! parameter point at the same [`ParameterExpr`], and the interpreter binds
//! arguments by that identity.

use core::fmt;
use std::sync::Arc;

use og_reflect::info::{ListInfo, TypeInfo, Typed};
use og_reflect::{Reflect, Value};

use crate::catalog::MethodInfo;
use crate::error::{ExprError, Result};
use crate::eval::Function;

// -----------------------------------------------------------------------------
// Operators

/// Binary operators, named as they appear in the AST envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Arithmetic addition.
    Add,
    /// Arithmetic subtraction.
    Subtract,
    /// Arithmetic multiplication.
    Multiply,
    /// Arithmetic division; integer division truncates.
    Divide,
    /// Remainder of the division.
    Modulo,
    /// Exponentiation, computed in `f64`.
    Power,
    /// Logical `and` of booleans, bitwise `and` of integers.
    And,
    /// Logical `or` of booleans, bitwise `or` of integers.
    Or,
    /// Logical or bitwise exclusive `or`.
    ExclusiveOr,
    LeftShift,
    RightShift,
    /// Short-circuiting `and`.
    AndAlso,
    /// Short-circuiting `or`.
    OrElse,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// The left value unless it is absent, the right value otherwise.
    Coalesce,
    /// Element of a sequence at an integer index.
    ArrayIndex,
}

impl BinaryOp {
    pub const ALL: [Self; 21] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
        Self::Power,
        Self::And,
        Self::Or,
        Self::ExclusiveOr,
        Self::LeftShift,
        Self::RightShift,
        Self::AndAlso,
        Self::OrElse,
        Self::Equal,
        Self::NotEqual,
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
        Self::Coalesce,
        Self::ArrayIndex,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Modulo => "Modulo",
            Self::Power => "Power",
            Self::And => "And",
            Self::Or => "Or",
            Self::ExclusiveOr => "ExclusiveOr",
            Self::LeftShift => "LeftShift",
            Self::RightShift => "RightShift",
            Self::AndAlso => "AndAlso",
            Self::OrElse => "OrElse",
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::Coalesce => "Coalesce",
            Self::ArrayIndex => "ArrayIndex",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Operators producing a `bool` from two comparable operands.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    #[inline]
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::AndAlso | Self::OrElse)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "**",
            Self::And => "&",
            Self::Or => "|",
            Self::ExclusiveOr => "^",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
            Self::AndAlso => "&&",
            Self::OrElse => "||",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Coalesce => "??",
            Self::ArrayIndex => "[]",
        })
    }
}

/// Unary operators, named as they appear in the AST envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Negate,
    UnaryPlus,
    /// Logical negation of booleans, bitwise complement of integers.
    Not,
    /// Conversion to the node type.
    Convert,
    /// The operand lambda as a value.
    Quote,
    /// Length of a sequence.
    ArrayLength,
    /// The operand if it is of the node type, absent otherwise.
    TypeAs,
}

impl UnaryOp {
    pub const ALL: [Self; 7] = [
        Self::Negate,
        Self::UnaryPlus,
        Self::Not,
        Self::Convert,
        Self::Quote,
        Self::ArrayLength,
        Self::TypeAs,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Negate => "Negate",
            Self::UnaryPlus => "UnaryPlus",
            Self::Not => "Not",
            Self::Convert => "Convert",
            Self::Quote => "Quote",
            Self::ArrayLength => "ArrayLength",
            Self::TypeAs => "TypeAs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

// -----------------------------------------------------------------------------
// Nodes

/// A lambda parameter.
///
/// Identity matters: compare parameters with [`Arc::ptr_eq`], not by name.
#[derive(Debug)]
pub struct ParameterExpr {
    name: String,
    ty: &'static TypeInfo,
}

impl ParameterExpr {
    pub fn new(name: impl Into<String>, ty: &'static TypeInfo) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            ty,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn ty(&self) -> &'static TypeInfo {
        self.ty
    }
}

#[derive(Debug, Clone)]
pub struct LambdaExpr {
    pub parameters: Vec<Arc<ParameterExpr>>,
    pub body: Expr,
}

#[derive(Debug, Clone)]
pub struct ConstantExpr {
    pub ty: &'static TypeInfo,
    pub value: Value,
}

/// Access to a field of a struct value.
#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub declaring: &'static TypeInfo,
    pub member: String,
    /// Type of the member.
    pub ty: &'static TypeInfo,
    pub expression: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub method: Arc<MethodInfo>,
    /// The receiver; `None` for static methods.
    pub object: Option<Box<Expr>>,
    pub arguments: Vec<Expr>,
}

/// Construction of a value from positional field values.
#[derive(Debug, Clone)]
pub struct NewExpr {
    pub ty: &'static TypeInfo,
    pub arguments: Vec<Expr>,
}

/// An array, either from its items or from its bounds.
#[derive(Debug, Clone)]
pub struct NewArrayExpr {
    pub element: &'static TypeInfo,
    pub expressions: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct MemberInitExpr {
    pub new: NewExpr,
    pub bindings: Vec<MemberBinding>,
}

/// One member initializer of a [`MemberInitExpr`].
#[derive(Debug, Clone)]
pub enum MemberBinding {
    /// `member = expression`.
    Assignment { member: String, expression: Expr },
    /// Nested initializers applied to the current member value.
    Member {
        member: String,
        bindings: Vec<MemberBinding>,
    },
    /// Elements appended to the current member sequence.
    List {
        member: String,
        initializers: Vec<ElementInit>,
    },
}

impl MemberBinding {
    pub fn member(&self) -> &str {
        match self {
            Self::Assignment { member, .. }
            | Self::Member { member, .. }
            | Self::List { member, .. } => member,
        }
    }

    /// Name of the binding in the AST envelope.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Assignment { .. } => "Assignment",
            Self::Member { .. } => "MemberBinding",
            Self::List { .. } => "ListBinding",
        }
    }
}

/// Arguments of one element added by a collection initializer.
///
/// Sequences take one argument per element, maps a key and a value.
#[derive(Debug, Clone)]
pub struct ElementInit {
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct ListInitExpr {
    pub new: NewExpr,
    pub initializers: Vec<ElementInit>,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub ty: &'static TypeInfo,
    pub test: Box<Expr>,
    pub if_true: Box<Expr>,
    pub if_false: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct TypeIsExpr {
    pub ty: &'static TypeInfo,
    pub expression: Box<Expr>,
}

/// Application of a lambda value to arguments.
#[derive(Debug, Clone)]
pub struct InvokeExpr {
    pub expression: Box<Expr>,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    /// Result type.
    pub ty: &'static TypeInfo,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

impl BinaryExpr {
    /// Type of the result.
    ///
    /// Comparisons and short-circuit operators produce `bool`, `Coalesce`
    /// the type of its fallback, `ArrayIndex` the element type, and the
    /// arithmetic operators the type of their left operand.
    pub fn ty(&self) -> &'static TypeInfo {
        match self.op {
            op if op.is_comparison() || op.is_short_circuit() => bool::type_info(),
            BinaryOp::Coalesce => self.right.ty(),
            BinaryOp::ArrayIndex => self
                .left
                .ty()
                .as_list()
                .map_or(Value::type_info(), ListInfo::item_info),
            _ => self.left.ty(),
        }
    }
}

// -----------------------------------------------------------------------------
// Expr

/// A node of an expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    Lambda(Arc<LambdaExpr>),
    Parameter(Arc<ParameterExpr>),
    Constant(ConstantExpr),
    MemberAccess(MemberExpr),
    Call(CallExpr),
    New(NewExpr),
    NewArrayInit(NewArrayExpr),
    NewArrayBounds(NewArrayExpr),
    MemberInit(MemberInitExpr),
    Conditional(ConditionalExpr),
    ListInit(ListInitExpr),
    TypeIs(TypeIsExpr),
    Invoke(InvokeExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
}

impl Expr {
    pub fn lambda(parameters: Vec<Arc<ParameterExpr>>, body: Expr) -> Self {
        Self::Lambda(Arc::new(LambdaExpr { parameters, body }))
    }

    /// A reference to `parameter`.
    #[inline]
    pub fn parameter(parameter: &Arc<ParameterExpr>) -> Self {
        Self::Parameter(Arc::clone(parameter))
    }

    pub fn constant<T: Reflect + Typed>(value: T) -> Self {
        Self::Constant(ConstantExpr {
            ty: T::type_info(),
            value: Value::new(value),
        })
    }

    /// A constant of type `ty`; an empty `value` is an absent value.
    pub fn constant_of(ty: &'static TypeInfo, value: Value) -> Self {
        Self::Constant(ConstantExpr { ty, value })
    }

    /// Access to `member` on the type of `expression`.
    pub fn member(expression: Expr, member: &str) -> Result<Self> {
        let declaring = expression.ty();
        let ty = member_type(declaring, member)?;
        Ok(Self::MemberAccess(MemberExpr {
            declaring,
            member: member.to_owned(),
            ty,
            expression: Box::new(expression),
        }))
    }

    /// A call of `method`, with `object` as receiver of instance methods.
    pub fn call(method: Arc<MethodInfo>, object: Option<Expr>, arguments: Vec<Expr>) -> Result<Self> {
        if method.is_static() != object.is_none() || method.parameter_types().len() != arguments.len() {
            return Err(ExprError::MethodResolution {
                type_path: method.declaring_type().type_path().to_owned(),
                method: method.name().to_owned(),
                parameters: format!("{} arguments", arguments.len()),
            });
        }
        Ok(Self::Call(CallExpr {
            method,
            object: object.map(Box::new),
            arguments,
        }))
    }

    pub fn new_object(ty: &'static TypeInfo, arguments: Vec<Expr>) -> Self {
        Self::New(NewExpr { ty, arguments })
    }

    pub fn new_array(element: &'static TypeInfo, items: Vec<Expr>) -> Self {
        Self::NewArrayInit(NewArrayExpr {
            element,
            expressions: items,
        })
    }

    /// An array of `element` defaults, sized by the product of `bounds`.
    pub fn new_array_bounds(element: &'static TypeInfo, bounds: Vec<Expr>) -> Self {
        Self::NewArrayBounds(NewArrayExpr {
            element,
            expressions: bounds,
        })
    }

    pub fn member_init(new: NewExpr, bindings: Vec<MemberBinding>) -> Self {
        Self::MemberInit(MemberInitExpr { new, bindings })
    }

    pub fn list_init(new: NewExpr, initializers: Vec<ElementInit>) -> Self {
        Self::ListInit(ListInitExpr { new, initializers })
    }

    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        Self::Conditional(ConditionalExpr {
            ty: if_true.ty(),
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    pub fn type_is(expression: Expr, ty: &'static TypeInfo) -> Self {
        Self::TypeIs(TypeIsExpr {
            ty,
            expression: Box::new(expression),
        })
    }

    pub fn invoke(expression: Expr, arguments: Vec<Expr>) -> Self {
        Self::Invoke(InvokeExpr {
            expression: Box::new(expression),
            arguments,
        })
    }

    /// A unary node whose type follows from its operand.
    ///
    /// Use [`convert`](Self::convert) and [`type_as`](Self::type_as) for
    /// the operators that name a target type.
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let ty = match op {
            UnaryOp::ArrayLength => usize::type_info(),
            UnaryOp::Quote => Function::type_info(),
            _ => operand.ty(),
        };
        Self::Unary(UnaryExpr {
            op,
            ty,
            operand: Box::new(operand),
        })
    }

    pub fn convert(operand: Expr, ty: &'static TypeInfo) -> Self {
        Self::Unary(UnaryExpr {
            op: UnaryOp::Convert,
            ty,
            operand: Box::new(operand),
        })
    }

    pub fn type_as(operand: Expr, ty: &'static TypeInfo) -> Self {
        Self::Unary(UnaryExpr {
            op: UnaryOp::TypeAs,
            ty,
            operand: Box::new(operand),
        })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Name of the node in the AST envelope.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Lambda(_) => "Lambda",
            Self::Parameter(_) => "Parameter",
            Self::Constant(_) => "Constant",
            Self::MemberAccess(_) => "MemberAccess",
            Self::Call(_) => "Call",
            Self::New(_) => "New",
            Self::NewArrayInit(_) => "NewArrayInit",
            Self::NewArrayBounds(_) => "NewArrayBounds",
            Self::MemberInit(_) => "MemberInit",
            Self::Conditional(_) => "Conditional",
            Self::ListInit(_) => "ListInit",
            Self::TypeIs(_) => "TypeIs",
            Self::Invoke(_) => "Invoke",
            Self::Unary(unary) => unary.op.name(),
            Self::Binary(binary) => binary.op.name(),
        }
    }

    /// Type of the value the node produces.
    ///
    /// Lambdas produce [`Function`] values and arrays untyped sequences.
    pub fn ty(&self) -> &'static TypeInfo {
        match self {
            Self::Lambda(_) => Function::type_info(),
            Self::Parameter(parameter) => parameter.ty(),
            Self::Constant(constant) => constant.ty,
            Self::MemberAccess(member) => member.ty,
            Self::Call(call) => call.method.return_type(),
            Self::New(new) => new.ty,
            Self::NewArrayInit(_) | Self::NewArrayBounds(_) => Value::type_info(),
            Self::MemberInit(init) => init.new.ty,
            Self::Conditional(conditional) => conditional.ty,
            Self::ListInit(init) => init.new.ty,
            Self::TypeIs(_) => bool::type_info(),
            Self::Invoke(invoke) => match invoke.expression.as_ref() {
                Self::Lambda(lambda) => lambda.body.ty(),
                _ => Value::type_info(),
            },
            Self::Unary(unary) => unary.ty,
            Self::Binary(binary) => binary.ty(),
        }
    }

    /// Direct sub-expressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        fn push_bindings<'a>(out: &mut Vec<&'a Expr>, list: &'a [MemberBinding]) {
            for binding in list {
                match binding {
                    MemberBinding::Assignment { expression, .. } => out.push(expression),
                    MemberBinding::Member { bindings, .. } => push_bindings(out, bindings),
                    MemberBinding::List { initializers, .. } => {
                        out.extend(initializers.iter().flat_map(|init| &init.arguments));
                    }
                }
            }
        }

        let mut out = Vec::new();
        match self {
            Self::Lambda(lambda) => out.push(&lambda.body),
            Self::Parameter(_) | Self::Constant(_) => {}
            Self::MemberAccess(member) => out.push(&member.expression),
            Self::Call(call) => {
                out.extend(call.object.as_deref());
                out.extend(&call.arguments);
            }
            Self::New(new) => out.extend(&new.arguments),
            Self::NewArrayInit(array) | Self::NewArrayBounds(array) => out.extend(&array.expressions),
            Self::MemberInit(init) => {
                out.extend(&init.new.arguments);
                push_bindings(&mut out, &init.bindings);
            }
            Self::Conditional(c) => out.extend([&*c.test, &*c.if_true, &*c.if_false]),
            Self::ListInit(init) => {
                out.extend(&init.new.arguments);
                out.extend(init.initializers.iter().flat_map(|init| &init.arguments));
            }
            Self::TypeIs(type_is) => out.push(&type_is.expression),
            Self::Invoke(invoke) => {
                out.push(&invoke.expression);
                out.extend(&invoke.arguments);
            }
            Self::Unary(unary) => out.push(&unary.operand),
            Self::Binary(binary) => out.extend([&*binary.left, &*binary.right]),
        }
        out
    }

    /// Whether a parameter is referenced anywhere in the tree.
    pub fn has_parameters(&self) -> bool {
        matches!(self, Self::Parameter(_)) || self.children().into_iter().any(Expr::has_parameters)
    }
}

/// Type of `member` on `declaring`.
///
/// Structs expose their fields. Free-form records, typed as
/// [`Value`] or dynamic structs, expose any member as a `Value`.
pub(crate) fn member_type(declaring: &'static TypeInfo, member: &str) -> Result<&'static TypeInfo> {
    match declaring {
        TypeInfo::Struct(info) => info.field(member).map(|field| field.type_info()),
        TypeInfo::Any(_) => Some(Value::type_info()),
        _ => None,
    }
    .ok_or_else(|| ExprError::MemberResolution {
        type_path: declaring.type_path().to_owned(),
        member: member.to_owned(),
    })
}

// -----------------------------------------------------------------------------
// Display

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lambda(lambda) => {
                f.write_str("(")?;
                write_list(f, lambda.parameters.iter().map(|p| p.name()))?;
                write!(f, ") => {}", lambda.body)
            }
            Self::Parameter(parameter) => f.write_str(parameter.name()),
            Self::Constant(constant) => match constant.value.get() {
                Some(value) => {
                    f.write_str("<")?;
                    value.reflect_debug(f)?;
                    f.write_str(">")
                }
                None => f.write_str("null"),
            },
            Self::MemberAccess(member) => write!(f, "{}.{}", member.expression, member.member),
            Self::Call(call) => {
                match &call.object {
                    Some(object) => write!(f, "{object}.{}(", call.method.name())?,
                    None => write!(
                        f,
                        "{}::{}(",
                        call.method.declaring_type().type_name(),
                        call.method.name()
                    )?,
                }
                write_list(f, &call.arguments)?;
                f.write_str(")")
            }
            Self::New(new) => write_new(f, new),
            Self::NewArrayInit(array) => {
                write!(f, "new {}[] {{", array.element.type_name())?;
                write_list(f, &array.expressions)?;
                f.write_str("}")
            }
            Self::NewArrayBounds(array) => {
                write!(f, "new {}[", array.element.type_name())?;
                write_list(f, &array.expressions)?;
                f.write_str("]")
            }
            Self::MemberInit(init) => {
                write_new(f, &init.new)?;
                f.write_str(" {")?;
                write_list(f, init.bindings.iter().map(|b| b.member()))?;
                f.write_str("}")
            }
            Self::Conditional(c) => write!(f, "({} ? {} : {})", c.test, c.if_true, c.if_false),
            Self::ListInit(init) => {
                write_new(f, &init.new)?;
                write!(f, " {{{} items}}", init.initializers.len())
            }
            Self::TypeIs(type_is) => write!(f, "({} is {})", type_is.expression, type_is.ty.type_name()),
            Self::Invoke(invoke) => {
                write!(f, "{}(", invoke.expression)?;
                write_list(f, &invoke.arguments)?;
                f.write_str(")")
            }
            Self::Unary(unary) => match unary.op {
                UnaryOp::Negate => write!(f, "-{}", unary.operand),
                UnaryOp::UnaryPlus => write!(f, "+{}", unary.operand),
                UnaryOp::Not => write!(f, "!{}", unary.operand),
                UnaryOp::Convert => write!(f, "({} as {})", unary.operand, unary.ty.type_name()),
                UnaryOp::TypeAs => write!(f, "({} as? {})", unary.operand, unary.ty.type_name()),
                UnaryOp::Quote => write!(f, "quote({})", unary.operand),
                UnaryOp::ArrayLength => write!(f, "{}.len()", unary.operand),
            },
            Self::Binary(binary) => match binary.op {
                BinaryOp::ArrayIndex => write!(f, "{}[{}]", binary.left, binary.right),
                op => write!(f, "({} {op} {})", binary.left, binary.right),
            },
        }
    }
}

fn write_new(f: &mut fmt::Formatter<'_>, new: &NewExpr) -> fmt::Result {
    write!(f, "new {}(", new.ty.type_name())?;
    write_list(f, &new.arguments)?;
    f.write_str(")")
}

fn write_list<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl IntoIterator<Item = T>,
) -> fmt::Result {
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use og_reflect::Value;
    use og_reflect::derive::Reflect;
    use og_reflect::info::Typed;

    use super::{BinaryOp, Expr, ParameterExpr, UnaryOp};
    use crate::error::ExprError;

    #[derive(Reflect, Debug, PartialEq)]
    struct Person {
        name: String,
        age: u32,
        scores: Vec<i16>,
    }

    #[test]
    fn operator_names_round_trip() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_name(op.name()), Some(op));
        }
        for op in UnaryOp::ALL {
            assert_eq!(UnaryOp::from_name(op.name()), Some(op));
        }
        assert_eq!(BinaryOp::from_name("Negate"), None);
    }

    #[test]
    fn node_types() {
        let x = ParameterExpr::new("x", Person::type_info());
        let age = Expr::member(Expr::parameter(&x), "age").unwrap();
        assert!(age.ty().type_is::<u32>());

        let sum = Expr::binary(BinaryOp::Add, age.clone(), Expr::constant(1_u32));
        assert!(sum.ty().type_is::<u32>());
        let test = Expr::binary(BinaryOp::GreaterThan, age, Expr::constant(18_u32));
        assert!(test.ty().type_is::<bool>());

        let scores = Expr::member(Expr::parameter(&x), "scores").unwrap();
        let first = Expr::binary(BinaryOp::ArrayIndex, scores.clone(), Expr::constant(0_usize));
        assert!(first.ty().type_is::<i16>());
        assert!(Expr::unary(UnaryOp::ArrayLength, scores).ty().type_is::<usize>());

        assert!(test.has_parameters());
        assert_eq!(test.children().len(), 2);
        assert!(!Expr::binary(BinaryOp::Add, Expr::constant(1_u8), Expr::constant(2_u8)).has_parameters());

        let lambda = Expr::lambda(vec![x], test);
        assert_eq!(lambda.to_string(), "(x) => (x.age > <18>)");
        assert!(Expr::invoke(lambda, vec![]).ty().type_is::<bool>());
    }

    #[test]
    fn members_resolve_on_the_declaring_type() {
        let x = ParameterExpr::new("x", Person::type_info());
        let err = Expr::member(Expr::parameter(&x), "height").unwrap_err();
        assert!(matches!(err, ExprError::MemberResolution { member, .. } if member == "height"));

        let record = Expr::constant_of(Value::type_info(), Value::empty());
        assert!(Expr::member(record, "anything").unwrap().ty().type_is::<Value>());
        assert!(Expr::member(Expr::constant(3_u8), "x").is_err());
    }
}
