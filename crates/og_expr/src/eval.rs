//! A tree-walking interpreter.
//!
//! Values flow through the interpreter as [`Value`]s; an empty value is an
//! absent one. Parameters are bound by node identity, so a tree only
//! evaluates if every parameter reference is the very node its lambda
//! declares.

use core::cmp::Ordering;
use std::sync::Arc;

use og_reflect::derive::Reflect;
use og_reflect::info::{ReflectKind, StructInfo, TypeInfo, Typed};
use og_reflect::ops::{
    DynamicList, DynamicMap, DynamicOptional, DynamicStruct, DynamicTuple, List, ReflectRef,
    ScalarRef, ScalarValue, Struct,
};
use og_reflect::registry::{TypeRegistry, TypeTraitDefault, TypeTraitFromReflect};
use og_reflect::{FromReflect, Reflect, TypeHandle, Value};

use crate::catalog::MethodCatalog;
use crate::error::{ExprError, Result};
use crate::expr::{
    BinaryExpr, BinaryOp, ElementInit, Expr, LambdaExpr, MemberBinding, NewExpr, ParameterExpr,
    UnaryExpr, UnaryOp,
};

type Scope = Vec<(Arc<ParameterExpr>, Value)>;

// -----------------------------------------------------------------------------
// Function

/// A lambda value, with the bindings of the scope it was created in.
#[derive(Reflect, Clone)]
#[reflect(opaque, clone, type_path = "og_expr::Function")]
pub struct Function {
    lambda: Arc<LambdaExpr>,
    captured: Scope,
}

impl Function {
    #[inline]
    pub fn lambda(&self) -> &LambdaExpr {
        &self.lambda
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.lambda.parameters.len()
    }
}

// -----------------------------------------------------------------------------
// CompiledLambda

/// A lambda ready to be called.
pub struct CompiledLambda<'a> {
    function: Function,
    interpreter: Interpreter<'a>,
}

impl CompiledLambda<'_> {
    /// Calls the lambda; arguments are converted to the parameter types.
    pub fn call(&self, arguments: Vec<Value>) -> Result<Value> {
        self.interpreter.call(&self.function, arguments)
    }

    /// Calls the lambda and converts the result into `R`.
    pub fn invoke<R: FromReflect>(&self, arguments: Vec<Value>) -> Result<R> {
        let result = self.call(arguments)?;
        let result = result
            .into_inner()
            .ok_or_else(|| ExprError::evaluation("the lambda returned no value"))?;
        R::take_from_reflect(result).map_err(|result| {
            ExprError::evaluation(format!(
                "cannot convert `{}` to `{}`",
                result.reflect_type_path(),
                R::type_info().type_path()
            ))
        })
    }
}

impl LambdaExpr {
    /// Prepares the lambda for evaluation.
    ///
    /// `registry` rebuilds concrete values out of constructed ones, and
    /// `catalog` provides the operator overloads of non-scalar operands.
    pub fn compile<'a>(
        &self,
        registry: &'a TypeRegistry,
        catalog: &'a MethodCatalog,
    ) -> CompiledLambda<'a> {
        CompiledLambda {
            function: Function {
                lambda: Arc::new(self.clone()),
                captured: Vec::new(),
            },
            interpreter: Interpreter::new(registry, catalog),
        }
    }
}

// -----------------------------------------------------------------------------
// Interpreter

/// Evaluates expressions.
#[derive(Clone, Copy)]
pub struct Interpreter<'a> {
    registry: &'a TypeRegistry,
    catalog: &'a MethodCatalog,
}

impl<'a> Interpreter<'a> {
    pub fn new(registry: &'a TypeRegistry, catalog: &'a MethodCatalog) -> Self {
        Self { registry, catalog }
    }

    /// Evaluates an expression outside of any lambda.
    ///
    /// Fails if the expression references a parameter.
    pub fn evaluate(&self, expr: &Expr) -> Result<Value> {
        self.eval(&mut Vec::new(), expr)
    }

    /// Applies a lambda value to arguments.
    pub fn call(&self, function: &Function, arguments: Vec<Value>) -> Result<Value> {
        let parameters = &function.lambda.parameters;
        if parameters.len() != arguments.len() {
            return Err(ExprError::evaluation(format!(
                "lambda of {} parameters called with {} arguments",
                parameters.len(),
                arguments.len()
            )));
        }
        let mut scope = function.captured.clone();
        for (parameter, argument) in parameters.iter().zip(arguments) {
            let argument = into_value(self.coerce(argument, parameter.ty())?);
            scope.push((Arc::clone(parameter), argument));
        }
        log::trace!("calling {}", Expr::Lambda(Arc::clone(&function.lambda)));
        self.eval(&mut scope, &function.lambda.body)
    }

    fn eval(&self, scope: &mut Scope, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Lambda(lambda) => Ok(Value::new(Function {
                lambda: Arc::clone(lambda),
                captured: scope.clone(),
            })),
            Expr::Parameter(parameter) => scope
                .iter()
                .rev()
                .find(|(bound, _)| Arc::ptr_eq(bound, parameter))
                .map(|(_, value)| value.clone())
                .ok_or_else(|| {
                    ExprError::evaluation(format!("unbound parameter `{}`", parameter.name()))
                }),
            Expr::Constant(constant) => Ok(constant.value.clone()),
            Expr::MemberAccess(member) => {
                let target = self.eval(scope, &member.expression)?;
                let target = present(&target).ok_or_else(|| {
                    ExprError::evaluation(format!("member `{}` of an absent value", member.member))
                })?;
                match target.reflect_ref() {
                    ReflectRef::Struct(record) => record.field(&member.member),
                    _ => None,
                }
                .map(|field| into_value(field.reflect_clone()))
                .ok_or_else(|| ExprError::MemberResolution {
                    type_path: target.reflect_type_path().to_owned(),
                    member: member.member.clone(),
                })
            }
            Expr::Call(call) => {
                let receiver = match &call.object {
                    Some(object) => Some(self.eval(scope, object)?),
                    None => None,
                };
                let receiver = match &receiver {
                    Some(receiver) => Some(present(receiver).ok_or_else(|| {
                        ExprError::evaluation(format!(
                            "method `{}` called on an absent value",
                            call.method.name()
                        ))
                    })?),
                    None => None,
                };
                let mut arguments = Vec::with_capacity(call.arguments.len());
                for (argument, &ty) in call.arguments.iter().zip(call.method.parameter_types()) {
                    let argument = self.eval(scope, argument)?;
                    arguments.push(self.coerce(argument, ty)?);
                }
                let arguments: Vec<&dyn Reflect> = arguments.iter().map(|arg| &**arg).collect();
                call.method.invoke(receiver, &arguments).map(into_value)
            }
            Expr::New(new) => self.construct(scope, new, &[]),
            Expr::NewArrayInit(array) => {
                let mut list = DynamicList::with_capacity(array.expressions.len());
                for item in &array.expressions {
                    let item = self.eval(scope, item)?;
                    list.push_boxed(self.coerce(item, array.element)?);
                }
                Ok(Value::new(list))
            }
            Expr::NewArrayBounds(array) => {
                let mut len = 1usize;
                for bound in &array.expressions {
                    let bound = self.eval(scope, bound)?;
                    let bound = integer(&bound)
                        .and_then(|bound| usize::try_from(bound).ok())
                        .ok_or_else(|| ExprError::evaluation("array bounds must be non-negative integers"))?;
                    len = len
                        .checked_mul(bound)
                        .ok_or_else(|| ExprError::evaluation("array bounds overflow"))?;
                }
                let mut list = DynamicList::with_capacity(len);
                for _ in 0..len {
                    list.push_boxed(self.default_of(array.element)?);
                }
                Ok(Value::new(list))
            }
            Expr::MemberInit(init) => self.construct(scope, &init.new, &init.bindings),
            Expr::ListInit(init) => {
                let collection = self.collection(scope, init.new.ty, &init.initializers)?;
                self.materialize(collection, init.new.ty).map(into_value)
            }
            Expr::Conditional(conditional) => {
                let test = self.eval(scope, &conditional.test)?;
                if truth(&test)? {
                    self.eval(scope, &conditional.if_true)
                } else {
                    self.eval(scope, &conditional.if_false)
                }
            }
            Expr::TypeIs(type_is) => {
                let value = self.eval(scope, &type_is.expression)?;
                Ok(Value::new(is_instance(&value, type_is.ty)))
            }
            Expr::Invoke(invoke) => {
                let target = self.eval(scope, &invoke.expression)?;
                let function = present(&target)
                    .and_then(|target| target.downcast_ref::<Function>())
                    .ok_or_else(|| ExprError::evaluation("only lambdas can be invoked"))?;
                let mut arguments = Vec::with_capacity(invoke.arguments.len());
                for argument in &invoke.arguments {
                    arguments.push(self.eval(scope, argument)?);
                }
                self.call(function, arguments)
            }
            Expr::Unary(unary) => self.unary(scope, unary),
            Expr::Binary(binary) => self.binary(scope, binary),
        }
    }

    fn unary(&self, scope: &mut Scope, unary: &UnaryExpr) -> Result<Value> {
        let operand = self.eval(scope, &unary.operand)?;
        match unary.op {
            UnaryOp::Quote => Ok(operand),
            UnaryOp::Convert => self.coerce(operand, unary.ty).map(into_value),
            UnaryOp::TypeAs if is_instance(&operand, unary.ty) => Ok(operand),
            UnaryOp::TypeAs => Ok(Value::empty()),
            UnaryOp::ArrayLength => {
                let len = match present(&operand).map(Reflect::reflect_ref) {
                    Some(ReflectRef::List(list)) => list.len(),
                    _ => return Err(ExprError::evaluation("only sequences have a length")),
                };
                to_type(ScalarValue::UInt(len as u64), unary.ty)
            }
            UnaryOp::UnaryPlus => Ok(operand),
            op @ (UnaryOp::Negate | UnaryOp::Not) => {
                let scalar = present(&operand).and_then(scalar).ok_or_else(|| {
                    ExprError::evaluation(format!("`{}` needs a scalar operand", op.name()))
                })?;
                let value = match (op, scalar) {
                    (UnaryOp::Not, ScalarRef::Bool(v)) => ScalarValue::Bool(!v),
                    (UnaryOp::Not, scalar) => {
                        let v = scalar
                            .as_i128()
                            .ok_or_else(|| ExprError::evaluation(format!("cannot complement `{scalar}`")))?;
                        integer_value(complement(v, unary.ty))?
                    }
                    (_, ScalarRef::F32(v)) => ScalarValue::F32(-v),
                    (_, ScalarRef::F64(v)) => ScalarValue::F64(-v),
                    (_, scalar) => {
                        let v = scalar
                            .as_i128()
                            .ok_or_else(|| ExprError::evaluation(format!("cannot negate `{scalar}`")))?;
                        integer_value(-v)?
                    }
                };
                to_type(value, unary.ty)
            }
        }
    }

    fn binary(&self, scope: &mut Scope, binary: &BinaryExpr) -> Result<Value> {
        let op = binary.op;
        if op.is_short_circuit() {
            let left = truth(&self.eval(scope, &binary.left)?)?;
            return match (op, left) {
                (BinaryOp::AndAlso, false) => Ok(Value::new(false)),
                (BinaryOp::OrElse, true) => Ok(Value::new(true)),
                _ => Ok(Value::new(truth(&self.eval(scope, &binary.right)?)?)),
            };
        }

        let left = self.eval(scope, &binary.left)?;
        if op == BinaryOp::Coalesce {
            return match present(&left) {
                Some(left) => Ok(into_value(left.reflect_clone())),
                None => self.eval(scope, &binary.right),
            };
        }
        let right = self.eval(scope, &binary.right)?;

        if op == BinaryOp::ArrayIndex {
            let index = integer(&right)
                .and_then(|index| usize::try_from(index).ok())
                .ok_or_else(|| ExprError::evaluation("indices must be non-negative integers"))?;
            return match present(&left).map(Reflect::reflect_ref) {
                Some(ReflectRef::List(list)) => list
                    .get(index)
                    .map(|item| into_value(item.reflect_clone()))
                    .ok_or_else(|| ExprError::evaluation(format!("index {index} out of bounds"))),
                _ => Err(ExprError::evaluation("only sequences can be indexed")),
            };
        }

        let (Some(l), Some(r)) = (present(&left), present(&right)) else {
            return match op {
                BinaryOp::Equal => Ok(Value::new(present(&left).is_none() && present(&right).is_none())),
                BinaryOp::NotEqual => Ok(Value::new(present(&left).is_some() || present(&right).is_some())),
                _ => Err(ExprError::evaluation(format!("`{}` of an absent value", op.name()))),
            };
        };

        let (Some(a), Some(b)) = (scalar(l), scalar(r)) else {
            return self.overloaded(binary, l, r);
        };
        match op {
            BinaryOp::Equal => Ok(Value::new(a == b)),
            BinaryOp::NotEqual => Ok(Value::new(a != b)),
            BinaryOp::LessThan
            | BinaryOp::LessThanOrEqual
            | BinaryOp::GreaterThan
            | BinaryOp::GreaterThanOrEqual => {
                let ordering = compare(a, b)
                    .ok_or_else(|| ExprError::evaluation(format!("cannot compare `{a}` with `{b}`")))?;
                Ok(Value::new(match op {
                    BinaryOp::LessThan => ordering.is_lt(),
                    BinaryOp::LessThanOrEqual => ordering.is_le(),
                    BinaryOp::GreaterThan => ordering.is_gt(),
                    _ => ordering.is_ge(),
                }))
            }
            _ => to_type(arithmetic(op, a, b)?, binary.ty()),
        }
    }

    /// Operators on non-scalar operands, looked up as static methods named
    /// after the operator on the left operand type.
    fn overloaded(&self, binary: &BinaryExpr, left: &dyn Reflect, right: &dyn Reflect) -> Result<Value> {
        let (left_ty, right_ty) = (binary.left.ty(), binary.right.ty());
        match self
            .catalog
            .resolve(left_ty, binary.op.name(), &[], &[left_ty, right_ty])
        {
            Ok(method) => method.invoke(None, &[left, right]).map(into_value),
            Err(_) if matches!(binary.op, BinaryOp::Equal | BinaryOp::NotEqual) => {
                let equal = left.reflect_partial_eq(right).unwrap_or(false);
                Ok(Value::new(equal == (binary.op == BinaryOp::Equal)))
            }
            Err(err) => Err(err),
        }
    }

    // -------------------------------------------------------------------------
    // Construction

    fn construct(&self, scope: &mut Scope, new: &NewExpr, bindings: &[MemberBinding]) -> Result<Value> {
        let mut arguments = Vec::with_capacity(new.arguments.len());
        for argument in &new.arguments {
            arguments.push(self.eval(scope, argument)?);
        }

        let value: Box<dyn Reflect> = match new.ty {
            TypeInfo::Struct(info) => {
                if arguments.len() > info.field_len() {
                    return Err(arity_error(new));
                }
                let mut record = info
                    .default_value()
                    .and_then(|default| match default.reflect_ref() {
                        ReflectRef::Struct(default) => Some(default.to_dynamic_struct()),
                        _ => None,
                    })
                    .unwrap_or_default();
                for (field, argument) in info.iter().zip(arguments) {
                    record.insert_boxed(field.name(), self.coerce(argument, field.type_info())?);
                }
                self.bind(scope, &mut record, info, bindings)?;
                record.set_represented_type(Some(new.ty));
                Box::new(record)
            }
            _ if !bindings.is_empty() => {
                return Err(ExprError::evaluation(format!(
                    "`{}` has no members to initialize",
                    new.ty.type_path()
                )));
            }
            TypeInfo::Tuple(info) => {
                if arguments.len() != info.field_len() {
                    return Err(arity_error(new));
                }
                let mut tuple = DynamicTuple::default();
                for (field, argument) in info.iter().zip(arguments) {
                    tuple.push_boxed(self.coerce(argument, field.type_info())?);
                }
                tuple.set_represented_type(Some(new.ty));
                Box::new(tuple)
            }
            TypeInfo::List(_) | TypeInfo::Map(_) if arguments.is_empty() => {
                self.collection(scope, new.ty, &[])?
            }
            _ => match <[Value; 1]>::try_from(arguments) {
                Ok([argument]) => return self.coerce(argument, new.ty).map(into_value),
                Err(arguments) if arguments.is_empty() => return self.default_of(new.ty).map(into_value),
                Err(_) => return Err(arity_error(new)),
            },
        };
        self.materialize(value, new.ty).map(into_value)
    }

    fn bind(
        &self,
        scope: &mut Scope,
        record: &mut DynamicStruct,
        info: &StructInfo,
        bindings: &[MemberBinding],
    ) -> Result<()> {
        for binding in bindings {
            let member = binding.member();
            let field = info.field(member).ok_or_else(|| ExprError::MemberResolution {
                type_path: info.type_path().to_owned(),
                member: member.to_owned(),
            })?;
            let ty = field.type_info();
            let value = match binding {
                MemberBinding::Assignment { expression, .. } => {
                    let value = self.eval(scope, expression)?;
                    self.coerce(value, ty)?
                }
                MemberBinding::Member { bindings, .. } => {
                    let TypeInfo::Struct(nested) = ty else {
                        return Err(ExprError::evaluation(format!(
                            "member `{member}` is not a struct"
                        )));
                    };
                    let mut current = match record.field(member).map(Reflect::reflect_ref) {
                        Some(ReflectRef::Struct(current)) => current.to_dynamic_struct(),
                        _ => DynamicStruct::new(),
                    };
                    self.bind(scope, &mut current, nested, bindings)?;
                    current.set_represented_type(Some(ty));
                    self.materialize(Box::new(current), ty)?
                }
                MemberBinding::List { initializers, .. } => {
                    let mut current = self.collection(scope, ty, initializers)?;
                    if let Some(ReflectRef::List(existing)) = record.field(member).map(Reflect::reflect_ref) {
                        let mut list = existing.to_dynamic_list();
                        if let ReflectRef::List(added) = current.reflect_ref() {
                            for item in added.iter() {
                                list.push_boxed(item.reflect_clone());
                            }
                        }
                        list.set_represented_type(Some(ty));
                        current = Box::new(list);
                    }
                    self.materialize(current, ty)?
                }
            };
            record.insert_boxed(member.to_owned(), value);
        }
        Ok(())
    }

    /// A sequence or map of type `ty` filled by `initializers`.
    fn collection(
        &self,
        scope: &mut Scope,
        ty: &'static TypeInfo,
        initializers: &[ElementInit],
    ) -> Result<Box<dyn Reflect>> {
        match ty {
            TypeInfo::List(info) => {
                let mut list = DynamicList::with_capacity(initializers.len());
                list.set_represented_type(Some(ty));
                for init in initializers {
                    let [item] = init.arguments.as_slice() else {
                        return Err(ExprError::evaluation("sequence elements take one argument"));
                    };
                    let item = self.eval(scope, item)?;
                    list.push_boxed(self.coerce(item, info.item_info())?);
                }
                Ok(Box::new(list))
            }
            TypeInfo::Map(info) => {
                let mut map = DynamicMap::with_capacity(initializers.len());
                map.set_represented_type(Some(ty));
                for init in initializers {
                    let [key, value] = init.arguments.as_slice() else {
                        return Err(ExprError::evaluation("map entries take a key and a value"));
                    };
                    let key = self.eval(scope, key)?;
                    let value = self.eval(scope, value)?;
                    map.insert_boxed(
                        self.coerce(key, info.key_info())?,
                        self.coerce(value, info.value_info())?,
                    );
                }
                Ok(Box::new(map))
            }
            _ => Err(ExprError::evaluation(format!(
                "`{}` is not a collection",
                ty.type_path()
            ))),
        }
    }

    // -------------------------------------------------------------------------
    // Conversion

    /// Converts `value` into a value of type `target`.
    ///
    /// `Value` targets take anything, scalars convert between each other,
    /// and other values are rebuilt through the registry.
    fn coerce(&self, value: Value, target: &'static TypeInfo) -> Result<Box<dyn Reflect>> {
        if let TypeInfo::Any(_) = target {
            return Ok(Box::new(value));
        }
        let Some(value) = value.into_inner().map(unwrap_nested) else {
            return match target {
                TypeInfo::Optional(_) => {
                    let mut none = DynamicOptional::none();
                    none.set_represented_type(Some(target));
                    self.materialize(Box::new(none), target)
                }
                _ => Err(ExprError::evaluation(format!(
                    "an absent value is not a `{}`",
                    target.type_path()
                ))),
            };
        };
        if !value.is_dynamic() && value.reflect_type_info().type_id() == target.type_id() {
            return Ok(value);
        }
        if let (TypeInfo::Scalar(info), ReflectRef::Scalar(scalar)) = (target, value.reflect_ref()) {
            return info
                .from_scalar(scalar.as_scalar().to_value())
                .map_err(|err| ExprError::evaluation(err.to_string()));
        }
        match target {
            TypeInfo::Optional(info) if value.reflect_kind() != ReflectKind::Optional => {
                let inner = self.coerce(Value::from_boxed(value), info.inner_info())?;
                let mut some = DynamicOptional::new(Some(inner));
                some.set_represented_type(Some(target));
                self.materialize(Box::new(some), target)
            }
            _ => self.materialize(value, target),
        }
    }

    /// Rebuilds a concrete value of type `ty` when the registry knows how.
    fn materialize(&self, value: Box<dyn Reflect>, ty: &'static TypeInfo) -> Result<Box<dyn Reflect>> {
        if !value.is_dynamic() && value.reflect_type_info().type_id() == ty.type_id() {
            return Ok(value);
        }
        match self
            .registry
            .get_type_trait::<TypeTraitFromReflect>(ty.type_id())
        {
            Some(from_reflect) => from_reflect.from_reflect(&*value).ok_or_else(|| {
                ExprError::evaluation(format!("cannot build a `{}` from {value:?}", ty.type_path()))
            }),
            None => Ok(value),
        }
    }

    fn default_of(&self, ty: &'static TypeInfo) -> Result<Box<dyn Reflect>> {
        if let TypeInfo::Any(_) = ty {
            return Ok(Box::new(Value::empty()));
        }
        self.registry
            .get_type_trait::<TypeTraitDefault>(ty.type_id())
            .map(TypeTraitDefault::default)
            .ok_or_else(|| {
                ExprError::evaluation(format!("`{}` has no registered default", ty.type_path()))
            })
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn arity_error(new: &NewExpr) -> ExprError {
    ExprError::evaluation(format!(
        "cannot construct `{}` from {} arguments",
        new.ty.type_path(),
        new.arguments.len()
    ))
}

/// Unwraps results that are themselves `Value`s.
pub(crate) fn into_value(value: Box<dyn Reflect>) -> Value {
    match value.take::<Value>() {
        Ok(value) => value,
        Err(value) => Value::from_boxed(value),
    }
}

fn unwrap_nested(value: Box<dyn Reflect>) -> Box<dyn Reflect> {
    match value.take::<Value>() {
        Ok(inner) => inner.into_inner().map_or_else(|| Box::new(Value::empty()) as _, unwrap_nested),
        Err(value) => value,
    }
}

/// The held value, looking through `Value`s and present optionals.
fn present(value: &Value) -> Option<&dyn Reflect> {
    let mut current = value.get()?;
    loop {
        if let Some(inner) = current.downcast_ref::<Value>() {
            current = inner.get()?;
        } else if let ReflectRef::Optional(optional) = current.reflect_ref() {
            current = optional.value()?;
        } else {
            return Some(current);
        }
    }
}

fn scalar(value: &dyn Reflect) -> Option<ScalarRef<'_>> {
    match value.reflect_ref() {
        ReflectRef::Scalar(scalar) => Some(scalar.as_scalar()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i128> {
    present(value).and_then(scalar)?.as_i128()
}

fn truth(value: &Value) -> Result<bool> {
    match present(value).and_then(scalar) {
        Some(ScalarRef::Bool(v)) => Ok(v),
        _ => Err(ExprError::evaluation("expected a boolean")),
    }
}

fn is_instance(value: &Value, ty: &TypeInfo) -> bool {
    present(value)
        .and_then(Reflect::represented_type_info)
        .is_some_and(|info| info.type_id() == ty.type_id())
}

/// Bitwise complement within the width of `ty`.
fn complement(v: i128, ty: &TypeInfo) -> i128 {
    match ty {
        TypeInfo::Scalar(info) if !info.kind().is_signed() && info.kind().bits() > 0 => {
            !v & ((1_i128 << info.kind().bits()) - 1)
        }
        _ => !v,
    }
}

fn compare(a: ScalarRef<'_>, b: ScalarRef<'_>) -> Option<Ordering> {
    match (a, b) {
        (ScalarRef::Str(a), ScalarRef::Str(b)) => Some(a.cmp(b)),
        (ScalarRef::Char(a), ScalarRef::Char(b)) => Some(a.cmp(&b)),
        (ScalarRef::Bool(a), ScalarRef::Bool(b)) => Some(a.cmp(&b)),
        (ScalarRef::DateTime(a), ScalarRef::DateTime(b)) => Some(a.cmp(&b)),
        _ => match (a.as_i128(), b.as_i128()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
    }
}

fn arithmetic(op: BinaryOp, a: ScalarRef<'_>, b: ScalarRef<'_>) -> Result<ScalarValue> {
    match (a, b) {
        (ScalarRef::Bool(x), ScalarRef::Bool(y)) => match op {
            BinaryOp::And => Ok(ScalarValue::Bool(x & y)),
            BinaryOp::Or => Ok(ScalarValue::Bool(x | y)),
            BinaryOp::ExclusiveOr => Ok(ScalarValue::Bool(x ^ y)),
            _ => Err(unsupported(op, a, b)),
        },
        (ScalarRef::Str(_), _) | (_, ScalarRef::Str(_)) if op == BinaryOp::Add => {
            Ok(ScalarValue::Str(format!("{a}{b}")))
        }
        _ => match (a.as_i128(), b.as_i128()) {
            (Some(x), Some(y)) if op != BinaryOp::Power => {
                let result = match op {
                    BinaryOp::Add => x.checked_add(y),
                    BinaryOp::Subtract => x.checked_sub(y),
                    BinaryOp::Multiply => x.checked_mul(y),
                    BinaryOp::Divide => x.checked_div(y),
                    BinaryOp::Modulo => x.checked_rem(y),
                    BinaryOp::And => Some(x & y),
                    BinaryOp::Or => Some(x | y),
                    BinaryOp::ExclusiveOr => Some(x ^ y),
                    BinaryOp::LeftShift => u32::try_from(y).ok().and_then(|y| x.checked_shl(y)),
                    BinaryOp::RightShift => u32::try_from(y).ok().and_then(|y| x.checked_shr(y)),
                    _ => return Err(unsupported(op, a, b)),
                };
                let result = result.ok_or_else(|| {
                    ExprError::evaluation(format!("`{a} {op} {b}` overflows or divides by zero"))
                })?;
                integer_value(result)
            }
            _ => {
                let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
                    return Err(unsupported(op, a, b));
                };
                let result = match op {
                    BinaryOp::Add => x + y,
                    BinaryOp::Subtract => x - y,
                    BinaryOp::Multiply => x * y,
                    BinaryOp::Divide => x / y,
                    BinaryOp::Modulo => x % y,
                    BinaryOp::Power => x.powf(y),
                    _ => return Err(unsupported(op, a, b)),
                };
                Ok(ScalarValue::F64(result))
            }
        },
    }
}

fn unsupported(op: BinaryOp, a: ScalarRef<'_>, b: ScalarRef<'_>) -> ExprError {
    ExprError::evaluation(format!("`{}` is not defined for `{a}` and `{b}`", op.name()))
}

fn integer_value(v: i128) -> Result<ScalarValue> {
    if let Ok(v) = i64::try_from(v) {
        Ok(ScalarValue::Int(v))
    } else if let Ok(v) = u64::try_from(v) {
        Ok(ScalarValue::UInt(v))
    } else {
        Err(ExprError::evaluation(format!("`{v}` overflows 64 bits")))
    }
}

/// Converts a computed scalar into the node type.
fn to_type(value: ScalarValue, ty: &'static TypeInfo) -> Result<Value> {
    match ty {
        TypeInfo::Scalar(info) => info
            .from_scalar(value)
            .map(Value::from_boxed)
            .map_err(|err| ExprError::evaluation(err.to_string())),
        TypeInfo::Optional(info) => to_type(value, info.inner_info()),
        _ => Ok(match value {
            ScalarValue::Bool(v) => Value::new(v),
            ScalarValue::Int(v) => Value::new(v),
            ScalarValue::UInt(v) => Value::new(v),
            ScalarValue::F32(v) => Value::new(v),
            ScalarValue::F64(v) => Value::new(v),
            ScalarValue::Char(v) => Value::new(v),
            ScalarValue::Str(v) => Value::new(v),
            ScalarValue::DateTime(v) => Value::new(v),
            ScalarValue::Type(v) => Value::new(TypeHandle(v)),
        }),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use og_reflect::derive::Reflect;
    use og_reflect::info::Typed;
    use og_reflect::registry::TypeRegistry;
    use og_reflect::{Reflect, Value};

    use super::Interpreter;
    use crate::catalog::{MethodCatalog, MethodInfo, arg};
    use crate::error::ExprError;
    use crate::expr::{BinaryOp, ElementInit, Expr, MemberBinding, NewExpr, ParameterExpr, UnaryOp};

    #[derive(Reflect, Debug, PartialEq, Clone, Default)]
    #[reflect(default)]
    struct Account {
        owner: String,
        balance: i64,
        tags: Vec<String>,
        limits: Limits,
    }

    #[derive(Reflect, Debug, PartialEq, Clone, Default)]
    struct Limits {
        daily: u32,
        monthly: u32,
    }

    #[derive(Reflect, Debug, PartialEq, Clone, Copy)]
    struct Money(i64);

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register::<Account>();
        registry.register::<Money>();
        registry.register::<Vec<u8>>();
        registry.register::<BTreeMap<String, u8>>();
        registry
    }

    fn eval(expr: &Expr) -> Result<Value, ExprError> {
        let registry = registry();
        let catalog = MethodCatalog::new();
        Interpreter::new(&registry, &catalog).evaluate(expr)
    }

    fn eval_as<T: Reflect + Clone>(expr: &Expr) -> T {
        eval(expr).unwrap().downcast_ref::<T>().cloned().unwrap()
    }

    #[test]
    fn arithmetic_keeps_the_left_type() {
        let sum = Expr::binary(BinaryOp::Add, Expr::constant(250_u8), Expr::constant(5_i32));
        assert_eq!(eval_as::<u8>(&sum), 255);
        let overflow = Expr::binary(BinaryOp::Add, Expr::constant(250_u8), Expr::constant(6_u8));
        assert!(matches!(eval(&overflow), Err(ExprError::Evaluation { .. })));
        let div = Expr::binary(BinaryOp::Divide, Expr::constant(7_i32), Expr::constant(0_i32));
        assert!(eval(&div).is_err());
        let mixed = Expr::binary(BinaryOp::Multiply, Expr::constant(1.5_f64), Expr::constant(2_i32));
        assert_eq!(eval_as::<f64>(&mixed), 3.0);
        let power = Expr::binary(BinaryOp::Power, Expr::constant(2_i32), Expr::constant(10_i32));
        assert_eq!(eval_as::<i32>(&power), 1024);
        let shift = Expr::binary(BinaryOp::LeftShift, Expr::constant(1_u16), Expr::constant(4_i32));
        assert_eq!(eval_as::<u16>(&shift), 16);
        let concat = Expr::binary(BinaryOp::Add, Expr::constant(String::from("n=")), Expr::constant(3_u8));
        assert_eq!(eval_as::<String>(&concat), "n=3");
        let not = Expr::unary(UnaryOp::Not, Expr::constant(0b1010_u8));
        assert_eq!(eval_as::<u8>(&not), 0b1111_0101);
        let neg = Expr::unary(UnaryOp::Negate, Expr::constant(5_i16));
        assert_eq!(eval_as::<i16>(&neg), -5);
    }

    #[test]
    fn comparisons_and_logic() {
        let lt = Expr::binary(BinaryOp::LessThan, Expr::constant(3_u64), Expr::constant(-1_i64));
        assert!(!eval_as::<bool>(&lt));
        let eq = Expr::binary(BinaryOp::Equal, Expr::constant(2_u8), Expr::constant(2.0_f32));
        assert!(eval_as::<bool>(&eq));
        let words = Expr::binary(
            BinaryOp::GreaterThanOrEqual,
            Expr::constant(String::from("b")),
            Expr::constant(String::from("a")),
        );
        assert!(eval_as::<bool>(&words));

        // the right side would fail if it were evaluated
        let failing = Expr::binary(BinaryOp::Divide, Expr::constant(1_i32), Expr::constant(0_i32));
        let guard = Expr::binary(
            BinaryOp::AndAlso,
            Expr::constant(false),
            Expr::binary(BinaryOp::Equal, failing, Expr::constant(0_i32)),
        );
        assert!(!eval_as::<bool>(&guard));

        let absent = Expr::constant(None::<u8>);
        let is_null = Expr::binary(BinaryOp::Equal, absent.clone(), Expr::constant_of(Value::type_info(), Value::empty()));
        assert!(eval_as::<bool>(&is_null));
        let fallback = Expr::binary(BinaryOp::Coalesce, absent, Expr::constant(9_u8));
        assert_eq!(eval_as::<u8>(&fallback), 9);
        let kept = Expr::binary(BinaryOp::Coalesce, Expr::constant(Some(4_u8)), Expr::constant(9_u8));
        assert_eq!(eval_as::<u8>(&kept), 4);

        let pick = Expr::conditional(Expr::constant(true), Expr::constant(1_u8), Expr::constant(2_u8));
        assert_eq!(eval_as::<u8>(&pick), 1);
    }

    #[test]
    fn lambdas_bind_by_identity() {
        let x = ParameterExpr::new("x", i32::type_info());
        let impostor = ParameterExpr::new("x", i32::type_info());
        let registry = registry();
        let catalog = MethodCatalog::new();

        let double = Expr::lambda(
            vec![x.clone()],
            Expr::binary(BinaryOp::Multiply, Expr::parameter(&x), Expr::constant(2_i32)),
        );
        let Expr::Lambda(lambda) = &double else { unreachable!() };
        let compiled = lambda.compile(&registry, &catalog);
        assert_eq!(compiled.invoke::<i32>(vec![Value::new(21_i32)]).unwrap(), 42);
        // arguments convert to the parameter type
        assert_eq!(compiled.invoke::<i32>(vec![Value::new(4_u8)]).unwrap(), 8);
        assert!(compiled.call(vec![]).is_err());

        let broken = Expr::lambda(vec![x.clone()], Expr::parameter(&impostor));
        let Expr::Lambda(broken) = &broken else { unreachable!() };
        let err = broken.compile(&registry, &catalog).call(vec![Value::new(1_i32)]).unwrap_err();
        assert!(matches!(err, ExprError::Evaluation { message } if message.contains("unbound")));

        // closures keep their scope
        let y = ParameterExpr::new("y", i32::type_info());
        let adder = Expr::lambda(
            vec![x.clone()],
            Expr::lambda(
                vec![y.clone()],
                Expr::binary(BinaryOp::Add, Expr::parameter(&x), Expr::parameter(&y)),
            ),
        );
        let add_ten = Expr::invoke(adder, vec![Expr::constant(10_i32)]);
        let call = Expr::invoke(Expr::unary(UnaryOp::Quote, add_ten), vec![Expr::constant(5_i32)]);
        assert_eq!(eval_as::<i32>(&call), 15);
    }

    #[test]
    fn construction() {
        let new = Expr::new_object(Money::type_info(), vec![Expr::constant(12_i32)]);
        assert_eq!(eval_as::<Money>(&new), Money(12));

        let init = Expr::member_init(
            NewExpr {
                ty: Account::type_info(),
                arguments: vec![Expr::constant(String::from("ada"))],
            },
            vec![
                MemberBinding::Assignment {
                    member: String::from("balance"),
                    expression: Expr::constant(100_i64),
                },
                MemberBinding::Member {
                    member: String::from("limits"),
                    bindings: vec![MemberBinding::Assignment {
                        member: String::from("daily"),
                        expression: Expr::constant(5_u32),
                    }],
                },
                MemberBinding::List {
                    member: String::from("tags"),
                    initializers: vec![ElementInit {
                        arguments: vec![Expr::constant(String::from("vip"))],
                    }],
                },
            ],
        );
        let account = eval_as::<Account>(&init);
        assert_eq!(account.owner, "ada");
        assert_eq!(account.balance, 100);
        assert_eq!(account.limits, Limits { daily: 5, monthly: 0 });
        assert_eq!(account.tags, ["vip"]);

        let list = Expr::list_init(
            NewExpr {
                ty: Vec::<u8>::type_info(),
                arguments: vec![],
            },
            vec![
                ElementInit { arguments: vec![Expr::constant(1_i32)] },
                ElementInit { arguments: vec![Expr::constant(2_i32)] },
            ],
        );
        assert_eq!(eval_as::<Vec<u8>>(&list), [1, 2]);

        let map = Expr::list_init(
            NewExpr {
                ty: BTreeMap::<String, u8>::type_info(),
                arguments: vec![],
            },
            vec![ElementInit {
                arguments: vec![Expr::constant(String::from("k")), Expr::constant(7_u8)],
            }],
        );
        assert_eq!(eval_as::<BTreeMap<String, u8>>(&map)["k"], 7);

        let array = Expr::new_array(i64::type_info(), vec![Expr::constant(1_u8), Expr::constant(2_u8)]);
        let len = Expr::unary(UnaryOp::ArrayLength, array.clone());
        assert_eq!(eval_as::<usize>(&len), 2);
        let second = Expr::binary(BinaryOp::ArrayIndex, array, Expr::constant(1_i32));
        assert_eq!(eval_as::<i64>(&second), 2);
        let zeros = Expr::new_array_bounds(u8::type_info(), vec![Expr::constant(2_i32), Expr::constant(3_i32)]);
        let len = Expr::unary(UnaryOp::ArrayLength, zeros);
        assert_eq!(eval_as::<usize>(&len), 6);
    }

    #[test]
    fn conversions_and_type_tests() {
        let convert = Expr::convert(Expr::constant(300_i32), i64::type_info());
        assert_eq!(eval_as::<i64>(&convert), 300);
        let narrow = Expr::convert(Expr::constant(300_i32), u8::type_info());
        assert!(eval(&narrow).is_err());

        let is = Expr::type_is(Expr::constant(Money(1)), Money::type_info());
        assert!(eval_as::<bool>(&is));
        let is_not = Expr::type_is(Expr::constant(1_i64), Money::type_info());
        assert!(!eval_as::<bool>(&is_not));
        let as_money = Expr::type_as(Expr::constant(1_i64), Money::type_info());
        assert!(eval(&as_money).unwrap().is_empty());
    }

    #[test]
    fn calls_and_operator_overloads() {
        let mut catalog = MethodCatalog::new();
        let add = catalog.register(MethodInfo::static_method::<Money, Money>(
            "Add",
            vec![Money::type_info(), Money::type_info()],
            |args| Ok(Box::new(Money(arg::<Money>(args, 0)?.0 + arg::<Money>(args, 1)?.0))),
        ));
        let cents = catalog.register(MethodInfo::instance_method::<Money, i64>("cents", vec![], |args| {
            Ok(Box::new(arg::<Money>(args, 0)?.0 * 100))
        }));
        let registry = registry();
        let interpreter = Interpreter::new(&registry, &catalog);

        let sum = Expr::binary(BinaryOp::Add, Expr::constant(Money(2)), Expr::constant(Money(3)));
        let value = interpreter.evaluate(&sum).unwrap();
        assert_eq!(value.downcast_ref::<Money>(), Some(&Money(5)));

        let call = Expr::call(cents, Some(Expr::constant(Money(2))), vec![]).unwrap();
        assert_eq!(interpreter.evaluate(&call).unwrap().downcast_ref::<i64>(), Some(&200));
        assert!(Expr::call(add, None, vec![]).is_err());

        let diff = Expr::binary(BinaryOp::Subtract, Expr::constant(Money(2)), Expr::constant(Money(3)));
        assert!(matches!(interpreter.evaluate(&diff), Err(ExprError::MethodResolution { .. })));
    }
}
