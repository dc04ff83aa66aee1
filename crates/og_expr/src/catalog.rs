//! Invocable methods, looked up by declaring type, name and signature.
//!
//! The catalog plays the part of a method resolver: expression trees only
//! record a declaring type, a method name, generic arguments and parameter
//! types, and decoders pick the matching [`MethodInfo`] here.

use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

use og_reflect::Reflect;
use og_reflect::info::{ScalarKind, TypeInfo, Typed};
use og_utils::TypeIdMap;

use crate::error::{ExprError, Result};

/// The body of a method.
///
/// Instance methods receive their receiver as the first argument.
pub type MethodBody = dyn Fn(&[&dyn Reflect]) -> Result<Box<dyn Reflect>> + Send + Sync;

/// Downcasts argument `index` of a method body.
///
/// ```
/// use og_expr::{MethodInfo, arg};
/// use og_reflect::info::Typed;
///
/// let twice = MethodInfo::static_method::<i32, i32>("twice", vec![i32::type_info()], |args| {
///     Ok(Box::new(arg::<i32>(args, 0)? * 2))
/// });
/// let out = twice.invoke(None, &[&21_i32]).unwrap();
/// assert_eq!(out.downcast_ref::<i32>(), Some(&42));
/// ```
pub fn arg<'a, T: Reflect>(args: &[&'a dyn Reflect], index: usize) -> Result<&'a T> {
    args.get(index)
        .and_then(|value| value.downcast_ref::<T>())
        .ok_or_else(|| {
            ExprError::evaluation(format!(
                "argument {index} is not a `{}`",
                core::any::type_name::<T>()
            ))
        })
}

// -----------------------------------------------------------------------------
// MethodInfo

/// A concrete method: its signature and its body.
#[derive(Clone)]
pub struct MethodInfo {
    declaring: &'static TypeInfo,
    name: Cow<'static, str>,
    parameters: Vec<&'static TypeInfo>,
    generic_args: Vec<&'static TypeInfo>,
    return_type: &'static TypeInfo,
    is_static: bool,
    body: Arc<MethodBody>,
}

impl MethodInfo {
    pub fn new<F>(
        declaring: &'static TypeInfo,
        name: impl Into<Cow<'static, str>>,
        parameters: Vec<&'static TypeInfo>,
        return_type: &'static TypeInfo,
        is_static: bool,
        body: F,
    ) -> Self
    where
        F: Fn(&[&dyn Reflect]) -> Result<Box<dyn Reflect>> + Send + Sync + 'static,
    {
        Self {
            declaring,
            name: name.into(),
            parameters,
            generic_args: Vec::new(),
            return_type,
            is_static,
            body: Arc::new(body),
        }
    }

    /// A static method of `D` returning `R`.
    pub fn static_method<D: Typed, R: Typed>(
        name: impl Into<Cow<'static, str>>,
        parameters: Vec<&'static TypeInfo>,
        body: impl Fn(&[&dyn Reflect]) -> Result<Box<dyn Reflect>> + Send + Sync + 'static,
    ) -> Self {
        Self::new(D::type_info(), name, parameters, R::type_info(), true, body)
    }

    /// An instance method of `D` returning `R`.
    pub fn instance_method<D: Typed, R: Typed>(
        name: impl Into<Cow<'static, str>>,
        parameters: Vec<&'static TypeInfo>,
        body: impl Fn(&[&dyn Reflect]) -> Result<Box<dyn Reflect>> + Send + Sync + 'static,
    ) -> Self {
        Self::new(D::type_info(), name, parameters, R::type_info(), false, body)
    }

    /// Records the generic arguments this method was instantiated with.
    pub fn with_generic_args(mut self, generic_args: Vec<&'static TypeInfo>) -> Self {
        self.generic_args = generic_args;
        self
    }

    #[inline]
    pub fn declaring_type(&self) -> &'static TypeInfo {
        self.declaring
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parameter_types(&self) -> &[&'static TypeInfo] {
        &self.parameters
    }

    #[inline]
    pub fn generic_args(&self) -> &[&'static TypeInfo] {
        &self.generic_args
    }

    #[inline]
    pub fn return_type(&self) -> &'static TypeInfo {
        self.return_type
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Calls the body.
    ///
    /// `receiver` must be given for instance methods only, and `arguments`
    /// must match the parameter count.
    pub fn invoke(
        &self,
        receiver: Option<&dyn Reflect>,
        arguments: &[&dyn Reflect],
    ) -> Result<Box<dyn Reflect>> {
        if self.is_static != receiver.is_none() || arguments.len() != self.parameters.len() {
            return Err(ExprError::evaluation(format!(
                "`{}::{}` called with a wrong receiver or argument count",
                self.declaring.type_path(),
                self.name
            )));
        }
        match receiver {
            Some(receiver) => {
                let mut args = Vec::with_capacity(arguments.len() + 1);
                args.push(receiver);
                args.extend_from_slice(arguments);
                (self.body)(&args)
            }
            None => (self.body)(arguments),
        }
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring.type_path(), self.name)?;
        if !self.generic_args.is_empty() {
            write!(f, "<{}>", type_list(&self.generic_args))?;
        }
        write!(f, "({}) -> {}", type_list(&self.parameters), self.return_type.type_path())
    }
}

/// Comma-separated type paths.
pub(crate) fn type_list(types: &[&'static TypeInfo]) -> String {
    types
        .iter()
        .map(|ty| ty.type_path())
        .collect::<Vec<_>>()
        .join(", ")
}

// -----------------------------------------------------------------------------
// GenericMethod

type Instantiate = dyn Fn(&[&'static TypeInfo]) -> Option<MethodInfo> + Send + Sync;

/// A method with generic parameters, instantiated on lookup.
#[derive(Clone)]
pub struct GenericMethod {
    declaring: &'static TypeInfo,
    name: Cow<'static, str>,
    arity: usize,
    instantiate: Arc<Instantiate>,
}

impl GenericMethod {
    /// Creates a generic method of `arity` type parameters.
    ///
    /// `instantiate` receives exactly `arity` types and returns `None` for
    /// arguments it does not support.
    pub fn new<F>(
        declaring: &'static TypeInfo,
        name: impl Into<Cow<'static, str>>,
        arity: usize,
        instantiate: F,
    ) -> Self
    where
        F: Fn(&[&'static TypeInfo]) -> Option<MethodInfo> + Send + Sync + 'static,
    {
        Self {
            declaring,
            name: name.into(),
            arity,
            instantiate: Arc::new(instantiate),
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Instantiates the method; fails on arity mismatch.
    pub fn instantiate(&self, generic_args: &[&'static TypeInfo]) -> Option<MethodInfo> {
        if generic_args.len() != self.arity {
            return None;
        }
        (self.instantiate)(generic_args).map(|method| method.with_generic_args(generic_args.to_vec()))
    }
}

// -----------------------------------------------------------------------------
// MethodCatalog

#[derive(Clone)]
enum Candidate {
    Concrete(Arc<MethodInfo>),
    Generic(GenericMethod),
}

impl Candidate {
    fn name(&self) -> &str {
        match self {
            Self::Concrete(method) => method.name(),
            Self::Generic(method) => &method.name,
        }
    }
}

/// Methods by declaring type, in registration order.
pub struct MethodCatalog {
    methods: TypeIdMap<Vec<Candidate>>,
}

impl Default for MethodCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodCatalog {
    pub const fn new() -> Self {
        Self {
            methods: TypeIdMap::new(),
        }
    }

    /// Registers a concrete method and returns it as shared.
    pub fn register(&mut self, method: MethodInfo) -> Arc<MethodInfo> {
        let method = Arc::new(method);
        log::debug!("registered method `{method:?}`");
        self.methods
            .get_or_insert(method.declaring.type_id(), Vec::new)
            .push(Candidate::Concrete(Arc::clone(&method)));
        method
    }

    pub fn register_generic(&mut self, method: GenericMethod) {
        log::debug!(
            "registered generic method `{}::{}` of arity {}",
            method.declaring.type_path(),
            method.name,
            method.arity
        );
        self.methods
            .get_or_insert(method.declaring.type_id(), Vec::new)
            .push(Candidate::Generic(method));
    }

    /// Concrete methods named `name`, with generic ones instantiated by
    /// `generic_args`. Candidates of another generic arity are skipped.
    pub fn candidates(
        &self,
        declaring: &TypeInfo,
        name: &str,
        generic_args: &[&'static TypeInfo],
    ) -> Vec<Arc<MethodInfo>> {
        let Some(methods) = self.methods.get(&declaring.type_id()) else {
            return Vec::new();
        };
        methods
            .iter()
            .filter(|candidate| candidate.name() == name)
            .filter_map(|candidate| match candidate {
                Candidate::Concrete(method) if generic_args.is_empty() => Some(Arc::clone(method)),
                Candidate::Concrete(_) => None,
                Candidate::Generic(method) => method.instantiate(generic_args).map(Arc::new),
            })
            .collect()
    }

    /// Picks the method matching a recorded signature.
    ///
    /// The first candidate whose parameters equal `parameters` wins. If
    /// none does, the first one each argument can be assigned to wins; see
    /// [`is_assignable`].
    pub fn resolve(
        &self,
        declaring: &'static TypeInfo,
        name: &str,
        generic_args: &[&'static TypeInfo],
        parameters: &[&'static TypeInfo],
    ) -> Result<Arc<MethodInfo>> {
        let candidates: Vec<_> = self
            .candidates(declaring, name, generic_args)
            .into_iter()
            .filter(|method| method.parameters.len() == parameters.len())
            .collect();

        let exact = candidates.iter().find(|method| {
            method
                .parameters
                .iter()
                .zip(parameters)
                .all(|(param, recorded)| param.type_id() == recorded.type_id())
        });
        let found = exact.or_else(|| {
            candidates.iter().find(|method| {
                method
                    .parameters
                    .iter()
                    .zip(parameters)
                    .all(|(param, recorded)| is_assignable(recorded, param))
            })
        });

        match found {
            Some(method) => {
                log::trace!("resolved `{method:?}`");
                Ok(Arc::clone(method))
            }
            None => Err(ExprError::MethodResolution {
                type_path: declaring.type_path().to_owned(),
                method: name.to_owned(),
                parameters: type_list(parameters),
            }),
        }
    }
}

/// Whether a value of type `from` can be passed where `to` is expected.
///
/// Identical types, [`Value`](og_reflect::Value) targets and lossless
/// numeric widenings are assignable.
pub fn is_assignable(from: &TypeInfo, to: &TypeInfo) -> bool {
    if from.type_id() == to.type_id() || matches!(to, TypeInfo::Any(_)) {
        return true;
    }
    match (from, to) {
        (TypeInfo::Scalar(from), TypeInfo::Scalar(to)) => widens(from.kind(), to.kind()),
        _ => false,
    }
}

const fn widens(from: ScalarKind, to: ScalarKind) -> bool {
    if !from.is_numeric() || !to.is_numeric() {
        return false;
    }
    match to {
        ScalarKind::F32 => from.is_integer() && from.bits() <= 16,
        ScalarKind::F64 => from.is_float() || from.bits() <= 32,
        _ if from.is_float() => false,
        // unsigned into a wider signed integer
        _ if to.is_signed() => to.bits() > from.bits(),
        _ => !from.is_signed() && to.bits() > from.bits(),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use og_reflect::derive::Reflect;
    use og_reflect::info::Typed;
    use og_reflect::{Reflect, Value};

    use super::{GenericMethod, MethodCatalog, MethodInfo, arg, is_assignable};
    use crate::error::ExprError;

    #[derive(Reflect)]
    struct Ops;

    fn scale_catalog() -> MethodCatalog {
        let mut catalog = MethodCatalog::new();
        catalog.register(MethodInfo::static_method::<Ops, i32>(
            "scale",
            vec![i32::type_info()],
            |args| Ok(Box::new(arg::<i32>(args, 0)? * 2)),
        ));
        catalog.register(MethodInfo::static_method::<Ops, f64>(
            "scale",
            vec![f64::type_info()],
            |args| Ok(Box::new(arg::<f64>(args, 0)? * 0.5)),
        ));
        catalog.register(MethodInfo::static_method::<Ops, String>(
            "describe",
            vec![Value::type_info()],
            |_| Ok(Box::new(String::from("value"))),
        ));
        catalog
    }

    #[test]
    fn exact_match_beats_registration_order() {
        let catalog = scale_catalog();
        let ops = Ops::type_info();

        let method = catalog.resolve(ops, "scale", &[], &[f64::type_info()]).unwrap();
        assert!(method.return_type().type_is::<f64>());
        let out = method.invoke(None, &[&3.0_f64]).unwrap();
        assert_eq!(out.downcast_ref::<f64>(), Some(&1.5));

        let method = catalog.resolve(ops, "scale", &[], &[i32::type_info()]).unwrap();
        assert!(method.return_type().type_is::<i32>());
    }

    #[test]
    fn compatible_match_widens() {
        let catalog = scale_catalog();
        let ops = Ops::type_info();

        // i16 widens to i32, the first compatible overload
        let method = catalog.resolve(ops, "scale", &[], &[i16::type_info()]).unwrap();
        assert!(method.parameter_types()[0].type_is::<i32>());
        // u32 only fits f64
        let method = catalog.resolve(ops, "scale", &[], &[u32::type_info()]).unwrap();
        assert!(method.parameter_types()[0].type_is::<f64>());
        // anything fits a `Value` parameter
        assert!(catalog.resolve(ops, "describe", &[], &[String::type_info()]).is_ok());

        let err = catalog.resolve(ops, "scale", &[], &[i64::type_info()]).unwrap_err();
        assert!(matches!(
            err,
            ExprError::MethodResolution { method, parameters, .. }
                if method == "scale" && parameters == "i64"
        ));
        assert!(catalog.resolve(ops, "scale", &[], &[]).is_err());
        assert!(catalog.resolve(i32::type_info(), "scale", &[], &[i32::type_info()]).is_err());
    }

    #[test]
    fn generic_methods_instantiate() {
        let mut catalog = MethodCatalog::new();
        catalog.register_generic(GenericMethod::new(Ops::type_info(), "identity", 1, |types| {
            let ty = types[0];
            Some(MethodInfo::new(
                Ops::type_info(),
                "identity",
                vec![ty],
                ty,
                true,
                |args| Ok(args[0].reflect_clone()),
            ))
        }));
        let ops = Ops::type_info();
        let u8_info = u8::type_info();

        let method = catalog.resolve(ops, "identity", &[u8_info], &[u8_info]).unwrap();
        assert!(method.generic_args()[0].type_is::<u8>());
        assert!(method.return_type().type_is::<u8>());
        let out = method.invoke(None, &[&7_u8]).unwrap();
        assert_eq!(out.downcast_ref::<u8>(), Some(&7));

        // wrong arity, or generic arguments for nothing generic
        assert!(catalog.resolve(ops, "identity", &[], &[u8_info]).is_err());
        assert!(catalog.resolve(ops, "identity", &[u8_info, u8_info], &[u8_info]).is_err());
        catalog.register(MethodInfo::static_method::<Ops, u8>("seven", vec![], |_| {
            Ok(Box::new(7_u8))
        }));
        assert!(catalog.candidates(ops, "seven", &[u8_info]).is_empty());
    }

    #[test]
    fn widening_table() {
        let pairs = [
            (i8::type_info(), i64::type_info(), true),
            (u8::type_info(), i16::type_info(), true),
            (u16::type_info(), u64::type_info(), true),
            (i32::type_info(), f64::type_info(), true),
            (f32::type_info(), f64::type_info(), true),
            (i16::type_info(), f32::type_info(), true),
            (i32::type_info(), f32::type_info(), false),
            (i64::type_info(), f64::type_info(), false),
            (i8::type_info(), u64::type_info(), false),
            (u32::type_info(), i32::type_info(), false),
            (f64::type_info(), i64::type_info(), false),
            (bool::type_info(), i32::type_info(), false),
            (String::type_info(), Value::type_info(), true),
        ];
        for (from, to, expected) in pairs {
            assert_eq!(is_assignable(from, to), expected, "{} -> {}", from.type_path(), to.type_path());
        }
    }

    #[test]
    fn invoke_checks_the_receiver() {
        let len = MethodInfo::instance_method::<String, usize>("len", vec![], |args| {
            Ok(Box::new(arg::<String>(args, 0)?.len()))
        });
        let text = String::from("four");
        let out = len.invoke(Some(&text as &dyn Reflect), &[]).unwrap();
        assert_eq!(out.downcast_ref::<usize>(), Some(&4));
        assert!(len.invoke(None, &[]).is_err());
        assert!(matches!(arg::<u8>(&[&text], 0), Err(ExprError::Evaluation { .. })));
    }
}
