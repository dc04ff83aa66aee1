//! Decoding of expression trees from JSON documents.
//!
//! The inverse of [`write`](crate::write). Parameters are reunified by name:
//! a reference carrying a `Type` declares (or re-selects) the parameter of
//! that type, a reference without one reuses the node the name currently
//! refers to. Every reference to a parameter therefore decodes to the very
//! node its lambda declares.

use std::sync::Arc;

use og_json::reader::{CharSource, StrSource, TokenReader};
use og_json::{JsonConfig, JsonDeserializer};
use og_reflect::info::TypeInfo;
use og_reflect::registry::{TypeCatalog, TypeRegistry};
use og_reflect::Value;
use og_utils::hash::HashMap;

use crate::catalog::MethodCatalog;
use crate::error::{ExprError, Result};
use crate::eval::into_value;
use crate::expr::{
    BinaryOp, ConditionalExpr, ElementInit, Expr, MemberBinding, MemberExpr, NewExpr,
    ParameterExpr, UnaryOp, member_type,
};

// -----------------------------------------------------------------------------
// AstReader

/// Decodes expression trees.
///
/// Type names resolve through `registry`, by type path or unambiguous short
/// name, and calls through `catalog`.
pub struct AstReader {
    deserializer: JsonDeserializer,
    registry: Arc<TypeRegistry>,
    catalog: Arc<MethodCatalog>,
}

impl AstReader {
    pub fn new(registry: Arc<TypeRegistry>, catalog: Arc<MethodCatalog>) -> Self {
        let config = JsonConfig::builder().registry(Arc::clone(&registry)).build();
        Self::with_config(config, registry, catalog)
    }

    /// A reader decoding constants per `config`.
    pub fn with_config(
        config: Arc<JsonConfig>,
        registry: Arc<TypeRegistry>,
        catalog: Arc<MethodCatalog>,
    ) -> Self {
        Self {
            deserializer: JsonDeserializer::new(config),
            registry,
            catalog,
        }
    }

    pub fn read(&self, text: &str) -> Result<Expr> {
        let mut reader = TokenReader::from_text(text);
        let mut decoder = Decoder {
            ast: self,
            parameters: HashMap::default(),
        };
        let expr = decoder.node(&mut reader)?;
        reader.finish()?;
        Ok(expr)
    }
}

// -----------------------------------------------------------------------------
// Structure loops

/// Visits the members of an object; `null` has none.
fn read_members<S: CharSource>(
    reader: &mut TokenReader<S>,
    mut visit: impl FnMut(&mut TokenReader<S>, String) -> Result<()>,
) -> Result<()> {
    read_structure(reader, '{', '}', |reader| {
        let key = reader.read_key()?;
        visit(reader, key)
    })
}

/// Visits the items of an array; `null` has none.
fn read_items<S: CharSource>(
    reader: &mut TokenReader<S>,
    visit: impl FnMut(&mut TokenReader<S>) -> Result<()>,
) -> Result<()> {
    read_structure(reader, '[', ']', visit)
}

fn read_structure<S: CharSource>(
    reader: &mut TokenReader<S>,
    start: char,
    end: char,
    mut visit: impl FnMut(&mut TokenReader<S>) -> Result<()>,
) -> Result<()> {
    if reader.is_null()? {
        return Ok(());
    }
    reader.assert_and_consume(start)?;
    if reader.peek_token()? == Some(end) {
        reader.assert_and_consume(end)?;
        return Ok(());
    }
    loop {
        visit(reader)?;
        match reader.peek_token()? {
            Some(',') => reader.assert_and_consume(',')?,
            Some(c) if c == end => {
                reader.assert_and_consume(end)?;
                return Ok(());
            }
            _ => return Err(reader.error(format!("expected `,` or `{end}`")).into()),
        }
    }
}

fn skip<S: CharSource>(reader: &mut TokenReader<S>, kind: &str, key: &str) -> Result<()> {
    log::debug!("skipped unknown member `{key}` of a `{kind}` node");
    reader.skip_value()?;
    Ok(())
}

fn required<T>(value: Option<T>, kind: &str, field: &str) -> Result<T> {
    value.ok_or_else(|| ExprError::malformed(format!("`{kind}` node without `{field}`")))
}

// -----------------------------------------------------------------------------
// Decoder

struct Decoder<'a> {
    ast: &'a AstReader,
    /// Parameters seen under each name; the last one is current.
    parameters: HashMap<String, Vec<Arc<ParameterExpr>>>,
}

impl Decoder<'_> {
    /// Reads one `{"<kind>": {..}}` envelope.
    fn node<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut node = None;
        read_members(reader, |reader, kind| {
            if node.is_some() {
                return Err(ExprError::malformed(format!("second kind `{kind}` in one node")));
            }
            node = Some(self.payload(reader, &kind)?);
            Ok(())
        })?;
        node.ok_or_else(|| ExprError::malformed("node without a kind"))
    }

    fn payload<S: CharSource>(&mut self, reader: &mut TokenReader<S>, kind: &str) -> Result<Expr> {
        match kind {
            "Lambda" => self.lambda(reader),
            "Parameter" => self.parameter(reader).map(Expr::Parameter),
            "Constant" => self.constant(reader),
            "MemberAccess" => self.member_access(reader),
            "Call" => self.call(reader),
            "New" => self.new_expr(reader).map(Expr::New),
            "NewArrayInit" => self.new_array(reader),
            "MemberInit" => self.member_init(reader),
            "Conditional" => self.conditional(reader),
            "ListInit" => self.list_init(reader),
            "TypeIs" => self.type_is(reader),
            "Invoke" => self.invoke(reader),
            "NewArrayBounds" => Err(ExprError::UnsupportedNode {
                kind: kind.to_owned(),
            }),
            _ => {
                if let Some(op) = UnaryOp::from_name(kind) {
                    self.unary(reader, op)
                } else if let Some(op) = BinaryOp::from_name(kind) {
                    self.binary(reader, op)
                } else {
                    Err(ExprError::malformed(format!("unknown node kind `{kind}`")))
                }
            }
        }
    }

    fn resolve(&self, name: String) -> Result<&'static TypeInfo> {
        match self.ast.registry.resolve(&name) {
            Some(info) => {
                log::trace!("resolved `{name}` to `{}`", info.type_path());
                Ok(info)
            }
            None => Err(ExprError::TypeResolution { name }),
        }
    }

    fn read_type<S: CharSource>(&self, reader: &mut TokenReader<S>) -> Result<&'static TypeInfo> {
        let name = reader.read_string()?;
        self.resolve(name)
    }

    fn types<S: CharSource>(&self, reader: &mut TokenReader<S>) -> Result<Vec<&'static TypeInfo>> {
        let mut types = Vec::new();
        read_items(reader, |reader| {
            types.push(self.read_type(reader)?);
            Ok(())
        })?;
        Ok(types)
    }

    fn nodes<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Vec<Expr>> {
        let mut nodes = Vec::new();
        read_items(reader, |reader| {
            nodes.push(self.node(reader)?);
            Ok(())
        })?;
        Ok(nodes)
    }

    /// Decodes a member captured before the members it depends on.
    fn deferred<T>(
        &mut self,
        raw: &str,
        decode: impl FnOnce(&mut Self, &mut TokenReader<StrSource<'_>>) -> Result<T>,
    ) -> Result<T> {
        let mut reader = TokenReader::from_text(raw);
        let value = decode(self, &mut reader)?;
        reader.finish()?;
        Ok(value)
    }

    // -------------------------------------------------------------------------
    // Parameters and lambdas

    fn parameter<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Arc<ParameterExpr>> {
        let mut name = None;
        let mut ty = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Name" => name = Some(reader.read_string()?),
                "Type" => ty = Some(self.read_type(reader)?),
                _ => skip(reader, "Parameter", &key)?,
            }
            Ok(())
        })?;
        let name = required(name, "Parameter", "Name")?;

        let history = self.parameters.entry(name.clone()).or_default();
        match ty {
            Some(ty) => {
                let parameter = match history.iter().rposition(|p| p.ty().type_id() == ty.type_id()) {
                    Some(index) => history.remove(index),
                    None => ParameterExpr::new(name, ty),
                };
                history.push(Arc::clone(&parameter));
                Ok(parameter)
            }
            None => history.last().cloned().ok_or_else(|| {
                ExprError::malformed(format!("parameter `{name}` referenced before its declaration"))
            }),
        }
    }

    fn lambda<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut parameters = None;
        let mut body = None;
        let mut deferred = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Parameters" => {
                    let mut declared = Vec::new();
                    read_items(reader, |reader| match self.node(reader)? {
                        Expr::Parameter(parameter) => {
                            declared.push(parameter);
                            Ok(())
                        }
                        other => Err(ExprError::malformed(format!(
                            "lambda parameter given as a `{}` node",
                            other.kind_name()
                        ))),
                    })?;
                    parameters = Some(declared);
                }
                "Body" if parameters.is_some() => body = Some(self.node(reader)?),
                "Body" => deferred = Some(reader.read_raw()?),
                _ => skip(reader, "Lambda", &key)?,
            }
            Ok(())
        })?;
        let parameters = required(parameters, "Lambda", "Parameters")?;
        let body = match (body, deferred) {
            (Some(body), _) => body,
            (None, Some(raw)) => self.deferred(&raw, |this, reader| this.node(reader))?,
            (None, None) => return Err(ExprError::malformed("`Lambda` node without `Body`")),
        };
        Ok(Expr::lambda(parameters, body))
    }

    // -------------------------------------------------------------------------
    // Values and members

    fn value<S: CharSource>(&self, reader: &mut TokenReader<S>, ty: &'static TypeInfo) -> Result<Value> {
        if reader.is_null()? {
            return Ok(Value::empty());
        }
        let value = self.ast.deserializer.read_value(reader, ty)?;
        Ok(into_value(value))
    }

    fn constant<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut ty = None;
        let mut value = None;
        let mut deferred = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Type" => ty = Some(self.read_type(reader)?),
                "Value" => match ty {
                    Some(ty) => value = Some(self.value(reader, ty)?),
                    None => deferred = Some(reader.read_raw()?),
                },
                _ => skip(reader, "Constant", &key)?,
            }
            Ok(())
        })?;
        let ty = required(ty, "Constant", "Type")?;
        let value = match (value, deferred) {
            (Some(value), _) => value,
            (None, Some(raw)) => self.deferred(&raw, |this, reader| this.value(reader, ty))?,
            (None, None) => return Err(ExprError::malformed("`Constant` node without `Value`")),
        };
        Ok(Expr::constant_of(ty, value))
    }

    fn member_access<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut declaring = None;
        let mut member = None;
        let mut expression = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Type" => declaring = Some(self.read_type(reader)?),
                "Member" => member = Some(reader.read_string()?),
                "Expression" => expression = Some(self.node(reader)?),
                _ => skip(reader, "MemberAccess", &key)?,
            }
            Ok(())
        })?;
        let declaring = required(declaring, "MemberAccess", "Type")?;
        let member = required(member, "MemberAccess", "Member")?;
        let expression = required(expression, "MemberAccess", "Expression")?;
        Ok(Expr::MemberAccess(MemberExpr {
            declaring,
            ty: member_type(declaring, &member)?,
            member,
            expression: Box::new(expression),
        }))
    }

    fn call<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut declaring = None;
        let mut method = None;
        let mut object = None;
        let mut arguments = Vec::new();
        let mut generic_args = Vec::new();
        let mut parameters = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Type" => declaring = Some(self.read_type(reader)?),
                "Method" => method = Some(reader.read_string()?),
                "Object" if reader.is_null()? => object = None,
                "Object" => object = Some(self.node(reader)?),
                "Arguments" => arguments = self.nodes(reader)?,
                "GenericArgTypes" => generic_args = self.types(reader)?,
                "ParameterTypes" => parameters = Some(self.types(reader)?),
                _ => skip(reader, "Call", &key)?,
            }
            Ok(())
        })?;
        let declaring = required(declaring, "Call", "Type")?;
        let name = required(method, "Call", "Method")?;
        let parameters = parameters.unwrap_or_else(|| arguments.iter().map(Expr::ty).collect());

        let method = self
            .ast
            .catalog
            .resolve(declaring, &name, &generic_args, &parameters)?;
        log::debug!("decoded call of `{method:?}`");
        Expr::call(method, object, arguments)
    }

    // -------------------------------------------------------------------------
    // Construction

    fn new_expr<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<NewExpr> {
        let mut ty = None;
        let mut arguments = Vec::new();
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Type" => ty = Some(self.read_type(reader)?),
                "Arguments" => arguments = self.nodes(reader)?,
                _ => skip(reader, "New", &key)?,
            }
            Ok(())
        })?;
        Ok(NewExpr {
            ty: required(ty, "New", "Type")?,
            arguments,
        })
    }

    /// The `New` member of an initializer node.
    fn new_member<S: CharSource>(&mut self, reader: &mut TokenReader<S>, kind: &str) -> Result<NewExpr> {
        match self.node(reader)? {
            Expr::New(new) => Ok(new),
            other => Err(ExprError::malformed(format!(
                "`New` of a `{kind}` node is a `{}` node",
                other.kind_name()
            ))),
        }
    }

    fn new_array<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut element = None;
        let mut items = Vec::new();
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Type" => element = Some(self.read_type(reader)?),
                "Expressions" => items = self.nodes(reader)?,
                _ => skip(reader, "NewArrayInit", &key)?,
            }
            Ok(())
        })?;
        Ok(Expr::new_array(required(element, "NewArrayInit", "Type")?, items))
    }

    fn member_init<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut new = None;
        let mut bindings = Vec::new();
        read_members(reader, |reader, key| {
            match key.as_str() {
                "New" => new = Some(self.new_member(reader, "MemberInit")?),
                "Bindings" => {
                    read_items(reader, |reader| {
                        bindings.push(self.binding(reader)?);
                        Ok(())
                    })?;
                }
                _ => skip(reader, "MemberInit", &key)?,
            }
            Ok(())
        })?;
        Ok(Expr::member_init(required(new, "MemberInit", "New")?, bindings))
    }

    /// Reads one binding envelope; only assignments are decoded.
    fn binding<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<MemberBinding> {
        let mut binding = None;
        read_members(reader, |reader, kind| {
            if binding.is_some() {
                return Err(ExprError::malformed(format!("second kind `{kind}` in one binding")));
            }
            match kind.as_str() {
                "Assignment" => {}
                "MemberBinding" | "ListBinding" => return Err(ExprError::UnsupportedNode { kind }),
                _ => return Err(ExprError::malformed(format!("unknown binding kind `{kind}`"))),
            }
            let mut member = None;
            let mut expression = None;
            read_members(reader, |reader, key| {
                match key.as_str() {
                    "Member" => member = Some(reader.read_string()?),
                    "Expression" => expression = Some(self.node(reader)?),
                    _ => skip(reader, "Assignment", &key)?,
                }
                Ok(())
            })?;
            binding = Some(MemberBinding::Assignment {
                member: required(member, "Assignment", "Member")?,
                expression: required(expression, "Assignment", "Expression")?,
            });
            Ok(())
        })?;
        binding.ok_or_else(|| ExprError::malformed("binding without a kind"))
    }

    fn list_init<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut new = None;
        let mut initializers = Vec::new();
        read_members(reader, |reader, key| {
            match key.as_str() {
                "New" => new = Some(self.new_member(reader, "ListInit")?),
                "Initializers" => {
                    read_items(reader, |reader| {
                        let mut arguments = Vec::new();
                        read_members(reader, |reader, key| {
                            match key.as_str() {
                                "Arguments" => arguments = self.nodes(reader)?,
                                _ => skip(reader, "Initializers", &key)?,
                            }
                            Ok(())
                        })?;
                        initializers.push(ElementInit { arguments });
                        Ok(())
                    })?;
                }
                _ => skip(reader, "ListInit", &key)?,
            }
            Ok(())
        })?;
        Ok(Expr::list_init(required(new, "ListInit", "New")?, initializers))
    }

    // -------------------------------------------------------------------------
    // Control flow and operators

    fn conditional<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut ty = None;
        let mut test = None;
        let mut if_true = None;
        let mut if_false = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Type" => ty = Some(self.read_type(reader)?),
                "Test" => test = Some(self.node(reader)?),
                "True" => if_true = Some(self.node(reader)?),
                "False" => if_false = Some(self.node(reader)?),
                _ => skip(reader, "Conditional", &key)?,
            }
            Ok(())
        })?;
        let if_true = required(if_true, "Conditional", "True")?;
        Ok(Expr::Conditional(ConditionalExpr {
            ty: ty.unwrap_or_else(|| if_true.ty()),
            test: Box::new(required(test, "Conditional", "Test")?),
            if_true: Box::new(if_true),
            if_false: Box::new(required(if_false, "Conditional", "False")?),
        }))
    }

    fn type_is<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut ty = None;
        let mut expression = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Type" => ty = Some(self.read_type(reader)?),
                "Expression" => expression = Some(self.node(reader)?),
                _ => skip(reader, "TypeIs", &key)?,
            }
            Ok(())
        })?;
        Ok(Expr::type_is(
            required(expression, "TypeIs", "Expression")?,
            required(ty, "TypeIs", "Type")?,
        ))
    }

    fn invoke<S: CharSource>(&mut self, reader: &mut TokenReader<S>) -> Result<Expr> {
        let mut expression = None;
        let mut arguments = Vec::new();
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Expression" => expression = Some(self.node(reader)?),
                "Arguments" => arguments = self.nodes(reader)?,
                _ => skip(reader, "Invoke", &key)?,
            }
            Ok(())
        })?;
        Ok(Expr::invoke(required(expression, "Invoke", "Expression")?, arguments))
    }

    /// Only conversions take their type from the document; the other
    /// operators derive it from the operand.
    fn unary<S: CharSource>(&mut self, reader: &mut TokenReader<S>, op: UnaryOp) -> Result<Expr> {
        let kind = op.name();
        let names_type = matches!(op, UnaryOp::Convert | UnaryOp::TypeAs);
        let mut ty = None;
        let mut operand = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Type" if names_type => ty = Some(self.read_type(reader)?),
                "Operand" => operand = Some(self.node(reader)?),
                _ => reader.skip_value()?,
            }
            Ok(())
        })?;
        let operand = required(operand, kind, "Operand")?;
        Ok(match op {
            UnaryOp::Convert => Expr::convert(operand, required(ty, kind, "Type")?),
            UnaryOp::TypeAs => Expr::type_as(operand, required(ty, kind, "Type")?),
            _ => Expr::unary(op, operand),
        })
    }

    fn binary<S: CharSource>(&mut self, reader: &mut TokenReader<S>, op: BinaryOp) -> Result<Expr> {
        let kind = op.name();
        let mut left = None;
        let mut right = None;
        read_members(reader, |reader, key| {
            match key.as_str() {
                "Left" => left = Some(self.node(reader)?),
                "Right" => right = Some(self.node(reader)?),
                _ => skip(reader, kind, &key)?,
            }
            Ok(())
        })?;
        Ok(Expr::binary(
            op,
            required(left, kind, "Left")?,
            required(right, kind, "Right")?,
        ))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use og_reflect::derive::Reflect;
    use og_reflect::info::Typed;
    use og_reflect::registry::TypeRegistry;
    use og_reflect::Value;

    use super::AstReader;
    use crate::catalog::{MethodCatalog, MethodInfo, arg};
    use crate::closure::Closure;
    use crate::error::ExprError;
    use crate::expr::{BinaryOp, Expr, ParameterExpr};
    use crate::write::AstWriter;

    #[derive(Reflect, Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        age: u32,
    }

    #[derive(Reflect, Debug)]
    struct Text;

    fn setup() -> (Arc<TypeRegistry>, Arc<MethodCatalog>, Arc<MethodInfo>) {
        let mut registry = TypeRegistry::new();
        registry.register::<Person>();
        registry.register::<Text>();

        let mut catalog = MethodCatalog::new();
        let string = String::type_info();
        catalog.register(MethodInfo::static_method::<Text, String>(
            "join",
            vec![string, i64::type_info()],
            |args| Ok(Box::new(format!("{}:{}", arg::<String>(args, 0)?, arg::<i64>(args, 1)?))),
        ));
        let repeat = catalog.register(MethodInfo::static_method::<Text, String>(
            "join",
            vec![string, i32::type_info()],
            |args| {
                let count = usize::try_from(*arg::<i32>(args, 1)?).unwrap_or(0);
                Ok(Box::new(arg::<String>(args, 0)?.repeat(count)))
            },
        ));
        (Arc::new(registry), Arc::new(catalog), repeat)
    }

    fn round_trip(expr: &Expr) -> crate::error::Result<Expr> {
        let (registry, catalog, _) = setup();
        let json = AstWriter::new(Arc::clone(&registry), Arc::clone(&catalog)).write(expr)?;
        AstReader::new(registry, catalog).read(&json)
    }

    fn read(json: &str) -> crate::error::Result<Expr> {
        let (registry, catalog, _) = setup();
        AstReader::new(registry, catalog).read(json)
    }

    fn call(lambda: &Expr, arguments: Vec<Value>) -> Value {
        let (registry, catalog, _) = setup();
        let Expr::Lambda(lambda) = lambda else {
            panic!("expected a lambda, got {lambda}");
        };
        lambda.compile(&registry, &catalog).call(arguments).unwrap()
    }

    #[test]
    fn decoded_parameters_are_the_declared_nodes() {
        let scope = Closure::builder().capture("offset", 10_u32).build();
        let x = ParameterExpr::new("x", Person::type_info());
        let age = Expr::member(Expr::parameter(&x), "age").unwrap();
        let body = Expr::binary(BinaryOp::Add, age, scope.variable("offset").unwrap());
        let original = Expr::lambda(vec![x], body);

        let decoded = round_trip(&original).unwrap();
        assert_eq!(decoded.to_string(), "(x) => (x.age + <10>)");

        let Expr::Lambda(lambda) = &decoded else {
            panic!("expected a lambda");
        };
        let Expr::Binary(add) = &lambda.body else {
            panic!("expected a binary body");
        };
        assert_eq!(add.op, BinaryOp::Add);
        let Expr::MemberAccess(age) = add.left.as_ref() else {
            panic!("expected a member access");
        };
        assert!(age.declaring.type_is::<Person>());
        assert!(age.ty.type_is::<u32>());
        let Expr::Parameter(reference) = age.expression.as_ref() else {
            panic!("expected a parameter reference");
        };
        assert!(Arc::ptr_eq(reference, &lambda.parameters[0]));

        let ada = Person {
            name: "ada".to_owned(),
            age: 30,
        };
        let expected = call(&original, vec![Value::new(ada.clone())]);
        let actual = call(&decoded, vec![Value::new(ada)]);
        assert_eq!(expected.downcast_ref::<u32>(), Some(&40));
        assert_eq!(actual.downcast_ref::<u32>(), Some(&40));
    }

    #[test]
    fn shadowed_names_reselect_their_parameter() {
        let outer = ParameterExpr::new("v", i32::type_info());
        let inner = ParameterExpr::new("v", String::type_info());
        let quoted = Expr::lambda(vec![Arc::clone(&inner)], Expr::parameter(&inner));
        let sum = Expr::binary(BinaryOp::Add, Expr::parameter(&outer), Expr::constant(1_i32));
        let original = Expr::lambda(
            vec![Arc::clone(&outer)],
            Expr::conditional(Expr::type_is(quoted, bool::type_info()), sum.clone(), sum),
        );

        let decoded = round_trip(&original).unwrap();
        let Expr::Lambda(lambda) = &decoded else {
            panic!("expected a lambda");
        };
        let Expr::Conditional(c) = &lambda.body else {
            panic!("expected a conditional");
        };
        for branch in [&c.if_true, &c.if_false] {
            let Expr::Binary(sum) = branch.as_ref() else {
                panic!("expected a binary branch");
            };
            let Expr::Parameter(v) = sum.left.as_ref() else {
                panic!("expected a parameter reference");
            };
            assert!(Arc::ptr_eq(v, &lambda.parameters[0]));
        }
        let result = call(&decoded, vec![Value::new(4_i32)]);
        assert_eq!(result.downcast_ref::<i32>(), Some(&5));
    }

    #[test]
    fn overloads_resolve_by_recorded_parameter_types() {
        let (_, _, repeat) = setup();
        let s = ParameterExpr::new("s", String::type_info());
        let join = Expr::call(repeat, None, vec![Expr::parameter(&s), Expr::constant(3_i32)]).unwrap();
        let decoded = round_trip(&Expr::lambda(vec![s], join)).unwrap();

        let Expr::Lambda(lambda) = &decoded else {
            panic!("expected a lambda");
        };
        let Expr::Call(join) = &lambda.body else {
            panic!("expected a call");
        };
        assert!(join.method.parameter_types()[1].type_is::<i32>());
        let result = call(&decoded, vec![Value::new(String::from("ab"))]);
        assert_eq!(result.downcast_ref::<String>().map(String::as_str), Some("ababab"));
    }

    #[test]
    fn members_arrive_in_any_order() {
        let decoded = read(
            r#"{"Lambda": {
                "Body": {"Multiply": {
                    "Right": {"Parameter": {"Name": "n"}},
                    "Left": {"Constant": {"Value": 3, "Comment": "ignored", "Type": "i64"}}
                }},
                "Parameters": [{"Parameter": {"Type": "i64", "Name": "n"}}]
            }}"#,
        )
        .unwrap();
        assert_eq!(decoded.to_string(), "(n) => (<3> * n)");
        let result = call(&decoded, vec![Value::new(5_i64)]);
        assert_eq!(result.downcast_ref::<i64>(), Some(&15));
    }

    #[test]
    fn decoding_errors() {
        let unknown = read(r#"{"Constant": {"Type": "Nope", "Value": 1}}"#);
        assert!(matches!(unknown, Err(ExprError::TypeResolution { name }) if name == "Nope"));

        let bounds = read(r#"{"NewArrayBounds": {"Type": "u8", "Expressions": []}}"#);
        assert!(matches!(bounds, Err(ExprError::UnsupportedNode { kind }) if kind == "NewArrayBounds"));

        let nested = read(
            r#"{"MemberInit": {
                "New": {"New": {"Type": "Person", "Arguments": []}},
                "Bindings": [{"ListBinding": {"Member": "name", "Initializers": []}}]
            }}"#,
        );
        assert!(matches!(nested, Err(ExprError::UnsupportedNode { kind }) if kind == "ListBinding"));

        assert!(matches!(read(r#"{"Bogus": {}}"#), Err(ExprError::Malformed { .. })));
        assert!(matches!(read("{}"), Err(ExprError::Malformed { .. })));
        assert!(matches!(
            read(r#"{"Parameter": {"Name": "x"}}"#),
            Err(ExprError::Malformed { .. })
        ));
        assert!(matches!(
            read(r#"{"Constant": {"Type": "u8", "Value": 1}, "Parameter": {"Name": "x"}}"#),
            Err(ExprError::Malformed { .. })
        ));

        let member = read(
            r#"{"MemberAccess": {
                "Type": "Person",
                "Member": "height",
                "Expression": {"Constant": {"Type": "u8", "Value": 1}}
            }}"#,
        );
        assert!(matches!(member, Err(ExprError::MemberResolution { member, .. }) if member == "height"));

        let missing = read(
            r#"{"Call": {
                "Type": "Text",
                "Method": "join",
                "Object": null,
                "Arguments": [],
                "GenericArgTypes": [],
                "ParameterTypes": ["std::string::String", "bool"]
            }}"#,
        );
        assert!(matches!(missing, Err(ExprError::MethodResolution { method, .. }) if method == "join"));
    }

    #[test]
    fn construction_round_trips() {
        let (registry, catalog, _) = setup();
        let json = r#"{"Lambda": {
            "Parameters": [{"Parameter": {"Name": "n", "Type": "u32"}}],
            "Body": {"MemberInit": {
                "New": {"New": {"Type": "Person", "Arguments": []}},
                "Bindings": [
                    {"Assignment": {"Member": "name", "Expression": {"Constant": {"Type": "std::string::String", "Value": "ada"}}}},
                    {"Assignment": {"Member": "age", "Expression": {"Parameter": {"Name": "n"}}}}
                ]
            }}
        }}"#;
        let decoded = AstReader::new(Arc::clone(&registry), Arc::clone(&catalog)).read(json).unwrap();
        let Expr::Lambda(lambda) = &decoded else {
            panic!("expected a lambda");
        };
        let person: Person = lambda.compile(&registry, &catalog).invoke(vec![Value::new(36_u32)]).unwrap();
        assert_eq!(
            person,
            Person {
                name: "ada".to_owned(),
                age: 36
            }
        );
    }
}
