//! Encoding of expression trees into JSON documents.
//!
//! Every node is an envelope with a single member named after its kind:
//!
//! ```json
//! {"Add": {"Left": {"Parameter": {"Name": "x", "Type": "i32"}},
//!          "Right": {"Constant": {"Type": "i32", "Value": 1}}}}
//! ```
//!
//! Unary and binary nodes use their operator as kind. Types are written as
//! type paths, constants through the object graph serializer.

use core::any::TypeId;
use core::fmt::Write;
use std::sync::Arc;

use og_json::writer::TokenWriter;
use og_json::{JsonConfig, JsonSerializer};
use og_reflect::info::TypeInfo;
use og_reflect::registry::TypeRegistry;
use og_utils::hash::HashMap;

use crate::catalog::MethodCatalog;
use crate::error::Result;
use crate::expr::{ElementInit, Expr, MemberBinding, NewExpr};
use crate::fold::partial_eval;

// -----------------------------------------------------------------------------
// AstWriter

/// Encodes expression trees.
///
/// Parameter-free sub-expressions are folded into constants first, which
/// materializes captured variables; `registry` and `catalog` serve that
/// evaluation.
///
/// ```
/// use std::sync::Arc;
///
/// use og_expr::{AstWriter, BinaryOp, Expr, MethodCatalog, ParameterExpr};
/// use og_reflect::info::Typed;
/// use og_reflect::registry::TypeRegistry;
///
/// let writer = AstWriter::new(Arc::new(TypeRegistry::new()), Arc::new(MethodCatalog::new()));
/// let x = ParameterExpr::new("x", i32::type_info());
/// let body = Expr::binary(BinaryOp::Add, Expr::parameter(&x), Expr::constant(1_i32));
///
/// let json = writer.write(&Expr::lambda(vec![x], body)).unwrap();
/// assert_eq!(
///     json,
///     r#"{"Lambda":{"Parameters":[{"Parameter":{"Name":"x","Type":"i32"}}],"#.to_owned()
///         + r#""Body":{"Add":{"Left":{"Parameter":{"Name":"x"}},"#
///         + r#""Right":{"Constant":{"Type":"i32","Value":1}}}}}}"#,
/// );
/// ```
pub struct AstWriter {
    serializer: JsonSerializer,
    registry: Arc<TypeRegistry>,
    catalog: Arc<MethodCatalog>,
}

impl AstWriter {
    /// A compact writer whose constants are encoded with default settings.
    pub fn new(registry: Arc<TypeRegistry>, catalog: Arc<MethodCatalog>) -> Self {
        let config = JsonConfig::builder().registry(Arc::clone(&registry)).build();
        Self::with_config(config, registry, catalog)
    }

    /// A writer encoding constants, and laying out the document, per `config`.
    pub fn with_config(
        config: Arc<JsonConfig>,
        registry: Arc<TypeRegistry>,
        catalog: Arc<MethodCatalog>,
    ) -> Self {
        Self {
            serializer: JsonSerializer::new(config),
            registry,
            catalog,
        }
    }

    pub fn write(&self, expr: &Expr) -> Result<String> {
        let folded = partial_eval(expr, &self.registry, &self.catalog)?;
        let writer = TokenWriter::with_indent(String::new(), self.serializer.config().indent_width());
        let mut encoder = Encoder {
            serializer: &self.serializer,
            writer,
            declared: HashMap::default(),
        };
        encoder.node(&folded)?;
        Ok(encoder.writer.finish()?)
    }
}

// -----------------------------------------------------------------------------
// Encoder

struct Encoder<'a, W> {
    serializer: &'a JsonSerializer,
    writer: TokenWriter<W>,
    /// Type of the parameter a name currently refers to, as a reader
    /// will see it. Keyed by name rather than by type alone, so two
    /// parameters sharing a type still decode as distinct nodes.
    declared: HashMap<String, TypeId>,
}

impl<W: Write> Encoder<'_, W> {
    fn node(&mut self, expr: &Expr) -> Result<()> {
        let kind = match expr {
            Expr::Unary(unary) => unary.op.name(),
            Expr::Binary(binary) => binary.op.name(),
            _ => expr.kind_name(),
        };
        self.open(kind)?;
        match expr {
            Expr::Lambda(lambda) => {
                self.writer.write_key("Parameters")?;
                self.writer.write_start_array()?;
                for parameter in &lambda.parameters {
                    self.open("Parameter")?;
                    self.parameter(parameter.name(), parameter.ty())?;
                    self.close()?;
                }
                self.writer.write_end_array()?;
                self.field("Body", &lambda.body)?;
            }
            Expr::Parameter(parameter) => self.parameter(parameter.name(), parameter.ty())?,
            Expr::Constant(constant) => {
                self.type_field("Type", constant.ty)?;
                self.writer.write_key("Value")?;
                match constant.value.get() {
                    Some(value) => self.serializer.write_value(&mut self.writer, value)?,
                    None => self.writer.write_null()?,
                }
            }
            Expr::MemberAccess(member) => {
                self.type_field("Type", member.declaring)?;
                self.writer.write_key("Member")?;
                self.writer.write_string(&member.member)?;
                self.field("Expression", &member.expression)?;
            }
            Expr::Call(call) => {
                self.type_field("Type", call.method.declaring_type())?;
                self.writer.write_key("Method")?;
                self.writer.write_string(call.method.name())?;
                self.writer.write_key("Object")?;
                match &call.object {
                    Some(object) => self.node(object)?,
                    None => self.writer.write_null()?,
                }
                self.list("Arguments", &call.arguments)?;
                self.types("GenericArgTypes", call.method.generic_args())?;
                self.types("ParameterTypes", call.method.parameter_types())?;
            }
            Expr::New(new) => self.new_fields(new)?,
            Expr::NewArrayInit(array) | Expr::NewArrayBounds(array) => {
                self.type_field("Type", array.element)?;
                self.list("Expressions", &array.expressions)?;
            }
            Expr::MemberInit(init) => {
                self.new_node(&init.new)?;
                self.writer.write_key("Bindings")?;
                self.bindings(&init.bindings)?;
            }
            Expr::Conditional(c) => {
                self.type_field("Type", c.ty)?;
                self.field("Test", &c.test)?;
                self.field("True", &c.if_true)?;
                self.field("False", &c.if_false)?;
            }
            Expr::ListInit(init) => {
                self.new_node(&init.new)?;
                self.writer.write_key("Initializers")?;
                self.initializers(&init.initializers)?;
            }
            Expr::TypeIs(type_is) => {
                self.type_field("Type", type_is.ty)?;
                self.field("Expression", &type_is.expression)?;
            }
            Expr::Invoke(invoke) => {
                self.field("Expression", &invoke.expression)?;
                self.list("Arguments", &invoke.arguments)?;
            }
            Expr::Unary(unary) => {
                self.type_field("Type", unary.ty)?;
                self.field("Operand", &unary.operand)?;
            }
            Expr::Binary(binary) => {
                self.field("Left", &binary.left)?;
                self.field("Right", &binary.right)?;
            }
        }
        self.close()
    }

    /// Starts `{"<kind>": {`.
    fn open(&mut self, kind: &str) -> Result<()> {
        self.writer.write_start_object()?;
        self.writer.write_key(kind)?;
        self.writer.write_start_object()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.writer.write_end_object()?;
        self.writer.write_end_object()?;
        Ok(())
    }

    /// `Type` is written whenever the name does not already refer to a
    /// parameter of that type.
    fn parameter(&mut self, name: &str, ty: &'static TypeInfo) -> Result<()> {
        self.writer.write_key("Name")?;
        self.writer.write_string(name)?;
        if self.declared.get(name) != Some(&ty.type_id()) {
            self.type_field("Type", ty)?;
            self.declared.insert(name.to_owned(), ty.type_id());
        }
        Ok(())
    }

    fn field(&mut self, key: &str, expr: &Expr) -> Result<()> {
        self.writer.write_key(key)?;
        self.node(expr)
    }

    fn type_field(&mut self, key: &str, ty: &TypeInfo) -> Result<()> {
        self.writer.write_key(key)?;
        self.writer.write_string(ty.type_path())?;
        Ok(())
    }

    fn list(&mut self, key: &str, exprs: &[Expr]) -> Result<()> {
        self.writer.write_key(key)?;
        self.writer.write_start_array()?;
        for expr in exprs {
            self.node(expr)?;
        }
        self.writer.write_end_array()?;
        Ok(())
    }

    fn types(&mut self, key: &str, types: &[&'static TypeInfo]) -> Result<()> {
        self.writer.write_key(key)?;
        self.writer.write_start_array()?;
        for ty in types {
            self.writer.write_string(ty.type_path())?;
        }
        self.writer.write_end_array()?;
        Ok(())
    }

    fn new_fields(&mut self, new: &NewExpr) -> Result<()> {
        self.type_field("Type", new.ty)?;
        self.list("Arguments", &new.arguments)
    }

    /// The `New` member of initializer nodes, as a full envelope.
    fn new_node(&mut self, new: &NewExpr) -> Result<()> {
        self.writer.write_key("New")?;
        self.open("New")?;
        self.new_fields(new)?;
        self.close()
    }

    fn bindings(&mut self, bindings: &[MemberBinding]) -> Result<()> {
        self.writer.write_start_array()?;
        for binding in bindings {
            self.open(binding.kind_name())?;
            self.writer.write_key("Member")?;
            self.writer.write_string(binding.member())?;
            match binding {
                MemberBinding::Assignment { expression, .. } => self.field("Expression", expression)?,
                MemberBinding::Member { bindings, .. } => {
                    self.writer.write_key("Bindings")?;
                    self.bindings(bindings)?;
                }
                MemberBinding::List { initializers, .. } => {
                    self.writer.write_key("Initializers")?;
                    self.initializers(initializers)?;
                }
            }
            self.close()?;
        }
        self.writer.write_end_array()?;
        Ok(())
    }

    /// Each initializer is `{"Arguments": [..]}`.
    fn initializers(&mut self, initializers: &[ElementInit]) -> Result<()> {
        self.writer.write_start_array()?;
        for init in initializers {
            self.writer.write_start_object()?;
            self.list("Arguments", &init.arguments)?;
            self.writer.write_end_object()?;
        }
        self.writer.write_end_array()?;
        Ok(())
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
    use serde_json::{Value as Json, json};

    use super::AstWriter;
    use crate::catalog::MethodCatalog;
    use crate::closure::Closure;
    use crate::expr::{BinaryOp, ElementInit, Expr, MemberBinding, NewExpr, ParameterExpr};

    #[derive(Reflect, Debug, Default)]
    #[reflect(default)]
    struct Person {
        name: String,
        age: u32,
    }

    fn write(expr: &Expr) -> Json {
        let mut registry = TypeRegistry::new();
        registry.register::<Person>();
        let writer = AstWriter::new(Arc::new(registry), Arc::new(MethodCatalog::new()));
        serde_json::from_str(&writer.write(expr).unwrap()).unwrap()
    }

    #[test]
    fn captured_variables_are_written_as_constants() {
        let scope = Closure::builder().capture("offset", 10_u32).build();
        let x = ParameterExpr::new("x", Person::type_info());
        let age = Expr::member(Expr::parameter(&x), "age").unwrap();
        let body = Expr::binary(BinaryOp::Add, age, scope.variable("offset").unwrap());
        let json = write(&Expr::lambda(vec![x], body));

        let person = Person::type_info().type_path();
        assert_eq!(
            json,
            json!({"Lambda": {
                "Parameters": [{"Parameter": {"Name": "x", "Type": person}}],
                "Body": {"Add": {
                    "Left": {"MemberAccess": {
                        "Type": person,
                        "Member": "age",
                        "Expression": {"Parameter": {"Name": "x"}},
                    }},
                    "Right": {"Constant": {"Type": "u32", "Value": 10}},
                }},
            }})
        );
        assert!(!json.to_string().contains("DynamicStruct"));
    }

    #[test]
    fn parameter_types_follow_the_names_in_scope() {
        let a = ParameterExpr::new("v", i32::type_info());
        let b = ParameterExpr::new("v", String::type_info());
        let inner = Expr::lambda(vec![Arc::clone(&b)], Expr::parameter(&b));
        let body = Expr::binary(BinaryOp::Add, Expr::parameter(&a), Expr::constant(1_i32));
        let json = write(&Expr::lambda(
            vec![Arc::clone(&a)],
            Expr::conditional(Expr::type_is(inner, bool::type_info()), body.clone(), body),
        ));

        let params = json.pointer("/Lambda/Parameters/0/Parameter").unwrap();
        assert_eq!(params["Type"], "i32");
        let test = json.pointer("/Lambda/Body/Conditional/Test/TypeIs/Expression/Lambda").unwrap();
        assert_eq!(test.pointer("/Parameters/0/Parameter/Type").unwrap(), "std::string::String");
        assert!(test.pointer("/Body/Parameter/Type").is_none());
        // `v` refers to the string parameter again, so the next use restates `i32`
        let left = json.pointer("/Lambda/Body/Conditional/True/Add/Left/Parameter").unwrap();
        assert_eq!(left["Type"], "i32");
        let left = json.pointer("/Lambda/Body/Conditional/False/Add/Left/Parameter").unwrap();
        assert!(left.get("Type").is_none());
    }

    #[test]
    fn initializers_and_calls() {
        let x = ParameterExpr::new("x", u32::type_info());
        let new = NewExpr {
            ty: Person::type_info(),
            arguments: Vec::new(),
        };
        let init = Expr::member_init(new, vec![MemberBinding::Assignment {
            member: "age".to_owned(),
            expression: Expr::parameter(&x),
        }]);
        let json = write(&Expr::lambda(vec![x], init));
        let init = json.pointer("/Lambda/Body/MemberInit").unwrap();
        assert_eq!(
            init["New"],
            json!({"New": {"Type": Person::type_info().type_path(), "Arguments": []}})
        );
        assert_eq!(init.pointer("/Bindings/0/Assignment/Member").unwrap(), "age");

        let y = ParameterExpr::new("y", u8::type_info());
        let list = Expr::list_init(
            NewExpr {
                ty: <Vec<u8>>::type_info(),
                arguments: Vec::new(),
            },
            vec![ElementInit {
                arguments: vec![Expr::parameter(&y)],
            }],
        );
        let json = write(&Expr::lambda(vec![y], list));
        let initializers = json.pointer("/Lambda/Body/ListInit/Initializers").unwrap();
        assert_eq!(initializers, &json!([{"Arguments": [{"Parameter": {"Name": "y"}}]}]));
    }
}
