use crate::impls::NonGenericTypeInfoCell;
use crate::info::{AnyInfo, ReflectKind, TypeInfo, TypePath, Typed};
use crate::ops::ReflectRef;
use crate::{FromReflect, Reflect};

// -----------------------------------------------------------------------------
// Tuple

/// A trait used to power tuple-like operations via reflection.
///
/// Implemented by tuples and by tuple structs.
pub trait Tuple: Reflect {
    /// Returns a reference to the value of the field with index `index`.
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    /// Returns the number of fields in the tuple.
    fn field_len(&self) -> usize;

    /// Creates a new [`DynamicTuple`] from this tuple.
    fn to_dynamic_tuple(&self) -> DynamicTuple {
        let mut dynamic = DynamicTuple::default();
        dynamic.set_represented_type(self.represented_type_info());
        for index in 0..self.field_len() {
            if let Some(value) = self.field(index) {
                dynamic.push_boxed(value.to_dynamic());
            }
        }
        dynamic
    }
}

impl dyn Tuple {
    /// Returns an iterator over the fields, in order.
    pub fn iter_fields(&self) -> impl Iterator<Item = &dyn Reflect> {
        (0..self.field_len()).filter_map(move |index| self.field(index))
    }
}

// -----------------------------------------------------------------------------
// DynamicTuple

/// A tuple whose fields are defined at runtime.
#[derive(Default)]
pub struct DynamicTuple {
    info: Option<&'static TypeInfo>,
    fields: Vec<Box<dyn Reflect>>,
}

impl DynamicTuple {
    /// Sets the type to be represented by this `DynamicTuple`.
    ///
    /// # Panics
    ///
    /// Panics if the given info is not a tuple.
    pub fn set_represented_type(&mut self, info: Option<&'static TypeInfo>) {
        if let Some(info) = info {
            assert!(
                info.kind() == ReflectKind::Tuple,
                "`DynamicTuple` cannot represent `{}` of kind {}",
                info.type_path(),
                info.kind(),
            );
        }
        self.info = info;
    }

    #[inline]
    pub fn push_boxed(&mut self, value: Box<dyn Reflect>) {
        self.fields.push(value);
    }

    #[inline]
    pub fn push<T: Reflect>(&mut self, value: T) {
        self.fields.push(Box::new(value));
    }
}

impl Tuple for DynamicTuple {
    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        self.fields.get(index).map(|value| &**value)
    }

    #[inline]
    fn field_len(&self) -> usize {
        self.fields.len()
    }
}

impl Reflect for DynamicTuple {
    crate::reflection::impl_reflect_cast_fn!(Tuple);

    #[inline]
    fn is_dynamic(&self) -> bool {
        true
    }

    #[inline]
    fn represented_type_info(&self) -> Option<&'static TypeInfo> {
        self.info
    }

    #[inline]
    fn reflect_clone(&self) -> Box<dyn Reflect> {
        Box::new(self.to_dynamic_tuple())
    }
}

impl FromReflect for DynamicTuple {
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self> {
        match reflect.reflect_ref() {
            ReflectRef::Tuple(value) => Some(value.to_dynamic_tuple()),
            _ => None,
        }
    }
}

impl TypePath for DynamicTuple {
    #[inline]
    fn type_path() -> &'static str {
        "og_reflect::ops::DynamicTuple"
    }

    #[inline]
    fn type_name() -> &'static str {
        "DynamicTuple"
    }
}

impl Typed for DynamicTuple {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Any(AnyInfo::new::<Self>()))
    }
}

impl core::fmt::Debug for DynamicTuple {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.reflect_debug(f)
    }
}
