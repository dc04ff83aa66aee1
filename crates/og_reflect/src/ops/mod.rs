//! Shape traits and dynamic values.
//!
//! [`ReflectRef`] is the view a reflected value gives of itself; each
//! variant wraps one of the shape traits below. The `Dynamic*` types are
//! free-standing values of each shape, used by decoders before a concrete
//! type is rebuilt through [`FromReflect`](crate::FromReflect).

// -----------------------------------------------------------------------------
// Modules

mod enum_ops;
mod kind;
mod list_ops;
mod map_ops;
mod optional_ops;
mod scalar_ops;
mod struct_ops;
mod tuple_ops;

// -----------------------------------------------------------------------------
// Exports

pub use enum_ops::{DynamicEnum, Enum};
pub use kind::ReflectRef;
pub use list_ops::{DynamicList, List};
pub use map_ops::{DynamicMap, Map};
pub use optional_ops::{DynamicOptional, Optional};
pub use scalar_ops::{FromScalar, Scalar, ScalarError, ScalarRef, ScalarValue};
pub use struct_ops::{DynamicStruct, Struct};
pub use tuple_ops::{DynamicTuple, Tuple};
