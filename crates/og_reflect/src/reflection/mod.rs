// -----------------------------------------------------------------------------
// Modules

mod from_reflect;
mod reflect;

// -----------------------------------------------------------------------------
// Exports

pub use from_reflect::FromReflect;
pub use reflect::Reflect;

pub(crate) use reflect::impl_reflect_cast_fn;
