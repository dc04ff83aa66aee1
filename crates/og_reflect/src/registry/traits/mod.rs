// -----------------------------------------------------------------------------
// Modules

mod default;
mod deserialize;
mod from_reflect;
mod serialize;

// -----------------------------------------------------------------------------
// Exports

pub use default::TypeTraitDefault;
pub use deserialize::TypeTraitDeserialize;
pub use from_reflect::TypeTraitFromReflect;
pub use serialize::TypeTraitSerialize;
