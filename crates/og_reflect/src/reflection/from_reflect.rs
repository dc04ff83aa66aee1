use crate::Reflect;
use crate::info::Typed;

/// A trait that enables types to be dynamically constructed from reflected data.
///
/// Decoders produce reflected values (concrete scalars and `Dynamic*`
/// containers); `FromReflect` turns them into the concrete target type.
///
/// [`from_reflect`] is implemented by the derive macro for every
/// reflected struct, tuple struct and enum.
///
/// [`from_reflect`]: FromReflect::from_reflect
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `FromReflect` so cannot be created through reflection",
    note = "consider annotating `{Self}` with `#[derive(Reflect)]`"
)]
pub trait FromReflect: Reflect + Typed + Sized {
    /// Constructs a concrete instance of `Self` from a reflected value.
    ///
    /// Returns `None` if the shape does not fit.
    fn from_reflect(reflect: &dyn Reflect) -> Option<Self>;

    /// Attempts to downcast the given value to `Self`,
    /// falling back to [`FromReflect::from_reflect`].
    fn take_from_reflect(reflect: Box<dyn Reflect>) -> Result<Self, Box<dyn Reflect>> {
        match reflect.take::<Self>() {
            Ok(value) => Ok(value),
            Err(value) => match Self::from_reflect(value.as_ref()) {
                Some(value) => Ok(value),
                None => Err(value),
            },
        }
    }
}
