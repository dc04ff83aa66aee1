//! Reflection implementations for foreign types, plus the utilities used
//! to write them.
//!
//! - [`concat`]: string concatenation for `TypePath` implementations.
//! - [`NonGenericTypeInfoCell`]: used to implement [`Typed`] for non-generic types.
//! - [`GenericTypePathCell`]: used to implement [`TypePath`] for generic types.
//! - [`GenericTypeInfoCell`]: used to implement [`Typed`] for generic types.
//! - [`reflect_partial_eq`] and [`reflect_debug`]: the defaults of
//!   [`Reflect::reflect_partial_eq`] and [`Reflect::reflect_debug`].
//!
//! ## Implemented Menu
//!
//! - scalars: `bool`, `char`, `i8`-`i64`, `isize`, `u8`-`u64`, `usize`, `f32`, `f64`,
//!   `String`, `chrono::DateTime<FixedOffset>`, `chrono::DateTime<Utc>`, [`TypeHandle`]
//! - tuples: `()`, `(P0,)` .. `(P0, .., P5)`
//! - lists: `Vec<T>`, `VecDeque<T>`, `[T; N]`
//! - maps: `HashMap<K, V, S>`, `BTreeMap<K, V>`
//! - optionals: `Option<T>`, `OnceLock<T>`
//! - transparent pointers: `Arc<T>`, `Box<T>`
//! - any: [`Value`]
//!
//! [`Typed`]: crate::info::Typed
//! [`TypePath`]: crate::info::TypePath
//! [`Reflect::reflect_partial_eq`]: crate::Reflect::reflect_partial_eq
//! [`Reflect::reflect_debug`]: crate::Reflect::reflect_debug

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod lists;
mod maps;
mod option;
mod pointers;
mod scalars;
mod tuples;
mod utils;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericTypeInfoCell, GenericTypePathCell, NonGenericTypeInfoCell};
pub use utils::{concat, reflect_debug, reflect_partial_eq};
pub use value::{TypeHandle, Value};
