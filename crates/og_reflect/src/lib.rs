#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names `::og_reflect`, which must also resolve inside
// this crate (unit tests derive `Reflect` too).
extern crate self as og_reflect;

// -----------------------------------------------------------------------------
// Modules

mod reflection;

pub mod impls;
pub mod info;
pub mod ops;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use impls::{TypeHandle, Value};
pub use og_reflect_derive as derive;
pub use reflection::{FromReflect, Reflect};

