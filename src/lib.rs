#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use og_reflect as reflect;
pub use og_utils as utils;

#[cfg(feature = "json")]
#[cfg_attr(docsrs, doc(cfg(feature = "json")))]
pub use og_json as json;

#[cfg(feature = "expr")]
#[cfg_attr(docsrs, doc(cfg(feature = "expr")))]
pub use og_expr as expr;
