//! Elements and component types.
//!
//! # Modules
//!
//! - `component` - `ComponentType` and its definitions (function, class,
//!   memo, forward-ref, context)
//! - `node` - render output (`Node`, `Element`, `NodeRef`)
//! - `props` - props snapshot and prop values

mod component;
mod node;
mod props;

use std::rc::Rc;

use crate::core::RenderError;

pub use component::{
    ClassDef, CompareFn, Component, ComponentType, Construct, Context, ForwardRefDef,
    FunctionDef, MemoDef, RenderFn,
};
pub use node::{Element, Node, NodeRef};
pub use props::{Handler, PropValue, Props, RenderProp};

/// Cheap shared string used for tags, keys and attribute names.
pub type SharedStr = Rc<str>;

/// Result of rendering a component.
pub type RenderResult = Result<Node, RenderError>;
