//! Model-facing interface of the stator model checker.
//!
//! A model is ordinary Rust code: it declares its state variables through a
//! [`LayoutBuilder`], keeps the returned [`StateVar`] handles, and implements
//! [`Model`] to fire numbered structural transitions against the packed
//! state views the explorer hands it.

pub mod layout;
pub mod model;
pub mod state;
pub mod stubborn;

pub use layout::{LayoutBuilder, LayoutError, StateVar, VarLayout, WORD_BITS};
pub use model::{Model, ModelError};
pub use state::{StateMut, StateRef};
pub use stubborn::Obligations;
