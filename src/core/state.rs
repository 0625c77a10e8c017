//! Identifier traits for machine states and input symbols.
//!
//! States and symbols are opaque values. The engine only ever compares,
//! hashes, clones and serializes them, so any type with those capabilities
//! works: `String`, `char`, small integers, or a user-defined enum.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Clone`: the current state is copied into snapshots and step outcomes
/// - `Eq` + `Hash`: states are table keys
/// - `Debug`: states are rendered into errors and log fields
/// - `Serialize` + `DeserializeOwned`: states are persisted in snapshots and configs
///
/// The trait is implemented for every type meeting these bounds, so there is
/// nothing to implement by hand.
///
/// # Example
///
/// ```rust
/// use streakfsm::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn assert_state<S: State>() {}
/// assert_state::<Door>();
/// assert_state::<String>();
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> State for T where
    T: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Trait for input symbols.
///
/// Same capabilities as [`State`]; kept as a separate trait so signatures
/// read `Runtime<S: State, Y: Symbol>`.
pub trait Symbol:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Symbol for T where
    T: Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Render an identifier for error messages and log fields.
pub(crate) fn label<T: Debug>(value: &T) -> String {
    format!("{value:?}")
}
