//! Serde helpers for column nullability
//!
//! Optional columns are `Option<T>` where absence means "not provided".
//! For non-nullable columns an explicit `null` must be a deserialization
//! error, and for nullable columns on Update shapes `null` must stay
//! distinguishable from absence (`Option<Option<T>>`).

use serde::{Deserialize, Deserializer};

/// Present value of a non-nullable column; `null` is rejected.
///
/// Use together with `#[serde(default)]` so absence yields `None`.
pub fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Present value of a nullable column: `Some(None)` for `null`.
///
/// Use together with `#[serde(default)]` so absence yields `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
