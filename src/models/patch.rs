use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A field-level change for an optional document field.
///
/// `Keep` leaves the stored value untouched, `Set` writes a new value and
/// `Clear` removes the field from the stored document. In JSON a missing
/// key deserializes to `Keep` (with `#[serde(default)]`), `null` to `Clear`
/// and any other value to `Set`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Resolves the patch against the currently stored value.
    pub fn apply(&self, current: Option<T>) -> Option<T>
    where
        T: Clone,
    {
        match self {
            Patch::Keep => current,
            Patch::Set(value) => Some(value.clone()),
            Patch::Clear => None,
        }
    }

    /// Whether applying the patch would produce a different value.
    pub fn changes(&self, current: Option<&T>) -> bool
    where
        T: PartialEq,
    {
        match self {
            Patch::Keep => false,
            Patch::Set(value) => current != Some(value),
            Patch::Clear => current.is_some(),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Clear,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Set(value) => serializer.serialize_some(value),
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
        }
    }
}
