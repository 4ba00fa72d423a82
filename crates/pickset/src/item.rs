//! The item capability required by filter widgets.

use std::fmt::Debug;
use std::hash::Hash;

/// A selectable record with a stable identifier.
///
/// Widgets only need identity and value equality. Equality decides when a
/// cached snapshot of a selected item must be refreshed from a newer load.
///
/// # Example
///
/// ```
/// use pickset::FilterableItem;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Sku {
///     id: String,
///     code: String,
///     stock: u32,
/// }
///
/// impl FilterableItem for Sku {
///     type Id = String;
///
///     fn id(&self) -> &String {
///         &self.id
///     }
/// }
/// ```
pub trait FilterableItem: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// The identifier type.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// The item's unique identifier.
    fn id(&self) -> &Self::Id;
}
