//! Change-detecting properties.
//!
//! A [`Property<T>`] wraps a value and reports whether a write actually
//! changed it. Widgets pair each property with a [`Signal`](crate::Signal)
//! and emit only when `set` returns `true`, so listeners never see
//! redundant notifications.
//!
//! # Example
//!
//! ```
//! use pickset_core::{Property, Signal};
//!
//! struct QueryBox {
//!     text: Property<String>,
//!     text_changed: Signal<String>,
//! }
//!
//! impl QueryBox {
//!     fn set_text(&self, text: &str) {
//!         if self.text.set(text.to_string()) {
//!             self.text_changed.emit(text.to_string());
//!         }
//!     }
//! }
//!
//! let query = QueryBox { text: Property::default(), text_changed: Signal::new() };
//! query.set_text("abc");
//! assert_eq!(query.text.get(), "abc");
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value cell with change detection.
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if it changed.
    ///
    /// Equal values leave the property untouched.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the previous one if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.value.read())
            .finish()
    }
}

static_assertions::assert_impl_all!(Property<String>: Send, Sync);
