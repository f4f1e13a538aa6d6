//! Stable element identity backed by a global string interner.
//!
//! Model elements are keyed by an opaque identifier string (usually a UUID).
//! [`Id`] interns that string once so that every later comparison, hash and
//! copy is a symbol operation instead of a string operation.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by every [`Id`].
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Runs `f` with exclusive access to the interner.
fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Interned identifier of a model element.
///
/// Two `Id`s are equal exactly when they were created from the same string,
/// which makes `Id` the deduplication key for everything registered in a
/// diagram.
///
/// # Examples
///
/// ```
/// use contexture_core::identifier::Id;
///
/// let a = Id::new("0d2edb8f-fa34-4e73-89ec-fb9a63001440");
/// let b: Id = "0d2edb8f-fa34-4e73-89ec-fb9a63001440".into();
///
/// assert_eq!(a, b);
/// assert_eq!(a, "0d2edb8f-fa34-4e73-89ec-fb9a63001440");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `value` and returns its identifier.
    pub fn new(value: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(value)))
    }

    /// Returns `true` if the identifier was created from an empty string.
    pub fn is_empty(&self) -> bool {
        with_interner(|interner| interner.resolve(self.0).is_none_or(str::is_empty))
    }

    /// Returns an owned copy of the underlying string.
    pub fn to_owned_string(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_owned()
        })
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.to_owned_string()).finish()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_owned_string())
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&String> for Id {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
