//! Element registry.
//!
//! Flat, insertion-ordered mapping from [`Id`] to the element registered for
//! it. Insertion order is the render order. An identifier is registered at
//! most once; registering it again hands back what is already there.

use indexmap::{IndexMap, map::Entry};

use contexture_core::{identifier::Id, model::Endpoint};

use crate::error::{DiagramError, ElementCategory};

/// A registered diagram element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registered {
    /// A plain box.
    Box { label: Option<String> },
    /// A box standing for a connection point of `owner`.
    Port { label: Option<String>, owner: Id },
    /// A connection with its endpoints as declared by the caller.
    Edge {
        label: Option<String>,
        source: Endpoint,
        target: Endpoint,
    },
}

impl Registered {
    /// Label carried over from the model element.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Box { label } | Self::Port { label, .. } | Self::Edge { label, .. } => {
                label.as_deref()
            }
        }
    }

    /// Node or edge.
    pub fn category(&self) -> ElementCategory {
        match self {
            Self::Box { .. } | Self::Port { .. } => ElementCategory::Node,
            Self::Edge { .. } => ElementCategory::Edge,
        }
    }

    /// Returns `true` for boxes and ports.
    pub fn is_node(&self) -> bool {
        self.category() == ElementCategory::Node
    }

    /// Returns `true` for ports.
    pub fn is_port(&self) -> bool {
        matches!(self, Self::Port { .. })
    }
}

/// Outcome of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration<'a> {
    /// The identifier was new and the element was inserted.
    Inserted(&'a Registered),
    /// The identifier was already taken; this is the untouched existing element.
    Existing(&'a Registered),
}

impl<'a> Registration<'a> {
    /// The element now registered under the identifier.
    pub fn element(&self) -> &'a Registered {
        match self {
            Self::Inserted(element) | Self::Existing(element) => element,
        }
    }

    /// Returns `true` if this call inserted the element.
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Identifier-keyed, insertion-ordered element store.
#[derive(Debug, Default)]
pub struct Registry {
    elements: IndexMap<Id, Registered>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `element` under `id` unless the identifier is already taken.
    pub fn register(&mut self, id: Id, element: Registered) -> Registration<'_> {
        match self.elements.entry(id) {
            Entry::Occupied(entry) => Registration::Existing(entry.into_mut()),
            Entry::Vacant(entry) => Registration::Inserted(entry.insert(element)),
        }
    }

    /// Like [`Registry::register`], but only builds the element when the
    /// identifier is free.
    ///
    /// `make` runs inside the same lookup that performs the insertion, so
    /// validation it does applies to new registrations only.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `make`; nothing is inserted then.
    pub fn register_with<F>(&mut self, id: Id, make: F) -> Result<Registration<'_>, DiagramError>
    where
        F: FnOnce() -> Result<Registered, DiagramError>,
    {
        match self.elements.entry(id) {
            Entry::Occupied(entry) => Ok(Registration::Existing(entry.into_mut())),
            Entry::Vacant(entry) => Ok(Registration::Inserted(entry.insert(make()?))),
        }
    }

    /// Looks up the element registered under `id`.
    pub fn get(&self, id: Id) -> Option<&Registered> {
        self.elements.get(&id)
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    /// Returns `true` if `id` is registered as a box or port.
    pub fn is_node(&self, id: Id) -> bool {
        self.get(id).is_some_and(Registered::is_node)
    }

    /// All registered elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &Registered)> {
        self.elements.iter().map(|(id, element)| (*id, element))
    }

    /// Number of registered identifiers.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
