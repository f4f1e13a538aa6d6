//! Model-element boundary.
//!
//! A diagram never owns model elements; it only asks them for their identity
//! and, for connection points, for their owning container. [`ModelElement`]
//! is that capability interface. [`Element`] and [`Model`] are a small
//! in-memory model implementing it, used by demos and tests in place of a
//! full modeling framework.

use indexmap::IndexMap;
use log::trace;
use thiserror::Error;

use crate::identifier::Id;

/// Capability interface of anything that can be drawn.
///
/// `id` is the identity resolver: it must return the same [`Id`] for the same
/// element on every call. Connection points additionally report their owner,
/// which lets edges fall back to the owning container when the connection
/// point itself is not drawn.
pub trait ModelElement {
    /// Stable identity of the element.
    fn id(&self) -> Id;

    /// Human-readable name, if the element has one.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Owning container for connection points, `None` otherwise.
    fn owner(&self) -> Option<Id> {
        None
    }

    /// Classifies the element as an edge endpoint.
    fn endpoint(&self) -> Endpoint {
        match self.owner() {
            Some(owner) => Endpoint::ConnectionPoint {
                id: self.id(),
                owner,
            },
            None => Endpoint::Container(self.id()),
        }
    }
}

impl<T: ModelElement + ?Sized> ModelElement for &T {
    fn id(&self) -> Id {
        (**self).id()
    }

    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn owner(&self) -> Option<Id> {
        (**self).owner()
    }

    fn endpoint(&self) -> Endpoint {
        (**self).endpoint()
    }
}

/// A bare identifier behaves as an anonymous container.
impl ModelElement for Id {
    fn id(&self) -> Id {
        *self
    }
}

/// Declared end of a connection, before it is bound to a drawn node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// A container element; binds only to its own node.
    Container(Id),
    /// A connection point; binds to its own node or, failing that, to its owner.
    ConnectionPoint { id: Id, owner: Id },
}

impl Endpoint {
    /// Identifier of the declared element.
    pub fn id(&self) -> Id {
        match self {
            Endpoint::Container(id) | Endpoint::ConnectionPoint { id, .. } => *id,
        }
    }

    /// Owner of a connection point.
    pub fn owner(&self) -> Option<Id> {
        match self {
            Endpoint::Container(_) => None,
            Endpoint::ConnectionPoint { owner, .. } => Some(*owner),
        }
    }
}

/// What an [`Element`] is in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// A component, optionally nested in a parent component.
    Component { parent: Option<Id> },
    /// A connection point owned by a component.
    Port { owner: Id },
    /// A connection between two ports or components.
    Exchange { source: Id, target: Id },
}

/// Element of the in-memory reference model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    id: Id,
    name: String,
    kind: ElementKind,
}

impl Element {
    /// Creates a top-level component.
    pub fn component(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self::new(id.into(), name.into(), ElementKind::Component { parent: None })
    }

    /// Creates a component nested in `parent`.
    pub fn subcomponent(id: impl Into<Id>, name: impl Into<String>, parent: Id) -> Self {
        Self::new(
            id.into(),
            name.into(),
            ElementKind::Component {
                parent: Some(parent),
            },
        )
    }

    /// Creates a port owned by `owner`.
    pub fn port(id: impl Into<Id>, name: impl Into<String>, owner: Id) -> Self {
        Self::new(id.into(), name.into(), ElementKind::Port { owner })
    }

    /// Creates an exchange from `source` to `target`.
    pub fn exchange(id: impl Into<Id>, name: impl Into<String>, source: Id, target: Id) -> Self {
        Self::new(id.into(), name.into(), ElementKind::Exchange { source, target })
    }

    fn new(id: Id, name: String, kind: ElementKind) -> Self {
        Self { id, name, kind }
    }

    /// Returns the element kind.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the name of the element.
    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Identifiers this element refers to.
    fn references(&self) -> Vec<Id> {
        match self.kind {
            ElementKind::Component { parent } => parent.into_iter().collect(),
            ElementKind::Port { owner } => vec![owner],
            ElementKind::Exchange { source, target } => vec![source, target],
        }
    }
}

impl ModelElement for Element {
    fn id(&self) -> Id {
        self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn owner(&self) -> Option<Id> {
        match self.kind {
            ElementKind::Port { owner } => Some(owner),
            _ => None,
        }
    }
}

/// Errors raised while populating a [`Model`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Element has an empty identifier")]
    EmptyIdentifier,

    #[error("Element `{0}` is already part of the model")]
    DuplicateIdentifier(Id),

    #[error("Element `{element}` refers to unknown element `{reference}`")]
    UnknownReference { element: Id, reference: Id },

    #[error("No element `{0}` in the model")]
    UnknownElement(Id),
}

/// Insertion-ordered collection of [`Element`]s.
///
/// References between elements must point at elements that were inserted
/// earlier, so a populated model never contains dangling references.
#[derive(Debug, Clone, Default)]
pub struct Model {
    elements: IndexMap<Id, Element>,
}

impl Model {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the identifier is empty or already present,
    /// or if the element refers to an element not yet in the model.
    pub fn insert(&mut self, element: Element) -> Result<Id, ModelError> {
        let id = element.id;
        if id.is_empty() {
            return Err(ModelError::EmptyIdentifier);
        }
        if self.elements.contains_key(&id) {
            return Err(ModelError::DuplicateIdentifier(id));
        }
        if let Some(reference) = element
            .references()
            .into_iter()
            .find(|reference| !self.elements.contains_key(reference))
        {
            return Err(ModelError::UnknownReference {
                element: id,
                reference,
            });
        }

        trace!(element:?; "Inserting model element");
        self.elements.insert(id, element);
        Ok(id)
    }

    /// Looks up an element by identifier.
    pub fn get(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Looks up an element by identifier, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownElement`] if no such element exists.
    pub fn by_id(&self, id: impl Into<Id>) -> Result<&Element, ModelError> {
        let id = id.into();
        self.get(id).ok_or(ModelError::UnknownElement(id))
    }

    /// Number of elements in the model.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the model has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over all elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Components directly nested in `parent`.
    pub fn components_of(&self, parent: Id) -> impl Iterator<Item = &Element> {
        self.iter().filter(move |element| {
            element.kind
                == ElementKind::Component {
                    parent: Some(parent),
                }
        })
    }

    /// Ports owned by `owner`.
    pub fn ports_of(&self, owner: Id) -> impl Iterator<Item = &Element> {
        self.iter()
            .filter(move |element| element.kind == ElementKind::Port { owner })
    }

    /// Owner of a port, resolved to its element.
    pub fn owner_of(&self, port: &Element) -> Option<&Element> {
        port.owner().and_then(|owner| self.get(owner))
    }

    /// Declared source and target of an exchange.
    pub fn ends_of(&self, exchange: &Element) -> Option<(&Element, &Element)> {
        match exchange.kind {
            ElementKind::Exchange { source, target } => {
                Some((self.get(source)?, self.get(target)?))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> Model {
        let mut model = Model::new();
        let system = model.insert(Element::component("system", "System")).unwrap();
        let a = model
            .insert(Element::subcomponent("a", "A", system))
            .unwrap();
        let b = model
            .insert(Element::subcomponent("b", "B", system))
            .unwrap();
        let pa = model.insert(Element::port("pa", "PA", a)).unwrap();
        let pb = model.insert(Element::port("pb", "PB", b)).unwrap();
        model
            .insert(Element::exchange("ab", "A to B", pa, pb))
            .unwrap();
        model
    }

    #[test]
    fn test_endpoint_classification() {
        let component = Element::component("c1", "C1");
        let port = Element::port("p1", "P1", Id::new("c1"));

        assert_eq!(component.endpoint(), Endpoint::Container(Id::new("c1")));
        assert_eq!(
            port.endpoint(),
            Endpoint::ConnectionPoint {
                id: Id::new("p1"),
                owner: Id::new("c1"),
            }
        );
        assert_eq!(port.endpoint().owner(), Some(Id::new("c1")));
        assert_eq!(component.endpoint().owner(), None);
    }

    #[test]
    fn test_bare_id_is_container() {
        let id = Id::new("anonymous");
        assert_eq!(id.endpoint(), Endpoint::Container(id));
        assert_eq!(ModelElement::name(&id), None);
    }

    #[test]
    fn test_reference_forwards_capabilities() {
        let port = Element::port("p2", "P2", Id::new("c2"));
        let by_ref: &dyn ModelElement = &&port;

        assert_eq!(by_ref.id(), Id::new("p2"));
        assert_eq!(by_ref.name(), Some("P2"));
        assert_eq!(by_ref.owner(), Some(Id::new("c2")));
    }

    /// Host element that classifies itself without going through `owner`.
    struct Pin {
        id: Id,
        owner: Id,
    }

    impl ModelElement for Pin {
        fn id(&self) -> Id {
            self.id
        }

        fn endpoint(&self) -> Endpoint {
            Endpoint::ConnectionPoint {
                id: self.id,
                owner: self.owner,
            }
        }
    }

    #[test]
    fn test_reference_forwards_endpoint_override() {
        let pin = Pin {
            id: Id::new("pin"),
            owner: Id::new("pin-owner"),
        };
        let by_ref: &dyn ModelElement = &&pin;

        assert_eq!(pin.owner(), None);
        assert_eq!(by_ref.endpoint(), pin.endpoint());
        assert_eq!(by_ref.endpoint().owner(), Some(Id::new("pin-owner")));
    }

    #[test]
    fn test_model_navigation() {
        let model = sample_model();
        assert_eq!(model.len(), 6);

        let system = model.by_id("system").unwrap();
        let children: Vec<_> = model.components_of(system.id()).map(|c| c.id()).collect();
        assert_eq!(children, vec![Id::new("a"), Id::new("b")]);

        let exchange = model.by_id("ab").unwrap();
        let (source, target) = model.ends_of(exchange).unwrap();
        assert_eq!(source.id(), Id::new("pa"));
        assert_eq!(target.id(), Id::new("pb"));
        assert_eq!(model.owner_of(source).unwrap().id(), Id::new("a"));

        let ports: Vec<_> = model.ports_of(Id::new("b")).map(|p| p.id()).collect();
        assert_eq!(ports, vec![Id::new("pb")]);
    }

    #[test]
    fn test_model_rejects_invalid_elements() {
        let mut model = sample_model();

        assert_eq!(
            model.insert(Element::component("", "Nameless")),
            Err(ModelError::EmptyIdentifier)
        );
        assert_eq!(
            model.insert(Element::component("a", "Again")),
            Err(ModelError::DuplicateIdentifier(Id::new("a")))
        );
        assert_eq!(
            model.insert(Element::port("orphan", "Orphan", Id::new("missing"))),
            Err(ModelError::UnknownReference {
                element: Id::new("orphan"),
                reference: Id::new("missing"),
            })
        );
        assert_eq!(
            model.by_id("nowhere").unwrap_err(),
            ModelError::UnknownElement(Id::new("nowhere"))
        );
        assert_eq!(model.len(), 6);
    }
}
