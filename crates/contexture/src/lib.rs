//! Contexture - declarative diagram construction keyed by model identity.
//!
//! Callers register model elements as boxes, ports and edges; the builder
//! keeps them deduplicated by identity, tracks nesting, and renders them into
//! an ordered collection of resolved primitives. Edge endpoints are bound at
//! render time, falling back from an undrawn port to its owning box.
//!
//! Layout, styling and export are left to downstream consumers of
//! [`RenderedDiagram`].

pub mod config;
pub mod containment;
pub mod error;
pub mod registry;
pub mod render;
pub mod resolver;

pub use contexture_core::{identifier, model};

pub use error::DiagramError;
pub use render::{Primitive, RenderedBox, RenderedDiagram, RenderedEdge};

use log::{debug, info, trace};

use config::RenderOptions;
use containment::{ContainmentTracker, NodeRole};
use error::{ElementCategory, NestingViolation};
use identifier::Id;
use model::ModelElement;
use registry::{Registered, Registry};

/// Builder for a single custom diagram.
///
/// A builder is opened for a target model element and populated with
/// [`add_box`](Self::add_box), [`add_port`](Self::add_port) and
/// [`add_edge`](Self::add_edge). Every call is idempotent per identifier:
/// registering an element a second time returns the existing registration
/// untouched.
///
/// # Examples
///
/// ```rust
/// use contexture::{
///     DiagramBuilder,
///     model::{Element, Model},
/// };
///
/// let mut model = Model::new();
/// let left = model.insert(Element::component("left", "Left"))?;
/// let right = model.insert(Element::component("right", "Right"))?;
/// let out = model.insert(Element::port("out", "Out", left))?;
/// let input = model.insert(Element::port("in", "In", right))?;
/// let flow = model.insert(Element::exchange("flow", "Flow", out, input))?;
///
/// let mut diagram = DiagramBuilder::new(model.by_id(flow)?);
/// diagram.add_box(model.by_id(left)?, None)?;
/// diagram.add_box(model.by_id(right)?, None)?;
/// diagram.add_edge(model.by_id(flow)?, model.by_id(out)?, model.by_id(input)?)?;
///
/// // The ports were never drawn, so the edge binds to their owners.
/// let rendered = diagram.render(None)?;
/// let edge = rendered.get_edge(flow).expect("edge is rendered");
/// assert_eq!(edge.source(), left);
/// assert_eq!(edge.target(), right);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DiagramBuilder {
    name: String,
    target: Id,
    registry: Registry,
    containment: ContainmentTracker,
}

impl DiagramBuilder {
    /// Opens an empty diagram for `target`.
    ///
    /// The target is recorded but not drawn; rendering an untouched builder
    /// yields an empty diagram.
    pub fn new(target: &dyn ModelElement) -> Self {
        let target_id = target.id();
        let name = match target.name() {
            Some(name) => format!("Custom diagram of {name}"),
            None => format!("Custom diagram of {target_id}"),
        };
        debug!(target_id:% = target_id, name:% = name; "Opened diagram");

        Self {
            name,
            target: target_id,
            registry: Registry::new(),
            containment: ContainmentTracker::new(),
        }
    }

    /// Replaces the generated diagram name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Diagram name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element the diagram was opened for.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Registers `element` as a box, nested in `parent` if one is given.
    ///
    /// If the element is already registered as a box or port, nothing
    /// happens and its identifier is returned, whatever `parent` says.
    ///
    /// # Errors
    ///
    /// - [`DiagramError::UnknownParent`] if `parent` is not a registered box.
    /// - [`DiagramError::InvalidNesting`] if `parent` is a port.
    /// - [`DiagramError::KindConflict`] if `element` is registered as an edge.
    ///
    /// A failed call registers nothing.
    pub fn add_box(
        &mut self,
        element: &dyn ModelElement,
        parent: Option<&dyn ModelElement>,
    ) -> Result<Id, DiagramError> {
        let id = element.id();
        let parent = parent.map(|parent| parent.id());
        let parent_check = match parent {
            Some(parent) => self.check_container(parent, id, || DiagramError::UnknownParent {
                child: id,
                parent,
            }),
            None => Ok(()),
        };

        let is_new = self.register(id, ElementCategory::Node, || {
            parent_check?;
            Ok(Registered::Box {
                label: element.name().map(str::to_owned),
            })
        })?;
        if !is_new {
            return Ok(id);
        }

        self.containment.insert_node(id, NodeRole::Container);
        if let Some(parent) = parent {
            self.containment.attach_child(parent, id)?;
        }
        debug!(id:% = id, parent:? = parent; "Registered box");
        Ok(id)
    }

    /// Registers `element` as a port of `owner`.
    ///
    /// The port is nested in its owner, which is then reported by
    /// [`owner_of`](Self::owner_of). If the element is already registered as
    /// a box or port, nothing happens.
    ///
    /// # Errors
    ///
    /// - [`DiagramError::UnknownOwner`] if `owner` is not a registered box.
    /// - [`DiagramError::InvalidNesting`] if `owner` is itself a port.
    /// - [`DiagramError::KindConflict`] if `element` is registered as an edge.
    pub fn add_port(
        &mut self,
        element: &dyn ModelElement,
        owner: &dyn ModelElement,
    ) -> Result<Id, DiagramError> {
        let id = element.id();
        let owner = owner.id();
        let owner_check =
            self.check_container(owner, id, || DiagramError::UnknownOwner { port: id, owner });

        let is_new = self.register(id, ElementCategory::Node, || {
            owner_check?;
            Ok(Registered::Port {
                label: element.name().map(str::to_owned),
                owner,
            })
        })?;
        if !is_new {
            return Ok(id);
        }

        self.containment.insert_node(id, NodeRole::ConnectionPoint);
        self.containment.attach_child(owner, id)?;
        debug!(id:% = id, owner:% = owner; "Registered port");
        Ok(id)
    }

    /// Registers `element` as an edge from `source` to `target`.
    ///
    /// Endpoints are only recorded here. They are bound to drawn nodes by
    /// [`render`](Self::render), so they may be registered before or after
    /// the edge.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::KindConflict`] if `element` is registered as a
    /// box or port.
    pub fn add_edge(
        &mut self,
        element: &dyn ModelElement,
        source: &dyn ModelElement,
        target: &dyn ModelElement,
    ) -> Result<Id, DiagramError> {
        let id = element.id();
        let is_new = self.register(id, ElementCategory::Edge, || {
            Ok(Registered::Edge {
                label: element.name().map(str::to_owned),
                source: source.endpoint(),
                target: target.endpoint(),
            })
        })?;
        if is_new {
            debug!(
                id:% = id,
                source_id:% = source.id(),
                target_id:% = target.id();
                "Registered edge"
            );
        }
        Ok(id)
    }

    /// Nests an already registered box in another registered box.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::InvalidNesting`] if either element is not a
    /// registered box, `parent` is a port, `child` already has a different
    /// parent, or `child` is `parent` or one of its ancestors.
    pub fn attach(
        &mut self,
        parent: &dyn ModelElement,
        child: &dyn ModelElement,
    ) -> Result<(), DiagramError> {
        self.containment.attach_child(parent.id(), child.id())
    }

    /// Owner recorded for a registered port.
    pub fn owner_of(&self, port: Id) -> Option<Id> {
        match self.registry.get(port)? {
            Registered::Port { owner, .. } => Some(*owner),
            Registered::Box { .. } | Registered::Edge { .. } => None,
        }
    }

    /// Looks up what is registered under `id`.
    pub fn get(&self, id: Id) -> Option<&Registered> {
        self.registry.get(id)
    }

    /// Returns `true` if `id` is registered.
    pub fn contains(&self, id: Id) -> bool {
        self.registry.contains(id)
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Resolves everything registered so far into a [`RenderedDiagram`].
    ///
    /// `options` are carried onto the result untouched; `None` is the same
    /// as default options.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramError::UnresolvedEndpoint`] if an edge endpoint is
    /// neither registered nor owned by a registered box. Nothing is rendered
    /// in that case.
    pub fn render(&self, options: Option<&RenderOptions>) -> Result<RenderedDiagram, DiagramError> {
        info!(
            name = self.name.as_str(),
            elements = self.registry.len();
            "Rendering diagram"
        );

        let info = render::DiagramInfo {
            name: &self.name,
            target: self.target,
        };
        let rendered = render::render(info, &self.registry, &self.containment, options)?;

        info!(elements = rendered.len(); "Diagram rendered");
        trace!(rendered:?; "Rendered diagram");
        Ok(rendered)
    }

    /// Registers under `id` unless taken, checking that an existing
    /// registration has the requested category. Returns whether a new
    /// element was inserted.
    fn register<F>(
        &mut self,
        id: Id,
        requested: ElementCategory,
        make: F,
    ) -> Result<bool, DiagramError>
    where
        F: FnOnce() -> Result<Registered, DiagramError>,
    {
        let registration = self.registry.register_with(id, make)?;
        let existing = registration.element().category();
        if existing != requested {
            return Err(DiagramError::KindConflict {
                id,
                existing,
                requested,
            });
        }
        if !registration.is_new() {
            trace!(id:% = id; "Already registered, keeping existing element");
        }
        Ok(registration.is_new())
    }

    /// Checks that `container` may hold `child`.
    fn check_container(
        &self,
        container: Id,
        child: Id,
        unknown: impl FnOnce() -> DiagramError,
    ) -> Result<(), DiagramError> {
        match self.registry.get(container) {
            Some(registered) if registered.is_port() => Err(DiagramError::InvalidNesting {
                parent: container,
                child,
                reason: NestingViolation::PortParent,
            }),
            Some(registered) if registered.is_node() => Ok(()),
            _ => Err(unknown()),
        }
    }
}
