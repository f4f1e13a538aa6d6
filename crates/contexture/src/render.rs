//! Rendering of a built diagram into resolved primitives.
//!
//! The renderer makes a single pass over the registry in insertion order.
//! Boxes pick up their nested children and ports from the containment
//! tracker; edges have both endpoints bound through the
//! [`resolver`](crate::resolver). One unresolved endpoint aborts the whole
//! render.

use std::ops::Index;

use indexmap::IndexMap;
use log::{debug, trace};

use contexture_core::identifier::Id;

use crate::{
    DiagramError,
    config::RenderOptions,
    containment::ContainmentTracker,
    error::EndpointSide,
    registry::{Registered, Registry},
    resolver::{self, Resolution},
};

/// A rendered node: a box or a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBox {
    id: Id,
    label: Option<String>,
    is_port: bool,
    parent: Option<Id>,
    children: Vec<Id>,
    ports: Vec<Id>,
}

impl RenderedBox {
    /// Identifier of the source model element.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Label of the source model element.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns `true` if this box is a port.
    pub fn is_port(&self) -> bool {
        self.is_port
    }

    /// Enclosing box, or the owner for ports.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Nested boxes, in attach order. Ports are listed separately.
    pub fn children(&self) -> &[Id] {
        &self.children
    }

    /// Ports owned by this box, in attach order.
    pub fn ports(&self) -> &[Id] {
        &self.ports
    }

    /// Returns `true` if nothing is nested in this box.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.ports.is_empty()
    }
}

/// A rendered connection with both ends bound to rendered boxes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEdge {
    id: Id,
    label: Option<String>,
    source: Resolution,
    target: Resolution,
}

impl RenderedEdge {
    /// Identifier of the source model element.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Label of the source model element.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Box the edge starts at.
    pub fn source(&self) -> Id {
        self.source.node()
    }

    /// Box the edge ends at.
    pub fn target(&self) -> Id {
        self.target.node()
    }

    /// How the source end was bound.
    pub fn source_resolution(&self) -> Resolution {
        self.source
    }

    /// How the target end was bound.
    pub fn target_resolution(&self) -> Resolution {
        self.target
    }
}

/// One entry of a rendered diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Primitive {
    Box(RenderedBox),
    Edge(RenderedEdge),
}

impl Primitive {
    /// Identifier of the source model element.
    pub fn id(&self) -> Id {
        match self {
            Self::Box(rendered) => rendered.id(),
            Self::Edge(rendered) => rendered.id(),
        }
    }

    /// Returns the box, if this is one.
    pub fn as_box(&self) -> Option<&RenderedBox> {
        match self {
            Self::Box(rendered) => Some(rendered),
            Self::Edge(_) => None,
        }
    }

    /// Returns the edge, if this is one.
    pub fn as_edge(&self) -> Option<&RenderedEdge> {
        match self {
            Self::Edge(rendered) => Some(rendered),
            Self::Box(_) => None,
        }
    }
}

/// Output of a render: every registered element, resolved, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    name: String,
    target: Id,
    style_class: Option<String>,
    params: IndexMap<String, String>,
    elements: IndexMap<Id, Primitive>,
}

impl RenderedDiagram {
    /// Diagram name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element the diagram was built for.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Style class passed in the render options.
    pub fn style_class(&self) -> Option<&str> {
        self.style_class.as_deref()
    }

    /// Hints passed in the render options.
    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    /// Number of rendered elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if nothing was rendered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns `true` if `id` was rendered.
    pub fn contains(&self, id: impl Into<Id>) -> bool {
        self.elements.contains_key(&id.into())
    }

    /// Looks up a rendered element.
    pub fn get(&self, id: impl Into<Id>) -> Option<&Primitive> {
        self.elements.get(&id.into())
    }

    /// Looks up a rendered box or port.
    pub fn get_box(&self, id: impl Into<Id>) -> Option<&RenderedBox> {
        self.get(id).and_then(Primitive::as_box)
    }

    /// Looks up a rendered edge.
    pub fn get_edge(&self, id: impl Into<Id>) -> Option<&RenderedEdge> {
        self.get(id).and_then(Primitive::as_edge)
    }

    /// All rendered elements in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &Primitive)> {
        self.elements.iter().map(|(id, primitive)| (*id, primitive))
    }

    /// Boxes that are not nested in another box.
    pub fn roots(&self) -> impl Iterator<Item = &RenderedBox> {
        self.elements
            .values()
            .filter_map(Primitive::as_box)
            .filter(|rendered| rendered.parent().is_none())
    }

    /// Boxes nested directly in `id`.
    pub fn children_of(&self, id: impl Into<Id>) -> impl Iterator<Item = &RenderedBox> {
        self.boxes_for(id.into(), RenderedBox::children)
    }

    /// Ports owned by `id`.
    pub fn ports_of(&self, id: impl Into<Id>) -> impl Iterator<Item = &RenderedBox> {
        self.boxes_for(id.into(), RenderedBox::ports)
    }

    /// All boxes and ports below `id`, depth first, children before ports.
    pub fn descendants(&self, id: impl Into<Id>) -> Vec<&RenderedBox> {
        let mut found = Vec::new();
        let mut stack: Vec<Id> = self
            .get_box(id)
            .map(|rendered| nested_ids(rendered).rev().collect())
            .unwrap_or_default();
        while let Some(current) = stack.pop() {
            let Some(rendered) = self.get_box(current) else {
                continue;
            };
            stack.extend(nested_ids(rendered).rev());
            found.push(rendered);
        }
        found
    }

    /// Box the edge starts at.
    pub fn source_of(&self, edge: &RenderedEdge) -> Option<&RenderedBox> {
        self.get_box(edge.source())
    }

    /// Box the edge ends at.
    pub fn target_of(&self, edge: &RenderedEdge) -> Option<&RenderedBox> {
        self.get_box(edge.target())
    }

    fn boxes_for(
        &self,
        id: Id,
        select: fn(&RenderedBox) -> &[Id],
    ) -> impl Iterator<Item = &RenderedBox> {
        self.get_box(id)
            .into_iter()
            .flat_map(move |rendered| select(rendered).iter())
            .filter_map(move |nested| self.get_box(*nested))
    }
}

impl Index<Id> for RenderedDiagram {
    type Output = Primitive;

    /// # Panics
    ///
    /// Panics if `id` was not rendered.
    fn index(&self, id: Id) -> &Self::Output {
        &self.elements[&id]
    }
}

fn nested_ids(rendered: &RenderedBox) -> impl DoubleEndedIterator<Item = Id> + '_ {
    rendered.children().iter().chain(rendered.ports()).copied()
}

/// Header fields of a rendered diagram.
pub(crate) struct DiagramInfo<'a> {
    pub(crate) name: &'a str,
    pub(crate) target: Id,
}

/// Resolves the registry and containment tree into a [`RenderedDiagram`].
///
/// # Errors
///
/// Returns [`DiagramError::UnresolvedEndpoint`] for the first edge whose
/// source or target cannot be bound.
pub(crate) fn render(
    info: DiagramInfo<'_>,
    registry: &Registry,
    containment: &ContainmentTracker,
    options: Option<&RenderOptions>,
) -> Result<RenderedDiagram, DiagramError> {
    let mut elements = IndexMap::with_capacity(registry.len());

    for (id, registered) in registry.iter() {
        let primitive = match registered {
            Registered::Box { .. } | Registered::Port { .. } => {
                Primitive::Box(render_box(id, registered, registry, containment))
            }
            Registered::Edge {
                label,
                source,
                target,
            } => {
                let source = resolver::resolve(registry, id, EndpointSide::Source, source)?;
                let target = resolver::resolve(registry, id, EndpointSide::Target, target)?;
                if source.is_fallback() || target.is_fallback() {
                    debug!(edge:% = id; "Edge bound through owner fallback");
                }
                Primitive::Edge(RenderedEdge {
                    id,
                    label: label.clone(),
                    source,
                    target,
                })
            }
        };
        trace!(primitive:?; "Rendered element");
        elements.insert(id, primitive);
    }

    let (style_class, params) = options
        .map(|options| (options.style_class().map(str::to_owned), options.params().clone()))
        .unwrap_or_default();

    Ok(RenderedDiagram {
        name: info.name.to_owned(),
        target: info.target,
        style_class,
        params,
        elements,
    })
}

fn render_box(
    id: Id,
    registered: &Registered,
    registry: &Registry,
    containment: &ContainmentTracker,
) -> RenderedBox {
    let (ports, children): (Vec<Id>, Vec<Id>) = containment
        .children_of(id)
        .partition(|child| registry.get(*child).is_some_and(Registered::is_port));

    RenderedBox {
        id,
        label: registered.label().map(str::to_owned),
        is_port: registered.is_port(),
        parent: containment.parent_of(id),
        children,
        ports,
    }
}
