//! Edge endpoint resolution.
//!
//! An edge is declared against model elements, not against drawn nodes. At
//! render time each declared endpoint is bound to the most specific node that
//! was actually registered:
//!
//! 1. the endpoint's own box or port, if it was registered;
//! 2. otherwise, for a connection point, the box of its owner;
//! 3. otherwise the edge cannot be drawn.
//!
//! This lets the same edge declaration produce a port-to-port connection when
//! ports are drawn and a component-to-component connection when they are not.

use log::{debug, trace};

use contexture_core::{identifier::Id, model::Endpoint};

use crate::{
    error::{DiagramError, EndpointSide},
    registry::Registry,
};

/// Node an endpoint was bound to, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The declared element was registered as a node itself.
    Direct(Id),
    /// The declared element was not drawn; its owner's node was used.
    ViaOwner(Id),
}

impl Resolution {
    /// Identifier of the bound node.
    pub fn node(&self) -> Id {
        match self {
            Self::Direct(id) | Self::ViaOwner(id) => *id,
        }
    }

    /// Returns `true` if the owner fallback was taken.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::ViaOwner(_))
    }
}

/// Binds `endpoint`, the `side` end of `edge`, to a registered node.
///
/// # Errors
///
/// Returns [`DiagramError::UnresolvedEndpoint`] if neither the endpoint nor
/// its owner is registered as a box or port.
pub fn resolve(
    registry: &Registry,
    edge: Id,
    side: EndpointSide,
    endpoint: &Endpoint,
) -> Result<Resolution, DiagramError> {
    let declared = endpoint.id();
    if registry.is_node(declared) {
        trace!(edge:% = edge, endpoint:% = declared; "Endpoint bound directly");
        return Ok(Resolution::Direct(declared));
    }

    if let Some(owner) = endpoint.owner().filter(|owner| registry.is_node(*owner)) {
        debug!(
            edge:% = edge,
            endpoint:% = declared,
            owner:% = owner;
            "Endpoint not drawn, binding to owner"
        );
        return Ok(Resolution::ViaOwner(owner));
    }

    Err(DiagramError::UnresolvedEndpoint {
        edge,
        side,
        endpoint: declared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registered;

    fn registry_with_nodes(boxes: &[Id], ports: &[(Id, Id)]) -> Registry {
        let mut registry = Registry::new();
        for id in boxes {
            registry.register(*id, Registered::Box { label: None });
        }
        for (port, owner) in ports {
            registry.register(
                *port,
                Registered::Port {
                    label: None,
                    owner: *owner,
                },
            );
        }
        registry
    }

    #[test]
    fn test_registered_container_binds_directly() {
        let component = Id::new("rs-comp");
        let registry = registry_with_nodes(&[component], &[]);

        let resolution = resolve(
            &registry,
            Id::new("rs-edge"),
            EndpointSide::Source,
            &Endpoint::Container(component),
        )
        .unwrap();

        assert_eq!(resolution, Resolution::Direct(component));
        assert!(!resolution.is_fallback());
    }

    #[test]
    fn test_registered_port_wins_over_owner() {
        let owner = Id::new("rs-owner");
        let port = Id::new("rs-port");
        let registry = registry_with_nodes(&[owner], &[(port, owner)]);

        let resolution = resolve(
            &registry,
            Id::new("rs-edge"),
            EndpointSide::Target,
            &Endpoint::ConnectionPoint { id: port, owner },
        )
        .unwrap();

        assert_eq!(resolution.node(), port);
        assert!(!resolution.is_fallback());
    }

    #[test]
    fn test_undrawn_port_falls_back_to_owner() {
        let owner = Id::new("rs-fb-owner");
        let port = Id::new("rs-fb-port");
        let registry = registry_with_nodes(&[owner], &[]);

        let resolution = resolve(
            &registry,
            Id::new("rs-edge"),
            EndpointSide::Source,
            &Endpoint::ConnectionPoint { id: port, owner },
        )
        .unwrap();

        assert_eq!(resolution, Resolution::ViaOwner(owner));
        assert!(resolution.is_fallback());
    }

    #[test]
    fn test_nothing_registered_is_unresolved() {
        let registry = registry_with_nodes(&[], &[]);
        let edge = Id::new("rs-dangling");
        let port = Id::new("rs-lost-port");

        let err = resolve(
            &registry,
            edge,
            EndpointSide::Target,
            &Endpoint::ConnectionPoint {
                id: port,
                owner: Id::new("rs-lost-owner"),
            },
        )
        .unwrap_err();

        assert_eq!(
            err,
            DiagramError::UnresolvedEndpoint {
                edge,
                side: EndpointSide::Target,
                endpoint: port,
            }
        );
    }

    #[test]
    fn test_edges_are_not_endpoints() {
        let mut registry = Registry::new();
        let other = Id::new("rs-other-edge");
        let anchor = Id::new("rs-anchor");
        registry.register(
            other,
            Registered::Edge {
                label: None,
                source: Endpoint::Container(anchor),
                target: Endpoint::Container(anchor),
            },
        );

        let result = resolve(
            &registry,
            Id::new("rs-edge"),
            EndpointSide::Source,
            &Endpoint::Container(other),
        );
        assert!(matches!(
            result,
            Err(DiagramError::UnresolvedEndpoint { endpoint, .. }) if endpoint == other
        ));
    }
}
