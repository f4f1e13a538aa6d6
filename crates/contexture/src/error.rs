//! Error types for diagram construction and rendering.
//!
//! Every error is raised synchronously by the operation that detects it and
//! is never recovered internally: a failed build call leaves the diagram
//! unchanged, and a failed render produces no output at all.

use std::fmt;

use thiserror::Error;

use contexture_core::identifier::Id;

/// The main error type for diagram operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiagramError {
    #[error("Cannot place `{child}` in `{parent}`: parent is not a registered box")]
    UnknownParent { child: Id, parent: Id },

    #[error("Cannot create port `{port}`: owner `{owner}` is not a registered box")]
    UnknownOwner { port: Id, owner: Id },

    #[error("Cannot nest `{child}` in `{parent}`: {reason}")]
    InvalidNesting {
        parent: Id,
        child: Id,
        reason: NestingViolation,
    },

    #[error("Edge `{edge}` has an unresolved {side} endpoint `{endpoint}`")]
    UnresolvedEndpoint {
        edge: Id,
        side: EndpointSide,
        endpoint: Id,
    },

    #[error("`{id}` is already registered as {existing}, cannot register it as {requested}")]
    KindConflict {
        id: Id,
        existing: ElementCategory,
        requested: ElementCategory,
    },
}

/// Reason a containment attachment was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingViolation {
    /// The parent is not a registered box.
    UnknownParent,
    /// The child is not a registered box.
    UnknownChild,
    /// Ports cannot contain other boxes.
    PortParent,
    /// A box cannot contain itself.
    SelfContainment,
    /// The child already has a different parent.
    AlreadyNested { current_parent: Id },
    /// The child is an ancestor of the parent.
    Cycle,
}

impl fmt::Display for NestingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParent => write!(f, "parent is not a registered box"),
            Self::UnknownChild => write!(f, "child is not a registered box"),
            Self::PortParent => write!(f, "ports cannot contain boxes"),
            Self::SelfContainment => write!(f, "a box cannot contain itself"),
            Self::AlreadyNested { current_parent } => {
                write!(f, "child is already nested in `{current_parent}`")
            }
            Self::Cycle => write!(f, "child is an ancestor of the parent"),
        }
    }
}

/// Which end of an edge an endpoint error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSide {
    Source,
    Target,
}

impl fmt::Display for EndpointSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Target => write!(f, "target"),
        }
    }
}

/// Broad category of a registered element, used in conflict reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCategory {
    Node,
    Edge,
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "a node"),
            Self::Edge => write!(f, "an edge"),
        }
    }
}
