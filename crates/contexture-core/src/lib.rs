//! Contexture Core Types
//!
//! Foundational types shared by the Contexture diagram crates:
//!
//! - **Identifiers**: Interned, copyable element identity ([`identifier::Id`])
//! - **Model boundary**: The capability interface diagrams consume
//!   ([`model::ModelElement`], [`model::Endpoint`]) and a small in-memory
//!   reference model ([`model::Model`])

pub mod identifier;
pub mod model;
