#![deny(unsafe_code)]

pub mod aspect;
pub mod definition;
pub mod enums;
pub mod error;
pub mod layout;
pub mod qname;

pub use aspect::{Aspect, ConstraintSet, MemberValue, RuleSets};
pub use definition::{
    AspectNode, Breakdown, ConceptRelationshipNode, DefinitionNode, DimensionRelationshipNode,
    NodeKind, NodeLabels, PARENT_CHILD_ARCROLE, PRESENTATION_ARC, ROOT_SOURCE,
    RelationshipSource, RuleNode, TableDefinition, order_key,
};
pub use enums::{Axis, ParentChildOrder, RelationshipAxis};
pub use error::{Result, TableError};
pub use layout::{Cell, CellAddress, Constraint, Layout, TableSlice};
pub use qname::QName;
