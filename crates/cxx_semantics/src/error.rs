use cxx_ast::{AccessSpecifier, DeclId, EntityId, NameRefId, RegionId, Span};
#[cfg(feature = "serde")]
use serde::Serialize;
use thiserror::Error;

use crate::name_position::PositionCategory;

/// Raised by an [`AccessChecker`](crate::AccessChecker) when a name that was not exempted by the
/// gate denotes a member the referencing context may not access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[error("'{name}' is a {access} member of '{class}'")]
pub struct AccessViolation {
    pub name: Box<str>,
    pub entity: EntityId,
    pub access: AccessSpecifier,
    /// Qualified name of the class declaring the member.
    pub class: String,
    /// Location of the offending name reference.
    pub span: Span,
    /// Location of the access specifier in effect for the member.
    pub declared_at: Span,
}

/// A name reference could not be placed into exactly one category. Always a bug in the
/// classifiers or in the arena handed over by the elaborator, never a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MisclassifiedSyntax {
    #[error("name reference {0:?} does not exist in declaration {1:?}")]
    UnknownNameRef(NameRefId, DeclId),
    #[error("region {region:?} of name reference {name_ref:?} is not part of declaration {decl:?}")]
    DetachedRegion {
        decl: DeclId,
        name_ref: NameRefId,
        region: RegionId,
    },
    #[error(
        "name reference {name_ref:?} is a specialization head argument but lies in a {category} region"
    )]
    HeadArgumentOutsideHead {
        name_ref: NameRefId,
        category: PositionCategory,
    },
}
