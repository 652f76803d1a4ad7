//! Program model handed to the access-control subsystem by the declaration elaborator.
//!
//! [`entity`] holds the resolved entities of the translation unit (classes, members and their
//! access specifiers), [`decl`] holds the syntax of one source declaration as an arena of
//! regions, expressions and name references.

pub mod decl;
pub mod entity;

pub use cxx_span::{LineColumn, Span};
pub use decl::{
    DeclId, Declaration, DeclarationBuilder, DeclaredEntityKind, Expr, ExprId, ExprKind, NameRef,
    NameRefId, Region, RegionId, RegionKind, TemplateHeader, TemplateParam, TemplateParamId,
    TemplateParamKind,
};
pub use entity::{AccessSpecifier, Entity, EntityId, EntityKind, EntityTable};
