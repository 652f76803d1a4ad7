use cxx_ast::{AccessSpecifier, EntityId, EntityTable, NameRef, Span};
use log::trace;

use crate::access_gate::AccessDecision;
use crate::error::AccessViolation;

/// Everything the ordinary access algorithm needs to know about one name reference the gate did
/// not exempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessRequest<'a> {
    pub name: &'a str,
    pub entity: EntityId,
    pub access: AccessSpecifier,
    /// The class whose scope the reference is made from, `None` at namespace scope.
    pub context: Option<EntityId>,
    pub span: Span,
}

impl<'a> AccessRequest<'a> {
    pub fn new(
        name_ref: &'a NameRef,
        decision: &AccessDecision,
        context: Option<EntityId>,
    ) -> Self {
        AccessRequest {
            name: &name_ref.name,
            entity: decision.entity,
            access: decision.access_specifier,
            context,
            span: name_ref.span,
        }
    }
}

/// The usual member access rules, invoked for every name reference whose check is not suppressed.
pub trait AccessChecker {
    fn check(&self, request: &AccessRequest) -> Result<(), AccessViolation>;
}

/// Checks member access against the entity table: private members are accessible from their class,
/// classes nested in it and its friends; protected members additionally from derived classes.
pub struct MemberAccessChecker<'a> {
    entities: &'a EntityTable,
}

impl<'a> MemberAccessChecker<'a> {
    pub fn new(entities: &'a EntityTable) -> Self {
        MemberAccessChecker { entities }
    }

    fn is_friend_of(&self, context: EntityId, class: EntityId) -> bool {
        let Some(class) = self.entities.get(class) else {
            return false;
        };
        self.entities
            .scope_chain(context)
            .any(|scope| class.friends.contains(&scope))
    }

    fn is_accessible(
        &self,
        access: AccessSpecifier,
        class: EntityId,
        context: Option<EntityId>,
    ) -> bool {
        let Some(context) = context else {
            return access == AccessSpecifier::Public;
        };

        match access {
            AccessSpecifier::Public => true,
            AccessSpecifier::Private => {
                self.entities.is_within(context, class) || self.is_friend_of(context, class)
            }
            AccessSpecifier::Protected => {
                self.entities.is_within(context, class)
                    || self.is_friend_of(context, class)
                    || self
                        .entities
                        .scope_chain(context)
                        .any(|scope| self.entities.is_derived_from(scope, class))
            }
        }
    }
}

impl AccessChecker for MemberAccessChecker<'_> {
    fn check(&self, request: &AccessRequest) -> Result<(), AccessViolation> {
        let Some(class) = self.entities.enclosing_class(request.entity) else {
            // Namespace members are always accessible.
            return Ok(());
        };
        let context = request.context.map(|context| self.entities.resolve_alias(context));

        trace!(
            "Checking {} access to `{}` from {context:?}",
            request.access, request.name
        );

        if self.is_accessible(request.access, class, context) {
            return Ok(());
        }

        let declared_at = self
            .entities
            .get(request.entity)
            .map(|entity| entity.access_declared_at)
            .unwrap_or_default();

        Err(AccessViolation {
            name: request.name.into(),
            entity: request.entity,
            access: request.access,
            class: self.entities.qualified_name(class),
            span: request.span,
            declared_at,
        })
    }
}
