use cxx_ast::{
    AccessSpecifier, Declaration, EntityId, EntityTable, ExprId, NameRefId, TemplateHeader,
};
use log::{debug, warn};
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::declaration_context::{DeclarationContextClassifier, SpecializationKind};
use crate::dependence::{DependenceAnalyzer, TemplateParamSet};
use crate::error::MisclassifiedSyntax;
use crate::name_position::{NamePositionClassifier, PositionCategory};

/// Outcome of the gate for one name reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AccessDecision {
    pub suppressed: bool,
    pub access_specifier: AccessSpecifier,
    pub entity: EntityId,
}

/// Decides, per name reference of one declaration, whether the ordinary access check runs.
///
/// The declaration's [`SpecializationKind`] is classified once when the gate is created, which is
/// after the complete declaration has been built. [`AccessGate::decide`] only reads the
/// declaration and the entity table, so it can be called any number of times (for instance on
/// re-instantiation) with the same result.
pub struct AccessGate<'a> {
    declaration: &'a Declaration,
    entities: &'a EntityTable,
    specialization_kind: SpecializationKind,
    template_params: TemplateParamSet,
    /// Arguments of the qualifier template-ids of a declaration without template header.
    qualifier_arguments: Vec<ExprId>,
    positions: NamePositionClassifier,
}

impl<'a> AccessGate<'a> {
    pub fn new(declaration: &'a Declaration, entities: &'a EntityTable) -> Self {
        let classifier = DeclarationContextClassifier::new();
        let specialization_kind = classifier.classify(declaration, entities);
        let template_params =
            DependenceAnalyzer::new(declaration, entities).enclosing_template_parameters();
        let qualifier_arguments = match declaration.header() {
            TemplateHeader::None => classifier.qualifier_arguments(declaration),
            _ => vec![],
        };

        AccessGate {
            declaration,
            entities,
            specialization_kind,
            template_params,
            qualifier_arguments,
            positions: NamePositionClassifier::new(),
        }
    }

    pub fn specialization_kind(&self) -> SpecializationKind {
        self.specialization_kind
    }

    /// # Panics
    ///
    /// When `name_ref` cannot be classified, which indicates a malformed declaration arena rather
    /// than a user error.
    pub fn decide(&self, name_ref: NameRefId) -> AccessDecision {
        match self.try_decide(name_ref) {
            Ok(decision) => decision,
            Err(defect) => panic!("Internal consistency failure in access gate: {defect}"),
        }
    }

    pub fn try_decide(&self, name_ref: NameRefId) -> Result<AccessDecision, MisclassifiedSyntax> {
        let reference = self
            .declaration
            .name_ref(name_ref)
            .ok_or(MisclassifiedSyntax::UnknownNameRef(name_ref, self.declaration.id()))?;
        let position = self.positions.classify_position(name_ref, self.declaration)?;

        let suppressed = self.is_suppressed(position, reference.template_argument);

        let access_specifier = match self.entities.get(reference.entity) {
            Some(entity) => entity.access,
            None => {
                warn!(
                    "Name `{}` refers to unknown entity {:?}, treating it as public",
                    reference.name, reference.entity
                );
                AccessSpecifier::Public
            }
        };

        debug!(
            "`{}` ({name_ref:?}) in {} of {} declaration: access check {}",
            reference.name,
            position,
            self.specialization_kind,
            if suppressed { "suppressed" } else { "required" }
        );

        Ok(AccessDecision {
            suppressed,
            access_specifier,
            entity: reference.entity,
        })
    }

    /// Decisions for every name reference of the declaration, in build order.
    pub fn decide_all(&self) -> Result<Vec<(NameRefId, AccessDecision)>, MisclassifiedSyntax> {
        self.declaration
            .name_refs()
            .iter()
            .map(|name_ref| Ok((name_ref.id, self.try_decide(name_ref.id)?)))
            .collect()
    }

    /// The suppression table. `head_argument` is the outermost specialization head argument
    /// containing the name, if any.
    fn is_suppressed(&self, position: PositionCategory, head_argument: Option<ExprId>) -> bool {
        match (self.specialization_kind, position) {
            (
                SpecializationKind::PartialSpecialization,
                PositionCategory::TemplateArgumentOfSpecializationHead,
            ) => !self.is_dependent(head_argument),
            (SpecializationKind::PartialSpecialization, _) => false,
            (
                SpecializationKind::ExplicitSpecialization
                | SpecializationKind::ExplicitInstantiation
                | SpecializationKind::MemberSpecializationOfClassTemplate,
                position,
            ) => !position.is_checked_in_explicit_specialization(),
            // `void X<Y>::f() {}` defining a member of the explicit specialization `X<Y>`.
            (
                SpecializationKind::Ordinary,
                PositionCategory::TemplateArgumentOfSpecializationHead,
            ) => {
                head_argument.is_some_and(|argument| self.qualifier_arguments.contains(&argument))
                    && !self.is_dependent(head_argument)
            }
            (SpecializationKind::Ordinary, _) => false,
        }
    }

    fn is_dependent(&self, head_argument: Option<ExprId>) -> bool {
        head_argument.is_some_and(|argument| {
            DependenceAnalyzer::new(self.declaration, self.entities)
                .is_dependent(argument, &self.template_params)
        })
    }
}
