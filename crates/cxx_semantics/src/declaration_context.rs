use std::fmt::Display;

use cxx_ast::{Declaration, DeclaredEntityKind, EntityTable, ExprId, ExprKind, TemplateHeader};
use log::debug;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::dependence::{DependenceAnalyzer, TemplateParamSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SpecializationKind {
    Ordinary,
    PartialSpecialization,
    ExplicitSpecialization,
    ExplicitInstantiation,
    /// A member of a class template specialization declared outside of it, e.g.
    /// `template<> struct X<Y>::Member {}` or `template<> void X<Y>::f()`.
    MemberSpecializationOfClassTemplate,
}

impl Display for SpecializationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SpecializationKind::Ordinary => write!(f, "ordinary"),
            SpecializationKind::PartialSpecialization => write!(f, "partial specialization"),
            SpecializationKind::ExplicitSpecialization => write!(f, "explicit specialization"),
            SpecializationKind::ExplicitInstantiation => write!(f, "explicit instantiation"),
            SpecializationKind::MemberSpecializationOfClassTemplate => {
                write!(f, "member specialization of class template")
            }
        }
    }
}

/// The shape of a declared name: its last component and the template-ids among its qualifiers.
struct DeclaredName {
    is_template_id: bool,
    qualifier_template_ids: Vec<ExprId>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationContextClassifier;

impl DeclarationContextClassifier {
    pub fn new() -> Self {
        DeclarationContextClassifier
    }

    pub fn classify(
        &self,
        declaration: &Declaration,
        entities: &EntityTable,
    ) -> SpecializationKind {
        let declared_name = self.declared_name(declaration);
        let dependence = DependenceAnalyzer::new(declaration, entities);
        let params = dependence.enclosing_template_parameters();

        let kind = match declaration.header() {
            TemplateHeader::Instantiation => SpecializationKind::ExplicitInstantiation,
            TemplateHeader::Specialization => {
                if declared_name.is_template_id {
                    SpecializationKind::ExplicitSpecialization
                } else if !declared_name.qualifier_template_ids.is_empty() {
                    SpecializationKind::MemberSpecializationOfClassTemplate
                } else {
                    // `template<> void f(int)`, arguments deduced from the signature.
                    SpecializationKind::ExplicitSpecialization
                }
            }
            TemplateHeader::Parameters => {
                if declared_name.is_template_id
                    && declaration.entity_kind() != DeclaredEntityKind::TypeAlias
                {
                    SpecializationKind::PartialSpecialization
                } else if self.names_specialized_class(&declared_name, &dependence, &params) {
                    SpecializationKind::MemberSpecializationOfClassTemplate
                } else {
                    SpecializationKind::Ordinary
                }
            }
            // `void X<Y>::f() {}` is ordinary, only the arguments of `X<Y>` are exempt.
            TemplateHeader::None => SpecializationKind::Ordinary,
        };

        debug!(
            "Declaration {:?} with {:?} header classified as {kind}",
            declaration.id(),
            declaration.header()
        );
        kind
    }

    /// Whether a qualifier of the declared name is a template-id with concrete arguments, i.e.
    /// the declaration defines a member of an already specialized class template.
    fn names_specialized_class(
        &self,
        declared_name: &DeclaredName,
        dependence: &DependenceAnalyzer,
        params: &TemplateParamSet,
    ) -> bool {
        declared_name
            .qualifier_template_ids
            .iter()
            .any(|template_id| !dependence.is_dependent(*template_id, params))
    }

    /// The template arguments of the template-ids qualifying the declared name, e.g. `Y` in
    /// `X<Y>::f`.
    pub fn qualifier_arguments(&self, declaration: &Declaration) -> Vec<ExprId> {
        self.declared_name(declaration)
            .qualifier_template_ids
            .iter()
            .filter_map(|template_id| {
                match declaration.expr(*template_id).map(|expr| &expr.kind) {
                    Some(ExprKind::TemplateId { args, .. }) => Some(args.iter().copied()),
                    _ => None,
                }
            })
            .flatten()
            .collect()
    }

    fn declared_name(&self, declaration: &Declaration) -> DeclaredName {
        let mut declared_name = DeclaredName {
            is_template_id: false,
            qualifier_template_ids: vec![],
        };

        let Some(declarator) = declaration.declarator() else {
            return declared_name;
        };

        match declaration.expr(declarator).map(|expr| &expr.kind) {
            Some(ExprKind::TemplateId { template, .. }) => {
                declared_name.is_template_id = true;
                collect_qualifier_template_ids(declaration, *template, &mut declared_name);
            }
            Some(ExprKind::Qualified { qualifier, .. }) => {
                collect_qualifier_template_ids(declaration, *qualifier, &mut declared_name);
            }
            _ => {}
        }

        declared_name
    }
}

/// Collects the template-ids along a nested-name-specifier, e.g. `X<A>` and `Y<B>` in
/// `X<A>::Y<B>::`.
fn collect_qualifier_template_ids(
    declaration: &Declaration,
    qualifier: ExprId,
    declared_name: &mut DeclaredName,
) {
    match declaration.expr(qualifier).map(|expr| &expr.kind) {
        Some(ExprKind::TemplateId { template, .. }) => {
            declared_name.qualifier_template_ids.push(qualifier);
            collect_qualifier_template_ids(declaration, *template, declared_name);
        }
        Some(ExprKind::Qualified { qualifier, .. }) => {
            collect_qualifier_template_ids(declaration, *qualifier, declared_name);
        }
        _ => {}
    }
}
