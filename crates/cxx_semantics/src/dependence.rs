use std::collections::HashSet;

use cxx_ast::{Declaration, EntityId, EntityTable, ExprId, ExprKind, TemplateParamId};
use log::trace;

pub type TemplateParamSet = HashSet<TemplateParamId>;

/// Decides whether an expression or type-id depends on template parameters.
///
/// The verdict is a pure function of the declaration arena, the entity table and the parameter
/// set, so asking twice about the same expression always yields the same answer.
pub struct DependenceAnalyzer<'a> {
    declaration: &'a Declaration,
    entities: &'a EntityTable,
}

impl<'a> DependenceAnalyzer<'a> {
    pub fn new(declaration: &'a Declaration, entities: &'a EntityTable) -> Self {
        DependenceAnalyzer {
            declaration,
            entities,
        }
    }

    /// The parameters introduced by the declaration's own `template<...>` header.
    pub fn enclosing_template_parameters(&self) -> TemplateParamSet {
        self.declaration
            .template_params()
            .iter()
            .map(|param| param.id)
            .collect()
    }

    pub fn is_dependent(&self, expr: ExprId, params: &TemplateParamSet) -> bool {
        if params.is_empty() {
            return false;
        }

        let Some(node) = self.declaration.expr(expr) else {
            return false;
        };

        let dependent = match &node.kind {
            ExprKind::TemplateParam(param) => params.contains(param),
            ExprKind::Name(_) | ExprKind::Builtin(_) | ExprKind::Literal(_) => false,
            // `T::Member` and `typename T::type` depend on `T`. The member name itself was
            // resolved by lookup and cannot introduce dependence on its own.
            ExprKind::Qualified { qualifier, .. } => self.is_dependent(*qualifier, params),
            ExprKind::TemplateId { template, args, .. } => {
                self.is_dependent(*template, params)
                    || args.iter().any(|arg| self.is_dependent(*arg, params))
            }
            ExprKind::AddressOf {
                operand,
                target_type,
            } => {
                self.is_dependent(*operand, params)
                    || self.overload_selection_is_dependent(*operand, *target_type, params)
            }
            ExprKind::PointerToMember { class, pointee } => {
                self.is_dependent(*class, params) || self.is_dependent(*pointee, params)
            }
            ExprKind::Composite(parts) => parts.iter().any(|part| self.is_dependent(*part, params)),
        };

        trace!("Expression {expr:?} is dependent: {dependent}");
        dependent
    }

    /// `&Class::member` where `member` names an overload set is resolved against the parameter
    /// type it converts to; if that type is dependent the chosen overload is too.
    fn overload_selection_is_dependent(
        &self,
        operand: ExprId,
        target_type: Option<ExprId>,
        params: &TemplateParamSet,
    ) -> bool {
        let Some(target_type) = target_type else {
            return false;
        };
        let Some(member) = self.named_entity(operand) else {
            return false;
        };

        self.entities.is_overloaded(member) && self.is_dependent(target_type, params)
    }

    fn named_entity(&self, expr: ExprId) -> Option<EntityId> {
        match &self.declaration.expr(expr)?.kind {
            ExprKind::Name(name_ref) => self
                .declaration
                .name_ref(*name_ref)
                .map(|name_ref| name_ref.entity),
            ExprKind::Qualified { name, .. } => self.named_entity(*name),
            _ => None,
        }
    }
}
