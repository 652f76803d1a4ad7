use std::fmt::Display;

use cxx_ast::{Declaration, DeclaredEntityKind, NameRefId, Region, RegionId, RegionKind};
use log::trace;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::MisclassifiedSyntax;

/// Where inside its declaration a name reference occurs. Exactly one category applies to every
/// name reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum PositionCategory {
    TemplateArgumentOfSpecializationHead,
    FunctionBody,
    DefaultArgument,
    BaseClause,
    MemberSpecification,
    EnumeratorList,
    StaticInitializer,
    Other,
}

impl PositionCategory {
    /// The positions in which names of explicit instantiations and specializations are still
    /// access checked.
    pub fn is_checked_in_explicit_specialization(self) -> bool {
        matches!(
            self,
            PositionCategory::FunctionBody
                | PositionCategory::DefaultArgument
                | PositionCategory::BaseClause
                | PositionCategory::MemberSpecification
                | PositionCategory::EnumeratorList
                | PositionCategory::StaticInitializer
        )
    }
}

impl Display for PositionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PositionCategory::TemplateArgumentOfSpecializationHead => {
                write!(f, "template argument of specialization head")
            }
            PositionCategory::FunctionBody => write!(f, "function body"),
            PositionCategory::DefaultArgument => write!(f, "default argument"),
            PositionCategory::BaseClause => write!(f, "base clause"),
            PositionCategory::MemberSpecification => write!(f, "member specification"),
            PositionCategory::EnumeratorList => write!(f, "enumerator list"),
            PositionCategory::StaticInitializer => write!(f, "static initializer"),
            PositionCategory::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NamePositionClassifier;

impl NamePositionClassifier {
    pub fn new() -> Self {
        NamePositionClassifier
    }

    /// Walks the region ancestry of `name_ref` innermost first and returns the first region that
    /// decides a category.
    pub fn classify_position(
        &self,
        name_ref: NameRefId,
        declaration: &Declaration,
    ) -> Result<PositionCategory, MisclassifiedSyntax> {
        let reference = declaration
            .name_ref(name_ref)
            .ok_or(MisclassifiedSyntax::UnknownNameRef(name_ref, declaration.id()))?;

        let category = self.category_at(name_ref, reference.region, declaration)?;

        if reference.is_template_argument_expression()
            && category != PositionCategory::TemplateArgumentOfSpecializationHead
        {
            return Err(MisclassifiedSyntax::HeadArgumentOutsideHead { name_ref, category });
        }

        Ok(category)
    }

    /// The first deciding region from `region` outwards, [`PositionCategory::Other`] once the
    /// root is reached.
    fn category_at(
        &self,
        name_ref: NameRefId,
        region: RegionId,
        declaration: &Declaration,
    ) -> Result<PositionCategory, MisclassifiedSyntax> {
        for current in declaration.region_ancestry(region) {
            trace!("{name_ref:?}: visiting {:?} region {:?}", current.kind, current.id);

            if current.parent.is_none() {
                if current.id == declaration.root_region() {
                    return Ok(PositionCategory::Other);
                }
                break;
            }

            if let Some(category) = self.category_of(current, declaration) {
                return Ok(category);
            }
        }

        Err(MisclassifiedSyntax::DetachedRegion {
            decl: declaration.id(),
            name_ref,
            region,
        })
    }

    /// `None` for regions that are transparent to classification.
    fn category_of(&self, region: &Region, declaration: &Declaration) -> Option<PositionCategory> {
        match region.kind {
            RegionKind::FunctionBody => Some(PositionCategory::FunctionBody),
            RegionKind::DefaultArgument => Some(PositionCategory::DefaultArgument),
            RegionKind::BaseClause => Some(PositionCategory::BaseClause),
            RegionKind::MemberSpecification => Some(PositionCategory::MemberSpecification),
            RegionKind::EnumeratorList => Some(PositionCategory::EnumeratorList),
            RegionKind::Initializer
                if region.parent == Some(declaration.root_region())
                    && declares_static_storage(declaration) =>
            {
                Some(PositionCategory::StaticInitializer)
            }
            RegionKind::TemplateArguments if declaration.is_specialization_head(region.id) => {
                Some(PositionCategory::TemplateArgumentOfSpecializationHead)
            }
            RegionKind::Declaration
            | RegionKind::TemplateParameters
            | RegionKind::DeclSpecifiers
            | RegionKind::DeclaratorId
            | RegionKind::TemplateArguments
            | RegionKind::Parameters
            | RegionKind::Initializer
            | RegionKind::AliasTarget => None,
        }
    }
}

/// Static data members and namespace scope variables, including variable templates and their
/// specializations.
fn declares_static_storage(declaration: &Declaration) -> bool {
    matches!(
        declaration.entity_kind(),
        DeclaredEntityKind::StaticDataMember | DeclaredEntityKind::Variable
    )
}
