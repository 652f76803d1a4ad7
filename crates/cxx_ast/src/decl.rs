use cxx_span::id::{Id, IdAllocator};
use cxx_span::{LineColumn, Span};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::entity::EntityId;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct DeclIdTag;
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct RegionIdTag;
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct ExprIdTag;
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct NameRefIdTag;
#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct TemplateParamIdTag;

pub type DeclId = Id<DeclIdTag>;
pub type RegionId = Id<RegionIdTag>;
pub type ExprId = Id<ExprIdTag>;
pub type NameRefId = Id<NameRefIdTag>;
pub type TemplateParamId = Id<TemplateParamIdTag>;

/// What precedes the declaration: nothing, `template<...>`, `template<>` or a bare `template`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TemplateHeader {
    #[default]
    None,
    Parameters,
    Specialization,
    Instantiation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum TemplateParamKind {
    Type,
    NonType,
    Template,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TemplateParam {
    pub id: TemplateParamId,
    pub name: Box<str>,
    pub kind: TemplateParamKind,
    pub span: Span,
}

/// The kind of entity a declaration introduces (or names, for explicit instantiations).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum DeclaredEntityKind {
    Class,
    Function,
    Variable,
    StaticDataMember,
    Enum,
    TypeAlias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum RegionKind {
    /// The whole declaration, root of every region tree.
    Declaration,
    TemplateParameters,
    /// Type specifiers in front of the declarator, including return types.
    DeclSpecifiers,
    /// The (possibly qualified) name being declared.
    DeclaratorId,
    /// The `<...>` argument list of a template-id.
    TemplateArguments,
    Parameters,
    DefaultArgument,
    FunctionBody,
    BaseClause,
    MemberSpecification,
    EnumeratorList,
    Initializer,
    /// The type on the right hand side of an alias declaration.
    AliasTarget,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Region {
    pub id: RegionId,
    pub kind: RegionKind,
    pub parent: Option<RegionId>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ExprKind {
    Name(NameRefId),
    TemplateParam(TemplateParamId),
    /// `qualifier::name`
    Qualified { qualifier: ExprId, name: ExprId },
    /// `template<args...>`
    TemplateId {
        template: ExprId,
        args: Vec<ExprId>,
        args_region: RegionId,
    },
    /// `&operand`, `target_type` is the parameter type the address converts to when the
    /// operand names an overload set.
    AddressOf {
        operand: ExprId,
        target_type: Option<ExprId>,
    },
    /// `pointee class::*`
    PointerToMember { class: ExprId, pointee: ExprId },
    /// Any other compound type or expression, e.g. a function type `void (A::*)(int)`.
    Composite(Vec<ExprId>),
    Builtin(Box<str>),
    Literal(Box<str>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
    pub span: Span,
    pub region: RegionId,
    pub parent: Option<ExprId>,
}

impl ExprKind {
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Name(_)
            | ExprKind::TemplateParam(_)
            | ExprKind::Builtin(_)
            | ExprKind::Literal(_) => vec![],
            ExprKind::Qualified { qualifier, name } => vec![*qualifier, *name],
            ExprKind::TemplateId { template, args, .. } => {
                std::iter::once(*template).chain(args.iter().copied()).collect()
            }
            ExprKind::AddressOf {
                operand,
                target_type,
            } => std::iter::once(*operand).chain(*target_type).collect(),
            ExprKind::PointerToMember { class, pointee } => vec![*class, *pointee],
            ExprKind::Composite(parts) => parts.clone(),
        }
    }
}

/// One occurrence of a name resolved by lookup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NameRef {
    pub id: NameRefId,
    pub decl: DeclId,
    pub name: Box<str>,
    pub entity: EntityId,
    pub expr: ExprId,
    pub region: RegionId,
    pub span: Span,
    /// The outermost template argument of the specialization head containing this name.
    pub template_argument: Option<ExprId>,
}

impl NameRef {
    pub fn is_template_argument_expression(&self) -> bool {
        self.template_argument.is_some()
    }
}

/// Arena for one source declaration: its regions, expressions, name references and template
/// parameters. Freed in bulk once the declaration has been analyzed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Declaration {
    id: DeclId,
    header: TemplateHeader,
    entity_kind: DeclaredEntityKind,
    template_params: Vec<TemplateParam>,
    regions: Vec<Region>,
    exprs: Vec<Expr>,
    names: Vec<NameRef>,
    declarator: Option<ExprId>,
    access_context: Option<EntityId>,
}

impl Declaration {
    pub fn id(&self) -> DeclId {
        self.id
    }

    pub fn header(&self) -> TemplateHeader {
        self.header
    }

    pub fn entity_kind(&self) -> DeclaredEntityKind {
        self.entity_kind
    }

    pub fn template_params(&self) -> &[TemplateParam] {
        &self.template_params
    }

    pub fn declarator(&self) -> Option<ExprId> {
        self.declarator
    }

    /// The class whose scope the declared entity belongs to, `None` at namespace scope.
    pub fn access_context(&self) -> Option<EntityId> {
        self.access_context
    }

    pub fn root_region(&self) -> RegionId {
        self.regions[0].id
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    pub fn expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    pub fn name_ref(&self, id: NameRefId) -> Option<&NameRef> {
        self.names.get(id.index())
    }

    /// Name references in the order the elaborator built them.
    pub fn name_refs(&self) -> &[NameRef] {
        &self.names
    }

    pub fn find_name_refs<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a NameRef> + 'a {
        self.names.iter().filter(move |name_ref| &*name_ref.name == name)
    }

    /// Walks from `region` outwards to the root, `region` included. Stops early on a dangling
    /// parent link.
    pub fn region_ancestry(&self, region: RegionId) -> impl Iterator<Item = &Region> + '_ {
        std::iter::successors(self.region(region), move |current| {
            current.parent.and_then(|parent| self.region(parent))
        })
        .take(self.regions.len())
    }

    /// The `DeclaratorId` region directly below the root.
    pub fn declarator_region(&self) -> Option<&Region> {
        let root = self.root_region();
        self.regions
            .iter()
            .find(|region| region.kind == RegionKind::DeclaratorId && region.parent == Some(root))
    }

    /// Whether `region` is the argument list of a template-id spelled in the declared name,
    /// i.e. `<...>` in `X<...>` or `X<...>::member`.
    pub fn is_specialization_head(&self, region: RegionId) -> bool {
        let Some(region) = self.region(region) else {
            return false;
        };
        let Some(declarator) = self.declarator_region() else {
            return false;
        };
        region.kind == RegionKind::TemplateArguments && region.parent == Some(declarator.id)
    }

    /// The outermost template argument of a specialization head that contains `expr`.
    fn head_argument_of(&self, expr: ExprId) -> Option<ExprId> {
        let mut head_argument = None;
        let mut current = expr;

        while let Some(parent) = self.expr(current).and_then(|expr| expr.parent) {
            if let Some(Expr {
                kind: ExprKind::TemplateId {
                    args, args_region, ..
                },
                ..
            }) = self.expr(parent)
                && args.contains(&current)
                && self.is_specialization_head(*args_region)
            {
                head_argument = Some(current);
            }
            current = parent;
        }

        head_argument
    }
}

/// Builds a [`Declaration`] region by region. Regions opened with [`enter`] nest inside the
/// region currently open; expressions and names are placed in the innermost open region.
///
/// [`enter`]: DeclarationBuilder::enter
pub struct DeclarationBuilder {
    decl: Declaration,
    region_stack: Vec<RegionId>,
    region_ids: IdAllocator<RegionIdTag>,
    expr_ids: IdAllocator<ExprIdTag>,
    name_ids: IdAllocator<NameRefIdTag>,
    param_ids: IdAllocator<TemplateParamIdTag>,
}

impl DeclarationBuilder {
    pub fn new(id: DeclId, entity_kind: DeclaredEntityKind) -> Self {
        let mut region_ids = IdAllocator::new();
        let root = region_ids.next_id();

        DeclarationBuilder {
            decl: Declaration {
                id,
                header: TemplateHeader::None,
                entity_kind,
                template_params: vec![],
                regions: vec![Region {
                    id: root,
                    kind: RegionKind::Declaration,
                    parent: None,
                }],
                exprs: vec![],
                names: vec![],
                declarator: None,
                access_context: None,
            },
            region_stack: vec![root],
            region_ids,
            expr_ids: IdAllocator::new(),
            name_ids: IdAllocator::new(),
            param_ids: IdAllocator::new(),
        }
    }

    pub fn template_header(&mut self, header: TemplateHeader) -> &mut Self {
        self.decl.header = header;
        self
    }

    pub fn access_context(&mut self, context: Option<EntityId>) -> &mut Self {
        self.decl.access_context = context;
        self
    }

    /// Declares a parameter of the `template<...>` header, switching the header to
    /// [`TemplateHeader::Parameters`].
    pub fn template_param(
        &mut self,
        name: &str,
        kind: TemplateParamKind,
        start: LineColumn,
    ) -> TemplateParamId {
        let id = self.param_ids.next_id();
        self.decl.header = TemplateHeader::Parameters;
        self.decl.template_params.push(TemplateParam {
            id,
            name: name.into(),
            kind,
            span: span_of(start, name),
        });
        id
    }

    fn current_region(&self) -> RegionId {
        *self
            .region_stack
            .last()
            .expect("Root region is never left")
    }

    pub fn enter(&mut self, kind: RegionKind) -> RegionId {
        let id = self.region_ids.next_id();
        trace!("Entering {kind:?} region {id:?}");

        self.decl.regions.push(Region {
            id,
            kind,
            parent: Some(self.current_region()),
        });
        self.region_stack.push(id);
        id
    }

    /// # Panics
    ///
    /// When called without a matching [`enter`](DeclarationBuilder::enter).
    pub fn leave(&mut self) -> RegionId {
        assert!(self.region_stack.len() > 1, "Cannot leave the declaration root region");
        let id = self.region_stack.pop().expect("Region stack is not empty");
        trace!("Leaving region {id:?}");
        id
    }

    pub fn region<R>(&mut self, kind: RegionKind, build: impl FnOnce(&mut Self) -> R) -> R {
        self.enter(kind);
        let result = build(self);
        self.leave();
        result
    }

    /// Builds the declared name inside the top-level `DeclaratorId` region.
    pub fn declarator(&mut self, build: impl FnOnce(&mut Self) -> ExprId) -> ExprId {
        debug_assert_eq!(
            self.region_stack.len(),
            1,
            "The declarator belongs to the root region"
        );
        let declarator = self.region(RegionKind::DeclaratorId, build);
        self.decl.declarator = Some(declarator);
        declarator
    }

    fn push_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = self.expr_ids.next_id();
        for child in kind.children() {
            if let Some(child) = self.decl.exprs.get_mut(child.index()) {
                debug_assert!(child.parent.is_none(), "Expression {:?} reused", child.id);
                child.parent = Some(id);
            }
        }

        self.decl.exprs.push(Expr {
            id,
            kind,
            span,
            region: self.current_region(),
            parent: None,
        });
        id
    }

    fn span(&self, id: ExprId) -> Span {
        self.decl
            .expr(id)
            .map(|expr| expr.span)
            .unwrap_or_default()
    }

    /// A name resolved to `entity`, starting at `start`.
    pub fn name(&mut self, name: &str, entity: EntityId, start: LineColumn) -> ExprId {
        let name_id = self.name_ids.next_id();
        let span = span_of(start, name);
        let expr = self.push_expr(ExprKind::Name(name_id), span);

        self.decl.names.push(NameRef {
            id: name_id,
            decl: self.decl.id,
            name: name.into(),
            entity,
            expr,
            region: self.current_region(),
            span,
            template_argument: None,
        });
        expr
    }

    /// A use of a template parameter of this declaration.
    pub fn param(&mut self, param: TemplateParamId, start: LineColumn) -> ExprId {
        let len = self
            .decl
            .template_params
            .iter()
            .find(|candidate| candidate.id == param)
            .map_or(1, |param| param.name.len());
        let span = Span::new(start, LineColumn::new(start.line, start.column + len as u32));
        self.push_expr(ExprKind::TemplateParam(param), span)
    }

    pub fn qualified(&mut self, qualifier: ExprId, name: ExprId) -> ExprId {
        let span = self.span(qualifier).merge(&self.span(name));
        self.push_expr(ExprKind::Qualified { qualifier, name }, span)
    }

    /// `template<args...>`, the arguments are built inside a `TemplateArguments` region.
    pub fn template_id(
        &mut self,
        template: ExprId,
        build_args: impl FnOnce(&mut Self) -> Vec<ExprId>,
    ) -> ExprId {
        let args_region = self.enter(RegionKind::TemplateArguments);
        let args = build_args(self);
        self.leave();

        let mut span = self.span(template);
        if let Some(last) = args.last() {
            span = span.merge(&self.span(*last));
        }
        span.end.column += 1;

        self.push_expr(
            ExprKind::TemplateId {
                template,
                args,
                args_region,
            },
            span,
        )
    }

    pub fn address_of(&mut self, operand: ExprId, target_type: Option<ExprId>) -> ExprId {
        let mut span = self.span(operand);
        span.start.column = span.start.column.saturating_sub(1);
        self.push_expr(
            ExprKind::AddressOf {
                operand,
                target_type,
            },
            span,
        )
    }

    pub fn pointer_to_member(&mut self, class: ExprId, pointee: ExprId) -> ExprId {
        let span = self.span(pointee).merge(&self.span(class));
        self.push_expr(ExprKind::PointerToMember { class, pointee }, span)
    }

    pub fn composite(&mut self, parts: Vec<ExprId>) -> ExprId {
        let span = parts
            .iter()
            .map(|part| self.span(*part))
            .reduce(|acc, span| acc.merge(&span))
            .unwrap_or_default();
        self.push_expr(ExprKind::Composite(parts), span)
    }

    pub fn builtin(&mut self, name: &str, start: LineColumn) -> ExprId {
        self.push_expr(ExprKind::Builtin(name.into()), span_of(start, name))
    }

    pub fn literal(&mut self, text: &str, start: LineColumn) -> ExprId {
        self.push_expr(ExprKind::Literal(text.into()), span_of(start, text))
    }

    /// Closes the declaration and links every name of the specialization head to the head
    /// template argument containing it.
    ///
    /// # Panics
    ///
    /// When regions opened with [`enter`](DeclarationBuilder::enter) were not left.
    pub fn finish(self) -> Declaration {
        assert_eq!(
            self.region_stack.len(),
            1,
            "Unbalanced regions in declaration {:?}",
            self.decl.id
        );

        let mut decl = self.decl;
        let head_arguments = decl
            .names
            .iter()
            .map(|name_ref| decl.head_argument_of(name_ref.expr))
            .collect::<Vec<_>>();

        for (name_ref, head_argument) in decl.names.iter_mut().zip(head_arguments) {
            name_ref.template_argument = head_argument;
        }

        debug!(
            "Built declaration {:?}: {} regions, {} expressions, {} names",
            decl.id,
            decl.regions.len(),
            decl.exprs.len(),
            decl.names.len()
        );
        decl
    }
}

fn span_of(start: LineColumn, text: &str) -> Span {
    Span::on_line(start.line, start.column, text.len() as u32)
}
