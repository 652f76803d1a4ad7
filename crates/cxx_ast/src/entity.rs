use std::fmt::Display;

use cxx_span::Span;
use cxx_span::id::{Id, IdAllocator};
use log::debug;
#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct EntityIdTag;

pub type EntityId = Id<EntityIdTag>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum AccessSpecifier {
    #[default]
    Public,
    Protected,
    Private,
}

impl Display for AccessSpecifier {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AccessSpecifier::Public => write!(f, "public"),
            AccessSpecifier::Protected => write!(f, "protected"),
            AccessSpecifier::Private => write!(f, "private"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum EntityKind {
    Namespace,
    Class,
    ClassTemplate,
    /// An explicit or partial specialization of a class template, e.g. `X<Y::Z>`.
    ClassSpecialization,
    Function,
    FunctionTemplate,
    Field,
    StaticDataMember,
    Variable,
    VariableTemplate,
    TypeAlias,
    Enum,
    Enumerator,
}

impl EntityKind {
    pub fn is_class(self) -> bool {
        matches!(
            self,
            EntityKind::Class | EntityKind::ClassTemplate | EntityKind::ClassSpecialization
        )
    }

    pub fn is_function(self) -> bool {
        matches!(self, EntityKind::Function | EntityKind::FunctionTemplate)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EntityKind::Namespace => write!(f, "namespace"),
            EntityKind::Class => write!(f, "class"),
            EntityKind::ClassTemplate => write!(f, "class template"),
            EntityKind::ClassSpecialization => write!(f, "class template specialization"),
            EntityKind::Function => write!(f, "function"),
            EntityKind::FunctionTemplate => write!(f, "function template"),
            EntityKind::Field => write!(f, "field"),
            EntityKind::StaticDataMember => write!(f, "static data member"),
            EntityKind::Variable => write!(f, "variable"),
            EntityKind::VariableTemplate => write!(f, "variable template"),
            EntityKind::TypeAlias => write!(f, "type alias"),
            EntityKind::Enum => write!(f, "enum"),
            EntityKind::Enumerator => write!(f, "enumerator"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Entity {
    pub id: EntityId,
    pub name: Box<str>,
    pub kind: EntityKind,
    /// The enclosing namespace or class, `None` for the global namespace.
    pub parent: Option<EntityId>,
    pub access: AccessSpecifier,
    pub declared_at: Span,
    /// Where the access specifier in effect for this member was written. For members relying on
    /// the default access of their class this is the member declaration itself.
    pub access_declared_at: Span,
    pub bases: Vec<EntityId>,
    pub friends: Vec<EntityId>,
    /// The entity named by a type alias, e.g. `A` in `using T = A;`.
    pub aliased: Option<EntityId>,
}

/// Every entity of a translation unit known to name lookup. Owned by the elaborator, name
/// references only ever hold an [`EntityId`] into it.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EntityTable {
    entities: Vec<Entity>,
    #[cfg_attr(feature = "serde", serde(skip))]
    id_allocator: IdAllocator<EntityIdTag>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        parent: Option<EntityId>,
        name: &str,
        kind: EntityKind,
        access: AccessSpecifier,
        declared_at: Span,
    ) -> EntityId {
        let id = self.id_allocator.next_id();
        debug_assert_eq!(id.index(), self.entities.len());
        debug!("Declaring {kind} `{name}` as {id:?} ({access})");

        self.entities.push(Entity {
            id,
            name: name.into(),
            kind,
            parent,
            access,
            declared_at,
            access_declared_at: declared_at,
            bases: Vec::new(),
            friends: Vec::new(),
            aliased: None,
        });

        id
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.index())
    }

    /// First entity called `name` declared directly in `scope`.
    pub fn lookup(&self, scope: Option<EntityId>, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|entity| entity.parent == scope && &*entity.name == name)
            .map(|entity| entity.id)
    }

    pub fn set_access_declared_at(&mut self, id: EntityId, span: Span) {
        if let Some(entity) = self.get_mut(id) {
            entity.access_declared_at = span;
        }
    }

    pub fn add_base(&mut self, class: EntityId, base: EntityId) {
        if let Some(entity) = self.get_mut(class) {
            entity.bases.push(base);
        }
    }

    pub fn add_friend(&mut self, class: EntityId, friend: EntityId) {
        if let Some(entity) = self.get_mut(class) {
            entity.friends.push(friend);
        }
    }

    pub fn set_aliased(&mut self, alias: EntityId, target: EntityId) {
        if let Some(entity) = self.get_mut(alias) {
            entity.aliased = Some(target);
        }
    }

    /// Follows type aliases to the entity they ultimately name.
    pub fn resolve_alias(&self, id: EntityId) -> EntityId {
        let mut current = id;
        // Bounded by the table size, alias cycles are rejected upstream.
        for _ in 0..self.entities.len() {
            match self.get(current).and_then(|entity| entity.aliased) {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }

    /// The class declaring `id`, if `id` is a class member.
    pub fn enclosing_class(&self, id: EntityId) -> Option<EntityId> {
        let parent = self.get(id)?.parent?;
        self.get(parent)
            .filter(|entity| entity.kind.is_class())
            .map(|entity| entity.id)
    }

    /// Walks from `id` outwards through its enclosing scopes, `id` included.
    pub fn scope_chain(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        std::iter::successors(Some(id), move |current| {
            self.get(*current).and_then(|entity| entity.parent)
        })
    }

    pub fn is_within(&self, id: EntityId, scope: EntityId) -> bool {
        self.scope_chain(id).any(|current| current == scope)
    }

    pub fn is_derived_from(&self, class: EntityId, base: EntityId) -> bool {
        let mut pending = vec![class];
        let mut visited = Vec::new();

        while let Some(current) = pending.pop() {
            if visited.contains(&current) {
                continue;
            }
            visited.push(current);

            let Some(entity) = self.get(current) else {
                continue;
            };
            for direct_base in &entity.bases {
                if self.resolve_alias(*direct_base) == base {
                    return true;
                }
                pending.push(self.resolve_alias(*direct_base));
            }
        }

        false
    }

    /// All functions sharing the name and scope of `id`, `id` included.
    pub fn overloads(&self, id: EntityId) -> Vec<EntityId> {
        let Some(entity) = self.get(id) else {
            return vec![];
        };
        if !entity.kind.is_function() {
            return vec![id];
        }

        self.entities
            .iter()
            .filter(|candidate| {
                candidate.kind.is_function()
                    && candidate.parent == entity.parent
                    && candidate.name == entity.name
            })
            .map(|candidate| candidate.id)
            .collect()
    }

    pub fn is_overloaded(&self, id: EntityId) -> bool {
        self.overloads(id).len() > 1
    }

    /// `outer::inner::name`, skipping the global namespace.
    pub fn qualified_name(&self, id: EntityId) -> String {
        let mut parts = self
            .scope_chain(id)
            .filter_map(|current| self.get(current))
            .map(|entity| entity.name.as_ref())
            .collect::<Vec<_>>();
        parts.reverse();
        parts.join("::")
    }
}
