#![allow(dead_code)]

use cxx_ast::{
    AccessSpecifier, Declaration, DeclarationBuilder, EntityId, EntityKind, EntityTable, ExprId,
    LineColumn, Span,
};
use cxx_semantics::{AccessAnalyzer, Diagnostic};

#[ctor::ctor]
fn before_all() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .is_test(true)
        .try_init();
}

/// Private members of `Vault` used as template arguments of specializations, aliases and variable
/// templates.
pub const VAULT_SOURCE: &str = indoc::indoc! {"
    class Vault {
      void unlock();
      void rotate();
      void rotate(int);
      static void seal();
      static void shuffle();
      static void shuffle(int);
      class Key {};
      int combination;
    };

    template <void (Vault::*)()> class OnMember {};
    template <> class OnMember<&Vault::unlock> {};
    template <> class OnMember<&Vault::rotate> {};
    using unlock_alias = OnMember<&Vault::unlock>;
    using rotate_alias = OnMember<&Vault::rotate>;

    template <void (*)()> class OnFunction {};
    template <> class OnFunction<&Vault::seal> {};
    template <> class OnFunction<&Vault::shuffle> {};
    using seal_alias = OnFunction<&Vault::seal>;

    template <typename T, void (Vault::*)()> class Tagged {};
    template <typename T> class Tagged<T, &Vault::unlock> {};
    template <typename T> class Tagged<T, &Vault::rotate> {};
    template <typename T> using tagged_alias = Tagged<T, &Vault::unlock>;
    using tagged_int_alias = Tagged<int, &Vault::rotate>;
    template <typename T> class Tagged<T, &Vault::unlock> tagged_var {};

    template <typename T> class Boxed {};
    template <> class Boxed<Vault::Key> {};

    template <typename T, typename U> class Pair {};
    template <typename T> class Pair<T, Vault::Key> {};
    template <typename T> class Pair<T, Pair<T, Vault::Key>> {};
    template <typename T> class Pair<T, Vault::Key> pair_var {};

    template <typename T, int Vault::*> class TaggedField {};
    template <typename T> class TaggedField<T, &Vault::combination> {};
    template <typename T> class TaggedField<T, &Vault::combination> field_var {};

    template <class T> struct Traits;
    class Registry {
      template <class U> struct Slot;
    };
    template <class U> struct Traits<Registry::Slot<U>>;
"};

/// Private members named by explicit instantiations, explicit specializations and definitions of
/// members of class template specializations.
pub const SECRETS_SOURCE: &str = indoc::indoc! {"
    class Outer {
      template <typename T> class Inner {};
    };

    class Secrets {
      class Token {};
      class Badge {};
      void ping();
      static void pong();
      int level;
    };

    template class Outer::Inner<Secrets::Token>;
    template <void (Secrets::*)()> class Probe {};
    template class Probe<&Secrets::ping>;
    template <void (*)()> class StaticProbe {};
    template class StaticProbe<&Secrets::pong>;
    template <int Secrets::*> class FieldProbe {};
    template class FieldProbe<&Secrets::level>;
    template <> class Outer::Inner<Secrets::Badge> {};

    namespace members {
      struct Plain { void run(); };
      template <typename T>
      struct Box {
        struct Plain {};
        void put(T);
        void take() {}
        template <typename U> void emit(U);
        enum Mode : int;
        static int count;
      };
      class Hidden {
        using Id = int;
        using Alias = Plain;
        using Base = Plain;
        static const int zero = 0;
      };
      template <> struct Box<Hidden::Id>::Plain {};
      template <> void Box<Hidden::Id>::put(Hidden::Id) {}
      template void Box<Hidden::Id>::take();
      template <> enum Box<Hidden::Id>::Mode : int {};
      template <> int Box<Hidden::Id>::count = 76;
      void Hidden::Alias::run() {}
      template <> void Box<Hidden::Id>::take() { Hidden::Alias a; }
      template <> struct Box<Hidden::Id>::Plain : Hidden::Base {};
      template <> struct Box<Hidden::Id>::Plain { void wait(int = Hidden::zero); };
      template <> enum Box<Hidden::Id>::Mode : int { first = sizeof(Hidden::Id) };
      template <> int Box<Hidden::Id>::count = sizeof(Hidden::Id);
      template <typename U> void Box<Hidden::Id>::emit(U) { Hidden::Alias a; }
    }

    namespace definitions {
      template <typename T> struct Holder;
      class Owner { struct Part {}; };
      template <> struct Holder<Owner::Part> { void f(); int g; Owner::Part* h(Owner::Part); };
      void Holder<Owner::Part>::f() {}
      int Holder<Owner::Part>::* member() { return nullptr; }
      Owner::Part* Holder<Owner::Part>::h(Owner::Part) { return nullptr; }
    }
"};

/// Source text addressed by line markers: a line is identified by any text it contains.
pub struct Source {
    lines: Vec<String>,
}

impl Source {
    pub fn new(text: &str) -> Self {
        Source {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Zero based number of the first line containing `marker`.
    pub fn line(&self, marker: &str) -> u32 {
        self.lines
            .iter()
            .position(|line| line.contains(marker))
            .unwrap_or_else(|| panic!("No line contains `{marker}`")) as u32
    }

    /// Position of `token` inside the first occurrence of `pattern` on the line containing
    /// `marker`.
    pub fn find(&self, marker: &str, pattern: &str, token: &str) -> LineColumn {
        let line = self.line(marker);
        let text = &self.lines[line as usize];
        let pattern_start = text
            .find(pattern)
            .unwrap_or_else(|| panic!("`{pattern}` does not occur in `{text}`"));
        let token_offset = pattern
            .find(token)
            .unwrap_or_else(|| panic!("`{token}` does not occur in `{pattern}`"));
        LineColumn::new(line, (pattern_start + token_offset) as u32)
    }

    pub fn at(&self, marker: &str, token: &str) -> LineColumn {
        self.find(marker, token, token)
    }

    pub fn span(&self, marker: &str, token: &str) -> Span {
        let start = self.at(marker, token);
        Span::on_line(start.line, start.column, token.len() as u32)
    }
}

/// Entities declared in a [`Source`], and helpers building name references into it.
pub struct World {
    pub source: Source,
    pub entities: EntityTable,
}

impl World {
    pub fn new(text: &str) -> Self {
        World {
            source: Source::new(text),
            entities: EntityTable::new(),
        }
    }

    /// Declares `name` at its first occurrence on the line containing `marker`.
    pub fn declare(
        &mut self,
        parent: Option<EntityId>,
        name: &str,
        kind: EntityKind,
        access: AccessSpecifier,
        marker: &str,
    ) -> EntityId {
        let span = self.source.span(marker, name);
        self.entities.declare(parent, name, kind, access, span)
    }

    /// Resolves `A::B::c` component by component starting at the global namespace.
    pub fn entity(&self, qualified: &str) -> EntityId {
        self.components(qualified)
            .last()
            .map(|(_, entity)| *entity)
            .unwrap_or_else(|| panic!("Empty name `{qualified}`"))
    }

    pub fn components<'a>(&self, qualified: &'a str) -> Vec<(&'a str, EntityId)> {
        let mut scope = None;
        qualified
            .split("::")
            .map(|component| {
                let entity = self
                    .entities
                    .lookup(scope, component)
                    .unwrap_or_else(|| panic!("`{component}` of `{qualified}` is not declared"));
                scope = Some(entity);
                (component, entity)
            })
            .collect()
    }

    /// Like [`World::entity`], but starting in `scope`.
    pub fn entity_in(&self, scope: &str, qualified: &str) -> EntityId {
        self.entity(&format!("{scope}::{qualified}"))
    }

    /// `A::B::c` with every component resolved, starting at `start`.
    pub fn path_at(
        &self,
        b: &mut DeclarationBuilder,
        start: LineColumn,
        components: &[(&str, EntityId)],
    ) -> ExprId {
        let mut column = start.column;
        let mut path = None;

        for &(name, entity) in components {
            let component = b.name(name, entity, LineColumn::new(start.line, column));
            column += name.len() as u32 + 2;
            path = Some(match path {
                Some(qualifier) => b.qualified(qualifier, component),
                None => component,
            });
        }

        path.expect("A path has at least one component")
    }

    /// The first occurrence of `qualified` on the line containing `marker`, resolved from the
    /// global namespace.
    pub fn path(&self, b: &mut DeclarationBuilder, marker: &str, qualified: &str) -> ExprId {
        let start = self.source.at(marker, qualified);
        self.path_at(b, start, &self.components(qualified))
    }

    /// Like [`World::path`], resolving `qualified` inside `scope` while spelling it unqualified.
    pub fn path_in(
        &self,
        b: &mut DeclarationBuilder,
        marker: &str,
        scope: &str,
        qualified: &str,
    ) -> ExprId {
        let start = self.source.at(marker, qualified);
        let resolved = format!("{scope}::{qualified}");
        let components = self.components(&resolved);
        let spelled = qualified.split("::").count();
        self.path_at(b, start, &components[components.len() - spelled..])
    }

    /// `&A::b` on the line containing `marker`.
    pub fn address_of(
        &self,
        b: &mut DeclarationBuilder,
        marker: &str,
        qualified: &str,
    ) -> ExprId {
        let ampersand = self.source.at(marker, &format!("&{qualified}"));
        let start = LineColumn::new(ampersand.line, ampersand.column + 1);
        let path = self.path_at(b, start, &self.components(qualified));
        b.address_of(path, None)
    }
}

pub fn vault() -> World {
    use AccessSpecifier::*;
    use EntityKind::*;

    let mut world = World::new(VAULT_SOURCE);
    let vault = world.declare(None, "Vault", Class, Public, "class Vault {");
    world.declare(Some(vault), "unlock", Function, Private, "void unlock();");
    world.declare(Some(vault), "rotate", Function, Private, "void rotate();");
    world.declare(Some(vault), "rotate", Function, Private, "void rotate(int);");
    world.declare(Some(vault), "seal", Function, Private, "static void seal();");
    world.declare(Some(vault), "shuffle", Function, Private, "static void shuffle();");
    world.declare(Some(vault), "shuffle", Function, Private, "static void shuffle(int);");
    world.declare(Some(vault), "Key", Class, Private, "class Key {};");
    world.declare(Some(vault), "combination", Field, Private, "int combination;");

    for (template, marker) in [
        ("OnMember", "class OnMember {};"),
        ("OnFunction", "class OnFunction {};"),
        ("Tagged", "class Tagged {};"),
        ("Boxed", "class Boxed {};"),
        ("Pair", "class Pair {};"),
        ("TaggedField", "class TaggedField {};"),
        ("Traits", "struct Traits;"),
    ] {
        world.declare(None, template, ClassTemplate, Public, marker);
    }

    for (alias, marker) in [
        ("unlock_alias", "using unlock_alias"),
        ("rotate_alias", "using rotate_alias"),
        ("seal_alias", "using seal_alias"),
        ("tagged_alias", "using tagged_alias"),
        ("tagged_int_alias", "using tagged_int_alias"),
    ] {
        world.declare(None, alias, TypeAlias, Public, marker);
    }
    for (variable, marker) in [
        ("tagged_var", "tagged_var {}"),
        ("pair_var", "pair_var {}"),
        ("field_var", "field_var {}"),
    ] {
        world.declare(None, variable, VariableTemplate, Public, marker);
    }

    let registry = world.declare(None, "Registry", Class, Public, "class Registry {");
    world.declare(Some(registry), "Slot", ClassTemplate, Private, "struct Slot;");

    world
}

pub fn secrets() -> World {
    use AccessSpecifier::*;
    use EntityKind::*;

    let mut world = World::new(SECRETS_SOURCE);
    let outer = world.declare(None, "Outer", Class, Public, "class Outer {");
    world.declare(Some(outer), "Inner", ClassTemplate, Private, "class Inner {};");

    let secrets = world.declare(None, "Secrets", Class, Public, "class Secrets {");
    world.declare(Some(secrets), "Token", Class, Private, "class Token {};");
    world.declare(Some(secrets), "Badge", Class, Private, "class Badge {};");
    world.declare(Some(secrets), "ping", Function, Private, "void ping();");
    world.declare(Some(secrets), "pong", Function, Private, "static void pong();");
    world.declare(Some(secrets), "level", Field, Private, "int level;");
    world.declare(None, "Probe", ClassTemplate, Public, "class Probe {};");
    world.declare(None, "StaticProbe", ClassTemplate, Public, "class StaticProbe {};");
    world.declare(None, "FieldProbe", ClassTemplate, Public, "class FieldProbe {};");

    let members = world.declare(None, "members", Namespace, Public, "namespace members {");
    let plain = world.declare(
        Some(members),
        "Plain",
        Class,
        Public,
        "struct Plain { void run(); };",
    );
    world.declare(Some(plain), "run", Function, Public, "struct Plain { void run(); };");

    let boxed = world.declare(Some(members), "Box", ClassTemplate, Public, "struct Box {");
    world.declare(Some(boxed), "Plain", Class, Public, "struct Plain {};");
    world.declare(Some(boxed), "put", Function, Public, "void put(T);");
    world.declare(Some(boxed), "take", Function, Public, "void take() {}");
    world.declare(Some(boxed), "emit", FunctionTemplate, Public, "void emit(U);");
    world.declare(Some(boxed), "Mode", Enum, Public, "enum Mode : int;");
    world.declare(Some(boxed), "count", StaticDataMember, Public, "static int count;");

    let hidden = world.declare(Some(members), "Hidden", Class, Public, "class Hidden {");
    world.declare(Some(hidden), "Id", TypeAlias, Private, "using Id = int;");
    let alias = world.declare(Some(hidden), "Alias", TypeAlias, Private, "using Alias = Plain;");
    world.entities.set_aliased(alias, plain);
    let base = world.declare(Some(hidden), "Base", TypeAlias, Private, "using Base = Plain;");
    world.entities.set_aliased(base, plain);
    world.declare(Some(hidden), "zero", StaticDataMember, Private, "static const int zero");

    let definitions =
        world.declare(None, "definitions", Namespace, Public, "namespace definitions {");
    let holder = world.declare(
        Some(definitions),
        "Holder",
        ClassTemplate,
        Public,
        "struct Holder;",
    );
    world.declare(Some(holder), "f", Function, Public, "{ void f(); int g;");
    world.declare(Some(holder), "g", Field, Public, "{ void f(); int g;");
    world.declare(Some(holder), "h", Function, Public, "int g; Owner::Part* h(");
    let owner = world.declare(Some(definitions), "Owner", Class, Public, "class Owner {");
    world.declare(Some(owner), "Part", Class, Private, "class Owner {");
    world.declare(Some(definitions), "member", Function, Public, "member() {");

    world
}

pub fn analyze(entities: &EntityTable, declaration: &Declaration) -> Vec<Diagnostic> {
    let mut analyzer = AccessAnalyzer::new(entities);
    match analyzer.analyze(declaration) {
        Ok(()) => vec![],
        Err(diagnostics) => diagnostics,
    }
}

pub fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics
        .iter()
        .map(|diagnostic| diagnostic.message())
        .collect()
}

pub fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
