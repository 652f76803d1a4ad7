use cxx_ast::{Declaration, EntityTable};
use log::{debug, warn};
use rayon::prelude::*;

use crate::access_checker::{AccessChecker, AccessRequest, MemberAccessChecker};
use crate::access_gate::AccessGate;
use crate::diagnostic::Diagnostic;
use crate::options::AnalyzerOptions;

/// Runs the access gate over every name reference of a declaration and reports the violations
/// found by the ordinary access checker for the references that were not exempted.
pub struct AccessAnalyzer<'a, C = MemberAccessChecker<'a>> {
    entities: &'a EntityTable,
    checker: C,
    options: AnalyzerOptions,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> AccessAnalyzer<'a, MemberAccessChecker<'a>> {
    pub fn new(entities: &'a EntityTable) -> Self {
        Self::with_checker(entities, MemberAccessChecker::new(entities))
    }
}

impl<'a, C: AccessChecker> AccessAnalyzer<'a, C> {
    pub fn with_checker(entities: &'a EntityTable, checker: C) -> Self {
        AccessAnalyzer {
            entities,
            checker,
            options: AnalyzerOptions::default(),
            diagnostics: vec![],
        }
    }

    pub fn with_options(mut self, options: AnalyzerOptions) -> Self {
        if !options.access_control {
            warn!("Access control is disabled, no access diagnostics will be reported");
        }
        self.options = options;
        self
    }

    pub fn options(&self) -> AnalyzerOptions {
        self.options
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn get_errors(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.is_error())
            .cloned()
            .collect()
    }

    pub fn analyze(&mut self, declaration: &Declaration) -> Result<(), Vec<Diagnostic>> {
        let diagnostics = self.analyze_declaration(declaration);
        self.finish(diagnostics)
    }

    fn finish(&mut self, diagnostics: Vec<Diagnostic>) -> Result<(), Vec<Diagnostic>> {
        let errors = diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.is_error())
            .cloned()
            .collect::<Vec<_>>();
        self.diagnostics.extend(diagnostics);

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn analyze_declaration(&self, declaration: &Declaration) -> Vec<Diagnostic> {
        let gate = AccessGate::new(declaration, self.entities);
        let mut diagnostics = vec![];

        debug!(
            "Analyzing declaration {:?} ({}) with {} name references",
            declaration.id(),
            gate.specialization_kind(),
            declaration.name_refs().len()
        );

        for name_ref in declaration.name_refs() {
            let decision = gate.decide(name_ref.id);

            if decision.suppressed || !self.options.access_control {
                continue;
            }

            let request = AccessRequest::new(name_ref, &decision, declaration.access_context());
            if let Err(violation) = self.checker.check(&request) {
                debug!("Access violation: {violation}");
                diagnostics.push(violation.into());
            }
        }

        diagnostics
    }
}

impl<'a, C: AccessChecker + Sync> AccessAnalyzer<'a, C> {
    /// Analyzes independent declarations in parallel. Diagnostics are merged in source order.
    pub fn analyze_all(&mut self, declarations: &[Declaration]) -> Result<(), Vec<Diagnostic>> {
        let this = &*self;
        let mut diagnostics = declarations
            .par_iter()
            .flat_map_iter(|declaration| this.analyze_declaration(declaration))
            .collect::<Vec<_>>();
        diagnostics.sort_by_key(|diagnostic| diagnostic.span());

        self.finish(diagnostics)
    }
}
