//! Access-control gating for declarations related to template specializations.
//!
//! For every name reference in a declaration the [`AccessGate`] decides whether the usual
//! member-access rules apply or are suppressed because of where the name appears:
//!
//! - names used to specify non-dependent template arguments of the template-id naming a partial
//!   specialization are not access checked,
//! - names in explicit instantiations and explicit specializations are not access checked,
//!   except inside function bodies, default arguments, base clauses, member specifications,
//!   enumerator lists and static data member or variable template initializers.
//!
//! When the gate does not suppress the check, the [`AccessAnalyzer`] forwards the reference to
//! an [`AccessChecker`] and turns violations into [`Diagnostic`]s.

pub mod access_checker;
pub mod access_gate;
pub mod analyzer;
pub mod declaration_context;
pub mod dependence;
pub mod diagnostic;
pub mod error;
pub mod name_position;
pub mod options;

pub use access_checker::{AccessChecker, AccessRequest, MemberAccessChecker};
pub use access_gate::{AccessDecision, AccessGate};
pub use analyzer::AccessAnalyzer;
pub use declaration_context::{DeclarationContextClassifier, SpecializationKind};
pub use dependence::{DependenceAnalyzer, TemplateParamSet};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{AccessViolation, MisclassifiedSyntax};
pub use name_position::{NamePositionClassifier, PositionCategory};
pub use options::AnalyzerOptions;
