//! Method resolution.
//!
//! Selection is a pure function over the candidate list: filter by name and
//! capability, keep candidates whose required parameters are all supplied,
//! then rank by how many parameters the directive binds and, among those,
//! how many of the bound parameters are plain strings. Remaining ties go to
//! the candidate with fewer optional parameters, then to the first declared.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::debug;

use logwire_core::{
    BoundArguments, CandidateMethod, Capability, ResolvedCall, Value,
};

use crate::coercion::{convert, implicit_value};
use crate::context::ResolutionContext;
use crate::directive::Directive;
use crate::error::ResolveResult;

/// Whether every parameter of `method` is either supplied or omittable.
pub fn is_eligible(method: &CandidateMethod, supplied: &[&str]) -> bool {
    method
        .parameters
        .iter()
        .all(|p| p.can_omit() || supplied.contains(&p.name.as_str()))
}

type Rank = (usize, usize, Reverse<usize>);

/// Ranking key: bound parameters, bound string parameters, fewest optional
/// parameters.
fn score(method: &CandidateMethod, supplied: &[&str]) -> Rank {
    let (bound, strings) = method
        .parameters
        .iter()
        .filter(|p| supplied.contains(&p.name.as_str()))
        .fold((0, 0), |(bound, strings), p| {
            (bound + 1, strings + usize::from(p.type_ref.is_string()))
        });
    let optional = method.parameters.iter().filter(|p| p.can_omit()).count();
    (bound, strings, Reverse(optional))
}

/// Selects the best candidate for a directive named `name`.
///
/// Returns `None` when no candidate is eligible.
pub fn select<'a>(
    candidates: &'a [Arc<CandidateMethod>],
    name: &str,
    capability: Capability,
    supplied: &[&str],
) -> Option<&'a Arc<CandidateMethod>> {
    let mut best: Option<(&Arc<CandidateMethod>, Rank)> = None;
    for candidate in candidates
        .iter()
        .filter(|c| c.name == name && c.capability == capability)
        .filter(|c| is_eligible(c, supplied))
    {
        let rank = score(candidate, supplied);
        if best.as_ref().map_or(true, |(_, top)| rank > *top) {
            best = Some((candidate, rank));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Signatures of candidates named `name`, for diagnostics.
pub fn overloads(candidates: &[Arc<CandidateMethod>], name: &str) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.name == name)
        .map(|c| c.signature())
        .collect()
}

/// Binds every parameter of `method` for `directive`: supplied arguments
/// are converted, implicit parameters injected and the rest defaulted.
pub fn bind_call(
    directive: &Directive,
    method: &Arc<CandidateMethod>,
    context: &Arc<ResolutionContext>,
) -> ResolveResult<ResolvedCall> {
    let mut arguments = BoundArguments::new();
    for parameter in &method.parameters {
        let value = match directive.argument(&parameter.name) {
            Some(node) => convert(node, &parameter.type_ref, context)?,
            None if parameter.type_ref.is_implicit() => {
                implicit_value(&parameter.type_ref, &parameter.name, &directive.path, context)?
            }
            None => parameter.default.clone().unwrap_or(Value::Null),
        };
        arguments.push(parameter.name.clone(), value);
    }

    debug!(
        method = %method.signature(),
        package = %method.package,
        path = %directive.path,
        "resolved directive"
    );
    Ok(ResolvedCall {
        method: method.clone(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use logwire_core::TypeRef;

    fn method(name: &str) -> CandidateMethod {
        CandidateMethod::new(name, Capability::Sink)
    }

    fn arc(methods: Vec<CandidateMethod>) -> Vec<Arc<CandidateMethod>> {
        methods.into_iter().map(Arc::new).collect()
    }

    #[test]
    fn test_defaulted_overload_for_partial_arguments() {
        let candidates = arc(vec![
            method("f")
                .param("x", TypeRef::Int)
                .optional("y", TypeRef::Int, Value::Int(1)),
            method("f").param("x", TypeRef::Int).param("y", TypeRef::Int),
        ]);

        let chosen = select(&candidates, "f", Capability::Sink, &["x"]).unwrap();
        assert!(Arc::ptr_eq(chosen, &candidates[0]));

        let chosen = select(&candidates, "f", Capability::Sink, &["x", "y"]).unwrap();
        assert!(Arc::ptr_eq(chosen, &candidates[1]));
    }

    #[test]
    fn test_overload_choice_independent_of_declaration_order() {
        let candidates = arc(vec![
            method("f").param("x", TypeRef::Int).param("y", TypeRef::Int),
            method("f")
                .param("x", TypeRef::Int)
                .optional("y", TypeRef::Int, Value::Int(1)),
        ]);
        let chosen = select(&candidates, "f", Capability::Sink, &["x", "y"]).unwrap();
        assert!(Arc::ptr_eq(chosen, &candidates[0]));
        let chosen = select(&candidates, "f", Capability::Sink, &["x"]).unwrap();
        assert!(Arc::ptr_eq(chosen, &candidates[1]));
    }

    #[test]
    fn test_more_bound_parameters_win() {
        let candidates = arc(vec![
            method("File").param("path", TypeRef::String),
            method("File")
                .param("path", TypeRef::String)
                .optional("shared", TypeRef::Bool, Value::Bool(false)),
        ]);
        let chosen = select(&candidates, "File", Capability::Sink, &["path", "shared"]).unwrap();
        assert!(Arc::ptr_eq(chosen, &candidates[1]));
    }

    #[test]
    fn test_exact_ties_go_to_first_declared() {
        let candidates = arc(vec![
            method("Console").optional("theme", TypeRef::String, Value::Null),
            method("Console").optional("theme", TypeRef::String, Value::Null),
        ]);
        let chosen = select(&candidates, "Console", Capability::Sink, &[]).unwrap();
        assert!(Arc::ptr_eq(chosen, &candidates[0]));
    }

    #[test]
    fn test_string_overload_preferred() {
        let candidates = arc(vec![
            method("Seq").param("serverUrl", TypeRef::Uri),
            method("Seq").param("serverUrl", TypeRef::String),
        ]);
        let chosen = select(&candidates, "Seq", Capability::Sink, &["serverUrl"]).unwrap();
        assert!(Arc::ptr_eq(chosen, &candidates[1]));
    }

    #[test]
    fn test_name_and_capability_must_match() {
        let candidates = arc(vec![
            method("Console"),
            CandidateMethod::new("WithThreadId", Capability::Enrich),
        ]);
        assert!(select(&candidates, "console", Capability::Sink, &[]).is_none());
        assert!(select(&candidates, "WithThreadId", Capability::Sink, &[]).is_none());
        assert!(select(&candidates, "Console", Capability::Sink, &[]).is_some());
    }

    #[test]
    fn test_missing_required_argument_is_ineligible() {
        let candidates = arc(vec![method("File").param("path", TypeRef::String)]);
        assert!(select(&candidates, "File", Capability::Sink, &[]).is_none());
        assert!(select(&candidates, "File", Capability::Sink, &["Path"]).is_none());
        assert_eq!(overloads(&candidates, "File"), vec!["File(path: string)".to_string()]);
    }

    #[test]
    fn test_implicit_parameters_can_be_omitted() {
        let candidates = arc(vec![method("Custom")
            .param("configuration", TypeRef::AppConfiguration)
            .param("formatProvider", TypeRef::FormatProvider)]);
        assert!(select(&candidates, "Custom", Capability::Sink, &[]).is_some());
    }
}
