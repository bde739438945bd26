//! Query validation related methods and data structures

mod context;
mod input_value;
pub mod rules;
mod suggestions;

#[cfg(test)]
mod test_harness;

use std::sync::Arc;

use crate::{
    ast::{Document, Node},
    schema::model::Schema,
    visitor::{ParallelVisitor, TypeInfoVisitor, Visitor, visit},
};

pub use self::{
    context::{RuleError, ValidatorContext, VariableUsage},
    rules::default_rules,
};

#[cfg(test)]
pub(crate) use self::test_harness::{
    expect_fails_rule, expect_fails_rule_with_schema, expect_passes_rule,
    expect_passes_rule_with_schema,
};

/// A validation rule: a visitor reporting problems into the
/// [`ValidatorContext`] as the document is walked.
///
/// Any type implementing [`Visitor`] over every [`ValidatorContext`] is a
/// rule.
pub trait Rule: for<'a> Visitor<ValidatorContext<'a>> {}

impl<T> Rule for T where T: for<'a> Visitor<ValidatorContext<'a>> {}

/// Checks `document` against `schema` with the default rule set.
///
/// Returns every problem found, sorted by location. The document may only be
/// executed if none was.
pub fn validate(schema: &Schema, document: &Document) -> Vec<RuleError> {
    validate_with_rules(schema, document, default_rules())
}

/// Checks `document` against `schema` with the given `rules`, all run in a
/// single walk over the document.
pub fn validate_with_rules(
    schema: &Schema,
    document: &Document,
    rules: Vec<Box<dyn Rule>>,
) -> Vec<RuleError> {
    let mut ctx = ValidatorContext::new(schema, document);
    let mut visitor = TypeInfoVisitor::new(ParallelVisitor::new(rules));
    let root = Node::Document(Arc::new(document.clone()));
    // Rules do not edit the document, so the walk cannot fail.
    let _ = visit(root, &mut visitor, &mut ctx);

    let errors = ctx.into_errors();
    if !errors.is_empty() {
        tracing::debug!(count = errors.len(), "document failed validation");
    }
    errors
}
