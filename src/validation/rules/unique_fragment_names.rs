use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{FragmentDefinition, OperationDefinition},
    parser::SourcePosition,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Fragment names must be unique within a document.
#[derive(Debug, Default)]
pub struct UniqueFragmentNames {
    names: FnvHashMap<ArcStr, SourcePosition>,
}

pub fn factory() -> UniqueFragmentNames {
    UniqueFragmentNames::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for UniqueFragmentNames {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<OperationDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        VisitAction::Skip
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &Arc<FragmentDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let name = &frag.name;
        match self.names.get(&name.item) {
            Some(&first) => {
                ctx.report_error(&error_message(&name.item), &[first, name.span.start]);
            }
            None => {
                self.names.insert(name.item.clone(), name.span.start);
            }
        }
        VisitAction::Skip
    }
}

fn error_message(frag_name: &str) -> String {
    format!(r#"There can only be one fragment named "{frag_name}"."#)
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn no_fragments() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              name
            }
          }
        "#,
        );
    }

    #[test]
    fn one_fragment() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              ...fragA
            }
          }
          fragment fragA on Dog {
            name
          }
        "#,
        );
    }

    #[test]
    fn many_fragments() {
        expect_passes_rule(
            factory,
            r#"
          {
            dog {
              ...fragA
              ...fragB
              ...fragC
            }
          }
          fragment fragA on Dog {
            name
          }
          fragment fragB on Dog {
            nickname
          }
          fragment fragC on Dog {
            barkVolume
          }
        "#,
        );
    }

    #[test]
    fn inline_fragments_are_always_unique() {
        expect_passes_rule(
            factory,
            r#"
          {
            dorOrHuman {
              ...on Dog {
                name
              }
              ...on Dog {
                barkVolume
              }
            }
          }
        "#,
        );
    }

    #[test]
    fn fragment_and_operation_named_the_same() {
        expect_passes_rule(
            factory,
            r#"
          query Foo {
            dog {
              ...Foo
            }
          }
          fragment Foo on Dog {
            name
          }
        "#,
        );
    }

    #[test]
    fn fragments_named_the_same() {
        expect_fails_rule(
            factory,
            r#"
          {
            dog {
              ...fragA
            }
          }
          fragment fragA on Dog {
            name
          }
          fragment fragA on Dog {
            barkVolume
          }
        "#,
            &[RuleError::new(
                &error_message("fragA"),
                &[SourcePosition::new(99, 6, 19), SourcePosition::new(162, 9, 19)],
            )],
        );
    }

    #[test]
    fn fragments_named_the_same_no_reference() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Dog {
            name
          }
          fragment fragA on Dog {
            barkVolume
          }
        "#,
            &[RuleError::new(
                &error_message("fragA"),
                &[SourcePosition::new(20, 1, 19), SourcePosition::new(83, 4, 19)],
            )],
        );
    }
}
