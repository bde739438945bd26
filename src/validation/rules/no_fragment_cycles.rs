use std::sync::Arc;

use arcstr::ArcStr;
use fnv::{FnvHashMap, FnvHashSet};

use crate::{
    ast::{FragmentDefinition, FragmentSpread, OperationDefinition},
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// Fragments must not spread themselves, directly or through other
/// fragments.
#[derive(Debug, Default)]
pub struct NoFragmentCycles {
    visited: FnvHashSet<ArcStr>,
    spread_path: Vec<Arc<FragmentSpread>>,
    spread_path_index: FnvHashMap<ArcStr, usize>,
}

pub fn factory() -> NoFragmentCycles {
    NoFragmentCycles::default()
}

impl NoFragmentCycles {
    /// Depth-first search from `fragment`. Each cycle is reported once, from
    /// the first fragment of it that is reached.
    fn detect_cycles(&mut self, ctx: &mut ValidatorContext<'_>, fragment: &FragmentDefinition) {
        let name = fragment.name.item.clone();
        self.visited.insert(name.clone());

        let spreads = ctx.fragment_spreads(&fragment.selection_set);
        if spreads.is_empty() {
            return;
        }

        self.spread_path_index.insert(name.clone(), self.spread_path.len());
        for spread in spreads.iter() {
            let spread_name = &spread.name.item;
            match self.spread_path_index.get(spread_name) {
                None => {
                    self.spread_path.push(Arc::clone(spread));
                    if !self.visited.contains(spread_name) {
                        if let Some(frag) = ctx.fragment(spread_name).cloned() {
                            self.detect_cycles(ctx, &frag);
                        }
                    }
                    self.spread_path.pop();
                }
                Some(&cycle_index) => {
                    let cycle = &self.spread_path[cycle_index..];
                    let via = cycle.iter().map(|s| s.name.item.as_str()).collect::<Vec<_>>();
                    let locations = cycle
                        .iter()
                        .chain([spread])
                        .map(|s| s.span.start)
                        .collect::<Vec<_>>();
                    ctx.report_error(&error_message(spread_name, &via), &locations);
                }
            }
        }
        self.spread_path_index.remove(&name);
    }
}

impl<'a> Visitor<ValidatorContext<'a>> for NoFragmentCycles {
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
        fragment: &Arc<FragmentDefinition>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        if !self.visited.contains(&fragment.name.item) {
            self.detect_cycles(ctx, fragment);
        }
        VisitAction::Skip
    }
}

fn error_message(frag_name: &str, via: &[&str]) -> String {
    if via.is_empty() {
        format!(r#"Cannot spread fragment "{frag_name}" within itself."#)
    } else {
        let via = via.iter().map(|n| format!("\"{n}\"")).collect::<Vec<_>>();
        format!(
            r#"Cannot spread fragment "{frag_name}" within itself via {}."#,
            via.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};

    use crate::{
        parser::SourcePosition,
        validation::{RuleError, expect_fails_rule, expect_passes_rule},
    };

    #[test]
    fn single_reference_is_valid() {
        expect_passes_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB }
          fragment fragB on Dog { name }
        "#,
        );
    }

    #[test]
    fn spreading_twice_is_not_circular() {
        expect_passes_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB, ...fragB }
          fragment fragB on Dog { name }
        "#,
        );
    }

    #[test]
    fn double_spread_within_abstract_types() {
        expect_passes_rule(
            factory,
            r#"
          fragment nameFragment on Pet {
            ... on Dog { name }
            ... on Cat { name }
          }
          fragment spreadsInAnon on Pet {
            ... on Dog { ...nameFragment }
            ... on Cat { ...nameFragment }
          }
        "#,
        );
    }

    #[test]
    fn unknown_fragments_are_ignored() {
        expect_passes_rule(
            factory,
            r#"
          fragment nameFragment on Pet {
            ...UnknownFragment
          }
        "#,
        );
    }

    #[test]
    fn spreading_itself_directly() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragA }
        "#,
            &[RuleError::new(&error_message("fragA", &[]), &[SourcePosition::new(35, 1, 34)])],
        );
    }

    #[test]
    fn spreading_itself_directly_within_inline_fragment() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Pet {
            ... on Dog {
              ...fragA
            }
          }
        "#,
            &[RuleError::new(&error_message("fragA", &[]), &[SourcePosition::new(74, 3, 14)])],
        );
    }

    #[test]
    fn spreading_itself_indirectly() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB }
          fragment fragB on Dog { ...fragA }
        "#,
            &[RuleError::new(
                &error_message("fragA", &["fragB"]),
                &[SourcePosition::new(35, 1, 34), SourcePosition::new(80, 2, 34)],
            )],
        );
    }

    #[test]
    fn spreading_itself_deeply() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB }
          fragment fragB on Dog { ...fragC }
          fragment fragC on Dog { ...fragO }
          fragment fragX on Dog { ...fragY }
          fragment fragY on Dog { ...fragZ }
          fragment fragZ on Dog { ...fragO }
          fragment fragO on Dog { ...fragP }
          fragment fragP on Dog { ...fragA, ...fragX }
        "#,
            &[
                RuleError::new(
                    &error_message("fragA", &["fragB", "fragC", "fragO", "fragP"]),
                    &[
                        SourcePosition::new(35, 1, 34),
                        SourcePosition::new(80, 2, 34),
                        SourcePosition::new(125, 3, 34),
                        SourcePosition::new(305, 7, 34),
                        SourcePosition::new(350, 8, 34),
                    ],
                ),
                RuleError::new(
                    &error_message("fragO", &["fragP", "fragX", "fragY", "fragZ"]),
                    &[
                        SourcePosition::new(305, 7, 34),
                        SourcePosition::new(360, 8, 44),
                        SourcePosition::new(170, 4, 34),
                        SourcePosition::new(215, 5, 34),
                        SourcePosition::new(260, 6, 34),
                    ],
                ),
            ],
        );
    }

    #[test]
    fn spreading_itself_deeply_two_paths() {
        expect_fails_rule(
            factory,
            r#"
          fragment fragA on Dog { ...fragB, ...fragC }
          fragment fragB on Dog { ...fragA }
          fragment fragC on Dog { ...fragA }
        "#,
            &[
                RuleError::new(
                    &error_message("fragA", &["fragB"]),
                    &[SourcePosition::new(35, 1, 34), SourcePosition::new(90, 2, 34)],
                ),
                RuleError::new(
                    &error_message("fragA", &["fragC"]),
                    &[SourcePosition::new(45, 1, 44), SourcePosition::new(135, 3, 34)],
                ),
            ],
        );
    }
}
