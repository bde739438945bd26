use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{Argument, Directive, Field},
    parser::SourcePosition,
    validation::ValidatorContext,
    visitor::{VisitAction, VisitInfo, Visitor},
};

/// A field or directive must not be given the same argument twice.
#[derive(Debug, Default)]
pub struct UniqueArgumentNames {
    known_names: FnvHashMap<ArcStr, SourcePosition>,
}

pub fn factory() -> UniqueArgumentNames {
    UniqueArgumentNames::default()
}

impl<'a> Visitor<ValidatorContext<'a>> for UniqueArgumentNames {
    fn enter_field(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<Field>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.known_names.clear();
        VisitAction::Continue
    }

    fn enter_directive(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &Arc<Directive>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        self.known_names.clear();
        VisitAction::Continue
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        arg: &Arc<Argument>,
        _: &VisitInfo<'_>,
    ) -> VisitAction {
        let name = &arg.name;
        match self.known_names.get(&name.item) {
            Some(&first) => {
                ctx.report_error(&error_message(&name.item), &[first, name.span.start]);
            }
            None => {
                self.known_names.insert(name.item.clone(), name.span.start);
            }
        }
        VisitAction::Skip
    }
}

fn error_message(arg_name: &str) -> String {
    format!(r#"There can only be one argument named "{arg_name}"."#)
}
