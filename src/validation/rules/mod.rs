//! The validation rules of the GraphQL specification.

mod arguments_of_correct_type;
mod default_values_of_correct_type;
mod fields_on_correct_type;
mod fragments_on_composite_types;
mod known_argument_names;
mod known_directives;
mod known_fragment_names;
mod known_type_names;
mod lone_anonymous_operation;
mod no_fragment_cycles;
mod no_undefined_variables;
mod no_unused_fragments;
mod no_unused_variables;
mod overlapping_fields_can_be_merged;
mod possible_fragment_spreads;
mod provided_non_null_arguments;
mod scalar_leafs;
mod unique_argument_names;
mod unique_fragment_names;
mod unique_input_field_names;
mod unique_operation_names;
mod unique_variable_names;
mod variables_are_input_types;
mod variables_in_allowed_position;

use crate::validation::Rule;

pub use self::{
    arguments_of_correct_type::ArgumentsOfCorrectType,
    default_values_of_correct_type::DefaultValuesOfCorrectType,
    fields_on_correct_type::FieldsOnCorrectType,
    fragments_on_composite_types::FragmentsOnCompositeTypes,
    known_argument_names::KnownArgumentNames, known_directives::KnownDirectives,
    known_fragment_names::KnownFragmentNames, known_type_names::KnownTypeNames,
    lone_anonymous_operation::LoneAnonymousOperation, no_fragment_cycles::NoFragmentCycles,
    no_undefined_variables::NoUndefinedVariables, no_unused_fragments::NoUnusedFragments,
    no_unused_variables::NoUnusedVariables,
    overlapping_fields_can_be_merged::OverlappingFieldsCanBeMerged,
    possible_fragment_spreads::PossibleFragmentSpreads,
    provided_non_null_arguments::ProvidedNonNullArguments, scalar_leafs::ScalarLeafs,
    unique_argument_names::UniqueArgumentNames, unique_fragment_names::UniqueFragmentNames,
    unique_input_field_names::UniqueInputFieldNames,
    unique_operation_names::UniqueOperationNames, unique_variable_names::UniqueVariableNames,
    variables_are_input_types::VariablesAreInputTypes,
    variables_in_allowed_position::VariablesInAllowedPosition,
};

/// A fresh instance of every rule, in the order they run.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(arguments_of_correct_type::factory()),
        Box::new(default_values_of_correct_type::factory()),
        Box::new(fields_on_correct_type::factory()),
        Box::new(fragments_on_composite_types::factory()),
        Box::new(known_argument_names::factory()),
        Box::new(known_directives::factory()),
        Box::new(known_fragment_names::factory()),
        Box::new(known_type_names::factory()),
        Box::new(lone_anonymous_operation::factory()),
        Box::new(no_fragment_cycles::factory()),
        Box::new(no_undefined_variables::factory()),
        Box::new(no_unused_fragments::factory()),
        Box::new(no_unused_variables::factory()),
        Box::new(overlapping_fields_can_be_merged::factory()),
        Box::new(possible_fragment_spreads::factory()),
        Box::new(provided_non_null_arguments::factory()),
        Box::new(scalar_leafs::factory()),
        Box::new(unique_argument_names::factory()),
        Box::new(unique_fragment_names::factory()),
        Box::new(unique_input_field_names::factory()),
        Box::new(unique_operation_names::factory()),
        Box::new(unique_variable_names::factory()),
        Box::new(variables_are_input_types::factory()),
        Box::new(variables_in_allowed_position::factory()),
    ]
}
