//! Required-parameter validation and template substitution.
//!
//! Validation is all-or-nothing per request: the first failing rule aborts
//! before any subprocess is started. Substitution is textual replacement of
//! the literal `{{name}}` placeholder and only ever runs on values that
//! passed their rule.

use regex::Regex;
use std::collections::HashMap;

use crate::config::Runbook;
use crate::error::ValidationError;

/// Caller-supplied parameters, multi-valued per name.
pub type Parameters = HashMap<String, Vec<String>>;

/// Check every command's required rules in declaration order and return a
/// copy of the runbook with all `{{name}}` placeholders substituted.
///
/// Every supplied value must match its rule's pattern. When a name carries
/// several values, each substitutes against the template as it stood when
/// the rule began, so the last value's substitution is the one observed;
/// substitutions from distinct rules accumulate.
pub fn validate_and_substitute(
    runbook: &Runbook,
    parameters: &Parameters,
) -> Result<Runbook, ValidationError> {
    let mut validated = runbook.clone();

    for entry in &mut validated.commands {
        let mut template = entry.command.clone();

        for rule in &entry.required {
            let values = parameters
                .get(&rule.name)
                .filter(|values| !values.is_empty())
                .ok_or_else(|| ValidationError::MissingParameter(rule.name.clone()))?;

            let pattern = Regex::new(&rule.pattern).map_err(|err| {
                tracing::warn!(
                    "pattern '{}' for '{}' does not compile: {}",
                    rule.pattern,
                    rule.name,
                    err
                );
                ValidationError::InvalidPattern {
                    name: rule.name.clone(),
                    pattern: rule.pattern.clone(),
                }
            })?;

            let placeholder = format!("{{{{{}}}}}", rule.name);
            let base = template.clone();
            for value in values {
                if !pattern.is_match(value) {
                    return Err(ValidationError::InvalidValue {
                        name: rule.name.clone(),
                        value: value.clone(),
                    });
                }
                template = base.replace(&placeholder, value);
            }
        }

        entry.command = template;
    }

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandEntry;

    fn runbook_with(entries: Vec<CommandEntry>) -> Runbook {
        let mut runbook = Runbook::new("test", "0");
        runbook.commands = entries;
        runbook
    }

    fn params(pairs: &[(&str, &[&str])]) -> Parameters {
        pairs
            .iter()
            .map(|(name, values)| {
                (
                    name.to_string(),
                    values.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn no_rules_always_validates() {
        let runbook = runbook_with(vec![CommandEntry::new("uptime")]);

        assert!(validate_and_substitute(&runbook, &Parameters::new()).is_ok());
        assert!(validate_and_substitute(&runbook, &params(&[("junk", &["x"])])).is_ok());
    }

    #[test]
    fn absent_parameter_is_missing() {
        let runbook = runbook_with(vec![CommandEntry::new("echo {{msg}}").with_required("msg", ".*")]);

        let err = validate_and_substitute(&runbook, &Parameters::new()).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("msg".into()));
    }

    #[test]
    fn empty_value_list_is_missing() {
        let runbook = runbook_with(vec![CommandEntry::new("echo {{msg}}").with_required("msg", ".*")]);

        let err = validate_and_substitute(&runbook, &params(&[("msg", &[])])).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("msg".into()));
    }

    #[test]
    fn non_matching_value_is_invalid() {
        let runbook =
            runbook_with(vec![CommandEntry::new("sleep {{n}}").with_required("n", r"^\d+$")]);

        let err = validate_and_substitute(&runbook, &params(&[("n", &["12a"])])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidValue {
                name: "n".into(),
                value: "12a".into(),
            }
        );
    }

    #[test]
    fn matching_value_replaces_every_occurrence() {
        let runbook = runbook_with(vec![
            CommandEntry::new("cp {{n}} {{n}}.bak").with_required("n", r"^\d+$")
        ]);

        let validated = validate_and_substitute(&runbook, &params(&[("n", &["123"])])).unwrap();
        assert_eq!(validated.commands[0].command, "cp 123 123.bak");
    }

    #[test]
    fn uncompilable_pattern_is_invalid_pattern() {
        let runbook = runbook_with(vec![CommandEntry::new("echo {{msg}}").with_required("msg", "[")]);

        let err = validate_and_substitute(&runbook, &params(&[("msg", &["x"])])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidPattern {
                name: "msg".into(),
                pattern: "[".into(),
            }
        );
    }

    #[test]
    fn last_value_wins_for_multi_valued_parameters() {
        let runbook =
            runbook_with(vec![CommandEntry::new("echo {{msg}}").with_required("msg", ".*")]);

        let validated =
            validate_and_substitute(&runbook, &params(&[("msg", &["first", "second"])])).unwrap();
        assert_eq!(validated.commands[0].command, "echo second");
    }

    #[test]
    fn every_supplied_value_is_validated_even_if_not_observed() {
        let runbook =
            runbook_with(vec![CommandEntry::new("sleep {{n}}").with_required("n", r"^\d+$")]);

        // The bad value comes first and would be overwritten, but the rule
        // still rejects it.
        let err = validate_and_substitute(&runbook, &params(&[("n", &["bad", "2"])])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));
    }

    #[test]
    fn substitutions_from_distinct_rules_accumulate() {
        let runbook = runbook_with(vec![CommandEntry::new("scp {{src}} {{dst}}")
            .with_required("src", ".+")
            .with_required("dst", ".+")]);

        let validated =
            validate_and_substitute(&runbook, &params(&[("src", &["a.txt"]), ("dst", &["b.txt"])]))
                .unwrap();
        assert_eq!(validated.commands[0].command, "scp a.txt b.txt");
    }

    #[test]
    fn failure_in_a_later_command_aborts_the_whole_run() {
        let runbook = runbook_with(vec![
            CommandEntry::new("echo {{msg}}").with_required("msg", ".*"),
            CommandEntry::new("sleep {{n}}").with_required("n", r"^\d+$"),
        ]);

        let err = validate_and_substitute(&runbook, &params(&[("msg", &["hi"])])).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("n".into()));
    }

    #[test]
    fn original_runbook_is_untouched() {
        let runbook =
            runbook_with(vec![CommandEntry::new("echo {{msg}}").with_required("msg", ".*")]);

        let _ = validate_and_substitute(&runbook, &params(&[("msg", &["hi"])])).unwrap();
        assert_eq!(runbook.commands[0].command, "echo {{msg}}");
    }
}
