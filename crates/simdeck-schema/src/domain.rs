//! Domain rules: per-field validation constraints.
//!
//! A field's schema entry carries a list of [`Domain`] rules. The rule set
//! is evaluated by [`check_domains`], producing zero or more [`Violation`]s.
//! Evaluation never mutates anything and never touches global state;
//! filesystem-relative rules go through the [`FileProbe`] seam so callers
//! can substitute their own resolution.
//!
//! Numeric rules accept numeric strings: values replayed from legacy flat
//! records arrive stringly typed and must validate identically.

use crate::value::Value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A validation rule constraining a field's legal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Domain {
    /// The field must be given a value. An unset mandatory field is a
    /// validation error (and counts as active for error-counting).
    Mandatory,

    /// Integer within an optional inclusive range.
    IntRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },

    /// Real number within an optional inclusive range.
    RealRange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },

    /// One of a fixed set of spellings.
    EnumValues { values: Vec<String> },

    /// Boolean flag (accepts the legacy textual spellings).
    BoolValue,

    /// Any string is fine; numerics are rejected.
    AnyString,

    /// String matching a regular expression.
    Pattern { pattern: String },

    /// Path that must exist relative to the working directory.
    ValidFile,

    /// Recorded in the schema but deliberately not evaluated here
    /// (cross-field and engine-version rules belong to the engine).
    Deferred,
}

impl Domain {
    /// Shorthand for an integer domain with only a lower bound.
    pub fn int_min(min: i64) -> Self {
        Domain::IntRange {
            min: Some(min),
            max: None,
        }
    }

    /// Shorthand for an enum domain.
    pub fn enum_values<S: Into<String>, I: IntoIterator<Item = S>>(values: I) -> Self {
        Domain::EnumValues {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Whether a rule set contains the mandatory rule.
pub fn is_mandatory(domains: &[Domain]) -> bool {
    domains.iter().any(|d| matches!(d, Domain::Mandatory))
}

/// A single domain-rule failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("mandatory value is not set")]
    MissingMandatory,

    #[error("`{got}` is not an integer")]
    NotAnInteger { got: String },

    #[error("`{got}` is not a number")]
    NotANumber { got: String },

    #[error("{value} is out of range {range}")]
    OutOfRange { value: String, range: String },

    #[error("`{got}` is not one of {allowed:?}")]
    NotInEnum { got: String, allowed: Vec<String> },

    #[error("`{got}` is not a boolean")]
    NotABool { got: String },

    #[error("`{got}` is not a string")]
    NotAString { got: String },

    #[error("`{got}` does not match pattern `{pattern}`")]
    PatternMismatch { got: String, pattern: String },

    #[error("invalid pattern `{pattern}` in schema")]
    InvalidPattern { pattern: String },

    #[error("file `{path}` does not exist")]
    FileNotFound { path: String },
}

/// Seam for filesystem-relative checks.
///
/// The validator resolves `ValidFile` paths against the working directory
/// from the evaluation context; how existence is determined is delegated so
/// that tests and remote-execution callers can substitute their own probe.
pub trait FileProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Default probe backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl FileProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Evaluation context for a domain rule set.
pub struct DomainContext<'a> {
    /// Base for relative `ValidFile` paths.
    pub working_directory: Option<&'a Path>,
    /// Existence probe for `ValidFile`.
    pub probe: &'a dyn FileProbe,
}

impl<'a> DomainContext<'a> {
    pub fn new(working_directory: Option<&'a Path>, probe: &'a dyn FileProbe) -> Self {
        Self {
            working_directory,
            probe,
        }
    }
}

impl Default for DomainContext<'_> {
    fn default() -> Self {
        static PROBE: FsProbe = FsProbe;
        Self {
            working_directory: None,
            probe: &PROBE,
        }
    }
}

fn range_text<T: std::fmt::Display>(min: &Option<T>, max: &Option<T>) -> String {
    let lo = min
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-inf".to_string());
    let hi = max
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "+inf".to_string());
    format!("[{}, {}]", lo, hi)
}

fn check_scalar(
    domain: &Domain,
    scalar: &crate::value::Scalar,
    ctx: &DomainContext<'_>,
    out: &mut Vec<Violation>,
) {
    match domain {
        Domain::Mandatory | Domain::Deferred => {}
        Domain::IntRange { min, max } => match scalar.as_int() {
            Some(i) => {
                let below = min.map(|m| i < m).unwrap_or(false);
                let above = max.map(|m| i > m).unwrap_or(false);
                if below || above {
                    out.push(Violation::OutOfRange {
                        value: i.to_string(),
                        range: range_text(min, max),
                    });
                }
            }
            None => out.push(Violation::NotAnInteger {
                got: scalar.to_string(),
            }),
        },
        Domain::RealRange { min, max } => match scalar.as_real() {
            Some(r) => {
                let below = min.map(|m| r < m).unwrap_or(false);
                let above = max.map(|m| r > m).unwrap_or(false);
                if below || above {
                    out.push(Violation::OutOfRange {
                        value: r.to_string(),
                        range: range_text(min, max),
                    });
                }
            }
            None => out.push(Violation::NotANumber {
                got: scalar.to_string(),
            }),
        },
        Domain::EnumValues { values } => {
            let got = scalar.to_string();
            if !values.iter().any(|v| v == &got) {
                out.push(Violation::NotInEnum {
                    got,
                    allowed: values.clone(),
                });
            }
        }
        Domain::BoolValue => {
            if scalar.as_bool().is_none() {
                out.push(Violation::NotABool {
                    got: scalar.to_string(),
                });
            }
        }
        Domain::AnyString => {
            if scalar.as_str().is_none() {
                out.push(Violation::NotAString {
                    got: scalar.to_string(),
                });
            }
        }
        Domain::Pattern { pattern } => match Regex::new(pattern) {
            Ok(re) => {
                let got = scalar.to_string();
                if !re.is_match(&got) {
                    out.push(Violation::PatternMismatch {
                        got,
                        pattern: pattern.clone(),
                    });
                }
            }
            Err(_) => out.push(Violation::InvalidPattern {
                pattern: pattern.clone(),
            }),
        },
        Domain::ValidFile => {
            let text = scalar.to_string();
            let mut path = PathBuf::from(&text);
            if path.is_relative() {
                if let Some(base) = ctx.working_directory {
                    path = base.join(path);
                }
            }
            if !ctx.probe.exists(&path) {
                out.push(Violation::FileNotFound { path: text });
            }
        }
    }
}

/// Evaluate a rule set against a field value.
///
/// `value` is `None` for a field that was never given a value: only
/// `Mandatory` fires in that case, everything else has nothing to check.
/// List values check every element against each rule.
pub fn check_domains(
    value: Option<&Value>,
    domains: &[Domain],
    ctx: &DomainContext<'_>,
) -> Vec<Violation> {
    let mut out = Vec::new();
    match value {
        None => {
            if is_mandatory(domains) {
                out.push(Violation::MissingMandatory);
            }
        }
        Some(value) => {
            for domain in domains {
                for scalar in value.scalars() {
                    check_scalar(domain, scalar, ctx, &mut out);
                }
            }
        }
    }
    out
}

/// One-line rendering of a violation list, for diagnostic output.
pub fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_int_range_accepts_numeric_strings() {
        let domains = vec![Domain::IntRange {
            min: Some(1),
            max: Some(64),
        }];
        let ctx = DomainContext::default();
        assert!(check_domains(Some(&Value::from(2i64)), &domains, &ctx).is_empty());
        assert!(check_domains(Some(&Value::from("2")), &domains, &ctx).is_empty());
        let violations = check_domains(Some(&Value::from(0i64)), &domains, &ctx);
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], Violation::OutOfRange { .. }));
    }

    #[test]
    fn test_mandatory_only_fires_when_unset() {
        let domains = vec![Domain::Mandatory, Domain::int_min(1)];
        let ctx = DomainContext::default();
        let violations = check_domains(None, &domains, &ctx);
        assert_eq!(violations, vec![Violation::MissingMandatory]);
        assert!(check_domains(Some(&Value::from(3i64)), &domains, &ctx).is_empty());
    }

    #[test]
    fn test_optional_unset_has_no_violations() {
        let domains = vec![Domain::int_min(1)];
        let ctx = DomainContext::default();
        assert!(check_domains(None, &domains, &ctx).is_empty());
    }

    #[test]
    fn test_enum_and_bool() {
        let ctx = DomainContext::default();
        let domains = vec![Domain::enum_values(["Box", "SolidFile"])];
        assert!(check_domains(Some(&Value::from("Box")), &domains, &ctx).is_empty());
        assert_eq!(
            check_domains(Some(&Value::from("Sphere")), &domains, &ctx).len(),
            1
        );

        let domains = vec![Domain::BoolValue];
        assert!(check_domains(Some(&Value::from(true)), &domains, &ctx).is_empty());
        assert!(check_domains(Some(&Value::from("False")), &domains, &ctx).is_empty());
        assert_eq!(
            check_domains(Some(&Value::from("yesno")), &domains, &ctx).len(),
            1
        );
    }

    #[test]
    fn test_list_values_check_each_element() {
        let domains = vec![Domain::int_min(0)];
        let ctx = DomainContext::default();
        let ok: Value = serde_json::from_str("[1, 2, 3]").unwrap();
        assert!(check_domains(Some(&ok), &domains, &ctx).is_empty());
        let bad: Value = serde_json::from_str("[1, -2, -3]").unwrap();
        assert_eq!(check_domains(Some(&bad), &domains, &ctx).len(), 2);
    }

    #[test]
    fn test_pattern_domain() {
        let domains = vec![Domain::Pattern {
            pattern: "^[a-z][a-z0-9_]*$".to_string(),
        }];
        let ctx = DomainContext::default();
        assert!(check_domains(Some(&Value::from("box_1")), &domains, &ctx).is_empty());
        assert_eq!(
            check_domains(Some(&Value::from("1box")), &domains, &ctx).len(),
            1
        );
    }

    struct NeverThere;
    impl FileProbe for NeverThere {
        fn exists(&self, _path: &Path) -> bool {
            false
        }
    }

    struct AlwaysThere;
    impl FileProbe for AlwaysThere {
        fn exists(&self, _path: &Path) -> bool {
            true
        }
    }

    #[test]
    fn test_valid_file_goes_through_probe() {
        let domains = vec![Domain::ValidFile];
        let missing = DomainContext::new(Some(Path::new("/deck")), &NeverThere);
        let violations = check_domains(Some(&Value::from("input.pfb")), &domains, &missing);
        assert_eq!(
            violations,
            vec![Violation::FileNotFound {
                path: "input.pfb".to_string()
            }]
        );

        let present = DomainContext::new(Some(Path::new("/deck")), &AlwaysThere);
        assert!(check_domains(Some(&Value::from("input.pfb")), &domains, &present).is_empty());
    }

    #[test]
    fn test_render_violations_joins_messages() {
        let rendered = render_violations(&[
            Violation::MissingMandatory,
            Violation::NotABool {
                got: "2".to_string(),
            },
        ]);
        assert_eq!(rendered, "mandatory value is not set; `2` is not a boolean");
    }
}
