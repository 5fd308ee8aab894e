use crate::types::{Diagnostics, Dynamic};
use std::sync::Arc;

/// Checks a single configured value. Validators run on scalars and on every
/// element of a primitive list or set; null values never reach them.
pub trait Validator: Send + Sync {
    fn description(&self) -> String;

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics);
}

pub struct StringInSliceValidator {
    pub allowed: Vec<String>,
    pub ignore_case: bool,
}

impl Validator for StringInSliceValidator {
    fn description(&self) -> String {
        format!("value must be one of: {}", self.allowed.join(", "))
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            let found = self.allowed.iter().any(|allowed| {
                if self.ignore_case {
                    allowed.eq_ignore_ascii_case(s)
                } else {
                    allowed == s
                }
            });
            if !found {
                diagnostics.add_error(
                    format!(
                        "expected {} to be one of {:?}, got {}",
                        attribute_path, self.allowed, s
                    ),
                    None::<String>,
                );
            }
        }
    }
}

pub struct StringPatternValidator {
    pub pattern: regex::Regex,
    pub description: String,
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if !self.pattern.is_match(s) {
                diagnostics.add_error(
                    format!("{} must be {}", attribute_path, self.description),
                    Some(format!("Value '{}' does not match", s)),
                );
            }
        }
    }
}

pub struct LowerCaseValidator;

impl Validator for LowerCaseValidator {
    fn description(&self) -> String {
        "value must be lowercase".to_string()
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if s != s.to_lowercase() {
                diagnostics.add_error(
                    format!("{} should be lowercase", attribute_path),
                    Some(format!("Got '{}'", s)),
                );
            }
        }
    }
}

pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("value must be between {} and {}", min, max),
            (Some(min), None) => format!("value must be at least {}", min),
            (None, Some(max)) => format!("value must be at most {}", max),
            (None, None) => "any number".to_string(),
        }
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(n) = value.as_number() {
            if let Some(min) = self.min {
                if n < min {
                    diagnostics.add_error(
                        format!("{} must be at least {}", attribute_path, min),
                        Some(format!("Got {}", n)),
                    );
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    diagnostics.add_error(
                        format!("{} must be at most {}", attribute_path, max),
                        Some(format!("Got {}", n)),
                    );
                }
            }
        }
    }
}

pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        format!("string length between {:?} and {:?}", self.min, self.max)
    }

    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        if let Some(s) = value.as_string() {
            if let Some(min) = self.min {
                if s.len() < min {
                    diagnostics.add_error(
                        format!("{} must have minimum length of {}", attribute_path, min),
                        Some(format!("Got length {}", s.len())),
                    );
                }
            }
            if let Some(max) = self.max {
                if s.len() > max {
                    diagnostics.add_error(
                        format!("{} must have maximum length of {}", attribute_path, max),
                        Some(format!("Got length {}", s.len())),
                    );
                }
            }
        }
    }
}

/// Shorthand for `StringInSliceValidator` with exact matching
pub fn string_in_slice(allowed: &[&str]) -> Arc<dyn Validator> {
    Arc::new(StringInSliceValidator {
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
        ignore_case: false,
    })
}

pub fn lower_case() -> Arc<dyn Validator> {
    Arc::new(LowerCaseValidator)
}

pub fn int_at_least(min: i64) -> Arc<dyn Validator> {
    Arc::new(NumberRangeValidator {
        min: Some(min as f64),
        max: None,
    })
}

/// Absolute http or https URL
pub fn http_url() -> Arc<dyn Validator> {
    static PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| regex::Regex::new(r"^https?://[^\s/]+").expect("literal pattern compiles"))
        .clone();
    Arc::new(StringPatternValidator {
        pattern,
        description: "an http(s) URL".to_string(),
    })
}

pub fn non_empty_string() -> Arc<dyn Validator> {
    Arc::new(StringLengthValidator {
        min: Some(1),
        max: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_in_slice_accepts_listed_value() {
        let validator = string_in_slice(&["fail", "pass-thru"]);
        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::from("pass-thru"), "policy", &mut diags);
        assert!(!diags.has_errors());
    }

    #[test]
    fn string_in_slice_rejects_unlisted_value() {
        let validator = string_in_slice(&["read", "write"]);
        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::from("admin"), "permissions", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("permissions"));
    }

    #[test]
    fn string_in_slice_ignore_case() {
        let validator = StringInSliceValidator {
            allowed: vec!["V2".to_string()],
            ignore_case: true,
        };
        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::from("v2"), "docker_api_version", &mut diags);
        assert!(!diags.has_errors());
    }

    #[test]
    fn lower_case_rejects_mixed_case() {
        let mut diags = Diagnostics::new();
        lower_case().validate(&Dynamic::from("Ldap"), "realm", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("lowercase"));

        let mut diags = Diagnostics::new();
        lower_case().validate(&Dynamic::from("ldap"), "realm", &mut diags);
        assert!(!diags.has_errors());
    }

    #[test]
    fn int_at_least_rejects_negative() {
        let mut diags = Diagnostics::new();
        int_at_least(0).validate(&Dynamic::from(-1), "max_unique_tags", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("at least"));
    }

    #[test]
    fn pattern_validator_reports_description() {
        let validator = StringPatternValidator {
            pattern: regex::Regex::new(r"^https?://").unwrap(),
            description: "an http(s) URL".to_string(),
        };
        let mut diags = Diagnostics::new();
        validator.validate(&Dynamic::from("ftp://mirror"), "url", &mut diags);
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.contains("http(s) URL"));
    }

    #[test]
    fn http_url_accepts_http_and_https() {
        for ok in ["https://registry.npmjs.org", "http://repo1.maven.org/maven2/"] {
            let mut diags = Diagnostics::new();
            http_url().validate(&Dynamic::from(ok), "url", &mut diags);
            assert!(!diags.has_errors(), "{}", ok);
        }
        let mut diags = Diagnostics::new();
        http_url().validate(&Dynamic::from("registry.npmjs.org"), "url", &mut diags);
        assert!(diags.has_errors());
    }

    #[test]
    fn validators_ignore_other_types() {
        let mut diags = Diagnostics::new();
        non_empty_string().validate(&Dynamic::Bool(true), "flag", &mut diags);
        assert!(!diags.has_errors());
    }
}
