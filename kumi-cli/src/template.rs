//! Option and argument templates.
//!
//! Options are declared as `-n|--name <VALUE>`: short names, long names and at
//! most one trailing value, which is `<REQUIRED>` or `[OPTIONAL]`. Arguments are
//! declared as `<NAME>` (required) or `[NAME]` (optional).

use crate::error::{TemplateError, TemplateErrorKind};

/// The value part of an option template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueTemplate {
    pub name: String,
    pub optional: bool,
}

/// Parsed option template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTemplate {
    pub long_names: Vec<String>,
    pub short_names: Vec<char>,
    pub value: Option<ValueTemplate>,
}

/// Parsed argument template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentTemplate {
    pub value_name: String,
    pub required: bool,
}

/// Parse an option template such as `-p|--port [PORT]`.
pub fn parse_option_template(template: &str) -> Result<OptionTemplate, TemplateError> {
    let fail = |kind| TemplateError::new(template, kind);

    let parts: Vec<&str> = template
        .split(|c: char| c.is_whitespace() || c == '|')
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(fail(TemplateErrorKind::Empty));
    }

    let mut result = OptionTemplate {
        long_names: Vec::new(),
        short_names: Vec::new(),
        value: None,
    };

    for part in parts {
        if let Some(value) = parse_value(part) {
            if result.value.is_some() {
                return Err(fail(TemplateErrorKind::MultipleValuesNotSupported));
            }
            let value = value.ok_or_else(|| fail(TemplateErrorKind::ValueHasNoName))?;
            result.value = Some(value);
            continue;
        }

        if result.value.is_some() {
            return Err(fail(TemplateErrorKind::ValueMustBeLast));
        }

        if let Some(name) = part.strip_prefix("--") {
            validate_long_name(name).map_err(fail)?;
            result.long_names.push(name.to_string());
        } else if let Some(name) = part.strip_prefix('-') {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (None, _) => return Err(fail(TemplateErrorKind::OptionHasNoName)),
                (Some(_), Some(_)) => {
                    return Err(fail(TemplateErrorKind::ShortNameTooLong(name.to_string())))
                }
                (Some(c), None) if !c.is_alphabetic() => {
                    return Err(fail(TemplateErrorKind::InvalidShortName(name.to_string())))
                }
                (Some(c), None) => result.short_names.push(c),
            }
        } else {
            return Err(fail(TemplateErrorKind::UnexpectedPart(part.to_string())));
        }
    }

    if result.long_names.is_empty() && result.short_names.is_empty() {
        return Err(fail(TemplateErrorKind::OptionHasNoName));
    }
    Ok(result)
}

/// Parse an argument template: `<NAME>` or `[NAME]`.
pub fn parse_argument_template(template: &str) -> Result<ArgumentTemplate, TemplateError> {
    let trimmed = template.trim();
    if trimmed.is_empty() {
        return Err(TemplateError::new(template, TemplateErrorKind::Empty));
    }
    match parse_value(trimmed) {
        Some(Some(value)) => Ok(ArgumentTemplate {
            value_name: value.name,
            required: !value.optional,
        }),
        Some(None) => Err(TemplateError::new(template, TemplateErrorKind::ValueHasNoName)),
        None => Err(TemplateError::new(template, TemplateErrorKind::InvalidArgument)),
    }
}

/// `None` when `part` is not a value; `Some(None)` when it is an empty one.
fn parse_value(part: &str) -> Option<Option<ValueTemplate>> {
    let (inner, optional) = if let Some(inner) = part.strip_prefix('<').and_then(|p| p.strip_suffix('>')) {
        (inner, false)
    } else if let Some(inner) = part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
        (inner, true)
    } else {
        return None;
    };
    let inner = inner.trim();
    if inner.is_empty() {
        return Some(None);
    }
    Some(Some(ValueTemplate {
        name: inner.to_string(),
        optional,
    }))
}

fn validate_long_name(name: &str) -> Result<(), TemplateErrorKind> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(TemplateErrorKind::OptionHasNoName);
    };
    if chars.next().is_none() {
        return Err(TemplateErrorKind::LongNameTooShort(name.to_string()));
    }
    if first.is_ascii_digit() {
        return Err(TemplateErrorKind::LongNameStartsWithDigit(name.to_string()));
    }
    if let Some(symbol) = name
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(TemplateErrorKind::InvalidLongName {
            name: name.to_string(),
            symbol,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_and_long_with_required_value() {
        let t = parse_option_template("-n|--name <VALUE>").unwrap();
        assert_eq!(t.short_names, vec!['n']);
        assert_eq!(t.long_names, vec!["name".to_string()]);
        assert_eq!(
            t.value,
            Some(ValueTemplate {
                name: "VALUE".to_string(),
                optional: false
            })
        );
    }

    #[test]
    fn test_flag_without_value() {
        let t = parse_option_template("--force").unwrap();
        assert!(t.value.is_none());
        assert!(t.short_names.is_empty());
    }

    #[test]
    fn test_optional_value() {
        let t = parse_option_template("-p|--port [PORT]").unwrap();
        assert!(t.value.map(|v| v.optional).unwrap_or(false));
    }

    #[test]
    fn test_multiple_aliases() {
        let t = parse_option_template("-v|-V|--verbose|--loud").unwrap();
        assert_eq!(t.short_names, vec!['v', 'V']);
        assert_eq!(t.long_names.len(), 2);
    }

    #[test]
    fn test_rejects_multiple_values() {
        let err = parse_option_template("--name <A> <B>").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::MultipleValuesNotSupported);
    }

    #[test]
    fn test_rejects_value_before_name() {
        let err = parse_option_template("<A> --name").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::ValueMustBeLast);
    }

    #[test]
    fn test_rejects_long_short_name() {
        let err = parse_option_template("-ab").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::ShortNameTooLong("ab".to_string()));
    }

    #[test]
    fn test_rejects_one_character_long_name() {
        let err = parse_option_template("--a").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::LongNameTooShort("a".to_string()));
    }

    #[test]
    fn test_rejects_nameless_option() {
        let err = parse_option_template("<VALUE>").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::OptionHasNoName);
    }

    #[test]
    fn test_rejects_unenclosed_value() {
        let err = parse_option_template("--name VALUE").unwrap_err();
        assert_eq!(err.kind, TemplateErrorKind::UnexpectedPart("VALUE".to_string()));
    }

    #[test]
    fn test_argument_templates() {
        let required = parse_argument_template("<PROJECT>").unwrap();
        assert!(required.required);
        assert_eq!(required.value_name, "PROJECT");

        let optional = parse_argument_template("[PATH]").unwrap();
        assert!(!optional.required);

        assert!(parse_argument_template("PATH").is_err());
        assert!(parse_argument_template("<>").is_err());
    }
}
