//! Default-value source expressions

use std::fmt;

/// Name under which declarations refer to the backing record
pub const BACKING_RECORD: &str = "edited";

/// Where an attribute's default value comes from
///
/// The string notation accepted by [`SourceExpression::parse`]:
///
/// | notation      | meaning                                           |
/// |---------------|---------------------------------------------------|
/// | `edited`      | backing record, same-named field (the default)    |
/// | `edited.f`    | backing record, field `f`                         |
/// | `obj`         | related object `obj`, same-named field            |
/// | `obj.f`       | related object `obj`, field `f`                   |
/// | `.m`          | method `m` on the editor itself                   |
/// | empty         | no default                                        |
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceExpression {
    /// Backing record's same-named field
    #[default]
    Backing,
    /// Backing record's named field
    BackingField(String),
    /// Field of a named related object; the attribute name when `field` is `None`
    Related {
        object: String,
        field: Option<String>,
    },
    /// Method on the editor itself
    Method(String),
    /// No default at all
    Nothing,
}

impl SourceExpression {
    /// Parse the string notation
    #[must_use]
    pub fn parse(expr: &str) -> Self {
        let expr = expr.trim();
        if expr.is_empty() {
            return SourceExpression::Nothing;
        }
        if let Some(method) = expr.strip_prefix('.') {
            return SourceExpression::Method(method.to_string());
        }
        match expr.split_once('.') {
            Some((BACKING_RECORD, field)) => SourceExpression::BackingField(field.to_string()),
            Some((object, field)) => SourceExpression::Related {
                object: object.to_string(),
                field: Some(field.to_string()),
            },
            None if expr == BACKING_RECORD => SourceExpression::Backing,
            None => SourceExpression::Related {
                object: expr.to_string(),
                field: None,
            },
        }
    }

    /// Field read on the source object for the given attribute
    #[must_use]
    pub fn field_for<'a>(&'a self, attribute: &'a str) -> &'a str {
        match self {
            SourceExpression::BackingField(field)
            | SourceExpression::Related {
                field: Some(field), ..
            } => field.as_str(),
            _ => attribute,
        }
    }
}

impl fmt::Display for SourceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceExpression::Backing => write!(f, "{BACKING_RECORD}"),
            SourceExpression::BackingField(field) => write!(f, "{BACKING_RECORD}.{field}"),
            SourceExpression::Related {
                object,
                field: Some(field),
            } => write!(f, "{object}.{field}"),
            SourceExpression::Related { object, field: None } => write!(f, "{object}"),
            SourceExpression::Method(method) => write!(f, ".{method}"),
            SourceExpression::Nothing => Ok(()),
        }
    }
}

impl From<&str> for SourceExpression {
    fn from(expr: &str) -> Self {
        Self::parse(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_notation() {
        assert_eq!(SourceExpression::parse("edited"), SourceExpression::Backing);
        assert_eq!(SourceExpression::parse(""), SourceExpression::Nothing);
        assert_eq!(
            SourceExpression::parse(".timestamp_str"),
            SourceExpression::Method("timestamp_str".to_string())
        );
        assert_eq!(
            SourceExpression::parse("related.id"),
            SourceExpression::Related {
                object: "related".to_string(),
                field: Some("id".to_string()),
            }
        );
        assert_eq!(
            SourceExpression::parse("related"),
            SourceExpression::Related {
                object: "related".to_string(),
                field: None,
            }
        );
        assert_eq!(
            SourceExpression::parse("edited.label"),
            SourceExpression::BackingField("label".to_string())
        );
    }

    #[test]
    fn test_field_for() {
        assert_eq!(SourceExpression::Backing.field_for("name"), "name");
        assert_eq!(SourceExpression::parse("related.id").field_for("related_id"), "id");
        assert_eq!(SourceExpression::parse("related").field_for("description"), "description");
    }

    #[test]
    fn test_display_matches_notation() {
        for expr in ["edited", "edited.label", "related", "related.id", ".method"] {
            assert_eq!(SourceExpression::parse(expr).to_string(), expr);
        }
    }
}
