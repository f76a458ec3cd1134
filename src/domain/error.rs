//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent structural violations of a domain description.
/// Parse-phase variants carry the offending line text and its 1-based number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Line {number}, error in {line:?}, no known element type matched")]
    UnknownElementType { line: String, number: usize },

    #[error(
        "Line {number}, syntax error in {line:?} has no father element. \
         You can only increment indentation by one tabulation per line"
    )]
    IndentationTooDeep { line: String, number: usize },

    #[error("Line {number}, error in {line:?}, space is not permitted in indentation")]
    SpaceInIndentation { line: String, number: usize },

    #[error("Line {number}, syntax error in {line:?}, {parent} should not have a {child} child")]
    ChildNotPermitted {
        line: String,
        number: usize,
        parent: &'static str,
        child: &'static str,
    },

    #[error("Configurations in domain '{domain}' do not all set the same parameters")]
    UndefinedParameter { domain: String },
}

impl DomainError {
    /// True for errors raised while reading lines, false for propagation errors.
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, DomainError::UndefinedParameter { .. })
    }
}

/// Non-fatal findings: the line is skipped and parsing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    #[error("Line {number}, warning : {line:?} is an empty line and has been omitted")]
    EmptyLine { line: String, number: usize },

    #[error("Line {number}, warning : {line:?} is a commentary and has been omitted")]
    Comment { line: String, number: usize },
}

impl ParseWarning {
    pub fn number(&self) -> usize {
        match self {
            ParseWarning::EmptyLine { number, .. } | ParseWarning::Comment { number, .. } => {
                *number
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_are_distinguished_from_consistency_errors() {
        let parse = DomainError::UnknownElementType {
            line: "???".into(),
            number: 3,
        };
        let consistency = DomainError::UndefinedParameter { domain: "D".into() };
        assert!(parse.is_parse_error());
        assert!(!consistency.is_parse_error());
    }

    #[test]
    fn test_messages_carry_line_number_and_text() {
        let err = DomainError::ChildNotPermitted {
            line: "\tdomain: X".into(),
            number: 7,
            parent: "domain",
            child: "domain",
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Line 7,"), "{msg}");
        assert!(msg.contains("domain should not have a domain child"), "{msg}");
    }
}
