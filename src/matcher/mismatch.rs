use std::fmt::{self, Formatter};

use super::ArgMatcher;
use crate::{expression::Member, value::Arg};

/// Why a setup did not match a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// The call accessed a different member altogether.
    Member { expected: Member, actual: Member },
    /// Same member, but at least one argument failed its matcher.
    Arguments(ArgumentsMismatch),
    /// Member and arguments matched but the guard did not hold.
    Condition,
}

/// Per-argument detail of an argument mismatch, with expected and
/// actual values already padded to the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentsMismatch {
    arguments: Vec<ArgumentMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ArgumentMatch {
    did_match: bool,
    expected: String,
    actual: String,
}

impl Mismatch {
    pub(super) fn member(expected: Member, actual: Member) -> Self {
        Mismatch::Member { expected, actual }
    }

    pub(super) fn arguments(expected: &[ArgMatcher], actual: &[Arg], results: &[bool]) -> Self {
        let arguments = expected
            .iter()
            .zip(actual)
            .zip(results)
            .map(|((expected, actual), &did_match)| {
                let expected = expected.to_string();
                let actual = format!("{:?}", actual);
                let width = expected.len().max(actual.len());

                ArgumentMatch {
                    did_match,
                    expected: format!("{:<width$}", expected, width = width),
                    actual: format!("{:<width$}", actual, width = width),
                }
            })
            .collect();

        Mismatch::Arguments(ArgumentsMismatch { arguments })
    }

    /// Positions of the arguments that failed to match, empty unless
    /// this is an argument mismatch.
    pub fn mismatched_positions(&self) -> Vec<usize> {
        match self {
            Mismatch::Arguments(mismatch) => mismatch
                .arguments
                .iter()
                .enumerate()
                .filter(|(_, arg)| !arg.did_match)
                .map(|(i, _)| i)
                .collect(),
            _ => vec![],
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Member { expected, actual } => write!(
                f,
                "Member did not match.
  Expected: {}
  Actual:   {}",
                expected, actual
            ),
            Mismatch::Arguments(mismatch) => fmt::Display::fmt(mismatch, f),
            Mismatch::Condition => f.write_str("Condition of the setup did not hold."),
        }
    }
}

impl fmt::Display for ArgumentsMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.arguments.len() == 1 {
            let ArgumentMatch {
                expected, actual, ..
            } = &self.arguments[0];

            return write!(
                f,
                "Argument did not match.
  Expected: {}
  Actual:   {}",
                expected, actual
            );
        }

        f.write_str("Arguments did not match\n")?;

        let expected: Vec<_> = self.arguments.iter().map(|a| a.expected.as_str()).collect();
        writeln!(f, "  Expected: [{}]", expected.join(", "))?;

        let actual: Vec<_> = self.arguments.iter().map(|a| a.actual.as_str()).collect();
        writeln!(f, "  Actual:   [{}]", actual.join(", "))?;

        let mismatches: Vec<_> = self
            .arguments
            .iter()
            .enumerate()
            .filter(|(_, arg)| !arg.did_match)
            .map(|(i, arg)| {
                format!(
                    "  Argument {}:
    Expected: {}
    Actual:   {}",
                    i, arg.expected, arg.actual
                )
            })
            .collect();

        f.write_str(&mismatches.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        matcher::{self, explain, Mismatch},
        CallEvent, Expression,
    };

    #[test]
    fn single_argument() {
        let expression = Expression::method("get", (matcher::eq(3),));
        let error = explain(&expression, &CallEvent::method("get", (4,))).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Argument did not match.
  Expected: 3
  Actual:   4"
        );
    }

    #[test]
    fn multiple_arguments() {
        let expression =
            Expression::method("put", (matcher::eq(1), matcher::any(), matcher::eq("b")));
        let error = explain(&expression, &CallEvent::method("put", (1, 2, "c"))).unwrap_err();

        assert_eq!(error.mismatched_positions(), vec![2]);
        assert_eq!(
            error.to_string(),
            "Arguments did not match
  Expected: [1, _, \"b\"]
  Actual:   [1, 2, \"c\"]
  Argument 2:
    Expected: \"b\"
    Actual:   \"c\""
        );
    }

    #[test]
    fn different_member() {
        let expression = Expression::property("Name");
        let error = explain(&expression, &CallEvent::method("Name", ())).unwrap_err();
        assert!(matches!(error, Mismatch::Member { .. }));
    }
}
