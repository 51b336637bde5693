//! The seam between scripts and a task's live state.

use blockplay_types::Value;
use thiserror::Error;

/// What a host function reports back to the interpreter.
///
/// Domain violations and success are ordinary outcomes, checked by the
/// interpreter after every call; both halt the run with a message for the
/// learner.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// Keep running; the value is the call's result.
    Continue(Value),
    /// The call was rejected; task state is unchanged.
    DomainViolation(String),
    /// The call was committed and solved the task.
    Success(String),
}

/// A host function could not be run at all. Faults the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument(s), got {got}")]
    ArgumentCount {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("{function}: argument {index} must be a finite number, got {got}")]
    InvalidArgument {
        function: String,
        index: usize,
        got: String,
    },
}

/// Host functions a task exposes to scripts.
///
/// Each call gets exclusive access to the task state for its duration, so
/// read-validate-commit sequences inside one call are atomic.
pub trait HostFunctions {
    fn call(&mut self, name: &str, args: &[Value]) -> Result<CallOutcome, HostError>;
}

impl<H: HostFunctions + ?Sized> HostFunctions for &mut H {
    fn call(&mut self, name: &str, args: &[Value]) -> Result<CallOutcome, HostError> {
        (**self).call(name, args)
    }
}

impl<H: HostFunctions + ?Sized> HostFunctions for Box<H> {
    fn call(&mut self, name: &str, args: &[Value]) -> Result<CallOutcome, HostError> {
        (**self).call(name, args)
    }
}

/// Check the argument count of a host call.
pub fn expect_args(function: &str, args: &[Value], expected: usize) -> Result<(), HostError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(HostError::ArgumentCount {
            function: function.to_string(),
            expected,
            got: args.len(),
        })
    }
}

/// Argument `index` as a finite number.
pub fn number_arg(function: &str, args: &[Value], index: usize) -> Result<f64, HostError> {
    match args.get(index) {
        Some(Value::Number(n)) if n.is_finite() => Ok(*n),
        other => Err(HostError::InvalidArgument {
            function: function.to_string(),
            index,
            got: other.map_or_else(|| "nothing".to_string(), |v| match v {
                Value::Str(s) => format!("'{s}'"),
                v => v.to_string(),
            }),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_arg_rejects_non_finite_and_non_numbers() {
        let args = [
            Value::Number(2.0),
            Value::Number(f64::NAN),
            Value::from("3"),
            Value::Undefined,
        ];
        assert_eq!(number_arg("f", &args, 0), Ok(2.0));
        assert_eq!(
            number_arg("f", &args, 1).unwrap_err().to_string(),
            "f: argument 1 must be a finite number, got NaN"
        );
        assert_eq!(
            number_arg("f", &args, 2).unwrap_err().to_string(),
            "f: argument 2 must be a finite number, got '3'"
        );
        assert!(number_arg("f", &args, 3).is_err());
        assert!(number_arg("f", &args, 9).is_err());
    }

    #[test]
    fn expect_args_reports_counts() {
        assert!(expect_args("g", &[], 0).is_ok());
        assert_eq!(
            expect_args("g", &[Value::Undefined], 0),
            Err(HostError::ArgumentCount {
                function: "g".into(),
                expected: 0,
                got: 1
            })
        );
    }
}
