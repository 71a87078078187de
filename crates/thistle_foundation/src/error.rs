//! Error types for the Thistle system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//!
//! Note that a failed verb *resolution* is not an error anywhere in the
//! system; dispatch represents it as an empty result and moves on to the
//! next candidate object.

use std::fmt;

use thiserror::Error;

use crate::id::{ClassId, ObjectId};
use crate::types::Type;

/// The main error type for Thistle operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an object not found error.
    #[must_use]
    pub fn object_not_found(id: ObjectId) -> Self {
        Self::new(ErrorKind::ObjectNotFound(id))
    }

    /// Creates a class not found error.
    #[must_use]
    pub fn class_not_found(id: ClassId) -> Self {
        Self::new(ErrorKind::ClassNotFound(id))
    }

    /// Creates a reference failure for a symbolic object reference.
    #[must_use]
    pub fn reference_failure(reference: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceFailure(reference.into()))
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(handler: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch {
            handler: handler.into(),
            expected,
            actual,
        })
    }

    /// Creates a parameter type mismatch error.
    #[must_use]
    pub fn type_mismatch(parameter: impl Into<String>, expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            parameter: parameter.into(),
            expected,
            actual,
        })
    }

    /// Creates a privilege violation error.
    #[must_use]
    pub fn privilege_violation(handler: impl Into<String>) -> Self {
        Self::new(ErrorKind::PrivilegeViolation(handler.into()))
    }

    /// Creates an execution fault with the handler's name.
    #[must_use]
    pub fn execution_fault(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExecutionFault {
            handler: handler.into(),
            message: message.into(),
        })
    }

    /// Creates an undefined symbol error.
    #[must_use]
    pub fn undefined_symbol(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedSymbol(name.into()))
    }

    /// Creates a script limit exceeded error.
    #[must_use]
    pub fn limit_exceeded(limit: ScriptLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Object was not found in the store.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// Class was not found in the store.
    #[error("class not found: {0}")]
    ClassNotFound(ClassId),

    /// Property not found on an object.
    #[error("property not found: {property} on {object}")]
    PropertyNotFound {
        /// The object that was queried.
        object: ObjectId,
        /// The property name that was not found.
        property: String,
    },

    /// A symbolic object reference failed to resolve.
    #[error("cannot resolve reference: {0}")]
    ReferenceFailure(String),

    /// Wrong number of arguments to a function.
    #[error("{handler}: expected {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// Name of the function being called.
        handler: String,
        /// Declared parameter count.
        expected: usize,
        /// Actual argument count.
        actual: usize,
    },

    /// A function argument did not satisfy its declared parameter type.
    #[error("parameter {parameter}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The parameter name.
        parameter: String,
        /// The declared type.
        expected: Type,
        /// The type of the value supplied.
        actual: Type,
    },

    /// An administrative handler was invoked from a nested call.
    #[error("administrative verb {0} cannot be invoked from a script")]
    PrivilegeViolation(String),

    /// A fault during handler body evaluation.
    #[error("error in {handler}: {message}")]
    ExecutionFault {
        /// The handler that faulted.
        handler: String,
        /// The fault message.
        message: String,
    },

    /// Symbol was not defined in the script environment.
    #[error("undefined symbol: {0}")]
    UndefinedSymbol(String),

    /// Division by zero in a script.
    #[error("division by zero")]
    DivisionByZero,

    /// Index out of bounds in a script.
    #[error("index out of bounds: {index} (length {length})")]
    IndexOutOfBounds {
        /// The index that was accessed.
        index: usize,
        /// The actual length of the collection.
        length: usize,
    },

    /// Parse error in the script dialect.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// Script limit exceeded (runaway handler cut off).
    #[error("limit exceeded: {0}")]
    LimitExceeded(ScriptLimit),

    /// Filesystem error while loading sources.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Limits that bound handler execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLimit {
    /// Maximum evaluation steps exceeded.
    MaxSteps {
        /// The configured limit.
        limit: u64,
    },
    /// Maximum expression nesting depth exceeded.
    MaxDepth {
        /// The configured limit.
        limit: u32,
    },
    /// Maximum nested handler call depth exceeded.
    MaxCallDepth {
        /// The configured limit.
        limit: u32,
    },
}

impl fmt::Display for ScriptLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxSteps { limit } => write!(f, "max evaluation steps ({limit}) exceeded"),
            Self::MaxDepth { limit } => write!(f, "max nesting depth ({limit}) exceeded"),
            Self::MaxCallDepth { limit } => write!(f, "max call depth ({limit}) exceeded"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file or handler name.
    pub source: Option<String>,
    /// Stack of handler invocations.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
