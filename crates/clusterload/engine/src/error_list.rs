//! Concurrent error aggregation

use crate::error::ExecutionError;
use parking_lot::Mutex;

/// Append-only list of failures shared by concurrently running units.
///
/// Appends from any number of tasks are serialized on an internal lock, so
/// no error is ever dropped. Ordering across concurrent appenders follows lock
/// acquisition order and is not otherwise guaranteed.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Mutex<Vec<ExecutionError>>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, error: ExecutionError) {
        self.errors.lock().push(error);
    }

    /// Move every error of `other` to the end of this list.
    pub fn concat(&self, other: ErrorList) {
        let other = other.into_errors();
        if other.is_empty() {
            return;
        }
        self.errors.lock().extend(other);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    /// Drain the list into a new one, leaving this one empty.
    pub fn take(&self) -> ErrorList {
        let errors = std::mem::take(&mut *self.errors.lock());
        ErrorList {
            errors: Mutex::new(errors),
        }
    }

    pub fn any(&self, predicate: impl Fn(&ExecutionError) -> bool) -> bool {
        self.errors.lock().iter().any(predicate)
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.lock().iter().map(ToString::to_string).collect()
    }

    pub fn into_errors(self) -> Vec<ExecutionError> {
        self.errors.into_inner()
    }
}

impl From<ExecutionError> for ErrorList {
    fn from(error: ExecutionError) -> Self {
        Self {
            errors: Mutex::new(vec![error]),
        }
    }
}

impl FromIterator<ExecutionError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = ExecutionError>>(iter: I) -> Self {
        Self {
            errors: Mutex::new(iter.into_iter().collect()),
        }
    }
}

impl std::fmt::Display for ErrorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let errors = self.errors.lock();
        write!(f, "{} error(s)", errors.len())?;
        for error in errors.iter() {
            write!(f, "\n  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}
