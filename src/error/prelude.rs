//! A "prelude" for easily importing the most common error handling items.

pub use super::{Context, ErrorCategory, PoolError, Result};

pub use crate::{bail, ensure, error};
