//! Result type aliases.

use crate::FourierError;

/// A specialized `Result` type for Fourier operations.
pub type FourierResult<T> = Result<T, FourierError>;

/// A boxed future returning a `FourierResult`.
pub type BoxFuture<'a, T> =
    std::pin::Pin<Box<dyn std::future::Future<Output = FourierResult<T>> + Send + 'a>>;
