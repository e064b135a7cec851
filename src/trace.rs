//! Errors that remember where they were raised.
//!
//! In debug builds a `Traced` error captures a backtrace at the moment it is
//! created, which is printed along with the error when it is logged with
//! `{:?}`. In release builds it is a plain wrapper.

use std::{backtrace::Backtrace, error::Error, fmt, ops::Deref};


pub type Result<T, E> = std::result::Result<T, Traced<E>>;

pub struct Traced<E> {
	inner: E,
	backtrace: Option<Backtrace>,
}

pub trait Traceable<E> {
	fn trace(self) -> Traced<E>;
}


/// Fails with the given error, capturing a backtrace.
pub fn err<T, E>(inner: E) -> Result<T, E> { Err(Traced::new(inner)) }


impl<E> Traced<E> {
	pub fn new(inner: E) -> Self {
		let backtrace = if cfg!(debug_assertions) {
			Some(Backtrace::force_capture())
		} else {
			None
		};
		Self { inner, backtrace }
	}
}

impl<E> Traceable<E> for E {
	fn trace(self) -> Traced<E> { Traced::new(self) }
}

impl<E> From<E> for Traced<E> {
	fn from(other: E) -> Self { Self::new(other) }
}

impl<E> Deref for Traced<E> {
	type Target = E;

	fn deref(&self) -> &E { &self.inner }
}

impl<E: fmt::Debug> fmt::Debug for Traced<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.backtrace {
			Some(b) => write!(f, "{:?}\n{}", self.inner, b),
			None => write!(f, "{:?}", self.inner),
		}
	}
}

impl<E: fmt::Display> fmt::Display for Traced<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.inner, f) }
}

impl<E: Error> Error for Traced<E> {
	fn source(&self) -> Option<&(dyn Error + 'static)> { self.inner.source() }
}
