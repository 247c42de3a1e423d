//! Decoder for the JVM class file format.
//!
//! [`ClassInfo::parse_complete`] turns the bytes of one class file into an immutable model.
//! Symbolic references stay indices into the [`ConstantPool`] and are resolved on access, so
//! every accessor that names something returns a `Result`.

macro_rules! flag_predicates {
	($TY:ty, $FLAGS:ident { $($name:ident => $flag:ident),* $(,)? }) => {
		impl $TY {
			$(
			pub fn $name(&self) -> bool {
				self.access_flags.contains($FLAGS::$flag)
			}
			)*
		}
	};
}

pub use attribute::*;
pub use class::*;
pub use code::*;
pub use config::ReaderConfig;
pub use consts::*;
pub use deprecation::DeprecationDetector;
pub use error::{ParsingError, ParsingErrorPart, PoolProblem, ReaderError};
pub use field::*;
pub use method::*;
pub use metrics::MetricsGatherer;
pub use visitor::*;

mod attribute;
mod class;
mod code;
mod config;
mod consts;
mod deprecation;
mod error;
mod field;
mod method;
mod metrics;
mod visitor;

pub type IResult<'a, O> = nom::IResult<&'a [u8], O, ParsingError<'a>>;
