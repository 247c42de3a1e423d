use std::error::Error;

use eyre::Report;
use nom::error::{ErrorKind, FromExternalError, ParseError};
use thiserror::Error;

/// Everything that can go wrong while decoding one class file.
///
/// Offsets in [`ReaderError::MalformedStructure`] are absolute byte positions in the class file,
/// the ones in [`ReaderError::MalformedBytecode`] are positions inside the method's code array.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum ReaderError {
	#[error("not a class file: bad magic number")]
	InvalidMagic,
	#[error("unsupported class file version {major}.{minor}, newest accepted major version is {max}")]
	UnsupportedVersion { major: u16, minor: u16, max: u16 },
	#[error("malformed constant pool entry #{index}: {problem}")]
	MalformedConstantPool { index: u16, problem: PoolProblem },
	#[error("malformed structure at byte {offset}: {context}")]
	MalformedStructure { offset: usize, context: String },
	#[error("malformed bytecode at pc {offset} (opcode {opcode:#04x}): {reason}")]
	MalformedBytecode {
		offset: usize,
		opcode: u8,
		reason: &'static str,
	},
}

#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum PoolProblem {
	#[error("index 0 does not name an entry")]
	Absent,
	#[error("index past the end of the pool ({slots} slots)")]
	OutOfRange { slots: usize },
	#[error("second slot of a long or double is not an entry")]
	Unusable,
	#[error("expected {expected}, found {found}")]
	WrongKind {
		expected: &'static str,
		found: &'static str,
	},
	#[error("unknown tag {0}")]
	UnknownTag(u8),
	#[error("unknown method handle reference kind {0}")]
	InvalidReferenceKind(u8),
	#[error("invalid modified UTF-8")]
	InvalidUtf8,
}

type ExternalError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Debug)]
pub struct ParsingError<'a> {
	parts: Vec<(&'a [u8], ParsingErrorPart)>,
}

impl<'a> ParsingError<'a> {
	pub fn new(input: &'a [u8], part: ParsingErrorPart) -> ParsingError<'a> {
		ParsingError {
			parts: vec![(input, part)],
		}
	}

	/// Renders every frame, innermost first, as a report chain.
	pub fn format(self, source: &[u8]) -> Report {
		let mut report: Option<Report> = None;
		for (remaining, part) in self.parts.into_iter() {
			let location = offset_in(source, remaining);
			let string = part.format(location);

			report = Some(match (report, part) {
				(None, ParsingErrorPart::External(external)) => {
					eyre::eyre!(external).wrap_err(format!("[{location}..] External Error:"))
				}
				(None, _) => Report::msg(string),
				(Some(old_report), _) => old_report.wrap_err(string),
			});
		}

		report.unwrap_or_else(|| Report::msg("Unknown error"))
	}

	/// Collapses the frames into the error taxonomy. A typed root cause wins, otherwise the
	/// innermost frame's position and the context trail become a structural error.
	pub fn into_reader_error(self, source: &[u8]) -> ReaderError {
		let mut trail = Vec::new();
		let mut first = None;
		for (remaining, part) in self.parts {
			let location = offset_in(source, remaining);
			match part {
				ParsingErrorPart::Fault(error) => return error,
				ParsingErrorPart::Structure(message) => {
					first.get_or_insert((location, message));
				}
				ParsingErrorPart::External(error) => {
					first.get_or_insert((location, error.to_string()));
				}
				ParsingErrorPart::NomError(kind) => {
					first.get_or_insert((location, kind.description().to_string()));
				}
				ParsingErrorPart::Context(context) => trail.push(context),
			}
		}

		let (offset, message) = first.unwrap_or_else(|| (0, "unknown error".to_string()));
		let mut context: Vec<&str> = trail.into_iter().rev().collect();
		context.push(&message);
		ReaderError::MalformedStructure {
			offset,
			context: context.join(": "),
		}
	}
}

#[derive(Debug)]
pub enum ParsingErrorPart {
	Fault(ReaderError),
	Structure(String),
	External(ExternalError),
	Context(&'static str),
	NomError(ErrorKind),
}

impl ParsingErrorPart {
	pub fn format(&self, location: usize) -> String {
		let mut output = format!("[{location}..] ");
		match self {
			ParsingErrorPart::Fault(error) => {
				output.push_str(&error.to_string());
			}
			ParsingErrorPart::Structure(message) => {
				output.push_str("Malformed: ");
				output.push_str(message);
			}
			ParsingErrorPart::External(error) => {
				output.push_str("External: ");
				output.push_str(&error.to_string());
			}
			ParsingErrorPart::Context(context) => {
				output.push_str("Context: ");
				output.push_str(context)
			}
			ParsingErrorPart::NomError(error) => {
				output.push_str("Nom: ");
				output.push_str(error.description())
			}
		}

		output
	}
}

impl<'a> ParseError<&'a [u8]> for ParsingError<'a> {
	fn from_error_kind(input: &'a [u8], kind: ErrorKind) -> Self {
		ParsingError::new(input, ParsingErrorPart::NomError(kind))
	}

	fn append(input: &'a [u8], kind: ErrorKind, mut other: Self) -> Self {
		other.parts.push((input, ParsingErrorPart::NomError(kind)));
		other
	}
}

impl<'a, E> FromExternalError<&'a [u8], E> for ParsingError<'a>
where
	E: Error + Send + Sync + 'static,
{
	fn from_external_error(input: &'a [u8], _: ErrorKind, e: E) -> Self {
		ParsingError::new(input, ParsingErrorPart::External(Box::new(e)))
	}
}

impl<'a> nom::error::ContextError<&'a [u8]> for ParsingError<'a> {
	fn add_context(input: &'a [u8], ctx: &'static str, mut other: Self) -> Self {
		other.parts.push((input, ParsingErrorPart::Context(ctx)));
		other
	}
}

/// Position of `remaining` inside `source`. Attribute payloads are parsed from sub-slices of the
/// class file, so the distance is taken between the slices' start pointers.
fn offset_in(source: &[u8], remaining: &[u8]) -> usize {
	let start = source.as_ptr() as usize;
	let at = remaining.as_ptr() as usize;
	if at >= start && at <= start + source.len() {
		at - start
	} else {
		source.len().saturating_sub(remaining.len())
	}
}

/// Aborts the parse with a typed cause.
pub(crate) fn fault(input: &[u8], error: ReaderError) -> nom::Err<ParsingError<'_>> {
	nom::Err::Failure(ParsingError::new(input, ParsingErrorPart::Fault(error)))
}

/// Aborts the parse with a structural error located at `input`.
pub(crate) fn malformed(input: &[u8], message: impl Into<String>) -> nom::Err<ParsingError<'_>> {
	nom::Err::Failure(ParsingError::new(
		input,
		ParsingErrorPart::Structure(message.into()),
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use nom::error::ContextError;

	#[test]
	fn context_trail() {
		let source = [0u8; 8];
		let error = ParsingError::from_error_kind(&source[6..], ErrorKind::Eof);
		let error = ParsingError::add_context(&source[4..], "Code", error);
		let error = ParsingError::add_context(&source[0..], "Methods", error);
		assert_eq!(
			error.into_reader_error(&source),
			ReaderError::MalformedStructure {
				offset: 6,
				context: "Methods: Code: End of file".to_string()
			}
		);
	}

	#[test]
	fn fault_wins() {
		let source = [0u8; 4];
		let error = ParsingError::new(&source[2..], ParsingErrorPart::Fault(ReaderError::InvalidMagic));
		let error = ParsingError::add_context(&source[..], "Header", error);
		assert_eq!(error.into_reader_error(&source), ReaderError::InvalidMagic);
	}

	#[test]
	fn report_chain() {
		let source = [0u8; 4];
		let error = ParsingError::new(&source[1..], ParsingErrorPart::Structure("bad".to_string()));
		let report = error.format(&source);
		assert_eq!(report.to_string(), "[1..] Malformed: bad");
	}
}
