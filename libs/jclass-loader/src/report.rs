use std::fmt::{Display, Formatter};
use std::sync::Arc;

use eyre::eyre;
use jclass_reader::{ClassInfo, ReaderError};

/// One file, or a whole group when its entries could not be listed.
#[derive(Debug)]
pub struct LoadFailure {
	pub group: String,
	pub file: Option<String>,
	pub error: eyre::Report,
}

impl LoadFailure {
	/// The decoding error behind the failure, if the bytes were read but did not parse.
	pub fn reader_error(&self) -> Option<&ReaderError> {
		self.error.downcast_ref::<ReaderError>()
	}
}

impl Display for LoadFailure {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match &self.file {
			Some(file) => write!(f, "{}: {file}: {:#}", self.group, self.error),
			None => write!(f, "{}: {:#}", self.group, self.error),
		}
	}
}

/// Outcome of one [`crate::ClassfileLoader::load`] call.
#[derive(Debug, Default)]
pub struct LoadReport {
	pub groups: usize,
	pub files: usize,
	/// Successfully parsed classes, in load order.
	pub classes: Vec<Arc<ClassInfo>>,
	pub failures: Vec<LoadFailure>,
}

impl LoadReport {
	pub fn is_success(&self) -> bool {
		self.failures.is_empty()
	}

	/// A single error listing every failure, `None` when everything loaded.
	pub fn summary(&self) -> Option<eyre::Report> {
		if self.failures.is_empty() {
			return None;
		}

		let lines: Vec<String> = self.failures.iter().map(|failure| failure.to_string()).collect();
		Some(eyre!(
			"{} of {} files failed to load:\n{}",
			self.failures.len(),
			self.files,
			lines.join("\n")
		))
	}

	pub fn into_result(self) -> eyre::Result<Vec<Arc<ClassInfo>>> {
		match self.summary() {
			Some(report) => Err(report),
			None => Ok(self.classes),
		}
	}
}
