use std::fs::read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::{bail, Context};
use walkdir::WalkDir;

/// A group of class files, a directory or a set of in-memory blobs.
pub trait ClassSource: Send + Sync {
	/// Group name reported in load events.
	fn name(&self) -> String;

	/// Entry names in load order.
	fn entries(&self) -> eyre::Result<Vec<String>>;

	fn read(&self, entry: &str) -> eyre::Result<Vec<u8>>;
}

impl<S: ClassSource + ?Sized> ClassSource for Arc<S> {
	fn name(&self) -> String {
		(**self).name()
	}

	fn entries(&self) -> eyre::Result<Vec<String>> {
		(**self).entries()
	}

	fn read(&self, entry: &str) -> eyre::Result<Vec<u8>> {
		(**self).read(entry)
	}
}

/// Named byte blobs, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
	name: String,
	entries: Vec<(String, Vec<u8>)>,
}

impl MemorySource {
	pub fn new(name: impl Into<String>) -> MemorySource {
		MemorySource {
			name: name.into(),
			entries: vec![],
		}
	}

	pub fn with(mut self, entry: impl Into<String>, bytes: Vec<u8>) -> MemorySource {
		self.push(entry, bytes);
		self
	}

	pub fn push(&mut self, entry: impl Into<String>, bytes: Vec<u8>) {
		self.entries.push((entry.into(), bytes));
	}
}

impl ClassSource for MemorySource {
	fn name(&self) -> String {
		self.name.clone()
	}

	fn entries(&self) -> eyre::Result<Vec<String>> {
		Ok(self.entries.iter().map(|(name, _)| name.clone()).collect())
	}

	fn read(&self, entry: &str) -> eyre::Result<Vec<u8>> {
		match self.entries.iter().find(|(name, _)| name == entry) {
			Some((_, bytes)) => Ok(bytes.clone()),
			None => bail!("No entry {entry} in {}", self.name),
		}
	}
}

/// A single `.class` file, or a directory searched recursively for them.
#[derive(Clone, Debug)]
pub struct PathSource {
	path: PathBuf,
}

impl PathSource {
	pub fn new(path: impl Into<PathBuf>) -> PathSource {
		PathSource { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

fn is_class_file(path: &Path) -> bool {
	path.extension().and_then(|x| x.to_str()) == Some("class")
}

impl ClassSource for PathSource {
	fn name(&self) -> String {
		self.path.display().to_string()
	}

	fn entries(&self) -> eyre::Result<Vec<String>> {
		if self.path.is_file() {
			return Ok(vec![self.path.display().to_string()]);
		}
		if !self.path.is_dir() {
			bail!("{} is neither a file nor a directory", self.path.display());
		}

		let mut entries = vec![];
		for entry in WalkDir::new(&self.path).sort_by(|a, b| a.file_name().cmp(b.file_name())) {
			let entry = entry.wrap_err_with(|| format!("Walking {}", self.path.display()))?;
			if entry.file_type().is_file() && is_class_file(entry.path()) {
				entries.push(entry.path().display().to_string());
			}
		}
		Ok(entries)
	}

	fn read(&self, entry: &str) -> eyre::Result<Vec<u8>> {
		read(entry).wrap_err_with(|| format!("Reading {entry}"))
	}
}
