use crate::ReaderError;

/// Policy knobs for [`crate::ClassInfo::parse_with`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReaderConfig {
	/// Newest major version accepted. `None` accepts every version.
	pub max_major_version: Option<u16>,
}

impl ReaderConfig {
	pub fn check_version(&self, major: u16, minor: u16) -> Result<(), ReaderError> {
		match self.max_major_version {
			Some(max) if major > max => Err(ReaderError::UnsupportedVersion { major, minor, max }),
			_ => Ok(()),
		}
	}
}
