use jclass_reader::ReaderConfig;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoaderConfig {
	pub reader: ReaderConfig,
	/// Worker threads parsing the files of one group. `1` parses on the calling thread.
	pub threads: usize,
}

impl LoaderConfig {
	pub fn with_threads(mut self, threads: usize) -> LoaderConfig {
		self.threads = threads.max(1);
		self
	}

	pub fn with_max_major_version(mut self, max: Option<u16>) -> LoaderConfig {
		self.reader.max_major_version = max;
		self
	}
}

impl Default for LoaderConfig {
	fn default() -> Self {
		LoaderConfig {
			reader: ReaderConfig::default(),
			threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
		}
	}
}
