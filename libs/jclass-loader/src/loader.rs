use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use crossbeam::channel::unbounded;
use eyre::Context;
use jclass_reader::ClassInfo;
use tracing::{debug, info, warn};

use crate::{ClassSource, LoadEvent, LoadFailure, LoadListener, LoadReport, LoaderConfig};

pub struct ClassfileLoader {
	config: LoaderConfig,
}

impl ClassfileLoader {
	pub fn new(config: LoaderConfig) -> ClassfileLoader {
		ClassfileLoader { config }
	}

	pub fn config(&self) -> &LoaderConfig {
		&self.config
	}

	/// Loads every source as one session. Files may be parsed on worker threads but the
	/// listener always hears about them in source and entry order, on the calling thread.
	pub fn load<L: LoadListener + ?Sized>(
		&self,
		sources: &[Box<dyn ClassSource>],
		listener: &mut L,
	) -> LoadReport {
		let mut report = LoadReport::default();

		debug!("begin session ({} groups)", sources.len());
		listener.begin_session(&LoadEvent::session());
		for source in sources {
			self.load_group(source.as_ref(), listener, &mut report);
		}
		listener.end_session(&LoadEvent::session());

		info!(
			"Loaded {} classes from {} files, {} failures",
			report.classes.len(),
			report.files,
			report.failures.len()
		);
		report
	}

	fn load_group<L: LoadListener + ?Sized>(
		&self,
		source: &dyn ClassSource,
		listener: &mut L,
		report: &mut LoadReport,
	) {
		let group = source.name();
		report.groups += 1;

		let entries = match source.entries().wrap_err_with(|| format!("Listing {group}")) {
			Ok(entries) => entries,
			Err(error) => {
				warn!("{group}: {error:#}");
				let event = LoadEvent::group(&group, 0);
				listener.begin_group(&event);
				listener.end_group(&event);
				report.failures.push(LoadFailure {
					group,
					file: None,
					error,
				});
				return;
			}
		};

		let event = LoadEvent::group(&group, entries.len());
		debug!("begin group {group} ({} files)", entries.len());
		listener.begin_group(&event);
		self.parse_entries(source, &entries, |index, result| {
			deliver(&group, &entries[index], result, listener, report)
		});
		debug!("end group {group}");
		listener.end_group(&event);
	}

	fn parse(&self, source: &dyn ClassSource, entry: &str) -> eyre::Result<ClassInfo> {
		let bytes = source.read(entry)?;
		let class = ClassInfo::parse_with(&bytes, &self.config.reader)
			.wrap_err_with(|| format!("Failed to parse {entry}"))?;
		Ok(class)
	}

	/// Hands every parse result to `sink` in entry order.
	fn parse_entries(
		&self,
		source: &dyn ClassSource,
		entries: &[String],
		mut sink: impl FnMut(usize, eyre::Result<ClassInfo>),
	) {
		let threads = self.config.threads.min(entries.len());
		if threads <= 1 {
			for (index, entry) in entries.iter().enumerate() {
				sink(index, self.parse(source, entry));
			}
			return;
		}

		let (job_sender, jobs) = unbounded::<usize>();
		let (result_sender, results) = unbounded();
		for index in 0..entries.len() {
			// The receiving half is alive, sending cannot fail.
			let _ = job_sender.send(index);
		}
		drop(job_sender);

		thread::scope(|scope| {
			for _ in 0..threads {
				let jobs = jobs.clone();
				let done = result_sender.clone();
				scope.spawn(move || {
					for index in jobs.iter() {
						if done.send((index, self.parse(source, &entries[index]))).is_err() {
							break;
						}
					}
				});
			}
			drop(result_sender);

			// Results arrive in completion order.
			let mut pending = BTreeMap::new();
			let mut next = 0;
			for (index, result) in results.iter() {
				pending.insert(index, result);
				while let Some(result) = pending.remove(&next) {
					sink(next, result);
					next += 1;
				}
			}
		});
	}
}

fn deliver<L: LoadListener + ?Sized>(
	group: &str,
	file: &str,
	result: eyre::Result<ClassInfo>,
	listener: &mut L,
	report: &mut LoadReport,
) {
	report.files += 1;
	let event = LoadEvent::file(group, file);
	debug!("begin file {file}");
	listener.begin_file(&event);
	listener.begin_classfile(&event);

	let classfile = match result {
		Ok(class) => Some(Arc::new(class)),
		Err(error) => {
			warn!("{file}: {error:#}");
			report.failures.push(LoadFailure {
				group: group.to_string(),
				file: Some(file.to_string()),
				error,
			});
			None
		}
	};

	listener.end_classfile(&LoadEvent {
		classfile: classfile.as_ref(),
		..event
	});
	listener.end_file(&event);
	debug!("end file {file}");

	if let Some(class) = classfile {
		report.classes.push(class);
	}
}
