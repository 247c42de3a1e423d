use std::sync::Arc;

use jclass_reader::ClassInfo;

/// What a listener is told. Fields that do not apply to a notification are `None` or zero:
/// `size` is only set on group notifications, `classfile` only on `end_classfile`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadEvent<'a> {
	pub group: Option<&'a str>,
	pub size: usize,
	pub file: Option<&'a str>,
	/// `None` when the file failed to load.
	pub classfile: Option<&'a Arc<ClassInfo>>,
}

impl<'a> LoadEvent<'a> {
	pub fn session() -> LoadEvent<'a> {
		LoadEvent::default()
	}

	pub fn group(group: &'a str, size: usize) -> LoadEvent<'a> {
		LoadEvent {
			group: Some(group),
			size,
			..LoadEvent::default()
		}
	}

	pub fn file(group: &'a str, file: &'a str) -> LoadEvent<'a> {
		LoadEvent {
			group: Some(group),
			file: Some(file),
			..LoadEvent::default()
		}
	}
}

/// Notifications of a load, always paired and properly nested:
/// session > group > file > classfile.
#[allow(unused_variables)]
pub trait LoadListener {
	fn begin_session(&mut self, event: &LoadEvent<'_>) {}
	fn begin_group(&mut self, event: &LoadEvent<'_>) {}
	fn begin_file(&mut self, event: &LoadEvent<'_>) {}
	fn begin_classfile(&mut self, event: &LoadEvent<'_>) {}
	fn end_classfile(&mut self, event: &LoadEvent<'_>) {}
	fn end_file(&mut self, event: &LoadEvent<'_>) {}
	fn end_group(&mut self, event: &LoadEvent<'_>) {}
	fn end_session(&mut self, event: &LoadEvent<'_>) {}
}

impl LoadListener for () {}

impl<L: LoadListener + ?Sized> LoadListener for &mut L {
	fn begin_session(&mut self, event: &LoadEvent<'_>) {
		(**self).begin_session(event)
	}

	fn begin_group(&mut self, event: &LoadEvent<'_>) {
		(**self).begin_group(event)
	}

	fn begin_file(&mut self, event: &LoadEvent<'_>) {
		(**self).begin_file(event)
	}

	fn begin_classfile(&mut self, event: &LoadEvent<'_>) {
		(**self).begin_classfile(event)
	}

	fn end_classfile(&mut self, event: &LoadEvent<'_>) {
		(**self).end_classfile(event)
	}

	fn end_file(&mut self, event: &LoadEvent<'_>) {
		(**self).end_file(event)
	}

	fn end_group(&mut self, event: &LoadEvent<'_>) {
		(**self).end_group(event)
	}

	fn end_session(&mut self, event: &LoadEvent<'_>) {
		(**self).end_session(event)
	}
}

/// Both listeners, first `A` then `B`.
impl<A: LoadListener, B: LoadListener> LoadListener for (A, B) {
	fn begin_session(&mut self, event: &LoadEvent<'_>) {
		self.0.begin_session(event);
		self.1.begin_session(event);
	}

	fn begin_group(&mut self, event: &LoadEvent<'_>) {
		self.0.begin_group(event);
		self.1.begin_group(event);
	}

	fn begin_file(&mut self, event: &LoadEvent<'_>) {
		self.0.begin_file(event);
		self.1.begin_file(event);
	}

	fn begin_classfile(&mut self, event: &LoadEvent<'_>) {
		self.0.begin_classfile(event);
		self.1.begin_classfile(event);
	}

	fn end_classfile(&mut self, event: &LoadEvent<'_>) {
		self.0.end_classfile(event);
		self.1.end_classfile(event);
	}

	fn end_file(&mut self, event: &LoadEvent<'_>) {
		self.0.end_file(event);
		self.1.end_file(event);
	}

	fn end_group(&mut self, event: &LoadEvent<'_>) {
		self.0.end_group(event);
		self.1.end_group(event);
	}

	fn end_session(&mut self, event: &LoadEvent<'_>) {
		self.0.end_session(event);
		self.1.end_session(event);
	}
}
