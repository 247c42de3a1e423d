use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use jclass_reader::ClassInfo;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::{LoadEvent, LoadListener};

/// Internal class name to class file, kept in sync with repeated loads of the same groups.
///
/// The listener is implemented on `&ClassIndex`, so the index can be read from other threads
/// while a load is filling it.
#[derive(Debug, Default)]
pub struct ClassIndex {
	inner: RwLock<IndexInner>,
}

#[derive(Debug, Default)]
struct IndexInner {
	classes: AHashMap<String, Arc<ClassInfo>>,
	/// Class names each group produced on its latest load.
	groups: AHashMap<String, AHashSet<String>>,
	current: AHashSet<String>,
	added: Vec<String>,
	removed: Vec<String>,
}

impl ClassIndex {
	pub fn new() -> ClassIndex {
		ClassIndex::default()
	}

	pub fn get(&self, name: &str) -> Option<Arc<ClassInfo>> {
		self.inner.read().classes.get(name).cloned()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.inner.read().classes.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.inner.read().classes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.read().classes.is_empty()
	}

	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.inner.read().classes.keys().cloned().collect();
		names.sort();
		names
	}

	/// Classes that were new to the index during the latest session.
	pub fn added(&self) -> Vec<String> {
		self.inner.read().added.clone()
	}

	/// Classes dropped during the latest session because no group produces them anymore.
	pub fn removed(&self) -> Vec<String> {
		self.inner.read().removed.clone()
	}
}

impl LoadListener for &ClassIndex {
	fn begin_session(&mut self, _: &LoadEvent<'_>) {
		let mut inner = self.inner.write();
		inner.added.clear();
		inner.removed.clear();
	}

	fn begin_group(&mut self, _: &LoadEvent<'_>) {
		self.inner.write().current.clear();
	}

	fn end_classfile(&mut self, event: &LoadEvent<'_>) {
		let Some(class) = event.classfile else {
			return;
		};
		let Ok(name) = class.class_name() else {
			return;
		};

		let mut inner = self.inner.write();
		inner.current.insert(name.to_string());
		if inner.classes.insert(name.to_string(), class.clone()).is_none() {
			trace!("indexed {name}");
			inner.added.push(name.to_string());
		}
	}

	fn end_group(&mut self, event: &LoadEvent<'_>) {
		let Some(group) = event.group else {
			return;
		};

		let mut inner = self.inner.write();
		let current = std::mem::take(&mut inner.current);
		let previous = inner.groups.insert(group.to_string(), current.clone());

		let mut gone: Vec<String> = previous
			.unwrap_or_default()
			.into_iter()
			.filter(|name| !current.contains(name))
			.collect();
		gone.sort();
		for name in gone {
			debug!("{name} disappeared from {group}");
			// another group still provides it
			if inner.groups.values().any(|names| names.contains(&name)) {
				continue;
			}
			inner.classes.remove(&name);
			inner.removed.push(name);
		}
	}
}
