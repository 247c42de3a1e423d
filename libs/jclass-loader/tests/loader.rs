use std::fs;
use std::path::PathBuf;

use jclass_loader::{ClassIndex, ClassSource, ClassfileLoader, LoadEvent, LoadListener, LoaderConfig, MemorySource, PathSource};
use jclass_reader::ReaderError;
use jclass_tests::ClassBuilder;

fn class_bytes(name: &str) -> Vec<u8> {
	let mut builder = ClassBuilder::new(name);
	builder.default_constructor();
	builder.build()
}

fn sources(groups: Vec<MemorySource>) -> Vec<Box<dyn ClassSource>> {
	groups
		.into_iter()
		.map(|group| Box::new(group) as Box<dyn ClassSource>)
		.collect()
}

#[derive(Default)]
struct Journal(Vec<String>);

impl LoadListener for Journal {
	fn begin_session(&mut self, _: &LoadEvent<'_>) {
		self.0.push("begin session".to_string());
	}

	fn begin_group(&mut self, event: &LoadEvent<'_>) {
		self.0.push(format!("begin group {} {}", event.group.unwrap(), event.size));
	}

	fn begin_file(&mut self, event: &LoadEvent<'_>) {
		self.0.push(format!("begin file {}", event.file.unwrap()));
	}

	fn begin_classfile(&mut self, event: &LoadEvent<'_>) {
		assert!(event.classfile.is_none());
		self.0.push(format!("begin classfile {}", event.file.unwrap()));
	}

	fn end_classfile(&mut self, event: &LoadEvent<'_>) {
		let outcome = match event.classfile {
			Some(class) => class.class_name().unwrap().to_string(),
			None => "failed".to_string(),
		};
		self.0.push(format!("end classfile {outcome}"));
	}

	fn end_file(&mut self, event: &LoadEvent<'_>) {
		self.0.push(format!("end file {}", event.file.unwrap()));
	}

	fn end_group(&mut self, event: &LoadEvent<'_>) {
		self.0.push(format!("end group {}", event.group.unwrap()));
	}

	fn end_session(&mut self, _: &LoadEvent<'_>) {
		self.0.push("end session".to_string());
	}
}

#[test]
fn events_are_nested_and_ordered() {
	let groups = sources(vec![
		MemorySource::new("lib")
			.with("a/A.class", class_bytes("a/A"))
			.with("a/B.class", class_bytes("a/B")),
		MemorySource::new("empty"),
	]);
	let loader = ClassfileLoader::new(LoaderConfig::default().with_threads(1));
	let mut journal = Journal::default();
	let report = loader.load(&groups, &mut journal);

	assert!(report.is_success());
	assert_eq!(report.groups, 2);
	assert_eq!(report.files, 2);
	assert_eq!(
		journal.0,
		[
			"begin session",
			"begin group lib 2",
			"begin file a/A.class",
			"begin classfile a/A.class",
			"end classfile a/A",
			"end file a/A.class",
			"begin file a/B.class",
			"begin classfile a/B.class",
			"end classfile a/B",
			"end file a/B.class",
			"end group lib",
			"begin group empty 0",
			"end group empty",
			"end session",
		]
	);
}

#[test]
fn bad_file_does_not_stop_the_load() {
	let groups = sources(vec![MemorySource::new("lib")
		.with("Good.class", class_bytes("Good"))
		.with("Bad.class", vec![0xde, 0xad, 0xbe, 0xef])
		.with("Also.class", class_bytes("Also"))]);
	let loader = ClassfileLoader::new(LoaderConfig::default());
	let mut journal = Journal::default();
	let report = loader.load(&groups, &mut journal);

	assert!(!report.is_success());
	assert_eq!(report.files, 3);
	let names: Vec<_> = report.classes.iter().map(|c| c.class_name().unwrap().to_string()).collect();
	assert_eq!(names, ["Good", "Also"]);
	assert!(journal.0.contains(&"end classfile failed".to_string()));

	let failure = &report.failures[0];
	assert_eq!(failure.file.as_deref(), Some("Bad.class"));
	assert_eq!(failure.reader_error(), Some(&ReaderError::InvalidMagic));
	assert!(failure.to_string().starts_with("lib: Bad.class: Failed to parse Bad.class"));

	let summary = report.summary().unwrap().to_string();
	assert!(summary.starts_with("1 of 3 files failed to load:"), "{summary}");
	assert!(report.into_result().is_err());
}

#[test]
fn deeply_nested_code_fails_only_its_file() {
	let mut nested = ClassBuilder::new("Nested");
	let mut code = nested.code(1, 1, &[0xb1], &[], vec![]);
	for _ in 0..3000 {
		code = nested.code(1, 1, &[0xb1], &[], vec![code]);
	}
	nested.method(0, "run", "()V", vec![code]);

	let groups = sources(vec![MemorySource::new("lib")
		.with("Nested.class", nested.build())
		.with("Good.class", class_bytes("Good"))]);
	let loader = ClassfileLoader::new(LoaderConfig::default().with_threads(2));
	let report = loader.load(&groups, &mut ());

	assert_eq!(report.classes.len(), 1);
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].file.as_deref(), Some("Nested.class"));
	assert!(matches!(
		report.failures[0].reader_error(),
		Some(ReaderError::MalformedStructure { .. })
	));
}

#[test]
fn version_limit_applies_to_every_file() {
	let mut modern = ClassBuilder::new("Modern");
	modern.version(61, 0);
	let groups = sources(vec![MemorySource::new("lib")
		.with("Old.class", class_bytes("Old"))
		.with("Modern.class", modern.build())]);
	let loader = ClassfileLoader::new(LoaderConfig::default().with_max_major_version(Some(52)));
	let report = loader.load(&groups, &mut ());

	assert_eq!(report.classes.len(), 1);
	assert!(matches!(
		report.failures[0].reader_error(),
		Some(ReaderError::UnsupportedVersion { major: 61, .. })
	));
}

#[test]
fn worker_threads_keep_entry_order() {
	let mut group = MemorySource::new("many");
	for i in 0..64 {
		if i % 9 == 4 {
			group.push(format!("Broken{i}.class"), vec![0xca, 0xfe]);
		} else {
			group.push(format!("C{i}.class"), class_bytes(&format!("C{i}")));
		}
	}
	let groups: Vec<Box<dyn ClassSource>> = vec![Box::new(group)];

	let mut sequential = Journal::default();
	let one = ClassfileLoader::new(LoaderConfig::default().with_threads(1)).load(&groups, &mut sequential);
	let mut parallel = Journal::default();
	let many = ClassfileLoader::new(LoaderConfig::default().with_threads(8)).load(&groups, &mut parallel);

	assert_eq!(sequential.0, parallel.0);
	assert_eq!(one.classes, many.classes);
	assert_eq!(one.failures.len(), 7);
	assert_eq!(many.failures.len(), 7);
}

#[test]
fn index_tracks_reloads() {
	let index = ClassIndex::new();
	let loader = ClassfileLoader::new(LoaderConfig::default());

	let first = sources(vec![
		MemorySource::new("app")
			.with("A.class", class_bytes("A"))
			.with("B.class", class_bytes("B")),
		MemorySource::new("lib").with("L.class", class_bytes("L")),
	]);
	loader.load(&first, &mut &index);
	assert_eq!(index.names(), ["A", "B", "L"]);
	assert_eq!(index.added(), ["A", "B", "L"]);
	assert!(index.removed().is_empty());

	// B disappears, C shows up, A stays; the other group is untouched.
	let second = sources(vec![
		MemorySource::new("app")
			.with("A.class", class_bytes("A"))
			.with("C.class", class_bytes("C")),
		MemorySource::new("lib").with("L.class", class_bytes("L")),
	]);
	loader.load(&second, &mut &index);
	assert_eq!(index.names(), ["A", "C", "L"]);
	assert_eq!(index.added(), ["C"]);
	assert_eq!(index.removed(), ["B"]);
	assert!(index.get("A").unwrap().find_method("<init>", "()V").is_some());
	assert!(!index.contains("B"));
	assert_eq!(index.len(), 3);
}

#[test]
fn index_keeps_names_other_groups_provide() {
	let index = ClassIndex::new();
	let loader = ClassfileLoader::new(LoaderConfig::default());

	let first = sources(vec![
		MemorySource::new("a")
			.with("p/X.class", class_bytes("p/X"))
			.with("p/Y.class", class_bytes("p/Y")),
		MemorySource::new("b").with("p/X.class", class_bytes("p/X")),
	]);
	loader.load(&first, &mut &index);
	assert_eq!(index.names(), ["p/X", "p/Y"]);

	// "a" drops both; "b" still has p/X
	let second = sources(vec![
		MemorySource::new("a"),
		MemorySource::new("b").with("p/X.class", class_bytes("p/X")),
	]);
	loader.load(&second, &mut &index);
	assert!(index.contains("p/X"));
	assert_eq!(index.names(), ["p/X"]);
	assert_eq!(index.removed(), ["p/Y"]);
	assert!(index.added().is_empty());

	// once "b" drops it too, it goes
	let third = sources(vec![MemorySource::new("a"), MemorySource::new("b")]);
	loader.load(&third, &mut &index);
	assert!(index.is_empty());
	assert_eq!(index.removed(), ["p/X"]);
}

#[test]
fn listeners_combine() {
	let index = ClassIndex::new();
	let groups = sources(vec![MemorySource::new("app").with("A.class", class_bytes("A"))]);
	let mut both = (Journal::default(), &index);
	ClassfileLoader::new(LoaderConfig::default()).load(&groups, &mut both);
	assert!(index.contains("A"));
	assert_eq!(both.0 .0.len(), 8);
}

struct Unlistable;

impl ClassSource for Unlistable {
	fn name(&self) -> String {
		"broken".to_string()
	}

	fn entries(&self) -> eyre::Result<Vec<String>> {
		eyre::bail!("cannot list")
	}

	fn read(&self, entry: &str) -> eyre::Result<Vec<u8>> {
		eyre::bail!("cannot read {entry}")
	}
}

#[test]
fn unlistable_group() {
	let groups: Vec<Box<dyn ClassSource>> = vec![
		Box::new(Unlistable),
		Box::new(MemorySource::new("app").with("A.class", class_bytes("A"))),
	];
	let mut journal = Journal::default();
	let report = ClassfileLoader::new(LoaderConfig::default()).load(&groups, &mut journal);

	assert_eq!(report.classes.len(), 1);
	assert_eq!(report.failures.len(), 1);
	assert!(report.failures[0].file.is_none());
	assert!(report.failures[0].reader_error().is_none());
	assert_eq!(journal.0[1..3], ["begin group broken 0", "end group broken"]);
}

fn scratch_dir(name: &str) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("jclass-loader-{name}-{}", std::process::id()));
	let _ = fs::remove_dir_all(&dir);
	fs::create_dir_all(dir.join("pkg")).unwrap();
	dir
}

#[test]
fn directory_source() {
	let dir = scratch_dir("directory");
	fs::write(dir.join("pkg").join("Zed.class"), class_bytes("pkg/Zed")).unwrap();
	fs::write(dir.join("Alpha.class"), class_bytes("Alpha")).unwrap();
	fs::write(dir.join("notes.txt"), b"not a class").unwrap();

	let source = PathSource::new(dir.clone());
	let entries = source.entries().unwrap();
	assert_eq!(entries.len(), 2);
	assert!(entries[0].ends_with("Alpha.class"));
	assert!(entries[1].ends_with("Zed.class"));

	let single = PathSource::new(dir.join("Alpha.class"));
	assert_eq!(single.entries().unwrap().len(), 1);
	assert!(PathSource::new(dir.join("missing")).entries().is_err());

	let groups: Vec<Box<dyn ClassSource>> = vec![Box::new(source)];
	let report = ClassfileLoader::new(LoaderConfig::default()).load(&groups, &mut ());
	assert!(report.is_success());
	let names: Vec<_> = report.classes.iter().map(|c| c.class_name().unwrap().to_string()).collect();
	assert_eq!(names, ["Alpha", "pkg/Zed"]);

	fs::remove_dir_all(&dir).unwrap();
}
