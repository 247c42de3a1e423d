use std::path::PathBuf;

use clap::{ArgAction, Parser};
use jclass_loader::{ClassSource, ClassfileLoader, LoaderConfig, PathSource};
use jclass_reader::{visit_classfiles, Chain, MetricsGatherer};
use tracing::{debug, Level};

use crate::outline::Outline;

mod outline;

/// Decodes Java class files and prints an outline of each class.
#[derive(Debug, Parser)]
#[command(name = "jclass")]
struct Args {
	/// More logging, repeat for more detail.
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,

	/// Reject class files newer than this major version.
	#[arg(long, value_name = "MAJOR")]
	max_major: Option<u16>,

	/// Parser threads, defaults to the available parallelism.
	#[arg(long, value_name = "N")]
	threads: Option<usize>,

	/// `.class` files, or directories searched for them.
	#[arg(required = true, value_name = "PATH")]
	paths: Vec<PathBuf>,
}

fn level(verbose: u8) -> Level {
	match verbose {
		0 => Level::WARN,
		1 => Level::INFO,
		2 => Level::DEBUG,
		_ => Level::TRACE,
	}
}

fn main() -> eyre::Result<()> {
	let args = Args::parse();
	jclass_core::init_with(level(args.verbose));
	debug!("{args:?}");

	let mut config = LoaderConfig::default().with_max_major_version(args.max_major);
	if let Some(threads) = args.threads {
		config = config.with_threads(threads);
	}
	let sources: Vec<Box<dyn ClassSource>> = args
		.paths
		.iter()
		.map(|path| Box::new(PathSource::new(path.clone())) as Box<dyn ClassSource>)
		.collect();

	let report = ClassfileLoader::new(config).load(&sources, &mut ());

	let mut visitor = Chain(Outline::new(), MetricsGatherer::new());
	visit_classfiles(&mut visitor, report.classes.iter().map(|class| class.as_ref()));
	let (outline, metrics) = visitor.into_inner();
	print!("{}", outline.finish());
	print_metrics(&metrics);

	match report.summary() {
		Some(summary) => Err(summary),
		None => Ok(()),
	}
}

fn print_metrics(metrics: &MetricsGatherer) {
	println!();
	println!(
		"{} classes, {} interfaces ({} public, {} abstract, {} final, {} synthetic, {} deprecated)",
		metrics.classes,
		metrics.interfaces,
		metrics.public_classes,
		metrics.abstract_classes,
		metrics.final_classes,
		metrics.synthetic_classes,
		metrics.deprecated_classes
	);
	println!(
		"{} fields ({} public, {} static, {} synthetic, {} deprecated)",
		metrics.fields, metrics.public_fields, metrics.static_fields, metrics.synthetic_fields, metrics.deprecated_fields
	);
	println!(
		"{} methods ({} public, {} static, {} abstract, {} native, {} synthetic, {} deprecated)",
		metrics.methods,
		metrics.public_methods,
		metrics.static_methods,
		metrics.abstract_methods,
		metrics.native_methods,
		metrics.synthetic_methods,
		metrics.deprecated_methods
	);
	println!(
		"{} instructions, {} undecodable code arrays, {} custom attributes",
		metrics.instructions, metrics.bytecode_errors, metrics.custom_attributes
	);
	for (mnemonic, count) in metrics.opcode_histogram().iter().take(10) {
		println!("    {count:>8} {mnemonic}");
	}
}
