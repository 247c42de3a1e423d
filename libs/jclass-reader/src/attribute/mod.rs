use nom::combinator::map;
use nom::error::context;
use nom::multi::{length_count, length_data};
use nom::number::complete::{be_u16, be_u32, be_u8};
use nom::sequence::pair;
use tracing::trace;

pub use crate::attribute::annotation::*;
pub use crate::attribute::module::*;
pub use crate::attribute::record::RecordComponent;
pub use crate::attribute::stack_map::*;
pub use crate::attribute::tables::*;
pub use crate::attribute::type_annotation::*;
use crate::code::Code;
use crate::error::{fault, malformed};
use crate::{
	be_cp, ClassConst, ConstPtr, ConstantInfo, ConstantPool, IResult, NameAndTypeConst, PackageConst,
	ReaderError, UTF8Const,
};

mod annotation;
mod module;
mod record;
mod stack_map;
mod tables;
mod type_annotation;

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeInfo {
	ConstantValue {
		constant: ConstPtr<ConstantInfo>,
	},
	Code(Code),
	StackMapTable {
		frames: Vec<StackMapFrame>,
	},
	Exceptions {
		exceptions: Vec<ConstPtr<ClassConst>>,
	},
	InnerClasses {
		classes: Vec<InnerClass>,
	},
	EnclosingMethod {
		class: ConstPtr<ClassConst>,
		/// Absent when the class is not enclosed by a method or constructor.
		method: ConstPtr<NameAndTypeConst>,
	},
	Synthetic,
	Signature {
		signature: ConstPtr<UTF8Const>,
	},
	SourceFile {
		source_file: ConstPtr<UTF8Const>,
	},
	SourceDebugExtension {
		debug_extension: Vec<u8>,
	},
	LineNumberTable {
		line_numbers: Vec<LineNumber>,
	},
	LocalVariableTable {
		local_variables: Vec<LocalVariable>,
	},
	LocalVariableTypeTable {
		local_variable_types: Vec<LocalVariableType>,
	},
	Deprecated,
	RuntimeVisibleAnnotations {
		annotations: Vec<Annotation>,
	},
	RuntimeInvisibleAnnotations {
		annotations: Vec<Annotation>,
	},
	RuntimeVisibleParameterAnnotations {
		parameters: Vec<ParameterAnnotation>,
	},
	RuntimeInvisibleParameterAnnotations {
		parameters: Vec<ParameterAnnotation>,
	},
	RuntimeVisibleTypeAnnotations {
		annotations: Vec<TypeAnnotation>,
	},
	RuntimeInvisibleTypeAnnotations {
		annotations: Vec<TypeAnnotation>,
	},
	AnnotationDefault {
		value: ElementValue,
	},
	BootstrapMethods {
		methods: Vec<BootstrapMethod>,
	},
	MethodParameters {
		parameters: Vec<MethodParameter>,
	},
	Module(Module),
	ModulePackages {
		packages: Vec<ConstPtr<PackageConst>>,
	},
	ModuleMainClass {
		main_class: ConstPtr<ClassConst>,
	},
	NestHost {
		host: ConstPtr<ClassConst>,
	},
	NestMembers {
		classes: Vec<ConstPtr<ClassConst>>,
	},
	PermittedSubclasses {
		classes: Vec<ConstPtr<ClassConst>>,
	},
	Record {
		components: Vec<RecordComponent>,
	},
	/// Any attribute this reader has no grammar for, payload kept verbatim.
	Custom {
		name: ConstPtr<UTF8Const>,
		info: Vec<u8>,
	},
}

/// Attribute lists inside `Code` and `Record` payloads nested deeper than this are rejected.
const MAX_NESTING: usize = 8;

impl AttributeInfo {
	pub fn parse_list<'a>(input: &'a [u8], constant_pool: &ConstantPool) -> IResult<'a, Vec<Self>> {
		Self::parse_list_nested(input, constant_pool, 0)
	}

	pub(crate) fn parse_list_nested<'a>(
		input: &'a [u8],
		constant_pool: &ConstantPool,
		depth: usize,
	) -> IResult<'a, Vec<Self>> {
		if depth > MAX_NESTING {
			return Err(malformed(input, "attributes nested too deeply"));
		}

		context(
			"Attributes",
			length_count(be_u16, |input| AttributeInfo::parse_nested(input, constant_pool, depth)),
		)(input)
	}

	pub fn parse<'a>(input: &'a [u8], constant_pool: &ConstantPool) -> IResult<'a, Self> {
		Self::parse_nested(input, constant_pool, 0)
	}

	fn parse_nested<'a>(input: &'a [u8], constant_pool: &ConstantPool, depth: usize) -> IResult<'a, Self> {
		let (rest, name) = be_cp::<UTF8Const>(input)?;
		let (rest, payload) = length_data(be_u32)(rest)?;
		let text = constant_pool.utf8(name).map_err(|error| fault(input, error))?;

		trace!("attribute {text} ({} bytes)", payload.len());
		let cp = constant_pool;
		let (remaining, attribute) = match text {
			"ConstantValue" => map(be_cp, |constant| AttributeInfo::ConstantValue { constant })(payload)?,
			"Code" => context(
				"Code",
				map(|input| Code::parse_nested(input, cp, depth + 1), AttributeInfo::Code),
			)(payload)?,
			"StackMapTable" => context(
				"StackMapTable",
				map(length_count(be_u16, StackMapFrame::parse), |frames| {
					AttributeInfo::StackMapTable { frames }
				}),
			)(payload)?,
			"Exceptions" => map(length_count(be_u16, be_cp), |exceptions| AttributeInfo::Exceptions {
				exceptions,
			})(payload)?,
			"InnerClasses" => map(length_count(be_u16, InnerClass::parse), |classes| {
				AttributeInfo::InnerClasses { classes }
			})(payload)?,
			"EnclosingMethod" => map(pair(be_cp, be_cp), |(class, method)| AttributeInfo::EnclosingMethod {
				class,
				method,
			})(payload)?,
			"Synthetic" => (payload, AttributeInfo::Synthetic),
			"Signature" => map(be_cp, |signature| AttributeInfo::Signature { signature })(payload)?,
			"SourceFile" => map(be_cp, |source_file| AttributeInfo::SourceFile { source_file })(payload)?,
			"SourceDebugExtension" => (
				&payload[payload.len()..],
				AttributeInfo::SourceDebugExtension {
					debug_extension: payload.to_vec(),
				},
			),
			"LineNumberTable" => map(length_count(be_u16, LineNumber::parse), |line_numbers| {
				AttributeInfo::LineNumberTable { line_numbers }
			})(payload)?,
			"LocalVariableTable" => map(length_count(be_u16, LocalVariable::parse), |local_variables| {
				AttributeInfo::LocalVariableTable { local_variables }
			})(payload)?,
			"LocalVariableTypeTable" => map(length_count(be_u16, LocalVariableType::parse), |local_variable_types| {
				AttributeInfo::LocalVariableTypeTable {
					local_variable_types,
				}
			})(payload)?,
			"Deprecated" => (payload, AttributeInfo::Deprecated),
			"RuntimeVisibleAnnotations" => context(
				"RuntimeVisibleAnnotations",
				map(length_count(be_u16, Annotation::parse), |annotations| {
					AttributeInfo::RuntimeVisibleAnnotations { annotations }
				}),
			)(payload)?,
			"RuntimeInvisibleAnnotations" => context(
				"RuntimeInvisibleAnnotations",
				map(length_count(be_u16, Annotation::parse), |annotations| {
					AttributeInfo::RuntimeInvisibleAnnotations { annotations }
				}),
			)(payload)?,
			"RuntimeVisibleParameterAnnotations" => map(parse_parameter_annotations, |parameters| {
				AttributeInfo::RuntimeVisibleParameterAnnotations { parameters }
			})(payload)?,
			"RuntimeInvisibleParameterAnnotations" => map(parse_parameter_annotations, |parameters| {
				AttributeInfo::RuntimeInvisibleParameterAnnotations { parameters }
			})(payload)?,
			"RuntimeVisibleTypeAnnotations" => context(
				"RuntimeVisibleTypeAnnotations",
				map(length_count(be_u16, TypeAnnotation::parse), |annotations| {
					AttributeInfo::RuntimeVisibleTypeAnnotations { annotations }
				}),
			)(payload)?,
			"RuntimeInvisibleTypeAnnotations" => context(
				"RuntimeInvisibleTypeAnnotations",
				map(length_count(be_u16, TypeAnnotation::parse), |annotations| {
					AttributeInfo::RuntimeInvisibleTypeAnnotations { annotations }
				}),
			)(payload)?,
			"AnnotationDefault" => map(ElementValue::parse, |value| AttributeInfo::AnnotationDefault { value })(payload)?,
			"BootstrapMethods" => map(length_count(be_u16, BootstrapMethod::parse), |methods| {
				AttributeInfo::BootstrapMethods { methods }
			})(payload)?,
			"MethodParameters" => map(length_count(be_u8, MethodParameter::parse), |parameters| {
				AttributeInfo::MethodParameters { parameters }
			})(payload)?,
			"Module" => context("Module", map(Module::parse, AttributeInfo::Module))(payload)?,
			"ModulePackages" => map(length_count(be_u16, be_cp), |packages| AttributeInfo::ModulePackages {
				packages,
			})(payload)?,
			"ModuleMainClass" => map(be_cp, |main_class| AttributeInfo::ModuleMainClass { main_class })(payload)?,
			"NestHost" => map(be_cp, |host| AttributeInfo::NestHost { host })(payload)?,
			"NestMembers" => map(length_count(be_u16, be_cp), |classes| AttributeInfo::NestMembers {
				classes,
			})(payload)?,
			"PermittedSubclasses" => map(length_count(be_u16, be_cp), |classes| {
				AttributeInfo::PermittedSubclasses { classes }
			})(payload)?,
			"Record" => context(
				"Record",
				map(|input| record::parse_components(input, cp, depth + 1), |components| {
					AttributeInfo::Record { components }
				}),
			)(payload)?,
			_ => {
				trace!("keeping {text} as a custom attribute");
				(
					&payload[payload.len()..],
					AttributeInfo::Custom {
						name,
						info: payload.to_vec(),
					},
				)
			}
		};

		if !remaining.is_empty() {
			return Err(malformed(
				remaining,
				format!(
					"{text} attribute declares {} bytes but only {} were decoded",
					payload.len(),
					payload.len() - remaining.len()
				),
			));
		}

		Ok((rest, attribute))
	}

	/// The attribute name as stored in the class file.
	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		Ok(match self {
			AttributeInfo::ConstantValue { .. } => "ConstantValue",
			AttributeInfo::Code(_) => "Code",
			AttributeInfo::StackMapTable { .. } => "StackMapTable",
			AttributeInfo::Exceptions { .. } => "Exceptions",
			AttributeInfo::InnerClasses { .. } => "InnerClasses",
			AttributeInfo::EnclosingMethod { .. } => "EnclosingMethod",
			AttributeInfo::Synthetic => "Synthetic",
			AttributeInfo::Signature { .. } => "Signature",
			AttributeInfo::SourceFile { .. } => "SourceFile",
			AttributeInfo::SourceDebugExtension { .. } => "SourceDebugExtension",
			AttributeInfo::LineNumberTable { .. } => "LineNumberTable",
			AttributeInfo::LocalVariableTable { .. } => "LocalVariableTable",
			AttributeInfo::LocalVariableTypeTable { .. } => "LocalVariableTypeTable",
			AttributeInfo::Deprecated => "Deprecated",
			AttributeInfo::RuntimeVisibleAnnotations { .. } => "RuntimeVisibleAnnotations",
			AttributeInfo::RuntimeInvisibleAnnotations { .. } => "RuntimeInvisibleAnnotations",
			AttributeInfo::RuntimeVisibleParameterAnnotations { .. } => "RuntimeVisibleParameterAnnotations",
			AttributeInfo::RuntimeInvisibleParameterAnnotations { .. } => "RuntimeInvisibleParameterAnnotations",
			AttributeInfo::RuntimeVisibleTypeAnnotations { .. } => "RuntimeVisibleTypeAnnotations",
			AttributeInfo::RuntimeInvisibleTypeAnnotations { .. } => "RuntimeInvisibleTypeAnnotations",
			AttributeInfo::AnnotationDefault { .. } => "AnnotationDefault",
			AttributeInfo::BootstrapMethods { .. } => "BootstrapMethods",
			AttributeInfo::MethodParameters { .. } => "MethodParameters",
			AttributeInfo::Module(_) => "Module",
			AttributeInfo::ModulePackages { .. } => "ModulePackages",
			AttributeInfo::ModuleMainClass { .. } => "ModuleMainClass",
			AttributeInfo::NestHost { .. } => "NestHost",
			AttributeInfo::NestMembers { .. } => "NestMembers",
			AttributeInfo::PermittedSubclasses { .. } => "PermittedSubclasses",
			AttributeInfo::Record { .. } => "Record",
			AttributeInfo::Custom { name, .. } => return cp.utf8(*name),
		})
	}

	/// Annotations carried directly by this attribute, visible and invisible alike.
	pub fn annotations(&self) -> &[Annotation] {
		match self {
			AttributeInfo::RuntimeVisibleAnnotations { annotations }
			| AttributeInfo::RuntimeInvisibleAnnotations { annotations } => annotations,
			_ => &[],
		}
	}
}
