use jclass_core::Type;
use nom::combinator::map;
use nom::error::context;
use nom::multi::length_count;
use nom::number::complete::{be_u16, be_u8};
use nom::sequence::pair;

use crate::error::malformed;
use crate::{
	be_cp, ConstPtr, ConstantPool, DoubleConst, FloatConst, IResult, IntegerConst, LongConst, ReaderError,
	UTF8Const,
};

/// Nested annotations and arrays deeper than this are rejected instead of recursing further.
const MAX_NESTING: usize = 256;

/// The annotation type marking deprecated elements.
pub const DEPRECATED_DESCRIPTOR: &str = "Ljava/lang/Deprecated;";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
	/// Field descriptor of the annotation interface, `Ljava/lang/Deprecated;`.
	pub type_index: ConstPtr<UTF8Const>,
	pub pairs: Vec<ElementValuePair>,
}

impl Annotation {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		Self::parse_nested(input, 0)
	}

	fn parse_nested(input: &[u8], depth: usize) -> IResult<'_, Self> {
		let (input, type_index) = be_cp(input)?;
		let (input, pairs) = length_count(be_u16, |input| {
			let (input, name) = be_cp(input)?;
			let (input, value) = ElementValue::parse_nested(input, depth)?;
			Ok((input, ElementValuePair { name, value }))
		})(input)?;

		Ok((input, Annotation { type_index, pairs }))
	}

	pub fn type_descriptor<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.type_index)
	}

	/// Source form of the annotation type, `java.lang.Deprecated`.
	pub fn type_name(&self, cp: &ConstantPool) -> Result<String, ReaderError> {
		Ok(source_type(self.type_descriptor(cp)?))
	}

	pub fn is_deprecation(&self, cp: &ConstantPool) -> bool {
		matches!(self.type_descriptor(cp), Ok(DEPRECATED_DESCRIPTOR))
	}

	pub fn render(&self, cp: &ConstantPool) -> Result<String, ReaderError> {
		let mut out = format!("@{}", self.type_name(cp)?);
		if !self.pairs.is_empty() {
			let pairs = self
				.pairs
				.iter()
				.map(|pair| Ok(format!("{}={}", pair.name(cp)?, pair.value.render(cp)?)))
				.collect::<Result<Vec<_>, ReaderError>>()?;
			out.push('(');
			out.push_str(&pairs.join(", "));
			out.push(')');
		}
		Ok(out)
	}
}

/// The annotations of one formal parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterAnnotation {
	pub annotations: Vec<Annotation>,
}

impl ParameterAnnotation {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(length_count(be_u16, Annotation::parse), |annotations| {
			ParameterAnnotation { annotations }
		})(input)
	}
}

pub(crate) fn parse_parameter_annotations(input: &[u8]) -> IResult<'_, Vec<ParameterAnnotation>> {
	context(
		"Parameter annotations",
		length_count(be_u8, ParameterAnnotation::parse),
	)(input)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementValuePair {
	pub name: ConstPtr<UTF8Const>,
	pub value: ElementValue,
}

impl ElementValuePair {
	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.name)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementValue {
	Byte(ConstPtr<IntegerConst>),
	Char(ConstPtr<IntegerConst>),
	Double(ConstPtr<DoubleConst>),
	Float(ConstPtr<FloatConst>),
	Int(ConstPtr<IntegerConst>),
	Long(ConstPtr<LongConst>),
	Short(ConstPtr<IntegerConst>),
	Boolean(ConstPtr<IntegerConst>),
	String(ConstPtr<UTF8Const>),
	Enum {
		type_name: ConstPtr<UTF8Const>,
		const_name: ConstPtr<UTF8Const>,
	},
	/// Return descriptor of the class literal, `V` for `void.class`.
	Class(ConstPtr<UTF8Const>),
	Annotation(Annotation),
	Array(Vec<ElementValue>),
}

impl ElementValue {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		Self::parse_nested(input, 0)
	}

	fn parse_nested(input: &[u8], depth: usize) -> IResult<'_, Self> {
		if depth > MAX_NESTING {
			return Err(malformed(input, "element values nested too deeply"));
		}

		let (rest, tag) = be_u8(input)?;
		match tag {
			b'B' => map(be_cp, ElementValue::Byte)(rest),
			b'C' => map(be_cp, ElementValue::Char)(rest),
			b'D' => map(be_cp, ElementValue::Double)(rest),
			b'F' => map(be_cp, ElementValue::Float)(rest),
			b'I' => map(be_cp, ElementValue::Int)(rest),
			b'J' => map(be_cp, ElementValue::Long)(rest),
			b'S' => map(be_cp, ElementValue::Short)(rest),
			b'Z' => map(be_cp, ElementValue::Boolean)(rest),
			b's' => map(be_cp, ElementValue::String)(rest),
			b'e' => map(pair(be_cp, be_cp), |(type_name, const_name)| ElementValue::Enum {
				type_name,
				const_name,
			})(rest),
			b'c' => map(be_cp, ElementValue::Class)(rest),
			b'@' => map(
				|input| Annotation::parse_nested(input, depth + 1),
				ElementValue::Annotation,
			)(rest),
			b'[' => map(
				length_count(be_u16, |input| ElementValue::parse_nested(input, depth + 1)),
				ElementValue::Array,
			)(rest),
			tag => Err(malformed(input, format!("unknown element value tag {tag:#04x}"))),
		}
	}

	pub fn tag(&self) -> u8 {
		match self {
			ElementValue::Byte(_) => b'B',
			ElementValue::Char(_) => b'C',
			ElementValue::Double(_) => b'D',
			ElementValue::Float(_) => b'F',
			ElementValue::Int(_) => b'I',
			ElementValue::Long(_) => b'J',
			ElementValue::Short(_) => b'S',
			ElementValue::Boolean(_) => b'Z',
			ElementValue::String(_) => b's',
			ElementValue::Enum { .. } => b'e',
			ElementValue::Class(_) => b'c',
			ElementValue::Annotation(_) => b'@',
			ElementValue::Array(_) => b'[',
		}
	}

	/// Renders the value the way it would be written in an annotation in source.
	pub fn render(&self, cp: &ConstantPool) -> Result<String, ReaderError> {
		Ok(match self {
			ElementValue::Byte(v) | ElementValue::Int(v) | ElementValue::Short(v) => cp.get(*v)?.value.to_string(),
			ElementValue::Char(v) => {
				let value = cp.get(*v)?.value;
				match char::from_u32(value as u32) {
					Some(c) => format!("{c:?}"),
					None => value.to_string(),
				}
			}
			ElementValue::Boolean(v) => (cp.get(*v)?.value != 0).to_string(),
			ElementValue::Double(v) => cp.get(*v)?.value.to_string(),
			ElementValue::Float(v) => format!("{}f", cp.get(*v)?.value),
			ElementValue::Long(v) => format!("{}L", cp.get(*v)?.value),
			ElementValue::String(v) => format!("{:?}", cp.utf8(*v)?),
			ElementValue::Enum {
				type_name,
				const_name,
			} => format!("{}.{}", source_type(cp.utf8(*type_name)?), cp.utf8(*const_name)?),
			ElementValue::Class(v) => {
				let descriptor = cp.utf8(*v)?;
				if descriptor == "V" {
					"void.class".to_string()
				} else {
					format!("{}.class", source_type(descriptor))
				}
			}
			ElementValue::Annotation(annotation) => annotation.render(cp)?,
			ElementValue::Array(values) => {
				let values = values
					.iter()
					.map(|value| value.render(cp))
					.collect::<Result<Vec<_>, ReaderError>>()?;
				format!("{{{}}}", values.join(", "))
			}
		})
	}
}

fn source_type(descriptor: &str) -> String {
	match Type::parse(descriptor) {
		Some(ty) => ty.java_name(),
		None => descriptor.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nested_values() {
		// @#1(#2=[@#3(), e#4.#5])
		let data = [0, 1, 0, 1, 0, 2, b'[', 0, 2, b'@', 0, 3, 0, 0, b'e', 0, 4, 0, 5];
		let (rest, annotation) = Annotation::parse(&data).map_err(|_| "parse failed").unwrap();
		assert!(rest.is_empty());
		assert_eq!(annotation.pairs.len(), 1);
		let ElementValue::Array(values) = &annotation.pairs[0].value else {
			panic!("expected an array");
		};
		assert_eq!(values.len(), 2);
		assert_eq!(values[0].tag(), b'@');
		assert!(matches!(values[1], ElementValue::Enum { .. }));
	}

	#[test]
	fn unknown_tag_is_malformed() {
		let data = [b'x', 0, 1];
		assert!(matches!(ElementValue::parse(&data), Err(nom::Err::Failure(_))));
	}

	#[test]
	fn deep_nesting_is_rejected() {
		let mut data = Vec::new();
		for _ in 0..(MAX_NESTING + 2) {
			data.extend_from_slice(&[b'[', 0, 1]);
		}
		data.extend_from_slice(&[b'I', 0, 1]);
		assert!(matches!(ElementValue::parse(&data), Err(nom::Err::Failure(_))));
	}
}
