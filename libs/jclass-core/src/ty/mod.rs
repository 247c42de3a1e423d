use std::fmt::{Display, Formatter, Write};

pub use descriptor::*;
mod descriptor;

/// A field type as it appears in a descriptor.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Type {
	Primitive(PrimitiveType),
	Object(ObjectType),
	Array(Box<ArrayType>),
}

impl Type {
	/// Parses a whole field descriptor. Trailing characters make the descriptor invalid.
	pub fn parse(desc: &str) -> Option<Type> {
		match Self::parse_len(desc)? {
			(ty, length) if length == desc.len() => Some(ty),
			_ => None,
		}
	}

	pub fn parse_len(desc: &str) -> Option<(Type, usize)> {
		match desc.as_bytes().first()? {
			b'L' => ObjectType::parse_len(desc).map(|(ty, l)| (Type::Object(ty), l)),
			b'[' => ArrayType::parse_len(desc).map(|(ty, l)| (Type::Array(Box::new(ty)), l)),
			_ => PrimitiveType::parse(desc).map(|v| (Type::Primitive(v), 1)),
		}
	}

	/// The type as it would be written in Java source, `java.lang.String[]` for `[Ljava/lang/String;`.
	pub fn java_name(&self) -> String {
		match self {
			Type::Primitive(v) => v.java_name().to_string(),
			Type::Object(v) => v.java_name(),
			Type::Array(v) => v.java_name(),
		}
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Type::Primitive(v) => v.fmt(f),
			Type::Object(v) => v.fmt(f),
			Type::Array(v) => v.fmt(f),
		}
	}
}

#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveType {
	Boolean,
	Byte,
	Short,
	Int,
	Long,
	Char,
	Float,
	Double,
}

impl PrimitiveType {
	pub fn parse(desc: &str) -> Option<PrimitiveType> {
		Some(match desc.as_bytes().first()? {
			b'Z' => PrimitiveType::Boolean,
			b'B' => PrimitiveType::Byte,
			b'C' => PrimitiveType::Char,
			b'D' => PrimitiveType::Double,
			b'F' => PrimitiveType::Float,
			b'I' => PrimitiveType::Int,
			b'J' => PrimitiveType::Long,
			b'S' => PrimitiveType::Short,
			_ => {
				return None;
			}
		})
	}

	pub fn char(&self) -> char {
		match self {
			PrimitiveType::Boolean => 'Z',
			PrimitiveType::Byte => 'B',
			PrimitiveType::Short => 'S',
			PrimitiveType::Int => 'I',
			PrimitiveType::Long => 'J',
			PrimitiveType::Char => 'C',
			PrimitiveType::Float => 'F',
			PrimitiveType::Double => 'D',
		}
	}

	pub fn java_name(&self) -> &'static str {
		match self {
			PrimitiveType::Boolean => "boolean",
			PrimitiveType::Byte => "byte",
			PrimitiveType::Short => "short",
			PrimitiveType::Int => "int",
			PrimitiveType::Long => "long",
			PrimitiveType::Char => "char",
			PrimitiveType::Float => "float",
			PrimitiveType::Double => "double",
		}
	}

	/// Maps the `atype` operand of `newarray` (4 through 11).
	pub fn from_array_code(code: u8) -> Option<PrimitiveType> {
		Some(match code {
			4 => PrimitiveType::Boolean,
			5 => PrimitiveType::Char,
			6 => PrimitiveType::Float,
			7 => PrimitiveType::Double,
			8 => PrimitiveType::Byte,
			9 => PrimitiveType::Short,
			10 => PrimitiveType::Int,
			11 => PrimitiveType::Long,
			_ => return None,
		})
	}
}

impl Display for PrimitiveType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_char(self.char())
	}
}

#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct ObjectType {
	pub name: String,
}

impl ObjectType {
	pub fn parse_len(string: &str) -> Option<(ObjectType, usize)> {
		if !string.starts_with('L') {
			return None;
		}

		let end = string.find(';')?;
		if end == 1 {
			return None;
		}

		Some((
			ObjectType {
				name: string[1..end].to_string(),
			},
			end + 1,
		))
	}

	pub fn java_name(&self) -> String {
		crate::java_name(&self.name)
	}
}

impl Display for ObjectType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_char('L')?;
		f.write_str(&self.name)?;
		f.write_char(';')
	}
}

#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct ArrayType {
	pub component: Type,
}

impl ArrayType {
	pub fn parse_len(string: &str) -> Option<(ArrayType, usize)> {
		let rest = string.strip_prefix('[')?;
		let (component, length) = Type::parse_len(rest)?;
		Some((ArrayType { component }, length + 1))
	}

	pub fn java_name(&self) -> String {
		let mut out = self.component.java_name();
		out.push_str("[]");
		out
	}
}

impl Display for ArrayType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_char('[')?;
		self.component.fmt(f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn primitives() {
		assert_eq!(Type::parse("I"), Some(Type::Primitive(PrimitiveType::Int)));
		assert_eq!(Type::parse("Z").map(|v| v.to_string()), Some("Z".to_string()));
		assert_eq!(Type::parse(""), None);
		assert_eq!(Type::parse("II"), None);
		assert_eq!(Type::parse("V"), None);
	}

	#[test]
	fn objects_and_arrays() {
		let ty = Type::parse("[[Ljava/lang/String;").unwrap();
		assert_eq!(ty.java_name(), "java.lang.String[][]");
		assert_eq!(ty.to_string(), "[[Ljava/lang/String;");
		assert_eq!(Type::parse("L;"), None);
		assert_eq!(Type::parse("Ljava/lang/Object"), None);
		assert_eq!(Type::parse("["), None);
	}
}
