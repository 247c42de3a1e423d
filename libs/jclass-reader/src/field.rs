use jclass_core::{FieldAccessFlags, Type};
use nom::combinator::map;
use nom::number::complete::be_u16;

use crate::attribute::AttributeInfo;
use crate::consts::ConstantPool;
use crate::deprecation::DeprecationDetector;
use crate::{be_cp, ClassInfo, ConstPtr, ConstantInfo, IResult, ReaderError, UTF8Const};

//field_info {
//     u16             access_flags;
//     u16             name_index;
//     u16             descriptor_index;
//     u16             attributes_count;
//     attribute_info attributes[attributes_count];
// }
#[derive(Clone, Debug, PartialEq)]
pub struct FieldInfo {
	pub access_flags: FieldAccessFlags,
	pub name: ConstPtr<UTF8Const>,
	pub descriptor: ConstPtr<UTF8Const>,
	pub attributes: Vec<AttributeInfo>,
}

impl FieldInfo {
	pub fn parse<'a>(input: &'a [u8], constant_pool: &ConstantPool) -> IResult<'a, Self> {
		let (input, access_flags) = map(be_u16, FieldAccessFlags::from_bits_retain)(input)?;
		let (input, name) = be_cp(input)?;
		let (input, descriptor) = be_cp(input)?;
		let (input, attributes) = AttributeInfo::parse_list(input, constant_pool)?;

		Ok((
			input,
			Self {
				access_flags,
				name,
				descriptor,
				attributes,
			},
		))
	}

	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.name)
	}

	pub fn descriptor<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.descriptor)
	}

	/// `None` when the descriptor is not a valid field descriptor.
	pub fn field_type(&self, cp: &ConstantPool) -> Result<Option<Type>, ReaderError> {
		Ok(Type::parse(self.descriptor(cp)?))
	}

	pub fn is_package(&self) -> bool {
		self.access_flags.is_package()
	}

	pub fn is_synthetic(&self) -> bool {
		self.access_flags.contains(FieldAccessFlags::SYNTHETIC)
			|| self.attributes.iter().any(|a| matches!(a, AttributeInfo::Synthetic))
	}

	pub fn is_deprecated(&self, cp: &ConstantPool) -> bool {
		DeprecationDetector::inspect(&self.attributes, cp)
	}

	pub fn is_generic(&self) -> bool {
		self.generic_signature_ptr().is_some()
	}

	fn generic_signature_ptr(&self) -> Option<ConstPtr<UTF8Const>> {
		self.attributes.iter().find_map(|attribute| match attribute {
			AttributeInfo::Signature { signature } => Some(*signature),
			_ => None,
		})
	}

	pub fn generic_signature<'a>(&self, cp: &'a ConstantPool) -> Result<Option<&'a str>, ReaderError> {
		self.generic_signature_ptr().map(|ptr| cp.utf8(ptr)).transpose()
	}

	pub fn constant_value(&self) -> Option<ConstPtr<ConstantInfo>> {
		self.attributes.iter().find_map(|attribute| match attribute {
			AttributeInfo::ConstantValue { constant } => Some(*constant),
			_ => None,
		})
	}

	pub fn constant_value_entry<'a>(&self, cp: &'a ConstantPool) -> Result<Option<&'a ConstantInfo>, ReaderError> {
		self.constant_value().map(|ptr| cp.get(ptr)).transpose()
	}

	/// `java.lang.Integer.MAX_VALUE`
	pub fn full_name(&self, class: &ClassInfo) -> Result<String, ReaderError> {
		Ok(format!("{}.{}", class.java_name()?, self.name(&class.constant_pool)?))
	}

	/// Java source style declaration, `public static final int MAX_VALUE = 2147483647`.
	pub fn declaration(&self, cp: &ConstantPool) -> Result<String, ReaderError> {
		let mut out = String::new();
		let visibility = self.access_flags.visibility();
		if !visibility.is_empty() {
			out.push_str(visibility);
			out.push(' ');
		}
		for (flag, keyword) in [
			(FieldAccessFlags::STATIC, "static "),
			(FieldAccessFlags::FINAL, "final "),
			(FieldAccessFlags::VOLATILE, "volatile "),
			(FieldAccessFlags::TRANSIENT, "transient "),
		] {
			if self.access_flags.contains(flag) {
				out.push_str(keyword);
			}
		}

		let descriptor = self.descriptor(cp)?;
		match Type::parse(descriptor) {
			Some(ty) => out.push_str(&ty.java_name()),
			None => out.push_str(descriptor),
		}
		out.push(' ');
		out.push_str(self.name(cp)?);

		if let Some(value) = self.constant_value_entry(cp)? {
			out.push_str(" = ");
			out.push_str(&value.render(cp)?);
		}
		Ok(out)
	}

	pub fn accept<V: crate::Visitor + ?Sized>(&self, visitor: &mut V, class: &ClassInfo) {
		crate::walk_field(visitor, self, class)
	}
}

flag_predicates!(FieldInfo, FieldAccessFlags {
	is_public => PUBLIC,
	is_private => PRIVATE,
	is_protected => PROTECTED,
	is_static => STATIC,
	is_final => FINAL,
	is_volatile => VOLATILE,
	is_transient => TRANSIENT,
	is_enum => ENUM,
});
