use jclass_core::{java_name, package_of, simple_name_of, ClassAccessFlags};
use nom::combinator::map;
use nom::error::context;
use nom::multi::length_count;
use nom::number::complete::be_u16;
use tracing::{debug, trace};

use crate::attribute::{AttributeInfo, BootstrapMethod, InnerClass};
use crate::config::ReaderConfig;
use crate::consts::ConstantPool;
use crate::deprecation::DeprecationDetector;
use crate::error::fault;
use crate::field::FieldInfo;
use crate::method::MethodInfo;
use crate::{be_cp, ClassConst, ConstPtr, IResult, NameAndTypeConst, ReaderError};

pub const MAGIC: [u8; 4] = [0xca, 0xfe, 0xba, 0xbe];

#[derive(Clone, Debug, PartialEq)]
pub struct ClassInfo {
	pub minor_version: u16,
	pub major_version: u16,
	pub constant_pool: ConstantPool,
	pub access_flags: ClassAccessFlags,

	pub this_class: ConstPtr<ClassConst>,
	/// Absent only for `java/lang/Object` and module descriptors.
	pub super_class: ConstPtr<ClassConst>,

	pub interfaces: Vec<ConstPtr<ClassConst>>,
	pub fields: Vec<FieldInfo>,
	pub methods: Vec<MethodInfo>,
	pub attributes: Vec<AttributeInfo>,
}

impl ClassInfo {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		Self::parse_configured(input, &ReaderConfig::default())
	}

	pub fn parse_configured<'a>(input: &'a [u8], config: &ReaderConfig) -> IResult<'a, Self> {
		let input = match input.strip_prefix(&MAGIC) {
			Some(rest) => rest,
			None => return Err(fault(input, ReaderError::InvalidMagic)),
		};
		let (input, minor_version) = context("Java Minor Version", be_u16)(input)?;
		let (input, major_version) = context("Java Major Version", be_u16)(input)?;
		config
			.check_version(major_version, minor_version)
			.map_err(|error| fault(input, error))?;

		let (input, constant_pool) = context("Constant Pool", ConstantPool::parse)(input)?;
		let (input, access_flags) = context(
			"Access flags",
			map(be_u16, ClassAccessFlags::from_bits_retain),
		)(input)?;
		let (input, this_class) = context("This class", be_cp)(input)?;
		let (input, super_class) = context("Class Superclass", be_cp)(input)?;
		let (input, interfaces) = context("Interfaces", length_count(be_u16, be_cp))(input)?;
		trace!("{} interfaces", interfaces.len());

		let (input, fields) = context(
			"Fields",
			length_count(be_u16, |input| FieldInfo::parse(input, &constant_pool)),
		)(input)?;
		let (input, methods) = context(
			"Methods",
			length_count(be_u16, |input| MethodInfo::parse(input, &constant_pool)),
		)(input)?;
		let (input, attributes) = AttributeInfo::parse_list(input, &constant_pool)?;

		Ok((
			input,
			ClassInfo {
				minor_version,
				major_version,
				constant_pool,
				access_flags,
				this_class,
				super_class,
				interfaces,
				fields,
				methods,
				attributes,
			},
		))
	}

	/// Parses a whole class file with the default policy.
	pub fn parse_complete(bytes: &[u8]) -> Result<Self, ReaderError> {
		Self::parse_with(bytes, &ReaderConfig::default())
	}

	/// Parses a whole class file. Bytes left over after the class-level attributes are an error.
	pub fn parse_with(bytes: &[u8], config: &ReaderConfig) -> Result<Self, ReaderError> {
		match Self::parse_configured(bytes, config) {
			Ok(([], class)) => {
				debug!(
					"parsed {} ({} fields, {} methods)",
					class.class_name().unwrap_or("?"),
					class.fields.len(),
					class.methods.len()
				);
				Ok(class)
			}
			Ok((rest, _)) => Err(ReaderError::MalformedStructure {
				offset: bytes.len() - rest.len(),
				context: format!("{} trailing bytes after the class file", rest.len()),
			}),
			Err(nom::Err::Error(error) | nom::Err::Failure(error)) => Err(error.into_reader_error(bytes)),
			Err(nom::Err::Incomplete(_)) => Err(ReaderError::MalformedStructure {
				offset: bytes.len(),
				context: "unexpected end of input".to_string(),
			}),
		}
	}

	/// Internal form, `java/lang/String`.
	pub fn class_name(&self) -> Result<&str, ReaderError> {
		self.constant_pool.class_name(self.this_class)
	}

	/// Source form, `java.lang.String`.
	pub fn java_name(&self) -> Result<String, ReaderError> {
		Ok(java_name(self.class_name()?))
	}

	/// Dotted package, empty for the unnamed package.
	pub fn package_name(&self) -> Result<String, ReaderError> {
		Ok(java_name(package_of(self.class_name()?)))
	}

	pub fn simple_name(&self) -> Result<&str, ReaderError> {
		Ok(simple_name_of(self.class_name()?))
	}

	pub fn super_class_name(&self) -> Result<Option<&str>, ReaderError> {
		match self.constant_pool.get_optional(self.super_class)? {
			Some(class) => class.name(&self.constant_pool).map(Some),
			None => Ok(None),
		}
	}

	pub fn interface_names(&self) -> Result<Vec<&str>, ReaderError> {
		self.interfaces
			.iter()
			.map(|interface| self.constant_pool.class_name(*interface))
			.collect()
	}

	/// Looks up a directly implemented interface by internal name.
	pub fn interface(&self, name: &str) -> Option<ConstPtr<ClassConst>> {
		self.interfaces
			.iter()
			.copied()
			.find(|interface| self.constant_pool.class_name(*interface).ok() == Some(name))
	}

	pub fn source_file(&self) -> Result<Option<&str>, ReaderError> {
		self.attributes
			.iter()
			.find_map(|attribute| match attribute {
				AttributeInfo::SourceFile { source_file } => Some(self.constant_pool.utf8(*source_file)),
				_ => None,
			})
			.transpose()
	}

	pub fn generic_signature(&self) -> Result<Option<&str>, ReaderError> {
		self.attributes
			.iter()
			.find_map(|attribute| match attribute {
				AttributeInfo::Signature { signature } => Some(self.constant_pool.utf8(*signature)),
				_ => None,
			})
			.transpose()
	}

	pub fn is_package(&self) -> bool {
		!self.is_public()
	}

	pub fn is_synthetic(&self) -> bool {
		self.access_flags.contains(ClassAccessFlags::SYNTHETIC)
			|| self.attributes.iter().any(|a| matches!(a, AttributeInfo::Synthetic))
	}

	pub fn is_deprecated(&self) -> bool {
		DeprecationDetector::inspect(&self.attributes, &self.constant_pool)
	}

	pub fn is_generic(&self) -> bool {
		self.attributes
			.iter()
			.any(|a| matches!(a, AttributeInfo::Signature { .. }))
	}

	pub fn inner_classes(&self) -> &[InnerClass] {
		self.attributes
			.iter()
			.find_map(|attribute| match attribute {
				AttributeInfo::InnerClasses { classes } => Some(classes.as_slice()),
				_ => None,
			})
			.unwrap_or_default()
	}

	/// The InnerClasses entry describing this class itself.
	fn own_inner_class(&self) -> Option<&InnerClass> {
		let name = self.class_name().ok()?;
		self.inner_classes()
			.iter()
			.find(|entry| entry.inner_class_name(&self.constant_pool).ok() == Some(name))
	}

	pub fn is_inner_class(&self) -> bool {
		self.own_inner_class().is_some()
	}

	pub fn is_member_class(&self) -> bool {
		self.own_inner_class().map_or(false, InnerClass::is_member)
	}

	pub fn is_anonymous_class(&self) -> bool {
		self.own_inner_class().map_or(false, InnerClass::is_anonymous)
	}

	/// Named classes declared inside a method body.
	pub fn is_local_class(&self) -> bool {
		self.is_inner_class() && self.enclosing_method().is_some() && !self.is_anonymous_class()
	}

	pub fn enclosing_method(&self) -> Option<(ConstPtr<ClassConst>, ConstPtr<NameAndTypeConst>)> {
		self.attributes.iter().find_map(|attribute| match attribute {
			AttributeInfo::EnclosingMethod { class, method } => Some((*class, *method)),
			_ => None,
		})
	}

	pub fn bootstrap_methods(&self) -> &[BootstrapMethod] {
		self.attributes
			.iter()
			.find_map(|attribute| match attribute {
				AttributeInfo::BootstrapMethods { methods } => Some(methods.as_slice()),
				_ => None,
			})
			.unwrap_or_default()
	}

	/// `public final class a.B extends java.lang.Object implements java.io.Serializable`
	pub fn declaration(&self) -> Result<String, ReaderError> {
		let mut out = String::new();
		if self.is_public() {
			out.push_str("public ");
		}
		if self.is_final() {
			out.push_str("final ");
		}

		let interfaces: Vec<String> = self.interface_names()?.into_iter().map(java_name).collect();
		if self.is_interface() {
			out.push_str("interface ");
			out.push_str(&self.java_name()?);
			if !interfaces.is_empty() {
				out.push_str(" extends ");
				out.push_str(&interfaces.join(", "));
			}
		} else {
			if self.is_abstract() {
				out.push_str("abstract ");
			}
			out.push_str("class ");
			out.push_str(&self.java_name()?);
			if let Some(super_class) = self.super_class_name()? {
				out.push_str(" extends ");
				out.push_str(&java_name(super_class));
			}
			if !interfaces.is_empty() {
				out.push_str(" implements ");
				out.push_str(&interfaces.join(", "));
			}
		}
		Ok(out)
	}

	pub fn get_field(&self, predicate: impl Fn(&FieldInfo) -> bool) -> Option<&FieldInfo> {
		self.fields.iter().find(|field| predicate(field))
	}

	pub fn get_method(&self, predicate: impl Fn(&MethodInfo) -> bool) -> Option<&MethodInfo> {
		self.methods.iter().find(|method| predicate(method))
	}

	pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
		let cp = &self.constant_pool;
		self.get_field(|field| field.name(cp).ok() == Some(name))
	}

	pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
		let cp = &self.constant_pool;
		self.get_method(|method| method.name(cp).ok() == Some(name) && method.descriptor(cp).ok() == Some(descriptor))
	}

	/// Looks a method up by its Java style signature, `main(java.lang.String[])`.
	pub fn method_by_signature(&self, signature: &str) -> Option<&MethodInfo> {
		self.get_method(|method| method.signature(self).ok().as_deref() == Some(signature))
	}

	pub fn accept<V: crate::Visitor + ?Sized>(&self, visitor: &mut V) {
		crate::walk_classfile(visitor, self)
	}
}

flag_predicates!(ClassInfo, ClassAccessFlags {
	is_public => PUBLIC,
	is_final => FINAL,
	is_super => SUPER,
	is_interface => INTERFACE,
	is_abstract => ABSTRACT,
	is_annotation => ANNOTATION,
	is_enum => ENUM,
	is_module => MODULE,
});

#[cfg(test)]
mod tests {
	use super::*;

	fn minimal() -> Vec<u8> {
		let mut bytes = MAGIC.to_vec();
		bytes.extend_from_slice(&[0, 0, 0, 52]);
		// #1 Class(#2), #2 Utf8 "a/B"
		bytes.extend_from_slice(&[0, 3, 7, 0, 2, 1, 0, 3, b'a', b'/', b'B']);
		bytes.extend_from_slice(&[0x00, 0x21, 0, 1, 0, 0]);
		bytes.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
		bytes
	}

	#[test]
	fn minimal_class() {
		let class = ClassInfo::parse_complete(&minimal()).unwrap();
		assert_eq!(class.major_version, 52);
		assert_eq!(class.class_name().unwrap(), "a/B");
		assert_eq!(class.java_name().unwrap(), "a.B");
		assert_eq!(class.package_name().unwrap(), "a");
		assert_eq!(class.simple_name().unwrap(), "B");
		assert_eq!(class.super_class_name().unwrap(), None);
		assert!(class.is_public() && class.is_super());
		assert!(!class.is_inner_class());
		assert_eq!(class.declaration().unwrap(), "public class a.B");
	}

	#[test]
	fn bad_magic() {
		let mut bytes = minimal();
		bytes[0] = 0xcb;
		assert_eq!(ClassInfo::parse_complete(&bytes), Err(ReaderError::InvalidMagic));
		assert_eq!(ClassInfo::parse_complete(&[0xca, 0xfe]), Err(ReaderError::InvalidMagic));
	}

	#[test]
	fn version_policy() {
		let config = ReaderConfig {
			max_major_version: Some(50),
		};
		assert_eq!(
			ClassInfo::parse_with(&minimal(), &config),
			Err(ReaderError::UnsupportedVersion {
				major: 52,
				minor: 0,
				max: 50
			})
		);
	}

	#[test]
	fn trailing_bytes() {
		let mut bytes = minimal();
		let end = bytes.len();
		bytes.push(0);
		assert_eq!(
			ClassInfo::parse_complete(&bytes),
			Err(ReaderError::MalformedStructure {
				offset: end,
				context: "1 trailing bytes after the class file".to_string()
			})
		);
	}

	#[test]
	fn truncated() {
		let bytes = minimal();
		let error = ClassInfo::parse_complete(&bytes[..bytes.len() - 2]).unwrap_err();
		assert!(matches!(error, ReaderError::MalformedStructure { .. }), "{error:?}");
	}
}
