use jclass_core::{MethodAccessFlags, MethodDescriptor};
use nom::combinator::map;
use nom::number::complete::be_u16;

use crate::attribute::AttributeInfo;
use crate::code::Code;
use crate::consts::ConstantPool;
use crate::deprecation::DeprecationDetector;
use crate::{be_cp, ClassConst, ClassInfo, ConstPtr, IResult, ReaderError, UTF8Const};

pub const CONSTRUCTOR: &str = "<init>";
pub const STATIC_INITIALIZER: &str = "<clinit>";

#[derive(Clone, Debug, PartialEq)]
pub struct MethodInfo {
	pub access_flags: MethodAccessFlags,
	pub name: ConstPtr<UTF8Const>,
	pub descriptor: ConstPtr<UTF8Const>,
	pub attributes: Vec<AttributeInfo>,
}

impl MethodInfo {
	pub fn parse<'a>(input: &'a [u8], constant_pool: &ConstantPool) -> IResult<'a, Self> {
		let (input, access_flags) = map(be_u16, MethodAccessFlags::from_bits_retain)(input)?;
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

	/// `None` when the descriptor is not a valid method descriptor.
	pub fn method_descriptor(&self, cp: &ConstantPool) -> Result<Option<MethodDescriptor>, ReaderError> {
		Ok(MethodDescriptor::parse(self.descriptor(cp)?))
	}

	pub fn is_package(&self) -> bool {
		self.access_flags.is_package()
	}

	pub fn is_constructor(&self, cp: &ConstantPool) -> bool {
		matches!(self.name(cp), Ok(CONSTRUCTOR))
	}

	pub fn is_static_initializer(&self, cp: &ConstantPool) -> bool {
		matches!(self.name(cp), Ok(STATIC_INITIALIZER))
	}

	pub fn is_synthetic(&self) -> bool {
		self.access_flags.contains(MethodAccessFlags::SYNTHETIC)
			|| self.attributes.iter().any(|a| matches!(a, AttributeInfo::Synthetic))
	}

	pub fn is_deprecated(&self, cp: &ConstantPool) -> bool {
		DeprecationDetector::inspect(&self.attributes, cp)
	}

	pub fn is_generic(&self) -> bool {
		self.attributes
			.iter()
			.any(|a| matches!(a, AttributeInfo::Signature { .. }))
	}

	pub fn generic_signature<'a>(&self, cp: &'a ConstantPool) -> Result<Option<&'a str>, ReaderError> {
		self.attributes
			.iter()
			.find_map(|attribute| match attribute {
				AttributeInfo::Signature { signature } => Some(cp.utf8(*signature)),
				_ => None,
			})
			.transpose()
	}

	/// Abstract and native methods have none.
	pub fn code(&self) -> Option<&Code> {
		self.attributes.iter().find_map(|attribute| match attribute {
			AttributeInfo::Code(code) => Some(code),
			_ => None,
		})
	}

	pub fn exception_classes(&self) -> &[ConstPtr<ClassConst>] {
		self.attributes
			.iter()
			.find_map(|attribute| match attribute {
				AttributeInfo::Exceptions { exceptions } => Some(exceptions.as_slice()),
				_ => None,
			})
			.unwrap_or_default()
	}

	/// Internal names of the declared checked exceptions.
	pub fn exceptions<'a>(&self, cp: &'a ConstantPool) -> Result<Vec<&'a str>, ReaderError> {
		self.exception_classes()
			.iter()
			.map(|class| cp.class_name(*class))
			.collect()
	}

	/// `name(int, java.lang.String)`; constructors use the class' simple name, static
	/// initializers read `static {}`.
	pub fn signature(&self, class: &ClassInfo) -> Result<String, ReaderError> {
		let cp = &class.constant_pool;
		let name = self.name(cp)?;
		if name == STATIC_INITIALIZER {
			return Ok("static {}".to_string());
		}

		let descriptor = self.descriptor(cp)?;
		let parameters = match MethodDescriptor::parse(descriptor) {
			Some(desc) => desc.java_parameters(),
			None => descriptor.to_string(),
		};
		if name == CONSTRUCTOR {
			Ok(format!("{}{parameters}", class.simple_name()?))
		} else {
			Ok(format!("{name}{parameters}"))
		}
	}

	pub fn return_type(&self, cp: &ConstantPool) -> Result<String, ReaderError> {
		Ok(match self.method_descriptor(cp)? {
			Some(desc) => desc.java_return(),
			None => "void".to_string(),
		})
	}

	pub fn full_name(&self, class: &ClassInfo) -> Result<String, ReaderError> {
		Ok(format!("{}.{}", class.java_name()?, self.name(&class.constant_pool)?))
	}

	pub fn full_signature(&self, class: &ClassInfo) -> Result<String, ReaderError> {
		Ok(format!("{}.{}", class.java_name()?, self.signature(class)?))
	}

	/// Java source style declaration, `public static void main(java.lang.String[]) throws java.io.IOException`.
	pub fn declaration(&self, class: &ClassInfo) -> Result<String, ReaderError> {
		let cp = &class.constant_pool;
		let static_initializer = self.is_static_initializer(cp);
		let constructor = self.is_constructor(cp);

		let mut out = String::new();
		let visibility = self.access_flags.visibility();
		if !visibility.is_empty() {
			out.push_str(visibility);
			out.push(' ');
		}
		if self.is_static() && !static_initializer {
			out.push_str("static ");
		}
		for (flag, keyword) in [
			(MethodAccessFlags::FINAL, "final "),
			(MethodAccessFlags::SYNCHRONIZED, "synchronized "),
			(MethodAccessFlags::NATIVE, "native "),
			(MethodAccessFlags::ABSTRACT, "abstract "),
		] {
			if self.access_flags.contains(flag) {
				out.push_str(keyword);
			}
		}

		if !constructor && !static_initializer {
			out.push_str(&self.return_type(cp)?);
			out.push(' ');
		}
		out.push_str(&self.signature(class)?);

		let exceptions = self.exceptions(cp)?;
		if !exceptions.is_empty() {
			let names: Vec<String> = exceptions.into_iter().map(jclass_core::java_name).collect();
			out.push_str(" throws ");
			out.push_str(&names.join(", "));
		}
		Ok(out)
	}

	pub fn accept<V: crate::Visitor + ?Sized>(&self, visitor: &mut V, class: &ClassInfo) {
		crate::walk_method(visitor, self, class)
	}
}

flag_predicates!(MethodInfo, MethodAccessFlags {
	is_public => PUBLIC,
	is_private => PRIVATE,
	is_protected => PROTECTED,
	is_static => STATIC,
	is_final => FINAL,
	is_synchronized => SYNCHRONIZED,
	is_bridge => BRIDGE,
	is_varargs => VARARGS,
	is_native => NATIVE,
	is_abstract => ABSTRACT,
	is_strict => STRICT,
});
