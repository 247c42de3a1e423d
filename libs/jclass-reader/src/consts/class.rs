use crate::consts::utf_8::UTF8Const;
use crate::consts::ConstPtr;
use crate::{impl_constant, ConstantPool, ReaderError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClassConst {
	pub name: ConstPtr<UTF8Const>,
}

impl ClassConst {
	/// Internal form, `java/lang/Object`. Array classes keep their descriptor form.
	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.name)
	}

	pub fn java_name(&self, cp: &ConstantPool) -> Result<String, ReaderError> {
		Ok(jclass_core::java_name(self.name(cp)?))
	}
}

impl_constant!(Class ClassConst, "Class");
