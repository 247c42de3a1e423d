use crate::consts::utf_8::UTF8Const;
use crate::consts::ConstPtr;
use crate::{impl_constant, ConstantPool, ReaderError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ModuleConst {
	pub name: ConstPtr<UTF8Const>,
}

impl ModuleConst {
	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.name)
	}
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PackageConst {
	pub name: ConstPtr<UTF8Const>,
}

impl PackageConst {
	/// Internal form, `java/lang`.
	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.utf8(self.name)
	}
}

impl_constant!(Module ModuleConst, "Module");
impl_constant!(Package PackageConst, "Package");
