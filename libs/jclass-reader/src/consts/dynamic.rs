use crate::consts::name_and_type::NameAndTypeConst;
use crate::consts::ConstPtr;
use crate::{impl_constant, ConstantPool, ReaderError};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct InvokeDynamicConst {
	/// Index into the class' BootstrapMethods table, not into the constant pool.
	pub bootstrap_method_attr_index: u16,
	pub name_and_type: ConstPtr<NameAndTypeConst>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DynamicConst {
	pub bootstrap_method_attr_index: u16,
	pub name_and_type: ConstPtr<NameAndTypeConst>,
}

macro_rules! bootstrapped {
	($($TY:ty),*) => {
		$(
		impl $TY {
			pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
				cp.get(self.name_and_type)?.name(cp)
			}

			pub fn descriptor<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
				cp.get(self.name_and_type)?.descriptor(cp)
			}
		}
		)*
	};
}

bootstrapped!(InvokeDynamicConst, DynamicConst);

impl_constant!(InvokeDynamic InvokeDynamicConst, "InvokeDynamic");
impl_constant!(Dynamic DynamicConst, "Dynamic");
