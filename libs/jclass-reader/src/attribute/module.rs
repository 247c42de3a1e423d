use jclass_core::{ExportsFlags, ModuleFlags, RequiresFlags};
use nom::combinator::map;
use nom::multi::length_count;
use nom::number::complete::be_u16;
use nom::sequence::tuple;

use crate::{be_cp, ClassConst, ConstPtr, ConstantPool, IResult, ModuleConst, PackageConst, ReaderError, UTF8Const};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Module {
	pub name: ConstPtr<ModuleConst>,
	pub flags: ModuleFlags,
	/// Absent when the module has no version.
	pub version: ConstPtr<UTF8Const>,
	pub requires: Vec<Requires>,
	pub exports: Vec<Exports>,
	pub opens: Vec<Opens>,
	pub uses: Vec<ConstPtr<ClassConst>>,
	pub provides: Vec<Provides>,
}

impl Module {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		let (input, (name, flags, version)) =
			tuple((be_cp, map(be_u16, ModuleFlags::from_bits_retain), be_cp))(input)?;
		let (input, requires) = length_count(be_u16, Requires::parse)(input)?;
		let (input, exports) = length_count(be_u16, Exports::parse)(input)?;
		let (input, opens) = length_count(be_u16, Opens::parse)(input)?;
		let (input, uses) = length_count(be_u16, be_cp)(input)?;
		let (input, provides) = length_count(be_u16, Provides::parse)(input)?;

		Ok((
			input,
			Module {
				name,
				flags,
				version,
				requires,
				exports,
				opens,
				uses,
				provides,
			},
		))
	}

	pub fn name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.get(self.name)?.name(cp)
	}

	pub fn version<'a>(&self, cp: &'a ConstantPool) -> Result<Option<&'a str>, ReaderError> {
		Ok(cp.get_optional(self.version)?.map(UTF8Const::as_str))
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Requires {
	pub module: ConstPtr<ModuleConst>,
	pub flags: RequiresFlags,
	pub version: ConstPtr<UTF8Const>,
}

impl Requires {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(
			tuple((be_cp, map(be_u16, RequiresFlags::from_bits_retain), be_cp)),
			|(module, flags, version)| Requires {
				module,
				flags,
				version,
			},
		)(input)
	}

	pub fn module_name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
		cp.get(self.module)?.name(cp)
	}
}

macro_rules! package_directive {
	($NAME:ident) => {
		#[derive(Clone, Debug, Eq, PartialEq)]
		pub struct $NAME {
			pub package: ConstPtr<PackageConst>,
			pub flags: ExportsFlags,
			/// Empty when the package is unqualified.
			pub to: Vec<ConstPtr<ModuleConst>>,
		}

		impl $NAME {
			pub fn parse(input: &[u8]) -> IResult<'_, Self> {
				map(
					tuple((
						be_cp,
						map(be_u16, ExportsFlags::from_bits_retain),
						length_count(be_u16, be_cp),
					)),
					|(package, flags, to)| $NAME { package, flags, to },
				)(input)
			}

			pub fn package_name<'a>(&self, cp: &'a ConstantPool) -> Result<&'a str, ReaderError> {
				cp.get(self.package)?.name(cp)
			}
		}
	};
}

package_directive!(Exports);
package_directive!(Opens);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Provides {
	pub service: ConstPtr<ClassConst>,
	pub implementations: Vec<ConstPtr<ClassConst>>,
}

impl Provides {
	pub fn parse(input: &[u8]) -> IResult<'_, Self> {
		map(
			tuple((be_cp, length_count(be_u16, be_cp))),
			|(service, implementations)| Provides {
				service,
				implementations,
			},
		)(input)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn module_directives() {
		#[rustfmt::skip]
		let data = [
			0, 1, 0x00, 0x20, 0, 0, // name, open, no version
			0, 1, 0, 2, 0x00, 0x20, 0, 0, // requires transitive
			0, 1, 0, 3, 0, 0, 0, 1, 0, 4, // exports to one module
			0, 0, // opens
			0, 1, 0, 5, // uses
			0, 1, 0, 6, 0, 2, 0, 7, 0, 8, // provides with two implementations
		];
		let (rest, module) = Module::parse(&data).map_err(|_| "parse failed").unwrap();
		assert!(rest.is_empty());
		assert!(module.flags.contains(ModuleFlags::OPEN));
		assert!(module.version.is_absent());
		assert!(module.requires[0].flags.contains(RequiresFlags::TRANSITIVE));
		assert_eq!(module.exports[0].to.len(), 1);
		assert!(module.opens.is_empty());
		assert_eq!(module.uses.len(), 1);
		assert_eq!(module.provides[0].implementations.len(), 2);
	}
}
