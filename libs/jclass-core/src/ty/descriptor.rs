use std::fmt::{Display, Formatter};

use crate::Type;

#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct MethodDescriptor {
	pub parameters: Vec<Type>,
	pub returns: Option<Type>,
}

impl MethodDescriptor {
	pub fn parse(desc: &str) -> Option<MethodDescriptor> {
		let body = desc.strip_prefix('(')?;
		let end = body.find(')')?;
		let mut remaining = &body[..end];
		let mut parameters = Vec::new();

		let ret_desc = &body[end + 1..];
		let ret = if ret_desc == "V" {
			None
		} else {
			Some(Type::parse(ret_desc)?)
		};

		while !remaining.is_empty() {
			let (parameter, size) = Type::parse_len(remaining)?;
			parameters.push(parameter);
			remaining = &remaining[size..];
		}

		Some(MethodDescriptor {
			parameters,
			returns: ret,
		})
	}

	/// Renders the parameter list the way Java source spells it: `(int, java.lang.String)`.
	pub fn java_parameters(&self) -> String {
		let names: Vec<String> = self.parameters.iter().map(Type::java_name).collect();
		format!("({})", names.join(", "))
	}

	pub fn java_return(&self) -> String {
		match &self.returns {
			None => "void".to_string(),
			Some(ty) => ty.java_name(),
		}
	}
}

impl Display for MethodDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "(")?;
		for ty in &self.parameters {
			write!(f, "{ty}")?;
		}
		write!(f, ")")?;
		match &self.returns {
			None => {
				write!(f, "V")
			}
			Some(ty) => {
				write!(f, "{ty}")
			}
		}
	}
}
