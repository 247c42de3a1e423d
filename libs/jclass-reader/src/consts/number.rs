use crate::impl_constant;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct IntegerConst {
	pub value: i32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatConst {
	pub value: f32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LongConst {
	pub value: i64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DoubleConst {
	pub value: f64,
}

impl_constant!(Integer IntegerConst, "Integer");
impl_constant!(Float FloatConst, "Float");
impl_constant!(Long LongConst, "Long");
impl_constant!(Double DoubleConst, "Double");
