//! Uniform traversal over a parsed class file.
//!
//! [`Visitor`] has one hook per node kind, all defaulting to no-ops. The `walk_*` functions own
//! the traversal order and call the hooks on the way down:
//!
//! classfile, its attributes, every field (and its attributes), every method (and its
//! attributes). A `Code` attribute continues with its instructions in offset order, then its
//! exception handlers in table order, then its nested attributes.
//!
//! Hooks get the constant pool of the class being walked, never anything global.

use tracing::{debug, trace};

use crate::attribute::*;
use crate::code::{Code, ExceptionHandler, Instruction};
use crate::consts::{ConstantInfo, ConstantPool};
use crate::{ClassConst, ClassInfo, ConstPtr, FieldInfo, MethodInfo, NameAndTypeConst, PackageConst, ReaderError, UTF8Const};

/// Runs two visitors side by side, first `A` then `B` for every hook.
#[derive(Clone, Debug, Default)]
pub struct Chain<A, B>(pub A, pub B);

impl<A, B> Chain<A, B> {
	pub fn into_inner(self) -> (A, B) {
		(self.0, self.1)
	}
}

pub fn chain<A: Visitor, B: Visitor>(first: A, second: B) -> Chain<A, B> {
	Chain(first, second)
}

macro_rules! visitor {
	($($(#[$meta:meta])* fn $hook:ident(&mut self $(, $arg:ident: $ty:ty)*);)*) => {
		pub trait Visitor {
			$(
			$(#[$meta])*
			#[allow(unused_variables)]
			fn $hook(&mut self $(, $arg: $ty)*) {}
			)*
		}

		impl<V: Visitor + ?Sized> Visitor for &mut V {
			$(
			fn $hook(&mut self $(, $arg: $ty)*) {
				(**self).$hook($($arg),*)
			}
			)*
		}

		impl<A: Visitor, B: Visitor> Visitor for Chain<A, B> {
			$(
			fn $hook(&mut self $(, $arg: $ty)*) {
				self.0.$hook($($arg),*);
				self.1.$hook($($arg),*);
			}
			)*
		}
	};
}

visitor! {
	/// Called by [`visit_classfiles`] before each class file. Drop per-class state here.
	fn reset(&mut self);

	fn visit_constant(&mut self, index: u16, constant: &ConstantInfo, cp: &ConstantPool);

	fn visit_classfile(&mut self, class: &ClassInfo);
	fn visit_field(&mut self, field: &FieldInfo, class: &ClassInfo);
	fn visit_method(&mut self, method: &MethodInfo, class: &ClassInfo);

	/// Every attribute, before its kind specific hook.
	fn visit_attribute(&mut self, attribute: &AttributeInfo, cp: &ConstantPool);

	fn visit_constant_value(&mut self, constant: ConstPtr<ConstantInfo>, cp: &ConstantPool);
	fn visit_code(&mut self, code: &Code, cp: &ConstantPool);
	fn visit_stack_map_table(&mut self, frames: &[StackMapFrame], cp: &ConstantPool);
	fn visit_exceptions(&mut self, exceptions: &[ConstPtr<ClassConst>], cp: &ConstantPool);
	fn visit_inner_classes(&mut self, classes: &[InnerClass], cp: &ConstantPool);
	fn visit_enclosing_method(&mut self, class: ConstPtr<ClassConst>, method: ConstPtr<NameAndTypeConst>, cp: &ConstantPool);
	fn visit_synthetic(&mut self, cp: &ConstantPool);
	fn visit_signature(&mut self, signature: ConstPtr<UTF8Const>, cp: &ConstantPool);
	fn visit_source_file(&mut self, source_file: ConstPtr<UTF8Const>, cp: &ConstantPool);
	fn visit_source_debug_extension(&mut self, debug_extension: &[u8], cp: &ConstantPool);
	fn visit_line_number_table(&mut self, line_numbers: &[LineNumber], cp: &ConstantPool);
	fn visit_local_variable_table(&mut self, local_variables: &[LocalVariable], cp: &ConstantPool);
	fn visit_local_variable_type_table(&mut self, local_variable_types: &[LocalVariableType], cp: &ConstantPool);
	fn visit_deprecated(&mut self, cp: &ConstantPool);
	fn visit_annotations(&mut self, visible: bool, annotations: &[Annotation], cp: &ConstantPool);
	fn visit_parameter_annotations(&mut self, visible: bool, parameters: &[ParameterAnnotation], cp: &ConstantPool);
	fn visit_type_annotations(&mut self, visible: bool, annotations: &[TypeAnnotation], cp: &ConstantPool);
	fn visit_annotation_default(&mut self, value: &ElementValue, cp: &ConstantPool);
	fn visit_bootstrap_methods(&mut self, methods: &[BootstrapMethod], cp: &ConstantPool);
	fn visit_method_parameters(&mut self, parameters: &[MethodParameter], cp: &ConstantPool);
	fn visit_module(&mut self, module: &Module, cp: &ConstantPool);
	fn visit_module_packages(&mut self, packages: &[ConstPtr<PackageConst>], cp: &ConstantPool);
	fn visit_module_main_class(&mut self, main_class: ConstPtr<ClassConst>, cp: &ConstantPool);
	fn visit_nest_host(&mut self, host: ConstPtr<ClassConst>, cp: &ConstantPool);
	fn visit_nest_members(&mut self, classes: &[ConstPtr<ClassConst>], cp: &ConstantPool);
	fn visit_permitted_subclasses(&mut self, classes: &[ConstPtr<ClassConst>], cp: &ConstantPool);
	fn visit_record(&mut self, components: &[RecordComponent], cp: &ConstantPool);
	fn visit_custom_attribute(&mut self, name: ConstPtr<UTF8Const>, info: &[u8], cp: &ConstantPool);

	fn visit_instruction(&mut self, instruction: &Instruction<'_>, cp: &ConstantPool);
	/// The code array stopped decoding here. Instructions before the failure were visited.
	fn visit_bytecode_error(&mut self, code: &Code, error: &ReaderError, cp: &ConstantPool);
	fn visit_exception_handler(&mut self, handler: &ExceptionHandler, cp: &ConstantPool);

	fn visit_inner_class(&mut self, inner_class: &InnerClass, cp: &ConstantPool);
	fn visit_line_number(&mut self, line_number: &LineNumber, cp: &ConstantPool);
	fn visit_local_variable(&mut self, local_variable: &LocalVariable, cp: &ConstantPool);
	fn visit_local_variable_type(&mut self, local_variable_type: &LocalVariableType, cp: &ConstantPool);
	fn visit_bootstrap_method(&mut self, method: &BootstrapMethod, cp: &ConstantPool);
	fn visit_method_parameter(&mut self, parameter: &MethodParameter, cp: &ConstantPool);
	fn visit_requires(&mut self, requires: &Requires, cp: &ConstantPool);
	fn visit_exports(&mut self, exports: &Exports, cp: &ConstantPool);
	fn visit_opens(&mut self, opens: &Opens, cp: &ConstantPool);
	fn visit_uses(&mut self, service: ConstPtr<ClassConst>, cp: &ConstantPool);
	fn visit_provides(&mut self, provides: &Provides, cp: &ConstantPool);
	fn visit_record_component(&mut self, component: &RecordComponent, cp: &ConstantPool);

	fn visit_annotation(&mut self, annotation: &Annotation, cp: &ConstantPool);
	/// `parameter` is the position in the parameter annotation table.
	fn visit_parameter_annotation(&mut self, parameter: usize, annotations: &ParameterAnnotation, cp: &ConstantPool);
	fn visit_type_annotation(&mut self, annotation: &TypeAnnotation, cp: &ConstantPool);
	fn visit_element_value_pair(&mut self, pair: &ElementValuePair, cp: &ConstantPool);
	fn visit_element_value(&mut self, value: &ElementValue, cp: &ConstantPool);

	fn visit_stack_map_frame(&mut self, frame: &StackMapFrame, cp: &ConstantPool);
	fn visit_verification_type(&mut self, ty: &VerificationType, cp: &ConstantPool);
}

/// Walks every class in order, resetting the visitor before each one.
pub fn visit_classfiles<'c, V, I>(visitor: &mut V, classes: I)
where
	V: Visitor + ?Sized,
	I: IntoIterator<Item = &'c ClassInfo>,
{
	for class in classes {
		visitor.reset();
		walk_classfile(visitor, class);
	}
}

pub fn walk_constant_pool<V: Visitor + ?Sized>(visitor: &mut V, cp: &ConstantPool) {
	for (index, constant) in cp.iter() {
		visitor.visit_constant(index, constant, cp);
	}
}

pub fn walk_classfile<V: Visitor + ?Sized>(visitor: &mut V, class: &ClassInfo) {
	trace!("walking {}", class.class_name().unwrap_or("?"));
	visitor.visit_classfile(class);

	let cp = &class.constant_pool;
	walk_attributes(visitor, &class.attributes, cp);
	for field in &class.fields {
		walk_field(visitor, field, class);
	}
	for method in &class.methods {
		walk_method(visitor, method, class);
	}
}

pub fn walk_field<V: Visitor + ?Sized>(visitor: &mut V, field: &FieldInfo, class: &ClassInfo) {
	visitor.visit_field(field, class);
	walk_attributes(visitor, &field.attributes, &class.constant_pool);
}

pub fn walk_method<V: Visitor + ?Sized>(visitor: &mut V, method: &MethodInfo, class: &ClassInfo) {
	visitor.visit_method(method, class);
	walk_attributes(visitor, &method.attributes, &class.constant_pool);
}

pub fn walk_attributes<V: Visitor + ?Sized>(visitor: &mut V, attributes: &[AttributeInfo], cp: &ConstantPool) {
	for attribute in attributes {
		walk_attribute(visitor, attribute, cp);
	}
}

pub fn walk_attribute<V: Visitor + ?Sized>(visitor: &mut V, attribute: &AttributeInfo, cp: &ConstantPool) {
	visitor.visit_attribute(attribute, cp);

	match attribute {
		AttributeInfo::ConstantValue { constant } => visitor.visit_constant_value(*constant, cp),
		AttributeInfo::Code(code) => walk_code(visitor, code, cp),
		AttributeInfo::StackMapTable { frames } => {
			visitor.visit_stack_map_table(frames, cp);
			for frame in frames {
				visitor.visit_stack_map_frame(frame, cp);
				for ty in frame.verification_types() {
					visitor.visit_verification_type(ty, cp);
				}
			}
		}
		AttributeInfo::Exceptions { exceptions } => visitor.visit_exceptions(exceptions, cp),
		AttributeInfo::InnerClasses { classes } => {
			visitor.visit_inner_classes(classes, cp);
			for inner_class in classes {
				visitor.visit_inner_class(inner_class, cp);
			}
		}
		AttributeInfo::EnclosingMethod { class, method } => visitor.visit_enclosing_method(*class, *method, cp),
		AttributeInfo::Synthetic => visitor.visit_synthetic(cp),
		AttributeInfo::Signature { signature } => visitor.visit_signature(*signature, cp),
		AttributeInfo::SourceFile { source_file } => visitor.visit_source_file(*source_file, cp),
		AttributeInfo::SourceDebugExtension { debug_extension } => {
			visitor.visit_source_debug_extension(debug_extension, cp)
		}
		AttributeInfo::LineNumberTable { line_numbers } => {
			visitor.visit_line_number_table(line_numbers, cp);
			for line_number in line_numbers {
				visitor.visit_line_number(line_number, cp);
			}
		}
		AttributeInfo::LocalVariableTable { local_variables } => {
			visitor.visit_local_variable_table(local_variables, cp);
			for local_variable in local_variables {
				visitor.visit_local_variable(local_variable, cp);
			}
		}
		AttributeInfo::LocalVariableTypeTable { local_variable_types } => {
			visitor.visit_local_variable_type_table(local_variable_types, cp);
			for local_variable_type in local_variable_types {
				visitor.visit_local_variable_type(local_variable_type, cp);
			}
		}
		AttributeInfo::Deprecated => visitor.visit_deprecated(cp),
		AttributeInfo::RuntimeVisibleAnnotations { annotations } => {
			visitor.visit_annotations(true, annotations, cp);
			walk_annotations(visitor, annotations, cp);
		}
		AttributeInfo::RuntimeInvisibleAnnotations { annotations } => {
			visitor.visit_annotations(false, annotations, cp);
			walk_annotations(visitor, annotations, cp);
		}
		AttributeInfo::RuntimeVisibleParameterAnnotations { parameters } => {
			visitor.visit_parameter_annotations(true, parameters, cp);
			walk_parameter_annotations(visitor, parameters, cp);
		}
		AttributeInfo::RuntimeInvisibleParameterAnnotations { parameters } => {
			visitor.visit_parameter_annotations(false, parameters, cp);
			walk_parameter_annotations(visitor, parameters, cp);
		}
		AttributeInfo::RuntimeVisibleTypeAnnotations { annotations } => {
			visitor.visit_type_annotations(true, annotations, cp);
			walk_type_annotations(visitor, annotations, cp);
		}
		AttributeInfo::RuntimeInvisibleTypeAnnotations { annotations } => {
			visitor.visit_type_annotations(false, annotations, cp);
			walk_type_annotations(visitor, annotations, cp);
		}
		AttributeInfo::AnnotationDefault { value } => {
			visitor.visit_annotation_default(value, cp);
			walk_element_value(visitor, value, cp);
		}
		AttributeInfo::BootstrapMethods { methods } => {
			visitor.visit_bootstrap_methods(methods, cp);
			for method in methods {
				visitor.visit_bootstrap_method(method, cp);
			}
		}
		AttributeInfo::MethodParameters { parameters } => {
			visitor.visit_method_parameters(parameters, cp);
			for parameter in parameters {
				visitor.visit_method_parameter(parameter, cp);
			}
		}
		AttributeInfo::Module(module) => walk_module(visitor, module, cp),
		AttributeInfo::ModulePackages { packages } => visitor.visit_module_packages(packages, cp),
		AttributeInfo::ModuleMainClass { main_class } => visitor.visit_module_main_class(*main_class, cp),
		AttributeInfo::NestHost { host } => visitor.visit_nest_host(*host, cp),
		AttributeInfo::NestMembers { classes } => visitor.visit_nest_members(classes, cp),
		AttributeInfo::PermittedSubclasses { classes } => visitor.visit_permitted_subclasses(classes, cp),
		AttributeInfo::Record { components } => {
			visitor.visit_record(components, cp);
			for component in components {
				visitor.visit_record_component(component, cp);
				walk_attributes(visitor, &component.attributes, cp);
			}
		}
		AttributeInfo::Custom { name, info } => visitor.visit_custom_attribute(*name, info, cp),
	}
}

pub fn walk_code<V: Visitor + ?Sized>(visitor: &mut V, code: &Code, cp: &ConstantPool) {
	visitor.visit_code(code, cp);

	for instruction in code.instructions() {
		match instruction {
			Ok(instruction) => visitor.visit_instruction(&instruction, cp),
			Err(error) => {
				debug!("bytecode decoding stopped: {error}");
				visitor.visit_bytecode_error(code, &error, cp);
			}
		}
	}
	for handler in &code.exception_table {
		visitor.visit_exception_handler(handler, cp);
	}
	walk_attributes(visitor, &code.attributes, cp);
}

fn walk_module<V: Visitor + ?Sized>(visitor: &mut V, module: &Module, cp: &ConstantPool) {
	visitor.visit_module(module, cp);
	for requires in &module.requires {
		visitor.visit_requires(requires, cp);
	}
	for exports in &module.exports {
		visitor.visit_exports(exports, cp);
	}
	for opens in &module.opens {
		visitor.visit_opens(opens, cp);
	}
	for service in &module.uses {
		visitor.visit_uses(*service, cp);
	}
	for provides in &module.provides {
		visitor.visit_provides(provides, cp);
	}
}

fn walk_annotations<V: Visitor + ?Sized>(visitor: &mut V, annotations: &[Annotation], cp: &ConstantPool) {
	for annotation in annotations {
		walk_annotation(visitor, annotation, cp);
	}
}

fn walk_parameter_annotations<V: Visitor + ?Sized>(
	visitor: &mut V,
	parameters: &[ParameterAnnotation],
	cp: &ConstantPool,
) {
	for (parameter, annotations) in parameters.iter().enumerate() {
		visitor.visit_parameter_annotation(parameter, annotations, cp);
		walk_annotations(visitor, &annotations.annotations, cp);
	}
}

fn walk_type_annotations<V: Visitor + ?Sized>(visitor: &mut V, annotations: &[TypeAnnotation], cp: &ConstantPool) {
	for annotation in annotations {
		visitor.visit_type_annotation(annotation, cp);
		walk_annotation(visitor, &annotation.annotation, cp);
	}
}

pub fn walk_annotation<V: Visitor + ?Sized>(visitor: &mut V, annotation: &Annotation, cp: &ConstantPool) {
	visitor.visit_annotation(annotation, cp);
	for pair in &annotation.pairs {
		visitor.visit_element_value_pair(pair, cp);
		walk_element_value(visitor, &pair.value, cp);
	}
}

pub fn walk_element_value<V: Visitor + ?Sized>(visitor: &mut V, value: &ElementValue, cp: &ConstantPool) {
	visitor.visit_element_value(value, cp);
	match value {
		ElementValue::Annotation(annotation) => walk_annotation(visitor, annotation, cp),
		ElementValue::Array(values) => {
			for value in values {
				walk_element_value(visitor, value, cp);
			}
		}
		_ => {}
	}
}
