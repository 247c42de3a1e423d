mod bytecode;
mod classfile;
