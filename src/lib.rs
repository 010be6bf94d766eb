pub mod extern_feature;
pub mod grammar;
pub mod lex;
pub mod mistakes;
pub mod semantic;
pub mod syntax;
pub mod table;
