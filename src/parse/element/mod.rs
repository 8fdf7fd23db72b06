//! @acp:module "Element Parsers"
//! @acp:summary "Pure conversions from reflection nodes to IR nodes"
//! @acp:domain parsing
//! @acp:layer service

pub mod argument;
pub mod class;
pub mod constant;
pub mod function;
pub mod interface;
pub mod member;

pub use argument::ArgumentParser;
pub use class::ClassParser;
pub use constant::ConstantParser;
pub use function::FunctionParser;
pub use interface::InterfaceParser;
pub use member::{MethodOwner, MethodParser, PropertyParser};

use crate::ir::GLOBAL_NAMESPACE;

fn namespace_or_global(namespace: Option<&str>) -> String {
    namespace.unwrap_or(GLOBAL_NAMESPACE).to_string()
}
