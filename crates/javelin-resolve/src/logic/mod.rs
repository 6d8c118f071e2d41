//! Resolution rules that work the same over every declaration backend.

mod assignability;
mod functional;
mod hierarchy;
mod inference;
mod overload;

pub(crate) use assignability::is_assignable_by;
pub use functional::functional_method;
pub(crate) use functional::strip_wildcards;
pub(crate) use hierarchy::{all_ancestors, all_fields, find_field};
pub(crate) use inference::{
    infer_bindings, instantiate_constructor, instantiate_method, reinstantiated_return_type,
};
pub(crate) use overload::{solve_constructor, solve_method, ResolvedMethod};
