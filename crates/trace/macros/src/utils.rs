//! Utility functions for macro expansion

use syn::{Ident, Type};

/// Simple name of an impl's self type: `Reader<T>` and `&Reader` give `Reader`
pub(crate) fn type_simple_name(ty: &Type) -> Option<&Ident> {
    match ty {
        Type::Path(path) => path.path.segments.last().map(|segment| &segment.ident),
        Type::Reference(reference) => type_simple_name(&reference.elem),
        Type::Paren(paren) => type_simple_name(&paren.elem),
        Type::Group(group) => type_simple_name(&group.elem),
        _ => None,
    }
}
