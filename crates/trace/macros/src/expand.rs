//! Expansion of `#[traced]` items

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Block, Expr, Ident, ImplItem, ImplItemFn, Item, ItemFn, ItemImpl, LitStr, Signature,
    Visibility, ext::IdentExt, parse_quote, spanned::Spanned,
};

use crate::args::TracedArgs;
use crate::utils::type_simple_name;

/// Expand `#[traced]` applied to `item`
pub(crate) fn expand_item(args: TracedArgs, item: Item) -> syn::Result<TokenStream> {
    match item {
        Item::Fn(function) => expand_fn(args, function),
        Item::Impl(item_impl) => expand_impl(args, item_impl),
        other => Err(syn::Error::new(
            other.span(),
            "#[traced] can only be applied to functions and impl blocks",
        )),
    }
}

fn expand_fn(args: TracedArgs, mut function: ItemFn) -> syn::Result<TokenStream> {
    if args.skip {
        return Ok(function.into_token_stream());
    }
    reject_async(&function.sig)?;
    if let Some(receiver) = function.sig.receiver() {
        return Err(syn::Error::new(
            receiver.span(),
            "#[traced] on a method needs the declaring type; put it on the impl block instead",
        ));
    }

    let name = name_lit(&function.sig.ident);
    let site = quote! {
        ::nexum_trace::CallSite::free_fn(::core::module_path!(), #name)
    };
    prepend_guard(&mut function.block, args.tracer.as_ref(), &site);

    Ok(function.into_token_stream())
}

fn expand_impl(args: TracedArgs, mut item_impl: ItemImpl) -> syn::Result<TokenStream> {
    if args.skip {
        return Ok(item_impl.into_token_stream());
    }

    let type_name = type_simple_name(&item_impl.self_ty)
        .map(ToString::to_string)
        .ok_or_else(|| {
            syn::Error::new(
                item_impl.self_ty.span(),
                "#[traced] needs a named self type to tag trace lines with",
            )
        })?;
    let trait_impl = item_impl.trait_.is_some();

    for impl_item in &mut item_impl.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let method_args = TracedArgs::take_from(&mut method.attrs)?;
        if method_args.skip || !is_entry_point(method, trait_impl) {
            continue;
        }
        reject_async(&method.sig)?;

        let tracer = method_args.tracer.as_ref().or(args.tracer.as_ref());
        let method_name = name_lit(&method.sig.ident);
        let site = quote! {
            ::nexum_trace::CallSite::new(::core::module_path!(), #type_name, #method_name)
        };
        prepend_guard(&mut method.block, tracer, &site);
    }

    Ok(item_impl.into_token_stream())
}

/// Public methods of inherent impls and every method of a trait impl.
/// `const fn`s cannot call into the interceptor and are left alone.
fn is_entry_point(method: &ImplItemFn, trait_impl: bool) -> bool {
    method.sig.constness.is_none()
        && (trait_impl || matches!(method.vis, Visibility::Public(_)))
}

/// Name as written in source, without any `r#` prefix
fn name_lit(ident: &Ident) -> LitStr {
    LitStr::new(&ident.unraw().to_string(), ident.span())
}

fn reject_async(sig: &Signature) -> syn::Result<()> {
    match &sig.asyncness {
        Some(asyncness) => Err(syn::Error::new(
            asyncness.span(),
            "#[traced] does not support async functions; nesting is tracked per thread",
        )),
        None => Ok(()),
    }
}

fn prepend_guard(block: &mut Block, tracer: Option<&Expr>, site: &TokenStream) {
    let tracer = tracer.map_or_else(
        || quote! { ::nexum_trace::global() },
        |expr| expr.to_token_stream(),
    );
    block.stmts.insert(
        0,
        parse_quote! {
            let __nexum_trace_guard = ::nexum_trace::TraceInterceptor::enter(#tracer, &#site);
        },
    );
}
