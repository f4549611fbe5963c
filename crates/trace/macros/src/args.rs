//! Argument parsing for `#[traced(...)]`

use syn::{
    Attribute, Expr, Ident, Token,
    parse::{Parse, ParseStream},
};

/// Arguments accepted by `#[traced]`, on an item or on a method inside a
/// traced impl block
#[derive(Default)]
pub(crate) struct TracedArgs {
    /// Expression yielding `&TraceInterceptor`
    pub(crate) tracer: Option<Expr>,
    /// Leave the item untouched
    pub(crate) skip: bool,
}

impl Parse for TracedArgs {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let mut args = Self::default();

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            match key.to_string().as_str() {
                "tracer" => {
                    if args.tracer.is_some() {
                        return Err(syn::Error::new(key.span(), "Duplicate tracer argument"));
                    }
                    input.parse::<Token![=]>()?;
                    args.tracer = Some(input.parse()?);
                }
                "skip" => args.skip = true,
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("Unknown traced argument: {key}"),
                    ));
                }
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

impl TracedArgs {
    /// Take the `#[traced(...)]` attributes off a method and merge them
    pub(crate) fn take_from(attrs: &mut Vec<Attribute>) -> syn::Result<Self> {
        let mut merged = Self::default();
        let mut result = Ok(());

        attrs.retain(|attr| {
            if !attr.path().is_ident("traced") {
                return true;
            }
            let parsed = match &attr.meta {
                syn::Meta::Path(_) => Ok(Self::default()),
                _ => attr.parse_args::<Self>(),
            };
            match parsed {
                Ok(args) => {
                    merged.skip |= args.skip;
                    if args.tracer.is_some() {
                        merged.tracer = args.tracer;
                    }
                }
                Err(err) => result = Err(err),
            }
            false
        });

        result.map(|()| merged)
    }
}
