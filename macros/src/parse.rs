use crate::ast::{HandlersInput, LruInput, MetricsInput};
use proc_macro2::Ident;
use syn::parse::{Parse, ParseStream};
use syn::token::Brace;
use syn::{Error, Expr, Token, braced};

/// Stores `value` into an optional field, rejecting a second occurrence.
fn set_once<T>(slot: &mut Option<T>, key: &Ident, value: T) -> syn::Result<()> {
    if slot.is_some() {
        return Err(Error::new(key.span(), format!("duplicate '{key}' field")));
    }

    *slot = Some(value);
    Ok(())
}

impl Parse for LruInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut metadata = None;
        let mut capacity = None;
        let mut metrics = None;
        let mut handlers = HandlersInput::default();

        while !input.is_empty() {
            let key = input.parse::<Ident>()?;
            let _ = input.parse::<Token![:]>()?;

            match key.to_string().as_str() {
                "metadata" => set_once(&mut metadata, &key, input.parse::<Expr>()?)?,
                "capacity" => set_once(&mut capacity, &key, input.parse::<Expr>()?)?,
                "metrics" => set_once(&mut metrics, &key, input.parse::<MetricsInput>()?)?,
                "should_evict" => {
                    set_once(&mut handlers.should_evict, &key, input.parse::<Expr>()?)?
                }
                "on_insert" => set_once(&mut handlers.on_insert, &key, input.parse::<Expr>()?)?,
                "on_delete" => set_once(&mut handlers.on_delete, &key, input.parse::<Expr>()?)?,
                "on_access" => set_once(&mut handlers.on_access, &key, input.parse::<Expr>()?)?,
                _ => {
                    return Err(Error::new(
                        key.span(),
                        format!("field '{key}' is not recognized"),
                    ));
                }
            };

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        let metadata =
            metadata.ok_or_else(|| Error::new(input.span(), "field 'metadata' is missing"))?;

        Ok(LruInput {
            metadata,
            capacity,
            metrics,
            handlers,
        })
    }
}

impl Parse for MetricsInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if !input.peek(Brace) {
            return Err(Error::new(input.span(), "missing the brace block"));
        }

        let content;
        braced!(content in input);

        let mut max_latency = None;
        let mut precision = None;

        while !content.is_empty() {
            let key = content.parse::<Ident>()?;
            let _ = content.parse::<Token![:]>()?;

            match key.to_string().as_str() {
                "max_latency" => set_once(&mut max_latency, &key, content.parse::<Expr>()?)?,
                "precision" => set_once(&mut precision, &key, content.parse::<Expr>()?)?,
                _ => {
                    return Err(Error::new(
                        key.span(),
                        format!("field '{key}' doesn't relate to metrics"),
                    ));
                }
            }

            if content.peek(Token![,]) {
                let _ = content.parse::<Token![,]>()?;
            }
        }

        let max_latency = max_latency
            .ok_or_else(|| Error::new(content.span(), "field 'max_latency' is missing"))?;
        let precision =
            precision.ok_or_else(|| Error::new(content.span(), "field 'precision' is missing"))?;

        Ok(MetricsInput {
            max_latency,
            precision,
        })
    }
}
