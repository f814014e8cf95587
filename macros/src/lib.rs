use crate::ast::{HandlersInput, LruInput, MetricsInput};
use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::parse_macro_input;

mod ast;
mod parse;

/// Builds a configured `hooked_lru::LruCache`.
///
/// ```ignore
/// let cache = lru!(
///     metadata: Count { max: 3, current: 0 },
///     capacity: 64,
///     metrics: { max_latency: Duration::from_secs(1), precision: 2 },
///     should_evict: |count, _| count.current > count.max,
///     on_insert: |count, _| { count.current += 1; Ok(()) },
///     on_delete: |count, _| { count.current -= 1; Ok(()) },
/// );
/// ```
///
/// Only `metadata` is required. Handlers that are left out stay unset.
#[proc_macro]
pub fn lru(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as LruInput);

    let expanded = quote! {#input};

    TokenStream::from(expanded)
}

impl ToTokens for LruInput {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let metadata = &self.metadata;
        let handlers = &self.handlers;

        let capacity = self.capacity.as_ref().map(|capacity| {
            quote! { .with_capacity(#capacity) }
        });
        let metrics = self.metrics.as_ref().map(|metrics| {
            quote! { .with_metrics(#metrics) }
        });

        tokens.extend(quote! {
            {
                #[allow(unused_mut)]
                let mut __lru_cache = ::hooked_lru::LruCache::with_config(
                    #metadata,
                    ::hooked_lru::CacheConfig::default() #capacity #metrics,
                );
                #handlers
                __lru_cache
            }
        });
    }
}

impl ToTokens for HandlersInput {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let slots = [
            (quote! { should_evict }, &self.should_evict),
            (quote! { on_insert }, &self.on_insert),
            (quote! { on_delete }, &self.on_delete),
            (quote! { on_access }, &self.on_access),
        ];

        for (method, handler) in slots {
            if let Some(handler) = handler {
                tokens.extend(quote! {
                    __lru_cache.#method(#handler);
                });
            }
        }
    }
}

impl ToTokens for MetricsInput {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        let max_latency = &self.max_latency;
        let precision = &self.precision;

        tokens.extend(quote! {
            ::hooked_lru::MetricsConfig::new(#max_latency, #precision)
        });
    }
}
