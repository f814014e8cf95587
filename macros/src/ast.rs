use syn::Expr;

pub struct LruInput {
    pub metadata: Expr,
    pub capacity: Option<Expr>,
    pub metrics: Option<MetricsInput>,
    pub handlers: HandlersInput,
}

#[derive(Default)]
pub struct HandlersInput {
    pub should_evict: Option<Expr>,
    pub on_insert: Option<Expr>,
    pub on_delete: Option<Expr>,
    pub on_access: Option<Expr>,
}

pub struct MetricsInput {
    pub max_latency: Expr,
    pub precision: Expr,
}
