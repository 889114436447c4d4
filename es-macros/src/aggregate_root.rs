use crate::utils::{apply_derives, ensure_field_attr, ensure_leading_fields};
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{
    Item, Result, Token, Type, parse::Parse, parse::ParseStream, parse_macro_input,
};

/// #[aggregate_root] 宏实现
/// - 若缺失则追加字段并置于最前：
///   `aggregate_id: String`, `aggregate_version: usize`,
///   `#[serde(skip)] changes: Vec<::es_domain::persist::EventRecord>`
/// - 合并派生：Debug（可关闭）、Clone、Default、Serialize、Deserialize
/// - 自动实现 `::es_domain::entity::Entity`
/// - 支持参数：`#[aggregate_root(debug = true|false)]`，默认 `true`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as AggregateRootAttrConfig);
    let input = parse_macro_input!(item as Item);

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return syn::Error::new(other.span(), "#[aggregate_root] only on struct")
                .to_compile_error()
                .into();
        }
    };

    // 仅支持具名字段结构体
    let fields_named = match &mut st.fields {
        syn::Fields::Named(f) => f,
        _ => {
            return syn::Error::new(st.span(), "only supports named-field struct")
                .to_compile_error()
                .into();
        }
    };

    let id_ty: Type = syn::parse_quote! { String };
    let version_ty: Type = syn::parse_quote! { usize };
    let changes_ty: Type = syn::parse_quote! { Vec<::es_domain::persist::EventRecord> };
    ensure_leading_fields(
        fields_named,
        &[
            ("aggregate_id", &id_ty),
            ("aggregate_version", &version_ty),
            ("changes", &changes_ty),
        ],
    );
    // 待持久化变更只存在于内存，不进入快照
    ensure_field_attr(fields_named, "changes", syn::parse_quote!(#[serde(skip)]));

    let mut required: Vec<syn::Path> = vec![
        syn::parse_quote!(Clone),
        syn::parse_quote!(Default),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];
    if cfg.derive_debug.unwrap_or(true) {
        required.insert(0, syn::parse_quote!(Debug));
    }
    apply_derives(&mut st.attrs, required);

    let ident = &st.ident;
    let generics = st.generics.clone();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        #st

        impl #impl_generics ::es_domain::entity::Entity for #ident #ty_generics #where_clause {
            fn new(aggregate_id: ::std::string::String) -> Self {
                Self {
                    aggregate_id,
                    aggregate_version: 0,
                    changes: ::std::vec::Vec::new(),
                    ..::std::default::Default::default()
                }
            }

            fn aggregate_id(&self) -> &str { &self.aggregate_id }

            fn aggregate_version(&self) -> usize { self.aggregate_version }

            fn set_aggregate_version(&mut self, version: usize) { self.aggregate_version = version; }

            fn changes(&self) -> &[::es_domain::persist::EventRecord] { &self.changes }

            fn changes_mut(&mut self) -> &mut ::std::vec::Vec<::es_domain::persist::EventRecord> {
                &mut self.changes
            }
        }
    };

    TokenStream::from(expanded)
}

// -------- parsing --------

struct AggregateRootAttrConfig {
    derive_debug: Option<bool>,
}

impl Parse for AggregateRootAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut derive_debug: Option<bool> = None;

        let elems: Punctuated<syn::MetaNameValue, Token![,]> =
            Punctuated::<syn::MetaNameValue, Token![,]>::parse_terminated(input)?;

        for elem in elems {
            if !elem.path.is_ident("debug") {
                return Err(syn::Error::new(
                    elem.path.span(),
                    "unknown key in attribute; expected 'debug'",
                ));
            }
            if derive_debug.is_some() {
                return Err(syn::Error::new(
                    elem.path.span(),
                    "duplicate key 'debug' in attribute",
                ));
            }
            match elem.value {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Bool(b),
                    ..
                }) => derive_debug = Some(b.value()),
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "expected boolean literal for 'debug'",
                    ));
                }
            }
        }

        Ok(Self { derive_debug })
    }
}
