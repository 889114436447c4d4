use crate::utils::apply_derives;
use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Ident, Item, Result, Token, parse::Parse, parse::ParseStream, parse_macro_input};

/// #[domain_event] 宏实现
/// - 支持具名、元组与单元变体
/// - 合并派生：Debug、Clone、PartialEq、Serialize、Deserialize
/// - 生成 `::es_domain::domain_event::DomainEvent` 实现
/// - 事件类型默认 `"枚举名.变体名"`，变体可覆写：`#[event(event_type = "...")]`
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new(attr.span(), "#[domain_event] takes no arguments")
            .to_compile_error()
            .into();
    }
    let mut input = parse_macro_input!(item as Item);

    let enum_item = match &mut input {
        Item::Enum(e) => e,
        other => {
            return syn::Error::new(
                other.span(),
                "#[domain_event] can only be used on enum types",
            )
            .to_compile_error()
            .into();
        }
    };

    if enum_item.variants.is_empty() {
        return syn::Error::new(
            enum_item.span(),
            "#[domain_event] requires at least one variant",
        )
        .to_compile_error()
        .into();
    }

    let required: Vec<syn::Path> = vec![
        syn::parse_quote!(Debug),
        syn::parse_quote!(Clone),
        syn::parse_quote!(PartialEq),
        syn::parse_quote!(serde::Serialize),
        syn::parse_quote!(serde::Deserialize),
    ];
    apply_derives(&mut enum_item.attrs, required);

    let mut variant_types: HashMap<String, syn::LitStr> = HashMap::new();

    for v in &mut enum_item.variants {
        let mut retained_attrs = Vec::new();
        let mut type_lit: Option<syn::LitStr> = None;

        for attr in v.attrs.iter() {
            if !attr.path().is_ident("event") {
                retained_attrs.push(attr.clone());
                continue;
            }
            match parse_variant_event_attr(attr) {
                Ok(Some(lit)) => {
                    if type_lit.is_some() {
                        return syn::Error::new(
                            attr.span(),
                            "duplicate 'event_type' specified for this variant",
                        )
                        .to_compile_error()
                        .into();
                    }
                    type_lit = Some(lit);
                }
                Ok(None) => {}
                Err(err) => return err.to_compile_error().into(),
            }
        }

        v.attrs = retained_attrs;
        if let Some(lit) = type_lit {
            variant_types.insert(v.ident.to_string(), lit);
        }
    }

    let enum_ident = &enum_item.ident;
    let enum_name = enum_ident.to_string();
    let (impl_generics, ty_generics, where_clause) = enum_item.generics.split_for_impl();

    // `{ .. }` 模式同时匹配具名、元组与单元变体
    let type_match_arms = enum_item.variants.iter().map(|v| {
        let v_ident = &v.ident;
        let key = v_ident.to_string();
        let lit = variant_types.get(&key).cloned().unwrap_or_else(|| {
            syn::LitStr::new(&format!("{enum_name}.{key}"), v_ident.span())
        });
        quote! { Self::#v_ident { .. } => #lit }
    });

    let out = quote! {
        #enum_item

        impl #impl_generics ::es_domain::domain_event::DomainEvent for #enum_ident #ty_generics #where_clause {
            fn event_type(&self) -> &str { match self { #( #type_match_arms, )* } }
        }
    };

    TokenStream::from(out)
}

// -------- parsing --------

fn parse_variant_event_attr(attr: &syn::Attribute) -> Result<Option<syn::LitStr>> {
    let syn::Meta::List(_) = &attr.meta else {
        return Err(syn::Error::new(attr.span(), "expected #[event(...)]"));
    };

    let mut ty: Option<syn::LitStr> = None;
    let pairs: Punctuated<VariantEventAttrKv, Token![,]> =
        attr.parse_args_with(Punctuated::<VariantEventAttrKv, Token![,]>::parse_terminated)?;

    for kv in pairs {
        if kv.key != "event_type" {
            return Err(syn::Error::new(
                kv.key.span(),
                "unknown key; expected 'event_type'",
            ));
        }
        if ty.is_some() {
            return Err(syn::Error::new(
                kv.key.span(),
                "duplicate key 'event_type' in attribute",
            ));
        }
        match kv.value {
            Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(lit),
                ..
            }) if !lit.value().is_empty() => ty = Some(lit),
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "expected non-empty string literal for 'event_type'",
                ));
            }
        }
    }

    Ok(ty)
}

struct VariantEventAttrKv {
    key: Ident,
    value: Expr,
}

impl Parse for VariantEventAttrKv {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let value: Expr = input.parse()?;
        Ok(Self { key, value })
    }
}
