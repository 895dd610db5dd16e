//! Record derive macro implementation

use proc_macro2::{Literal, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Result, Visibility};

struct FieldInfo {
    ident: syn::Ident,
    ty: syn::Type,
    name: String,
    tag: Option<String>,
    visible: bool,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    // The descriptor lives in a per-impl static, which cannot depend on
    // type parameters.
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut infos = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let name = ident.to_string().trim_start_matches("r#").to_string();
        infos.push(FieldInfo {
            tag: get_sql_tag(field)?,
            visible: matches!(field.vis, Visibility::Public(_)),
            ty: field.ty.clone(),
            name,
            ident,
        });
    }

    let type_name = name.to_string();

    let specs = infos.iter().map(|f| {
        let field_name = &f.name;
        let ty = &f.ty;
        let visible = f.visible;
        let tag = match &f.tag {
            Some(tag) => quote! { ::core::option::Option::Some(#tag) },
            None => quote! { ::core::option::Option::None },
        };
        quote! {
            ::tagorm::FieldSpec {
                name: #field_name,
                tag: #tag,
                kind: <#ty as ::tagorm::Column>::KIND,
                visible: #visible,
            }
        }
    });

    let value_arms = infos.iter().enumerate().map(|(i, f)| {
        let index = Literal::usize_unsuffixed(i);
        let ident = &f.ident;
        quote! { #index => ::tagorm::Column::to_value(&self.#ident), }
    });

    let set_arms = infos.iter().enumerate().map(|(i, f)| {
        let index = Literal::usize_unsuffixed(i);
        let ident = &f.ident;
        quote! { #index => self.#ident = ::tagorm::parse_column(column, raw)?, }
    });

    Ok(quote! {
        impl ::tagorm::Record for #name {
            fn descriptor() -> &'static ::tagorm::RecordDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::tagorm::RecordDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::tagorm::RecordDescriptor::new(#type_name, &[#(#specs),*])
                })
            }

            fn field_value(&self, index: usize) -> ::tagorm::Value {
                match index {
                    #(#value_arms)*
                    _ => ::tagorm::Value::Null,
                }
            }

            #[allow(unused_variables)]
            fn set_field(&mut self, index: usize, raw: &str) -> ::tagorm::OrmResult<()> {
                let descriptor = <Self as ::tagorm::Record>::descriptor();
                let ::core::option::Option::Some(field) = descriptor.fields().get(index) else {
                    return ::core::result::Result::Ok(());
                };
                let column = field.column.as_str();
                match index {
                    #(#set_arms)*
                    _ => {}
                }
                ::core::result::Result::Ok(())
            }
        }
    })
}

/// Value of `#[orm(sql = "...")]`, if present.
fn get_sql_tag(field: &syn::Field) -> Result<Option<String>> {
    let mut tag = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("sql") {
                let value: LitStr = meta.value()?.parse()?;
                tag = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported orm attribute, expected `sql = \"...\"`"))
            }
        })?;
    }
    Ok(tag)
}
