use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericArgument, Lit, Meta, PathArguments, Type};

/// Derive macro that generates the field dictionary of a tax form from its struct.
///
/// For each field, extracts:
/// - Field name (respects #[serde(rename = "...")])
/// - Required (true if not Option<T>)
/// - Kind (`Amount` for `Decimal` fields, `Text` otherwise)
/// - Description (from doc comments)
///
/// Generates a `field_schema() -> &'static [FieldSpec]` method. `FieldSpec` and
/// `FieldKind` must be in scope where the derive is used.
#[proc_macro_derive(FieldSchema, attributes(serde))]
pub fn derive_field_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("FieldSchema only supports structs with named fields"),
        },
        _ => panic!("FieldSchema only supports structs"),
    };

    let field_entries = fields.iter().map(|field| {
        let field_name = field.ident.as_ref().unwrap().to_string();
        let wire_name = get_serde_rename(&field.attrs).unwrap_or(field_name);
        let option_inner = option_inner_type(&field.ty);
        let required = option_inner.is_none();
        let value_type = option_inner.unwrap_or(&field.ty);
        let kind = if last_segment_is(value_type, "Decimal") {
            quote! { FieldKind::Amount }
        } else {
            quote! { FieldKind::Text }
        };
        let description = get_doc_comment(&field.attrs);

        quote! {
            FieldSpec {
                name: #wire_name,
                required: #required,
                kind: #kind,
                description: #description,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn field_schema() -> &'static [FieldSpec] {
                static SCHEMA: &[FieldSpec] = &[
                    #(#field_entries),*
                ];
                SCHEMA
            }
        }
    };

    TokenStream::from(expanded)
}

fn get_serde_rename(attrs: &[syn::Attribute]) -> Option<String> {
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        if let Meta::List(meta_list) = &attr.meta {
            let tokens = meta_list.tokens.to_string();
            if let Some(start) = tokens.find("rename") {
                let rest = &tokens[start..];
                if let Some(eq_pos) = rest.find('=') {
                    let after_eq = rest[eq_pos + 1..].trim();
                    if let Some(stripped) = after_eq.strip_prefix('"') {
                        if let Some(end_quote) = stripped.find('"') {
                            return Some(stripped[..end_quote].to_string());
                        }
                    }
                }
            }
        }
    }
    None
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns `T` when the type is `Option<T>`.
fn option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    }
}

fn last_segment_is(ty: &Type, ident: &str) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == ident;
        }
    }
    false
}
