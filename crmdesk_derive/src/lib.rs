use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type, parse_macro_input, spanned::Spanned};

/// Derives `crmdesk::RecordFields` for a named-field struct.
///
/// Generates a `<Name>Patch` struct holding an `Option` per mutable field,
/// merge logic for that patch, and string lookup of fields by their
/// camelCase name (the names list screens filter on).
///
/// Field options:
/// - `#[record(id)]` marks the identity field (never patched; only
///   `assign_id` rewrites it).
/// - `#[record(readonly)]` excludes a field from the patch.
/// - `#[record(name = "...")]` overrides the lookup name.
#[proc_macro_derive(RecordFields, attributes(record))]
pub fn derive_record_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_record_fields(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct FieldOptions {
    id: bool,
    readonly: bool,
    name: Option<String>,
}

struct RecordField {
    ident: Ident,
    ty: Type,
    lookup_name: String,
    patchable: bool,
}

fn expand_record_fields(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;
    let vis = input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "RecordFields does not support generic structs",
        ));
    }

    let data_struct = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "RecordFields can only be derived for structs",
            ));
        }
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "RecordFields requires named fields",
            ));
        }
    };

    let mut fields = Vec::<RecordField>::new();
    let mut id_count = 0usize;
    let mut id_ident = None;
    for field in named_fields.named {
        let ident = field.ident.clone().ok_or_else(|| {
            syn::Error::new(field.span(), "RecordFields requires named fields")
        })?;
        let options = parse_field_options(&field.attrs)?;
        if options.id {
            id_count += 1;
            id_ident = Some(ident.clone());
        }
        let lookup_name = options
            .name
            .clone()
            .unwrap_or_else(|| to_camel_case(ident.to_string().trim_start_matches("r#")));
        fields.push(RecordField {
            ident,
            ty: field.ty,
            lookup_name,
            patchable: !options.id && !options.readonly,
        });
    }

    let id_ident = match (id_count, id_ident) {
        (1, Some(ident)) => ident,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "RecordFields requires exactly one #[record(id)] field",
            ));
        }
    };

    let patch_name = format_ident!("{}Patch", struct_name);
    let patch_doc = format!(
        "Partial update for [`{}`]; only `Some` fields are applied.",
        struct_name
    );

    let patch_fields = fields.iter().filter(|field| field.patchable).collect::<Vec<_>>();
    let patch_idents = patch_fields.iter().map(|field| &field.ident).collect::<Vec<_>>();
    let patch_types = patch_fields.iter().map(|field| &field.ty).collect::<Vec<_>>();
    let patch_names = patch_fields
        .iter()
        .map(|field| field.lookup_name.as_str())
        .collect::<Vec<_>>();

    let lookup_names = fields
        .iter()
        .map(|field| field.lookup_name.as_str())
        .collect::<Vec<_>>();
    let lookup_idents = fields.iter().map(|field| &field.ident).collect::<Vec<_>>();

    Ok(quote! {
        #[doc = #patch_doc]
        #[derive(Debug, Clone, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #vis struct #patch_name {
            #(
                #[serde(rename = #patch_names, default, skip_serializing_if = "Option::is_none")]
                pub #patch_idents: Option<#patch_types>,
            )*
        }

        impl #patch_name {
            #(
                pub fn #patch_idents(mut self, value: impl Into<#patch_types>) -> Self {
                    self.#patch_idents = Some(value.into());
                    self
                }
            )*

            /// True when applying this patch would change nothing.
            pub fn is_empty(&self) -> bool {
                true #(&& self.#patch_idents.is_none())*
            }

            /// Lookup names of the fields this patch sets.
            pub fn changed_fields(&self) -> Vec<&'static str> {
                let mut changed = Vec::new();
                #(
                    if self.#patch_idents.is_some() {
                        changed.push(#patch_names);
                    }
                )*
                changed
            }
        }

        impl ::crmdesk::RecordFields for #struct_name {
            type Patch = #patch_name;

            const FIELD_NAMES: &'static [&'static str] = &[#(#lookup_names),*];

            fn field_text(&self, field: &str) -> Option<String> {
                match field {
                    #(
                        #lookup_names => ::crmdesk::FieldText::field_text(&self.#lookup_idents),
                    )*
                    _ => None,
                }
            }

            fn apply_patch(&mut self, patch: Self::Patch) {
                #(
                    if let Some(value) = patch.#patch_idents {
                        self.#patch_idents = value;
                    }
                )*
            }

            fn assign_id(&mut self, id: ::crmdesk::RecordId) {
                self.#id_ident = id;
            }
        }
    })
}

fn parse_field_options(attrs: &[syn::Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                options.id = true;
                return Ok(());
            }

            if meta.path.is_ident("readonly") {
                options.readonly = true;
                return Ok(());
            }

            if meta.path.is_ident("name") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                options.name = Some(lit.value());
                return Ok(());
            }

            Err(meta.error(
                "Unsupported #[record(...)] option. Supported: id, readonly, name = \"...\"",
            ))
        })?;
    }

    Ok(options)
}

fn to_camel_case(value: &str) -> String {
    let mut out = String::new();
    for (index, chunk) in value.split('_').filter(|part| !part.is_empty()).enumerate() {
        if index == 0 {
            out.push_str(chunk);
            continue;
        }
        let mut chars = chunk.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        value.to_string()
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::to_camel_case;

    #[test]
    fn camel_case_conversion() {
        assert_eq!(to_camel_case("first_name"), "firstName");
        assert_eq!(to_camel_case("close_date"), "closeDate");
        assert_eq!(to_camel_case("status"), "status");
    }
}
