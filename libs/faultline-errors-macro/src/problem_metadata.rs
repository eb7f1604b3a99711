use proc_macro_error2::abort;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, LitInt, LitStr, spanned::Spanned};

const DEFAULT_STATUS: u16 = 500;

const RESOLUTION_BASE: &str = "http://uri-reference.invalid/";
const EXCLUDED: &[char] = &['"', '<', '>', '\\', '^', '`', '{', '|', '}'];

/// Values parsed from one `#[problem(...)]` attribute
#[derive(Default)]
struct ProblemAttr {
    code: Option<(String, Span)>,
    status: Option<u16>,
    doc: Option<(String, Span)>,
    title: Option<String>,
}

pub fn expand_derive_problem_metadata(input: &DeriveInput) -> TokenStream {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(_) => {
            let Some(attr) = parse_problem_attr(&input.attrs, ident.span()) else {
                abort!(
                    ident.span(),
                    "#[derive(ProblemMetadata)] on a struct requires #[problem(code = \"...\")]"
                );
            };
            let meta = meta_tokens(&attr);
            quote! { ::core::option::Option::Some(#meta) }
        }
        Data::Enum(data) => {
            if let Some(attr) = input.attrs.iter().find(|a| a.path().is_ident("problem")) {
                abort!(
                    attr.path().span(),
                    "#[problem(...)] belongs on enum variants, not on the enum itself"
                );
            }

            let arms = data.variants.iter().map(|variant| {
                let variant_ident = &variant.ident;
                match parse_problem_attr(&variant.attrs, variant_ident.span()) {
                    Some(attr) => {
                        let meta = meta_tokens(&attr);
                        quote! {
                            Self::#variant_ident { .. } => ::core::option::Option::Some(#meta)
                        }
                    }
                    None => quote! {
                        Self::#variant_ident { .. } => ::core::option::Option::None
                    },
                }
            });

            quote! {
                match *self {
                    #(#arms,)*
                }
            }
        }
        Data::Union(_) => abort!(
            ident.span(),
            "#[derive(ProblemMetadata)] can only be applied to structs and enums"
        ),
    };

    quote! {
        #[automatically_derived]
        impl #impl_generics ::faultline_errors::ProblemMetadata for #ident #ty_generics #where_clause {
            fn problem_meta(&self) -> ::core::option::Option<::faultline_errors::ErrorMeta> {
                #body
            }
        }
    }
}

fn meta_tokens(attr: &ProblemAttr) -> TokenStream {
    let code = attr.code.as_ref().map(|(c, _)| c.as_str()).unwrap_or_default();
    let status = attr.status.unwrap_or(DEFAULT_STATUS);
    let doc = optional_str(attr.doc.as_ref().map(|(d, _)| d.as_str()));
    let title = optional_str(attr.title.as_deref());

    quote! {
        ::faultline_errors::ErrorMeta {
            code: #code,
            status: #status,
            doc: #doc,
            title: #title,
        }
    }
}

fn optional_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(v) => quote! { ::core::option::Option::Some(#v) },
        None => quote! { ::core::option::Option::None },
    }
}

/// Parse the single `#[problem(...)]` attribute among `attrs`, if any.
fn parse_problem_attr(attrs: &[Attribute], owner_span: Span) -> Option<ProblemAttr> {
    let mut found: Option<ProblemAttr> = None;

    for attr in attrs {
        if !attr.path().is_ident("problem") {
            continue;
        }
        if found.is_some() {
            abort!(attr.path().span(), "duplicate #[problem(...)] attribute");
        }

        let mut parsed = ProblemAttr::default();
        let result = attr.parse_nested_meta(|meta| {
            let span = meta.path.span();
            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();

            match key.as_str() {
                "status" => {
                    if parsed.status.is_some() {
                        abort!(span, "duplicate key 'status'");
                    }
                    let lit: LitInt = meta.value()?.parse()?;
                    let status: u16 = lit.base10_parse()?;
                    if !(100..=599).contains(&status) {
                        abort!(lit.span(), "invalid HTTP status code {}", status);
                    }
                    parsed.status = Some(status);
                }
                "code" => {
                    if parsed.code.is_some() {
                        abort!(span, "duplicate key 'code'");
                    }
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.code = Some((lit.value(), lit.span()));
                }
                "doc" => {
                    if parsed.doc.is_some() {
                        abort!(span, "duplicate key 'doc'");
                    }
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.doc = Some((lit.value(), lit.span()));
                }
                "title" => {
                    if parsed.title.is_some() {
                        abort!(span, "duplicate key 'title'");
                    }
                    let lit: LitStr = meta.value()?.parse()?;
                    parsed.title = Some(lit.value());
                }
                _ => abort!(
                    span,
                    "unknown key; expected one of `code`, `status`, `doc`, `title`"
                ),
            }
            Ok(())
        });

        if let Err(err) = result {
            abort!(err.span(), "{}", err);
        }

        validate(&parsed, owner_span);
        found = Some(parsed);
    }

    found
}

fn validate(attr: &ProblemAttr, owner_span: Span) {
    match &attr.code {
        None => abort!(owner_span, "#[problem(...)] is missing the required `code` key"),
        Some((code, span)) if code.trim().is_empty() => {
            abort!(*span, "`code` must not be blank");
        }
        Some(_) => {}
    }

    if let Some((doc, span)) = &attr.doc
        && let Err(reason) = check_uri_reference(doc)
    {
        abort!(*span, "`doc` must be a URI reference ('{}': {})", doc, reason);
    }
}

/// Compile-time twin of `faultline_errors::check_uri_reference`.
fn check_uri_reference(doc: &str) -> Result<(), String> {
    if let Some(c) = doc
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || EXCLUDED.contains(c))
    {
        return Err(format!("contains a character that must be percent-encoded: {c:?}"));
    }

    match url::Url::parse(doc) {
        Ok(_) => Ok(()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = url::Url::parse(RESOLUTION_BASE).map_err(|e| e.to_string())?;
            url::Url::options()
                .base_url(Some(&base))
                .parse(doc)
                .map(drop)
                .map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}
