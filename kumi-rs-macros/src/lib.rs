use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Expr, Fields, LitInt, LitStr, Path};

/// Derives `kumi::cli::CommandSettings` for a struct with named fields.
///
/// # Usage
///
/// ```ignore
/// #[derive(CommandSettings)]
/// #[kumi(validate = check_port)]
/// struct ServeSettings {
///     #[kumi(argument = "<ROOT>", description = "Directory to serve")]
///     root: PathBuf,
///
///     #[kumi(option = "-p|--port <PORT>", default = "8080")]
///     port: u16,
///
///     #[kumi(option = "--verbose", hidden)]
///     verbose: bool,
///
///     // Not a parameter: filled with Default::default()
///     started: Option<Instant>,
/// }
///
/// fn check_port(settings: &ServeSettings) -> Result<(), ValidationError> { ... }
/// ```
///
/// Field attributes:
///
/// - `argument = "<NAME>"` or `option = "-s|--long <VALUE>"` (exactly one)
/// - `default = "text"`: converted like user input
/// - `description = "text"`
/// - `position = N` (arguments only)
/// - `hidden`, `required` (options only)
/// - `converter = path::to::fn`: `fn(&str) -> Result<T, String>`
/// - `pair_deconstructor = expr` (options only)
///
/// Struct attribute: `validate = path::to::fn`, a
/// `fn(&Self) -> Result<(), ValidationError>`.
#[proc_macro_derive(CommandSettings, attributes(kumi))]
pub fn derive_command_settings(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let validate = extract_validate(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new(
                    input.span(),
                    "CommandSettings requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "CommandSettings can only be derived for structs",
            ))
        }
    };

    let mut declarations = Vec::new();
    let mut initializers = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let key = ident.unraw().to_string();
        match FieldAttrs::parse(field)? {
            Some(attrs) => {
                declarations.push(attrs.declaration(&key, &field.ty));
                initializers.push(quote_spanned! {field.span()=>
                    #ident: values.take(#key)?
                });
            }
            None => initializers.push(quote_spanned! {field.span()=>
                #ident: ::core::default::Default::default()
            }),
        }
    }

    let construct = match &input.data {
        Data::Struct(data) if matches!(data.fields, Fields::Unit) => quote!(Self),
        _ => quote!(Self { #(#initializers),* }),
    };

    let validate = validate.map(|path| {
        quote! {
            fn validate(&self) -> ::core::result::Result<(), ::kumi::cli::ValidationError> {
                #path(self)
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::kumi::cli::CommandSettings for #name #ty_generics #where_clause {
            fn declare(schema: &mut ::kumi::cli::SettingsSchema) {
                #(#declarations)*
            }

            #[allow(unused_variables)]
            fn bind(
                values: &mut ::kumi::cli::BoundValues,
            ) -> ::core::result::Result<Self, ::kumi::cli::BindError> {
                ::core::result::Result::Ok(#construct)
            }

            #validate
        }
    })
}

enum Kind {
    Argument(LitStr),
    Option(LitStr),
}

struct FieldAttrs {
    kind: Kind,
    default: Option<LitStr>,
    description: Option<LitStr>,
    position: Option<LitInt>,
    hidden: bool,
    required: bool,
    converter: Option<Path>,
    pair_deconstructor: Option<Expr>,
}

impl FieldAttrs {
    /// `None` when the field carries no `#[kumi(...)]` attribute.
    fn parse(field: &syn::Field) -> syn::Result<Option<Self>> {
        let mut seen = false;
        let mut kind = None;
        let mut default = None;
        let mut description = None;
        let mut position = None;
        let mut hidden = false;
        let mut required = false;
        let mut converter = None;
        let mut pair_deconstructor = None;

        for attr in &field.attrs {
            if !attr.path().is_ident("kumi") {
                continue;
            }
            seen = true;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("argument") || meta.path.is_ident("option") {
                    if kind.is_some() {
                        return Err(meta.error("a field is either one argument or one option"));
                    }
                    let template: LitStr = meta.value()?.parse()?;
                    kind = Some(if meta.path.is_ident("argument") {
                        Kind::Argument(template)
                    } else {
                        Kind::Option(template)
                    });
                } else if meta.path.is_ident("default") {
                    default = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("description") {
                    description = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("position") {
                    position = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("hidden") {
                    hidden = true;
                } else if meta.path.is_ident("required") {
                    required = true;
                } else if meta.path.is_ident("converter") {
                    converter = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("pair_deconstructor") {
                    pair_deconstructor = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unknown kumi attribute"));
                }
                Ok(())
            })?;
        }

        if !seen {
            return Ok(None);
        }
        let Some(kind) = kind else {
            return Err(syn::Error::new(
                field.span(),
                "expected `argument = \"<NAME>\"` or `option = \"--name\"`",
            ));
        };
        match &kind {
            Kind::Argument(_) if hidden || required || pair_deconstructor.is_some() => {
                return Err(syn::Error::new(
                    field.span(),
                    "`hidden`, `required` and `pair_deconstructor` apply to options only",
                ));
            }
            Kind::Option(_) if position.is_some() => {
                return Err(syn::Error::new(
                    field.span(),
                    "`position` applies to arguments only",
                ));
            }
            _ => {}
        }

        Ok(Some(Self {
            kind,
            default,
            description,
            position,
            hidden,
            required,
            converter,
            pair_deconstructor,
        }))
    }

    fn declaration(&self, key: &str, ty: &syn::Type) -> TokenStream2 {
        let mut calls = Vec::new();
        if let Some(position) = &self.position {
            calls.push(quote!(.position(#position)));
        }
        if let Some(default) = &self.default {
            calls.push(quote!(.default_value(#default)));
        }
        if let Some(description) = &self.description {
            calls.push(quote!(.description(#description)));
        }
        if self.hidden {
            calls.push(quote!(.hidden()));
        }
        if self.required {
            calls.push(quote!(.required()));
        }
        if let Some(converter) = &self.converter {
            calls.push(quote!(.converter(::kumi::cli::CustomConverter::new(#converter))));
        }
        if let Some(deconstructor) = &self.pair_deconstructor {
            calls.push(quote!(.pair_deconstructor(#deconstructor)));
        }

        match &self.kind {
            Kind::Argument(template) => quote_spanned! {template.span()=>
                schema.argument::<#ty>(#key, #template) #(#calls)*;
            },
            Kind::Option(template) => quote_spanned! {template.span()=>
                schema.option::<#ty>(#key, #template) #(#calls)*;
            },
        }
    }
}

/// Extract the validation function from `#[kumi(validate = path)]`.
fn extract_validate(attrs: &[syn::Attribute]) -> syn::Result<Option<Path>> {
    let mut validate = None;
    for attr in attrs {
        if attr.path().is_ident("kumi") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("validate") {
                    validate = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unknown kumi attribute; expected `validate`"))
                }
            })?;
        }
    }
    Ok(validate)
}
