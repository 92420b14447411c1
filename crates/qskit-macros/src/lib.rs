//! qskit-macros - Derive macro for qskit type descriptors
//!
//! This crate provides `#[derive(Reflect)]`, which describes a type to the
//! qskit codec factories. Structs with named fields become records; any type
//! can instead hand its encoding to a hook with `#[qs(self_describing)]` or
//! `#[qs(text)]`.

use darling::ast::{Data, Style};
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input, parse_quote};

/// Options for one field of a derived record
#[derive(Debug, FromField)]
#[darling(attributes(qs))]
struct FieldOpts {
    ident: Option<syn::Ident>,
    ty: syn::Type,

    /// Raw annotation, e.g. `"category,omitempty"`
    #[darling(default)]
    tag: Option<String>,

    /// Merge the field's keys into the parent record
    #[darling(default)]
    flatten: bool,
}

/// Options for the Reflect derive macro
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(qs), supports(struct_any, enum_any))]
struct ReflectOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, FieldOpts>,

    /// The type implements `qskit::SelfDescribing`
    #[darling(default)]
    self_describing: bool,

    /// The type implements `FromStr + Display`
    #[darling(default)]
    text: bool,

    /// The type has no `Default`; decoding cannot allocate it
    #[darling(default)]
    no_default: bool,
}

/// Derive macro for `qskit::Reflect`
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Reflect)]
/// struct ListUsers {
///     #[qs(tag = "q,omitempty")]
///     query: String,
///     #[qs(tag = ",req")]
///     page: u32,
///     #[qs(flatten)]
///     paging: Paging,
/// }
///
/// #[derive(Reflect)]
/// #[qs(text, no_default)]
/// struct Color(u8, u8, u8);
/// ```
#[proc_macro_derive(Reflect, attributes(qs))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ReflectOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    match expand(opts) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

fn expand(opts: ReflectOpts) -> syn::Result<TokenStream2> {
    let name = &opts.ident;
    let descriptor = descriptor_body(&opts)?;

    let mut generics = opts.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::qskit::Reflect));
    }
    let (_, ty_generics, _) = opts.generics.split_for_impl();

    let zero = if opts.no_default {
        quote!(::std::option::Option::None)
    } else {
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(#name #ty_generics: ::std::default::Default));
        quote!(::std::option::Option::Some(::std::default::Default::default()))
    };
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::qskit::Reflect for #name #ty_generics #where_clause {
            fn descriptor() -> ::qskit::TypeDescriptor {
                #descriptor
            }

            fn zero() -> ::std::option::Option<Self> {
                #zero
            }
        }
    })
}

fn descriptor_body(opts: &ReflectOpts) -> syn::Result<TokenStream2> {
    if opts.self_describing || opts.text {
        let mut descriptor = quote!(::qskit::TypeDescriptor::opaque::<Self>());
        if opts.self_describing {
            descriptor = quote!(#descriptor.with_self_describing::<Self>());
        }
        if opts.text {
            descriptor = quote!(#descriptor.with_text::<Self>());
        }
        return Ok(descriptor);
    }

    let fields = match &opts.data {
        Data::Struct(fields) if fields.style == Style::Struct => fields,
        _ => {
            return Err(syn::Error::new(
                opts.ident.span(),
                "Reflect can only be derived for structs with named fields \
                 unless #[qs(self_describing)] or #[qs(text)] is set",
            ));
        }
    };

    let infos = fields
        .iter()
        .map(field_info)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        ::qskit::TypeDescriptor::record::<Self>(::std::vec![#(#infos),*])
    })
}

fn field_info(field: &FieldOpts) -> syn::Result<TokenStream2> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(&field.ty, "expected a named field"))?;
    let ty = &field.ty;
    let name = field_name(ident);
    let flatten = field.flatten;
    let tag = match &field.tag {
        Some(tag) => quote!(::std::option::Option::Some(#tag)),
        None => quote!(::std::option::Option::None),
    };

    Ok(quote! {
        ::qskit::FieldInfo::new(
            #name,
            #tag,
            #flatten,
            <#ty as ::qskit::Reflect>::descriptor,
            |value| {
                value
                    .downcast_ref::<Self>()
                    .map(|record| &record.#ident as &dyn ::qskit::Value)
            },
            |value| {
                value
                    .downcast_mut::<Self>()
                    .map(|record| &mut record.#ident as &mut dyn ::qskit::Value)
            },
        )
    })
}

/// Declared name of a field, without the raw identifier prefix
fn field_name(ident: &syn::Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}
