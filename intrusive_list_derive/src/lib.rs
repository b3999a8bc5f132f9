use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{
    Data, DataStruct, DeriveInput, Fields, GenericArgument, Ident, LitStr, PathArguments, Token,
    Type, TypePath,
    parse::{Parse, ParseStream},
    parse_macro_input, parse_quote,
};

struct LinkedAttribute {
    crate_path: syn::Path,
}

/// Parses the attribute in the format: `crate_path = "path::to::crate"`.
impl Parse for LinkedAttribute {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let key: Ident = input.parse()?;
        if key != "crate_path" {
            return Err(syn::Error::new(key.span(), "expected attribute `crate_path`"));
        }

        let _: Token![=] = input.parse()?;
        let value: LitStr = input.parse()?;
        let path: syn::Path = value.parse()?;

        Ok(LinkedAttribute { crate_path: path })
    }
}

/// Returns the tag argument of a `Link<Tag>` field type.
///
/// `Ok(None)` means the field is not a link at all, `Ok(Some(None))` is a bare
/// `Link` using the default channel.
fn link_tag(ty: &Type) -> syn::Result<Option<Option<Type>>> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return Ok(None);
    };
    let Some(segment) = path.segments.last() else {
        return Ok(None);
    };
    if segment.ident != "Link" {
        return Ok(None);
    }

    match &segment.arguments {
        PathArguments::None => Ok(Some(None)),
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => {
            match args.args.first() {
                Some(GenericArgument::Type(tag)) => Ok(Some(Some(tag.clone()))),
                _ => Err(syn::Error::new_spanned(
                    args,
                    "`Link` expects a single tag type argument",
                )),
            }
        }
        other => Err(syn::Error::new_spanned(
            other,
            "`Link` expects a single tag type argument",
        )),
    }
}

/// Derive macro implementing `Linked<Tag>` for every `Link<Tag>` field of a struct.
///
/// The derive also pins the struct for good: it emits an `Unpin` impl that
/// never applies, so a hand-written `impl Unpin` for the same struct is a
/// conflicting-impl error instead of a way to move a linked element.
#[proc_macro_derive(Linked, attributes(linked))]
pub fn linked_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Returns the key two tags are compared by when looking for duplicates.
///
/// A bare `Link` and any path ending in `DefaultTag` share one key, and a
/// leading `::` or `self::` is ignored. Other spellings of the same type are
/// left to rustc, which reports them as conflicting impls.
fn tag_key(tag: Option<&Type>) -> String {
    let Some(tag) = tag else {
        return "DefaultTag".into();
    };
    let Type::Path(TypePath { qself: None, path }) = tag else {
        return tag.to_token_stream().to_string();
    };

    let segments: Vec<_> = path
        .segments
        .iter()
        .skip_while(|segment| segment.ident == "self")
        .collect();
    match segments.last() {
        Some(last) if last.ident == "DefaultTag" && last.arguments.is_none() => {
            "DefaultTag".into()
        }
        _ => segments
            .iter()
            .map(|segment| segment.to_token_stream().to_string())
            .collect::<Vec<_>>()
            .join("::"),
    }
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // `#[linked(crate_path = "...")]` overrides where the runtime crate lives.
    let mut crate_path = quote! { ::intrusive_list };
    if let Some(attr) = input.attrs.iter().find(|attr| attr.path().is_ident("linked")) {
        let path = attr.parse_args::<LinkedAttribute>()?.crate_path;
        crate_path = quote! { #path };
    }

    let Data::Struct(DataStruct {
        fields: Fields::Named(fields),
        ..
    }) = &input.data
    else {
        return Err(syn::Error::new_spanned(
            &input,
            "Linked derive macro only supports structs with named fields",
        ));
    };

    let mut links: Vec<(Ident, proc_macro2::TokenStream, String)> = Vec::new();
    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let Some(tag) = link_tag(&field.ty)? else {
            continue;
        };

        let key = tag_key(tag.as_ref());
        if links.iter().any(|(_, _, seen)| *seen == key) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("Another `Link` field already uses the tag `{}`", key),
            ));
        }
        let tag = match tag {
            Some(tag) => tag.into_token_stream(),
            None => quote! { #crate_path::DefaultTag },
        };
        links.push((ident.clone(), tag, key));
    }

    if links.is_empty() {
        return Err(syn::Error::new_spanned(
            struct_name,
            "Struct must have at least one `Link` field",
        ));
    }

    let impls = links.iter().map(|(field, tag, _)| {
        quote! {
            unsafe impl #impl_generics #crate_path::Linked<#tag> for #struct_name #ty_generics #where_clause {
                #[inline]
                fn link(&self) -> &#crate_path::Link<#tag> {
                    &self.#field
                }

                #[inline]
                unsafe fn from_link(
                    link: ::core::ptr::NonNull<#crate_path::Link<#tag>>,
                ) -> ::core::ptr::NonNull<Self> {
                    let offset = ::core::mem::offset_of!(#struct_name #ty_generics, #field);
                    unsafe {
                        ::core::ptr::NonNull::new_unchecked(
                            link.as_ptr().cast::<u8>().sub(offset).cast::<Self>(),
                        )
                    }
                }
            }
        }
    });

    // The bound names a lifetime, so rustc accepts it even though it never holds.
    let mut pinned = input.generics.clone();
    pinned.params.insert(0, parse_quote!('__pin));
    pinned.make_where_clause().predicates.push(parse_quote! {
        #crate_path::__private::Wrapper<'__pin, ::core::marker::PhantomPinned>: ::core::marker::Unpin
    });
    let (pinned_impl_generics, _, pinned_where_clause) = pinned.split_for_impl();

    Ok(quote! {
        #(#impls)*

        impl #pinned_impl_generics ::core::marker::Unpin for #struct_name #ty_generics #pinned_where_clause {}
    })
}
