//! `#[derive(WalkAst)]` — generates `impl gong_parser::walk::Walk` for AST
//! nodes by walking every field (struct) or every variant payload (enum).
//!
//! The expansion refers to `crate::walk` and `crate::ast`, so the derive is
//! only usable from within the `gong_parser` crate itself.

use proc_macro::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Fields, Index};

#[proc_macro_derive(WalkAst)]
pub fn derive_walk_ast(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let span = input.span();

    let body = match &input.data {
        Data::Struct(s) => walk_fields(&s.fields),
        Data::Enum(e) => {
            let arms = e.variants.iter().map(|v| variant_arm(&v.ident, &v.fields));
            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Union(u) => {
            return syn::Error::new_spanned(u.union_token, "WalkAst cannot be derived for unions")
                .into_compile_error()
                .into();
        }
    };

    quote_spanned! {span =>
        impl<'ast> crate::walk::Walk<'ast> for #name {
            #[inline(always)]
            fn walk<V: crate::walk::Visitor<'ast> + ?Sized>(
                &self,
                a: &'ast crate::ast::AstArena,
                v: &mut V
            ) {
                #body
            }
        }
    }
    .into()
}

fn walk_fields(fields: &Fields) -> proc_macro2::TokenStream {
    let calls = fields.iter().enumerate().map(|(i, field)| {
        let access = match &field.ident {
            Some(ident) => quote! { &self.#ident },
            None => {
                let idx = Index::from(i);
                quote! { &self.#idx }
            }
        };
        quote! { crate::walk::Walk::walk(#access, a, v); }
    });
    quote! { #(#calls)* }
}

fn variant_arm(variant: &syn::Ident, fields: &Fields) -> proc_macro2::TokenStream {
    match fields {
        Fields::Unit => quote! { Self::#variant => {} },
        Fields::Named(named) => {
            let bindings: Vec<_> = named
                .named
                .iter()
                .map(|f| f.ident.clone().expect("named field"))
                .collect();
            let calls = bindings
                .iter()
                .map(|b| quote! { crate::walk::Walk::walk(#b, a, v); });
            quote! {
                Self::#variant { #(#bindings),* } => { #(#calls)* }
            }
        }
        Fields::Unnamed(unnamed) => {
            let bindings: Vec<_> = (0..unnamed.unnamed.len())
                .map(|i| format_ident!("f{i}"))
                .collect();
            let calls = bindings
                .iter()
                .map(|b| quote! { crate::walk::Walk::walk(#b, a, v); });
            quote! {
                Self::#variant(#(#bindings),*) => { #(#calls)* }
            }
        }
    }
}
