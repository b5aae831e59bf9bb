use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{parse_macro_input, FnArg, GenericArgument, ItemFn, Pat, PathArguments, ReturnType, Type};

/// Turns a free function into a `toolwire_core::Callable`.
///
/// For `fn get_weather(..)` this emits `GetWeatherFunction`, a unit struct
/// whose name is the function name and whose description is taken from the
/// doc comments. Both can be overridden with `name = "..."` and
/// `description = "..."`. Parameter types are mapped to type hints; types the
/// macro does not know become unresolved hints, so the advertised schema
/// falls back to accepting any arguments.
#[proc_macro_attribute]
pub fn function(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);
    let attr_metas = syn::parse_macro_input!(attr with syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated);

    match expand(input_fn, attr_metas) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(
    input_fn: ItemFn,
    attr_metas: syn::punctuated::Punctuated<syn::Meta, syn::Token![,]>,
) -> syn::Result<TokenStream2> {
    let sig = &input_fn.sig;
    if sig.asyncness.is_some() {
        return Err(syn::Error::new(
            sig.span(),
            "#[function] does not support async functions",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new(
            sig.generics.span(),
            "#[function] does not support generic functions",
        ));
    }

    let fn_name = &sig.ident;
    let vis = &input_fn.vis;
    let struct_name = format_ident!("{}Function", camel_case(&fn_name.to_string()));

    let mut function_name = fn_name.to_string();
    let mut description = String::new();

    for meta in attr_metas {
        let syn::Meta::NameValue(nv) = &meta else {
            return Err(syn::Error::new(
                meta.span(),
                "expected `name = \"...\"` or `description = \"...\"`",
            ));
        };
        let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) = &nv.value
        else {
            return Err(syn::Error::new(nv.value.span(), "expected a string literal"));
        };

        if nv.path.is_ident("name") {
            function_name = lit.value();
        } else if nv.path.is_ident("description") {
            description = lit.value();
        } else {
            return Err(syn::Error::new(nv.path.span(), "unknown #[function] option"));
        }
    }

    // Fall back to the doc comments.
    if description.is_empty() {
        let lines: Vec<String> = input_fn
            .attrs
            .iter()
            .filter(|attr| attr.path().is_ident("doc"))
            .filter_map(|attr| match &attr.meta {
                syn::Meta::NameValue(nv) => match &nv.value {
                    syn::Expr::Lit(syn::ExprLit {
                        lit: syn::Lit::Str(lit),
                        ..
                    }) => Some(lit.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        description = lines.join("\n").trim().to_string();
    }

    let description_tokens = if description.is_empty() {
        quote!(::core::option::Option::None)
    } else {
        quote!(::core::option::Option::Some(#description))
    };

    let mut hint_calls = Vec::new();
    let mut call_args = Vec::new();

    for input in &sig.inputs {
        let pat_type = match input {
            FnArg::Typed(pat_type) => pat_type,
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new(
                    receiver.span(),
                    "#[function] cannot be applied to methods",
                ))
            }
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return Err(syn::Error::new(
                pat_type.pat.span(),
                "#[function] parameters must be plain identifiers",
            ));
        };

        let arg_name_str = pat_ident.ident.to_string();
        let hint = type_hint(&pat_type.ty)?;

        hint_calls.push(quote! {
            .param(#arg_name_str, #hint)
        });

        call_args.push(quote! {
            ::toolwire_core::serde_json::from_value(
                args.remove(#arg_name_str).unwrap_or(::toolwire_core::serde_json::Value::Null),
            )
            .map_err(|e| ::toolwire_core::FunctionError::InvalidInput(
                format!("failed to parse argument '{}': {}", #arg_name_str, e),
            ))?
        });
    }

    let (returns_call, call_expr) = match &sig.output {
        ReturnType::Default => (
            quote!(.returns(::toolwire_core::TypeHint::Null)),
            quote!(#fn_name(#(#call_args),*)),
        ),
        ReturnType::Type(_, ty) => match result_ok_type(ty) {
            Some(ok_ty) => {
                let hint = type_hint(ok_ty)?;
                (
                    quote!(.returns(#hint)),
                    quote! {
                        #fn_name(#(#call_args),*).map_err(|e| {
                            ::toolwire_core::FunctionError::ExecutionFailed(e.to_string())
                        })?
                    },
                )
            }
            None => {
                let hint = type_hint(ty)?;
                (quote!(.returns(#hint)), quote!(#fn_name(#(#call_args),*)))
            }
        },
    };

    Ok(quote! {
        #input_fn

        #[derive(Debug, Clone, Copy, Default)]
        #vis struct #struct_name;

        impl ::toolwire_core::Callable for #struct_name {
            fn name(&self) -> &str {
                #function_name
            }

            fn description(&self) -> ::core::option::Option<&str> {
                #description_tokens
            }

            fn type_hints(&self) -> ::toolwire_core::TypeHints {
                ::toolwire_core::TypeHints::new()
                    #(#hint_calls)*
                    #returns_call
            }

            #[allow(unused_mut, unused_variables)]
            fn call(
                &self,
                mut args: ::toolwire_core::Arguments,
            ) -> ::core::result::Result<::toolwire_core::Value, ::toolwire_core::FunctionError> {
                let output = #call_expr;
                ::toolwire_core::serde_json::to_value(output)
                    .map_err(::toolwire_core::FunctionError::from)
            }
        }
    })
}

fn type_hint(ty: &Type) -> syn::Result<TokenStream2> {
    let hint = match ty {
        Type::Reference(reference) => {
            return Err(syn::Error::new(
                reference.span(),
                "#[function] parameters must be owned types",
            ))
        }
        Type::Paren(inner) => return type_hint(&inner.elem),
        Type::Tuple(tuple) if tuple.elems.is_empty() => quote!(::toolwire_core::TypeHint::Null),
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return Ok(unresolved(ty));
            };
            let generics = generic_types(&segment.arguments);

            match (segment.ident.to_string().as_str(), generics.as_slice()) {
                ("String" | "char", []) => quote!(::toolwire_core::TypeHint::String),
                (
                    "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32"
                    | "u64" | "u128" | "usize",
                    [],
                ) => quote!(::toolwire_core::TypeHint::Integer),
                ("f32" | "f64", []) => quote!(::toolwire_core::TypeHint::Number),
                ("bool", []) => quote!(::toolwire_core::TypeHint::Boolean),
                ("Value", []) => quote!(::toolwire_core::TypeHint::Any),
                ("Map", _) => quote!(::toolwire_core::TypeHint::Object),
                ("Box", [inner]) => return type_hint(inner),
                ("Option", [inner]) => {
                    let inner = type_hint(inner)?;
                    quote!(::toolwire_core::TypeHint::optional(#inner))
                }
                ("Vec" | "VecDeque" | "HashSet" | "BTreeSet", [item]) => {
                    let item = type_hint(item)?;
                    quote!(::toolwire_core::TypeHint::array(#item))
                }
                ("HashMap" | "BTreeMap", [_, value]) => {
                    let value = type_hint(value)?;
                    quote!(::toolwire_core::TypeHint::map(#value))
                }
                _ => unresolved(ty),
            }
        }
        _ => unresolved(ty),
    };
    Ok(hint)
}

fn unresolved(ty: &Type) -> TokenStream2 {
    let type_name = quote!(#ty).to_string().replace(' ', "");
    quote!(::toolwire_core::TypeHint::unresolved(#type_name))
}

fn generic_types(arguments: &PathArguments) -> Vec<&Type> {
    match arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// `T` for a `Result<T, E>` return type.
fn result_ok_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Result" {
        return None;
    }
    generic_types(&segment.arguments).into_iter().next()
}

fn camel_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}
