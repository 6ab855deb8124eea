use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse::Parse, parse_macro_input, spanned::Spanned, FnArg, GenericArgument, ImplItem,
    ImplItemFn, ItemImpl, LitStr, PathArguments, ReturnType, Token, Type,
};

/// Proc macro attribute that turns an `impl` block with an async `call` method into a widget.
///
/// Apply this to an `impl` block that contains an async `call` method.
/// The macro will:
/// - Use the widget name, description and invocation hints from the attributes
/// - Infer the parameter type from the `call` method argument
/// - Generate `definition()` with the JSON Schema of that parameter type
/// - Generate `mount()` which validates raw arguments and forwards to `call`
///
/// # Example
/// ```ignore
/// #[widget(
///     name = "counter",
///     description = "Interactive counter",
///     invoking = "Loading counter",
///     invoked = "Counter loaded"
/// )]
/// impl CounterWidget {
///     async fn call(&self, args: CounterArgs) -> Result<Instance, WidgetError> {
///         Ok(Instance::Counter(Counter::new(args.initial_count)))
///     }
/// }
/// ```
struct WidgetArgs {
    name: LitStr,
    description: LitStr,
    invoking: Option<LitStr>,
    invoked: Option<LitStr>,
}

impl Parse for WidgetArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut description = None;
        let mut invoking = None;
        let mut invoked = None;

        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            let value: LitStr = input.parse()?;

            match key.to_string().as_str() {
                "name" => name = Some(value),
                "description" => description = Some(value),
                "invoking" => invoking = Some(value),
                "invoked" => invoked = Some(value),
                _ => {
                    return Err(syn::Error::new(
                        key.span(),
                        "expected 'name', 'description', 'invoking' or 'invoked'",
                    ))
                }
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        if invoking.is_some() != invoked.is_some() {
            return Err(input.error("'invoking' and 'invoked' must be given together"));
        }

        Ok(WidgetArgs {
            name: name.ok_or_else(|| input.error("missing 'name' attribute"))?,
            description: description
                .ok_or_else(|| input.error("missing 'description' attribute"))?,
            invoking,
            invoked,
        })
    }
}

#[proc_macro_attribute]
pub fn widget(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as WidgetArgs);
    let impl_block = parse_macro_input!(item as ItemImpl);

    match expand(args, impl_block) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: WidgetArgs, impl_block: ItemImpl) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = match &*impl_block.self_ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.clone())
            .ok_or_else(|| syn::Error::new(type_path.span(), "empty type path"))?,
        other => {
            return Err(syn::Error::new(
                other.span(),
                "widget can only be applied to impl blocks for named types",
            ))
        }
    };

    let call_method = find_call(&impl_block)?;

    if call_method.sig.asyncness.is_none() {
        return Err(syn::Error::new(
            call_method.sig.span(),
            "call method must be async",
        ));
    }

    // First input is &self, the second one carries the parameters.
    let input_type = call_method
        .sig
        .inputs
        .iter()
        .nth(1)
        .and_then(|arg| match arg {
            FnArg::Typed(pat_type) => Some(&*pat_type.ty),
            FnArg::Receiver(_) => None,
        })
        .ok_or_else(|| {
            syn::Error::new(
                call_method.sig.span(),
                "call method must take a parameter struct",
            )
        })?;

    match &call_method.sig.output {
        ReturnType::Type(_, ty) if extract_result_ok_type(ty).is_some() => {}
        output => {
            return Err(syn::Error::new(
                output.span(),
                "call method must return Result<Instance, WidgetError>",
            ))
        }
    }

    let name = args.name.value();
    let description = args.description.value();
    let invocation = match (args.invoking, args.invoked) {
        (Some(invoking), Some(invoked)) => quote! { .with_invocation(#invoking, #invoked) },
        _ => quote! {},
    };

    Ok(quote! {
        #impl_block

        #[async_trait::async_trait]
        impl widgetry::Widget for #struct_name {
            fn widget_name(&self) -> &'static str {
                #name
            }

            fn definition(&self) -> widgetry::WidgetDefinition {
                widgetry::WidgetDefinition {
                    metadata: widgetry::WidgetMetadata::new(#name, #description) #invocation,
                    parameters: schemars::schema_for!(#input_type),
                }
            }

            async fn mount(
                &self,
                args: serde_json::Value,
            ) -> Result<widgetry::Instance, widgetry::WidgetError> {
                let input: #input_type = serde_json::from_value(args)
                    .map_err(|e| widgetry::WidgetError::InvalidArguments(e.to_string()))?;

                self.call(input).await
            }
        }
    })
}

fn find_call(impl_block: &ItemImpl) -> syn::Result<&ImplItemFn> {
    impl_block
        .items
        .iter()
        .find_map(|item| match item {
            ImplItem::Fn(method) if method.sig.ident == "call" => Some(method),
            _ => None,
        })
        .ok_or_else(|| {
            syn::Error::new(
                impl_block.self_ty.span(),
                "widget impl must contain an async fn call method",
            )
        })
}

/// Extract the Ok type from Result<T, E>
fn extract_result_ok_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Result" {
            if let PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(GenericArgument::Type(ok_type)) = args.args.first() {
                    return Some(ok_type);
                }
            }
        }
    }
    None
}
