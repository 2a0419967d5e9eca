use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Ident, ItemFn, LitInt, LitStr};

/// Declares one entry of the instruction table next to the function that
/// implements it.
///
/// ```ignore
/// #[opcode(pattern = 0x8004, mask = 0xF00F, operands = Xy, mnemonic = "ADD V{x}, V{y}")]
/// fn add_vx_vy(cpu: &mut Execution<'_>, op: Operands) -> Result<(), ExecutionFault> { .. }
/// ```
///
/// expands to the function itself plus a constant `ADD_VX_VY` of type
/// `crate::instruction::Instruction`, so it is only usable inside `pixie8-core`.
#[proc_macro_attribute]
pub fn opcode(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut pattern: Option<LitInt> = None;
    let mut mask: Option<LitInt> = None;
    let mut operands: Option<Ident> = None;
    let mut mnemonic: Option<LitStr> = None;

    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("pattern") {
            pattern = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("mask") {
            mask = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("operands") {
            operands = Some(meta.value()?.parse()?);
        } else if meta.path.is_ident("mnemonic") {
            mnemonic = Some(meta.value()?.parse()?);
        } else {
            return Err(meta.error("unsupported opcode property"));
        }
        Ok(())
    });
    parse_macro_input!(args with parser);

    let function_item = parse_macro_input!(input as ItemFn);

    let args = OpcodeArgs {
        pattern,
        mask,
        operands,
        mnemonic,
    };

    match expand(args, function_item) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

struct OpcodeArgs {
    pattern: Option<LitInt>,
    mask: Option<LitInt>,
    operands: Option<Ident>,
    mnemonic: Option<LitStr>,
}

/// Bits of the opcode occupied by operands, and the placeholders a mnemonic
/// template may use, for every operand layout.
fn layout_shape(layout: &Ident) -> syn::Result<(u16, &'static [&'static str])> {
    let shape: (u16, &'static [&'static str]) = match layout.to_string().as_str() {
        "None" => (0x0000, &[]),
        "Nnn" => (0x0FFF, &["nnn"]),
        "X" => (0x0F00, &["x"]),
        "Xkk" => (0x0FFF, &["x", "kk"]),
        "Xy" => (0x0FF0, &["x", "y"]),
        "Xyn" => (0x0FFF, &["x", "y", "n"]),
        _ => {
            return Err(syn::Error::new(
                layout.span(),
                "operands must be one of None, Nnn, X, Xkk, Xy, Xyn",
            ))
        }
    };
    Ok(shape)
}

fn placeholders(template: &LitStr) -> syn::Result<Vec<String>> {
    let text = template.value();
    let mut names = vec![];
    let mut rest = text.as_str();

    while let Some(open) = rest.find(['{', '}']) {
        if rest[open..].starts_with('}') {
            return Err(syn::Error::new(template.span(), "unmatched `}` in mnemonic"));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| syn::Error::new(template.span(), "unclosed `{` in mnemonic"))?;
        names.push(after[..close].to_owned());
        rest = &after[close + 1..];
    }

    Ok(names)
}

fn expand(args: OpcodeArgs, function_item: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let function_name = function_item.sig.ident.clone();
    let span = function_name.span();

    let pattern = args
        .pattern
        .ok_or_else(|| syn::Error::new(span, "opcode is missing `pattern`"))?;
    let mask = args
        .mask
        .ok_or_else(|| syn::Error::new(span, "opcode is missing `mask`"))?;
    let operands = args
        .operands
        .ok_or_else(|| syn::Error::new(span, "opcode is missing `operands`"))?;
    let mnemonic = args
        .mnemonic
        .ok_or_else(|| syn::Error::new(span, "opcode is missing `mnemonic`"))?;

    let pattern_bits: u16 = pattern.base10_parse()?;
    let mask_bits: u16 = mask.base10_parse()?;
    let (operand_bits, allowed) = layout_shape(&operands)?;

    if pattern_bits & !mask_bits != 0 {
        return Err(syn::Error::new(
            pattern.span(),
            "pattern sets bits outside of its mask",
        ));
    }
    if mask_bits & operand_bits != 0 {
        return Err(syn::Error::new(
            operands.span(),
            "operand bits overlap the mask",
        ));
    }
    for name in placeholders(&mnemonic)? {
        if !allowed.contains(&name.as_str()) {
            return Err(syn::Error::new(
                mnemonic.span(),
                format!("`{{{}}}` is not an operand of layout {}", name, operands),
            ));
        }
    }

    let const_name = Ident::new(&function_name.to_string().to_uppercase(), Span::call_site());
    let name = function_name.to_string();
    let visibility = function_item.vis.clone();

    Ok(quote! {
        #function_item

        #visibility const #const_name: crate::instruction::Instruction =
            crate::instruction::Instruction {
                name: #name,
                pattern: #pattern,
                mask: #mask,
                layout: crate::instruction::OperandLayout::#operands,
                mnemonic: #mnemonic,
                execute: #function_name,
            };
    })
}
