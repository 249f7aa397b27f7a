use proc_macro::TokenStream as TokenStream1;
use proc_macro2::Span;
use quote::ToTokens;
use syn::{parse::Parser, punctuated::Punctuated, Ident, Token};

/// This macro is added before a method of `Simulator` struct in the impl block.
/// Use this macro to first check if current round phase is one of the phases in
/// the attribute.
///
/// For example, `#[allowed_phase(Dealt, PlayersActing)]` will make a method first
/// check if current round phase is `Dealt` or `PlayersActing`. If not, the method
/// will return `GameError::WrongPhase` without touching any state.
///
/// The method must return `Result<_, GameError>` and the struct must have a
/// `phase: RoundPhase` field.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let phases = match Punctuated::<Ident, Token![,]>::parse_terminated.parse(attr) {
        Ok(phases) => phases,
        Err(err) => return err.to_compile_error().into(),
    };
    if phases.is_empty() {
        return syn::Error::new(Span::call_site(), "allowed_phase needs at least one phase")
            .to_compile_error()
            .into();
    }
    let mut ast: syn::ImplItemFn = match syn::parse(item) {
        Ok(ast) => ast,
        Err(err) => return err.to_compile_error().into(),
    };

    let operation = ast.sig.ident.to_string();
    let allowed = phases
        .iter()
        .map(|phase| phase.to_string())
        .collect::<Vec<_>>()
        .join(" | ");
    let phases = phases.iter();
    let early_return: syn::Stmt = syn::parse_quote! {
        if !matches!(self.phase, #(crate::simulation::RoundPhase::#phases)|*) {
            return Err(crate::GameError::WrongPhase {
                operation: #operation,
                allowed: #allowed,
                actual: self.phase,
            });
        }
    };
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}
