use proc_macro::{Delimiter, TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`.
/// Commas at the top level are used as separators.
///
/// Commas inside delimited groups (`(..)`, `[..]`, `{..}`) are already hidden
/// inside a single `TokenTree::Group`. Commas between angle brackets and
/// between the parameters of a closure (`|a, b|`) are not, so an argument
/// holding either must be wrapped in parentheses.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Converts a slice of tokens into a Rust source string.
///
/// This function preserves token order and inserts spaces
/// between consecutive identifiers and literals to avoid accidental
/// token merging (e.g. `move x` vs `movex`, `1 as u8` vs `1as u8`).
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    let mut out = String::new();
    let mut prev_was_word = false;

    for t in tokens {
        let is_word = matches!(t, TokenTree::Ident(_) | TokenTree::Literal(_));

        if prev_was_word && is_word {
            out.push(' ');
        }

        out.push_str(&t.to_string());
        prev_was_word = is_word;
    }

    out
}

/// Reads `worker_threads = N` out of an attribute's arguments.
///
/// Unknown keys and unparsable values are ignored.
pub(crate) fn worker_threads(attr: &TokenStream) -> Option<usize> {
    let attr_str = attr.to_string();

    attr_str.split(',').find_map(|part| {
        part.trim()
            .strip_prefix("worker_threads")
            .map(|v| v.trim_start().trim_start_matches('=').trim())
            .and_then(|v| v.parse::<usize>().ok())
    })
}

/// Returns the index of the function body (the last brace group).
pub(crate) fn body_position(tokens: &[TokenTree]) -> Option<usize> {
    tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
}

/// Builds the expression constructing the runtime.
pub(crate) fn runtime_expr(worker_threads: Option<usize>) -> String {
    let mut builder = String::from("::weft::RuntimeBuilder::new()");

    if let Some(n) = worker_threads {
        builder.push_str(&format!(".worker_threads({})", n));
    }

    builder.push_str(".build()");
    builder
}

/// Emits a `compile_error!` carrying `msg`.
pub(crate) fn compile_error(msg: &str) -> TokenStream {
    format!("::core::compile_error!({:?});", msg)
        .parse()
        .unwrap_or_default()
}
