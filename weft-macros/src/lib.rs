mod utils;

use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Expands `weave![a, b, ..]` into `::weft::weave([a.into(), b.into(), ..])`.
#[proc_macro]
pub fn weave(input: TokenStream) -> TokenStream {
    combinator("weave", input)
}

/// Expands `queue![a, b, ..]` into `::weft::queue([a.into(), b.into(), ..])`.
#[proc_macro]
pub fn queue(input: TokenStream) -> TokenStream {
    combinator("queue", input)
}

fn combinator(name: &str, input: TokenStream) -> TokenStream {
    let args = utils::split_args(input);

    let items = args
        .iter()
        .map(|expr_tokens| {
            let expr = utils::tokens_to_string(expr_tokens);
            format!("::core::convert::Into::<::weft::TaskHandle>::into({expr})")
        })
        .collect::<Vec<_>>()
        .join(", ");

    let output = format!(
        "{{ let __tasks: ::std::vec::Vec<::weft::TaskHandle> = ::std::vec![{items}]; \
         ::weft::{name}(__tasks) }}"
    );

    match output.parse::<TokenStream>() {
        Ok(ts) => ts,
        Err(err) => utils::compile_error(&format!("{name} macro error: {err}")),
    }
}

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();
    let worker_threads = utils::worker_threads(&attr);

    let Some(pos) = utils::body_position(&tokens) else {
        return utils::compile_error("#[weft::main] expects a function");
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let new_block = format!(
        "{{
            let runtime = {}.expect(\"failed to build weft runtime\");
            runtime
                .block_on(move || {{
                    {}
                }})
                .expect(\"weft event loop failed\")
        }}",
        utils::runtime_expr(worker_threads),
        block
    );

    let Ok(stream) = new_block.parse() else {
        return utils::compile_error("#[weft::main] could not rewrite the function body");
    };

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, stream));

    tokens.into_iter().collect()
}

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut tokens = item.into_iter().collect::<Vec<_>>();
    let worker_threads = utils::worker_threads(&attr);

    let Some(pos) = utils::body_position(&tokens) else {
        return utils::compile_error("#[weft::test] expects a function");
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let new_block = format!(
        "{{
        let runtime = {}.expect(\"failed to build weft runtime\");
        runtime
            .block_on(move || {{ {} }})
            .expect(\"weft event loop failed\");
    }}",
        utils::runtime_expr(worker_threads),
        block
    );

    let Ok(stream) = new_block.parse() else {
        return utils::compile_error("#[weft::test] could not rewrite the function body");
    };

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, stream));

    let test_attr: TokenStream = "#[::core::prelude::v1::test]".parse().unwrap();
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}
