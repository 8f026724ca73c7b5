/// Asserts that each of the expected strings is found in `content`, each one after the end of the previous one.
///
/// e.g. `assert_contains_inorder!(trace_content, ["Compiling protocol.", "Timeline complete."]);`
#[macro_export]
macro_rules! assert_contains_inorder {
    ($content:expr, [$($expected:expr),* $(,)?]) => {{
        let content: &str = $content.as_ref();
        let mut remaining = content;
        $(
            let expected: &str = $expected.as_ref();
            match remaining.find(expected) {
                Some(index) => remaining = &remaining[index + expected.len()..],
                None => panic!(
                    "expected content not found, or out of order. expected: {:?}, remaining: {:?}",
                    expected, remaining
                ),
            }
        )*
        let _ = remaining;
    }};
}
