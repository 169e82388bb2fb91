#[macro_export]
macro_rules! assert_journal_eq {
    ($want:expr, $got:expr, $($context_arg:expr),*) => {
        let want_str: &str = &$want;
        let got_str = $crate::directive::format_journal(&$got);
        if want_str != got_str {
            eprintln!($($context_arg,)*);
            text_diff::assert_diff(want_str, &got_str, "\n", 0);
        }
    };
    ($want:expr, $got:expr) => {
        let want_str: &str = &$want;
        let got_str = $crate::directive::format_journal(&$got);
        if want_str != got_str {
            text_diff::assert_diff(want_str, &got_str, "\n", 0);
        }
    };
}
