//! One-shot feedback printer.

const FEEDBACK_URL: &str = "https://stripe.com/docs/dev-tools-csat";

/// Prints pointers for leaving feedback on the CLI.
pub fn run() {
    println!(
        r#"
     _        _
 ___| |_ _ __(_)_ __   ___
/ __| __| '__| | '_ \ / _ \
\__ \ |_| |  | | |_) |  __/
|___/\__|_|  |_| .__/ \___|
               |_|

We'd love to know what you think of the CLI:

* Report bugs or issues on GitHub: https://github.com/stripe/stripe-cli/issues
* Leave us feedback on how you're using it or features you'd like to see: {}
"#,
        FEEDBACK_URL
    );
}
