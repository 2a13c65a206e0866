/// Make a free-text field safe for the hosted form.
///
/// Double quotes become single quotes, then a leading quote of either kind
/// gets a space in front of it. The order matters: the first rule can create
/// the leading quote that the second rule fixes. Not idempotent.
pub fn sanitize(text: &str) -> String {
    let replaced = text.replace('"', "'");
    if replaced.starts_with('\'') || replaced.starts_with('"') {
        format!(" {}", replaced)
    } else {
        replaced
    }
}
