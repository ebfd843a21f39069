//! Environment-variable expansion for scalar values.
//!
//! References take the form `%NAME%`. Unknown names are left verbatim so that
//! literal percent signs survive.

use std::borrow::Cow;

/// Expands `%NAME%` references from the process environment.
pub fn expand_environment_variables(text: &str) -> Cow<'_, str> {
    expand_with(text, |name| std::env::var(name).ok())
}

/// Expands `%NAME%` references using `lookup`.
pub fn expand_with<F>(text: &str, lookup: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    if !text.contains('%') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('%') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let name = &after[..end];
        if let Some(value) = (!name.is_empty()).then(|| lookup(name)).flatten() {
            out.push_str(&value);
            rest = &after[end + 1..];
        } else {
            // The closing '%' may open the next reference.
            out.push('%');
            out.push_str(name);
            rest = &after[end..];
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
