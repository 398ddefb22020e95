//! Name derivation helpers shared by the introspector and the factories.

/// Upper-case the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a camel-case identifier into a human readable name.
///
/// `placeOrder` becomes `Place Order`, `firstName2` becomes `First Name2`.
pub fn natural_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;

    for c in name.chars() {
        if c == '_' {
            if !result.ends_with(' ') && !result.is_empty() {
                result.push(' ');
            }
            previous = Some(' ');
            continue;
        }
        if let Some(p) = previous {
            if c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()) {
                result.push(' ');
            }
        }
        if result.is_empty() || result.ends_with(' ') {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        previous = Some(c);
    }

    result
}

/// The part of a fully-qualified class name after the last `.`.
pub fn simple_name(class_name: &str) -> &str {
    class_name.rsplit('.').next().unwrap_or(class_name)
}
