use alloc::string::String;

/// Converts a member name into a label.
///
/// Leading underscores are stripped, the first letter and every letter
/// following an underscore are capitalized, and a space is inserted
/// before each capital letter. A name made only of underscores is kept.
///
/// # Examples
///
/// ```
/// use vc_meta::descriptor::display_name;
///
/// assert_eq!(display_name("_someValue"), "Some Value");
/// assert_eq!(display_name("max_hp"), "Max Hp");
/// assert_eq!(display_name("___"), "___");
/// ```
pub fn display_name(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    if trimmed.is_empty() {
        return String::from(name);
    }

    let mut result = String::with_capacity(trimmed.len() + 4);
    let mut force_capital = true;

    for (index, c) in trimmed.chars().enumerate() {
        if c == '_' {
            force_capital = true;
            continue;
        }

        let upper = if force_capital {
            force_capital = false;
            true
        } else {
            c.is_uppercase()
        };

        if upper {
            if index != 0 && c.is_alphabetic() {
                result.push(' ');
            }
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::display_name;

    #[test]
    fn maps_names() {
        assert_eq!(display_name(""), "");
        assert_eq!(display_name("health"), "Health");
        assert_eq!(display_name("fieldValue"), "Field Value");
        assert_eq!(display_name("__private_name"), "Private Name");
        assert_eq!(display_name("HP"), "H P");
    }
}
