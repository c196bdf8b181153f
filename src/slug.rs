use deunicode::deunicode_char;

/// Turns a game title into the CamelCase slug operators use to refer to a
/// submission in logs and announcements. Non-ASCII characters are
/// transliterated, everything that isn't alphanumeric is treated as a word
/// break and dropped.
pub fn slugify_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());

    let mut is_start_of_word = true;
    let mut add_char = |c: char| {
        match c {
            '0'..='9' | 'A'..='Z' => slug.push(c),
            'a'..='z' if is_start_of_word => slug.push(c.to_ascii_uppercase()),
            'a'..='z' => slug.push(c),

            _ => (),
        }

        is_start_of_word = !c.is_ascii_alphanumeric();
    };

    for char in title.chars() {
        if char.is_ascii() {
            add_char(char);
        } else if let Some(transliterated) = deunicode_char(char) {
            transliterated.chars().for_each(&mut add_char);
        }
    }

    slug.shrink_to_fit();
    slug
}
