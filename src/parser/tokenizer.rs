/// Splits text into lower-case terms
///
/// Any run of non-alphanumeric characters is a separator and empty tokens
/// are dropped. The index of a term in the returned vector is the position
/// stored for it in the index.
///
/// ```
/// use ripple_search::parser::tokenize;
///
/// assert_eq!(tokenize("Hello, World! 2024"), vec!["hello", "world", "2024"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
