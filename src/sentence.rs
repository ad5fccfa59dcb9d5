/// Lower-case `input`, then capitalize the first letter of every sentence.
///
/// A sentence starts at the beginning of the text and after each `.` or `!`.
/// Chat producers run this before handing a line to the filter.
pub fn to_sentence_case(input: &str) -> String {
    let mut capitalize = true;
    input
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if capitalize && c.is_ascii_lowercase() {
                capitalize = false;
                return c.to_ascii_uppercase();
            }
            if c == '.' || c == '!' {
                capitalize = true;
            }
            c
        })
        .collect()
}
