/// Uppercases the first letter of every word and lowercases the rest.
///
/// A word is a run of alphabetic characters, so `node.js` becomes `Node.Js`
/// and `3d artist` becomes `3D Artist`.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.trim().chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
