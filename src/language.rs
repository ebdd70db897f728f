#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Tag used when no rule recognizes the snippet.
pub const GENERIC_LANGUAGE: &str = "code";

/// Best-effort guess of the language a snippet is written in.
///
/// Rules are substring checks on the lower-cased code and are tried in a fixed
/// order; the first one that matches wins, so a Python snippet that happens to
/// mention `function` is still reported as Python.
pub fn detect_language(code: &str) -> &'static str {
    let code = code.to_lowercase();
    let has = |needle: &str| code.contains(needle);

    if has("def ") && has(":") {
        "python"
    } else if has("function") && (has("{") || has("=>")) {
        "javascript"
    } else if has("<html") || has("</div>") {
        "html"
    } else if has("public class") || has("private void") {
        "java"
    } else if has("#include") && (has("int main") || has("void main")) {
        "c++"
    } else if has("package main") || (has("func ") && has("{")) {
        "go"
    } else {
        GENERIC_LANGUAGE
    }
}
