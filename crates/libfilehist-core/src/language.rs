//! Language hint detection for the highlighter collaborator

use std::path::Path;

/// Hint returned when nothing matches; highlighters render it as plain text
pub const PLAIN_TEXT: &str = "text";

/// Detect a highlighter language hint from a file name or path
pub fn detect_language(path: &str) -> &'static str {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_ascii_lowercase();

    // Whole-name matches first, for files without a useful extension
    if file_name.ends_with("dockerfile") {
        return "dockerfile";
    }
    match file_name.as_str() {
        "nginx.conf" => return "nginx",
        ".babelrc" => return "json",
        ".editorconfig" => return "ini",
        _ => {}
    }

    let ext = match Path::new(&file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => ext,
        None => return PLAIN_TEXT,
    };

    match ext {
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "jsx",
        "ts" => "typescript",
        "tsx" => "tsx",

        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "ini" => "ini",

        "html" | "htm" => "html",
        "xml" | "svg" | "mathml" => "xml",
        "css" => "css",
        "less" => "less",
        "scss" => "scss",
        "sass" => "sass",

        "sh" | "bash" => "bash",
        "ps1" | "psm1" => "powershell",
        "bat" | "cmd" => "bat",

        "py" => "python",
        "rb" => "ruby",
        "rs" => "rust",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "scala" => "scala",
        "swift" => "swift",
        "dart" => "dart",

        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "m" | "mm" => "objective-c",

        "hs" => "haskell",
        "clj" | "cljs" | "cljc" => "clojure",
        "fs" | "fsx" => "fsharp",
        "scm" | "ss" => "scheme",
        "lisp" | "lsp" => "lisp",
        "ml" | "mli" => "ocaml",

        "php" => "php",
        "pl" | "pm" => "perl",
        "lua" => "lua",
        "r" => "r",
        "groovy" => "groovy",
        "coffee" => "coffeescript",
        "ex" | "exs" => "elixir",
        "erl" => "erlang",

        "sql" => "sql",
        "graphql" | "gql" => "graphql",

        "md" | "mdx" => "markdown",
        "tex" => "latex",

        "asm" | "s" => "asm",
        "wasm" => "wasm",

        "hbs" | "handlebars" => "handlebars",
        "pug" => "pug",
        "vue" => "vue",
        "svelte" => "svelte",

        "diff" | "patch" => "diff",
        "sol" => "solidity",
        "vb" => "vb",

        _ => PLAIN_TEXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("src/main.rs"), "rust");
        assert_eq!(detect_language("app.TSX"), "tsx");
        assert_eq!(detect_language("/a/b/config.yml"), "yaml");
        assert_eq!(detect_language("include/foo.hpp"), "cpp");
        assert_eq!(detect_language("fix.patch"), "diff");
    }

    #[test]
    fn test_whole_name_matches() {
        assert_eq!(detect_language("Dockerfile"), "dockerfile");
        assert_eq!(detect_language("build.dockerfile"), "dockerfile");
        assert_eq!(detect_language("etc/nginx.conf"), "nginx");
        assert_eq!(detect_language(".babelrc"), "json");
        assert_eq!(detect_language(".editorconfig"), "ini");
    }

    #[test]
    fn test_unknown_falls_back_to_plain_text() {
        assert_eq!(detect_language("README"), PLAIN_TEXT);
        assert_eq!(detect_language("data.bin"), PLAIN_TEXT);
        assert_eq!(detect_language(""), PLAIN_TEXT);
    }
}
