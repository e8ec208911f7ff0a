// src/lang.rs
use crate::error::{AdversaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tree_sitter::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    C,
    Java,
}

/// How a language's structure is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Real syntax tree; region lookups are exact.
    ParseTree,
    /// Bounded regex matching over raw text. Approximate.
    Pattern,
}

#[derive(Debug, Clone, Copy)]
pub enum SnippetKind {
    /// Statement-level guarded block, placed inside a function body.
    DeadBlock,
    /// Guarded block valid at the outermost level of a unit.
    UnitDeadBlock,
    /// Self-contained auxiliary function.
    Redundant,
}

impl Lang {
    /// Resolves a configured language name or file extension.
    ///
    /// # Errors
    /// Returns `UnsupportedLanguage` for anything without a backend.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "c" | "h" => Ok(Self::C),
            "java" => Ok(Self::Java),
            other => Err(AdversaError::UnsupportedLanguage(other.to_string())),
        }
    }

    #[must_use]
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "c" | "h" => Some(Self::C),
            "java" => Some(Self::Java),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Java => "java",
        }
    }

    #[must_use]
    pub fn backend(self) -> BackendKind {
        match self {
            Self::C => BackendKind::ParseTree,
            Self::Java => BackendKind::Pattern,
        }
    }

    /// Grammar for parse-tree backed languages.
    #[must_use]
    pub fn grammar(self) -> Option<Language> {
        match self {
            Self::C => Some(tree_sitter_c::language()),
            Self::Java => None,
        }
    }

    #[must_use]
    pub fn reserved_words(self) -> &'static [&'static str] {
        match self {
            Self::C => C_RESERVED,
            Self::Java => JAVA_RESERVED,
        }
    }

    #[must_use]
    pub fn rename_prefix(self) -> &'static str {
        match self {
            Self::C => "var_",
            Self::Java => "adv_",
        }
    }

    /// Wraps `text` in the language's comment syntax (no trailing newline).
    #[must_use]
    pub fn comment(self, text: &str) -> String {
        match self {
            Self::C => format!("/* {text} */"),
            Self::Java => format!("// {text}"),
        }
    }

    /// Source text of the `main` entry signature, as a regex.
    #[must_use]
    pub fn main_signature(self) -> &'static str {
        match self {
            Self::C => r"\bint\s+main\s*\([^)]*\)\s*\{",
            Self::Java => r"public\s+static\s+void\s+main\s*\([^)]*\)\s*\{",
        }
    }

    /// Snippet templates of a kind; `{id}` is replaced with a fresh suffix.
    #[must_use]
    #[allow(clippy::indexing_slicing)]
    pub fn snippets(self, kind: SnippetKind) -> &'static [&'static str] {
        SNIPPETS[self as usize][kind as usize]
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Language-specific reserved words, extendable without touching strategies.
#[derive(Debug, Clone)]
pub struct ReservedWords {
    words: HashSet<String>,
}

impl ReservedWords {
    #[must_use]
    pub fn for_lang(lang: Lang) -> Self {
        Self {
            words: lang.reserved_words().iter().map(|w| (*w).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words.extend(extra.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

const C_RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex", "_Imaginary",
    "_Alignas", "_Alignof", "_Atomic", "_Generic", "_Noreturn", "_Static_assert",
    "_Thread_local", "main", "NULL", "bool", "true", "false",
];

const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null", "var", "record",
    "yield", "main", "String", "System", "Object", "Integer", "Math",
];

// [C, Java] x [DeadBlock, UnitDeadBlock, Redundant]
const SNIPPETS: [[&[&str]; 3]; 2] = [
    // C
    [
        &[
            "\n    /* Dead code block */\n    if (0) {\n        int unused_{id} = 42;\n        unused_{id}++;\n    }\n",
            "\n    while (0) {\n        int spin_{id} = 0;\n        spin_{id} += 1;\n    }\n",
            "\n    if (1 == 0) {\n        int never_{id} = -1;\n        never_{id} = never_{id} * 2;\n    }\n",
        ],
        &[
            "#if 0\nint unused_variable_{id} = 42;\n#endif\n",
            "#if 0\nstatic void never_called_{id}(void) {\n}\n#endif\n",
        ],
        &[
            "\nint adv_sum_{id}(int adv_a_{id}, int adv_b_{id}) {\n    int adv_dummy_{id} = 0;\n    return (adv_a_{id} + adv_b_{id} + adv_dummy_{id});\n}\n",
            "\nvoid adv_counter_{id}(void) {\n    static int adv_count_{id} = 0;\n    adv_count_{id}++;\n}\n",
            "\nvoid adv_empty_loop_{id}(void) {\n    for (int adv_i_{id} = 0; adv_i_{id} < 10; adv_i_{id}++) {\n    }\n}\n",
        ],
    ],
    // Java
    [
        &[
            "\n        // Dead code block\n        if (false) {\n            int unusedVariable{id} = 42;\n            unusedVariable{id}++;\n        }\n",
            "\n        if (!true) {\n            float unusedFloat{id} = 4.2f;\n        }\n",
            "\n        if (1 == 0) {\n            char unusedChar{id} = '4';\n        }\n",
        ],
        &["static {\n    if (false) {\n        int unusedVariable{id} = 42;\n    }\n}\n"],
        &[
            "\n    private static int advSum{id}(int a, int b) {\n        int dummy = 0;\n        return a + b + dummy;\n    }\n",
            "\n    private static void advEmptyLoop{id}() {\n        for (int i = 0; i < 10; i++) {\n        }\n    }\n",
            "\n    private static boolean advIdentity{id}(boolean flag) {\n        return flag && true;\n    }\n",
        ],
    ],
];
