//! Snippet catalog, parameter prompts, and template rendering.

/// One of the ten Python constructs the picker offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetKind {
    If,
    IfElse,
    IfElifElse,
    For,
    While,
    Function,
    Class,
    TryExcept,
    With,
    Main,
}

/// A parameter collected by the prompt flow before rendering.
#[derive(Debug, Clone, Copy)]
pub struct ParamRequest {
    /// Question shown in the input modal.
    pub prompt: &'static str,
    /// Hint shown dimmed while the input is empty.
    pub placeholder: &'static str,
    /// Substituted when the prompt is submitted empty or dismissed.
    pub default: &'static str,
}

/// Output of [`render`]: the snippet text plus where the cursor lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSnippet {
    pub text: String,
    /// Distance in characters from the end of `text` back to the cursor.
    /// Zero places the cursor at the very end of the inserted text.
    pub cursor_offset_from_end: usize,
}

impl SnippetKind {
    /// The full catalog, in picker order.
    pub const ALL: [SnippetKind; 10] = [
        SnippetKind::If,
        SnippetKind::IfElse,
        SnippetKind::IfElifElse,
        SnippetKind::For,
        SnippetKind::While,
        SnippetKind::Function,
        SnippetKind::Class,
        SnippetKind::TryExcept,
        SnippetKind::With,
        SnippetKind::Main,
    ];

    /// Stable identifier shown in the picker and in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::If => "if",
            Self::IfElse => "if-else",
            Self::IfElifElse => "if-elif-else",
            Self::For => "for",
            Self::While => "while",
            Self::Function => "function",
            Self::Class => "class",
            Self::TryExcept => "try-except",
            Self::With => "with",
            Self::Main => "main",
        }
    }

    /// One-line description shown next to the label in the picker.
    pub fn description(&self) -> &'static str {
        match self {
            Self::If => "Basic if statement",
            Self::IfElse => "if-else statement",
            Self::IfElifElse => "if-elif-else chain",
            Self::For => "for loop",
            Self::While => "while loop",
            Self::Function => "Function definition with docstring",
            Self::Class => "Class definition with __init__",
            Self::TryExcept => "try-except block",
            Self::With => "with statement context manager",
            Self::Main => "if __name__ == \"__main__\" guard",
        }
    }

    /// Parameters the prompt flow collects for this kind, in prompt order.
    pub fn params(&self) -> &'static [ParamRequest] {
        match self {
            Self::If | Self::IfElse | Self::IfElifElse | Self::TryExcept | Self::Main => &[],
            Self::For => &[
                ParamRequest {
                    prompt: "Enter the loop variable name",
                    placeholder: "i",
                    default: "i",
                },
                ParamRequest {
                    prompt: "Enter the iterable to loop over",
                    placeholder: "range(10)",
                    default: "range(10)",
                },
            ],
            Self::While => &[ParamRequest {
                prompt: "Enter the loop condition",
                placeholder: "True",
                default: "True",
            }],
            Self::Function => &[
                ParamRequest {
                    prompt: "Enter the function name",
                    placeholder: "my_function",
                    default: "my_function",
                },
                ParamRequest {
                    prompt: "Enter the function parameters",
                    placeholder: "param1, param2",
                    default: "",
                },
            ],
            Self::Class => &[
                ParamRequest {
                    prompt: "Enter the class name",
                    placeholder: "MyClass",
                    default: "MyClass",
                },
                ParamRequest {
                    prompt: "Enter the parent class",
                    placeholder: "ParentClass",
                    default: "",
                },
            ],
            Self::With => &[
                ParamRequest {
                    prompt: "Enter the context manager expression",
                    placeholder: "open(\"file.txt\")",
                    default: "open(\"file.txt\")",
                },
                ParamRequest {
                    prompt: "Enter the variable name",
                    placeholder: "file",
                    default: "file",
                },
            ],
        }
    }
}

/// Render the template for `kind` with the collected parameter values.
///
/// Values are substituted verbatim in prompt order; a missing value falls
/// back to its request default, so `render(kind, &[])` produces the
/// default template for every kind. The cursor offset points just past
/// the first occurrence of the template's anchor token (`condition`,
/// `condition1`, or `pass`), counted in characters from the end of the
/// text so it stays valid wherever the snippet is inserted.
pub fn render(kind: SnippetKind, values: &[String]) -> RenderedSnippet {
    let params = kind.params();
    let val = |i: usize| values.get(i).map(String::as_str).unwrap_or(params[i].default);

    let (text, anchor) = match kind {
        SnippetKind::If => ("if condition:\n    pass".to_string(), "condition"),
        SnippetKind::IfElse => (
            "if condition:\n    pass\nelse:\n    pass".to_string(),
            "condition",
        ),
        SnippetKind::IfElifElse => (
            "if condition1:\n    pass\nelif condition2:\n    pass\nelse:\n    pass".to_string(),
            "condition1",
        ),
        SnippetKind::For => (format!("for {} in {}:\n    pass", val(0), val(1)), "pass"),
        SnippetKind::While => (format!("while {}:\n    pass", val(0)), "pass"),
        SnippetKind::Function => (
            format!(
                "def {}({}):\n    \"\"\"\n    Function description\n    \"\"\"\n    pass",
                val(0),
                val(1)
            ),
            "pass",
        ),
        SnippetKind::Class => {
            let header = if val(1).is_empty() {
                format!("class {}:", val(0))
            } else {
                format!("class {}({}):", val(0), val(1))
            };
            (
                format!(
                    "{}\n    \"\"\"\n    Class description\n    \"\"\"\n\n    def __init__(self):\n        pass",
                    header
                ),
                "pass",
            )
        }
        SnippetKind::TryExcept => (
            "try:\n    pass\nexcept Exception as e:\n    print(f\"An error occurred: {e}\")"
                .to_string(),
            "pass",
        ),
        SnippetKind::With => (format!("with {} as {}:\n    pass", val(0), val(1)), "pass"),
        SnippetKind::Main => (
            "if __name__ == \"__main__\":\n    pass".to_string(),
            "pass",
        ),
    };

    let cursor_offset_from_end = offset_from_end(&text, anchor);
    RenderedSnippet {
        text,
        cursor_offset_from_end,
    }
}

/// Characters from the end of `text` back to just past the first `anchor`.
///
/// The first occurrence wins even when it sits inside a user-supplied
/// value. Counted in characters, not bytes, because buffer cursors are
/// char indices and values may be non-ASCII.
fn offset_from_end(text: &str, anchor: &str) -> usize {
    match text.find(anchor) {
        Some(start) => {
            let anchor_end = text[..start].chars().count() + anchor.chars().count();
            text.chars().count() - anchor_end
        }
        None => 0,
    }
}
