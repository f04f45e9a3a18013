//! Per-format code adapters
//!
//! Pure transforms from raw generated code to an injectable fragment. One
//! adapter per format, selected by exhaustive dispatch; adapters know
//! nothing about the message protocol or the surrounding document shell.
//!
//! Export and format detection is regex-based and best-effort: a miss is an
//! explicit [`AdapterError`], never a silent guess, so the synthesizer can
//! compile it into a visible diagnostic document.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::output::Format;

/// Fallback binding name for anonymous default exports
const DEFAULT_COMPONENT: &str = "App";

/// Code prepared for embedding into a document shell
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedFragment {
    /// Complete or partial HTML, injected into as-is
    Html { code: String },
    /// Import-stripped React source with the resolved mount component
    React { code: String, component: String },
    /// SFC source escaped for embedding in a template literal
    Vue { code: String },
}

/// Why an adapter could not produce a fragment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    #[error("could not find a component to render; ensure the code has a default export")]
    ComponentNotFound,
    #[error("generated code appears to be {detected}, but the output format is {requested}")]
    FormatMismatch {
        detected: &'static str,
        requested: &'static str,
    },
}

/// Transform raw code for its format
pub fn prepare(code: &str, format: Format) -> Result<PreparedFragment, AdapterError> {
    match format {
        Format::StaticHtml | Format::PlainHtml => Ok(PreparedFragment::Html {
            code: code.to_string(),
        }),
        Format::ReactComponent => prepare_react(code),
        Format::VueSfc => prepare_vue(code),
    }
}

/// Single-file-component markers: template block plus a script block
fn looks_like_vue_sfc(code: &str) -> bool {
    code.contains("<template>") && code.contains("<script")
}

/// React module markers: a react import or namespace usage
fn looks_like_react_module(code: &str) -> bool {
    code.contains("from 'react'") || code.contains("from \"react\"") || code.contains("React.")
}

struct ReactPatterns {
    lucide_import: Regex,
    import_from: Regex,
    bare_import: Regex,
    default_function: Regex,
    default_class: Regex,
    default_identifier: Regex,
    default_anonymous: Regex,
    default_keyword: Regex,
}

fn react_patterns() -> &'static ReactPatterns {
    static PATTERNS: OnceLock<ReactPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ReactPatterns {
        lucide_import: Regex::new(r#"(?s)import\s+\{(.*?)\}\s+from\s+['"]lucide-react['"];?"#)
            .unwrap(),
        import_from: Regex::new(r#"(?s)import\s+.*?from\s+['"].*?['"];?"#).unwrap(),
        bare_import: Regex::new(r#"import\s+['"].*?['"];?"#).unwrap(),
        default_function: Regex::new(r"export\s+default\s+function\s+([A-Za-z0-9_]+)").unwrap(),
        default_class: Regex::new(r"export\s+default\s+class\s+([A-Za-z0-9_]+)").unwrap(),
        default_identifier: Regex::new(r"export\s+default\s+([A-Za-z0-9_]+)\s*;?").unwrap(),
        default_anonymous: Regex::new(r"export\s+default\s*(?:function\b|async\b|\(|\{)").unwrap(),
        default_keyword: Regex::new(r"export\s+default").unwrap(),
    })
}

/// Strip imports, resolve the default-exported component, and rebind it to
/// a local name the document shell can mount
fn prepare_react(code: &str) -> Result<PreparedFragment, AdapterError> {
    if looks_like_vue_sfc(code) {
        return Err(AdapterError::FormatMismatch {
            detected: "Vue",
            requested: "React",
        });
    }

    let p = react_patterns();

    // Icon imports become destructurings of the shim installed by the shell
    let mut clean = p
        .lucide_import
        .replace_all(code, "const {$1} = window.lucideReact;")
        .into_owned();
    clean = p.import_from.replace_all(&clean, "").into_owned();
    clean = p.bare_import.replace_all(&clean, "").into_owned();

    // Detection priority: named function, class, identifier, anonymous
    // expression. Checked in that order; first hit wins.
    let component;
    if let Some(caps) = p.default_function.captures(&clean) {
        component = caps[1].to_string();
        clean = p
            .default_function
            .replace(&clean, "function $1")
            .into_owned();
    } else if let Some(caps) = p.default_class.captures(&clean) {
        component = caps[1].to_string();
        clean = p.default_class.replace(&clean, "class $1").into_owned();
    } else if let Some(name) = p
        .default_identifier
        .captures(&clean)
        .map(|caps| caps[1].to_string())
        // Keywords mean an anonymous expression, not a named binding
        .filter(|name| !matches!(name.as_str(), "function" | "class" | "async" | "new"))
    {
        component = name;
        clean = p.default_identifier.replace(&clean, "").into_owned();
    } else if p.default_anonymous.is_match(&clean) {
        component = DEFAULT_COMPONENT.to_string();
        clean = p
            .default_keyword
            .replace(&clean, format!("const {} =", DEFAULT_COMPONENT).as_str())
            .into_owned();
    } else {
        return Err(AdapterError::ComponentNotFound);
    }

    Ok(PreparedFragment::React {
        code: escape_closing_script(&clean),
        component,
    })
}

/// Escape the SFC source for embedding as a backtick template literal
fn prepare_vue(code: &str) -> Result<PreparedFragment, AdapterError> {
    if !looks_like_vue_sfc(code) && looks_like_react_module(code) {
        return Err(AdapterError::FormatMismatch {
            detected: "React",
            requested: "Vue",
        });
    }

    let escaped = code
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${");
    Ok(PreparedFragment::Vue {
        code: escape_closing_script(&escaped),
    })
}

/// Break literal `</script>` sequences so embedded code can never terminate
/// the script block that carries it
fn escape_closing_script(code: &str) -> String {
    code.replace("</script>", "<\\/script>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_is_passthrough() {
        let frag = prepare("<h1>Hi</h1>", Format::StaticHtml).unwrap();
        assert_eq!(
            frag,
            PreparedFragment::Html {
                code: "<h1>Hi</h1>".to_string()
            }
        );
    }

    #[test]
    fn test_react_named_function_export() {
        let frag = prepare(
            "export default function Foo(){return <div>x</div>}",
            Format::ReactComponent,
        )
        .unwrap();
        match frag {
            PreparedFragment::React { code, component } => {
                assert_eq!(component, "Foo");
                assert!(code.contains("function Foo()"));
                assert!(!code.contains("export default"));
            }
            other => panic!("expected React fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_react_identifier_export() {
        let src = "const Card = () => <div/>;\nexport default Card;";
        let frag = prepare(src, Format::ReactComponent).unwrap();
        match frag {
            PreparedFragment::React { code, component } => {
                assert_eq!(component, "Card");
                assert!(!code.contains("export default"));
            }
            other => panic!("expected React fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_react_anonymous_arrow_rebinds_to_app() {
        let frag = prepare("export default () => <div>x</div>", Format::ReactComponent).unwrap();
        match frag {
            PreparedFragment::React { code, component } => {
                assert_eq!(component, "App");
                assert!(code.contains("const App ="));
            }
            other => panic!("expected React fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_react_missing_export_is_an_error() {
        let err = prepare("const x = 1;", Format::ReactComponent).unwrap_err();
        assert_eq!(err, AdapterError::ComponentNotFound);
    }

    #[test]
    fn test_react_strips_imports() {
        let src = "import React from 'react';\nimport './style.css';\nexport default function A(){return null}";
        let frag = prepare(src, Format::ReactComponent).unwrap();
        match frag {
            PreparedFragment::React { code, .. } => {
                assert!(!code.contains("import"));
            }
            other => panic!("expected React fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_react_lucide_import_becomes_shim_binding() {
        let src = "import { Zap, Star } from 'lucide-react';\nexport default function A(){return <Zap/>}";
        let frag = prepare(src, Format::ReactComponent).unwrap();
        match frag {
            PreparedFragment::React { code, .. } => {
                assert!(code.contains("const { Zap, Star } = window.lucideReact;"));
            }
            other => panic!("expected React fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_vue_code_under_react_format_is_a_mismatch() {
        let sfc = "<template><div/></template>\n<script setup>const x = 1;</script>";
        let err = prepare(sfc, Format::ReactComponent).unwrap_err();
        assert_eq!(
            err,
            AdapterError::FormatMismatch {
                detected: "Vue",
                requested: "React",
            }
        );
    }

    #[test]
    fn test_react_code_under_vue_format_is_a_mismatch() {
        let src = "import React from 'react';\nexport default function A(){return null}";
        let err = prepare(src, Format::VueSfc).unwrap_err();
        assert_eq!(
            err,
            AdapterError::FormatMismatch {
                detected: "React",
                requested: "Vue",
            }
        );
    }

    #[test]
    fn test_vue_escapes_template_literal_metacharacters() {
        let sfc = "<template><div>`${x}`</div></template>\n<script setup></script>";
        let frag = prepare(sfc, Format::VueSfc).unwrap();
        match frag {
            PreparedFragment::Vue { code } => {
                assert!(code.contains("\\`"));
                assert!(code.contains("\\${"));
            }
            other => panic!("expected Vue fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_closing_script_is_broken() {
        let src = "export default function A(){return <div>{'</script>'}</div>}";
        let frag = prepare(src, Format::ReactComponent).unwrap();
        match frag {
            PreparedFragment::React { code, .. } => {
                assert!(!code.contains("</script>"));
                assert!(code.contains("<\\/script>"));
            }
            other => panic!("expected React fragment, got {:?}", other),
        }
    }
}
