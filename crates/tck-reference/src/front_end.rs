//! Line-oriented reference front end
//!
//! Recognises just enough of a Java-like language to give scenarios
//! something to check: the `package`/`import` header, type declarations,
//! `var` locals, text blocks and type-pattern `case` labels. Everything after
//! the header is kept verbatim as body lines. A construct the dialect does
//! not support is a syntax error at the line it starts on.

use crate::dialect::{required_capability, Dialect};
use regex::Regex;
use tck_backend::{
    BackendId, Construct, ConstructKind, ConstructionError, FrontEnd, FrontEndError, Import,
    SourceUnit,
};

const TEXT_BLOCK: &str = "\"\"\"";

#[derive(Debug)]
struct Patterns {
    declaration: Regex,
    local_var: Regex,
    type_pattern: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            declaration: Regex::new(
                r"^\s*(?:(?:public|protected|private|static|final|abstract|sealed|non-sealed|strictfp)\s+)*(class|interface|enum|record)\s+([A-Za-z_$][\w$]*)",
            )?,
            local_var: Regex::new(r"(?:^|[(;])\s*(?:final\s+)?var\s+([A-Za-z_$][\w$]*)\s*[=:]")?,
            type_pattern: Regex::new(
                r"^\s*case\s+([A-Z][\w$.]*(?:<[^>]*>)?)\s+([a-z_$][\w$]*)\s*(?:->|:|when\b)",
            )?,
        })
    }
}

/// Front end for one [`Dialect`]
#[derive(Debug)]
pub struct JavaFrontEnd {
    id: BackendId,
    dialect: Dialect,
    patterns: Patterns,
}

impl JavaFrontEnd {
    /// Build front end for dialect
    ///
    /// # Errors
    /// Returns `ConstructionError::Setup` if the recognisers fail to compile.
    pub fn new(dialect: Dialect) -> Result<Self, ConstructionError> {
        let patterns = Patterns::compile().map_err(|e| ConstructionError::Setup(e.to_string()))?;
        Ok(Self {
            id: dialect.id(),
            dialect,
            patterns,
        })
    }

    /// Dialect implemented
    #[inline]
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn require(&self, kind: ConstructKind, line: usize) -> Result<(), FrontEndError> {
        if self.dialect.supports(kind) {
            return Ok(());
        }
        let needs = required_capability(kind).unwrap_or("an unknown capability");
        Err(FrontEndError::syntax(
            line,
            format!("{} not supported by {} (requires {needs})", describe(kind), self.id),
        ))
    }

    fn push(
        &self,
        constructs: &mut Vec<Construct>,
        kind: ConstructKind,
        name: Option<&str>,
        line: usize,
    ) -> Result<(), FrontEndError> {
        self.require(kind, line)?;
        constructs.push(Construct {
            kind,
            name: name.map(str::to_string),
            line,
        });
        Ok(())
    }

    /// Recognise constructs on one line of code
    fn scan_code(&self, code: &str, line: usize, constructs: &mut Vec<Construct>) -> Result<(), FrontEndError> {
        let trimmed = code.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
            return Ok(());
        }
        for keyword in ["package ", "import "] {
            if trimmed.starts_with(keyword) {
                return Err(FrontEndError::syntax(
                    line,
                    format!("{keyword}declaration after type declarations"),
                ));
            }
        }

        if let Some(caps) = self.patterns.declaration.captures(code) {
            let kind = match &caps[1] {
                "interface" => ConstructKind::Interface,
                "enum" => ConstructKind::Enum,
                "record" => ConstructKind::Record,
                _ => ConstructKind::Class,
            };
            self.push(constructs, kind, caps.get(2).map(|m| m.as_str()), line)?;
        }
        if let Some(caps) = self.patterns.local_var.captures(code) {
            self.push(constructs, ConstructKind::LocalVar, caps.get(1).map(|m| m.as_str()), line)?;
        }
        if let Some(caps) = self.patterns.type_pattern.captures(code) {
            self.push(constructs, ConstructKind::TypePattern, caps.get(1).map(|m| m.as_str()), line)?;
        }
        Ok(())
    }

    /// Recognise constructs in the body; `first_line` is the 1-based line of
    /// `body[0]`
    fn scan_body(&self, body: &[&str], first_line: usize) -> Result<Vec<Construct>, FrontEndError> {
        let mut constructs = Vec::new();
        let mut open_block: Option<usize> = None;

        for (offset, text) in body.iter().enumerate() {
            let line = first_line + offset;
            if open_block.is_some() {
                if text.contains(TEXT_BLOCK) {
                    open_block = None;
                }
                continue;
            }

            match text.find(TEXT_BLOCK) {
                Some(pos) => {
                    self.scan_code(&text[..pos], line, &mut constructs)?;
                    self.push(&mut constructs, ConstructKind::TextBlock, None, line)?;
                    if !text[pos + TEXT_BLOCK.len()..].trim().is_empty() {
                        return Err(FrontEndError::syntax(
                            line,
                            "text block opening delimiter must end the line",
                        ));
                    }
                    open_block = Some(line);
                }
                None => self.scan_code(text, line, &mut constructs)?,
            }
        }

        match open_block {
            Some(line) => Err(FrontEndError::syntax(line, "unterminated text block")),
            None => Ok(constructs),
        }
    }
}

fn describe(kind: ConstructKind) -> &'static str {
    match kind {
        ConstructKind::Class => "class declaration",
        ConstructKind::Interface => "interface declaration",
        ConstructKind::Enum => "enum declaration",
        ConstructKind::Record => "record declaration",
        ConstructKind::LocalVar => "'var' local variable",
        ConstructKind::TextBlock => "text block",
        ConstructKind::TypePattern => "type pattern in case label",
    }
}

/// `name;` of a header statement, without the semicolon
fn statement_name(rest: &str, line: usize) -> Result<&str, FrontEndError> {
    let name = rest
        .trim()
        .strip_suffix(';')
        .ok_or_else(|| FrontEndError::syntax(line, "expected ';'"))?
        .trim();
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '$' | '*'));
    if valid {
        Ok(name)
    } else {
        Err(FrontEndError::syntax(line, format!("malformed name '{name}'")))
    }
}

impl FrontEnd for JavaFrontEnd {
    fn backend_id(&self) -> &BackendId {
        &self.id
    }

    fn parse(&self, source: &str) -> Result<SourceUnit, FrontEndError> {
        let lines: Vec<&str> = source.lines().collect();
        let mut unit = SourceUnit::default();

        let mut index = 0;
        while let Some(text) = lines.get(index) {
            let line = index + 1;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                index += 1;
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix("package ") {
                if unit.package.is_some() || !unit.imports.is_empty() {
                    return Err(FrontEndError::syntax(line, "package declaration must come first"));
                }
                unit.package = Some(statement_name(rest, line)?.to_string());
            } else if let Some(rest) = trimmed.strip_prefix("import ") {
                let import = match rest.trim_start().strip_prefix("static ") {
                    Some(member) => Import::new_static(statement_name(member, line)?),
                    None => Import::new(statement_name(rest, line)?),
                };
                unit.imports.push(import);
            } else {
                break;
            }
            index += 1;
        }

        let body = &lines[index..];
        let end = body.iter().rposition(|l| !l.trim().is_empty()).map_or(0, |p| p + 1);
        let body = &body[..end];

        unit.constructs = self.scan_body(body, index + 1)?;
        unit.body = body.iter().map(|l| (*l).to_string()).collect();
        Ok(unit)
    }

    fn print(&self, unit: &SourceUnit) -> String {
        let mut sections = Vec::with_capacity(3);
        if let Some(package) = &unit.package {
            sections.push(format!("package {package};"));
        }
        if !unit.imports.is_empty() {
            let imports: Vec<String> = unit.imports.iter().map(ToString::to_string).collect();
            sections.push(imports.join("\n"));
        }
        if !unit.body.is_empty() {
            sections.push(unit.body_text());
        }
        let mut out = sections.join("\n\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tck_scenario::assert::trim_indent;

    fn fe(dialect: Dialect) -> JavaFrontEnd {
        JavaFrontEnd::new(dialect).unwrap()
    }

    fn syntax_line(err: FrontEndError) -> usize {
        match err {
            FrontEndError::Syntax { line, .. } => line,
            FrontEndError::Internal(message) => panic!("unexpected internal error: {message}"),
        }
    }

    #[test]
    fn parses_header_and_declarations() {
        let source = trim_indent(
            "
            package com.example;

            import java.util.List;
            import static java.util.Collections.emptyList;

            public final class Names {
                interface Source {}
                enum Kind { A, B }
            }
            ",
        );
        let unit = fe(Dialect::Java8).parse(&source).unwrap();

        assert_eq!(unit.package.as_deref(), Some("com.example"));
        assert_eq!(
            unit.imports,
            vec![
                Import::new("java.util.List"),
                Import::new_static("java.util.Collections.emptyList"),
            ]
        );
        let kinds: Vec<_> = unit.constructs.iter().map(|c| (c.kind, c.name.clone(), c.line)).collect();
        assert_eq!(
            kinds,
            vec![
                (ConstructKind::Class, Some("Names".to_string()), 6),
                (ConstructKind::Interface, Some("Source".to_string()), 7),
                (ConstructKind::Enum, Some("Kind".to_string()), 8),
            ]
        );
        assert_eq!(unit.body.len(), 4);
    }

    #[test]
    fn print_is_canonical() {
        let source = "package a.b;\n\n\nimport x.Y;\n\n\n\nclass C {\n\n    Y y;\n}\n\n\n";
        let front_end = fe(Dialect::Java8);
        let printed = front_end.print(&front_end.parse(source).unwrap());
        assert_eq!(printed, "package a.b;\n\nimport x.Y;\n\nclass C {\n\n    Y y;\n}\n");
    }

    #[test]
    fn var_needs_java11() {
        let source = "class A {\n    void f() {\n        var list = new java.util.ArrayList<String>();\n    }\n}";
        let err = fe(Dialect::Java8).parse(source).unwrap_err();
        assert_eq!(syntax_line(err), 3);

        let unit = fe(Dialect::Java11).parse(source).unwrap();
        let vars: Vec<_> = unit.constructs_of(ConstructKind::LocalVar).collect();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name.as_deref(), Some("list"));
    }

    #[test]
    fn var_in_enhanced_for() {
        let source = "class A {\n    void f(java.util.List<String> xs) {\n        for (var x : xs) {}\n    }\n}";
        let unit = fe(Dialect::Java11).parse(source).unwrap();
        assert_eq!(unit.constructs_of(ConstructKind::LocalVar).count(), 1);
    }

    #[test]
    fn text_block_content_is_opaque() {
        let source = trim_indent(
            r#"
            class Query {
                String sql = """
                    import not.a.Statement;
                    case Foo f -> nothing
                    """;
            }
            "#,
        );
        let unit = fe(Dialect::Java17).parse(&source).unwrap();
        let blocks: Vec<_> = unit.constructs_of(ConstructKind::TextBlock).collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].line, 2);
        assert_eq!(unit.constructs_of(ConstructKind::TypePattern).count(), 0);

        let err = fe(Dialect::Java11).parse(&source).unwrap_err();
        assert_eq!(syntax_line(err), 2);
    }

    #[test]
    fn unterminated_text_block() {
        let source = "class Q {\n    String s = \"\"\"\n        open\n}";
        let err = fe(Dialect::Java21).parse(source).unwrap_err();
        assert!(matches!(err, FrontEndError::Syntax { line: 2, ref message } if message.contains("unterminated")));
    }

    #[test]
    fn records_need_java17() {
        let source = "record Point(int x, int y) {}";
        assert_eq!(syntax_line(fe(Dialect::Java11).parse(source).unwrap_err()), 1);
        let unit = fe(Dialect::Java17).parse(source).unwrap();
        assert_eq!(unit.constructs[0].kind, ConstructKind::Record);
        assert_eq!(unit.constructs[0].name.as_deref(), Some("Point"));
    }

    #[test]
    fn type_patterns_need_java21() {
        let source = trim_indent(
            "
            class Area {
                double of(Shape s) {
                    return switch (s) {
                        case Circle c -> c.r() * c.r();
                        case Square q -> q.side() * q.side();
                        default -> 0;
                    };
                }
            }
            ",
        );
        let err = fe(Dialect::Java17).parse(&source).unwrap_err();
        assert_eq!(syntax_line(err), 4);

        let unit = fe(Dialect::Java21).parse(&source).unwrap();
        let names: Vec<_> = unit
            .constructs_of(ConstructKind::TypePattern)
            .filter_map(|c| c.name.as_deref())
            .collect();
        assert_eq!(names, vec!["Circle", "Square"]);
    }

    #[test]
    fn enum_constant_case_is_not_a_pattern() {
        let source = "class S {\n    void f(Kind k) {\n        switch (k) {\n            case A: break;\n        }\n    }\n}";
        assert!(fe(Dialect::Java8).parse(source).is_ok());
    }

    #[test]
    fn header_errors() {
        assert_eq!(syntax_line(fe(Dialect::Java8).parse("package a.b\nclass A {}").unwrap_err()), 1);
        assert_eq!(
            syntax_line(fe(Dialect::Java8).parse("import a.B;\npackage a;\n").unwrap_err()),
            2
        );
        assert_eq!(
            syntax_line(fe(Dialect::Java8).parse("class A {}\nimport a.B;\n").unwrap_err()),
            2
        );
        assert_eq!(syntax_line(fe(Dialect::Java8).parse("import a..;\n").unwrap_err()), 1);
    }

    #[test]
    fn wildcard_imports_parse() {
        let unit = fe(Dialect::Java8).parse("import java.util.*;\n\nclass A {}").unwrap();
        assert_eq!(unit.imports, vec![Import::new("java.util.*")]);
    }
}
