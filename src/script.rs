//! Typed shell statements and script rendering
//!
//! The script body is built as a sequence of statement values and only turned
//! into text at the very end. Tests can compare statement lists directly
//! instead of matching whitespace in rendered output.

/// A single line of the generated startup script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `# <text>`
    Comment(String),
    /// `cd <dir>` (the caller supplies quoting when needed)
    ChangeDir(String),
    /// `export <name>=<value>`
    Export { name: String, value: String },
    /// `<name>=<value>` (value may contain command substitutions)
    Assign { name: String, value: String },
    /// `echo <args>` (args rendered verbatim, quoting included by the caller)
    Echo(String),
    /// A verbatim command line
    Run(String),
    /// An empty line
    Blank,
}

impl Statement {
    pub fn render(&self) -> String {
        match self {
            Statement::Comment(text) => format!("# {}", text),
            Statement::ChangeDir(dir) => format!("cd {}", dir),
            Statement::Export { name, value } => format!("export {}={}", name, value),
            Statement::Assign { name, value } => format!("{}={}", name, value),
            Statement::Echo(args) => format!("echo {}", args),
            Statement::Run(command) => command.clone(),
            Statement::Blank => String::new(),
        }
    }
}

/// Interpreter line emitted at the top of every generated script.
pub const SHEBANG: &str = "#!/bin/sh";

/// An ordered script body. Statement order is part of the output contract:
/// external tooling parses the rendered text, so `render` must stay
/// byte-stable for a given statement list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    statements: Vec<Statement>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn extend(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.statements.extend(statements);
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Renders the shebang plus every statement, one per line, with a
    /// trailing newline.
    pub fn render(&self) -> String {
        let mut text = String::from(SHEBANG);
        text.push('\n');
        for statement in &self.statements {
            text.push_str(&statement.render());
            text.push('\n');
        }
        text
    }
}
