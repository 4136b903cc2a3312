//! Interactive shell with the url module loaded

use crate::classify::classify;
use crate::record;
use crate::runtime::{Runtime, RuntimeConfig, RuntimeResult};
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// REPL configuration
#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub prompt: String,
    /// Shown while a statement spans several lines
    pub continuation_prompt: String,
    /// Echo the value of each evaluated statement
    pub show_result: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "urlkit> ".to_string(),
            continuation_prompt: "   ... ".to_string(),
            show_result: true,
        }
    }
}

/// Dot-commands understood at the start of a line
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Exit,
    Help,
    Info,
    Parse(&'a str),
    Type(&'a str),
    Unknown(&'a str),
}

impl<'a> Command<'a> {
    fn from_line(line: &'a str) -> Self {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        match name {
            ".exit" | ".quit" | ".q" => Command::Exit,
            ".help" | ".h" => Command::Help,
            ".info" => Command::Info,
            ".parse" if !arg.is_empty() => Command::Parse(arg),
            ".type" if !arg.is_empty() => Command::Type(arg),
            _ => Command::Unknown(line),
        }
    }
}

/// Whether `input` is ready to evaluate.
///
/// Brackets inside string literals and `//` comments do not count. Input is
/// held back while a bracket or template literal is open, or the last line
/// ends with `\`. Unbalanced closers and unterminated quotes are left to the
/// engine to report.
pub fn is_complete(input: &str) -> bool {
    let mut depth: i64 = 0;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' if q != '`' => quote = None,
                c if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' | '(' | '[' => depth += 1,
            '}' | ')' | ']' => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && quote != Some('`') && !input.trim_end().ends_with('\\')
}

/// Interactive REPL for script execution
pub struct Repl {
    runtime: Runtime,
    config: ReplConfig,
    evaluated: usize,
}

impl Repl {
    pub fn new() -> RuntimeResult<Self> {
        Self::with_config(ReplConfig::default(), RuntimeConfig::default())
    }

    pub fn with_config(config: ReplConfig, runtime_config: RuntimeConfig) -> RuntimeResult<Self> {
        Ok(Self {
            runtime: Runtime::with_config(runtime_config)?,
            config,
            evaluated: 0,
        })
    }

    /// Run one dot-command; returns `false` when the shell should exit
    fn run_command(&mut self, command: Command<'_>) -> bool {
        let module = &self.runtime.config().module_name;
        match command {
            Command::Exit => return false,
            Command::Help => {
                println!("  {:<15} parse a URL and print its parts", ".parse <url>".yellow());
                println!("  {:<15} classify a string", ".type <input>".yellow());
                println!("  {:<15} module name and nesting limit", ".info".yellow());
                println!("  {:<15} leave the shell", ".exit".yellow());
                println!("Anything else is evaluated as JavaScript, e.g. {module}.parse('https://example.com/?a=1')");
            }
            Command::Info => {
                let config = self.runtime.config();
                println!("module {}, max depth {}", config.module_name, config.max_depth);
            }
            Command::Parse(input) => match record::parse(input) {
                Ok(parsed) => match serde_json::to_string_pretty(&parsed) {
                    Ok(json) => println!("{json}"),
                    Err(e) => println!("{}: {e}", "Error".red()),
                },
                Err(e) => println!("{}: {e}", "Error".red()),
            },
            Command::Type(input) => println!("{} {}", "=>".green(), classify(input)),
            Command::Unknown(line) => {
                println!("{}: unknown command '{line}', try .help", "Error".red());
            }
        }
        true
    }

    fn evaluate(&mut self, code: &str) {
        self.evaluated += 1;
        let filename = format!("repl_{}.js", self.evaluated);

        match self.runtime.eval(code, &filename) {
            Ok(value) if self.config.show_result && !value.is_undefined() => {
                println!("{} {}", "=>".green(), self.runtime.value_to_string(&value));
            }
            Ok(_) => {}
            Err(e) => println!("{}: {e}", "Error".red()),
        }
    }

    /// Read statements from stdin until EOF or `.exit`
    pub fn run(&mut self) -> RuntimeResult<()> {
        println!(
            "{} {} ({} for commands)",
            "urlkit".cyan().bold(),
            env!("CARGO_PKG_VERSION"),
            ".help".yellow()
        );

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        let mut pending = String::new();

        loop {
            let prompt = if pending.is_empty() {
                &self.config.prompt
            } else {
                &self.config.continuation_prompt
            };
            print!("{}", prompt.cyan());
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                println!();
                break;
            };
            let line = line?;

            if pending.is_empty() {
                if line.trim().is_empty() {
                    continue;
                }
                if line.starts_with('.') {
                    if !self.run_command(Command::from_line(&line)) {
                        break;
                    }
                    continue;
                }
            } else {
                pending.push('\n');
            }
            pending.push_str(&line);

            if is_complete(&pending) {
                self.evaluate(&pending);
                pending.clear();
            }
        }

        Ok(())
    }
}
