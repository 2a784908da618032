//! Interactive REPL (Read-Eval-Print Loop) mode.

use crate::app::App;
use crate::cli::Command;
use crate::commands;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::{Config as EditorConfig, DefaultEditor};

/// One REPL line, parsed with the same definitions as the command line
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_help_subcommand = true)]
struct ReplLine {
    #[command(subcommand)]
    command: Command,
}

/// REPL command type.
#[derive(Debug)]
enum ReplCommand {
    Exit,
    Help,
    Command(Command),
}

/// Run the interactive REPL.
pub async fn run_repl(app: &mut App, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.info("Tiermatch REPL - Type 'help' for commands, 'exit' to quit"));
    println!("{}", formatter.matrix_status(app.status()));
    match app.identity() {
        Some(user) => println!("{}", formatter.info(&format!("You are {}", user))),
        None => println!("{}", formatter.identity(None, &app.candidates())?),
    }
    println!();

    // Initialize readline editor
    let editor_config = EditorConfig::builder()
        .max_history_size(app.config().settings.history_size)
        .map_err(|e| CliError::Config(format!("Invalid history size: {}", e)))?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)
        .map_err(|e| CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e))))?;

    // Load history
    let history_path = app.config().history_path()?;
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = editor.load_history(&history_path);

    loop {
        let prompt = match app.identity() {
            Some(user) => format!("tiermatch ({})> ", user),
            None => "tiermatch (no identity)> ".to_string(),
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(ReplCommand::Command(Command::Repl)) => {
                        println!("{}", formatter.info("Already in the REPL"));
                    }
                    Ok(ReplCommand::Command(cmd)) => {
                        if let Err(e) = commands::execute(cmd, app, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    // Save history
    editor.save_history(&history_path).ok();

    Ok(())
}

/// Parse a REPL command line.
fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let words = split_words(line)?;

    match words.first().map(String::as_str) {
        None => Err(CliError::InvalidInput("Empty command".to_string())),
        Some("exit" | "quit" | "q") => Ok(ReplCommand::Exit),
        Some("help" | "?") => Ok(ReplCommand::Help),
        Some(_) => ReplLine::try_parse_from(words)
            .map(|parsed| ReplCommand::Command(parsed.command))
            .map_err(|e| CliError::InvalidInput(e.to_string())),
    }
}

/// Split on whitespace, keeping single- or double-quoted runs together
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for ch in line.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => current.push(ch),
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                in_word = true;
            }
            None if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(ch);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(CliError::InvalidInput("Unterminated quote".to_string()));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  identity [name]                         - Show or select who you are");
    println!("  tiers <peers|ideas>                     - Show a tier board");
    println!("  move <peers|ideas> <item> <t1|t2|t3> [--before <item>]");
    println!("                                          - Move an item between tiers");
    println!("  rate <peers|ideas> <item> <1-7>         - Rate an item");
    println!("  bounds <peers|ideas> [--tier1 N] [--tier2 N]");
    println!("                                          - Show or change tier boundaries");
    println!("  analyze peers [--sort S] [--tier T]     - Alignment with every peer");
    println!("    S: tier|alignment|conflicts|rating");
    println!("  analyze ideas [--min-rating N]          - Peers keen on your ideas (default N: 5)");
    println!("  matrix                                  - Peer x idea grid");
    println!("  refresh                                 - Fetch the shared sheet again");
    println!("  reset [-y]                              - Discard your tiers and ratings");
    println!("  help, ?                                 - Show this help");
    println!("  exit, quit, q                           - Exit REPL");
    println!();
    println!("  Items can be named by id (keel-bone) or quoted name (\"Keel Bone\").");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{AnalyzeTarget, DomainArg, SortArg};

    #[test]
    fn test_split_words_quotes() {
        assert_eq!(
            split_words(r#"move ideas "Keel Bone" t1 --before 'Air Pollution'"#).unwrap(),
            vec!["move", "ideas", "Keel Bone", "t1", "--before", "Air Pollution"]
        );
        assert_eq!(split_words(r#"rate peers "" 3"#).unwrap(), vec!["rate", "peers", "", "3"]);
        assert!(split_words(r#"rate "Kate"#).is_err());
    }

    #[test]
    fn test_parse_builtin_words() {
        assert!(matches!(parse_repl_command("quit"), Ok(ReplCommand::Exit)));
        assert!(matches!(parse_repl_command("?"), Ok(ReplCommand::Help)));
    }

    #[test]
    fn test_parse_uses_cli_grammar() {
        match parse_repl_command("analyze peers --sort conflicts") {
            Ok(ReplCommand::Command(Command::Analyze(args))) => match args.target {
                AnalyzeTarget::Peers { sort, tier } => {
                    assert_eq!(sort, SortArg::Conflicts);
                    assert!(tier.is_none());
                }
                _ => panic!("Expected peers analysis"),
            },
            other => panic!("Unexpected parse: {:?}", other.map(|_| ())),
        }

        match parse_repl_command("tiers cofounders") {
            Ok(ReplCommand::Command(Command::Tiers(args))) => assert_eq!(args.domain, DomainArg::Peers),
            _ => panic!("Expected tiers"),
        }
    }

    #[test]
    fn test_parse_errors_are_invalid_input() {
        assert!(matches!(parse_repl_command("rate peers kate 9"), Err(CliError::InvalidInput(_))));
        assert!(matches!(parse_repl_command("frobnicate"), Err(CliError::InvalidInput(_))));
    }
}
