//! Line input
//!
//! Turns one line of user input into a typed command. Words are split on
//! whitespace; single or double quotes keep spaces inside a word.

use std::fmt;

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ls(Option<String>),
    Cd(String),
    Up,
    Pwd,
    Mkdir(String),
    Put { local: String, name: Option<String> },
    Get { path: String, local: String },
    Cat(String),
    Rm(String),
    Mv { path: String, new_name: String },
    Cp(String),
    Cut(String),
    Paste,
    Find(String),
    Link { path: String, url: String, title: Option<String> },
    Unlink(String),
    Log,
    Login(String),
    Logout,
    Whoami,
    Settings,
    Help,
    Quit,
}

/// Input that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnknownCommand(String),
    Usage(&'static str),
    UnterminatedQuote,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownCommand(cmd) => write!(f, "unknown command: {} (try `help`)", cmd),
            ParseError::Usage(usage) => write!(f, "usage: {}", usage),
            ParseError::UnterminatedQuote => write!(f, "unterminated quote"),
        }
    }
}

/// Splits a line into words, honouring quotes
pub fn tokenize(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parses one line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let words = tokenize(trimmed)?;
    let Some((name, args)) = words.split_first() else {
        return Ok(None);
    };
    let arg = |i: usize| args.get(i).cloned();
    let rest = |from: usize| {
        let joined = args.get(from..).unwrap_or_default().join(" ");
        (!joined.is_empty()).then_some(joined)
    };

    let command = match name.as_str() {
        "ls" | "dir" => Command::Ls(arg(0)),
        "cd" => Command::Cd(arg(0).unwrap_or_else(|| "/".to_string())),
        "up" | ".." => Command::Up,
        "pwd" => Command::Pwd,
        "mkdir" => Command::Mkdir(rest(0).ok_or(ParseError::Usage("mkdir <name>"))?),
        "put" | "upload" => Command::Put {
            local: arg(0).ok_or(ParseError::Usage("put <local-file> [name]"))?,
            name: arg(1),
        },
        "get" | "download" => {
            let usage = ParseError::Usage("get <path> <local-file>");
            Command::Get {
                path: arg(0).ok_or(usage.clone())?,
                local: arg(1).ok_or(usage)?,
            }
        }
        "cat" => Command::Cat(arg(0).ok_or(ParseError::Usage("cat <path>"))?),
        "rm" | "del" => Command::Rm(arg(0).ok_or(ParseError::Usage("rm <path>"))?),
        "mv" | "rename" => {
            let usage = ParseError::Usage("mv <path> <new-name>");
            Command::Mv {
                path: arg(0).ok_or(usage.clone())?,
                new_name: arg(1).ok_or(usage)?,
            }
        }
        "cp" | "copy" => Command::Cp(arg(0).ok_or(ParseError::Usage("cp <path>"))?),
        "cut" => Command::Cut(arg(0).ok_or(ParseError::Usage("cut <path>"))?),
        "paste" => Command::Paste,
        "find" | "search" => Command::Find(rest(0).unwrap_or_default()),
        "link" => {
            let usage = ParseError::Usage("link <path> <url> [title]");
            Command::Link {
                path: arg(0).ok_or(usage.clone())?,
                url: arg(1).ok_or(usage)?,
                title: rest(2),
            }
        }
        "unlink" => Command::Unlink(arg(0).ok_or(ParseError::Usage("unlink <path>"))?),
        "log" | "activity" => Command::Log,
        "login" => Command::Login(arg(0).ok_or(ParseError::Usage("login <email>"))?),
        "logout" => Command::Logout,
        "whoami" => Command::Whoami,
        "settings" => Command::Settings,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// Text printed by `help`
pub const HELP: &str = "\
Navigation:
  ls [path]                 list a folder (default: current)
  cd <path>                 change folder (`..` and absolute paths work)
  up                        go to the parent folder
  pwd                       show the current folder
  find <term>               filter the current folder by name
Files:
  mkdir <name>              create a folder here
  put <local-file> [name]   upload a local file here
  get <path> <local-file>   download to a local file
  cat <path>                print a file
  rm <path>                 delete a file or folder
  mv <path> <new-name>      rename in place
  cp <path> / cut <path>    put on the clipboard
  paste                     paste the clipboard here
Links:
  link <path> <url> [title] attach a YouTube video
  unlink <path>             remove the video
Session:
  login <email> / logout / whoami
  log                       recent activity
  settings                  show effective settings
  help / quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"mv "My Docs" 'Old Docs'"#).unwrap(),
            vec!["mv", "My Docs", "Old Docs"]
        );
        assert_eq!(tokenize("  a   b ").unwrap(), vec!["a", "b"]);
        assert_eq!(tokenize(r#"put """#).unwrap(), vec!["put", ""]);
        assert_eq!(tokenize("cat 'oops"), Err(ParseError::UnterminatedQuote));
    }

    #[test]
    fn test_parse_blank_and_comment() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# note"), Ok(None));
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_line("ls"), Ok(Some(Command::Ls(None))));
        assert_eq!(
            parse_line("ls /Docs"),
            Ok(Some(Command::Ls(Some("/Docs".to_string()))))
        );
        assert_eq!(parse_line("cd"), Ok(Some(Command::Cd("/".to_string()))));
        assert_eq!(parse_line(".."), Ok(Some(Command::Up)));
    }

    #[test]
    fn test_parse_link_with_title() {
        assert_eq!(
            parse_line("link talk.pdf https://youtu.be/x Opening keynote"),
            Ok(Some(Command::Link {
                path: "talk.pdf".to_string(),
                url: "https://youtu.be/x".to_string(),
                title: Some("Opening keynote".to_string()),
            }))
        );
        assert_eq!(
            parse_line("link talk.pdf https://youtu.be/x"),
            Ok(Some(Command::Link {
                path: "talk.pdf".to_string(),
                url: "https://youtu.be/x".to_string(),
                title: None,
            }))
        );
    }

    #[test]
    fn test_parse_usage_errors() {
        assert_eq!(
            parse_line("mv onlyone"),
            Err(ParseError::Usage("mv <path> <new-name>"))
        );
        assert_eq!(parse_line("rm"), Err(ParseError::Usage("rm <path>")));
        assert!(matches!(
            parse_line("frobnicate"),
            Err(ParseError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_parse_mkdir_keeps_spaces() {
        assert_eq!(
            parse_line("mkdir Tax Returns"),
            Ok(Some(Command::Mkdir("Tax Returns".to_string())))
        );
    }
}
