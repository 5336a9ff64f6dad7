use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    Destroy(String),
    Open(String),
    Close(usize),
    Read(usize, usize),
    /// Handle, fill byte, count.
    Write(usize, u8, usize),
    Seek(usize, usize),
    Dir,
    Init(PathBuf),
    Save(PathBuf),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0} takes {1} arguments")]
    Arity(&'static str, usize),
    #[error("{0:?} is not a non-negative number")]
    Number(String),
    #[error("expected a single character, got {0:?}")]
    Fill(String),
}

fn number(arg: &str) -> Result<usize, ParseError> {
    arg.parse().map_err(|_| ParseError::Number(arg.to_string()))
}

fn fill(arg: &str) -> Result<u8, ParseError> {
    match arg.as_bytes() {
        [b] => Ok(*b),
        _ => Err(ParseError::Fill(arg.to_string())),
    }
}

/// Parses one input line. Blank lines and unknown commands yield `Ok(None)`.
pub fn parse_command(input: &str) -> Result<Option<Command>, ParseError> {
    let tokens: Vec<&str> = input.split_ascii_whitespace().collect();
    let (cmd, args) = match tokens.split_first() {
        Some((cmd, args)) => (*cmd, args),
        None => return Ok(None),
    };

    let arity = |name: &'static str, n: usize| {
        if args.len() == n {
            Ok(())
        } else {
            Err(ParseError::Arity(name, n))
        }
    };

    let command = match cmd {
        "cr" => {
            arity("cr", 1)?;
            Command::Create(args[0].to_string())
        }
        "de" => {
            arity("de", 1)?;
            Command::Destroy(args[0].to_string())
        }
        "op" => {
            arity("op", 1)?;
            Command::Open(args[0].to_string())
        }
        "cl" => {
            arity("cl", 1)?;
            Command::Close(number(args[0])?)
        }
        "rd" => {
            arity("rd", 2)?;
            Command::Read(number(args[0])?, number(args[1])?)
        }
        "wr" => {
            arity("wr", 3)?;
            Command::Write(number(args[0])?, fill(args[1])?, number(args[2])?)
        }
        "sk" => {
            arity("sk", 2)?;
            Command::Seek(number(args[0])?, number(args[1])?)
        }
        "dr" => {
            arity("dr", 0)?;
            Command::Dir
        }
        "in" => {
            arity("in", 1)?;
            Command::Init(PathBuf::from(args[0]))
        }
        "sv" => {
            arity("sv", 1)?;
            Command::Save(PathBuf::from(args[0]))
        }
        "q" => Command::Quit,
        _ => return Ok(None),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        assert_eq!(parse_command("cr FOO"), Ok(Some(Command::Create("FOO".into()))));
        assert_eq!(parse_command("de FOO"), Ok(Some(Command::Destroy("FOO".into()))));
        assert_eq!(parse_command("op FOO"), Ok(Some(Command::Open("FOO".into()))));
        assert_eq!(parse_command("cl 1"), Ok(Some(Command::Close(1))));
        assert_eq!(parse_command("rd 1 10"), Ok(Some(Command::Read(1, 10))));
        assert_eq!(parse_command("wr 2 x 5"), Ok(Some(Command::Write(2, b'x', 5))));
        assert_eq!(parse_command("sk 3 0"), Ok(Some(Command::Seek(3, 0))));
        assert_eq!(parse_command("dr"), Ok(Some(Command::Dir)));
        assert_eq!(
            parse_command("in disk.img"),
            Ok(Some(Command::Init(PathBuf::from("disk.img"))))
        );
        assert_eq!(
            parse_command("sv disk.img"),
            Ok(Some(Command::Save(PathBuf::from("disk.img"))))
        );
        assert_eq!(parse_command("q"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn blank_and_unknown_lines_are_ignored() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   \t"), Ok(None));
        assert_eq!(parse_command("ls -l"), Ok(None));
    }

    #[test]
    fn extra_whitespace_is_tolerated() {
        assert_eq!(parse_command("  rd   1  4 "), Ok(Some(Command::Read(1, 4))));
    }

    #[test]
    fn malformed_arguments_are_errors() {
        assert_eq!(parse_command("cr"), Err(ParseError::Arity("cr", 1)));
        assert_eq!(parse_command("dr now"), Err(ParseError::Arity("dr", 0)));
        assert_eq!(parse_command("rd 1 -3"), Err(ParseError::Number("-3".into())));
        assert_eq!(parse_command("sk one 0"), Err(ParseError::Number("one".into())));
        assert_eq!(parse_command("wr 1 ab 3"), Err(ParseError::Fill("ab".into())));
    }
}
