use crate::shell::Route;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Expected a row number, got \"{0}\"")]
    BadIndex(String),
    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("Expected key=value, got \"{0}\"")]
    BadField(String),
}

/// `key=value` pairs separated by `;`, so values may contain spaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(pub Vec<(String, String)>);

impl Fields {
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let mut fields = Vec::new();
        for part in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((key, value)) => {
                    fields.push((key.trim().to_lowercase(), value.trim().to_string()))
                }
                // Bare words are flags, e.g. `removelogo`
                None if !part.contains(' ') => fields.push((part.to_lowercase(), String::new())),
                None => return Err(CommandError::BadField(part.to_string())),
            }
        }
        Ok(Self(fields))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Selector for the operator or category filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    All,
    None,
    One(String),
}

impl Selector {
    fn parse(arg: &str) -> Self {
        match arg {
            "all" | "*" => Selector::All,
            "none" | "-" => Selector::None,
            other => Selector::One(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Go(Route),
    Query(String),
    Submit,
    Open(usize),
    Add(Fields),
    Edit(Option<usize>, Fields),
    Delete(Option<usize>),
    Toggle(usize),
    Mark(usize),
    Sort(String),
    Operator(Selector),
    Category(Selector),
    Place(usize),
    Promo,
    Refresh,
    Help,
    Exit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "go" => Command::Go(Route::parse(required(rest, "go")?)),
            "search" | "/" => Command::Go(Route::Search),
            "numbers" => Command::Go(Route::Numbers),
            "places" => Command::Go(Route::Places),
            "settings" => Command::Go(Route::Settings),
            // Query text is passed through untouched; an empty query clears results
            "q" => Command::Query(rest.to_string()),
            "submit" => Command::Submit,
            "open" => Command::Open(index(required(rest, "open")?)?),
            "add" => Command::Add(Fields::parse(rest)?),
            "edit" => {
                let (idx, fields) = leading_index(rest)?;
                Command::Edit(idx, Fields::parse(fields)?)
            }
            "del" | "delete" => {
                if rest.is_empty() {
                    Command::Delete(None)
                } else {
                    Command::Delete(Some(index(rest)?))
                }
            }
            "toggle" | "t" => Command::Toggle(index(required(rest, "toggle")?)?),
            "mark" | "m" => Command::Mark(index(required(rest, "mark")?)?),
            "sort" => Command::Sort(required(rest, "sort")?.to_string()),
            "op" => Command::Operator(Selector::parse(required(rest, "op")?)),
            "cat" => Command::Category(Selector::parse(required(rest, "cat")?)),
            "place" => Command::Place(index(required(rest, "place")?)?),
            "promo" => Command::Promo,
            "r" | "refresh" => Command::Refresh,
            "help" | "?" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn required<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

// Rows are shown 1-based
fn index(arg: &str) -> Result<usize, CommandError> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(CommandError::BadIndex(arg.trim().to_string())),
    }
}

fn leading_index(rest: &str) -> Result<(Option<usize>, &str), CommandError> {
    let (first, tail) = match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => (first, tail),
        None => (rest, ""),
    };
    if !first.is_empty() && first.chars().all(|c| c.is_ascii_digit()) {
        Ok((Some(index(first)?), tail))
    } else {
        Ok((None, rest))
    }
}

pub const HELP: &str = "\
go <path>            open /, /numbers, /numbers/<id>, /places, /places/<id>, /settings
search|numbers|places|settings
q <text>             type into the search box
submit               offer to create what the search did not find
open <n>             open row n
add k=v; k=v         create (phone=, operator= | name=, category=, promo=, promo2=, url=, comment=, logo=)
edit [n] k=v; ...    edit the open record, or row n in settings (removelogo drops a place logo)
del [n]              delete the open record, or row n
toggle <n>           flip usage on row n and save it
mark <n>             flip usage on row n, saved or discarded when leaving the page
sort <key>           change the sort order
op all|none|<key>    operator filter
cat all|<label>      place category filter
place <n>            show/hide place n on a number page
promo                show promo codes of the open place
r                    reload the page
exit";
