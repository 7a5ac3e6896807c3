//! Command-line options for `pn`.
//! `--net {file}` or `-n` is required; everything else is optional.

use clap::{Arg, Command};
use std::error::Error;
use std::path::PathBuf;

use crate::net::Format;

fn make_options_parser() -> clap::Command {
    Command::new("pn")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Step a Petri net forward and backward")
        .arg(
            Arg::new("net")
                .short('n')
                .long("net")
                .value_name("FILE")
                .help("Net description (.json or .ron)")
                .required(true),
        )
        .arg(
            Arg::new("marking")
                .short('m')
                .long("marking")
                .value_name("FILE")
                .help("Initial marking, overrides the `state` embedded in the net file"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value("pn.toml"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Format for files without a .json/.ron extension")
                .value_parser(["json", "ron"]),
        )
        .arg(
            Arg::new("script")
                .short('s')
                .long("script")
                .value_name("COMMANDS")
                .help("Commands to run instead of reading stdin, e.g. \"t1 t0 undo seq\" or \"fire undo\""),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub net: PathBuf,
    pub marking: Option<PathBuf>,
    pub config: PathBuf,
    pub format: Option<Format>,
    pub script: Option<String>,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, Box<dyn Error>> {
        let matches = make_options_parser().try_get_matches_from(flags.iter())?;
        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("json") => Some(Format::Json),
            Some("ron") => Some(Format::Ron),
            None => None,
            Some(other) => return Err(format!("unsupported format `{other}`").into()),
        };
        let path = |id: &str| matches.get_one::<String>(id).map(PathBuf::from);

        Ok(Options {
            net: path("net").ok_or("missing --net")?,
            marking: path("marking"),
            config: path("config").unwrap_or_else(|| PathBuf::from("pn.toml")),
            format,
            script: matches.get_one::<String>("script").cloned(),
        })
    }
}

/// One interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Fire(String),
    Undo,
    Redo,
    Sequence,
    Marking,
    Enabled,
    Reset,
    Quit,
}

impl Step {
    pub fn parse(word: &str) -> Self {
        match word {
            "undo" => Step::Undo,
            "redo" => Step::Redo,
            "seq" => Step::Sequence,
            "marking" => Step::Marking,
            "enabled" => Step::Enabled,
            "reset" => Step::Reset,
            "quit" | "exit" => Step::Quit,
            name => Step::Fire(name.to_owned()),
        }
    }

    /// Splits a line into steps with shell quoting rules, so quoted transition names may
    /// contain spaces.
    ///
    /// `fire <name>` always fires, which reaches transitions named like a command
    /// (`fire undo`).
    pub fn parse_line(line: &str) -> Result<Vec<Self>, Box<dyn Error>> {
        let words = shellwords::split(line)?;
        let mut words = words.into_iter();
        let mut steps = Vec::new();
        while let Some(word) = words.next() {
            let step = if word == "fire" {
                let name = words.next().ok_or("`fire` needs a transition name")?;
                Step::Fire(name)
            } else {
                Self::parse(&word)
            };
            steps.push(step);
        }
        Ok(steps)
    }
}
