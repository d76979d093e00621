//! Parsing console lines into user intents.
//!
//! One line is one intent: a command word followed by its arguments,
//! separated by whitespace. Command words are case-insensitive.

use std::path::PathBuf;
use std::str::FromStr;

/// Errors raised for lines that are not a valid intent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntentError {
    /// The line holds nothing but whitespace.
    #[error("empty command")]
    Empty,

    /// The command word is not recognised.
    #[error("unknown command `{0}`")]
    Unknown(String),

    /// A required argument is missing.
    #[error("`{command}` needs <{argument}>")]
    MissingArgument {
        /// The command word.
        command: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// An argument could not be parsed.
    #[error("`{command}`: `{value}` is not a valid {argument}")]
    InvalidArgument {
        /// The command word.
        command: &'static str,
        /// Name of the argument.
        argument: &'static str,
        /// The text that failed to parse.
        value: String,
    },

    /// More arguments than the command takes.
    #[error("`{0}` takes fewer arguments")]
    TooManyArguments(&'static str),
}

/// A user intent read from the console.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Enter running mode.
    Run,
    /// Enter paused mode.
    Pause,
    /// Switch between running and paused.
    Toggle,
    /// Evolve once.
    Step,
    /// Pause and clear the grid.
    Reset,
    /// Reseed the grid at the current density.
    Random,
    /// Flip the cell at a grid coordinate.
    Cell {
        /// Row.
        row: u32,
        /// Column.
        col: u32,
    },
    /// Flip the cell under a canvas pixel.
    Click {
        /// Horizontal pixel.
        x: u32,
        /// Vertical pixel.
        y: u32,
    },
    /// Change the pixels per cell.
    Size(u32),
    /// Change the evolve pacing in milliseconds.
    Speed(u64),
    /// Edit the cell-count control.
    Count(u64),
    /// Edit the density control.
    Density(f64),
    /// Re-read both snapshots.
    Refresh,
    /// Print the latest frame status.
    Status,
    /// Write the current frame to a PNG file.
    Save(PathBuf),
    /// Print the command list.
    Help,
    /// Leave the console.
    Quit,
}

/// Command list printed by `help` and after a bad line.
pub const USAGE: &str = "\
commands:
  run | pause | toggle      change run mode
  step                      evolve once
  reset                     pause and clear the grid
  random                    reseed at the current density
  cell <row> <col>          flip one cell
  click <x> <y>             flip the cell under a pixel
  size <px>                 pixels per cell
  speed <ms>                evolve pacing
  count <n>                 seed cell count (updates density)
  density <0..1>            seed density (updates count)
  refresh                   re-read the grid and species
  status                    print the latest frame
  save <path>               write the frame as PNG
  help | quit";

struct Args<'a> {
    command: &'static str,
    words: std::str::SplitWhitespace<'a>,
}

impl Args<'_> {
    fn next<T: FromStr>(&mut self, argument: &'static str) -> Result<T, IntentError> {
        let word = self.words.next().ok_or(IntentError::MissingArgument {
            command: self.command,
            argument,
        })?;
        word.parse().map_err(|_| IntentError::InvalidArgument {
            command: self.command,
            argument,
            value: word.to_owned(),
        })
    }

    fn finish(mut self, intent: Intent) -> Result<Intent, IntentError> {
        match self.words.next() {
            Some(_) => Err(IntentError::TooManyArguments(self.command)),
            None => Ok(intent),
        }
    }
}

impl FromStr for Intent {
    type Err = IntentError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let word = words.next().ok_or(IntentError::Empty)?.to_ascii_lowercase();
        let command = canonical(&word).ok_or_else(|| IntentError::Unknown(word.clone()))?;
        let mut args = Args { command, words };

        let intent = match command {
            "run" => Self::Run,
            "pause" => Self::Pause,
            "toggle" => Self::Toggle,
            "step" => Self::Step,
            "reset" => Self::Reset,
            "random" => Self::Random,
            "cell" => Self::Cell {
                row: args.next("row")?,
                col: args.next("col")?,
            },
            "click" => Self::Click {
                x: args.next("x")?,
                y: args.next("y")?,
            },
            "size" => Self::Size(args.next("px")?),
            "speed" => Self::Speed(args.next("ms")?),
            "count" => Self::Count(args.next("n")?),
            "density" => Self::Density(args.next("fraction")?),
            "refresh" => Self::Refresh,
            "status" => Self::Status,
            "save" => Self::Save(PathBuf::from(args.next::<String>("path")?)),
            "help" => Self::Help,
            _ => Self::Quit,
        };
        args.finish(intent)
    }
}

fn canonical(word: &str) -> Option<&'static str> {
    Some(match word {
        "run" | "start" => "run",
        "pause" | "stop" => "pause",
        "toggle" => "toggle",
        "step" => "step",
        "reset" | "clear" => "reset",
        "random" | "randomize" => "random",
        "cell" => "cell",
        "click" => "click",
        "size" => "size",
        "speed" => "speed",
        "count" => "count",
        "density" => "density",
        "refresh" => "refresh",
        "status" => "status",
        "save" => "save",
        "help" | "?" => "help",
        "quit" | "exit" => "quit",
        _ => return None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Intent, IntentError> {
        line.parse()
    }

    #[test]
    fn bare_commands() {
        assert_eq!(parse("run").unwrap(), Intent::Run);
        assert_eq!(parse("  PAUSE ").unwrap(), Intent::Pause);
        assert_eq!(parse("stop").unwrap(), Intent::Pause);
        assert_eq!(parse("randomize").unwrap(), Intent::Random);
        assert_eq!(parse("exit").unwrap(), Intent::Quit);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(parse("cell 3 9").unwrap(), Intent::Cell { row: 3, col: 9 });
        assert_eq!(parse("click 120 44").unwrap(), Intent::Click { x: 120, y: 44 });
        assert_eq!(parse("size 6").unwrap(), Intent::Size(6));
        assert_eq!(parse("speed 250").unwrap(), Intent::Speed(250));
        assert_eq!(parse("count 8000").unwrap(), Intent::Count(8000));
        assert_eq!(parse("density 0.35").unwrap(), Intent::Density(0.35));
        assert_eq!(
            parse("save out/frame.png").unwrap(),
            Intent::Save(PathBuf::from("out/frame.png"))
        );
    }

    #[test]
    fn bad_lines_are_described() {
        assert_eq!(parse("   ").unwrap_err(), IntentError::Empty);
        assert_eq!(
            parse("jump").unwrap_err(),
            IntentError::Unknown("jump".to_owned())
        );
        assert_eq!(
            parse("cell 3").unwrap_err(),
            IntentError::MissingArgument {
                command: "cell",
                argument: "col"
            }
        );
        assert!(matches!(
            parse("cell -1 2").unwrap_err(),
            IntentError::InvalidArgument { command: "cell", .. }
        ));
        assert_eq!(
            parse("step 2").unwrap_err(),
            IntentError::TooManyArguments("step")
        );
    }
}
