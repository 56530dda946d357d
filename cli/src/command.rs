use anyhow::{Context, anyhow, bail};
use minesweep_core::{Coord, Coord2, GameConfig};
use std::str::FromStr;

/// One line of driver input.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    NewGame(Option<GameConfig>),
    Reveal(Coord2),
    Flag(Coord2),
    Load(String),
    Reset,
    Time(u32),
    Pause,
    Resume,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  new [ROWS COLS MINES]   start a game, default size when no numbers given
  reveal ROW COL  (r)     open a cell
  flag ROW COL    (f)     toggle a flag
  load PATH               load a saved game from a JSON file
  reset                   forget the saved game
  time SECS               record elapsed seconds
  pause | resume          record paused state
  show                    print the board
  help | quit";

fn parse_num<T: FromStr>(word: Option<&str>, what: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let word = word.ok_or_else(|| anyhow!("missing {what}"))?;
    word.parse().with_context(|| format!("invalid {what}: {word:?}"))
}

fn parse_coords<'a>(words: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<Coord2> {
    let row: Coord = parse_num(words.next(), "row")?;
    let col: Coord = parse_num(words.next(), "column")?;
    Ok((row, col))
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            bail!("empty command");
        };

        let command = match name {
            "new" | "n" => match words.next() {
                None => Command::NewGame(None),
                first => {
                    let rows = parse_num(first, "rows")?;
                    let cols = parse_num(words.next(), "columns")?;
                    let mines = parse_num(words.next(), "mines")?;
                    Command::NewGame(Some(GameConfig::new((rows, cols), mines)?))
                }
            },
            "reveal" | "r" => Command::Reveal(parse_coords(&mut words)?),
            "flag" | "f" => Command::Flag(parse_coords(&mut words)?),
            "load" => Command::Load(
                words
                    .next()
                    .ok_or_else(|| anyhow!("missing path"))?
                    .to_string(),
            ),
            "reset" => Command::Reset,
            "time" => Command::Time(parse_num(words.next(), "seconds")?),
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "show" | "s" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => bail!("unknown command {other:?}, try `help`"),
        };

        if let Some(extra) = words.next() {
            bail!("unexpected argument {extra:?}");
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves() {
        assert_eq!("r 3 4".parse::<Command>().unwrap(), Command::Reveal((3, 4)));
        assert_eq!(
            "  flag 0 12 ".parse::<Command>().unwrap(),
            Command::Flag((0, 12))
        );
    }

    #[test]
    fn parses_new_game() {
        assert_eq!("new".parse::<Command>().unwrap(), Command::NewGame(None));
        assert_eq!(
            "new 9 9 10".parse::<Command>().unwrap(),
            Command::NewGame(Some(GameConfig::beginner()))
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!("".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
        assert!("reveal 1".parse::<Command>().is_err());
        assert!("reveal 1 300".parse::<Command>().is_err());
        assert!("reveal 1 2 3".parse::<Command>().is_err());
        // mines must leave at least one free cell
        assert!("new 3 3 9".parse::<Command>().is_err());
    }
}
