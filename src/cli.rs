use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None, name = "market", bin_name = "market")]
pub struct Cli {
    /// Path to the SQLite database file (default: OS config dir).
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Path to the log file (default: OS config dir).
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,
    /// Increase log verbosity (use -vv for trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    /// Log errors only.
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parses_path_overrides() {
        let cli = Cli::parse_from(["market", "--db", "/tmp/list.sqlite3", "--log", "/tmp/l.log"]);
        assert_eq!(cli.db.as_deref(), Some(Path::new("/tmp/list.sqlite3")));
        assert_eq!(cli.log.as_deref(), Some(Path::new("/tmp/l.log")));
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn counts_verbosity() {
        let cli = Cli::parse_from(["market", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
