use std::path::PathBuf;

use log::LevelFilter;

use crate::{logging::parse_level, util::DEFAULT_EDITOR};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Initial directory (`-path`), current directory when absent
    pub start_path: Option<PathBuf>,
    /// Editor command line (`-editor`, then `$EDITOR`, then vim)
    pub editor: String,
    /// Diagnostic render mode (`-debug`)
    pub debug: bool,
    /// Leading `-l`: reserved for restoring the last session, currently inert
    pub restore_last: bool,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_path: None,
            editor: DEFAULT_EDITOR.to_owned(),
            debug: false,
            restore_last: false,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Build the configuration from the process arguments and environment.
    pub fn from_env() -> Self {
        Self::parse(
            std::env::args().skip(1),
            std::env::var("EDITOR").ok(),
            std::env::var("TFILES_LOG").ok(),
        )
    }

    /// `args` excludes the program name. Unknown arguments and flags missing
    /// their value are ignored.
    pub fn parse<I>(args: I, env_editor: Option<String>, env_log: Option<String>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        if let Some(editor) = env_editor.filter(|e| !e.trim().is_empty()) {
            config.editor = editor;
        }
        if let Some(level) = env_log.as_deref().and_then(parse_level) {
            config.log_level = level;
        }

        let mut args = args.into_iter().peekable();
        if args.peek().map(String::as_str) == Some("-l") {
            config.restore_last = true;
            args.next();
        }

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-path" => {
                    if let Some(path) = args.next() {
                        config.start_path = Some(PathBuf::from(path));
                    }
                }
                "-editor" => {
                    if let Some(editor) = args.next() {
                        config.editor = editor;
                    }
                }
                "-debug" => {
                    config.debug = true;
                    if config.log_level < LevelFilter::Debug {
                        config.log_level = LevelFilter::Debug;
                    }
                }
                _ => {}
            }
        }

        config
    }

    /// Editor program and its leading arguments, e.g. `code -w`
    pub fn editor_command(&self) -> (String, Vec<String>) {
        let mut parts = self.editor.split_whitespace().map(str::to_owned);
        let program = parts.next().unwrap_or_else(|| DEFAULT_EDITOR.to_owned());
        (program, parts.collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse(args(&[]), None, None);
        assert_eq!(config, Config::default());
        assert_eq!(config.editor, "vim");
    }

    #[test]
    fn test_editor_precedence() {
        let from_env = Config::parse(args(&[]), Some("nano".into()), None);
        assert_eq!(from_env.editor, "nano");

        let from_flag = Config::parse(args(&["-editor", "hx"]), Some("nano".into()), None);
        assert_eq!(from_flag.editor, "hx");
    }

    #[test]
    fn test_all_flags() {
        let config = Config::parse(
            args(&["-l", "-path", "/tmp", "-debug", "-editor", "code -w"]),
            None,
            Some("warn".into()),
        );
        assert!(config.restore_last);
        assert!(config.debug);
        assert_eq!(config.start_path, Some(PathBuf::from("/tmp")));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(
            config.editor_command(),
            ("code".to_owned(), vec!["-w".to_owned()])
        );
    }

    #[test]
    fn test_l_only_counts_when_leading() {
        let config = Config::parse(args(&["-debug", "-l"]), None, None);
        assert!(!config.restore_last);
    }

    #[test]
    fn test_missing_values_are_ignored() {
        let config = Config::parse(args(&["-path"]), None, Some("bogus".into()));
        assert_eq!(config.start_path, None);
        assert_eq!(config.log_level, LevelFilter::Info);

        let config = Config::parse(args(&["-editor"]), None, None);
        assert_eq!(config.editor, "vim");
    }
}
