use crate::error::{Result, ShellError};

/// File-tree verbs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCommand {
    Mkdir { path: String, name: String },
    Rename { path: String, new_name: String },
    Rmdir { path: String, recursive: bool },
    Touch { path: String, name: String, size: u64 },
    Rm { path: String, name: String },
    Ls { path: String },
    MvFile { src: String, name: String, dest: String },
    CpFile { path: String, name: String, new_name: String },
    CpDir { src: String, dest: String },
    Search { path: String, name: String },
    Tree { path: String },
    FileInfo { path: String, name: String, detailed: bool },
    DirInfo { path: String, detailed: bool },
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Procs { detailed: bool },
    Info(u64),
    Priority { id: u64, priority: i32 },
    Fs(FsCommand),
    /// Anything else is a shell command line to schedule as a job.
    Exec(String),
}

impl Command {
    /// Parse a line into a command.
    ///
    /// Arguments are whitespace-separated and positional. A known verb with
    /// the wrong arguments is a usage error; an unknown verb is a job.
    ///
    /// Lines such as `ls`, `procs -x` or `quit now` are therefore rejected
    /// rather than queued as shell commands. Prefix them with a shell
    /// builtin (e.g. `command ls`) to run a program that shares a verb's name.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = tokens.split_first() else {
            return Err(ShellError::Usage("empty command".to_string()));
        };

        let command = match (verb, args) {
            ("quit", []) => Command::Quit,
            ("procs", []) => Command::Procs { detailed: false },
            ("procs", ["-a"]) => Command::Procs { detailed: true },
            ("info", [id]) => Command::Info(parse_number(id, "info <id>")?),
            ("priority", [id, value]) => Command::Priority {
                id: parse_number(id, "priority <id> <value>")?,
                priority: parse_number(value, "priority <id> <value>")?,
            },
            ("mkdir", [path, name]) => Command::Fs(FsCommand::Mkdir {
                path: path.to_string(),
                name: name.to_string(),
            }),
            ("rename", [path, new_name]) => Command::Fs(FsCommand::Rename {
                path: path.to_string(),
                new_name: new_name.to_string(),
            }),
            ("rmdir", ["-r", path]) => Command::Fs(FsCommand::Rmdir {
                path: path.to_string(),
                recursive: true,
            }),
            ("rmdir", [path]) => Command::Fs(FsCommand::Rmdir {
                path: path.to_string(),
                recursive: false,
            }),
            ("touch", [path, name, size]) => Command::Fs(FsCommand::Touch {
                path: path.to_string(),
                name: name.to_string(),
                size: parse_number(size, "touch <path> <name> <size>")?,
            }),
            ("rm", [path, name]) => Command::Fs(FsCommand::Rm {
                path: path.to_string(),
                name: name.to_string(),
            }),
            ("ls", [path]) => Command::Fs(FsCommand::Ls {
                path: path.to_string(),
            }),
            ("mvfile", [src, name, dest]) => Command::Fs(FsCommand::MvFile {
                src: src.to_string(),
                name: name.to_string(),
                dest: dest.to_string(),
            }),
            ("cpfile", [path, name, new_name]) => Command::Fs(FsCommand::CpFile {
                path: path.to_string(),
                name: name.to_string(),
                new_name: new_name.to_string(),
            }),
            ("cpdir", [src, dest]) => Command::Fs(FsCommand::CpDir {
                src: src.to_string(),
                dest: dest.to_string(),
            }),
            ("search", [path, name]) => Command::Fs(FsCommand::Search {
                path: path.to_string(),
                name: name.to_string(),
            }),
            ("tree", [path]) => Command::Fs(FsCommand::Tree {
                path: path.to_string(),
            }),
            ("fileinfo", ["-d", path, name]) => Command::Fs(FsCommand::FileInfo {
                path: path.to_string(),
                name: name.to_string(),
                detailed: true,
            }),
            ("fileinfo", [path, name]) => Command::Fs(FsCommand::FileInfo {
                path: path.to_string(),
                name: name.to_string(),
                detailed: false,
            }),
            ("dirinfo", ["-d", path]) => Command::Fs(FsCommand::DirInfo {
                path: path.to_string(),
                detailed: true,
            }),
            ("dirinfo", [path]) => Command::Fs(FsCommand::DirInfo {
                path: path.to_string(),
                detailed: false,
            }),
            (verb, _) => match usage(verb) {
                Some(text) => return Err(ShellError::Usage(text.to_string())),
                None => Command::Exec(line.to_string()),
            },
        };
        Ok(command)
    }
}

/// Expected form of each built-in verb
fn usage(verb: &str) -> Option<&'static str> {
    let text = match verb {
        "quit" => "quit",
        "procs" => "procs [-a]",
        "info" => "info <id>",
        "priority" => "priority <id> <value>",
        "mkdir" => "mkdir <path> <name>",
        "rename" => "rename <path> <newName>",
        "rmdir" => "rmdir [-r] <path>",
        "touch" => "touch <path> <name> <size>",
        "rm" => "rm <path> <name>",
        "ls" => "ls <path>",
        "mvfile" => "mvfile <srcPath> <name> <destPath>",
        "cpfile" => "cpfile <path> <name> <newName>",
        "cpdir" => "cpdir <srcPath> <destPath>",
        "search" => "search <path> <name>",
        "tree" => "tree <path>",
        "fileinfo" => "fileinfo [-d] <path> <name>",
        "dirinfo" => "dirinfo [-d] <path>",
        _ => return None,
    };
    Some(text)
}

fn parse_number<T: std::str::FromStr>(token: &str, form: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| ShellError::Usage(format!("{} ('{}' is not a valid number)", form, token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_admin_verbs() {
        assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
        assert_eq!(
            Command::parse("procs").unwrap(),
            Command::Procs { detailed: false }
        );
        assert_eq!(
            Command::parse("procs -a").unwrap(),
            Command::Procs { detailed: true }
        );
        assert_eq!(Command::parse("info 12").unwrap(), Command::Info(12));
        assert_eq!(
            Command::parse("priority 3 -2").unwrap(),
            Command::Priority { id: 3, priority: -2 }
        );
    }

    #[test]
    fn parses_rmdir_flag() {
        assert_eq!(
            Command::parse("rmdir -r /docs").unwrap(),
            Command::Fs(FsCommand::Rmdir {
                path: "/docs".to_string(),
                recursive: true
            })
        );
        assert_eq!(
            Command::parse("rmdir /docs").unwrap(),
            Command::Fs(FsCommand::Rmdir {
                path: "/docs".to_string(),
                recursive: false
            })
        );
    }

    #[test]
    fn parses_info_flags() {
        assert_eq!(
            Command::parse("fileinfo -d /docs a.txt").unwrap(),
            Command::Fs(FsCommand::FileInfo {
                path: "/docs".to_string(),
                name: "a.txt".to_string(),
                detailed: true
            })
        );
        assert_eq!(
            Command::parse("dirinfo /docs").unwrap(),
            Command::Fs(FsCommand::DirInfo {
                path: "/docs".to_string(),
                detailed: false
            })
        );
    }

    #[test]
    fn parses_touch_size() {
        assert_eq!(
            Command::parse("touch / a.txt 120").unwrap(),
            Command::Fs(FsCommand::Touch {
                path: "/".to_string(),
                name: "a.txt".to_string(),
                size: 120
            })
        );
        assert!(matches!(
            Command::parse("touch / a.txt big"),
            Err(ShellError::Usage(_))
        ));
        assert!(matches!(
            Command::parse("touch / a.txt -5"),
            Err(ShellError::Usage(_))
        ));
    }

    #[test]
    fn unknown_verbs_are_jobs() {
        assert_eq!(
            Command::parse("  sleep 5  ").unwrap(),
            Command::Exec("sleep 5".to_string())
        );
        assert_eq!(
            Command::parse("echo 'a  b' | wc -c").unwrap(),
            Command::Exec("echo 'a  b' | wc -c".to_string())
        );
        assert_eq!(
            Command::parse("command ls -l").unwrap(),
            Command::Exec("command ls -l".to_string())
        );
    }

    #[test]
    fn known_verbs_with_wrong_arity_are_usage_errors() {
        for line in ["ls", "mkdir /", "info", "priority 1", "procs -x", "cpdir /a", "quit now"] {
            assert!(
                matches!(Command::parse(line), Err(ShellError::Usage(_))),
                "expected usage error for {:?}",
                line
            );
        }
    }

    #[test]
    fn blank_line_is_rejected() {
        assert!(matches!(Command::parse("   "), Err(ShellError::Usage(_))));
    }
}
