use std::fmt::Display;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::fs::{join_path, FileTree};
use crate::scheduler::Scheduler;
use crate::shell::command::{Command, FsCommand};

/// Result of handling one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text to print (may be empty)
    Output(String),
    /// The line was queued as a job with this id
    Submitted(u64),
    /// The session should end
    Quit,
}

impl Reply {
    pub fn text(&self) -> String {
        match self {
            Reply::Output(text) => text.clone(),
            Reply::Submitted(id) => format!("Process ID {} queued", id),
            Reply::Quit => String::new(),
        }
    }
}

/// Routes parsed lines to the scheduler or the file tree.
///
/// Shared by the interactive session and batch mode so both see the same
/// grammar and produce the same replies.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    scheduler: Scheduler,
    tree: Arc<RwLock<FileTree>>,
    output: OutputFormat,
}

impl Dispatcher {
    pub fn new(scheduler: Scheduler, tree: Arc<RwLock<FileTree>>, output: OutputFormat) -> Self {
        Self {
            scheduler,
            tree,
            output,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn tree(&self) -> &Arc<RwLock<FileTree>> {
        &self.tree
    }

    /// Parse and execute one input line.
    pub async fn dispatch(&self, line: &str) -> Result<Reply> {
        let command = Command::parse(line)?;
        self.execute(command).await
    }

    pub async fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::Quit => Ok(Reply::Quit),
            Command::Exec(line) => Ok(Reply::Submitted(self.scheduler.submit(line).await)),
            Command::Procs { detailed } => {
                let jobs = self.scheduler.list_jobs().await;
                let text = match self.output {
                    OutputFormat::Json => serde_json::to_string_pretty(&jobs)?,
                    OutputFormat::Table => {
                        let mut text = String::from("List of processes:");
                        for job in &jobs {
                            text.push('\n');
                            text.push_str(&job.describe(detailed));
                        }
                        text
                    }
                };
                Ok(Reply::Output(text))
            }
            Command::Info(id) => {
                let job = self.scheduler.get_job(id).await?;
                let text = match self.output {
                    OutputFormat::Json => serde_json::to_string_pretty(&job)?,
                    OutputFormat::Table => job.describe(true),
                };
                Ok(Reply::Output(text))
            }
            Command::Priority { id, priority } => {
                self.scheduler.set_priority(id, priority).await?;
                Ok(Reply::Output(format!(
                    "Process ID {} priority changed to {}",
                    id, priority
                )))
            }
            Command::Fs(command) => self.execute_fs(command).await.map(Reply::Output),
        }
    }

    async fn execute_fs(&self, command: FsCommand) -> Result<String> {
        match command {
            FsCommand::Mkdir { path, name } => {
                let created = self.tree.write().await.create_directory(&path, &name)?;
                Ok(format!("Directory created: {}", created))
            }
            FsCommand::Rename { path, new_name } => {
                let renamed = self.tree.write().await.rename_directory(&path, &new_name)?;
                Ok(format!("Directory renamed to: {}", renamed))
            }
            FsCommand::Rmdir { path, recursive } => {
                self.tree.write().await.delete_directory(&path, recursive)?;
                Ok(format!("Directory deleted: {}", path))
            }
            FsCommand::Touch { path, name, size } => {
                let created = self.tree.write().await.create_file(&path, &name, size)?;
                Ok(format!("File created: {} ({} bytes)", created, size))
            }
            FsCommand::Rm { path, name } => {
                self.tree.write().await.delete_file(&path, &name)?;
                Ok(format!("File deleted: {}", join_path(&path, &name)))
            }
            FsCommand::MvFile { src, name, dest } => {
                let moved = self.tree.write().await.move_file(&src, &name, &dest)?;
                Ok(format!("File moved to: {}", moved))
            }
            FsCommand::CpFile {
                path,
                name,
                new_name,
            } => {
                let copied = self
                    .tree
                    .write()
                    .await
                    .duplicate_file(&path, &name, &new_name)?;
                Ok(format!("File copied to: {}", copied))
            }
            FsCommand::CpDir { src, dest } => {
                let copied = self.tree.write().await.duplicate_directory(&src, &dest)?;
                Ok(format!("Directory copied to: {}", copied))
            }
            FsCommand::Ls { path } => {
                let listing = self.tree.read().await.list_directory(&path)?;
                self.render(&listing)
            }
            FsCommand::Tree { path } => {
                let view = self.tree.read().await.display_tree(&path)?;
                self.render(&view)
            }
            FsCommand::Search { path, name } => {
                let hits = self.tree.read().await.search_file(&path, &name)?;
                match self.output {
                    OutputFormat::Json => Ok(serde_json::to_string_pretty(&hits)?),
                    OutputFormat::Table if hits.is_empty() => {
                        Ok(format!("No file named {} under {}", name, path))
                    }
                    OutputFormat::Table => Ok(hits
                        .iter()
                        .map(|hit| format!("Found: {} ({} bytes)", hit.path, hit.size))
                        .collect::<Vec<_>>()
                        .join("\n")),
                }
            }
            FsCommand::FileInfo {
                path,
                name,
                detailed,
            } => {
                let info = self.tree.read().await.file_info(&path, &name, detailed)?;
                self.render(&info)
            }
            FsCommand::DirInfo { path, detailed } => {
                let info = self.tree.read().await.dir_info(&path, detailed)?;
                self.render(&info)
            }
        }
    }

    fn render<T: Serialize + Display>(&self, value: &T) -> Result<String> {
        match self.output {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Table => Ok(value.to_string()),
        }
    }
}
