// SPDX-License-Identifier: GPL-3.0-or-later

//! The build events delivered by the host build tool.
//!
//! An event is one task command line reported by the build. The events are
//! read as a stream of JSON objects (one object per line), like:
//!
//! ```json
//! {"task_name":"CL","command_line":"cl.exe /c C:\\main.cpp","project_file":"C:\\app.vcxproj"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::de::IoRead;
use serde_json::StreamDeserializer;
use std::fmt;
use std::io;
use thiserror::Error;

/// A command line reported by a build task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEvent {
    /// The name of the build task which run the command.
    pub task_name: String,
    /// The full command line, executable included.
    pub command_line: String,
    /// The project file which declared the task.
    pub project_file: String,
}

impl BuildEvent {
    pub fn new(
        task_name: impl Into<String>,
        command_line: impl Into<String>,
        project_file: impl Into<String>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            command_line: command_line.into(),
            project_file: project_file.into(),
        }
    }

    /// The directory of the project file.
    ///
    /// Both path separators are accepted, because the project file path comes
    /// from a Windows build but might be processed on any host.
    pub fn project_directory(&self) -> &str {
        match self.project_file.rfind(['/', '\\']) {
            Some(0) => &self.project_file[..1],
            Some(index) => &self.project_file[..index],
            None => "",
        }
    }
}

impl fmt::Display for BuildEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event task={}, command={}", self.task_name, self.command_line)
    }
}

#[derive(Debug, Error)]
#[error("Failed to read build event: {0}")]
pub struct EventError(#[from] serde_json::Error);

/// Read the build events from the JSON stream.
pub fn read(reader: impl io::Read) -> impl Iterator<Item = Result<BuildEvent, EventError>> {
    StreamDeserializer::new(IoRead::new(reader)).map(|value| value.map_err(EventError::from))
}
