// SPDX-License-Identifier: GPL-3.0-or-later

//! The compilation database session of one build.
//!
//! The session is created when the build starts, receives every build event
//! while the build runs, and is finished exactly once when the build ends.
//! It owns the translator and the database writer; there is no global state.

use crate::config;
use crate::event::BuildEvent;
use crate::output::{DatabaseWriter, Publication, WriterError};
use crate::translate::{TranslateError, Translator};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Represents the errors which abort the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error(transparent)]
    Writer(#[from] WriterError),
}

/// Statistics collected during the session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStatistics {
    /// Number of build events received.
    pub events_received: usize,
    /// Number of events which produced at least one entry.
    pub invocations_translated: usize,
    /// Number of compiler invocations skipped because of splitting failures.
    pub invocations_skipped: usize,
    /// Number of entries written to the database.
    pub entries_written: usize,
}

impl fmt::Display for SessionStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session statistics:")?;
        writeln!(f, "  Build events received: {}", self.events_received)?;
        writeln!(f, "  Invocations translated: {}", self.invocations_translated)?;
        writeln!(f, "  Invocations skipped: {}", self.invocations_skipped)?;
        write!(f, "  Entries written: {}", self.entries_written)
    }
}

pub struct Session {
    translator: Translator,
    writer: DatabaseWriter,
    stats: SessionStatistics,
}

impl Session {
    /// Start the session: opens the output database.
    ///
    /// Failing to create the output is fatal, it is not retried.
    pub fn open(config: &config::Main, output: &Path) -> Result<Self, SessionError> {
        let translator = Translator::from(config);
        Self::with_translator(translator, output)
    }

    pub fn with_translator(translator: Translator, output: &Path) -> Result<Self, SessionError> {
        let writer = DatabaseWriter::open(output)?;
        Ok(Self { translator, writer, stats: SessionStatistics::default() })
    }

    /// Translate the event and append the resulting entries to the database.
    ///
    /// Invocations which can't be split are skipped. A malformed compiler
    /// invocation or an output failure aborts the session.
    pub fn handle(&mut self, event: &BuildEvent) -> Result<usize, SessionError> {
        log::debug!("{event}");
        self.stats.events_received += 1;

        let entries = match self.translator.translate(
            &event.task_name,
            &event.command_line,
            event.project_directory(),
        ) {
            Ok(entries) => entries,
            Err(TranslateError::Split(err)) => {
                log::warn!("Invocation skipped: {err}");
                self.stats.invocations_skipped += 1;
                return Ok(0);
            }
            Err(err) => return Err(err.into()),
        };

        if !entries.is_empty() {
            self.stats.invocations_translated += 1;
        }
        for entry in &entries {
            self.writer.append(entry)?;
        }
        self.stats.entries_written = self.writer.written();

        Ok(entries.len())
    }

    pub fn statistics(&self) -> &SessionStatistics {
        &self.stats
    }

    /// Finish the session: closes and publishes the database.
    pub fn finish(self) -> Result<Publication, SessionError> {
        log::info!("{}", self.stats);
        let publication = self.writer.close()?;
        match &publication {
            Publication::Published(path) => {
                log::info!("Compilation database written: {}", path.display())
            }
            Publication::Preserved { temporary, .. } => {
                log::info!("Compilation database written: {}", temporary.display())
            }
        }
        Ok(publication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Entry;
    use std::fs;
    use tempfile::tempdir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn translator() -> Translator {
        Translator::from(&config::Main::default())
            .with_file_check(|path| path.starts_with("C:/proj/") || path.starts_with(r"C:\proj\"))
    }

    #[test]
    fn test_session_writes_entries_of_compiler_tasks() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("compile_commands.json");

        let mut sut = Session::with_translator(translator(), &output).unwrap();
        let written = sut
            .handle(&BuildEvent::new(
                "CL",
                r"C:\VS\cl.exe /c /I C:\proj\inc /Tp C:\proj\a.cpp C:\proj\b.c",
                r"C:\proj\app.vcxproj",
            ))
            .unwrap();
        assert_eq!(written, 2);
        let written = sut
            .handle(&BuildEvent::new("Link", "link.exe C:/proj/a.obj", r"C:\proj\app.vcxproj"))
            .unwrap();
        assert_eq!(written, 0);

        let expected_stats = SessionStatistics {
            events_received: 2,
            invocations_translated: 1,
            invocations_skipped: 0,
            entries_written: 2,
        };
        assert_eq!(sut.statistics(), &expected_stats);

        let publication = sut.finish().unwrap();
        assert_eq!(publication, Publication::Published(output.clone()));

        let content = fs::read_to_string(&output).unwrap();
        let entries: Vec<Entry> = serde_json::from_str(&content).unwrap();
        assert_eq!(
            entries,
            vec![
                Entry::new(
                    "C:/proj",
                    strings(&["clang++.exe", "-I", "C:/proj/inc", "C:/proj/a.cpp"]),
                    "C:/proj/a.cpp"
                ),
                Entry::new(
                    "C:/proj",
                    strings(&["clang.exe", "-I", "C:/proj/inc", "C:/proj/b.c"]),
                    "C:/proj/b.c"
                ),
            ]
        );
    }

    #[test]
    fn test_session_skips_split_failures() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("compile_commands.json");

        let mut sut = Session::with_translator(translator(), &output).unwrap();
        let written = sut
            .handle(&BuildEvent::new("CL", "cl.exe /c\0 C:/proj/a.cpp", "C:/proj/app.vcxproj"))
            .unwrap();

        assert_eq!(written, 0);
        assert_eq!(sut.statistics().invocations_skipped, 1);
        sut.finish().unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "[\n]\n");
    }

    #[test]
    fn test_session_aborts_on_malformed_invocation() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("compile_commands.json");

        let mut sut = Session::with_translator(translator(), &output).unwrap();
        let event = BuildEvent::new("CL", "gcc -c C:/proj/a.cpp", "C:/proj/app.vcxproj");
        let result = sut.handle(&event);

        assert!(matches!(
            result,
            Err(SessionError::Translate(TranslateError::MalformedInvocation { .. }))
        ));
        drop(sut);
        assert!(!output.exists());
    }

    #[test]
    fn test_session_open_fails_without_directory() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("missing").join("compile_commands.json");

        let result = Session::open(&config::Main::default(), &output);

        assert!(matches!(result, Err(SessionError::Writer(WriterError::Create(_, _)))));
    }
}
