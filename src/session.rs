//! Interactive session transcripts and their on-disk store.
//!
//! A [`Session`] is an ordered list of [`CommandRecord`]s plus creation and
//! update times. [`SessionStore`] serializes sessions as YAML files named
//! `<session_name>.yaml` inside the history directory.

use crate::error::{LoadError, Result, ShellError};
use crate::providers::{TimeProvider, iso_timestamp};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const SESSION_EXTENSION: &str = ".yaml";

/// One generated command and what became of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub prompt: String,
    pub command: String,
    pub timestamp: String,
    #[serde(default)]
    pub executed: bool,
    #[serde(default)]
    pub output: Option<String>,
}

impl CommandRecord {
    pub fn new(prompt: &str, command: &str, timestamp: String) -> Self {
        Self {
            prompt: prompt.to_string(),
            command: command.to_string(),
            timestamp,
            executed: false,
            output: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    commands: Vec<CommandRecord>,
    metadata: SessionMetadata,
}

impl Session {
    pub fn new(now: String) -> Self {
        Self {
            commands: Vec::new(),
            metadata: SessionMetadata {
                created_at: now.clone(),
                updated_at: now,
            },
        }
    }

    pub fn commands(&self) -> &[CommandRecord] {
        &self.commands
    }

    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Appends a record; records are never reordered or removed.
    pub fn push(&mut self, record: CommandRecord, now: String) {
        self.commands.push(record);
        self.touch(now);
    }

    pub fn touch(&mut self, now: String) {
        self.metadata.updated_at = now;
    }
}

/// What `list` shows for each saved session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub name: String,
    pub command_count: usize,
    pub created_at: String,
}

pub struct SessionStore {
    history_dir: PathBuf,
    time_provider: Arc<dyn TimeProvider>,
}

impl SessionStore {
    pub fn new(history_dir: PathBuf, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            history_dir,
            time_provider,
        }
    }

    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    /// Appends the canonical extension unless the name already carries it.
    pub fn normalize_name(name: &str) -> String {
        let name = name.trim();
        if name.ends_with(SESSION_EXTENSION) {
            name.to_string()
        } else {
            format!("{}{}", name, SESSION_EXTENSION)
        }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let file_name = Self::normalize_name(name);
        if file_name == SESSION_EXTENSION
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.starts_with('.')
        {
            return Err(ShellError::InvalidInput(format!("`{}` is not a valid session name", name)));
        }
        Ok(self.history_dir.join(file_name))
    }

    /// Picks `session_<YYYYMMDD_HHMMSS>` and suffixes it until it is unused.
    fn auto_name(&self) -> String {
        let base = format!("session_{}", self.time_provider.now().format("%Y%m%d_%H%M%S"));
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.history_dir.join(Self::normalize_name(&candidate)).exists() {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        candidate
    }

    /// Writes the whole session and returns the file it was written to.
    ///
    /// Without a name, a timestamped one is generated; an explicit name
    /// replaces any earlier session of that name.
    ///
    /// # Arguments
    ///
    /// * `session` - The transcript to persist
    /// * `name` - File stem, with or without the `.yaml` extension
    ///
    /// # Errors
    ///
    /// `InvalidInput` for names that would leave the history directory,
    /// `Persist` when the directory or file cannot be written.
    pub fn save(&self, session: &Session, name: Option<&str>) -> Result<PathBuf> {
        fs::create_dir_all(&self.history_dir)
            .map_err(|e| ShellError::persist(&self.history_dir, e))?;

        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => self.auto_name(),
        };
        let path = self.path_for(&name)?;

        let content = serde_yaml::to_string(session).map_err(|e| ShellError::persist(&path, e))?;

        // Stage next to the target so the rename stays on one filesystem.
        let staging = path.with_extension("yaml.tmp");
        fs::write(&staging, content).map_err(|e| ShellError::persist(&path, e))?;
        if let Err(e) = fs::rename(&staging, &path) {
            let _ = fs::remove_file(&staging);
            return Err(ShellError::persist(&path, e));
        }

        info!("Session saved to: {}", path.display());
        Ok(path)
    }

    /// Reads a saved session back.
    ///
    /// # Arguments
    ///
    /// * `name` - File stem, with or without the `.yaml` extension
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a name outside the history directory, otherwise a
    /// `LoadError` telling a missing file from an unreadable or malformed one.
    pub fn load(&self, name: &str) -> Result<Session> {
        let path = self.path_for(name)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                LoadError::NotFound { path: path.clone() }
            } else {
                LoadError::Unreadable {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        let session: Session = serde_yaml::from_str(&content).map_err(|e| LoadError::Malformed {
            path: path.clone(),
            source: e,
        })?;

        info!("Session loaded from: {}", path.display());
        Ok(session)
    }

    /// File names of saved sessions, sorted. A missing history directory is
    /// simply empty.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.history_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("History directory {} does not exist yet", self.history_dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut sessions: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(SESSION_EXTENSION))
            .collect();
        sessions.sort();
        Ok(sessions)
    }

    pub fn summarize(&self, name: &str) -> Result<SessionSummary> {
        let session = self.load(name)?;
        Ok(SessionSummary {
            name: Self::normalize_name(name),
            command_count: session.len(),
            created_at: display_timestamp(&session.metadata.created_at),
        })
    }

    pub fn now(&self) -> String {
        iso_timestamp(&self.time_provider.now())
    }
}

/// Renders a stored ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS`, leaving
/// anything unparseable untouched.
pub fn display_timestamp(raw: &str) -> String {
    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(FORMAT).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    /// Clock frozen at a fixed instant.
    pub(crate) struct FixedTime(pub(crate) DateTime<Local>);

    impl FixedTime {
        pub(crate) fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Self {
            Self(Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
        }
    }

    impl TimeProvider for FixedTime {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::new(
            dir.path().join("history"),
            Arc::new(FixedTime::at(2024, 5, 17, 9, 30, 15)),
        )
    }

    fn sample_session() -> Session {
        let mut session = Session::new("2024-05-17T09:00:00+00:00".to_string());
        session.push(
            CommandRecord::new("list files", "ls -la", "2024-05-17T09:01:00+00:00".to_string()),
            "2024-05-17T09:01:00+00:00".to_string(),
        );
        let mut executed = CommandRecord::new(
            "disk usage",
            "df -h | grep '/dev'",
            "2024-05-17T09:02:00+00:00".to_string(),
        );
        executed.executed = true;
        executed.output = Some("/dev/sda1  50G\n".to_string());
        session.push(executed, "2024-05-17T09:02:00+00:00".to_string());
        session
    }

    #[test]
    fn test_normalize_name_appends_extension_once() {
        assert_eq!(SessionStore::normalize_name("work"), "work.yaml");
        assert_eq!(SessionStore::normalize_name("work.yaml"), "work.yaml");
        assert_eq!(SessionStore::normalize_name(" work "), "work.yaml");
    }

    #[test]
    fn test_push_refreshes_updated_at_and_keeps_order() {
        let mut session = Session::new("t0".to_string());
        session.push(CommandRecord::new("a", "echo a", "t1".to_string()), "t1".to_string());
        session.push(CommandRecord::new("b", "echo b", "t2".to_string()), "t2".to_string());

        assert_eq!(session.metadata().created_at, "t0");
        assert_eq!(session.metadata().updated_at, "t2");
        let prompts: Vec<&str> = session.commands().iter().map(|c| c.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["a", "b"]);
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let session = sample_session();

        let path = store.save(&session, Some("roundtrip")).unwrap();
        assert_eq!(path, dir.path().join("history").join("roundtrip.yaml"));

        let loaded = store.load("roundtrip").unwrap();
        assert_eq!(loaded.commands(), session.commands());
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_load_accepts_name_with_extension() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample_session(), Some("named")).unwrap();

        assert!(store.load("named.yaml").is_ok());
    }

    #[test]
    fn test_save_without_name_uses_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let path = store.save(&sample_session(), None).unwrap();
        assert_eq!(path.file_name().unwrap(), "session_20240517_093015.yaml");

        let blank = store.save(&sample_session(), Some("  ")).unwrap();
        assert_eq!(blank.file_name().unwrap(), "session_20240517_093015_1.yaml");
    }

    #[test]
    fn test_auto_names_in_same_second_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = sample_session();
        let mut second = Session::new("later".to_string());
        second.push(CommandRecord::new("x", "echo x", "later".to_string()), "later".to_string());

        let first_path = store.save(&first, None).unwrap();
        let second_path = store.save(&second, None).unwrap();

        assert_ne!(first_path, second_path);
        let first_name = first_path.file_name().unwrap().to_str().unwrap().to_string();
        assert_eq!(store.load(&first_name).unwrap(), first);
    }

    #[test]
    fn test_explicit_names_keep_sessions_apart() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = sample_session();
        let second = Session::new("other".to_string());

        store.save(&first, Some("alpha")).unwrap();
        store.save(&second, Some("beta")).unwrap();

        assert_eq!(store.load("alpha").unwrap(), first);
        assert_eq!(store.load("beta").unwrap(), second);
    }

    #[test]
    fn test_save_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample_session(), Some("clean")).unwrap();

        let names: Vec<String> = fs::read_dir(store.history_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["clean.yaml".to_string()]);
    }

    #[test]
    fn test_save_rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.save(&sample_session(), Some("../escape")).unwrap_err();
        assert!(matches!(err, ShellError::InvalidInput(_)));
    }

    #[test]
    fn test_save_into_unwritable_location_is_persist_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();
        let store = SessionStore::new(blocker, Arc::new(FixedTime::at(2024, 1, 1, 0, 0, 0)));

        let err = store.save(&sample_session(), Some("x")).unwrap_err();
        assert!(matches!(err, ShellError::Persist { .. }));
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.load("nope").unwrap_err();
        assert!(matches!(err, ShellError::Load(LoadError::NotFound { .. })));
    }

    #[test]
    fn test_load_malformed_is_typed_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.history_dir()).unwrap();
        fs::write(store.history_dir().join("broken.yaml"), "commands: 42\nmetadata: [").unwrap();
        fs::write(store.history_dir().join("shape.yaml"), "commands:\n  - prompt: only\n").unwrap();

        let err = store.load("broken").unwrap_err();
        assert!(matches!(err, ShellError::Load(LoadError::Malformed { .. })));
        let err = store.load("shape").unwrap_err();
        assert!(matches!(err, ShellError::Load(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_empty_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.history_dir()).unwrap();
        fs::write(store.history_dir().join("notes.txt"), "not a session").unwrap();

        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_is_sorted() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        for name in ["zeta", "alpha", "mid"] {
            store.save(&sample_session(), Some(name)).unwrap();
        }

        assert_eq!(store.list().unwrap(), vec!["alpha.yaml", "mid.yaml", "zeta.yaml"]);
    }

    #[test]
    fn test_summarize_counts_commands() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample_session(), Some("summary")).unwrap();

        let summary = store.summarize("summary.yaml").unwrap();
        assert_eq!(summary.name, "summary.yaml");
        assert_eq!(summary.command_count, 2);
        assert_eq!(summary.created_at, "2024-05-17 09:00:00");
    }

    #[test]
    fn test_loads_session_with_missing_optional_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.history_dir()).unwrap();
        let yaml = "commands:
- prompt: list files
  command: ls
  timestamp: '2024-01-01T10:00:00.123456'
metadata:
  created_at: '2024-01-01T10:00:00.123456'
  updated_at: '2024-01-01T10:05:00'
";
        fs::write(store.history_dir().join("legacy.yaml"), yaml).unwrap();

        let session = store.load("legacy").unwrap();
        assert_eq!(session.len(), 1);
        assert!(!session.commands()[0].executed);
        assert!(session.commands()[0].output.is_none());
        assert_eq!(display_timestamp(&session.metadata().created_at), "2024-01-01 10:00:00");
    }

    #[test]
    fn test_display_timestamp_leaves_unknown_formats() {
        assert_eq!(display_timestamp("Unknown"), "Unknown");
    }
}
