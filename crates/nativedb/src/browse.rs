//! Interactive browse loop
//!
//! Reads one command per line and keeps a current group and filter between
//! commands, the way a two-pane browser keeps its selection:
//!
//! - `groups` lists groups matching the current filter
//! - `open GROUP` selects a group and lists its records
//! - `filter TEXT` changes the filter (empty clears it) and redraws
//! - `search TEXT` lists matching records across all groups
//! - `show KEY` prints one record
//! - `reload` rebuilds the index from the sources
//! - `quit` ends the loop

use crate::config::Config;
use crate::output::{self, OutputFormat};
use crate::{query_for, suggest_group};
use eyre::{Result, WrapErr};
use nativedb_core::{CatalogIndex, LoadStats, PathSources, Session};
use owo_colors::OwoColorize;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::debug;

/// Whether the loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Browser state over one [`Session`]
pub struct Browser {
    session: Session,
    sources: PathSources,
    config: Config,
    format: OutputFormat,
    verbose: bool,
    group: Option<String>,
    filter: String,
}

impl Browser {
    pub fn new(
        sources: PathSources,
        config: Config,
        format: OutputFormat,
        verbose: bool,
    ) -> Self {
        Self {
            session: Session::new(),
            sources,
            config,
            format,
            verbose,
            group: None,
            filter: String::new(),
        }
    }

    /// Run the full pipeline over the sources and swap the result in.
    pub fn load(&mut self) -> Result<LoadStats> {
        self.session
            .load(self.sources.clone())
            .wrap_err("Failed to load sources")
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The currently opened group
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Read commands until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line.wrap_err("Failed to read command")?;
            if self.execute(&line, &mut out)? == Flow::Quit {
                break;
            }
            out.flush()?;
        }
        Ok(())
    }

    /// Execute one command line.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!(command, argument = rest, "browse command");

        match command {
            "" => {}
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "help" => writeln!(
                out,
                "commands: groups, open GROUP, filter TEXT, search TEXT, show KEY, reload, quit"
            )?,
            "reload" => self.reload(out)?,
            "groups" => {
                self.group = None;
                self.redraw(out)?;
            }
            "open" if rest.is_empty() => writeln!(out, "usage: open GROUP")?,
            "open" => {
                self.group = Some(rest.to_string());
                self.redraw(out)?;
            }
            "filter" => {
                self.filter = rest.to_string();
                self.redraw(out)?;
            }
            "search" => {
                let Some(index) = self.snapshot(out)? else {
                    return Ok(Flow::Continue);
                };
                let matches = index.list_all_records(&query_for(&self.config, rest));
                let rendered = output::render_matches(&matches, self.format, self.verbose)?;
                out.write_all(rendered.as_bytes())?;
            }
            "show" if rest.is_empty() => writeln!(out, "usage: show KEY")?,
            "show" => {
                let Some(index) = self.snapshot(out)? else {
                    return Ok(Flow::Continue);
                };
                match index.get_by_key(rest) {
                    Some(record) => {
                        out.write_all(output::render_record(record, self.format)?.as_bytes())?
                    }
                    None => writeln!(out, "not found: {}", rest)?,
                }
            }
            other => writeln!(out, "unknown command '{}' (try help)", other)?,
        }
        Ok(Flow::Continue)
    }

    fn snapshot(&self, out: &mut impl Write) -> Result<Option<Arc<CatalogIndex>>> {
        let snapshot = self.session.snapshot();
        if snapshot.is_none() {
            writeln!(out, "nothing loaded (try reload)")?;
        }
        Ok(snapshot)
    }

    /// Show the current view: the opened group, or the group list
    fn redraw(&self, out: &mut impl Write) -> Result<()> {
        let Some(index) = self.snapshot(out)? else {
            return Ok(());
        };
        let query = query_for(&self.config, &self.filter);

        let rendered = match &self.group {
            Some(group) => {
                if !index.has_group(group)
                    && let Some(close) = suggest_group(&index, group)
                {
                    writeln!(out, "no group '{}', did you mean '{}'?", group, close)?;
                    return Ok(());
                }
                let records = index.list_records_in_group(group, &query);
                output::render_group(group, &records, self.format, self.verbose)?
            }
            None => output::render_groups(&index.group_summaries(&query), self.format)?,
        };
        out.write_all(rendered.as_bytes())?;
        Ok(())
    }

    fn reload(&mut self, out: &mut impl Write) -> Result<()> {
        match self.load() {
            Ok(stats) => {
                write!(
                    out,
                    "{} {} records in {} groups (version {})",
                    "reloaded".green(),
                    stats.records,
                    stats.groups,
                    stats.version
                )?;
                match &stats.catalog {
                    Some(catalog) => writeln!(out, ", catalog {}", catalog)?,
                    None => writeln!(out)?,
                }
            }
            Err(e) => writeln!(
                out,
                "{} {:#}; keeping version {}",
                "reload failed:".red(),
                e,
                self.session.version()
            )?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_natives(path: &Path, name: &str) {
        let natives = serde_json::json!({
            "PLAYER": {"0x1": {"name": name, "comment": "Gets a ped"}},
            "REDHOOK": {"0x2": {"name": "RH_PRINT"}}
        });
        std::fs::write(path, natives.to_string()).unwrap();
    }

    fn browser(path: &Path) -> Browser {
        let config = Config {
            hidden_groups: vec!["REDHOOK".to_string()],
            ..Config::default()
        };
        let sources = PathSources::new([path]);
        let mut browser = Browser::new(sources, config, OutputFormat::Json, false);
        browser.load().unwrap();
        browser
    }

    fn run(browser: &mut Browser, line: &str) -> String {
        let mut out = Vec::new();
        browser.execute(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_open_and_filter_keep_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("natives.json");
        write_natives(&path, "GET_PLAYER_PED");
        let mut browser = browser(&path);

        let out = run(&mut browser, "open PLAYER");
        assert!(out.contains("GET_PLAYER_PED"));
        assert_eq!(browser.group(), Some("PLAYER"));

        let out = run(&mut browser, "filter weapon");
        assert!(!out.contains("GET_PLAYER_PED"));
        assert_eq!(browser.filter(), "weapon");

        let out = run(&mut browser, "groups");
        assert_eq!(out.trim(), "[]");
        assert_eq!(browser.group(), None);
    }

    #[test]
    fn test_hidden_groups_stay_reachable_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("natives.json");
        write_natives(&path, "GET_PLAYER_PED");
        let mut browser = browser(&path);

        assert!(!run(&mut browser, "groups").contains("REDHOOK"));
        assert!(!run(&mut browser, "search print").contains("RH_PRINT"));
        assert!(run(&mut browser, "show RH_PRINT").contains("\"key\": \"RH_PRINT\""));
        assert!(run(&mut browser, "show NOPE").contains("not found: NOPE"));
    }

    #[test]
    fn test_reload_swaps_index_and_survives_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("natives.json");
        write_natives(&path, "FIRST");
        let mut browser = browser(&path);

        write_natives(&path, "SECOND");
        assert!(run(&mut browser, "reload").contains("version 2"));
        assert!(run(&mut browser, "show SECOND").contains("SECOND"));

        std::fs::write(&path, "{ broken").unwrap();
        let out = run(&mut browser, "reload");
        assert!(out.contains("reload failed"), "{}", out);
        assert!(out.contains("keeping version 2"));
        assert!(run(&mut browser, "show SECOND").contains("SECOND"));
        assert_eq!(browser.session().version(), 2);
    }

    #[test]
    fn test_reload_reports_catalog_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{"version": "1.2", "numberItems": 1, "items": [{"key": "WEAPON_PISTOL"}]}"#,
        )
        .unwrap();
        let mut browser = browser(&path);

        let out = run(&mut browser, "reload");
        assert!(out.contains("(version 2), catalog v1.2 / 1 items"), "{}", out);
        assert!(run(&mut browser, "show WEAPON_PISTOL").contains("WEAPON_PISTOL"));
    }

    #[test]
    fn test_run_stops_at_quit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("natives.json");
        write_natives(&path, "GET_PLAYER_PED");
        let mut browser = browser(&path);

        let mut out = Vec::new();
        browser
            .run("show GET_PLAYER_PED\nquit\nshow RH_PRINT\n".as_bytes(), &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("GET_PLAYER_PED"));
        assert!(!out.contains("RH_PRINT"));
    }

    #[test]
    fn test_unknown_group_suggests() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("natives.json");
        write_natives(&path, "GET_PLAYER_PED");
        let mut browser = browser(&path);

        assert!(run(&mut browser, "open PLAYR").contains("did you mean 'PLAYER'"));
        assert!(run(&mut browser, "frobnicate").contains("unknown command"));
    }
}
