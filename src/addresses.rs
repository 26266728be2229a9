//! Saved locations: a log of every address that geocoded successfully, newest
//! first, plus the address used most recently.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Duplicate,
    Empty,
}

pub struct AddressBook {
    log: PathBuf,
    last: PathBuf,
}

fn normalize(address: &str) -> String {
    address.trim().to_uppercase()
}

/// File contents as text. Falls back to Latin-1 for logs written by other
/// tools.
fn read_text(path: &Path) -> io::Result<Option<String>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    };
    Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
}

impl AddressBook {
    pub fn new(log: impl Into<PathBuf>, last: impl Into<PathBuf>) -> Self {
        Self {
            log: log.into(),
            last: last.into(),
        }
    }

    /// Saved addresses, uppercase and without duplicates, newest first.
    pub fn load(&self) -> io::Result<Vec<String>> {
        let Some(text) = read_text(&self.log)? else {
            return Ok(Vec::new());
        };

        let mut addresses: Vec<String> = Vec::new();
        for line in text.lines() {
            let address = normalize(line);
            if !address.is_empty() && !addresses.contains(&address) {
                addresses.push(address);
            }
        }
        Ok(addresses)
    }

    fn write(&self, addresses: &[String]) -> io::Result<()> {
        let mut text = addresses.join("\n");
        text.push('\n');
        fs::write(&self.log, text)
    }

    /// Records a geocoded address at the top of the log and marks it as the
    /// most recent one.
    pub fn save(&self, address: &str) -> io::Result<SaveOutcome> {
        let address = normalize(address);
        if address.is_empty() {
            tracing::warn!("Address is empty or invalid");
            return Ok(SaveOutcome::Empty);
        }

        self.remember(&address)?;

        let mut addresses = self.load()?;
        if addresses.contains(&address) {
            tracing::debug!("Address '{}' already saved", address);
            return Ok(SaveOutcome::Duplicate);
        }

        addresses.insert(0, address.clone());
        self.write(&addresses)?;
        tracing::info!("Address '{}' saved", address);
        Ok(SaveOutcome::Saved)
    }

    /// Removes an address; `false` when it was not in the log.
    pub fn delete(&self, address: &str) -> io::Result<bool> {
        let address = normalize(address);
        let mut addresses = self.load()?;
        let before = addresses.len();
        addresses.retain(|saved| *saved != address);

        if addresses.len() == before {
            tracing::warn!("Address '{}' not found", address);
            return Ok(false);
        }

        self.write(&addresses)?;
        tracing::info!("Address '{}' deleted", address);
        Ok(true)
    }

    pub fn last_used(&self) -> io::Result<Option<String>> {
        Ok(read_text(&self.last)?
            .and_then(|text| text.lines().next().map(str::trim).map(String::from))
            .filter(|address| !address.is_empty()))
    }

    pub fn remember(&self, address: &str) -> io::Result<()> {
        fs::write(&self.last, format!("{}\n", address.trim()))
    }
}
