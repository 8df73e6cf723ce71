use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

/// Terminal lines read from a script file for headless runs.
pub struct ScriptedInput {
    lines: Vec<String>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Skips blank lines and `#` comments.
    pub fn from_reader<R: BufRead>(reader: R) -> io::Result<Self> {
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            lines.push(trimmed.to_string());
        }
        Ok(Self { lines, cursor: 0 })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn next_line(&mut self) -> Option<&str> {
        let line = self.lines.get(self.cursor)?;
        self.cursor += 1;
        Some(line.as_str())
    }
}
