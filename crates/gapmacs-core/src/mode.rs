//! Mode dispatch.
//!
//! A mode here is only a name. The table picks one for a buffer from its
//! file name or its `#!` line and records it in the `mode` attribute; the
//! editing behavior of a mode lives with whoever reads that attribute.

use gapmacs_buffer::Buffer;
use regex::Regex;

use crate::config::ModeSettings;
use crate::CoreResult;

/// Mode used when nothing in the table matches.
pub const FUNDAMENTAL_MODE: &str = "fundamental";

/// One entry of the mode table.
#[derive(Debug, Clone)]
pub struct Mode {
    name: String,
    file_name: Option<Regex>,
    interpreter: Option<Regex>,
}

impl Mode {
    pub fn new(
        name: impl Into<String>,
        file_name: Option<&str>,
        interpreter: Option<&str>,
    ) -> CoreResult<Self> {
        Ok(Self {
            name: name.into(),
            file_name: file_name.map(Regex::new).transpose()?,
            interpreter: interpreter.map(Regex::new).transpose()?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, base_name: Option<&str>, shebang: Option<&str>) -> bool {
        let by_name = matches!((&self.file_name, base_name), (Some(re), Some(name)) if re.is_match(name));
        let by_interpreter =
            matches!((&self.interpreter, shebang), (Some(re), Some(line)) if re.is_match(line));
        by_name || by_interpreter
    }
}

/// Ordered mode list; the first match wins.
#[derive(Debug, Clone)]
pub struct ModeTable {
    modes: Vec<Mode>,
}

impl ModeTable {
    /// The built-in modes.
    pub fn builtin() -> Self {
        Self {
            modes: vec![
                Mode {
                    name: "ruby".to_string(),
                    file_name: Regex::new(
                        r"\A(?:.*\.(?:rb|ru|rake|thor)|(?:Gem|Rake|Cap|Thor|Vagrant|Guard|Pod)file)\z",
                    )
                    .ok(),
                    interpreter: Regex::new("ruby").ok(),
                },
                Mode {
                    name: "rust".to_string(),
                    file_name: Regex::new(r"\A.*\.rs\z").ok(),
                    interpreter: None,
                },
            ],
        }
    }

    /// The built-in modes with `settings` tried first, in order.
    pub fn with_settings(settings: &[ModeSettings]) -> CoreResult<Self> {
        let mut table = Self::builtin();
        let extra = settings
            .iter()
            .map(|s| Mode::new(&s.name, s.file_name.as_deref(), s.interpreter.as_deref()))
            .collect::<CoreResult<Vec<_>>>()?;
        table.modes.splice(0..0, extra);
        Ok(table)
    }

    /// Adds a mode ahead of all existing ones.
    pub fn prepend(&mut self, mode: Mode) {
        self.modes.insert(0, mode);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(Mode::name)
    }

    /// Name of the mode for `buffer`, or [`FUNDAMENTAL_MODE`].
    pub fn select(&self, buffer: &mut Buffer) -> &str {
        let base_name = buffer
            .file_name()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned());
        let shebang = buffer.save_excursion(|b| {
            b.beginning_of_buffer();
            match b.looking_at("#!.*$") {
                Ok(true) => b.match_string(0),
                _ => None,
            }
        });
        self.modes
            .iter()
            .find(|m| m.matches(base_name.as_deref(), shebang.as_deref()))
            .map_or(FUNDAMENTAL_MODE, Mode::name)
    }

    /// Selects a mode and stores its name in the buffer's `mode` attribute.
    pub fn apply(&self, buffer: &mut Buffer) -> String {
        let name = self.select(buffer).to_string();
        tracing::debug!(buffer = ?buffer.name(), mode = %name, "mode selected");
        buffer.set_attribute("mode", name.as_str());
        name
    }
}

impl Default for ModeTable {
    fn default() -> Self {
        Self::builtin()
    }
}
