//! The session context.
//!
//! `Editor` bundles the state that outlives any one buffer: the registry,
//! the single kill ring, the loaded configuration and the mode table.
//! Callers reach buffers through it and hand its kill ring to the buffer
//! kill/yank operations.

use gapmacs_buffer::{Buffer, BufferConfig, BufferId, KillRing};
use std::path::Path;

use crate::config::Config;
use crate::mode::ModeTable;
use crate::registry::BufferRegistry;
use crate::{CoreError, CoreResult};

/// Process-wide editing state.
#[derive(Debug)]
pub struct Editor {
    buffers: BufferRegistry,
    kill_ring: KillRing,
    config: Config,
    buffer_config: BufferConfig,
    modes: ModeTable,
}

impl Editor {
    /// Creates a session from `config`.
    pub fn new(config: Config) -> CoreResult<Self> {
        let buffer_config = config.buffer.to_buffer_config()?;
        let modes = ModeTable::with_settings(&config.modes)?;
        tracing::debug!(
            undo_limit = buffer_config.undo_limit,
            kill_ring_max = config.kill_ring.max,
            modes = config.modes.len(),
            "session created"
        );
        Ok(Self {
            buffers: BufferRegistry::new(),
            kill_ring: KillRing::new(config.kill_ring.max),
            config,
            buffer_config,
            modes,
        })
    }

    /// Creates a session from the user's config file.
    pub fn load() -> CoreResult<Self> {
        Self::new(Config::load())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn buffer_config(&self) -> &BufferConfig {
        &self.buffer_config
    }

    pub fn buffers(&self) -> &BufferRegistry {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut BufferRegistry {
        &mut self.buffers
    }

    pub fn kill_ring(&self) -> &KillRing {
        &self.kill_ring
    }

    pub fn kill_ring_mut(&mut self) -> &mut KillRing {
        &mut self.kill_ring
    }

    pub fn modes(&self) -> &ModeTable {
        &self.modes
    }

    /// Creates an empty buffer carrying the configured default attributes.
    pub fn new_buffer(&mut self, name: &str) -> BufferId {
        let id = self.buffers.new_buffer(name, &self.buffer_config);
        if let Some(buffer) = self.buffers.get_by_id_mut(id) {
            apply_default_attributes(&self.config, buffer);
        }
        id
    }

    /// Visits `path` and makes its buffer current.
    ///
    /// A newly opened buffer gets the default attributes and a mode.
    pub fn find_file(&mut self, path: impl AsRef<Path>) -> CoreResult<BufferId> {
        let path = path.as_ref();
        let (id, created) = self.buffers.find_file(path, &self.buffer_config)?;
        if created {
            let buffer = self
                .buffers
                .get_by_id_mut(id)
                .ok_or(CoreError::BufferNotFound(id))?;
            apply_default_attributes(&self.config, buffer);
            self.modes.apply(buffer);
            if buffer.is_new_file() {
                tracing::info!(path = %path.display(), "new file");
            }
        }
        self.buffers.set_current(Some(id))?;
        Ok(id)
    }

    pub fn current(&self) -> Option<&Buffer> {
        self.buffers.current()
    }

    pub fn current_mut(&mut self) -> Option<&mut Buffer> {
        self.buffers.current_mut()
    }

    /// The current buffer together with the kill ring, for kill and yank.
    pub fn current_with_kill_ring(&mut self) -> CoreResult<(&mut Buffer, &mut KillRing)> {
        let buffer = self
            .buffers
            .current_mut()
            .ok_or(CoreError::NoCurrentBuffer)?;
        Ok((buffer, &mut self.kill_ring))
    }

    /// Kills a buffer; if it was current, the last buffer becomes current.
    pub fn kill_buffer(&mut self, id: BufferId) -> CoreResult<()> {
        let was_current = self.buffers.is_current(id);
        self.buffers.kill(id)?;
        if was_current {
            let last = self.buffers.last().map(Buffer::id);
            self.buffers.set_current(last)?;
        }
        Ok(())
    }

    /// Kills every buffer and empties the kill ring.
    pub fn reset(&mut self) {
        self.buffers.reset();
        self.kill_ring.clear();
    }
}

fn apply_default_attributes(config: &Config, buffer: &mut Buffer) {
    for (key, value) in &config.attributes {
        buffer.set_attribute(key.clone(), value.clone());
    }
}
