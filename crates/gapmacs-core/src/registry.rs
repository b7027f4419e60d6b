//! The buffer registry.
//!
//! Buffers are owned here and looked up by unique name or by [`BufferId`].
//! Creation order is kept for enumeration; a most-recently-current list
//! answers "which buffer was I in before this one".

use gapmacs_buffer::{Buffer, BufferConfig, BufferId};
use std::collections::HashMap;
use std::path::Path;

use crate::{CoreError, CoreResult};

/// Owns every live buffer of a session.
#[derive(Debug, Default)]
pub struct BufferRegistry {
    buffers: HashMap<BufferId, Buffer>,

    /// Creation order
    order: Vec<BufferId>,

    current: Option<BufferId>,

    /// Buffers that have been current, most recent first
    recent: Vec<BufferId>,
}

impl BufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer named `name`, suffixed `<2>`, `<3>`... if taken.
    pub fn new_buffer(&mut self, name: &str, config: &BufferConfig) -> BufferId {
        self.add(Buffer::with_config(config.clone()), name)
    }

    /// Registers `buffer` under a unique form of `name`.
    pub fn add(&mut self, buffer: Buffer, name: &str) -> BufferId {
        let name = self.unique_name(name);
        let id = buffer.id();
        tracing::debug!(%id, %name, "buffer created");
        self.buffers.insert(id, buffer.with_name(name));
        self.order.push(id);
        id
    }

    fn unique_name(&self, base: &str) -> String {
        if self.get(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}<{n}>"))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    /// Renames a buffer, making the name unique; returns the name given.
    pub fn rename(&mut self, id: BufferId, name: &str) -> CoreResult<String> {
        let buffer = self
            .buffers
            .remove(&id)
            .ok_or(CoreError::BufferNotFound(id))?;
        let name = self.unique_name(name);
        self.buffers.insert(id, buffer.with_name(name.clone()));
        Ok(name)
    }

    /// Looks a buffer up by name.
    pub fn get(&self, name: &str) -> Option<&Buffer> {
        self.buffers.values().find(|b| b.name() == Some(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Buffer> {
        self.buffers.values_mut().find(|b| b.name() == Some(name))
    }

    pub fn get_by_id(&self, id: BufferId) -> Option<&Buffer> {
        self.buffers.get(&id)
    }

    pub fn get_by_id_mut(&mut self, id: BufferId) -> Option<&mut Buffer> {
        self.buffers.get_mut(&id)
    }

    /// Names in creation order.
    pub fn names(&self) -> Vec<String> {
        self.iter()
            .filter_map(|b| b.name().map(String::from))
            .collect()
    }

    /// Buffers in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Buffer> {
        self.order.iter().filter_map(|id| self.buffers.get(id))
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Finds the buffer visiting `path`.
    pub fn find_by_path(&self, path: &Path) -> Option<BufferId> {
        self.iter()
            .find(|b| b.file_name().is_some_and(|p| same_file(p, path)))
            .map(Buffer::id)
    }

    /// Returns the buffer visiting `path`, opening it if there is none.
    ///
    /// The second value is true when a new buffer was created.
    pub fn find_file(
        &mut self,
        path: impl AsRef<Path>,
        config: &BufferConfig,
    ) -> CoreResult<(BufferId, bool)> {
        let path = path.as_ref();
        if let Some(id) = self.find_by_path(path) {
            return Ok((id, false));
        }
        let buffer = Buffer::open(path, config)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok((self.add(buffer, &name), true))
    }

    /// Removes a buffer and detaches its marks.
    pub fn kill(&mut self, id: BufferId) -> CoreResult<Buffer> {
        let mut buffer = self
            .buffers
            .remove(&id)
            .ok_or(CoreError::BufferNotFound(id))?;
        buffer.detach_marks();
        self.order.retain(|&i| i != id);
        self.recent.retain(|&i| i != id);
        if self.current == Some(id) {
            self.current = None;
        }
        tracing::debug!(%id, name = ?buffer.name(), "buffer killed");
        Ok(buffer)
    }

    /// Makes `id` the current buffer, or clears it with `None`.
    pub fn set_current(&mut self, id: Option<BufferId>) -> CoreResult<()> {
        if let Some(id) = id {
            if !self.buffers.contains_key(&id) {
                return Err(CoreError::BufferNotFound(id));
            }
            self.recent.retain(|&i| i != id);
            self.recent.insert(0, id);
        }
        self.current = id;
        tracing::trace!(current = ?id, "current buffer changed");
        Ok(())
    }

    pub fn current_id(&self) -> Option<BufferId> {
        self.current
    }

    pub fn current(&self) -> Option<&Buffer> {
        self.current.and_then(|id| self.buffers.get(&id))
    }

    pub fn current_mut(&mut self) -> Option<&mut Buffer> {
        self.current.and_then(|id| self.buffers.get_mut(&id))
    }

    /// The most recently current buffer other than the current one.
    pub fn last(&self) -> Option<&Buffer> {
        self.recent
            .iter()
            .find(|&&id| Some(id) != self.current)
            .and_then(|id| self.buffers.get(id))
    }

    pub fn is_current(&self, id: BufferId) -> bool {
        self.current == Some(id)
    }

    /// Kills every buffer.
    pub fn reset(&mut self) {
        for buffer in self.buffers.values_mut() {
            buffer.detach_marks();
        }
        self.buffers.clear();
        self.order.clear();
        self.recent.clear();
        self.current = None;
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_new_buffer_suffixes() {
        let mut registry = BufferRegistry::new();
        let config = BufferConfig::default();
        let first = registry.new_buffer("Untitled", &config);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Untitled").map(Buffer::id), Some(first));

        let second = registry.new_buffer("Untitled", &config);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_by_id(second).and_then(Buffer::name), Some("Untitled<2>"));
        registry.new_buffer("Untitled", &config);
        assert_eq!(registry.names(), ["Untitled", "Untitled<2>", "Untitled<3>"]);
    }

    #[test]
    fn test_rename() {
        let mut registry = BufferRegistry::new();
        let config = BufferConfig::default();
        let foo = registry.new_buffer("foo", &config);
        let bar = registry.new_buffer("bar", &config);
        assert_eq!(registry.rename(bar, "foo").unwrap(), "foo<2>");
        assert_eq!(registry.rename(foo, "foo").unwrap(), "foo");
        assert_eq!(registry.rename(foo, "baz").unwrap(), "baz");
        assert_eq!(registry.names(), ["baz", "foo<2>"]);
    }

    #[test]
    fn test_find_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hello world").unwrap();
        let mut registry = BufferRegistry::new();
        let config = BufferConfig::default();

        let (id, created) = registry.find_file(file.path(), &config).unwrap();
        assert!(created);
        let base_name = file.path().file_name().unwrap().to_string_lossy().into_owned();
        let buffer = registry.get(&base_name).unwrap();
        assert_eq!(buffer.id(), id);
        assert_eq!(buffer.to_string(), "hello world\n");
        assert_eq!(registry.len(), 1);

        let (again, created) = registry.find_file(file.path(), &config).unwrap();
        assert_eq!(again, id);
        assert!(!created);
        assert_eq!(registry.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let (missing, _) = registry
            .find_file(dir.path().join("no_such_file"), &config)
            .unwrap();
        let buffer = registry.get_by_id(missing).unwrap();
        assert_eq!(buffer.name(), Some("no_such_file"));
        assert!(buffer.is_new_file());
    }

    #[test]
    fn test_last() {
        let mut registry = BufferRegistry::new();
        let config = BufferConfig::default();
        assert!(registry.last().is_none());

        let name_of = |b: Option<&Buffer>| b.and_then(Buffer::name).map(String::from);

        let foo = registry.new_buffer("foo", &config);
        registry.set_current(Some(foo)).unwrap();
        assert_eq!(name_of(registry.current()).as_deref(), Some("foo"));
        assert!(registry.last().is_none());

        let bar = registry.new_buffer("bar", &config);
        registry.set_current(Some(bar)).unwrap();
        assert_eq!(name_of(registry.last()).as_deref(), Some("foo"));

        let baz = registry.new_buffer("baz", &config);
        registry.set_current(Some(baz)).unwrap();
        assert!(registry.is_current(baz));
        assert_eq!(name_of(registry.last()).as_deref(), Some("bar"));

        for (expected_current, expected_last) in [("bar", Some("foo")), ("foo", None)] {
            let current = registry.current_id().unwrap();
            registry.kill(current).unwrap();
            let last = registry.last().map(Buffer::id);
            registry.set_current(last).unwrap();
            assert_eq!(name_of(registry.current()).as_deref(), Some(expected_current));
            assert_eq!(name_of(registry.last()).as_deref(), expected_last);
        }

        let current = registry.current_id().unwrap();
        registry.kill(current).unwrap();
        let last = registry.last().map(Buffer::id);
        registry.set_current(last).unwrap();
        assert!(registry.current().is_none());
        assert!(registry.last().is_none());
    }

    #[test]
    fn test_kill_detaches_marks() {
        let mut registry = BufferRegistry::new();
        let id = registry.new_buffer("scratch", &BufferConfig::default());
        let buffer = registry.get_by_id_mut(id).unwrap();
        buffer.insert("abc");
        let mark = buffer.new_mark();
        let killed = registry.kill(id).unwrap();
        assert!(killed.mark_location(mark).is_err());
        assert!(registry.get("scratch").is_none());
        assert!(matches!(registry.kill(id), Err(CoreError::BufferNotFound(_))));
        assert!(registry.set_current(Some(id)).is_err());
    }

    #[test]
    fn test_reset() {
        let mut registry = BufferRegistry::new();
        let config = BufferConfig::default();
        let id = registry.new_buffer("a", &config);
        registry.new_buffer("b", &config);
        registry.set_current(Some(id)).unwrap();
        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.current().is_none());
        assert!(registry.names().is_empty());
    }
}
