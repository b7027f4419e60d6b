//! Regular-expression search over the logical text.
//!
//! Before matching, the gap is moved out of the accessible region so the
//! haystack is one well-formed slice. The gap therefore never takes part in a
//! match, and a pattern that could only match filler bytes simply fails.

use regex::bytes::{Regex, RegexBuilder};
use std::ops::Range;

use crate::buffer::Buffer;
use crate::{BufferError, BufferResult};

/// Group positions of the last successful match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchData {
    groups: Vec<Option<Range<usize>>>,
}

impl MatchData {
    pub fn group(&self, n: usize) -> Option<Range<usize>> {
        self.groups.get(n).cloned().flatten()
    }

    /// Number of groups, including group 0.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn compile(pattern: &str) -> BufferResult<Regex> {
    Ok(RegexBuilder::new(pattern).multi_line(true).build()?)
}

impl Buffer {
    /// Searches forward from point; moves point to the end of the match.
    ///
    /// Returns the end position of the match.
    pub fn re_search_forward(&mut self, pattern: &str) -> BufferResult<usize> {
        self.begin_command();
        let regex = compile(pattern)?;
        let found = self
            .match_from(&regex, self.point)
            .ok_or_else(|| BufferError::SearchFailed(pattern.to_string()))?;
        let end = found
            .group(0)
            .map(|r| r.end)
            .ok_or_else(|| BufferError::SearchFailed(pattern.to_string()))?;
        self.match_data = Some(found);
        self.move_point(end);
        Ok(end)
    }

    /// Returns true if the text at point matches `pattern`. Point stays put.
    pub fn looking_at(&mut self, pattern: &str) -> BufferResult<bool> {
        let regex = compile(pattern)?;
        let point = self.point;
        match self.match_from(&regex, point) {
            Some(found) if found.group(0).is_some_and(|r| r.start == point) => {
                self.match_data = Some(found);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn match_beginning(&self, group: usize) -> Option<usize> {
        self.match_data.as_ref()?.group(group).map(|r| r.start)
    }

    pub fn match_end(&self, group: usize) -> Option<usize> {
        self.match_data.as_ref()?.group(group).map(|r| r.end)
    }

    /// Text of `group` in the last match, read from the current contents.
    pub fn match_string(&self, group: usize) -> Option<String> {
        let range = self.match_data.as_ref()?.group(group)?;
        self.substring(range.start, range.end).ok()
    }

    pub fn match_data(&self) -> Option<&MatchData> {
        self.match_data.as_ref()
    }

    /// First match starting at or after `from` within the accessible region.
    fn match_from(&mut self, regex: &Regex, from: usize) -> Option<MatchData> {
        let (min, max) = (self.point_min(), self.point_max());
        let haystack = self.storage.contiguous(min..max);
        let found = regex.captures_at(haystack, from - min).map(|caps| MatchData {
            groups: caps
                .iter()
                .map(|m| m.map(|m| m.start() + min..m.end() + min))
                .collect(),
        });
        self.storage.move_gap(self.point);
        found
    }
}
