//! Group bookkeeping and the geometry primitives shared by the layout passes.
//!
//! A group is a contiguous run of tiles that collided during placement and
//! are positioned as one unit from then on. Membership is stored as an
//! explicit partition over the canonical sequence; merging adjacent groups
//! is relabel bookkeeping only and never recomputes the geometry of
//! unrelated groups.

use std::ops::Range;

/// Identifier of a tile group within one layout pass.
pub type GroupId = u32;

/// Partition of the canonical tile sequence into groups.
///
/// Invariant: the members of a group always form a contiguous run in
/// canonical order. The sweep passes only ever merge neighbours, so the
/// invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    groups: Vec<Option<GroupId>>,
    next_id: GroupId,
}

impl Partition {
    /// Create a partition of `len` tiles, all ungrouped.
    pub fn new(len: usize) -> Self {
        Self {
            groups: vec![None; len],
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_of(&self, idx: usize) -> Option<GroupId> {
        self.groups[idx]
    }

    /// Merge the units containing tiles `a` and `b` into one group.
    ///
    /// `a` and `b` must belong to adjacent runs, which keeps membership
    /// contiguous. Returns the id of the surviving group.
    pub fn merge(&mut self, a: usize, b: usize) -> GroupId {
        match (self.groups[a], self.groups[b]) {
            (Some(ga), Some(gb)) => {
                if ga != gb {
                    self.relabel_run(a, gb);
                }
                gb
            }
            (Some(ga), None) => {
                self.groups[b] = Some(ga);
                ga
            }
            (None, Some(gb)) => {
                self.groups[a] = Some(gb);
                gb
            }
            (None, None) => {
                let id = self.next_id;
                self.next_id += 1;
                self.groups[a] = Some(id);
                self.groups[b] = Some(id);
                id
            }
        }
    }

    /// Relabel the contiguous run containing `idx` to `id`.
    fn relabel_run(&mut self, idx: usize, id: GroupId) {
        let run = self.run(idx);
        for g in &mut self.groups[run] {
            *g = Some(id);
        }
    }

    /// The positioning unit containing `idx`: the whole group if the tile is
    /// grouped, otherwise the tile alone.
    pub fn run(&self, idx: usize) -> Range<usize> {
        match self.groups[idx] {
            None => idx..idx + 1,
            Some(id) => {
                let mut start = idx;
                while start > 0 && self.groups[start - 1] == Some(id) {
                    start -= 1;
                }
                let mut end = idx + 1;
                while end < self.groups.len() && self.groups[end] == Some(id) {
                    end += 1;
                }
                start..end
            }
        }
    }

    /// All positioning units left to right. Every tile appears in exactly
    /// one run.
    pub fn runs(&self) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < self.groups.len() {
            let run = self.run(i);
            i = run.end;
            out.push(run);
        }
        out
    }

    /// Number of positioning units. Strictly decreases on every merge of
    /// two distinct runs, which bounds the overflow-resolution loop.
    pub fn run_count(&self) -> usize {
        self.runs().len()
    }
}

/// Occupied span of a run: tile widths plus `gap` between adjacent tiles.
pub fn span(widths: &[f64], run: &Range<usize>, gap: f64) -> f64 {
    let tiles: f64 = widths[run.clone()].iter().sum();
    tiles + gap * (run.len().saturating_sub(1)) as f64
}

/// Total content width of the whole sequence: each tile plus one `gap`.
/// This is the width the track has to grow to in overflow-escape mode.
pub fn content_width(widths: &[f64], gap: f64) -> f64 {
    widths.iter().map(|w| w + gap).sum()
}

/// Shift every tile of a run by `delta` pixels.
pub fn shift(xs: &mut [f64], run: &Range<usize>, delta: f64) {
    for x in &mut xs[run.clone()] {
        *x += delta;
    }
}
