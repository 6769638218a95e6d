//! Tile placement onto the fixed-width annotation track.
//!
//! Each tile wants to sit under the temporal midpoint of its interval. A
//! single left-to-right sweep places the tiles in canonical order, clamping
//! colliding tiles against their predecessor and merging them into groups.
//! Two repair passes follow: groups are re-centered on their combined time
//! range, and anything hanging past the right track edge is shifted back in,
//! merging further when a shift would collide. If the tiles cannot fit at
//! all, layout is skipped and the track is told to expand instead.
//!
//! `layout` is a pure function: equal inputs produce bit-identical results.

use log::{trace, warn};

use crate::core::{Annotation, Interval, Time};
use crate::layout::group::{self, GroupId, Partition};

/// Pixel gap kept between adjacent tiles and between adjacent groups.
pub const DEFAULT_GAP: f64 = 3.0;

/// Layout input for one tile: its interval and measured pixel width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSlot {
    pub interval: Interval,
    pub width: f64,
}

impl TileSlot {
    pub fn new(interval: Interval, width: f64) -> Self {
        Self { interval, width }
    }
}

impl From<&Annotation> for TileSlot {
    fn from(annotation: &Annotation) -> Self {
        Self {
            interval: annotation.interval,
            width: annotation.tile.width,
        }
    }
}

/// Error type for layout preconditions.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("timeline duration must be positive, got {duration}")]
    InvalidDuration { duration: Time },
}

/// How the track should present the computed positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LayoutMode {
    /// Everything fits; every tile lies within `[0, track_width]`.
    #[default]
    Fitted,
    /// Total content exceeds the track. The track must expand to
    /// `content_width` and scroll horizontally instead of compressing tiles.
    Overflow { content_width: f64 },
}

/// Position of one tile after layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub x: f64,
    pub group: Option<GroupId>,
}

/// Result of one layout pass, recomputed wholesale on every call and never
/// patched incrementally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    /// One placement per input tile, in canonical order.
    pub tiles: Vec<TilePlacement>,
    pub mode: LayoutMode,
}

impl LayoutResult {
    pub fn is_overflow(&self) -> bool {
        matches!(self.mode, LayoutMode::Overflow { .. })
    }
}

/// Place `tiles` (canonical order) onto a track of `track_width` pixels
/// representing `duration` seconds, keeping `gap` pixels between neighbours.
pub fn layout(
    tiles: &[TileSlot],
    track_width: f64,
    duration: Time,
    gap: f64,
) -> Result<LayoutResult, LayoutError> {
    if duration <= 0.0 || duration.is_nan() {
        return Err(LayoutError::InvalidDuration { duration });
    }
    if tiles.is_empty() {
        return Ok(LayoutResult::default());
    }

    let widths: Vec<f64> = tiles.iter().map(|t| t.width).collect();

    // Overflow escape: when the tiles cannot fit, positional layout is
    // pointless. Lay them out edge to edge and report the width the track
    // has to grow to.
    let content_width = group::content_width(&widths, gap);
    if content_width > track_width {
        trace!(
            "content width {content_width} exceeds track width {track_width}, \
             entering overflow mode"
        );
        let mut x = 0.0;
        let placements = widths
            .iter()
            .map(|w| {
                let p = TilePlacement { x, group: None };
                x += w + gap;
                p
            })
            .collect();
        return Ok(LayoutResult {
            tiles: placements,
            mode: LayoutMode::Overflow { content_width },
        });
    }

    let scale = track_width / duration;
    let mut xs = vec![0.0; tiles.len()];
    let mut part = Partition::new(tiles.len());

    sweep(tiles, &widths, &mut xs, &mut part, scale, gap);
    recenter_groups(tiles, &widths, &mut xs, &mut part, scale, gap);
    resolve_right_overflow(&widths, &mut xs, &mut part, track_width, gap);

    let placements = xs
        .iter()
        .enumerate()
        .map(|(i, &x)| TilePlacement {
            x,
            group: part.group_of(i),
        })
        .collect();
    Ok(LayoutResult {
        tiles: placements,
        mode: LayoutMode::Fitted,
    })
}

/// Desired-position pass: one left-to-right sweep in canonical order.
///
/// Collision only has to be checked against the immediately preceding tile,
/// because tiles arrive in temporal order and groups are contiguous by
/// construction.
fn sweep(
    tiles: &[TileSlot],
    widths: &[f64],
    xs: &mut [f64],
    part: &mut Partition,
    scale: f64,
    gap: f64,
) {
    for i in 0..tiles.len() {
        let desired = scale * tiles[i].interval.midpoint() - widths[i] / 2.0;
        if desired <= 0.0 {
            xs[i] = 0.0;
            continue;
        }
        if i > 0 {
            let prev_right = xs[i - 1] + widths[i - 1];
            if desired < prev_right + gap {
                xs[i] = prev_right + gap;
                part.merge(i - 1, i);
                continue;
            }
        }
        xs[i] = desired;
    }
}

/// Group re-centering pass: shift every group so it centers on the temporal
/// midpoint of its combined time range, where that neither pushes the group
/// past the left edge nor closer than `gap` to its predecessor. A shift that
/// would collide snaps the group flush against the predecessor and merges
/// the two into one.
fn recenter_groups(
    tiles: &[TileSlot],
    widths: &[f64],
    xs: &mut [f64],
    part: &mut Partition,
    scale: f64,
    gap: f64,
) {
    let mut i = 0;
    while i < tiles.len() {
        let run = part.run(i);
        i = run.end;
        if part.group_of(run.start).is_none() {
            continue;
        }

        let span = group::span(widths, &run, gap);
        let start = tiles[run.start].interval.start();
        let end = tiles[run.end - 1].interval.end();
        let mid = start + (end - start) / 2.0;
        let desired_left = scale * mid - span / 2.0;
        if desired_left < 0.0 {
            continue;
        }

        let cur_left = xs[run.start];
        if run.start == 0 {
            group::shift(xs, &run, desired_left - cur_left);
            continue;
        }
        let pred_right = xs[run.start - 1] + widths[run.start - 1];
        if desired_left >= pred_right + gap {
            group::shift(xs, &run, desired_left - cur_left);
        } else {
            trace!(
                "group at tiles {}..{} snaps against its predecessor",
                run.start,
                run.end
            );
            group::shift(xs, &run, (pred_right + gap) - cur_left);
            part.merge(run.start - 1, run.start);
        }
    }
}

/// Right-edge overflow pass: walk the positioning units left to right and
/// pull anything hanging past the track edge back in by the minimal shift,
/// snap-and-merging when the shift would collide with the predecessor.
///
/// The sweep repeats while a pass changed anything. It terminates because a
/// pass either merges two units (strictly decreasing the unit count) or
/// only applies final in-bounds shifts; the pass count is additionally
/// bounded by the initial unit count.
fn resolve_right_overflow(
    widths: &[f64],
    xs: &mut [f64],
    part: &mut Partition,
    track_width: f64,
    gap: f64,
) {
    let bound = part.run_count() + 1;
    let mut passes = 0;
    loop {
        let mut changed = false;
        let mut i = 0;
        while i < widths.len() {
            let run = part.run(i);
            i = run.end;

            let left = xs[run.start];
            let right = left + group::span(widths, &run, gap);
            let overhang = right - track_width;
            if overhang <= 0.0 {
                continue;
            }
            let target = left - overhang;
            if target < 0.0 {
                // Cannot resolve without leaving the track; a later merge
                // may still open up room.
                continue;
            }
            if run.start == 0 {
                group::shift(xs, &run, -overhang);
                changed = true;
                continue;
            }
            let pred_right = xs[run.start - 1] + widths[run.start - 1];
            if target >= pred_right + gap {
                group::shift(xs, &run, -overhang);
                changed = true;
            } else {
                let snap = (pred_right + gap) - left;
                if snap < 0.0 {
                    group::shift(xs, &run, snap);
                }
                part.merge(run.start - 1, run.start);
                changed = true;
            }
        }

        if !changed {
            break;
        }
        passes += 1;
        if passes > bound {
            debug_assert!(
                false,
                "right-edge overflow resolution exceeded its group bound"
            );
            warn!("right-edge overflow resolution did not settle after {passes} passes");
            break;
        }
    }
}
