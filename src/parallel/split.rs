//! Parallel decomposition of pixel operations.
//!
//! A drawing call is split recursively into independent row-range units and
//! handed to rayon's fork-join scheduler. Splitting only happens while the
//! unit area stays at or above [`SPLIT_AREA_THRESHOLD`] and parallelism
//! remains; everything below runs sequentially in the calling thread. Units
//! write disjoint destination rows (enforced by
//! [`PixelViewMut::split_rows`]), so the set of pixels written by all units
//! is a partition of the sequential result and no ordering between units is
//! needed.

use crate::buffer::view::PixelViewMut;
use crate::foundation::error::{BlitError, BlitResult};

/// Minimum pixel area below which parallel decomposition is not attempted;
/// the split overhead would exceed the benefit.
pub const SPLIT_AREA_THRESHOLD: u64 = 32768;

/// True when a `width` x `length` unit is large enough to split.
pub fn worth_to_split(area_threshold: u64, width: u32, length: u32) -> bool {
    u64::from(width) * u64::from(length) >= area_threshold
}

/// Row range of one unit of work, relative to the full operation.
///
/// Splitting is a pure function producing two independent descriptors; the
/// shared parameters (views, coordinates, width) live outside the task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitTask {
    pub offset: u32,
    pub length: u32,
}

impl SplitTask {
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    /// Halves the task along the row dimension. The two halves cover exactly
    /// the original range with no overlap.
    pub fn split(self) -> (SplitTask, SplitTask) {
        let first = self.length / 2;
        (
            SplitTask::new(self.offset, first),
            SplitTask::new(self.offset + first, self.length - first),
        )
    }
}

/// Parallelism currently available to this thread's rayon scheduler.
pub fn available_parallelism() -> usize {
    rayon::current_num_threads()
}

/// Builds a dedicated worker pool for draw calls. `None` uses rayon's
/// defaults.
pub fn build_thread_pool(threads: Option<usize>) -> BlitResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BlitError::validation("thread count must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BlitError::validation(format!("failed to build rayon thread pool: {e}")))
}

/// Runs `f` over the rows of `dst`, splitting recursively while profitable.
///
/// `dst` must cover exactly the rows of `task`; `task.offset` tracks the
/// position within the full operation so `f` can address source pixels. A
/// failing unit propagates its error to the caller; writes already performed
/// by sibling units are not rolled back (pixel writes are idempotent, the
/// caller may simply retry the whole rectangle).
pub fn run_rows<F>(
    parallelism: usize,
    area_threshold: u64,
    width: u32,
    dst: PixelViewMut<'_>,
    task: SplitTask,
    f: &F,
) -> BlitResult<()>
where
    F: Fn(PixelViewMut<'_>, SplitTask) -> BlitResult<()> + Sync,
{
    if parallelism < 2 || task.length < 2 || !worth_to_split(area_threshold, width, task.length) {
        return f(dst, task);
    }
    let (first, second) = task.split();
    let (top, bottom) = dst.split_rows(first.length);
    let (ra, rb) = rayon::join(
        || run_rows(parallelism.div_ceil(2), area_threshold, width, top, first, f),
        || run_rows(parallelism / 2, area_threshold, width, bottom, second, f),
    );
    ra?;
    rb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::format::PixelFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn worth_to_split_uses_area() {
        assert!(!worth_to_split(100, 5, 5));
        assert!(worth_to_split(100, 50, 50));
        assert!(worth_to_split(100, 10, 10));
        assert!(!worth_to_split(100, 9, 11));
    }

    #[test]
    fn split_halves_cover_original_range() {
        let t = SplitTask::new(10, 7);
        let (a, b) = t.split();
        assert_eq!(a, SplitTask::new(10, 3));
        assert_eq!(b, SplitTask::new(13, 4));
        assert_eq!(a.length + b.length, t.length);
        assert_eq!(b.offset, a.offset + a.length);
    }

    #[test]
    fn build_thread_pool_rejects_zero() {
        assert!(build_thread_pool(Some(0)).is_err());
        assert!(build_thread_pool(Some(2)).is_ok());
    }

    #[test]
    fn small_task_never_splits() {
        let mut data = vec![0u32; 25];
        let dst = PixelViewMut::new(&mut data, 5, 5, 5, PixelFormat::PREMUL_ARGB).unwrap();
        let units = AtomicUsize::new(0);
        run_rows(8, 100, 5, dst, SplitTask::new(0, 5), &|_view, _task| {
            units.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap();
        assert_eq!(units.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn large_task_splits_at_least_once() {
        let mut data = vec![0u32; 2500];
        let dst = PixelViewMut::new(&mut data, 50, 50, 50, PixelFormat::PREMUL_ARGB).unwrap();
        let units = AtomicUsize::new(0);
        run_rows(4, 100, 50, dst, SplitTask::new(0, 50), &|_view, _task| {
            units.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap();
        assert!(units.load(Ordering::Relaxed) >= 2);
    }

    #[test]
    fn parallelism_one_runs_sequentially() {
        let mut data = vec![0u32; 2500];
        let dst = PixelViewMut::new(&mut data, 50, 50, 50, PixelFormat::PREMUL_ARGB).unwrap();
        let units = AtomicUsize::new(0);
        run_rows(1, 100, 50, dst, SplitTask::new(0, 50), &|_view, _task| {
            units.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
        .unwrap();
        assert_eq!(units.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn units_partition_rows_exactly() {
        let mut data = vec![0u32; 64 * 64];
        let dst = PixelViewMut::new(&mut data, 64, 64, 64, PixelFormat::PREMUL_ARGB).unwrap();
        run_rows(8, 64, 64, dst, SplitTask::new(0, 64), &|mut view, task| {
            assert_eq!(view.height(), task.length);
            for r in 0..task.length {
                let row = view.row_mut(0, r, 64);
                for px in row.iter_mut() {
                    // Every pixel must be written exactly once.
                    assert_eq!(*px, 0);
                    *px = u32::from(task.offset + r) + 1;
                }
            }
            Ok(())
        })
        .unwrap();
        for (i, &px) in data.iter().enumerate() {
            assert_eq!(px as usize, i / 64 + 1);
        }
    }

    #[test]
    fn unit_error_propagates() {
        let mut data = vec![0u32; 2500];
        let dst = PixelViewMut::new(&mut data, 50, 50, 50, PixelFormat::PREMUL_ARGB).unwrap();
        let err = run_rows(4, 100, 50, dst, SplitTask::new(0, 50), &|_view, task| {
            if task.offset >= 25 {
                Err(BlitError::validation("unit failed"))
            } else {
                Ok(())
            }
        });
        assert!(err.is_err());
    }
}
