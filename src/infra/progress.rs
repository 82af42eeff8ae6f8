//! # Progress Ticker Module / 进度条模块
//!
//! Benchmarks with many iterations print a row of dots while they run.
//! At most `max_width` dots are printed; with more iterations than that the
//! dots are spread evenly over the run.
//!
//! 多次迭代的基准测试在运行期间打印一排点。最多打印 `max_width` 个点；
//! 迭代次数更多时，点会均匀分布在整个运行过程中。

/// The character printed for each tick.
pub const TICK: char = '.';

/// Decides after which iterations a tick is printed.
///
/// 决定在哪些迭代之后打印一个进度点。
#[derive(Debug, Clone)]
pub struct ProgressBar {
    enabled: bool,
    step: f64,
    mark: f64,
    next: usize,
}

impl ProgressBar {
    /// A ticker for `iterations` steps printing at most `max_width` ticks.
    /// A `max_width` of zero disables ticking.
    pub fn new(iterations: usize, max_width: usize) -> Self {
        let step = if iterations <= max_width || max_width == 0 {
            1.0
        } else {
            iterations as f64 / max_width as f64
        };
        Self {
            enabled: max_width > 0,
            step,
            mark: 0.0,
            next: 0,
        }
    }

    /// Reports whether a tick belongs after iteration `index` (0-based).
    /// Indices must be passed in increasing order.
    ///
    /// 判断第 `index` 次迭代（从 0 开始）之后是否应打印进度点。
    pub fn should_tick(&mut self, index: usize) -> bool {
        if !self.enabled || index != self.next {
            return false;
        }
        self.mark += self.step;
        self.next = self.mark as usize;
        true
    }
}
