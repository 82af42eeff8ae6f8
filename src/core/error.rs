//! # Error Module / 错误模块
//!
//! Two families of errors exist. [`BuildError`] is raised while a group is
//! being assembled and is fatal to that assembly. [`AggregateError`] is the
//! runtime result of a group: a tree of [`Failure`]s mirroring the nesting
//! of groups and cases, produced only after every sibling had its turn.
//!
//! 错误分为两类。[`BuildError`] 在组装配阶段产生，会使装配失败。
//! [`AggregateError`] 是组的运行时结果：一棵与组和用例嵌套结构一致的 [`Failure`] 树，
//! 只有在所有兄弟项都执行完之后才会产生。

use std::error::Error;
use std::fmt;

/// Origin used for errors found while normalizing a group's own members.
pub const INIT_ORIGIN: &str = "__init__";

/// A group could not be assembled from the supplied items and options.
///
/// 无法根据提供的条目和选项装配组。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// `global_args` and `personal_args` were both supplied.
    GlobalPersonalConflict,
    /// `personal_args` and `personal_kwargs` differ in length.
    PersonalLengthMismatch { args: usize, kwargs: usize },
    /// An item supplied positional args while `personal_args` is active.
    ArgsConflict { item: String },
    /// An item tuple carried two positional-args parts.
    ItemArgsConflict { item: String },
    /// An item tuple carried two keyword-args parts.
    ItemKwargsConflict { item: String },
    /// A pre-created coroutine was given arguments.
    CoroutineWithArgs { item: String },
    /// An argument part had the wrong shape (args must be a JSON array,
    /// kwargs a JSON object).
    MalformedItem { item: String, reason: String },
    /// A benchmark was asked for zero iterations.
    ZeroIterations,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::GlobalPersonalConflict => f.write_str("global & personal args conflict"),
            BuildError::PersonalLengthMismatch { args, kwargs } => write!(
                f,
                "personal args conflict: {args} positional sets but {kwargs} keyword sets"
            ),
            BuildError::ArgsConflict { item } => write!(
                f,
                "args conflict: `{item}` supplies positional args while personal args are set"
            ),
            BuildError::ItemArgsConflict { item } => {
                write!(f, "item args conflict: `{item}` has more than one args part")
            }
            BuildError::ItemKwargsConflict { item } => {
                write!(f, "item kwargs conflict: `{item}` has more than one kwargs part")
            }
            BuildError::CoroutineWithArgs { item } => {
                write!(f, "coroutine with args: `{item}` cannot be bound to arguments")
            }
            BuildError::MalformedItem { item, reason } => {
                write!(f, "malformed item `{item}`: {reason}")
            }
            BuildError::ZeroIterations => f.write_str("iterations must be at least 1"),
        }
    }
}

impl Error for BuildError {}

/// One entry of an [`AggregateError`].
///
/// [`AggregateError`] 中的一个条目。
#[derive(Debug)]
pub enum Failure {
    /// A failure that happened in a case or hook. `origin` names the case
    /// (or `constructor` / `destructor`); it is `None` for failures that
    /// belong to the group itself, such as "Tests not found".
    Leaf {
        origin: Option<String>,
        error: anyhow::Error,
    },
    /// A nested group failed.
    Group(AggregateError),
}

impl Failure {
    pub fn leaf(origin: impl Into<String>, error: anyhow::Error) -> Self {
        Failure::Leaf {
            origin: Some(origin.into()),
            error,
        }
    }

    pub fn bare(error: anyhow::Error) -> Self {
        Failure::Leaf {
            origin: None,
            error,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Leaf {
                origin: Some(origin),
                error,
            } => write!(f, "{origin}: {error}"),
            Failure::Leaf { origin: None, error } => write!(f, "{error}"),
            Failure::Group(group) => write!(f, "{group}"),
        }
    }
}

/// A borrowed view of one leaf failure together with the names of the
/// groups it sits in, outermost first.
#[derive(Debug)]
pub struct LeafFailure<'a> {
    pub path: Vec<&'a str>,
    pub origin: Option<&'a str>,
    pub error: &'a anyhow::Error,
}

impl LeafFailure<'_> {
    /// The ancestor path joined with `/`. Unnamed groups leave no segment.
    pub fn path_string(&self) -> String {
        let named: Vec<&str> = self.path.iter().copied().filter(|s| !s.is_empty()).collect();
        named.join("/")
    }
}

impl fmt::Display for LeafFailure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path_string();
        if !path.is_empty() {
            write!(f, "{path}: ")?;
        }
        match self.origin {
            Some(origin) => write!(f, "{origin}: {}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

/// The failures collected by one group, tagged with the group's name.
///
/// 一个组收集到的失败，带有该组的名称。
#[derive(Debug)]
pub struct AggregateError {
    pub origin: String,
    pub errors: Vec<Failure>,
}

impl AggregateError {
    pub fn new(origin: impl Into<String>, errors: Vec<Failure>) -> Self {
        Self {
            origin: origin.into(),
            errors,
        }
    }

    /// Walks the tree and returns every leaf with its full ancestor path.
    ///
    /// 遍历整棵树，返回每个叶子失败及其完整的祖先路径。
    pub fn leaves(&self) -> Vec<LeafFailure<'_>> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut Vec::new(), &mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, path: &mut Vec<&'a str>, out: &mut Vec<LeafFailure<'a>>) {
        path.push(&self.origin);
        for failure in &self.errors {
            match failure {
                Failure::Leaf { origin, error } => out.push(LeafFailure {
                    path: path.clone(),
                    origin: origin.as_deref(),
                    error,
                }),
                Failure::Group(group) => group.collect_leaves(path, out),
            }
        }
        path.pop();
    }

    /// The structured dump printed at the end of a failed run.
    pub fn render(&self) -> String {
        let mut out = String::from("! Errors:\n");
        for leaf in self.leaves() {
            out.push_str(&format!("! * {leaf}\n"));
        }
        out.push('⌎');
        out.push_str(&"-".repeat(28));
        out
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.leaves().len();
        let noun = if count == 1 { "failure" } else { "failures" };
        write!(f, "{}: {count} {noun}", self.origin)
    }
}

impl Error for AggregateError {}
