//! # Argument Resolver Module / 参数解析模块
//!
//! Decides which `(args, kwargs)` bindings every case of a group is called
//! with. Three scopes take part, from weakest to strongest:
//!
//! 1. global args / kwargs, shared by every item of the group;
//! 2. personal args / kwargs, one binding per index, expanding a case into
//!    several calls;
//! 3. the item's own args / kwargs.
//!
//! Positional sources never merge: global and personal args are mutually
//! exclusive, and an item may not bring its own positional args while
//! personal args are active. Keyword sources always merge, the stronger
//! scope winning key conflicts.
//!
//! 决定组内每个用例使用哪些 `(args, kwargs)` 绑定。参与的作用域从弱到强依次为：
//! 全局参数、按索引的个人参数、条目自身的参数。
//! 位置参数从不合并；关键字参数总是合并，强作用域覆盖同名键。

use serde_json::Value;

use crate::core::error::BuildError;
use crate::core::models::{Args, Kwargs, Params};

/// The raw argument options of a group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSpec {
    pub global_args: Args,
    pub global_kwargs: Kwargs,
    pub personal_args: Vec<Args>,
    pub personal_kwargs: Vec<Kwargs>,
}

/// Validated argument precedence table, shared read-only by all direct
/// children of one group.
///
/// 经过校验的参数优先级表，由同一组的所有直接子项只读共享。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgResolver {
    spec: ArgSpec,
}

impl ArgResolver {
    pub fn new(spec: ArgSpec) -> Result<Self, BuildError> {
        if !spec.global_args.is_empty() && !spec.personal_args.is_empty() {
            return Err(BuildError::GlobalPersonalConflict);
        }
        if !spec.personal_args.is_empty()
            && !spec.personal_kwargs.is_empty()
            && spec.personal_args.len() != spec.personal_kwargs.len()
        {
            return Err(BuildError::PersonalLengthMismatch {
                args: spec.personal_args.len(),
                kwargs: spec.personal_kwargs.len(),
            });
        }
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &ArgSpec {
        &self.spec
    }

    /// True when personal bindings expand each case into several calls.
    pub fn is_personal(&self) -> bool {
        !self.spec.personal_args.is_empty() || !self.spec.personal_kwargs.is_empty()
    }

    /// Resolves the bindings for the item called `item`.
    ///
    /// Returns one [`Params`] per personal index when personal sources are
    /// configured, otherwise exactly one.
    ///
    /// 解析名为 `item` 的条目的参数绑定。
    pub fn get(
        &self,
        item: &str,
        item_args: &Args,
        item_kwargs: &Kwargs,
    ) -> Result<Vec<Params>, BuildError> {
        let spec = &self.spec;
        if !spec.personal_args.is_empty() && !item_args.is_empty() {
            return Err(BuildError::ArgsConflict {
                item: item.to_string(),
            });
        }

        let default_args = if item_args.is_empty() {
            &spec.global_args
        } else {
            item_args
        };

        let count = spec.personal_args.len().max(spec.personal_kwargs.len());
        if count == 0 {
            return Ok(vec![Params::new(
                default_args.clone(),
                merge(&[&spec.global_kwargs, item_kwargs]),
            )]);
        }

        let empty = Kwargs::new();
        Ok((0..count)
            .map(|i| {
                let args = spec
                    .personal_args
                    .get(i)
                    .unwrap_or(default_args)
                    .clone();
                let personal = spec.personal_kwargs.get(i).unwrap_or(&empty);
                Params::new(args, merge(&[&spec.global_kwargs, personal, item_kwargs]))
            })
            .collect())
    }
}

/// Shallow merge; later maps win key conflicts.
fn merge(layers: &[&Kwargs]) -> Kwargs {
    let mut merged = Kwargs::new();
    for layer in layers {
        for (key, value) in layer.iter() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Interprets a JSON value as positional arguments: an array, or `null`
/// for none.
pub fn expect_args(item: &str, value: Value) -> Result<Args, BuildError> {
    match value {
        Value::Null => Ok(Args::new()),
        Value::Array(args) => Ok(args),
        other => Err(BuildError::MalformedItem {
            item: item.to_string(),
            reason: format!("args must be a JSON array, got `{other}`"),
        }),
    }
}

/// Interprets a JSON value as keyword arguments: an object, or `null` for
/// none.
pub fn expect_kwargs(item: &str, value: Value) -> Result<Kwargs, BuildError> {
    match value {
        Value::Null => Ok(Kwargs::new()),
        Value::Object(kwargs) => Ok(kwargs),
        other => Err(BuildError::MalformedItem {
            item: item.to_string(),
            reason: format!("kwargs must be a JSON object, got `{other}`"),
        }),
    }
}
