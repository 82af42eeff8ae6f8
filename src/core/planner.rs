//! # Item Planner Module / 条目规划模块
//!
//! Callers hand the harness heterogeneous "in test" items: plain functions,
//! future-returning functions, already-created futures, case bundles (as
//! instances or as types) and nested groups. This module is the single
//! place where that shape is inspected; it classifies every [`Item`] once
//! and turns it into a [`Node`] of the execution tree.
//!
//! 调用者向测试工具提供各种形式的条目：普通函数、返回 future 的函数、
//! 已创建的 future、用例集合（实例或类型）以及嵌套组。
//! 本模块是唯一检查条目形式的地方；它对每个 [`Item`] 只分类一次，
//! 并将其转换为执行树中的 [`Node`]。

use anyhow::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::core::args::{ArgResolver, expect_args, expect_kwargs};
use crate::core::bundle::{BundleFactory, CaseBundle, TEST_PREFIX};
use crate::core::case::{Case, CaseHooks};
use crate::core::error::BuildError;
use crate::core::group::{Group, Node};
use crate::core::models::{Args, Callable, Kwargs, Params};

/// Derives a readable name from a callable's type path: the last path
/// segment, skipping closure markers.
///
/// 根据可调用对象的类型路径推导可读名称：取最后一段路径，跳过闭包标记。
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::")
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .unwrap_or(path)
        .to_string()
}

/// One member of an item tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemPart {
    /// Positional arguments; must be a JSON array.
    Args(Value),
    /// Keyword arguments; must be a JSON object.
    Kwargs(Value),
}

/// A callable together with the argument parts attached to it, in any
/// order.
///
/// 一个可调用对象及附加在其上的参数部分（顺序任意）。
#[derive(Debug, Clone)]
pub struct CallItem {
    name: String,
    callable: Callable,
    parts: Vec<ItemPart>,
}

impl CallItem {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attaches positional arguments (a JSON array).
    pub fn args(mut self, args: Value) -> Self {
        self.parts.push(ItemPart::Args(args));
        self
    }

    /// Attaches keyword arguments (a JSON object).
    pub fn kwargs(mut self, kwargs: Value) -> Self {
        self.parts.push(ItemPart::Kwargs(kwargs));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An "in test" item accepted by groups and the top-level entry points.
///
/// 组和顶层入口接受的测试条目。
pub enum Item {
    Call(CallItem),
    Coroutine {
        name: String,
        future: BoxFuture<'static, Result<()>>,
        parts: Vec<ItemPart>,
    },
    Bundle(Arc<dyn CaseBundle>),
    BundleType(BundleFactory),
    Group(Group),
}

impl Item {
    /// A plain function item; the name is taken from the function's path.
    pub fn sync<F>(f: F) -> CallItem
    where
        F: Fn(&Params) -> Result<()> + Send + Sync + 'static,
    {
        CallItem {
            name: short_type_name::<F>(),
            callable: Callable::sync(f),
            parts: Vec::new(),
        }
    }

    /// A future-returning function item.
    pub fn future<F, Fut>(f: F) -> CallItem
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        CallItem {
            name: short_type_name::<F>(),
            callable: Callable::future(f),
            parts: Vec::new(),
        }
    }

    /// An already-created future. It runs once and takes no arguments.
    pub fn coroutine<Fut>(name: impl Into<String>, future: Fut) -> Self
    where
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Item::Coroutine {
            name: name.into(),
            future: future.boxed(),
            parts: Vec::new(),
        }
    }

    /// A case bundle instance.
    pub fn bundle<B: CaseBundle + 'static>(bundle: B) -> Self {
        Item::Bundle(Arc::new(bundle))
    }

    /// A case bundle type, instantiated with `Default` when the group is
    /// assembled.
    pub fn bundle_type<B: CaseBundle + Default + 'static>() -> Self {
        Item::BundleType(Arc::new(|| Arc::new(B::default()) as Arc<dyn CaseBundle>))
    }

    pub fn name(&self) -> String {
        match self {
            Item::Call(call) => call.name.clone(),
            Item::Coroutine { name, .. } => name.clone(),
            Item::Bundle(bundle) => bundle.name(),
            Item::BundleType(_) => "<bundle type>".to_string(),
            Item::Group(group) => group.name().to_string(),
        }
    }
}

impl From<CallItem> for Item {
    fn from(call: CallItem) -> Self {
        Item::Call(call)
    }
}

impl From<Group> for Item {
    fn from(group: Group) -> Self {
        Item::Group(group)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Call(call) => f.debug_tuple("Item::Call").field(call).finish(),
            Item::Coroutine { name, .. } => f.debug_tuple("Item::Coroutine").field(name).finish(),
            Item::Bundle(bundle) => f.debug_tuple("Item::Bundle").field(&bundle.name()).finish(),
            Item::BundleType(_) => f.write_str("Item::BundleType"),
            Item::Group(group) => f.debug_tuple("Item::Group").field(&group.name()).finish(),
        }
    }
}

/// Splits an item's parts into its positional and keyword arguments.
fn split_parts(item: &str, parts: Vec<ItemPart>) -> Result<(Args, Kwargs), BuildError> {
    let mut args: Option<Args> = None;
    let mut kwargs: Option<Kwargs> = None;
    for part in parts {
        match part {
            ItemPart::Args(value) => {
                if args.is_some() {
                    return Err(BuildError::ItemArgsConflict {
                        item: item.to_string(),
                    });
                }
                args = Some(expect_args(item, value)?);
            }
            ItemPart::Kwargs(value) => {
                if kwargs.is_some() {
                    return Err(BuildError::ItemKwargsConflict {
                        item: item.to_string(),
                    });
                }
                kwargs = Some(expect_kwargs(item, value)?);
            }
        }
    }
    Ok((args.unwrap_or_default(), kwargs.unwrap_or_default()))
}

/// Classifies `item` and builds its execution node, binding arguments with
/// the group's shared `resolver` and `hooks`.
///
/// 对 `item` 分类并构建其执行节点，使用组共享的 `resolver` 和 `hooks` 绑定参数。
pub fn normalize(
    item: Item,
    resolver: &Arc<ArgResolver>,
    hooks: &Arc<CaseHooks>,
) -> Result<Node, BuildError> {
    match item {
        Item::Call(CallItem {
            name,
            callable,
            parts,
        }) => {
            let (args, kwargs) = split_parts(&name, parts)?;
            let params = resolver.get(&name, &args, &kwargs)?;
            Ok(Node::Case(Case::new(name, callable, params, Arc::clone(hooks))))
        }
        Item::Coroutine {
            name,
            future,
            parts,
        } => {
            let (args, kwargs) = split_parts(&name, parts)?;
            let params = resolver.get(&name, &args, &kwargs)?;
            if params.len() != 1 || params.iter().any(|p| !p.is_empty()) {
                return Err(BuildError::CoroutineWithArgs { item: name });
            }
            Ok(Node::Case(Case::from_coroutine(name, future, Arc::clone(hooks))))
        }
        Item::Bundle(bundle) => Ok(Node::Group(expand_bundle(bundle, resolver, hooks))),
        Item::BundleType(factory) => Ok(Node::Group(expand_bundle(factory(), resolver, hooks))),
        Item::Group(group) => Ok(Node::Group(group)),
    }
}

/// Turns a case bundle into a nested group that shares the parent's
/// argument and hook configuration.
///
/// Members whose name does not start with [`TEST_PREFIX`] are skipped.
/// Members that cannot be bound are recorded as the group's init errors
/// rather than failing the parent: the caller did not write them.
///
/// 将用例集合转换为共享父组参数和钩子配置的嵌套组。
/// 名称不以 [`TEST_PREFIX`] 开头的成员会被跳过；
/// 无法绑定的成员会记录为该组的初始化错误，而不会导致父组装配失败。
pub fn expand_bundle(
    bundle: Arc<dyn CaseBundle>,
    resolver: &Arc<ArgResolver>,
    hooks: &Arc<CaseHooks>,
) -> Group {
    let mut group = Group::with_shared(
        bundle.name(),
        Arc::clone(resolver),
        Arc::clone(hooks),
        bundle.constructor(),
        bundle.destructor(),
    );
    for member in bundle.members() {
        if !member.name.starts_with(TEST_PREFIX) {
            continue;
        }
        let item = Item::Call(CallItem {
            name: member.name.clone(),
            callable: member.callable,
            parts: member.parts,
        });
        match normalize(item, resolver, hooks) {
            Ok(node) => group.push(node),
            Err(error) => group.push_init_error(member.name, error),
        }
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_test(_: &Params) -> Result<()> {
        Ok(())
    }

    #[test]
    fn names_come_from_function_paths() {
        assert_eq!(Item::sync(sample_test).name(), "sample_test");
        assert_eq!(Item::sync(|_: &Params| Ok(())).named("custom").name(), "custom");
    }

    #[test]
    fn duplicate_parts_are_rejected() {
        let parts = vec![
            ItemPart::Args(serde_json::json!([1])),
            ItemPart::Args(serde_json::json!([2])),
        ];
        assert_eq!(
            split_parts("f", parts),
            Err(BuildError::ItemArgsConflict { item: "f".into() })
        );
    }
}
