//! # Case Bundle Module / 用例集合模块
//!
//! A case bundle is a type that declares its own tests: every member whose
//! name starts with [`TEST_PREFIX`] is run, anything else is ignored.
//! Set-up and tear-down are declared explicitly through
//! [`CaseBundle::constructor`] and [`CaseBundle::destructor`].
//!
//! 用例集合是一个声明自身测试的类型：名称以 [`TEST_PREFIX`] 开头的成员会被运行，
//! 其余成员被忽略。初始化和清理通过 [`CaseBundle::constructor`] 和
//! [`CaseBundle::destructor`] 显式声明。

use anyhow::Result;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::core::error::BuildError;
use crate::core::execution::{Dispatch, Runner};
use crate::core::group::{Group, GroupOptions};
use crate::core::models::{Callable, Hook, Params};
use crate::core::planner::{Item, ItemPart, short_type_name};

/// Members starting with this prefix are tests.
pub const TEST_PREFIX: &str = "test";

/// Builds a fresh bundle instance; the "type" form of a bundle item.
pub type BundleFactory = Arc<dyn Fn() -> Arc<dyn CaseBundle> + Send + Sync>;

/// A named callable declared by a bundle.
///
/// 用例集合声明的一个具名可调用对象。
#[derive(Clone)]
pub struct Member {
    pub name: String,
    pub callable: Callable,
    pub parts: Vec<ItemPart>,
}

impl Member {
    pub fn sync<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Params) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            callable: Callable::sync(f),
            parts: Vec::new(),
        }
    }

    pub fn future<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            callable: Callable::future(f),
            parts: Vec::new(),
        }
    }

    /// Binds the member to its own positional arguments (a JSON array).
    pub fn args(mut self, args: Value) -> Self {
        self.parts.push(ItemPart::Args(args));
        self
    }

    /// Binds the member to its own keyword arguments (a JSON object).
    pub fn kwargs(mut self, kwargs: Value) -> Self {
        self.parts.push(ItemPart::Kwargs(kwargs));
        self
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("callable", &self.callable)
            .field("parts", &self.parts)
            .finish()
    }
}

/// A type that groups its own tests.
///
/// ```no_run
/// use cotest_runner::{CaseBundle, Member, BundleExt, GroupOptions};
///
/// #[derive(Default)]
/// struct Parsing;
///
/// impl CaseBundle for Parsing {
///     fn members(&self) -> Vec<Member> {
///         vec![
///             Member::sync("test_empty", |_| Ok(())),
///             Member::sync("helper", |_| Ok(())), // not a test
///         ]
///     }
/// }
///
/// Parsing.run_tests(GroupOptions::default()).unwrap();
/// ```
pub trait CaseBundle: Send + Sync {
    /// The name of the group the bundle becomes. Defaults to the type name.
    fn name(&self) -> String {
        short_type_name::<Self>()
    }

    /// Every member of the bundle; only those starting with
    /// [`TEST_PREFIX`] run.
    fn members(&self) -> Vec<Member>;

    /// Runs once before the bundle's tests.
    fn constructor(&self) -> Option<Hook> {
        None
    }

    /// Runs once after the bundle's tests, also when they failed.
    fn destructor(&self) -> Option<Hook> {
        None
    }
}

/// Entry points for running a bundle on its own.
///
/// 单独运行用例集合的入口。
pub trait BundleExt: CaseBundle + Sized + 'static {
    /// Runs every test member once. The bundle's name is used unless
    /// `options` names the group.
    fn run_tests(self, options: GroupOptions) -> Result<Dispatch, BuildError> {
        Ok(Runner::default().go(self.into_group(options)?))
    }

    /// Benchmarks every test member over `iterations`.
    fn run_bench(self, iterations: usize, options: GroupOptions) -> Result<Dispatch, BuildError> {
        Runner::default().go_bench(self.into_group(options)?, iterations)
    }

    /// Assembles the bundle into a root group configured by `options`.
    fn into_group(self, options: GroupOptions) -> Result<Group, BuildError> {
        let options = if options.name_is_empty() {
            let name = self.name();
            options.name(name)
        } else {
            options
        };
        let mut group = Group::new(Vec::<Item>::new(), options)?;
        group.absorb_bundle(Arc::new(self));
        Ok(group)
    }
}

impl<T: CaseBundle + 'static> BundleExt for T {}
